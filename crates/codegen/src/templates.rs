//! Stub rendering
//!
//! Every artifact is rendered from a named stub through `minijinja`.
//! Default stubs are embedded in the binary; a stubs directory can override
//! any of them with a file named `<kind>.stub`.
//!
//! Templates ending in `.php` auto-escape interpolated values for a PHP
//! single-quoted string (`\` and `'`). Values marked safe (`|safe`) are
//! written as is, which is how namespaces and PHP expressions built by the
//! emitters get through. `none` and undefined values render as nothing.

use blueprint_core::naming;
use blueprint_core::{EngineError, EngineResult};
use heck::{ToKebabCase, ToLowerCamelCase, ToPascalCase, ToSnakeCase};
use minijinja::value::Value;
use minijinja::{AutoEscape, Environment, Error, ErrorKind, Output, State};
use serde::Serialize;
use std::fmt::Write as _;
use std::path::Path;
use tracing::debug;

/// Auto-escape mode used by `.php` templates
const PHP_ESCAPE: &str = "php";

// ============================================================================
// StubKind
// ============================================================================

/// Named stub templates
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StubKind {
    Model,
    Migration,
    PivotMigration,
    Factory,
    Seeder,
    ModuleSeeder,
    PermissionSeeder,
    Schema,
    Resource,
    Authorizer,
    Request,
    Controller,
    Server,
    Routes,
    TestIndex,
    TestShow,
    TestStore,
    TestUpdate,
    TestDestroy,
    ApiDocs,
}

impl StubKind {
    /// Get all stub kinds
    pub fn all() -> &'static [StubKind] {
        &[
            StubKind::Model,
            StubKind::Migration,
            StubKind::PivotMigration,
            StubKind::Factory,
            StubKind::Seeder,
            StubKind::ModuleSeeder,
            StubKind::PermissionSeeder,
            StubKind::Schema,
            StubKind::Resource,
            StubKind::Authorizer,
            StubKind::Request,
            StubKind::Controller,
            StubKind::Server,
            StubKind::Routes,
            StubKind::TestIndex,
            StubKind::TestShow,
            StubKind::TestStore,
            StubKind::TestUpdate,
            StubKind::TestDestroy,
            StubKind::ApiDocs,
        ]
    }

    /// Stub name; overrides are looked up as `<name>.stub`
    pub fn name(&self) -> &'static str {
        match self {
            StubKind::Model => "model",
            StubKind::Migration => "migration",
            StubKind::PivotMigration => "pivot_migration",
            StubKind::Factory => "factory",
            StubKind::Seeder => "seeder",
            StubKind::ModuleSeeder => "module_seeder",
            StubKind::PermissionSeeder => "permission_seeder",
            StubKind::Schema => "schema",
            StubKind::Resource => "resource",
            StubKind::Authorizer => "authorizer",
            StubKind::Request => "request",
            StubKind::Controller => "controller",
            StubKind::Server => "server",
            StubKind::Routes => "routes",
            StubKind::TestIndex => "test_index",
            StubKind::TestShow => "test_show",
            StubKind::TestStore => "test_store",
            StubKind::TestUpdate => "test_update",
            StubKind::TestDestroy => "test_destroy",
            StubKind::ApiDocs => "api_docs",
        }
    }

    /// Template name inside the environment; the extension picks the escaping
    pub fn template_name(&self) -> String {
        match self {
            StubKind::ApiDocs => format!("{}.md", self.name()),
            _ => format!("{}.php", self.name()),
        }
    }

    /// Embedded default stub
    pub fn default_source(&self) -> &'static str {
        match self {
            StubKind::Model => include_str!("../stubs/model.stub"),
            StubKind::Migration => include_str!("../stubs/migration.stub"),
            StubKind::PivotMigration => include_str!("../stubs/pivot_migration.stub"),
            StubKind::Factory => include_str!("../stubs/factory.stub"),
            StubKind::Seeder => include_str!("../stubs/seeder.stub"),
            StubKind::ModuleSeeder => include_str!("../stubs/module_seeder.stub"),
            StubKind::PermissionSeeder => include_str!("../stubs/permission_seeder.stub"),
            StubKind::Schema => include_str!("../stubs/schema.stub"),
            StubKind::Resource => include_str!("../stubs/resource.stub"),
            StubKind::Authorizer => include_str!("../stubs/authorizer.stub"),
            StubKind::Request => include_str!("../stubs/request.stub"),
            StubKind::Controller => include_str!("../stubs/controller.stub"),
            StubKind::Server => include_str!("../stubs/server.stub"),
            StubKind::Routes => include_str!("../stubs/routes.stub"),
            StubKind::TestIndex => include_str!("../stubs/test_index.stub"),
            StubKind::TestShow => include_str!("../stubs/test_show.stub"),
            StubKind::TestStore => include_str!("../stubs/test_store.stub"),
            StubKind::TestUpdate => include_str!("../stubs/test_update.stub"),
            StubKind::TestDestroy => include_str!("../stubs/test_destroy.stub"),
            StubKind::ApiDocs => include_str!("../stubs/api_docs.stub"),
        }
    }
}

impl std::fmt::Display for StubKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

// ============================================================================
// Escaping
// ============================================================================

/// Escape text for a PHP single-quoted string
pub fn php_escape(value: &str) -> String {
    value.replace('\\', "\\\\").replace('\'', "\\'")
}

fn format_value(out: &mut Output<'_>, state: &State<'_, '_>, value: &Value) -> Result<(), Error> {
    if value.is_undefined() || value.is_none() {
        return Ok(());
    }
    let text = value.to_string();
    let escaped = match state.auto_escape() {
        AutoEscape::Custom(PHP_ESCAPE) if !value.is_safe() => php_escape(&text),
        _ => text,
    };
    out.write_str(&escaped)
        .map_err(|_| Error::new(ErrorKind::WriteFailure, "failed to write rendered stub"))
}

// ============================================================================
// StubRenderer
// ============================================================================

/// Template environment with every stub registered
pub struct StubRenderer {
    env: Environment<'static>,
}

impl std::fmt::Debug for StubRenderer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StubRenderer").finish_non_exhaustive()
    }
}

impl StubRenderer {
    /// Renderer with the embedded stubs only
    pub fn embedded() -> EngineResult<Self> {
        Self::new(None)
    }

    /// Renderer with overrides read from `stubs_dir`
    pub fn new(stubs_dir: Option<&Path>) -> EngineResult<Self> {
        let mut env = Environment::new();
        env.set_trim_blocks(true);
        env.set_lstrip_blocks(true);
        env.set_keep_trailing_newline(true);
        env.set_auto_escape_callback(|name: &str| {
            if name.ends_with(".php") {
                AutoEscape::Custom(PHP_ESCAPE)
            } else {
                AutoEscape::None
            }
        });
        env.set_formatter(format_value);

        env.add_filter("snake", |s: String| s.to_snake_case());
        env.add_filter("camel", |s: String| s.to_lower_camel_case());
        env.add_filter("studly", |s: String| s.to_pascal_case());
        env.add_filter("kebab", |s: String| s.to_kebab_case());
        env.add_filter("plural", |s: String| naming::pluralize(&s));

        for kind in StubKind::all() {
            let template_name = kind.template_name();
            let source = match stubs_dir.map(|dir| dir.join(format!("{}.stub", kind.name()))) {
                Some(path) if path.is_file() => {
                    debug!(stub = %kind, path = %path.display(), "Using stub override");
                    std::fs::read_to_string(&path).map_err(|e| EngineError::FileRead {
                        path: path.clone(),
                        message: e.to_string(),
                    })?
                }
                Some(path) => {
                    debug!(
                        stub = %kind,
                        path = %path.display(),
                        "No stub override, using embedded default"
                    );
                    kind.default_source().to_string()
                }
                None => kind.default_source().to_string(),
            };
            env.add_template_owned(template_name, source)
                .map_err(|e| EngineError::template(kind.name(), format!("{:#}", e)))?;
        }

        Ok(Self { env })
    }

    /// Render a stub with a serializable context
    pub fn render<S: Serialize>(&self, kind: StubKind, ctx: S) -> EngineResult<String> {
        let template = self
            .env
            .get_template(&kind.template_name())
            .map_err(|_| EngineError::StubNotFound(kind.name().to_string()))?;
        template
            .render(ctx)
            .map_err(|e| EngineError::template(kind.name(), format!("{:#}", e)))
    }

    /// Render an ad-hoc template string with the same settings
    pub fn render_str<S: Serialize>(&self, name: &str, source: &str, ctx: S) -> EngineResult<String> {
        self.env
            .render_named_str(name, source, ctx)
            .map_err(|e| EngineError::template(name, format!("{:#}", e)))
    }
}

// ============================================================================
// Tests
// ============================================================================
