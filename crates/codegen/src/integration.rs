//! Host application integration
//!
//! A generated module is wired into the host through three edits:
//!
//! | host file                              | entry                                          |
//! |----------------------------------------|------------------------------------------------|
//! | `composer.json`                        | PSR-4 mappings for app, factories, seeders, tests |
//! | `routes/api.php`                       | `require base_path('<module>/routes/api.php');` |
//! | `database/seeders/DatabaseSeeder.php`  | `$this->call(<Module>DatabaseSeeder::class);` in `run()` |
//!
//! Every edit checks for its entry first, so registering twice changes
//! nothing. Missing host files are created from a minimal skeleton. The
//! planning functions return only the files whose content changes; the
//! caller stages them with the rest of the run.

use crate::{GeneratedFile, GeneratorConfig};
use blueprint_core::{EngineError, EngineResult};
use serde::Serialize;
use serde_json::{Map, Value};
use std::path::{Path, PathBuf};
use tracing::debug;

pub const COMPOSER_FILE: &str = "composer.json";
pub const HOST_ROUTES_FILE: &str = "routes/api.php";
pub const HOST_SEEDER_FILE: &str = "database/seeders/DatabaseSeeder.php";

const ROUTES_SKELETON: &str = "<?php\n\nuse Illuminate\\Support\\Facades\\Route;\n";

const SEEDER_SKELETON: &str = "<?php

namespace Database\\Seeders;

use Illuminate\\Database\\Seeder;

class DatabaseSeeder extends Seeder
{
    public function run(): void
    {
    }
}
";

const COMPOSER_SKELETON: &str = "{}";

// ============================================================================
// Target
// ============================================================================

/// Names of one module as the host files refer to it
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IntegrationTarget {
    /// Module name (e.g. "Inventory")
    pub module: String,
    /// PHP namespace without trailing separator (e.g. `Modules\Inventory`)
    pub namespace: String,
    /// Module directory relative to the app root, `/`-separated
    pub dir: String,
}

impl IntegrationTarget {
    pub fn new(config: &GeneratorConfig, module: &str) -> Self {
        Self {
            module: module.to_string(),
            namespace: format!("{}\\{}", config.namespace_root(), module),
            dir: config
                .module_rel_dir(module)
                .to_string_lossy()
                .replace('\\', "/"),
        }
    }

    /// `(namespace prefix, directory)` pairs under `autoload.psr-4`
    pub fn autoload(&self) -> Vec<(String, String)> {
        vec![
            (format!("{}\\", self.namespace), format!("{}/app/", self.dir)),
            (
                format!("{}\\Database\\Factories\\", self.namespace),
                format!("{}/Database/Factories/", self.dir),
            ),
            (
                format!("{}\\Database\\Seeders\\", self.namespace),
                format!("{}/Database/Seeders/", self.dir),
            ),
        ]
    }

    /// `(namespace prefix, directory)` pairs under `autoload-dev.psr-4`
    pub fn autoload_dev(&self) -> Vec<(String, String)> {
        vec![(
            format!("{}\\Tests\\", self.namespace),
            format!("{}/Tests/", self.dir),
        )]
    }

    /// Route registration line
    pub fn route_line(&self) -> String {
        format!("require base_path('{}/routes/api.php');", self.dir)
    }

    /// Fully qualified module seeder class
    pub fn seeder_class(&self) -> String {
        format!(
            "{}\\Database\\Seeders\\{}DatabaseSeeder",
            self.namespace, self.module
        )
    }

    /// Seeder call line, without indentation
    pub fn seeder_call(&self) -> String {
        format!("$this->call(\\{}::class);", self.seeder_class())
    }
}

// ============================================================================
// Status
// ============================================================================

/// Which integration entries are present
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct IntegrationStatus {
    pub composer: bool,
    pub routes: bool,
    pub seeder: bool,
}

impl IntegrationStatus {
    pub fn is_complete(&self) -> bool {
        self.composer && self.routes && self.seeder
    }

    pub fn is_absent(&self) -> bool {
        !self.composer && !self.routes && !self.seeder
    }
}

/// Check which entries of `target` the host files contain
pub fn status(app_root: &Path, target: &IntegrationTarget) -> EngineResult<IntegrationStatus> {
    let composer = match read_optional(&app_root.join(COMPOSER_FILE))? {
        Some(json) => has_psr4(&json, target)?,
        None => false,
    };
    let routes = read_optional(&app_root.join(HOST_ROUTES_FILE))?
        .is_some_and(|src| has_route(&src, target));
    let seeder = read_optional(&app_root.join(HOST_SEEDER_FILE))?
        .is_some_and(|src| has_seeder_call(&src, target));
    Ok(IntegrationStatus {
        composer,
        routes,
        seeder,
    })
}

// ============================================================================
// Planning
// ============================================================================

/// Host files that must change to register `target`
pub fn plan_register(app_root: &Path, target: &IntegrationTarget) -> EngineResult<Vec<GeneratedFile>> {
    let mut files = Vec::new();

    let composer = read_optional(&app_root.join(COMPOSER_FILE))?;
    let current = composer.as_deref().unwrap_or(COMPOSER_SKELETON);
    let updated = add_psr4(current, target)?;
    if composer.as_deref() != Some(updated.as_str()) {
        files.push(GeneratedFile::json(COMPOSER_FILE, updated));
    }

    let routes = read_optional(&app_root.join(HOST_ROUTES_FILE))?;
    let updated = add_route(routes.as_deref().unwrap_or(ROUTES_SKELETON), target);
    if routes.as_deref() != Some(updated.as_str()) {
        files.push(GeneratedFile::php(HOST_ROUTES_FILE, updated));
    }

    let seeder = read_optional(&app_root.join(HOST_SEEDER_FILE))?;
    let updated = add_seeder_call(seeder.as_deref().unwrap_or(SEEDER_SKELETON), target)?;
    if seeder.as_deref() != Some(updated.as_str()) {
        files.push(GeneratedFile::php(HOST_SEEDER_FILE, updated));
    }

    debug!(module = %target.module, changed = files.len(), "Planned integration");
    Ok(files)
}

/// Host files that must change to unregister `target`; missing files are skipped
pub fn plan_unregister(
    app_root: &Path,
    target: &IntegrationTarget,
) -> EngineResult<Vec<GeneratedFile>> {
    let mut files = Vec::new();

    if let Some(json) = read_optional(&app_root.join(COMPOSER_FILE))? {
        let updated = remove_psr4(&json, target)?;
        if updated != json {
            files.push(GeneratedFile::json(COMPOSER_FILE, updated));
        }
    }
    if let Some(src) = read_optional(&app_root.join(HOST_ROUTES_FILE))? {
        let updated = remove_line(&src, &target.route_line());
        if updated != src {
            files.push(GeneratedFile::php(HOST_ROUTES_FILE, updated));
        }
    }
    if let Some(src) = read_optional(&app_root.join(HOST_SEEDER_FILE))? {
        let updated = remove_line(&src, &target.seeder_call());
        if updated != src {
            files.push(GeneratedFile::php(HOST_SEEDER_FILE, updated));
        }
    }

    Ok(files)
}

fn read_optional(path: &Path) -> EngineResult<Option<String>> {
    if !path.exists() {
        return Ok(None);
    }
    std::fs::read_to_string(path)
        .map(Some)
        .map_err(|e| EngineError::FileRead {
            path: PathBuf::from(path),
            message: e.to_string(),
        })
}

// ============================================================================
// composer.json
// ============================================================================

fn parse_composer(json: &str) -> EngineResult<Value> {
    let value: Value = serde_json::from_str(json)
        .map_err(|e| EngineError::InvalidConfig(format!("Malformed {}: {}", COMPOSER_FILE, e)))?;
    if !value.is_object() {
        return Err(EngineError::InvalidConfig(format!(
            "{} must contain a JSON object",
            COMPOSER_FILE
        )));
    }
    Ok(value)
}

/// Render composer JSON the way composer itself does (4-space indent)
fn render_composer(value: &Value) -> EngineResult<String> {
    let mut buf = Vec::new();
    let formatter = serde_json::ser::PrettyFormatter::with_indent(b"    ");
    let mut ser = serde_json::Serializer::with_formatter(&mut buf, formatter);
    value.serialize(&mut ser)?;
    let mut out = String::from_utf8(buf)
        .map_err(|e| EngineError::internal(format!("composer JSON is not UTF-8: {}", e)))?;
    out.push('\n');
    Ok(out)
}

fn psr4_section<'a>(root: &'a mut Value, section: &str) -> EngineResult<&'a mut Map<String, Value>> {
    let invalid = || EngineError::InvalidConfig(format!("{}: '{}' is not an object", COMPOSER_FILE, section));
    let object = root.as_object_mut().ok_or_else(invalid)?;
    let autoload = object
        .entry(section.to_string())
        .or_insert_with(|| Value::Object(Map::new()))
        .as_object_mut()
        .ok_or_else(invalid)?;
    autoload
        .entry("psr-4".to_string())
        .or_insert_with(|| Value::Object(Map::new()))
        .as_object_mut()
        .ok_or_else(invalid)
}

/// Add the PSR-4 mappings of `target`, keeping existing keys untouched
pub fn add_psr4(json: &str, target: &IntegrationTarget) -> EngineResult<String> {
    let mut root = parse_composer(json)?;
    let mut changed = false;

    for (section, pairs) in [
        ("autoload", target.autoload()),
        ("autoload-dev", target.autoload_dev()),
    ] {
        let psr4 = psr4_section(&mut root, section)?;
        for (namespace, dir) in pairs {
            if !psr4.contains_key(&namespace) {
                psr4.insert(namespace, Value::String(dir));
                changed = true;
            }
        }
    }

    if changed {
        render_composer(&root)
    } else {
        Ok(json.to_string())
    }
}

/// Remove the PSR-4 mappings of `target`
pub fn remove_psr4(json: &str, target: &IntegrationTarget) -> EngineResult<String> {
    let mut root = parse_composer(json)?;
    let mut changed = false;

    for (section, pairs) in [
        ("autoload", target.autoload()),
        ("autoload-dev", target.autoload_dev()),
    ] {
        let Some(psr4) = root
            .get_mut(section)
            .and_then(|s| s.get_mut("psr-4"))
            .and_then(Value::as_object_mut)
        else {
            continue;
        };
        for (namespace, _) in pairs {
            changed |= psr4.shift_remove(&namespace).is_some();
        }
    }

    if changed {
        render_composer(&root)
    } else {
        Ok(json.to_string())
    }
}

fn has_psr4(json: &str, target: &IntegrationTarget) -> EngineResult<bool> {
    let root = parse_composer(json)?;
    let present = |section: &str, pairs: Vec<(String, String)>| {
        pairs.iter().all(|(namespace, _)| {
            root.get(section)
                .and_then(|s| s.get("psr-4"))
                .and_then(|p| p.get(namespace))
                .is_some()
        })
    };
    Ok(present("autoload", target.autoload()) && present("autoload-dev", target.autoload_dev()))
}

// ============================================================================
// routes/api.php
// ============================================================================

fn has_route(src: &str, target: &IntegrationTarget) -> bool {
    src.lines().any(|l| l.trim() == target.route_line())
}

/// Append the route require line unless present
pub fn add_route(src: &str, target: &IntegrationTarget) -> String {
    if has_route(src, target) {
        return src.to_string();
    }
    let mut out = src.to_string();
    if !out.ends_with('\n') {
        out.push('\n');
    }
    out.push('\n');
    out.push_str(&target.route_line());
    out.push('\n');
    out
}

// ============================================================================
// DatabaseSeeder.php
// ============================================================================

fn has_seeder_call(src: &str, target: &IntegrationTarget) -> bool {
    src.lines().any(|l| l.trim() == target.seeder_call())
}

/// Byte offset of the `}` closing the body of `run()`
///
/// Braces are counted without regard to strings or comments, which is
/// enough for seeder bodies made of `call` statements.
fn run_body_end(src: &str) -> Option<usize> {
    let start = src.find("function run(")?;
    let open = start + src[start..].find('{')?;
    let mut depth = 0usize;
    for (offset, ch) in src[open..].char_indices() {
        match ch {
            '{' => depth += 1,
            '}' => {
                depth -= 1;
                if depth == 0 {
                    return Some(open + offset);
                }
            }
            _ => {}
        }
    }
    None
}

/// Insert the module seeder call as the last statement of `run()`
pub fn add_seeder_call(src: &str, target: &IntegrationTarget) -> EngineResult<String> {
    if has_seeder_call(src, target) {
        return Ok(src.to_string());
    }
    let close = run_body_end(src).ok_or_else(|| {
        EngineError::codegen(format!("{} has no run() method to extend", HOST_SEEDER_FILE))
    })?;

    let line_start = src[..close].rfind('\n').map(|i| i + 1).unwrap_or(0);
    let before_brace = &src[line_start..close];
    let mut out = String::with_capacity(src.len() + 80);

    if before_brace.trim().is_empty() {
        // closing brace on its own line
        out.push_str(&src[..line_start]);
        out.push_str(&format!("{}    {}\n", before_brace, target.seeder_call()));
        out.push_str(&src[line_start..]);
    } else {
        out.push_str(&src[..close]);
        out.push_str(&format!("\n        {}\n    ", target.seeder_call()));
        out.push_str(&src[close..]);
    }
    Ok(out)
}

/// Drop every line whose trimmed content equals `line`
fn remove_line(src: &str, line: &str) -> String {
    let mut out: String = src
        .lines()
        .filter(|l| l.trim() != line)
        .collect::<Vec<_>>()
        .join("\n");
    if src.ends_with('\n') {
        out.push('\n');
    }
    out
}
