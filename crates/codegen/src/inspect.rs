//! # Module Inspection
//!
//! Checks an existing module against what generation would produce:
//!
//! 1. `module.json` exists and parses
//! 2. the blueprint passes validation
//! 3. every expected artifact exists (migrations matched by table suffix)
//! 4. composer mapping, route require and seeder call are registered
//! 5. no generated PHP file is empty
//!
//! Missing artifacts and integration entries are fixable: `fix` writes the
//! missing files without touching existing ones and repairs the host files.

use crate::generator::{Generator, discover_modules};
use crate::integration::{self, COMPOSER_FILE, HOST_ROUTES_FILE, HOST_SEEDER_FILE, IntegrationTarget};
use crate::migrations;
use crate::GeneratorConfig;
use blueprint_core::{EngineError, EngineResult};
use blueprint_ir::{Blueprint, SNAPSHOT_FILE, Validator, load_snapshot};
use std::fmt;
use std::path::PathBuf;
use tracing::{debug, info};
use walkdir::WalkDir;

// ============================================================================
// Issues
// ============================================================================

/// How serious an issue is
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Severity {
    Warning,
    Error,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Severity::Warning => write!(f, "warning"),
            Severity::Error => write!(f, "error"),
        }
    }
}

/// One finding of an inspection
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Issue {
    pub severity: Severity,
    pub message: String,
    /// File concerned, relative to the app root
    pub path: Option<PathBuf>,
    /// Whether `fix` can repair it
    pub fixable: bool,
}

impl Issue {
    pub fn error(message: impl Into<String>) -> Self {
        Self {
            severity: Severity::Error,
            message: message.into(),
            path: None,
            fixable: false,
        }
    }

    pub fn warning(message: impl Into<String>) -> Self {
        Self {
            severity: Severity::Warning,
            ..Self::error(message)
        }
    }

    pub fn with_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.path = Some(path.into());
        self
    }

    pub fn fixable(mut self) -> Self {
        self.fixable = true;
        self
    }
}

impl fmt::Display for Issue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}", self.severity, self.message)?;
        if let Some(path) = &self.path {
            write!(f, " ({})", path.display())?;
        }
        if self.fixable {
            write!(f, " [fixable]")?;
        }
        Ok(())
    }
}

// ============================================================================
// Report
// ============================================================================

/// Outcome of inspecting one module
#[derive(Debug, Clone, Default)]
pub struct InspectionReport {
    pub module: String,
    pub issues: Vec<Issue>,
    /// Files written by a fix, relative to the app root
    pub fixed: Vec<PathBuf>,
}

impl InspectionReport {
    fn new(module: &str) -> Self {
        Self {
            module: module.to_string(),
            ..Self::default()
        }
    }

    /// No error-severity issue
    pub fn is_ok(&self) -> bool {
        self.error_count() == 0
    }

    pub fn error_count(&self) -> usize {
        self.issues
            .iter()
            .filter(|i| i.severity == Severity::Error)
            .count()
    }

    pub fn warning_count(&self) -> usize {
        self.issues
            .iter()
            .filter(|i| i.severity == Severity::Warning)
            .count()
    }

    pub fn fixable_count(&self) -> usize {
        self.issues.iter().filter(|i| i.fixable).count()
    }

    /// Human-readable report
    pub fn display(&self) -> String {
        let mut out = String::new();
        let status = if self.is_ok() { "OK" } else { "FAILED" };
        out.push_str(&format!(
            "Module {}: {} ({} errors, {} warnings)\n",
            self.module,
            status,
            self.error_count(),
            self.warning_count()
        ));
        for path in &self.fixed {
            out.push_str(&format!("  fixed    {}\n", path.display()));
        }
        for issue in &self.issues {
            out.push_str(&format!("  {}\n", issue));
        }
        out
    }
}

// ============================================================================
// Inspector
// ============================================================================

/// Inspects and repairs generated modules below an app root
#[derive(Debug, Clone)]
pub struct Inspector {
    config: GeneratorConfig,
}

impl Inspector {
    pub fn new(config: GeneratorConfig) -> Self {
        Self { config }
    }

    /// Inspect one module.
    ///
    /// Fails with `ModuleNotFound` when the module directory does not exist;
    /// every other problem is reported as an issue.
    pub fn inspect(&self, module: &str) -> EngineResult<InspectionReport> {
        let module_dir = self.config.module_dir(module);
        if !module_dir.is_dir() {
            return Err(EngineError::ModuleNotFound(module.to_string()));
        }

        let mut report = InspectionReport::new(module);
        let snapshot = self.config.module_rel_dir(module).join(SNAPSHOT_FILE);

        if !module_dir.join(SNAPSHOT_FILE).is_file() {
            report.issues.push(Issue::error("Blueprint snapshot is missing").with_path(snapshot));
            return Ok(report);
        }
        let blueprint = match load_snapshot(&module_dir) {
            Ok(blueprint) => blueprint,
            Err(e) => {
                report.issues.push(Issue::error(e.to_string()).with_path(snapshot));
                return Ok(report);
            }
        };
        if blueprint.module != module {
            report.issues.push(Issue::warning(format!(
                "Snapshot describes module '{}'",
                blueprint.module
            )));
        }

        if !self.check_blueprint(&blueprint, &mut report) {
            return Ok(report);
        }
        self.check_artifacts(&blueprint, &mut report);
        self.check_integration(module, &mut report)?;
        self.check_empty_files(module, &mut report);

        debug!(
            module = %module,
            errors = report.error_count(),
            warnings = report.warning_count(),
            "Module inspected"
        );
        Ok(report)
    }

    /// Inspect one module and repair what can be repaired.
    ///
    /// The returned report reflects the state after the repair.
    pub fn fix(&self, module: &str) -> EngineResult<InspectionReport> {
        let before = self.inspect(module)?;
        if before.fixable_count() == 0 {
            return Ok(before);
        }

        let blueprint = load_snapshot(self.config.module_dir(module))?;
        let written = Generator::new(self.config.clone()).generate_missing(&blueprint)?;

        let mut after = self.inspect(module)?;
        after.fixed = written
            .files
            .iter()
            .chain(written.integration.iter())
            .map(|f| f.path.clone())
            .collect();
        info!(module = %module, fixed = after.fixed.len(), "Module repaired");
        Ok(after)
    }

    /// Inspect (and optionally fix) every module below the modules directory
    pub fn inspect_all(&self, fix: bool) -> EngineResult<Vec<InspectionReport>> {
        discover_modules(&self.config)
            .iter()
            .map(|module| {
                if fix {
                    self.fix(module)
                } else {
                    self.inspect(module)
                }
            })
            .collect()
    }

    // ====================================================================
    // Checks
    // ====================================================================

    fn check_blueprint(&self, blueprint: &Blueprint, report: &mut InspectionReport) -> bool {
        let mut normalized = blueprint.clone();
        normalized.normalize();
        let result = Validator::with_default_rules().validate(&normalized);
        for warning in &result.warnings {
            report.issues.push(Issue::warning(warning.to_string()));
        }
        for error in &result.errors {
            report.issues.push(Issue::error(error.to_string()));
        }
        result.valid
    }

    fn check_artifacts(&self, blueprint: &Blueprint, report: &mut InspectionReport) {
        let expected = match Generator::new(self.config.clone()).generate(blueprint) {
            Ok(expected) => expected,
            Err(e) => {
                report.issues.push(Issue::error(format!("Cannot render module: {}", e)));
                return;
            }
        };

        let module_dir = self.config.module_dir(&expected.name);
        for file in &expected.files {
            let present = match file.migration_suffix() {
                Some(suffix) => migrations::find_existing(&module_dir, &suffix).is_some(),
                None => self.config.app_root.join(&file.path).is_file(),
            };
            if !present {
                report.issues.push(
                    Issue::error("Generated file is missing")
                        .with_path(file.path.clone())
                        .fixable(),
                );
            }
        }
    }

    fn check_integration(&self, module: &str, report: &mut InspectionReport) -> EngineResult<()> {
        let target = IntegrationTarget::new(&self.config, module);
        let status = match integration::status(&self.config.app_root, &target) {
            Ok(status) => status,
            Err(e) => {
                report.issues.push(Issue::error(e.to_string()));
                return Ok(());
            }
        };

        if !status.composer {
            report.issues.push(
                Issue::error(format!("PSR-4 mapping for '{}\\' is missing", target.namespace))
                    .with_path(COMPOSER_FILE)
                    .fixable(),
            );
        }
        if !status.routes {
            report.issues.push(
                Issue::error("Module routes are not required by the host")
                    .with_path(HOST_ROUTES_FILE)
                    .fixable(),
            );
        }
        if !status.seeder {
            report.issues.push(
                Issue::error(format!("{} is not called", target.seeder_class()))
                    .with_path(HOST_SEEDER_FILE)
                    .fixable(),
            );
        }
        Ok(())
    }

    fn check_empty_files(&self, module: &str, report: &mut InspectionReport) {
        let module_dir = self.config.module_dir(module);
        for entry in WalkDir::new(&module_dir)
            .into_iter()
            .filter_map(|e| e.ok())
            .filter(|e| e.file_type().is_file())
            .filter(|e| e.path().extension().is_some_and(|ext| ext == "php"))
        {
            let empty = entry.metadata().map(|m| m.len() == 0).unwrap_or(false);
            if empty {
                let rel = entry
                    .path()
                    .strip_prefix(&self.config.app_root)
                    .unwrap_or(entry.path());
                report
                    .issues
                    .push(Issue::warning("PHP file is empty").with_path(rel));
            }
        }
    }
}
