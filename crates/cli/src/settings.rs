//! Project settings read from `blueprint.toml`
//!
//! The file is optional and lives at the app root. Every key has a default;
//! command-line flags win over the file.
//!
//! ```toml
//! modules_dir = "Modules"
//! stubs_dir = "stubs/blueprint"
//! allow_cycles = false
//! generate_tests = true
//! api_docs_path = "storage/api-docs/openapi.json"
//! ```

use blueprint_codegen::GeneratorConfig;
use blueprint_codegen::docs::DEFAULT_OPENAPI_PATH;
use blueprint_core::{EngineError, EngineResult};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Settings file name at the app root
pub const SETTINGS_FILE: &str = "blueprint.toml";

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Settings {
    /// Directory holding modules, relative to the app root
    pub modules_dir: String,

    /// Stub overrides, relative to the app root
    pub stubs_dir: Option<PathBuf>,

    /// Force-place entities on foreign-key cycles
    pub allow_cycles: bool,

    pub generate_tests: bool,
    pub generate_factories: bool,
    pub generate_seeders: bool,

    /// Output of `api:generate-docs`, relative to the app root
    pub api_docs_path: PathBuf,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            modules_dir: "Modules".to_string(),
            stubs_dir: None,
            allow_cycles: false,
            generate_tests: true,
            generate_factories: true,
            generate_seeders: true,
            api_docs_path: PathBuf::from(DEFAULT_OPENAPI_PATH),
        }
    }
}

impl Settings {
    /// Parse settings from TOML text
    pub fn from_toml_str(text: &str) -> EngineResult<Self> {
        toml::from_str(text)
            .map_err(|e| EngineError::InvalidConfig(format!("{}: {}", SETTINGS_FILE, e)))
    }

    /// Load `blueprint.toml` from the app root, or defaults when absent
    pub fn load(app_root: &Path) -> EngineResult<Self> {
        let path = app_root.join(SETTINGS_FILE);
        if !path.is_file() {
            return Ok(Self::default());
        }
        let text = std::fs::read_to_string(&path).map_err(|e| EngineError::FileRead {
            path: path.clone(),
            message: e.to_string(),
        })?;
        let settings = Self::from_toml_str(&text)?;
        debug!(path = %path.display(), "Loaded settings");
        Ok(settings)
    }

    /// Generator configuration for an app root
    pub fn generator_config(&self, app_root: &Path) -> GeneratorConfig {
        let mut config = GeneratorConfig::new()
            .with_app_root(app_root)
            .with_modules_dir(self.modules_dir.clone());
        if let Some(dir) = &self.stubs_dir {
            config = config.with_stubs_dir(app_root.join(dir));
        }
        if self.allow_cycles {
            config = config.allow_cycles();
        }
        if !self.generate_tests {
            config = config.without_tests();
        }
        if !self.generate_factories {
            config = config.without_factories();
        }
        if !self.generate_seeders {
            config = config.without_seeders();
        }
        config
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use blueprint_codegen::CyclePolicy;
    use pretty_assertions::assert_eq;
    use tempfile::tempdir;

    #[test]
    fn test_defaults_without_file() {
        let dir = tempdir().unwrap();
        let settings = Settings::load(dir.path()).unwrap();
        assert_eq!(settings, Settings::default());
        assert_eq!(settings.api_docs_path, PathBuf::from("storage/api-docs/openapi.json"));
    }

    #[test]
    fn test_partial_file() {
        let settings = Settings::from_toml_str(
            r#"
            stubs_dir = "stubs/blueprint"
            allow_cycles = true
            generate_tests = false
            "#,
        )
        .unwrap();
        assert_eq!(settings.modules_dir, "Modules");
        assert!(settings.allow_cycles);

        let config = settings.generator_config(Path::new("/srv/app"));
        assert_eq!(config.cycle_policy, CyclePolicy::ForcePlace);
        assert!(!config.generate_tests);
        assert_eq!(config.stubs_dir, Some(PathBuf::from("/srv/app/stubs/blueprint")));
    }

    #[test]
    fn test_unknown_key_is_rejected() {
        let err = Settings::from_toml_str("modules = \"X\"").unwrap_err();
        assert!(matches!(err, EngineError::InvalidConfig(_)));
    }

    #[test]
    fn test_load_from_app_root() {
        let dir = tempdir().unwrap();
        std::fs::write(dir.path().join(SETTINGS_FILE), "modules_dir = \"Packages\"\n").unwrap();
        let settings = Settings::load(dir.path()).unwrap();
        let config = settings.generator_config(dir.path());
        assert_eq!(config.module_dir("Sales"), dir.path().join("Packages/Sales"));
    }
}
