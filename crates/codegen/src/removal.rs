//! # Module Removal
//!
//! Deletes a module directory and takes the module back out of the host
//! application (composer mappings, route require, seeder call). Both happen
//! in one transaction: if a host file cannot be rewritten the module
//! directory is restored.

use crate::integration::{self, IntegrationTarget};
use crate::{CommitReport, GeneratorConfig, Transaction};
use blueprint_core::{EngineError, EngineResult};
use tracing::info;

/// Remove `module` and unregister it from the host application
pub fn remove_module(config: &GeneratorConfig, module: &str) -> EngineResult<CommitReport> {
    let module_dir = config.module_dir(module);
    if !module_dir.is_dir() {
        return Err(EngineError::ModuleNotFound(module.to_string()));
    }

    let target = IntegrationTarget::new(config, module);
    let host_edits = integration::plan_unregister(&config.app_root, &target)?;

    let mut tx = Transaction::begin(&config.app_root)?;
    tx.remove(config.module_rel_dir(module))?;
    for file in &host_edits {
        tx.stage(&file.path, &file.content, true)?;
    }
    let report = tx.commit()?;

    info!(
        module = %module,
        host_files = host_edits.len(),
        "Module removed"
    );
    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Generator;
    use crate::integration::{COMPOSER_FILE, HOST_ROUTES_FILE, HOST_SEEDER_FILE};
    use crate::test_support::{fixed_timestamp, inventory};
    use pretty_assertions::assert_eq;
    use std::fs;
    use std::path::Path;
    use tempfile::tempdir;

    fn config(root: &Path) -> GeneratorConfig {
        GeneratorConfig::new()
            .with_app_root(root)
            .with_timestamp(fixed_timestamp())
    }

    #[test]
    fn test_missing_module() {
        let dir = tempdir().unwrap();
        let err = remove_module(&config(dir.path()), "Inventory").unwrap_err();
        assert!(matches!(err, EngineError::ModuleNotFound(ref m) if m == "Inventory"));
    }

    #[test]
    fn test_remove_generated_module() {
        let dir = tempdir().unwrap();
        let config = config(dir.path());
        Generator::new(config.clone())
            .generate_and_write(&inventory())
            .unwrap();

        let report = remove_module(&config, "Inventory").unwrap();
        assert_eq!(report.removed, vec![Path::new("Modules/Inventory").to_path_buf()]);
        assert_eq!(report.replaced.len(), 3);
        assert!(!dir.path().join("Modules/Inventory").exists());

        let target = IntegrationTarget::new(&config, "Inventory");
        let status = integration::status(dir.path(), &target).unwrap();
        assert!(status.is_absent());

        let routes = fs::read_to_string(dir.path().join(HOST_ROUTES_FILE)).unwrap();
        assert!(!routes.contains("Modules/Inventory"));
        let seeder = fs::read_to_string(dir.path().join(HOST_SEEDER_FILE)).unwrap();
        assert!(seeder.contains("public function run(): void"));
        assert!(fs::read_to_string(dir.path().join(COMPOSER_FILE)).is_ok());
    }

    #[test]
    fn test_remove_unregistered_module_directory() {
        let dir = tempdir().unwrap();
        let config = config(dir.path());
        fs::create_dir_all(dir.path().join("Modules/Draft/app")).unwrap();

        let report = remove_module(&config, "Draft").unwrap();
        assert_eq!(report.total(), 1);
        assert!(!dir.path().join("Modules/Draft").exists());
    }
}
