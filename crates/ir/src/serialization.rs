//! Loading blueprint configs and module snapshots
//!
//! A config is the JSON file handed to `module:advanced-blueprint`. A
//! snapshot is the `module.json` written into every generated module so
//! later commands (`module:validate`, `module:docs`, `api:generate-docs`)
//! can inspect it without re-reading the original config.

use crate::SCHEMA_VERSION;
use crate::blueprint::Blueprint;
use blueprint_core::{EngineError, EngineResult};
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::debug;

/// Snapshot file name inside a module directory
pub const SNAPSHOT_FILE: &str = "module.json";

// ============================================================================
// Snapshot wrapper
// ============================================================================

/// Wrapper for snapshot files that includes version information
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ModuleSnapshot {
    /// Schema version for migration purposes
    pub schema_version: u32,

    /// Generator version that wrote the snapshot
    #[serde(default)]
    pub generator: String,

    /// The module description
    pub blueprint: Blueprint,
}

impl ModuleSnapshot {
    pub fn new(blueprint: Blueprint) -> Self {
        Self {
            schema_version: SCHEMA_VERSION,
            generator: format!("module-blueprint {}", crate::VERSION),
            blueprint,
        }
    }

    /// Check whether the snapshot was written by a newer generator
    pub fn is_newer_than_supported(&self) -> bool {
        self.schema_version > SCHEMA_VERSION
    }
}

// ============================================================================
// Config loading
// ============================================================================

/// Parse a JSON blueprint config and apply defaults
pub fn parse_config(json: &str) -> EngineResult<Blueprint> {
    let mut blueprint: Blueprint = serde_json::from_str(json)
        .map_err(|e| EngineError::InvalidConfig(format!("Malformed blueprint config: {}", e)))?;
    blueprint.normalize();
    Ok(blueprint)
}

/// Load a JSON blueprint config from disk
pub fn load_config(path: impl AsRef<Path>) -> EngineResult<Blueprint> {
    let path = path.as_ref();
    let json = std::fs::read_to_string(path).map_err(|e| EngineError::FileRead {
        path: path.to_path_buf(),
        message: e.to_string(),
    })?;
    let blueprint = parse_config(&json)?;
    debug!(
        path = %path.display(),
        module = %blueprint.module,
        entities = blueprint.entities.len(),
        relationships = blueprint.relationships.len(),
        "Loaded blueprint config"
    );
    Ok(blueprint)
}

// ============================================================================
// Snapshots
// ============================================================================

/// Render a blueprint as snapshot JSON
pub fn snapshot_to_string(blueprint: &Blueprint) -> EngineResult<String> {
    let snapshot = ModuleSnapshot::new(blueprint.clone());
    let mut json = serde_json::to_string_pretty(&snapshot)?;
    json.push('\n');
    Ok(json)
}

/// Parse snapshot JSON
pub fn snapshot_from_str(json: &str) -> EngineResult<Blueprint> {
    let snapshot: ModuleSnapshot = serde_json::from_str(json)
        .map_err(|e| EngineError::InvalidConfig(format!("Malformed module snapshot: {}", e)))?;
    if snapshot.is_newer_than_supported() {
        return Err(EngineError::InvalidConfig(format!(
            "Snapshot schema version {} is newer than supported version {}",
            snapshot.schema_version, SCHEMA_VERSION
        )));
    }
    let mut blueprint = snapshot.blueprint;
    blueprint.normalize();
    Ok(blueprint)
}

/// Load the snapshot of a module directory (`<module_dir>/module.json`)
pub fn load_snapshot(module_dir: impl AsRef<Path>) -> EngineResult<Blueprint> {
    let path = module_dir.as_ref().join(SNAPSHOT_FILE);
    let json = std::fs::read_to_string(&path).map_err(|e| EngineError::FileRead {
        path: path.clone(),
        message: e.to_string(),
    })?;
    snapshot_from_str(&json)
}

/// Write a snapshot directly; generation runs go through the staged writer
pub fn save_snapshot(blueprint: &Blueprint, module_dir: impl AsRef<Path>) -> EngineResult<()> {
    let dir = module_dir.as_ref();
    if !dir.exists() {
        std::fs::create_dir_all(dir).map_err(|e| EngineError::DirectoryCreate {
            path: dir.to_path_buf(),
            message: e.to_string(),
        })?;
    }
    let path = dir.join(SNAPSHOT_FILE);
    std::fs::write(&path, snapshot_to_string(blueprint)?).map_err(|e| EngineError::FileWrite {
        path,
        message: e.to_string(),
    })
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entity::Entity;
    use crate::field::Field;
    use crate::relationship::Relationship;
    use blueprint_core::FieldType;
    use tempfile::tempdir;

    fn sample() -> Blueprint {
        Blueprint::new("Inventory")
            .with_entity(Entity::new("Warehouse").with_field(Field::new("name", FieldType::String)))
            .with_entity(
                Entity::new("Location").with_field(Field::new("code", FieldType::String).unique()),
            )
            .with_relationship(Relationship::one_to_many("Warehouse", "Location"))
    }

    #[test]
    fn test_save_and_load_snapshot() {
        let dir = tempdir().unwrap();
        let module_dir = dir.path().join("Modules/Inventory");
        save_snapshot(&sample(), &module_dir).unwrap();

        let loaded = load_snapshot(&module_dir).unwrap();
        assert_eq!(loaded, sample());
    }

    #[test]
    fn test_snapshot_string_is_versioned() {
        let json = snapshot_to_string(&sample()).unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value["schemaVersion"], SCHEMA_VERSION);
        assert_eq!(value["blueprint"]["module"], "Inventory");
    }

    #[test]
    fn test_newer_snapshot_rejected() {
        let json = r#"{"schemaVersion": 99, "blueprint": {"module": "Inventory"}}"#;
        assert!(matches!(
            snapshot_from_str(json),
            Err(EngineError::InvalidConfig(_))
        ));
    }

    #[test]
    fn test_load_missing_snapshot() {
        let dir = tempdir().unwrap();
        let err = load_snapshot(dir.path()).unwrap_err();
        assert!(err.is_io());
    }

    #[test]
    fn test_parse_config_rejects_malformed_json() {
        let err = parse_config("{ not json").unwrap_err();
        assert!(matches!(err, EngineError::InvalidConfig(_)));
    }

    #[test]
    fn test_parse_config_with_computed_attributes() {
        let blueprint = parse_config(
            r#"{
                "entities": {
                    "ProductBatch": {
                        "fields": [
                            { "name": "current_quantity", "type": "decimal" },
                            { "name": "unit_cost", "type": "decimal" }
                        ],
                        "computed": [
                            { "name": "total_value", "expression": "current_quantity * unit_cost" }
                        ]
                    }
                }
            }"#,
        )
        .unwrap();
        let batch = &blueprint.entities[0];
        assert_eq!(batch.computed.len(), 1);
        assert_eq!(batch.computed[0].columns().unwrap(), vec!["current_quantity", "unit_cost"]);
    }

    #[test]
    fn test_load_config_from_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("inventory.json");
        std::fs::write(
            &path,
            r#"{"module": "inventory", "entities": {"Unit": {"fields": [{"name": "symbol", "type": "string"}]}}}"#,
        )
        .unwrap();
        let blueprint = load_config(&path).unwrap();
        assert_eq!(blueprint.module, "Inventory");
        assert_eq!(blueprint.entities[0].table_name, "units");
    }
}
