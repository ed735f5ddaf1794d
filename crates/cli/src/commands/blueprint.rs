//! `module:blueprint` and `module:advanced-blueprint`

use super::print_warnings;
use crate::Session;
use anyhow::{Context, Result};
use blueprint_codegen::{Generator, summarize};
use blueprint_core::naming;
use blueprint_ir::{Blueprint, Entity, LinePrompter, collect_blueprint, load_config, parse_fields};
use clap::Args;
use std::path::PathBuf;

#[derive(Debug, Args)]
pub struct BlueprintArgs {
    /// Module name (e.g. Inventory)
    pub name: String,

    /// Fields as name:type[:nullable][:unique],...
    pub fields: String,

    /// Entity name (defaults to the singular module name)
    #[arg(long)]
    pub model: Option<String>,

    /// Table name (defaults to the plural snake_case entity name)
    #[arg(long)]
    pub table: Option<String>,

    /// Overwrite existing files
    #[arg(long)]
    pub force: bool,

    /// Place entities on foreign-key cycles instead of failing
    #[arg(long)]
    pub allow_cycles: bool,
}

impl BlueprintArgs {
    /// Blueprint with the single entity described on the command line
    pub fn blueprint(&self) -> Result<Blueprint> {
        let module = naming::pascal(&self.name);
        let model = match &self.model {
            Some(model) => naming::pascal(model),
            None => naming::pascal(&naming::singularize(&naming::snake(&module))),
        };

        let mut entity = Entity::new(model);
        if let Some(table) = &self.table {
            entity = entity.with_table_name(table.clone());
        }
        entity.fields = parse_fields(&self.fields)?;

        Ok(Blueprint::new(module).with_entity(entity))
    }

    pub fn run(&self, session: &Session) -> Result<()> {
        let blueprint = self.blueprint()?;
        generate(session, &blueprint, self.force, self.allow_cycles)
    }
}

#[derive(Debug, Args)]
pub struct AdvancedBlueprintArgs {
    /// Module name; overrides the config's `module`
    pub module: String,

    /// JSON config with entities, relationships and permissions
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Overwrite existing files
    #[arg(long)]
    pub force: bool,

    /// Place entities on foreign-key cycles instead of failing
    #[arg(long)]
    pub allow_cycles: bool,
}

impl AdvancedBlueprintArgs {
    pub fn run(&self, session: &Session) -> Result<()> {
        let blueprint = match &self.config {
            Some(path) => {
                let mut blueprint = load_config(path)
                    .with_context(|| format!("Cannot load config '{}'", path.display()))?;
                rename_module(&mut blueprint, &self.module);
                blueprint
            }
            None => collect_blueprint(&mut LinePrompter::stdio(), &self.module)?,
        };
        generate(session, &blueprint, self.force, self.allow_cycles)
    }
}

/// Apply the module name given on the command line. A permission prefix
/// derived from the config's own module name follows the rename.
fn rename_module(blueprint: &mut Blueprint, module: &str) {
    let derived_prefix = blueprint.module_snake();
    blueprint.module = naming::pascal(module);
    if let Some(perms) = &mut blueprint.permissions {
        if perms.prefix == derived_prefix {
            perms.prefix.clear();
        }
    }
    blueprint.normalize();
}

fn generate(session: &Session, blueprint: &Blueprint, force: bool, allow_cycles: bool) -> Result<()> {
    let mut config = session.generator_config();
    if force {
        config = config.allow_overwrite();
    }
    if allow_cycles {
        config = config.allow_cycles();
    }

    let module = Generator::new(config)
        .generate_and_write(blueprint)
        .with_context(|| format!("Failed to generate module '{}'", blueprint.module))?;

    print_warnings(&module.warnings);
    println!("{}", summarize(&module).display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use blueprint_core::FieldType;
    use pretty_assertions::assert_eq;

    fn args(name: &str, fields: &str) -> BlueprintArgs {
        BlueprintArgs {
            name: name.to_string(),
            fields: fields.to_string(),
            model: None,
            table: None,
            force: false,
            allow_cycles: false,
        }
    }

    #[test]
    fn test_default_model_is_singular_module() {
        let blueprint = args("warehouses", "name:string").blueprint().unwrap();
        assert_eq!(blueprint.module, "Warehouses");
        assert_eq!(blueprint.entities[0].name, "Warehouse");
        assert_eq!(blueprint.entities[0].table_name, "warehouses");
    }

    #[test]
    fn test_model_and_table_overrides() {
        let mut args = args("Inventory", "code:string:unique,capacity:decimal:nullable");
        args.model = Some("stock_location".to_string());
        args.table = Some("inv_locations".to_string());

        let blueprint = args.blueprint().unwrap();
        let entity = &blueprint.entities[0];
        assert_eq!(entity.name, "StockLocation");
        assert_eq!(entity.table_name, "inv_locations");
        assert_eq!(entity.fields.len(), 2);
        assert!(entity.fields[0].unique);
        assert_eq!(entity.fields[1].field_type, FieldType::Decimal);
    }

    #[test]
    fn test_rename_module_moves_derived_prefix() {
        let mut blueprint = blueprint_ir::parse_config(
            r#"{ "module": "stock", "entities": { "Bin": {} }, "permissions": { "roles": ["admin"] } }"#,
        )
        .unwrap();
        rename_module(&mut blueprint, "warehouse_ops");
        assert_eq!(blueprint.module, "WarehouseOps");
        assert_eq!(blueprint.permissions.unwrap().prefix, "warehouse_ops");
    }

    #[test]
    fn test_rename_module_keeps_explicit_prefix() {
        let mut blueprint = blueprint_ir::parse_config(
            r#"{ "module": "stock", "entities": { "Bin": {} }, "permissions": { "prefix": "wms" } }"#,
        )
        .unwrap();
        rename_module(&mut blueprint, "Inventory");
        assert_eq!(blueprint.permissions.unwrap().prefix, "wms");
    }

    #[test]
    fn test_bad_field_spec() {
        assert!(args("Inventory", "code:money").blueprint().is_err());
    }
}
