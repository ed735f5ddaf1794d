//! # Generation Context
//!
//! The `GenerationContext` holds everything the emitters need to produce a
//! module. It is built once per run from a `Blueprint` and passed by
//! reference to every emitter:
//!
//! - Module metadata (name, namespace, directory)
//! - Entities in dependency order, plus the entities force-placed on a cycle
//! - Resolved relationship accessors per entity
//! - Computed attributes compiled to PHP
//! - The migration timestamp
//!
//! `EntityInfo` wraps one entity with the context and answers the naming
//! and path questions the emitters ask about it.

use crate::GeneratorConfig;
use crate::foreign_keys;
use crate::resolver::{self, RelationMethod};
use crate::sorter;
use blueprint_core::{Cardinality, EngineResult, FieldType};
use blueprint_core::naming;
use blueprint_ir::{Blueprint, Entity, Field, PermissionConfig};
use chrono::NaiveDateTime;
use std::collections::HashMap;
use std::path::PathBuf;

// ============================================================================
// GenerationContext
// ============================================================================

/// Context carrying all information needed for code generation
#[derive(Debug, Clone)]
pub struct GenerationContext {
    /// Normalized blueprint
    pub blueprint: Blueprint,

    /// Generator configuration
    pub config: GeneratorConfig,

    /// Entity names in dependency order
    order: Vec<String>,

    /// Entities placed despite unmet dependencies
    pub forced: Vec<String>,

    /// Entity name → relationship accessors
    relations: HashMap<String, Vec<RelationMethod>>,

    /// Entity name → computed attributes
    computed: HashMap<String, Vec<ComputedAttribute>>,

    /// Timestamp used for migration file names
    pub timestamp: NaiveDateTime,
}

impl GenerationContext {
    // ====================================================================
    // Construction
    // ====================================================================

    /// Sort entities, resolve relationship accessors and fix the timestamp
    pub fn new(blueprint: &Blueprint, config: &GeneratorConfig) -> EngineResult<Self> {
        let mut blueprint = blueprint.clone();
        blueprint.normalize();

        let outcome = sorter::dependency_order(&blueprint, config.cycle_policy)?;
        let relations = resolver::resolve_all(&blueprint)?;
        let computed = compile_computed(&blueprint)?;
        let timestamp = config
            .timestamp
            .unwrap_or_else(|| chrono::Local::now().naive_local());

        Ok(Self {
            blueprint,
            config: config.clone(),
            order: outcome.order,
            forced: outcome.forced,
            relations,
            computed,
            timestamp,
        })
    }

    // ====================================================================
    // Module
    // ====================================================================

    /// Module name (e.g. "Inventory")
    pub fn module(&self) -> &str {
        &self.blueprint.module
    }

    /// snake_case module name
    pub fn module_snake(&self) -> String {
        self.blueprint.module_snake()
    }

    /// PHP namespace of the module (e.g. `Modules\Inventory`)
    pub fn namespace(&self) -> String {
        format!("{}\\{}", self.config.namespace_root(), self.module())
    }

    /// Module directory relative to the app root
    pub fn module_dir(&self) -> PathBuf {
        self.config.module_rel_dir(self.module())
    }

    /// Path of a file inside the module directory
    pub fn module_path(&self, rel: &str) -> PathBuf {
        self.module_dir().join(rel)
    }

    /// Module-level seeder class (e.g. "InventoryDatabaseSeeder")
    pub fn module_seeder_class(&self) -> String {
        format!("{}DatabaseSeeder", self.module())
    }

    /// Permission seeder class (e.g. "InventoryPermissionSeeder")
    pub fn permission_seeder_class(&self) -> String {
        format!("{}PermissionSeeder", self.module())
    }

    /// Permission block, if the blueprint has one
    pub fn permissions(&self) -> Option<&PermissionConfig> {
        self.blueprint.permissions.as_ref()
    }

    // ====================================================================
    // Entities
    // ====================================================================

    /// Entities in dependency order (referenced first)
    pub fn entities(&self) -> Vec<EntityInfo<'_>> {
        self.order
            .iter()
            .enumerate()
            .filter_map(|(i, name)| {
                self.blueprint
                    .entity(name)
                    .map(|entity| EntityInfo::new(self, entity, i))
            })
            .collect()
    }

    /// Entity names in dependency order
    pub fn order(&self) -> &[String] {
        &self.order
    }

    /// Get an entity by name
    pub fn entity(&self, name: &str) -> Option<EntityInfo<'_>> {
        let position = self.order.iter().position(|n| n == name)?;
        let entity = self.blueprint.entity(name)?;
        Some(EntityInfo::new(self, entity, position))
    }

    /// Relationship accessors of an entity
    pub fn relations(&self, entity: &str) -> &[RelationMethod] {
        self.relations
            .get(entity)
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    /// Computed attributes of an entity
    pub fn computed(&self, entity: &str) -> &[ComputedAttribute] {
        self.computed
            .get(entity)
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    // ====================================================================
    // Migrations
    // ====================================================================

    /// Date part of migration names (`YYYY_MM_DD`)
    pub fn migration_date(&self) -> String {
        self.timestamp.format("%Y_%m_%d").to_string()
    }

    /// Migration file name for the n-th migration (1-based) of the module
    pub fn migration_file_name(&self, sequence: usize, table: &str) -> String {
        format!(
            "{}_{:06}_create_{}_table.php",
            self.migration_date(),
            sequence,
            table
        )
    }
}

// ============================================================================
// Computed attributes
// ============================================================================

/// A computed attribute with its expression rendered for the model accessor
/// and for generated tests
#[derive(Debug, Clone, PartialEq)]
pub struct ComputedAttribute {
    /// snake_case name, also the appended model attribute
    pub name: String,
    /// camelCase JSON:API attribute and accessor method name
    pub attribute: String,
    /// Expression as declared
    pub expression: String,
    /// Expression over `$this` (e.g. `$this->quantity - $this->reserved_quantity`)
    pub accessor_php: String,
    /// Same expression over a `$model` variable
    pub model_php: String,
    pub field_type: FieldType,
}

fn compile_computed(blueprint: &Blueprint) -> EngineResult<HashMap<String, Vec<ComputedAttribute>>> {
    let mut compiled = HashMap::new();
    for entity in &blueprint.entities {
        let attributes = entity
            .computed
            .iter()
            .map(|c| {
                Ok(ComputedAttribute {
                    name: c.name.clone(),
                    attribute: c.attribute(),
                    expression: c.expression.clone(),
                    accessor_php: c.to_php("$this")?,
                    model_php: c.to_php("$model")?,
                    field_type: c.result_type(entity)?,
                })
            })
            .collect::<EngineResult<Vec<_>>>()?;
        if !attributes.is_empty() {
            compiled.insert(entity.name.clone(), attributes);
        }
    }
    Ok(compiled)
}

// ============================================================================
// EntityInfo
// ============================================================================

/// One entity seen through the generation context
#[derive(Debug, Clone, Copy)]
pub struct EntityInfo<'a> {
    pub ctx: &'a GenerationContext,
    pub entity: &'a Entity,

    /// Position in dependency order (0-based)
    pub position: usize,
}

impl<'a> EntityInfo<'a> {
    pub fn new(ctx: &'a GenerationContext, entity: &'a Entity, position: usize) -> Self {
        Self {
            ctx,
            entity,
            position,
        }
    }

    // ── names ──────────────────────────────────────────────────────────

    pub fn name(&self) -> &'a str {
        &self.entity.name
    }

    pub fn table(&self) -> &'a str {
        &self.entity.table_name
    }

    /// JSON:API resource type (e.g. "sales-orders")
    pub fn resource_type(&self) -> String {
        self.entity.resource_type()
    }

    /// Plural StudlyCase name (e.g. "SalesOrders")
    pub fn plural_studly(&self) -> String {
        self.entity.plural_studly()
    }

    /// Fully qualified model class
    pub fn model_fqcn(&self) -> String {
        format!("{}\\Models\\{}", self.ctx.namespace(), self.name())
    }

    // ── columns ────────────────────────────────────────────────────────

    pub fn computed(&self) -> &'a [ComputedAttribute] {
        self.ctx.computed(self.name())
    }

    /// Declared fields plus relationship foreign keys not declared as fields
    pub fn columns(&self) -> Vec<Field> {
        let mut columns = self.entity.fields.clone();
        for rel in &self.ctx.blueprint.relationships {
            if rel.foreign_key_holder() != Some(self.name()) {
                continue;
            }
            if let Some(mut field) = rel.foreign_key_field() {
                if !columns.iter().any(|c| c.name == field.name) {
                    field.unique = rel.cardinality == Cardinality::OneToOne;
                    columns.push(field);
                }
            }
        }
        columns
    }

    /// Mass-assignable attributes; every column when not restricted
    pub fn fillable(&self) -> Vec<String> {
        match &self.entity.fillable {
            Some(list) => list.clone(),
            None => self.columns().into_iter().map(|c| c.name).collect(),
        }
    }

    /// Table a foreign-key column references
    pub fn referenced_table(&self, field: &Field) -> Option<String> {
        if !field.is_foreign_key() {
            return None;
        }
        foreign_keys::referenced_table(&self.ctx.blueprint, self.entity, field)
    }

    /// Entity of this module a foreign-key column references
    pub fn referenced_entity(&self, field: &Field) -> Option<&'a Entity> {
        if !field.is_foreign_key() {
            return None;
        }
        foreign_keys::referenced_entity(&self.ctx.blueprint, self.entity, field)
    }

    /// Relationship accessors of this entity
    pub fn relations(&self) -> &'a [RelationMethod] {
        self.ctx.relations(self.name())
    }

    // ── permissions ────────────────────────────────────────────────────

    /// Permission name guarding `action`, when the module has permissions
    /// covering this entity's table
    pub fn permission(&self, action: &str) -> Option<String> {
        let perms = self.ctx.permissions()?;
        if !perms.resources.iter().any(|r| r == self.table()) {
            return None;
        }
        Some(perms.permission_name(self.table(), action))
    }

    // ── paths ──────────────────────────────────────────────────────────

    pub fn model_path(&self) -> PathBuf {
        self.ctx
            .module_path(&format!("app/Models/{}.php", self.name()))
    }

    pub fn factory_path(&self) -> PathBuf {
        self.ctx
            .module_path(&format!("Database/Factories/{}Factory.php", self.name()))
    }

    pub fn seeder_path(&self) -> PathBuf {
        self.ctx
            .module_path(&format!("Database/Seeders/{}Seeder.php", self.name()))
    }

    /// JSON:API class file (`suffix` is "Schema", "Resource", "Authorizer" or "Request")
    pub fn json_api_path(&self, suffix: &str) -> PathBuf {
        self.ctx.module_path(&format!(
            "app/JsonApi/V1/{}/{}{}.php",
            self.plural_studly(),
            self.name(),
            suffix
        ))
    }

    pub fn controller_path(&self) -> PathBuf {
        self.ctx.module_path(&format!(
            "app/Http/Controllers/Api/V1/{}Controller.php",
            self.name()
        ))
    }

    /// Feature test file (`action` is "Index", "Show", "Store", "Update" or "Destroy")
    pub fn test_path(&self, action: &str) -> PathBuf {
        self.ctx
            .module_path(&format!("Tests/Feature/{}{}Test.php", self.name(), action))
    }

    /// snake_case singular (e.g. "sales_order")
    pub fn snake(&self) -> String {
        naming::snake(self.name())
    }
}

// ============================================================================
// Tests
// ============================================================================
