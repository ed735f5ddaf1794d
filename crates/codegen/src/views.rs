//! Serializable views handed to the stubs
//!
//! Stubs only see plain data: every name, path fragment, rule and PHP
//! expression is computed here so that overriding a stub never requires
//! re-implementing naming rules.

use crate::context::{ComputedAttribute, EntityInfo, GenerationContext};
use crate::resolver::RelationMethod;
use blueprint_core::naming;
use blueprint_core::{FieldType, ReferentialAction};
use blueprint_ir::Field;
use serde::Serialize;
use std::collections::BTreeSet;

// ============================================================================
// Module
// ============================================================================

#[derive(Debug, Clone, Serialize)]
pub struct ModuleView {
    pub name: String,
    pub snake: String,
    pub kebab: String,
    /// `Modules\Inventory`
    pub namespace: String,
    /// `Modules/Inventory`
    pub dir: String,
    pub seeder_class: String,
    pub permission_seeder_class: String,
    pub has_permissions: bool,
}

impl ModuleView {
    pub fn new(ctx: &GenerationContext) -> Self {
        Self {
            name: ctx.module().to_string(),
            snake: ctx.module_snake(),
            kebab: naming::kebab(ctx.module()),
            namespace: ctx.namespace(),
            dir: ctx.module_dir().to_string_lossy().replace('\\', "/"),
            seeder_class: ctx.module_seeder_class(),
            permission_seeder_class: ctx.permission_seeder_class(),
            has_permissions: ctx.permissions().is_some(),
        }
    }
}

// ============================================================================
// Fields
// ============================================================================

#[derive(Debug, Clone, Serialize)]
pub struct FieldView {
    /// Column name (snake_case)
    pub name: String,
    /// JSON:API attribute name (camelCase)
    pub attribute: String,
    pub label: String,
    #[serde(rename = "type")]
    pub field_type: String,
    pub migration_method: String,
    pub migration_args: String,
    pub nullable: bool,
    pub unique: bool,
    /// Plain validation rules (e.g. ["required", "string", "max:255"])
    pub rules: Vec<String>,
    pub schema_field: String,
    pub cast: Option<String>,
    /// PHP expression for factories
    pub faker: String,
    /// PHP expression for test payloads
    pub sample: String,
    /// PHP expression for update payloads
    pub update_sample: String,
    pub is_foreign_key: bool,
    /// Referenced table of a foreign key
    pub references: Option<String>,
    /// Referenced entity when it belongs to this module
    pub related: Option<String>,
    /// `cascadeOnDelete()` etc.
    pub on_delete: Option<String>,
    /// Whether the JSON representation equals the model attribute
    pub comparable: bool,
}

impl FieldView {
    pub fn new(info: &EntityInfo<'_>, field: &Field) -> Self {
        let references = info.referenced_table(field);
        // a self reference would make the factory recurse
        let related = info
            .referenced_entity(field)
            .filter(|e| e.name != info.name())
            .map(|e| e.name.clone());
        let self_reference = related.is_none() && references.as_deref() == Some(info.table());
        let external_user = references.as_deref() == Some("users") && related.is_none();

        let faker = match (&related, external_user) {
            (Some(entity), _) => format!("{}::factory()", entity),
            (None, true) => "User::factory()".to_string(),
            (None, false) if self_reference || (field.is_foreign_key() && field.nullable) => {
                "null".to_string()
            }
            (None, false) if field.is_foreign_key() => "fake()->numberBetween(1, 10)".to_string(),
            _ => field.field_type.faker(field.unique),
        };

        let sample = match (&related, external_user) {
            (Some(entity), _) => format!("{}::factory()->create()->getKey()", entity),
            (None, true) => "User::factory()->create()->getKey()".to_string(),
            (None, false) if self_reference || (field.is_foreign_key() && field.nullable) => {
                "null".to_string()
            }
            (None, false) if field.is_foreign_key() => "1".to_string(),
            _ => field.field_type.sample_literal().to_string(),
        };

        let update_sample = if field.is_foreign_key() {
            sample.clone()
        } else {
            update_literal(field.field_type).to_string()
        };

        let mut rules = vec![if field.nullable { "nullable" } else { "required" }.to_string()];
        if field.is_foreign_key() {
            rules.push("integer".to_string());
        } else {
            rules.extend(field.field_type.validation_rule().split('|').map(String::from));
        }

        Self {
            name: field.name.clone(),
            attribute: naming::camel(&field.name),
            label: field.display_label(),
            field_type: field.field_type.as_str().to_string(),
            migration_method: field.field_type.migration_method().to_string(),
            migration_args: field.field_type.migration_args().to_string(),
            nullable: field.nullable,
            unique: field.unique,
            rules,
            schema_field: field.field_type.schema_field().to_string(),
            cast: field.field_type.model_cast().map(String::from),
            faker,
            sample,
            update_sample,
            is_foreign_key: field.is_foreign_key() && references.is_some(),
            on_delete: references
                .as_ref()
                .and_then(|_| on_delete_for(info, field).migration_modifier())
                .map(String::from),
            comparable: !field.is_foreign_key()
                && matches!(
                    field.field_type,
                    FieldType::String
                        | FieldType::Text
                        | FieldType::Integer
                        | FieldType::Decimal
                        | FieldType::Boolean
                ),
            references,
            related,
        }
    }
}

/// Distinct value used when a test updates a resource
fn update_literal(field_type: FieldType) -> &'static str {
    match field_type {
        FieldType::String => "'Updated value'",
        FieldType::Text => "'Updated description text'",
        FieldType::Integer => "84",
        FieldType::Decimal => "51.25",
        FieldType::Boolean => "false",
        FieldType::Date => "'2024-02-20'",
        FieldType::DateTime => "'2024-02-20T12:00:00.000000Z'",
        FieldType::Json => "['key' => 'updated']",
    }
}

/// On-delete action of a foreign-key column: the relationship's when the
/// column belongs to one, otherwise the default
fn on_delete_for(info: &EntityInfo<'_>, field: &Field) -> ReferentialAction {
    info.ctx
        .blueprint
        .relationships
        .iter()
        .find(|r| {
            r.foreign_key_holder() == Some(info.name())
                && r.foreign_key().as_deref() == Some(field.name.as_str())
        })
        .map(|r| r.on_delete)
        .unwrap_or_else(|| {
            if field.nullable {
                ReferentialAction::SetNull
            } else {
                ReferentialAction::default()
            }
        })
}

// ============================================================================
// Relations
// ============================================================================

#[derive(Debug, Clone, Serialize)]
pub struct RelationView {
    pub name: String,
    /// Eloquent builder method (e.g. "hasMany")
    pub method: String,
    /// Relation class (e.g. "HasMany")
    pub class: String,
    pub related: String,
    pub related_resource_type: String,
    pub foreign_key: Option<String>,
    pub pivot_table: Option<String>,
    pub foreign_pivot_key: Option<String>,
    pub related_pivot_key: Option<String>,
    pub to_many: bool,
}

impl RelationView {
    pub fn new(method: &RelationMethod) -> Self {
        Self {
            name: method.name.clone(),
            method: method.kind.eloquent_method().to_string(),
            class: method.class_name().to_string(),
            related: method.related.clone(),
            related_resource_type: naming::resource_type(&method.related),
            foreign_key: method.foreign_key.clone(),
            pivot_table: method.pivot_table.clone(),
            foreign_pivot_key: method.foreign_pivot_key.clone(),
            related_pivot_key: method.related_pivot_key.clone(),
            to_many: method.is_to_many(),
        }
    }
}

// ============================================================================
// Permissions
// ============================================================================

/// Permission names guarding one entity's endpoints
#[derive(Debug, Clone, Serialize)]
pub struct PermissionView {
    pub view_any: String,
    pub view: String,
    pub create: String,
    pub update: String,
    pub delete: String,
}

impl PermissionView {
    pub fn new(info: &EntityInfo<'_>) -> Option<Self> {
        Some(Self {
            view_any: info.permission("viewAny")?,
            view: info.permission("view")?,
            create: info.permission("create")?,
            update: info.permission("update")?,
            delete: info.permission("delete")?,
        })
    }
}

// ============================================================================
// Computed attributes
// ============================================================================

#[derive(Debug, Clone, Serialize)]
pub struct ComputedView {
    pub name: String,
    pub attribute: String,
    #[serde(rename = "type")]
    pub field_type: String,
    pub expression: String,
    /// Accessor body expression over `$this`
    pub accessor_php: String,
    /// Expected value in tests, over `$model`
    pub model_php: String,
}

impl ComputedView {
    pub fn new(computed: &ComputedAttribute) -> Self {
        Self {
            name: computed.name.clone(),
            attribute: computed.attribute.clone(),
            field_type: computed.field_type.as_str().to_string(),
            expression: computed.expression.clone(),
            accessor_php: computed.accessor_php.clone(),
            model_php: computed.model_php.clone(),
        }
    }
}

// ============================================================================
// Sorting
// ============================================================================

/// Attribute the generated index test sorts by, with two ordered values
#[derive(Debug, Clone, Serialize)]
pub struct SortKeyView {
    pub attribute: String,
    pub column: String,
    /// PHP literal of the smaller value
    pub low: String,
    /// PHP literal of the larger value
    pub high: String,
}

impl SortKeyView {
    /// First required numeric or date column, falling back to `createdAt`
    fn pick(fields: &[FieldView]) -> Self {
        fields
            .iter()
            .filter(|f| !f.is_foreign_key && !f.nullable)
            .find_map(|f| {
                ordered(&f.field_type).map(|(low, high)| Self {
                    attribute: f.attribute.clone(),
                    column: f.name.clone(),
                    low: low.to_string(),
                    high: high.to_string(),
                })
            })
            .unwrap_or_else(|| Self {
                attribute: "createdAt".to_string(),
                column: "created_at".to_string(),
                low: "'2024-01-10 08:00:00'".to_string(),
                high: "'2024-02-20 08:00:00'".to_string(),
            })
    }
}

/// Two ascending PHP literals for a sortable type
fn ordered(field_type: &str) -> Option<(&'static str, &'static str)> {
    match field_type {
        "integer" => Some(("10", "20")),
        "decimal" => Some(("10.5", "20.5")),
        "date" => Some(("'2024-01-10'", "'2024-02-20'")),
        "datetime" => Some(("'2024-01-10 08:00:00'", "'2024-02-20 08:00:00'")),
        _ => None,
    }
}

// ============================================================================
// Entity
// ============================================================================

#[derive(Debug, Clone, Serialize)]
pub struct CastView {
    pub name: String,
    pub cast: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct EntityView {
    pub name: String,
    pub snake: String,
    pub camel: String,
    pub table: String,
    pub plural_studly: String,
    pub resource_type: String,
    pub model_fqcn: String,
    pub fields: Vec<FieldView>,
    pub fillable: Vec<String>,
    pub casts: Vec<CastView>,
    pub relations: Vec<RelationView>,
    /// Relation classes to import, sorted
    pub relation_classes: Vec<String>,
    /// JSON:API field classes to import, sorted
    pub schema_field_classes: Vec<String>,
    /// Module models a factory or test must import for foreign keys, sorted
    pub foreign_imports: Vec<String>,
    /// Whether a foreign key points at the host's user model
    pub uses_user_model: bool,
    pub permissions: Option<PermissionView>,
    pub has_required_fields: bool,
    /// Attributes exposed as sortable and filterable
    pub sortable: Vec<String>,
    pub sort_key: SortKeyView,
    pub computed: Vec<ComputedView>,
}

impl EntityView {
    pub fn new(info: &EntityInfo<'_>) -> Self {
        let columns = info.columns();
        let fields: Vec<FieldView> = columns.iter().map(|f| FieldView::new(info, f)).collect();
        let relations: Vec<RelationView> = info.relations().iter().map(RelationView::new).collect();

        let relation_classes: BTreeSet<String> =
            relations.iter().map(|r| r.class.clone()).collect();

        let computed: Vec<ComputedView> = info.computed().iter().map(ComputedView::new).collect();

        let mut schema_field_classes: BTreeSet<String> =
            fields.iter().map(|f| f.schema_field.clone()).collect();
        schema_field_classes.insert("DateTime".to_string());
        if !computed.is_empty() {
            schema_field_classes.insert("Number".to_string());
        }

        let namespace = info.ctx.namespace();
        let foreign_imports: BTreeSet<String> = fields
            .iter()
            .filter_map(|f| f.related.as_ref())
            .map(|entity| format!("{}\\Models\\{}", namespace, entity))
            .collect();
        let uses_user_model = fields.iter().any(|f| f.faker.starts_with("User::"));

        let casts = fields
            .iter()
            .filter_map(|f| {
                f.cast.as_ref().map(|c| CastView {
                    name: f.name.clone(),
                    cast: c.clone(),
                })
            })
            .collect();

        let sortable = fields
            .iter()
            .filter(|f| !f.is_foreign_key && f.field_type != "json")
            .map(|f| f.attribute.clone())
            .collect();
        let sort_key = SortKeyView::pick(&fields);

        Self {
            name: info.name().to_string(),
            snake: info.snake(),
            camel: info.entity.camel_name(),
            table: info.table().to_string(),
            plural_studly: info.plural_studly(),
            resource_type: info.resource_type(),
            model_fqcn: info.model_fqcn(),
            has_required_fields: fields.iter().any(|f| !f.nullable),
            fillable: info.fillable(),
            casts,
            relation_classes: relation_classes.into_iter().collect(),
            schema_field_classes: schema_field_classes.into_iter().collect(),
            foreign_imports: foreign_imports.into_iter().collect(),
            uses_user_model,
            permissions: PermissionView::new(info),
            fields,
            relations,
            sortable,
            sort_key,
            computed,
        }
    }
}

// ============================================================================
// Whole module
// ============================================================================

/// Module view plus every entity view, in dependency order
#[derive(Debug, Clone, Serialize)]
pub struct ModuleViews {
    pub module: ModuleView,
    pub entities: Vec<EntityView>,
}

impl ModuleViews {
    pub fn new(ctx: &GenerationContext) -> Self {
        Self {
            module: ModuleView::new(ctx),
            entities: ctx.entities().iter().map(EntityView::new).collect(),
        }
    }

    /// Entity views paired with their context entries
    pub fn pairs<'a>(
        &'a self,
        ctx: &'a GenerationContext,
    ) -> impl Iterator<Item = (EntityInfo<'a>, &'a EntityView)> {
        ctx.entities().into_iter().zip(self.entities.iter())
    }
}
