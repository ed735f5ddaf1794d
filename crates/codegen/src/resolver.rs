//! Relationship accessor resolution
//!
//! | cardinality  | owning side (entity_a)      | referenced side (entity_b)  |
//! |--------------|-----------------------------|-----------------------------|
//! | one-to-one   | hasOne, singular name       | belongsTo, singular name    |
//! | one-to-many  | hasMany, plural name        | belongsTo, singular name    |
//! | many-to-many | belongsToMany, plural name  | belongsToMany, plural name  |

use blueprint_core::naming;
use blueprint_core::{Cardinality, EngineError, EngineResult, ReferentialAction, RelationKind};
use blueprint_ir::{Blueprint, Relationship};
use serde::Serialize;
use std::collections::HashMap;

/// One accessor method on a model
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RelationMethod {
    /// camelCase method name (e.g. "locations")
    pub name: String,

    /// Eloquent relation kind
    pub kind: RelationKind,

    /// Related entity name
    pub related: String,

    /// Foreign key column (one-to-one / one-to-many)
    pub foreign_key: Option<String>,

    /// Pivot table (many-to-many)
    pub pivot_table: Option<String>,

    /// Pivot column pointing at this side (many-to-many)
    pub foreign_pivot_key: Option<String>,

    /// Pivot column pointing at the related side (many-to-many)
    pub related_pivot_key: Option<String>,

    /// On-delete action of the underlying relationship
    pub on_delete: ReferentialAction,
}

impl RelationMethod {
    /// Relation class name (e.g. `HasMany`)
    pub fn class_name(&self) -> &'static str {
        self.kind.class_name()
    }

    /// Whether the accessor returns a collection
    pub fn is_to_many(&self) -> bool {
        self.kind.is_to_many()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Side {
    Owning,
    Referenced,
}

fn singular_name(entity: &str) -> String {
    naming::camel(entity)
}

fn plural_name(entity: &str) -> String {
    naming::camel(&naming::pluralize(&naming::snake(entity)))
}

fn method_for(rel: &Relationship, side: Side) -> RelationMethod {
    let (this, other) = match side {
        Side::Owning => (&rel.entity_a, &rel.entity_b),
        Side::Referenced => (&rel.entity_b, &rel.entity_a),
    };

    let (kind, name) = match (rel.cardinality, side) {
        (Cardinality::OneToOne, Side::Owning) => (RelationKind::HasOne, singular_name(other)),
        (Cardinality::OneToMany, Side::Owning) => (RelationKind::HasMany, plural_name(other)),
        (Cardinality::OneToOne | Cardinality::OneToMany, Side::Referenced) => {
            (RelationKind::BelongsTo, singular_name(other))
        }
        (Cardinality::ManyToMany, _) => (RelationKind::BelongsToMany, plural_name(other)),
    };

    let pivot = rel.is_many_to_many();
    RelationMethod {
        name,
        kind,
        related: other.clone(),
        foreign_key: rel.foreign_key(),
        pivot_table: rel.pivot_table(),
        foreign_pivot_key: pivot.then(|| naming::foreign_key_for(this)),
        related_pivot_key: pivot.then(|| naming::foreign_key_for(other)),
        on_delete: rel.on_delete,
    }
}

/// Accessors `entity` gets from one relationship
///
/// A self-referencing relationship yields both sides.
pub fn resolve(rel: &Relationship, entity: &str) -> EngineResult<Vec<RelationMethod>> {
    let mut methods = Vec::new();
    if rel.entity_a == entity {
        methods.push(method_for(rel, Side::Owning));
    }
    if rel.entity_b == entity {
        methods.push(method_for(rel, Side::Referenced));
    }
    if methods.is_empty() {
        return Err(EngineError::EntityNotFound(format!(
            "{} (not part of relationship {})",
            entity,
            rel.display_label()
        )));
    }
    Ok(methods)
}

/// Every accessor of an entity, in relationship declaration order
pub fn methods_for(blueprint: &Blueprint, entity: &str) -> EngineResult<Vec<RelationMethod>> {
    blueprint.require_entity(entity)?;
    let mut methods: Vec<RelationMethod> = Vec::new();
    for rel in blueprint.relationships_for(entity) {
        blueprint.require_entity(&rel.entity_a)?;
        blueprint.require_entity(&rel.entity_b)?;
        for method in resolve(rel, entity)? {
            if methods.iter().any(|m| m.name == method.name) {
                return Err(EngineError::DuplicateRelationship {
                    from: entity.to_string(),
                    to: format!("{} (method '{}')", method.related, method.name),
                });
            }
            methods.push(method);
        }
    }
    Ok(methods)
}

/// Accessors of every entity, keyed by entity name
pub fn resolve_all(blueprint: &Blueprint) -> EngineResult<HashMap<String, Vec<RelationMethod>>> {
    blueprint
        .entities
        .iter()
        .map(|e| Ok((e.name.clone(), methods_for(blueprint, &e.name)?)))
        .collect()
}
