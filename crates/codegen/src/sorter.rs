//! Dependency ordering of entities
//!
//! Migrations must create referenced tables before the tables holding
//! foreign keys to them. Placement is greedy: each pass places the first
//! remaining entity (in declaration order) whose dependencies are all
//! placed, so unrelated entities keep their declaration order.

use crate::foreign_keys;
use blueprint_core::{EngineError, EngineResult};
use blueprint_ir::Blueprint;
use std::collections::HashSet;
use tracing::warn;

/// What to do when no remaining entity can be placed
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum CyclePolicy {
    /// Fail with `DependencyCycle`
    #[default]
    Fail,
    /// Place the first remaining entity anyway and record it
    ForcePlace,
}

/// Result of a sort
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SortOutcome {
    /// Entity names in migration order
    pub order: Vec<String>,

    /// Entities placed before all of their dependencies
    pub forced: Vec<String>,
}

/// Entities `entity` must come after
///
/// Non-many-to-many relationships naming `entity` as the foreign-key holder
/// contribute their owning side; `*_id` fields contribute the entity whose
/// table they reference. External tables and self references are ignored.
pub fn dependencies_of(blueprint: &Blueprint, entity: &str) -> EngineResult<Vec<String>> {
    let current = blueprint.require_entity(entity)?;
    let mut deps: Vec<String> = Vec::new();
    let mut push = |name: &str| {
        if name != entity && !deps.iter().any(|d| d == name) {
            deps.push(name.to_string());
        }
    };

    for rel in &blueprint.relationships {
        if rel.is_many_to_many() || rel.entity_b != entity {
            continue;
        }
        blueprint.require_entity(&rel.entity_a)?;
        push(&rel.entity_a);
    }

    for field in current.foreign_keys() {
        if let Some(target) = foreign_keys::referenced_entity(blueprint, current, field) {
            push(&target.name);
        }
    }

    Ok(deps)
}

/// Order entities so referenced entities precede their dependents
pub fn dependency_order(blueprint: &Blueprint, policy: CyclePolicy) -> EngineResult<SortOutcome> {
    for rel in &blueprint.relationships {
        blueprint.require_entity(&rel.entity_a)?;
        blueprint.require_entity(&rel.entity_b)?;
    }

    let mut graph: Vec<(String, Vec<String>)> = Vec::with_capacity(blueprint.entities.len());
    for entity in &blueprint.entities {
        graph.push((entity.name.clone(), dependencies_of(blueprint, &entity.name)?));
    }

    let n = graph.len();
    let mut placed: HashSet<String> = HashSet::with_capacity(n);
    let mut remaining: Vec<(String, Vec<String>)> = graph;
    let mut outcome = SortOutcome::default();

    for _ in 0..(2 * n) {
        if remaining.is_empty() {
            break;
        }

        let ready = remaining
            .iter()
            .position(|(_, deps)| deps.iter().all(|d| placed.contains(d)));

        let idx = match (ready, policy) {
            (Some(idx), _) => idx,
            (None, CyclePolicy::Fail) => {
                return Err(EngineError::DependencyCycle(find_cycle(&remaining, &placed)));
            }
            (None, CyclePolicy::ForcePlace) => {
                let (name, deps) = &remaining[0];
                let missing: Vec<&str> = deps
                    .iter()
                    .filter(|d| !placed.contains(*d))
                    .map(String::as_str)
                    .collect();
                warn!(
                    entity = %name,
                    missing = ?missing,
                    "Dependency cycle; placing entity before its dependencies"
                );
                outcome.forced.push(name.clone());
                0
            }
        };

        let (name, _) = remaining.remove(idx);
        placed.insert(name.clone());
        outcome.order.push(name);
    }

    // Unreachable with one placement per pass, kept so every entity appears once
    for (name, _) in remaining {
        outcome.forced.push(name.clone());
        outcome.order.push(name);
    }

    Ok(outcome)
}

/// Walk unplaced dependencies from the first remaining entity until a name
/// repeats; every remaining entity has one, so the walk closes a cycle
fn find_cycle(remaining: &[(String, Vec<String>)], placed: &HashSet<String>) -> Vec<String> {
    let Some((start, _)) = remaining.first() else {
        return Vec::new();
    };
    let mut path: Vec<String> = vec![start.clone()];
    let mut current = start.clone();

    loop {
        let next = remaining
            .iter()
            .find(|(name, _)| *name == current)
            .and_then(|(_, deps)| deps.iter().find(|d| !placed.contains(*d)))
            .cloned();

        let Some(next) = next else {
            return path;
        };

        if let Some(pos) = path.iter().position(|p| *p == next) {
            let mut cycle = path.split_off(pos);
            cycle.push(next);
            return cycle;
        }

        path.push(next.clone());
        current = next;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use blueprint_ir::{Entity, Field, FieldType, Relationship};
    use pretty_assertions::assert_eq;

    fn position(order: &[String], name: &str) -> usize {
        order.iter().position(|n| n == name).unwrap()
    }

    #[test]
    fn test_relationship_dependencies() {
        // Declared dependents first to force reordering
        let blueprint = Blueprint::new("Inventory")
            .with_entity(Entity::new("StockLevel"))
            .with_entity(Entity::new("Location"))
            .with_entity(Entity::new("Warehouse"))
            .with_relationship(Relationship::one_to_many("Warehouse", "Location"))
            .with_relationship(Relationship::one_to_many("Location", "StockLevel"));

        let outcome = dependency_order(&blueprint, CyclePolicy::Fail).unwrap();
        assert_eq!(outcome.order, vec!["Warehouse", "Location", "StockLevel"]);
        assert!(outcome.forced.is_empty());
    }

    #[test]
    fn test_field_dependencies_use_table_names() {
        let blueprint = Blueprint::new("Sales")
            .with_entity(
                Entity::new("OrderItem")
                    .with_field(Field::new("sales_order_id", FieldType::Integer))
                    .with_field(Field::new("product_id", FieldType::Integer)),
            )
            .with_entity(Entity::new("SalesOrder").with_field(Field::new("customer_id", FieldType::Integer)))
            .with_entity(Entity::new("Customer"));

        let outcome = dependency_order(&blueprint, CyclePolicy::Fail).unwrap();
        assert!(position(&outcome.order, "Customer") < position(&outcome.order, "SalesOrder"));
        assert!(position(&outcome.order, "SalesOrder") < position(&outcome.order, "OrderItem"));
    }

    #[test]
    fn test_external_and_self_references_are_satisfied() {
        let blueprint = Blueprint::new("Catalog")
            .with_entity(
                Entity::new("Category")
                    .with_field(Field::new("user_id", FieldType::Integer))
                    .with_field(Field::new("category_id", FieldType::Integer).nullable()),
            )
            .with_relationship(Relationship::one_to_many("Category", "Category"));

        let outcome = dependency_order(&blueprint, CyclePolicy::Fail).unwrap();
        assert_eq!(outcome.order, vec!["Category"]);
    }

    #[test]
    fn test_many_to_many_is_ignored() {
        let blueprint = Blueprint::new("Catalog")
            .with_entity(Entity::new("Tag"))
            .with_entity(Entity::new("Product"))
            .with_relationship(Relationship::many_to_many("Product", "Tag"));

        let outcome = dependency_order(&blueprint, CyclePolicy::Fail).unwrap();
        assert_eq!(outcome.order, vec!["Tag", "Product"]);
    }

    #[test]
    fn test_cycle_fails_by_default() {
        let blueprint = Blueprint::new("Loop")
            .with_entity(Entity::new("Alpha"))
            .with_entity(Entity::new("Beta"))
            .with_entity(Entity::new("Gamma"))
            .with_relationship(Relationship::one_to_many("Alpha", "Beta"))
            .with_relationship(Relationship::one_to_many("Beta", "Alpha"));

        let err = dependency_order(&blueprint, CyclePolicy::Fail).unwrap_err();
        match err {
            EngineError::DependencyCycle(cycle) => {
                assert_eq!(cycle.first(), cycle.last());
                assert!(cycle.contains(&"Alpha".to_string()));
                assert!(cycle.contains(&"Beta".to_string()));
                assert!(!cycle.contains(&"Gamma".to_string()));
            }
            other => panic!("expected DependencyCycle, got {other:?}"),
        }
    }

    #[test]
    fn test_cycle_force_place_keeps_every_entity_once() {
        let blueprint = Blueprint::new("Loop")
            .with_entity(Entity::new("Alpha"))
            .with_entity(Entity::new("Beta"))
            .with_entity(Entity::new("Gamma"))
            .with_relationship(Relationship::one_to_many("Alpha", "Beta"))
            .with_relationship(Relationship::one_to_many("Beta", "Alpha"));

        let outcome = dependency_order(&blueprint, CyclePolicy::ForcePlace).unwrap();
        assert_eq!(outcome.order, vec!["Gamma", "Alpha", "Beta"]);
        assert_eq!(outcome.forced, vec!["Alpha"]);
    }

    #[test]
    fn test_orphan_relationship_is_entity_not_found() {
        let blueprint = Blueprint::new("Inventory")
            .with_entity(Entity::new("Location"))
            .with_relationship(Relationship::one_to_many("Warehouse", "Location"));

        let err = dependency_order(&blueprint, CyclePolicy::Fail).unwrap_err();
        assert!(matches!(err, EngineError::EntityNotFound(name) if name == "Warehouse"));
    }

    #[test]
    fn test_acyclic_orders_respect_every_edge() {
        let names = ["E", "D", "C", "B", "A"];
        let mut blueprint = Blueprint::new("Chain");
        for name in names {
            blueprint = blueprint.with_entity(Entity::new(name));
        }
        let edges = [("A", "B"), ("A", "C"), ("B", "D"), ("C", "D"), ("D", "E")];
        for (a, b) in edges {
            blueprint = blueprint.with_relationship(Relationship::one_to_many(a, b));
        }

        let outcome = dependency_order(&blueprint, CyclePolicy::Fail).unwrap();
        assert_eq!(outcome.order.len(), names.len());
        for (a, b) in edges {
            assert!(position(&outcome.order, a) < position(&outcome.order, b), "{a} before {b}");
        }
    }
}
