//! Naming rules shared by the parser, resolver and emitters
//!
//! Case conversion is delegated to `heck`. Pluralization uses simple
//! English heuristics plus a short irregular/uncountable list and always
//! inflects the last word of a snake_case name ("sales_order" →
//! "sales_orders").

use heck::{ToKebabCase, ToLowerCamelCase, ToPascalCase, ToSnakeCase};

const IRREGULAR: &[(&str, &str)] = &[
    ("person", "people"),
    ("child", "children"),
    ("man", "men"),
    ("woman", "women"),
    ("foot", "feet"),
    ("tooth", "teeth"),
    ("goose", "geese"),
    ("mouse", "mice"),
    ("criterion", "criteria"),
    ("datum", "data"),
    ("medium", "media"),
    ("analysis", "analyses"),
];

const UNCOUNTABLE: &[&str] = &[
    "equipment",
    "information",
    "rice",
    "money",
    "species",
    "series",
    "fish",
    "sheep",
    "feedback",
    "metadata",
    "data",
    "media",
];

const F_TO_VES: &[(&str, &str)] = &[
    ("shelf", "shelves"),
    ("half", "halves"),
    ("leaf", "leaves"),
    ("knife", "knives"),
    ("life", "lives"),
    ("wife", "wives"),
    ("wolf", "wolves"),
    ("calf", "calves"),
    ("loaf", "loaves"),
    ("thief", "thieves"),
];

// ============================================================================
// Case conversion
// ============================================================================

/// `snake_case` (e.g. "SalesOrder" → "sales_order")
pub fn snake(name: &str) -> String {
    name.to_snake_case()
}

/// `StudlyCase` (e.g. "sales_order" → "SalesOrder")
pub fn pascal(name: &str) -> String {
    name.to_pascal_case()
}

/// `camelCase` (e.g. "SalesOrder" → "salesOrder")
pub fn camel(name: &str) -> String {
    name.to_lower_camel_case()
}

/// `kebab-case` (e.g. "SalesOrder" → "sales-order")
pub fn kebab(name: &str) -> String {
    name.to_kebab_case()
}

// ============================================================================
// Inflection
// ============================================================================

fn split_last(snake: &str) -> (&str, &str) {
    match snake.rfind('_') {
        Some(idx) => (&snake[..=idx], &snake[idx + 1..]),
        None => ("", snake),
    }
}

fn pluralize_word(word: &str) -> String {
    if word.is_empty() || UNCOUNTABLE.contains(&word) {
        return word.to_string();
    }
    if let Some((_, plural)) = IRREGULAR.iter().find(|(single, _)| *single == word) {
        return plural.to_string();
    }
    if let Some((_, plural)) = F_TO_VES.iter().find(|(single, _)| *single == word) {
        return plural.to_string();
    }
    if word.ends_with('s')
        || word.ends_with('x')
        || word.ends_with('z')
        || word.ends_with("ch")
        || word.ends_with("sh")
    {
        format!("{}es", word)
    } else if word.ends_with('y')
        && !word.ends_with("ey")
        && !word.ends_with("ay")
        && !word.ends_with("oy")
        && !word.ends_with("uy")
    {
        format!("{}ies", &word[..word.len() - 1])
    } else {
        format!("{}s", word)
    }
}

fn singularize_word(word: &str) -> String {
    if word.is_empty() || UNCOUNTABLE.contains(&word) {
        return word.to_string();
    }
    if let Some((single, _)) = IRREGULAR.iter().find(|(_, plural)| *plural == word) {
        return single.to_string();
    }
    if let Some((single, _)) = F_TO_VES.iter().find(|(_, plural)| *plural == word) {
        return single.to_string();
    }
    if let Some(stem) = word.strip_suffix("ies") {
        return format!("{}y", stem);
    }
    for suffix in ["ches", "shes", "sses", "xes", "zes", "tuses"] {
        if word.ends_with(suffix) {
            return word[..word.len() - 2].to_string();
        }
    }
    // "buses" → "bus", but "houses" → "house"
    if word.ends_with("uses") && !word.ends_with("ouses") {
        return word[..word.len() - 2].to_string();
    }
    if word.ends_with("ss") || word.ends_with("us") || word.ends_with("is") {
        return word.to_string();
    }
    match word.strip_suffix('s') {
        Some(stem) => stem.to_string(),
        None => word.to_string(),
    }
}

/// Pluralize a name; the result is snake_case ("ProductBatch" → "product_batches")
pub fn pluralize(word: &str) -> String {
    let s = snake(word);
    let (head, last) = split_last(&s);
    format!("{}{}", head, pluralize_word(last))
}

/// Singularize a name; the result is snake_case ("categories" → "category")
pub fn singularize(word: &str) -> String {
    let s = snake(word);
    let (head, last) = split_last(&s);
    format!("{}{}", head, singularize_word(last))
}

// ============================================================================
// Derived names
// ============================================================================

/// Entity name → table name (e.g. "ProductBatch" → "product_batches")
pub fn table_name(entity: &str) -> String {
    pluralize(&snake(entity))
}

/// Entity name → foreign key column (e.g. "Warehouse" → "warehouse_id")
pub fn foreign_key_for(entity: &str) -> String {
    format!("{}_id", snake(entity))
}

/// Entity name → plural StudlyCase (e.g. "Category" → "Categories")
pub fn plural_studly(entity: &str) -> String {
    pascal(&pluralize(entity))
}

/// Entity name → JSON:API resource type (e.g. "SalesOrder" → "sales-orders")
pub fn resource_type(entity: &str) -> String {
    kebab(&pluralize(entity))
}

/// Pivot table for a many-to-many pair; order-independent
pub fn pivot_table(a: &str, b: &str) -> String {
    let mut parts = [snake(a), snake(b)];
    parts.sort();
    parts.join("_")
}

/// Whether `name` is a valid PHP/SQL identifier
pub fn is_identifier(name: &str) -> bool {
    let mut chars = name.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || c == '_' => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_case_conversion() {
        assert_eq!(snake("SalesOrder"), "sales_order");
        assert_eq!(pascal("sales_order"), "SalesOrder");
        assert_eq!(camel("SalesOrder"), "salesOrder");
        assert_eq!(kebab("SalesOrder"), "sales-order");
    }

    #[test]
    fn test_pluralize() {
        assert_eq!(pluralize("warehouse"), "warehouses");
        assert_eq!(pluralize("category"), "categories");
        assert_eq!(pluralize("address"), "addresses");
        assert_eq!(pluralize("batch"), "batches");
        assert_eq!(pluralize("key"), "keys");
        assert_eq!(pluralize("status"), "statuses");
        assert_eq!(pluralize("box"), "boxes");
    }

    #[test]
    fn test_pluralize_last_word_only() {
        assert_eq!(pluralize("ProductBatch"), "product_batches");
        assert_eq!(pluralize("SalesOrderItem"), "sales_order_items");
        assert_eq!(pluralize("StockCategory"), "stock_categories");
    }

    #[test]
    fn test_pluralize_irregular_and_uncountable() {
        assert_eq!(pluralize("Person"), "people");
        assert_eq!(pluralize("SalesPerson"), "sales_people");
        assert_eq!(pluralize("shelf"), "shelves");
        assert_eq!(pluralize("equipment"), "equipment");
    }

    #[test]
    fn test_singularize() {
        assert_eq!(singularize("categories"), "category");
        assert_eq!(singularize("product_batches"), "product_batch");
        assert_eq!(singularize("warehouses"), "warehouse");
        assert_eq!(singularize("people"), "person");
        assert_eq!(singularize("shelves"), "shelf");
        assert_eq!(singularize("addresses"), "address");
        assert_eq!(singularize("status"), "status");
    }

    #[test]
    fn test_singularize_uses_endings() {
        assert_eq!(singularize("buses"), "bus");
        assert_eq!(singularize("campuses"), "campus");
        assert_eq!(singularize("statuses"), "status");
        assert_eq!(singularize("houses"), "house");
        assert_eq!(singularize("purchases"), "purchase");
        assert_eq!(singularize("warehouses"), "warehouse");
    }

    #[test]
    fn test_derived_names() {
        assert_eq!(table_name("ProductBatch"), "product_batches");
        assert_eq!(foreign_key_for("SalesOrder"), "sales_order_id");
        assert_eq!(plural_studly("Category"), "Categories");
        assert_eq!(resource_type("SalesOrder"), "sales-orders");
    }

    #[test]
    fn test_pivot_table_is_order_independent() {
        assert_eq!(pivot_table("Product", "Tag"), "product_tag");
        assert_eq!(pivot_table("Tag", "Product"), "product_tag");
        assert_eq!(pivot_table("Warehouse", "Supplier"), "supplier_warehouse");
    }

    #[test]
    fn test_is_identifier() {
        assert!(is_identifier("warehouse_id"));
        assert!(is_identifier("_hidden"));
        assert!(!is_identifier("1st"));
        assert!(!is_identifier("name-with-dash"));
        assert!(!is_identifier(""));
    }
}
