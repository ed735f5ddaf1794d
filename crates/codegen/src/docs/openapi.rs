//! OpenAPI 3.0 document covering every generated module
//!
//! Each entity contributes a collection path (`index`, `store`) and a member
//! path (`show`, `update`, `destroy`) under `/api/v1`, plus three schemas:
//! `<Entity>Attributes`, `<Entity>Resource` and `<Entity>Document`.

use super::load_module;
use crate::context::{EntityInfo, GenerationContext};
use crate::generator::discover_modules;
use crate::{GeneratorConfig, Transaction};
use blueprint_core::{EngineError, EngineResult, naming};
use blueprint_ir::Blueprint;
use serde_json::{Map, Value, json};
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Default output path, relative to the app root
pub const DEFAULT_OPENAPI_PATH: &str = "storage/api-docs/openapi.json";

const OPENAPI_VERSION: &str = "3.0.3";

/// Build the document for a set of module blueprints
pub fn build_openapi(blueprints: &[Blueprint], config: &GeneratorConfig) -> EngineResult<Value> {
    let mut paths = Map::new();
    let mut schemas = Map::new();
    let mut tags = Vec::new();

    schemas.insert("Errors".to_string(), errors_schema());

    for blueprint in blueprints {
        let ctx = GenerationContext::new(blueprint, config)?;
        tags.push(json!({
            "name": ctx.module(),
            "description": format!("{} module", ctx.module()),
        }));

        for info in ctx.entities() {
            let name = info.name();
            let collection = format!("/{}", info.resource_type());
            let member = format!("/{}/{{id}}", info.resource_type());

            paths.insert(collection, collection_item(&info));
            paths.insert(member, member_item(&info));
            schemas.insert(format!("{}Attributes", name), attributes_schema(&info));
            schemas.insert(format!("{}Resource", name), resource_schema(&info));
            schemas.insert(
                format!("{}Document", name),
                json!({
                    "type": "object",
                    "properties": {
                        "data": { "$ref": schema_ref(&format!("{}Resource", name)) }
                    }
                }),
            );
        }
    }

    Ok(json!({
        "openapi": OPENAPI_VERSION,
        "info": {
            "title": "Module API",
            "version": "1.0.0",
        },
        "servers": [{ "url": "/api/v1" }],
        "tags": tags,
        "security": [{ "sanctum": [] }],
        "paths": paths,
        "components": {
            "securitySchemes": {
                "sanctum": { "type": "http", "scheme": "bearer" }
            },
            "schemas": schemas,
        },
    }))
}

/// Aggregate every module snapshot and write the document to `output`
/// (relative to the app root). Returns the number of modules covered.
pub fn write_openapi(config: &GeneratorConfig, output: &Path) -> EngineResult<usize> {
    let modules = discover_modules(config);
    let mut blueprints = Vec::with_capacity(modules.len());
    for module in &modules {
        debug!(module = %module, "Reading module snapshot");
        blueprints.push(load_module(config, module)?);
    }

    let document = build_openapi(&blueprints, config)?;
    let mut content = serde_json::to_string_pretty(&document)?;
    content.push('\n');

    let rel = relative_output(config, output)?;
    let mut tx = Transaction::begin(&config.app_root)?;
    tx.stage(&rel, &content, true)?;
    tx.commit()?;

    info!(modules = modules.len(), path = %rel.display(), "OpenAPI document written");
    Ok(modules.len())
}

fn relative_output(config: &GeneratorConfig, output: &Path) -> EngineResult<PathBuf> {
    if output.is_relative() {
        return Ok(output.to_path_buf());
    }
    output
        .strip_prefix(&config.app_root)
        .map(Path::to_path_buf)
        .map_err(|_| {
            EngineError::InvalidConfig(format!(
                "OpenAPI output '{}' is outside the application root",
                output.display()
            ))
        })
}

// ============================================================================
// Paths
// ============================================================================

fn collection_item(info: &EntityInfo<'_>) -> Value {
    let name = info.name();
    let tag = info.ctx.module();
    json!({
        "get": {
            "tags": [tag],
            "summary": format!("List {}", info.plural_studly()),
            "operationId": format!("index{}", name),
            "parameters": query_parameters(info),
            "responses": with_errors(
                json!({
                    "200": {
                        "description": "Paginated collection",
                        "content": { "application/vnd.api+json": { "schema": {
                            "type": "object",
                            "properties": {
                                "data": {
                                    "type": "array",
                                    "items": { "$ref": schema_ref(&format!("{}Resource", name)) }
                                }
                            }
                        }}}
                    }
                }),
                &["401", "403"],
            ),
        },
        "post": {
            "tags": [tag],
            "summary": format!("Create a {}", name),
            "operationId": format!("store{}", name),
            "requestBody": document_body(name),
            "responses": with_errors(
                json!({ "201": document_response(name, "Created") }),
                &["401", "403", "422"],
            ),
        },
    })
}

fn member_item(info: &EntityInfo<'_>) -> Value {
    let name = info.name();
    let tag = info.ctx.module();
    json!({
        "parameters": [{
            "name": "id",
            "in": "path",
            "required": true,
            "schema": { "type": "string" },
        }],
        "get": {
            "tags": [tag],
            "summary": format!("Show a {}", name),
            "operationId": format!("show{}", name),
            "responses": with_errors(
                json!({ "200": document_response(name, "Resource") }),
                &["401", "403", "404"],
            ),
        },
        "patch": {
            "tags": [tag],
            "summary": format!("Update a {}", name),
            "operationId": format!("update{}", name),
            "requestBody": document_body(name),
            "responses": with_errors(
                json!({ "200": document_response(name, "Updated") }),
                &["401", "403", "404", "422"],
            ),
        },
        "delete": {
            "tags": [tag],
            "summary": format!("Delete a {}", name),
            "operationId": format!("destroy{}", name),
            "responses": with_errors(
                json!({ "204": { "description": "Deleted" } }),
                &["401", "403", "404"],
            ),
        },
    })
}

fn query_parameters(info: &EntityInfo<'_>) -> Value {
    let mut includes: Vec<String> = info.relations().iter().map(|r| r.name.clone()).collect();
    includes.sort();

    json!([
        {
            "name": "filter",
            "in": "query",
            "style": "deepObject",
            "explode": true,
            "schema": { "type": "object" },
            "description": "Filter by attribute, e.g. filter[id][]=1",
        },
        {
            "name": "sort",
            "in": "query",
            "schema": { "type": "string" },
            "description": "Comma-separated attributes, prefix with - for descending",
        },
        {
            "name": "page[size]",
            "in": "query",
            "schema": { "type": "integer", "minimum": 1 },
        },
        {
            "name": "page[number]",
            "in": "query",
            "schema": { "type": "integer", "minimum": 1 },
        },
        {
            "name": "include",
            "in": "query",
            "schema": { "type": "string" },
            "description": format!("Related resources: {}", if includes.is_empty() {
                "none".to_string()
            } else {
                includes.join(", ")
            }),
        },
    ])
}

fn document_body(name: &str) -> Value {
    json!({
        "required": true,
        "content": { "application/vnd.api+json": { "schema": { "$ref": schema_ref(&format!("{}Document", name)) } } }
    })
}

fn document_response(name: &str, description: &str) -> Value {
    json!({
        "description": description,
        "content": { "application/vnd.api+json": { "schema": { "$ref": schema_ref(&format!("{}Document", name)) } } }
    })
}

fn with_errors(mut responses: Value, statuses: &[&str]) -> Value {
    if let Some(map) = responses.as_object_mut() {
        for status in statuses {
            map.insert(status.to_string(), error_response(status));
        }
    }
    responses
}

fn error_response(status: &str) -> Value {
    let description = match status {
        "401" => "Unauthenticated",
        "403" => "Forbidden",
        "404" => "Not found",
        "422" => "Validation failed",
        _ => "Error",
    };
    json!({
        "description": description,
        "content": { "application/vnd.api+json": { "schema": { "$ref": schema_ref("Errors") } } }
    })
}

// ============================================================================
// Schemas
// ============================================================================

fn schema_ref(name: &str) -> String {
    format!("#/components/schemas/{}", name)
}

fn attributes_schema(info: &EntityInfo<'_>) -> Value {
    let mut properties = Map::new();
    let mut required = Vec::new();

    for column in info.columns() {
        let attribute = naming::camel(&column.name);
        let (kind, format) = column.field_type.openapi_type();
        let mut schema = Map::new();
        schema.insert("type".to_string(), json!(kind));
        if let Some(format) = format {
            schema.insert("format".to_string(), json!(format));
        }
        if column.nullable {
            schema.insert("nullable".to_string(), json!(true));
        } else {
            required.push(attribute.clone());
        }
        properties.insert(attribute, Value::Object(schema));
    }
    for computed in info.computed() {
        let (kind, format) = computed.field_type.openapi_type();
        let mut schema = Map::new();
        schema.insert("type".to_string(), json!(kind));
        if let Some(format) = format {
            schema.insert("format".to_string(), json!(format));
        }
        schema.insert("readOnly".to_string(), json!(true));
        properties.insert(computed.attribute.clone(), Value::Object(schema));
    }
    for stamp in ["createdAt", "updatedAt"] {
        properties.insert(
            stamp.to_string(),
            json!({ "type": "string", "format": "date-time", "readOnly": true }),
        );
    }

    json!({
        "type": "object",
        "required": required,
        "properties": properties,
    })
}

fn resource_schema(info: &EntityInfo<'_>) -> Value {
    json!({
        "type": "object",
        "required": ["type", "attributes"],
        "properties": {
            "type": { "type": "string", "enum": [info.resource_type()] },
            "id": { "type": "string", "readOnly": true },
            "attributes": { "$ref": schema_ref(&format!("{}Attributes", info.name())) },
        },
    })
}

fn errors_schema() -> Value {
    json!({
        "type": "object",
        "properties": {
            "errors": {
                "type": "array",
                "items": {
                    "type": "object",
                    "properties": {
                        "status": { "type": "string" },
                        "title": { "type": "string" },
                        "detail": { "type": "string" },
                        "source": {
                            "type": "object",
                            "properties": { "pointer": { "type": "string" } }
                        }
                    }
                }
            }
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Generator;
    use crate::test_support::{fixed_config, fixed_timestamp, inventory};
    use blueprint_core::FieldType;
    use blueprint_ir::{Entity, Field};
    use pretty_assertions::assert_eq;
    use tempfile::tempdir;

    fn document() -> Value {
        build_openapi(&[inventory()], &fixed_config()).unwrap()
    }

    #[test]
    fn test_document_header() {
        let doc = document();
        assert_eq!(doc["openapi"], "3.0.3");
        assert_eq!(doc["servers"][0]["url"], "/api/v1");
        assert_eq!(doc["tags"][0]["name"], "Inventory");
    }

    #[test]
    fn test_paths_per_entity() {
        let doc = document();
        let paths = doc["paths"].as_object().unwrap();
        assert_eq!(paths.len(), 10);
        assert!(paths.contains_key("/stock-levels"));
        assert!(paths.contains_key("/stock-levels/{id}"));

        let index = &doc["paths"]["/warehouses"]["get"];
        assert_eq!(index["operationId"], "indexWarehouse");
        assert!(index["responses"]["401"].is_object());
        assert_eq!(index["parameters"][2]["name"], "page[size]");

        let destroy = &doc["paths"]["/warehouses/{id}"]["delete"];
        assert!(destroy["responses"]["204"].is_object());
        assert!(destroy["responses"]["404"].is_object());
        assert!(doc["paths"]["/warehouses/{id}"]["patch"]["responses"]["422"].is_object());
    }

    #[test]
    fn test_attribute_schema() {
        let doc = document();
        let warehouse = &doc["components"]["schemas"]["WarehouseAttributes"];
        assert_eq!(warehouse["properties"]["capacity"]["type"], "number");
        assert_eq!(warehouse["properties"]["capacity"]["nullable"], true);
        assert_eq!(warehouse["required"], json!(["name", "code"]));

        let location = &doc["components"]["schemas"]["LocationAttributes"];
        assert_eq!(location["properties"]["warehouseId"]["type"], "integer");

        let product = &doc["components"]["schemas"]["ProductAttributes"];
        assert_eq!(product["properties"]["grossPrice"]["type"], "number");
        assert_eq!(product["properties"]["grossPrice"]["readOnly"], true);
        assert!(!product["required"].as_array().unwrap().contains(&json!("grossPrice")));

        let resource = &doc["components"]["schemas"]["StockLevelResource"];
        assert_eq!(resource["properties"]["type"]["enum"][0], "stock-levels");
    }

    #[test]
    fn test_multiple_modules() {
        let sales = Blueprint::new("Sales").with_entity(
            Entity::new("Customer").with_field(Field::new("email", FieldType::String).unique()),
        );
        let doc = build_openapi(&[inventory(), sales], &fixed_config()).unwrap();
        assert_eq!(doc["tags"].as_array().unwrap().len(), 2);
        assert!(doc["paths"]["/customers"].is_object());
    }

    #[test]
    fn test_write_openapi() {
        let dir = tempdir().unwrap();
        let config = GeneratorConfig::new()
            .with_app_root(dir.path())
            .with_timestamp(fixed_timestamp());
        Generator::new(config.clone())
            .generate_and_write(&inventory())
            .unwrap();

        let count = write_openapi(&config, Path::new(DEFAULT_OPENAPI_PATH)).unwrap();
        assert_eq!(count, 1);

        let written = std::fs::read_to_string(dir.path().join(DEFAULT_OPENAPI_PATH)).unwrap();
        let doc: Value = serde_json::from_str(&written).unwrap();
        assert!(doc["paths"]["/products/{id}"].is_object());
    }

    #[test]
    fn test_output_outside_root_is_rejected() {
        let dir = tempdir().unwrap();
        let config = GeneratorConfig::new().with_app_root(dir.path());
        let err = write_openapi(&config, Path::new("/elsewhere/openapi.json")).unwrap_err();
        assert!(matches!(err, EngineError::InvalidConfig(_)));
    }
}
