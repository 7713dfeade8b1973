//! OpenAPI fragments shared by the entity modules.

use serde_json::{json, Value};

fn error_response(description: &str) -> Value {
    json!({
        "description": description,
        "content": {
            "application/json": {
                "schema": { "$ref": "#/components/schemas/ErrorResponse" }
            }
        }
    })
}

fn schema_response(description: &str, schema: &Value) -> Value {
    json!({
        "description": description,
        "content": { "application/json": { "schema": schema } }
    })
}

/// Paths for a standard collection: search and create on `/`, get, replace,
/// and delete on `/{id}`.
pub fn crud_paths(tag: &str, schema: &str, input_schema: &str, search_keys: &[&str]) -> Value {
    let item_ref = json!({ "$ref": format!("#/components/schemas/{schema}") });
    let input_ref = json!({ "$ref": format!("#/components/schemas/{input_schema}") });
    let id_param = json!({
        "name": "id",
        "in": "path",
        "required": true,
        "schema": { "type": "integer", "format": "int64" }
    });
    let query_params: Vec<Value> = search_keys
        .iter()
        .map(|key| {
            json!({
                "name": key,
                "in": "query",
                "required": false,
                "schema": { "type": "string" }
            })
        })
        .collect();
    let body = json!({
        "required": true,
        "content": { "application/json": { "schema": input_ref } }
    });

    json!({
        "/": {
            "get": {
                "summary": format!("Search {tag}"),
                "tags": [tag],
                "parameters": query_params,
                "responses": {
                    "200": schema_response("Matching records", &json!({ "type": "array", "items": item_ref })),
                    "504": error_response("Request timed out")
                }
            },
            "post": {
                "summary": format!("Create {tag}"),
                "tags": [tag],
                "requestBody": body,
                "responses": {
                    "201": schema_response("Created", &item_ref),
                    "400": error_response("Invalid input or missing reference")
                }
            }
        },
        "/{id}": {
            "get": {
                "summary": format!("Get {tag} by id"),
                "tags": [tag],
                "parameters": [id_param],
                "responses": {
                    "200": schema_response("Record", &item_ref),
                    "404": error_response("Not found")
                }
            },
            "put": {
                "summary": format!("Replace {tag}"),
                "tags": [tag],
                "parameters": [id_param],
                "requestBody": body,
                "responses": {
                    "200": schema_response("Updated", &item_ref),
                    "400": error_response("Invalid input or missing reference"),
                    "404": error_response("Not found")
                }
            },
            "delete": {
                "summary": format!("Delete {tag}"),
                "tags": [tag],
                "parameters": [id_param],
                "responses": {
                    "204": { "description": "Deleted" },
                    "404": error_response("Not found")
                }
            }
        }
    })
}

/// Schema of a JSON string field.
pub fn string_field(description: &str) -> Value {
    json!({ "type": "string", "description": description })
}

pub fn integer_field(description: &str) -> Value {
    json!({ "type": "integer", "format": "int64", "description": description })
}

pub fn number_field(description: &str) -> Value {
    json!({ "type": "number", "format": "double", "description": description })
}

pub fn timestamp_field(description: &str) -> Value {
    json!({ "type": "string", "format": "date-time", "description": description })
}
