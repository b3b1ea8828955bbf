//! JSON Schema documents describing an agent's structured output.

use ak_protocol::{FieldSpec, SchemaFields};
use serde_json::{json, Map, Value};

use super::layout::schema_filename;
use super::naming::title_case;

pub const JSON_SCHEMA_DIALECT: &str = "https://json-schema.org/draft/2020-12/schema";

/// Build the output schema for `agent_name`.
///
/// Fields keep their order. A field whose descriptor carries
/// `"required": true` is listed in the top-level `required` array and the
/// boolean is dropped from the property. Non-boolean `required` values are
/// left in place.
pub fn create_output_schema(
    agent_name: &str,
    fields: Option<&SchemaFields>,
    id_prefix: &str,
) -> Value {
    let mut required = Vec::new();
    let mut properties = Map::new();

    for (name, spec) in fields.into_iter().flatten() {
        let mut descriptor = normalize_field(spec);
        if let Some(flag) = descriptor.get("required").and_then(Value::as_bool) {
            if flag {
                required.push(Value::String(name.clone()));
            }
            descriptor.remove("required");
        }
        properties.insert(name.clone(), Value::Object(descriptor));
    }

    json!({
        "$schema": JSON_SCHEMA_DIALECT,
        "$id": format!("{id_prefix}/{}", schema_filename(agent_name)),
        "title": format!("{} Output", title_case(&agent_name.replace('_', " "))),
        "type": "object",
        "required": required,
        "properties": properties,
    })
}

fn normalize_field(spec: &FieldSpec) -> Map<String, Value> {
    match spec {
        FieldSpec::Type(ty) => type_only(ty),
        FieldSpec::Descriptor(map) => map.clone(),
        FieldSpec::Other(_) => type_only("string"),
    }
}

fn type_only(ty: &str) -> Map<String, Value> {
    let mut map = Map::new();
    map.insert("type".to_string(), Value::String(ty.to_string()));
    map
}

/// Schema file contents: two-space indentation and a trailing newline.
pub fn render_schema(schema: &Value) -> Result<String, serde_json::Error> {
    serde_json::to_string_pretty(schema).map(|text| text + "\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fields(json: &str) -> SchemaFields {
        serde_json::from_str(json).expect("valid field map")
    }

    #[test]
    fn test_schema_without_fields() {
        let schema = create_output_schema("joke_agent", None, "jarvis");
        let rendered = render_schema(&schema).unwrap();
        assert!(rendered.ends_with("}\n"));
        insta::assert_snapshot!(rendered.trim_end(), @r###"
        {
          "$schema": "https://json-schema.org/draft/2020-12/schema",
          "$id": "jarvis/joke-agent-output.json",
          "title": "Joke Agent Output",
          "type": "object",
          "required": [],
          "properties": {}
        }
        "###);
    }

    #[test]
    fn test_shorthand_and_descriptor_fields() {
        let fields = fields(
            r#"{
                "joke": "string",
                "rating": {"type": "integer", "required": true, "minimum": 1},
                "tags": {"type": "array", "required": false},
                "weird": 42
            }"#,
        );
        let schema = create_output_schema("joke_agent", Some(&fields), "jarvis");

        assert_eq!(schema["required"], json!(["rating"]));
        assert_eq!(schema["properties"]["joke"], json!({"type": "string"}));
        assert_eq!(
            schema["properties"]["rating"],
            json!({"type": "integer", "minimum": 1}),
            "boolean required is hoisted out of the property"
        );
        assert_eq!(schema["properties"]["tags"], json!({"type": "array"}));
        assert_eq!(schema["properties"]["weird"], json!({"type": "string"}));

        let order: Vec<&String> = schema["properties"].as_object().unwrap().keys().collect();
        assert_eq!(order, ["joke", "rating", "tags", "weird"]);
    }

    #[test]
    fn test_nested_required_array_is_kept() {
        let fields = fields(
            r#"{"address": {"type": "object", "required": ["city"], "properties": {"city": {"type": "string"}}}}"#,
        );
        let schema = create_output_schema("geo", Some(&fields), "jarvis");

        assert_eq!(schema["required"], json!([]));
        assert_eq!(schema["properties"]["address"]["required"], json!(["city"]));
    }

    #[test]
    fn test_id_prefix_and_title() {
        let schema = create_output_schema("lead-scorer_v2", None, "acme/schemas");
        assert_eq!(schema["$id"], "acme/schemas/lead-scorer-v2-output.json");
        assert_eq!(schema["title"], "Lead-Scorer V2 Output");
    }

    #[test]
    fn test_top_level_key_order() {
        let schema = create_output_schema("a", None, "jarvis");
        let keys: Vec<&String> = schema.as_object().unwrap().keys().collect();
        assert_eq!(keys, ["$schema", "$id", "title", "type", "required", "properties"]);
    }
}
