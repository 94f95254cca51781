//! Response-format descriptors and schema utilities.

use serde::Serialize;
use serde_json::{json, Map, Value};

/// The `response_format` descriptor advertised to the gateway.
///
/// Always the strict JSON-schema flavour:
/// `{"type": "json_schema", "json_schema": {"name", "strict": true, "schema"}}`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ResponseFormat {
    #[serde(rename = "type")]
    pub format_type: String,
    pub json_schema: JsonSchemaSpec,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct JsonSchemaSpec {
    pub name: String,
    pub strict: bool,
    pub schema: Value,
}

impl ResponseFormat {
    pub fn json_schema(name: impl Into<String>, schema: Value) -> Self {
        Self {
            format_type: "json_schema".to_string(),
            json_schema: JsonSchemaSpec {
                name: name.into(),
                strict: true,
                schema,
            },
        }
    }

    pub fn name(&self) -> &str {
        &self.json_schema.name
    }

    pub fn schema(&self) -> &Value {
        &self.json_schema.schema
    }

    pub fn to_value(&self) -> Value {
        json!({
            "type": self.format_type,
            "json_schema": {
                "name": self.json_schema.name,
                "strict": self.json_schema.strict,
                "schema": self.json_schema.schema,
            }
        })
    }
}

/// Rewrites a schema into the strict shape structured-output providers accept.
///
/// Every object schema gets `additionalProperties: false` and a `required`
/// array naming all of its properties. Optional fields must be expressed as
/// nullable types. Local `#/definitions/*` references are inlined and the
/// draft marker is dropped.
pub fn strict_schema(schema: Value) -> Value {
    let mut schema = schema;
    let definitions = match schema.as_object_mut() {
        Some(root) => {
            root.remove("$schema");
            root.remove("definitions")
                .or_else(|| root.remove("$defs"))
                .and_then(|d| match d {
                    Value::Object(map) => Some(map),
                    _ => None,
                })
                .unwrap_or_default()
        }
        None => Map::new(),
    };
    tighten(schema, &definitions, 0)
}

const MAX_REF_DEPTH: usize = 32;

fn tighten(node: Value, definitions: &Map<String, Value>, depth: usize) -> Value {
    let mut obj = match node {
        Value::Object(obj) => obj,
        Value::Array(items) => {
            return Value::Array(
                items
                    .into_iter()
                    .map(|v| tighten(v, definitions, depth))
                    .collect(),
            )
        }
        other => return other,
    };

    if let Some(Value::String(reference)) = obj.get("$ref") {
        let name = reference
            .strip_prefix("#/definitions/")
            .or_else(|| reference.strip_prefix("#/$defs/"));
        if let Some(target) = name.and_then(|n| definitions.get(n)) {
            if depth < MAX_REF_DEPTH {
                return tighten(target.clone(), definitions, depth + 1);
            }
        }
    }

    // schemars wraps documented references as `allOf: [{"$ref": ...}]`
    if let Some(Value::Array(all_of)) = obj.get("allOf") {
        if all_of.len() == 1 {
            let inner = tighten(all_of[0].clone(), definitions, depth);
            obj.remove("allOf");
            if let Value::Object(inner) = inner {
                for (k, v) in inner {
                    obj.entry(k).or_insert(v);
                }
            }
        }
    }

    for key in ["items", "anyOf", "oneOf", "allOf"] {
        if let Some(child) = obj.remove(key) {
            obj.insert(key.to_string(), tighten(child, definitions, depth));
        }
    }

    if let Some(Value::Object(props)) = obj.remove("properties") {
        let required: Vec<Value> = props.keys().map(|k| Value::String(k.clone())).collect();
        let props: Map<String, Value> = props
            .into_iter()
            .map(|(k, v)| (k, tighten(v, definitions, depth)))
            .collect();
        obj.insert("properties".into(), Value::Object(props));
        obj.insert("required".into(), Value::Array(required));
        obj.insert("additionalProperties".into(), Value::Bool(false));
    } else if is_object_type(obj.get("type")) {
        obj.insert("additionalProperties".into(), Value::Bool(false));
    }

    Value::Object(obj)
}

fn is_object_type(ty: Option<&Value>) -> bool {
    match ty {
        Some(Value::String(s)) => s == "object",
        Some(Value::Array(types)) => types.iter().any(|t| t == "object"),
        _ => false,
    }
}

/// Derives a strict schema for `T` with `schemars`.
pub fn schema_for_type<T: schemars::JsonSchema>() -> Value {
    let schema = schemars::schema_for!(T);
    let value = serde_json::to_value(&schema).unwrap_or_else(|_| json!({}));
    strict_schema(value)
}
