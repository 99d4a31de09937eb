//! Target shapes for model replies, and the validator that enforces them.
//!
//! Every extractable document type implements [`DocumentSchema`]. Its field
//! list is rendered into the format instructions of the prompt. Validation
//! is serde deserialization with the lax coercions in [`coerce`].

use regex::Regex;
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::{json, Map, Value};
use std::sync::LazyLock;

use crate::requester::ExtractionFailure;

/// Kind of value a field holds.
#[derive(Debug, Clone, Copy)]
pub enum FieldKind {
    Text,
    Amount,
    /// Array of nested objects with the given fields
    Rows(&'static [FieldSpec]),
}

/// One named field of a schema.
#[derive(Debug, Clone, Copy)]
pub struct FieldSpec {
    pub name: &'static str,
    pub kind: FieldKind,
    pub description: Option<&'static str>,
}

impl FieldSpec {
    pub const fn text(name: &'static str) -> Self {
        Self { name, kind: FieldKind::Text, description: None }
    }

    pub const fn amount(name: &'static str) -> Self {
        Self { name, kind: FieldKind::Amount, description: None }
    }

    pub const fn rows(name: &'static str, fields: &'static [FieldSpec]) -> Self {
        Self { name, kind: FieldKind::Rows(fields), description: None }
    }

    pub const fn describe(mut self, description: &'static str) -> Self {
        self.description = Some(description);
        self
    }
}

/// A record shape the model is asked to produce.
pub trait DocumentSchema: Serialize + DeserializeOwned {
    /// Title used in format instructions and logs
    const NAME: &'static str;

    fn fields() -> &'static [FieldSpec];
}

fn object_schema(title: Option<&str>, fields: &[FieldSpec]) -> Value {
    let mut properties = Map::new();
    for f in fields {
        let mut prop = match f.kind {
            FieldKind::Text => json!({ "type": "string" }),
            FieldKind::Amount => json!({ "type": "number" }),
            FieldKind::Rows(inner) => json!({
                "type": "array",
                "items": object_schema(None, inner),
            }),
        };
        if let (Some(d), Some(obj)) = (f.description, prop.as_object_mut()) {
            obj.insert("description".to_string(), Value::String(d.to_string()));
        }
        properties.insert(f.name.to_string(), prop);
    }

    let required: Vec<&str> = fields.iter().map(|f| f.name).collect();
    let mut schema = json!({
        "type": "object",
        "properties": properties,
        "required": required,
    });
    if let (Some(t), Some(obj)) = (title, schema.as_object_mut()) {
        obj.insert("title".to_string(), Value::String(t.to_string()));
    }
    schema
}

/// Render the "reply in this shape" block placed in every prompt.
pub fn format_instructions<T: DocumentSchema>() -> String {
    let schema = object_schema(Some(T::NAME), T::fields());
    format!(
        "The output should be formatted as a JSON instance that conforms to the JSON schema below.\n\n\
         As an example, for the schema {{\"properties\": {{\"foo\": {{\"type\": \"array\", \"items\": {{\"type\": \"string\"}}}}}}, \"required\": [\"foo\"]}}\n\
         the object {{\"foo\": [\"bar\", \"baz\"]}} is a well-formatted instance of the schema. \
         The object {{\"properties\": {{\"foo\": [\"bar\", \"baz\"]}}}} is not well-formatted.\n\n\
         Here is the output schema:\n```\n{schema}\n```"
    )
}

/// Find the JSON object inside a model reply.
///
/// Accepts fenced blocks (```json ... ``` or bare ```), otherwise the span
/// from the first `{` to the last `}`.
pub fn extract_json_block(reply: &str) -> Result<&str, ExtractionFailure> {
    let trimmed = reply.trim();

    if let Some(start) = trimmed.find("```json") {
        let after_fence = &trimmed[start + 7..];
        if let Some(end) = after_fence.find("```") {
            return Ok(after_fence[..end].trim());
        }
    }

    if let Some(start) = trimmed.find("```") {
        let after_fence = &trimmed[start + 3..];
        if let Some(end) = after_fence.find("```") {
            let block = after_fence[..end].trim();
            if block.starts_with('{') {
                return Ok(block);
            }
        }
    }

    if let (Some(start), Some(end)) = (trimmed.find('{'), trimmed.rfind('}')) {
        if start < end {
            return Ok(&trimmed[start..=end]);
        }
    }

    Err(ExtractionFailure::MalformedReply(
        "no JSON object found in reply".to_string(),
    ))
}

/// Validate a raw model reply against schema `T`.
pub fn validate_reply<T: DocumentSchema>(reply: &str) -> Result<T, ExtractionFailure> {
    let block = extract_json_block(reply)?;
    let value: Value = serde_json::from_str(block)
        .map_err(|e| ExtractionFailure::MalformedReply(e.to_string()))?;

    if !value.is_object() {
        return Err(ExtractionFailure::SchemaMismatch {
            schema: T::NAME,
            detail: "expected a JSON object".to_string(),
        });
    }

    serde_json::from_value(value).map_err(|e| ExtractionFailure::SchemaMismatch {
        schema: T::NAME,
        detail: e.to_string(),
    })
}

static AMOUNT_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(concat!(
        r"^(?P<open>\()?\s*(?P<sign>-)?\s*",
        r"(?:[A-Z]{3}\s*|[$€£¥]\s*)?",
        r"(?P<num>\d[\d,]*(?:\.\d+)?|\.\d+)",
        r"\s*(?P<close>\))?$"
    ))
    .expect("valid amount regex")
});

/// Parse a human-formatted amount: `1,234.50`, `$ 12`, `USD 9.10`, `(45.00)`.
pub fn parse_amount(raw: &str) -> Option<f64> {
    let caps = AMOUNT_RE.captures(raw.trim())?;
    if caps.name("open").is_some() != caps.name("close").is_some() {
        return None;
    }

    let n: f64 = caps["num"].replace(',', "").parse().ok()?;
    let negative = caps.name("open").is_some() || caps.name("sign").is_some();
    Some(if negative { -n } else { n })
}

/// Serde adapters for the lax field coercions.
pub mod coerce {
    use serde::de::Error;
    use serde::{Deserialize, Deserializer};
    use serde_json::Value;

    fn describe(v: &Value) -> &'static str {
        match v {
            Value::Null => "null",
            Value::Bool(_) => "a boolean",
            Value::Number(_) => "a number",
            Value::String(_) => "a string",
            Value::Array(_) => "an array",
            Value::Object(_) => "an object",
        }
    }

    /// Numbers, or strings that read as amounts.
    pub fn amount<'de, D: Deserializer<'de>>(d: D) -> Result<f64, D::Error> {
        match Value::deserialize(d)? {
            Value::Number(n) => n
                .as_f64()
                .ok_or_else(|| D::Error::custom(format!("amount {n} out of range"))),
            Value::String(s) => super::parse_amount(&s)
                .ok_or_else(|| D::Error::custom(format!("invalid amount {s:?}"))),
            other => Err(D::Error::custom(format!(
                "expected an amount, got {}",
                describe(&other)
            ))),
        }
    }

    /// Strings, with scalars rendered as text.
    pub fn text<'de, D: Deserializer<'de>>(d: D) -> Result<String, D::Error> {
        match Value::deserialize(d)? {
            Value::String(s) => Ok(s),
            Value::Number(n) => Ok(n.to_string()),
            Value::Bool(b) => Ok(b.to_string()),
            other => Err(D::Error::custom(format!(
                "expected text, got {}",
                describe(&other)
            ))),
        }
    }
}
