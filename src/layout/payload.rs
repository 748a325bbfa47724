//! Page content payloads
//!
//! Application code fills page content as loosely typed JSON. Before
//! rendering it is checked and turned into a [`ContentPayload`]: either a
//! list of sections for the default section template, or a list of field
//! maps for a named custom template.

use serde_json::Value;
use std::collections::BTreeMap;

use crate::layout::error::TemplateError;

/// One `{title}` / `{content}` block of the section template
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Section {
    pub title: String,
    pub body: String,
}

impl Section {
    pub fn new(title: impl Into<String>, body: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            body: body.into(),
        }
    }
}

/// Placeholder name -> value for one repetition of a custom template
pub type FieldMap = BTreeMap<String, String>;

/// Validated page content
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ContentPayload {
    /// Rendered through `section.tpl`, one block per section
    Sections(Vec<Section>),
    /// Rendered through the named template, one repetition per row
    Custom { template: String, rows: Vec<FieldMap> },
}

impl ContentPayload {
    /// Check `content` and build the payload for the requested branch
    pub fn from_value(content: &Value, custom_template: Option<&str>) -> Result<Self, TemplateError> {
        match custom_template {
            None => Ok(Self::Sections(sections_from_value(content)?)),
            Some(template) => Ok(Self::Custom {
                template: template.to_string(),
                rows: rows_from_value(content)?,
            }),
        }
    }
}

/// JSON type name used in shape errors
pub fn value_type(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

fn expect_array<'a>(value: &'a Value, expected: &'static str) -> Result<&'a [Value], TemplateError> {
    value
        .as_array()
        .map(Vec::as_slice)
        .ok_or(TemplateError::InvalidPayloadShape {
            expected,
            found: value_type(value),
        })
}

/// Text of a scalar leaf; `null` is empty
fn scalar_text(value: &Value) -> Result<String, TemplateError> {
    match value {
        Value::Null => Ok(String::new()),
        Value::String(s) => Ok(s.clone()),
        Value::Bool(b) => Ok(b.to_string()),
        Value::Number(n) => Ok(n.to_string()),
        other => Err(TemplateError::InvalidPayloadShape {
            expected: "scalar value",
            found: value_type(other),
        }),
    }
}

/// Parse `[[title, body], ...]` or `[{"title": .., "body": ..}, ...]`
pub fn sections_from_value(content: &Value) -> Result<Vec<Section>, TemplateError> {
    expect_array(content, "array of sections")?
        .iter()
        .map(section_from_value)
        .collect()
}

fn section_from_value(value: &Value) -> Result<Section, TemplateError> {
    match value {
        Value::Array(pair) => match pair.as_slice() {
            [title, body] => Ok(Section {
                title: scalar_text(title)?,
                body: scalar_text(body)?,
            }),
            _ => Err(TemplateError::InvalidPayloadShape {
                expected: "[title, body] pair",
                found: if pair.len() < 2 { "short array" } else { "long array" },
            }),
        },
        Value::Object(fields) => {
            let title = fields.get("title");
            let body = fields.get("body").or_else(|| fields.get("content"));
            match (title, body) {
                (Some(title), Some(body)) => Ok(Section {
                    title: scalar_text(title)?,
                    body: scalar_text(body)?,
                }),
                _ => Err(TemplateError::InvalidPayloadShape {
                    expected: "object with title and body",
                    found: "object",
                }),
            }
        }
        other => Err(TemplateError::InvalidPayloadShape {
            expected: "[title, body] pair",
            found: value_type(other),
        }),
    }
}

/// Parse `[{"field": value, ...}, ...]`
pub fn rows_from_value(content: &Value) -> Result<Vec<FieldMap>, TemplateError> {
    let mut rows = Vec::new();
    for row in expect_array(content, "array of field maps")? {
        let fields = row.as_object().ok_or(TemplateError::InvalidPayloadShape {
            expected: "field map",
            found: value_type(row),
        })?;
        let mut map = FieldMap::new();
        for (name, value) in fields {
            map.insert(name.clone(), scalar_text(value)?);
        }
        rows.push(map);
    }
    Ok(rows)
}
