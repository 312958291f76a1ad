//! Markdown to HTML transformation of Delivery API responses

use pulldown_cmark::{html, Options, Parser};
use serde_json::{Map, Value};
use std::collections::HashMap;

/// Field type the Delivery API uses for long Markdown text
pub const TEXT_FIELD_TYPE: &str = "Text";

/// Content type id → ids of its `Text` fields
pub type TextFields = HashMap<String, Vec<String>>;

/// Build the lookup table from a `/content_types` response
pub fn text_fields_from_content_types(response: &Value) -> TextFields {
    let Some(items) = response.get("items").and_then(Value::as_array) else {
        return TextFields::new();
    };

    items
        .iter()
        .filter_map(|content_type| {
            let id = content_type["sys"]["id"].as_str()?;
            let fields = content_type["fields"]
                .as_array()
                .map(|fields| {
                    fields
                        .iter()
                        .filter(|field| field["type"] == TEXT_FIELD_TYPE)
                        .filter_map(|field| field["id"].as_str().map(str::to_string))
                        .collect()
                })
                .unwrap_or_default();
            Some((id.to_string(), fields))
        })
        .collect()
}

pub fn render_markdown(source: &str) -> String {
    let mut options = Options::empty();
    options.insert(Options::ENABLE_TABLES);
    options.insert(Options::ENABLE_STRIKETHROUGH);

    let parser = Parser::new_ext(source, options);
    let mut output = String::with_capacity(source.len() * 3 / 2);
    html::push_html(&mut output, parser);
    output
}

/// Render one field value. Missing and null values render as empty input;
/// localized values (`{"en-US": "..."}`) are rendered per locale.
fn render_value(value: Option<&Value>) -> Option<Value> {
    match value {
        None | Some(Value::Null) => Some(Value::String(render_markdown(""))),
        Some(Value::String(source)) => Some(Value::String(render_markdown(source))),
        Some(Value::Object(locales)) => {
            let rendered: Map<String, Value> = locales
                .iter()
                .map(|(locale, value)| {
                    let value = render_value(Some(value)).unwrap_or_else(|| value.clone());
                    (locale.clone(), value)
                })
                .collect();
            Some(Value::Object(rendered))
        }
        Some(_) => None,
    }
}

fn transform_entry(entry: &mut Value, text_fields: &TextFields) {
    if entry["sys"]
        .get("type")
        .is_some_and(|kind| kind != "Entry")
    {
        return;
    }
    let Some(content_type) = entry["sys"]["contentType"]["sys"]["id"].as_str() else {
        return;
    };
    let Some(field_ids) = text_fields.get(content_type) else {
        tracing::debug!("No field metadata for content type {}", content_type);
        return;
    };
    let Some(fields) = entry.get_mut("fields").and_then(Value::as_object_mut) else {
        return;
    };

    for field_id in field_ids {
        if let Some(rendered) = render_value(fields.get(field_id)) {
            fields.insert(field_id.clone(), rendered);
        }
    }
}

/// Render the text fields of every entry in `items` and `includes.Entry`
pub fn transform_entries(mut response: Value, text_fields: &TextFields) -> Value {
    if let Some(items) = response.get_mut("items").and_then(Value::as_array_mut) {
        for entry in items {
            transform_entry(entry, text_fields);
        }
    }

    if let Some(linked) = response
        .get_mut("includes")
        .and_then(|includes| includes.get_mut("Entry"))
        .and_then(Value::as_array_mut)
    {
        for entry in linked {
            transform_entry(entry, text_fields);
        }
    }

    response
}
