use crate::config::HttpConfig;
use crate::error::{io_error, CoreResult};
use crate::net::{http_client, parse_url};
use crate::tagged::{ErrorCategory, ResultExt, TaggedError};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::ser::PrettyFormatter;
use serde_json::{Map, Value};
use std::fs;
use std::io::Write;
use std::path::Path;

/// The kinds of value a JSON document can hold, used by [`convert_types`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JsonKind {
    Null,
    Bool,
    Number,
    String,
    Array,
    Object,
}

impl JsonKind {
    pub fn of(v: &Value) -> Self {
        match v {
            Value::Null => Self::Null,
            Value::Bool(_) => Self::Bool,
            Value::Number(_) => Self::Number,
            Value::String(_) => Self::String,
            Value::Array(_) => Self::Array,
            Value::Object(_) => Self::Object,
        }
    }
}

pub fn to_json_bytes<T: Serialize + ?Sized>(value: &T) -> CoreResult<Vec<u8>> {
    Ok(serde_json::to_vec(value)?)
}

pub fn from_json_bytes<T: DeserializeOwned>(data: &[u8]) -> CoreResult<T> {
    Ok(serde_json::from_slice(data)?)
}

/// Re-render a JSON object with four-space indentation.
pub fn pretty_print(data: &[u8]) -> CoreResult<String> {
    let obj = parse_object(data)?;
    let mut buf = Vec::new();
    let formatter = PrettyFormatter::with_indent(b"    ");
    let mut ser = serde_json::Serializer::with_formatter(&mut buf, formatter);
    obj.serialize(&mut ser)?;
    Ok(String::from_utf8(buf)
        .tag(ErrorCategory::Serialization, "pretty printer produced invalid utf-8")?)
}

pub fn pretty_print_to_writer<W: Write>(data: &[u8], out: &mut W) -> CoreResult<()> {
    out.write_all(pretty_print(data)?.as_bytes())?;
    Ok(())
}

pub fn read_json_file<T: DeserializeOwned>(path: impl AsRef<Path>) -> CoreResult<T> {
    let path = path.as_ref();
    let bytes = fs::read(path).map_err(|e| io_error(path, e))?;
    from_json_bytes(&bytes)
}

pub fn write_json_file<T: Serialize + ?Sized>(path: impl AsRef<Path>, value: &T) -> CoreResult<()> {
    let path = path.as_ref();
    let bytes = to_json_bytes(value)?;
    fs::write(path, &bytes)?;
    tracing::debug!(path = %path.display(), bytes = bytes.len(), "wrote json file");
    Ok(())
}

pub fn get_json_from_url<T: DeserializeOwned>(url: &str) -> CoreResult<T> {
    get_json_from_url_with(url, &HttpConfig::default())
}

/// GET `url` and decode the body as JSON. Non-2xx responses are `Network` errors.
pub fn get_json_from_url_with<T: DeserializeOwned>(url: &str, cfg: &HttpConfig) -> CoreResult<T> {
    let url = parse_url(url)?;
    tracing::debug!(url = %url, "fetching json");
    let resp = http_client(cfg)?
        .get(url.clone())
        .send()
        .and_then(|r| r.error_for_status())
        .tag(ErrorCategory::Network, format!("GET {} failed", url))?;
    Ok(resp
        .json()
        .tag(ErrorCategory::Serialization, format!("body of {} is not the expected json", url))?)
}

/// Whether `key` is a top-level key of the JSON object in `data`.
pub fn json_exists(data: &[u8], key: &str) -> bool {
    serde_json::from_slice::<Map<String, Value>>(data)
        .map(|obj| obj.contains_key(key))
        .unwrap_or(false)
}

/// Flatten nested objects into `a.b.c` keys. Arrays and scalars are leaves.
pub fn flatten_json(data: &[u8]) -> CoreResult<Map<String, Value>> {
    let obj = parse_object(data)?;
    let mut flat = Map::new();
    for (k, v) in obj {
        flatten_into(k, v, &mut flat);
    }
    Ok(flat)
}

fn flatten_into(path: String, value: Value, flat: &mut Map<String, Value>) {
    match value {
        Value::Object(obj) => {
            for (k, v) in obj {
                flatten_into(format!("{}.{}", path, k), v, flat);
            }
        }
        leaf => {
            flat.insert(path, leaf);
        }
    }
}

/// Shallow merge of two objects; keys in `second` win.
pub fn merge_json(first: &[u8], second: &[u8]) -> CoreResult<Vec<u8>> {
    let mut base = parse_object(first)?;
    base.extend(parse_object(second)?);
    to_json_bytes(&base)
}

/// Follow a dot-separated path of object keys.
///
/// A missing final key yields `null`; stepping into anything that is not an
/// object is a `NotFound` error.
pub fn extract_value(data: &[u8], path: &str) -> CoreResult<Value> {
    let mut current: Value = from_json_bytes(data)?;
    for part in path.split('.') {
        current = match current {
            Value::Object(mut obj) => obj.remove(part).unwrap_or(Value::Null),
            _ => return Err(TaggedError::not_found(format!("path not found: {}", path)).into()),
        };
    }
    Ok(current)
}

/// Replace every scalar leaf `v` with `f(v)`. Containers are walked, never passed to `f`.
pub fn transform_json<F>(data: &[u8], mut f: F) -> CoreResult<Vec<u8>>
where
    F: FnMut(Value) -> Value,
{
    let mut doc: Value = from_json_bytes(data)?;
    transform_leaves(&mut doc, &mut f);
    to_json_bytes(&doc)
}

fn transform_leaves<F: FnMut(Value) -> Value>(value: &mut Value, f: &mut F) {
    match value {
        Value::Object(obj) => obj.values_mut().for_each(|v| transform_leaves(v, f)),
        Value::Array(items) => items.iter_mut().for_each(|v| transform_leaves(v, f)),
        leaf => *leaf = f(std::mem::take(leaf)),
    }
}

/// Keep only the top-level entries for which `keep(key, value)` is true.
pub fn filter_json<F>(data: &[u8], mut keep: F) -> CoreResult<Vec<u8>>
where
    F: FnMut(&str, &Value) -> bool,
{
    let mut obj = parse_object(data)?;
    obj.retain(|k, v| keep(k, v));
    to_json_bytes(&obj)
}

/// Set `key` to `default` when it is missing or `null`.
pub fn default_value(data: &[u8], key: &str, default: Value) -> CoreResult<Vec<u8>> {
    let mut obj = parse_object(data)?;
    match obj.get(key) {
        None | Some(Value::Null) => {
            obj.insert(key.to_string(), default);
        }
        Some(_) => {}
    }
    to_json_bytes(&obj)
}

/// Convert every nested value of kind `from` into kind `to`.
///
/// Supported targets are `String` (any value, rendered as JSON text unless
/// it already is a string) and `Number` (strings holding an integer or a
/// finite float). Values that cannot be converted are left alone.
pub fn convert_types(data: &[u8], from: JsonKind, to: JsonKind) -> CoreResult<Vec<u8>> {
    let mut doc: Value = from_json_bytes(data)?;
    convert_children(&mut doc, from, to);
    to_json_bytes(&doc)
}

fn convert_children(value: &mut Value, from: JsonKind, to: JsonKind) {
    let children: Vec<&mut Value> = match value {
        Value::Object(obj) => obj.values_mut().collect(),
        Value::Array(items) => items.iter_mut().collect(),
        _ => return,
    };
    for child in children {
        if JsonKind::of(child) == from {
            let converted = convert_value(child, to);
            *child = converted;
        }
        convert_children(child, from, to);
    }
}

fn convert_value(value: &Value, to: JsonKind) -> Value {
    match (to, value) {
        (JsonKind::String, Value::String(_)) => value.clone(),
        (JsonKind::String, other) => Value::String(other.to_string()),
        (JsonKind::Number, Value::String(s)) => {
            if let Ok(i) = s.trim().parse::<i64>() {
                Value::from(i)
            } else {
                s.trim()
                    .parse::<f64>()
                    .ok()
                    .and_then(serde_json::Number::from_f64)
                    .map(Value::Number)
                    .unwrap_or_else(|| value.clone())
            }
        }
        _ => value.clone(),
    }
}

/// Split a JSON array into arrays of at most `size` elements.
pub fn slice_json_objects(data: &[u8], size: usize) -> CoreResult<Vec<Vec<u8>>> {
    if size == 0 {
        return Err(TaggedError::validation("slice size must be greater than zero").into());
    }
    let items: Vec<Value> = from_json_bytes(data)?;
    items.chunks(size).map(to_json_bytes).collect()
}

/// Strip insignificant whitespace.
pub fn compact_json(data: &[u8]) -> CoreResult<Vec<u8>> {
    let doc: Value = from_json_bytes(data)?;
    to_json_bytes(&doc)
}

fn parse_object(data: &[u8]) -> CoreResult<Map<String, Value>> {
    Ok(serde_json::from_slice(data)?)
}
