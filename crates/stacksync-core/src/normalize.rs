//! Entry and asset normalization.
//!
//! Walks a raw record alongside its content-type schema and rewrites the
//! fields that need it: references become node ids, links get a fixed shape,
//! groups and blocks recurse. Keys the schema does not mention are kept as-is.

use serde_json::{Map, Number, Value};

use crate::Result;
use crate::content::{BlockDef, ContentType, FieldDef, FieldKind, record_locale, record_uid};
use crate::error::InvalidInputError;
use crate::index::ReferenceIndex;
use crate::materialize::{asset_id, entry_id};
use crate::traits::IdFactory;
use crate::types::{NodeId, TypePrefix};

/// Normalize one raw entry against its content type.
///
/// References to entries or assets missing from `index` are dropped.
///
/// # Errors
///
/// Returns an error if the entry is not a JSON object or has no locale.
pub fn normalize_entry(
    content_type: &ContentType,
    entry: &Value,
    index: &ReferenceIndex,
    ids: &dyn IdFactory,
    prefix: &TypePrefix,
) -> Result<Map<String, Value>> {
    let raw = as_record(entry, "entry")?;
    let locale = record_locale(entry).ok_or_else(|| InvalidInputError::Other {
        message: format!(
            "entry '{}' has no locale",
            record_uid(entry).unwrap_or("<unknown>")
        ),
    })?;

    let resolver = Resolver {
        index,
        ids,
        prefix,
        locale,
    };
    Ok(resolver.object(&content_type.schema, raw))
}

/// Normalize one raw asset. Assets carry no schema; the payload is kept whole.
///
/// # Errors
///
/// Returns an error if the asset is not a JSON object.
pub fn normalize_asset(asset: &Value) -> Result<Map<String, Value>> {
    as_record(asset, "asset").cloned()
}

fn as_record<'a>(value: &'a Value, kind: &str) -> Result<&'a Map<String, Value>> {
    value.as_object().ok_or_else(|| {
        InvalidInputError::Other {
            message: format!("{} record must be a JSON object", kind),
        }
        .into()
    })
}

struct Resolver<'a> {
    index: &'a ReferenceIndex,
    ids: &'a dyn IdFactory,
    prefix: &'a TypePrefix,
    locale: &'a str,
}

impl Resolver<'_> {
    fn object(&self, schema: &[FieldDef], raw: &Map<String, Value>) -> Map<String, Value> {
        let mut out = raw.clone();
        for field in schema {
            match raw.get(&field.uid) {
                Some(value) => {
                    out.insert(field.uid.clone(), self.field(field, value));
                }
                None if field.data_type == FieldKind::File => {
                    out.insert(field.uid.clone(), Value::Null);
                }
                None => {}
            }
        }
        out
    }

    fn field(&self, field: &FieldDef, value: &Value) -> Value {
        match &field.data_type {
            FieldKind::Reference => Value::Array(
                self.references(value)
                    .into_iter()
                    .map(Value::from)
                    .collect(),
            ),
            FieldKind::File => self.files(field, value),
            FieldKind::Group | FieldKind::GlobalField => self.group(&field.schema, value),
            FieldKind::Blocks => self.blocks(&field.blocks, value),
            FieldKind::Link => each(value, link),
            FieldKind::Number => each(value, number),
            FieldKind::Boolean => each(value, boolean),
            FieldKind::Text
            | FieldKind::IsoDate
            | FieldKind::Json
            | FieldKind::Unsupported(_) => value.clone(),
        }
    }

    /// Known entry ids among the referenced uids, in reference order.
    fn references(&self, value: &Value) -> Vec<NodeId> {
        items(value)
            .filter_map(reference_uid)
            .map(|uid| entry_id(uid, self.locale, self.ids, self.prefix))
            .filter(|id| self.index.has_entry(id))
            .collect()
    }

    fn files(&self, field: &FieldDef, value: &Value) -> Value {
        if is_blank(value) {
            return Value::Null;
        }

        let resolved: Vec<Value> = items(value)
            .filter_map(|asset| {
                let uid = reference_uid(asset)?;
                let locale = asset
                    .is_object()
                    .then(|| record_locale(asset))
                    .flatten()
                    .unwrap_or(self.locale);
                let id = asset_id(uid, locale, self.ids, self.prefix);
                self.index.has_asset(&id).then(|| Value::from(id))
            })
            .collect();

        if field.multiple {
            Value::Array(resolved)
        } else {
            resolved.into_iter().next().unwrap_or(Value::Null)
        }
    }

    fn group(&self, schema: &[FieldDef], value: &Value) -> Value {
        match value {
            Value::Object(raw) => Value::Object(self.object(schema, raw)),
            Value::Array(values) => Value::Array(
                values
                    .iter()
                    .map(|v| self.group(schema, v))
                    .collect(),
            ),
            other => other.clone(),
        }
    }

    fn blocks(&self, blocks: &[BlockDef], value: &Value) -> Value {
        let Value::Array(values) = value else {
            return value.clone();
        };

        let normalized = values
            .iter()
            .map(|element| match element {
                Value::Object(wrapper) => {
                    let mut out = wrapper.clone();
                    for (block_uid, inner) in wrapper {
                        let def = blocks.iter().find(|b| &b.uid == block_uid);
                        if let (Some(def), Value::Object(raw)) = (def, inner) {
                            out.insert(block_uid.clone(), Value::Object(self.object(&def.schema, raw)));
                        }
                    }
                    Value::Object(out)
                }
                other => other.clone(),
            })
            .collect();

        Value::Array(normalized)
    }
}

/// The values of a possibly-multiple field.
fn items(value: &Value) -> Box<dyn Iterator<Item = &Value> + '_> {
    match value {
        Value::Array(values) => Box::new(values.iter()),
        Value::Null => Box::new(std::iter::empty()),
        single => Box::new(std::iter::once(single)),
    }
}

/// A referenced uid, given as a bare string or an object with `uid`.
fn reference_uid(value: &Value) -> Option<&str> {
    match value {
        Value::String(uid) if !uid.is_empty() => Some(uid),
        Value::Object(_) => record_uid(value),
        _ => None,
    }
}

fn is_blank(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::String(s) => s.is_empty(),
        Value::Array(values) => values.is_empty(),
        Value::Object(map) => map.is_empty(),
        _ => false,
    }
}

/// Apply `f` to a scalar, or to every element of an array.
fn each(value: &Value, f: fn(&Value) -> Value) -> Value {
    match value {
        Value::Array(values) => Value::Array(values.iter().map(f).collect()),
        single => f(single),
    }
}

fn link(value: &Value) -> Value {
    let (title, href) = match value {
        Value::Null => return Value::Null,
        Value::String(href) => (Value::Null, Value::String(href.clone())),
        Value::Object(obj) => (
            obj.get("title").cloned().unwrap_or(Value::Null),
            obj.get("href")
                .or_else(|| obj.get("url"))
                .cloned()
                .unwrap_or(Value::Null),
        ),
        other => return other.clone(),
    };

    let mut out = Map::new();
    out.insert("title".to_string(), title);
    out.insert("href".to_string(), href);
    Value::Object(out)
}

fn number(value: &Value) -> Value {
    let Value::String(s) = value else {
        return value.clone();
    };
    let s = s.trim();
    if let Ok(n) = s.parse::<i64>() {
        return Value::Number(n.into());
    }
    s.parse::<f64>()
        .ok()
        .and_then(Number::from_f64)
        .map(Value::Number)
        .unwrap_or_else(|| value.clone())
}

fn boolean(value: &Value) -> Value {
    match value {
        Value::String(s) if s.eq_ignore_ascii_case("true") => Value::Bool(true),
        Value::String(s) if s.eq_ignore_ascii_case("false") => Value::Bool(false),
        other => other.clone(),
    }
}
