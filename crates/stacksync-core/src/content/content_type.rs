//! Content-type schema definitions.

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::{Map, Value};
use std::fmt;

/// A content type: the schema for entries of one kind.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContentType {
    /// The content type's uid, e.g. `blog_post`.
    pub uid: String,

    /// Human-readable title.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,

    /// Ordered field definitions.
    #[serde(default)]
    pub schema: Vec<FieldDef>,

    /// Any other keys the API returned. Kept so the descriptor node carries them.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl ContentType {
    /// Create a content type with the given uid and schema.
    pub fn new(uid: impl Into<String>, schema: Vec<FieldDef>) -> Self {
        Self {
            uid: uid.into(),
            title: None,
            schema,
            extra: Map::new(),
        }
    }
}

/// One field in a content-type schema.
///
/// Group and global fields own a nested `schema`; modular-block fields own
/// `blocks`; reference fields name their targets in `reference_to`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldDef {
    pub uid: String,

    pub data_type: FieldKind,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,

    #[serde(default)]
    pub multiple: bool,

    #[serde(default)]
    pub mandatory: bool,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub schema: Vec<FieldDef>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub blocks: Vec<BlockDef>,

    /// Target content types. The API sends either a single uid or a list.
    #[serde(
        default,
        deserialize_with = "one_or_many",
        skip_serializing_if = "Vec::is_empty"
    )]
    pub reference_to: Vec<String>,

    #[serde(default)]
    pub field_metadata: FieldMetadata,

    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl FieldDef {
    /// Create a field with no nested schema or metadata.
    pub fn new(uid: impl Into<String>, data_type: FieldKind) -> Self {
        Self {
            uid: uid.into(),
            data_type,
            display_name: None,
            multiple: false,
            mandatory: false,
            schema: Vec::new(),
            blocks: Vec::new(),
            reference_to: Vec::new(),
            field_metadata: FieldMetadata::default(),
            extra: Map::new(),
        }
    }

    /// Mark the field as holding a list of values.
    pub fn multiple(mut self) -> Self {
        self.multiple = true;
        self
    }

    /// Mark the field as required.
    pub fn mandatory(mut self) -> Self {
        self.mandatory = true;
        self
    }

    /// Set the nested schema of a group or global field.
    pub fn with_schema(mut self, schema: Vec<FieldDef>) -> Self {
        self.schema = schema;
        self
    }

    /// Set the blocks of a modular-blocks field.
    pub fn with_blocks(mut self, blocks: Vec<BlockDef>) -> Self {
        self.blocks = blocks;
        self
    }

    /// Set the target content types of a reference field.
    pub fn referencing<I, S>(mut self, targets: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.reference_to = targets.into_iter().map(Into::into).collect();
        self
    }
}

/// Field flags carried in `field_metadata`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FieldMetadata {
    #[serde(default)]
    pub ref_multiple: bool,

    #[serde(default)]
    pub ref_multiple_content_types: bool,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rich_text_type: Option<String>,

    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// One block of a modular-blocks field.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BlockDef {
    pub uid: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,

    #[serde(default)]
    pub schema: Vec<FieldDef>,

    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl BlockDef {
    pub fn new(uid: impl Into<String>, schema: Vec<FieldDef>) -> Self {
        Self {
            uid: uid.into(),
            title: None,
            schema,
            extra: Map::new(),
        }
    }
}

/// The kind of a field, parsed from its `data_type` string.
///
/// Anything unrecognised is kept as [`FieldKind::Unsupported`] so the schema
/// still round-trips; the mapper and normalizer skip those fields.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum FieldKind {
    Text,
    Number,
    Boolean,
    IsoDate,
    Json,
    Link,
    File,
    Reference,
    Group,
    GlobalField,
    Blocks,
    Unsupported(String),
}

impl FieldKind {
    pub fn as_str(&self) -> &str {
        match self {
            FieldKind::Text => "text",
            FieldKind::Number => "number",
            FieldKind::Boolean => "boolean",
            FieldKind::IsoDate => "isodate",
            FieldKind::Json => "json",
            FieldKind::Link => "link",
            FieldKind::File => "file",
            FieldKind::Reference => "reference",
            FieldKind::Group => "group",
            FieldKind::GlobalField => "global_field",
            FieldKind::Blocks => "blocks",
            FieldKind::Unsupported(other) => other,
        }
    }
}

impl From<&str> for FieldKind {
    fn from(s: &str) -> Self {
        match s {
            "text" => FieldKind::Text,
            "number" => FieldKind::Number,
            "boolean" => FieldKind::Boolean,
            "isodate" => FieldKind::IsoDate,
            "json" => FieldKind::Json,
            "link" => FieldKind::Link,
            "file" => FieldKind::File,
            "reference" => FieldKind::Reference,
            "group" => FieldKind::Group,
            "global_field" => FieldKind::GlobalField,
            "blocks" => FieldKind::Blocks,
            other => FieldKind::Unsupported(other.to_string()),
        }
    }
}

impl fmt::Display for FieldKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for FieldKind {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for FieldKind {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        Ok(FieldKind::from(s.as_str()))
    }
}

fn one_or_many<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum OneOrMany {
        One(String),
        Many(Vec<String>),
        Null,
    }

    Ok(match OneOrMany::deserialize(deserializer)? {
        OneOrMany::One(s) => vec![s],
        OneOrMany::Many(v) => v,
        OneOrMany::Null => Vec::new(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn parses_api_content_type() {
        let ct: ContentType = serde_json::from_value(json!({
            "uid": "blog_post",
            "title": "Blog Post",
            "options": { "is_page": true },
            "schema": [
                { "uid": "title", "data_type": "text", "mandatory": true, "unique": true },
                {
                    "uid": "author",
                    "data_type": "reference",
                    "reference_to": "author",
                    "field_metadata": { "ref_multiple": false }
                },
                {
                    "uid": "related",
                    "data_type": "reference",
                    "reference_to": ["blog_post", "page"],
                    "field_metadata": { "ref_multiple": true, "ref_multiple_content_types": true }
                },
                {
                    "uid": "seo",
                    "data_type": "group",
                    "schema": [{ "uid": "keywords", "data_type": "text", "multiple": true }]
                },
                { "uid": "odd", "data_type": "experience_container" }
            ]
        }))
        .unwrap();

        assert_eq!(ct.uid, "blog_post");
        assert_eq!(ct.schema.len(), 5);
        assert!(ct.schema[0].mandatory);
        assert_eq!(ct.schema[0].extra.get("unique"), Some(&json!(true)));
        assert_eq!(ct.schema[1].reference_to, vec!["author"]);
        assert!(!ct.schema[1].field_metadata.ref_multiple);
        assert_eq!(ct.schema[2].reference_to, vec!["blog_post", "page"]);
        assert!(ct.schema[2].field_metadata.ref_multiple);
        assert_eq!(ct.schema[3].schema[0].data_type, FieldKind::Text);
        assert!(ct.schema[3].schema[0].multiple);
        assert_eq!(
            ct.schema[4].data_type,
            FieldKind::Unsupported("experience_container".to_string())
        );
        assert!(ct.extra.contains_key("options"));
    }

    #[test]
    fn unsupported_kind_round_trips() {
        let field = FieldDef::new("x", FieldKind::from("taxonomy"));
        let value = serde_json::to_value(&field).unwrap();
        assert_eq!(value["data_type"], "taxonomy");
    }

    #[test]
    fn null_reference_to_is_empty() {
        let field: FieldDef = serde_json::from_value(json!({
            "uid": "r",
            "data_type": "reference",
            "reference_to": null
        }))
        .unwrap();
        assert!(field.reference_to.is_empty());
    }
}
