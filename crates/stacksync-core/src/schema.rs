//! Schema mapping: content-type schemas to graph type declarations.
//!
//! Type names are always `{prefix}_{content_type}` or a path-qualified variant
//! of it (`{prefix}_{content_type}_{group}` and so on), so content types
//! registered in the same pass never collide.

use std::collections::{BTreeMap, HashSet};
use std::fmt;

use serde::Serialize;
use tracing::debug;

use crate::content::{ContentType, FieldDef, FieldKind};
use crate::types::TypePrefix;

/// Name of the shared link object type.
pub const LINK_TYPE: &str = "linktype";

/// Interface implemented by every top-level entry type.
pub const NODE_INTERFACE: &str = "Node";

/// A reference to a named type, possibly list-wrapped and non-null.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TypeRef {
    pub name: String,
    pub list: bool,
    pub required: bool,
}

impl TypeRef {
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            list: false,
            required: false,
        }
    }

    pub fn list_of(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            list: true,
            required: false,
        }
    }

    fn for_field(name: impl Into<String>, list: bool, field: &FieldDef) -> Self {
        Self {
            name: name.into(),
            list,
            required: field.mandatory,
        }
    }
}

impl fmt::Display for TypeRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.list {
            write!(f, "[{}]", self.name)?;
        } else {
            f.write_str(&self.name)?;
        }
        if self.required {
            f.write_str("!")?;
        }
        Ok(())
    }
}

/// One generated field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldSpec {
    #[serde(rename = "type")]
    pub ty: TypeRef,

    /// The stored value is one or more node ids to be resolved as links.
    pub link: bool,
}

impl FieldSpec {
    fn plain(ty: TypeRef) -> Self {
        Self { ty, link: false }
    }

    fn linked(ty: TypeRef) -> Self {
        Self { ty, link: true }
    }
}

impl fmt::Display for FieldSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.ty)?;
        if self.link {
            f.write_str(" @link(by: \"id\")")?;
        }
        Ok(())
    }
}

/// An object type declaration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ObjectType {
    pub name: String,
    pub fields: BTreeMap<String, FieldSpec>,
    pub interfaces: Vec<String>,
}

/// A union type declaration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UnionType {
    pub name: String,
    pub types: Vec<String>,
}

/// A generated schema declaration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum TypeDecl {
    Object(ObjectType),
    Union(UnionType),
}

impl TypeDecl {
    pub fn name(&self) -> &str {
        match self {
            TypeDecl::Object(o) => &o.name,
            TypeDecl::Union(u) => &u.name,
        }
    }

    /// The `{ title, href }` type link fields resolve to.
    pub fn link_type() -> Self {
        let mut fields = BTreeMap::new();
        fields.insert("title".to_string(), FieldSpec::plain(TypeRef::named("String")));
        fields.insert("href".to_string(), FieldSpec::plain(TypeRef::named("String")));
        TypeDecl::Object(ObjectType {
            name: LINK_TYPE.to_string(),
            fields,
            interfaces: Vec::new(),
        })
    }
}

/// Renders GraphQL SDL.
impl fmt::Display for TypeDecl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TypeDecl::Object(o) => {
                write!(f, "type {}", o.name)?;
                if !o.interfaces.is_empty() {
                    write!(f, " implements {}", o.interfaces.join(" & "))?;
                }
                writeln!(f, " {{")?;
                for (name, spec) in &o.fields {
                    writeln!(f, "  {}: {}", name, spec)?;
                }
                write!(f, "}}")
            }
            TypeDecl::Union(u) => write!(f, "union {} = {}", u.name, u.types.join(" | ")),
        }
    }
}

/// What [`build_schema`] derives from one list of field definitions.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SchemaOutput {
    /// Fields of the type being built.
    pub fields: BTreeMap<String, FieldSpec>,
    /// Nested object types (groups, blocks) emitted along the way.
    pub types: Vec<TypeDecl>,
    /// Unions required by multi-target reference fields, nested ones included.
    pub references: Vec<UnionType>,
}

/// Derive the field shape of `parent` from its field definitions.
///
/// Fields of an unsupported kind are omitted. So are groups with no usable
/// fields and references with no target, since neither can be typed.
pub fn build_schema(schema: &[FieldDef], parent: &str, prefix: &TypePrefix) -> SchemaOutput {
    let mut out = SchemaOutput::default();

    for field in schema {
        let spec = match &field.data_type {
            FieldKind::Text => scalar("String", field),
            FieldKind::Number => scalar("Float", field),
            FieldKind::Boolean => scalar("Boolean", field),
            FieldKind::IsoDate => scalar("Date", field),
            FieldKind::Json => scalar("JSON", field),
            FieldKind::Link => scalar(LINK_TYPE, field),
            FieldKind::File => Some(FieldSpec::linked(TypeRef::for_field(
                prefix.asset_type(),
                field.multiple,
                field,
            ))),
            FieldKind::Group | FieldKind::GlobalField => group_field(field, parent, prefix, &mut out),
            FieldKind::Blocks => blocks_field(field, parent, prefix, &mut out),
            FieldKind::Reference => reference_field(field, parent, prefix, &mut out),
            FieldKind::Unsupported(kind) => {
                debug!(field = %field.uid, %kind, "Skipping field of unsupported type");
                None
            }
        };

        if let Some(spec) = spec {
            out.fields.insert(field.uid.clone(), spec);
        }
    }

    out
}

/// All declarations for one content type, ready to register.
///
/// Nested types come first, then `linktype`, the unions, and finally the
/// top-level `{prefix}_{uid}` type implementing `Node`.
pub fn customize_schema(content_type: &ContentType, prefix: &TypePrefix) -> Vec<TypeDecl> {
    let name = prefix.entry_type(&content_type.uid);
    let out = build_schema(&content_type.schema, &name, prefix);

    let mut types = out.types;
    types.push(TypeDecl::link_type());
    types.extend(out.references.into_iter().map(TypeDecl::Union));
    types.push(TypeDecl::Object(ObjectType {
        name,
        fields: out.fields,
        interfaces: vec![NODE_INTERFACE.to_string()],
    }));
    types
}

/// Declarations for several content types, keeping the first declaration of
/// each type name.
pub fn schema_declarations(content_types: &[ContentType], prefix: &TypePrefix) -> Vec<TypeDecl> {
    let mut seen = HashSet::new();
    content_types
        .iter()
        .flat_map(|ct| customize_schema(ct, prefix))
        .filter(|decl| seen.insert(decl.name().to_string()))
        .collect()
}

fn scalar(name: &str, field: &FieldDef) -> Option<FieldSpec> {
    Some(FieldSpec::plain(TypeRef::for_field(name, field.multiple, field)))
}

fn group_field(
    field: &FieldDef,
    parent: &str,
    prefix: &TypePrefix,
    out: &mut SchemaOutput,
) -> Option<FieldSpec> {
    let name = format!("{}_{}", parent, field.uid);
    let nested = build_schema(&field.schema, &name, prefix);
    out.types.extend(nested.types);
    out.references.extend(nested.references);

    if nested.fields.is_empty() {
        debug!(field = %field.uid, "Skipping group with no typed fields");
        return None;
    }

    out.types.push(TypeDecl::Object(ObjectType {
        name: name.clone(),
        fields: nested.fields,
        interfaces: Vec::new(),
    }));
    Some(FieldSpec::plain(TypeRef::for_field(name, field.multiple, field)))
}

fn blocks_field(
    field: &FieldDef,
    parent: &str,
    prefix: &TypePrefix,
    out: &mut SchemaOutput,
) -> Option<FieldSpec> {
    let wrapper = format!("{}_{}", parent, field.uid);
    let mut wrapper_fields = BTreeMap::new();

    for block in &field.blocks {
        let name = format!("{}_{}", wrapper, block.uid);
        let nested = build_schema(&block.schema, &name, prefix);
        out.types.extend(nested.types);
        out.references.extend(nested.references);

        if nested.fields.is_empty() {
            continue;
        }

        out.types.push(TypeDecl::Object(ObjectType {
            name: name.clone(),
            fields: nested.fields,
            interfaces: Vec::new(),
        }));
        wrapper_fields.insert(block.uid.clone(), FieldSpec::plain(TypeRef::named(name)));
    }

    if wrapper_fields.is_empty() {
        debug!(field = %field.uid, "Skipping modular blocks with no typed blocks");
        return None;
    }

    out.types.push(TypeDecl::Object(ObjectType {
        name: wrapper.clone(),
        fields: wrapper_fields,
        interfaces: Vec::new(),
    }));
    Some(FieldSpec::plain(TypeRef::for_field(wrapper, true, field)))
}

fn reference_field(
    field: &FieldDef,
    parent: &str,
    prefix: &TypePrefix,
    out: &mut SchemaOutput,
) -> Option<FieldSpec> {
    // Stored references are always arrays of node ids.
    match field.reference_to.as_slice() {
        [] => {
            debug!(field = %field.uid, "Skipping reference with no target");
            None
        }
        [target] => Some(FieldSpec::linked(TypeRef::for_field(
            prefix.entry_type(target),
            true,
            field,
        ))),
        targets => {
            let union = UnionType {
                name: format!("{}_{}_Union", parent, field.uid),
                types: targets.iter().map(|t| prefix.entry_type(t)).collect(),
            };
            let ty = TypeRef::for_field(union.name.clone(), true, field);
            out.references.push(union);
            Some(FieldSpec::linked(ty))
        }
    }
}
