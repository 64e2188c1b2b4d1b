//! Node identities and final node assembly.
//!
//! The `*_node_id` functions are the only place identity keys are built. The
//! reference index, the normalizer and the delete path all go through them, so
//! a reference resolves to exactly the id its target was stored under.

use serde_json::{Map, Value};

use crate::OWNER;
use crate::Result;
use crate::content::{ContentType, record_locale, record_uid};
use crate::error::InvalidInputError;
use crate::node::{Node, NodeInternal, strip_reserved};
use crate::traits::{ContentDigester, IdFactory};
use crate::types::{NodeId, TypePrefix};

/// Identity of an entry from its `uid` and locale.
pub fn entry_id(uid: &str, locale: &str, ids: &dyn IdFactory, prefix: &TypePrefix) -> NodeId {
    ids.create_node_id(&format!("{}-entry-{}-{}", prefix.lowercase(), uid, locale))
}

/// Identity of an asset from its `uid` and locale.
pub fn asset_id(uid: &str, locale: &str, ids: &dyn IdFactory, prefix: &TypePrefix) -> NodeId {
    ids.create_node_id(&format!("{}-assets-{}-{}", prefix.lowercase(), uid, locale))
}

/// Identity of a raw entry record.
///
/// # Errors
///
/// Returns an error if the record has no `uid` or no locale.
pub fn entry_node_id(data: &Value, ids: &dyn IdFactory, prefix: &TypePrefix) -> Result<NodeId> {
    let (uid, locale) = identity_parts(data, "entry")?;
    Ok(entry_id(uid, locale, ids, prefix))
}

/// Identity of a raw asset record.
///
/// # Errors
///
/// Returns an error if the record has no `uid` or no locale.
pub fn asset_node_id(data: &Value, ids: &dyn IdFactory, prefix: &TypePrefix) -> Result<NodeId> {
    let (uid, locale) = identity_parts(data, "asset")?;
    Ok(asset_id(uid, locale, ids, prefix))
}

/// Identity of a content-type descriptor node.
pub fn content_type_node_id(
    content_type: &ContentType,
    ids: &dyn IdFactory,
    prefix: &TypePrefix,
) -> NodeId {
    ids.create_node_id(&format!(
        "{}-contentType-{}",
        prefix.lowercase(),
        content_type.uid
    ))
}

fn identity_parts<'a>(data: &'a Value, kind: &str) -> Result<(&'a str, &'a str)> {
    let uid = record_uid(data).ok_or_else(|| InvalidInputError::MissingUid {
        context: format!("{} record {}", kind, data),
    })?;
    let locale = record_locale(data).ok_or_else(|| InvalidInputError::Other {
        message: format!("{} '{}' has no locale", kind, uid),
    })?;
    Ok((uid, locale))
}

/// Wrap a normalized entry into a node of type `{prefix}_{content_type}`.
pub fn process_entry(
    content_type_uid: &str,
    entry: Map<String, Value>,
    ids: &dyn IdFactory,
    digester: &dyn ContentDigester,
    prefix: &TypePrefix,
) -> Result<Node> {
    let payload = Value::Object(entry);
    let id = entry_node_id(&payload, ids, prefix)?;
    Ok(finish(id, prefix.entry_type(content_type_uid), payload, digester))
}

/// Wrap an asset into a node of type `{prefix}_assets`.
pub fn process_asset(
    asset: Map<String, Value>,
    ids: &dyn IdFactory,
    digester: &dyn ContentDigester,
    prefix: &TypePrefix,
) -> Result<Node> {
    let payload = Value::Object(asset);
    let id = asset_node_id(&payload, ids, prefix)?;
    Ok(finish(id, prefix.asset_type(), payload, digester))
}

/// Wrap a content type into a descriptor node of type `{prefix}ContentTypes`.
pub fn process_content_type(
    content_type: &ContentType,
    ids: &dyn IdFactory,
    digester: &dyn ContentDigester,
    prefix: &TypePrefix,
) -> Result<Node> {
    let id = content_type_node_id(content_type, ids, prefix);
    let payload = serde_json::to_value(content_type).map_err(|e| InvalidInputError::Other {
        message: format!("content type '{}': {}", content_type.uid, e),
    })?;
    Ok(finish(id, prefix.content_types_type(), payload, digester))
}

fn finish(id: NodeId, type_name: String, payload: Value, digester: &dyn ContentDigester) -> Node {
    let mut fields = match payload {
        Value::Object(map) => map,
        _ => Map::new(),
    };
    strip_reserved(&mut fields);
    let content_digest = digester.digest(&Value::Object(fields.clone()));
    Node::new(
        id,
        NodeInternal {
            type_name,
            content_digest,
            owner: OWNER.to_string(),
        },
        fields,
    )
}
