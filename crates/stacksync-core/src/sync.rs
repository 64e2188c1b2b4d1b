//! The incremental sync cycle.
//!
//! A cycle has three phases: [`Syncer::prepare`] fetches content types into a
//! [`SyncContext`], [`Syncer::declare_schema`] hands schema declarations to a
//! sink, and [`Syncer::source_nodes`] applies one changelog to the store.

use serde::Serialize;
use serde_json::{Map, Value};
use tracing::{debug, info, instrument, warn};

use crate::OWNER;
use crate::Result;
use crate::config::SyncConfig;
use crate::content::{Changelog, ContentType, SyncEvent};
use crate::error::InvalidInputError;
use crate::index::ReferenceIndex;
use crate::materialize::{
    asset_node_id, entry_node_id, process_asset, process_content_type, process_entry,
};
use crate::normalize::{normalize_asset, normalize_entry};
use crate::schema::{self, TypeDecl};
use crate::traits::{
    ContentDigester, Fetcher, IdFactory, NodeStore, SchemaSink, Sha256Digest, StatusStore,
    Uuid5Ids,
};
use crate::types::{NodeId, SyncCursor};

/// Content types fetched for one cycle.
///
/// Carried from the schema phase into the sourcing phase so both see the same
/// definitions.
#[derive(Debug, Clone, Default)]
pub struct SyncContext {
    pub content_types: Vec<ContentType>,
}

impl SyncContext {
    pub fn new(content_types: Vec<ContentType>) -> Self {
        Self { content_types }
    }

    pub fn content_type(&self, uid: &str) -> Option<&ContentType> {
        self.content_types.iter().find(|ct| ct.uid == uid)
    }
}

/// What one cycle did.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SyncReport {
    pub entries_created: usize,
    pub assets_created: usize,
    pub content_types_created: usize,
    pub nodes_deleted: usize,
    pub ignored_events: usize,
    pub cursor: SyncCursor,
    /// True when no cursor was stored, so the changelog was a full export.
    pub initial: bool,
}

impl SyncReport {
    fn new(cursor: SyncCursor, initial: bool) -> Self {
        Self {
            entries_created: 0,
            assets_created: 0,
            content_types_created: 0,
            nodes_deleted: 0,
            ignored_events: 0,
            cursor,
            initial,
        }
    }
}

/// Drives sync cycles for one configured stack against one store.
pub struct Syncer<F, S> {
    config: SyncConfig,
    fetcher: F,
    store: S,
    ids: Box<dyn IdFactory + Send + Sync>,
    digester: Box<dyn ContentDigester + Send + Sync>,
}

impl<F, S> Syncer<F, S>
where
    F: Fetcher,
    S: NodeStore + StatusStore,
{
    /// A syncer using [`Uuid5Ids`] and [`Sha256Digest`].
    pub fn new(config: SyncConfig, fetcher: F, store: S) -> Self {
        Self {
            config,
            fetcher,
            store,
            ids: Box::new(Uuid5Ids::default()),
            digester: Box::new(Sha256Digest),
        }
    }

    /// Replace the node id factory.
    pub fn with_ids(mut self, ids: impl IdFactory + Send + Sync + 'static) -> Self {
        self.ids = Box::new(ids);
        self
    }

    /// Replace the content digester.
    pub fn with_digester(mut self, digester: impl ContentDigester + Send + Sync + 'static) -> Self {
        self.digester = Box::new(digester);
        self
    }

    pub fn config(&self) -> &SyncConfig {
        &self.config
    }

    pub fn fetcher(&self) -> &F {
        &self.fetcher
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn store_mut(&mut self) -> &mut S {
        &mut self.store
    }

    pub fn into_store(self) -> S {
        self.store
    }

    /// The cursor the next cycle will resume from, if any.
    ///
    /// # Errors
    ///
    /// Returns an error if the status store cannot be read.
    pub fn cursor(&self) -> Result<Option<SyncCursor>> {
        let status = self.store.status()?;
        Ok(status
            .get(&self.config.cursor_key())
            .and_then(Value::as_str)
            .map(SyncCursor::new))
    }

    /// Fetch content types for this cycle.
    ///
    /// A failed fetch is logged and yields an empty context; the cycle still
    /// runs, with entries stored unnormalized.
    #[instrument(skip(self), fields(api_key = %self.config.api_key))]
    pub async fn prepare(&self) -> SyncContext {
        match self.fetcher.fetch_content_types(&self.config).await {
            Ok(content_types) => {
                debug!(count = content_types.len(), "Fetched content types");
                SyncContext::new(content_types)
            }
            Err(e) => {
                warn!(error = %e, "Failed to fetch content types");
                SyncContext::default()
            }
        }
    }

    /// Schema declarations for every content type of the cycle.
    pub fn schema_declarations(&self, ctx: &SyncContext) -> Vec<TypeDecl> {
        schema::schema_declarations(&ctx.content_types, &self.config.type_prefix)
    }

    /// Hand schema declarations to `sink` when schema generation is enabled.
    ///
    /// Returns the number of declarations handed over.
    ///
    /// # Errors
    ///
    /// Returns an error if the sink fails.
    pub fn customize_schema<K>(&self, ctx: &SyncContext, sink: &mut K) -> Result<usize>
    where
        K: SchemaSink + ?Sized,
    {
        hand_over_schema(&self.config, ctx, sink)
    }

    /// [`customize_schema`](Self::customize_schema) into the syncer's own store.
    ///
    /// # Errors
    ///
    /// Returns an error if the store fails.
    pub fn declare_schema(&mut self, ctx: &SyncContext) -> Result<usize>
    where
        S: SchemaSink,
    {
        hand_over_schema(&self.config, ctx, &mut self.store)
    }

    /// Apply one changelog to the store and persist the next cursor.
    ///
    /// # Errors
    ///
    /// Returns an error if the changelog cannot be fetched, a published item
    /// has no identity, or the store fails. The cursor is only persisted once
    /// every change has been applied.
    #[instrument(skip(self, ctx), fields(api_key = %self.config.api_key))]
    pub async fn source_nodes(&mut self, ctx: &SyncContext) -> Result<SyncReport> {
        let cursor = self.cursor()?;
        let initial = cursor.is_none();
        if initial {
            info!("No stored cursor, running initial sync");
        }

        let data = self.fetcher.fetch_data(&self.config, cursor.as_ref()).await?;
        let changelog = Changelog::from_items(data.sync_data);
        let mut report = SyncReport::new(data.sync_token, initial);

        for item in &changelog.ignored {
            match item.event {
                SyncEvent::EntryPublished => warn!("Skipping published entry without content_type_uid"),
                _ => warn!(event = %item.event, "Ignoring unknown sync event"),
            }
        }
        report.ignored_events = changelog.ignored.len();

        let prefix = self.config.type_prefix.clone();
        let index = ReferenceIndex::build(&mut self.store, &changelog, self.ids.as_ref(), &prefix)?;

        for item in &changelog.entry_published {
            // Entries without a content type are partitioned into `ignored`.
            let Some(ct_uid) = item.content_type_uid.as_deref() else {
                continue;
            };

            let fields = match ctx.content_type(ct_uid) {
                Some(ct) => normalize_entry(ct, &item.data, &index, self.ids.as_ref(), &prefix)?,
                None => {
                    warn!(content_type = ct_uid, "Unknown content type, storing entry unnormalized");
                    raw_record(&item.data)?
                }
            };

            let node = process_entry(ct_uid, fields, self.ids.as_ref(), self.digester.as_ref(), &prefix)?;
            debug!(id = %node.id, node_type = node.type_name(), "Created entry node");
            self.store.create_node(node)?;
            report.entries_created += 1;
        }

        for item in &changelog.asset_published {
            let fields = normalize_asset(&item.data)?;
            let node = process_asset(fields, self.ids.as_ref(), self.digester.as_ref(), &prefix)?;
            debug!(id = %node.id, "Created asset node");
            self.store.create_node(node)?;
            report.assets_created += 1;
        }

        for ct in &ctx.content_types {
            let node = process_content_type(ct, self.ids.as_ref(), self.digester.as_ref(), &prefix)?;
            debug!(id = %node.id, content_type = %ct.uid, "Created content type node");
            self.store.create_node(node)?;
            report.content_types_created += 1;
        }

        for item in changelog.entry_removals() {
            match entry_node_id(&item.data, self.ids.as_ref(), &prefix) {
                Ok(id) => report.nodes_deleted += usize::from(self.delete_if_present(&id)?),
                Err(e) => warn!(event = %item.event, error = %e, "Skipping removal without identity"),
            }
        }

        for item in changelog.asset_removals() {
            match asset_node_id(&item.data, self.ids.as_ref(), &prefix) {
                Ok(id) => report.nodes_deleted += usize::from(self.delete_if_present(&id)?),
                Err(e) => warn!(event = %item.event, error = %e, "Skipping removal without identity"),
            }
        }

        for item in &changelog.content_type_deleted {
            let uid = item
                .content_type_uid
                .as_deref()
                .or_else(|| item.data.get("uid").and_then(Value::as_str));
            match uid {
                Some(uid) => report.nodes_deleted += self.delete_type(&prefix.entry_type(uid))?,
                None => warn!("Skipping content type deletion without uid"),
            }
        }

        let mut status = Map::new();
        status.insert(
            self.config.cursor_key(),
            Value::String(report.cursor.as_str().to_string()),
        );
        self.store.set_status(status)?;

        info!(
            entries = report.entries_created,
            assets = report.assets_created,
            content_types = report.content_types_created,
            deleted = report.nodes_deleted,
            ignored = report.ignored_events,
            "Sync cycle complete"
        );

        Ok(report)
    }

    /// One full cycle: prepare, declare schema into the store, source nodes.
    ///
    /// # Errors
    ///
    /// See [`source_nodes`](Self::source_nodes).
    pub async fn run_cycle(&mut self) -> Result<SyncReport>
    where
        S: SchemaSink,
    {
        let ctx = self.prepare().await;
        self.declare_schema(&ctx)?;
        self.source_nodes(&ctx).await
    }

    fn delete_if_present(&mut self, id: &NodeId) -> Result<bool> {
        if self.store.get_node(id)?.is_none() {
            return Ok(false);
        }
        self.store.delete_node(id)?;
        debug!(id = %id, "Deleted node");
        Ok(true)
    }

    fn delete_type(&mut self, type_name: &str) -> Result<usize> {
        let doomed: Vec<NodeId> = self
            .store
            .owned_nodes(OWNER)?
            .into_iter()
            .filter(|node| node.type_name() == type_name)
            .map(|node| node.id)
            .collect();

        for id in &doomed {
            self.store.delete_node(id)?;
        }
        debug!(node_type = type_name, count = doomed.len(), "Deleted nodes of content type");
        Ok(doomed.len())
    }
}

fn hand_over_schema<K>(config: &SyncConfig, ctx: &SyncContext, sink: &mut K) -> Result<usize>
where
    K: SchemaSink + ?Sized,
{
    if !config.enable_schema_generation {
        return Ok(0);
    }
    let types = schema::schema_declarations(&ctx.content_types, &config.type_prefix);
    let count = types.len();
    sink.create_types(types)?;
    debug!(count, "Declared schema types");
    Ok(count)
}

fn raw_record(data: &Value) -> Result<Map<String, Value>> {
    data.as_object().cloned().ok_or_else(|| {
        InvalidInputError::Other {
            message: "entry record must be a JSON object".to_string(),
        }
        .into()
    })
}
