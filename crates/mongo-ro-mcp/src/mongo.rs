//! MongoDB implementation of the backend traits.

use crate::backend::{BackendError, CollectionInfo, Connector, DatabaseHandle};
use async_trait::async_trait;
use futures::TryStreamExt;
use mongo_ro_core::{ReadPreferenceMode, UpstreamConfig};
use mongo_ro_policy::Pipeline;
use mongodb::bson::{Bson, Document, doc};
use mongodb::options::{ClientOptions, ReadPreference, SelectionCriteria};
use mongodb::results::CollectionSpecification;
use mongodb::Client;
use serde_json::Value;
use std::sync::Arc;

/// Database that hosts administrative commands.
pub const ADMIN_DATABASE: &str = "admin";

impl From<mongodb::error::Error> for BackendError {
    fn from(err: mongodb::error::Error) -> Self {
        BackendError::new(err.to_string())
    }
}

/// Builds a [`MongoHandle`] from a connection string.
pub struct MongoConnector {
    uri: String,
    upstream: UpstreamConfig,
}

impl MongoConnector {
    pub fn new(uri: impl Into<String>, upstream: UpstreamConfig) -> Self {
        Self {
            uri: uri.into(),
            upstream,
        }
    }
}

#[async_trait]
impl Connector for MongoConnector {
    async fn connect(&self) -> Result<Arc<dyn DatabaseHandle>, BackendError> {
        let mut options = ClientOptions::parse(&self.uri).await?;
        let criteria = SelectionCriteria::ReadPreference(read_preference(
            self.upstream.read_preference,
        ));
        options.selection_criteria = Some(criteria.clone());
        if options.app_name.is_none() {
            options.app_name = Some(self.upstream.app_name.clone());
        }

        // Client construction does not touch the network.
        let client = Client::with_options(options)?;
        client
            .database(ADMIN_DATABASE)
            .run_command(doc! { "ping": 1 })
            .selection_criteria(criteria.clone())
            .await?;

        tracing::debug!(
            read_preference = ?self.upstream.read_preference,
            "MongoDB deployment reachable"
        );

        Ok(Arc::new(MongoHandle { client, criteria }))
    }
}

fn read_preference(mode: ReadPreferenceMode) -> ReadPreference {
    match mode {
        ReadPreferenceMode::Primary => ReadPreference::Primary,
        ReadPreferenceMode::PrimaryPreferred => ReadPreference::PrimaryPreferred {
            options: Default::default(),
        },
        ReadPreferenceMode::Secondary => ReadPreference::Secondary {
            options: Default::default(),
        },
        ReadPreferenceMode::SecondaryPreferred => ReadPreference::SecondaryPreferred {
            options: Default::default(),
        },
        ReadPreferenceMode::Nearest => ReadPreference::Nearest {
            options: Default::default(),
        },
    }
}

/// A connected MongoDB client.
pub struct MongoHandle {
    client: Client,
    criteria: SelectionCriteria,
}

#[async_trait]
impl DatabaseHandle for MongoHandle {
    async fn list_databases(&self) -> Result<Vec<Value>, BackendError> {
        let reply = self
            .client
            .database(ADMIN_DATABASE)
            .run_command(doc! { "listDatabases": 1 })
            .selection_criteria(self.criteria.clone())
            .await?;

        let databases = reply
            .get_array("databases")
            .map_err(|e| BackendError::new(format!("unexpected listDatabases reply: {}", e)))?;

        Ok(databases
            .iter()
            .cloned()
            .map(Bson::into_relaxed_extjson)
            .collect())
    }

    async fn list_collections(&self, database: &str) -> Result<Vec<CollectionInfo>, BackendError> {
        let specs: Vec<CollectionSpecification> = self
            .client
            .database(database)
            .list_collections()
            .await?
            .try_collect()
            .await?;

        Ok(specs
            .into_iter()
            .map(|spec| CollectionInfo::new(spec.name))
            .collect())
    }

    async fn aggregate(
        &self,
        database: &str,
        collection: &str,
        pipeline: Pipeline,
    ) -> Result<Vec<Value>, BackendError> {
        let stages = pipeline
            .into_iter()
            .map(Document::try_from)
            .collect::<Result<Vec<_>, _>>()
            .map_err(|e| BackendError::new(format!("invalid pipeline stage: {}", e)))?;

        let documents: Vec<Document> = self
            .client
            .database(database)
            .collection::<Document>(collection)
            .aggregate(stages)
            .await?
            .try_collect()
            .await?;

        Ok(documents
            .into_iter()
            .map(|document| Bson::Document(document).into_relaxed_extjson())
            .collect())
    }

    async fn close(&self) {
        // Cursors of calls still in flight are not waited for.
        self.client.clone().shutdown().immediate(true).await;
    }
}
