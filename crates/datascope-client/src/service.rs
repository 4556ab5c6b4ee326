use crate::error::Result;
use async_trait::async_trait;
use datascope_types::{
    ContainerPath, ContainerSummary, EntityInfo, EntitySummary, QueryOptions, QueryPage,
    ServiceCapabilities,
};

/// The backend contract the browser consumes.
///
/// Implementations are remote (HTTP against a query gateway) or
/// scripted (test fixtures); the browser treats them identically. All
/// methods are read-only except `delete_entity`.
#[async_trait]
pub trait DataService: Send + Sync {
    /// Capability metadata for the service: hierarchy-by-depth table,
    /// capability tags, optional structured filter schema. Fetched once
    /// per service selection.
    async fn capabilities(&self) -> Result<ServiceCapabilities>;

    /// List containers at `path`. The root path lists top-level
    /// containers (databases, buckets, keyspaces).
    async fn list_containers(&self, path: &ContainerPath) -> Result<Vec<ContainerSummary>>;

    /// List entities (tables, collections, objects) held by the
    /// container at `path`.
    async fn list_entities(&self, path: &ContainerPath) -> Result<Vec<EntitySummary>>;

    /// Detailed information about one entity, including its schema
    /// fields when the backend can describe them.
    async fn entity_info(&self, path: &ContainerPath, entity: &str) -> Result<EntityInfo>;

    /// Run a paginated, sorted, filtered query against an entity.
    /// Filters pass through verbatim; the client never interprets them.
    async fn query_data(
        &self,
        path: &ContainerPath,
        entity: &str,
        options: &QueryOptions,
    ) -> Result<QueryPage>;

    /// Fetch a downloadable entity's raw bytes and content type.
    async fn download(
        &self,
        path: &ContainerPath,
        entity: &str,
    ) -> Result<(Vec<u8>, Option<String>)>;

    /// Delete an entity.
    async fn delete_entity(&self, path: &ContainerPath, entity: &str) -> Result<()>;
}
