use crate::error::{Error, Result};
use crate::service::DataService;
use async_trait::async_trait;
use datascope_types::{
    ContainerPath, ContainerSummary, EntityCountHint, EntityInfo, EntitySummary, FieldDef,
    FieldType, Problem, QueryOptions, QueryPage, ServiceCapabilities,
};
use serde::Deserialize;

/// Containers reporting more entities than this are hinted `large` and
/// keep their entities out of the tree.
const LARGE_ENTITY_COUNT: u64 = 500;

/// HTTP implementation of [`DataService`] against a query gateway.
///
/// Routes follow the gateway's layout:
/// `/external-services/{id}/query/support`,
/// `/external-services/{id}/query/containers[/{path}]`,
/// `.../containers/{path}/entities[/{entity}[/data|/download]]`.
/// Error responses carry problem-details JSON (`{title, detail, status}`)
/// which is surfaced unchanged.
pub struct HttpDataService {
    client: reqwest::Client,
    base_url: String,
    service_id: i64,
}

impl HttpDataService {
    pub fn new(base_url: impl Into<String>, service_id: i64) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
            service_id,
        }
    }

    fn url(&self, suffix: &str) -> String {
        format!(
            "{}/external-services/{}/query/{}",
            self.base_url, self.service_id, suffix
        )
    }

    fn encode_path(path: &ContainerPath) -> String {
        path.segments
            .iter()
            .map(|s| urlencoding::encode(s).into_owned())
            .collect::<Vec<_>>()
            .join("/")
    }

    async fn decode<T: serde::de::DeserializeOwned>(response: reqwest::Response) -> Result<T> {
        let status = response.status();
        let body = response.bytes().await?;

        if !status.is_success() {
            let problem = serde_json::from_slice::<Problem>(&body).unwrap_or_else(|_| {
                Problem::new(
                    status.as_u16(),
                    "HTTP Error",
                    String::from_utf8_lossy(&body).into_owned(),
                )
            });
            return Err(Error::Backend(problem));
        }

        Ok(serde_json::from_slice(&body)?)
    }
}

#[async_trait]
impl DataService for HttpDataService {
    async fn capabilities(&self) -> Result<ServiceCapabilities> {
        let response = self.client.get(self.url("support")).send().await?;
        let support: SupportWire = Self::decode(response).await?;

        if !support.supported {
            let reason = support
                .reason
                .unwrap_or_else(|| "Service does not support the query explorer".to_string());
            return Err(Error::Backend(Problem::new(
                400,
                "Explorer Not Supported",
                reason,
            )));
        }

        Ok(ServiceCapabilities {
            service_type: support.service_type,
            capabilities: support.capabilities,
            hierarchy: support.hierarchy,
            filter_schema: support.filter_schema,
        })
    }

    async fn list_containers(&self, path: &ContainerPath) -> Result<Vec<ContainerSummary>> {
        let url = if path.is_root() {
            self.url("containers")
        } else {
            self.url(&format!("containers/{}", Self::encode_path(path)))
        };
        let response = self.client.get(url).send().await?;
        let containers: Vec<ContainerWire> = Self::decode(response).await?;
        Ok(containers.into_iter().map(ContainerWire::into_summary).collect())
    }

    async fn list_entities(&self, path: &ContainerPath) -> Result<Vec<EntitySummary>> {
        let url = self.url(&format!("containers/{}/entities", Self::encode_path(path)));
        let response = self.client.get(url).send().await?;
        let entities: Vec<EntityWire> = Self::decode(response).await?;
        Ok(entities.into_iter().map(EntityWire::into_summary).collect())
    }

    async fn entity_info(&self, path: &ContainerPath, entity: &str) -> Result<EntityInfo> {
        let url = self.url(&format!(
            "containers/{}/entities/{}",
            Self::encode_path(path),
            urlencoding::encode(entity)
        ));
        let response = self.client.get(url).send().await?;
        let info: EntityInfoWire = Self::decode(response).await?;
        Ok(info.into_info())
    }

    async fn query_data(
        &self,
        path: &ContainerPath,
        entity: &str,
        options: &QueryOptions,
    ) -> Result<QueryPage> {
        let url = self.url(&format!(
            "containers/{}/entities/{}/data",
            Self::encode_path(path),
            urlencoding::encode(entity)
        ));

        let body = serde_json::json!({
            "filters": options.filter.as_ref().map(|f| f.to_wire()),
            "limit": options.limit,
            "offset": options.offset,
            "sort_by": options.sort_by,
            "sort_order": options.sort_order,
        });

        let response = self.client.post(url).json(&body).send().await?;
        let page: QueryPageWire = Self::decode(response).await?;
        Ok(page.into_page())
    }

    async fn download(
        &self,
        path: &ContainerPath,
        entity: &str,
    ) -> Result<(Vec<u8>, Option<String>)> {
        let url = self.url(&format!(
            "containers/{}/entities/{}/download",
            Self::encode_path(path),
            urlencoding::encode(entity)
        ));
        let response = self.client.get(url).send().await?;
        let status = response.status();
        let content_type = response
            .headers()
            .get(reqwest::header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(String::from);
        let body = response.bytes().await?;

        if !status.is_success() {
            let problem = serde_json::from_slice::<Problem>(&body).unwrap_or_else(|_| {
                Problem::new(status.as_u16(), "Download Failed", "")
            });
            return Err(Error::Backend(problem));
        }

        Ok((body.to_vec(), content_type))
    }

    async fn delete_entity(&self, path: &ContainerPath, entity: &str) -> Result<()> {
        let url = self.url(&format!(
            "containers/{}/entities/{}",
            Self::encode_path(path),
            urlencoding::encode(entity)
        ));
        let response = self.client.delete(url).send().await?;
        let status = response.status();
        if !status.is_success() {
            let body = response.bytes().await?;
            let problem = serde_json::from_slice::<Problem>(&body).unwrap_or_else(|_| {
                Problem::new(status.as_u16(), "Delete Failed", "")
            });
            return Err(Error::Backend(problem));
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Wire shapes
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
struct SupportWire {
    supported: bool,
    service_type: String,
    #[serde(default)]
    capabilities: Vec<String>,
    #[serde(default)]
    hierarchy: Vec<datascope_types::HierarchyLevel>,
    #[serde(default)]
    filter_schema: Option<serde_json::Value>,
    #[serde(default)]
    reason: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ContainerWire {
    name: String,
    container_type: String,
    #[serde(default)]
    can_contain_containers: Option<bool>,
    #[serde(default)]
    can_contain_entities: Option<bool>,
    #[serde(default)]
    metadata: serde_json::Value,
}

impl ContainerWire {
    fn into_summary(self) -> ContainerSummary {
        let hint = match self.metadata.get("entity_count").and_then(|v| v.as_u64()) {
            Some(count) if count > LARGE_ENTITY_COUNT => EntityCountHint::Large,
            Some(_) => EntityCountHint::Small,
            None => EntityCountHint::Unknown,
        };
        ContainerSummary {
            name: self.name,
            container_type: self.container_type,
            can_list_containers: self.can_contain_containers,
            can_list_entities: self.can_contain_entities,
            entity_count_hint: hint,
        }
    }
}

#[derive(Debug, Deserialize)]
struct EntityWire {
    name: String,
    entity_type: String,
    #[serde(default)]
    row_count: Option<u64>,
    #[serde(default)]
    size_bytes: Option<u64>,
}

impl EntityWire {
    fn into_summary(self) -> EntitySummary {
        EntitySummary {
            name: self.name,
            entity_type: self.entity_type,
            row_count: self.row_count,
            size_bytes: self.size_bytes,
        }
    }
}

#[derive(Debug, Deserialize)]
struct FieldWire {
    name: String,
    field_type: String,
    #[serde(default)]
    nullable: bool,
}

impl FieldWire {
    fn into_def(self) -> FieldDef {
        let field_type = match self.field_type.to_lowercase().as_str() {
            "null" => FieldType::Null,
            "boolean" | "bool" => FieldType::Boolean,
            "int32" => FieldType::Int32,
            "int64" => FieldType::Int64,
            "float32" => FieldType::Float32,
            "float64" => FieldType::Float64,
            "bytes" => FieldType::Bytes,
            "date" => FieldType::Date,
            "timestamp" => FieldType::Timestamp,
            "json" => FieldType::Json,
            "uuid" => FieldType::Uuid,
            _ => FieldType::String,
        };
        FieldDef {
            name: self.name,
            field_type,
            nullable: self.nullable,
        }
    }
}

#[derive(Debug, Deserialize)]
struct EntityInfoWire {
    entity: String,
    entity_type: String,
    #[serde(default)]
    fields: Vec<FieldWire>,
    #[serde(default)]
    row_count: Option<u64>,
    #[serde(default)]
    size_bytes: Option<u64>,
    #[serde(default)]
    metadata: Option<serde_json::Value>,
}

impl EntityInfoWire {
    fn into_info(self) -> EntityInfo {
        EntityInfo {
            name: self.entity,
            entity_type: self.entity_type,
            fields: self.fields.into_iter().map(FieldWire::into_def).collect(),
            row_count: self.row_count,
            size_bytes: self.size_bytes,
            metadata: self.metadata,
        }
    }
}

#[derive(Debug, Deserialize)]
struct QueryPageWire {
    #[serde(default)]
    fields: Vec<FieldWire>,
    #[serde(default)]
    rows: Vec<serde_json::Value>,
    #[serde(default)]
    total_count: Option<u64>,
    #[serde(default)]
    returned_count: Option<usize>,
    #[serde(default)]
    execution_time_ms: Option<u64>,
}

impl QueryPageWire {
    fn into_page(self) -> QueryPage {
        let rows: Vec<serde_json::Map<String, serde_json::Value>> = self
            .rows
            .into_iter()
            .filter_map(|row| match row {
                serde_json::Value::Object(map) => Some(map),
                _ => None,
            })
            .collect();
        let returned_count = self.returned_count.unwrap_or(rows.len());
        QueryPage {
            fields: self.fields.into_iter().map(FieldWire::into_def).collect(),
            rows,
            total_count: self.total_count,
            returned_count,
            execution_ms: self.execution_time_ms.unwrap_or(0),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_container_wire_hint_derivation() {
        let wire: ContainerWire = serde_json::from_value(serde_json::json!({
            "name": "public",
            "container_type": "schema",
            "can_contain_containers": false,
            "can_contain_entities": true,
            "metadata": {"entity_count": 12}
        }))
        .unwrap();
        let summary = wire.into_summary();
        assert_eq!(summary.entity_count_hint, EntityCountHint::Small);
        assert_eq!(summary.can_list_entities, Some(true));

        let wire: ContainerWire = serde_json::from_value(serde_json::json!({
            "name": "events",
            "container_type": "schema",
            "metadata": {"entity_count": 100000}
        }))
        .unwrap();
        assert_eq!(wire.into_summary().entity_count_hint, EntityCountHint::Large);
    }

    #[test]
    fn test_field_wire_type_mapping() {
        let wire = FieldWire {
            name: "id".to_string(),
            field_type: "Int64".to_string(),
            nullable: false,
        };
        assert_eq!(wire.into_def().field_type, FieldType::Int64);

        let wire = FieldWire {
            name: "blob".to_string(),
            field_type: "something-new".to_string(),
            nullable: true,
        };
        assert_eq!(wire.into_def().field_type, FieldType::String);
    }

    #[test]
    fn test_query_page_wire_drops_non_object_rows() {
        let wire: QueryPageWire = serde_json::from_value(serde_json::json!({
            "fields": [{"name": "id", "field_type": "int64", "nullable": false}],
            "rows": [{"id": 1}, "garbage", {"id": 2}],
            "total_count": 2,
            "execution_time_ms": 5
        }))
        .unwrap();
        let page = wire.into_page();
        assert_eq!(page.rows.len(), 2);
        assert_eq!(page.returned_count, 2);
        assert_eq!(page.execution_ms, 5);
    }
}
