use async_trait::async_trait;
use datascope_client::{DataService, Error, Result};
use datascope_types::{
    ContainerPath, ContainerSummary, EntityInfo, EntitySummary, FieldDef, FieldType, Problem,
    QueryOptions, QueryPage, ServiceCapabilities, SortOrder,
};
use std::collections::HashMap;
use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, Ordering};

/// One recorded `query_data` call, kept for interaction assertions.
#[derive(Debug, Clone)]
pub struct RecordedQuery {
    pub path: String,
    pub entity: String,
    pub options: QueryOptions,
}

/// In-memory `DataService` scripted from fixtures.
///
/// Listings and rows come from plain maps keyed by slash-joined path
/// (and `path::entity` for entity-level data). Failure switches make
/// exactly the next matching call fail with a canned problem, which is
/// how error-surface tests drive the retry paths.
pub struct ScriptedService {
    capabilities: ServiceCapabilities,
    containers: HashMap<String, Vec<ContainerSummary>>,
    entities: HashMap<String, Vec<EntitySummary>>,
    infos: HashMap<String, EntityInfo>,
    rows: HashMap<String, Vec<serde_json::Map<String, serde_json::Value>>>,
    objects: HashMap<String, (Vec<u8>, Option<String>)>,

    fail_next_capabilities: AtomicBool,
    fail_next_list: AtomicBool,
    fail_next_query: AtomicBool,
    fail_next_delete: AtomicBool,

    queries: Mutex<Vec<RecordedQuery>>,
}

fn entity_key(path: &ContainerPath, entity: &str) -> String {
    format!("{}::{}", path.join(), entity)
}

impl ScriptedService {
    pub fn new(capabilities: ServiceCapabilities) -> Self {
        Self {
            capabilities,
            containers: HashMap::new(),
            entities: HashMap::new(),
            infos: HashMap::new(),
            rows: HashMap::new(),
            objects: HashMap::new(),
            fail_next_capabilities: AtomicBool::new(false),
            fail_next_list: AtomicBool::new(false),
            fail_next_query: AtomicBool::new(false),
            fail_next_delete: AtomicBool::new(false),
            queries: Mutex::new(Vec::new()),
        }
    }

    pub fn with_containers(mut self, path: &str, containers: Vec<ContainerSummary>) -> Self {
        self.containers.insert(path.to_string(), containers);
        self
    }

    pub fn with_entities(mut self, path: &str, entities: Vec<EntitySummary>) -> Self {
        self.entities.insert(path.to_string(), entities);
        self
    }

    pub fn with_rows(
        mut self,
        path: &str,
        entity: &str,
        rows: Vec<serde_json::Map<String, serde_json::Value>>,
    ) -> Self {
        let key = entity_key(&ContainerPath::parse(path), entity);
        self.rows.insert(key, rows);
        self
    }

    pub fn with_object(
        mut self,
        path: &str,
        entity: &str,
        bytes: Vec<u8>,
        content_type: Option<&str>,
    ) -> Self {
        let key = entity_key(&ContainerPath::parse(path), entity);
        self.objects
            .insert(key, (bytes, content_type.map(String::from)));
        self
    }

    pub fn with_info(mut self, path: &str, entity: &str, info: EntityInfo) -> Self {
        let key = entity_key(&ContainerPath::parse(path), entity);
        self.infos.insert(key, info);
        self
    }

    /// Make the next capabilities fetch fail.
    pub fn fail_next_capabilities(&self) {
        self.fail_next_capabilities.store(true, Ordering::SeqCst);
    }

    /// Make the next container or entity listing fail.
    pub fn fail_next_list(&self) {
        self.fail_next_list.store(true, Ordering::SeqCst);
    }

    /// Make the next data query fail.
    pub fn fail_next_query(&self) {
        self.fail_next_query.store(true, Ordering::SeqCst);
    }

    /// Make the next delete fail.
    pub fn fail_next_delete(&self) {
        self.fail_next_delete.store(true, Ordering::SeqCst);
    }

    /// All recorded `query_data` calls in issue order.
    pub fn recorded_queries(&self) -> Vec<RecordedQuery> {
        self.queries.lock().unwrap().clone()
    }

    fn take(flag: &AtomicBool) -> bool {
        flag.swap(false, Ordering::SeqCst)
    }

    fn canned_problem(what: &str) -> Error {
        Error::Backend(Problem::new(
            500,
            "Scripted Failure",
            format!("Injected {} failure", what),
        ))
    }

    fn infer_fields(rows: &[serde_json::Map<String, serde_json::Value>]) -> Vec<FieldDef> {
        let Some(first) = rows.first() else {
            return Vec::new();
        };
        first
            .iter()
            .map(|(name, value)| {
                let field_type = match value {
                    serde_json::Value::Bool(_) => FieldType::Boolean,
                    serde_json::Value::Number(n) if n.is_i64() || n.is_u64() => FieldType::Int64,
                    serde_json::Value::Number(_) => FieldType::Float64,
                    serde_json::Value::Object(_) | serde_json::Value::Array(_) => FieldType::Json,
                    serde_json::Value::Null => FieldType::Null,
                    serde_json::Value::String(_) => FieldType::String,
                };
                FieldDef {
                    name: name.clone(),
                    field_type,
                    nullable: true,
                }
            })
            .collect()
    }
}

#[async_trait]
impl DataService for ScriptedService {
    async fn capabilities(&self) -> Result<ServiceCapabilities> {
        if Self::take(&self.fail_next_capabilities) {
            return Err(Self::canned_problem("capabilities"));
        }
        Ok(self.capabilities.clone())
    }

    async fn list_containers(&self, path: &ContainerPath) -> Result<Vec<ContainerSummary>> {
        if Self::take(&self.fail_next_list) {
            return Err(Self::canned_problem("list"));
        }
        Ok(self.containers.get(&path.join()).cloned().unwrap_or_default())
    }

    async fn list_entities(&self, path: &ContainerPath) -> Result<Vec<EntitySummary>> {
        if Self::take(&self.fail_next_list) {
            return Err(Self::canned_problem("list"));
        }
        Ok(self.entities.get(&path.join()).cloned().unwrap_or_default())
    }

    async fn entity_info(&self, path: &ContainerPath, entity: &str) -> Result<EntityInfo> {
        let key = entity_key(path, entity);
        if let Some(info) = self.infos.get(&key) {
            return Ok(info.clone());
        }
        if let Some((bytes, content_type)) = self.objects.get(&key) {
            return Ok(EntityInfo {
                name: entity.to_string(),
                entity_type: "object".to_string(),
                fields: Vec::new(),
                row_count: None,
                size_bytes: Some(bytes.len() as u64),
                metadata: content_type
                    .as_ref()
                    .map(|ct| serde_json::json!({ "content_type": ct })),
            });
        }
        if let Some(rows) = self.rows.get(&key) {
            return Ok(EntityInfo {
                name: entity.to_string(),
                entity_type: "table".to_string(),
                fields: Self::infer_fields(rows),
                row_count: Some(rows.len() as u64),
                size_bytes: None,
                metadata: None,
            });
        }
        Err(Error::Backend(Problem::new(
            404,
            "Not Found",
            format!("Entity '{}' not found under /{}", entity, path.join()),
        )))
    }

    async fn query_data(
        &self,
        path: &ContainerPath,
        entity: &str,
        options: &QueryOptions,
    ) -> Result<QueryPage> {
        self.queries.lock().unwrap().push(RecordedQuery {
            path: path.join(),
            entity: entity.to_string(),
            options: options.clone(),
        });

        if Self::take(&self.fail_next_query) {
            return Err(Self::canned_problem("query"));
        }

        let key = entity_key(path, entity);
        let Some(all_rows) = self.rows.get(&key) else {
            return Err(Error::Backend(Problem::new(
                404,
                "Not Found",
                format!("Entity '{}' not found under /{}", entity, path.join()),
            )));
        };

        let mut rows = all_rows.clone();
        if let Some(sort_by) = &options.sort_by {
            rows.sort_by(|a, b| {
                let left = a.get(sort_by);
                let right = b.get(sort_by);
                let ord = compare_values(left, right);
                match options.sort_order {
                    SortOrder::Asc => ord,
                    SortOrder::Desc => ord.reverse(),
                }
            });
        }

        let total = rows.len() as u64;
        let page: Vec<_> = rows
            .into_iter()
            .skip(options.offset)
            .take(options.limit)
            .collect();
        let returned = page.len();

        Ok(QueryPage {
            fields: Self::infer_fields(all_rows),
            rows: page,
            total_count: Some(total),
            returned_count: returned,
            execution_ms: 1,
        })
    }

    async fn download(
        &self,
        path: &ContainerPath,
        entity: &str,
    ) -> Result<(Vec<u8>, Option<String>)> {
        let key = entity_key(path, entity);
        match self.objects.get(&key) {
            Some((bytes, content_type)) => Ok((bytes.clone(), content_type.clone())),
            None => Err(Error::Backend(Problem::new(
                404,
                "Not Found",
                format!("Object '{}' not found under /{}", entity, path.join()),
            ))),
        }
    }

    async fn delete_entity(&self, _path: &ContainerPath, _entity: &str) -> Result<()> {
        if Self::take(&self.fail_next_delete) {
            return Err(Self::canned_problem("delete"));
        }
        Ok(())
    }
}

fn compare_values(
    left: Option<&serde_json::Value>,
    right: Option<&serde_json::Value>,
) -> std::cmp::Ordering {
    use serde_json::Value;
    match (left, right) {
        (Some(Value::Number(a)), Some(Value::Number(b))) => a
            .as_f64()
            .partial_cmp(&b.as_f64())
            .unwrap_or(std::cmp::Ordering::Equal),
        (Some(Value::String(a)), Some(Value::String(b))) => a.cmp(b),
        (Some(Value::Bool(a)), Some(Value::Bool(b))) => a.cmp(b),
        (Some(_), None) => std::cmp::Ordering::Greater,
        (None, Some(_)) => std::cmp::Ordering::Less,
        _ => std::cmp::Ordering::Equal,
    }
}
