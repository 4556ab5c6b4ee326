use datascope_client::DataService;
use datascope_engine::{CapabilityResolver, Location, QueryState, TreeStore, location_to_plan};
use datascope_types::{
    ContainerPath, EntityInfo, EntitySummary, FilterMode, FilterValue, Problem, QueryOptions,
    QueryPage, ServiceCapabilities,
};
use std::collections::HashMap;
use std::sync::Arc;

/// Error surfaces of one session, grouped by where they render.
///
/// Every backend failure lands here as local state; nothing propagates
/// past the session API.
#[derive(Debug, Default, Clone)]
pub struct SessionErrors {
    /// Startup failure (capability table or root list). Blocks the tree
    /// entirely until a retry succeeds.
    pub panel: Option<Problem>,
    /// Lazy child-load failure at a path. Dismissible; the rest of the
    /// loaded tree stays usable.
    pub inline: Option<(String, Problem)>,
    /// Data query failure. The previous successful page stays visible
    /// underneath the banner.
    pub query: Option<Problem>,
    /// Delete failure. No automatic retry.
    pub delete: Option<Problem>,
}

/// A tagged query issue. Responses are only applied when the ticket's
/// generation is still the latest for the current selection, so a slow
/// older response can never overwrite a newer one.
#[derive(Debug, Clone)]
pub struct QueryTicket {
    pub generation: u64,
    pub path: ContainerPath,
    pub entity: String,
    pub options: QueryOptions,
}

/// One browser session: one service viewed in one tab.
///
/// Owns the tree forest, the selection, and the query lifecycle. All
/// mutation goes through `&mut self`, so reads are always consistent
/// snapshots; there is no interior locking and no concurrent writer.
pub struct BrowserSession {
    service: Arc<dyn DataService>,
    resolver: CapabilityResolver,
    store: TreeStore,

    location: Location,
    /// Marker preventing redundant re-expansion when `navigate_to` is
    /// handed the location it last executed.
    last_expanded: Option<Location>,

    query: QueryState,
    page: Option<QueryPage>,
    entity_info: Option<EntityInfo>,
    /// Entities of a selected leaf container, for the table view.
    leaf_entities: Option<Vec<EntitySummary>>,

    errors: SessionErrors,

    /// Downloaded content keyed by node path; purged on removal so a
    /// deleted entity can never serve stale bytes.
    content_cache: HashMap<String, Vec<u8>>,

    /// Latest issued query generation.
    generation: u64,
    page_size: usize,
}

impl BrowserSession {
    pub fn new(service: Arc<dyn DataService>, page_size: usize) -> Self {
        Self {
            service,
            resolver: CapabilityResolver::new(),
            store: TreeStore::new(),
            location: Location::default(),
            last_expanded: None,
            query: QueryState::new(page_size),
            page: None,
            entity_info: None,
            leaf_entities: None,
            errors: SessionErrors::default(),
            content_cache: HashMap::new(),
            generation: 0,
            page_size,
        }
    }

    // -- startup ----------------------------------------------------------

    /// Fetch the capability table and the root container list. Failures
    /// become the panel error; `retry_init` runs the same sequence again.
    pub async fn init(&mut self) {
        self.errors.panel = None;

        let capabilities = match self.service.capabilities().await {
            Ok(capabilities) => capabilities,
            Err(err) => {
                self.errors.panel = Some(err.into_problem());
                return;
            }
        };
        self.resolver.load(capabilities);

        let roots = match self.service.list_containers(&ContainerPath::root()).await {
            Ok(roots) => roots,
            Err(err) => {
                self.errors.panel = Some(err.into_problem());
                return;
            }
        };
        self.store.insert_roots(&roots, &self.resolver);
    }

    pub async fn retry_init(&mut self) {
        self.init().await;
    }

    // -- navigation -------------------------------------------------------

    /// Reconcile the session to a location (initial open, or a shared
    /// location string): expand and load every ancestor prefix
    /// sequentially, then apply the selection.
    ///
    /// Each step's load is awaited before the next prefix is considered
    /// because a level's children are unknown until its parent resolves;
    /// the plan is recomputed after every step, so it always reflects
    /// what actually landed.
    pub async fn navigate_to(&mut self, location: Location) {
        if self.last_expanded.as_ref() == Some(&location) {
            return;
        }
        self.location = location.clone();

        loop {
            let plan = location_to_plan(&self.location, &self.store);
            let Some(step) = plan.steps.first().cloned() else {
                break;
            };
            let key = step.path.join();

            // The parent chain is settled but this segment is not in it:
            // the location points at something that does not exist.
            if self.store.get(&key).is_none() {
                break;
            }

            if step.needs_expand {
                self.store.expand(&key);
            }
            if step.needs_load {
                if let Err(problem) = self.load_children(&step.path).await {
                    self.errors.inline = Some((key, problem));
                    break;
                }
            }
        }

        self.last_expanded = Some(location);
        self.on_selection_changed().await;
    }

    /// User click on a container row: toggle it (loading lazily on first
    /// expansion) and write the selection. Containers hinted large never
    /// expand; their entities go to the table view.
    pub async fn select_container(&mut self, path: &ContainerPath) {
        let key = path.join();
        let Some(node) = self.store.get(&key) else {
            return;
        };

        if node.is_expandable() {
            let expanding = !node.is_expanded;
            let loaded = node.is_loaded;
            self.store.toggle_expansion(&key);
            if expanding
                && !loaded
                && let Err(problem) = self.load_children(path).await
            {
                // Expanded implies loaded or in flight; the flight failed.
                self.store.collapse(&key);
                self.errors.inline = Some((key.clone(), problem));
            }
        }

        self.location = Location::container(path.clone());
        self.last_expanded = Some(self.location.clone());
        self.on_selection_changed().await;
    }

    /// User click on an entity row (in the tree or the leaf table).
    pub async fn select_entity(&mut self, path: &ContainerPath, entity: &str) {
        self.location = Location::entity(path.clone(), entity);
        self.last_expanded = Some(self.location.clone());
        self.on_selection_changed().await;
    }

    /// Re-issue the last failed child load.
    pub async fn retry_load(&mut self) {
        let Some((key, _)) = self.errors.inline.take() else {
            return;
        };
        let path = ContainerPath::parse(&key);
        self.store.expand(&key);
        if let Err(problem) = self.load_children(&path).await {
            self.store.collapse(&key);
            self.errors.inline = Some((key, problem));
        }
    }

    pub fn dismiss_inline_error(&mut self) {
        self.errors.inline = None;
    }

    async fn load_children(&mut self, path: &ContainerPath) -> Result<(), Problem> {
        let key = path.join();
        let Some(node) = self.store.get(&key) else {
            return Ok(());
        };
        let want_containers = node.can_list_containers;
        // Entities of large containers never enter the tree, so there is
        // no point fetching the listing here.
        let want_entities = node.can_list_entities && !node.shows_entity_table();

        let containers = if want_containers {
            self.service
                .list_containers(path)
                .await
                .map_err(|e| e.into_problem())?
        } else {
            Vec::new()
        };
        let entities = if want_entities {
            self.service
                .list_entities(path)
                .await
                .map_err(|e| e.into_problem())?
        } else {
            Vec::new()
        };

        self.store
            .load_children_at(&key, &containers, &entities, &self.resolver);
        Ok(())
    }

    async fn on_selection_changed(&mut self) {
        self.query = QueryState::new(self.page_size);
        self.page = None;
        self.entity_info = None;
        self.leaf_entities = None;
        self.errors.query = None;

        let Some(path) = self.location.path.clone() else {
            return;
        };

        match self.location.entity.clone() {
            Some(entity) => {
                match self.service.entity_info(&path, &entity).await {
                    Ok(info) => {
                        let downloadable = info.is_downloadable();
                        self.entity_info = Some(info);
                        // Blobs are fetched through the download path,
                        // never queried for rows.
                        if !downloadable {
                            self.refresh_query().await;
                        }
                    }
                    Err(err) => {
                        self.errors.query = Some(err.into_problem());
                    }
                }
            }
            None => {
                let wants_table = self
                    .store
                    .get(&path.join())
                    .map(|n| n.shows_entity_table())
                    .unwrap_or(false);
                if wants_table {
                    match self.service.list_entities(&path).await {
                        Ok(list) => self.leaf_entities = Some(list),
                        Err(err) => {
                            self.errors.inline = Some((path.join(), err.into_problem()));
                        }
                    }
                }
            }
        }
    }

    // -- querying ---------------------------------------------------------

    /// Tag a new query for the current selection. Returns `None` when no
    /// queryable entity is selected.
    pub fn begin_query(&mut self) -> Option<QueryTicket> {
        let path = self.location.path.clone()?;
        let entity = self.location.entity.clone()?;
        if self
            .entity_info
            .as_ref()
            .map(|i| i.is_downloadable())
            .unwrap_or(false)
        {
            return None;
        }

        self.generation += 1;
        Some(QueryTicket {
            generation: self.generation,
            path,
            entity,
            options: self.query.to_options(),
        })
    }

    /// Apply a settled query response. Stale responses, meaning an older
    /// generation or a ticket for a selection that has since changed,
    /// are discarded.
    pub fn apply_query_response(
        &mut self,
        ticket: &QueryTicket,
        result: Result<QueryPage, Problem>,
    ) {
        if ticket.generation != self.generation {
            return;
        }
        if self.location.path.as_ref() != Some(&ticket.path)
            || self.location.entity.as_deref() != Some(ticket.entity.as_str())
        {
            return;
        }

        match result {
            Ok(page) => {
                self.page = Some(page);
                self.errors.query = None;
            }
            Err(problem) => {
                // Optimistic retention: the previous page stays on screen
                // under the banner.
                self.errors.query = Some(problem);
            }
        }
    }

    pub async fn refresh_query(&mut self) {
        let Some(ticket) = self.begin_query() else {
            return;
        };
        let result = self
            .service
            .query_data(&ticket.path, &ticket.entity, &ticket.options)
            .await
            .map_err(|e| e.into_problem());
        self.apply_query_response(&ticket, result);
    }

    /// Re-issue the current query with identical parameters.
    pub async fn retry_query(&mut self) {
        self.refresh_query().await;
    }

    pub fn set_draft_filter(&mut self, draft: Option<FilterValue>) {
        self.query.set_draft_filter(draft);
    }

    pub async fn apply_filter(&mut self) {
        self.query.apply_filter();
        self.refresh_query().await;
    }

    pub async fn clear_filter(&mut self) {
        self.query.clear_filter();
        self.refresh_query().await;
    }

    pub async fn sort_by(&mut self, field: &str) {
        self.query.set_sort(field);
        self.refresh_query().await;
    }

    /// Whether the next page can exist: a full page came back.
    pub fn has_next_page(&self) -> bool {
        self.page
            .as_ref()
            .map(|p| p.returned_count >= self.query.page_size())
            .unwrap_or(false)
    }

    pub async fn next_page(&mut self) {
        if !self.has_next_page() {
            return;
        }
        self.query.next_page();
        self.refresh_query().await;
    }

    pub async fn prev_page(&mut self) {
        if self.query.page() <= 1 {
            return;
        }
        self.query.prev_page();
        self.refresh_query().await;
    }

    // -- content ----------------------------------------------------------

    /// Fetch a downloadable entity's bytes, caching by node path.
    pub async fn download(
        &mut self,
        path: &ContainerPath,
        entity: &str,
    ) -> Result<Vec<u8>, Problem> {
        let key = path.child(entity).join();
        if let Some(bytes) = self.content_cache.get(&key) {
            return Ok(bytes.clone());
        }
        let (bytes, _content_type) = self
            .service
            .download(path, entity)
            .await
            .map_err(|e| e.into_problem())?;
        self.content_cache.insert(key, bytes.clone());
        Ok(bytes)
    }

    /// Delete an entity, drop its subtree from the tree, and purge any
    /// cached content under the removed paths.
    pub async fn delete_entity(&mut self, path: &ContainerPath, entity: &str) {
        self.errors.delete = None;
        if let Err(err) = self.service.delete_entity(path, entity).await {
            self.errors.delete = Some(err.into_problem());
            return;
        }

        let node_path = path.child(entity).join();
        for removed in self.store.remove_at(&node_path) {
            self.content_cache.remove(&removed);
        }
        // Large-hint containers keep entities out of the tree, but their
        // content may still be cached.
        self.content_cache.remove(&node_path);

        if self.location.entity.as_deref() == Some(entity)
            && self.location.path.as_ref() == Some(path)
        {
            self.location = Location::container(path.clone());
            self.last_expanded = Some(self.location.clone());
            self.query = QueryState::new(self.page_size);
            self.page = None;
            self.entity_info = None;
        }
    }

    pub fn clear_delete_error(&mut self) {
        self.errors.delete = None;
    }

    // -- accessors --------------------------------------------------------

    pub fn store(&self) -> &TreeStore {
        &self.store
    }

    /// Read-only filtered projection of the tree for the filter box.
    pub fn filtered_tree(&self, substring: &str) -> TreeStore {
        self.store.filter(substring)
    }

    pub fn resolver(&self) -> &CapabilityResolver {
        &self.resolver
    }

    /// How the connected service expects filters to be expressed.
    pub fn filter_mode(&self) -> FilterMode {
        self.resolver
            .service()
            .map(ServiceCapabilities::filter_mode)
            .unwrap_or(FilterMode::None)
    }

    pub fn location(&self) -> &Location {
        &self.location
    }

    /// The shareable form of the current selection.
    pub fn location_string(&self) -> String {
        self.location.to_query_string()
    }

    pub fn query_state(&self) -> &QueryState {
        &self.query
    }

    pub fn page(&self) -> Option<&QueryPage> {
        self.page.as_ref()
    }

    pub fn entity_info(&self) -> Option<&EntityInfo> {
        self.entity_info.as_ref()
    }

    pub fn leaf_entities(&self) -> Option<&[EntitySummary]> {
        self.leaf_entities.as_deref()
    }

    pub fn errors(&self) -> &SessionErrors {
        &self.errors
    }

    pub fn is_cached(&self, node_path: &str) -> bool {
        self.content_cache.contains_key(node_path)
    }
}
