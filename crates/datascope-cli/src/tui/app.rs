use crossterm::event::{KeyCode, KeyEvent};
use datascope_runtime::BrowserSession;
use datascope_types::{ContainerPath, FilterMode, FilterValue};
use std::collections::BTreeMap;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Focus {
    Tree,
    Data,
}

/// One visible tree row, snapshotted for rendering and cursor
/// resolution. The live store cannot be borrowed across awaits in the
/// key handler, so rows are materialized per frame.
#[derive(Debug, Clone)]
pub struct TreeRow {
    pub path: String,
    pub name: String,
    pub depth: u32,
    pub is_entity: bool,
    pub expandable: bool,
    pub expanded: bool,
    pub shows_table: bool,
}

/// Which text field is currently capturing keystrokes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Editing {
    None,
    TreeFilter,
    QueryFilter,
}

pub struct App {
    session: BrowserSession,
    focus: Focus,
    tree_cursor: usize,
    /// Column cursor in the query table; the sort target.
    col_cursor: usize,
    /// Row cursor in the leaf-entity list.
    entity_cursor: usize,
    tree_filter: String,
    query_draft: String,
    editing: Editing,
    should_quit: bool,
}

impl App {
    pub fn new(session: BrowserSession) -> Self {
        Self {
            session,
            focus: Focus::Tree,
            tree_cursor: 0,
            col_cursor: 0,
            entity_cursor: 0,
            tree_filter: String::new(),
            query_draft: String::new(),
            editing: Editing::None,
            should_quit: false,
        }
    }

    pub fn should_quit(&self) -> bool {
        self.should_quit
    }

    pub fn session(&self) -> &BrowserSession {
        &self.session
    }

    pub fn focus(&self) -> Focus {
        self.focus
    }

    pub fn tree_cursor(&self) -> usize {
        self.tree_cursor
    }

    pub fn col_cursor(&self) -> usize {
        self.col_cursor
    }

    pub fn entity_cursor(&self) -> usize {
        self.entity_cursor
    }

    pub fn tree_filter(&self) -> &str {
        &self.tree_filter
    }

    pub fn query_draft(&self) -> &str {
        &self.query_draft
    }

    pub fn is_editing_tree_filter(&self) -> bool {
        self.editing == Editing::TreeFilter
    }

    pub fn is_editing_query_filter(&self) -> bool {
        self.editing == Editing::QueryFilter
    }

    pub fn filter_mode(&self) -> FilterMode {
        self.session.filter_mode()
    }

    /// Snapshot of the rows the tree pane shows, after the tree filter.
    pub fn tree_rows(&self) -> Vec<TreeRow> {
        let filtered;
        let store = if self.tree_filter.trim().is_empty() {
            self.session.store()
        } else {
            filtered = self.session.filtered_tree(&self.tree_filter);
            &filtered
        };

        store
            .visible_rows()
            .into_iter()
            .map(|node| TreeRow {
                path: node.path.clone(),
                name: node.name.clone(),
                depth: node.depth,
                is_entity: !node.is_container(),
                expandable: node.is_expandable(),
                expanded: node.is_expanded,
                shows_table: node.shows_entity_table(),
            })
            .collect()
    }

    pub async fn handle_key(&mut self, key: KeyEvent) {
        match self.editing {
            Editing::TreeFilter => self.handle_tree_filter_key(key),
            Editing::QueryFilter => self.handle_query_filter_key(key).await,
            Editing::None => self.handle_normal_key(key).await,
        }
    }

    fn handle_tree_filter_key(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Enter => self.editing = Editing::None,
            KeyCode::Esc => {
                self.tree_filter.clear();
                self.editing = Editing::None;
            }
            KeyCode::Backspace => {
                self.tree_filter.pop();
            }
            KeyCode::Char(c) => {
                self.tree_filter.push(c);
                self.tree_cursor = 0;
            }
            _ => {}
        }
    }

    async fn handle_query_filter_key(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Enter => {
                self.editing = Editing::None;
                let draft = draft_to_filter(&self.query_draft, self.session.filter_mode());
                self.session.set_draft_filter(draft);
                self.session.apply_filter().await;
            }
            KeyCode::Esc => self.editing = Editing::None,
            KeyCode::Backspace => {
                self.query_draft.pop();
            }
            KeyCode::Char(c) => self.query_draft.push(c),
            _ => {}
        }
    }

    async fn handle_normal_key(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Char('q') => self.should_quit = true,
            KeyCode::Tab => {
                self.focus = match self.focus {
                    Focus::Tree => Focus::Data,
                    Focus::Data => Focus::Tree,
                };
            }
            KeyCode::Char('j') | KeyCode::Down => self.move_cursor(1),
            KeyCode::Char('k') | KeyCode::Up => self.move_cursor(-1),
            KeyCode::Char('h') | KeyCode::Left => self.move_column(-1),
            KeyCode::Char('l') | KeyCode::Right => self.move_column(1),
            KeyCode::Enter | KeyCode::Char(' ') => self.activate().await,
            KeyCode::Char('s') => self.sort_by_selected_column().await,
            KeyCode::Char('n') => self.session.next_page().await,
            KeyCode::Char('p') => self.session.prev_page().await,
            KeyCode::Char('/') => self.editing = Editing::TreeFilter,
            KeyCode::Char('f') => {
                if self.session.filter_mode() != FilterMode::None
                    && self.session.page().is_some()
                {
                    self.editing = Editing::QueryFilter;
                }
            }
            KeyCode::Char('r') => self.retry().await,
            KeyCode::Char('x') | KeyCode::Esc => self.dismiss(),
            _ => {}
        }
    }

    fn move_cursor(&mut self, delta: isize) {
        match self.focus {
            Focus::Tree => {
                let len = self.tree_rows().len();
                self.tree_cursor = step(self.tree_cursor, delta, len);
            }
            Focus::Data => {
                let len = self.session.leaf_entities().map(|e| e.len()).unwrap_or(0);
                self.entity_cursor = step(self.entity_cursor, delta, len);
            }
        }
    }

    fn move_column(&mut self, delta: isize) {
        if self.focus != Focus::Data {
            return;
        }
        let len = self
            .session
            .page()
            .map(|p| p.fields.len().max(1))
            .unwrap_or(0);
        self.col_cursor = step(self.col_cursor, delta, len);
    }

    async fn activate(&mut self) {
        match self.focus {
            Focus::Tree => {
                let Some(row) = self.tree_rows().into_iter().nth(self.tree_cursor) else {
                    return;
                };
                let path = ContainerPath::parse(&row.path);
                if row.is_entity {
                    if let Some(parent) = path.parent()
                        && let Some(name) = path.name().map(String::from)
                    {
                        self.session.select_entity(&parent, &name).await;
                        self.col_cursor = 0;
                    }
                } else {
                    self.session.select_container(&path).await;
                    self.entity_cursor = 0;
                    self.col_cursor = 0;
                }
            }
            Focus::Data => {
                // The leaf-entity list is the only activatable data view.
                let Some(entities) = self.session.leaf_entities() else {
                    return;
                };
                let Some(entity) = entities.get(self.entity_cursor) else {
                    return;
                };
                let name = entity.name.clone();
                let Some(path) = self.session.location().path.clone() else {
                    return;
                };
                self.session.select_entity(&path, &name).await;
                self.col_cursor = 0;
            }
        }
    }

    async fn sort_by_selected_column(&mut self) {
        let Some(field) = self
            .session
            .page()
            .and_then(|p| p.fields.get(self.col_cursor))
            .map(|f| f.name.clone())
        else {
            return;
        };
        self.session.sort_by(&field).await;
    }

    async fn retry(&mut self) {
        if self.session.errors().panel.is_some() {
            self.session.retry_init().await;
        } else if self.session.errors().inline.is_some() {
            self.session.retry_load().await;
        } else if self.session.errors().query.is_some() {
            self.session.retry_query().await;
        }
    }

    fn dismiss(&mut self) {
        if self.session.errors().inline.is_some() {
            self.session.dismiss_inline_error();
        } else if self.session.errors().delete.is_some() {
            self.session.clear_delete_error();
        } else {
            self.tree_filter.clear();
        }
    }
}

fn step(current: usize, delta: isize, len: usize) -> usize {
    if len == 0 {
        return 0;
    }
    let next = current as isize + delta;
    next.clamp(0, len as isize - 1) as usize
}

/// Turn the filter editor's contents into the backend filter form the
/// service expects. Text mode passes the draft through verbatim;
/// structured mode reads whitespace-separated `key=value` pairs, with
/// values kept as JSON scalars when they parse as one.
fn draft_to_filter(draft: &str, mode: FilterMode) -> Option<FilterValue> {
    let draft = draft.trim();
    if draft.is_empty() {
        return None;
    }
    match mode {
        FilterMode::None => None,
        FilterMode::Text => Some(FilterValue::Text(draft.to_string())),
        FilterMode::Structured => {
            let mut fields = BTreeMap::new();
            for pair in draft.split_whitespace() {
                let Some((key, value)) = pair.split_once('=') else {
                    continue;
                };
                let value = serde_json::from_str(value)
                    .unwrap_or_else(|_| serde_json::Value::String(value.to_string()));
                fields.insert(key.to_string(), value);
            }
            if fields.is_empty() {
                None
            } else {
                Some(FilterValue::Structured(fields))
            }
        }
    }
}
