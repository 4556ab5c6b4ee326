use datascope_types::{FilterValue, QueryOptions, SortOrder};

/// Pagination, sort and filter state for the entity data view.
///
/// The draft filter is what the user is editing; the applied filter is
/// what the last issued query used. Applying a filter or changing the
/// sort always resets the page to 1: page N of a differently ordered or
/// differently filtered result set is never shown.
#[derive(Debug, Clone, PartialEq)]
pub struct QueryState {
    page: usize,
    page_size: usize,
    sort_by: Option<String>,
    sort_order: SortOrder,
    applied_filter: Option<FilterValue>,
    draft_filter: Option<FilterValue>,
}

impl QueryState {
    pub fn new(page_size: usize) -> Self {
        Self {
            page: 1,
            page_size: page_size.max(1),
            sort_by: None,
            sort_order: SortOrder::Asc,
            applied_filter: None,
            draft_filter: None,
        }
    }

    /// 1-based page number.
    pub fn page(&self) -> usize {
        self.page
    }

    pub fn page_size(&self) -> usize {
        self.page_size
    }

    pub fn offset(&self) -> usize {
        (self.page - 1) * self.page_size
    }

    pub fn sort_by(&self) -> Option<&str> {
        self.sort_by.as_deref()
    }

    pub fn sort_order(&self) -> SortOrder {
        self.sort_order
    }

    pub fn applied_filter(&self) -> Option<&FilterValue> {
        self.applied_filter.as_ref()
    }

    pub fn draft_filter(&self) -> Option<&FilterValue> {
        self.draft_filter.as_ref()
    }

    pub fn set_draft_filter(&mut self, draft: Option<FilterValue>) {
        self.draft_filter = draft;
    }

    /// Promote the draft filter to applied and reset pagination. Blank
    /// drafts clear the applied filter.
    pub fn apply_filter(&mut self) {
        self.applied_filter = self
            .draft_filter
            .clone()
            .filter(|f| !f.is_empty());
        self.page = 1;
    }

    pub fn clear_filter(&mut self) {
        self.draft_filter = None;
        self.applied_filter = None;
        self.page = 1;
    }

    /// Sort by `field`: clicking the current sort field flips the order,
    /// a new field starts ascending. Either way the page resets.
    pub fn set_sort(&mut self, field: impl Into<String>) {
        let field = field.into();
        if self.sort_by.as_deref() == Some(field.as_str()) {
            self.sort_order = self.sort_order.toggle();
        } else {
            self.sort_by = Some(field);
            self.sort_order = SortOrder::Asc;
        }
        self.page = 1;
    }

    pub fn next_page(&mut self) {
        self.page += 1;
    }

    pub fn prev_page(&mut self) {
        self.page = self.page.saturating_sub(1).max(1);
    }

    /// Full reset, used when the selected entity changes.
    pub fn reset(&mut self) {
        let page_size = self.page_size;
        *self = Self::new(page_size);
    }

    /// The wire options for the current state.
    pub fn to_options(&self) -> QueryOptions {
        QueryOptions {
            limit: self.page_size,
            offset: self.offset(),
            sort_by: self.sort_by.clone(),
            sort_order: self.sort_order,
            filter: self.applied_filter.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_apply_filter_resets_page() {
        let mut state = QueryState::new(50);
        state.next_page();
        state.next_page();
        assert_eq!(state.page(), 3);

        state.set_draft_filter(Some(FilterValue::Text("id > 10".to_string())));
        state.apply_filter();
        assert_eq!(state.page(), 1);
        assert_eq!(
            state.applied_filter(),
            Some(&FilterValue::Text("id > 10".to_string()))
        );
    }

    #[test]
    fn test_blank_draft_clears_applied() {
        let mut state = QueryState::new(50);
        state.set_draft_filter(Some(FilterValue::Text("x = 1".to_string())));
        state.apply_filter();
        state.set_draft_filter(Some(FilterValue::Text("  ".to_string())));
        state.apply_filter();
        assert_eq!(state.applied_filter(), None);
    }

    #[test]
    fn test_sort_same_field_toggles_new_field_resets_asc() {
        let mut state = QueryState::new(50);
        state.set_sort("timestamp");
        assert_eq!(state.sort_by(), Some("timestamp"));
        assert_eq!(state.sort_order(), SortOrder::Asc);

        state.set_sort("timestamp");
        assert_eq!(state.sort_order(), SortOrder::Desc);

        state.set_sort("name");
        assert_eq!(state.sort_by(), Some("name"));
        assert_eq!(state.sort_order(), SortOrder::Asc);
    }

    #[test]
    fn test_sort_resets_page() {
        let mut state = QueryState::new(50);
        state.next_page();
        state.set_sort("id");
        assert_eq!(state.page(), 1);
        assert_eq!(state.offset(), 0);
    }

    #[test]
    fn test_any_filter_or_sort_sequence_lands_on_page_one() {
        let mut state = QueryState::new(25);
        for i in 0..10 {
            state.next_page();
            if i % 2 == 0 {
                state.set_sort(format!("field{}", i % 3));
            } else {
                state.set_draft_filter(Some(FilterValue::Text(format!("v = {i}"))));
                state.apply_filter();
            }
            assert_eq!(state.page(), 1);
        }
    }

    #[test]
    fn test_prev_page_clamps_at_one() {
        let mut state = QueryState::new(50);
        state.prev_page();
        assert_eq!(state.page(), 1);
        state.next_page();
        state.prev_page();
        assert_eq!(state.page(), 1);
    }

    #[test]
    fn test_offset_derivation() {
        let mut state = QueryState::new(100);
        assert_eq!(state.offset(), 0);
        state.next_page();
        assert_eq!(state.offset(), 100);
        assert_eq!(state.to_options().limit, 100);
        assert_eq!(state.to_options().offset, 100);
    }
}
