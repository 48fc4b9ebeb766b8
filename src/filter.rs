use chrono::NaiveDate;

use crate::models::{CategoryFilter, Memo};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ViewMode {
    /// Native store order; the only mode in which reordering is offered.
    Manual,
    /// Newest `created_at` first.
    Sorted,
}

pub fn view_mode(filter: &CategoryFilter, search: &str) -> ViewMode {
    if search.is_empty() && *filter == CategoryFilter::All {
        ViewMode::Manual
    } else {
        ViewMode::Sorted
    }
}

pub fn matches_category(memo: &Memo, filter: &CategoryFilter) -> bool {
    match filter {
        CategoryFilter::All => true,
        CategoryFilter::Uncategorized => memo.category.is_none(),
        CategoryFilter::Label(label) => memo.category.as_deref() == Some(label.as_str()),
    }
}

pub fn matches_search(memo: &Memo, search: &str) -> bool {
    if search.is_empty() {
        return true;
    }
    let needle = search.to_lowercase();
    memo.title.to_lowercase().contains(&needle) || memo.content.to_lowercase().contains(&needle)
}

/// Visible memos in display order.
pub fn visible_memos<'a>(
    memos: &'a [Memo],
    filter: &CategoryFilter,
    search: &str,
) -> Vec<&'a Memo> {
    let mut visible: Vec<&Memo> = memos
        .iter()
        .filter(|memo| matches_category(memo, filter) && matches_search(memo, search))
        .collect();
    if view_mode(filter, search) == ViewMode::Sorted {
        visible.sort_by(|a, b| b.created_at.cmp(&a.created_at));
    }
    visible
}

/// Search text produced by picking a day in the date picker.
pub fn date_search_text(date: NaiveDate) -> String {
    date.format("%Y-%m-%d").to_string()
}
