//! Filtered, paginated projection of the spot list.

use std::num::NonZeroUsize;

use shared::domain::Spot;

pub const DEFAULT_ROWS_PER_PAGE: NonZeroUsize = match NonZeroUsize::new(5) {
    Some(n) => n,
    None => unreachable!(),
};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ViewState {
    search_term: String,
    page: usize,
    rows_per_page: NonZeroUsize,
}

impl Default for ViewState {
    fn default() -> Self {
        Self::new(DEFAULT_ROWS_PER_PAGE)
    }
}

impl ViewState {
    pub fn new(rows_per_page: NonZeroUsize) -> Self {
        Self {
            search_term: String::new(),
            page: 0,
            rows_per_page,
        }
    }

    pub fn search_term(&self) -> &str {
        &self.search_term
    }

    pub fn page(&self) -> usize {
        self.page
    }

    pub fn rows_per_page(&self) -> NonZeroUsize {
        self.rows_per_page
    }

    pub fn set_search_term(&mut self, term: impl Into<String>) {
        self.search_term = term.into();
    }

    pub fn set_page(&mut self, page: usize) {
        self.page = page;
    }

    pub fn set_rows_per_page(&mut self, rows_per_page: NonZeroUsize) {
        self.rows_per_page = rows_per_page;
        self.page = 0;
    }

    /// Pulls `page` back onto the last page once the filtered list no longer
    /// reaches the current page's first row. Returns whether it moved.
    pub fn clamp_page(&mut self, filtered_len: usize) -> bool {
        if self.offset() < filtered_len || self.page == 0 {
            return false;
        }
        self.page = page_count(filtered_len, self.rows_per_page).saturating_sub(1);
        true
    }

    fn offset(&self) -> usize {
        self.page.saturating_mul(self.rows_per_page.get())
    }
}

/// One rendered page of the table.
#[derive(Debug, Clone, PartialEq)]
pub struct SpotPage {
    pub rows: Vec<Spot>,
    /// Number of spots matching the search, across all pages.
    pub total: usize,
    pub page: usize,
    pub rows_per_page: NonZeroUsize,
}

impl SpotPage {
    pub fn page_count(&self) -> usize {
        page_count(self.total, self.rows_per_page)
    }

    /// `"6–10 of 12"` style label; `"0–0 of 0"` for an empty page.
    pub fn range_label(&self) -> String {
        if self.rows.is_empty() {
            return format!("0–0 of {}", self.total);
        }
        let from = self.page * self.rows_per_page.get() + 1;
        let to = from + self.rows.len() - 1;
        format!("{from}–{to} of {}", self.total)
    }
}

pub fn matches_search(spot: &Spot, term: &str) -> bool {
    let Some(name) = spot.name.as_deref() else {
        return false;
    };
    name.to_lowercase().contains(&term.to_lowercase())
}

pub fn filter_spots<'a>(spots: &'a [Spot], term: &str) -> Vec<&'a Spot> {
    spots
        .iter()
        .filter(|spot| matches_search(spot, term))
        .collect()
}

pub fn page_count(total: usize, rows_per_page: NonZeroUsize) -> usize {
    total.div_ceil(rows_per_page.get())
}

pub fn project(spots: &[Spot], view: &ViewState) -> SpotPage {
    let filtered = filter_spots(spots, view.search_term());
    let rows = filtered
        .iter()
        .skip(view.offset())
        .take(view.rows_per_page.get())
        .map(|spot| (*spot).clone())
        .collect();

    SpotPage {
        rows,
        total: filtered.len(),
        page: view.page,
        rows_per_page: view.rows_per_page,
    }
}

#[cfg(test)]
#[path = "tests/view_tests.rs"]
mod tests;
