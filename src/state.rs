use std::collections::BTreeMap;
use std::path::Path;

use anyhow::{Context, Result};

use crate::analytics::assemble::{explorer_dashboard, home_dashboard, Dashboard};
use crate::analytics::export::export_view;
use crate::color::ColorMap;
use crate::config::DashboardConfig;
use crate::data::filter::{filtered_indices, FilterSelection};
use crate::data::loader::load_file;
use crate::data::model::{CategoryField, RecordStore};
use crate::data::view::View;

// ---------------------------------------------------------------------------
// Session state
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Page {
    #[default]
    Home,
    Explorer,
}

/// A message for the menu bar.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Status {
    Info(String),
    Error(String),
}

/// The state of one dashboard session, independent of rendering.
///
/// The store is loaded once and only replaced when another file is opened;
/// both dashboards are cached and rebuilt only when their input changes.
pub struct AppState {
    pub config: DashboardConfig,

    /// Loaded customer table (None until a file is loaded).
    pub store: Option<RecordStore>,

    /// Data explorer filter selections.
    pub selection: FilterSelection,

    /// Indices of records passing the current selection (cached).
    pub visible_indices: Vec<usize>,

    /// Per-field colours, fixed for the lifetime of the store.
    pub colors: BTreeMap<CategoryField, ColorMap>,

    pub page: Page,

    /// Outcome of the last file operation, shown in the menu bar.
    pub status: Option<Status>,

    home: Option<Dashboard>,
    explorer: Option<Dashboard>,
}

impl AppState {
    pub fn new(config: DashboardConfig) -> Self {
        Self {
            config,
            store: None,
            selection: FilterSelection::default(),
            visible_indices: Vec::new(),
            colors: BTreeMap::new(),
            page: Page::default(),
            status: None,
            home: None,
            explorer: None,
        }
    }

    /// Load a file and make it the session's store. On failure the current
    /// store, if any, is kept.
    pub fn load_path(&mut self, path: &Path) -> Result<()> {
        let store =
            load_file(path).with_context(|| format!("loading {}", path.display()))?;
        self.set_store(store);
        Ok(())
    }

    /// Ingest a newly loaded store: default filters, colours, dashboards.
    pub fn set_store(&mut self, store: RecordStore) {
        self.selection = FilterSelection::defaults(&store, self.config.default_occupations);
        self.colors = CategoryField::ALL
            .iter()
            .map(|&field| (field, ColorMap::new(store.distinct_values(field))))
            .collect();
        self.home = Some(home_dashboard(&store.view(), &self.config));
        self.store = Some(store);
        self.status = None;
        self.refilter();
    }

    /// Recompute `visible_indices` and the explorer page after a filter
    /// change.
    pub fn refilter(&mut self) {
        if let Some(store) = &self.store {
            self.visible_indices = filtered_indices(store, &self.selection);
            let view = View::borrowed(store, &self.visible_indices);
            self.explorer = Some(explorer_dashboard(&view, &self.config));
            log::debug!(
                "{} of {} customers pass the filters",
                self.visible_indices.len(),
                store.len()
            );
        }
    }

    /// The explorer's filtered view.
    pub fn filtered_view(&self) -> Option<View<'_>> {
        self.store
            .as_ref()
            .map(|store| View::borrowed(store, &self.visible_indices))
    }

    pub fn home(&self) -> Option<&Dashboard> {
        self.home.as_ref()
    }

    pub fn explorer(&self) -> Option<&Dashboard> {
        self.explorer.as_ref()
    }

    pub fn color_for(&self, field: CategoryField, value: &str) -> Option<eframe::egui::Color32> {
        self.colors.get(&field).map(|map| map.color_for(value))
    }

    /// Toggle a single category value in a field's selection.
    pub fn toggle_filter_value(&mut self, field: CategoryField, value: &str) {
        self.selection.toggle(field, value);
        self.refilter();
    }

    /// Select all values of a field.
    pub fn select_all(&mut self, field: CategoryField) {
        if let Some(store) = &self.store {
            self.selection.select_all(store, field);
            self.refilter();
        }
    }

    /// Deselect all values of a field.
    pub fn select_none(&mut self, field: CategoryField) {
        self.selection.select_none(field);
        self.refilter();
    }

    /// Write the filtered view to `path` as CSV.
    pub fn export_filtered(&self, path: &Path) -> Result<usize> {
        let view = self.filtered_view().context("no data loaded")?;
        export_view(&view, path).with_context(|| format!("exporting to {}", path.display()))
    }

    /// [`load_path`](Self::load_path) for a file picked in the UI: a
    /// failure is reported in the status line and the session carries on.
    pub fn open(&mut self, path: &Path) {
        if let Err(e) = self.load_path(path) {
            log::error!("Failed to load file: {e:#}");
            self.status = Some(Status::Error(format!("Error: {e:#}")));
        }
    }

    /// [`export_filtered`](Self::export_filtered) with the outcome reported
    /// in the status line.
    pub fn export(&mut self, path: &Path) {
        self.status = Some(match self.export_filtered(path) {
            Ok(rows) => Status::Info(format!("Exported {rows} customers")),
            Err(e) => {
                log::error!("Failed to export: {e:#}");
                Status::Error(format!("Error: {e:#}"))
            }
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::model::fixtures::sample_store;

    fn session() -> AppState {
        let mut state = AppState::new(DashboardConfig::default());
        state.set_store(sample_store());
        state
    }

    #[test]
    fn new_store_applies_default_filters() {
        let state = session();
        assert_eq!(state.visible_indices, [0, 1, 2, 3, 5, 6, 7]);
        assert_eq!(state.explorer().map(|d| d.metrics.count), Some(7));
        assert_eq!(state.home().map(|d| d.metrics.count), Some(10));
    }

    #[test]
    fn filter_changes_refresh_explorer_only() {
        let mut state = session();
        let home_before = state.home().cloned();

        state.select_none(CategoryField::Nationality);
        assert!(state.visible_indices.is_empty());
        assert_eq!(state.explorer().and_then(|d| d.metrics.mean_age), None);
        assert_eq!(state.home().cloned(), home_before);

        state.select_all(CategoryField::Nationality);
        state.select_all(CategoryField::Occupation);
        assert_eq!(state.visible_indices.len(), 10);

        state.toggle_filter_value(CategoryField::LoyaltyClassification, "Gold");
        assert_eq!(state.visible_indices.len(), 7);
    }

    #[test]
    fn failed_load_keeps_current_store() {
        let mut state = session();
        assert!(state.load_path(Path::new("/nonexistent/customers.csv")).is_err());
        assert_eq!(state.store.as_ref().map(RecordStore::len), Some(10));
    }

    #[test]
    fn failed_open_is_reported_as_error() {
        let mut state = session();
        state.open(Path::new("/nonexistent/customers.csv"));
        assert!(matches!(state.status, Some(Status::Error(_))));
        assert_eq!(state.store.as_ref().map(RecordStore::len), Some(10));
    }

    #[test]
    fn export_outcome_sets_status_kind() {
        let mut state = session();
        let path = std::env::temp_dir().join(format!(
            "banking_dashboard_export_{}.csv",
            std::process::id()
        ));
        state.export(&path);
        let _ = std::fs::remove_file(&path);
        assert_eq!(state.status, Some(Status::Info("Exported 7 customers".into())));

        state.export(Path::new("/nonexistent/dir/out.csv"));
        assert!(matches!(state.status, Some(Status::Error(_))));
    }

    #[test]
    fn colours_are_stable_across_filters() {
        let mut state = session();
        let before = state.color_for(CategoryField::Nationality, "Asian");
        state.select_none(CategoryField::Occupation);
        assert_eq!(state.color_for(CategoryField::Nationality, "Asian"), before);
        assert!(before.is_some());
    }
}
