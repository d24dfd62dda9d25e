use std::collections::BTreeSet;
use std::path::PathBuf;

use crate::data::filter::{FilterSelection, distinct_values};
use crate::data::model::{CellValue, Table};
use crate::pipeline::{Analysis, Outcome, Pipeline};

// ---------------------------------------------------------------------------
// Application state
// ---------------------------------------------------------------------------

/// The full UI state, independent of rendering.
#[derive(Default)]
pub struct AppState {
    /// Loaded table (None until user opens a file).
    pub table: Option<Table>,

    /// Where `table` came from.
    pub source: Option<PathBuf>,

    /// Column whose text feeds the cloud.
    pub key_column: Option<String>,

    /// Columns used as filter dimensions, in the order they were chosen.
    pub filter_columns: Vec<String>,

    /// Accepted values per filter column.
    pub selection: FilterSelection,

    /// Result of the last pipeline run.
    pub analysis: Option<Analysis>,

    /// Set whenever an input changed; cleared by [`AppState::recompute`].
    pub dirty: bool,

    /// Status / error message shown in the UI.
    pub status_message: Option<String>,
}

impl AppState {
    /// Ingest a newly loaded table and reset every choice.
    pub fn set_table(&mut self, table: Table, source: PathBuf) {
        // Default key column: first column (if any).
        self.key_column = table.columns().first().cloned();
        self.filter_columns.clear();
        self.selection.clear();
        self.analysis = None;
        self.table = Some(table);
        self.source = Some(source);
        self.status_message = None;
        self.dirty = true;
    }

    /// Choose the key column; it stops being a filter column if it was one.
    pub fn set_key_column(&mut self, column: String) {
        self.filter_columns.retain(|c| *c != column);
        self.selection.remove(&column);
        self.key_column = Some(column);
        self.dirty = true;
    }

    /// Add or remove a filter column. The key column is never a filter column.
    pub fn toggle_filter_column(&mut self, column: &str) {
        if let Some(pos) = self.filter_columns.iter().position(|c| c == column) {
            self.filter_columns.remove(pos);
            self.selection.remove(column);
        } else if self.key_column.as_deref() != Some(column) {
            self.filter_columns.push(column.to_string());
        }
        self.dirty = true;
    }

    /// Toggle a single value in a column's accepted set.
    pub fn toggle_filter_value(&mut self, column: &str, value: &CellValue) {
        let selected = self.selection.entry(column.to_string()).or_default();
        if !selected.remove(value) {
            selected.insert(value.clone());
        }
        self.dirty = true;
    }

    /// Accept every distinct value of a column.
    pub fn select_all(&mut self, column: &str) {
        if let Some(table) = &self.table {
            self.selection
                .insert(column.to_string(), distinct_values(table, column));
            self.dirty = true;
        }
    }

    /// Clear a column's accepted set (no constraint).
    pub fn select_none(&mut self, column: &str) {
        self.selection.insert(column.to_string(), BTreeSet::new());
        self.dirty = true;
    }

    /// Whether `value` is currently accepted for `column`.
    pub fn is_selected(&self, column: &str, value: &CellValue) -> bool {
        self.selection
            .get(column)
            .is_some_and(|set| set.contains(value))
    }

    /// Selection restricted to the active filter columns.
    pub fn active_selection(&self) -> FilterSelection {
        self.selection
            .iter()
            .filter(|(col, vals)| self.filter_columns.contains(*col) && !vals.is_empty())
            .map(|(col, vals)| (col.clone(), vals.clone()))
            .collect()
    }

    /// Rerun the whole pipeline if any input changed since the last run.
    pub fn recompute(&mut self, pipeline: &Pipeline) {
        if !self.dirty {
            return;
        }
        self.dirty = false;

        let (Some(table), Some(key)) = (&self.table, &self.key_column) else {
            self.analysis = None;
            return;
        };
        match pipeline.run(table, key, &self.active_selection()) {
            Ok(analysis) => {
                log::info!(
                    "Key '{key}': {} rows, {} tokens, {}",
                    analysis.rows.len(),
                    analysis.tokens.len(),
                    match analysis.outcome {
                        Outcome::Rendered(_) => "rendered",
                        Outcome::InsufficientData => "insufficient data",
                    }
                );
                self.analysis = Some(analysis);
            }
            Err(e) => {
                log::error!("Analysis failed: {e:#}");
                self.status_message = Some(format!("Error: {e:#}"));
                self.analysis = None;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn s(v: &str) -> CellValue {
        CellValue::String(v.to_string())
    }

    fn loaded() -> AppState {
        let table = Table::new(
            vec!["内容".into(), "负责人".into(), "状态".into()],
            vec![
                vec![s("项目 进度 正常"), s("李四"), s("进行中")],
                vec![s("项目 延期 风险"), s("王五"), s("延期")],
            ],
        );
        let mut state = AppState::default();
        state.set_table(table, PathBuf::from("notes.xlsx"));
        state
    }

    #[test]
    fn loading_picks_first_column_as_key() {
        let state = loaded();
        assert_eq!(state.key_column.as_deref(), Some("内容"));
        assert!(state.filter_columns.is_empty());
        assert!(state.dirty);
    }

    #[test]
    fn key_column_cannot_be_a_filter_column() {
        let mut state = loaded();
        state.toggle_filter_column("内容");
        assert!(state.filter_columns.is_empty());

        state.toggle_filter_column("负责人");
        state.toggle_filter_value("负责人", &s("李四"));
        state.set_key_column("负责人".into());
        assert!(state.filter_columns.is_empty());
        assert!(!state.selection.contains_key("负责人"));
    }

    #[test]
    fn toggling_values_and_all_none() {
        let mut state = loaded();
        state.toggle_filter_column("负责人");
        state.toggle_filter_value("负责人", &s("李四"));
        assert!(state.is_selected("负责人", &s("李四")));
        state.toggle_filter_value("负责人", &s("李四"));
        assert!(!state.is_selected("负责人", &s("李四")));

        state.select_all("负责人");
        assert_eq!(state.selection["负责人"].len(), 2);
        state.select_none("负责人");
        assert!(state.selection["负责人"].is_empty());
    }

    #[test]
    fn active_selection_ignores_dropped_columns_and_empty_sets() {
        let mut state = loaded();
        state.toggle_filter_column("负责人");
        state.toggle_filter_column("状态");
        state.toggle_filter_value("负责人", &s("王五"));
        assert_eq!(state.active_selection().len(), 1);

        state.toggle_filter_column("负责人");
        assert!(state.active_selection().is_empty());
    }

    fn pipeline() -> Pipeline {
        use crate::cloud::CloudRenderer;
        use crate::cloud::font::CloudFont;
        use crate::config::CloudConfig;
        use crate::text::{Segmenter, StopwordSet};

        let renderer = CloudRenderer::new(CloudFont::bundled().unwrap(), &CloudConfig::default());
        Pipeline::new(Segmenter::new(), StopwordSet::default(), renderer)
    }

    #[test]
    fn recompute_runs_once_per_change() {
        let pipeline = pipeline();
        let mut state = loaded();
        state.recompute(&pipeline);
        assert!(!state.dirty);
        let analysis = state.analysis.as_ref().unwrap();
        assert_eq!(analysis.rows, vec![0, 1]);
        assert!(matches!(analysis.outcome, Outcome::Rendered(_)));

        // Clean state keeps the previous analysis.
        state.analysis = None;
        state.recompute(&pipeline);
        assert!(state.analysis.is_none());

        state.toggle_filter_column("负责人");
        state.toggle_filter_value("负责人", &s("王五"));
        assert!(state.dirty);
        state.recompute(&pipeline);
        assert!(!state.dirty);
        assert_eq!(state.analysis.as_ref().unwrap().rows, vec![1]);
    }

    #[test]
    fn unmatched_filter_recomputes_to_insufficient_data() {
        let pipeline = pipeline();
        let mut state = loaded();
        state.toggle_filter_column("负责人");
        state.toggle_filter_value("负责人", &s("李四"));
        state.toggle_filter_column("状态");
        state.toggle_filter_value("状态", &s("延期"));
        state.recompute(&pipeline);

        let analysis = state.analysis.as_ref().unwrap();
        assert!(analysis.rows.is_empty());
        assert!(matches!(analysis.outcome, Outcome::InsufficientData));
        assert!(state.status_message.is_none());
    }
}
