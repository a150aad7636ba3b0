//! Reducer-style state container.
//!
//! The store owns the page, its history and the editor's view state. Views
//! read through `&BuilderStore` and request every change with
//! [`BuilderStore::dispatch`].

use crate::catalogue::{WidgetData, WidgetKind};
use crate::history::History;
use crate::ids::{ColumnId, RowId, WidgetId};
use crate::model::{Direction, Page};
use crate::mutation;
use crate::render::Breakpoint;
use crate::style::StyleOverrides;

/// Default number of snapshots kept.
pub const DEFAULT_HISTORY_LIMIT: usize = 100;

/// What the panel is editing.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum Selection {
    #[default]
    None,
    Page,
    Row(RowId),
    Widget(WidgetId),
}

/// Edit intents accepted by the store.
#[derive(Debug, Clone, PartialEq)]
pub enum Action {
    AddRow {
        preset: String,
        after_index: Option<usize>,
    },
    RemoveRow {
        row_id: RowId,
    },
    DuplicateRow {
        row_id: RowId,
    },
    MoveRow {
        row_id: RowId,
        direction: Direction,
    },
    SetRowPreset {
        row_id: RowId,
        preset: String,
    },
    AddWidget {
        row_id: RowId,
        column_id: ColumnId,
        kind: WidgetKind,
        index: Option<usize>,
    },
    RemoveWidget {
        row_id: RowId,
        column_id: ColumnId,
        widget_id: WidgetId,
    },
    MoveWidget {
        widget_id: WidgetId,
        to_row: RowId,
        to_column: ColumnId,
        index: usize,
    },
    DuplicateWidget {
        widget_id: WidgetId,
    },
    UpdateWidgetData {
        widget_id: WidgetId,
        data: WidgetData,
    },
    UpdateWidgetStyle {
        widget_id: WidgetId,
        style: StyleOverrides,
    },
    UpdateRowStyle {
        row_id: RowId,
        style: StyleOverrides,
    },
    UpdatePageStyle {
        style: StyleOverrides,
    },
    /// Fold pending in-place edits into one history entry.
    CommitEdits,
    Undo,
    Redo,
    Select(Selection),
    SetBreakpoint(Breakpoint),
}

impl Action {
    /// Stable name used in logs and metrics.
    pub fn name(&self) -> &'static str {
        match self {
            Action::AddRow { .. } => "add_row",
            Action::RemoveRow { .. } => "remove_row",
            Action::DuplicateRow { .. } => "duplicate_row",
            Action::MoveRow { .. } => "move_row",
            Action::SetRowPreset { .. } => "set_row_preset",
            Action::AddWidget { .. } => "add_widget",
            Action::RemoveWidget { .. } => "remove_widget",
            Action::MoveWidget { .. } => "move_widget",
            Action::DuplicateWidget { .. } => "duplicate_widget",
            Action::UpdateWidgetData { .. } => "update_widget_data",
            Action::UpdateWidgetStyle { .. } => "update_widget_style",
            Action::UpdateRowStyle { .. } => "update_row_style",
            Action::UpdatePageStyle { .. } => "update_page_style",
            Action::CommitEdits => "commit_edits",
            Action::Undo => "undo",
            Action::Redo => "redo",
            Action::Select(_) => "select",
            Action::SetBreakpoint(_) => "set_breakpoint",
        }
    }

    /// Whether the action changes the tree shape and is recorded in history.
    pub fn is_structural(&self) -> bool {
        matches!(
            self,
            Action::AddRow { .. }
                | Action::RemoveRow { .. }
                | Action::DuplicateRow { .. }
                | Action::MoveRow { .. }
                | Action::SetRowPreset { .. }
                | Action::AddWidget { .. }
                | Action::RemoveWidget { .. }
                | Action::MoveWidget { .. }
                | Action::DuplicateWidget { .. }
        )
    }
}

/// Result of a dispatch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Applied,
    /// Nothing to do: unknown id, boundary move, empty history.
    Unchanged,
}

impl Outcome {
    pub fn is_applied(&self) -> bool {
        matches!(self, Outcome::Applied)
    }

    fn from_changed(changed: bool) -> Self {
        if changed {
            Outcome::Applied
        } else {
            Outcome::Unchanged
        }
    }
}

/// Single owner of the editing state.
#[derive(Debug, Clone)]
pub struct BuilderStore {
    page: Page,
    history: History<Page>,
    selection: Selection,
    breakpoint: Breakpoint,
    dirty: bool,
}

impl BuilderStore {
    /// Start editing `page`; it becomes the first history entry.
    pub fn new(page: Page) -> Self {
        Self {
            history: History::new(page.clone()).with_capacity(DEFAULT_HISTORY_LIMIT),
            page,
            selection: Selection::None,
            breakpoint: Breakpoint::default(),
            dirty: false,
        }
    }

    /// Keep at most `limit` history entries.
    pub fn with_history_limit(mut self, limit: usize) -> Self {
        self.history = self.history.with_capacity(limit);
        self
    }

    /// Start on a given breakpoint.
    pub fn with_breakpoint(mut self, breakpoint: Breakpoint) -> Self {
        self.breakpoint = breakpoint;
        self
    }

    pub fn page(&self) -> &Page {
        &self.page
    }

    pub fn selection(&self) -> &Selection {
        &self.selection
    }

    pub fn breakpoint(&self) -> Breakpoint {
        self.breakpoint
    }

    /// Number of snapshots held.
    pub fn history_depth(&self) -> usize {
        self.history.len()
    }

    /// Whether in-place edits are waiting for a commit.
    pub fn has_pending_edits(&self) -> bool {
        self.dirty && self.page != *self.history.current()
    }

    pub fn can_undo(&self) -> bool {
        self.history.can_undo() || self.has_pending_edits()
    }

    pub fn can_redo(&self) -> bool {
        !self.has_pending_edits() && self.history.can_redo()
    }

    /// Swap in a different page (after a load) and forget the history.
    pub fn replace_page(&mut self, page: Page) {
        self.history.reset(page.clone());
        self.page = page;
        self.selection = Selection::None;
        self.dirty = false;
    }

    /// Apply one action.
    pub fn dispatch(&mut self, action: Action) -> Outcome {
        match action {
            Action::CommitEdits => Outcome::from_changed(self.commit()),
            Action::Undo => {
                self.commit();
                let previous = self.history.undo();
                self.restore(previous)
            }
            Action::Redo => {
                self.commit();
                let next = self.history.redo();
                self.restore(next)
            }
            Action::Select(selection) => self.select(selection),
            Action::SetBreakpoint(breakpoint) => {
                let changed = self.breakpoint != breakpoint;
                self.breakpoint = breakpoint;
                Outcome::from_changed(changed)
            }
            Action::UpdateWidgetData { widget_id, data } => {
                let next = mutation::update_widget_data(&self.page, &widget_id, data);
                self.apply_in_place(next)
            }
            Action::UpdateWidgetStyle { widget_id, style } => {
                let next = mutation::update_widget_style(&self.page, &widget_id, style);
                self.apply_in_place(next)
            }
            Action::UpdateRowStyle { row_id, style } => {
                let next = mutation::update_row_style(&self.page, &row_id, style);
                self.apply_in_place(next)
            }
            Action::UpdatePageStyle { style } => {
                let next = mutation::update_page_style(&self.page, style);
                self.apply_in_place(next)
            }
            structural => {
                self.commit();
                let next = self.reduce(structural);
                self.apply_structural(next)
            }
        }
    }

    fn reduce(&self, action: Action) -> Page {
        let page = &self.page;
        match action {
            Action::AddRow {
                preset,
                after_index,
            } => mutation::add_row(page, &preset, after_index),
            Action::RemoveRow { row_id } => mutation::remove_row(page, &row_id),
            Action::DuplicateRow { row_id } => mutation::duplicate_row(page, &row_id),
            Action::MoveRow { row_id, direction } => mutation::move_row(page, &row_id, direction),
            Action::SetRowPreset { row_id, preset } => {
                mutation::set_row_preset(page, &row_id, &preset)
            }
            Action::AddWidget {
                row_id,
                column_id,
                kind,
                index,
            } => mutation::insert_widget(page, &row_id, &column_id, kind, index),
            Action::RemoveWidget {
                row_id,
                column_id,
                widget_id,
            } => mutation::remove_widget(page, &row_id, &column_id, &widget_id),
            Action::MoveWidget {
                widget_id,
                to_row,
                to_column,
                index,
            } => mutation::move_widget(page, &widget_id, &to_row, &to_column, index),
            Action::DuplicateWidget { widget_id } => mutation::duplicate_widget(page, &widget_id),
            _ => page.clone(),
        }
    }

    fn apply_structural(&mut self, next: Page) -> Outcome {
        if next == self.page {
            return Outcome::Unchanged;
        }
        self.page = next;
        self.history.push(self.page.clone());
        self.prune_selection();
        Outcome::Applied
    }

    fn apply_in_place(&mut self, next: Page) -> Outcome {
        if next == self.page {
            return Outcome::Unchanged;
        }
        self.page = next;
        self.dirty = true;
        Outcome::Applied
    }

    fn commit(&mut self) -> bool {
        let pending = self.has_pending_edits();
        self.dirty = false;
        if pending {
            self.history.push(self.page.clone());
        }
        pending
    }

    fn restore(&mut self, snapshot: Option<Page>) -> Outcome {
        let Some(mut page) = snapshot else {
            return Outcome::Unchanged;
        };
        page.ids.catch_up(&self.page.ids);
        self.page = page;
        self.prune_selection();
        Outcome::Applied
    }

    fn select(&mut self, selection: Selection) -> Outcome {
        let exists = match &selection {
            Selection::None | Selection::Page => true,
            Selection::Row(id) => self.page.row(id).is_some(),
            Selection::Widget(id) => self.page.widget(id).is_some(),
        };
        if !exists || selection == self.selection {
            return Outcome::Unchanged;
        }
        self.selection = selection;
        Outcome::Applied
    }

    fn prune_selection(&mut self) {
        let gone = match &self.selection {
            Selection::Row(id) => self.page.row(id).is_none(),
            Selection::Widget(id) => self.page.widget(id).is_none(),
            _ => false,
        };
        if gone {
            self.selection = Selection::None;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ids::PageId;
    use serde_json::json;

    fn store() -> BuilderStore {
        BuilderStore::new(Page::new(PageId::new("page-1")))
    }

    fn first_column(store: &BuilderStore) -> (RowId, ColumnId) {
        let row = &store.page().rows[0];
        (row.id.clone(), row.columns[0].id.clone())
    }

    fn add_widget(store: &mut BuilderStore, kind: WidgetKind) -> WidgetId {
        let (row_id, column_id) = first_column(store);
        store.dispatch(Action::AddWidget {
            row_id,
            column_id,
            kind,
            index: None,
        });
        store.page().rows[0].columns[0]
            .widgets
            .last()
            .map(|w| w.id.clone())
            .unwrap()
    }

    #[test]
    fn test_structural_actions_push_history() {
        let mut store = store();
        let outcome = store.dispatch(Action::AddRow {
            preset: "1/2-1/2".into(),
            after_index: Some(0),
        });
        assert_eq!(outcome, Outcome::Applied);
        assert_eq!(store.history_depth(), 2);
        assert_eq!(store.page().rows[1].widths(), vec![6, 6]);
    }

    #[test]
    fn test_noop_is_unchanged_and_not_recorded() {
        let mut store = store();
        let row_id = store.page().rows[0].id.clone();
        let outcome = store.dispatch(Action::MoveRow {
            row_id,
            direction: Direction::Up,
        });
        assert_eq!(outcome, Outcome::Unchanged);
        assert_eq!(store.history_depth(), 1);
        assert_eq!(store.dispatch(Action::Undo), Outcome::Unchanged);
    }

    #[test]
    fn test_undo_redo_round_trip() {
        let mut store = store();
        let initial = store.page().clone();
        store.dispatch(Action::AddRow {
            preset: "1/3-2/3".into(),
            after_index: None,
        });
        let after = store.page().clone();

        assert_eq!(store.dispatch(Action::Undo), Outcome::Applied);
        assert_eq!(*store.page(), initial);
        assert_eq!(store.dispatch(Action::Redo), Outcome::Applied);
        assert_eq!(*store.page(), after);
    }

    #[test]
    fn test_in_place_edit_commits_on_undo() {
        let mut store = store();
        let widget_id = add_widget(&mut store, WidgetKind::Heading);
        let data = json!({"text": "Promo"}).as_object().cloned().unwrap();

        store.dispatch(Action::UpdateWidgetData {
            widget_id: widget_id.clone(),
            data,
        });
        assert!(store.has_pending_edits());
        assert_eq!(store.history_depth(), 2);

        store.dispatch(Action::Undo);
        assert_eq!(
            store.page().widget(&widget_id).and_then(|w| w.text("text")),
            Some("Votre titre ici")
        );
        store.dispatch(Action::Redo);
        assert_eq!(
            store.page().widget(&widget_id).and_then(|w| w.text("text")),
            Some("Promo")
        );
    }

    #[test]
    fn test_commit_edits_records_once() {
        let mut store = store();
        let row_id = store.page().rows[0].id.clone();
        for color in ["#111", "#222", "#333"] {
            store.dispatch(Action::UpdateRowStyle {
                row_id: row_id.clone(),
                style: StyleOverrides {
                    background_color: Some(color.into()),
                    ..Default::default()
                },
            });
        }
        assert_eq!(store.dispatch(Action::CommitEdits), Outcome::Applied);
        assert_eq!(store.history_depth(), 2);
        assert_eq!(store.dispatch(Action::CommitEdits), Outcome::Unchanged);
    }

    #[test]
    fn test_ids_stay_unique_after_undo() {
        let mut store = store();
        store.dispatch(Action::AddRow {
            preset: "1/1".into(),
            after_index: None,
        });
        let undone = store.page().rows[1].id.clone();
        store.dispatch(Action::Undo);
        store.dispatch(Action::AddRow {
            preset: "1/1".into(),
            after_index: None,
        });
        assert_ne!(store.page().rows[1].id, undone);
    }

    #[test]
    fn test_selection_cleared_when_node_removed() {
        let mut store = store();
        let widget_id = add_widget(&mut store, WidgetKind::Button);
        let (row_id, column_id) = first_column(&store);

        assert_eq!(
            store.dispatch(Action::Select(Selection::Widget(widget_id.clone()))),
            Outcome::Applied
        );
        store.dispatch(Action::RemoveWidget {
            row_id,
            column_id,
            widget_id: widget_id.clone(),
        });
        assert_eq!(*store.selection(), Selection::None);

        store.dispatch(Action::Undo);
        assert_eq!(
            store.dispatch(Action::Select(Selection::Widget(widget_id))),
            Outcome::Applied
        );
        store.dispatch(Action::Undo);
        assert_eq!(*store.selection(), Selection::None);
    }

    #[test]
    fn test_select_missing_node_is_unchanged() {
        let mut store = store();
        let outcome = store.dispatch(Action::Select(Selection::Row(RowId::new("row-404"))));
        assert_eq!(outcome, Outcome::Unchanged);
        assert_eq!(*store.selection(), Selection::None);
    }

    #[test]
    fn test_breakpoint_does_not_touch_history() {
        let mut store = store();
        assert_eq!(
            store.dispatch(Action::SetBreakpoint(Breakpoint::Mobile)),
            Outcome::Applied
        );
        assert_eq!(store.breakpoint(), Breakpoint::Mobile);
        assert_eq!(store.history_depth(), 1);
        assert_eq!(
            store.dispatch(Action::SetBreakpoint(Breakpoint::Mobile)),
            Outcome::Unchanged
        );
    }

    #[test]
    fn test_history_limit() {
        let mut store = store().with_history_limit(3);
        for _ in 0..5 {
            store.dispatch(Action::AddRow {
                preset: "1/1".into(),
                after_index: None,
            });
        }
        assert_eq!(store.history_depth(), 3);
        assert_eq!(store.dispatch(Action::Undo), Outcome::Applied);
        assert_eq!(store.dispatch(Action::Undo), Outcome::Applied);
        assert_eq!(store.dispatch(Action::Undo), Outcome::Unchanged);
        assert_eq!(store.page().rows.len(), 4);
    }

    #[test]
    fn test_replace_page_resets() {
        let mut store = store();
        store.dispatch(Action::AddRow {
            preset: "1/1".into(),
            after_index: None,
        });
        store.replace_page(Page::new(PageId::new("other")));
        assert_eq!(store.history_depth(), 1);
        assert!(!store.can_undo());
        assert_eq!(store.page().id.as_str(), "other");
    }

    #[test]
    fn test_action_names() {
        assert_eq!(Action::Undo.name(), "undo");
        assert!(Action::DuplicateWidget {
            widget_id: WidgetId::new("w-1")
        }
        .is_structural());
        assert!(!Action::CommitEdits.is_structural());
    }
}
