//! Layout tree: Page → Row → Column → Widget.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::catalogue::{find_preset, RowPreset, WidgetData, WidgetKind, FULL_WIDTH, ROW_PRESETS};
use crate::error::BuilderError;
use crate::ids::{ColumnId, IdAllocator, PageId, RowId, WidgetId};
use crate::style::StyleOverrides;

/// Direction for reordering siblings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    Up,
    Down,
}

impl Direction {
    /// Index of the neighbour in this direction, if inside `0..len`.
    pub fn neighbour(&self, index: usize, len: usize) -> Option<usize> {
        match self {
            Direction::Up => index.checked_sub(1),
            Direction::Down => Some(index + 1).filter(|i| *i < len),
        }
    }
}

/// Root of the layout tree. One per editing session.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Page {
    pub id: PageId,
    pub rows: Vec<Row>,
    #[serde(default, skip_serializing_if = "StyleOverrides::is_empty")]
    pub style: StyleOverrides,
    #[serde(default)]
    pub ids: IdAllocator,
}

/// Equality is structural; the allocator position is not part of it.
impl PartialEq for Page {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id && self.rows == other.rows && self.style == other.style
    }
}

/// A horizontal band of columns.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Row {
    pub id: RowId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub preset: Option<String>,
    pub columns: Vec<Column>,
    #[serde(default, skip_serializing_if = "StyleOverrides::is_empty")]
    pub style: StyleOverrides,
}

/// A vertical stack of widgets spanning `width` twelfths of its row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Column {
    pub id: ColumnId,
    pub width: u8,
    #[serde(default)]
    pub widgets: Vec<Widget>,
}

/// A leaf content block.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Widget {
    pub id: WidgetId,
    pub kind: WidgetKind,
    #[serde(default)]
    pub data: WidgetData,
    #[serde(default, skip_serializing_if = "StyleOverrides::is_empty")]
    pub style: StyleOverrides,
}

/// Position of a widget in the tree.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WidgetLocation {
    pub row: usize,
    pub column: usize,
    pub index: usize,
}

impl Page {
    /// A page with one empty full-width row.
    pub fn new(id: PageId) -> Self {
        let mut ids = IdAllocator::default();
        let row = Row::from_preset(&mut ids, &FULL_WIDTH);
        Self {
            id,
            rows: vec![row],
            style: StyleOverrides::default(),
            ids,
        }
    }

    /// A new page with a generated id.
    pub fn blank() -> Self {
        Self::new(PageId::generate())
    }

    /// Parse a serialized page, check its structure and reseed its
    /// allocator.
    pub fn from_json(json: &str) -> Result<Self, BuilderError> {
        let mut page: Page = serde_json::from_str(json)?;
        page.validate()?;
        page.reseed_ids();
        Ok(page)
    }

    /// Check what the mutation engine guarantees and a stored document may
    /// not: node ids are unique, and every row's column widths come from the
    /// preset table (its own preset when it names one).
    ///
    /// Widget payloads are not checked.
    pub fn validate(&self) -> Result<(), BuilderError> {
        let mut seen = HashSet::new();
        for id in self.node_ids() {
            if !seen.insert(id.clone()) {
                return Err(BuilderError::DuplicateId(id));
            }
        }

        for row in &self.rows {
            let widths = row.widths();
            match &row.preset {
                Some(preset_id) => {
                    let preset = find_preset(preset_id)
                        .ok_or_else(|| BuilderError::UnknownPreset(preset_id.clone()))?;
                    if widths != preset.widths {
                        return Err(BuilderError::InvalidLayout {
                            row: row.id.to_string(),
                            message: format!(
                                "widths {:?} do not match preset {} {:?}",
                                widths, preset.id, preset.widths
                            ),
                        });
                    }
                }
                None => {
                    if !ROW_PRESETS.iter().any(|p| widths == p.widths) {
                        return Err(BuilderError::InvalidLayout {
                            row: row.id.to_string(),
                            message: format!("widths {:?} match no preset", widths),
                        });
                    }
                }
            }
        }
        Ok(())
    }

    /// Move the allocator past every id present in the tree.
    ///
    /// Documents edited outside the builder may carry a stale counter.
    pub fn reseed_ids(&mut self) {
        let mut highest = 0;
        for row in &self.rows {
            highest = highest.max(row.id.sequence().unwrap_or(0));
            for column in &row.columns {
                highest = highest.max(column.id.sequence().unwrap_or(0));
                for widget in &column.widgets {
                    highest = highest.max(widget.id.sequence().unwrap_or(0));
                }
            }
        }
        self.ids.observe(highest);
    }

    /// Index of a row.
    pub fn row_index(&self, row_id: &RowId) -> Option<usize> {
        self.rows.iter().position(|r| &r.id == row_id)
    }

    /// A row by id.
    pub fn row(&self, row_id: &RowId) -> Option<&Row> {
        self.rows.iter().find(|r| &r.id == row_id)
    }

    /// Locate a widget anywhere in the tree.
    pub fn locate_widget(&self, widget_id: &WidgetId) -> Option<WidgetLocation> {
        self.rows.iter().enumerate().find_map(|(r, row)| {
            row.columns.iter().enumerate().find_map(|(c, column)| {
                column
                    .widgets
                    .iter()
                    .position(|w| &w.id == widget_id)
                    .map(|index| WidgetLocation {
                        row: r,
                        column: c,
                        index,
                    })
            })
        })
    }

    /// A widget by id.
    pub fn widget(&self, widget_id: &WidgetId) -> Option<&Widget> {
        let loc = self.locate_widget(widget_id)?;
        Some(&self.rows[loc.row].columns[loc.column].widgets[loc.index])
    }

    pub(crate) fn widget_mut(&mut self, widget_id: &WidgetId) -> Option<&mut Widget> {
        let loc = self.locate_widget(widget_id)?;
        Some(&mut self.rows[loc.row].columns[loc.column].widgets[loc.index])
    }

    /// Every row, column and widget id, in document order.
    pub fn node_ids(&self) -> Vec<String> {
        let mut ids = Vec::new();
        for row in &self.rows {
            ids.push(row.id.to_string());
            for column in &row.columns {
                ids.push(column.id.to_string());
                for widget in &column.widgets {
                    ids.push(widget.id.to_string());
                }
            }
        }
        ids
    }

    /// Whether a row, column or widget with this id exists.
    pub fn contains_node(&self, id: &str) -> bool {
        self.rows.iter().any(|row| {
            row.id.as_str() == id
                || row.columns.iter().any(|c| {
                    c.id.as_str() == id || c.widgets.iter().any(|w| w.id.as_str() == id)
                })
        })
    }

    /// Total number of widgets.
    pub fn widget_count(&self) -> usize {
        self.rows
            .iter()
            .flat_map(|r| &r.columns)
            .map(|c| c.widgets.len())
            .sum()
    }
}

impl Row {
    /// An empty row laid out by `preset`.
    pub fn from_preset(ids: &mut IdAllocator, preset: &RowPreset) -> Self {
        Self {
            id: ids.row_id(),
            preset: Some(preset.id.to_string()),
            columns: preset
                .widths
                .iter()
                .map(|width| Column::empty(ids, *width))
                .collect(),
            style: StyleOverrides::default(),
        }
    }

    /// Index of a column.
    pub fn column_index(&self, column_id: &ColumnId) -> Option<usize> {
        self.columns.iter().position(|c| &c.id == column_id)
    }

    /// Deep copy with fresh ids for the row, its columns and their widgets.
    pub fn clone_with_fresh_ids(&self, ids: &mut IdAllocator) -> Self {
        Self {
            id: ids.row_id(),
            preset: self.preset.clone(),
            columns: self
                .columns
                .iter()
                .map(|column| Column {
                    id: ids.column_id(),
                    width: column.width,
                    widgets: column
                        .widgets
                        .iter()
                        .map(|w| w.clone_with_fresh_id(ids))
                        .collect(),
                })
                .collect(),
            style: self.style.clone(),
        }
    }

    /// Column widths in order.
    pub fn widths(&self) -> Vec<u8> {
        self.columns.iter().map(|c| c.width).collect()
    }
}

impl Column {
    /// A column with no widgets.
    pub fn empty(ids: &mut IdAllocator, width: u8) -> Self {
        Self {
            id: ids.column_id(),
            width,
            widgets: Vec::new(),
        }
    }
}

impl Widget {
    /// Copy with a fresh id.
    pub fn clone_with_fresh_id(&self, ids: &mut IdAllocator) -> Self {
        Self {
            id: ids.widget_id(),
            ..self.clone()
        }
    }

    /// Read a string field.
    pub fn text(&self, key: &str) -> Option<&str> {
        self.data.get(key).and_then(Value::as_str)
    }

    /// Read a numeric field; numeric strings are accepted.
    pub fn number(&self, key: &str) -> Option<f64> {
        match self.data.get(key)? {
            Value::Number(n) => n.as_f64(),
            Value::String(s) => s.trim().parse().ok(),
            _ => None,
        }
    }

    /// Read a boolean field.
    pub fn flag(&self, key: &str) -> Option<bool> {
        self.data.get(key).and_then(Value::as_bool)
    }

    /// Read a list field; anything else reads as empty.
    pub fn list(&self, key: &str) -> &[Value] {
        self.data
            .get(key)
            .and_then(Value::as_array)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }
}
