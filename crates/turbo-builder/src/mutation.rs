//! Mutation engine.
//!
//! Every function takes the current tree by reference and returns a new one.
//! Edits that cannot apply (unknown id, move past an edge, unknown preset)
//! return an unchanged copy; the engine never reports an error and never
//! leaves the tree half-edited.

use crate::catalogue::{find_preset, WidgetData, WidgetKind};
use crate::ids::{ColumnId, IdAllocator, RowId, WidgetId};
use crate::model::{Column, Direction, Page, Row, Widget};
use crate::style::StyleOverrides;

/// An empty row laid out by the named preset.
pub fn create_row(ids: &mut IdAllocator, preset_id: &str) -> Option<Row> {
    find_preset(preset_id).map(|preset| Row::from_preset(ids, preset))
}

/// A widget of `kind` with a fresh id and its own copy of the defaults.
pub fn create_widget(ids: &mut IdAllocator, kind: WidgetKind) -> Widget {
    Widget {
        id: ids.widget_id(),
        data: kind.default_data(),
        kind,
        style: StyleOverrides::default(),
    }
}

/// Insert a new row after `after_index`, or at the end.
pub fn add_row(page: &Page, preset_id: &str, after_index: Option<usize>) -> Page {
    let mut next = page.clone();
    let Some(row) = create_row(&mut next.ids, preset_id) else {
        return page.clone();
    };
    let at = match after_index {
        Some(i) => (i + 1).min(next.rows.len()),
        None => next.rows.len(),
    };
    next.rows.insert(at, row);
    next
}

/// Remove a row and everything in it.
pub fn remove_row(page: &Page, row_id: &RowId) -> Page {
    let mut next = page.clone();
    next.rows.retain(|r| &r.id != row_id);
    next
}

/// Deep-copy a row right after itself, with fresh ids throughout.
pub fn duplicate_row(page: &Page, row_id: &RowId) -> Page {
    let mut next = page.clone();
    let Some(index) = next.row_index(row_id) else {
        return next;
    };
    let copy = next.rows[index].clone_with_fresh_ids(&mut next.ids);
    next.rows.insert(index + 1, copy);
    next
}

/// Swap a row with its neighbour.
pub fn move_row(page: &Page, row_id: &RowId, direction: Direction) -> Page {
    let mut next = page.clone();
    let Some(index) = next.row_index(row_id) else {
        return next;
    };
    if let Some(other) = direction.neighbour(index, next.rows.len()) {
        next.rows.swap(index, other);
    }
    next
}

/// Re-layout a row. Widgets of columns that disappear move to the new last
/// column; surviving columns keep their ids.
pub fn set_row_preset(page: &Page, row_id: &RowId, preset_id: &str) -> Page {
    let mut next = page.clone();
    let (Some(preset), Some(index)) = (find_preset(preset_id), next.row_index(row_id)) else {
        return next;
    };

    let mut old = std::mem::take(&mut next.rows[index].columns);
    let keep = preset.widths.len().min(old.len());
    let overflow: Vec<Widget> = old
        .drain(keep..)
        .flat_map(|column| column.widgets)
        .collect();

    let mut columns: Vec<Column> = old
        .into_iter()
        .zip(preset.widths)
        .map(|(column, width)| Column {
            width: *width,
            ..column
        })
        .collect();
    for width in &preset.widths[keep..] {
        columns.push(Column::empty(&mut next.ids, *width));
    }
    if let Some(last) = columns.last_mut() {
        last.widgets.extend(overflow);
    }

    let row = &mut next.rows[index];
    row.columns = columns;
    row.preset = Some(preset.id.to_string());
    next
}

/// Append a new widget to a column.
pub fn add_widget_to_column(
    page: &Page,
    row_id: &RowId,
    column_id: &ColumnId,
    kind: WidgetKind,
) -> Page {
    insert_widget(page, row_id, column_id, kind, None)
}

/// Insert a new widget at `at` (clamped), or at the end.
pub fn insert_widget(
    page: &Page,
    row_id: &RowId,
    column_id: &ColumnId,
    kind: WidgetKind,
    at: Option<usize>,
) -> Page {
    let mut next = page.clone();
    let Some((r, c)) = column_position(&next, row_id, column_id) else {
        return next;
    };
    let widget = create_widget(&mut next.ids, kind);
    let widgets = &mut next.rows[r].columns[c].widgets;
    let at = at.unwrap_or(widgets.len()).min(widgets.len());
    widgets.insert(at, widget);
    next
}

/// Remove a widget from a specific column.
pub fn remove_widget(
    page: &Page,
    row_id: &RowId,
    column_id: &ColumnId,
    widget_id: &WidgetId,
) -> Page {
    let mut next = page.clone();
    if let Some((r, c)) = column_position(&next, row_id, column_id) {
        next.rows[r].columns[c].widgets.retain(|w| &w.id != widget_id);
    }
    next
}

/// Drag-and-drop: move a widget to position `index` of the target column.
///
/// `index` counts positions in the target list after the widget has been
/// taken out, and is clamped to its length.
pub fn move_widget(
    page: &Page,
    widget_id: &WidgetId,
    to_row: &RowId,
    to_column: &ColumnId,
    index: usize,
) -> Page {
    let mut next = page.clone();
    let (Some(from), Some((r, c))) = (
        next.locate_widget(widget_id),
        column_position(&next, to_row, to_column),
    ) else {
        return next;
    };
    let widget = next.rows[from.row].columns[from.column]
        .widgets
        .remove(from.index);
    let target = &mut next.rows[r].columns[c].widgets;
    let at = index.min(target.len());
    target.insert(at, widget);
    next
}

/// Copy a widget right after itself with a fresh id.
pub fn duplicate_widget(page: &Page, widget_id: &WidgetId) -> Page {
    let mut next = page.clone();
    let Some(loc) = next.locate_widget(widget_id) else {
        return next;
    };
    let copy = next.rows[loc.row].columns[loc.column].widgets[loc.index]
        .clone_with_fresh_id(&mut next.ids);
    next.rows[loc.row].columns[loc.column]
        .widgets
        .insert(loc.index + 1, copy);
    next
}

/// Replace a widget's payload wholesale.
pub fn update_widget_data(page: &Page, widget_id: &WidgetId, data: WidgetData) -> Page {
    let mut next = page.clone();
    if let Some(widget) = next.widget_mut(widget_id) {
        widget.data = data;
    }
    next
}

/// Replace a widget's style overrides.
pub fn update_widget_style(page: &Page, widget_id: &WidgetId, style: StyleOverrides) -> Page {
    let mut next = page.clone();
    if let Some(widget) = next.widget_mut(widget_id) {
        widget.style = style;
    }
    next
}

/// Replace a row's style overrides.
pub fn update_row_style(page: &Page, row_id: &RowId, style: StyleOverrides) -> Page {
    let mut next = page.clone();
    if let Some(index) = next.row_index(row_id) {
        next.rows[index].style = style;
    }
    next
}

/// Replace the page-level style overrides.
pub fn update_page_style(page: &Page, style: StyleOverrides) -> Page {
    let mut next = page.clone();
    next.style = style;
    next
}

fn column_position(page: &Page, row_id: &RowId, column_id: &ColumnId) -> Option<(usize, usize)> {
    let r = page.row_index(row_id)?;
    let c = page.rows[r].column_index(column_id)?;
    Some((r, c))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ids::PageId;
    use serde_json::json;

    fn page() -> Page {
        Page::new(PageId::new("page-1"))
    }

    fn first_ids(page: &Page) -> (RowId, ColumnId) {
        (page.rows[0].id.clone(), page.rows[0].columns[0].id.clone())
    }

    #[test]
    fn test_add_row_after_index() {
        let start = page();
        let next = add_row(&start, "1/2-1/2", Some(0));

        assert_eq!(next.rows.len(), 2);
        assert_eq!(next.rows[1].widths(), vec![6, 6]);
        assert_eq!(next.rows[0], start.rows[0]);
        assert_eq!(start.rows.len(), 1, "input must not be mutated");
    }

    #[test]
    fn test_add_row_appends_and_clamps() {
        let start = page();
        let appended = add_row(&start, "1/3-2/3", None);
        assert_eq!(appended.rows[1].widths(), vec![4, 8]);

        let clamped = add_row(&appended, "1/1", Some(40));
        assert_eq!(clamped.rows.len(), 3);
        assert_eq!(clamped.rows[2].widths(), vec![12]);
    }

    #[test]
    fn test_add_row_unknown_preset_is_noop() {
        let start = page();
        assert_eq!(add_row(&start, "7/5", None), start);
    }

    #[test]
    fn test_add_heading_uses_defaults() {
        let start = add_row(&page(), "1/2-1/2", Some(0));
        let row = start.rows[1].id.clone();
        let col = start.rows[1].columns[0].id.clone();

        let next = add_widget_to_column(&start, &row, &col, WidgetKind::Heading);
        let widgets = &next.rows[1].columns[0].widgets;
        assert_eq!(widgets.len(), 1);
        assert_eq!(widgets[0].kind, WidgetKind::Heading);
        assert_eq!(widgets[0].text("text"), Some("Votre titre ici"));
    }

    #[test]
    fn test_create_spacer() {
        let mut ids = IdAllocator::default();
        let spacer = create_widget(&mut ids, WidgetKind::Spacer);
        assert_eq!(spacer.data["height"], 40);
    }

    #[test]
    fn test_create_row_unknown_preset() {
        let mut ids = IdAllocator::default();
        assert!(create_row(&mut ids, "nope").is_none());
        assert_eq!(ids.position(), 0);
    }

    #[test]
    fn test_remove_row_keeps_order() {
        let p = add_row(&add_row(&page(), "1/2-1/2", None), "1/3-2/3", None);
        let middle = p.rows[1].id.clone();
        let next = remove_row(&p, &middle);

        assert_eq!(next.rows.len(), 2);
        assert_eq!(next.rows[0], p.rows[0]);
        assert_eq!(next.rows[1], p.rows[2]);
    }

    #[test]
    fn test_remove_unknown_row_is_noop() {
        let p = page();
        assert_eq!(remove_row(&p, &RowId::new("row-99")), p);
    }

    #[test]
    fn test_duplicate_row_fresh_ids() {
        let (row, col) = first_ids(&page());
        let p = add_widget_to_column(&page(), &row, &col, WidgetKind::Button);
        let next = duplicate_row(&p, &row);

        assert_eq!(next.rows.len(), 2);
        let copy = &next.rows[1];
        assert_ne!(copy.id, row);
        assert_ne!(copy.columns[0].id, col);
        assert_ne!(copy.columns[0].widgets[0].id, p.rows[0].columns[0].widgets[0].id);
        assert_eq!(copy.columns[0].widgets[0].data, p.rows[0].columns[0].widgets[0].data);

        let ids = next.node_ids();
        let mut unique = ids.clone();
        unique.sort();
        unique.dedup();
        assert_eq!(ids.len(), unique.len());
    }

    #[test]
    fn test_move_row_boundaries() {
        let p = add_row(&page(), "1/2-1/2", None);
        let first = p.rows[0].id.clone();
        let last = p.rows[1].id.clone();

        assert_eq!(move_row(&p, &first, Direction::Up), p);
        assert_eq!(move_row(&p, &last, Direction::Down), p);

        let moved = move_row(&p, &first, Direction::Down);
        assert_eq!(moved.rows[0].id, last);
        assert_eq!(moved.rows[1].id, first);
    }

    #[test]
    fn test_remove_widget() {
        let (row, col) = first_ids(&page());
        let p = add_widget_to_column(&page(), &row, &col, WidgetKind::Text);
        let widget = p.rows[0].columns[0].widgets[0].id.clone();

        let wrong_column = remove_widget(&p, &row, &ColumnId::new("col-77"), &widget);
        assert_eq!(wrong_column, p);

        let next = remove_widget(&p, &row, &col, &widget);
        assert!(next.rows[0].columns[0].widgets.is_empty());
    }

    #[test]
    fn test_insert_widget_position() {
        let (row, col) = first_ids(&page());
        let p = add_widget_to_column(&page(), &row, &col, WidgetKind::Text);
        let p = insert_widget(&p, &row, &col, WidgetKind::Divider, Some(0));
        let kinds: Vec<_> = p.rows[0].columns[0]
            .widgets
            .iter()
            .map(|w| w.kind.clone())
            .collect();
        assert_eq!(kinds, vec![WidgetKind::Divider, WidgetKind::Text]);
    }

    #[test]
    fn test_move_widget_between_columns() {
        let p = add_row(&page(), "1/2-1/2", None);
        let (row0, col0) = first_ids(&p);
        let p = add_widget_to_column(&p, &row0, &col0, WidgetKind::Image);
        let widget = p.rows[0].columns[0].widgets[0].id.clone();
        let row1 = p.rows[1].id.clone();
        let col1 = p.rows[1].columns[1].id.clone();

        let next = move_widget(&p, &widget, &row1, &col1, 5);
        assert!(next.rows[0].columns[0].widgets.is_empty());
        assert_eq!(next.rows[1].columns[1].widgets[0].id, widget);

        let missing = move_widget(&p, &widget, &row1, &ColumnId::new("col-404"), 0);
        assert_eq!(missing, p);
    }

    #[test]
    fn test_move_widget_within_column() {
        let (row, col) = first_ids(&page());
        let mut p = page();
        for kind in [WidgetKind::Heading, WidgetKind::Text, WidgetKind::Button] {
            p = add_widget_to_column(&p, &row, &col, kind);
        }
        let heading = p.rows[0].columns[0].widgets[0].id.clone();
        let next = move_widget(&p, &heading, &row, &col, 2);
        let kinds: Vec<_> = next.rows[0].columns[0]
            .widgets
            .iter()
            .map(|w| w.kind.clone())
            .collect();
        assert_eq!(
            kinds,
            vec![WidgetKind::Text, WidgetKind::Button, WidgetKind::Heading]
        );
    }

    #[test]
    fn test_duplicate_widget() {
        let (row, col) = first_ids(&page());
        let p = add_widget_to_column(&page(), &row, &col, WidgetKind::Badge);
        let p = add_widget_to_column(&p, &row, &col, WidgetKind::Text);
        let badge = p.rows[0].columns[0].widgets[0].id.clone();

        let next = duplicate_widget(&p, &badge);
        let widgets = &next.rows[0].columns[0].widgets;
        assert_eq!(widgets.len(), 3);
        assert_eq!(widgets[1].kind, WidgetKind::Badge);
        assert_ne!(widgets[1].id, badge);
        assert_eq!(widgets[2].kind, WidgetKind::Text);
    }

    #[test]
    fn test_set_row_preset_merges_overflow() {
        let p = add_row(&page(), "1/3-1/3-1/3", None);
        let row = p.rows[1].id.clone();
        let cols: Vec<ColumnId> = p.rows[1].columns.iter().map(|c| c.id.clone()).collect();
        let mut p = add_widget_to_column(&p, &row, &cols[1], WidgetKind::Text);
        p = add_widget_to_column(&p, &row, &cols[2], WidgetKind::Image);

        let next = set_row_preset(&p, &row, "1/1");
        let columns = &next.rows[1].columns;
        assert_eq!(columns.len(), 1);
        assert_eq!(columns[0].id, cols[0]);
        assert_eq!(columns[0].width, 12);
        assert_eq!(columns[0].widgets.len(), 2);

        let next = set_row_preset(&p, &row, "1/2-1/2");
        let columns = &next.rows[1].columns;
        assert_eq!(next.rows[1].preset.as_deref(), Some("1/2-1/2"));
        assert_eq!(columns[1].id, cols[1]);
        assert_eq!(columns[1].widgets.len(), 2);
        assert_eq!(columns[1].widgets[1].kind, WidgetKind::Image);
    }

    #[test]
    fn test_set_row_preset_grows() {
        let p = page();
        let (row, col) = first_ids(&p);
        let next = set_row_preset(&p, &row, "1/4-1/2-1/4");
        assert_eq!(next.rows[0].widths(), vec![3, 6, 3]);
        assert_eq!(next.rows[0].columns[0].id, col);
        assert_eq!(set_row_preset(&p, &row, "bogus"), p);
    }

    #[test]
    fn test_update_widget_data_replaces_payload() {
        let (row, col) = first_ids(&page());
        let p = add_widget_to_column(&page(), &row, &col, WidgetKind::Heading);
        let widget = p.rows[0].columns[0].widgets[0].id.clone();

        let data = json!({"text": "Soldes d'été"}).as_object().cloned().unwrap();
        let next = update_widget_data(&p, &widget, data);
        let updated = next.widget(&widget).unwrap();
        assert_eq!(updated.text("text"), Some("Soldes d'été"));
        assert!(updated.data.get("level").is_none());
    }

    #[test]
    fn test_style_updates() {
        let p = page();
        let (row, _) = first_ids(&p);
        let style = StyleOverrides {
            background_color: Some("#000".into()),
            ..Default::default()
        };
        let next = update_row_style(&p, &row, style.clone());
        assert_eq!(next.rows[0].style, style);

        let next = update_page_style(&next, style.clone());
        assert_eq!(next.style, style);
    }

    #[test]
    fn test_ids_never_reused_after_remove() {
        let p = add_row(&page(), "1/1", None);
        let added = p.rows[1].id.clone();
        let p = remove_row(&p, &added);
        let p = add_row(&p, "1/1", None);
        assert_ne!(p.rows[1].id, added);
    }
}
