//! Generic editor for list-valued fields.
//!
//! One editor serves every list (form fields, price features, ...); the
//! item shape decides what a new item looks like and which cells exist.

use serde_json::Value;

use crate::model::Direction;
use crate::schema::{FieldSpec, ItemShape};

/// One edit to an ordered list.
#[derive(Debug, Clone, PartialEq)]
pub enum ListEdit {
    /// Append a default item.
    Add,
    Remove(usize),
    Move { index: usize, direction: Direction },
    /// Replace a whole item.
    Set { index: usize, value: Value },
    /// Replace one cell of a record item.
    SetCell {
        index: usize,
        cell: String,
        value: Value,
    },
}

impl ListEdit {
    pub fn name(&self) -> &'static str {
        match self {
            ListEdit::Add => "add",
            ListEdit::Remove(_) => "remove",
            ListEdit::Move { .. } => "move",
            ListEdit::Set { .. } => "set",
            ListEdit::SetCell { .. } => "set_cell",
        }
    }
}

/// Applies [`ListEdit`]s for one item shape.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ListEditor {
    shape: ItemShape,
    min_items: usize,
    max_items: Option<usize>,
}

impl ListEditor {
    pub fn new(shape: ItemShape) -> Self {
        Self {
            shape,
            min_items: 0,
            max_items: None,
        }
    }

    /// Editor for a list field, honouring its item bounds.
    pub fn for_field(spec: &FieldSpec) -> Option<Self> {
        let shape = spec.item_shape()?;
        Some(Self {
            shape,
            min_items: spec.constraints.min_items.unwrap_or(0),
            max_items: spec.constraints.max_items,
        })
    }

    pub fn shape(&self) -> ItemShape {
        self.shape
    }

    /// Whether another item may be added to a list of `len` items.
    pub fn can_add(&self, len: usize) -> bool {
        self.max_items.map_or(true, |max| len < max)
    }

    /// Whether an item may be removed from a list of `len` items.
    pub fn can_remove(&self, len: usize) -> bool {
        len > self.min_items
    }

    /// Apply an edit. Edits that do not fit the list return it unchanged.
    pub fn apply(&self, items: &[Value], edit: &ListEdit) -> Vec<Value> {
        let mut next = items.to_vec();
        match edit {
            ListEdit::Add => {
                if self.can_add(next.len()) {
                    next.push(self.shape.default_item());
                }
            }
            ListEdit::Remove(index) => {
                if *index < next.len() && self.can_remove(next.len()) {
                    next.remove(*index);
                }
            }
            ListEdit::Move { index, direction } => {
                if *index < next.len() {
                    if let Some(other) = direction.neighbour(*index, next.len()) {
                        next.swap(*index, other);
                    }
                }
            }
            ListEdit::Set { index, value } => {
                if let Some(item) = next.get_mut(*index) {
                    *item = value.clone();
                }
            }
            ListEdit::SetCell { index, cell, value } => {
                if self.shape.cell(cell).is_some() {
                    if let Some(Value::Object(record)) = next.get_mut(*index) {
                        record.insert(cell.clone(), value.clone());
                    }
                }
            }
        }
        next
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalogue::WidgetKind;
    use crate::schema::{widget_field, InputType};
    use serde_json::json;

    fn form_editor() -> ListEditor {
        ListEditor::for_field(widget_field(&WidgetKind::Form, "fields").unwrap()).unwrap()
    }

    fn items(value: Value) -> Vec<Value> {
        value.as_array().cloned().unwrap()
    }

    #[test]
    fn test_add_uses_shape_default() {
        let editor = ListEditor::new(ItemShape::Scalar(&InputType::Text));
        assert_eq!(editor.apply(&[], &ListEdit::Add), vec![json!("")]);

        let added = form_editor().apply(&[], &ListEdit::Add);
        assert_eq!(added[0]["type"], "text");
    }

    #[test]
    fn test_remove_and_bounds() {
        let list = items(json!(["a", "b", "c"]));
        let editor = ListEditor::new(ItemShape::Scalar(&InputType::Text));
        assert_eq!(editor.apply(&list, &ListEdit::Remove(1)), items(json!(["a", "c"])));
        assert_eq!(editor.apply(&list, &ListEdit::Remove(3)), list);

        let single = items(json!([{"label": "Nom", "type": "text", "required": true}]));
        assert_eq!(form_editor().apply(&single, &ListEdit::Remove(0)), single);
    }

    #[test]
    fn test_move() {
        let list = items(json!(["a", "b", "c"]));
        let editor = ListEditor::new(ItemShape::Scalar(&InputType::Text));
        let moved = editor.apply(
            &list,
            &ListEdit::Move {
                index: 0,
                direction: Direction::Down,
            },
        );
        assert_eq!(moved, items(json!(["b", "a", "c"])));

        let edge = ListEdit::Move {
            index: 2,
            direction: Direction::Down,
        };
        assert_eq!(editor.apply(&list, &edge), list);
        let outside = ListEdit::Move {
            index: 7,
            direction: Direction::Up,
        };
        assert_eq!(editor.apply(&list, &outside), list);
    }

    #[test]
    fn test_set_cell_only_known_cells() {
        let list = items(json!([{"label": "Nom", "type": "text", "required": true}]));
        let editor = form_editor();

        let edited = editor.apply(
            &list,
            &ListEdit::SetCell {
                index: 0,
                cell: "label".into(),
                value: json!("Prénom"),
            },
        );
        assert_eq!(edited[0]["label"], "Prénom");

        let unknown = ListEdit::SetCell {
            index: 0,
            cell: "placeholder".into(),
            value: json!("x"),
        };
        assert_eq!(editor.apply(&list, &unknown), list);
    }

    #[test]
    fn test_max_items() {
        let editor = ListEditor::for_field(widget_field(&WidgetKind::Price, "features").unwrap())
            .unwrap();
        let full: Vec<Value> = (0..12).map(|i| json!(format!("f{}", i))).collect();
        assert!(!editor.can_add(full.len()));
        assert_eq!(editor.apply(&full, &ListEdit::Add).len(), 12);
    }
}
