//! Editor panel for the selected node.
//!
//! The panel model lists the schema fields of the selection with their
//! current values. Edits made through it are validated, then dispatched to
//! the store as ordinary actions.

use serde_json::Value;

use crate::catalogue::{find_preset, WidgetKind};
use crate::error::BuilderError;
use crate::ids::{RowId, WidgetId};
use crate::list_editor::{ListEdit, ListEditor};
use crate::model::Page;
use crate::schema::{widget_field, FieldSpec, StyleTarget, ROW_PRESET_FIELD};
use crate::store::{Action, BuilderStore, Outcome, Selection};
use crate::style::StyleOverrides;

/// Node a panel edits.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PanelTarget {
    Page,
    Row(RowId),
    Widget(WidgetId),
}

impl PanelTarget {
    pub fn style_target(&self) -> StyleTarget {
        match self {
            PanelTarget::Page => StyleTarget::Page,
            PanelTarget::Row(_) => StyleTarget::Row,
            PanelTarget::Widget(_) => StyleTarget::Widget,
        }
    }
}

/// Panel section a field belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldGroup {
    Content,
    Layout,
    Style,
}

impl FieldGroup {
    pub fn label(&self) -> &'static str {
        match self {
            FieldGroup::Content => "Contenu",
            FieldGroup::Layout => "Disposition",
            FieldGroup::Style => "Style",
        }
    }
}

/// A field with the value the node currently has.
#[derive(Debug, Clone, PartialEq)]
pub struct FieldView {
    pub spec: &'static FieldSpec,
    pub group: FieldGroup,
    pub value: Value,
    /// The node does not set this field.
    pub is_default: bool,
}

/// Panel model for one selection.
#[derive(Debug, Clone, PartialEq)]
pub struct EditorPanel {
    pub title: String,
    pub target: PanelTarget,
    pub fields: Vec<FieldView>,
}

impl EditorPanel {
    /// Build the panel for `selection`; `None` when nothing is selected or
    /// the node is gone.
    pub fn build(page: &Page, selection: &Selection) -> Option<Self> {
        match selection {
            Selection::None => None,
            Selection::Page => Some(Self {
                title: "Page".to_string(),
                target: PanelTarget::Page,
                fields: style_fields(StyleTarget::Page, &page.style),
            }),
            Selection::Row(id) => {
                let index = page.row_index(id)?;
                let row = &page.rows[index];
                let preset = row.preset.clone().map(Value::from);
                let mut fields = vec![FieldView {
                    spec: &ROW_PRESET_FIELD,
                    group: FieldGroup::Layout,
                    is_default: preset.is_none(),
                    value: preset.unwrap_or_else(|| ROW_PRESET_FIELD.default_value()),
                }];
                fields.extend(style_fields(StyleTarget::Row, &row.style));
                Some(Self {
                    title: format!("Ligne {}", index + 1),
                    target: PanelTarget::Row(id.clone()),
                    fields,
                })
            }
            Selection::Widget(id) => {
                let widget = page.widget(id)?;
                let defaults = widget.kind.default_data();
                let mut fields: Vec<FieldView> = crate::schema::fields_for(&widget.kind)
                    .iter()
                    .map(|spec| match widget.data.get(spec.name) {
                        Some(value) if !value.is_null() => FieldView {
                            spec,
                            group: FieldGroup::Content,
                            value: value.clone(),
                            is_default: false,
                        },
                        _ => FieldView {
                            spec,
                            group: FieldGroup::Content,
                            value: defaults
                                .get(spec.name)
                                .cloned()
                                .unwrap_or_else(|| spec.default_value()),
                            is_default: true,
                        },
                    })
                    .collect();
                fields.extend(style_fields(StyleTarget::Widget, &widget.style));
                Some(Self {
                    title: widget.kind.label().to_string(),
                    target: PanelTarget::Widget(id.clone()),
                    fields,
                })
            }
        }
    }

    /// A field by name.
    pub fn field(&self, name: &str) -> Option<&FieldView> {
        self.fields.iter().find(|f| f.spec.name == name)
    }

    /// Fields of one group, in order.
    pub fn group(&self, group: FieldGroup) -> impl Iterator<Item = &FieldView> {
        self.fields.iter().filter(move |f| f.group == group)
    }
}

fn style_fields(target: StyleTarget, style: &StyleOverrides) -> Vec<FieldView> {
    target
        .fields()
        .iter()
        .map(|spec| {
            let value = style.get(spec.name);
            FieldView {
                spec,
                group: FieldGroup::Style,
                is_default: value.is_null(),
                value,
            }
        })
        .collect()
}

fn unknown_field(kind: &WidgetKind, name: &str) -> BuilderError {
    BuilderError::UnknownField {
        kind: kind.to_string(),
        field: name.to_string(),
    }
}

/// Validate and apply one content field of a widget.
///
/// `Null` removes the field from the payload.
pub fn set_widget_field(
    store: &mut BuilderStore,
    widget_id: &WidgetId,
    name: &str,
    value: &Value,
) -> Result<Outcome, BuilderError> {
    let widget = store
        .page()
        .widget(widget_id)
        .ok_or_else(|| BuilderError::WidgetNotFound(widget_id.to_string()))?;
    let spec = widget_field(&widget.kind, name).ok_or_else(|| unknown_field(&widget.kind, name))?;
    let normalized = spec.validate(value)?;

    let mut data = widget.data.clone();
    if normalized.is_null() {
        data.remove(name);
    } else {
        data.insert(name.to_string(), normalized);
    }
    Ok(store.dispatch(Action::UpdateWidgetData {
        widget_id: widget_id.clone(),
        data,
    }))
}

/// Apply a list edit to a list-valued widget field.
pub fn edit_widget_list(
    store: &mut BuilderStore,
    widget_id: &WidgetId,
    name: &str,
    edit: &ListEdit,
) -> Result<Outcome, BuilderError> {
    let widget = store
        .page()
        .widget(widget_id)
        .ok_or_else(|| BuilderError::WidgetNotFound(widget_id.to_string()))?;
    let spec = widget_field(&widget.kind, name).ok_or_else(|| unknown_field(&widget.kind, name))?;
    let editor = ListEditor::for_field(spec)
        .ok_or_else(|| BuilderError::invalid(name, "not a list field"))?;

    let current = widget.list(name);
    let next = editor.apply(current, edit);
    if next.as_slice() == current {
        return Ok(Outcome::Unchanged);
    }
    set_widget_field(store, widget_id, name, &Value::Array(next))
}

/// Validate and apply one style field of the page, a row or a widget.
pub fn set_style_field(
    store: &mut BuilderStore,
    target: &PanelTarget,
    name: &str,
    value: &Value,
) -> Result<Outcome, BuilderError> {
    let spec = target
        .style_target()
        .field(name)
        .ok_or_else(|| BuilderError::UnknownField {
            kind: "style".to_string(),
            field: name.to_string(),
        })?;
    let normalized = spec.validate(value)?;

    let page = store.page();
    let action = match target {
        PanelTarget::Page => {
            let mut style = page.style.clone();
            style.set(name, &normalized)?;
            Action::UpdatePageStyle { style }
        }
        PanelTarget::Row(row_id) => {
            let row = page
                .row(row_id)
                .ok_or_else(|| BuilderError::RowNotFound(row_id.to_string()))?;
            let mut style = row.style.clone();
            style.set(name, &normalized)?;
            Action::UpdateRowStyle {
                row_id: row_id.clone(),
                style,
            }
        }
        PanelTarget::Widget(widget_id) => {
            let widget = page
                .widget(widget_id)
                .ok_or_else(|| BuilderError::WidgetNotFound(widget_id.to_string()))?;
            let mut style = widget.style.clone();
            style.set(name, &normalized)?;
            Action::UpdateWidgetStyle {
                widget_id: widget_id.clone(),
                style,
            }
        }
    };
    Ok(store.dispatch(action))
}

/// Change a row's layout from the panel.
pub fn set_row_preset(
    store: &mut BuilderStore,
    row_id: &RowId,
    preset: &str,
) -> Result<Outcome, BuilderError> {
    if store.page().row(row_id).is_none() {
        return Err(BuilderError::RowNotFound(row_id.to_string()));
    }
    if find_preset(preset).is_none() {
        return Err(BuilderError::UnknownPreset(preset.to_string()));
    }
    Ok(store.dispatch(Action::SetRowPreset {
        row_id: row_id.clone(),
        preset: preset.to_string(),
    }))
}
