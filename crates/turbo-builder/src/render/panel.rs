//! Editor panel form markup.

use serde_json::Value;

use super::html_escape;
use crate::editor::{EditorPanel, FieldGroup, FieldView};
use crate::list_editor::ListEditor;
use crate::schema::{FieldSpec, InputType, ItemShape};

/// Render the panel as an HTML form, grouped by section.
pub fn render_panel(panel: &EditorPanel) -> String {
    let groups: String = [FieldGroup::Content, FieldGroup::Layout, FieldGroup::Style]
        .into_iter()
        .filter_map(|group| {
            let fields: String = panel.group(group).map(render_field).collect();
            if fields.is_empty() {
                return None;
            }
            Some(format!(
                r#"<fieldset class="panel-group" data-group="{}"><legend>{}</legend>{}</fieldset>"#,
                group.label().to_lowercase(),
                group.label(),
                fields
            ))
        })
        .collect();

    format!(
        r#"<form class="editor-panel" data-target="{}">
    <h2 class="panel-title">{}</h2>
    {}
</form>"#,
        html_escape(&target_id(panel)),
        html_escape(&panel.title),
        groups
    )
}

fn target_id(panel: &EditorPanel) -> String {
    use crate::editor::PanelTarget;
    match &panel.target {
        PanelTarget::Page => "page".to_string(),
        PanelTarget::Row(id) => id.to_string(),
        PanelTarget::Widget(id) => id.to_string(),
    }
}

fn render_field(field: &FieldView) -> String {
    let spec = field.spec;
    let control = match spec.input {
        InputType::List(_) => render_list_editor(
            spec,
            field.value.as_array().map(Vec::as_slice).unwrap_or(&[]),
        ),
        input => render_input(
            spec.name,
            &format!("field-{}", spec.name),
            &input,
            &field.value,
            spec,
        ),
    };
    format!(
        r#"<div class="panel-field{}" data-field="{}"><label for="field-{}">{}{}</label>{}</div>"#,
        if field.is_default { " is-default" } else { "" },
        html_escape(spec.name),
        html_escape(spec.name),
        html_escape(spec.label),
        if spec.constraints.required { " *" } else { "" },
        control
    )
}

fn plain(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

fn render_input(
    name: &str,
    id: &str,
    input: &InputType,
    value: &Value,
    spec: &FieldSpec,
) -> String {
    let name = html_escape(name);
    let id = html_escape(id);
    let text = html_escape(&plain(value));
    let required = if spec.constraints.required { " required" } else { "" };
    let maxlength = spec
        .constraints
        .max_length
        .map(|n| format!(r#" maxlength="{}""#, n))
        .unwrap_or_default();

    match input {
        InputType::Text => format!(
            r#"<input type="text" id="{}" name="{}" value="{}"{}{}>"#,
            id, name, text, maxlength, required
        ),
        InputType::TextArea => format!(
            r#"<textarea id="{}" name="{}" rows="4"{}{}>{}</textarea>"#,
            id, name, maxlength, required, text
        ),
        InputType::Url => format!(
            r#"<input type="url" id="{}" name="{}" value="{}"{}>"#,
            id, name, text, required
        ),
        InputType::Color => {
            let hex = plain(value);
            let kind = if hex.len() == 7 && hex.starts_with('#') { "color" } else { "text" };
            format!(
                r#"<input type="{}" id="{}" name="{}" value="{}">"#,
                kind, id, name, text
            )
        }
        InputType::Number { min, max } => format!(
            r#"<input type="number" id="{}" name="{}" value="{}"{}{} step="any">"#,
            id,
            name,
            text,
            min.map(|m| format!(r#" min="{}""#, m)).unwrap_or_default(),
            max.map(|m| format!(r#" max="{}""#, m)).unwrap_or_default()
        ),
        InputType::Select(options) => {
            let current = plain(value);
            let opts: String = options
                .iter()
                .map(|o| {
                    format!(
                        r#"<option value="{}"{}>{}</option>"#,
                        html_escape(o),
                        if *o == current { " selected" } else { "" },
                        html_escape(o)
                    )
                })
                .collect();
            format!(r#"<select id="{}" name="{}">{}</select>"#, id, name, opts)
        }
        InputType::Toggle => format!(
            r#"<input type="checkbox" id="{}" name="{}"{}>"#,
            id,
            name,
            if value.as_bool().unwrap_or(false) { " checked" } else { "" }
        ),
        InputType::DateTime => format!(
            r#"<input type="datetime-local" id="{}" name="{}" value="{}">"#,
            id, name, text
        ),
        InputType::List(_) => String::new(),
    }
}

/// Render the list editor of a list field.
///
/// Buttons carry `data-action` and `data-index` for the host to turn into
/// list edits.
pub fn render_list_editor(spec: &FieldSpec, items: &[Value]) -> String {
    let Some(editor) = ListEditor::for_field(spec) else {
        return String::new();
    };
    let last = items.len().saturating_sub(1);
    let rows: String = items
        .iter()
        .enumerate()
        .map(|(i, item)| {
            let cells = match editor.shape() {
                ItemShape::Scalar(input) => render_input(
                    &format!("{}[{}]", spec.name, i),
                    &format!("field-{}-{}", spec.name, i),
                    input,
                    item,
                    spec,
                ),
                ItemShape::Record(cells) => cells
                    .iter()
                    .map(|cell| {
                        let value = item.get(cell.name).cloned().unwrap_or(Value::Null);
                        format!(
                            r#"<label class="list-cell">{}{}</label>"#,
                            html_escape(cell.label),
                            render_input(
                                &format!("{}[{}].{}", spec.name, i, cell.name),
                                &format!("field-{}-{}-{}", spec.name, i, cell.name),
                                &cell.input,
                                &value,
                                spec,
                            )
                        )
                    })
                    .collect(),
            };
            format!(
                r#"<li class="list-item" data-index="{i}">{cells}<div class="list-actions"><button type="button" data-action="list-move-up" data-index="{i}"{up}>↑</button><button type="button" data-action="list-move-down" data-index="{i}"{down}>↓</button><button type="button" data-action="list-remove" data-index="{i}"{remove}>Supprimer</button></div></li>"#,
                i = i,
                cells = cells,
                up = if i == 0 { " disabled" } else { "" },
                down = if i == last { " disabled" } else { "" },
                remove = if editor.can_remove(items.len()) { "" } else { " disabled" },
            )
        })
        .collect();

    format!(
        r#"<div class="list-editor" data-field="{}"><ol>{}</ol><button type="button" data-action="list-add"{}>Ajouter</button></div>"#,
        html_escape(spec.name),
        rows,
        if editor.can_add(items.len()) { "" } else { " disabled" }
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalogue::WidgetKind;
    use crate::ids::PageId;
    use crate::model::Page;
    use crate::mutation::add_widget_to_column;
    use crate::schema::widget_field;
    use crate::store::Selection;
    use serde_json::json;

    fn panel_for(kind: WidgetKind) -> EditorPanel {
        let page = Page::new(PageId::new("p1"));
        let (row, col) = (page.rows[0].id.clone(), page.rows[0].columns[0].id.clone());
        let page = add_widget_to_column(&page, &row, &col, kind);
        let id = page.rows[0].columns[0].widgets[0].id.clone();
        EditorPanel::build(&page, &Selection::Widget(id)).unwrap()
    }

    #[test]
    fn test_heading_panel_form() {
        let html = render_panel(&panel_for(WidgetKind::Heading));
        assert!(html.contains(r#"data-group="contenu""#));
        assert!(html.contains(r#"value="Votre titre ici""#));
        assert!(html.contains(r#"<option value="h2" selected>"#));
        assert!(html.contains(r#"data-group="style""#));
    }

    #[test]
    fn test_form_panel_has_list_editor() {
        let html = render_panel(&panel_for(WidgetKind::Form));
        assert!(html.contains(r#"class="list-editor" data-field="fields""#));
        assert_eq!(html.matches(r#"class="list-item""#).count(), 3);
        assert!(html.contains(r#"name="fields[1].type""#));
    }

    #[test]
    fn test_list_editor_buttons() {
        let spec = widget_field(&WidgetKind::Form, "fields").unwrap();
        let items = vec![json!({"label": "Nom", "type": "text", "required": true})];
        let html = render_list_editor(spec, &items);
        assert!(html.contains(r#"data-action="list-remove" data-index="0" disabled"#));
        assert!(html.contains(r#"data-action="list-move-up" data-index="0" disabled"#));
        assert!(html.contains(r#"data-action="list-add">"#));
        assert!(html.contains(" checked"));
    }

    #[test]
    fn test_toggle_and_escaping() {
        let html = render_panel(&panel_for(WidgetKind::Testimonial));
        assert!(html.contains("Un service exceptionnel"));
        assert!(html.contains(r#"<input type="number" id="field-rating" name="rating" value="5""#));
    }
}
