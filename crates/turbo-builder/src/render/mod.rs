//! HTML renderer.
//!
//! Maps the layout tree to markup for a breakpoint. In editing mode every
//! node carries `data-node-id` and the selected node is flagged so the host
//! can wire clicks and drops back to store actions.

pub mod css;
mod grid;
mod panel;
mod widgets;

pub use grid::{column_span, render_column, render_row, Breakpoint, GRID_COLUMNS};
pub use panel::{render_list_editor, render_panel};
pub use widgets::{embed_url, render_widget, render_widget_body};

use crate::model::Page;
use crate::store::{BuilderStore, Selection};
use css::NodeDefaults;

/// How to render a tree.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RenderOptions {
    pub breakpoint: Breakpoint,
    /// Annotate nodes for the editor canvas.
    pub editing: bool,
    /// Node id to flag as selected.
    pub selected: Option<String>,
}

impl RenderOptions {
    /// Published output: no editor annotations.
    pub fn preview(breakpoint: Breakpoint) -> Self {
        Self {
            breakpoint,
            editing: false,
            selected: None,
        }
    }

    /// Canvas output for the store's current breakpoint and selection.
    pub fn editor(store: &BuilderStore) -> Self {
        let selected = match store.selection() {
            Selection::None => None,
            Selection::Page => Some(store.page().id.to_string()),
            Selection::Row(id) => Some(id.to_string()),
            Selection::Widget(id) => Some(id.to_string()),
        };
        Self {
            breakpoint: store.breakpoint(),
            editing: true,
            selected,
        }
    }
}

/// Render a whole page.
pub fn render_page(page: &Page, options: &RenderOptions) -> String {
    let rows: String = page
        .rows
        .iter()
        .map(|row| render_row(row, options))
        .collect();

    format!(
        r#"<main class="builder-page {}" data-breakpoint="{}"{}{}>{}</main>"#,
        options.breakpoint.container_class(),
        options.breakpoint,
        node_attributes(page.id.as_str(), options),
        css::style_attribute(&page.style, NodeDefaults::PAGE),
        rows
    )
}

/// Editor annotations for a node; empty outside editing mode.
pub(crate) fn node_attributes(id: &str, options: &RenderOptions) -> String {
    if !options.editing {
        return String::new();
    }
    let selected = options.selected.as_deref() == Some(id);
    format!(
        r#" data-node-id="{}"{}"#,
        html_escape(id),
        if selected { r#" data-selected="true""# } else { "" }
    )
}

/// Escape text for HTML content and attribute values.
pub fn html_escape(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#39;")
}
