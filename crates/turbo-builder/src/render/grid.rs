//! Breakpoints and the 12-column grid.

use serde::{Deserialize, Serialize};
use std::fmt;

use super::css::{self, NodeDefaults};
use super::widgets::render_widget;
use super::{node_attributes, RenderOptions};
use crate::model::{Column, Row};

/// Grid units in a row.
pub const GRID_COLUMNS: u8 = 12;

/// Preview viewport.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Breakpoint {
    #[default]
    Desktop,
    Tablet,
    Mobile,
}

impl Breakpoint {
    pub const ALL: [Breakpoint; 3] = [Breakpoint::Desktop, Breakpoint::Tablet, Breakpoint::Mobile];

    pub fn as_str(&self) -> &'static str {
        match self {
            Breakpoint::Desktop => "desktop",
            Breakpoint::Tablet => "tablet",
            Breakpoint::Mobile => "mobile",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|b| b.as_str() == s)
    }

    /// Width class of the page container.
    pub fn container_class(&self) -> &'static str {
        match self {
            Breakpoint::Desktop => "container-desktop max-w-6xl",
            Breakpoint::Tablet => "container-tablet max-w-3xl",
            Breakpoint::Mobile => "container-mobile max-w-sm",
        }
    }

    /// Preview frame width in pixels.
    pub fn viewport_width(&self) -> u32 {
        match self {
            Breakpoint::Desktop => 1200,
            Breakpoint::Tablet => 768,
            Breakpoint::Mobile => 375,
        }
    }
}

impl fmt::Display for Breakpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Grid units a column spans on a breakpoint.
///
/// Desktop keeps the preset width, tablet widens anything narrower than
/// half a row, mobile stacks every column.
pub fn column_span(width: u8, breakpoint: Breakpoint) -> u8 {
    let width = width.clamp(1, GRID_COLUMNS);
    match breakpoint {
        Breakpoint::Desktop => width,
        Breakpoint::Tablet => width.max(GRID_COLUMNS / 2),
        Breakpoint::Mobile => GRID_COLUMNS,
    }
}

/// Render a row and its columns.
pub fn render_row(row: &Row, options: &RenderOptions) -> String {
    let columns: String = row
        .columns
        .iter()
        .map(|column| render_column(column, options))
        .collect();

    format!(
        r#"<section class="builder-row grid grid-cols-12"{}{}>{}</section>"#,
        node_attributes(row.id.as_str(), options),
        css::style_attribute(&row.style, NodeDefaults::ROW),
        columns
    )
}

/// Render a column and its widgets.
pub fn render_column(column: &Column, options: &RenderOptions) -> String {
    let span = column_span(column.width, options.breakpoint);
    let widgets: String = column
        .widgets
        .iter()
        .map(|widget| render_widget(widget, options))
        .collect();

    let placeholder = if options.editing && column.widgets.is_empty() {
        r#"<div class="column-drop-zone">Déposez un widget ici</div>"#
    } else {
        ""
    };

    format!(
        r#"<div class="builder-column col-span-{}"{}>{}{}</div>"#,
        span,
        node_attributes(column.id.as_str(), options),
        widgets,
        placeholder
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_desktop_keeps_width() {
        for width in 1..=12 {
            assert_eq!(column_span(width, Breakpoint::Desktop), width);
        }
    }

    #[test]
    fn test_tablet_widens_narrow_columns() {
        assert_eq!(column_span(3, Breakpoint::Tablet), 6);
        assert_eq!(column_span(4, Breakpoint::Tablet), 6);
        assert_eq!(column_span(8, Breakpoint::Tablet), 8);
    }

    #[test]
    fn test_mobile_stacks() {
        assert_eq!(column_span(3, Breakpoint::Mobile), 12);
        assert_eq!(column_span(12, Breakpoint::Mobile), 12);
    }

    #[test]
    fn test_breakpoint_parse() {
        assert_eq!(Breakpoint::parse("tablet"), Some(Breakpoint::Tablet));
        assert_eq!(Breakpoint::parse("watch"), None);
        assert_eq!(Breakpoint::default(), Breakpoint::Desktop);
        let json = serde_json::to_string(&Breakpoint::Mobile).unwrap();
        assert_eq!(json, "\"mobile\"");
    }
}
