//! Inline styles resolved from style overrides.

use super::html_escape;
use crate::schema::is_url;
use crate::style::{Spacing, StyleOverrides};

/// Built-in spacing of a node kind, applied when nothing overrides it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NodeDefaults {
    pub padding: Spacing,
    pub margin: Spacing,
}

impl NodeDefaults {
    pub const PAGE: NodeDefaults = NodeDefaults {
        padding: Spacing::ZERO,
        margin: Spacing::ZERO,
    };

    pub const ROW: NodeDefaults = NodeDefaults {
        padding: Spacing::symmetric(32, 16),
        margin: Spacing::ZERO,
    };

    pub const WIDGET: NodeDefaults = NodeDefaults {
        padding: Spacing::ZERO,
        margin: Spacing {
            top: 0,
            right: 0,
            bottom: 16,
            left: 0,
        },
    };
}

/// CSS declarations for a node, in a fixed order.
pub fn declarations(style: &StyleOverrides, defaults: NodeDefaults) -> Vec<String> {
    let mut out = Vec::new();

    let padding = style.padding(defaults.padding);
    if padding != Spacing::ZERO {
        out.push(format!("padding: {}", edges(padding)));
    }
    let margin = style.margin(defaults.margin);
    if margin != Spacing::ZERO {
        out.push(format!("margin: {}", edges(margin)));
    }
    if let Some(color) = &style.background_color {
        out.push(format!("background-color: {}", color));
    }
    if let Some(image) = style.background_image.as_deref().filter(|i| is_url(i)) {
        out.push(format!("background-image: url('{}')", image.replace('\'', "%27")));
        out.push("background-size: cover".to_string());
        out.push("background-position: center".to_string());
    }
    if let Some(color) = &style.text_color {
        out.push(format!("color: {}", color));
    }
    if let Some(align) = &style.text_align {
        out.push(format!("text-align: {}", align));
    }
    if let Some(size) = style.font_size {
        out.push(format!("font-size: {}px", size));
    }
    if let Some(radius) = style.border_radius {
        out.push(format!("border-radius: {}px", radius));
    }
    if let Some(width) = style.max_width {
        out.push(format!("max-width: {}px", width));
        out.push("margin-left: auto".to_string());
        out.push("margin-right: auto".to_string());
    }
    out
}

/// ` style="..."`, or nothing when there is nothing to say.
pub fn style_attribute(style: &StyleOverrides, defaults: NodeDefaults) -> String {
    let decls = declarations(style, defaults);
    if decls.is_empty() {
        String::new()
    } else {
        format!(r#" style="{}""#, html_escape(&decls.join("; ")))
    }
}

fn edges(s: Spacing) -> String {
    if s.top == s.bottom && s.left == s.right {
        format!("{}px {}px", s.top, s.right)
    } else {
        format!("{}px {}px {}px {}px", s.top, s.right, s.bottom, s.left)
    }
}
