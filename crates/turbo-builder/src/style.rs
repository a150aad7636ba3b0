//! Per-node style overrides and the cascade that resolves them.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::BuilderError;

/// Optional style overrides carried by pages, rows and widgets.
///
/// Spacing comes in granular (`paddingTop`) and combined (`paddingY`)
/// forms; see [`cascade`].
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct StyleOverrides {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub padding_top: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub padding_bottom: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub padding_left: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub padding_right: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub padding_x: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub padding_y: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub margin_top: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub margin_bottom: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub margin_y: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub background_color: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub background_image: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub text_color: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub text_align: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub font_size: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub border_radius: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_width: Option<u32>,
}

/// Box edges in pixels.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Spacing {
    pub top: u32,
    pub right: u32,
    pub bottom: u32,
    pub left: u32,
}

impl Spacing {
    pub const ZERO: Spacing = Spacing::symmetric(0, 0);

    /// Same value on opposite edges.
    pub const fn symmetric(vertical: u32, horizontal: u32) -> Self {
        Self {
            top: vertical,
            right: horizontal,
            bottom: vertical,
            left: horizontal,
        }
    }
}

/// `specific ?? combined ?? default`.
pub fn cascade<T>(specific: Option<T>, combined: Option<T>, default: T) -> T {
    specific.or(combined).unwrap_or(default)
}

impl StyleOverrides {
    /// Whether no override is set.
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    /// Resolved padding.
    pub fn padding(&self, default: Spacing) -> Spacing {
        Spacing {
            top: cascade(self.padding_top, self.padding_y, default.top),
            right: cascade(self.padding_right, self.padding_x, default.right),
            bottom: cascade(self.padding_bottom, self.padding_y, default.bottom),
            left: cascade(self.padding_left, self.padding_x, default.left),
        }
    }

    /// Resolved vertical margins; horizontal margins are never overridden.
    pub fn margin(&self, default: Spacing) -> Spacing {
        Spacing {
            top: cascade(self.margin_top, self.margin_y, default.top),
            right: default.right,
            bottom: cascade(self.margin_bottom, self.margin_y, default.bottom),
            left: default.left,
        }
    }

    /// Current value of a field, by its serialized name. `Null` when unset.
    pub fn get(&self, name: &str) -> Value {
        match serde_json::to_value(self) {
            Ok(Value::Object(map)) => map.get(name).cloned().unwrap_or(Value::Null),
            _ => Value::Null,
        }
    }

    /// Set (or clear, with `Null`) a field by its serialized name.
    pub fn set(&mut self, name: &str, value: &Value) -> Result<(), BuilderError> {
        fn px(name: &str, value: &Value) -> Result<Option<u32>, BuilderError> {
            match value {
                Value::Null => Ok(None),
                Value::Number(n) => n
                    .as_u64()
                    .and_then(|n| u32::try_from(n).ok())
                    .map(Some)
                    .ok_or_else(|| BuilderError::invalid(name, "expected a positive integer")),
                _ => Err(BuilderError::invalid(name, "expected a number")),
            }
        }
        fn text(name: &str, value: &Value) -> Result<Option<String>, BuilderError> {
            match value {
                Value::Null => Ok(None),
                Value::String(s) if s.is_empty() => Ok(None),
                Value::String(s) => Ok(Some(s.clone())),
                _ => Err(BuilderError::invalid(name, "expected a string")),
            }
        }

        match name {
            "paddingTop" => self.padding_top = px(name, value)?,
            "paddingBottom" => self.padding_bottom = px(name, value)?,
            "paddingLeft" => self.padding_left = px(name, value)?,
            "paddingRight" => self.padding_right = px(name, value)?,
            "paddingX" => self.padding_x = px(name, value)?,
            "paddingY" => self.padding_y = px(name, value)?,
            "marginTop" => self.margin_top = px(name, value)?,
            "marginBottom" => self.margin_bottom = px(name, value)?,
            "marginY" => self.margin_y = px(name, value)?,
            "backgroundColor" => self.background_color = text(name, value)?,
            "backgroundImage" => self.background_image = text(name, value)?,
            "textColor" => self.text_color = text(name, value)?,
            "textAlign" => self.text_align = text(name, value)?,
            "fontSize" => self.font_size = px(name, value)?,
            "borderRadius" => self.border_radius = px(name, value)?,
            "maxWidth" => self.max_width = px(name, value)?,
            _ => {
                return Err(BuilderError::UnknownField {
                    kind: "style".to_string(),
                    field: name.to_string(),
                })
            }
        }
        Ok(())
    }
}
