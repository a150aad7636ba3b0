//! Declarative field schema per widget kind and style target.
//!
//! The editor panel is generated from these tables, and every edit made
//! through the panel is validated against them.

use serde_json::{Map, Number, Value};

use crate::catalogue::{WidgetKind, PRESET_IDS};
use crate::error::BuilderError;

/// How a field is edited.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum InputType {
    Text,
    TextArea,
    Url,
    Color,
    Number { min: Option<f64>, max: Option<f64> },
    Select(&'static [&'static str]),
    Toggle,
    /// `datetime-local` value or RFC 3339 timestamp.
    DateTime,
    List(ItemShape),
}

/// Shape of the items of a list field.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ItemShape {
    Scalar(&'static InputType),
    Record(&'static [ItemField]),
}

/// One named cell of a record item.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ItemField {
    pub name: &'static str,
    pub label: &'static str,
    pub input: InputType,
}

/// Validation rules beyond the input type.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Constraints {
    pub required: bool,
    pub max_length: Option<usize>,
    pub min_items: Option<usize>,
    pub max_items: Option<usize>,
}

impl Constraints {
    pub const NONE: Constraints = Constraints {
        required: false,
        max_length: None,
        min_items: None,
        max_items: None,
    };
}

/// One editable field.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FieldSpec {
    /// Key in the widget payload or style overrides.
    pub name: &'static str,
    pub label: &'static str,
    pub input: InputType,
    pub constraints: Constraints,
}

const fn field(name: &'static str, label: &'static str, input: InputType) -> FieldSpec {
    FieldSpec {
        name,
        label,
        input,
        constraints: Constraints::NONE,
    }
}

impl FieldSpec {
    const fn required(mut self) -> Self {
        self.constraints.required = true;
        self
    }

    const fn max_length(mut self, n: usize) -> Self {
        self.constraints.max_length = Some(n);
        self
    }

    const fn items(mut self, min: usize, max: usize) -> Self {
        self.constraints.min_items = Some(min);
        self.constraints.max_items = Some(max);
        self
    }

    /// Check `value` and return its normalized form.
    ///
    /// `Null` clears an optional field.
    pub fn validate(&self, value: &Value) -> Result<Value, BuilderError> {
        if value.is_null() {
            return if self.constraints.required {
                Err(BuilderError::invalid(self.name, "this field is required"))
            } else {
                Ok(Value::Null)
            };
        }

        let normalized = self.input.check(self.name, value)?;

        if let Value::String(s) = &normalized {
            if self.constraints.required && s.trim().is_empty() {
                return Err(BuilderError::invalid(self.name, "this field is required"));
            }
            if let Some(max) = self.constraints.max_length {
                if s.chars().count() > max {
                    return Err(BuilderError::invalid(
                        self.name,
                        format!("at most {} characters", max),
                    ));
                }
            }
        }
        if let Value::Array(items) = &normalized {
            if let Some(min) = self.constraints.min_items {
                if items.len() < min {
                    return Err(BuilderError::invalid(
                        self.name,
                        format!("at least {} items", min),
                    ));
                }
            }
            if let Some(max) = self.constraints.max_items {
                if items.len() > max {
                    return Err(BuilderError::invalid(
                        self.name,
                        format!("at most {} items", max),
                    ));
                }
            }
        }
        Ok(normalized)
    }

    /// Value shown when the node has none.
    pub fn default_value(&self) -> Value {
        self.input.default_value()
    }

    /// Item shape, for list fields.
    pub fn item_shape(&self) -> Option<ItemShape> {
        match self.input {
            InputType::List(shape) => Some(shape),
            _ => None,
        }
    }
}

impl InputType {
    /// Check the type of `value` and normalize it.
    pub fn check(&self, field: &str, value: &Value) -> Result<Value, BuilderError> {
        match self {
            InputType::Text | InputType::TextArea => expect_str(field, value).map(Value::from),
            InputType::Url => {
                let url = expect_str(field, value)?;
                if url.is_empty() || is_url(url) {
                    Ok(Value::from(url))
                } else {
                    Err(BuilderError::invalid(field, "expected a URL"))
                }
            }
            InputType::Color => {
                let color = expect_str(field, value)?.trim();
                if color.is_empty() || is_color(color) {
                    Ok(Value::from(color))
                } else {
                    Err(BuilderError::invalid(field, "expected a color like #1a2b3c"))
                }
            }
            InputType::Number { min, max } => {
                let n = match value {
                    Value::Number(n) => n.as_f64(),
                    Value::String(s) => s.trim().parse::<f64>().ok(),
                    _ => None,
                }
                .filter(|n| n.is_finite())
                .ok_or_else(|| BuilderError::invalid(field, "expected a number"))?;
                if let Some(min) = min {
                    if n < *min {
                        return Err(BuilderError::invalid(
                            field,
                            format!("must be at least {}", min),
                        ));
                    }
                }
                if let Some(max) = max {
                    if n > *max {
                        return Err(BuilderError::invalid(
                            field,
                            format!("must be at most {}", max),
                        ));
                    }
                }
                Ok(number_value(n))
            }
            InputType::Select(options) => {
                let choice = expect_str(field, value)?;
                if options.iter().any(|o| *o == choice) {
                    Ok(Value::from(choice))
                } else {
                    Err(BuilderError::invalid(
                        field,
                        format!("expected one of {}", options.join(", ")),
                    ))
                }
            }
            InputType::Toggle => match value {
                Value::Bool(b) => Ok(Value::Bool(*b)),
                Value::String(s) if s == "true" || s == "on" => Ok(Value::Bool(true)),
                Value::String(s) if s == "false" || s == "off" => Ok(Value::Bool(false)),
                _ => Err(BuilderError::invalid(field, "expected true or false")),
            },
            InputType::DateTime => {
                let s = expect_str(field, value)?.trim();
                if s.is_empty() || is_datetime(s) {
                    Ok(Value::from(s))
                } else {
                    Err(BuilderError::invalid(field, "expected a date and time"))
                }
            }
            InputType::List(shape) => {
                let items = value
                    .as_array()
                    .ok_or_else(|| BuilderError::invalid(field, "expected a list"))?;
                items
                    .iter()
                    .map(|item| shape.check_item(field, item))
                    .collect::<Result<Vec<_>, _>>()
                    .map(Value::Array)
            }
        }
    }

    /// Neutral value for the input.
    pub fn default_value(&self) -> Value {
        match self {
            InputType::Text | InputType::TextArea | InputType::Url | InputType::DateTime => {
                Value::from("")
            }
            InputType::Color => Value::from("#000000"),
            InputType::Number { min, .. } => number_value(min.unwrap_or(0.0)),
            InputType::Select(options) => options
                .first()
                .map(|o| Value::from(*o))
                .unwrap_or(Value::Null),
            InputType::Toggle => Value::Bool(false),
            InputType::List(_) => Value::Array(Vec::new()),
        }
    }
}

impl ItemShape {
    /// A new item for the list editor's "add" button.
    pub fn default_item(&self) -> Value {
        match self {
            ItemShape::Scalar(input) => input.default_value(),
            ItemShape::Record(fields) => Value::Object(
                fields
                    .iter()
                    .map(|f| (f.name.to_string(), f.input.default_value()))
                    .collect(),
            ),
        }
    }

    /// Cell definition of a record item.
    pub fn cell(&self, name: &str) -> Option<&'static ItemField> {
        match self {
            ItemShape::Record(fields) => fields.iter().find(|f| f.name == name),
            ItemShape::Scalar(_) => None,
        }
    }

    fn check_item(&self, field: &str, item: &Value) -> Result<Value, BuilderError> {
        match self {
            ItemShape::Scalar(input) => input.check(field, item),
            ItemShape::Record(fields) => {
                let obj = item
                    .as_object()
                    .ok_or_else(|| BuilderError::invalid(field, "expected a record"))?;
                let mut out = Map::new();
                for cell in fields.iter() {
                    let value = match obj.get(cell.name) {
                        Some(Value::Null) | None => cell.input.default_value(),
                        Some(v) => cell.input.check(&format!("{}.{}", field, cell.name), v)?,
                    };
                    out.insert(cell.name.to_string(), value);
                }
                Ok(Value::Object(out))
            }
        }
    }
}

fn expect_str<'a>(field: &str, value: &'a Value) -> Result<&'a str, BuilderError> {
    value
        .as_str()
        .ok_or_else(|| BuilderError::invalid(field, "expected text"))
}

fn number_value(n: f64) -> Value {
    if n.fract() == 0.0 && n.abs() < i64::MAX as f64 {
        Value::from(n as i64)
    } else {
        Number::from_f64(n).map(Value::Number).unwrap_or(Value::Null)
    }
}

/// Whether `s` is an absolute http(s) URL, a site-relative path, an anchor,
/// or a `mailto:`/`tel:` link.
pub(crate) fn is_url(s: &str) -> bool {
    ["http://", "https://", "/", "#", "mailto:", "tel:"]
        .iter()
        .any(|prefix| s.starts_with(prefix))
        && !s.chars().any(char::is_whitespace)
}

fn is_color(s: &str) -> bool {
    match s.strip_prefix('#') {
        Some(hex) => {
            matches!(hex.len(), 3 | 4 | 6 | 8) && hex.chars().all(|c| c.is_ascii_hexdigit())
        }
        None => {
            s.chars().all(|c| c.is_ascii_alphabetic())
                || ["rgb(", "rgba(", "hsl(", "hsla("]
                    .iter()
                    .any(|f| s.starts_with(f) && s.ends_with(')'))
        }
    }
}

fn is_datetime(s: &str) -> bool {
    chrono::DateTime::parse_from_rfc3339(s).is_ok()
        || ["%Y-%m-%dT%H:%M", "%Y-%m-%dT%H:%M:%S"]
            .iter()
            .any(|fmt| chrono::NaiveDateTime::parse_from_str(s, fmt).is_ok())
}

const ALIGN: InputType = InputType::Select(&["left", "center", "right"]);
const TEXT_ALIGN: InputType = InputType::Select(&["left", "center", "right", "justify"]);
const PIXELS: InputType = InputType::Number {
    min: Some(0.0),
    max: Some(400.0),
};

const HEADING: &[FieldSpec] = &[
    field("text", "Texte", InputType::Text).required().max_length(200),
    field("level", "Niveau", InputType::Select(&["h1", "h2", "h3", "h4", "h5", "h6"])),
    field("align", "Alignement", ALIGN),
];

const TEXT: &[FieldSpec] = &[
    field("text", "Texte", InputType::TextArea).max_length(5000),
    field("align", "Alignement", TEXT_ALIGN),
];

const IMAGE: &[FieldSpec] = &[
    field("src", "Image", InputType::Url),
    field("alt", "Texte alternatif", InputType::Text).max_length(200),
    field("width", "Largeur", InputType::Select(&["100%", "75%", "50%", "25%", "auto"])),
    field("link", "Lien", InputType::Url),
];

const BUTTON: &[FieldSpec] = &[
    field("text", "Texte", InputType::Text).required().max_length(80),
    field("url", "Lien", InputType::Url),
    field("variant", "Style", InputType::Select(&["primary", "secondary", "outline", "ghost"])),
    field("size", "Taille", InputType::Select(&["sm", "md", "lg"])),
];

const SPACER: &[FieldSpec] = &[field("height", "Hauteur (px)", PIXELS)];

const VIDEO: &[FieldSpec] = &[
    field("url", "URL de la vidéo", InputType::Url),
    field("autoplay", "Lecture automatique", InputType::Toggle),
    field("controls", "Afficher les contrôles", InputType::Toggle),
];

const ICON: &[FieldSpec] = &[
    field("name", "Icône", InputType::Text).required(),
    field(
        "size",
        "Taille (px)",
        InputType::Number {
            min: Some(8.0),
            max: Some(256.0),
        },
    ),
    field("color", "Couleur", InputType::Color),
];

const DIVIDER: &[FieldSpec] = &[
    field("style", "Style", InputType::Select(&["solid", "dashed", "dotted"])),
    field(
        "thickness",
        "Épaisseur (px)",
        InputType::Number {
            min: Some(1.0),
            max: Some(20.0),
        },
    ),
    field("color", "Couleur", InputType::Color),
];

const PRODUCT_CARD: &[FieldSpec] = &[
    field("productId", "Produit", InputType::Text),
    field("showPrice", "Afficher le prix", InputType::Toggle),
    field("showButton", "Afficher le bouton", InputType::Toggle),
    field("buttonText", "Texte du bouton", InputType::Text).max_length(60),
];

const FORM_FIELD_ITEM: &[ItemField] = &[
    ItemField {
        name: "label",
        label: "Libellé",
        input: InputType::Text,
    },
    ItemField {
        name: "type",
        label: "Type",
        input: InputType::Select(&["text", "email", "tel", "number", "textarea"]),
    },
    ItemField {
        name: "required",
        label: "Obligatoire",
        input: InputType::Toggle,
    },
];

const FORM: &[FieldSpec] = &[
    field("title", "Titre", InputType::Text).max_length(120),
    field("submitText", "Texte du bouton", InputType::Text)
        .required()
        .max_length(60),
    field(
        "fields",
        "Champs",
        InputType::List(ItemShape::Record(FORM_FIELD_ITEM)),
    )
    .items(1, 20),
];

const COUNTDOWN: &[FieldSpec] = &[
    field("targetDate", "Date de fin", InputType::DateTime),
    field("label", "Libellé", InputType::Text).max_length(120),
    field("showSeconds", "Afficher les secondes", InputType::Toggle),
];

const TESTIMONIAL: &[FieldSpec] = &[
    field("quote", "Citation", InputType::TextArea).required().max_length(1000),
    field("author", "Auteur", InputType::Text).max_length(80),
    field("role", "Fonction", InputType::Text).max_length(80),
    field("avatar", "Photo", InputType::Url),
    field(
        "rating",
        "Note",
        InputType::Number {
            min: Some(0.0),
            max: Some(5.0),
        },
    ),
];

const PRICE: &[FieldSpec] = &[
    field("title", "Titre", InputType::Text).max_length(80),
    field(
        "amount",
        "Montant",
        InputType::Number {
            min: Some(0.0),
            max: None,
        },
    ),
    field("currency", "Devise", InputType::Text).max_length(4),
    field("period", "Période", InputType::Text).max_length(20),
    field(
        "features",
        "Avantages",
        InputType::List(ItemShape::Scalar(&InputType::Text)),
    )
    .items(0, 12),
    field("ctaText", "Texte du bouton", InputType::Text).max_length(60),
];

const BADGE: &[FieldSpec] = &[
    field("text", "Texte", InputType::Text).required().max_length(30),
    field("color", "Couleur", InputType::Color),
    field("shape", "Forme", InputType::Select(&["pill", "rounded", "square"])),
];

/// Fields of a widget kind, in panel order. Unknown kinds have none.
pub fn fields_for(kind: &WidgetKind) -> &'static [FieldSpec] {
    match kind {
        WidgetKind::Heading => HEADING,
        WidgetKind::Text => TEXT,
        WidgetKind::Image => IMAGE,
        WidgetKind::Button => BUTTON,
        WidgetKind::Spacer => SPACER,
        WidgetKind::Video => VIDEO,
        WidgetKind::Icon => ICON,
        WidgetKind::Divider => DIVIDER,
        WidgetKind::ProductCard => PRODUCT_CARD,
        WidgetKind::Form => FORM,
        WidgetKind::Countdown => COUNTDOWN,
        WidgetKind::Testimonial => TESTIMONIAL,
        WidgetKind::Price => PRICE,
        WidgetKind::Badge => BADGE,
        WidgetKind::Unknown(_) => &[],
    }
}

/// One field of a widget kind.
pub fn widget_field(kind: &WidgetKind, name: &str) -> Option<&'static FieldSpec> {
    fields_for(kind).iter().find(|f| f.name == name)
}

/// Layout field shown on the row panel.
pub const ROW_PRESET_FIELD: FieldSpec =
    field("preset", "Disposition", InputType::Select(PRESET_IDS)).required();

/// Node whose style overrides are being edited.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StyleTarget {
    Page,
    Row,
    Widget,
}

const PAGE_STYLE: &[FieldSpec] = &[
    field("backgroundColor", "Couleur de fond", InputType::Color),
    field("textColor", "Couleur du texte", InputType::Color),
    field(
        "fontSize",
        "Taille du texte (px)",
        InputType::Number {
            min: Some(8.0),
            max: Some(72.0),
        },
    ),
    field(
        "maxWidth",
        "Largeur max (px)",
        InputType::Number {
            min: Some(320.0),
            max: Some(2400.0),
        },
    ),
    field("paddingY", "Marge intérieure verticale", PIXELS),
];

const ROW_STYLE: &[FieldSpec] = &[
    field("backgroundColor", "Couleur de fond", InputType::Color),
    field("backgroundImage", "Image de fond", InputType::Url),
    field("textColor", "Couleur du texte", InputType::Color),
    field("paddingY", "Marge intérieure verticale", PIXELS),
    field("paddingX", "Marge intérieure horizontale", PIXELS),
    field("paddingTop", "Marge intérieure haut", PIXELS),
    field("paddingBottom", "Marge intérieure bas", PIXELS),
    field(
        "maxWidth",
        "Largeur max (px)",
        InputType::Number {
            min: Some(320.0),
            max: Some(2400.0),
        },
    ),
];

const WIDGET_STYLE: &[FieldSpec] = &[
    field("marginTop", "Marge haut", PIXELS),
    field("marginBottom", "Marge bas", PIXELS),
    field("paddingY", "Marge intérieure verticale", PIXELS),
    field("paddingX", "Marge intérieure horizontale", PIXELS),
    field("backgroundColor", "Couleur de fond", InputType::Color),
    field("textColor", "Couleur du texte", InputType::Color),
    field("textAlign", "Alignement", TEXT_ALIGN),
    field(
        "fontSize",
        "Taille du texte (px)",
        InputType::Number {
            min: Some(8.0),
            max: Some(120.0),
        },
    ),
    field(
        "borderRadius",
        "Arrondi (px)",
        InputType::Number {
            min: Some(0.0),
            max: Some(64.0),
        },
    ),
];

impl StyleTarget {
    /// Style fields offered for this target, in panel order.
    pub fn fields(&self) -> &'static [FieldSpec] {
        match self {
            StyleTarget::Page => PAGE_STYLE,
            StyleTarget::Row => ROW_STYLE,
            StyleTarget::Widget => WIDGET_STYLE,
        }
    }

    pub fn field(&self, name: &str) -> Option<&'static FieldSpec> {
        self.fields().iter().find(|f| f.name == name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::style::StyleOverrides;
    use serde_json::json;
    use std::collections::BTreeSet;

    #[test]
    fn test_schema_matches_default_payloads() {
        for kind in WidgetKind::ALL {
            let schema: BTreeSet<&str> = fields_for(&kind).iter().map(|f| f.name).collect();
            let defaults = kind.default_data();
            let data: BTreeSet<&str> = defaults.keys().map(String::as_str).collect();
            assert_eq!(schema, data, "schema and defaults disagree for {}", kind);
        }
    }

    #[test]
    fn test_defaults_pass_validation() {
        for kind in WidgetKind::ALL {
            let defaults = kind.default_data();
            for spec in fields_for(&kind) {
                let value = &defaults[spec.name];
                assert!(
                    spec.validate(value).is_ok(),
                    "default {} of {} is invalid",
                    spec.name,
                    kind
                );
            }
        }
    }

    #[test]
    fn test_style_fields_exist_on_overrides() {
        for target in [StyleTarget::Page, StyleTarget::Row, StyleTarget::Widget] {
            for spec in target.fields() {
                let mut style = StyleOverrides::default();
                let value = spec.validate(&spec.default_value()).unwrap();
                assert!(style.set(spec.name, &value).is_ok(), "{}", spec.name);
            }
        }
    }

    #[test]
    fn test_preset_ids_match_table() {
        let table: Vec<&str> = crate::catalogue::ROW_PRESETS.iter().map(|p| p.id).collect();
        assert_eq!(table, PRESET_IDS);
        assert!(ROW_PRESET_FIELD.validate(&json!("1/3-2/3")).is_ok());
        assert!(ROW_PRESET_FIELD.validate(&json!("2/5-3/5")).is_err());
    }

    #[test]
    fn test_unknown_kind_has_no_fields() {
        assert!(fields_for(&WidgetKind::Unknown("carousel".into())).is_empty());
    }

    #[test]
    fn test_required_and_length() {
        let text = widget_field(&WidgetKind::Button, "text").unwrap();
        assert!(text.validate(&json!("   ")).is_err());
        assert!(text.validate(&Value::Null).is_err());
        assert!(text.validate(&json!("x".repeat(81))).is_err());
        assert_eq!(text.validate(&json!("Acheter")).unwrap(), json!("Acheter"));
    }

    #[test]
    fn test_number_bounds_and_normalization() {
        let height = widget_field(&WidgetKind::Spacer, "height").unwrap();
        assert_eq!(height.validate(&json!("64")).unwrap(), json!(64));
        assert!(height.validate(&json!(-1)).is_err());
        assert!(height.validate(&json!(401)).is_err());
        assert!(height.validate(&json!("tall")).is_err());

        let amount = widget_field(&WidgetKind::Price, "amount").unwrap();
        assert_eq!(amount.validate(&json!("19.5")).unwrap(), json!(19.5));
    }

    #[test]
    fn test_select_and_toggle() {
        let level = widget_field(&WidgetKind::Heading, "level").unwrap();
        assert!(level.validate(&json!("h3")).is_ok());
        assert!(level.validate(&json!("h7")).is_err());

        let autoplay = widget_field(&WidgetKind::Video, "autoplay").unwrap();
        assert_eq!(autoplay.validate(&json!("on")).unwrap(), json!(true));
        assert!(autoplay.validate(&json!(1)).is_err());
    }

    #[test]
    fn test_url_color_datetime() {
        let url = widget_field(&WidgetKind::Button, "url").unwrap();
        assert!(url.validate(&json!("https://shop.example.com/promo")).is_ok());
        assert!(url.validate(&json!("javascript:alert(1)")).is_err());

        let color = widget_field(&WidgetKind::Badge, "color").unwrap();
        assert!(color.validate(&json!("#abc")).is_ok());
        assert!(color.validate(&json!("#ggg")).is_err());
        assert!(color.validate(&json!("rebeccapurple")).is_ok());

        let date = widget_field(&WidgetKind::Countdown, "targetDate").unwrap();
        assert!(date.validate(&json!("2026-12-24T18:00")).is_ok());
        assert!(date.validate(&json!("2026-12-24T18:00:00+01:00")).is_ok());
        assert!(date.validate(&json!("Noël")).is_err());
    }

    #[test]
    fn test_list_items_are_checked() {
        let fields = widget_field(&WidgetKind::Form, "fields").unwrap();
        assert!(fields.validate(&json!([])).is_err(), "min one field");

        let normalized = fields
            .validate(&json!([{"label": "Téléphone", "type": "tel"}]))
            .unwrap();
        assert_eq!(
            normalized,
            json!([{"label": "Téléphone", "type": "tel", "required": false}])
        );
        assert!(fields
            .validate(&json!([{"label": "X", "type": "file"}]))
            .is_err());

        let features = widget_field(&WidgetKind::Price, "features").unwrap();
        assert!(features.validate(&json!(["a", 2])).is_err());
    }

    #[test]
    fn test_default_items() {
        let form = widget_field(&WidgetKind::Form, "fields").unwrap();
        assert_eq!(
            form.item_shape().unwrap().default_item(),
            json!({"label": "", "type": "text", "required": false})
        );
        let price = widget_field(&WidgetKind::Price, "features").unwrap();
        assert_eq!(price.item_shape().unwrap().default_item(), json!(""));
    }
}
