//! Static registry of widget kinds and row presets.

use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};
use std::fmt;

/// Kind-specific payload of a widget: field name to JSON value.
///
/// Never validated on read; every field is optional.
pub type WidgetData = Map<String, Value>;

/// Closed set of widget kinds.
///
/// Saved documents may name kinds this build does not know yet; those are
/// kept as [`WidgetKind::Unknown`] so nothing is lost on a round trip.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum WidgetKind {
    Heading,
    Text,
    Image,
    Button,
    Spacer,
    Video,
    Icon,
    Divider,
    ProductCard,
    Form,
    Countdown,
    Testimonial,
    Price,
    Badge,
    Unknown(String),
}

/// Toolbox grouping.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum WidgetCategory {
    Basic,
    Commerce,
    Engagement,
}

impl WidgetCategory {
    pub fn label(&self) -> &'static str {
        match self {
            WidgetCategory::Basic => "Basique",
            WidgetCategory::Commerce => "E-commerce",
            WidgetCategory::Engagement => "Engagement",
        }
    }
}

impl WidgetKind {
    /// Every kind known to this build, in toolbox order.
    pub const ALL: [WidgetKind; 14] = [
        WidgetKind::Heading,
        WidgetKind::Text,
        WidgetKind::Image,
        WidgetKind::Button,
        WidgetKind::Spacer,
        WidgetKind::Video,
        WidgetKind::Icon,
        WidgetKind::Divider,
        WidgetKind::ProductCard,
        WidgetKind::Form,
        WidgetKind::Countdown,
        WidgetKind::Testimonial,
        WidgetKind::Price,
        WidgetKind::Badge,
    ];

    /// Catalogue tag.
    pub fn as_str(&self) -> &str {
        match self {
            WidgetKind::Heading => "heading",
            WidgetKind::Text => "text",
            WidgetKind::Image => "image",
            WidgetKind::Button => "button",
            WidgetKind::Spacer => "spacer",
            WidgetKind::Video => "video",
            WidgetKind::Icon => "icon",
            WidgetKind::Divider => "divider",
            WidgetKind::ProductCard => "product-card",
            WidgetKind::Form => "form",
            WidgetKind::Countdown => "countdown",
            WidgetKind::Testimonial => "testimonial",
            WidgetKind::Price => "price",
            WidgetKind::Badge => "badge",
            WidgetKind::Unknown(tag) => tag,
        }
    }

    /// Parse a known tag.
    pub fn parse(tag: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|k| k.as_str() == tag)
    }

    /// Whether this build can render and edit the kind.
    pub fn is_known(&self) -> bool {
        !matches!(self, WidgetKind::Unknown(_))
    }

    /// Toolbox label.
    pub fn label(&self) -> &str {
        match self {
            WidgetKind::Heading => "Titre",
            WidgetKind::Text => "Texte",
            WidgetKind::Image => "Image",
            WidgetKind::Button => "Bouton",
            WidgetKind::Spacer => "Espacement",
            WidgetKind::Video => "Vidéo",
            WidgetKind::Icon => "Icône",
            WidgetKind::Divider => "Séparateur",
            WidgetKind::ProductCard => "Carte produit",
            WidgetKind::Form => "Formulaire",
            WidgetKind::Countdown => "Compte à rebours",
            WidgetKind::Testimonial => "Témoignage",
            WidgetKind::Price => "Prix",
            WidgetKind::Badge => "Badge",
            WidgetKind::Unknown(tag) => tag,
        }
    }

    /// Toolbox icon name.
    pub fn icon(&self) -> &'static str {
        match self {
            WidgetKind::Heading => "heading",
            WidgetKind::Text => "type",
            WidgetKind::Image => "image",
            WidgetKind::Button => "mouse-pointer-click",
            WidgetKind::Spacer => "move-vertical",
            WidgetKind::Video => "video",
            WidgetKind::Icon => "star",
            WidgetKind::Divider => "minus",
            WidgetKind::ProductCard => "shopping-bag",
            WidgetKind::Form => "file-text",
            WidgetKind::Countdown => "timer",
            WidgetKind::Testimonial => "quote",
            WidgetKind::Price => "tag",
            WidgetKind::Badge => "award",
            WidgetKind::Unknown(_) => "help-circle",
        }
    }

    pub fn category(&self) -> WidgetCategory {
        match self {
            WidgetKind::ProductCard
            | WidgetKind::Price
            | WidgetKind::Badge
            | WidgetKind::Countdown => WidgetCategory::Commerce,
            WidgetKind::Form | WidgetKind::Testimonial => WidgetCategory::Engagement,
            _ => WidgetCategory::Basic,
        }
    }

    /// A fresh copy of the kind's default payload.
    pub fn default_data(&self) -> WidgetData {
        let value = match self {
            WidgetKind::Heading => json!({
                "text": "Votre titre ici",
                "level": "h2",
                "align": "left",
            }),
            WidgetKind::Text => json!({
                "text": "Ajoutez votre texte ici. Cliquez pour le modifier.",
                "align": "left",
            }),
            WidgetKind::Image => json!({
                "src": "",
                "alt": "Image",
                "width": "100%",
                "link": "",
            }),
            WidgetKind::Button => json!({
                "text": "Cliquez ici",
                "url": "#",
                "variant": "primary",
                "size": "md",
            }),
            WidgetKind::Spacer => json!({ "height": 40 }),
            WidgetKind::Video => json!({
                "url": "",
                "autoplay": false,
                "controls": true,
            }),
            WidgetKind::Icon => json!({
                "name": "star",
                "size": 32,
                "color": "#6366f1",
            }),
            WidgetKind::Divider => json!({
                "style": "solid",
                "thickness": 1,
                "color": "#e2e8f0",
            }),
            WidgetKind::ProductCard => json!({
                "productId": "",
                "showPrice": true,
                "showButton": true,
                "buttonText": "Ajouter au panier",
            }),
            WidgetKind::Form => json!({
                "title": "Contactez-nous",
                "submitText": "Envoyer",
                "fields": [
                    { "label": "Nom", "type": "text", "required": true },
                    { "label": "Email", "type": "email", "required": true },
                    { "label": "Message", "type": "textarea", "required": false },
                ],
            }),
            WidgetKind::Countdown => json!({
                "targetDate": "",
                "label": "L'offre se termine dans",
                "showSeconds": true,
            }),
            WidgetKind::Testimonial => json!({
                "quote": "Un service exceptionnel, je recommande vivement !",
                "author": "Marie D.",
                "role": "Cliente fidèle",
                "avatar": "",
                "rating": 5,
            }),
            WidgetKind::Price => json!({
                "title": "Offre Pro",
                "amount": 29.99,
                "currency": "€",
                "period": "/mois",
                "features": ["Produits illimités", "Support prioritaire", "Nom de domaine"],
                "ctaText": "Choisir cette offre",
            }),
            WidgetKind::Badge => json!({
                "text": "Nouveau",
                "color": "#ef4444",
                "shape": "pill",
            }),
            WidgetKind::Unknown(_) => json!({}),
        };
        match value {
            Value::Object(map) => map,
            _ => Map::new(),
        }
    }
}

impl From<String> for WidgetKind {
    fn from(tag: String) -> Self {
        WidgetKind::parse(&tag).unwrap_or(WidgetKind::Unknown(tag))
    }
}

impl From<&str> for WidgetKind {
    fn from(tag: &str) -> Self {
        WidgetKind::from(tag.to_string())
    }
}

impl From<WidgetKind> for String {
    fn from(kind: WidgetKind) -> Self {
        kind.as_str().to_string()
    }
}

impl fmt::Display for WidgetKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Known kinds grouped by toolbox category.
pub fn palette() -> Vec<(WidgetCategory, Vec<WidgetKind>)> {
    [
        WidgetCategory::Basic,
        WidgetCategory::Commerce,
        WidgetCategory::Engagement,
    ]
    .into_iter()
    .map(|category| {
        let kinds = WidgetKind::ALL
            .into_iter()
            .filter(|k| k.category() == category)
            .collect();
        (category, kinds)
    })
    .collect()
}

/// Named column layout for a row.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RowPreset {
    pub id: &'static str,
    pub label: &'static str,
    /// Column widths in twelfths.
    pub widths: &'static [u8],
}

/// Single full-width column; the layout of a new page's first row.
pub const FULL_WIDTH: RowPreset = RowPreset {
    id: "1/1",
    label: "Pleine largeur",
    widths: &[12],
};

/// Every layout a row can take.
pub const ROW_PRESETS: &[RowPreset] = &[
    FULL_WIDTH,
    RowPreset {
        id: "1/2-1/2",
        label: "2 colonnes",
        widths: &[6, 6],
    },
    RowPreset {
        id: "1/3-2/3",
        label: "1/3 + 2/3",
        widths: &[4, 8],
    },
    RowPreset {
        id: "2/3-1/3",
        label: "2/3 + 1/3",
        widths: &[8, 4],
    },
    RowPreset {
        id: "1/3-1/3-1/3",
        label: "3 colonnes",
        widths: &[4, 4, 4],
    },
    RowPreset {
        id: "1/4-3/4",
        label: "1/4 + 3/4",
        widths: &[3, 9],
    },
    RowPreset {
        id: "3/4-1/4",
        label: "3/4 + 1/4",
        widths: &[9, 3],
    },
    RowPreset {
        id: "1/4-1/2-1/4",
        label: "1/4 + 1/2 + 1/4",
        widths: &[3, 6, 3],
    },
    RowPreset {
        id: "1/4-1/4-1/4-1/4",
        label: "4 colonnes",
        widths: &[3, 3, 3, 3],
    },
];

const PRESET_COUNT: usize = ROW_PRESETS.len();

const PRESET_ID_ARRAY: [&str; PRESET_COUNT] = {
    let mut ids = [""; PRESET_COUNT];
    let mut i = 0;
    while i < PRESET_COUNT {
        ids[i] = ROW_PRESETS[i].id;
        i += 1;
    }
    ids
};

/// Ids of [`ROW_PRESETS`], in toolbox order.
pub const PRESET_IDS: &[&str] = &PRESET_ID_ARRAY;

/// Look up a preset by id.
pub fn find_preset(id: &str) -> Option<&'static RowPreset> {
    ROW_PRESETS.iter().find(|p| p.id == id)
}
