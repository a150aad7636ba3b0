//! Per-kind widget markup.
//!
//! Widgets render the same on every breakpoint; only the grid around them
//! changes. A missing or mistyped field falls back to the kind's
//! default.

use serde_json::Value;

use super::css::{self, NodeDefaults};
use super::{html_escape, node_attributes, RenderOptions};
use crate::catalogue::WidgetKind;
use crate::model::Widget;
use crate::schema::is_url;

/// Render a widget with its wrapper.
pub fn render_widget(widget: &Widget, options: &RenderOptions) -> String {
    format!(
        r#"<div class="builder-widget widget-{}"{}{}>{}</div>"#,
        html_escape(widget.kind.as_str()),
        node_attributes(widget.id.as_str(), options),
        css::style_attribute(&widget.style, NodeDefaults::WIDGET),
        render_widget_body(widget)
    )
}

/// Inner markup of a widget.
pub fn render_widget_body(widget: &Widget) -> String {
    match &widget.kind {
        WidgetKind::Heading => render_heading(widget),
        WidgetKind::Text => render_text(widget),
        WidgetKind::Image => render_image(widget),
        WidgetKind::Button => render_button(widget),
        WidgetKind::Spacer => render_spacer(widget),
        WidgetKind::Video => render_video(widget),
        WidgetKind::Icon => render_icon(widget),
        WidgetKind::Divider => render_divider(widget),
        WidgetKind::ProductCard => render_product_card(widget),
        WidgetKind::Form => render_form(widget),
        WidgetKind::Countdown => render_countdown(widget),
        WidgetKind::Testimonial => render_testimonial(widget),
        WidgetKind::Price => render_price(widget),
        WidgetKind::Badge => render_badge(widget),
        WidgetKind::Unknown(tag) => format!(
            r#"<div class="widget-unknown">Widget inconnu : {}</div>"#,
            html_escape(tag)
        ),
    }
}

/// Text field with the kind's default as fallback.
fn text_or_default(widget: &Widget, key: &str) -> String {
    match widget.text(key) {
        Some(s) => s.to_string(),
        None => widget
            .kind
            .default_data()
            .get(key)
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_string(),
    }
}

/// A stored URL, unless its scheme could run script (`javascript:`,
/// `data:`...). Documents loaded from storage never went through the panel.
fn safe_url(url: &str) -> Option<&str> {
    is_url(url).then_some(url)
}

fn number_or(widget: &Widget, key: &str, fallback: f64) -> f64 {
    widget.number(key).unwrap_or(fallback)
}

fn flag_or(widget: &Widget, key: &str, fallback: bool) -> bool {
    widget.flag(key).unwrap_or(fallback)
}

fn render_heading(widget: &Widget) -> String {
    let level = match widget.text("level") {
        Some(l @ ("h1" | "h2" | "h3" | "h4" | "h5" | "h6")) => l,
        _ => "h2",
    };
    format!(
        r#"<{level} class="widget-heading" style="text-align: {}">{}</{level}>"#,
        html_escape(&text_or_default(widget, "align")),
        html_escape(&text_or_default(widget, "text")),
        level = level
    )
}

fn render_text(widget: &Widget) -> String {
    let paragraphs = html_escape(&text_or_default(widget, "text")).replace('\n', "<br>");
    format!(
        r#"<p class="widget-text" style="text-align: {}">{}</p>"#,
        html_escape(&text_or_default(widget, "align")),
        paragraphs
    )
}

fn render_image(widget: &Widget) -> String {
    let src = text_or_default(widget, "src");
    let Some(src) = safe_url(&src) else {
        return r#"<div class="widget-image placeholder">Aucune image</div>"#.to_string();
    };
    let img = format!(
        r#"<img src="{}" alt="{}" class="widget-image" style="width: {}" loading="lazy">"#,
        html_escape(src),
        html_escape(&text_or_default(widget, "alt")),
        html_escape(&text_or_default(widget, "width"))
    );
    match widget.text("link").and_then(safe_url) {
        Some(link) => format!(r#"<a href="{}">{}</a>"#, html_escape(link), img),
        None => img,
    }
}

fn render_button(widget: &Widget) -> String {
    format!(
        r#"<a href="{}" class="btn btn-{} btn-{}">{}</a>"#,
        html_escape(safe_url(&text_or_default(widget, "url")).unwrap_or("#")),
        html_escape(&text_or_default(widget, "variant")),
        html_escape(&text_or_default(widget, "size")),
        html_escape(&text_or_default(widget, "text"))
    )
}

fn render_spacer(widget: &Widget) -> String {
    let height = number_or(widget, "height", 40.0).max(0.0);
    format!(
        r#"<div class="widget-spacer" style="height: {}px" aria-hidden="true"></div>"#,
        height
    )
}

/// Embeddable player URL for YouTube and Vimeo links.
pub fn embed_url(url: &str) -> Option<String> {
    let youtube = url
        .split_once("youtube.com/watch?v=")
        .or_else(|| url.split_once("youtu.be/"))
        .map(|(_, rest)| rest);
    if let Some(rest) = youtube {
        let id = rest.split(['&', '?', '#']).next().unwrap_or_default();
        return (!id.is_empty()).then(|| format!("https://www.youtube.com/embed/{}", id));
    }
    let vimeo = url.split_once("vimeo.com/").map(|(_, rest)| rest)?;
    let id = vimeo.split(['/', '?', '#']).next().unwrap_or_default();
    (!id.is_empty() && id.chars().all(|c| c.is_ascii_digit()))
        .then(|| format!("https://player.vimeo.com/video/{}", id))
}

fn render_video(widget: &Widget) -> String {
    let url = text_or_default(widget, "url");
    let Some(url) = safe_url(&url) else {
        return r#"<div class="widget-video placeholder">Aucune vidéo</div>"#.to_string();
    };
    let autoplay = flag_or(widget, "autoplay", false);
    let controls = flag_or(widget, "controls", true);

    match embed_url(url) {
        Some(embed) => format!(
            r#"<div class="widget-video"><iframe src="{}{}" allow="autoplay; fullscreen" allowfullscreen></iframe></div>"#,
            html_escape(&embed),
            if autoplay { "?autoplay=1" } else { "" }
        ),
        None => format!(
            r#"<video class="widget-video" src="{}"{}{} playsinline></video>"#,
            html_escape(url),
            if controls { " controls" } else { "" },
            if autoplay { " autoplay muted" } else { "" }
        ),
    }
}

fn render_icon(widget: &Widget) -> String {
    format!(
        r#"<span class="widget-icon" data-icon="{}" style="font-size: {}px; color: {}"></span>"#,
        html_escape(&text_or_default(widget, "name")),
        number_or(widget, "size", 32.0),
        html_escape(&text_or_default(widget, "color"))
    )
}

fn render_divider(widget: &Widget) -> String {
    let style = match widget.text("style") {
        Some(s @ ("solid" | "dashed" | "dotted")) => s,
        _ => "solid",
    };
    format!(
        r#"<hr class="widget-divider" style="border-top: {}px {} {}">"#,
        number_or(widget, "thickness", 1.0),
        style,
        html_escape(&text_or_default(widget, "color"))
    )
}

fn render_product_card(widget: &Widget) -> String {
    let product_id = text_or_default(widget, "productId");
    if product_id.is_empty() {
        return r#"<div class="widget-product-card placeholder">Sélectionnez un produit</div>"#
            .to_string();
    }
    let price = if flag_or(widget, "showPrice", true) {
        r#"<div class="product-price" data-bind="price"></div>"#
    } else {
        ""
    };
    let button = if flag_or(widget, "showButton", true) {
        format!(
            r#"<button class="btn btn-primary" data-action="add-to-cart">{}</button>"#,
            html_escape(&text_or_default(widget, "buttonText"))
        )
    } else {
        String::new()
    };
    format!(
        r#"<article class="widget-product-card" data-product-id="{}">
    <div class="product-image" data-bind="image"></div>
    <h3 class="product-name" data-bind="name"></h3>
    {}{}
</article>"#,
        html_escape(&product_id),
        price,
        button
    )
}

fn render_form_field(field: &Value) -> String {
    let label = field.get("label").and_then(Value::as_str).unwrap_or("Champ");
    let kind = field.get("type").and_then(Value::as_str).unwrap_or("text");
    let required = field
        .get("required")
        .and_then(Value::as_bool)
        .unwrap_or(false);
    let required_attr = if required { " required" } else { "" };
    let marker = if required { " *" } else { "" };

    let input = if kind == "textarea" {
        format!(
            r#"<textarea name="{}"{}></textarea>"#,
            html_escape(label),
            required_attr
        )
    } else {
        format!(
            r#"<input type="{}" name="{}"{}>"#,
            html_escape(kind),
            html_escape(label),
            required_attr
        )
    };
    format!(
        r#"<label class="form-field"><span>{}{}</span>{}</label>"#,
        html_escape(label),
        marker,
        input
    )
}

fn render_form(widget: &Widget) -> String {
    let fields: String = widget.list("fields").iter().map(render_form_field).collect();
    format!(
        r#"<form class="widget-form" method="post">
    <h3>{}</h3>
    {}
    <button type="submit" class="btn btn-primary">{}</button>
</form>"#,
        html_escape(&text_or_default(widget, "title")),
        fields,
        html_escape(&text_or_default(widget, "submitText"))
    )
}

fn render_countdown(widget: &Widget) -> String {
    let mut units = vec![("days", "Jours"), ("hours", "Heures"), ("minutes", "Minutes")];
    if flag_or(widget, "showSeconds", true) {
        units.push(("seconds", "Secondes"));
    }
    let cells: String = units
        .iter()
        .map(|(unit, label)| {
            format!(
                r#"<div class="countdown-unit" data-unit="{}"><span class="countdown-value">00</span><span class="countdown-caption">{}</span></div>"#,
                unit, label
            )
        })
        .collect();
    format!(
        r#"<div class="widget-countdown" data-target="{}">
    <div class="countdown-label">{}</div>
    <div class="countdown-units">{}</div>
</div>"#,
        html_escape(&text_or_default(widget, "targetDate")),
        html_escape(&text_or_default(widget, "label")),
        cells
    )
}

fn render_testimonial(widget: &Widget) -> String {
    let rating = number_or(widget, "rating", 5.0).round().clamp(0.0, 5.0) as usize;
    let stars = format!("{}{}", "★".repeat(rating), "☆".repeat(5 - rating));
    let author = text_or_default(widget, "author");
    let avatar = match widget.text("avatar").and_then(safe_url) {
        Some(url) => format!(
            r#"<img src="{}" alt="{}" class="testimonial-avatar">"#,
            html_escape(url),
            html_escape(&author)
        ),
        None => {
            let initials: String = author
                .split_whitespace()
                .filter_map(|w| w.chars().next())
                .take(2)
                .collect();
            format!(
                r#"<div class="testimonial-avatar placeholder">{}</div>"#,
                html_escape(&initials)
            )
        }
    };
    format!(
        r#"<figure class="widget-testimonial">
    <div class="testimonial-rating" aria-label="{} / 5">{}</div>
    <blockquote class="testimonial-quote">"{}"</blockquote>
    <figcaption class="testimonial-author">{}<span class="author-name">{}</span><span class="author-role">{}</span></figcaption>
</figure>"#,
        rating,
        stars,
        html_escape(&text_or_default(widget, "quote")),
        avatar,
        html_escape(&author),
        html_escape(&text_or_default(widget, "role"))
    )
}

fn render_price(widget: &Widget) -> String {
    let features: String = widget
        .list("features")
        .iter()
        .filter_map(Value::as_str)
        .map(|f| format!("<li>{}</li>", html_escape(f)))
        .collect();
    format!(
        r##"<div class="widget-price">
    <h3 class="price-title">{}</h3>
    <div class="price-amount"><span class="amount">{:.2}</span> <span class="currency">{}</span><span class="period">{}</span></div>
    <ul class="price-features">{}</ul>
    <a href="#" class="btn btn-primary">{}</a>
</div>"##,
        html_escape(&text_or_default(widget, "title")),
        number_or(widget, "amount", 0.0),
        html_escape(&text_or_default(widget, "currency")),
        html_escape(&text_or_default(widget, "period")),
        features,
        html_escape(&text_or_default(widget, "ctaText"))
    )
}

fn render_badge(widget: &Widget) -> String {
    format!(
        r#"<span class="widget-badge badge-{}" style="background-color: {}">{}</span>"#,
        html_escape(&text_or_default(widget, "shape")),
        html_escape(&text_or_default(widget, "color")),
        html_escape(&text_or_default(widget, "text"))
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ids::WidgetId;
    use crate::style::StyleOverrides;
    use serde_json::json;

    fn widget(kind: WidgetKind) -> Widget {
        Widget {
            id: WidgetId::new("w-1"),
            data: kind.default_data(),
            kind,
            style: StyleOverrides::default(),
        }
    }

    fn with_data(kind: WidgetKind, data: Value) -> Widget {
        Widget {
            data: data.as_object().cloned().unwrap(),
            ..widget(kind)
        }
    }

    #[test]
    fn test_every_kind_renders() {
        for kind in WidgetKind::ALL {
            let html = render_widget_body(&widget(kind.clone()));
            assert!(!html.is_empty(), "{} rendered nothing", kind);
        }
    }

    #[test]
    fn test_heading_defaults_and_escaping() {
        let html = render_widget_body(&widget(WidgetKind::Heading));
        assert!(html.starts_with("<h2"));
        assert!(html.contains("Votre titre ici"));

        let html = render_widget_body(&with_data(
            WidgetKind::Heading,
            json!({"text": "<b>Soldes</b>", "level": "h9"}),
        ));
        assert!(html.starts_with("<h2"));
        assert!(html.contains("&lt;b&gt;Soldes&lt;/b&gt;"));
    }

    #[test]
    fn test_missing_fields_fall_back() {
        let html = render_widget_body(&with_data(WidgetKind::Button, json!({})));
        assert!(html.contains("Cliquez ici"));

        let html = render_widget_body(&with_data(WidgetKind::Spacer, json!({"height": "oops"})));
        assert!(html.contains("height: 40px"));
    }

    #[test]
    fn test_unknown_kind_fallback() {
        let html = render_widget_body(&widget(WidgetKind::Unknown("carousel".into())));
        assert!(html.contains("widget-unknown"));
        assert!(html.contains("carousel"));
    }

    #[test]
    fn test_form_fields() {
        let html = render_widget_body(&widget(WidgetKind::Form));
        assert_eq!(html.matches("form-field").count(), 3);
        assert!(html.contains("<textarea"));
        assert!(html.contains(r#"type="email""#));
    }

    #[test]
    fn test_price_features() {
        let html = render_widget_body(&widget(WidgetKind::Price));
        assert!(html.contains("29.99"));
        assert_eq!(html.matches("<li>").count(), 3);
    }

    #[test]
    fn test_testimonial_rating_is_clamped() {
        let html = render_widget_body(&with_data(
            WidgetKind::Testimonial,
            json!({"quote": "Top", "author": "Jean Dupont", "rating": 9}),
        ));
        assert!(html.contains("★★★★★"));
        assert!(html.contains("JD"));
    }

    #[test]
    fn test_countdown_hides_seconds() {
        let html = render_widget_body(&with_data(
            WidgetKind::Countdown,
            json!({"showSeconds": false}),
        ));
        assert!(!html.contains(r#"data-unit="seconds""#));
        assert!(html.contains(r#"data-unit="minutes""#));
    }

    #[test]
    fn test_embed_url() {
        assert_eq!(
            embed_url("https://www.youtube.com/watch?v=abc123&t=4"),
            Some("https://www.youtube.com/embed/abc123".to_string())
        );
        assert_eq!(
            embed_url("https://youtu.be/xyz"),
            Some("https://www.youtube.com/embed/xyz".to_string())
        );
        assert_eq!(
            embed_url("https://vimeo.com/76979871"),
            Some("https://player.vimeo.com/video/76979871".to_string())
        );
        assert_eq!(embed_url("https://cdn.example.com/clip.mp4"), None);
    }

    #[test]
    fn test_image_placeholder_and_link() {
        assert!(render_widget_body(&widget(WidgetKind::Image)).contains("placeholder"));
        let html = render_widget_body(&with_data(
            WidgetKind::Image,
            json!({"src": "/a.png", "link": "/promo"}),
        ));
        assert!(html.starts_with(r#"<a href="/promo">"#));
        assert!(html.contains(r#"alt="Image""#));
    }

    #[test]
    fn test_script_urls_never_reach_markup() {
        let html = render_widget_body(&with_data(
            WidgetKind::Image,
            json!({"src": "/a.png", "link": "javascript:alert(1)"}),
        ));
        assert!(!html.contains("javascript:"));
        assert!(html.starts_with("<img"));

        let html = render_widget_body(&with_data(
            WidgetKind::Image,
            json!({"src": "data:text/html;base64,PHNjcmlwdD4="}),
        ));
        assert!(html.contains("placeholder"));

        let html = render_widget_body(&with_data(
            WidgetKind::Button,
            json!({"text": "Go", "url": "JavaScript:alert(1)"}),
        ));
        assert!(html.starts_with(r##"<a href="#""##));

        let html = render_widget_body(&with_data(
            WidgetKind::Video,
            json!({"url": "javascript:alert(1)"}),
        ));
        assert!(html.contains("placeholder"));

        let html = render_widget_body(&with_data(
            WidgetKind::Testimonial,
            json!({"quote": "Top", "author": "Jean Dupont", "avatar": "vbscript:x"}),
        ));
        assert!(!html.contains("vbscript:"));
        assert!(html.contains("JD"));
    }

    #[test]
    fn test_button_keeps_mailto_and_https() {
        let html = render_widget_body(&with_data(
            WidgetKind::Button,
            json!({"text": "Écrire", "url": "mailto:contact@boutique.fr"}),
        ));
        assert!(html.contains(r#"href="mailto:contact@boutique.fr""#));

        let html = render_widget_body(&with_data(
            WidgetKind::Button,
            json!({"text": "Voir", "url": "https://boutique.fr/soldes"}),
        ));
        assert!(html.contains(r#"href="https://boutique.fr/soldes""#));
    }
}
