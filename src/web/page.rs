// ============================================================
// Layer 1 - Page Rendering
// ============================================================
// Turns one render pass worth of data into the HTML page:
//
//   - a <style> block built from the StyleDirective
//     (background image, dark overlay, frosted-glass panels)
//   - two stacked background layers and, while a slideshow is
//     rotating, a small script that POSTs /background/tick every
//     interval and crossfades to the image it gets back. The page
//     itself is never reloaded, so the form keeps what was typed.
//   - the sidebar (uploader, upload feedback, model blurb)
//   - the Prediction and Model Info sections
//
// All user-controlled text goes through `escape_html`.

use std::collections::HashMap;
use std::fmt::Write as _;

use crate::application::slideshow::{SlideshowPhase, MIN_SUGGESTED_IMAGES};
use crate::domain::directive::{BackgroundSource, StyleDirective};
use crate::domain::error::{FormError, UploadRejection};
use crate::domain::features::{FeatureField, DEFAULT_FLOORS, DEFAULT_YR_BUILT, FLOOR_OPTIONS};
use crate::ml::model::LinearModel;

/// Name of the multipart field carrying background images
pub const UPLOAD_FIELD: &str = "images";

/// Form state for one render: what the user typed, and the result
#[derive(Debug, Default)]
pub struct FormView {
    pub values:  HashMap<String, String>,
    pub outcome: Option<Result<f64, FormError>>,
}

/// Everything the page needs for one render pass
pub struct PageView<'a> {
    pub directive:     &'a StyleDirective,
    pub phase:         SlideshowPhase,
    pub suggests_more: bool,
    pub interval_secs: u64,
    pub rejected:      &'a [UploadRejection],
    pub form:          &'a FormView,
    pub model:         &'a LinearModel,
}

/// Path the rotation script POSTs to on every tick
pub const TICK_PATH: &str = "/background/tick";

const ROTATION_SCRIPT: &str = "\
(function () {
  var layers = [document.getElementById('bg-a'), document.getElementById('bg-b')];
  var front = 0;
  var timer = setInterval(function () {
    fetch('{tick_path}', { method: 'POST', credentials: 'same-origin' })
      .then(function (r) { return r.ok ? r.json() : null; })
      .then(function (d) {
        if (!d) { return; }
        if (!d.rotating) { clearInterval(timer); }
        var back = layers[1 - front];
        back.style.backgroundImage = \"url('\" + d.image_url + \"')\";
        back.classList.remove('hidden');
        layers[front].classList.add('hidden');
        front = 1 - front;
      })
      .catch(function () {});
  }, {interval_ms});
})();
";

fn rotation_script(interval_secs: u64) -> String {
    ROTATION_SCRIPT
        .replace("{tick_path}", TICK_PATH)
        .replace("{interval_ms}", &interval_secs.saturating_mul(1000).to_string())
}

pub fn render_page(view: &PageView<'_>) -> String {
    let mut html = String::with_capacity(view.directive.image_url.len() + 16 * 1024);

    html.push_str("<!DOCTYPE html>\n<html lang=\"en\">\n<head>\n<meta charset=\"utf-8\">\n");
    html.push_str("<meta name=\"viewport\" content=\"width=device-width, initial-scale=1\">\n");
    html.push_str("<title>Luxury House Price Prediction</title>\n<style>\n");
    html.push_str(&background_css(view.directive));
    html.push_str(BASE_CSS);
    html.push_str("</style>\n</head>\n<body>\n");
    html.push_str("<div id=\"bg-a\" class=\"bg-layer\"></div><div id=\"bg-b\" class=\"bg-layer hidden\"></div>\n");
    html.push_str("<div class=\"layout\">\n");

    render_sidebar(&mut html, view);

    html.push_str("<main>\n");
    html.push_str("<h1 class=\"title\">LUXURY HOUSE PRICE PREDICTION</h1>\n");
    html.push_str(
        "<p class=\"subtitle\">Predict housing prices based on key architectural and locational features.</p>\n",
    );
    html.push_str(
        "<nav class=\"tabs\"><a href=\"#prediction\">Prediction</a><a href=\"#model-info\">Model Info</a></nav>\n",
    );
    render_prediction(&mut html, view.form);
    render_model_info(&mut html, view.model);
    html.push_str("</main>\n</div>\n");
    if view.phase == SlideshowPhase::Rotating {
        html.push_str("<script>\n");
        html.push_str(&rotation_script(view.interval_secs));
        html.push_str("</script>\n");
    }
    html.push_str("</body>\n</html>\n");
    html
}

/// CSS for the background layers, overlay and content panels.
/// The two layers crossfade over `transition_ms`.
pub fn background_css(d: &StyleDirective) -> String {
    let t = &d.treatment;
    format!(
        "body {{ margin: 0; min-height: 100vh; color: white; font-family: 'Inter', sans-serif; background: #000; }}\n\
         .bg-layer {{ position: fixed; top: 0; left: 0; width: 100%; height: 100%; z-index: -1; \
         background-size: cover; background-position: center; background-repeat: no-repeat; \
         transition: opacity {ms}ms ease-in-out; }}\n\
         .bg-layer.hidden {{ opacity: 0; }}\n\
         #bg-a {{ background-image: url('{url}'); }}\n\
         body::before {{ content: \"\"; position: fixed; top: 0; left: 0; width: 100%; height: 100%; \
         background: rgba(0,0,0,{overlay}); z-index: 0; }}\n\
         .panel {{ background: rgba(255,255,255,{panel}); backdrop-filter: blur({blur}px); \
         -webkit-backdrop-filter: blur({blur}px); border-radius: 16px; padding: 20px; \
         position: relative; z-index: 10; }}\n",
        url     = d.image_url,
        overlay = t.overlay_opacity,
        ms      = t.transition_ms,
        panel   = t.panel_opacity,
        blur    = t.panel_blur_px,
    )
}

const BASE_CSS: &str = "\
.layout { display: flex; gap: 24px; padding: 24px; position: relative; z-index: 1; }
aside { width: 300px; flex-shrink: 0; }
main { flex: 1; }
.title { text-align: center; color: #FFD700; text-shadow: 2px 2px 6px #000000; }
.subtitle { text-align: center; font-size: 18px; color: #F0F0F0; }
.tabs a { color: white; margin-right: 16px; }
section { margin-top: 24px; }
.grid { display: grid; grid-template-columns: 1fr 1fr; gap: 12px 24px; }
label { display: block; font-weight: 600; margin-bottom: 4px; }
input, select { width: 100%; box-sizing: border-box; padding: 6px; }
.field-error input, .field-error select { outline: 2px solid #ff6b6b; }
.notice { padding: 10px; border-radius: 8px; margin: 8px 0; }
.info { background: rgba(30, 136, 229, 0.35); }
.warning { background: rgba(255, 193, 7, 0.35); }
.error { background: rgba(229, 57, 53, 0.45); }
.prediction-box { background-color: rgba(34, 139, 34, 0.9); padding: 20px; border-radius: 15px; text-align: center; margin-top: 20px; }
.prediction-box h1 { color: #FFD700; }
.metrics { display: flex; gap: 24px; }
.metric { flex: 1; }
.metric .value { font-size: 28px; }
button { width: 100%; padding: 10px; margin-top: 12px; cursor: pointer; }
";

fn render_sidebar(html: &mut String, view: &PageView<'_>) {
    html.push_str("<aside class=\"panel\">\n<h2>App Configuration</h2>\n<h3>Background Images</h3>\n");
    let _ = write!(
        html,
        "<form method=\"post\" action=\"/background\" enctype=\"multipart/form-data\">\n\
         <label for=\"{field}\">Upload images (JPG/PNG) for the slideshow:</label>\n\
         <input id=\"{field}\" type=\"file\" name=\"{field}\" accept=\".jpg,.jpeg,.png,image/png,image/jpeg\" multiple>\n\
         <button type=\"submit\">Start slideshow</button>\n</form>\n\
         <form method=\"post\" action=\"/background/clear\"><button type=\"submit\">Clear background</button></form>\n",
        field = UPLOAD_FIELD,
    );

    match view.phase {
        SlideshowPhase::Empty => notice(
            html,
            "warning",
            "No images uploaded. Using static dark background image.",
        ),
        _ if view.suggests_more => notice(
            html,
            "info",
            &format!("Upload at least {MIN_SUGGESTED_IMAGES} images for a better slideshow effect."),
        ),
        _ => notice(
            html,
            "info",
            &format!(
                "Showing image {} of {}, changing every {}s.",
                view.directive.slide_index().map_or(0, |i| i + 1),
                slide_total(view.directive),
                view.interval_secs
            ),
        ),
    }

    if !view.rejected.is_empty() {
        html.push_str("<div class=\"notice error\"><strong>Skipped files</strong><ul>\n");
        for r in view.rejected {
            let _ = writeln!(
                html,
                "<li>{}: {}</li>",
                escape_html(&r.file_name),
                escape_html(&r.reason.to_string())
            );
        }
        html.push_str("</ul></div>\n");
    }

    html.push_str(
        "<hr>\n<h3>Model Info</h3>\n\
         <div class=\"notice info\">This app predicts house prices using a trained Linear Regression Model.</div>\n\
         </aside>\n",
    );
}

fn render_prediction(html: &mut String, form: &FormView) {
    let bad_fields = match &form.outcome {
        Some(Err(e)) => e.fields(),
        _            => Vec::new(),
    };
    let value = |field: FeatureField, default: &str| -> String {
        escape_html(form.values.get(field.name()).map(String::as_str).unwrap_or(default))
    };
    let class = |field: FeatureField| {
        if bad_fields.contains(&field) { "field field-error" } else { "field" }
    };

    html.push_str("<section id=\"prediction\" class=\"panel\">\n<h2>Enter Property Features</h2>\n");
    html.push_str("<form method=\"post\" action=\"/predict\">\n<div class=\"grid\">\n");

    number_input(html, FeatureField::SqftLiving, class(FeatureField::SqftLiving), &value(FeatureField::SqftLiving, "2000"), "300", "15000", "10");
    number_input(html, FeatureField::Bedrooms, class(FeatureField::Bedrooms), &value(FeatureField::Bedrooms, "3"), "0", "15", "1");
    number_input(html, FeatureField::Bathrooms, class(FeatureField::Bathrooms), &value(FeatureField::Bathrooms, "2.0"), "0", "10", "0.25");

    // Floors selector
    let floors = value(FeatureField::Floors, &format!("{DEFAULT_FLOORS:.1}"));
    let _ = write!(
        html,
        "<div class=\"{}\"><label for=\"floors\">{}</label><select id=\"floors\" name=\"floors\">",
        class(FeatureField::Floors),
        FeatureField::Floors.label()
    );
    for option in FLOOR_OPTIONS {
        let selected = floors.parse::<f64>().ok() == Some(option);
        let _ = write!(
            html,
            "<option value=\"{option:.1}\"{}>{option:.1}</option>",
            if selected { " selected" } else { "" }
        );
    }
    html.push_str("</select></div>\n");

    // Grade slider
    let grade = value(FeatureField::Grade, "7");
    let _ = write!(
        html,
        "<div class=\"{}\"><label for=\"grade\">{}: <output id=\"grade-out\">{grade}</output></label>\
         <input id=\"grade\" type=\"range\" name=\"grade\" min=\"1\" max=\"13\" step=\"1\" value=\"{grade}\" \
         oninput=\"document.getElementById('grade-out').value = this.value\"></div>\n",
        class(FeatureField::Grade),
        FeatureField::Grade.label(),
    );

    // Waterfront toggle
    let waterfront = value(FeatureField::Waterfront, "0");
    let is_yes = matches!(waterfront.to_ascii_lowercase().as_str(), "1" | "yes" | "true");
    let _ = write!(
        html,
        "<div class=\"{}\"><label for=\"waterfront\">{}</label><select id=\"waterfront\" name=\"waterfront\">\
         <option value=\"0\"{}>No</option><option value=\"1\"{}>Yes</option></select></div>\n",
        class(FeatureField::Waterfront),
        FeatureField::Waterfront.label(),
        if is_yes { "" } else { " selected" },
        if is_yes { " selected" } else { "" },
    );

    number_input(html, FeatureField::YrBuilt, class(FeatureField::YrBuilt), &value(FeatureField::YrBuilt, &DEFAULT_YR_BUILT.to_string()), "1900", "2024", "1");

    html.push_str("</div>\n<button type=\"submit\">Predict Price</button>\n</form>\n");

    match &form.outcome {
        Some(Ok(price)) => {
            let _ = write!(
                html,
                "<div class=\"prediction-box\"><h2>Estimated Price</h2><h1>{}</h1>\
                 <p>Based on the details you provided.</p></div>\n",
                format_price(*price)
            );
        }
        Some(Err(FormError::Incomplete(e))) => {
            let labels: Vec<&str> = e.missing.iter().map(|f| f.label()).collect();
            notice(html, "error", &format!("Please fill in: {}", labels.join(", ")));
        }
        Some(Err(FormError::Invalid(errors))) => {
            html.push_str("<div class=\"notice error\"><strong>Please correct:</strong><ul>\n");
            for e in errors {
                let _ = writeln!(
                    html,
                    "<li>{}: '{}' is not {}</li>",
                    e.field.label(),
                    escape_html(&e.value),
                    escape_html(&e.expected)
                );
            }
            html.push_str("</ul></div>\n");
        }
        None => {}
    }

    html.push_str("</section>\n");
}

fn number_input(
    html:  &mut String,
    field: FeatureField,
    class: &str,
    value: &str,
    min:   &str,
    max:   &str,
    step:  &str,
) {
    let _ = writeln!(
        html,
        "<div class=\"{class}\"><label for=\"{name}\">{label}</label>\
         <input id=\"{name}\" type=\"number\" name=\"{name}\" min=\"{min}\" max=\"{max}\" step=\"{step}\" value=\"{value}\"></div>",
        name  = field.name(),
        label = field.label(),
    );
}

fn render_model_info(html: &mut String, model: &LinearModel) {
    html.push_str(
        "<section id=\"model-info\" class=\"panel\">\n<h2>Model Overview &amp; Performance</h2>\n\
         <h3>Model Used</h3>\n<div class=\"notice info\"><strong>Linear Regression</strong> \
         was used for this prediction task.</div>\n<h3>Training Features</h3>\n<ul>\n",
    );
    for (field, coef) in model.terms() {
        let _ = writeln!(html, "<li><code>{}</code>: coefficient {:.4}</li>", field.name(), coef);
    }
    let _ = writeln!(html, "<li>intercept: {:.4}</li>\n</ul>", model.intercept());

    if let Some(m) = model.metrics() {
        let note = if m.scaled { "Scaled" } else { "" };
        let _ = write!(
            html,
            "<h3>Performance Metrics</h3>\n<div class=\"metrics\">\
             <div class=\"metric\"><div>R²</div><div class=\"value\">{:.4}</div><div>Good Fit</div></div>\
             <div class=\"metric\"><div>RMSE</div><div class=\"value\">{:.4}</div><div>{note}</div></div>\
             <div class=\"metric\"><div>MSE</div><div class=\"value\">{:.4}</div><div>{note}</div></div>\
             </div>\n",
            m.r2, m.rmse, m.mse,
        );
    }
    html.push_str("</section>\n");
}

fn slide_total(d: &StyleDirective) -> usize {
    match d.source {
        BackgroundSource::Slide { total, .. } => total,
        BackgroundSource::Fallback            => 0,
    }
}

fn notice(html: &mut String, kind: &str, message: &str) {
    let _ = writeln!(html, "<div class=\"notice {kind}\">{}</div>", escape_html(message));
}

/// `$1,234,567.89`, with a leading minus for negative amounts.
pub fn format_price(price: f64) -> String {
    if !price.is_finite() {
        return format!("${price}");
    }

    let cents = (price.abs() * 100.0).round() as u128;
    let whole = (cents / 100).to_string();
    let frac  = cents % 100;

    let mut grouped = String::with_capacity(whole.len() + whole.len() / 3);
    for (i, ch) in whole.chars().enumerate() {
        if i > 0 && (whole.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }

    let sign = if price < 0.0 && cents > 0 { "-" } else { "" };
    format!("{sign}${grouped}.{frac:02}")
}

pub fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&'  => out.push_str("&amp;"),
            '<'  => out.push_str("&lt;"),
            '>'  => out.push_str("&gt;"),
            '"'  => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            c    => out.push(c),
        }
    }
    out
}
