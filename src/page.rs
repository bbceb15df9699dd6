//! Page composer: one self-contained HTML document with the controls, the chart and the
//! filter script.

use color_eyre::Result;
use serde::Serialize;
use std::fmt::Write;

use crate::chart::{PlotFrame, ScatterSvg};
use crate::controls::{ControlSet, Select, Slider};
use crate::dataset::BoundDataset;
use crate::record_store::StoreError;

const FILTER_SCRIPT: &str = include_str!("assets/filter.js");

const STYLE: &str = "\
body { font-family: sans-serif; margin: 1.5em; color: #222; }
.layout { display: flex; gap: 2em; align-items: flex-start; }
.controls { width: 16em; display: flex; flex-direction: column; gap: 1em; }
.controls label { display: block; font-size: 0.9em; margin-bottom: 0.3em; }
.controls input, .controls select { width: 100%; }
.notice { background: #fdecea; border: 1px solid #f5c2c0; padding: 0.6em 0.8em; }
.count { font-size: 0.8em; color: #666; }";

/// Data handed to the page script. Everything the browser needs to filter and redraw.
#[derive(Serialize)]
struct PagePayload<'a> {
    data: &'a BoundDataset,
    controls: &'a ControlSet,
    frame: &'a PlotFrame,
}

/// Banner text shown when the page was rendered without data.
pub fn user_message(err: &StoreError) -> String {
    match err {
        StoreError::Remote { message, .. } => {
            format!("The record store rejected the request: {}", message)
        }
        StoreError::Transport(message) => {
            format!("Could not reach the record store: {}", message)
        }
    }
}

/// Escape text for HTML element content and attribute values.
pub fn escape_html(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            c => out.push(c),
        }
    }
    out
}

/// Serialize to JSON that is safe inside a `<script>` element.
///
/// `<`, `>` and `&` only occur inside JSON strings, where the `\u` escapes decode to the same text.
fn script_json<T: Serialize>(value: &T) -> Result<String> {
    let json = serde_json::to_string(value)?;
    Ok(json
        .replace('<', "\\u003c")
        .replace('>', "\\u003e")
        .replace('&', "\\u0026"))
}

fn write_slider(out: &mut String, id: &str, slider: &Slider) {
    let _ = write!(
        out,
        "<div class=\"control\"><label for=\"{id}\">{title}: <output id=\"{id}-value\">{value}</output></label>\
         <input type=\"range\" id=\"{id}\" name=\"{id}\" min=\"{min}\" max=\"{max}\" step=\"{step}\" value=\"{value}\"></div>\n",
        id = id,
        title = escape_html(slider.title),
        value = slider.value,
        min = slider.start,
        max = slider.end,
        step = slider.step,
    );
}

fn write_select(out: &mut String, id: &str, select: &Select) {
    let _ = write!(
        out,
        "<div class=\"control\"><label for=\"{id}\">{}</label><select id=\"{id}\" name=\"{id}\">",
        escape_html(select.title),
    );
    for option in &select.options {
        let selected = if *option == select.value {
            " selected"
        } else {
            ""
        };
        let option = escape_html(option);
        let _ = write!(out, "<option value=\"{option}\"{selected}>{option}</option>");
    }
    out.push_str("</select></div>\n");
}

/// Compose the full page.
///
/// `dataset` is embedded unfiltered and drawn as-is on load; the controls only take
/// effect once the user changes one.
pub fn compose_page(
    dataset: &BoundDataset,
    controls: &ControlSet,
    chart: &ScatterSvg,
    notice: Option<&str>,
) -> Result<String> {
    let payload = script_json(&PagePayload {
        data: dataset,
        controls,
        frame: &chart.frame,
    })?;

    let mut html = String::with_capacity(chart.svg.len() + payload.len() + FILTER_SCRIPT.len() + 4096);
    html.push_str("<!DOCTYPE html>\n<html lang=\"en\">\n<head>\n<meta charset=\"utf-8\">\n");
    html.push_str("<title>IMDB vs. Rotten Tomatoes</title>\n");
    let _ = writeln!(html, "<style>\n{STYLE}\n</style>");
    html.push_str("</head>\n<body>\n<div class=\"layout\">\n<div class=\"controls\" id=\"controls\">\n");

    if let Some(notice) = notice {
        let _ = writeln!(
            html,
            "<div class=\"notice\" role=\"alert\">{}</div>",
            escape_html(notice)
        );
    }
    write_slider(&mut html, "reviews", &controls.reviews);
    write_slider(&mut html, "min_year", &controls.min_year);
    write_slider(&mut html, "max_year", &controls.max_year);
    write_select(&mut html, "genre", &controls.genre);
    let _ = writeln!(
        html,
        "<div class=\"count\"><span id=\"visible-count\">{}</span> movies shown</div>",
        dataset.len()
    );

    html.push_str("</div>\n<div class=\"chart\" id=\"chart\">\n");
    html.push_str(&chart.svg);
    html.push_str("\n</div>\n</div>\n");

    let _ = writeln!(
        html,
        "<script id=\"moviescope-data\" type=\"application/json\">{payload}</script>"
    );
    let _ = writeln!(html, "<script>\n{FILTER_SCRIPT}</script>");
    html.push_str("</body>\n</html>\n");
    Ok(html)
}
