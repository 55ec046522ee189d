//! Terminal stand-in for the chart renderer.
//!
//! Checks that a specification has something to draw and summarizes it in
//! one line instead of producing a chart.

use astrolabe_core::{ChartRenderer, RenderError};
use serde_json::Value;

/// Top-level keys that make a specification drawable.
const VIEW_KEYS: [&str; 7] = ["mark", "layer", "concat", "hconcat", "vconcat", "facet", "repeat"];

#[derive(Debug, Default, Clone, Copy)]
pub struct SummaryRenderer;

impl ChartRenderer for SummaryRenderer {
    fn render(&self, spec: &Value) -> Result<String, RenderError> {
        let Some(kind) = VIEW_KEYS.iter().find(|key| spec.get(**key).is_some()) else {
            return Err(RenderError(format!(
                "specification needs one of: {}",
                VIEW_KEYS.join(", ")
            )));
        };

        let mut summary = match (*kind, &spec["mark"]) {
            ("mark", Value::String(mark)) => format!("{mark} chart"),
            ("mark", Value::Object(def)) => match def.get("type").and_then(Value::as_str) {
                Some(mark) => format!("{mark} chart"),
                None => return Err(RenderError("mark definition has no type".to_string())),
            },
            ("mark", _) => return Err(RenderError("mark must be a string or object".to_string())),
            (other, _) => format!("{other} view"),
        };

        summary.push_str(&format!(" ({} x {})", size(&spec["width"]), size(&spec["height"])));

        if let Some(values) = spec.pointer("/data/values").and_then(Value::as_array) {
            summary.push_str(&format!(", {} data values", values.len()));
        } else if let Some(url) = spec.pointer("/data/url").and_then(Value::as_str) {
            summary.push_str(&format!(", data from {url}"));
        }

        Ok(summary)
    }
}

fn size(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}
