//! Built-in snippet content.

use serde_json::{json, Value};

use crate::persistence::Snippet;

pub const VEGA_LITE_SCHEMA: &str = "https://vega.github.io/schema/vega-lite/v5.json";

/// Content given to a freshly created snippet.
pub fn new_snippet_content() -> Value {
    json!({
        "$schema": VEGA_LITE_SCHEMA,
        "description": "New visualization",
        "mark": "bar"
    })
}

/// Examples written to an empty store on first launch.
pub fn default_snippets() -> Vec<Snippet> {
    vec![
        Snippet::new(
            "simple-bar",
            "Simple Bar Chart",
            json!({
                "$schema": VEGA_LITE_SCHEMA,
                "description": "A simple bar chart with embedded data.",
                "data": {
                    "values": [
                        { "category": "A", "value": 28 },
                        { "category": "B", "value": 55 },
                        { "category": "C", "value": 43 }
                    ]
                },
                "mark": "bar",
                "encoding": {
                    "x": { "field": "category", "type": "nominal" },
                    "y": { "field": "value", "type": "quantitative" }
                }
            }),
            0,
        ),
        Snippet::new(
            "scatter-plot",
            "Basic Scatter Plot",
            json!({
                "$schema": VEGA_LITE_SCHEMA,
                "description": "A scatter plot example.",
                "data": {
                    "values": [
                        { "x": 1, "y": 28 }, { "x": 2, "y": 55 }, { "x": 3, "y": 43 }
                    ]
                },
                "mark": "point",
                "encoding": {
                    "x": { "field": "x", "type": "quantitative" },
                    "y": { "field": "y", "type": "quantitative" }
                }
            }),
            0,
        ),
    ]
}
