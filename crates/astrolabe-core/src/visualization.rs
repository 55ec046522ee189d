//! Bridge to the external chart renderer.
//!
//! The bridge never fails: any problem with the specification or the
//! renderer is logged and shown in the preview pane as an inline error.
//!
//! Each render takes a ticket. Only the newest ticket may write the pane,
//! so a slow render that finishes after a newer one is discarded instead of
//! overwriting the fresher preview.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};

use serde::Serialize;
use serde_json::Value;
use thiserror::Error;

/// Value used for `width`/`height` when the specification leaves them out.
pub const CONTAINER_SIZE: &str = "container";

#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{0}")]
pub struct RenderError(pub String);

/// The external rendering library.
pub trait ChartRenderer: Send + Sync {
    /// Render a specification, returning the markup to display.
    fn render(&self, spec: &Value) -> Result<String, RenderError>;
}

/// What the preview pane shows.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "body", rename_all = "camelCase")]
pub enum PreviewContent {
    Empty,
    Chart(String),
    Error(String),
}

/// The container the preview is drawn into.
pub trait PreviewPane: Send + Sync {
    fn show(&self, content: PreviewContent);
}

/// Outcome of a render call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RenderStatus {
    Rendered,
    Failed(String),
    /// A newer render started before this one finished.
    Superseded,
}

/// Renders by handing back the prepared specification as JSON. Useful when
/// the real renderer runs elsewhere (for example in a web view) and only
/// needs the final specification.
#[derive(Debug, Default, Clone, Copy)]
pub struct PassthroughRenderer;

impl ChartRenderer for PassthroughRenderer {
    fn render(&self, spec: &Value) -> Result<String, RenderError> {
        serde_json::to_string_pretty(spec).map_err(|e| RenderError(e.to_string()))
    }
}

/// Keeps the last content shown.
#[derive(Debug)]
pub struct MemoryPreview {
    content: Mutex<PreviewContent>,
}

impl Default for MemoryPreview {
    fn default() -> Self {
        Self {
            content: Mutex::new(PreviewContent::Empty),
        }
    }
}

impl MemoryPreview {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn content(&self) -> PreviewContent {
        self.content.lock().unwrap_or_else(|e| e.into_inner()).clone()
    }
}

impl PreviewPane for MemoryPreview {
    fn show(&self, content: PreviewContent) {
        *self.content.lock().unwrap_or_else(|e| e.into_inner()) = content;
    }
}

/// `null`, `false`, `0`, `NaN` and `""` count as unset.
fn is_falsy(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::Bool(b) => !b,
        Value::Number(n) => n.as_f64().map_or(true, |f| f == 0.0 || f.is_nan()),
        Value::String(s) => s.is_empty(),
        Value::Array(_) | Value::Object(_) => false,
    }
}

/// Copy of `spec` with `width` and `height` defaulted to `"container"`.
pub fn with_display_defaults(spec: &Value) -> Result<Value, RenderError> {
    let Value::Object(map) = spec else {
        return Err(RenderError(
            "specification must be a JSON object".to_string(),
        ));
    };

    let mut map = map.clone();
    for key in ["width", "height"] {
        if map.get(key).map_or(true, is_falsy) {
            map.insert(key.to_string(), Value::String(CONTAINER_SIZE.to_string()));
        }
    }
    Ok(Value::Object(map))
}

pub struct VisualizationBridge {
    renderer: Arc<dyn ChartRenderer>,
    pane: Arc<dyn PreviewPane>,
    issued: AtomicU64,
    shown: Mutex<u64>,
}

impl VisualizationBridge {
    pub fn new(renderer: Arc<dyn ChartRenderer>, pane: Arc<dyn PreviewPane>) -> Self {
        Self {
            renderer,
            pane,
            issued: AtomicU64::new(0),
            shown: Mutex::new(0),
        }
    }

    fn issue_ticket(&self) -> u64 {
        self.issued.fetch_add(1, Ordering::SeqCst) + 1
    }

    /// Show `content` if `ticket` is still the newest one issued.
    fn show_if_current(&self, ticket: u64, content: PreviewContent) -> bool {
        let mut shown = self.shown.lock().unwrap_or_else(|e| e.into_inner());
        if ticket != self.issued.load(Ordering::SeqCst) || ticket <= *shown {
            return false;
        }
        self.pane.show(content);
        *shown = ticket;
        true
    }

    /// Render a parsed specification.
    pub fn render(&self, spec: &Value) -> RenderStatus {
        let ticket = self.issue_ticket();
        let result = with_display_defaults(spec).and_then(|display| self.renderer.render(&display));
        self.finish(ticket, result)
    }

    /// Render raw editor text, reporting parse errors inline.
    pub fn render_text(&self, text: &str) -> RenderStatus {
        match serde_json::from_str::<Value>(text) {
            Ok(spec) => self.render(&spec),
            Err(e) => {
                let ticket = self.issue_ticket();
                self.finish(ticket, Err(RenderError(e.to_string())))
            }
        }
    }

    /// Empty the preview. Any render still in flight is superseded.
    pub fn clear(&self) {
        let ticket = self.issue_ticket();
        self.show_if_current(ticket, PreviewContent::Empty);
    }

    fn finish(&self, ticket: u64, result: Result<String, RenderError>) -> RenderStatus {
        match result {
            Ok(markup) => {
                if self.show_if_current(ticket, PreviewContent::Chart(markup)) {
                    RenderStatus::Rendered
                } else {
                    log::debug!("Discarding superseded render #{ticket}");
                    RenderStatus::Superseded
                }
            }
            Err(e) => {
                log::error!("Error rendering visualization: {e}");
                let message = format!("Error rendering visualization: {e}");
                if self.show_if_current(ticket, PreviewContent::Error(message.clone())) {
                    RenderStatus::Failed(message)
                } else {
                    RenderStatus::Superseded
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::sync::mpsc;
    use std::thread;

    struct FailingRenderer;

    impl ChartRenderer for FailingRenderer {
        fn render(&self, _spec: &Value) -> Result<String, RenderError> {
            Err(RenderError("unsupported encoding".to_string()))
        }
    }

    /// Blocks renders of specs marked `"slow": true` until released.
    struct GatedRenderer {
        gate: Mutex<mpsc::Receiver<()>>,
        started: Mutex<mpsc::Sender<()>>,
    }

    impl ChartRenderer for GatedRenderer {
        fn render(&self, spec: &Value) -> Result<String, RenderError> {
            if spec["slow"] == true {
                self.started.lock().unwrap().send(()).unwrap();
                self.gate.lock().unwrap().recv().unwrap();
            }
            Ok(spec["mark"].as_str().unwrap_or_default().to_string())
        }
    }

    fn bridge_with(renderer: Arc<dyn ChartRenderer>) -> (VisualizationBridge, Arc<MemoryPreview>) {
        let pane = Arc::new(MemoryPreview::new());
        (VisualizationBridge::new(renderer, pane.clone()), pane)
    }

    mod display_defaults {
        use super::*;

        #[test]
        fn fills_missing_and_falsy_sizes() {
            let spec = json!({"mark": "bar", "width": 0, "height": ""});
            let display = with_display_defaults(&spec).unwrap();

            assert_eq!(display["width"], CONTAINER_SIZE);
            assert_eq!(display["height"], CONTAINER_SIZE);
            assert_eq!(display["mark"], "bar");
        }

        #[test]
        fn keeps_explicit_sizes() {
            let spec = json!({"width": 300, "height": 200});
            let display = with_display_defaults(&spec).unwrap();

            assert_eq!(display["width"], 300);
            assert_eq!(display["height"], 200);
        }

        #[test]
        fn rejects_non_objects() {
            assert!(with_display_defaults(&json!([1, 2])).is_err());
        }
    }

    #[test]
    fn successful_render_shows_chart() {
        let (bridge, pane) = bridge_with(Arc::new(PassthroughRenderer));

        let status = bridge.render(&json!({"mark": "bar"}));

        assert_eq!(status, RenderStatus::Rendered);
        let PreviewContent::Chart(markup) = pane.content() else {
            panic!("expected a chart");
        };
        assert!(markup.contains("\"width\": \"container\""));
    }

    #[test]
    fn renderer_error_is_shown_inline() {
        let (bridge, pane) = bridge_with(Arc::new(FailingRenderer));

        let status = bridge.render(&json!({"mark": "bar"}));

        let expected = "Error rendering visualization: unsupported encoding".to_string();
        assert_eq!(status, RenderStatus::Failed(expected.clone()));
        assert_eq!(pane.content(), PreviewContent::Error(expected));
    }

    #[test]
    fn unparsable_text_is_shown_inline() {
        let (bridge, pane) = bridge_with(Arc::new(PassthroughRenderer));

        let status = bridge.render_text("{ nope");

        assert!(matches!(status, RenderStatus::Failed(_)));
        assert!(matches!(pane.content(), PreviewContent::Error(m) if m.starts_with("Error rendering visualization:")));
    }

    #[test]
    fn clear_empties_preview() {
        let (bridge, pane) = bridge_with(Arc::new(PassthroughRenderer));
        bridge.render(&json!({}));

        bridge.clear();

        assert_eq!(pane.content(), PreviewContent::Empty);
    }

    #[test]
    fn stale_render_never_overwrites_newer_one() {
        let (gate_tx, gate_rx) = mpsc::channel();
        let (started_tx, started_rx) = mpsc::channel();
        let renderer = Arc::new(GatedRenderer {
            gate: Mutex::new(gate_rx),
            started: Mutex::new(started_tx),
        });
        let pane = Arc::new(MemoryPreview::new());
        let bridge = Arc::new(VisualizationBridge::new(renderer, pane.clone()));

        let slow = {
            let bridge = bridge.clone();
            thread::spawn(move || bridge.render(&json!({"mark": "old", "slow": true})))
        };
        started_rx.recv().unwrap();

        let fast = bridge.render(&json!({"mark": "new"}));
        gate_tx.send(()).unwrap();
        let slow = slow.join().unwrap();

        assert_eq!(fast, RenderStatus::Rendered);
        assert_eq!(slow, RenderStatus::Superseded);
        assert_eq!(pane.content(), PreviewContent::Chart("new".to_string()));
    }
}
