//! Pane layout persistence.
//!
//! The three panes (snippet list, editor, preview) share the window width.
//! Dragging the handle between two neighbouring panes moves width from one
//! to the other; the result is stored so it survives restarts.

use serde_json::Value;

use super::kv::{KeyValueStore, StorageError};
use super::types::PanelLayout;

/// Storage key holding the layout.
pub const LAYOUT_KEY: &str = "panelLayout";

/// Smallest fraction a pane may shrink to.
pub const MIN_PANE_FRACTION: f64 = 0.05;

impl PanelLayout {
    fn widths(&self) -> [f64; 3] {
        [self.snippet_width, self.editor_width, self.preview_width]
    }

    fn from_widths(widths: [f64; 3]) -> Self {
        Self {
            snippet_width: widths[0],
            editor_width: widths[1],
            preview_width: widths[2],
        }
    }

    /// Scale the fractions so they sum to 1. Falls back to the default
    /// layout if any width is non-finite or not positive.
    pub fn normalized(self) -> Self {
        let widths = self.widths();
        if widths.iter().any(|w| !w.is_finite() || *w <= 0.0) {
            return Self::default();
        }
        let total: f64 = widths.iter().sum();
        Self::from_widths(widths.map(|w| w / total))
    }

    /// Move the boundary `handle` (0: list/editor, 1: editor/preview) by
    /// `dx` as a fraction of the container width. Each pane keeps at least
    /// [`MIN_PANE_FRACTION`]. Unknown handles leave the layout unchanged.
    pub fn resize(self, handle: usize, dx: f64) -> Self {
        if handle > 1 || !dx.is_finite() {
            return self;
        }

        let mut widths = self.normalized().widths();
        let (left, right) = (widths[handle], widths[handle + 1]);
        let pair = left + right;
        if pair <= 2.0 * MIN_PANE_FRACTION {
            return Self::from_widths(widths);
        }
        let new_left = (left + dx).clamp(MIN_PANE_FRACTION, pair - MIN_PANE_FRACTION);

        widths[handle] = new_left;
        widths[handle + 1] = pair - new_left;
        Self::from_widths(widths)
    }
}

/// Save the layout.
pub fn save_layout(store: &dyn KeyValueStore, layout: &PanelLayout) -> Result<(), StorageError> {
    let json = serde_json::to_string(&layout.normalized())?;
    store.set(LAYOUT_KEY, &json)
}

/// Load the layout, returning the default if nothing usable is stored.
///
/// Accepts plain numbers as well as CSS-style `"0.25fr"` strings.
pub fn load_layout(store: &dyn KeyValueStore) -> Result<PanelLayout, StorageError> {
    let Some(contents) = store.get(LAYOUT_KEY)? else {
        return Ok(PanelLayout::default());
    };

    let value: Value = serde_json::from_str(&contents)?;
    let field = |name: &str| value.get(name).and_then(parse_fraction);

    match (
        field("snippetWidth"),
        field("editorWidth"),
        field("previewWidth"),
    ) {
        (Some(snippet_width), Some(editor_width), Some(preview_width)) => Ok(PanelLayout {
            snippet_width,
            editor_width,
            preview_width,
        }
        .normalized()),
        _ => {
            log::warn!("Ignoring incomplete panel layout: {contents}");
            Ok(PanelLayout::default())
        }
    }
}

fn parse_fraction(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().trim_end_matches("fr").trim().parse().ok(),
        _ => None,
    }
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::persistence::kv::MemoryStore;

    fn assert_close(a: f64, b: f64) {
        assert!((a - b).abs() < 1e-9, "{a} != {b}");
    }

    #[test]
    fn load_missing_returns_default() {
        let store = MemoryStore::new();
        assert_eq!(load_layout(&store).unwrap(), PanelLayout::default());
    }

    #[test]
    fn save_and_load() {
        let store = MemoryStore::new();
        let layout = PanelLayout {
            snippet_width: 0.25,
            editor_width: 0.25,
            preview_width: 0.5,
        };

        save_layout(&store, &layout).unwrap();

        assert_eq!(load_layout(&store).unwrap(), layout);
    }

    #[test]
    fn load_accepts_fr_strings_and_normalizes() {
        let store = MemoryStore::new();
        store
            .set(
                LAYOUT_KEY,
                r#"{"snippetWidth": "1fr", "editorWidth": "2fr", "previewWidth": "1fr"}"#,
            )
            .unwrap();

        let layout = load_layout(&store).unwrap();

        assert_close(layout.snippet_width, 0.25);
        assert_close(layout.editor_width, 0.5);
        assert_close(layout.preview_width, 0.25);
    }

    #[test]
    fn load_incomplete_layout_returns_default() {
        let store = MemoryStore::new();
        store.set(LAYOUT_KEY, r#"{"snippetWidth": 0.3}"#).unwrap();

        assert_eq!(load_layout(&store).unwrap(), PanelLayout::default());
    }

    #[test]
    fn normalized_rejects_non_positive_widths() {
        let layout = PanelLayout {
            snippet_width: 0.0,
            editor_width: 0.5,
            preview_width: 0.5,
        };
        assert_eq!(layout.normalized(), PanelLayout::default());
    }

    #[test]
    fn resize_first_handle_moves_width_between_list_and_editor() {
        let layout = PanelLayout::default().resize(0, 0.1);

        assert_close(layout.snippet_width, 0.3);
        assert_close(layout.editor_width, 0.3);
        assert_close(layout.preview_width, 0.4);
    }

    #[test]
    fn resize_second_handle_moves_width_between_editor_and_preview() {
        let layout = PanelLayout::default().resize(1, -0.1);

        assert_close(layout.snippet_width, 0.2);
        assert_close(layout.editor_width, 0.3);
        assert_close(layout.preview_width, 0.5);
    }

    #[test]
    fn resize_clamps_to_minimum() {
        let layout = PanelLayout::default().resize(0, -1.0);

        assert_close(layout.snippet_width, MIN_PANE_FRACTION);
        assert_close(layout.editor_width, 0.6 - MIN_PANE_FRACTION);
    }

    #[test]
    fn resize_unknown_handle_is_ignored() {
        let layout = PanelLayout::default();
        assert_eq!(layout.resize(2, 0.1), layout);
    }
}
