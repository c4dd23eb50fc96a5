//! Browser platform helpers

use super::{AnchorSource, ScreenRect};

/// Element boxes read from the live DOM
///
/// A key names an element id, falling back to the first element with that
/// class.
#[derive(Debug, Default, Clone, Copy)]
pub struct DomAnchors;

impl AnchorSource for DomAnchors {
    fn element_rect(&self, element_id: &str) -> Option<ScreenRect> {
        let document = web_sys::window()?.document()?;
        let element = document.get_element_by_id(element_id).or_else(|| {
            document
                .query_selector(&format!(".{}", element_id))
                .ok()
                .flatten()
        })?;
        let rect = element.get_bounding_client_rect();
        Some(ScreenRect::new(
            rect.left() as f32,
            rect.top() as f32,
            rect.width() as f32,
            rect.height() as f32,
        ))
    }
}

/// Whether the system asks for reduced motion
pub fn prefers_reduced_motion() -> bool {
    web_sys::window()
        .and_then(|w| w.match_media("(prefers-reduced-motion: reduce)").ok())
        .flatten()
        .is_some_and(|mq| mq.matches())
}
