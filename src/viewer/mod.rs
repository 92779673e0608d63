//! Viewer state machine.
//!
//! [`ViewerStateMachine`] owns the [`ViewerState`] of the open document and is
//! the only place it changes. Each command returns a [`Transition`]: what the
//! renderer must do and how the outline highlight moves. Commands that change
//! nothing return an empty transition; invalid commands return an error and
//! leave the state untouched.

mod render;
mod state;

pub use render::{prerender_all, PrerenderReport};
pub use state::{
    DocumentToken, Presentation, ViewMode, ViewerState, ZoomRange, ZoomStep, FLOW_ZOOM,
    PAGINATED_ZOOM,
};

use crate::error::{Error, Result};
use crate::model::{DocumentKind, Outline, PositionRef};
use crate::sync::{BlockGeometry, HighlightUpdate, Viewport, ViewportSync};
use std::time::Instant;

/// A document about to be shown.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OpenDocument {
    Markup,
    Paginated { total_pages: u32 },
    Flow,
}

impl OpenDocument {
    /// Kind of the document.
    pub fn kind(&self) -> DocumentKind {
        match self {
            OpenDocument::Markup => DocumentKind::Markup,
            OpenDocument::Paginated { .. } => DocumentKind::Paginated,
            OpenDocument::Flow => DocumentKind::Flow,
        }
    }
}

/// Work for the external renderer.
#[derive(Debug, Clone, PartialEq)]
pub enum RenderRequest {
    /// Render one page (paged mode)
    Page { page: u32, zoom: f32 },
    /// Scroll the continuous view to a page
    ScrollToPage { page: u32 },
    /// Rebuild the whole view, keeping the current page in view
    Rebuild { mode: ViewMode, page: u32, zoom: f32 },
    /// Scroll to an element of a markup or flow document
    ScrollToElement { id: String },
    /// Apply a new scale to a flow document
    ApplyScale { zoom: f32 },
}

/// Effects of one state change.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Transition {
    /// Renderer work, if any
    pub render: Option<RenderRequest>,
    /// Outline highlight refresh, if any
    pub highlight: Option<HighlightUpdate>,
}

impl Transition {
    /// A transition with no effects.
    pub fn none() -> Self {
        Self::default()
    }

    /// Check if the transition has no effects.
    pub fn is_empty(&self) -> bool {
        self.render.is_none() && self.highlight.is_none()
    }
}

fn page_request(mode: ViewMode, page: u32, zoom: f32) -> RenderRequest {
    match mode {
        ViewMode::Paged => RenderRequest::Page { page, zoom },
        ViewMode::Continuous => RenderRequest::ScrollToPage { page },
    }
}

/// Owns the viewer state and its transitions.
#[derive(Debug, Clone)]
pub struct ViewerStateMachine {
    state: ViewerState,
    sync: ViewportSync,
    default_mode: ViewMode,
    next_token: u64,
}

impl Default for ViewerStateMachine {
    fn default() -> Self {
        Self::new()
    }
}

impl ViewerStateMachine {
    /// Create a state machine with nothing open.
    pub fn new() -> Self {
        Self {
            state: ViewerState::default(),
            sync: ViewportSync::default(),
            default_mode: ViewMode::default(),
            next_token: 1,
        }
    }

    /// Set the view mode paginated documents open in.
    pub fn with_default_mode(mut self, mode: ViewMode) -> Self {
        self.default_mode = mode;
        self
    }

    /// Use a custom viewport sync.
    pub fn with_sync(mut self, sync: ViewportSync) -> Self {
        self.sync = sync;
        self
    }

    /// Current state.
    pub fn state(&self) -> &ViewerState {
        &self.state
    }

    /// Check whether `token` belongs to the open document.
    pub fn is_current(&self, token: DocumentToken) -> bool {
        token.0 != 0 && token == self.state.token
    }

    /// Show a new document, discarding everything about the previous one.
    pub fn open(&mut self, path: impl Into<String>, document: OpenDocument) -> DocumentToken {
        let token = DocumentToken(self.next_token);
        self.next_token += 1;

        let presentation = match document {
            OpenDocument::Markup => Presentation::Markup { position: 0 },
            OpenDocument::Paginated { total_pages } => Presentation::Paginated {
                mode: self.default_mode,
                page: 1,
                total: total_pages.max(1),
                zoom: PAGINATED_ZOOM.default,
            },
            OpenDocument::Flow => Presentation::Flow {
                position: 0,
                zoom: FLOW_ZOOM.default,
            },
        };

        let path = path.into();
        log::debug!("Opening {} document {}", document.kind(), path);
        self.state = ViewerState {
            token,
            active_leaf_path: Some(path),
            presentation,
            outline: None,
            highlighted_node_id: None,
        };
        self.sync.reset();
        token
    }

    /// Close the open document. Pending results for it become stale.
    pub fn close(&mut self) {
        self.state = ViewerState::default();
        self.sync.reset();
    }

    /// Deliver the outline of a document.
    ///
    /// Returns `None` when `token` is stale, otherwise the initial highlight.
    pub fn set_outline(
        &mut self,
        token: DocumentToken,
        outline: Option<Outline>,
    ) -> Option<HighlightUpdate> {
        if !self.is_current(token) {
            log::debug!("Dropping outline for stale document {:?}", token);
            return None;
        }
        self.state.outline = outline;
        self.state.highlighted_node_id = None;
        Some(self.refresh_highlight())
    }

    fn refresh_highlight(&mut self) -> HighlightUpdate {
        let update = self.sync.refresh(
            self.state.outline.as_ref(),
            self.state.current_position(),
            self.state.highlighted_node_id.as_deref(),
        );
        self.state.highlighted_node_id = update.highlighted.clone();
        update
    }

    fn paginated(&self, operation: &str) -> Result<(ViewMode, u32, u32, f32)> {
        match self.state.presentation {
            Presentation::Paginated {
                mode,
                page,
                total,
                zoom,
            } => Ok((mode, page, total, zoom)),
            ref other => Err(Error::Unsupported(format!(
                "{} is not available for {}",
                operation,
                other.kind().map_or("an empty viewer", |k| k.label())
            ))),
        }
    }

    fn set_page(&mut self, new_page: u32) {
        if let Presentation::Paginated { ref mut page, .. } = self.state.presentation {
            *page = new_page;
        }
    }

    /// Move by `delta` pages. Moving past the first or last page does nothing.
    pub fn navigate(&mut self, delta: i32) -> Result<Transition> {
        let (mode, page, total, zoom) = self.paginated("paging")?;
        let target = (i64::from(page) + i64::from(delta)).clamp(1, i64::from(total)) as u32;
        if target == page {
            return Ok(Transition::none());
        }
        self.set_page(target);
        Ok(Transition {
            render: Some(page_request(mode, target, zoom)),
            highlight: Some(self.refresh_highlight()),
        })
    }

    /// Go to page `page` (1-indexed).
    ///
    /// Jumping to the current page still re-renders it and refreshes the
    /// highlight.
    pub fn jump_to(&mut self, page: u32) -> Result<Transition> {
        let (mode, _, total, zoom) = self.paginated("page jumps")?;
        if page < 1 || page > total {
            return Err(Error::OutOfRange(page, total));
        }
        self.set_page(page);
        Ok(Transition {
            render: Some(page_request(mode, page, zoom)),
            highlight: Some(self.refresh_highlight()),
        })
    }

    /// Set the zoom, clamped into the range of the open kind.
    pub fn set_zoom(&mut self, zoom: f32) -> Result<Transition> {
        let range = self.state.presentation.zoom_range().ok_or_else(|| {
            Error::Unsupported(format!(
                "zoom is not available for {}",
                self.state
                    .presentation
                    .kind()
                    .map_or("an empty viewer", |k| k.label())
            ))
        })?;
        let current = self.state.zoom_scale().unwrap_or(range.default);
        if !zoom.is_finite() {
            return Ok(Transition::none());
        }
        let zoom = range.clamp(zoom);
        if (zoom - current).abs() < f32::EPSILON {
            return Ok(Transition::none());
        }

        let render = match self.state.presentation {
            Presentation::Paginated {
                mode,
                page,
                zoom: ref mut z,
                ..
            } => {
                *z = zoom;
                RenderRequest::Rebuild { mode, page, zoom }
            }
            Presentation::Flow { zoom: ref mut z, .. } => {
                *z = zoom;
                RenderRequest::ApplyScale { zoom }
            }
            Presentation::Markup { .. } | Presentation::Empty => return Ok(Transition::none()),
        };
        log::debug!("Zoom set to {:.3}", zoom);
        Ok(Transition {
            render: Some(render),
            highlight: Some(self.refresh_highlight()),
        })
    }

    /// Zoom in by one step.
    pub fn zoom_in(&mut self) -> Result<Transition> {
        self.step_zoom(ZoomRange::step_up)
    }

    /// Zoom out by one step.
    pub fn zoom_out(&mut self) -> Result<Transition> {
        self.step_zoom(ZoomRange::step_down)
    }

    fn step_zoom(&mut self, step: fn(&ZoomRange, f32) -> f32) -> Result<Transition> {
        match (self.state.presentation.zoom_range(), self.state.zoom_scale()) {
            (Some(range), Some(current)) => self.set_zoom(step(range, current)),
            // Let set_zoom report the unsupported kind
            _ => self.set_zoom(1.0),
        }
    }

    /// Fit content of `intrinsic_width` (at zoom 1.0) to the container.
    pub fn fit_to_width(&mut self, container_width: f32, intrinsic_width: f32) -> Result<Transition> {
        let range = self
            .state
            .presentation
            .zoom_range()
            .ok_or_else(|| Error::Unsupported("fit to width needs a zoomable document".into()))?;
        if !(intrinsic_width > 0.0) {
            return Err(Error::Render(format!(
                "intrinsic width must be positive, got {}",
                intrinsic_width
            )));
        }
        self.set_zoom(range.fit(container_width, intrinsic_width))
    }

    /// Switch between paged and continuous layout, staying on the same page.
    pub fn switch_mode(&mut self, mode: ViewMode) -> Result<Transition> {
        let (current, page, _, zoom) = self.paginated("view modes")?;
        if current == mode {
            return Ok(Transition::none());
        }
        if let Presentation::Paginated { mode: ref mut m, .. } = self.state.presentation {
            *m = mode;
        }
        log::debug!("Switched to {:?} mode at page {}", mode, page);
        Ok(Transition {
            render: Some(RenderRequest::Rebuild { mode, page, zoom }),
            highlight: Some(self.refresh_highlight()),
        })
    }

    /// Jump to an outline node and highlight it.
    pub fn select_outline_node(&mut self, id: &str) -> Result<Transition> {
        let position = self
            .state
            .outline
            .as_ref()
            .and_then(|outline| outline.find(id))
            .map(|node| node.position.clone())
            .ok_or_else(|| Error::UnknownOutlineNode(id.to_string()))?;

        let render = match (&mut self.state.presentation, position) {
            (
                Presentation::Paginated {
                    mode,
                    page,
                    total,
                    zoom,
                },
                PositionRef::Page { page: target },
            ) => {
                *page = target.clamp(1, *total);
                page_request(*mode, *page, *zoom)
            }
            (
                Presentation::Markup { position } | Presentation::Flow { position, .. },
                PositionRef::Element { id, order },
            ) => {
                *position = u64::from(order);
                RenderRequest::ScrollToElement { id }
            }
            _ => {
                return Err(Error::Unsupported(format!(
                    "outline node '{}' does not match the open document",
                    id
                )))
            }
        };

        let highlight = match self.state.outline.as_ref() {
            Some(outline) => {
                HighlightUpdate::for_node(outline, id, self.state.highlighted_node_id.as_deref())
            }
            None => HighlightUpdate::cleared(self.state.highlighted_node_id.as_deref()),
        };
        self.state.highlighted_node_id = highlight.highlighted.clone();
        Ok(Transition {
            render: Some(render),
            highlight: Some(highlight),
        })
    }

    /// Apply a scroll-derived position ordinal.
    ///
    /// Returns `None` for stale tokens and for paged mode, where scrolling
    /// does not change the page.
    pub fn apply_scroll(&mut self, token: DocumentToken, ordinal: u64) -> Option<Transition> {
        if !self.is_current(token) {
            return None;
        }
        match self.state.presentation {
            Presentation::Paginated {
                mode: ViewMode::Continuous,
                ref mut page,
                total,
                ..
            } => {
                *page = ordinal.clamp(1, u64::from(total)) as u32;
            }
            Presentation::Markup { ref mut position } | Presentation::Flow { ref mut position, .. } => {
                *position = ordinal;
            }
            _ => return None,
        }
        Some(Transition {
            render: None,
            highlight: Some(self.refresh_highlight()),
        })
    }

    /// Feed a raw scroll sample through the throttle.
    pub fn on_scroll(
        &mut self,
        token: DocumentToken,
        now: Instant,
        blocks: &[BlockGeometry],
        viewport: Viewport,
    ) -> Option<Transition> {
        if !self.is_current(token) {
            return None;
        }
        let ordinal = self.sync.sample(now, blocks, viewport)?;
        self.apply_scroll(token, ordinal)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::OutlineNode;

    #[test]
    fn test_open_defaults() {
        let mut viewer = ViewerStateMachine::new();
        viewer.open("a.pdf", OpenDocument::Paginated { total_pages: 3 });
        let state = viewer.state();
        assert_eq!(state.current_page(), Some(1));
        assert_eq!(state.view_mode(), Some(ViewMode::Continuous));
        assert_eq!(state.zoom_scale(), Some(1.5));
        assert_eq!(state.active_leaf_path(), Some("a.pdf"));
    }

    #[test]
    fn test_markup_rejects_paging() {
        let mut viewer = ViewerStateMachine::new();
        viewer.open("a.md", OpenDocument::Markup);
        assert!(matches!(viewer.navigate(1), Err(Error::Unsupported(_))));
        assert!(matches!(viewer.set_zoom(2.0), Err(Error::Unsupported(_))));
        assert!(matches!(viewer.zoom_in(), Err(Error::Unsupported(_))));
    }

    #[test]
    fn test_empty_viewer_rejects_commands() {
        let mut viewer = ViewerStateMachine::new();
        assert!(matches!(viewer.jump_to(1), Err(Error::Unsupported(_))));
        assert!(!viewer.is_current(viewer.state().token()));
    }

    #[test]
    fn test_jump_to_current_page_rerenders() {
        let mut viewer = ViewerStateMachine::new().with_default_mode(ViewMode::Paged);
        viewer.open("a.pdf", OpenDocument::Paginated { total_pages: 5 });
        let t = viewer.jump_to(1).unwrap();
        assert_eq!(t.render, Some(RenderRequest::Page { page: 1, zoom: 1.5 }));
        assert!(t.highlight.is_some());
        assert_eq!(viewer.state().current_page(), Some(1));
    }

    #[test]
    fn test_switch_mode() {
        let mut viewer = ViewerStateMachine::new();
        viewer.open("a.pdf", OpenDocument::Paginated { total_pages: 10 });
        viewer.jump_to(4).unwrap();
        assert!(viewer.switch_mode(ViewMode::Continuous).unwrap().is_empty());
        let t = viewer.switch_mode(ViewMode::Paged).unwrap();
        assert_eq!(
            t.render,
            Some(RenderRequest::Rebuild {
                mode: ViewMode::Paged,
                page: 4,
                zoom: 1.5
            })
        );
        assert!(t.highlight.is_some());
    }

    #[test]
    fn test_flow_zoom_steps() {
        let mut viewer = ViewerStateMachine::new();
        viewer.open("a.docx", OpenDocument::Flow);
        let t = viewer.zoom_in().unwrap();
        assert_eq!(t.render, Some(RenderRequest::ApplyScale { zoom: 1.1 }));
        viewer.set_zoom(0.1).unwrap();
        assert_eq!(viewer.state().zoom_scale(), Some(0.5));
        assert!(viewer.zoom_out().unwrap().is_empty());
    }

    #[test]
    fn test_select_outline_node_element() {
        let mut viewer = ViewerStateMachine::new();
        let token = viewer.open("a.md", OpenDocument::Markup);
        let outline = Outline::new(vec![OutlineNode::new(
            "intro",
            "Intro",
            1,
            PositionRef::Element {
                id: "intro".into(),
                order: 4,
            },
        )]);
        viewer.set_outline(token, Some(outline));
        let t = viewer.select_outline_node("intro").unwrap();
        assert_eq!(
            t.render,
            Some(RenderRequest::ScrollToElement { id: "intro".into() })
        );
        assert_eq!(viewer.state().current_position(), 4);
        assert_eq!(viewer.state().highlighted_node_id(), Some("intro"));
        assert!(matches!(
            viewer.select_outline_node("missing"),
            Err(Error::UnknownOutlineNode(_))
        ));
    }
}
