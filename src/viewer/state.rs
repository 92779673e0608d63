//! Viewer state types.

use crate::model::{DocumentKind, Outline};
use serde::{Deserialize, Serialize};

/// How a paginated document is laid out.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ViewMode {
    /// One page at a time
    Paged,
    /// Every page in one scrolling column
    #[default]
    Continuous,
}

/// How zoom steps.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ZoomStep {
    /// Multiply or divide by a factor
    Factor(f32),
    /// Add or subtract an increment
    Increment(f32),
}

/// Allowed zoom values for one document kind.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ZoomRange {
    pub min: f32,
    pub max: f32,
    pub default: f32,
    pub step: ZoomStep,
    /// Horizontal space reserved around content when fitting to width
    pub fit_margin: f32,
}

/// Zoom for paginated documents.
pub const PAGINATED_ZOOM: ZoomRange = ZoomRange {
    min: 0.3,
    max: 5.0,
    default: 1.5,
    step: ZoomStep::Factor(1.2),
    fit_margin: 40.0,
};

/// Zoom for flow documents.
pub const FLOW_ZOOM: ZoomRange = ZoomRange {
    min: 0.5,
    max: 3.0,
    default: 1.0,
    step: ZoomStep::Increment(0.1),
    fit_margin: 60.0,
};

impl ZoomRange {
    /// Clamp a zoom value into range.
    pub fn clamp(&self, zoom: f32) -> f32 {
        zoom.clamp(self.min, self.max)
    }

    /// The next larger zoom value.
    pub fn step_up(&self, zoom: f32) -> f32 {
        let next = match self.step {
            ZoomStep::Factor(f) => zoom * f,
            ZoomStep::Increment(d) => zoom + d,
        };
        self.clamp(round_zoom(next))
    }

    /// The next smaller zoom value.
    pub fn step_down(&self, zoom: f32) -> f32 {
        let next = match self.step {
            ZoomStep::Factor(f) => zoom / f,
            ZoomStep::Increment(d) => zoom - d,
        };
        self.clamp(round_zoom(next))
    }

    /// Zoom that fits content of `intrinsic_width` (at zoom 1.0) into
    /// `container_width`, clamped into range.
    pub fn fit(&self, container_width: f32, intrinsic_width: f32) -> f32 {
        self.clamp((container_width - self.fit_margin) / intrinsic_width)
    }
}

fn round_zoom(zoom: f32) -> f32 {
    (zoom * 1000.0).round() / 1000.0
}

/// Per-kind presentation state.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum Presentation {
    /// Nothing is open
    #[default]
    Empty,
    /// Markup document at a scroll position
    Markup { position: u64 },
    /// Paginated document
    Paginated {
        mode: ViewMode,
        page: u32,
        total: u32,
        zoom: f32,
    },
    /// Flow document at a scroll position and zoom
    Flow { position: u64, zoom: f32 },
}

impl Presentation {
    /// Kind of the presented document.
    pub fn kind(&self) -> Option<DocumentKind> {
        match self {
            Presentation::Empty => None,
            Presentation::Markup { .. } => Some(DocumentKind::Markup),
            Presentation::Paginated { .. } => Some(DocumentKind::Paginated),
            Presentation::Flow { .. } => Some(DocumentKind::Flow),
        }
    }

    /// Zoom range of the presented kind, if it zooms.
    pub fn zoom_range(&self) -> Option<&'static ZoomRange> {
        match self {
            Presentation::Paginated { .. } => Some(&PAGINATED_ZOOM),
            Presentation::Flow { .. } => Some(&FLOW_ZOOM),
            Presentation::Markup { .. } | Presentation::Empty => None,
        }
    }
}

/// Identifies one opened document.
///
/// Asynchronous results carry the token of the document they were started
/// for and are dropped once a different document is open.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct DocumentToken(pub(crate) u64);

/// Everything the viewer knows about the open document.
#[derive(Debug, Clone, Default)]
pub struct ViewerState {
    pub(crate) token: DocumentToken,
    pub(crate) active_leaf_path: Option<String>,
    pub(crate) presentation: Presentation,
    pub(crate) outline: Option<Outline>,
    pub(crate) highlighted_node_id: Option<String>,
}

impl ViewerState {
    /// Path of the open leaf.
    pub fn active_leaf_path(&self) -> Option<&str> {
        self.active_leaf_path.as_deref()
    }

    /// Per-kind presentation.
    pub fn presentation(&self) -> &Presentation {
        &self.presentation
    }

    /// View mode of a paginated document.
    pub fn view_mode(&self) -> Option<ViewMode> {
        match self.presentation {
            Presentation::Paginated { mode, .. } => Some(mode),
            _ => None,
        }
    }

    /// Current position ordinal: page number or scroll element order.
    pub fn current_position(&self) -> u64 {
        match self.presentation {
            Presentation::Empty => 0,
            Presentation::Markup { position } | Presentation::Flow { position, .. } => position,
            Presentation::Paginated { page, .. } => u64::from(page),
        }
    }

    /// Current page of a paginated document.
    pub fn current_page(&self) -> Option<u32> {
        match self.presentation {
            Presentation::Paginated { page, .. } => Some(page),
            _ => None,
        }
    }

    /// Page count of a paginated document.
    pub fn total_pages(&self) -> Option<u32> {
        match self.presentation {
            Presentation::Paginated { total, .. } => Some(total),
            _ => None,
        }
    }

    /// Current zoom, for kinds that zoom.
    pub fn zoom_scale(&self) -> Option<f32> {
        match self.presentation {
            Presentation::Paginated { zoom, .. } | Presentation::Flow { zoom, .. } => Some(zoom),
            _ => None,
        }
    }

    /// The outline of the open document, once delivered.
    pub fn outline(&self) -> Option<&Outline> {
        self.outline.as_ref()
    }

    /// The highlighted outline node.
    pub fn highlighted_node_id(&self) -> Option<&str> {
        self.highlighted_node_id.as_deref()
    }

    /// Token of the open document.
    pub fn token(&self) -> DocumentToken {
        self.token
    }
}
