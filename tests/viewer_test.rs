//! Integration tests for the viewer state machine and viewport sync.

use folio::error::Error;
use folio::sync::{BlockGeometry, Viewport};
use folio::viewer::{OpenDocument, RenderRequest, ViewMode, ViewerStateMachine, PAGINATED_ZOOM};
use folio::{select_current, Outline, OutlineNode, PositionRef};
use std::time::{Duration, Instant};

fn page_node(id: &str, page: u32) -> OutlineNode {
    OutlineNode::new(id, id, 1, PositionRef::Page { page })
}

fn three_chapters() -> Outline {
    Outline::new(vec![
        page_node("one", 1),
        page_node("five", 5),
        page_node("nine", 9),
    ])
}

fn open_pdf(total: u32) -> ViewerStateMachine {
    let mut viewer = ViewerStateMachine::new();
    let token = viewer.open("doc.pdf", OpenDocument::Paginated { total_pages: total });
    viewer.set_outline(token, Some(three_chapters()));
    viewer
}

#[test]
fn test_greatest_lower_bound() {
    let outline = three_chapters();
    assert_eq!(select_current(&outline, 7).map(|n| n.id.as_str()), Some("five"));
    assert_eq!(select_current(&outline, 5).map(|n| n.id.as_str()), Some("five"));
    assert!(select_current(&outline, 0).is_none());
}

#[test]
fn test_set_zoom_clamps() {
    let mut viewer = open_pdf(12);
    viewer.set_zoom(50.0).unwrap();
    assert_eq!(viewer.state().zoom_scale(), Some(PAGINATED_ZOOM.max));
    viewer.set_zoom(0.01).unwrap();
    assert_eq!(viewer.state().zoom_scale(), Some(PAGINATED_ZOOM.min));
}

#[test]
fn test_zoom_steps_in_paginated_range() {
    let mut viewer = open_pdf(12);
    let t = viewer.zoom_in().unwrap();
    assert_eq!(
        t.render,
        Some(RenderRequest::Rebuild {
            mode: ViewMode::Continuous,
            page: 1,
            zoom: 1.8
        })
    );
    viewer.zoom_out().unwrap();
    assert_eq!(viewer.state().zoom_scale(), Some(1.5));
}

#[test]
fn test_jump_out_of_range_leaves_state() {
    let mut viewer = open_pdf(10);
    viewer.jump_to(6).unwrap();

    let err = viewer.jump_to(11).unwrap_err();
    assert!(matches!(err, Error::OutOfRange(11, 10)));
    assert!(matches!(viewer.jump_to(0), Err(Error::OutOfRange(0, 10))));
    assert_eq!(viewer.state().current_page(), Some(6));
    assert_eq!(viewer.state().highlighted_node_id(), Some("five"));
}

#[test]
fn test_navigate_clamps_at_edges() {
    let mut viewer = open_pdf(3);
    assert!(viewer.navigate(-1).unwrap().is_empty());
    assert_eq!(viewer.state().current_page(), Some(1));

    let t = viewer.navigate(1).unwrap();
    assert_eq!(t.render, Some(RenderRequest::ScrollToPage { page: 2 }));
    viewer.navigate(1).unwrap();
    assert!(viewer.navigate(1).unwrap().is_empty());
    assert_eq!(viewer.state().current_page(), Some(3));
}

#[test]
fn test_paged_mode_renders_single_page() {
    let mut viewer = ViewerStateMachine::new().with_default_mode(ViewMode::Paged);
    viewer.open("doc.pdf", OpenDocument::Paginated { total_pages: 4 });
    let t = viewer.navigate(1).unwrap();
    assert_eq!(t.render, Some(RenderRequest::Page { page: 2, zoom: 1.5 }));
}

#[test]
fn test_transition_carries_highlight() {
    let mut viewer = open_pdf(12);
    let t = viewer.jump_to(9).unwrap();
    let highlight = t.highlight.expect("highlight refresh");
    assert_eq!(highlight.highlighted.as_deref(), Some("nine"));
    assert!(highlight.changed);

    let t = viewer.navigate(1).unwrap();
    let highlight = t.highlight.expect("highlight refresh");
    assert_eq!(highlight.highlighted.as_deref(), Some("nine"));
    assert!(!highlight.changed);
}

#[test]
fn test_fit_to_width() {
    let mut viewer = open_pdf(2);
    viewer.fit_to_width(1240.0, 600.0).unwrap();
    assert_eq!(viewer.state().zoom_scale(), Some(2.0));
    viewer.fit_to_width(10_000.0, 100.0).unwrap();
    assert_eq!(viewer.state().zoom_scale(), Some(PAGINATED_ZOOM.max));
    assert!(matches!(
        viewer.fit_to_width(800.0, 0.0),
        Err(Error::Render(_))
    ));
}

#[test]
fn test_outline_click_jumps_to_page() {
    let mut viewer = open_pdf(12);
    let t = viewer.select_outline_node("nine").unwrap();
    assert_eq!(t.render, Some(RenderRequest::ScrollToPage { page: 9 }));
    assert_eq!(viewer.state().current_page(), Some(9));
    assert_eq!(viewer.state().highlighted_node_id(), Some("nine"));
}

#[test]
fn test_scroll_updates_page_and_highlight() {
    let mut viewer = open_pdf(10);
    let token = viewer.state().token();
    let pages: Vec<BlockGeometry> = (1..=10)
        .map(|p| BlockGeometry::new(p, (p - 1) as f32 * 1000.0, 1000.0))
        .collect();

    let start = Instant::now();
    let t = viewer
        .on_scroll(token, start, &pages, Viewport::new(6200.0, 900.0))
        .expect("first sample passes");
    assert_eq!(viewer.state().current_page(), Some(7));
    assert_eq!(t.highlight.unwrap().highlighted.as_deref(), Some("five"));

    // Inside the throttle window
    assert!(viewer
        .on_scroll(token, start + Duration::from_millis(10), &pages, Viewport::new(0.0, 900.0))
        .is_none());
    assert_eq!(viewer.state().current_page(), Some(7));
}

#[test]
fn test_stale_token_ignored() {
    let mut viewer = ViewerStateMachine::new();
    let old = viewer.open("a.pdf", OpenDocument::Paginated { total_pages: 20 });
    let new = viewer.open("b.pdf", OpenDocument::Paginated { total_pages: 20 });

    assert!(viewer.set_outline(old, Some(three_chapters())).is_none());
    assert!(viewer.state().outline().is_none());
    assert!(viewer.apply_scroll(old, 15).is_none());
    assert_eq!(viewer.state().current_page(), Some(1));

    assert!(viewer.apply_scroll(new, 15).is_some());
    assert_eq!(viewer.state().current_page(), Some(15));

    viewer.close();
    assert!(viewer.apply_scroll(new, 3).is_none());
}

#[test]
fn test_flow_scroll_positions() {
    let mut viewer = ViewerStateMachine::new();
    let token = viewer.open("report.docx", OpenDocument::Flow);
    let outline = Outline::new(vec![OutlineNode::new(
        "flow-heading-0",
        "Intro",
        1,
        PositionRef::Element {
            id: "flow-heading-0".into(),
            order: 3,
        },
    )]);
    let initial = viewer.set_outline(token, Some(outline)).unwrap();
    assert_eq!(initial.highlighted, None);

    let t = viewer.apply_scroll(token, 4).unwrap();
    assert_eq!(t.highlight.unwrap().highlighted.as_deref(), Some("flow-heading-0"));
    assert!(matches!(viewer.jump_to(2), Err(Error::Unsupported(_))));
}
