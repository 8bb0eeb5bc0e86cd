use epicmap::diagram::build_story_graph;
use epicmap::studio::bind_surfaces;
use epicmap::studio::events::{GestureEvent, PointerButton};
use epicmap::studio::viewport::{GestureFilter, ViewportOptions};
use epicmap::studio::SurfaceBinding;
use epicmap::surface::build::build_document;
use epicmap::surface::{
    CLASS_NOT_SELECTED, CLASS_SELECTED, ElementKey, EMPTY_STATE_ID, SurfaceDocument,
    story_pane_id,
};
use epicmap::test_support::{story, story_with_blockers};
use epicmap::tracker::StoryState;

fn bound_document(stories: &[epicmap::tracker::Story]) -> (SurfaceDocument, Vec<SurfaceBinding>) {
    let graph = build_story_graph(stories);
    let mut doc = build_document(&graph);
    let bindings = bind_surfaces(&mut doc, ViewportOptions::default());
    (doc, bindings)
}

fn node_rect(doc: &SurfaceDocument, surface: ElementKey, index: usize) -> ElementKey {
    let wrapper = doc.element(surface).expect("surface exists").children[0];
    let group = doc.element(wrapper).expect("wrapper exists").children[index];
    doc.element(group).expect("group exists").children[0]
}

fn node_label(doc: &SurfaceDocument, surface: ElementKey, index: usize) -> ElementKey {
    let rect = node_rect(doc, surface, index);
    let mut element = doc.next_sibling(rect).expect("label group exists");
    while let Some(child) = doc
        .element(element)
        .and_then(|e| e.children.first().copied())
    {
        element = child;
    }
    element
}

fn pane_class<'a>(doc: &'a SurfaceDocument, dom_id: &str) -> Option<&'a str> {
    let key = doc.element_by_dom_id(dom_id)?;
    doc.element(key)?.class.as_deref()
}

#[test]
fn rect_click_shows_story_details_and_hides_empty_state() {
    let (mut doc, mut bindings) = bound_document(&[
        story(100, "Set up billing", StoryState::Started),
        story(200, "Send receipts", StoryState::Planned),
    ]);
    let binding = &mut bindings[0];

    let rect = node_rect(&doc, binding.surface, 0);
    binding.selection.on_node_clicked(&mut doc, rect);

    assert_eq!(binding.selection.current_story_id(), Some("100"));
    assert_eq!(pane_class(&doc, EMPTY_STATE_ID), Some(CLASS_NOT_SELECTED));
    assert_eq!(pane_class(&doc, &story_pane_id("100")), Some(CLASS_SELECTED));
    assert_eq!(doc.highlighted_element(), Some(rect));
}

#[test]
fn label_click_switches_selection_and_never_shows_two_panes() {
    let (mut doc, mut bindings) = bound_document(&[
        story(100, "Set up billing", StoryState::Started),
        story(200, "Send receipts", StoryState::Planned),
    ]);
    let binding = &mut bindings[0];

    let first_rect = node_rect(&doc, binding.surface, 0);
    let second_label = node_label(&doc, binding.surface, 1);
    binding.selection.on_node_clicked(&mut doc, first_rect);
    binding.selection.on_node_clicked(&mut doc, second_label);

    assert_eq!(binding.selection.current_story_id(), Some("200"));
    assert_eq!(
        pane_class(&doc, &story_pane_id("100")),
        Some(CLASS_NOT_SELECTED),
        "old pane must be hidden before the new one shows"
    );
    assert_eq!(pane_class(&doc, &story_pane_id("200")), Some(CLASS_SELECTED));
    assert_eq!(
        doc.highlighted_element(),
        Some(node_rect(&doc, binding.surface, 1))
    );
}

#[test]
fn double_click_on_the_selected_node_returns_to_empty() {
    let (mut doc, mut bindings) =
        bound_document(&[story(100, "Set up billing", StoryState::Started)]);
    let binding = &mut bindings[0];
    let rect = node_rect(&doc, binding.surface, 0);

    binding.selection.on_node_clicked(&mut doc, rect);
    binding.selection.on_node_clicked(&mut doc, rect);

    assert_eq!(binding.selection.current_story_id(), None);
    assert_eq!(pane_class(&doc, EMPTY_STATE_ID), Some(CLASS_SELECTED));
    assert_eq!(doc.highlighted_element(), None);
}

#[test]
fn selection_and_viewport_compose_over_one_surface() {
    let (mut doc, mut bindings) = bound_document(&[story_with_blockers(
        100,
        "Blocked story",
        StoryState::Unstarted,
        &["waiting on #200"],
    ), story(200, "Blocking story", StoryState::Finished)]);
    let binding = &mut bindings[0];

    // Select a story, then pan and zoom; the selection must be untouched.
    let rect = node_rect(&doc, binding.surface, 0);
    binding.selection.on_node_clicked(&mut doc, rect);
    binding.viewport.on_gesture(
        &mut doc,
        &GestureEvent::drag(PointerButton::Primary, 50.0, 25.0, 55.9),
    );
    binding
        .viewport
        .on_gesture(&mut doc, &GestureEvent::wheel(4.0));

    assert_eq!(binding.selection.current_story_id(), Some("100"));
    let transform = binding.viewport.transform();
    assert_eq!((transform.x, transform.y, transform.k), (50.0, 25.0, 4.0));

    // The transform lands on the wrapper group as one attribute value.
    let wrapper = doc.element(binding.surface).expect("surface exists").children[0];
    assert_eq!(
        doc.transform_attribute(wrapper),
        Some("translate(50,25) scale(4)")
    );
}

#[test]
fn zoom_stays_inside_the_scale_extent_across_gesture_storms() {
    let (mut doc, mut bindings) =
        bound_document(&[story(100, "Set up billing", StoryState::Started)]);
    let binding = &mut bindings[0];

    for _ in 0..12 {
        binding
            .viewport
            .on_gesture(&mut doc, &GestureEvent::wheel(1.7));
        let k = binding.viewport.transform().k;
        assert!((0.5..=8.0).contains(&k), "scale escaped the extent: {k}");
    }
    assert_eq!(binding.viewport.transform().k, 8.0);

    for _ in 0..24 {
        binding
            .viewport
            .on_gesture(&mut doc, &GestureEvent::wheel(0.6));
        let k = binding.viewport.transform().k;
        assert!((0.5..=8.0).contains(&k), "scale escaped the extent: {k}");
    }
    assert_eq!(binding.viewport.transform().k, 0.5);
}

#[test]
fn middle_button_policy_ignores_primary_drags_entirely() {
    let graph = build_story_graph(&[story(100, "Set up billing", StoryState::Started)]);
    let mut doc = build_document(&graph);
    let mut bindings = bind_surfaces(
        &mut doc,
        ViewportOptions {
            filter: GestureFilter::MiddleButtonPan,
            ..ViewportOptions::default()
        },
    );
    let binding = &mut bindings[0];
    let writes_before = doc.transform_write_count();

    binding.viewport.on_gesture(
        &mut doc,
        &GestureEvent::drag(PointerButton::Primary, 100.0, 0.0, 100.0),
    );
    assert_eq!(binding.viewport.transform().x, 0.0);
    assert_eq!(doc.transform_write_count(), writes_before);

    binding.viewport.on_gesture(
        &mut doc,
        &GestureEvent::drag(PointerButton::Middle, 100.0, 0.0, 100.0),
    );
    assert_eq!(binding.viewport.transform().x, 100.0);
}
