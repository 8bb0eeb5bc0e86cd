use crate::diagram::StoryGraph;

use super::{
    Bounds, CLASS_NOT_SELECTED, CLASS_SELECTED, ElementKey, ElementKind, EMPTY_STATE_ID,
    SurfaceDocument, story_pane_id,
};

const NODE_COLUMNS: usize = 4;
const NODE_WIDTH: f32 = 190.0;
const NODE_HEIGHT: f32 = 64.0;
const COLUMN_STRIDE: f32 = 250.0;
const ROW_STRIDE: f32 = 140.0;
const GRID_ORIGIN_X: f32 = 80.0;
const GRID_ORIGIN_Y: f32 = 100.0;
const LABEL_INSET: f32 = 16.0;

/// Builds the page document the controllers operate on: one drawing surface
/// holding a rect + label pair per story, the placeholder pane, and one
/// detail pane per story. The empty-state pane starts visible, story panes
/// hidden.
///
/// Each node mirrors the shape a mermaid render produces: the label text sits
/// three levels below the group that is the rectangle's next sibling, which
/// is what the selection controller's traversal rule expects.
pub fn build_document(graph: &StoryGraph) -> SurfaceDocument {
    let mut doc = SurfaceDocument::new();

    let empty_pane = doc.push_element(None, ElementKind::Pane);
    doc.set_dom_id(empty_pane, EMPTY_STATE_ID);
    doc.set_class(empty_pane, CLASS_SELECTED);
    let hint = doc.push_element(Some(empty_pane), ElementKind::Label);
    doc.set_text(hint, "Click a story to see its details.");

    for node in &graph.nodes {
        let pane = doc.push_element(None, ElementKind::Pane);
        doc.set_dom_id(pane, story_pane_id(&node.id.to_string()));
        doc.set_class(pane, CLASS_NOT_SELECTED);
        for line in [
            format!("id: {}", node.id),
            format!("name: {}", node.name),
            format!("url: {}", node.url),
            format!("current state: {}", node.state.as_str()),
        ] {
            let label = doc.push_element(Some(pane), ElementKind::Label);
            doc.set_text(label, line);
        }
    }

    let surface = doc.push_element(None, ElementKind::Surface);
    for (index, node) in graph.nodes.iter().enumerate() {
        let x = GRID_ORIGIN_X + (index % NODE_COLUMNS) as f32 * COLUMN_STRIDE;
        let y = GRID_ORIGIN_Y + (index / NODE_COLUMNS) as f32 * ROW_STRIDE;
        push_node(&mut doc, surface, &node.id.to_string(), Bounds::new(x, y, NODE_WIDTH, NODE_HEIGHT));
    }

    doc
}

fn push_node(
    doc: &mut SurfaceDocument,
    surface: ElementKey,
    story_id: &str,
    bounds: Bounds,
) -> ElementKey {
    let group = doc.push_element(Some(surface), ElementKind::Group);

    let rect = doc.push_element(Some(group), ElementKind::Rect);
    doc.set_bounds(rect, bounds);

    let label_group = doc.push_element(Some(group), ElementKind::Group);
    let container = doc.push_element(Some(label_group), ElementKind::Group);
    let span = doc.push_element(Some(container), ElementKind::Group);
    let text = doc.push_element(Some(span), ElementKind::Label);
    doc.set_text(text, story_id);
    doc.set_bounds(
        text,
        Bounds::new(
            bounds.x + LABEL_INSET,
            bounds.y + LABEL_INSET,
            bounds.width - 2.0 * LABEL_INSET,
            bounds.height - 2.0 * LABEL_INSET,
        ),
    );

    group
}
