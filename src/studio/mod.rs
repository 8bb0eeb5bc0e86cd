use std::collections::BTreeMap;

use anyhow::Result;
use eframe::egui;
use tracing::{debug, info};

use crate::diagram::{ColorClass, StoryGraph};
use crate::surface::build::build_document;
use crate::surface::{CLASS_SELECTED, ElementKey, SurfaceDocument};
use crate::tracker::Epic;

pub mod events;
pub mod selection;
pub mod viewport;

use self::events::{GestureEvent, Modifiers, PointerButton};
use self::selection::SelectionController;
use self::viewport::{Transform, ViewportController, ViewportOptions};

const APP_TITLE: &str = "epicmap studio";
const WHEEL_ZOOM_RATE: f32 = 0.0025;
const NODE_CORNER_RADIUS: f32 = 4.0;

/// One diagram surface with its controller pair. Controllers never share
/// state across surfaces.
#[derive(Debug)]
pub struct SurfaceBinding {
    pub surface: ElementKey,
    pub selection: SelectionController,
    pub viewport: ViewportController,
}

/// Load-time boundary: discovers every diagram surface present in the
/// document and binds one controller pair to each. Surfaces added later are
/// not picked up.
pub fn bind_surfaces(doc: &mut SurfaceDocument, options: ViewportOptions) -> Vec<SurfaceBinding> {
    let mut bindings = Vec::new();
    for surface in doc.surfaces() {
        let Some(viewport) = ViewportController::bind(doc, surface, options) else {
            continue;
        };
        bindings.push(SurfaceBinding {
            surface,
            selection: SelectionController::default(),
            viewport,
        });
    }
    debug!(count = bindings.len(), "bound diagram surfaces");
    bindings
}

pub fn run_studio(epic: &Epic, graph: StoryGraph) -> Result<()> {
    info!(
        epic = %epic.name,
        stories = graph.nodes.len(),
        edges = graph.edges.len(),
        "starting native studio shell"
    );

    let epic_name = epic.name.clone();
    eframe::run_native(
        APP_TITLE,
        eframe::NativeOptions::default(),
        Box::new(move |_cc| Ok(Box::new(StudioApp::new(epic_name, graph)))),
    )
    .map_err(|error| anyhow::anyhow!("studio UI exited with error: {error}"))
}

struct StudioApp {
    epic_name: String,
    document: SurfaceDocument,
    bindings: Vec<SurfaceBinding>,
    node_classes: BTreeMap<String, ColorClass>,
    edges: Vec<(String, String)>,
}

impl StudioApp {
    fn new(epic_name: String, graph: StoryGraph) -> Self {
        let mut document = build_document(&graph);
        let bindings = bind_surfaces(&mut document, ViewportOptions::default());
        let node_classes = graph
            .nodes
            .iter()
            .map(|node| (node.id.to_string(), node.class))
            .collect();
        let edges = graph
            .edges
            .iter()
            .filter(|edge| graph.contains_story(edge.blocking) && graph.contains_story(edge.blocked))
            .map(|edge| (edge.blocking.to_string(), edge.blocked.to_string()))
            .collect();

        Self {
            epic_name,
            document,
            bindings,
            node_classes,
            edges,
        }
    }

    fn render_detail_panel(&self, ui: &mut egui::Ui) {
        ui.heading(format!("Epic: {}", self.epic_name));
        ui.separator();

        egui::ScrollArea::vertical().show(ui, |ui| {
            for pane in self.document.panes() {
                let Some(element) = self.document.element(pane) else {
                    continue;
                };
                if element.class.as_deref() != Some(CLASS_SELECTED) {
                    continue;
                }
                for child in &element.children {
                    if let Some(line) = self
                        .document
                        .element(*child)
                        .and_then(|label| label.text.as_deref())
                    {
                        ui.label(line);
                    }
                }
            }
        });
    }

    fn render_diagram(&mut self, ui: &mut egui::Ui) {
        let (response, painter) =
            ui.allocate_painter(ui.available_size(), egui::Sense::click_and_drag());
        let origin = response.rect.min;

        let Some(binding) = self.bindings.first_mut() else {
            painter.text(
                origin,
                egui::Align2::LEFT_TOP,
                "No diagram surface.",
                egui::FontId::proportional(14.0),
                ui.visuals().text_color(),
            );
            return;
        };

        let modifiers = ui.input(|i| Modifiers {
            ctrl: i.modifiers.ctrl,
            alt: i.modifiers.alt,
            shift: i.modifiers.shift,
        });

        if response.dragged() {
            let delta = response.drag_delta();
            let button = if response.dragged_by(egui::PointerButton::Middle) {
                PointerButton::Middle
            } else if response.dragged_by(egui::PointerButton::Secondary) {
                PointerButton::Secondary
            } else {
                PointerButton::Primary
            };
            let event = GestureEvent::drag(button, delta.x, delta.y, delta.length())
                .with_modifiers(modifiers);
            binding.viewport.on_gesture(&mut self.document, &event);
        }

        if response.hovered() {
            let scroll = ui.input(|i| i.raw_scroll_delta.y);
            if scroll != 0.0 {
                let factor = (scroll * WHEEL_ZOOM_RATE).exp();
                let event = GestureEvent::wheel(factor).with_modifiers(modifiers);
                binding.viewport.on_gesture(&mut self.document, &event);
            }
        }

        if response.double_clicked() {
            let event = GestureEvent::double_click().with_modifiers(modifiers);
            binding.viewport.on_gesture(&mut self.document, &event);
        } else if response.clicked() {
            if let Some(pos) = response.interact_pointer_pos() {
                let transform = binding.viewport.transform();
                let world_x = (pos.x - origin.x - transform.x) / transform.k;
                let world_y = (pos.y - origin.y - transform.y) / transform.k;
                if let Some(target) =
                    hit_test(&self.document, binding.surface, world_x, world_y)
                {
                    binding.selection.on_node_clicked(&mut self.document, target);
                }
            }
        }

        let transform = binding.viewport.transform();
        paint_surface(
            &painter,
            &self.document,
            binding.surface,
            origin,
            transform,
            &self.node_classes,
            &self.edges,
        );
    }
}

impl eframe::App for StudioApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        egui::SidePanel::left("story_detail_panel")
            .resizable(true)
            .default_width(320.0)
            .show(ctx, |ui| self.render_detail_panel(ui));

        egui::CentralPanel::default().show(ctx, |ui| self.render_diagram(ui));
    }
}

/// Maps a click position (surface coordinates) to the element the click
/// landed on: the node label when the point is inside its text band, the
/// rectangle otherwise.
fn hit_test(
    doc: &SurfaceDocument,
    surface: ElementKey,
    x: f32,
    y: f32,
) -> Option<ElementKey> {
    for group in node_groups(doc, surface) {
        let Some((rect, label)) = node_parts(doc, group) else {
            continue;
        };
        let Some(rect_bounds) = doc.element(rect).and_then(|e| e.bounds) else {
            continue;
        };
        if !rect_bounds.contains(x, y) {
            continue;
        }
        let label_hit = doc
            .element(label)
            .and_then(|e| e.bounds)
            .is_some_and(|bounds| bounds.contains(x, y));
        return Some(if label_hit { label } else { rect });
    }
    None
}

/// Node groups of a surface, looking through the viewport wrapper when the
/// surface has been bound.
fn node_groups(doc: &SurfaceDocument, surface: ElementKey) -> Vec<ElementKey> {
    let Some(element) = doc.element(surface) else {
        return Vec::new();
    };
    if let [only_child] = element.children[..] {
        if doc.element(only_child).is_some_and(|child| {
            child.dom_id.as_deref() == Some(crate::surface::VIEWPORT_GROUP_ID)
        }) {
            return doc
                .element(only_child)
                .map(|wrapper| wrapper.children.clone())
                .unwrap_or_default();
        }
    }
    element.children.clone()
}

/// Splits a node group into its rectangle and deepest label element.
fn node_parts(doc: &SurfaceDocument, group: ElementKey) -> Option<(ElementKey, ElementKey)> {
    let children = &doc.element(group)?.children;
    let [rect, label_group] = children[..] else {
        return None;
    };
    let mut label = label_group;
    while let Some(element) = doc.element(label) {
        match element.children.first() {
            Some(child) => label = *child,
            None => break,
        }
    }
    Some((rect, label))
}

fn paint_surface(
    painter: &egui::Painter,
    doc: &SurfaceDocument,
    surface: ElementKey,
    origin: egui::Pos2,
    transform: Transform,
    node_classes: &BTreeMap<String, ColorClass>,
    edges: &[(String, String)],
) {
    let to_screen = |x: f32, y: f32| {
        egui::pos2(
            origin.x + transform.x + x * transform.k,
            origin.y + transform.y + y * transform.k,
        )
    };

    let mut centers = BTreeMap::new();
    for group in node_groups(doc, surface) {
        let Some((rect, label)) = node_parts(doc, group) else {
            continue;
        };
        if let Some(bounds) = doc.element(rect).and_then(|e| e.bounds) {
            let story_id = doc.text_content(label);
            centers.insert(story_id, bounds.center());
        }
    }

    let edge_stroke = egui::Stroke::new(1.0, egui::Color32::from_rgb(0x8e, 0xa0, 0xb8));
    for (blocking, blocked) in edges {
        let (Some(from), Some(to)) = (centers.get(blocking), centers.get(blocked)) else {
            continue;
        };
        painter.line_segment(
            [to_screen(from.0, from.1), to_screen(to.0, to.1)],
            edge_stroke,
        );
    }

    let highlighted = doc.highlighted_element();
    for group in node_groups(doc, surface) {
        let Some((rect, label)) = node_parts(doc, group) else {
            continue;
        };
        let Some(bounds) = doc.element(rect).and_then(|e| e.bounds) else {
            continue;
        };
        let story_id = doc.text_content(label);
        let class = node_classes
            .get(&story_id)
            .copied()
            .unwrap_or(ColorClass::Grey);
        let (fill, stroke_color, text_color) = class_colors(class);

        let screen_rect = egui::Rect::from_min_max(
            to_screen(bounds.x, bounds.y),
            to_screen(bounds.x + bounds.width, bounds.y + bounds.height),
        );
        painter.rect_filled(screen_rect, NODE_CORNER_RADIUS, fill);
        let stroke = if highlighted == Some(rect) {
            egui::Stroke::new(3.0, egui::Color32::from_rgb(0xcc, 0x76, 0x2f))
        } else {
            egui::Stroke::new(1.5, stroke_color)
        };
        painter.rect_stroke(
            screen_rect,
            NODE_CORNER_RADIUS,
            stroke,
            egui::StrokeKind::Outside,
        );
        painter.text(
            screen_rect.center(),
            egui::Align2::CENTER_CENTER,
            story_id,
            egui::FontId::proportional(12.0 * transform.k),
            text_color,
        );
    }
}

fn class_colors(class: ColorClass) -> (egui::Color32, egui::Color32, egui::Color32) {
    match class {
        ColorClass::Grey => (
            egui::Color32::from_rgb(0xe0, 0xe2, 0xe5),
            egui::Color32::from_rgb(0xc4, 0xc5, 0xc5),
            egui::Color32::BLACK,
        ),
        ColorClass::Blue => (
            egui::Color32::from_rgb(0x50, 0x7b, 0xbd),
            egui::Color32::from_rgb(0x29, 0x59, 0xa4),
            egui::Color32::WHITE,
        ),
        ColorClass::Yellow => (
            egui::Color32::from_rgb(0xf5, 0xb0, 0x4f),
            egui::Color32::from_rgb(0xfc, 0x9d, 0x17),
            egui::Color32::WHITE,
        ),
        ColorClass::Green => (
            egui::Color32::from_rgb(0x94, 0xc3, 0x7f),
            egui::Color32::from_rgb(0x5f, 0xa6, 0x40),
            egui::Color32::WHITE,
        ),
        ColorClass::Red => (
            egui::Color32::from_rgb(0xe8, 0x74, 0x50),
            egui::Color32::from_rgb(0xec, 0x4d, 0x22),
            egui::Color32::WHITE,
        ),
    }
}

#[cfg(test)]
mod tests {
    use crate::diagram::build_story_graph;
    use crate::studio::events::{GestureEvent, PointerButton};
    use crate::surface::build::build_document;
    use crate::surface::{ElementKind, SurfaceDocument};
    use crate::test_support::story;
    use crate::tracker::StoryState;

    use super::{bind_surfaces, hit_test, node_groups, node_parts};
    use super::viewport::ViewportOptions;

    #[test]
    fn bind_surfaces_attaches_one_controller_pair_per_surface() {
        let mut doc = SurfaceDocument::new();
        let first = doc.push_element(None, ElementKind::Surface);
        doc.push_element(Some(first), ElementKind::Group);
        let second = doc.push_element(None, ElementKind::Surface);
        doc.push_element(Some(second), ElementKind::Group);

        let bindings = bind_surfaces(&mut doc, ViewportOptions::default());
        assert_eq!(bindings.len(), 2);
        assert_eq!(bindings[0].surface, first);
        assert_eq!(bindings[1].surface, second);
    }

    #[test]
    fn surfaces_pan_independently() {
        let mut doc = SurfaceDocument::new();
        let first = doc.push_element(None, ElementKind::Surface);
        doc.push_element(Some(first), ElementKind::Group);
        let second = doc.push_element(None, ElementKind::Surface);
        doc.push_element(Some(second), ElementKind::Group);

        let mut bindings = bind_surfaces(&mut doc, ViewportOptions::default());
        bindings[0].viewport.on_gesture(
            &mut doc,
            &GestureEvent::drag(PointerButton::Primary, 40.0, 0.0, 40.0),
        );

        assert_eq!(bindings[0].viewport.transform().x, 40.0);
        assert_eq!(bindings[1].viewport.transform().x, 0.0);
    }

    #[test]
    fn hit_test_distinguishes_label_from_rect() {
        let graph = build_story_graph(&[story(100, "First", StoryState::Started)]);
        let mut doc = build_document(&graph);
        let surface = doc.surfaces()[0];
        let _ = bind_surfaces(&mut doc, ViewportOptions::default());

        let group = node_groups(&doc, surface)[0];
        let (rect, label) = node_parts(&doc, group).expect("node parts should resolve");
        let rect_bounds = doc.element(rect).and_then(|e| e.bounds).expect("rect bounds");
        let label_bounds = doc
            .element(label)
            .and_then(|e| e.bounds)
            .expect("label bounds");

        let (cx, cy) = label_bounds.center();
        assert_eq!(hit_test(&doc, surface, cx, cy), Some(label));

        // Just inside the rect's left edge, outside the label band.
        assert_eq!(
            hit_test(&doc, surface, rect_bounds.x + 1.0, rect_bounds.y + 1.0),
            Some(rect)
        );
        assert_eq!(hit_test(&doc, surface, -10.0, -10.0), None);
    }

    #[test]
    fn node_groups_looks_through_the_viewport_wrapper() {
        let graph = build_story_graph(&[
            story(100, "First", StoryState::Started),
            story(200, "Second", StoryState::Planned),
        ]);
        let mut doc = build_document(&graph);
        let surface = doc.surfaces()[0];

        let before = node_groups(&doc, surface);
        let _ = bind_surfaces(&mut doc, ViewportOptions::default());
        let after = node_groups(&doc, surface);

        assert_eq!(before, after);
        assert_eq!(after.len(), 2);
    }
}
