use tracing::debug;

use crate::surface::{
    CLASS_NOT_SELECTED, CLASS_SELECTED, ElementKey, ElementKind, EMPTY_STATE_ID, SurfaceDocument,
    story_pane_id,
};

/// How a click target maps to a story id and its rectangle. A rendered node
/// is a `rect` followed by a label subtree, and clicks can land on either:
/// the rect reads the id from its next sibling, while a label click walks up
/// to the label subtree's root and takes the previous sibling as the rect.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TargetRules {
    /// Ancestor levels between the clicked label text and the label
    /// subtree's root.
    pub label_ancestor_levels: usize,
}

impl Default for TargetRules {
    fn default() -> Self {
        Self {
            label_ancestor_levels: 3,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct ActiveSelection {
    story_id: String,
    rect: ElementKey,
}

/// Maintains the single-active-selection invariant over one diagram surface
/// and keeps two visual effects in sync with it: detail-pane visibility and
/// the node highlight marker.
///
/// States are `Empty` and `Selected(id, rect)`. A click on the selected
/// node's own id toggles back to `Empty`; a click on another node replaces
/// the selection, always hiding the old story before showing the new one.
/// Handlers run to completion on the UI event loop and must not re-enter
/// `on_node_clicked` from inside a transition.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct SelectionController {
    rules: TargetRules,
    current: Option<ActiveSelection>,
}

impl SelectionController {
    pub fn new(rules: TargetRules) -> Self {
        Self {
            rules,
            current: None,
        }
    }

    pub fn current_story_id(&self) -> Option<&str> {
        self.current.as_ref().map(|active| active.story_id.as_str())
    }

    /// Click dispatch for the node layer. Unresolvable targets are a
    /// recoverable no-op, never an error.
    pub fn on_node_clicked(&mut self, doc: &mut SurfaceDocument, target: ElementKey) {
        let Some((story_id, rect)) = self.resolve_target(doc, target) else {
            debug!(?target, "click target did not resolve to a story node");
            return;
        };

        match self.current.take() {
            None => {
                self.hide_empty_state(doc);
                self.show_story(doc, &story_id);
                self.highlight(doc, rect);
                self.current = Some(ActiveSelection { story_id, rect });
            }
            Some(previous) if previous.story_id == story_id => {
                self.hide_story(doc, &previous.story_id);
                self.unhighlight(doc, previous.rect);
                self.show_empty_state(doc);
            }
            Some(previous) => {
                // Old selection is fully retired before the new one appears.
                self.hide_story(doc, &previous.story_id);
                self.unhighlight(doc, previous.rect);
                self.show_story(doc, &story_id);
                self.highlight(doc, rect);
                self.current = Some(ActiveSelection { story_id, rect });
            }
        }
    }

    /// Disambiguates the clicked element into `(story id, rectangle)`.
    fn resolve_target(
        &self,
        doc: &SurfaceDocument,
        target: ElementKey,
    ) -> Option<(String, ElementKey)> {
        let element = doc.element(target)?;
        if element.kind == ElementKind::Rect {
            let label = doc.next_sibling(target)?;
            // Mirror of the label path's rect check: the sibling must be a
            // label subtree, not some other stray element.
            if !matches!(
                doc.element(label)?.kind,
                ElementKind::Group | ElementKind::Label
            ) {
                return None;
            }
            let story_id = non_empty(doc.text_content(label))?;
            return Some((story_id, target));
        }

        let story_id = non_empty(doc.text_content(target))?;
        let label_root = doc.ancestor(target, self.rules.label_ancestor_levels)?;
        let rect = doc.previous_sibling(label_root)?;
        if doc.element(rect)?.kind != ElementKind::Rect {
            return None;
        }
        Some((story_id, rect))
    }

    fn show_empty_state(&self, doc: &mut SurfaceDocument) {
        doc.set_class_by_id(EMPTY_STATE_ID, CLASS_SELECTED);
    }

    fn hide_empty_state(&self, doc: &mut SurfaceDocument) {
        doc.set_class_by_id(EMPTY_STATE_ID, CLASS_NOT_SELECTED);
    }

    fn show_story(&self, doc: &mut SurfaceDocument, story_id: &str) {
        doc.set_class_by_id(&story_pane_id(story_id), CLASS_SELECTED);
    }

    fn hide_story(&self, doc: &mut SurfaceDocument, story_id: &str) {
        doc.set_class_by_id(&story_pane_id(story_id), CLASS_NOT_SELECTED);
    }

    fn highlight(&self, doc: &mut SurfaceDocument, rect: ElementKey) {
        doc.set_highlight(rect);
    }

    fn unhighlight(&self, doc: &mut SurfaceDocument, rect: ElementKey) {
        doc.clear_highlight(rect);
    }
}

fn non_empty(text: String) -> Option<String> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_owned())
    }
}
