use tracing::debug;

pub mod build;

/// Visibility classes used by the detail panes.
pub const CLASS_SELECTED: &str = "selected";
pub const CLASS_NOT_SELECTED: &str = "not-selected";

/// Document id of the placeholder pane shown while nothing is selected.
pub const EMPTY_STATE_ID: &str = "empty-state";

/// Document id carried by the one node rectangle that is visually selected.
pub const HIGHLIGHTED_NODE_ID: &str = "selected-node";

/// Document id of the group a viewport controller wraps around a surface's
/// drawn content. Used as the already-wrapped marker.
pub const VIEWPORT_GROUP_ID: &str = "viewport";

pub fn story_pane_id(story_id: &str) -> String {
    format!("story-details-{story_id}")
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ElementKey(usize);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ElementKind {
    /// Root of one diagram drawing surface.
    Surface,
    Group,
    Rect,
    Label,
    /// Detail pane outside the drawing surface.
    Pane,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bounds {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl Bounds {
    pub fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    pub fn contains(&self, px: f32, py: f32) -> bool {
        px >= self.x && px <= self.x + self.width && py >= self.y && py <= self.y + self.height
    }

    pub fn center(&self) -> (f32, f32) {
        (self.x + self.width / 2.0, self.y + self.height / 2.0)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Element {
    pub kind: ElementKind,
    pub dom_id: Option<String>,
    pub class: Option<String>,
    pub text: Option<String>,
    pub transform: Option<String>,
    pub bounds: Option<Bounds>,
    pub parent: Option<ElementKey>,
    pub children: Vec<ElementKey>,
}

/// Element tree a rendered diagram page exposes to the interaction
/// controllers: id lookup, class mutation, sibling/ancestor traversal, a
/// highlight marker, and transform attributes on group elements.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct SurfaceDocument {
    elements: Vec<Element>,
    transform_writes: u64,
}

impl SurfaceDocument {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push_element(&mut self, parent: Option<ElementKey>, kind: ElementKind) -> ElementKey {
        let key = ElementKey(self.elements.len());
        self.elements.push(Element {
            kind,
            dom_id: None,
            class: None,
            text: None,
            transform: None,
            bounds: None,
            parent,
            children: Vec::new(),
        });
        if let Some(parent_key) = parent {
            self.elements[parent_key.0].children.push(key);
        }
        key
    }

    pub fn element(&self, key: ElementKey) -> Option<&Element> {
        self.elements.get(key.0)
    }

    pub fn set_dom_id(&mut self, key: ElementKey, dom_id: impl Into<String>) {
        if let Some(element) = self.elements.get_mut(key.0) {
            element.dom_id = Some(dom_id.into());
        }
    }

    pub fn set_class(&mut self, key: ElementKey, class: impl Into<String>) {
        if let Some(element) = self.elements.get_mut(key.0) {
            element.class = Some(class.into());
        }
    }

    pub fn set_text(&mut self, key: ElementKey, text: impl Into<String>) {
        if let Some(element) = self.elements.get_mut(key.0) {
            element.text = Some(text.into());
        }
    }

    pub fn set_bounds(&mut self, key: ElementKey, bounds: Bounds) {
        if let Some(element) = self.elements.get_mut(key.0) {
            element.bounds = Some(bounds);
        }
    }

    pub fn element_by_dom_id(&self, dom_id: &str) -> Option<ElementKey> {
        self.elements
            .iter()
            .position(|element| element.dom_id.as_deref() == Some(dom_id))
            .map(ElementKey)
    }

    /// Class mutation by document id. Missing elements are a silent no-op,
    /// reported back so callers can trace it.
    pub fn set_class_by_id(&mut self, dom_id: &str, class: &str) -> bool {
        match self.element_by_dom_id(dom_id) {
            Some(key) => {
                self.set_class(key, class);
                true
            }
            None => {
                debug!(dom_id, class, "no element with this id; class write skipped");
                false
            }
        }
    }

    pub fn parent(&self, key: ElementKey) -> Option<ElementKey> {
        self.element(key)?.parent
    }

    /// Walks up `levels` ancestors; `None` when the tree is shallower.
    pub fn ancestor(&self, key: ElementKey, levels: usize) -> Option<ElementKey> {
        let mut current = key;
        for _ in 0..levels {
            current = self.parent(current)?;
        }
        Some(current)
    }

    pub fn next_sibling(&self, key: ElementKey) -> Option<ElementKey> {
        self.sibling_at_offset(key, 1)
    }

    pub fn previous_sibling(&self, key: ElementKey) -> Option<ElementKey> {
        self.sibling_at_offset(key, -1)
    }

    fn sibling_at_offset(&self, key: ElementKey, offset: isize) -> Option<ElementKey> {
        let parent = self.parent(key)?;
        let siblings = &self.element(parent)?.children;
        let index = siblings.iter().position(|child| *child == key)?;
        let target = index.checked_add_signed(offset)?;
        siblings.get(target).copied()
    }

    /// Own text plus descendant text in document order, whitespace-joined.
    pub fn text_content(&self, key: ElementKey) -> String {
        let mut parts = Vec::new();
        self.collect_text(key, &mut parts);
        parts.join(" ")
    }

    fn collect_text(&self, key: ElementKey, parts: &mut Vec<String>) {
        let Some(element) = self.element(key) else {
            return;
        };
        if let Some(text) = &element.text {
            if !text.trim().is_empty() {
                parts.push(text.trim().to_owned());
            }
        }
        for child in element.children.clone() {
            self.collect_text(child, parts);
        }
    }

    pub fn surfaces(&self) -> Vec<ElementKey> {
        self.keys_of_kind(ElementKind::Surface)
    }

    pub fn panes(&self) -> Vec<ElementKey> {
        self.keys_of_kind(ElementKind::Pane)
    }

    fn keys_of_kind(&self, kind: ElementKind) -> Vec<ElementKey> {
        self.elements
            .iter()
            .enumerate()
            .filter(|(_, element)| element.kind == kind)
            .map(|(index, _)| ElementKey(index))
            .collect()
    }

    /// Marks `key` as the visually selected node. At most one element carries
    /// the marker; any previous carrier is cleared first.
    pub fn set_highlight(&mut self, key: ElementKey) {
        if let Some(previous) = self.highlighted_element() {
            self.elements[previous.0].dom_id = None;
        }
        if let Some(element) = self.elements.get_mut(key.0) {
            element.dom_id = Some(HIGHLIGHTED_NODE_ID.to_owned());
        }
    }

    pub fn clear_highlight(&mut self, key: ElementKey) {
        if let Some(element) = self.elements.get_mut(key.0) {
            if element.dom_id.as_deref() == Some(HIGHLIGHTED_NODE_ID) {
                element.dom_id = None;
            }
        }
    }

    pub fn highlighted_element(&self) -> Option<ElementKey> {
        self.element_by_dom_id(HIGHLIGHTED_NODE_ID)
    }

    /// Wraps the surface's drawn content in one extra group so a transform
    /// can be applied without disturbing the surface's own coordinates.
    /// A surface that is already wrapped yields its existing wrapper.
    pub fn wrap_in_group(&mut self, surface: ElementKey) -> Option<ElementKey> {
        let element = self.element(surface)?;
        if element.kind != ElementKind::Surface {
            return None;
        }

        if let [only_child] = element.children[..] {
            let child = self.element(only_child)?;
            if child.kind == ElementKind::Group
                && child.dom_id.as_deref() == Some(VIEWPORT_GROUP_ID)
            {
                return Some(only_child);
            }
        }

        let drawn = std::mem::take(&mut self.elements[surface.0].children);
        let wrapper = self.push_element(Some(surface), ElementKind::Group);
        self.set_dom_id(wrapper, VIEWPORT_GROUP_ID);
        for child in &drawn {
            self.elements[child.0].parent = Some(wrapper);
        }
        self.elements[wrapper.0].children = drawn;
        Some(wrapper)
    }

    /// Writes a transform attribute. Re-writing the identical value is
    /// skipped so reapplying a transform is an observable no-op.
    pub fn set_transform(&mut self, key: ElementKey, value: &str) {
        let Some(element) = self.elements.get_mut(key.0) else {
            return;
        };
        if element.transform.as_deref() == Some(value) {
            return;
        }
        element.transform = Some(value.to_owned());
        self.transform_writes += 1;
    }

    pub fn transform_attribute(&self, key: ElementKey) -> Option<&str> {
        self.element(key)?.transform.as_deref()
    }

    /// Count of attribute writes that actually happened; lets callers and
    /// tests observe that rejected or repeated gestures write nothing.
    pub fn transform_write_count(&self) -> u64 {
        self.transform_writes
    }
}
