use tracing::debug;

use crate::surface::{ElementKey, SurfaceDocument};

use super::events::{GestureEvent, GestureKind, PointerButton};

pub const DEFAULT_SCALE_EXTENT: ScaleExtent = ScaleExtent { min: 0.5, max: 8.0 };
pub const DEFAULT_CLICK_DISTANCE: f32 = 20.0;

/// Zoom factor applied by one double-click when double-click zoom is on.
const DOUBLE_CLICK_ZOOM_FACTOR: f32 = 2.0;

/// Pan/zoom transform of one diagram surface: translate, then scale.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Transform {
    pub x: f32,
    pub y: f32,
    pub k: f32,
}

impl Transform {
    pub const IDENTITY: Self = Self {
        x: 0.0,
        y: 0.0,
        k: 1.0,
    };

    /// Single attribute value encoding translate and scale together.
    pub fn to_attribute(self) -> String {
        format!("translate({},{}) scale({})", self.x, self.y, self.k)
    }
}

impl Default for Transform {
    fn default() -> Self {
        Self::IDENTITY
    }
}

/// Hard clamp on the zoom factor. Out-of-range requests are clamped, never
/// rejected.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScaleExtent {
    pub min: f32,
    pub max: f32,
}

impl ScaleExtent {
    pub fn clamp(self, k: f32) -> f32 {
        k.clamp(self.min, self.max)
    }
}

impl Default for ScaleExtent {
    fn default() -> Self {
        DEFAULT_SCALE_EXTENT
    }
}

/// Which raw gestures the viewport honors. The observed revisions disagree
/// on the right policy, so it stays swappable configuration and the
/// integrator picks one.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum GestureFilter {
    /// Every gesture is honored, but drags shorter than `min_drag_distance`
    /// count as clicks and are rejected.
    ClickDistance { min_drag_distance: f32 },
    /// Only middle-button press/drag pans; wheel zooms only without
    /// modifier keys.
    MiddleButtonPan,
    /// No filtering at all.
    AcceptAll,
}

impl GestureFilter {
    pub fn accepts(self, event: &GestureEvent) -> bool {
        match self {
            Self::ClickDistance { min_drag_distance } => match event.kind {
                GestureKind::Drag { distance, .. } => distance >= min_drag_distance,
                _ => true,
            },
            Self::MiddleButtonPan => match event.kind {
                GestureKind::MouseDown | GestureKind::Drag { .. } => {
                    event.button == PointerButton::Middle
                }
                GestureKind::Wheel { .. } => !event.modifiers.any(),
                GestureKind::DoubleClick => false,
            },
            Self::AcceptAll => true,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ViewportOptions {
    pub scale_extent: ScaleExtent,
    pub filter: GestureFilter,
    pub double_click_zoom: bool,
}

impl Default for ViewportOptions {
    /// The most recent observed policy: no gesture filter, default scale
    /// extent, double-click zoom off so double-click stays free for other
    /// interactions.
    fn default() -> Self {
        Self {
            scale_extent: ScaleExtent::default(),
            filter: GestureFilter::AcceptAll,
            double_click_zoom: false,
        }
    }
}

/// Owns one surface's pan/zoom transform. Accepted gestures mutate the
/// stored transform and apply it to the wrapped drawing group with a single
/// attribute write; rejected gestures change nothing.
#[derive(Debug, Clone, PartialEq)]
pub struct ViewportController {
    options: ViewportOptions,
    transform: Transform,
    group: ElementKey,
}

impl ViewportController {
    /// Wraps the surface's drawn content and attaches a controller to the
    /// wrapper group. Wrapping is guarded per surface, so binding an
    /// already-wrapped surface reuses its group. Returns `None` when the
    /// element is not a surface root.
    pub fn bind(
        doc: &mut SurfaceDocument,
        surface: ElementKey,
        options: ViewportOptions,
    ) -> Option<Self> {
        let group = doc.wrap_in_group(surface)?;
        Some(Self {
            options,
            transform: Transform::IDENTITY,
            group,
        })
    }

    pub fn transform(&self) -> Transform {
        self.transform
    }

    pub fn options(&self) -> &ViewportOptions {
        &self.options
    }

    pub fn on_gesture(&mut self, doc: &mut SurfaceDocument, event: &GestureEvent) {
        if !self.options.filter.accepts(event) {
            debug!(?event, "gesture rejected by filter");
            return;
        }

        let current = self.transform;
        let next = match event.kind {
            // A press only arms the gesture; movement arrives as drags.
            GestureKind::MouseDown => return,
            GestureKind::Drag { dx, dy, .. } => Transform {
                x: current.x + dx,
                y: current.y + dy,
                k: current.k,
            },
            GestureKind::Wheel { factor } => Transform {
                k: self.options.scale_extent.clamp(current.k * factor),
                ..current
            },
            GestureKind::DoubleClick => {
                if !self.options.double_click_zoom {
                    return;
                }
                Transform {
                    k: self
                        .options
                        .scale_extent
                        .clamp(current.k * DOUBLE_CLICK_ZOOM_FACTOR),
                    ..current
                }
            }
        };

        self.apply(doc, next);
    }

    fn apply(&mut self, doc: &mut SurfaceDocument, next: Transform) {
        self.transform = next;
        // The document skips the write when the encoded value is unchanged,
        // so reapplying an identical transform has no observable effect.
        doc.set_transform(self.group, &next.to_attribute());
    }
}
