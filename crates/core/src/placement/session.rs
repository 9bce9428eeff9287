//! Interactive placement session for one product.
//!
//! [`PlacementSession`] owns the on-screen zone layout, the per-zone
//! transforms, the selection, and at most one active gesture (drag, resize
//! or rotate). Mouse and touch input go through the same [`PointerInput`]
//! so both produce identical math. Releasing the pointer is the only way a
//! gesture ends, and it always clears all gesture state.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use super::geometry::{zone_screen_rect, ContainerSize, Delimitation, ImageSize, ScreenRect, ZoneSize};
use super::numeric::{apply_numeric_edit, scale_for_box, NumericEdit};
use super::sizing::{default_transform, rendered_design_size};
use super::transform::{clamp_offset, normalize_rotation, DesignTransform};
use super::{PlacementConfig, TransformMap};

/// DOM key name that cancels the current selection.
pub const CANCEL_KEY: &str = "Escape";

/// One mockup image with its delimitation zones.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductView {
    pub image: ImageSize,
    pub delimitations: Vec<Delimitation>,
}

/// A pointer position in container pixels plus the shift modifier.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PointerInput {
    pub x: f64,
    pub y: f64,
    pub shift: bool,
}

impl PointerInput {
    pub fn mouse(x: f64, y: f64) -> Self {
        Self { x, y, shift: false }
    }

    pub fn with_shift(mut self) -> Self {
        self.shift = true;
        self
    }

    /// Touch input tracks the first finger only.
    pub fn from_touches(touches: &[(f64, f64)]) -> Option<Self> {
        touches.first().map(|&(x, y)| Self::mouse(x, y))
    }
}

/// The eight resize handles around a design box.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResizeHandle {
    TopLeft,
    Top,
    TopRight,
    Right,
    BottomRight,
    Bottom,
    BottomLeft,
    Left,
}

impl ResizeHandle {
    pub const ALL: [ResizeHandle; 8] = [
        Self::TopLeft,
        Self::Top,
        Self::TopRight,
        Self::Right,
        Self::BottomRight,
        Self::Bottom,
        Self::BottomLeft,
        Self::Left,
    ];

    /// Sign applied to the pointer delta on each axis; 0 means the axis is
    /// not resized by this handle.
    pub fn direction(self) -> (f64, f64) {
        match self {
            Self::TopLeft => (-1.0, -1.0),
            Self::Top => (0.0, -1.0),
            Self::TopRight => (1.0, -1.0),
            Self::Right => (1.0, 0.0),
            Self::BottomRight => (1.0, 1.0),
            Self::Bottom => (0.0, 1.0),
            Self::BottomLeft => (-1.0, 1.0),
            Self::Left => (-1.0, 0.0),
        }
    }

    pub fn is_corner(self) -> bool {
        let (dx, dy) = self.direction();
        dx != 0.0 && dy != 0.0
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum Gesture {
    Idle,
    Drag {
        zone: usize,
        start: (f64, f64),
        origin: (f64, f64),
    },
    Resize {
        zone: usize,
        handle: ResizeHandle,
        start: (f64, f64),
        start_box: (f64, f64),
    },
    Rotate {
        zone: usize,
        center: (f64, f64),
        start_angle: f64,
        origin_rotation: f64,
    },
}

fn angle_deg(center: (f64, f64), x: f64, y: f64) -> f64 {
    (y - center.1).atan2(x - center.0).to_degrees()
}

/// Placement state for one product across its views.
#[derive(Debug, Clone)]
pub struct PlacementSession {
    config: PlacementConfig,
    views: Vec<ProductView>,
    active_view: usize,
    design: ImageSize,
    container: ContainerSize,
    zones: Vec<ScreenRect>,
    transforms: TransformMap,
    selected: Option<usize>,
    numeric_panel_open: bool,
    aspect_locked: bool,
    gesture: Gesture,
    pending_move: Option<PointerInput>,
    changed: BTreeSet<usize>,
}

impl PlacementSession {
    /// Lay out the first view and give every zone the default transform.
    pub fn new(
        views: Vec<ProductView>,
        design: ImageSize,
        container: ContainerSize,
        config: PlacementConfig,
    ) -> Self {
        let mut session = Self {
            config,
            views,
            active_view: 0,
            design,
            container,
            zones: Vec::new(),
            transforms: TransformMap::new(),
            selected: None,
            numeric_panel_open: false,
            aspect_locked: true,
            gesture: Gesture::Idle,
            pending_move: None,
            changed: BTreeSet::new(),
        };
        session.layout();
        session.transforms = session.defaults();
        session
    }

    fn view_zones(&self, view: &ProductView) -> Vec<ScreenRect> {
        view.delimitations
            .iter()
            .map(|d| zone_screen_rect(d, view.image, self.container))
            .collect()
    }

    fn layout(&mut self) {
        self.zones = match self.views.get(self.active_view) {
            Some(view) => self.view_zones(view),
            None => Vec::new(),
        };
        for (&index, transform) in self.transforms.iter_mut() {
            if let Some(zone) = self.zones.get(index) {
                *transform = transform.constrained(zone.size(), &self.config);
            }
        }
    }

    /// Default transform for every zone of the active view, sized from the
    /// average zone across all views.
    pub fn defaults(&self) -> TransformMap {
        let all_zones: Vec<ZoneSize> = self
            .views
            .iter()
            .flat_map(|view| self.view_zones(view))
            .map(|rect| rect.size())
            .collect();
        let transform = default_transform(self.design, &all_zones, &self.config);
        (0..self.zones.len())
            .map(|i| (i, transform.constrained(self.zones[i].size(), &self.config)))
            .collect()
    }

    /// Overlay persisted transforms; zones without a saved value keep theirs.
    pub fn load_transforms(&mut self, saved: &TransformMap) {
        for (&index, transform) in saved {
            match self.zones.get(index) {
                Some(zone) => {
                    self.transforms
                        .insert(index, transform.constrained(zone.size(), &self.config));
                }
                None => {
                    self.transforms.insert(index, *transform);
                }
            }
        }
    }

    /// Put every zone back to the computed default.
    pub fn reset(&mut self) {
        self.cancel_gesture();
        self.transforms = self.defaults();
        self.changed.extend(self.transforms.keys().copied());
    }

    pub fn transforms(&self) -> &TransformMap {
        &self.transforms
    }

    pub fn transform(&self, zone: usize) -> Option<DesignTransform> {
        self.transforms.get(&zone).copied()
    }

    /// On-screen size of the artwork in `zone`: the design's natural aspect
    /// ratio fitted inside its design box.
    pub fn rendered_size(&self, zone: usize) -> Option<(f64, f64)> {
        let transform = self.transforms.get(&zone)?;
        let rect = self.zones.get(zone)?;
        Some(rendered_design_size(transform, rect.size(), self.design))
    }

    pub fn zones(&self) -> &[ScreenRect] {
        &self.zones
    }

    pub fn design_aspect(&self) -> f64 {
        self.design.aspect_ratio()
    }

    /// Zone indices modified since the last call.
    pub fn take_changes(&mut self) -> Vec<usize> {
        std::mem::take(&mut self.changed).into_iter().collect()
    }

    // -- layout changes ----------------------------------------------------

    /// Re-derive zone rectangles for a new container size. Scales are kept;
    /// offsets are re-clamped to the new zone sizes.
    pub fn resize_container(&mut self, container: ContainerSize) {
        self.container = container;
        self.layout();
    }

    /// Switch to another product view. Ends any gesture and selection.
    pub fn show_view(&mut self, index: usize) {
        if index >= self.views.len() {
            return;
        }
        self.cancel_gesture();
        self.deselect();
        self.active_view = index;
        self.layout();
        let defaults = self.defaults();
        for (index, transform) in defaults {
            self.transforms.entry(index).or_insert(transform);
        }
    }

    pub fn active_view(&self) -> usize {
        self.active_view
    }

    // -- selection ---------------------------------------------------------

    pub fn select(&mut self, zone: usize) {
        if zone < self.zones.len() {
            self.selected = Some(zone);
        }
    }

    pub fn deselect(&mut self) {
        self.selected = None;
        self.numeric_panel_open = false;
    }

    pub fn selected(&self) -> Option<usize> {
        self.selected
    }

    /// Click at a container position: selects the zone under the pointer, or
    /// deselects when clicking outside every zone.
    pub fn click(&mut self, x: f64, y: f64) {
        match self.zones.iter().position(|z| z.contains(x, y)) {
            Some(zone) => self.select(zone),
            None => self.deselect(),
        }
    }

    pub fn key_down(&mut self, key: &str) {
        if key == CANCEL_KEY {
            self.deselect();
        }
    }

    pub fn open_numeric_panel(&mut self) -> bool {
        self.numeric_panel_open = self.selected.is_some();
        self.numeric_panel_open
    }

    pub fn is_numeric_panel_open(&self) -> bool {
        self.numeric_panel_open
    }

    pub fn set_aspect_locked(&mut self, locked: bool) {
        self.aspect_locked = locked;
    }

    pub fn is_aspect_locked(&self) -> bool {
        self.aspect_locked
    }

    // -- gestures ----------------------------------------------------------

    pub fn is_gesture_active(&self) -> bool {
        self.gesture != Gesture::Idle
    }

    fn can_start(&self, zone: usize) -> bool {
        !self.is_gesture_active() && zone < self.zones.len() && self.transforms.contains_key(&zone)
    }

    pub fn begin_drag(&mut self, zone: usize, input: PointerInput) -> bool {
        if !self.can_start(zone) {
            return false;
        }
        let t = self.transforms[&zone];
        self.selected = Some(zone);
        self.gesture = Gesture::Drag {
            zone,
            start: (input.x, input.y),
            origin: (t.x, t.y),
        };
        true
    }

    pub fn begin_resize(&mut self, zone: usize, handle: ResizeHandle, input: PointerInput) -> bool {
        if !self.can_start(zone) {
            return false;
        }
        let start_box = self.transforms[&zone].design_box(self.zones[zone].size());
        self.selected = Some(zone);
        self.gesture = Gesture::Resize {
            zone,
            handle,
            start: (input.x, input.y),
            start_box,
        };
        true
    }

    pub fn begin_rotate(&mut self, zone: usize, input: PointerInput) -> bool {
        if !self.can_start(zone) {
            return false;
        }
        let center = self.zones[zone].center();
        self.selected = Some(zone);
        self.gesture = Gesture::Rotate {
            zone,
            center,
            start_angle: angle_deg(center, input.x, input.y),
            origin_rotation: self.transforms[&zone].rotation,
        };
        true
    }

    /// Apply a pointer move immediately. Returns the updated transform.
    pub fn pointer_move(&mut self, input: PointerInput) -> Option<DesignTransform> {
        let (zone, next) = match self.gesture {
            Gesture::Idle => return None,
            Gesture::Drag { zone, start, origin } => {
                let t = self.transforms.get(&zone)?;
                let (x, y) = clamp_offset(
                    origin.0 + (input.x - start.0),
                    origin.1 + (input.y - start.1),
                    self.zones.get(zone)?.size(),
                    t.design_scale,
                );
                (zone, DesignTransform { x, y, ..*t })
            }
            Gesture::Resize {
                zone,
                handle,
                start,
                start_box,
            } => {
                let t = self.transforms.get(&zone)?;
                let size = self.zones.get(zone)?.size();
                let (width, height) = self.resized_box(handle, start, start_box, input);
                let design_scale = scale_for_box(width, height, size, &self.config);
                (zone, DesignTransform { design_scale, ..*t }.constrained(size, &self.config))
            }
            Gesture::Rotate {
                zone,
                center,
                start_angle,
                origin_rotation,
            } => {
                let t = self.transforms.get(&zone)?;
                let mut rotation = origin_rotation + (angle_deg(center, input.x, input.y) - start_angle);
                if input.shift {
                    let snap = self.config.rotation_snap_deg;
                    rotation = (rotation / snap).round() * snap;
                }
                (
                    zone,
                    DesignTransform {
                        rotation: normalize_rotation(rotation),
                        ..*t
                    },
                )
            }
        };

        self.transforms.insert(zone, next);
        self.changed.insert(zone);
        Some(next)
    }

    fn resized_box(
        &self,
        handle: ResizeHandle,
        start: (f64, f64),
        start_box: (f64, f64),
        input: PointerInput,
    ) -> (f64, f64) {
        let (dir_x, dir_y) = handle.direction();
        let min = self.config.min_handle_size_px;

        let mut width = start_box.0;
        let mut height = start_box.1;
        if dir_x != 0.0 {
            width = (start_box.0 + dir_x * (input.x - start.0)).max(min);
        }
        if dir_y != 0.0 {
            height = (start_box.1 + dir_y * (input.y - start.1)).max(min);
        }

        if self.aspect_locked {
            let aspect = self.design_aspect();
            if dir_x != 0.0 {
                height = width / aspect;
            } else {
                width = height * aspect;
            }
        }
        (width, height)
    }

    /// Coalesce a pointer move until the next animation frame.
    pub fn queue_pointer_move(&mut self, input: PointerInput) {
        if self.is_gesture_active() {
            self.pending_move = Some(input);
        }
    }

    /// Apply the most recent queued move, if any.
    pub fn animation_frame(&mut self) -> Option<DesignTransform> {
        let input = self.pending_move.take()?;
        self.pointer_move(input)
    }

    /// End the gesture: drops any queued frame and returns to idle.
    pub fn pointer_up(&mut self) {
        self.cancel_gesture();
    }

    fn cancel_gesture(&mut self) {
        self.pending_move = None;
        self.gesture = Gesture::Idle;
    }

    // -- numeric panel -----------------------------------------------------

    /// Apply a numeric edit to the selected zone.
    pub fn numeric_edit(&mut self, edit: NumericEdit) -> Option<DesignTransform> {
        let zone = self.selected?;
        let size = self.zones.get(zone)?.size();
        let current = self.transforms.get(&zone)?;
        let next = apply_numeric_edit(
            current,
            size,
            edit,
            self.design_aspect(),
            self.aspect_locked,
            &self.config,
        );
        self.transforms.insert(zone, next);
        self.changed.insert(zone);
        Some(next)
    }
}
