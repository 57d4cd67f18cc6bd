//! Anchor layout of the mockup template.
//!
//! The background template shows six pairs of slippers, each pair with a
//! packaging label. The logo is centred on every slipper strap (12 anchors)
//! and on every label (6 anchors), each group with its own bounding box.
//!
//! The layout is a constant of the template: it is built once with
//! [`AnchorLayout::standard`] and never mutated.

use crate::constants::{LABEL_BOX, SLIPPER_BOX};

/// Centre point of one logo placement on the background
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Anchor {
    pub x: i32,
    pub y: i32,
}

impl Anchor {
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }
}

/// Top-left corner where an overlay is pasted. May be negative or past the
/// background edges; the compositor clips.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PlacementPosition {
    pub x: i32,
    pub y: i32,
}

impl PlacementPosition {
    pub fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }
}

/// Largest size a logo variant may occupy
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BoundingBox {
    pub max_width: u32,
    pub max_height: u32,
}

impl BoundingBox {
    pub const fn new(max_width: u32, max_height: u32) -> Self {
        Self {
            max_width,
            max_height,
        }
    }

    pub fn contains(&self, width: u32, height: u32) -> bool {
        width <= self.max_width && height <= self.max_height
    }
}

/// One size class of placements: a bounding box and the anchors it applies to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AnchorGroup {
    pub name: &'static str,
    pub bounds: BoundingBox,
    pub anchors: &'static [Anchor],
}

const SLIPPER_ANCHORS: [Anchor; 12] = [
    // Pair 1
    Anchor::new(306, 330),
    Anchor::new(487, 330),
    // Pair 2
    Anchor::new(897, 330),
    Anchor::new(1077, 330),
    // Pair 3
    Anchor::new(1533, 330),
    Anchor::new(1716, 330),
    // Pair 4
    Anchor::new(307, 789),
    Anchor::new(487, 789),
    // Pair 5
    Anchor::new(895, 789),
    Anchor::new(1077, 789),
    // Pair 6
    Anchor::new(1533, 789),
    Anchor::new(1713, 789),
];

const LABEL_ANCHORS: [Anchor; 6] = [
    Anchor::new(154, 367),
    Anchor::new(738, 367),
    Anchor::new(1377, 367),
    Anchor::new(154, 825),
    Anchor::new(738, 825),
    Anchor::new(1377, 825),
];

/// Fixed placement layout: slipper anchors are composited first, then labels
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AnchorLayout {
    pub slipper: AnchorGroup,
    pub label: AnchorGroup,
}

impl AnchorLayout {
    /// The layout of the production background template
    pub const fn standard() -> Self {
        Self {
            slipper: AnchorGroup {
                name: "slipper",
                bounds: BoundingBox::new(SLIPPER_BOX.0, SLIPPER_BOX.1),
                anchors: &SLIPPER_ANCHORS,
            },
            label: AnchorGroup {
                name: "label",
                bounds: BoundingBox::new(LABEL_BOX.0, LABEL_BOX.1),
                anchors: &LABEL_ANCHORS,
            },
        }
    }

    /// Groups in compositing order
    pub fn passes(&self) -> [&AnchorGroup; 2] {
        [&self.slipper, &self.label]
    }

    /// Total number of placements across all groups
    pub fn placement_count(&self) -> usize {
        self.passes().iter().map(|group| group.anchors.len()).sum()
    }
}

impl Default for AnchorLayout {
    fn default() -> Self {
        Self::standard()
    }
}

/// Top-left paste origin that centres a `width`×`height` overlay on `anchor`.
///
/// Uses integer floor division on the overlay size, so odd sizes shift the
/// overlay half a pixel towards the top-left.
pub fn centered_origin(anchor: Anchor, width: u32, height: u32) -> PlacementPosition {
    PlacementPosition::new(
        anchor.x - (width / 2) as i32,
        anchor.y - (height / 2) as i32,
    )
}
