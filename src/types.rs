// Strong typing over raw numbers. Newtypes for time, identities and pixel units.
// Everything here crosses the JS boundary as JSON, so it all derives serde.

use std::fmt;
use std::ops::Add;
use std::sync::atomic::{AtomicU32, Ordering};

use serde::{Deserialize, Serialize};

/// Milliseconds on the host's monotonic clock. Newtype for type safety.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Default,
)]
#[serde(transparent)]
pub struct Millis(u64);

impl Millis {
    pub const ZERO: Millis = Millis(0);

    pub const fn new(ms: u64) -> Self {
        Millis(ms)
    }

    pub fn as_u64(&self) -> u64 {
        self.0
    }

    pub fn is_zero(&self) -> bool {
        self.0 == 0
    }

    /// Scale by a ratio, rounding to the nearest millisecond. Negative results floor at zero.
    pub fn scaled(&self, ratio: f64) -> Millis {
        Millis((self.0 as f64 * ratio).round().max(0.0) as u64)
    }
}

impl Add for Millis {
    type Output = Millis;

    fn add(self, rhs: Millis) -> Millis {
        Millis(self.0.saturating_add(rhs.0))
    }
}

static NEXT_GALLERY_ID: AtomicU32 = AtomicU32::new(1);

/// Identity of one gallery container.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct GalleryId(u32);

impl GalleryId {
    /// Allocate a fresh, process-unique gallery id.
    pub fn next() -> Self {
        GalleryId(NEXT_GALLERY_ID.fetch_add(1, Ordering::Relaxed))
    }

    pub fn as_u32(&self) -> u32 {
        self.0
    }
}

/// Handle of one image group inside a gallery. Never reused within a gallery.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct GroupId(u32);

impl GroupId {
    pub fn new(id: u32) -> Self {
        GroupId(id)
    }

    pub fn as_u32(&self) -> u32 {
        self.0
    }

    pub(crate) fn slot(&self) -> usize {
        self.0 as usize
    }
}

impl fmt::Display for GroupId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Width/height pair in CSS pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub struct Dim {
    pub width: u32,
    pub height: u32,
}

impl Dim {
    pub const ZERO: Dim = Dim {
        width: 0,
        height: 0,
    };

    pub fn new(width: u32, height: u32) -> Self {
        Dim { width, height }
    }

    /// Componentwise maximum.
    pub fn max(self, other: Dim) -> Dim {
        Dim {
            width: self.width.max(other.width),
            height: self.height.max(other.height),
        }
    }

    /// Per-axis clamp. `min` wins when an axis has `min > max`.
    pub fn clamp(self, min: Dim, max: Dim) -> Dim {
        Dim {
            width: clamp_axis(self.width, min.width, max.width),
            height: clamp_axis(self.height, min.height, max.height),
        }
    }

    /// Margins that keep a box of this size centred on its anchor point.
    pub fn centering_offsets(&self) -> Offsets {
        Offsets {
            x: -((self.width / 2) as i32),
            y: -((self.height / 2) as i32),
        }
    }

    pub fn fits_within(&self, other: Dim) -> bool {
        self.width <= other.width && self.height <= other.height
    }
}

fn clamp_axis(value: u32, min: u32, max: u32) -> u32 {
    if value < min {
        min
    } else if value > max {
        max
    } else {
        value
    }
}

/// Centering margins (negative half-extent per axis).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct Offsets {
    pub x: i32,
    pub y: i32,
}

/// Pointer position in page coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, Default)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub fn new(x: f64, y: f64) -> Self {
        Point { x, y }
    }

    pub fn manhattan(&self, other: &Point) -> f64 {
        (self.x - other.x).abs() + (self.y - other.y).abs()
    }
}

/// Browser viewport size and scroll position.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Viewport {
    pub width: u32,
    pub height: u32,
    #[serde(default)]
    pub scroll_x: i32,
    #[serde(default)]
    pub scroll_y: i32,
}

impl Viewport {
    pub fn size(&self) -> Dim {
        Dim::new(self.width, self.height)
    }
}

impl Default for Viewport {
    fn default() -> Self {
        Viewport {
            width: 320,
            height: 480,
            scroll_x: 0,
            scroll_y: 0,
        }
    }
}

/// Rotation phase of one group.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum RotateState {
    /// No rotation timer is live.
    #[default]
    Idle,
    Playing,
    Paused,
}

/// Image swap effect used on every rotation tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum TransitionKind {
    None,
    #[default]
    Fade,
}

/// Whether hover or tap interaction drives expansion.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum TouchMode {
    /// Decided by the device capability query.
    #[default]
    Auto,
    On,
    Off,
}

/// Easing curve names understood by the rendering adapter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum Easing {
    Linear,
    #[default]
    Swing,
}

/// Load progress of one image.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum LoadState {
    #[default]
    Pending,
    Loaded,
    Errored,
}

/// Class-equivalent markers toggled on rendering elements.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Marker {
    #[serde(rename = "shown")]
    Shown,
    #[serde(rename = "last-shown")]
    LastShown,
    #[serde(rename = "expanded")]
    Expanded,
    #[serde(rename = "paused")]
    Paused,
    #[serde(rename = "loading")]
    Loading,
    #[serde(rename = "touch")]
    Touch,
}

impl Marker {
    pub fn as_class(&self) -> &'static str {
        match self {
            Marker::Shown => "shown",
            Marker::LastShown => "last-shown",
            Marker::Expanded => "expanded",
            Marker::Paused => "paused",
            Marker::Loading => "loading",
            Marker::Touch => "touch",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OverlayPart {
    Top,
    Bottom,
}

/// Addressable rendering element.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ElementRef {
    Container,
    Body,
    Window,
    /// The list item that owns a group.
    Item { group: GroupId },
    /// The crop/expansion wrapper of a group.
    Wrap { group: GroupId },
    Image { group: GroupId, index: usize },
    Overlay { group: GroupId, part: OverlayPart },
    RotateButton { group: GroupId },
    Count { group: GroupId },
    Caption { group: GroupId },
}

impl ElementRef {
    pub fn group(&self) -> Option<GroupId> {
        match self {
            ElementRef::Container | ElementRef::Body | ElementRef::Window => None,
            ElementRef::Item { group }
            | ElementRef::Wrap { group }
            | ElementRef::Image { group, .. }
            | ElementRef::Overlay { group, .. }
            | ElementRef::RotateButton { group }
            | ElementRef::Count { group }
            | ElementRef::Caption { group } => Some(*group),
        }
    }
}
