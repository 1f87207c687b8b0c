// Commands the engine emits for the JS rendering adapter, plus state-change notifications.
// The adapter applies them in order; the engine never touches the DOM itself.

use serde::{Deserialize, Serialize};

use crate::types::{
    Dim, Easing, ElementRef, GroupId, Marker, Millis, Offsets, OverlayPart, RotateState,
};

/// Id of an adapter-run animation. The adapter reports it back on completion.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AnimationId(u64);

impl AnimationId {
    pub fn new(id: u64) -> Self {
        AnimationId(id)
    }

    pub fn as_u64(&self) -> u64 {
        self.0
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "unit", content = "value", rename_all = "snake_case")]
pub enum Length {
    Px(i32),
    Percent(u8),
    Auto,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Position {
    Absolute,
    Fixed,
}

/// Box geometry for one element.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Geometry {
    pub position: Position,
    pub top: Length,
    pub left: Length,
    pub width: Length,
    pub height: Length,
    pub margin_top: i32,
    pub margin_left: i32,
}

impl Geometry {
    /// Box of `size` centred on its parent's midpoint.
    pub fn centered(size: Dim, offsets: Offsets) -> Geometry {
        Geometry {
            position: Position::Absolute,
            top: Length::Percent(50),
            left: Length::Percent(50),
            width: px(size.width),
            height: px(size.height),
            margin_top: offsets.y,
            margin_left: offsets.x,
        }
    }

    /// Box filling its parent: the cropped, collapsed state of a group.
    pub fn fill() -> Geometry {
        Geometry {
            position: Position::Absolute,
            top: Length::Px(0),
            left: Length::Px(0),
            width: Length::Percent(100),
            height: Length::Percent(100),
            margin_top: 0,
            margin_left: 0,
        }
    }

    /// Viewport-sized box pinned at `(left, top)`.
    pub fn fixed(size: Dim, left: i32, top: i32) -> Geometry {
        Geometry {
            position: Position::Fixed,
            top: Length::Px(top),
            left: Length::Px(left),
            width: px(size.width),
            height: px(size.height),
            margin_top: 0,
            margin_left: 0,
        }
    }

    pub fn width_px(&self) -> Option<i32> {
        match self.width {
            Length::Px(value) => Some(value),
            _ => None,
        }
    }

    pub fn height_px(&self) -> Option<i32> {
        match self.height {
            Length::Px(value) => Some(value),
            _ => None,
        }
    }
}

fn px(value: u32) -> Length {
    Length::Px(value.min(i32::MAX as u32) as i32)
}

/// Property an animation drives towards.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum AnimationTarget {
    Geometry(Geometry),
    Opacity(f32),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NavigationMode {
    /// `_blank` links open in the current window instead.
    OpenSelf,
    /// Replace the current location.
    Replace,
}

/// State-change notifications for the host application.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "name", rename_all = "snake_case")]
pub enum GalleryEvent {
    Expanded { group: GroupId },
    Shrunk { group: GroupId },
    Rotated {
        group: GroupId,
        index: usize,
        human_step: u32,
    },
    RotateStateChanged { group: GroupId, state: RotateState },
    Destroyed,
}

/// One instruction for the rendering adapter.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Command {
    ApplyGeometry {
        element: ElementRef,
        geometry: Geometry,
    },
    Animate {
        id: AnimationId,
        element: ElementRef,
        target: AnimationTarget,
        duration_ms: Millis,
        easing: Easing,
    },
    /// Stop immediately and jump to the end state. No completion is reported.
    CancelAnimation { element: ElementRef },
    SetOpacity { element: ElementRef, value: f32 },
    SetVisible { element: ElementRef, visible: bool },
    AddMarker { element: ElementRef, marker: Marker },
    RemoveMarker { element: ElementRef, marker: Marker },
    SetText { element: ElementRef, text: String },
    ShowOverlay {
        group: GroupId,
        part: OverlayPart,
        fade_ms: Millis,
    },
    HideOverlay {
        group: GroupId,
        part: OverlayPart,
        fade_ms: Option<Millis>,
    },
    SetSource { element: ElementRef, src: String },
    SetBodyScroll { locked: bool },
    /// Start listening for orientation, scroll and body touches.
    BindViewport,
    UnbindViewport,
    ScrollTo { x: i32, y: i32 },
    Navigate { href: String, mode: NavigationMode },
    InvokeOnclick { element: ElementRef },
    /// Drop every listener bound for a group.
    UnbindGroup { group: GroupId },
    Notify { event: GalleryEvent },
}

/// Ordered list of commands produced by one engine call.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct CommandBuffer {
    commands: Vec<Command>,
}

impl CommandBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, command: Command) {
        self.commands.push(command);
    }

    pub fn append(&mut self, other: &mut CommandBuffer) {
        self.commands.append(&mut other.commands);
    }

    pub fn geometry(&mut self, element: ElementRef, geometry: Geometry) {
        self.push(Command::ApplyGeometry { element, geometry });
    }

    pub fn opacity(&mut self, element: ElementRef, value: f32) {
        self.push(Command::SetOpacity { element, value });
    }

    pub fn visible(&mut self, element: ElementRef, visible: bool) {
        self.push(Command::SetVisible { element, visible });
    }

    pub fn add_marker(&mut self, element: ElementRef, marker: Marker) {
        self.push(Command::AddMarker { element, marker });
    }

    pub fn remove_marker(&mut self, element: ElementRef, marker: Marker) {
        self.push(Command::RemoveMarker { element, marker });
    }

    pub fn text(&mut self, element: ElementRef, text: impl Into<String>) {
        self.push(Command::SetText {
            element,
            text: text.into(),
        });
    }

    pub fn notify(&mut self, event: GalleryEvent) {
        self.push(Command::Notify { event });
    }

    pub fn commands(&self) -> &[Command] {
        &self.commands
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Command> {
        self.commands.iter()
    }

    pub fn len(&self) -> usize {
        self.commands.len()
    }

    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }

    pub fn into_vec(self) -> Vec<Command> {
        self.commands
    }

    /// Notifications in emission order.
    pub fn events(&self) -> Vec<&GalleryEvent> {
        self.commands
            .iter()
            .filter_map(|command| match command {
                Command::Notify { event } => Some(event),
                _ => None,
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn centered_geometry_uses_offsets() {
        let size = Dim::new(300, 200);
        let geometry = Geometry::centered(size, size.centering_offsets());
        assert_eq!(geometry.width_px(), Some(300));
        assert_eq!(geometry.margin_left, -150);
        assert_eq!(geometry.margin_top, -100);
        assert_eq!(geometry.top, Length::Percent(50));
    }

    #[test]
    fn command_json_is_tagged() {
        let command = Command::AddMarker {
            element: ElementRef::Wrap {
                group: GroupId::new(2),
            },
            marker: Marker::Expanded,
        };
        let json = serde_json::to_string(&command).unwrap();
        assert_eq!(
            json,
            r#"{"type":"add_marker","element":{"kind":"wrap","group":2},"marker":"expanded"}"#
        );
    }

    #[test]
    fn buffer_collects_events() {
        let mut out = CommandBuffer::new();
        out.push(Command::BindViewport);
        out.notify(GalleryEvent::Destroyed);
        assert_eq!(out.len(), 2);
        assert_eq!(out.events(), vec![&GalleryEvent::Destroyed]);
    }
}
