// Touch mode: tap-to-expand into a full-viewport overlay.
// One session is active at a time across the gallery. The manager owns the
// viewport-level concerns (orientation, scroll-to-top, overlay auto-fade).

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::animation::AnimationTracker;
use crate::commands::{AnimationTarget, Command, CommandBuffer, Geometry};
use crate::config::AnimationSpec;
use crate::scheduler::{Scheduler, Task, TaskId};
use crate::types::{
    Dim, Easing, ElementRef, GroupId, Millis, OverlayPart, RotateState, TouchMode, Viewport,
};

/// Duration of the short fades (jQuery's `'fast'`).
pub const FAST_FADE: Millis = Millis::new(200);
/// Suppression window for the scroll event an orientation change may trigger.
pub const ORIENTATION_SETTLE: Millis = Millis::new(500);
/// Delay before asking the host to hide the mobile address bar.
pub const ADDRESS_BAR_DELAY: Millis = Millis::new(100);
/// Wrap opacity a repositioned overlay fades in from.
const FADE_IN_FROM: f32 = 0.4;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum Platform {
    Ios,
    Android,
    Desktop,
    #[default]
    Other,
}

/// Device description reported by the host at init.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct DeviceClass {
    pub platform: Platform,
    pub major_version: Option<u32>,
    /// `ontouchstart` exists on the window.
    pub touch_capable: bool,
}

/// Capability query used instead of platform sniffing inside the engine.
pub trait DeviceCapabilities: fmt::Debug {
    fn supports_touch(&self) -> bool;

    /// Tapping the status bar scrolls to the top; treated as a request to close.
    fn collapses_on_scroll_to_top(&self) -> bool;

    /// `position: fixed` is unreliable, so overlays must follow the scroll offset.
    fn lacks_fixed_positioning(&self) -> bool;
}

impl DeviceCapabilities for DeviceClass {
    fn supports_touch(&self) -> bool {
        self.touch_capable
    }

    fn collapses_on_scroll_to_top(&self) -> bool {
        self.platform == Platform::Ios
    }

    fn lacks_fixed_positioning(&self) -> bool {
        self.platform == Platform::Ios && self.major_version.map_or(true, |major| major < 5)
    }
}

/// Element hit by a tap.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum TapTarget {
    RotateButton { group: GroupId },
    BackButton { group: GroupId },
    Image { group: GroupId, index: usize },
    Wrap { group: GroupId },
    Outside,
}

impl TapTarget {
    pub fn group(&self) -> Option<GroupId> {
        match *self {
            TapTarget::RotateButton { group }
            | TapTarget::BackButton { group }
            | TapTarget::Image { group, .. }
            | TapTarget::Wrap { group } => Some(group),
            TapTarget::Outside => None,
        }
    }
}

/// What a tap on an expanded session should do.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TouchAction {
    Ignore,
    TogglePlayPause,
    Collapse,
    ShowTopOverlay,
    FollowLink { index: usize },
}

/// Geometry of the expanded wrap and its image.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TouchLayout {
    pub wrap: Geometry,
    pub image: Geometry,
    pub image_size: Dim,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TouchSession {
    pub group: GroupId,
    pub top_overlay_visible: bool,
    overlay_fade: Option<TaskId>,
    orientation_reset: Option<TaskId>,
    orientation_just_changed: bool,
}

impl TouchSession {
    fn new(group: GroupId) -> Self {
        TouchSession {
            group,
            top_overlay_visible: false,
            overlay_fade: None,
            orientation_reset: None,
            orientation_just_changed: false,
        }
    }
}

#[derive(Debug)]
pub struct TouchManager {
    enabled: bool,
    device: Box<dyn DeviceCapabilities>,
    viewport: Viewport,
    session: Option<TouchSession>,
}

impl TouchManager {
    pub fn new(mode: TouchMode, device: Box<dyn DeviceCapabilities>, viewport: Viewport) -> Self {
        let enabled = match mode {
            TouchMode::On => true,
            TouchMode::Off => false,
            TouchMode::Auto => device.supports_touch(),
        };
        TouchManager {
            enabled,
            device,
            viewport,
            session: None,
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    pub fn viewport(&self) -> Viewport {
        self.viewport
    }

    pub fn session(&self) -> Option<&TouchSession> {
        self.session.as_ref()
    }

    pub fn active_group(&self) -> Option<GroupId> {
        self.session.as_ref().map(|session| session.group)
    }

    /// Open a session for `group`. The caller collapses any previous one first.
    pub fn begin(&mut self, group: GroupId, scheduler: &mut Scheduler) {
        if self.session.is_some() {
            self.end(scheduler);
        }
        tracing::debug!(group = %group, "touch session started");
        self.session = Some(TouchSession::new(group));
    }

    /// Close the session, cancelling its timers.
    pub fn end(&mut self, scheduler: &mut Scheduler) -> Option<TouchSession> {
        let session = self.session.take()?;
        for task in [session.overlay_fade, session.orientation_reset].into_iter().flatten() {
            scheduler.cancel(task);
        }
        tracing::debug!(group = %session.group, "touch session ended");
        Some(session)
    }

    /// Show the top overlay, optionally fading it out after `fade_after`.
    pub fn show_top_overlay(
        &mut self,
        fade_in: Millis,
        fade_after: Option<Millis>,
        scheduler: &mut Scheduler,
        out: &mut CommandBuffer,
    ) {
        let Some(session) = self.session.as_mut() else {
            return;
        };
        if let Some(task) = session.overlay_fade.take() {
            scheduler.cancel(task);
        }
        out.push(Command::ShowOverlay {
            group: session.group,
            part: OverlayPart::Top,
            fade_ms: fade_in,
        });
        session.top_overlay_visible = true;
        if let Some(delay) = fade_after.filter(|delay| !delay.is_zero()) {
            session.overlay_fade = Some(scheduler.schedule_after(delay, Task::OverlayFade(session.group)));
        }
    }

    /// The auto-fade timer fired.
    pub fn on_overlay_fade(&mut self, task: TaskId, out: &mut CommandBuffer) {
        let Some(session) = self.session.as_mut() else {
            return;
        };
        if session.overlay_fade != Some(task) {
            return;
        }
        session.overlay_fade = None;
        if session.top_overlay_visible {
            session.top_overlay_visible = false;
            out.push(Command::HideOverlay {
                group: session.group,
                part: OverlayPart::Top,
                fade_ms: Some(FAST_FADE),
            });
        }
    }

    /// Decide what a tap does while a session is active.
    pub fn classify_tap(&self, target: TapTarget, rotate_state: RotateState, loading_visible: bool) -> TouchAction {
        let Some(session) = self.session.as_ref() else {
            return TouchAction::Ignore;
        };
        let own = target.group() == Some(session.group);

        match target {
            TapTarget::RotateButton { .. } if own => TouchAction::TogglePlayPause,
            TapTarget::BackButton { .. } if own => TouchAction::Collapse,
            TapTarget::Image { index, .. } if own && session.top_overlay_visible => {
                TouchAction::FollowLink { index }
            }
            TapTarget::Outside | TapTarget::Wrap { .. } if loading_visible => TouchAction::Collapse,
            _ if rotate_state == RotateState::Paused => TouchAction::Ignore,
            _ => TouchAction::ShowTopOverlay,
        }
    }

    /// Full-viewport layout for an image of `image` intrinsic size. The image is
    /// scaled down to fit with its aspect ratio kept, then centred.
    pub fn layout(&self, image: Dim) -> TouchLayout {
        let viewport = self.viewport;
        let (left, top) = if self.device.lacks_fixed_positioning() {
            (viewport.scroll_x, viewport.scroll_y)
        } else {
            (0, 0)
        };

        let image_size = fit_within(image, viewport.size());
        TouchLayout {
            wrap: Geometry::fixed(viewport.size(), left, top),
            image: Geometry::centered(image_size, image_size.centering_offsets()),
            image_size,
        }
    }

    /// Position the expanded wrap and the displayed image.
    pub fn position(
        &self,
        group: GroupId,
        index: usize,
        image: Dim,
        fade: bool,
        animations: &mut AnimationTracker,
        out: &mut CommandBuffer,
    ) {
        let layout = self.layout(image);
        let wrap = ElementRef::Wrap { group };
        out.geometry(wrap, layout.wrap);
        if fade {
            out.opacity(wrap, FADE_IN_FROM);
            animations.start(
                wrap,
                AnimationTarget::Opacity(1.0),
                AnimationSpec {
                    duration: FAST_FADE,
                    easing: Easing::Swing,
                },
                None,
                out,
            );
        }
        out.geometry(ElementRef::Image { group, index }, layout.image);
    }

    /// Record the new viewport. Returns the group to reposition, if any.
    pub fn on_orientation_change(&mut self, viewport: Viewport, scheduler: &mut Scheduler) -> Option<GroupId> {
        self.viewport = viewport;
        let session = self.session.as_mut()?;
        session.orientation_just_changed = true;
        if let Some(task) = session.orientation_reset.take() {
            scheduler.cancel(task);
        }
        session.orientation_reset = Some(scheduler.schedule_after(ORIENTATION_SETTLE, Task::OrientationSettle));
        Some(session.group)
    }

    pub fn on_orientation_settle(&mut self, task: TaskId) {
        if let Some(session) = self.session.as_mut() {
            if session.orientation_reset == Some(task) {
                session.orientation_reset = None;
                session.orientation_just_changed = false;
            }
        }
    }

    /// Record the scroll offset. Returns true when the scroll is a genuine
    /// scroll-to-top that should collapse the session.
    pub fn on_scroll(&mut self, x: i32, y: i32) -> bool {
        self.viewport.scroll_x = x;
        self.viewport.scroll_y = y;
        let Some(session) = self.session.as_mut() else {
            return false;
        };
        if session.orientation_just_changed {
            session.orientation_just_changed = false;
            return false;
        }
        self.device.collapses_on_scroll_to_top() && y == 0
    }
}

/// Scale `image` down to fit `bounds`, keeping its aspect ratio. Never upscales.
pub fn fit_within(image: Dim, bounds: Dim) -> Dim {
    if image.width == 0 || image.height == 0 || image.fits_within(bounds) {
        return image;
    }
    let scale = (bounds.width as f64 / image.width as f64).min(bounds.height as f64 / image.height as f64);
    Dim::new(
        (image.width as f64 * scale).round() as u32,
        (image.height as f64 * scale).round() as u32,
    )
}
