// Per-gallery context. Owns every group, the timer queue and the interaction
// state, and turns host events into rendering commands.
// Handlers for a group only ever mutate that group's state.

use std::collections::HashMap;

use crate::animation::{AnimationTracker, Completion};
use crate::commands::{AnimationId, AnimationTarget, Command, CommandBuffer, GalleryEvent, Geometry, NavigationMode};
use crate::config::GalleryConfig;
use crate::error::{Anomaly, GalleryError};
use crate::events::{HostEvent, HostEventBatch};
use crate::expansion::{collapsed_geometry, compute_expansion};
use crate::gesture::{HoverIntent, IntentSignal};
use crate::group::{ImageGroup, ImageRef, ImageSpec};
use crate::rotation::{RotationEngine, StartOutcome, TickOutcome};
use crate::scheduler::{Scheduler, Task, TaskId};
use crate::store::{GroupState, GroupStore};
use crate::touch::{DeviceCapabilities, TapTarget, TouchAction, TouchManager, ADDRESS_BAR_DELAY, FAST_FADE};
use crate::transition::{clear_outgoing, run_transition};
use crate::types::{
    Dim, ElementRef, GalleryId, GroupId, LoadState, Marker, Millis, OverlayPart, Point, RotateState,
    Viewport,
};

pub struct Gallery {
    id: GalleryId,
    config: GalleryConfig,
    store: GroupStore,
    scheduler: Scheduler,
    rotation: RotationEngine,
    gestures: HashMap<GroupId, HoverIntent>,
    animations: AnimationTracker,
    touch: TouchManager,
    destroyed: bool,
}

impl Gallery {
    /// Set up a gallery. Touch-mode setup commands are written to `out`.
    pub fn new(
        config: GalleryConfig,
        device: Box<dyn DeviceCapabilities>,
        viewport: Viewport,
        now: Millis,
        out: &mut CommandBuffer,
    ) -> Gallery {
        let touch = TouchManager::new(config.touch_mode, device, viewport);
        let mut scheduler = Scheduler::new(now);
        if touch.is_enabled() {
            out.add_marker(ElementRef::Container, Marker::Touch);
            scheduler.schedule_after(ADDRESS_BAR_DELAY, Task::HideAddressBar);
        }

        let id = GalleryId::next();
        tracing::debug!(gallery = id.as_u32(), touch = touch.is_enabled(), "gallery initialized");

        Gallery {
            id,
            rotation: RotationEngine::new(config.rotate_speed, config.first_tick_interval()),
            config,
            store: GroupStore::new(),
            scheduler,
            gestures: HashMap::new(),
            animations: AnimationTracker::new(),
            touch,
            destroyed: false,
        }
    }

    pub fn id(&self) -> GalleryId {
        self.id
    }

    pub fn config(&self) -> &GalleryConfig {
        &self.config
    }

    pub fn touch_enabled(&self) -> bool {
        self.touch.is_enabled()
    }

    pub fn is_destroyed(&self) -> bool {
        self.destroyed
    }

    pub fn group(&self, group: GroupId) -> Option<&ImageGroup> {
        self.store.group(group)
    }

    pub fn group_state(&self, group: GroupId) -> Option<&GroupState> {
        self.store.state(group)
    }

    /// Due time of the next timer, so the host knows when to call back.
    pub fn next_due(&self) -> Option<Millis> {
        self.scheduler.next_due()
    }

    /// Register an image group and emit its cropped initial layout.
    pub fn add_group(&mut self, images: Vec<ImageSpec>, out: &mut CommandBuffer) -> Result<GroupId, GalleryError> {
        if self.destroyed {
            return Err(GalleryError::Destroyed);
        }
        if images.is_empty() {
            return Err(GalleryError::EmptyGroup);
        }

        let images = images.into_iter().map(ImageRef::from_spec).collect();
        let id = self.store.insert(self.id, images);
        if !self.touch.is_enabled() {
            self.gestures.insert(id, HoverIntent::new(id, self.config.hover_intent));
        }
        if let Some(group) = self.store.group(id) {
            emit_cropped_layout(group, self.touch.is_enabled(), out);
            tracing::debug!(group = %id, images = group.len(), real = group.real_count(), "group registered");
        }
        Ok(id)
    }

    /// Run due timers, apply the batch's events, then run anything they made due.
    pub fn handle_batch(&mut self, batch: HostEventBatch, out: &mut CommandBuffer) {
        self.advance_to(batch.now, out);
        for event in batch.events {
            self.handle(event, out);
        }
        self.advance_to(batch.now, out);
    }

    /// Fire every timer due at or before `now`, in due order.
    pub fn advance_to(&mut self, now: Millis, out: &mut CommandBuffer) {
        if !self.destroyed {
            while let Some((id, task)) = self.scheduler.pop_due(now) {
                self.run_task(id, task, out);
            }
        }
        self.scheduler.set_now(now);
    }

    pub fn handle(&mut self, event: HostEvent, out: &mut CommandBuffer) {
        if self.destroyed {
            return;
        }
        match event {
            HostEvent::PointerEnter { group, x, y } => {
                if let Some(intent) = self.gestures.get_mut(&group) {
                    intent.on_enter(Point::new(x, y), &mut self.scheduler);
                }
            }
            HostEvent::PointerMove { group, x, y } => {
                if let Some(intent) = self.gestures.get_mut(&group) {
                    intent.on_move(Point::new(x, y));
                }
            }
            HostEvent::PointerLeave { group, x, y } => {
                if let Some(intent) = self.gestures.get_mut(&group) {
                    intent.on_leave(Point::new(x, y), &mut self.scheduler);
                }
            }
            HostEvent::Tap { target } => self.tap(target, out),
            HostEvent::ImageLoaded {
                group,
                index,
                width,
                height,
            } => self.image_loaded(group, index, Dim::new(width, height), out),
            HostEvent::ImageFailed { group, index } => self.image_failed(group, index, out),
            HostEvent::AnimationComplete { id } => self.animation_complete(id, out),
            HostEvent::OrientationChange { viewport } => self.orientation_change(viewport, out),
            HostEvent::Scroll { x, y } => {
                if self.touch.on_scroll(x, y) {
                    if let Some(group) = self.touch.active_group() {
                        tracing::debug!(group = %group, "scrolled to top, collapsing");
                        self.shrink(group, out);
                    }
                }
            }
        }
    }

    /// Expand a group: full-viewport in touch mode, otherwise in place.
    pub fn expand(&mut self, group: GroupId, out: &mut CommandBuffer) {
        if self.destroyed {
            return;
        }
        if self.touch.is_enabled() {
            self.touch_expand(group, out);
        } else {
            self.hover_expand(group, out);
        }
    }

    /// Stop rotating and return a group to its cropped first image.
    pub fn shrink(&mut self, group: GroupId, out: &mut CommandBuffer) {
        if self.destroyed {
            return;
        }
        let pending_expand = self.animations.has_pending_expand(group);
        let Gallery {
            config,
            store,
            scheduler,
            rotation,
            gestures,
            animations,
            touch,
            ..
        } = self;
        let Some((images, state)) = store.entry(group) else {
            return;
        };

        if let Some(intent) = gestures.get_mut(&group) {
            intent.cancel(scheduler);
        }
        if rotation.stop(group, state, scheduler) {
            out.remove_marker(ElementRef::RotateButton { group }, Marker::Paused);
            out.notify(GalleryEvent::RotateStateChanged {
                group,
                state: RotateState::Idle,
            });
        }
        // Late completions must never re-expand the group.
        animations.cancel_group(group, out);

        for index in 0..images.len() {
            let element = ElementRef::Image { group, index };
            out.remove_marker(element, Marker::Shown);
            out.remove_marker(element, Marker::LastShown);
            out.opacity(element, 0.0);
        }
        let first = ElementRef::Image { group, index: 0 };
        out.opacity(first, 1.0);
        out.visible(first, true);
        out.remove_marker(ElementRef::RotateButton { group }, Marker::Loading);
        state.displayed_index = 0;
        state.awaiting_image = false;

        if !state.expanded && !pending_expand {
            return;
        }

        let wrap = ElementRef::Wrap { group };
        if touch.is_enabled() {
            for (index, image) in images.images.iter().enumerate() {
                if let Some(size) = image.intrinsic {
                    out.geometry(ElementRef::Image { group, index }, Geometry::centered(size, size.centering_offsets()));
                }
            }
            out.geometry(wrap, collapsed_geometry());
            out.opacity(wrap, 1.0);
            if touch.active_group() == Some(group) {
                touch.end(scheduler);
                out.push(Command::UnbindViewport);
                out.push(Command::SetBodyScroll { locked: false });
            }
            state.human_step = 1;
            out.text(ElementRef::Count { group }, count_text(1, images));
        } else {
            match config.shrink_animation {
                None => out.geometry(wrap, collapsed_geometry()),
                Some(spec) => {
                    animations.start(
                        wrap,
                        AnimationTarget::Geometry(collapsed_geometry()),
                        spec,
                        Some(Completion::ShrinkSettled),
                        out,
                    );
                }
            }
        }

        for part in [OverlayPart::Top, OverlayPart::Bottom] {
            out.push(Command::HideOverlay {
                group,
                part,
                fade_ms: None,
            });
        }
        state.expanded = false;
        state.max_dim = None;
        out.remove_marker(ElementRef::Item { group }, Marker::Expanded);
        out.notify(GalleryEvent::Shrunk { group });
        tracing::debug!(group = %group, "shrunk");
    }

    /// Flip a rotating group between playing and paused. Ignored while the
    /// next-image loader is showing.
    pub fn toggle_rotation(&mut self, group: GroupId, out: &mut CommandBuffer) -> Option<RotateState> {
        if self.destroyed {
            return None;
        }
        let Gallery {
            config,
            store,
            rotation,
            ..
        } = self;
        let (_, state) = store.entry(group)?;
        if config.show_loader && state.awaiting_image {
            return None;
        }
        let new_state = rotation.toggle(group, state)?;

        let button = ElementRef::RotateButton { group };
        if new_state == RotateState::Paused {
            out.add_marker(button, Marker::Paused);
        } else {
            out.remove_marker(button, Marker::Paused);
        }
        out.notify(GalleryEvent::RotateStateChanged {
            group,
            state: new_state,
        });
        tracing::debug!(group = %group, state = ?new_state, "rotation toggled");
        Some(new_state)
    }

    /// Tear everything down. The gallery ignores all input afterwards.
    pub fn destroy(&mut self, out: &mut CommandBuffer) {
        if self.destroyed {
            return;
        }
        let ids = self.store.ids();

        self.rotation.stop_all(&mut self.scheduler);
        for intent in self.gestures.values_mut() {
            intent.cancel(&mut self.scheduler);
        }
        self.gestures.clear();
        for &group in &ids {
            self.animations.cancel_group(group, out);
        }

        if let Some(session) = self.touch.end(&mut self.scheduler) {
            out.push(Command::UnbindViewport);
            out.push(Command::SetBodyScroll { locked: false });
            if let Some(group) = self.store.group(session.group) {
                out.text(ElementRef::Count { group: session.group }, count_text(1, group));
            }
        }
        for &group in &ids {
            out.push(Command::UnbindGroup { group });
        }
        if self.touch.is_enabled() {
            out.remove_marker(ElementRef::Container, Marker::Touch);
        }

        self.store.clear_states();
        self.scheduler.clear();
        self.animations.clear();
        self.destroyed = true;
        out.notify(GalleryEvent::Destroyed);
        tracing::debug!(gallery = self.id.as_u32(), "gallery destroyed");
    }

    fn run_task(&mut self, id: TaskId, task: Task, out: &mut CommandBuffer) {
        tracing::trace!(?task, at = self.scheduler.now().as_u64(), "timer fired");
        match task {
            Task::GesturePoll(group) => {
                let signal = match self.gestures.get_mut(&group) {
                    Some(intent) => intent.on_poll(id, &mut self.scheduler),
                    None => None,
                };
                if signal == Some(IntentSignal::Enter) {
                    self.hover_expand(group, out);
                    self.start_rotation(group, out);
                }
            }
            Task::GestureLeave(group) => {
                let signal = self
                    .gestures
                    .get_mut(&group)
                    .and_then(|intent| intent.on_leave_elapsed(id));
                if signal == Some(IntentSignal::Leave) {
                    self.shrink(group, out);
                }
            }
            Task::RotationTick(group) => self.rotate_tick(id, group, out),
            Task::OverlayFade(_) => self.touch.on_overlay_fade(id, out),
            Task::OrientationSettle => self.touch.on_orientation_settle(id),
            Task::HideAddressBar => out.push(Command::ScrollTo { x: 0, y: 1 }),
        }
    }

    fn start_rotation(&mut self, group: GroupId, out: &mut CommandBuffer) {
        let Gallery {
            store,
            scheduler,
            rotation,
            ..
        } = self;
        let Some((images, state)) = store.entry(group) else {
            return;
        };
        match rotation.start(images, state, scheduler) {
            StartOutcome::Started => {
                out.remove_marker(ElementRef::RotateButton { group }, Marker::Paused);
                out.notify(GalleryEvent::RotateStateChanged {
                    group,
                    state: RotateState::Playing,
                });
            }
            StartOutcome::Coalesced => out.notify(GalleryEvent::RotateStateChanged {
                group,
                state: RotateState::Idle,
            }),
            StartOutcome::Degenerate | StartOutcome::Disabled => {}
        }
    }

    fn hover_expand(&mut self, group: GroupId, out: &mut CommandBuffer) {
        if self.animations.has_pending_expand(group) {
            return;
        }
        let Gallery {
            config,
            store,
            animations,
            ..
        } = self;
        let Some((images, state)) = store.entry(group) else {
            return;
        };
        if state.expanded {
            return;
        }

        let wrap = ElementRef::Wrap { group };
        for completion in animations.cancel_element(wrap, out) {
            settle(completion, images, state, config, animations, out);
        }

        let target = images.first_real().unwrap_or(0);
        reveal_first_real(images, target, out);

        let size = image_size(images, target);
        let expansion = compute_expansion(size, state, config);
        show_caption(images, target, config, out);
        tracing::debug!(
            group = %group,
            width = expansion.size.width,
            height = expansion.size.height,
            animated = config.expand_animation.is_some(),
            "expanding"
        );

        match config.expand_animation {
            None => {
                out.geometry(wrap, expansion.geometry());
                commit_expand(group, state, target, out);
            }
            Some(spec) => {
                animations.start(
                    wrap,
                    AnimationTarget::Geometry(expansion.geometry()),
                    spec,
                    Some(Completion::CommitExpand { image: target }),
                    out,
                );
            }
        }
    }

    fn touch_expand(&mut self, group: GroupId, out: &mut CommandBuffer) {
        match self.store.entry(group) {
            Some((_, state)) if !state.expanded => {}
            _ => return,
        }
        if let Some(previous) = self.touch.active_group() {
            if previous != group {
                self.shrink(previous, out);
            }
        }

        let Gallery {
            config,
            store,
            scheduler,
            animations,
            touch,
            ..
        } = self;
        let Some((images, state)) = store.entry(group) else {
            return;
        };

        let index = images.first_real().unwrap_or(0);
        reveal_first_real(images, index, out);
        state.displayed_index = index;
        state.human_step = 1;
        state.expanded = true;
        out.add_marker(ElementRef::Item { group }, Marker::Expanded);
        out.add_marker(ElementRef::Image { group, index }, Marker::Shown);

        out.push(Command::SetBodyScroll { locked: true });
        out.push(Command::BindViewport);
        touch.begin(group, scheduler);

        out.text(ElementRef::Count { group }, count_text(1, images));
        show_caption(images, index, config, out);
        touch.show_top_overlay(config.transition_speed(), Some(config.overlay_fade_after), scheduler, out);
        touch.position(group, index, image_size(images, index), true, animations, out);

        out.notify(GalleryEvent::Expanded { group });
        tracing::debug!(group = %group, index, "touch expanded");
    }

    fn rotate_tick(&mut self, task: TaskId, group: GroupId, out: &mut CommandBuffer) {
        let Gallery {
            config,
            store,
            scheduler,
            rotation,
            animations,
            touch,
            ..
        } = self;
        let Some((images, state)) = store.entry(group) else {
            return;
        };

        let step = match rotation.on_tick(task, images, state, scheduler, config.loading_indicator()) {
            TickOutcome::Advanced(step) => step,
            TickOutcome::AwaitingImage { .. } => {
                out.add_marker(ElementRef::RotateButton { group }, Marker::Loading);
                return;
            }
            TickOutcome::Stale | TickOutcome::Paused | TickOutcome::Degenerate => return,
        };

        // Earlier swaps still fading jump to their end state first.
        for index in [step.shown, step.next] {
            for completion in animations.cancel_element(ElementRef::Image { group, index }, out) {
                settle(completion, images, state, config, animations, out);
            }
        }

        out.add_marker(ElementRef::Image { group, index: step.shown }, Marker::LastShown);
        let incoming = ElementRef::Image {
            group,
            index: step.next,
        };
        out.opacity(incoming, 0.0);
        out.visible(incoming, true);
        out.add_marker(incoming, Marker::Shown);
        out.remove_marker(ElementRef::RotateButton { group }, Marker::Loading);
        show_caption(images, step.next, config, out);
        out.notify(GalleryEvent::Rotated {
            group,
            index: step.next,
            human_step: step.human_step,
        });

        let size = image_size(images, step.next);
        let speed = config.transition_speed();

        if touch.active_group() == Some(group) {
            out.text(ElementRef::Count { group }, count_text(step.human_step, images));
            touch.position(group, step.next, size, false, animations, out);
            run_transition(group, step.shown, step.next, config.transition, speed, animations, out);
            return;
        }

        let wrap = ElementRef::Wrap { group };
        for completion in animations.cancel_element(wrap, out) {
            settle(completion, images, state, config, animations, out);
        }
        let retained = state.max_dim;
        let expansion = compute_expansion(size, state, config);
        if config.retain_max_expansion && retained == Some(expansion.size) {
            run_transition(group, step.shown, step.next, config.transition, speed, animations, out);
            return;
        }

        match config.expand_animation {
            None => {
                out.geometry(wrap, expansion.geometry());
                run_transition(group, step.shown, step.next, config.transition, speed, animations, out);
            }
            Some(spec) => {
                animations.start(
                    wrap,
                    AnimationTarget::Geometry(expansion.geometry()),
                    spec,
                    Some(Completion::TransitionAfterResize {
                        shown: step.shown,
                        next: step.next,
                    }),
                    out,
                );
            }
        }
    }

    fn tap(&mut self, target: TapTarget, out: &mut CommandBuffer) {
        if !self.touch.is_enabled() {
            return;
        }

        let Some(active) = self.touch.active_group() else {
            if let TapTarget::Wrap { group } | TapTarget::Image { group, .. } = target {
                let collapsed = self.store.entry(group).is_some_and(|(_, state)| !state.expanded);
                if collapsed {
                    self.touch_expand(group, out);
                    self.start_rotation(group, out);
                }
            }
            return;
        };

        let Some((_, state)) = self.store.entry(active) else {
            return;
        };
        let rotate_state = state.rotate_state;
        let loading_visible = self.config.loading_indicator() && state.awaiting_image;
        let fade_in = self.config.transition_speed();
        let fade_after = self.config.overlay_fade_after;

        match self.touch.classify_tap(target, rotate_state, loading_visible) {
            TouchAction::Ignore => {}
            TouchAction::TogglePlayPause => {
                self.toggle_rotation(active, out);
                let playing = self
                    .store
                    .state(active)
                    .is_some_and(|state| state.rotate_state == RotateState::Playing);
                // Paused keeps the controls on screen.
                let fade = playing.then_some(fade_after);
                self.touch.show_top_overlay(fade_in, fade, &mut self.scheduler, out);
            }
            TouchAction::Collapse => self.shrink(active, out),
            TouchAction::ShowTopOverlay => {
                self.touch.show_top_overlay(fade_in, Some(fade_after), &mut self.scheduler, out);
            }
            TouchAction::FollowLink { index } => self.follow_link(active, index, out),
        }
    }

    /// Replay the image's original link: inline onclick first, then the href.
    fn follow_link(&mut self, group: GroupId, index: usize, out: &mut CommandBuffer) {
        let Some(link) = self
            .store
            .group(group)
            .and_then(|images| images.image(index))
            .and_then(|image| image.link.clone())
        else {
            return;
        };

        if link.has_onclick {
            out.push(Command::InvokeOnclick {
                element: ElementRef::Image { group, index },
            });
        }
        if let Some(href) = link.navigable_href() {
            let mode = if link.opens_new_window() {
                NavigationMode::OpenSelf
            } else {
                NavigationMode::Replace
            };
            out.push(Command::Navigate {
                href: href.to_string(),
                mode,
            });
            self.shrink(group, out);
        }
    }

    fn image_loaded(&mut self, group: GroupId, index: usize, size: Dim, out: &mut CommandBuffer) {
        let Some(image) = self.store.group_mut(group).and_then(|images| images.image_mut(index)) else {
            return;
        };
        image.intrinsic = Some(size);
        image.load_state = LoadState::Loaded;

        let Gallery {
            store,
            animations,
            touch,
            ..
        } = self;
        let Some((_, state)) = store.entry(group) else {
            return;
        };

        let element = ElementRef::Image { group, index };
        if touch.active_group() == Some(group) && state.displayed_index == index {
            touch.position(group, index, size, false, animations, out);
        } else {
            out.geometry(element, Geometry::centered(size, size.centering_offsets()));
        }
        reveal_settled(group, index, state, out);
    }

    /// Substitute the not-found image once; a second failure settles as errored.
    fn image_failed(&mut self, group: GroupId, index: usize, out: &mut CommandBuffer) {
        let fallback = self.config.image_not_found.clone();
        let Some(image) = self.store.group_mut(group).and_then(|images| images.image_mut(index)) else {
            return;
        };

        let substitute = fallback.filter(|src| !image.fallback_applied && *src != image.src);
        Anomaly::ImageLoadFailure {
            group,
            index,
            fallback: substitute.is_some(),
        }
        .log();

        if let Some(src) = substitute {
            image.src = src.clone();
            image.fallback_applied = true;
            image.load_state = LoadState::Pending;
            out.push(Command::SetSource {
                element: ElementRef::Image { group, index },
                src,
            });
            return;
        }

        image.load_state = LoadState::Errored;
        if let Some((_, state)) = self.store.entry(group) {
            reveal_settled(group, index, state, out);
        }
    }

    fn animation_complete(&mut self, id: AnimationId, out: &mut CommandBuffer) {
        let Some((group, completion)) = self.animations.complete(id) else {
            return;
        };
        let Gallery {
            config,
            store,
            animations,
            ..
        } = self;
        if let Some((images, state)) = store.entry(group) {
            settle(completion, images, state, config, animations, out);
        }
    }

    fn orientation_change(&mut self, viewport: Viewport, out: &mut CommandBuffer) {
        let Gallery {
            store,
            scheduler,
            animations,
            touch,
            ..
        } = self;
        let Some(group) = touch.on_orientation_change(viewport, scheduler) else {
            return;
        };
        let Some((images, state)) = store.entry(group) else {
            return;
        };
        let index = state.displayed_index;
        touch.position(group, index, image_size(images, index), false, animations, out);
    }
}

/// Run the work an animation was gating.
fn settle(
    completion: Completion,
    images: &ImageGroup,
    state: &mut GroupState,
    config: &GalleryConfig,
    animations: &mut AnimationTracker,
    out: &mut CommandBuffer,
) {
    let group = images.id;
    match completion {
        Completion::CommitExpand { image } => commit_expand(group, state, image, out),
        Completion::TransitionAfterResize { shown, next } => run_transition(
            group,
            shown,
            next,
            config.transition,
            config.transition_speed(),
            animations,
            out,
        ),
        Completion::ClearOutgoing { outgoing } => clear_outgoing(group, outgoing, out),
        Completion::ShrinkSettled => {
            for index in 0..images.len() {
                out.remove_marker(ElementRef::Image { group, index }, Marker::Shown);
            }
        }
    }
}

fn commit_expand(group: GroupId, state: &mut GroupState, image: usize, out: &mut CommandBuffer) {
    state.expanded = true;
    out.add_marker(ElementRef::Item { group }, Marker::Expanded);
    out.add_marker(ElementRef::Image { group, index: image }, Marker::Shown);
    out.notify(GalleryEvent::Expanded { group });
}

/// Swap a leading thumbnail placeholder for the first real image.
fn reveal_first_real(images: &ImageGroup, real: usize, out: &mut CommandBuffer) {
    let group = images.id;
    if let Some(thumb) = images.first_thumbnail().filter(|&thumb| thumb != real) {
        if images.first_real().is_some() {
            out.visible(ElementRef::Image { group, index: thumb }, false);
            let element = ElementRef::Image { group, index: real };
            out.visible(element, true);
            out.opacity(element, 1.0);
        }
    }
}

/// An image finished loading or failed for good: drop loading indicators and
/// reveal the group's first image while cropped.
fn reveal_settled(group: GroupId, index: usize, state: &mut GroupState, out: &mut CommandBuffer) {
    out.remove_marker(ElementRef::RotateButton { group }, Marker::Loading);
    state.awaiting_image = false;
    if index == 0 && !state.expanded {
        out.visible(ElementRef::Image { group, index }, true);
        out.remove_marker(ElementRef::Wrap { group }, Marker::Loading);
    }
}

/// Caption for `index` in the bottom overlay. Without a caption the overlay is
/// kept only for the play/pause button.
fn show_caption(images: &ImageGroup, index: usize, config: &GalleryConfig, out: &mut CommandBuffer) {
    let group = images.id;
    let caption = images.image(index).and_then(|image| image.caption.clone());
    if caption.is_none() && !config.play_pause_button {
        out.push(Command::HideOverlay {
            group,
            part: OverlayPart::Bottom,
            fade_ms: Some(FAST_FADE),
        });
        return;
    }
    out.text(ElementRef::Caption { group }, caption.unwrap_or_default());
    out.push(Command::ShowOverlay {
        group,
        part: OverlayPart::Bottom,
        fade_ms: config.transition_speed(),
    });
}

/// Cropped layout of a freshly registered group: first image on top, the rest hidden.
fn emit_cropped_layout(images: &ImageGroup, touch: bool, out: &mut CommandBuffer) {
    let group = images.id;
    out.geometry(ElementRef::Wrap { group }, collapsed_geometry());
    for (index, image) in images.images.iter().enumerate() {
        let element = ElementRef::Image { group, index };
        if let Some(size) = image.intrinsic {
            out.geometry(element, Geometry::centered(size, size.centering_offsets()));
        }
        if index == 0 {
            out.opacity(element, 1.0);
            out.visible(element, image.is_settled());
        } else {
            out.opacity(element, 0.0);
            out.visible(element, false);
        }
    }
    if images.image(0).is_some_and(|image| !image.is_settled()) {
        out.add_marker(ElementRef::Wrap { group }, Marker::Loading);
    }
    if touch {
        out.text(ElementRef::Count { group }, count_text(1, images));
    }
}

fn image_size(images: &ImageGroup, index: usize) -> Dim {
    images.image(index).map(ImageRef::size).unwrap_or_default()
}

fn count_text(current: u32, images: &ImageGroup) -> String {
    format!("{}/{}", current, images.real_count())
}
