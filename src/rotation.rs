// Rotation engine: one cooperative timer per group, advancing the displayed image
// on every tick and skipping thumbnail placeholders.
// At most one timer per group is live; a second start request stops the first.

use std::collections::HashMap;

use crate::error::Anomaly;
use crate::group::ImageGroup;
use crate::scheduler::{Scheduler, Task, TaskId};
use crate::store::GroupState;
use crate::types::{GroupId, Millis, RotateState};

/// Outgoing and incoming images of one tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RotationStep {
    /// Image currently on display (first real image at or after the stored index).
    pub shown: usize,
    /// Image to display next.
    pub next: usize,
    /// 1-based counter for `next`.
    pub human_step: u32,
    /// The sequence wrapped back to its start.
    pub wrapped: bool,
}

/// Work out the next step from `displayed_index`. `None` when the group has no
/// real image at all.
pub fn plan_step(group: &ImageGroup, displayed_index: usize) -> Option<RotationStep> {
    if group.is_empty() {
        return None;
    }
    let index = displayed_index % group.len();
    let shown = group.real_at_or_after(index)?;
    let next = group.next_real_after(index)?;
    Some(RotationStep {
        shown,
        next,
        human_step: group.ordinal(next) as u32,
        wrapped: next < index,
    })
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StartOutcome {
    Started,
    /// A timer was already live; it was stopped instead.
    Coalesced,
    /// Fewer than two real images.
    Degenerate,
    /// Rotation is switched off (zero rotate speed).
    Disabled,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickOutcome {
    /// Timer was cancelled or replaced before it fired.
    Stale,
    Paused,
    /// Nothing to rotate to.
    Degenerate,
    /// Next image is still loading; the tick was skipped.
    AwaitingImage { next: usize },
    Advanced(RotationStep),
}

#[derive(Debug, Clone, Copy)]
struct RotationTimer {
    task: TaskId,
    first_tick_pending: bool,
}

#[derive(Debug)]
pub struct RotationEngine {
    timers: HashMap<GroupId, RotationTimer>,
    rotate_speed: Millis,
    first_interval: Millis,
}

impl RotationEngine {
    pub fn new(rotate_speed: Millis, first_interval: Millis) -> Self {
        RotationEngine {
            timers: HashMap::new(),
            rotate_speed,
            first_interval,
        }
    }

    pub fn is_running(&self, group: GroupId) -> bool {
        self.timers.contains_key(&group)
    }

    /// Start rotating `group`. Starting a group that already has a live timer
    /// stops it and leaves the group idle.
    pub fn start(
        &mut self,
        group: &ImageGroup,
        state: &mut GroupState,
        scheduler: &mut Scheduler,
    ) -> StartOutcome {
        if self.stop(group.id, state, scheduler) {
            tracing::debug!(group = %group.id, "duplicate rotation start coalesced");
            return StartOutcome::Coalesced;
        }
        if self.rotate_speed.is_zero() {
            return StartOutcome::Disabled;
        }
        if !group.is_rotatable() {
            Anomaly::DegenerateGroup(group.id).log();
            return StartOutcome::Degenerate;
        }

        let task = scheduler.schedule_after(self.first_interval, Task::RotationTick(group.id));
        self.timers.insert(
            group.id,
            RotationTimer {
                task,
                first_tick_pending: true,
            },
        );
        state.rotate_state = RotateState::Playing;
        tracing::debug!(group = %group.id, first_tick = self.first_interval.as_u64(), "rotation started");
        StartOutcome::Started
    }

    /// Cancel the group's timer. Returns false if none was live.
    pub fn stop(&mut self, group: GroupId, state: &mut GroupState, scheduler: &mut Scheduler) -> bool {
        state.rotate_state = RotateState::Idle;
        match self.timers.remove(&group) {
            Some(timer) => {
                scheduler.cancel(timer.task);
                tracing::debug!(group = %group, "rotation stopped");
                true
            }
            None => false,
        }
    }

    /// Flip between playing and paused. Idle groups are left alone.
    pub fn toggle(&self, group: GroupId, state: &mut GroupState) -> Option<RotateState> {
        if !self.is_running(group) {
            return None;
        }
        state.rotate_state = match state.rotate_state {
            RotateState::Playing => RotateState::Paused,
            RotateState::Paused => RotateState::Playing,
            RotateState::Idle => return None,
        };
        Some(state.rotate_state)
    }

    /// Handle a fired rotation tick. The timer is re-armed before the step is
    /// evaluated, so skipped and paused ticks keep the cadence going.
    pub fn on_tick(
        &mut self,
        task: TaskId,
        group: &ImageGroup,
        state: &mut GroupState,
        scheduler: &mut Scheduler,
        loading_indicator: bool,
    ) -> TickOutcome {
        let Some(timer) = self.timers.get_mut(&group.id) else {
            return TickOutcome::Stale;
        };
        if timer.task != task {
            return TickOutcome::Stale;
        }

        let paused = state.rotate_state == RotateState::Paused;
        if !paused {
            timer.first_tick_pending = false;
        }
        let delay = if timer.first_tick_pending {
            self.first_interval
        } else {
            self.rotate_speed
        };
        timer.task = scheduler.schedule_after(delay, Task::RotationTick(group.id));

        if paused {
            return TickOutcome::Paused;
        }

        let Some(step) = plan_step(group, state.displayed_index) else {
            return TickOutcome::Degenerate;
        };

        let next_settled = group.image(step.next).is_some_and(|image| image.is_settled());
        if loading_indicator && !next_settled {
            state.awaiting_image = true;
            tracing::trace!(group = %group.id, next = step.next, "tick skipped, image loading");
            return TickOutcome::AwaitingImage { next: step.next };
        }

        state.awaiting_image = false;
        state.displayed_index = step.next;
        state.human_step = step.human_step;
        tracing::trace!(group = %group.id, index = step.next, human_step = step.human_step, "rotated");
        TickOutcome::Advanced(step)
    }

    /// Cancel every live timer.
    pub fn stop_all(&mut self, scheduler: &mut Scheduler) {
        for (_, timer) in self.timers.drain() {
            scheduler.cancel(timer.task);
        }
    }
}
