// Hover-intent filter. Samples the pointer every poll interval and reports "enter"
// only once motion settles below the sensitivity threshold.
// Leave is reported only for confirmed hovers, after the configured timeout.

use crate::config::HoverIntentSettings;
use crate::scheduler::{Scheduler, Task, TaskId};
use crate::types::{GroupId, Millis, Point};

/// Debounced signal produced by the filter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IntentSignal {
    Enter,
    Leave,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum PendingTask {
    Poll(TaskId),
    Leave(TaskId),
}

impl PendingTask {
    fn id(&self) -> TaskId {
        match *self {
            PendingTask::Poll(id) | PendingTask::Leave(id) => id,
        }
    }
}

/// Hover-intent state for one group.
#[derive(Debug)]
pub struct HoverIntent {
    group: GroupId,
    settings: HoverIntentSettings,
    /// Enter has fired and leave has not.
    active: bool,
    /// Pointer is inside the target.
    tracking: bool,
    pending: Option<PendingTask>,
    current: Point,
    previous: Point,
}

impl HoverIntent {
    pub fn new(group: GroupId, settings: HoverIntentSettings) -> Self {
        HoverIntent {
            group,
            settings,
            active: false,
            tracking: false,
            pending: None,
            current: Point::default(),
            previous: Point::default(),
        }
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    pub fn on_enter(&mut self, pos: Point, scheduler: &mut Scheduler) {
        self.cancel_pending(scheduler);
        self.tracking = true;
        self.current = pos;
        self.previous = pos;
        if !self.active {
            self.schedule_poll(scheduler);
        }
    }

    pub fn on_move(&mut self, pos: Point) {
        if self.tracking {
            self.current = pos;
        }
    }

    /// A poll task fired. Returns `Enter` when the pointer has settled.
    pub fn on_poll(&mut self, task: TaskId, scheduler: &mut Scheduler) -> Option<IntentSignal> {
        if self.pending != Some(PendingTask::Poll(task)) {
            return None;
        }
        self.pending = None;

        let distance = self.current.manhattan(&self.previous);
        if distance < self.settings.sensitivity {
            self.active = true;
            tracing::trace!(group = %self.group, distance, "hover intent confirmed");
            Some(IntentSignal::Enter)
        } else {
            self.previous = self.current;
            self.schedule_poll(scheduler);
            None
        }
    }

    pub fn on_leave(&mut self, pos: Point, scheduler: &mut Scheduler) {
        self.cancel_pending(scheduler);
        self.tracking = false;
        self.current = pos;
        if self.active {
            let id = scheduler.schedule_after(self.settings.timeout, Task::GestureLeave(self.group));
            self.pending = Some(PendingTask::Leave(id));
        }
    }

    /// The delayed leave fired. Returns `Leave` if the hover was confirmed.
    pub fn on_leave_elapsed(&mut self, task: TaskId) -> Option<IntentSignal> {
        if self.pending != Some(PendingTask::Leave(task)) {
            return None;
        }
        self.pending = None;
        if std::mem::take(&mut self.active) {
            Some(IntentSignal::Leave)
        } else {
            None
        }
    }

    /// Drop all pending work and forget the hover.
    pub fn cancel(&mut self, scheduler: &mut Scheduler) {
        self.cancel_pending(scheduler);
        self.active = false;
        self.tracking = false;
    }

    fn schedule_poll(&mut self, scheduler: &mut Scheduler) {
        let id = scheduler.schedule_after(self.settings.interval, Task::GesturePoll(self.group));
        self.pending = Some(PendingTask::Poll(id));
    }

    fn cancel_pending(&mut self, scheduler: &mut Scheduler) {
        if let Some(pending) = self.pending.take() {
            scheduler.cancel(pending.id());
        }
    }

    #[cfg(test)]
    fn pending_count(&self) -> usize {
        usize::from(self.pending.is_some())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn settings() -> HoverIntentSettings {
        HoverIntentSettings {
            sensitivity: 9.0,
            interval: Millis::new(100),
            timeout: Millis::new(50),
        }
    }

    /// Fire every due task up to `until`, feeding them to `intent`.
    fn run(intent: &mut HoverIntent, scheduler: &mut Scheduler, until: u64) -> Vec<IntentSignal> {
        let mut signals = Vec::new();
        while let Some((id, task)) = scheduler.pop_due(Millis::new(until)) {
            let signal = match task {
                Task::GesturePoll(_) => intent.on_poll(id, scheduler),
                Task::GestureLeave(_) => intent.on_leave_elapsed(id),
                _ => None,
            };
            signals.extend(signal);
        }
        scheduler.set_now(Millis::new(until));
        signals
    }

    #[test]
    fn still_pointer_confirms_after_one_interval() {
        let mut scheduler = Scheduler::new(Millis::ZERO);
        let mut intent = HoverIntent::new(GroupId::new(0), settings());
        intent.on_enter(Point::new(10.0, 10.0), &mut scheduler);

        assert!(run(&mut intent, &mut scheduler, 99).is_empty());
        assert_eq!(run(&mut intent, &mut scheduler, 100), vec![IntentSignal::Enter]);
        assert!(intent.is_active());
    }

    #[test]
    fn moving_pointer_delays_confirmation() {
        let mut scheduler = Scheduler::new(Millis::ZERO);
        let mut intent = HoverIntent::new(GroupId::new(0), settings());
        intent.on_enter(Point::new(0.0, 0.0), &mut scheduler);
        intent.on_move(Point::new(30.0, 0.0));

        assert!(run(&mut intent, &mut scheduler, 100).is_empty());
        intent.on_move(Point::new(32.0, 3.0));
        assert_eq!(run(&mut intent, &mut scheduler, 200), vec![IntentSignal::Enter]);
    }

    #[test]
    fn leave_before_confirmation_is_a_noop() {
        let mut scheduler = Scheduler::new(Millis::ZERO);
        let mut intent = HoverIntent::new(GroupId::new(0), settings());
        intent.on_enter(Point::new(0.0, 0.0), &mut scheduler);
        intent.on_leave(Point::new(0.0, 0.0), &mut scheduler);

        assert!(scheduler.is_empty());
        assert!(run(&mut intent, &mut scheduler, 1_000).is_empty());
    }

    #[test]
    fn confirmed_leave_waits_for_timeout() {
        let mut scheduler = Scheduler::new(Millis::ZERO);
        let mut intent = HoverIntent::new(GroupId::new(0), settings());
        intent.on_enter(Point::new(0.0, 0.0), &mut scheduler);
        run(&mut intent, &mut scheduler, 100);

        intent.on_leave(Point::new(0.0, 0.0), &mut scheduler);
        assert!(run(&mut intent, &mut scheduler, 149).is_empty());
        assert_eq!(run(&mut intent, &mut scheduler, 150), vec![IntentSignal::Leave]);
        assert!(!intent.is_active());
    }

    #[test]
    fn reenter_cancels_pending_leave() {
        let mut scheduler = Scheduler::new(Millis::ZERO);
        let mut intent = HoverIntent::new(GroupId::new(0), settings());
        intent.on_enter(Point::new(0.0, 0.0), &mut scheduler);
        run(&mut intent, &mut scheduler, 100);

        intent.on_leave(Point::new(0.0, 0.0), &mut scheduler);
        intent.on_enter(Point::new(1.0, 1.0), &mut scheduler);
        assert!(scheduler.is_empty());
        assert!(run(&mut intent, &mut scheduler, 1_000).is_empty());
        assert!(intent.is_active());
    }

    mod property_tests {
        use super::*;
        use proptest::prelude::*;

        #[derive(Debug, Clone)]
        enum Step {
            Enter(f64, f64),
            Move(f64, f64),
            Leave,
            Wait(u64),
        }

        fn step_strategy() -> impl Strategy<Value = Step> {
            prop_oneof![
                (0.0..50.0f64, 0.0..50.0f64).prop_map(|(x, y)| Step::Enter(x, y)),
                (0.0..50.0f64, 0.0..50.0f64).prop_map(|(x, y)| Step::Move(x, y)),
                Just(Step::Leave),
                (0u64..250).prop_map(Step::Wait),
            ]
        }

        proptest! {
            /// Enter never fires twice without a Leave in between, and at most one
            /// task is ever pending.
            #[test]
            fn enter_and_leave_alternate(steps in proptest::collection::vec(step_strategy(), 1..60)) {
                let mut scheduler = Scheduler::new(Millis::ZERO);
                let mut intent = HoverIntent::new(GroupId::new(0), settings());
                let mut now = 0u64;
                let mut last: Option<IntentSignal> = None;

                for step in steps {
                    let signals = match step {
                        Step::Enter(x, y) => { intent.on_enter(Point::new(x, y), &mut scheduler); Vec::new() }
                        Step::Move(x, y) => { intent.on_move(Point::new(x, y)); Vec::new() }
                        Step::Leave => { intent.on_leave(Point::default(), &mut scheduler); Vec::new() }
                        Step::Wait(ms) => { now += ms; run(&mut intent, &mut scheduler, now) }
                    };
                    for signal in signals {
                        prop_assert_ne!(Some(signal), last);
                        if last.is_none() {
                            prop_assert_eq!(signal, IntentSignal::Enter);
                        }
                        last = Some(signal);
                    }
                    prop_assert!(intent.pending_count() <= 1);
                    prop_assert!(scheduler.len() <= 1);
                }
            }
        }
    }
}
