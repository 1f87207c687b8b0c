// Cooperative timer queue driven by the host's clock.
// Nothing fires on its own: the host advances time and the gallery drains due tasks.

use std::collections::{BTreeMap, HashMap};

use crate::types::{GroupId, Millis};

/// Handle returned for every scheduled task. Monotonic, so it also breaks due-time ties.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct TaskId(u64);

/// Work items that can be scheduled.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Task {
    /// Hover-intent motion sample.
    GesturePoll(GroupId),
    /// Hover-intent delayed leave.
    GestureLeave(GroupId),
    RotationTick(GroupId),
    /// Touch mode: fade the top overlay out.
    OverlayFade(GroupId),
    /// Touch mode: clear the orientation-change scroll suppression.
    OrientationSettle,
    /// Touch mode: nudge the page to hide the mobile address bar.
    HideAddressBar,
}

#[derive(Debug, Default)]
pub struct Scheduler {
    now: Millis,
    next_id: u64,
    queue: BTreeMap<(Millis, TaskId), Task>,
    due: HashMap<TaskId, Millis>,
}

impl Scheduler {
    pub fn new(now: Millis) -> Self {
        Scheduler {
            now,
            ..Default::default()
        }
    }

    pub fn now(&self) -> Millis {
        self.now
    }

    /// Schedule `task` to run `delay` after the current instant.
    pub fn schedule_after(&mut self, delay: Millis, task: Task) -> TaskId {
        let id = TaskId(self.next_id);
        self.next_id += 1;
        let at = self.now + delay;
        self.queue.insert((at, id), task);
        self.due.insert(id, at);
        tracing::trace!(?task, at = at.as_u64(), "scheduled");
        id
    }

    /// Cancel a pending task. Returns false if it already ran or was cancelled.
    pub fn cancel(&mut self, id: TaskId) -> bool {
        match self.due.remove(&id) {
            Some(at) => self.queue.remove(&(at, id)).is_some(),
            None => false,
        }
    }

    pub fn is_pending(&self, id: TaskId) -> bool {
        self.due.contains_key(&id)
    }

    /// Pop the earliest task due at or before `limit`, moving the clock to its due time.
    pub fn pop_due(&mut self, limit: Millis) -> Option<(TaskId, Task)> {
        let (&(at, id), _) = self.queue.iter().next()?;
        if at > limit {
            return None;
        }
        let task = self.queue.remove(&(at, id))?;
        self.due.remove(&id);
        self.now = self.now.max(at);
        Some((id, task))
    }

    /// Move the clock forward. The clock never runs backwards.
    pub fn set_now(&mut self, now: Millis) {
        self.now = self.now.max(now);
    }

    /// Due time of the earliest pending task.
    pub fn next_due(&self) -> Option<Millis> {
        self.queue.keys().next().map(|&(at, _)| at)
    }

    pub fn len(&self) -> usize {
        self.queue.len()
    }

    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }

    /// Drop every pending task.
    pub fn clear(&mut self) {
        self.queue.clear();
        self.due.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn tasks_fire_in_due_order() {
        let mut scheduler = Scheduler::new(Millis::ZERO);
        let g = GroupId::new(0);
        scheduler.schedule_after(Millis::new(300), Task::RotationTick(g));
        scheduler.schedule_after(Millis::new(100), Task::GesturePoll(g));

        assert_eq!(
            scheduler.pop_due(Millis::new(1000)).map(|(_, t)| t),
            Some(Task::GesturePoll(g))
        );
        assert_eq!(scheduler.now(), Millis::new(100));
        assert_eq!(
            scheduler.pop_due(Millis::new(1000)).map(|(_, t)| t),
            Some(Task::RotationTick(g))
        );
        assert!(scheduler.pop_due(Millis::new(1000)).is_none());
    }

    #[test]
    fn tasks_not_yet_due_stay_queued() {
        let mut scheduler = Scheduler::new(Millis::ZERO);
        scheduler.schedule_after(Millis::new(500), Task::OrientationSettle);
        assert!(scheduler.pop_due(Millis::new(499)).is_none());
        assert_eq!(scheduler.next_due(), Some(Millis::new(500)));
    }

    #[test]
    fn cancelled_tasks_never_fire() {
        let mut scheduler = Scheduler::new(Millis::ZERO);
        let id = scheduler.schedule_after(Millis::new(10), Task::HideAddressBar);
        assert!(scheduler.cancel(id));
        assert!(!scheduler.cancel(id));
        assert!(!scheduler.is_pending(id));
        assert!(scheduler.pop_due(Millis::new(100)).is_none());
    }

    #[test]
    fn delays_are_relative_to_firing_time() {
        let mut scheduler = Scheduler::new(Millis::ZERO);
        scheduler.schedule_after(Millis::new(100), Task::HideAddressBar);
        scheduler.pop_due(Millis::new(1000));
        scheduler.schedule_after(Millis::new(100), Task::OrientationSettle);
        assert_eq!(scheduler.next_due(), Some(Millis::new(200)));
    }

    proptest! {
        /// Tasks come out sorted by due time, ties in scheduling order.
        #[test]
        fn pop_order_is_stable(delays in proptest::collection::vec(0u64..50, 1..40)) {
            let mut scheduler = Scheduler::new(Millis::ZERO);
            let ids: Vec<(Millis, TaskId)> = delays
                .iter()
                .map(|&d| (Millis::new(d), scheduler.schedule_after(Millis::new(d), Task::OrientationSettle)))
                .collect();

            let mut expected = ids.clone();
            expected.sort();

            let mut popped = Vec::new();
            while let Some((id, _)) = scheduler.pop_due(Millis::new(1_000)) {
                popped.push(id);
            }
            let expected: Vec<TaskId> = expected.into_iter().map(|(_, id)| id).collect();
            prop_assert_eq!(popped, expected);
        }
    }
}
