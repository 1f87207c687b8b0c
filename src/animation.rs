// Bookkeeping for adapter-run animations and the work gated on their completion.
// State transitions that wait on an animation are committed only when the adapter
// reports it finished, never optimistically.

use std::collections::HashMap;

use crate::commands::{AnimationId, AnimationTarget, Command, CommandBuffer};
use crate::config::AnimationSpec;
use crate::types::{ElementRef, GroupId};

/// Work to run once an animation completes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Completion {
    /// Expansion finished: mark the group expanded with `image` on display.
    CommitExpand { image: usize },
    /// Resize for an incoming image finished: swap the images.
    TransitionAfterResize { shown: usize, next: usize },
    /// Incoming image faded in: drop the outgoing image's markers.
    ClearOutgoing { outgoing: usize },
    /// Shrink finished: drop every image's markers.
    ShrinkSettled,
}

#[derive(Debug, Clone, Copy)]
struct Pending {
    group: GroupId,
    element: ElementRef,
    completion: Option<Completion>,
}

#[derive(Debug, Default)]
pub struct AnimationTracker {
    next_id: u64,
    pending: HashMap<AnimationId, Pending>,
}

impl AnimationTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Emit an `Animate` command and remember what to do when it completes.
    pub fn start(
        &mut self,
        element: ElementRef,
        target: AnimationTarget,
        spec: AnimationSpec,
        completion: Option<Completion>,
        out: &mut CommandBuffer,
    ) -> AnimationId {
        let id = AnimationId::new(self.next_id);
        self.next_id += 1;
        if let Some(group) = element.group() {
            self.pending.insert(
                id,
                Pending {
                    group,
                    element,
                    completion,
                },
            );
        }
        out.push(Command::Animate {
            id,
            element,
            target,
            duration_ms: spec.duration,
            easing: spec.easing,
        });
        id
    }

    /// Resolve a reported completion. Unknown or cancelled ids yield nothing.
    pub fn complete(&mut self, id: AnimationId) -> Option<(GroupId, Completion)> {
        let pending = self.pending.remove(&id)?;
        pending.completion.map(|completion| (pending.group, completion))
    }

    /// Cancel every animation running on `element`. Returns the completions that
    /// were waiting on them so the caller can decide whether to run or drop them.
    pub fn cancel_element(&mut self, element: ElementRef, out: &mut CommandBuffer) -> Vec<Completion> {
        let mut ids: Vec<AnimationId> = self
            .pending
            .iter()
            .filter(|(_, pending)| pending.element == element)
            .map(|(&id, _)| id)
            .collect();
        if ids.is_empty() {
            return Vec::new();
        }
        ids.sort_by_key(AnimationId::as_u64);
        out.push(Command::CancelAnimation { element });
        ids.into_iter()
            .filter_map(|id| self.pending.remove(&id))
            .filter_map(|pending| pending.completion)
            .collect()
    }

    /// Cancel every animation of a group. Returns the dropped completions.
    pub fn cancel_group(&mut self, group: GroupId, out: &mut CommandBuffer) -> Vec<Completion> {
        let mut elements: Vec<(AnimationId, ElementRef)> = self
            .pending
            .iter()
            .filter(|(_, pending)| pending.group == group)
            .map(|(&id, pending)| (id, pending.element))
            .collect();
        elements.sort_by_key(|(id, _)| id.as_u64());

        let mut dropped = Vec::new();
        let mut seen = Vec::new();
        for (_, element) in elements {
            if !seen.contains(&element) {
                seen.push(element);
                dropped.extend(self.cancel_element(element, out));
            }
        }
        dropped
    }

    pub fn has_pending_expand(&self, group: GroupId) -> bool {
        self.pending.values().any(|pending| {
            pending.group == group && matches!(pending.completion, Some(Completion::CommitExpand { .. }))
        })
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }

    pub fn clear(&mut self) {
        self.pending.clear();
    }
}
