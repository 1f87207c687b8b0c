// Image swap effect run on every rotation tick.

use crate::animation::{AnimationTracker, Completion};
use crate::commands::{AnimationTarget, CommandBuffer};
use crate::config::AnimationSpec;
use crate::types::{Easing, ElementRef, GroupId, Marker, Millis, TransitionKind};

/// Swap `outgoing` for `incoming`. With `fade`, the outgoing image keeps its
/// markers until the incoming one is fully opaque, so the two never flash together.
pub fn run_transition(
    group: GroupId,
    outgoing: usize,
    incoming: usize,
    kind: TransitionKind,
    speed: Millis,
    animations: &mut AnimationTracker,
    out: &mut CommandBuffer,
) {
    let incoming_el = ElementRef::Image { group, index: incoming };
    if outgoing == incoming {
        out.opacity(incoming_el, 1.0);
        return;
    }

    match kind {
        TransitionKind::None => {
            out.opacity(ElementRef::Image { group, index: outgoing }, 0.0);
            clear_outgoing(group, outgoing, out);
            out.opacity(incoming_el, 1.0);
        }
        TransitionKind::Fade => {
            let spec = AnimationSpec {
                duration: speed,
                easing: Easing::Swing,
            };
            animations.start(
                incoming_el,
                AnimationTarget::Opacity(1.0),
                spec,
                Some(Completion::ClearOutgoing { outgoing }),
                out,
            );
            animations.start(
                ElementRef::Image { group, index: outgoing },
                AnimationTarget::Opacity(0.0),
                spec,
                None,
                out,
            );
        }
    }
}

/// Strip the display markers from an image that has been swapped out.
pub fn clear_outgoing(group: GroupId, outgoing: usize, out: &mut CommandBuffer) {
    let element = ElementRef::Image { group, index: outgoing };
    out.remove_marker(element, Marker::Shown);
    out.remove_marker(element, Marker::LastShown);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::Command;

    #[test]
    fn none_swaps_synchronously() {
        let mut animations = AnimationTracker::new();
        let mut out = CommandBuffer::new();
        let group = GroupId::new(0);
        run_transition(group, 1, 2, TransitionKind::None, Millis::new(459), &mut animations, &mut out);

        assert!(animations.is_empty());
        assert_eq!(
            out.commands().first(),
            Some(&Command::SetOpacity {
                element: ElementRef::Image { group, index: 1 },
                value: 0.0
            })
        );
        assert!(out.iter().any(|c| matches!(
            c,
            Command::RemoveMarker { element: ElementRef::Image { index: 1, .. }, marker: Marker::Shown }
        )));
        assert_eq!(
            out.commands().last(),
            Some(&Command::SetOpacity {
                element: ElementRef::Image { group, index: 2 },
                value: 1.0
            })
        );
    }

    #[test]
    fn fade_gates_marker_clear_on_incoming() {
        let mut animations = AnimationTracker::new();
        let mut out = CommandBuffer::new();
        let group = GroupId::new(0);
        run_transition(group, 1, 2, TransitionKind::Fade, Millis::new(459), &mut animations, &mut out);

        let ids: Vec<_> = out
            .iter()
            .filter_map(|c| match c {
                Command::Animate { id, duration_ms, .. } => {
                    assert_eq!(*duration_ms, Millis::new(459));
                    Some(*id)
                }
                _ => None,
            })
            .collect();
        assert_eq!(ids.len(), 2);
        assert!(!out.iter().any(|c| matches!(c, Command::RemoveMarker { .. })));

        assert_eq!(
            animations.complete(ids[0]),
            Some((group, Completion::ClearOutgoing { outgoing: 1 }))
        );
        assert_eq!(animations.complete(ids[1]), None);
    }

    #[test]
    fn same_image_only_ensures_opacity() {
        let mut animations = AnimationTracker::new();
        let mut out = CommandBuffer::new();
        run_transition(GroupId::new(0), 1, 1, TransitionKind::Fade, Millis::new(300), &mut animations, &mut out);
        assert_eq!(out.len(), 1);
        assert!(animations.is_empty());
    }
}
