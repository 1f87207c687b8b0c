// Input events pushed by the host, batched with the host's clock reading.

use serde::{Deserialize, Serialize};

use crate::commands::AnimationId;
use crate::touch::TapTarget;
use crate::types::{GroupId, Millis, Viewport};

/// One batch of host input. Timers due at or before `now` run before the events.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HostEventBatch {
    pub now: Millis,
    #[serde(default)]
    pub events: Vec<HostEvent>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum HostEvent {
    PointerEnter { group: GroupId, x: f64, y: f64 },
    PointerMove { group: GroupId, x: f64, y: f64 },
    PointerLeave { group: GroupId, x: f64, y: f64 },
    Tap { target: TapTarget },
    ImageLoaded {
        group: GroupId,
        index: usize,
        width: u32,
        height: u32,
    },
    ImageFailed { group: GroupId, index: usize },
    /// An `animate` command finished. Never sent for cancelled animations.
    AnimationComplete { id: AnimationId },
    OrientationChange { viewport: Viewport },
    Scroll { x: i32, y: i32 },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn batch_parses_from_host_json() {
        let json = r#"{
            "now": 1250,
            "events": [
                {"type":"pointer_enter","group":0,"x":12.5,"y":40},
                {"type":"tap","target":{"kind":"image","group":1,"index":2}},
                {"type":"tap","target":{"kind":"outside"}},
                {"type":"image_loaded","group":0,"index":1,"width":640,"height":480},
                {"type":"animation_complete","id":7},
                {"type":"orientation_change","viewport":{"width":480,"height":320}}
            ]
        }"#;
        let batch: HostEventBatch = serde_json::from_str(json).unwrap();
        assert_eq!(batch.now, Millis::new(1250));
        assert_eq!(batch.events.len(), 6);
        assert_eq!(
            batch.events[1],
            HostEvent::Tap {
                target: TapTarget::Image {
                    group: GroupId::new(1),
                    index: 2
                }
            }
        );
        assert_eq!(
            batch.events[4],
            HostEvent::AnimationComplete {
                id: AnimationId::new(7)
            }
        );
    }

    #[test]
    fn events_default_to_empty() {
        let batch: HostEventBatch = serde_json::from_str(r#"{"now":5}"#).unwrap();
        assert!(batch.events.is_empty());
    }

    #[test]
    fn unknown_event_type_is_rejected() {
        let result: Result<HostEventBatch, _> =
            serde_json::from_str(r#"{"now":0,"events":[{"type":"wheel"}]}"#);
        assert!(result.is_err());
    }
}
