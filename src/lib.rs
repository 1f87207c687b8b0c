// peepshow_engine: Rust/WASM core for hover-expanding, self-rotating image galleries.
// The engine owns all gallery state and timing; the JS adapter only applies the
// commands it returns and reports input back.

mod animation;
mod commands;
mod config;
mod error;
mod events;
mod expansion;
mod gallery;
mod gesture;
mod group;
mod rotation;
mod scheduler;
mod store;
mod touch;
mod transition;
mod types;

use serde::{Deserialize, Serialize};
use wasm_bindgen::prelude::*;

pub use animation::{AnimationTracker, Completion};
pub use commands::{
    AnimationId, AnimationTarget, Command, CommandBuffer, GalleryEvent, Geometry, Length,
    NavigationMode, Position,
};
pub use config::{AnimationSpec, GalleryConfig, GalleryOptions, HoverIntentOptions, HoverIntentSettings};
pub use error::{Anomaly, GalleryError};
pub use events::{HostEvent, HostEventBatch};
pub use expansion::{apply_limits, compute_expansion, Expansion};
pub use gallery::Gallery;
pub use gesture::{HoverIntent, IntentSignal};
pub use group::{GroupSpec, ImageGroup, ImageLink, ImageRef, ImageSpec};
pub use rotation::{plan_step, RotationEngine, RotationStep, StartOutcome, TickOutcome};
pub use scheduler::{Scheduler, Task, TaskId};
pub use store::{GroupState, GroupStore};
pub use touch::{DeviceCapabilities, DeviceClass, Platform, TapTarget, TouchAction, TouchManager};
pub use types::*;

/// Initialize panic hook for better error messages in browser console.
#[wasm_bindgen(start)]
pub fn init() {
    #[cfg(feature = "console_error_panic_hook")]
    console_error_panic_hook::set_once();
}

/// Construction request. Every field is optional.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineInit {
    pub options: GalleryOptions,
    pub device: DeviceClass,
    pub viewport: Viewport,
    /// Host clock reading at construction.
    pub now: Millis,
}

/// Gallery engine exposed to JavaScript.
/// Batch interface to minimize JS↔WASM crossings: every call returns the
/// commands the adapter must apply, as a JSON array.
#[wasm_bindgen]
pub struct PeepshowEngine {
    gallery: Gallery,
    /// Commands produced during construction, handed out by the next call.
    pending: CommandBuffer,
}

#[wasm_bindgen]
impl PeepshowEngine {
    #[wasm_bindgen(constructor)]
    pub fn new(init_json: &str) -> Result<PeepshowEngine, JsValue> {
        let init: EngineInit = serde_json::from_str(init_json)
            .map_err(|e| js_error(GalleryError::InvalidConfig(e.to_string())))?;
        Ok(PeepshowEngine::from_init(init))
    }

    /// Register an image group. Returns its handle.
    pub fn add_group(&mut self, group_json: &str) -> Result<u32, JsValue> {
        let spec: GroupSpec = serde_json::from_str(group_json)
            .map_err(|e| js_error(GalleryError::InvalidConfig(e.to_string())))?;
        let id = self.gallery.add_group(spec.images, &mut self.pending).map_err(js_error)?;
        Ok(id.as_u32())
    }

    /// Process a batch of host events and return the resulting commands.
    /// This is the main entry point.
    pub fn process_events(&mut self, batch_json: &str) -> Result<String, JsValue> {
        let batch: HostEventBatch = serde_json::from_str(batch_json)
            .map_err(|e| js_error(GalleryError::InvalidEvents(e.to_string())))?;
        let mut out = self.take_pending();
        self.gallery.handle_batch(batch, &mut out);
        commands_json(out)
    }

    /// Run every timer due at or before `now_ms`.
    pub fn advance(&mut self, now_ms: u64) -> Result<String, JsValue> {
        let mut out = self.take_pending();
        self.gallery.advance_to(Millis::new(now_ms), &mut out);
        commands_json(out)
    }

    pub fn expand(&mut self, group: u32) -> Result<String, JsValue> {
        let mut out = self.take_pending();
        self.gallery.expand(GroupId::new(group), &mut out);
        commands_json(out)
    }

    pub fn shrink(&mut self, group: u32) -> Result<String, JsValue> {
        let mut out = self.take_pending();
        self.gallery.shrink(GroupId::new(group), &mut out);
        commands_json(out)
    }

    pub fn toggle_rotation(&mut self, group: u32) -> Result<String, JsValue> {
        let mut out = self.take_pending();
        self.gallery.toggle_rotation(GroupId::new(group), &mut out);
        commands_json(out)
    }

    pub fn destroy(&mut self) -> Result<String, JsValue> {
        let mut out = self.take_pending();
        self.gallery.destroy(&mut out);
        commands_json(out)
    }

    /// Snapshot of one group's state as JSON.
    pub fn group_state(&self, group: u32) -> Result<String, JsValue> {
        let id = GroupId::new(group);
        let state = self
            .gallery
            .group_state(id)
            .ok_or_else(|| js_error(GalleryError::UnknownGroup(id)))?;
        serde_json::to_string(state).map_err(|e| js_error(e.into()))
    }

    /// Host time (ms) of the next pending timer, if any.
    pub fn next_due(&self) -> Option<f64> {
        self.gallery.next_due().map(|due| due.as_u64() as f64)
    }

    pub fn touch_enabled(&self) -> bool {
        self.gallery.touch_enabled()
    }

    /// Image attribute the adapter should read captions from.
    pub fn caption_attribute(&self) -> String {
        self.gallery.config().caption_attribute.clone()
    }
}

impl PeepshowEngine {
    /// Build an engine from an already-parsed request.
    pub fn from_init(init: EngineInit) -> PeepshowEngine {
        let (config, _) = GalleryConfig::resolve(init.options);
        let mut pending = CommandBuffer::new();
        let gallery = Gallery::new(config, Box::new(init.device), init.viewport, init.now, &mut pending);
        PeepshowEngine { gallery, pending }
    }

    pub fn gallery(&self) -> &Gallery {
        &self.gallery
    }

    fn take_pending(&mut self) -> CommandBuffer {
        std::mem::take(&mut self.pending)
    }
}

fn commands_json(out: CommandBuffer) -> Result<String, JsValue> {
    serde_json::to_string(&out).map_err(|e| js_error(e.into()))
}

fn js_error(err: GalleryError) -> JsValue {
    js_sys::Error::new(&err.to_string()).into()
}
