// Gallery options as sent from JS, and the validated configuration the engine runs on.
// Invalid values are clamped to the nearest valid value, never rejected.

use serde::{Deserialize, Serialize};

use crate::error::Anomaly;
use crate::types::{Dim, Easing, Millis, TouchMode, TransitionKind};

/// Transition duration used when the ratio or rotate speed is zero.
pub const DEFAULT_TRANSITION_SPEED: Millis = Millis::new(300);

/// Share of the hover poll interval subtracted from the first rotation tick.
pub const FIRST_TICK_RATIO: f64 = 2.5;

/// Raw options object. Every field is optional on the wire.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GalleryOptions {
    /// Cropped thumbnail size `[w, h]`.
    pub crop: [i64; 2],
    pub min_expansion: [i64; 2],
    pub max_expansion: [i64; 2],
    /// Expansion animation duration (ms). Zero or absent disables the animation.
    pub expand_speed: Option<u64>,
    pub expand_easing: Easing,
    pub shrink_speed: Option<u64>,
    pub shrink_easing: Easing,
    /// Time each image is displayed while rotating (ms).
    pub rotate_speed: i64,
    /// `null` behaves like `"none"`.
    pub transition_effect: Option<TransitionKind>,
    pub transition_effect_speed_ratio: f64,
    pub touch_mode: TouchMode,
    pub retain_max_expansion: bool,
    /// Image attribute the adapter reads captions from.
    pub caption_attribute: String,
    pub play_pause_button: bool,
    pub show_loader: bool,
    /// Fallback source for images that fail to load.
    pub image_not_found: Option<String>,
    pub hover_intent: HoverIntentOptions,
    /// Delay before the touch-mode top overlay fades out (ms).
    pub overlay_fade_after: u64,
}

impl Default for GalleryOptions {
    fn default() -> Self {
        GalleryOptions {
            crop: [200, 200],
            min_expansion: [300, 300],
            max_expansion: [500, 500],
            expand_speed: None,
            expand_easing: Easing::Swing,
            shrink_speed: None,
            shrink_easing: Easing::Swing,
            rotate_speed: 1700,
            transition_effect: Some(TransitionKind::Fade),
            transition_effect_speed_ratio: 0.27,
            touch_mode: TouchMode::Auto,
            retain_max_expansion: true,
            caption_attribute: "caption".to_string(),
            play_pause_button: false,
            show_loader: true,
            image_not_found: Some("img/image-not-found.jpg".to_string()),
            hover_intent: HoverIntentOptions::default(),
            overlay_fade_after: 2000,
        }
    }
}

/// Hover-intent tuning.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(default)]
pub struct HoverIntentOptions {
    /// Manhattan distance (px) below which the pointer counts as settled.
    pub sensitivity: f64,
    /// Poll interval (ms).
    pub interval: u64,
    /// Delay before a confirmed hover reports leave (ms).
    pub timeout: u64,
}

impl Default for HoverIntentOptions {
    fn default() -> Self {
        HoverIntentOptions {
            sensitivity: 9.0,
            interval: 100,
            timeout: 0,
        }
    }
}

/// Validated hover-intent settings.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HoverIntentSettings {
    pub sensitivity: f64,
    pub interval: Millis,
    pub timeout: Millis,
}

/// Duration and easing of one geometry animation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AnimationSpec {
    pub duration: Millis,
    pub easing: Easing,
}

impl AnimationSpec {
    fn from_speed(speed: Option<u64>, easing: Easing) -> Option<AnimationSpec> {
        match speed {
            Some(ms) if ms > 0 => Some(AnimationSpec {
                duration: Millis::new(ms),
                easing,
            }),
            _ => None,
        }
    }
}

/// Immutable, validated configuration.
#[derive(Debug, Clone, PartialEq)]
pub struct GalleryConfig {
    pub crop: Dim,
    pub min_expansion: Dim,
    pub max_expansion: Dim,
    /// `None` means geometry is applied synchronously.
    pub expand_animation: Option<AnimationSpec>,
    pub shrink_animation: Option<AnimationSpec>,
    pub rotate_speed: Millis,
    pub transition: TransitionKind,
    pub transition_speed_ratio: f64,
    pub touch_mode: TouchMode,
    pub retain_max_expansion: bool,
    pub caption_attribute: String,
    pub play_pause_button: bool,
    pub show_loader: bool,
    pub image_not_found: Option<String>,
    pub hover_intent: HoverIntentSettings,
    pub overlay_fade_after: Millis,
}

impl GalleryConfig {
    /// Validate options, clamping anything out of range. Returns the adjustments made.
    pub fn resolve(options: GalleryOptions) -> (GalleryConfig, Vec<Anomaly>) {
        let mut anomalies = Vec::new();
        let defaults = GalleryOptions::default();

        let crop = Dim::new(
            non_negative("crop.width", options.crop[0], &mut anomalies),
            non_negative("crop.height", options.crop[1], &mut anomalies),
        );

        let mut min_expansion = Dim::new(
            non_negative("min_expansion.width", options.min_expansion[0], &mut anomalies),
            non_negative("min_expansion.height", options.min_expansion[1], &mut anomalies),
        );
        let mut max_expansion = Dim::new(
            non_negative("max_expansion.width", options.max_expansion[0], &mut anomalies),
            non_negative("max_expansion.height", options.max_expansion[1], &mut anomalies),
        );

        min_expansion.width = at_least("min_expansion.width", min_expansion.width, crop.width, &mut anomalies);
        min_expansion.height = at_least("min_expansion.height", min_expansion.height, crop.height, &mut anomalies);
        max_expansion.width = at_least("max_expansion.width", max_expansion.width, crop.width, &mut anomalies);
        max_expansion.height = at_least("max_expansion.height", max_expansion.height, crop.height, &mut anomalies);
        // Keeps every clamp result inside [min, max].
        max_expansion.width = at_least("max_expansion.width", max_expansion.width, min_expansion.width, &mut anomalies);
        max_expansion.height = at_least("max_expansion.height", max_expansion.height, min_expansion.height, &mut anomalies);

        let rotate_speed = Millis::new(
            non_negative("rotate_speed", options.rotate_speed, &mut anomalies) as u64,
        );

        let mut ratio = options.transition_effect_speed_ratio;
        if !ratio.is_finite() || ratio < 0.0 {
            anomalies.push(Anomaly::Configuration {
                option: "transition_effect_speed_ratio",
                given: ratio.to_string(),
                adjusted: defaults.transition_effect_speed_ratio.to_string(),
            });
            ratio = defaults.transition_effect_speed_ratio;
        }

        let mut sensitivity = options.hover_intent.sensitivity;
        if !sensitivity.is_finite() || sensitivity < 1.0 {
            anomalies.push(Anomaly::Configuration {
                option: "hover_intent.sensitivity",
                given: sensitivity.to_string(),
                adjusted: "1".into(),
            });
            sensitivity = 1.0;
        }

        let mut interval = options.hover_intent.interval;
        if interval == 0 {
            anomalies.push(Anomaly::Configuration {
                option: "hover_intent.interval",
                given: "0".into(),
                adjusted: "1".into(),
            });
            interval = 1;
        }

        let config = GalleryConfig {
            crop,
            min_expansion,
            max_expansion,
            expand_animation: AnimationSpec::from_speed(options.expand_speed, options.expand_easing),
            shrink_animation: AnimationSpec::from_speed(options.shrink_speed, options.shrink_easing),
            rotate_speed,
            transition: options.transition_effect.unwrap_or(TransitionKind::None),
            transition_speed_ratio: ratio,
            touch_mode: options.touch_mode,
            retain_max_expansion: options.retain_max_expansion,
            caption_attribute: options.caption_attribute,
            play_pause_button: options.play_pause_button,
            show_loader: options.show_loader,
            image_not_found: options.image_not_found.filter(|src| !src.trim().is_empty()),
            hover_intent: HoverIntentSettings {
                sensitivity,
                interval: Millis::new(interval),
                timeout: Millis::new(options.hover_intent.timeout),
            },
            overlay_fade_after: Millis::new(options.overlay_fade_after),
        };

        for anomaly in &anomalies {
            anomaly.log();
        }

        (config, anomalies)
    }

    /// Duration of the fade between two rotated images.
    pub fn transition_speed(&self) -> Millis {
        if self.transition_speed_ratio > 0.0 && !self.rotate_speed.is_zero() {
            self.rotate_speed.scaled(self.transition_speed_ratio)
        } else {
            DEFAULT_TRANSITION_SPEED
        }
    }

    /// Delay before the first rotation tick. Shortened by the hover confirmation
    /// delay so the first image stays on screen as long as the others.
    pub fn first_tick_interval(&self) -> Millis {
        let interval = self.hover_intent.interval.as_u64() as f64;
        let shortened = self.rotate_speed.as_u64() as f64 - FIRST_TICK_RATIO * interval;
        Millis::new(shortened.max(interval) as u64)
    }

    /// Whether a pending next image holds rotation back behind a loading marker.
    pub fn loading_indicator(&self) -> bool {
        self.show_loader && self.play_pause_button
    }
}

impl Default for GalleryConfig {
    fn default() -> Self {
        GalleryConfig::resolve(GalleryOptions::default()).0
    }
}

fn non_negative(option: &'static str, value: i64, anomalies: &mut Vec<Anomaly>) -> u32 {
    let clamped = value.clamp(0, u32::MAX as i64);
    if clamped != value {
        anomalies.push(Anomaly::Configuration {
            option,
            given: value.to_string(),
            adjusted: clamped.to_string(),
        });
    }
    clamped as u32
}

fn at_least(option: &'static str, value: u32, floor: u32, anomalies: &mut Vec<Anomaly>) -> u32 {
    if value < floor {
        anomalies.push(Anomaly::Configuration {
            option,
            given: value.to_string(),
            adjusted: floor.to_string(),
        });
        floor
    } else {
        value
    }
}
