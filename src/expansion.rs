// Expansion sizing. Width and height are clamped independently into the configured
// bounds; no aspect ratio is preserved.

use crate::commands::Geometry;
use crate::config::GalleryConfig;
use crate::store::GroupState;
use crate::types::{Dim, Offsets};

/// Target size of an expanded group and the margins that keep it centred.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Expansion {
    pub size: Dim,
    pub offsets: Offsets,
}

impl Expansion {
    pub fn geometry(&self) -> Geometry {
        Geometry::centered(self.size, self.offsets)
    }
}

/// Clamp a candidate size into `[min_expansion, max_expansion]`.
pub fn apply_limits(dim: Dim, config: &GalleryConfig) -> Dim {
    dim.clamp(config.min_expansion, config.max_expansion)
}

/// Compute the expansion for the active image. With `retain_max_expansion` the
/// group never shrinks below the largest size it reached since its last shrink;
/// the cached size is stored already clamped.
pub fn compute_expansion(active: Dim, state: &mut GroupState, config: &GalleryConfig) -> Expansion {
    let candidate = match (config.retain_max_expansion, state.max_dim) {
        (true, Some(max_dim)) => active.max(max_dim),
        _ => active,
    };
    let size = apply_limits(candidate, config);

    if config.retain_max_expansion {
        state.max_dim = Some(state.max_dim.map_or(size, |max_dim| max_dim.max(size)));
    }

    Expansion {
        size,
        offsets: size.centering_offsets(),
    }
}

/// Geometry of a cropped, collapsed group.
pub fn collapsed_geometry() -> Geometry {
    Geometry::fill()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::GalleryOptions;

    fn config(retain: bool) -> GalleryConfig {
        GalleryConfig::resolve(GalleryOptions {
            crop: [200, 200],
            min_expansion: [300, 300],
            max_expansion: [500, 500],
            retain_max_expansion: retain,
            ..Default::default()
        })
        .0
    }

    #[test]
    fn small_image_clamps_to_min() {
        let mut state = GroupState::default();
        let expansion = compute_expansion(Dim::new(100, 100), &mut state, &config(false));
        assert_eq!(expansion.size, Dim::new(300, 300));
        assert_eq!(expansion.offsets, Offsets { x: -150, y: -150 });
    }

    #[test]
    fn axes_clamp_independently() {
        let mut state = GroupState::default();
        let expansion = compute_expansion(Dim::new(900, 200), &mut state, &config(false));
        assert_eq!(expansion.size, Dim::new(500, 300));
        assert_eq!(state.max_dim, None);
    }

    #[test]
    fn retained_size_never_shrinks() {
        let config = config(true);
        let mut state = GroupState::default();
        compute_expansion(Dim::new(480, 320), &mut state, &config);
        let expansion = compute_expansion(Dim::new(320, 450), &mut state, &config);
        assert_eq!(expansion.size, Dim::new(480, 450));
        assert_eq!(state.max_dim, Some(Dim::new(480, 450)));
    }

    #[test]
    fn retained_size_is_stored_clamped() {
        let config = config(true);
        let mut state = GroupState::default();
        compute_expansion(Dim::new(2_000, 50), &mut state, &config);
        assert_eq!(state.max_dim, Some(Dim::new(500, 300)));
    }

    #[test]
    fn expanded_geometry_is_centred() {
        let mut state = GroupState::default();
        let geometry = compute_expansion(Dim::new(400, 301), &mut state, &config(false)).geometry();
        assert_eq!(geometry.margin_left, -200);
        assert_eq!(geometry.margin_top, -150);
        assert_eq!(collapsed_geometry(), Geometry::fill());
    }

    mod property_tests {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            #[test]
            fn expansion_stays_within_bounds(
                sizes in proptest::collection::vec((0u32..5_000, 0u32..5_000), 1..10),
                retain in any::<bool>(),
            ) {
                let config = config(retain);
                let mut state = GroupState::default();
                for (w, h) in sizes {
                    let expansion = compute_expansion(Dim::new(w, h), &mut state, &config);
                    prop_assert!(config.min_expansion.fits_within(expansion.size));
                    prop_assert!(expansion.size.fits_within(config.max_expansion));
                    if let Some(max_dim) = state.max_dim {
                        prop_assert!(max_dim.fits_within(config.max_expansion));
                    }
                }
            }

            #[test]
            fn retained_cache_is_monotonic(sizes in proptest::collection::vec((0u32..2_000, 0u32..2_000), 2..10)) {
                let config = config(true);
                let mut state = GroupState::default();
                let mut previous = Dim::ZERO;
                for (w, h) in sizes {
                    compute_expansion(Dim::new(w, h), &mut state, &config);
                    let cached = state.max_dim.unwrap_or(Dim::ZERO);
                    prop_assert!(previous.fits_within(cached));
                    previous = cached;
                }
            }
        }
    }
}
