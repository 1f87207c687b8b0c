// Image groups: the ordered images of one gallery item, plus the index arithmetic
// rotation needs (thumbnail-aware successor search, human-facing ordinals).

use serde::{Deserialize, Serialize};

use crate::types::{Dim, GalleryId, GroupId, LoadState};

/// Link an image was wrapped in. Preserved so touch mode can replay it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct ImageLink {
    #[serde(default)]
    pub href: Option<String>,
    #[serde(default)]
    pub target: Option<String>,
    /// The anchor carried an inline onclick handler.
    #[serde(default)]
    pub has_onclick: bool,
}

impl ImageLink {
    /// Href worth navigating to (`javascript:` pseudo-links excluded).
    pub fn navigable_href(&self) -> Option<&str> {
        self.href
            .as_deref()
            .map(str::trim)
            .filter(|href| !href.is_empty() && !href.to_ascii_lowercase().starts_with("javascript:"))
    }

    pub fn opens_new_window(&self) -> bool {
        self.target
            .as_deref()
            .is_some_and(|target| target.eq_ignore_ascii_case("_blank"))
    }
}

/// One image as described by the adapter when a group is registered.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct ImageSpec {
    #[serde(default)]
    pub src: String,
    /// Intrinsic size, when the image was already loaded at registration.
    #[serde(default)]
    pub width: Option<u32>,
    #[serde(default)]
    pub height: Option<u32>,
    /// Placeholder shown only while the group is cropped.
    #[serde(default)]
    pub thumbnail: bool,
    #[serde(default)]
    pub caption: Option<String>,
    #[serde(default)]
    pub link: Option<ImageLink>,
}

/// Request body for registering a group.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct GroupSpec {
    pub images: Vec<ImageSpec>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ImageRef {
    pub src: String,
    pub intrinsic: Option<Dim>,
    pub is_thumbnail: bool,
    pub caption: Option<String>,
    pub link: Option<ImageLink>,
    pub load_state: LoadState,
    /// The not-found fallback has already replaced the original source.
    pub fallback_applied: bool,
}

impl ImageRef {
    pub fn from_spec(spec: ImageSpec) -> Self {
        let intrinsic = match (spec.width, spec.height) {
            (Some(width), Some(height)) => Some(Dim::new(width, height)),
            _ => None,
        };
        ImageRef {
            src: spec.src,
            load_state: if intrinsic.is_some() {
                LoadState::Loaded
            } else {
                LoadState::Pending
            },
            intrinsic,
            is_thumbnail: spec.thumbnail,
            caption: spec.caption.filter(|caption| !caption.is_empty()),
            link: spec.link,
            fallback_applied: false,
        }
    }

    /// Size used for layout. Unloaded images measure as zero, like an unloaded `<img>`.
    pub fn size(&self) -> Dim {
        self.intrinsic.unwrap_or(Dim::ZERO)
    }

    /// Finished loading, successfully or not.
    pub fn is_settled(&self) -> bool {
        self.load_state != LoadState::Pending
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ImageGroup {
    pub id: GroupId,
    /// Owning gallery, by identity only.
    pub gallery: GalleryId,
    pub images: Vec<ImageRef>,
}

impl ImageGroup {
    pub fn new(id: GroupId, gallery: GalleryId, images: Vec<ImageRef>) -> Self {
        ImageGroup {
            id,
            gallery,
            images,
        }
    }

    pub fn len(&self) -> usize {
        self.images.len()
    }

    pub fn is_empty(&self) -> bool {
        self.images.is_empty()
    }

    pub fn image(&self, index: usize) -> Option<&ImageRef> {
        self.images.get(index)
    }

    pub fn image_mut(&mut self, index: usize) -> Option<&mut ImageRef> {
        self.images.get_mut(index)
    }

    /// Number of images that take part in rotation.
    pub fn real_count(&self) -> usize {
        self.images.iter().filter(|image| !image.is_thumbnail).count()
    }

    pub fn is_rotatable(&self) -> bool {
        self.real_count() >= 2
    }

    pub fn first_real(&self) -> Option<usize> {
        self.images.iter().position(|image| !image.is_thumbnail)
    }

    pub fn first_thumbnail(&self) -> Option<usize> {
        self.images.iter().position(|image| image.is_thumbnail)
    }

    /// First non-thumbnail at or after `index`, wrapping.
    pub fn real_at_or_after(&self, index: usize) -> Option<usize> {
        let len = self.images.len();
        (0..len)
            .map(|step| (index + step) % len)
            .find(|&candidate| !self.images[candidate].is_thumbnail)
    }

    /// First non-thumbnail strictly after `index`, wrapping. May return `index`
    /// itself when it is the only real image.
    pub fn next_real_after(&self, index: usize) -> Option<usize> {
        let len = self.images.len();
        (1..=len)
            .map(|step| (index + step) % len)
            .find(|&candidate| !self.images[candidate].is_thumbnail)
    }

    /// 1-based position of `index` among the real images up to and including it.
    pub fn ordinal(&self, index: usize) -> usize {
        self.images
            .iter()
            .take(index + 1)
            .filter(|image| !image.is_thumbnail)
            .count()
    }
}

#[cfg(test)]
pub(crate) mod test_support {
    use super::*;

    /// Group whose images are all loaded at 400x300; `true` marks a thumbnail.
    pub(crate) fn group_of(thumbs: &[bool]) -> ImageGroup {
        let images = thumbs
            .iter()
            .enumerate()
            .map(|(i, &thumbnail)| {
                ImageRef::from_spec(ImageSpec {
                    src: format!("img-{i}.jpg"),
                    width: Some(400),
                    height: Some(300),
                    thumbnail,
                    ..Default::default()
                })
            })
            .collect();
        ImageGroup::new(GroupId::new(0), GalleryId::next(), images)
    }
}

#[cfg(test)]
mod tests {
    use super::test_support::group_of;
    use super::*;

    #[test]
    fn successor_skips_thumbnails_and_wraps() {
        let group = group_of(&[true, false, false]);
        assert_eq!(group.next_real_after(0), Some(1));
        assert_eq!(group.next_real_after(1), Some(2));
        assert_eq!(group.next_real_after(2), Some(1));
        assert_eq!(group.real_at_or_after(0), Some(1));
    }

    #[test]
    fn all_thumbnails_have_no_successor() {
        let group = group_of(&[true, true]);
        assert_eq!(group.next_real_after(0), None);
        assert_eq!(group.real_at_or_after(1), None);
        assert!(!group.is_rotatable());
    }

    #[test]
    fn ordinal_counts_real_images() {
        let group = group_of(&[true, false, false]);
        assert_eq!(group.ordinal(1), 1);
        assert_eq!(group.ordinal(2), 2);
        assert_eq!(group.real_count(), 2);
    }

    #[test]
    fn unloaded_spec_is_pending() {
        let image = ImageRef::from_spec(ImageSpec {
            src: "a.jpg".into(),
            ..Default::default()
        });
        assert_eq!(image.load_state, LoadState::Pending);
        assert_eq!(image.size(), Dim::ZERO);
        assert!(!image.is_settled());
    }

    #[test]
    fn javascript_links_are_not_navigable() {
        let link = ImageLink {
            href: Some("  JavaScript:void(0)".into()),
            target: Some("_BLANK".into()),
            has_onclick: true,
        };
        assert_eq!(link.navigable_href(), None);
        assert!(link.opens_new_window());

        let link = ImageLink {
            href: Some("/photos/1".into()),
            ..Default::default()
        };
        assert_eq!(link.navigable_href(), Some("/photos/1"));
    }
}
