// Per-group state, owned by an arena indexed by group identity.
// Handlers only ever touch the state of the group they were invoked for.

use serde::Serialize;

use crate::error::Anomaly;
use crate::group::{ImageGroup, ImageRef};
use crate::types::{Dim, GalleryId, GroupId, RotateState};

/// Mutable state of one group, alive as long as the group is registered.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GroupState {
    /// Index into the group's image sequence of the image on display.
    pub displayed_index: usize,
    /// User-facing counter, 1-based.
    pub human_step: u32,
    pub rotate_state: RotateState,
    pub expanded: bool,
    /// Largest expansion reached since the last shrink.
    pub max_dim: Option<Dim>,
    /// Rotation is held back waiting for the next image to load.
    pub awaiting_image: bool,
}

impl Default for GroupState {
    fn default() -> Self {
        GroupState {
            displayed_index: 0,
            human_step: 1,
            rotate_state: RotateState::Idle,
            expanded: false,
            max_dim: None,
            awaiting_image: false,
        }
    }
}

#[derive(Debug)]
struct Slot {
    group: ImageGroup,
    state: Option<GroupState>,
}

/// Arena of groups. A `GroupId` is the slot index; removed slots stay vacant.
#[derive(Debug, Default)]
pub struct GroupStore {
    slots: Vec<Option<Slot>>,
}

impl GroupStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, gallery: GalleryId, images: Vec<ImageRef>) -> GroupId {
        let id = GroupId::new(self.slots.len() as u32);
        self.slots.push(Some(Slot {
            group: ImageGroup::new(id, gallery, images),
            state: Some(GroupState::default()),
        }));
        id
    }

    pub fn remove(&mut self, id: GroupId) -> Option<ImageGroup> {
        self.slots
            .get_mut(id.slot())
            .and_then(Option::take)
            .map(|slot| slot.group)
    }

    pub fn contains(&self, id: GroupId) -> bool {
        self.slot(id).is_some()
    }

    pub fn group(&self, id: GroupId) -> Option<&ImageGroup> {
        self.slot(id).map(|slot| &slot.group)
    }

    pub fn group_mut(&mut self, id: GroupId) -> Option<&mut ImageGroup> {
        self.slot_mut(id).map(|slot| &mut slot.group)
    }

    /// Recorded state, without initializing it.
    pub fn state(&self, id: GroupId) -> Option<&GroupState> {
        self.slot(id).and_then(|slot| slot.state.as_ref())
    }

    /// State for a registered group, initialized to defaults if none was recorded.
    pub fn state_mut(&mut self, id: GroupId) -> Option<&mut GroupState> {
        self.entry(id).map(|(_, state)| state)
    }

    /// Group and its state, borrowed together.
    pub fn entry(&mut self, id: GroupId) -> Option<(&ImageGroup, &mut GroupState)> {
        let slot = self.slot_mut(id)?;
        let state = slot.state.get_or_insert_with(|| {
            Anomaly::MissingGroupState(id).log();
            GroupState::default()
        });
        Some((&slot.group, state))
    }

    /// Forget every group's state. Groups stay registered.
    pub fn clear_states(&mut self) {
        for slot in self.slots.iter_mut().flatten() {
            slot.state = None;
        }
    }

    pub fn ids(&self) -> Vec<GroupId> {
        self.slots
            .iter()
            .flatten()
            .map(|slot| slot.group.id)
            .collect()
    }

    pub fn len(&self) -> usize {
        self.slots.iter().flatten().count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn slot(&self, id: GroupId) -> Option<&Slot> {
        self.slots.get(id.slot()).and_then(Option::as_ref)
    }

    fn slot_mut(&mut self, id: GroupId) -> Option<&mut Slot> {
        self.slots.get_mut(id.slot()).and_then(Option::as_mut)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::group::ImageSpec;

    fn images(count: usize) -> Vec<ImageRef> {
        (0..count)
            .map(|i| {
                ImageRef::from_spec(ImageSpec {
                    src: format!("{i}.jpg"),
                    ..Default::default()
                })
            })
            .collect()
    }

    #[test]
    fn ids_are_slot_indices() {
        let mut store = GroupStore::new();
        let gallery = GalleryId::next();
        let a = store.insert(gallery, images(2));
        let b = store.insert(gallery, images(3));
        assert_eq!(a.as_u32(), 0);
        assert_eq!(b.as_u32(), 1);
        assert_eq!(store.group(b).map(ImageGroup::len), Some(3));
    }

    #[test]
    fn missing_state_is_lazily_defaulted() {
        let mut store = GroupStore::new();
        let id = store.insert(GalleryId::next(), images(2));
        store.state_mut(id).unwrap().displayed_index = 1;

        store.clear_states();
        assert!(store.state(id).is_none());

        let state = store.state_mut(id).unwrap();
        assert_eq!(*state, GroupState::default());
    }

    #[test]
    fn removed_ids_are_not_reused() {
        let mut store = GroupStore::new();
        let gallery = GalleryId::next();
        let a = store.insert(gallery, images(1));
        assert!(store.remove(a).is_some());
        assert!(!store.contains(a));
        assert!(store.state_mut(a).is_none());

        let b = store.insert(gallery, images(1));
        assert_ne!(a, b);
        assert_eq!(store.ids(), vec![b]);
    }
}
