//! Per-sprite state and the fixed-size pool it lives in.


use alloc::vec::Vec;

use arrayvec::ArrayVec;

use super::{HwHandle, SpriteAffineMatId, SpriteAffineMatsManager, SpritePaletteId, SpriteTilesId};
use crate::shared_constants::MAX_SPRITE_ITEMS;
use crate::shared_types::FixedPoint;

/// Handle to a live sprite.
///
/// The generation makes handles to destroyed sprites detectable, even after their slot
/// in the pool has been reused.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SpriteId {
    index: u16,
    generation: u16,
}

impl SpriteId {
    pub fn index(&self) -> usize {
        return self.index as usize;
    }
}

/// When a sprite with an affine matrix is rendered with twice its regular area.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DoubleSizeMode {
    /// Whenever the matrix could push pixels out of the regular area.
    Auto,
    Enabled,
    Disabled,
}

impl Default for DoubleSizeMode {
    fn default() -> DoubleSizeMode {
        return DoubleSizeMode::Auto;
    }
}

#[derive(Debug)]
pub(crate) struct SpriteItem {
    /// Attributes as they should end up in OAM.
    pub handle: HwHandle,
    pub position: FixedPoint,
    pub tiles: SpriteTilesId,
    pub palette: SpritePaletteId,
    pub affine_mat: Option<SpriteAffineMatId>,
    /// Slot in the hardware table, only while on screen.
    pub handles_index: Option<u8>,
    pub usages: u16,
    pub double_size_mode: DoubleSizeMode,
    pub remove_affine_mat_when_not_needed: bool,
    pub visible: bool,
    pub on_screen: bool,
    pub check_on_screen: bool,
    pub ignore_camera: bool,
}

impl SpriteItem {
    /// Double size flag the attached matrix asks for.
    pub fn double_size(&self, affine_mats: &SpriteAffineMatsManager) -> bool {
        match self.affine_mat {
            Some(affine_mat) => match self.double_size_mode {
                DoubleSizeMode::Auto => affine_mats.double_size(affine_mat),
                DoubleSizeMode::Enabled => true,
                DoubleSizeMode::Disabled => false,
            },
            None => false,
        }
    }

    /// Center of the sprite on screen, in whole pixels.
    pub fn screen_position(&self, camera_position: FixedPoint) -> (i32, i32) {
        if self.ignore_camera {
            return self.position.floor();
        }
        return (self.position - camera_position).floor();
    }
}

#[derive(Debug)]
struct Slot {
    generation: u16,
    item: Option<SpriteItem>,
}

#[derive(Debug)]
pub(crate) struct ItemsPool {
    slots: Vec<Slot>,
    free: ArrayVec<u16, MAX_SPRITE_ITEMS>,
}

impl ItemsPool {
    pub fn new(capacity: usize) -> ItemsPool {
        assert!(
            capacity <= MAX_SPRITE_ITEMS,
            "Items pool capacity too large: {}",
            capacity
        );
        let mut slots = Vec::with_capacity(capacity);
        slots.resize_with(capacity, || Slot {
            generation: 0,
            item: None,
        });
        // Hand out the lowest indices first
        let free = (0..capacity as u16).rev().collect();
        return ItemsPool { slots, free };
    }

    pub fn capacity(&self) -> usize {
        return self.slots.len();
    }

    pub fn len(&self) -> usize {
        return self.slots.len() - self.free.len();
    }

    pub fn is_full(&self) -> bool {
        return self.free.is_empty();
    }

    /// Store a new item. The pool must not be full.
    pub fn create(&mut self, item: SpriteItem) -> SpriteId {
        let index = match self.free.pop() {
            Some(index) => index,
            None => panic!("Sprite items pool is full"),
        };
        let slot = &mut self.slots[index as usize];
        slot.item = Some(item);
        return SpriteId {
            index,
            generation: slot.generation,
        };
    }

    pub fn destroy(&mut self, id: SpriteId) -> SpriteItem {
        let index = self.checked_index(id);
        let slot = &mut self.slots[index];
        slot.generation = slot.generation.wrapping_add(1);
        self.free.push(id.index);
        match slot.item.take() {
            Some(item) => item,
            None => panic!("Invalid sprite id: {:?}", id),
        }
    }

    pub fn contains(&self, id: SpriteId) -> bool {
        match self.slots.get(id.index()) {
            Some(slot) => slot.generation == id.generation && slot.item.is_some(),
            None => false,
        }
    }

    /// Index of a live sprite. Panics on stale or foreign ids.
    pub fn checked_index(&self, id: SpriteId) -> usize {
        if !self.contains(id) {
            panic!("Invalid sprite id: {:?}", id);
        }
        return id.index();
    }

    /// Id of the live item stored at `index`.
    pub fn id_at(&self, index: usize) -> SpriteId {
        return SpriteId {
            index: index as u16,
            generation: self.slots[index].generation,
        };
    }

    pub fn get(&self, id: SpriteId) -> &SpriteItem {
        return self.get_by_index(self.checked_index(id));
    }

    /// The item stored at `index`, if that slot is in use.
    pub fn item_at(&self, index: usize) -> Option<&SpriteItem> {
        return self.slots.get(index).and_then(|slot| slot.item.as_ref());
    }

    pub fn get_by_index(&self, index: usize) -> &SpriteItem {
        match self.slots[index].item.as_ref() {
            Some(item) => item,
            None => panic!("No sprite item at index {}", index),
        }
    }

    pub fn get_by_index_mut(&mut self, index: usize) -> &mut SpriteItem {
        match self.slots[index].item.as_mut() {
            Some(item) => item,
            None => panic!("No sprite item at index {}", index),
        }
    }
}
