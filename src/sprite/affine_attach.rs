//! Attaching sprites to affine matrices, and keeping them in sync with the matrices pool.

use super::sprite_item::SpriteItem;
use super::*;
use crate::hw::ObjHardware;
use crate::{debug_log, debug_log::Subsystems};

impl<H: ObjHardware> SpritesManager<H> {
    pub fn affine_mat(&self, id: SpriteId) -> Option<SpriteAffineMatId> {
        return self.items.get(id).affine_mat;
    }

    /// Attach the sprite to a matrix, or detach it with `None`.
    ///
    /// The sprite takes its own usage of the matrix. When the sprite removes identity matrices,
    /// attaching one detaches the current matrix instead.
    pub fn set_affine_mat(&mut self, id: SpriteId, affine_mat: Option<SpriteAffineMatId>) {
        let index = self.items.checked_index(id);
        match affine_mat {
            Some(affine_mat) => {
                self.attach_affine_mat(index, affine_mat);
            }
            None => self.detach_affine_mat(index),
        }
    }

    pub fn remove_affine_mat_when_not_needed(&self, id: SpriteId) -> bool {
        return self.items.get(id).remove_affine_mat_when_not_needed;
    }

    pub fn set_remove_affine_mat_when_not_needed(&mut self, id: SpriteId, remove: bool) {
        let index = self.items.checked_index(id);
        let item = self.items.get_by_index_mut(index);
        item.remove_affine_mat_when_not_needed = remove;
        if !remove {
            return;
        }
        if let Some(affine_mat) = item.affine_mat {
            if self.affine_mats.is_identity(affine_mat) {
                self.detach_affine_mat(index);
            }
        }
    }

    /// Whether the sprite is currently rendered with its enlarged area.
    pub fn double_size(&self, id: SpriteId) -> bool {
        return self.items.get(id).handle.double_size();
    }

    pub fn double_size_mode(&self, id: SpriteId) -> DoubleSizeMode {
        return self.items.get(id).double_size_mode;
    }

    pub fn set_double_size_mode(&mut self, id: SpriteId, double_size_mode: DoubleSizeMode) {
        let index = self.items.checked_index(id);
        let item = self.items.get_by_index_mut(index);
        if item.double_size_mode == double_size_mode {
            return;
        }
        item.double_size_mode = double_size_mode;
        self.refresh_double_size(index);
    }

    /// Returns whether the sprite was placed again. An identity matrix the sprite would
    /// remove anyway leaves a sprite without matrix untouched.
    pub(super) fn attach_affine_mat(
        &mut self,
        index: usize,
        affine_mat: SpriteAffineMatId,
    ) -> bool {
        let item = self.items.get_by_index(index);
        let old_affine_mat = item.affine_mat;
        if old_affine_mat == Some(affine_mat) {
            return false;
        }
        if item.remove_affine_mat_when_not_needed && self.affine_mats.is_identity(affine_mat) {
            if old_affine_mat.is_none() {
                return false;
            }
            self.detach_affine_mat(index);
            return true;
        }

        self.affine_mats.increase_usages(affine_mat);
        let item = self.items.get_by_index_mut(index);
        item.affine_mat = Some(affine_mat);
        let double_size = item.double_size(&self.affine_mats);
        item.handle
            .set_affine_mat(affine_mat.index() as u8, double_size);
        let position = item.position;
        if let Some(old_affine_mat) = old_affine_mat {
            self.affine_mats.decrease_usages(old_affine_mat);
        }
        self.place_item(index, position);
        return true;
    }

    /// Back to a regular sprite. The matrix flips are kept as hardware flips.
    pub(super) fn detach_affine_mat(&mut self, index: usize) {
        let item = self.items.get_by_index_mut(index);
        let affine_mat = match item.affine_mat.take() {
            Some(affine_mat) => affine_mat,
            None => return,
        };
        item.handle.remove_affine_mat();
        item.handle
            .set_horizontal_flip(self.affine_mats.horizontal_flip(affine_mat));
        item.handle
            .set_vertical_flip(self.affine_mats.vertical_flip(affine_mat));
        let position = item.position;
        self.affine_mats.decrease_usages(affine_mat);
        self.place_item(index, position);
    }

    /// Make the hardware double size flag match what the sprite asks for.
    /// The footprint changes with it, so the sprite is placed again.
    fn refresh_double_size(&mut self, index: usize) {
        let item = self.items.get_by_index_mut(index);
        let affine_mat = match item.affine_mat {
            Some(affine_mat) => affine_mat,
            None => return,
        };
        let double_size = item.double_size(&self.affine_mats);
        if double_size == item.handle.double_size() {
            return;
        }
        item.handle
            .set_affine_mat(affine_mat.index() as u8, double_size);
        let position = item.position;
        self.place_item(index, position);
    }

    /// React to matrices changed since the last frame, then let the pool write them.
    pub(super) fn check_affine_mats(&mut self) {
        if !self.affine_mats.updated() {
            return;
        }

        for index in 0..self.items.capacity() {
            let (affine_mat, remove, double_size_mode) = match self.items.item_at(index) {
                Some(SpriteItem {
                    affine_mat: Some(affine_mat),
                    remove_affine_mat_when_not_needed,
                    double_size_mode,
                    ..
                }) => (*affine_mat, *remove_affine_mat_when_not_needed, *double_size_mode),
                _ => continue,
            };
            if !self.affine_mats.updated_id(affine_mat) {
                continue;
            }

            if remove && self.affine_mats.is_identity(affine_mat) {
                debug_log!(
                    Subsystems::AffineMats,
                    "Sprite {} doesn't need affine mat {} anymore",
                    index,
                    affine_mat.index()
                );
                self.detach_affine_mat(index);
            } else if double_size_mode == DoubleSizeMode::Auto {
                self.refresh_double_size(index);
            }
        }

        self.affine_mats.update(&mut self.handles);
    }
}
