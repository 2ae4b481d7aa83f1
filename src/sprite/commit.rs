//! Per frame entry points.

use super::*;
use crate::hw::ObjHardware;
use crate::{debug_log, debug_log::Subsystems};

impl<H: ObjHardware> SpritesManager<H> {
    /// Bring the shadow table up to date. Can be called at any point of the frame.
    pub fn update(&mut self) {
        self.check_affine_mats();
        self.check_items_on_screen();
        self.compact_handles();
    }

    /// Entries that the next `commit()` will transfer.
    pub fn pending_commit_range(&self) -> DirtyRange {
        return self.commit_range;
    }

    /// Transfer every changed entry of the shadow table in one contiguous write.
    /// Meant to be called during VBlank.
    pub fn commit(&mut self) {
        let multiplier = self.config.affine_mat_multiplier();
        let affine_mats_range = self.affine_mats.retrieve_commit_range().rescale(multiplier);
        let range = self.commit_range.take().merge(affine_mats_range);

        if let Some((first, last)) = range.bounds() {
            debug_log!(Subsystems::Commit, "Committing handles {} - {}", first, last);
            self.hw.commit_handles(&self.handles[first..=last], first);
        }
    }
}
