use super::*;
use crate::hw::ObjHardware;
use crate::{debug_log, debug_log::Subsystems};

impl<H: ObjHardware> SpritesManager<H> {
    /// Give every on screen sprite a slot, in draw order, packed from slot 0.
    ///
    /// Slots left over from a larger previous frame are hidden.
    pub(super) fn compact_handles(&mut self) {
        if !self.rebuild_handles {
            return;
        }
        self.rebuild_handles = false;

        let handles_count = self.handles.len();
        let mut visible_items_count = 0;
        for index in self.sorted.iter() {
            let item = self.items.get_by_index_mut(index);
            if item.on_screen {
                assert!(
                    visible_items_count < handles_count,
                    "Too many sprites on screen: {}",
                    visible_items_count + 1
                );
                item.handles_index = Some(visible_items_count as u8);
                item.handle.copy_to(&mut self.handles[visible_items_count]);
                visible_items_count += 1;
            } else {
                item.handles_index = None;
            }
        }

        let last_visible_items_count = self.last_visible_items_count;
        for handle in self
            .handles
            .iter_mut()
            .take(last_visible_items_count)
            .skip(visible_items_count)
        {
            handle.hide();
        }

        let rebuilt_count = visible_items_count.max(last_visible_items_count);
        if rebuilt_count > 0 {
            self.commit_range
                .merge_in(DirtyRange::new(0, rebuilt_count - 1));
        }
        self.last_visible_items_count = visible_items_count;

        debug_log!(
            Subsystems::SortedSprites,
            "Rebuilt handles: {} on screen, {} before",
            visible_items_count,
            last_visible_items_count
        );
    }
}
