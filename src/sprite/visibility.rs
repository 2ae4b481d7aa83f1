//! Lazy on screen checks.
//!
//! Only sprites flagged since the last `update()` are looked at. A sprite entering or leaving
//! the screen invalidates the OAM layout, which is rebuilt right after.

use super::*;
use crate::hw::ObjHardware;

impl<H: ObjHardware> SpritesManager<H> {
    pub(super) fn check_items_on_screen(&mut self) {
        let camera_position = self.camera_position;
        let display_width = self.config.display_width;
        let display_height = self.config.display_height;

        while let Some(index) = self.pending_checks.pop() {
            let item = self.items.get_by_index_mut(index as usize);
            item.check_on_screen = false;

            let (x, y) = item.screen_position(camera_position);
            let on_screen = item.visible
                && intersects_display(
                    x,
                    y,
                    item.handle.dimensions(),
                    display_width,
                    display_height,
                );
            if on_screen != item.on_screen {
                item.on_screen = on_screen;
                if !on_screen {
                    item.handles_index = None;
                }
                self.rebuild_handles = true;
            }
        }
    }
}

/// Whether a footprint centered on `(x, y)` covers at least one pixel of the display.
pub(crate) fn intersects_display(
    x: i32,
    y: i32,
    dimensions: Dimensions,
    display_width: i32,
    display_height: i32,
) -> bool {
    let left = x - dimensions.width / 2;
    let top = y - dimensions.height / 2;
    return left + dimensions.width > 0
        && left < display_width
        && top + dimensions.height > 0
        && top < display_height;
}
