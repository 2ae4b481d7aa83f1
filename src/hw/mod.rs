//! Access to the memory areas the hardware reads sprites from.
//!
//! Everything in this crate writes to OAM, object VRAM and object palette RAM through
//! [`ObjHardware`]. On the console that is [`GbaObjHardware`], elsewhere a [`ShadowObjHardware`]
//! keeps an in-memory copy plus a log of every transfer.

mod shadow;

#[cfg(target_arch = "arm")]
mod gba_oam;

pub use shadow::{ShadowObjHardware, Transfer};

#[cfg(target_arch = "arm")]
pub use gba_oam::GbaObjHardware;

use crate::sprite::HwHandle;

/// Destination of all sprite related memory writes.
pub trait ObjHardware {
    /// Copy `handles` into OAM, starting at entry `first_index`.
    ///
    /// This is the single bounded transfer issued by `SpritesManager::commit`,
    /// so it must be cheap enough to fit into VBlank.
    fn commit_handles(&mut self, handles: &[HwHandle], first_index: usize);

    /// Copy tile data into object VRAM, starting at the given 32 byte block.
    fn write_tiles(&mut self, first_block: usize, data: &[u32]);

    /// Copy colors into object palette RAM, starting at the given color index.
    fn write_palette(&mut self, first_color: usize, colors: &[u16]);
}
