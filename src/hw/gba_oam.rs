//! Writes to the real OAM, object VRAM and object palette RAM.

use core::ptr;

use super::ObjHardware;
use crate::shared_constants::*;
use crate::sprite::HwHandle;

/// Address at which OAM starts.
const OAM_BASE_ADDR: usize = 0x700_0000;
/// Address of the first object tile (charblock 4).
const OBJ_TILES_BASE_ADDR: usize = 0x601_0000;
/// Address of the first object palette color.
const OBJ_PALRAM_BASE_ADDR: usize = 0x500_0200;
/// Size of a single OAM entry in bytes.
const OAM_ENTRY_SIZE_BYTES: usize = 8;

/// The console's sprite memory.
///
/// # Safety
///
/// This assumes that it's in complete control over OAM, the object charblocks and
/// object palette RAM. Any usage of these memory areas without going through this struct is UB.
///
/// Using more than one `GbaObjHardware` is also UB.
#[derive(Debug)]
pub struct GbaObjHardware {
    _private: (),
}

impl GbaObjHardware {
    /// # Safety
    ///
    /// Must be called at most once.
    pub unsafe fn new() -> GbaObjHardware {
        return GbaObjHardware { _private: () };
    }
}

impl ObjHardware for GbaObjHardware {
    fn commit_handles(&mut self, handles: &[HwHandle], first_index: usize) {
        // Make sure we don't write into random memory
        if first_index + handles.len() > OAM_ENTRIES {
            panic!(
                "Attempt to commit {} OAM entries starting at entry {}",
                handles.len(),
                first_index
            );
        }
        // OAM only accepts 16 and 32 bit writes, so no memcpy
        let dest = (OAM_BASE_ADDR + first_index * OAM_ENTRY_SIZE_BYTES) as *mut u16;
        for (i, handle) in handles.iter().enumerate() {
            unsafe {
                let entry = dest.add(i * 4);
                ptr::write_volatile(entry, handle.attr0);
                ptr::write_volatile(entry.add(1), handle.attr1);
                ptr::write_volatile(entry.add(2), handle.attr2);
                ptr::write_volatile(entry.add(3) as *mut i16, handle.affine_param);
            }
        }
    }

    fn write_tiles(&mut self, first_block: usize, data: &[u32]) {
        if first_block * TILE4BPP_NUM_U32S + data.len() > OBJ_VRAM_BLOCKS * TILE4BPP_NUM_U32S {
            panic!(
                "Attempt to write {} words of tiles starting at block {}",
                data.len(),
                first_block
            );
        }
        let dest = (OBJ_TILES_BASE_ADDR + first_block * TILE4BPP_NUM_U32S * 4) as *mut u32;
        for (i, word) in data.iter().enumerate() {
            unsafe {
                ptr::write_volatile(dest.add(i), *word);
            }
        }
    }

    fn write_palette(&mut self, first_color: usize, colors: &[u16]) {
        if first_color + colors.len() > OBJ_PALETTE_COLORS {
            panic!(
                "Attempt to write {} colors starting at color {}",
                colors.len(),
                first_color
            );
        }
        let dest = (OBJ_PALRAM_BASE_ADDR + first_color * 2) as *mut u16;
        for (i, color) in colors.iter().enumerate() {
            unsafe {
                ptr::write_volatile(dest.add(i), *color);
            }
        }
    }
}
