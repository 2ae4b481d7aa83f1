use alloc::vec::Vec;

use super::ObjHardware;
use crate::shared_constants::*;
use crate::sprite::HwHandle;

/// A single `commit_handles` call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Transfer {
    pub first_index: usize,
    pub count: usize,
}

/// In-memory stand-in for OAM, object VRAM and object palette RAM.
///
/// Useful for running the manager off the console (tests, tools) and for checking
/// exactly which transfers a frame caused.
#[derive(Debug)]
pub struct ShadowObjHardware {
    oam: Vec<HwHandle>,
    tiles: Vec<u32>,
    palette: Vec<u16>,
    transfers: Vec<Transfer>,
}

impl ShadowObjHardware {
    pub fn new() -> ShadowObjHardware {
        return ShadowObjHardware {
            oam: vec![HwHandle::default(); OAM_ENTRIES],
            tiles: vec![0; OBJ_VRAM_BLOCKS * TILE4BPP_NUM_U32S],
            palette: vec![0; OBJ_PALETTE_COLORS],
            transfers: Vec::new(),
        };
    }

    /// Current contents of OAM.
    pub fn oam(&self) -> &[HwHandle] {
        return &self.oam;
    }

    /// Current contents of object VRAM.
    pub fn tiles(&self) -> &[u32] {
        return &self.tiles;
    }

    /// Current contents of object palette RAM.
    pub fn palette(&self) -> &[u16] {
        return &self.palette;
    }

    /// Every OAM transfer since creation or the last `take_transfers` call.
    pub fn transfers(&self) -> &[Transfer] {
        return &self.transfers;
    }

    /// Returns and forgets the logged OAM transfers.
    pub fn take_transfers(&mut self) -> Vec<Transfer> {
        return core::mem::replace(&mut self.transfers, Vec::new());
    }
}

impl Default for ShadowObjHardware {
    fn default() -> ShadowObjHardware {
        return ShadowObjHardware::new();
    }
}

impl ObjHardware for ShadowObjHardware {
    fn commit_handles(&mut self, handles: &[HwHandle], first_index: usize) {
        // Make sure we don't write past the end of OAM
        if first_index + handles.len() > self.oam.len() {
            panic!(
                "Attempt to commit {} OAM entries starting at entry {}",
                handles.len(),
                first_index
            );
        }
        self.oam[first_index..first_index + handles.len()].copy_from_slice(handles);
        self.transfers.push(Transfer {
            first_index,
            count: handles.len(),
        });
    }

    fn write_tiles(&mut self, first_block: usize, data: &[u32]) {
        let start = first_block * TILE4BPP_NUM_U32S;
        self.tiles[start..start + data.len()].copy_from_slice(data);
    }

    fn write_palette(&mut self, first_color: usize, colors: &[u16]) {
        self.palette[first_color..first_color + colors.len()].copy_from_slice(colors);
    }
}
