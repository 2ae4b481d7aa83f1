//! This module manages sprite tiles in object VRAM.
//! The interface is allocator-like, with reference counted allocations.
//!
//! Object VRAM (charblocks 4 and 5) is treated as 1024 32 byte blocks, so DISPCNT has to be
//! set for 1D mapping. Tile sets are deduplicated: creating the same tiles twice hands out
//! the same allocation.
//!
//! Heavily inspired by this article: https://www.gamasutra.com/view/feature/131491/gameboy_advance_resource_management.php?print=1

use core::hash::{BuildHasherDefault, Hasher};

use alloc::boxed::Box;
use alloc::vec::Vec;

use hashbrown::HashMap;
use twox_hash::XxHash64;

use super::SpriteAllocError;
use crate::hw::ObjHardware;
use crate::shared_constants::*;
use crate::{debug_log, debug_log::Subsystems};

#[derive(PartialEq, Clone, Copy, Debug)]
enum SpriteBlockState {
    Unused,
    Used,
    Continue,
}

/// Reference to a tile set allocated in object VRAM.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SpriteTilesId(u16);

impl SpriteTilesId {
    pub fn index(&self) -> usize {
        return self.0 as usize;
    }
}

#[derive(Debug)]
struct TilesEntry {
    data: &'static [u32],
    data_hash: u64,
    starting_block: usize,
    blocks_count: usize,
    usages: u16,
}

/// An allocator for sprite tiles in object VRAM.
#[derive(Debug)]
pub struct SpriteTilesManager {
    allocation_map: Box<[SpriteBlockState; OBJ_VRAM_BLOCKS]>,
    entries: Vec<Option<TilesEntry>>,
    by_hash: HashMap<u64, SpriteTilesId, BuildHasherDefault<XxHash64>>,
}

impl SpriteTilesManager {
    pub fn new() -> SpriteTilesManager {
        return SpriteTilesManager {
            allocation_map: Box::new([SpriteBlockState::Unused; OBJ_VRAM_BLOCKS]),
            entries: Vec::new(),
            by_hash: HashMap::default(),
        };
    }

    /// Returns a reference to the given tiles, allocating and uploading them if they aren't in VRAM yet.
    ///
    /// `data` must be made of whole 32 byte blocks. 8bpp tiles are aligned to an even block.
    /// The caller owns one usage of the returned reference.
    pub fn create_or_find<H: ObjHardware>(
        &mut self,
        data: &'static [u32],
        eight_bpp: bool,
        hw: &mut H,
    ) -> Result<SpriteTilesId, SpriteAllocError> {
        if data.is_empty() || data.len() % TILE4BPP_NUM_U32S != 0 {
            panic!("Invalid sprite tiles data length: {}", data.len());
        }

        let data_hash = hash_tiles(data, eight_bpp);
        if let Some(id) = self.by_hash.get(&data_hash).copied() {
            if let Some(entry) = self.entries[id.index()].as_mut() {
                if entry.data == data {
                    entry.usages += 1;
                    return Ok(id);
                }
            }
        }

        // Find first spot with enough contiguous free blocks to hold the tiles
        let blocks_count = data.len() / TILE4BPP_NUM_U32S;
        let alignment = if eight_bpp { 2 } else { 1 };
        let begin_index = match self.find_contiguous_free_blocks(blocks_count, alignment) {
            Some(begin_index) => begin_index,
            None => {
                debug_log!(
                    Subsystems::SpriteTiles,
                    "No room for {} blocks ({} in use)",
                    blocks_count,
                    self.used_blocks_count()
                );
                return Err(SpriteAllocError::VramFull);
            }
        };

        // Mark blocks as occupied
        self.allocation_map[begin_index] = SpriteBlockState::Used;
        for i in 1..blocks_count {
            self.allocation_map[begin_index + i] = SpriteBlockState::Continue;
        }

        hw.write_tiles(begin_index, data);

        let entry = TilesEntry {
            data,
            data_hash,
            starting_block: begin_index,
            blocks_count,
            usages: 1,
        };
        let id = match self.entries.iter().position(|entry| entry.is_none()) {
            Some(free) => {
                self.entries[free] = Some(entry);
                SpriteTilesId(free as u16)
            }
            None => {
                self.entries.push(Some(entry));
                SpriteTilesId((self.entries.len() - 1) as u16)
            }
        };
        self.by_hash.insert(data_hash, id);

        debug_log!(
            Subsystems::SpriteTiles,
            "Allocated {} blocks at block #{}",
            blocks_count,
            begin_index
        );
        return Ok(id);
    }

    /// Return the index of the beginning of the first area in the allocation map
    /// with sufficient space.
    fn find_contiguous_free_blocks(&self, num_blocks: usize, alignment: usize) -> Option<usize> {
        if num_blocks > OBJ_VRAM_BLOCKS {
            return None;
        }
        let mut i = 0;
        while i + num_blocks <= OBJ_VRAM_BLOCKS {
            match self.allocation_map[i..i + num_blocks]
                .iter()
                .rposition(|block| *block != SpriteBlockState::Unused)
            {
                // Skip past the last used block of the window
                Some(used) => {
                    i += used + 1;
                    i = (i + alignment - 1) / alignment * alignment;
                }
                None => return Some(i),
            }
        }
        return None;
    }

    fn entry(&self, id: SpriteTilesId) -> &TilesEntry {
        match self.entries.get(id.index()).and_then(|entry| entry.as_ref()) {
            Some(entry) => entry,
            None => panic!("Invalid sprite tiles id: {:?}", id),
        }
    }

    fn entry_mut(&mut self, id: SpriteTilesId) -> &mut TilesEntry {
        match self.entries.get_mut(id.index()).and_then(|entry| entry.as_mut()) {
            Some(entry) => entry,
            None => panic!("Invalid sprite tiles id: {:?}", id),
        }
    }

    pub fn increase_usages(&mut self, id: SpriteTilesId) {
        self.entry_mut(id).usages += 1;
    }

    /// Drop one usage of the given tiles, freeing the allocation when it was the last one.
    /// Note that the tiles still exist in VRAM until overwritten.
    pub fn decrease_usages(&mut self, id: SpriteTilesId) {
        let entry = self.entry_mut(id);
        entry.usages -= 1;
        if entry.usages > 0 {
            return;
        }

        let starting_block = entry.starting_block;
        let data_hash = entry.data_hash;
        self.entries[id.index()] = None;
        if self.by_hash.get(&data_hash) == Some(&id) {
            self.by_hash.remove(&data_hash);
        }

        // Mark the first block as unused
        self.allocation_map[starting_block] = SpriteBlockState::Unused;

        // Deallocate all blocks that are marked CONTINUE after the first block
        // (therefore part of this allocation)
        let mut i = starting_block + 1;
        while i < OBJ_VRAM_BLOCKS && self.allocation_map[i] == SpriteBlockState::Continue {
            self.allocation_map[i] = SpriteBlockState::Unused;
            i += 1;
        }

        debug_log!(
            Subsystems::SpriteTiles,
            "Freed {} blocks at block #{}",
            i - starting_block,
            starting_block
        );
    }

    pub fn usages(&self, id: SpriteTilesId) -> u16 {
        return self.entry(id).usages;
    }

    /// Size of the allocation in 32 byte blocks.
    pub fn tiles_count(&self, id: SpriteTilesId) -> usize {
        return self.entry(id).blocks_count;
    }

    /// Tile index to write into OAM.
    pub fn first_tile_index(&self, id: SpriteTilesId) -> u16 {
        return self.entry(id).starting_block as u16;
    }

    pub fn used_blocks_count(&self) -> usize {
        return self
            .allocation_map
            .iter()
            .filter(|block| **block != SpriteBlockState::Unused)
            .count();
    }

    pub fn available_blocks_count(&self) -> usize {
        return OBJ_VRAM_BLOCKS - self.used_blocks_count();
    }
}

impl Default for SpriteTilesManager {
    fn default() -> SpriteTilesManager {
        return SpriteTilesManager::new();
    }
}

fn hash_tiles(data: &[u32], eight_bpp: bool) -> u64 {
    let mut hasher = XxHash64::default();
    hasher.write_u8(eight_bpp as u8);
    for word in data {
        hasher.write_u32(*word);
    }
    return hasher.finish();
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hw::ShadowObjHardware;

    static FOUR_BLOCKS: [u32; 32] = [0x1111_1111; 32];
    static OTHER_FOUR_BLOCKS: [u32; 32] = [0x2222_2222; 32];
    static ONE_BLOCK: [u32; 8] = [0x3333_3333; 8];
    static WHOLE_VRAM: [u32; OBJ_VRAM_BLOCKS * TILE4BPP_NUM_U32S] =
        [0x4444_4444; OBJ_VRAM_BLOCKS * TILE4BPP_NUM_U32S];

    #[test]
    fn same_tiles_are_shared() {
        let mut hw = ShadowObjHardware::new();
        let mut tiles = SpriteTilesManager::new();
        let first = tiles.create_or_find(&FOUR_BLOCKS, false, &mut hw).unwrap();
        let second = tiles.create_or_find(&FOUR_BLOCKS, false, &mut hw).unwrap();
        assert_eq!(first, second);
        assert_eq!(tiles.usages(first), 2);
        assert_eq!(tiles.used_blocks_count(), 4);
        assert_eq!(&hw.tiles()[..32], &FOUR_BLOCKS[..]);
    }

    #[test]
    fn allocations_are_first_fit() {
        let mut hw = ShadowObjHardware::new();
        let mut tiles = SpriteTilesManager::new();
        let a = tiles.create_or_find(&FOUR_BLOCKS, false, &mut hw).unwrap();
        let b = tiles.create_or_find(&OTHER_FOUR_BLOCKS, false, &mut hw).unwrap();
        assert_eq!(tiles.first_tile_index(a), 0);
        assert_eq!(tiles.first_tile_index(b), 4);

        tiles.decrease_usages(a);
        assert_eq!(tiles.used_blocks_count(), 4);
        let c = tiles.create_or_find(&ONE_BLOCK, false, &mut hw).unwrap();
        assert_eq!(tiles.first_tile_index(c), 0);
        assert_eq!(tiles.tiles_count(c), 1);
    }

    #[test]
    fn eight_bpp_tiles_are_aligned() {
        let mut hw = ShadowObjHardware::new();
        let mut tiles = SpriteTilesManager::new();
        tiles.create_or_find(&ONE_BLOCK, false, &mut hw).unwrap();
        let aligned = tiles.create_or_find(&FOUR_BLOCKS, true, &mut hw).unwrap();
        assert_eq!(tiles.first_tile_index(aligned), 2);
    }

    #[test]
    fn exhausting_vram_is_an_error() {
        let mut hw = ShadowObjHardware::new();
        let mut tiles = SpriteTilesManager::new();
        let all = tiles.create_or_find(&WHOLE_VRAM, false, &mut hw).unwrap();
        assert_eq!(tiles.available_blocks_count(), 0);
        assert_eq!(
            tiles.create_or_find(&ONE_BLOCK, false, &mut hw),
            Err(SpriteAllocError::VramFull)
        );

        // Reclaiming VRAM works
        tiles.decrease_usages(all);
        assert_eq!(tiles.available_blocks_count(), OBJ_VRAM_BLOCKS);
        assert!(tiles.create_or_find(&ONE_BLOCK, false, &mut hw).is_ok());
    }

    #[test]
    #[should_panic(expected = "Invalid sprite tiles id")]
    fn freed_ids_are_rejected() {
        let mut hw = ShadowObjHardware::new();
        let mut tiles = SpriteTilesManager::new();
        let id = tiles.create_or_find(&ONE_BLOCK, false, &mut hw).unwrap();
        tiles.decrease_usages(id);
        tiles.tiles_count(id);
    }
}
