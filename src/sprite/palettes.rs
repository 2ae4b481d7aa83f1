//! Reference counted sprite palettes in object palette RAM.
//!
//! 4bpp palettes take a single 16 color bank. An 8bpp palette always starts at color 0
//! and takes as many banks as it needs, so only one of them can be live at a time.

use core::hash::{BuildHasherDefault, Hasher};

use alloc::vec::Vec;

use hashbrown::HashMap;
use twox_hash::XxHash64;

use super::SpriteAllocError;
use crate::hw::ObjHardware;
use crate::shared_constants::*;
use crate::{debug_log, debug_log::Subsystems};

/// Reference to a palette in object palette RAM.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SpritePaletteId(u8);

impl SpritePaletteId {
    pub fn index(&self) -> usize {
        return self.0 as usize;
    }
}

#[derive(Debug)]
struct PaletteEntry {
    colors: &'static [u16],
    data_hash: u64,
    first_bank: usize,
    banks_count: usize,
    eight_bpp: bool,
    usages: u16,
}

#[derive(Debug)]
pub struct SpritePalettesManager {
    banks_used: [bool; OBJ_PALETTE_BANKS],
    entries: Vec<Option<PaletteEntry>>,
    by_hash: HashMap<u64, SpritePaletteId, BuildHasherDefault<XxHash64>>,
}

impl SpritePalettesManager {
    pub fn new() -> SpritePalettesManager {
        return SpritePalettesManager {
            banks_used: [false; OBJ_PALETTE_BANKS],
            entries: Vec::new(),
            by_hash: HashMap::default(),
        };
    }

    /// Returns a reference to the given colors, allocating and uploading them if needed.
    ///
    /// Up to 16 colors make a 4bpp palette, anything larger (in multiples of 16) an 8bpp one.
    /// The caller owns one usage of the returned reference.
    pub fn create_or_find<H: ObjHardware>(
        &mut self,
        colors: &'static [u16],
        hw: &mut H,
    ) -> Result<SpritePaletteId, SpriteAllocError> {
        let eight_bpp = colors.len() > COLORS_PER_PALETTE_BANK;
        if colors.is_empty()
            || colors.len() > OBJ_PALETTE_COLORS
            || (eight_bpp && colors.len() % COLORS_PER_PALETTE_BANK != 0)
        {
            panic!("Invalid sprite palette colors count: {}", colors.len());
        }

        let data_hash = hash_colors(colors);
        if let Some(id) = self.by_hash.get(&data_hash).copied() {
            if let Some(entry) = self.entries[id.index()].as_mut() {
                if entry.colors == colors {
                    entry.usages += 1;
                    return Ok(id);
                }
            }
        }

        let (first_bank, banks_count) = if eight_bpp {
            let banks_count = colors.len() / COLORS_PER_PALETTE_BANK;
            if self.banks_used[..banks_count].iter().any(|used| *used) {
                return Err(SpriteAllocError::PalettesFull);
            }
            (0, banks_count)
        } else {
            match self.banks_used.iter().position(|used| !*used) {
                Some(bank) => (bank, 1),
                None => return Err(SpriteAllocError::PalettesFull),
            }
        };

        for used in &mut self.banks_used[first_bank..first_bank + banks_count] {
            *used = true;
        }
        hw.write_palette(first_bank * COLORS_PER_PALETTE_BANK, colors);

        let entry = PaletteEntry {
            colors,
            data_hash,
            first_bank,
            banks_count,
            eight_bpp,
            usages: 1,
        };
        let id = match self.entries.iter().position(|entry| entry.is_none()) {
            Some(free) => {
                self.entries[free] = Some(entry);
                SpritePaletteId(free as u8)
            }
            None => {
                self.entries.push(Some(entry));
                SpritePaletteId((self.entries.len() - 1) as u8)
            }
        };
        self.by_hash.insert(data_hash, id);

        debug_log!(
            Subsystems::SpritePalettes,
            "Allocated {} colors at bank {}",
            colors.len(),
            first_bank
        );
        return Ok(id);
    }

    fn entry(&self, id: SpritePaletteId) -> &PaletteEntry {
        match self.entries.get(id.index()).and_then(|entry| entry.as_ref()) {
            Some(entry) => entry,
            None => panic!("Invalid sprite palette id: {:?}", id),
        }
    }

    pub fn increase_usages(&mut self, id: SpritePaletteId) {
        match self.entries.get_mut(id.index()).and_then(|entry| entry.as_mut()) {
            Some(entry) => entry.usages += 1,
            None => panic!("Invalid sprite palette id: {:?}", id),
        }
    }

    pub fn decrease_usages(&mut self, id: SpritePaletteId) {
        let entry = match self.entries.get_mut(id.index()).and_then(|entry| entry.as_mut()) {
            Some(entry) => entry,
            None => panic!("Invalid sprite palette id: {:?}", id),
        };
        entry.usages -= 1;
        if entry.usages > 0 {
            return;
        }

        let first_bank = entry.first_bank;
        let banks_count = entry.banks_count;
        let data_hash = entry.data_hash;
        self.entries[id.index()] = None;
        if self.by_hash.get(&data_hash) == Some(&id) {
            self.by_hash.remove(&data_hash);
        }
        for used in &mut self.banks_used[first_bank..first_bank + banks_count] {
            *used = false;
        }
    }

    pub fn usages(&self, id: SpritePaletteId) -> u16 {
        return self.entry(id).usages;
    }

    /// Palette bank to write into OAM. Always 0 for 8bpp palettes.
    pub fn bank(&self, id: SpritePaletteId) -> u8 {
        return self.entry(id).first_bank as u8;
    }

    pub fn eight_bits_per_pixel(&self, id: SpritePaletteId) -> bool {
        return self.entry(id).eight_bpp;
    }

    pub fn colors(&self, id: SpritePaletteId) -> &'static [u16] {
        return self.entry(id).colors;
    }

    pub fn used_colors_count(&self) -> usize {
        return self.banks_used.iter().filter(|used| **used).count() * COLORS_PER_PALETTE_BANK;
    }

    pub fn available_colors_count(&self) -> usize {
        return OBJ_PALETTE_COLORS - self.used_colors_count();
    }
}

impl Default for SpritePalettesManager {
    fn default() -> SpritePalettesManager {
        return SpritePalettesManager::new();
    }
}

fn hash_colors(colors: &[u16]) -> u64 {
    let mut hasher = XxHash64::default();
    for color in colors {
        hasher.write_u16(*color);
    }
    return hasher.finish();
}
