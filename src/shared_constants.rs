//! Constants used in multiple modules.

/// Screen height in pixels
pub const SCREEN_HEIGHT: usize = 160;
/// Screen width in pixels
pub const SCREEN_WIDTH: usize = 240;

/// Number of entries in object attribute memory.
pub const OAM_ENTRIES: usize = 128;
/// Number of affine matrices interleaved with the OAM entries.
pub const OAM_AFFINE_MATS: usize = 32;
/// Each affine matrix is spread over the fourth halfword of this many consecutive OAM entries.
pub const OAM_ENTRIES_PER_AFFINE_MAT: usize = 4;
/// Largest background priority an object can be drawn with.
pub const MAX_BG_PRIORITY: u8 = 3;

/// Number of 32 byte blocks of object VRAM (charblocks 4 and 5).
pub const OBJ_VRAM_BLOCKS: usize = 1024;
/// Number of u32's that make up a single 32 byte block (one 4bpp tile).
pub const TILE4BPP_NUM_U32S: usize = 8;
/// Number of 16 color banks in object palette RAM.
pub const OBJ_PALETTE_BANKS: usize = 16;
/// Colors in a single 4bpp palette bank.
pub const COLORS_PER_PALETTE_BANK: usize = 16;
/// Colors in object palette RAM.
pub const OBJ_PALETTE_COLORS: usize = OBJ_PALETTE_BANKS * COLORS_PER_PALETTE_BANK;

/// Upper bound for the number of sprite items a manager can be configured with.
/// Sprites don't need to be on screen to be alive, so this is larger than `OAM_ENTRIES`.
pub const MAX_SPRITE_ITEMS: usize = 256;
