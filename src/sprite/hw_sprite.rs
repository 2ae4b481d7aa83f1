//! Object sizes and the OAM attribute block of a single sprite.

use crate::shared_constants::TILE4BPP_NUM_U32S;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
/// The sizes of sprite that the hardware supports, and are therefore possible to allocate.
pub enum HWSpriteSize {
    EightByEight,
    SixteenBySixteen,
    ThirtyTwoByThirtyTwo,
    SixtyFourBySixtyFour,

    EightBySixteen,
    EightByThirtyTwo,

    SixteenByEight,
    SixteenByThirtyTwo,

    ThirtyTwoByEight,
    ThirtyTwoBySixteen,
    ThirtyTwoBySixtyFour,

    SixtyFourByThirtyTwo,
}

const SHAPE_SQUARE: u16 = 0;
const SHAPE_HORIZONTAL: u16 = 1;
const SHAPE_VERTICAL: u16 = 2;

impl HWSpriteSize {
    /// Returns the sprite's size in bytes.
    pub fn to_size_in_bytes(&self, eight_bpp: bool) -> usize {
        let (width, height) = self.to_size_in_px();
        let pixels = width as usize * height as usize;
        if eight_bpp {
            return pixels;
        }
        return pixels / 2;
    }

    /// Calculates the amount of 32 byte blocks of VRAM required to fit the sprite.
    pub fn to_num_of_32_byte_blocks(&self, eight_bpp: bool) -> usize {
        return self.to_size_in_bytes(eight_bpp) / 32;
    }

    /// Calculates the amount of u32's of tile data the sprite is made of.
    pub fn to_num_of_u32s(&self, eight_bpp: bool) -> usize {
        return self.to_num_of_32_byte_blocks(eight_bpp) * TILE4BPP_NUM_U32S;
    }

    /// Calculates the sprite's size and shape in the format required by OAM.
    pub fn to_obj_size_and_shape(&self) -> (u16, u16) {
        use HWSpriteSize::*;
        match self {
            EightByEight => (0, SHAPE_SQUARE),
            SixteenBySixteen => (1, SHAPE_SQUARE),
            ThirtyTwoByThirtyTwo => (2, SHAPE_SQUARE),
            SixtyFourBySixtyFour => (3, SHAPE_SQUARE),

            EightBySixteen => (0, SHAPE_VERTICAL),
            EightByThirtyTwo => (1, SHAPE_VERTICAL),

            SixteenByEight => (0, SHAPE_HORIZONTAL),
            SixteenByThirtyTwo => (2, SHAPE_VERTICAL),

            ThirtyTwoByEight => (1, SHAPE_HORIZONTAL),
            ThirtyTwoBySixteen => (2, SHAPE_HORIZONTAL),
            ThirtyTwoBySixtyFour => (3, SHAPE_VERTICAL),

            SixtyFourByThirtyTwo => (3, SHAPE_HORIZONTAL),
        }
    }

    /// Inverse of `to_obj_size_and_shape`.
    /// Returns `None` for the prohibited shape.
    pub fn from_obj_size_and_shape(size: u16, shape: u16) -> Option<HWSpriteSize> {
        use HWSpriteSize::*;
        let result = match (size, shape) {
            (0, SHAPE_SQUARE) => EightByEight,
            (1, SHAPE_SQUARE) => SixteenBySixteen,
            (2, SHAPE_SQUARE) => ThirtyTwoByThirtyTwo,
            (3, SHAPE_SQUARE) => SixtyFourBySixtyFour,

            (0, SHAPE_HORIZONTAL) => SixteenByEight,
            (1, SHAPE_HORIZONTAL) => ThirtyTwoByEight,
            (2, SHAPE_HORIZONTAL) => ThirtyTwoBySixteen,
            (3, SHAPE_HORIZONTAL) => SixtyFourByThirtyTwo,

            (0, SHAPE_VERTICAL) => EightBySixteen,
            (1, SHAPE_VERTICAL) => EightByThirtyTwo,
            (2, SHAPE_VERTICAL) => SixteenByThirtyTwo,
            (3, SHAPE_VERTICAL) => ThirtyTwoBySixtyFour,

            _ => return None,
        };
        return Some(result);
    }

    /// Returns the size in pixels in the form (x, y).
    pub fn to_size_in_px(&self) -> (u16, u16) {
        use HWSpriteSize::*;
        match self {
            EightByEight => (8, 8),
            SixteenBySixteen => (16, 16),
            ThirtyTwoByThirtyTwo => (32, 32),
            SixtyFourBySixtyFour => (64, 64),

            EightBySixteen => (8, 16),
            EightByThirtyTwo => (8, 32),

            SixteenByEight => (16, 8),
            SixteenByThirtyTwo => (16, 32),

            ThirtyTwoByEight => (32, 8),
            ThirtyTwoBySixteen => (32, 16),
            ThirtyTwoBySixtyFour => (32, 64),

            SixtyFourByThirtyTwo => (64, 32),
        }
    }
}

/// Width and height of a sprite's on-screen footprint in pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Dimensions {
    pub width: i32,
    pub height: i32,
}

const ATTR0_Y_MASK: u16 = 0x00FF;
const ATTR0_AFFINE: u16 = 0x0100;
/// With the affine bit set this doubles the rendering area, without it the object is disabled.
const ATTR0_DOUBLE_SIZE_OR_HIDE: u16 = 0x0200;
const ATTR0_MOSAIC: u16 = 0x1000;
const ATTR0_8BPP: u16 = 0x2000;
const ATTR0_SHAPE_SHIFT: u16 = 14;

const ATTR1_X_MASK: u16 = 0x01FF;
const ATTR1_AFFINE_MAT_SHIFT: u16 = 9;
const ATTR1_AFFINE_MAT_MASK: u16 = 0x3E00;
const ATTR1_HFLIP: u16 = 0x1000;
const ATTR1_VFLIP: u16 = 0x2000;
const ATTR1_SIZE_SHIFT: u16 = 14;

const ATTR2_TILE_MASK: u16 = 0x03FF;
const ATTR2_PRIORITY_SHIFT: u16 = 10;
const ATTR2_PRIORITY_MASK: u16 = 0x0C00;
const ATTR2_PALBANK_SHIFT: u16 = 12;
const ATTR2_PALBANK_MASK: u16 = 0xF000;

/// One entry of object attribute memory, laid out exactly like the hardware does.
///
/// The fourth halfword doesn't belong to the sprite: it holds one parameter of an affine matrix,
/// and is owned by the affine matrix pool. `copy_to` and `hide` leave it alone.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[repr(C)]
pub struct HwHandle {
    pub attr0: u16,
    pub attr1: u16,
    pub attr2: u16,
    pub affine_param: i16,
}

impl HwHandle {
    /// Attribute block of a regular (non-affine) sprite placed at the top-left corner.
    pub fn new(
        size: HWSpriteSize,
        tile_index: u16,
        palette_bank: u8,
        eight_bpp: bool,
        bg_priority: u8,
    ) -> HwHandle {
        let (obj_size, obj_shape) = size.to_obj_size_and_shape();
        let mut attr0 = obj_shape << ATTR0_SHAPE_SHIFT;
        if eight_bpp {
            attr0 |= ATTR0_8BPP;
        }
        let mut handle = HwHandle {
            attr0,
            attr1: obj_size << ATTR1_SIZE_SHIFT,
            attr2: 0,
            affine_param: 0,
        };
        handle.set_tiles(tile_index);
        handle.set_palette_bank(palette_bank);
        handle.set_bg_priority(bg_priority);
        return handle;
    }

    /// An entry the hardware doesn't draw.
    pub const fn hidden() -> HwHandle {
        return HwHandle {
            attr0: ATTR0_DOUBLE_SIZE_OR_HIDE,
            attr1: 0,
            attr2: 0,
            affine_param: 0,
        };
    }

    /// Copy the sprite attributes (but not the affine parameter) into `dest`.
    pub fn copy_to(&self, dest: &mut HwHandle) {
        dest.attr0 = self.attr0;
        dest.attr1 = self.attr1;
        dest.attr2 = self.attr2;
    }

    /// Stop the hardware from drawing this entry.
    pub fn hide(&mut self) {
        self.attr0 = ATTR0_DOUBLE_SIZE_OR_HIDE;
    }

    pub fn is_hidden(&self) -> bool {
        return self.attr0 & (ATTR0_AFFINE | ATTR0_DOUBLE_SIZE_OR_HIDE) == ATTR0_DOUBLE_SIZE_OR_HIDE;
    }

    pub fn size(&self) -> HWSpriteSize {
        let shape = self.attr0 >> ATTR0_SHAPE_SHIFT;
        let size = self.attr1 >> ATTR1_SIZE_SHIFT;
        match HWSpriteSize::from_obj_size_and_shape(size, shape) {
            Some(size) => size,
            None => panic!("Invalid object shape: {}", shape),
        }
    }

    /// Footprint used for placement and visibility, doubled when the double size flag is set.
    pub fn dimensions(&self) -> Dimensions {
        let (width, height) = self.size().to_size_in_px();
        let mut dimensions = Dimensions {
            width: i32::from(width),
            height: i32::from(height),
        };
        if self.double_size() {
            dimensions.width *= 2;
            dimensions.height *= 2;
        }
        return dimensions;
    }

    /// Place the sprite so that its footprint is centered on the given screen position.
    ///
    /// Coordinates are wrapped the way the hardware expects them (9 bits for x, 8 bits for y).
    pub fn set_position(&mut self, x: i32, y: i32) {
        let dimensions = self.dimensions();
        let left = (x - dimensions.width / 2) as u16;
        let top = (y - dimensions.height / 2) as u16;
        self.attr1 = (self.attr1 & !ATTR1_X_MASK) | (left & ATTR1_X_MASK);
        self.attr0 = (self.attr0 & !ATTR0_Y_MASK) | (top & ATTR0_Y_MASK);
    }

    /// Left edge as written to the hardware, sign-extended.
    pub fn x(&self) -> i32 {
        let x = i32::from(self.attr1 & ATTR1_X_MASK);
        if x >= 256 {
            return x - 512;
        }
        return x;
    }

    /// Top edge as written to the hardware.
    pub fn y(&self) -> i32 {
        return i32::from(self.attr0 & ATTR0_Y_MASK);
    }

    pub fn tiles(&self) -> u16 {
        return self.attr2 & ATTR2_TILE_MASK;
    }

    pub fn set_tiles(&mut self, tile_index: u16) {
        self.attr2 = (self.attr2 & !ATTR2_TILE_MASK) | (tile_index & ATTR2_TILE_MASK);
    }

    pub fn eight_bpp(&self) -> bool {
        return self.attr0 & ATTR0_8BPP != 0;
    }

    pub fn palette_bank(&self) -> u8 {
        return ((self.attr2 & ATTR2_PALBANK_MASK) >> ATTR2_PALBANK_SHIFT) as u8;
    }

    /// Ignored by the hardware for 8bpp sprites.
    pub fn set_palette_bank(&mut self, bank: u8) {
        let bank = (u16::from(bank) << ATTR2_PALBANK_SHIFT) & ATTR2_PALBANK_MASK;
        self.attr2 = (self.attr2 & !ATTR2_PALBANK_MASK) | bank;
    }

    pub fn bg_priority(&self) -> u8 {
        return ((self.attr2 & ATTR2_PRIORITY_MASK) >> ATTR2_PRIORITY_SHIFT) as u8;
    }

    pub fn set_bg_priority(&mut self, bg_priority: u8) {
        let bg_priority = (u16::from(bg_priority) << ATTR2_PRIORITY_SHIFT) & ATTR2_PRIORITY_MASK;
        self.attr2 = (self.attr2 & !ATTR2_PRIORITY_MASK) | bg_priority;
    }

    /// Flips share their bits with the affine matrix index, so they only mean something
    /// for non-affine sprites.
    pub fn horizontal_flip(&self) -> bool {
        return !self.is_affine() && self.attr1 & ATTR1_HFLIP != 0;
    }

    pub fn set_horizontal_flip(&mut self, horizontal_flip: bool) {
        if horizontal_flip {
            self.attr1 |= ATTR1_HFLIP;
        } else {
            self.attr1 &= !ATTR1_HFLIP;
        }
    }

    pub fn vertical_flip(&self) -> bool {
        return !self.is_affine() && self.attr1 & ATTR1_VFLIP != 0;
    }

    pub fn set_vertical_flip(&mut self, vertical_flip: bool) {
        if vertical_flip {
            self.attr1 |= ATTR1_VFLIP;
        } else {
            self.attr1 &= !ATTR1_VFLIP;
        }
    }

    pub fn mosaic_enabled(&self) -> bool {
        return self.attr0 & ATTR0_MOSAIC != 0;
    }

    pub fn set_mosaic_enabled(&mut self, mosaic_enabled: bool) {
        if mosaic_enabled {
            self.attr0 |= ATTR0_MOSAIC;
        } else {
            self.attr0 &= !ATTR0_MOSAIC;
        }
    }

    pub fn is_affine(&self) -> bool {
        return self.attr0 & ATTR0_AFFINE != 0;
    }

    pub fn double_size(&self) -> bool {
        return self.attr0 & (ATTR0_AFFINE | ATTR0_DOUBLE_SIZE_OR_HIDE)
            == ATTR0_AFFINE | ATTR0_DOUBLE_SIZE_OR_HIDE;
    }

    pub fn affine_mat_index(&self) -> Option<u8> {
        if !self.is_affine() {
            return None;
        }
        return Some(((self.attr1 & ATTR1_AFFINE_MAT_MASK) >> ATTR1_AFFINE_MAT_SHIFT) as u8);
    }

    /// Render the sprite through the given affine matrix.
    /// Any flip bits are overwritten by the matrix index.
    pub fn set_affine_mat(&mut self, affine_mat_index: u8, double_size: bool) {
        self.attr0 |= ATTR0_AFFINE;
        if double_size {
            self.attr0 |= ATTR0_DOUBLE_SIZE_OR_HIDE;
        } else {
            self.attr0 &= !ATTR0_DOUBLE_SIZE_OR_HIDE;
        }
        let index = (u16::from(affine_mat_index) << ATTR1_AFFINE_MAT_SHIFT) & ATTR1_AFFINE_MAT_MASK;
        self.attr1 = (self.attr1 & !ATTR1_AFFINE_MAT_MASK) | index;
    }

    /// Back to a regular sprite without flips.
    pub fn remove_affine_mat(&mut self) {
        self.attr0 &= !(ATTR0_AFFINE | ATTR0_DOUBLE_SIZE_OR_HIDE);
        self.attr1 &= !ATTR1_AFFINE_MAT_MASK;
    }
}
