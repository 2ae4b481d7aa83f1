use super::{DoubleSizeMode, HWSpriteSize, SpriteAffineMatId, SpritePaletteId, SpriteTilesId};
use crate::shared_types::FixedPoint;

/// Where the tiles of a new sprite come from.
#[derive(Debug, Clone, Copy)]
pub enum TilesSource {
    /// Raw tile data, uploaded to VRAM unless identical tiles are already there.
    Data(&'static [u32]),
    /// Tiles already allocated. The sprite takes its own usage of them.
    Shared(SpriteTilesId),
}

/// Where the palette of a new sprite comes from.
#[derive(Debug, Clone, Copy)]
pub enum PaletteSource {
    /// Raw colors, uploaded to palette RAM unless identical colors are already there.
    Data(&'static [u16]),
    /// Palette already allocated. The sprite takes its own usage of it.
    Shared(SpritePaletteId),
}

/// Everything needed to create a sprite.
///
/// Defaults: top-left corner of the map, background priority 3, z order 0, visible,
/// no flips, no mosaic, no affine matrix, `DoubleSizeMode::Auto` and identity matrices removed
/// when not needed.
#[derive(Debug, Clone)]
pub struct SpriteBuilder {
    pub(crate) size: HWSpriteSize,
    pub(crate) tiles: TilesSource,
    pub(crate) palette: PaletteSource,
    pub(crate) position: FixedPoint,
    pub(crate) bg_priority: u8,
    pub(crate) z_order: i32,
    pub(crate) horizontal_flip: bool,
    pub(crate) vertical_flip: bool,
    pub(crate) mosaic_enabled: bool,
    pub(crate) visible: bool,
    pub(crate) ignore_camera: bool,
    pub(crate) affine_mat: Option<SpriteAffineMatId>,
    pub(crate) double_size_mode: DoubleSizeMode,
    pub(crate) remove_affine_mat_when_not_needed: bool,
}

impl SpriteBuilder {
    pub fn new(size: HWSpriteSize, tiles: TilesSource, palette: PaletteSource) -> SpriteBuilder {
        return SpriteBuilder {
            size,
            tiles,
            palette,
            position: FixedPoint::default(),
            bg_priority: 3,
            z_order: 0,
            horizontal_flip: false,
            vertical_flip: false,
            mosaic_enabled: false,
            visible: true,
            ignore_camera: false,
            affine_mat: None,
            double_size_mode: DoubleSizeMode::Auto,
            remove_affine_mat_when_not_needed: true,
        };
    }

    /// Position of the sprite's center.
    pub fn with_position(mut self, position: FixedPoint) -> SpriteBuilder {
        self.position = position;
        return self;
    }

    pub fn with_bg_priority(mut self, bg_priority: u8) -> SpriteBuilder {
        self.bg_priority = bg_priority;
        return self;
    }

    pub fn with_z_order(mut self, z_order: i32) -> SpriteBuilder {
        self.z_order = z_order;
        return self;
    }

    pub fn with_horizontal_flip(mut self, horizontal_flip: bool) -> SpriteBuilder {
        self.horizontal_flip = horizontal_flip;
        return self;
    }

    pub fn with_vertical_flip(mut self, vertical_flip: bool) -> SpriteBuilder {
        self.vertical_flip = vertical_flip;
        return self;
    }

    pub fn with_mosaic_enabled(mut self, mosaic_enabled: bool) -> SpriteBuilder {
        self.mosaic_enabled = mosaic_enabled;
        return self;
    }

    pub fn with_visible(mut self, visible: bool) -> SpriteBuilder {
        self.visible = visible;
        return self;
    }

    pub fn with_ignore_camera(mut self, ignore_camera: bool) -> SpriteBuilder {
        self.ignore_camera = ignore_camera;
        return self;
    }

    /// The sprite takes its own usage of the matrix; the caller keeps theirs.
    pub fn with_affine_mat(mut self, affine_mat: SpriteAffineMatId) -> SpriteBuilder {
        self.affine_mat = Some(affine_mat);
        return self;
    }

    pub fn with_double_size_mode(mut self, double_size_mode: DoubleSizeMode) -> SpriteBuilder {
        self.double_size_mode = double_size_mode;
        return self;
    }

    pub fn with_remove_affine_mat_when_not_needed(mut self, remove: bool) -> SpriteBuilder {
        self.remove_affine_mat_when_not_needed = remove;
        return self;
    }
}
