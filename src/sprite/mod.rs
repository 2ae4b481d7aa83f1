mod affine_attach;
mod affine_mats;
mod builder;
mod commit;
mod dirty_range;
mod error;
mod handles_rebuild;
mod hw_sprite;
mod palettes;
mod sorted_sprites;
mod sprite_item;
mod sprites_manager;
mod tiles;
mod visibility;

pub use affine_mats::{
    AffineMatAttributes, AffineMatrix, SpriteAffineMatId, SpriteAffineMatsManager,
};
pub use builder::{PaletteSource, SpriteBuilder, TilesSource};
pub use dirty_range::DirtyRange;
pub use error::SpriteAllocError;
pub use hw_sprite::{Dimensions, HWSpriteSize, HwHandle};
pub use palettes::{SpritePaletteId, SpritePalettesManager};
pub use sorted_sprites::SortKey;
pub use sprite_item::{DoubleSizeMode, SpriteId};
pub use sprites_manager::SpritesManager;
pub use tiles::{SpriteTilesId, SpriteTilesManager};

#[cfg(test)]
mod sorted_sprites_test;
#[cfg(test)]
mod sprites_manager_test;
