//! Sprite resource manager for GBA-style object attribute memory (OAM).
//!
//! The manager owns every sprite's state, decides which sprites are on screen,
//! sorts them into hardware draw order and writes the minimal contiguous range of
//! changed OAM entries once per frame.
//!
//! A frame looks like this:
//!
//! 1. Game logic creates, mutates and releases sprites through [`SpritesManager`].
//! 2. [`SpritesManager::update`] is called at any point during the frame.
//! 3. [`SpritesManager::commit`] is called during VBlank.
//!
//! Hardware access goes through the [`ObjHardware`] trait, so everything except
//! the actual register writes can run (and be tested) off the console.
#![no_std]

#[cfg(test)]
extern crate std;

#[macro_use]
extern crate alloc;

pub mod debug_log;

pub mod config;
pub mod hw;
pub mod shared_constants;
pub mod shared_types;
pub mod sprite;

pub use config::{ConfigError, ManagerConfig};
pub use hw::{ObjHardware, ShadowObjHardware, Transfer};
pub use shared_types::{Fixed, FixedPoint};
pub use sprite::{
    AffineMatAttributes, AffineMatrix, Dimensions, DirtyRange, DoubleSizeMode, HWSpriteSize,
    HwHandle, PaletteSource, SortKey, SpriteAffineMatId, SpriteAffineMatsManager, SpriteAllocError,
    SpriteBuilder, SpriteId, SpritePaletteId, SpritePalettesManager, SpriteTilesId,
    SpriteTilesManager, SpritesManager, TilesSource,
};

#[cfg(target_arch = "arm")]
pub use hw::GbaObjHardware;
