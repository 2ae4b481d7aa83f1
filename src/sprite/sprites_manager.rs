//! The sprites manager: owner of every sprite and of the shadow copy of OAM.
//!
//! Setters only touch the sprite itself and, if the sprite already owns an OAM slot, mark that
//! slot as dirty. Everything more expensive (visibility, draw order compaction, affine matrix
//! changes) is deferred to `update()`, and the hardware is only written by `commit()`.

use core::convert::TryFrom;

use alloc::vec::Vec;

use arrayvec::ArrayVec;

use super::sprite_item::{ItemsPool, SpriteItem};
use super::sorted_sprites::SortedSprites;
use super::*;
use crate::config::{ConfigError, ManagerConfig};
use crate::hw::ObjHardware;
use crate::shared_constants::{MAX_BG_PRIORITY, MAX_SPRITE_ITEMS};
use crate::shared_types::FixedPoint;
use crate::{debug_log, debug_log::Subsystems};

pub struct SpritesManager<H: ObjHardware> {
    pub(super) config: ManagerConfig,
    pub(super) hw: H,
    pub(super) items: ItemsPool,
    pub(super) sorted: SortedSprites,
    /// Shadow copy of the hardware table.
    pub(super) handles: Vec<HwHandle>,
    pub(super) tiles: SpriteTilesManager,
    pub(super) palettes: SpritePalettesManager,
    pub(super) affine_mats: SpriteAffineMatsManager,
    pub(super) camera_position: FixedPoint,
    /// Entries of `handles` that differ from the hardware.
    pub(super) commit_range: DirtyRange,
    pub(super) last_visible_items_count: usize,
    /// Items whose on screen status has to be recomputed.
    pub(super) pending_checks: ArrayVec<u16, MAX_SPRITE_ITEMS>,
    pub(super) rebuild_handles: bool,
}

impl<H: ObjHardware> SpritesManager<H> {
    /// Validates the configuration and hides every entry of the hardware table.
    pub fn new(config: ManagerConfig, mut hw: H) -> Result<SpritesManager<H>, ConfigError> {
        config.validate()?;

        let handles = vec![HwHandle::hidden(); config.handles_count];
        hw.commit_handles(&handles, 0);

        debug_log!(
            Subsystems::SpritesManager,
            "Initialized with {} items, {} handles and {} affine mats",
            config.max_items,
            config.handles_count,
            config.affine_mats_count
        );
        return Ok(SpritesManager {
            items: ItemsPool::new(config.max_items),
            sorted: SortedSprites::new(config.max_items),
            affine_mats: SpriteAffineMatsManager::new(config.affine_mats_count),
            tiles: SpriteTilesManager::new(),
            palettes: SpritePalettesManager::new(),
            config,
            hw,
            handles,
            camera_position: FixedPoint::default(),
            commit_range: DirtyRange::EMPTY,
            last_visible_items_count: 0,
            pending_checks: ArrayVec::new(),
            rebuild_handles: false,
        });
    }

    pub fn config(&self) -> &ManagerConfig {
        return &self.config;
    }

    pub fn hw(&self) -> &H {
        return &self.hw;
    }

    pub fn hw_mut(&mut self) -> &mut H {
        return &mut self.hw;
    }

    /// Shadow copy of the hardware table, as it will look after the next `commit()`.
    pub fn handles(&self) -> &[HwHandle] {
        return &self.handles;
    }

    pub fn tiles(&self) -> &SpriteTilesManager {
        return &self.tiles;
    }

    pub fn tiles_mut(&mut self) -> &mut SpriteTilesManager {
        return &mut self.tiles;
    }

    pub fn palettes(&self) -> &SpritePalettesManager {
        return &self.palettes;
    }

    pub fn palettes_mut(&mut self) -> &mut SpritePalettesManager {
        return &mut self.palettes;
    }

    pub fn affine_mats(&self) -> &SpriteAffineMatsManager {
        return &self.affine_mats;
    }

    pub fn affine_mats_mut(&mut self) -> &mut SpriteAffineMatsManager {
        return &mut self.affine_mats;
    }

    /// Upload tiles (or find them already uploaded). The caller owns one usage of the result.
    pub fn create_tiles(
        &mut self,
        data: &'static [u32],
        eight_bpp: bool,
    ) -> Result<SpriteTilesId, SpriteAllocError> {
        return self.tiles.create_or_find(data, eight_bpp, &mut self.hw);
    }

    /// Upload a palette (or find it already uploaded). The caller owns one usage of the result.
    pub fn create_palette(
        &mut self,
        colors: &'static [u16],
    ) -> Result<SpritePaletteId, SpriteAllocError> {
        return self.palettes.create_or_find(colors, &mut self.hw);
    }

    /// Number of live sprites.
    pub fn items_count(&self) -> usize {
        return self.items.len();
    }

    pub fn available_items_count(&self) -> usize {
        return self.items.capacity() - self.items.len();
    }

    /// Create a sprite. On error nothing has been allocated.
    pub fn create(&mut self, builder: SpriteBuilder) -> Result<SpriteId, SpriteAllocError> {
        if self.items.is_full() {
            debug_log!(Subsystems::SpritesManager, "Sprite items pool is full");
            return Err(SpriteAllocError::ItemsFull);
        }
        assert!(
            builder.bg_priority <= MAX_BG_PRIORITY,
            "Invalid bg priority: {}",
            builder.bg_priority
        );
        let z_order = checked_z_order(builder.z_order);

        let palette = match builder.palette {
            PaletteSource::Data(colors) => self.palettes.create_or_find(colors, &mut self.hw)?,
            PaletteSource::Shared(palette) => {
                self.palettes.increase_usages(palette);
                palette
            }
        };
        let eight_bpp = self.palettes.eight_bits_per_pixel(palette);

        let tiles = match builder.tiles {
            TilesSource::Data(data) => match self.tiles.create_or_find(data, eight_bpp, &mut self.hw) {
                Ok(tiles) => tiles,
                Err(err) => {
                    self.palettes.decrease_usages(palette);
                    return Err(err);
                }
            },
            TilesSource::Shared(tiles) => {
                self.tiles.increase_usages(tiles);
                tiles
            }
        };
        assert_eq!(
            self.tiles.tiles_count(tiles),
            builder.size.to_num_of_32_byte_blocks(eight_bpp),
            "Invalid tiles count for sprite size {:?}",
            builder.size
        );

        let mut handle = HwHandle::new(
            builder.size,
            self.tiles.first_tile_index(tiles),
            self.palettes.bank(palette),
            eight_bpp,
            builder.bg_priority,
        );
        handle.set_horizontal_flip(builder.horizontal_flip);
        handle.set_vertical_flip(builder.vertical_flip);
        handle.set_mosaic_enabled(builder.mosaic_enabled);

        let id = self.items.create(SpriteItem {
            handle,
            position: builder.position,
            tiles,
            palette,
            affine_mat: None,
            handles_index: None,
            usages: 1,
            double_size_mode: builder.double_size_mode,
            remove_affine_mat_when_not_needed: builder.remove_affine_mat_when_not_needed,
            visible: builder.visible,
            on_screen: false,
            check_on_screen: false,
            ignore_camera: builder.ignore_camera,
        });
        let index = id.index();
        self.sorted
            .insert(index, SortKey::new(builder.bg_priority, z_order));

        let placed = match builder.affine_mat {
            Some(affine_mat) => self.attach_affine_mat(index, affine_mat),
            None => false,
        };
        if !placed {
            self.place_item(index, builder.position);
        }

        debug_log!(
            Subsystems::SpritesManager,
            "Created sprite {} ({} live)",
            index,
            self.items.len()
        );
        return Ok(id);
    }

    /// Take another reference to the sprite.
    pub fn increase_usages(&mut self, id: SpriteId) {
        let index = self.items.checked_index(id);
        self.items.get_by_index_mut(index).usages += 1;
    }

    /// Drop a reference to the sprite, destroying it when it was the last one.
    pub fn decrease_usages(&mut self, id: SpriteId) {
        let index = self.items.checked_index(id);
        let item = self.items.get_by_index_mut(index);
        item.usages -= 1;
        if item.usages > 0 {
            return;
        }

        if item.on_screen {
            self.rebuild_handles = true;
        }
        if item.check_on_screen {
            self.unmark_check_on_screen(index);
        }
        self.sorted.erase(index);

        let item = self.items.destroy(id);
        self.tiles.decrease_usages(item.tiles);
        self.palettes.decrease_usages(item.palette);
        if let Some(affine_mat) = item.affine_mat {
            self.affine_mats.decrease_usages(affine_mat);
        }

        debug_log!(
            Subsystems::SpritesManager,
            "Destroyed sprite {} ({} live)",
            index,
            self.items.len()
        );
    }

    pub fn usages(&self, id: SpriteId) -> u16 {
        return self.items.get(id).usages;
    }

    pub fn contains(&self, id: SpriteId) -> bool {
        return self.items.contains(id);
    }

    /// Live sprites in draw order.
    pub fn sorted_ids(&self) -> Vec<SpriteId> {
        return self
            .sorted
            .iter()
            .map(|index| self.items.id_at(index))
            .collect();
    }

    pub fn size(&self, id: SpriteId) -> HWSpriteSize {
        return self.items.get(id).handle.size();
    }

    /// On-screen footprint in pixels, doubled in double size mode.
    pub fn dimensions(&self, id: SpriteId) -> Dimensions {
        return self.items.get(id).handle.dimensions();
    }

    pub fn position(&self, id: SpriteId) -> FixedPoint {
        return self.items.get(id).position;
    }

    pub fn set_position(&mut self, id: SpriteId, position: FixedPoint) {
        let index = self.items.checked_index(id);
        self.place_item(index, position);
    }

    pub fn tiles_id(&self, id: SpriteId) -> SpriteTilesId {
        return self.items.get(id).tiles;
    }

    /// Replace the tiles of the sprite. The new tiles must have the same size as the old ones.
    pub fn set_tiles(&mut self, id: SpriteId, tiles: SpriteTilesId) {
        let index = self.items.checked_index(id);
        let old_tiles = self.items.get_by_index(index).tiles;
        if old_tiles == tiles {
            return;
        }
        assert_eq!(
            self.tiles.tiles_count(tiles),
            self.tiles.tiles_count(old_tiles),
            "Tiles count mismatch"
        );

        self.tiles.increase_usages(tiles);
        self.tiles.decrease_usages(old_tiles);
        let first_tile_index = self.tiles.first_tile_index(tiles);
        let item = self.items.get_by_index_mut(index);
        item.tiles = tiles;
        item.handle.set_tiles(first_tile_index);
        self.update_handle_slot(index);
    }

    pub fn palette_id(&self, id: SpriteId) -> SpritePaletteId {
        return self.items.get(id).palette;
    }

    /// Replace the palette of the sprite. Both palettes must have the same bits per pixel.
    pub fn set_palette(&mut self, id: SpriteId, palette: SpritePaletteId) {
        let index = self.items.checked_index(id);
        let old_palette = self.items.get_by_index(index).palette;
        if old_palette == palette {
            return;
        }
        assert_eq!(
            self.palettes.eight_bits_per_pixel(palette),
            self.palettes.eight_bits_per_pixel(old_palette),
            "Palette bpp mismatch"
        );

        self.palettes.increase_usages(palette);
        self.palettes.decrease_usages(old_palette);
        let bank = self.palettes.bank(palette);
        let item = self.items.get_by_index_mut(index);
        item.palette = palette;
        item.handle.set_palette_bank(bank);
        self.update_handle_slot(index);
    }

    pub fn bg_priority(&self, id: SpriteId) -> u8 {
        let index = self.items.checked_index(id);
        return self.sorted.key(index).bg_priority;
    }

    pub fn set_bg_priority(&mut self, id: SpriteId, bg_priority: u8) {
        assert!(
            bg_priority <= MAX_BG_PRIORITY,
            "Invalid bg priority: {}",
            bg_priority
        );
        let index = self.items.checked_index(id);
        let key = self.sorted.key(index);
        if key.bg_priority == bg_priority {
            return;
        }

        self.sorted
            .reorder(index, SortKey::new(bg_priority, key.z_order));
        let item = self.items.get_by_index_mut(index);
        item.handle.set_bg_priority(bg_priority);
        if item.on_screen {
            self.rebuild_handles = true;
        }
    }

    pub fn z_order(&self, id: SpriteId) -> i32 {
        let index = self.items.checked_index(id);
        return i32::from(self.sorted.key(index).z_order);
    }

    pub fn set_z_order(&mut self, id: SpriteId, z_order: i32) {
        let z_order = checked_z_order(z_order);
        let index = self.items.checked_index(id);
        let key = self.sorted.key(index);
        if key.z_order == z_order {
            return;
        }

        self.sorted
            .reorder(index, SortKey::new(key.bg_priority, z_order));
        if self.items.get_by_index(index).on_screen {
            self.rebuild_handles = true;
        }
    }

    /// Read from the affine matrix if the sprite has one.
    pub fn horizontal_flip(&self, id: SpriteId) -> bool {
        let item = self.items.get(id);
        match item.affine_mat {
            Some(affine_mat) => self.affine_mats.horizontal_flip(affine_mat),
            None => item.handle.horizontal_flip(),
        }
    }

    /// Written to the affine matrix if the sprite has one.
    pub fn set_horizontal_flip(&mut self, id: SpriteId, horizontal_flip: bool) {
        let index = self.items.checked_index(id);
        let item = self.items.get_by_index_mut(index);
        match item.affine_mat {
            Some(affine_mat) => {
                self.affine_mats
                    .set_horizontal_flip(affine_mat, horizontal_flip);
            }
            None => {
                item.handle.set_horizontal_flip(horizontal_flip);
                self.update_handle_slot(index);
            }
        }
    }

    /// Read from the affine matrix if the sprite has one.
    pub fn vertical_flip(&self, id: SpriteId) -> bool {
        let item = self.items.get(id);
        match item.affine_mat {
            Some(affine_mat) => self.affine_mats.vertical_flip(affine_mat),
            None => item.handle.vertical_flip(),
        }
    }

    /// Written to the affine matrix if the sprite has one.
    pub fn set_vertical_flip(&mut self, id: SpriteId, vertical_flip: bool) {
        let index = self.items.checked_index(id);
        let item = self.items.get_by_index_mut(index);
        match item.affine_mat {
            Some(affine_mat) => {
                self.affine_mats.set_vertical_flip(affine_mat, vertical_flip);
            }
            None => {
                item.handle.set_vertical_flip(vertical_flip);
                self.update_handle_slot(index);
            }
        }
    }

    pub fn mosaic_enabled(&self, id: SpriteId) -> bool {
        return self.items.get(id).handle.mosaic_enabled();
    }

    pub fn set_mosaic_enabled(&mut self, id: SpriteId, mosaic_enabled: bool) {
        let index = self.items.checked_index(id);
        self.items
            .get_by_index_mut(index)
            .handle
            .set_mosaic_enabled(mosaic_enabled);
        self.update_handle_slot(index);
    }

    pub fn visible(&self, id: SpriteId) -> bool {
        return self.items.get(id).visible;
    }

    pub fn set_visible(&mut self, id: SpriteId, visible: bool) {
        let index = self.items.checked_index(id);
        let item = self.items.get_by_index_mut(index);
        if item.visible == visible {
            return;
        }
        item.visible = visible;

        if visible {
            self.mark_check_on_screen(index);
            return;
        }
        if item.on_screen {
            item.on_screen = false;
            item.handles_index = None;
            self.rebuild_handles = true;
        }
        if item.check_on_screen {
            self.unmark_check_on_screen(index);
        }
    }

    pub fn ignore_camera(&self, id: SpriteId) -> bool {
        return self.items.get(id).ignore_camera;
    }

    pub fn set_ignore_camera(&mut self, id: SpriteId, ignore_camera: bool) {
        let index = self.items.checked_index(id);
        let item = self.items.get_by_index_mut(index);
        if item.ignore_camera == ignore_camera {
            return;
        }
        item.ignore_camera = ignore_camera;
        let position = item.position;
        self.place_item(index, position);
    }

    /// Whether the sprite was on screen at the last `update()`.
    pub fn on_screen(&self, id: SpriteId) -> bool {
        return self.items.get(id).on_screen;
    }

    /// Hardware table entry of the sprite, if it is on screen.
    pub fn handles_index(&self, id: SpriteId) -> Option<usize> {
        return self
            .items
            .get(id)
            .handles_index
            .map(|handles_index| handles_index as usize);
    }

    pub fn camera_position(&self) -> FixedPoint {
        return self.camera_position;
    }

    /// Move the camera, replacing every sprite that doesn't ignore it.
    pub fn set_camera_position(&mut self, camera_position: FixedPoint) {
        if self.camera_position == camera_position {
            return;
        }
        self.camera_position = camera_position;
        self.update_camera();
    }

    /// Recompute the screen position of every sprite that follows the camera.
    pub fn update_camera(&mut self) {
        for index in 0..self.items.capacity() {
            let position = match self.items.item_at(index) {
                Some(item) if !item.ignore_camera => item.position,
                _ => continue,
            };
            self.place_item(index, position);
        }
    }

    pub(super) fn place_item(&mut self, index: usize, position: FixedPoint) {
        let camera_position = self.camera_position;
        let item = self.items.get_by_index_mut(index);
        item.position = position;
        let (x, y) = item.screen_position(camera_position);
        item.handle.set_position(x, y);
        let visible = item.visible;

        if visible {
            self.mark_check_on_screen(index);
        }
        self.update_handle_slot(index);
    }

    /// Copy the sprite's attributes into its OAM slot, if it has one.
    pub(super) fn update_handle_slot(&mut self, index: usize) {
        let item = self.items.get_by_index(index);
        if let Some(handles_index) = item.handles_index {
            let handles_index = handles_index as usize;
            item.handle.copy_to(&mut self.handles[handles_index]);
            self.commit_range.include(handles_index);
        }
    }

    pub(super) fn mark_check_on_screen(&mut self, index: usize) {
        let item = self.items.get_by_index_mut(index);
        if !item.check_on_screen {
            item.check_on_screen = true;
            self.pending_checks.push(index as u16);
        }
    }

    pub(super) fn unmark_check_on_screen(&mut self, index: usize) {
        self.items.get_by_index_mut(index).check_on_screen = false;
        if let Some(position) = self
            .pending_checks
            .iter()
            .position(|pending| *pending as usize == index)
        {
            self.pending_checks.swap_remove(position);
        }
    }
}

fn checked_z_order(z_order: i32) -> i16 {
    match i16::try_from(z_order) {
        Ok(z_order) => z_order,
        Err(_) => panic!("Invalid z order: {}", z_order),
    }
}
