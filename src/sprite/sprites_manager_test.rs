use alloc::vec::Vec;

use super::*;
use crate::config::ManagerConfig;
use crate::hw::{ShadowObjHardware, Transfer};
use crate::shared_constants::*;
use crate::shared_types::{Fixed, FixedPoint};

static TILES: [u32; 32] = [0x1111_1111; 32];
static OTHER_TILES: [u32; 32] = [0x2222_2222; 32];
static SMALL_TILES: [u32; 8] = [0x3333_3333; 8];
static WHOLE_VRAM: [u32; OBJ_VRAM_BLOCKS * TILE4BPP_NUM_U32S] =
    [0x4444_4444; OBJ_VRAM_BLOCKS * TILE4BPP_NUM_U32S];
static PALETTE: [u16; 16] = [0x7FFF; 16];
static OTHER_PALETTE: [u16; 16] = [0x001F; 16];
static PALETTE_32: [u16; 32] = [0x03E0; 32];
static PALETTE_256: [u16; 256] = [0x7C00; 256];

type Manager = SpritesManager<ShadowObjHardware>;

fn manager() -> Manager {
    return SpritesManager::new(ManagerConfig::default(), ShadowObjHardware::new()).unwrap();
}

/// Manager with room for a single affine matrix and 4 sprites on screen
fn small_manager(max_items: usize) -> Manager {
    let config = ManagerConfig {
        max_items,
        handles_count: 4,
        affine_mats_count: 1,
        ..ManagerConfig::default()
    };
    return SpritesManager::new(config, ShadowObjHardware::new()).unwrap();
}

/// A 16x16 sprite centered on the given point
fn sprite(x: i32, y: i32) -> SpriteBuilder {
    return SpriteBuilder::new(
        HWSpriteSize::SixteenBySixteen,
        TilesSource::Data(&TILES),
        PaletteSource::Data(&PALETTE),
    )
    .with_position(FixedPoint::from_ints(x, y));
}

/// Run a frame and forget what it transferred
fn flush(manager: &mut Manager) {
    manager.update();
    manager.commit();
    manager.hw_mut().take_transfers();
}

fn scaled(scale: Fixed) -> AffineMatAttributes {
    return AffineMatAttributes {
        horizontal_scale: scale,
        vertical_scale: scale,
        ..AffineMatAttributes::default()
    };
}

#[test]
fn test_init_hides_every_entry() {
    let manager = manager();
    assert!(manager.hw().oam().iter().all(|handle| handle.is_hidden()));
    assert_eq!(
        manager.hw().transfers(),
        &[Transfer {
            first_index: 0,
            count: OAM_ENTRIES
        }]
    );
    assert!(manager.pending_commit_range().is_empty());
}

#[test]
fn test_invalid_config_is_rejected() {
    let config = ManagerConfig {
        handles_count: 8,
        ..ManagerConfig::default()
    };
    assert!(SpritesManager::new(config, ShadowObjHardware::new()).is_err());
}

/// Background priority first, then z order
#[test]
fn test_draw_order() {
    let mut manager = manager();
    let a = manager
        .create(sprite(50, 50).with_bg_priority(1).with_z_order(5))
        .unwrap();
    let b = manager
        .create(sprite(100, 50).with_bg_priority(0).with_z_order(5))
        .unwrap();
    let c = manager
        .create(sprite(150, 50).with_bg_priority(2).with_z_order(1))
        .unwrap();
    manager.update();

    assert_eq!(manager.sorted_ids(), vec![b, a, c]);
    assert_eq!(manager.handles_index(b), Some(0));
    assert_eq!(manager.handles_index(a), Some(1));
    assert_eq!(manager.handles_index(c), Some(2));
    assert_eq!(manager.handles()[0].bg_priority(), 0);
    assert_eq!(manager.handles()[2].bg_priority(), 2);
}

#[test]
fn test_reordering_rebuilds_slots() {
    let mut manager = manager();
    let a = manager.create(sprite(50, 50).with_z_order(0)).unwrap();
    let b = manager.create(sprite(100, 50).with_z_order(1)).unwrap();
    flush(&mut manager);
    assert_eq!(manager.handles_index(a), Some(0));

    manager.set_z_order(a, 2);
    assert_eq!(manager.z_order(a), 2);
    manager.update();
    assert_eq!(manager.handles_index(b), Some(0));
    assert_eq!(manager.handles_index(a), Some(1));
    assert_eq!(manager.pending_commit_range(), DirtyRange::new(0, 1));

    manager.set_bg_priority(a, 0);
    manager.update();
    assert_eq!(manager.handles_index(a), Some(0));
    assert_eq!(manager.handles()[0].bg_priority(), 0);
}

/// The right screen edge is exclusive
#[test]
fn test_right_edge() {
    let mut manager = manager();
    let inside = manager.create(sprite(247, 80)).unwrap();
    let outside = manager.create(sprite(248, 80)).unwrap();
    manager.update();

    assert!(manager.on_screen(inside));
    assert!(!manager.on_screen(outside));
    assert_eq!(manager.handles_index(inside), Some(0));
    assert_eq!(manager.handles_index(outside), None);
    assert!(manager.handles()[1].is_hidden());
}

#[test]
fn test_moving_off_screen() {
    let mut manager = manager();
    let id = manager.create(sprite(100, 80)).unwrap();
    flush(&mut manager);
    assert!(manager.on_screen(id));

    manager.set_position(id, FixedPoint::from_ints(100, -8));
    manager.update();
    assert!(!manager.on_screen(id));
    assert!(manager.handles()[0].is_hidden());

    manager.set_position(id, FixedPoint::from_ints(100, -7));
    manager.update();
    assert!(manager.on_screen(id));
    assert_eq!(manager.handles_index(id), Some(0));
}

/// Releasing an on screen sprite moves the following ones down
#[test]
fn test_release_compacts() {
    let mut manager = manager();
    let a = manager.create(sprite(50, 50).with_z_order(0)).unwrap();
    let b = manager.create(sprite(100, 50).with_z_order(1)).unwrap();
    let c = manager.create(sprite(150, 50).with_z_order(2)).unwrap();
    flush(&mut manager);

    manager.decrease_usages(b);
    assert!(!manager.contains(b));
    manager.update();
    assert_eq!(manager.handles_index(a), Some(0));
    assert_eq!(manager.handles_index(c), Some(1));

    manager.commit();
    assert_eq!(
        manager.hw_mut().take_transfers(),
        vec![Transfer {
            first_index: 0,
            count: 3
        }]
    );
    assert_eq!(manager.hw().oam()[1].x(), 142);
    assert!(manager.hw().oam()[2].is_hidden());
}

#[test]
fn test_usages() {
    let mut manager = manager();
    let id = manager.create(sprite(50, 50)).unwrap();
    manager.increase_usages(id);
    assert_eq!(manager.usages(id), 2);

    manager.decrease_usages(id);
    assert!(manager.contains(id));
    manager.decrease_usages(id);
    assert!(!manager.contains(id));
    assert_eq!(manager.items_count(), 0);
    assert_eq!(manager.tiles().used_blocks_count(), 0);
    assert_eq!(manager.palettes().used_colors_count(), 0);

    // The slot is reused, the old id stays dead
    let new_id = manager.create(sprite(50, 50)).unwrap();
    assert_eq!(new_id.index(), id.index());
    assert_ne!(new_id, id);
    assert!(!manager.contains(id));
}

#[test]
fn test_resources_are_shared() {
    let mut manager = manager();
    let a = manager.create(sprite(50, 50)).unwrap();
    let b = manager.create(sprite(60, 50)).unwrap();
    assert_eq!(manager.tiles_id(a), manager.tiles_id(b));
    assert_eq!(manager.tiles().usages(manager.tiles_id(a)), 2);
    assert_eq!(manager.palettes().usages(manager.palette_id(a)), 2);

    manager.decrease_usages(a);
    assert_eq!(manager.tiles().usages(manager.tiles_id(b)), 1);
}

#[test]
#[should_panic(expected = "Invalid sprite id")]
fn test_stale_id() {
    let mut manager = manager();
    let id = manager.create(sprite(50, 50)).unwrap();
    manager.decrease_usages(id);
    manager.position(id);
}

/// Shrinking the visible set hides the entries left behind
#[test]
fn test_hidden_sentinel_on_shrink() {
    let mut manager = manager();
    let a = manager.create(sprite(50, 50).with_z_order(0)).unwrap();
    let b = manager.create(sprite(100, 50).with_z_order(1)).unwrap();
    let c = manager.create(sprite(150, 50).with_z_order(2)).unwrap();
    flush(&mut manager);

    manager.set_visible(a, false);
    assert!(!manager.on_screen(a));
    assert_eq!(manager.handles_index(a), None);
    manager.update();

    assert_eq!(manager.handles_index(b), Some(0));
    assert_eq!(manager.handles_index(c), Some(1));
    assert!(manager.handles()[2].is_hidden());
    assert_eq!(manager.pending_commit_range(), DirtyRange::new(0, 2));

    manager.set_visible(a, true);
    manager.update();
    assert_eq!(manager.handles_index(a), Some(0));
    assert!(!manager.handles()[2].is_hidden());
}

/// Changes to separate slots are committed in a single transfer, once
#[test]
fn test_commit_union_and_idempotence() {
    let mut manager = manager();
    let mut ids = Vec::new();
    for i in 0..4 {
        ids.push(manager.create(sprite(20 + i * 40, 50).with_z_order(i)).unwrap());
    }
    flush(&mut manager);

    manager.set_position(ids[1], FixedPoint::from_ints(61, 50));
    manager.set_mosaic_enabled(ids[3], true);
    manager.update();
    assert_eq!(manager.pending_commit_range(), DirtyRange::new(1, 3));

    manager.commit();
    assert_eq!(
        manager.hw().transfers(),
        &[Transfer {
            first_index: 1,
            count: 3
        }]
    );
    assert_eq!(manager.hw().oam()[1].x(), 53);
    assert!(manager.hw().oam()[3].mosaic_enabled());

    manager.commit();
    assert_eq!(manager.hw().transfers().len(), 1);
}

#[test]
fn test_off_screen_changes_are_not_committed() {
    let mut manager = manager();
    let id = manager.create(sprite(500, 50)).unwrap();
    flush(&mut manager);

    manager.set_mosaic_enabled(id, true);
    manager.set_horizontal_flip(id, true);
    manager.update();
    manager.commit();
    assert!(manager.hw().transfers().is_empty());
}

#[test]
fn test_camera() {
    let mut manager = manager();
    let follows = manager.create(sprite(300, 80)).unwrap();
    let fixed = manager
        .create(sprite(300, 80).with_ignore_camera(true))
        .unwrap();
    manager.update();
    assert!(!manager.on_screen(follows));

    manager.set_camera_position(FixedPoint::from_ints(100, 0));
    manager.update();
    assert!(manager.on_screen(follows));
    assert!(!manager.on_screen(fixed));
    assert_eq!(manager.handles()[0].x(), 192);

    manager.set_ignore_camera(fixed, false);
    manager.update();
    assert!(manager.on_screen(fixed));
}

/// Matrix N covers entries 4N to 4N + 3
#[test]
fn test_affine_mats_commit_range() {
    let mut manager = manager();
    let first = manager
        .affine_mats_mut()
        .create(AffineMatAttributes::default())
        .unwrap();
    let second = manager
        .affine_mats_mut()
        .create(AffineMatAttributes::default())
        .unwrap();
    assert_eq!((first.index(), second.index()), (0, 1));

    manager.hw_mut().take_transfers();
    manager.update();
    manager.commit();
    assert_eq!(
        manager.hw_mut().take_transfers(),
        vec![Transfer {
            first_index: 0,
            count: 8
        }]
    );
    assert_eq!(manager.hw().oam()[0].affine_param, 256);

    manager.affine_mats_mut().set_scale(second, Fixed::from_num(2));
    manager.update();
    manager.commit();
    assert_eq!(
        manager.hw_mut().take_transfers(),
        vec![Transfer {
            first_index: 4,
            count: 4
        }]
    );
    assert_eq!(manager.hw().oam()[4].affine_param, 128);
    assert_eq!(manager.hw().oam()[5].affine_param, 0);
    assert_eq!(manager.hw().oam()[7].affine_param, 128);
}

/// Attaching an identity matrix does nothing while the sprite removes them
#[test]
fn test_identity_attach() {
    let mut manager = manager();
    let id = manager.create(sprite(100, 80)).unwrap();
    flush(&mut manager);
    let mat = manager
        .affine_mats_mut()
        .create(AffineMatAttributes::default())
        .unwrap();

    manager.set_affine_mat(id, Some(mat));
    assert_eq!(manager.affine_mat(id), None);
    assert_eq!(manager.affine_mats().usages(mat), 1);
    assert!(!manager.items.get(id).handle.is_affine());
    // The sprite's slot didn't change, so nothing is waiting to be transferred
    assert!(manager.pending_commit_range().is_empty());
    assert!(!manager.items.get(id).check_on_screen);

    manager.set_remove_affine_mat_when_not_needed(id, false);
    manager.set_affine_mat(id, Some(mat));
    assert_eq!(manager.affine_mat(id), Some(mat));
    assert_eq!(manager.affine_mats().usages(mat), 2);
    assert!(!manager.double_size(id));

    manager.set_remove_affine_mat_when_not_needed(id, true);
    assert_eq!(manager.affine_mat(id), None);
    assert_eq!(manager.affine_mats().usages(mat), 1);
}

#[test]
fn test_auto_double_size_and_detach() {
    let mut manager = manager();
    let mat = manager
        .affine_mats_mut()
        .create(scaled(Fixed::from_num(2)))
        .unwrap();
    let id = manager
        .create(sprite(100, 50).with_affine_mat(mat))
        .unwrap();
    assert_eq!(manager.affine_mat(id), Some(mat));
    assert_eq!(manager.affine_mats().usages(mat), 2);
    assert!(manager.double_size(id));
    assert_eq!(
        manager.dimensions(id),
        Dimensions {
            width: 32,
            height: 32
        }
    );
    manager.update();
    assert_eq!(manager.handles()[0].x(), 84);
    assert_eq!(manager.handles()[0].affine_mat_index(), Some(0));

    // Back to identity: the sprite lets go of the matrix
    manager.affine_mats_mut().set_scale(mat, Fixed::from_num(1));
    manager.update();
    assert_eq!(manager.affine_mat(id), None);
    assert_eq!(manager.affine_mats().usages(mat), 1);
    assert!(!manager.double_size(id));
    assert!(!manager.handles()[0].is_affine());
    assert_eq!(manager.handles()[0].x(), 92);
}

#[test]
fn test_double_size_modes() {
    let mut manager = manager();
    let mat = manager
        .affine_mats_mut()
        .create(scaled(Fixed::from_num(2)))
        .unwrap();
    let id = manager
        .create(
            sprite(100, 50)
                .with_affine_mat(mat)
                .with_remove_affine_mat_when_not_needed(false),
        )
        .unwrap();
    assert!(manager.double_size(id));

    // Shrinking never leaves the regular area
    manager
        .affine_mats_mut()
        .set_scale(mat, Fixed::from_bits(128));
    manager.update();
    assert!(!manager.double_size(id));
    assert_eq!(manager.handles()[0].x(), 92);

    manager.set_double_size_mode(id, DoubleSizeMode::Enabled);
    assert!(manager.double_size(id));
    assert_eq!(manager.double_size_mode(id), DoubleSizeMode::Enabled);

    // Identity, but the sprite keeps it
    manager.affine_mats_mut().set_scale(mat, Fixed::from_num(1));
    manager.update();
    assert_eq!(manager.affine_mat(id), Some(mat));
    assert!(manager.double_size(id));

    manager.set_double_size_mode(id, DoubleSizeMode::Disabled);
    assert!(!manager.double_size(id));
}

/// Flips go to the matrix while there is one, and survive detaching
#[test]
fn test_flips_follow_affine_mat() {
    let mut manager = manager();
    let mat = manager
        .affine_mats_mut()
        .create(scaled(Fixed::from_num(2)))
        .unwrap();
    let id = manager
        .create(sprite(100, 50).with_affine_mat(mat))
        .unwrap();

    manager.set_horizontal_flip(id, true);
    assert!(manager.affine_mats().horizontal_flip(mat));
    assert!(manager.horizontal_flip(id));
    assert!(!manager.vertical_flip(id));

    manager.set_affine_mat(id, None);
    assert!(manager.horizontal_flip(id));
    assert!(manager.items.get(id).handle.horizontal_flip());
    assert_eq!(manager.affine_mats().usages(mat), 1);
}

#[test]
#[should_panic(expected = "Too many sprites on screen")]
fn test_too_many_on_screen() {
    let mut manager = small_manager(8);
    for i in 0..5 {
        manager.create(sprite(20 + i * 20, 50)).unwrap();
    }
    manager.update();
}

#[test]
fn test_items_full() {
    let mut manager = small_manager(1);
    manager.create(sprite(50, 50)).unwrap();
    let result = manager.create(
        SpriteBuilder::new(
            HWSpriteSize::SixteenBySixteen,
            TilesSource::Data(&OTHER_TILES),
            PaletteSource::Data(&OTHER_PALETTE),
        ),
    );
    assert_eq!(result, Err(SpriteAllocError::ItemsFull));
    assert_eq!(manager.items_count(), 1);
    assert_eq!(manager.palettes().used_colors_count(), 16);
    assert_eq!(manager.tiles().used_blocks_count(), 4);
}

#[test]
fn test_palettes_full() {
    let mut manager = manager();
    manager.create_palette(&PALETTE_256).unwrap();
    assert_eq!(
        manager.create(sprite(50, 50)),
        Err(SpriteAllocError::PalettesFull)
    );
    assert_eq!(manager.items_count(), 0);
    assert_eq!(manager.tiles().used_blocks_count(), 0);
    assert!(manager.sorted_ids().is_empty());
}

/// Failing to get tiles gives the palette back
#[test]
fn test_vram_full() {
    let mut manager = manager();
    manager.create_tiles(&WHOLE_VRAM, false).unwrap();
    assert_eq!(
        manager.create(sprite(50, 50)),
        Err(SpriteAllocError::VramFull)
    );
    assert_eq!(manager.items_count(), 0);
    assert_eq!(manager.palettes().used_colors_count(), 0);
}

#[test]
fn test_set_tiles_and_palette() {
    let mut manager = manager();
    let id = manager.create(sprite(50, 50)).unwrap();
    flush(&mut manager);

    let tiles = manager.create_tiles(&OTHER_TILES, false).unwrap();
    manager.set_tiles(id, tiles);
    assert_eq!(manager.tiles_id(id), tiles);
    assert_eq!(manager.tiles().usages(tiles), 2);
    assert_eq!(manager.handles()[0].tiles(), 4);
    assert_eq!(manager.tiles().used_blocks_count(), 4);

    let palette = manager.create_palette(&OTHER_PALETTE).unwrap();
    manager.set_palette(id, palette);
    assert_eq!(manager.palettes().usages(palette), 2);
    assert_eq!(manager.handles()[0].palette_bank(), 1);
    assert_eq!(manager.palettes().used_colors_count(), 16);
    assert_eq!(manager.pending_commit_range(), DirtyRange::single(0));
}

#[test]
#[should_panic(expected = "Tiles count mismatch")]
fn test_set_tiles_count_mismatch() {
    let mut manager = manager();
    let id = manager.create(sprite(50, 50)).unwrap();
    let tiles = manager.create_tiles(&SMALL_TILES, false).unwrap();
    manager.set_tiles(id, tiles);
}

#[test]
#[should_panic(expected = "Palette bpp mismatch")]
fn test_set_palette_bpp_mismatch() {
    let mut manager = manager();
    let palette = manager.create_palette(&PALETTE_32).unwrap();
    let id = manager.create(sprite(50, 50)).unwrap();
    manager.set_palette(id, palette);
}

#[test]
#[should_panic(expected = "Invalid bg priority")]
fn test_bg_priority_out_of_range() {
    let mut manager = manager();
    let id = manager.create(sprite(50, 50)).unwrap();
    manager.set_bg_priority(id, 4);
}

#[test]
#[should_panic(expected = "Invalid z order")]
fn test_z_order_out_of_range() {
    let mut manager = manager();
    manager
        .create(sprite(50, 50).with_z_order(i32::from(i16::MAX) + 1))
        .unwrap();
}

/// A builder's identity matrix still gets the sprite on screen
#[test]
fn test_create_with_identity_mat() {
    let mut manager = manager();
    let mat = manager
        .affine_mats_mut()
        .create(AffineMatAttributes::default())
        .unwrap();
    let id = manager.create(sprite(100, 80).with_affine_mat(mat)).unwrap();
    assert_eq!(manager.affine_mat(id), None);
    assert_eq!(manager.affine_mats().usages(mat), 1);

    manager.update();
    assert!(manager.on_screen(id));
    assert_eq!(manager.handles_index(id), Some(0));
}
