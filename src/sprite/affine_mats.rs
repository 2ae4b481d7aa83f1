//! Pool of the affine matrices sprites can be rotated and scaled with.
//!
//! Matrices are shared and reference counted. The sprites manager never looks inside them,
//! it only polls this pool for what changed since the last frame:
//!
//! * `updated()` tells if anything changed at all,
//! * `updated_id()` tells if a specific matrix changed,
//! * `double_size()` tells if a matrix needs the enlarged rendering area.
//!
//! `update()` then acknowledges the changes by writing the new matrices into the affine
//! parameter halfwords of the hardware table, and `retrieve_commit_range()` reports which
//! matrices have to be transferred.

use alloc::vec::Vec;

use arrayvec::ArrayVec;

use super::{DirtyRange, HwHandle, SpriteAllocError};
use crate::shared_constants::{OAM_AFFINE_MATS, OAM_ENTRIES_PER_AFFINE_MAT};
use crate::shared_types::Fixed;
use crate::{debug_log, debug_log::Subsystems};

/// Reference to an affine matrix of the pool.
///
/// Like sprite ids, the generation catches ids kept after the matrix was freed and its
/// index handed out again.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SpriteAffineMatId {
    index: u8,
    generation: u16,
}

impl SpriteAffineMatId {
    pub fn index(&self) -> usize {
        return self.index as usize;
    }
}

/// What an affine matrix does to a sprite.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AffineMatAttributes {
    /// Counter-clockwise rotation in degrees, in the range [0, 360).
    pub rotation_angle: Fixed,
    /// Must be greater than zero.
    pub horizontal_scale: Fixed,
    /// Must be greater than zero.
    pub vertical_scale: Fixed,
    pub horizontal_flip: bool,
    pub vertical_flip: bool,
}

impl Default for AffineMatAttributes {
    fn default() -> AffineMatAttributes {
        return AffineMatAttributes {
            rotation_angle: Fixed::from_bits(0),
            horizontal_scale: Fixed::from_bits(1 << 8),
            vertical_scale: Fixed::from_bits(1 << 8),
            horizontal_flip: false,
            vertical_flip: false,
        };
    }
}

impl AffineMatAttributes {
    pub fn is_valid(&self) -> bool {
        return self.rotation_angle >= 0
            && self.rotation_angle < 360
            && self.horizontal_scale > 0
            && self.vertical_scale > 0;
    }

    /// Whether the transformed sprite can leave its regular rendering area.
    pub fn double_size(&self) -> bool {
        return self.rotation_angle != 0 || self.horizontal_scale > 1 || self.vertical_scale > 1;
    }

    /// The matrix the hardware needs, which maps screen space back into texture space.
    pub fn matrix(&self) -> AffineMatrix {
        let sin = sin_degrees(self.rotation_angle).to_bits();
        let cos = cos_degrees(self.rotation_angle).to_bits();
        let sx = self.horizontal_scale.to_bits();
        let sy = self.vertical_scale.to_bits();

        let mut matrix = AffineMatrix {
            pa: div_8_8(cos, sx),
            pb: div_8_8(sin, sx),
            pc: div_8_8(-sin, sy),
            pd: div_8_8(cos, sy),
        };
        if self.horizontal_flip {
            matrix.pa = -matrix.pa;
            matrix.pb = -matrix.pb;
        }
        if self.vertical_flip {
            matrix.pc = -matrix.pc;
            matrix.pd = -matrix.pd;
        }
        return matrix;
    }
}

/// The four 8.8 fixed-point parameters of a hardware affine matrix.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AffineMatrix {
    pub pa: i16,
    pub pb: i16,
    pub pc: i16,
    pub pd: i16,
}

impl AffineMatrix {
    pub const IDENTITY: AffineMatrix = AffineMatrix {
        pa: 1 << 8,
        pb: 0,
        pc: 0,
        pd: 1 << 8,
    };

    pub fn is_identity(&self) -> bool {
        return *self == AffineMatrix::IDENTITY;
    }
}

/// Divides two 8.8 values, saturating to what fits into a matrix parameter.
fn div_8_8(numerator: i32, denominator: i32) -> i16 {
    let result = (i64::from(numerator) << 8) / i64::from(denominator);
    return result.max(i64::from(i16::MIN)).min(i64::from(i16::MAX)) as i16;
}

/// Bhaskara I's sine approximation, exact at multiples of 30 degrees.
fn sin_degrees(angle: Fixed) -> Fixed {
    const HALF_TURN: i64 = 180 << 8;
    let bits = i64::from(angle.to_bits());
    let (x, sign) = if bits < HALF_TURN {
        (bits, 1)
    } else {
        (bits - HALF_TURN, -1)
    };
    // x * (180 - x) in 16.16
    let p = x * (HALF_TURN - x);
    let result = (4 * p * 256) / (40500 * 65536 - p);
    return Fixed::from_bits((sign * result) as i32);
}

fn cos_degrees(angle: Fixed) -> Fixed {
    let mut shifted = angle + Fixed::from_bits(90 << 8);
    if shifted >= 360 {
        shifted -= Fixed::from_bits(360 << 8);
    }
    return sin_degrees(shifted);
}

#[derive(Debug)]
struct MatItem {
    attributes: AffineMatAttributes,
    matrix: AffineMatrix,
    double_size: bool,
    usages: u16,
    updated: bool,
}

/// The pool itself.
#[derive(Debug)]
pub struct SpriteAffineMatsManager {
    items: Vec<Option<MatItem>>,
    generations: Vec<u16>,
    free: ArrayVec<u8, OAM_AFFINE_MATS>,
    updated: bool,
    commit_range: DirtyRange,
}

impl SpriteAffineMatsManager {
    pub fn new(count: usize) -> SpriteAffineMatsManager {
        assert!(
            count > 0 && count <= OAM_AFFINE_MATS,
            "Invalid affine mats count: {}",
            count
        );
        let mut items = Vec::with_capacity(count);
        items.resize_with(count, || None);
        let mut generations = Vec::with_capacity(count);
        generations.resize(count, 0);
        // Hand out the lowest ids first
        let free = (0..count as u8).rev().collect();
        return SpriteAffineMatsManager {
            items,
            generations,
            free,
            updated: false,
            commit_range: DirtyRange::EMPTY,
        };
    }

    pub fn count(&self) -> usize {
        return self.items.len();
    }

    pub fn used_count(&self) -> usize {
        return self.items.len() - self.free.len();
    }

    /// Allocate a matrix. The caller owns one usage of it.
    pub fn create(
        &mut self,
        attributes: AffineMatAttributes,
    ) -> Result<SpriteAffineMatId, SpriteAllocError> {
        assert!(attributes.is_valid(), "Invalid affine mat attributes: {:?}", attributes);

        let index = match self.free.pop() {
            Some(index) => index,
            None => return Err(SpriteAllocError::AffineMatsFull),
        };
        self.items[index as usize] = Some(MatItem {
            attributes,
            matrix: attributes.matrix(),
            double_size: attributes.double_size(),
            usages: 1,
            updated: true,
        });
        self.updated = true;

        debug_log!(Subsystems::AffineMats, "Created affine mat {}", index);
        return Ok(SpriteAffineMatId {
            index,
            generation: self.generations[index as usize],
        });
    }

    pub fn contains(&self, id: SpriteAffineMatId) -> bool {
        return match self.generations.get(id.index()) {
            Some(generation) => *generation == id.generation && self.items[id.index()].is_some(),
            None => false,
        };
    }

    fn item(&self, id: SpriteAffineMatId) -> &MatItem {
        if !self.contains(id) {
            panic!("Invalid affine mat id: {:?}", id);
        }
        match self.items[id.index()].as_ref() {
            Some(item) => item,
            None => panic!("Invalid affine mat id: {:?}", id),
        }
    }

    fn item_mut(&mut self, id: SpriteAffineMatId) -> &mut MatItem {
        if !self.contains(id) {
            panic!("Invalid affine mat id: {:?}", id);
        }
        match self.items[id.index()].as_mut() {
            Some(item) => item,
            None => panic!("Invalid affine mat id: {:?}", id),
        }
    }

    pub fn increase_usages(&mut self, id: SpriteAffineMatId) {
        self.item_mut(id).usages += 1;
    }

    pub fn decrease_usages(&mut self, id: SpriteAffineMatId) {
        let item = self.item_mut(id);
        item.usages -= 1;
        if item.usages == 0 {
            self.items[id.index()] = None;
            self.generations[id.index()] = self.generations[id.index()].wrapping_add(1);
            self.free.push(id.index);
            debug_log!(Subsystems::AffineMats, "Freed affine mat {}", id.index);
        }
    }

    pub fn usages(&self, id: SpriteAffineMatId) -> u16 {
        return self.item(id).usages;
    }

    pub fn attributes(&self, id: SpriteAffineMatId) -> AffineMatAttributes {
        return self.item(id).attributes;
    }

    pub fn set_attributes(&mut self, id: SpriteAffineMatId, attributes: AffineMatAttributes) {
        assert!(attributes.is_valid(), "Invalid affine mat attributes: {:?}", attributes);

        let item = self.item_mut(id);
        if item.attributes == attributes {
            return;
        }
        item.attributes = attributes;
        item.matrix = attributes.matrix();
        item.double_size = attributes.double_size();
        item.updated = true;
        self.updated = true;
    }

    pub fn set_rotation_angle(&mut self, id: SpriteAffineMatId, rotation_angle: Fixed) {
        let mut attributes = self.attributes(id);
        attributes.rotation_angle = rotation_angle;
        self.set_attributes(id, attributes);
    }

    /// Set both scales at once.
    pub fn set_scale(&mut self, id: SpriteAffineMatId, scale: Fixed) {
        let mut attributes = self.attributes(id);
        attributes.horizontal_scale = scale;
        attributes.vertical_scale = scale;
        self.set_attributes(id, attributes);
    }

    pub fn set_horizontal_scale(&mut self, id: SpriteAffineMatId, horizontal_scale: Fixed) {
        let mut attributes = self.attributes(id);
        attributes.horizontal_scale = horizontal_scale;
        self.set_attributes(id, attributes);
    }

    pub fn set_vertical_scale(&mut self, id: SpriteAffineMatId, vertical_scale: Fixed) {
        let mut attributes = self.attributes(id);
        attributes.vertical_scale = vertical_scale;
        self.set_attributes(id, attributes);
    }

    pub fn horizontal_flip(&self, id: SpriteAffineMatId) -> bool {
        return self.item(id).attributes.horizontal_flip;
    }

    pub fn set_horizontal_flip(&mut self, id: SpriteAffineMatId, horizontal_flip: bool) {
        let mut attributes = self.attributes(id);
        attributes.horizontal_flip = horizontal_flip;
        self.set_attributes(id, attributes);
    }

    pub fn vertical_flip(&self, id: SpriteAffineMatId) -> bool {
        return self.item(id).attributes.vertical_flip;
    }

    pub fn set_vertical_flip(&mut self, id: SpriteAffineMatId, vertical_flip: bool) {
        let mut attributes = self.attributes(id);
        attributes.vertical_flip = vertical_flip;
        self.set_attributes(id, attributes);
    }

    pub fn matrix(&self, id: SpriteAffineMatId) -> AffineMatrix {
        return self.item(id).matrix;
    }

    pub fn is_identity(&self, id: SpriteAffineMatId) -> bool {
        return self.item(id).matrix.is_identity();
    }

    pub fn double_size(&self, id: SpriteAffineMatId) -> bool {
        return self.item(id).double_size;
    }

    /// Whether any matrix changed since the last `update()`.
    pub fn updated(&self) -> bool {
        return self.updated;
    }

    /// Whether the given matrix changed since the last `update()`.
    pub fn updated_id(&self, id: SpriteAffineMatId) -> bool {
        return self.item(id).updated;
    }

    /// Write every changed matrix into the affine parameters of `handles` and
    /// acknowledge the changes.
    pub fn update(&mut self, handles: &mut [HwHandle]) {
        if !self.updated {
            return;
        }
        self.updated = false;

        for (index, item) in self.items.iter_mut().enumerate() {
            if let Some(item) = item {
                if item.updated {
                    item.updated = false;
                    let first = index * OAM_ENTRIES_PER_AFFINE_MAT;
                    let params = [item.matrix.pa, item.matrix.pb, item.matrix.pc, item.matrix.pd];
                    for (handle, param) in handles[first..first + OAM_ENTRIES_PER_AFFINE_MAT]
                        .iter_mut()
                        .zip(params.iter())
                    {
                        handle.affine_param = *param;
                    }
                    self.commit_range.include(index);
                }
            }
        }
    }

    /// Matrices written by `update()` that haven't been transferred yet, in matrix index space.
    pub fn retrieve_commit_range(&mut self) -> DirtyRange {
        return self.commit_range.take();
    }
}
