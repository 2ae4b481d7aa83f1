/// The error returned in sprite allocation-related failure cases.
///
/// All of these are recoverable: nothing was allocated, and the caller can free
/// something and retry, or simply do without the sprite.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SpriteAllocError {
    ItemsFull,
    VramFull,
    PalettesFull,
    AffineMatsFull,
}

impl core::fmt::Display for SpriteAllocError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        use SpriteAllocError::*;
        match self {
            ItemsFull => write!(
                f,
                "SpriteAllocError: Can't create sprite because the items pool is full"
            ),
            VramFull => write!(
                f,
                "SpriteAllocError: No contiguous free block of VRAM available to allocate sprite tiles"
            ),
            PalettesFull => write!(
                f,
                "SpriteAllocError: No free palette bank available to allocate sprite palette"
            ),
            AffineMatsFull => write!(
                f,
                "SpriteAllocError: Can't create affine matrix because all of them are in use"
            ),
        }
    }
}
