use std::fmt;

/// Pixels reserved around every sprite of a sheet.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Padding(u32);

impl Padding {
    /// Largest accepted padding, keeps sheet sizes far from overflow.
    pub const MAX: u32 = 1024;
    const DEFAULT: u32 = 8;

    /// Creates a new padding.
    ///
    /// # Errors
    /// This function returns an [error](TooLarge) if the padding is too large.
    pub const fn new(pixels: u32) -> Result<Self, TooLarge> {
        if pixels > Self::MAX {
            return Err(TooLarge(pixels));
        }

        Ok(Self(pixels))
    }

    #[must_use]
    pub const fn get(self) -> u32 {
        self.0
    }
}

impl Default for Padding {
    fn default() -> Self {
        Self(Self::DEFAULT)
    }
}

/// How the padding around a sprite is filled.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Fill {
    /// Replicate the nearest edge pixel of the sprite.
    #[default]
    Extend,

    /// Leave the padding transparent.
    Transparent,
}

/// How many grid rows a sheet has.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Layout {
    /// As many rows as columns.
    #[default]
    Square,

    /// Only the rows that hold sprites.
    Compact,
}

#[derive(Debug)]
pub struct TooLarge(u32);

impl fmt::Display for TooLarge {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(
            f,
            "padding value {} is greater than maximum {}",
            self.0,
            Padding::MAX,
        )
    }
}
