//! This module contains a macro and related types which allows for enabling debug output
//! for particular subsystems at compile time.
//!
//! If a subsystem's debugging is disabled, debug print invocations cause no performance penalty.
//!
//! On the console, messages are sent to mGBA's debug output.
//! Host test builds print them to stderr instead, everywhere else they are dropped.
//!
//! Please disable all subsystems you're not currently working on before publishing a release binary!
//! Logging from inside `commit()` eats into the VBlank budget.

use core::fmt;

/// List of subsystems logging can be enabled for.
#[derive(Debug, PartialEq)]
pub enum Subsystems {
    SpritesManager,
    SortedSprites,
    SpriteTiles,
    SpritePalettes,
    AffineMats,
    Commit,
}

impl Subsystems {
    pub fn to_str(&self) -> &'static str {
        use Subsystems::*;
        match self {
            SpritesManager => "SPRITES MANAGER",
            SortedSprites => "SORTED SPRITES",
            SpriteTiles => "SPRITE TILES",
            SpritePalettes => "SPRITE PALETTES",
            AffineMats => "AFFINE MATS",
            Commit => "COMMIT",
        }
    }
}

/// List of subsystems to enable logging for
pub const ENABLED_SUBSYSTEMS: [Subsystems; 2] = [Subsystems::SpritesManager, Subsystems::SpriteTiles];

#[macro_export]
macro_rules! debug_log {
  ($subsystem:expr, $($arg:tt)*) => {{
    if $crate::debug_log::ENABLED_SUBSYSTEMS.contains(&$subsystem) {
        $crate::debug_log::emit(&$subsystem, format_args!($($arg)*));
    }
  }};
}

/// Sends a single formatted message to whatever debug output the target has.
#[doc(hidden)]
pub fn emit(subsystem: &Subsystems, args: fmt::Arguments) {
    #[cfg(target_arch = "arm")]
    {
        use core::fmt::Write;
        use gba::mgba::{MgbaBufferedLogger, MgbaMessageLevel};
        // Outside of mGBA there's nobody listening, so failing to get a logger is fine
        if let Ok(mut logger) = MgbaBufferedLogger::try_new(MgbaMessageLevel::Debug) {
            let _ = write!(logger, "[{}] {}", subsystem.to_str(), args);
        }
    }

    #[cfg(all(test, not(target_arch = "arm")))]
    {
        std::eprintln!("[{}] {}", subsystem.to_str(), args);
    }

    #[cfg(all(not(test), not(target_arch = "arm")))]
    {
        let _ = (subsystem, args);
    }
}
