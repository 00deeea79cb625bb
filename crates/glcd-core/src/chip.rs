//! Controller-half register files, chip-select resolution, and
//! instruction decode for the two driver chips behind the shared bus.
//!
//! Each half owns its own addressing and status registers; the pixel
//! store they write into is shared and lives in [`crate::framebuffer`].

use crate::pins::{PinId, PinState};

/// Modulus of the column address register. The counter is wider than one
/// half's 64 physical columns and wraps only after 128 increments.
pub const COLUMN_WRAP: u8 = 128;

/// Status byte: reset line is asserted.
pub const STATUS_RESET: u8 = 1 << 4;
/// Status byte: display output is enabled.
pub const STATUS_ON: u8 = 1 << 5;
/// Status byte: the half is still settling after a transaction.
pub const STATUS_BUSY: u8 = 1 << 7;

/// One of the two driver chips covering half of the display width.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
pub enum Half {
    /// Left half, columns 0–63 of the shared store.
    One,
    /// Right half, columns 64–127 of the shared store.
    Two,
}

impl Half {
    /// Index of this half inside per-device `[_; 2]` tables.
    #[must_use]
    pub const fn index(self) -> usize {
        match self {
            Self::One => 0,
            Self::Two => 1,
        }
    }

    /// Resolves the half addressed by the current chip-select levels.
    ///
    /// CS2 is active-low and is the only line consulted: a low CS2
    /// selects half two, anything else falls back to half one. The
    /// protocol disambiguates with this single "is CS2 active" test
    /// rather than testing CS1 independently, so ties resolve to half
    /// one and the half-two column offset applies exactly when half two
    /// is distinctly selected.
    #[must_use]
    pub const fn resolve(pins: PinState) -> Self {
        if pins.level(PinId::Cs2) {
            Self::One
        } else {
            Self::Two
        }
    }
}

/// One decoded instruction write, classified by the top two data bits.
///
/// Decode is total: every 8-bit pattern lands in exactly one form, so an
/// unexpected byte is a well-defined register write rather than an error.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
pub enum Instruction {
    /// `01xxxxxx` — load the column address register (6 bits).
    SetColumn(u8),
    /// `10xxxxxx` — load the page (row group) register (3 bits).
    SetPage(u8),
    /// `11xxxxxx` — load the display start line register (6 bits).
    SetStartLine(u8),
    /// `00xxxxxx` — switch display output on (bit 0 set) or off.
    DisplayOnOff(bool),
}

impl Instruction {
    /// Decodes one instruction byte.
    #[must_use]
    pub const fn decode(byte: u8) -> Self {
        match byte >> 6 {
            0b01 => Self::SetColumn(byte & 0x3F),
            0b10 => Self::SetPage(byte & 0x07),
            0b11 => Self::SetStartLine(byte & 0x3F),
            _ => Self::DisplayOnOff(byte & 0x01 != 0),
        }
    }
}

/// Addressing and status registers of one controller half.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
pub struct ControllerHalf {
    column: u8,
    page: u8,
    start_line: u8,
    enabled: bool,
    reset_asserted: bool,
    busy: bool,
    dummy_reads: u8,
}

impl ControllerHalf {
    /// A half in its power-on state: all registers zero, output off.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            column: 0,
            page: 0,
            start_line: 0,
            enabled: false,
            reset_asserted: false,
            busy: false,
            dummy_reads: 0,
        }
    }

    /// Current column address register, always in `0..COLUMN_WRAP`.
    #[must_use]
    pub const fn column(self) -> u8 {
        self.column
    }

    /// Current page (row group) register.
    #[must_use]
    pub const fn page(self) -> u8 {
        self.page
    }

    /// Latched display start line register. Accepted and reported but
    /// not applied to addressing; the physical part scrolls the visible
    /// window with it.
    #[must_use]
    pub const fn start_line(self) -> u8 {
        self.start_line
    }

    /// Whether display output is switched on.
    #[must_use]
    pub const fn is_enabled(self) -> bool {
        self.enabled
    }

    /// Whether the reset line is currently asserted.
    #[must_use]
    pub const fn reset_asserted(self) -> bool {
        self.reset_asserted
    }

    /// Whether the half is still settling after a transaction.
    #[must_use]
    pub const fn is_busy(self) -> bool {
        self.busy
    }

    /// Whether the next data read will be consumed as a dummy read.
    #[must_use]
    pub const fn dummy_read_pending(self) -> bool {
        self.dummy_reads > 0
    }

    /// Applies one decoded instruction to the register file.
    #[allow(clippy::missing_const_for_fn)]
    pub fn apply_instruction(&mut self, instruction: Instruction) {
        match instruction {
            Instruction::SetColumn(column) => self.column = column,
            Instruction::SetPage(page) => self.page = page,
            Instruction::SetStartLine(line) => self.start_line = line,
            Instruction::DisplayOnOff(on) => self.enabled = on,
        }
    }

    /// Advances the column address by one, wrapping at [`COLUMN_WRAP`].
    #[allow(clippy::missing_const_for_fn)]
    pub fn advance_column(&mut self) {
        self.column += 1;
        if self.column >= COLUMN_WRAP {
            self.column = 0;
        }
    }

    /// Arms the one-shot dummy-read counter. Every sampled write does
    /// this, so the first read after any address change is a throwaway.
    #[allow(clippy::missing_const_for_fn)]
    pub fn arm_dummy_read(&mut self) {
        self.dummy_reads = 1;
    }

    /// Consumes a pending dummy read, if one is armed.
    #[allow(clippy::missing_const_for_fn)]
    pub fn take_dummy_read(&mut self) -> bool {
        if self.dummy_reads > 0 {
            self.dummy_reads -= 1;
            true
        } else {
            false
        }
    }

    /// Marks the half busy until the deferred settle callback fires.
    #[allow(clippy::missing_const_for_fn)]
    pub fn set_busy(&mut self) {
        self.busy = true;
    }

    /// Clears the busy flag; idempotent, so a stale settle timer firing
    /// after a newer one is harmless.
    #[allow(clippy::missing_const_for_fn)]
    pub fn clear_busy(&mut self) {
        self.busy = false;
    }

    /// Mirrors the latched reset line level into the status register.
    #[allow(clippy::missing_const_for_fn)]
    pub fn set_reset_asserted(&mut self, asserted: bool) {
        self.reset_asserted = asserted;
    }

    /// Packs the status byte driven by a status read: busy in bit 7,
    /// on/off in bit 5, reset in bit 4, all other bits zero.
    #[must_use]
    pub const fn status_byte(self) -> u8 {
        let mut status = 0;
        if self.reset_asserted {
            status |= STATUS_RESET;
        }
        if self.enabled {
            status |= STATUS_ON;
        }
        if self.busy {
            status |= STATUS_BUSY;
        }
        status
    }
}
