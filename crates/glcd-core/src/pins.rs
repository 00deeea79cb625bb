//! Latched pin/bus state for the parallel control and data lines.
//!
//! The device never samples host wiring directly: the simulation engine
//! reports every line transition as an edge notification and the latched
//! image kept here is the authoritative "what is the bus doing right now".
//! Line levels are packed into one fixed-width bitfield because the
//! protocol decode reads multi-bit combinations (the whole data byte, the
//! top two instruction bits) exactly the way the physical bus does.

/// Identifies one of the 14 bus lines the module exposes.
///
/// Discriminants are the bit positions of each line inside [`PinState`];
/// D0–D7 are contiguous so the data byte is one shift-and-mask away.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
#[repr(u8)]
pub enum PinId {
    /// Chip select for the left controller half (latched, not decoded).
    Cs1 = 0,
    /// Chip select for the right controller half (active-low, decoded).
    Cs2 = 1,
    /// Register select: high addresses display data, low an instruction
    /// (on writes) or the status byte (on reads).
    Rs = 2,
    /// Read/write select: high samples a read, low a write.
    Rw = 3,
    /// Enable strobe: the rising edge latches one bus transaction.
    Enable = 4,
    /// Data bus bit 0.
    D0 = 5,
    /// Data bus bit 1.
    D1 = 6,
    /// Data bus bit 2.
    D2 = 7,
    /// Data bus bit 3.
    D3 = 8,
    /// Data bus bit 4.
    D4 = 9,
    /// Data bus bit 5.
    D5 = 10,
    /// Data bus bit 6.
    D6 = 11,
    /// Data bus bit 7.
    D7 = 12,
    /// Reset line (active-low); only the status-visible flag reacts.
    Reset = 13,
}

/// Electrical role of a line as seen from the simulation engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PinDirection {
    /// Driven by the engine only.
    Input,
    /// Driven by the engine normally, by the device during data reads.
    Bidirectional,
}

impl PinId {
    /// Number of bus lines.
    pub const COUNT: usize = 14;

    /// Every line, in bit-position order. The engine wires one IRQ
    /// endpoint per entry at attachment time.
    pub const ALL: [Self; Self::COUNT] = [
        Self::Cs1,
        Self::Cs2,
        Self::Rs,
        Self::Rw,
        Self::Enable,
        Self::D0,
        Self::D1,
        Self::D2,
        Self::D3,
        Self::D4,
        Self::D5,
        Self::D6,
        Self::D7,
        Self::Reset,
    ];

    /// The eight data lines, least-significant bit first.
    pub const DATA: [Self; 8] = [
        Self::D0,
        Self::D1,
        Self::D2,
        Self::D3,
        Self::D4,
        Self::D5,
        Self::D6,
        Self::D7,
    ];

    /// Mask of this line inside the latched [`PinState`] bitfield.
    #[must_use]
    pub const fn mask(self) -> u16 {
        1 << (self as u8)
    }

    /// Converts a raw bit position back into a line identifier.
    #[must_use]
    pub const fn from_u8(bit: u8) -> Option<Self> {
        match bit {
            0 => Some(Self::Cs1),
            1 => Some(Self::Cs2),
            2 => Some(Self::Rs),
            3 => Some(Self::Rw),
            4 => Some(Self::Enable),
            5 => Some(Self::D0),
            6 => Some(Self::D1),
            7 => Some(Self::D2),
            8 => Some(Self::D3),
            9 => Some(Self::D4),
            10 => Some(Self::D5),
            11 => Some(Self::D6),
            12 => Some(Self::D7),
            13 => Some(Self::Reset),
            _ => None,
        }
    }

    /// Stable per-line name used for host wiring tables and debug output.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Cs1 => "cs1",
            Self::Cs2 => "cs2",
            Self::Rs => "rs",
            Self::Rw => "rw",
            Self::Enable => "e",
            Self::D0 => "d0",
            Self::D1 => "d1",
            Self::D2 => "d2",
            Self::D3 => "d3",
            Self::D4 => "d4",
            Self::D5 => "d5",
            Self::D6 => "d6",
            Self::D7 => "d7",
            Self::Reset => "rst",
        }
    }

    /// Whether this line is part of the data bus.
    #[must_use]
    pub const fn is_data(self) -> bool {
        matches!(
            self,
            Self::D0
                | Self::D1
                | Self::D2
                | Self::D3
                | Self::D4
                | Self::D5
                | Self::D6
                | Self::D7
        )
    }

    /// Electrical role of the line for the engine's wiring step.
    #[must_use]
    pub const fn direction(self) -> PinDirection {
        if self.is_data() {
            PinDirection::Bidirectional
        } else {
            PinDirection::Input
        }
    }
}

/// Mask of the bits a [`PinState`] may carry.
const PIN_STATE_MASK: u16 = (1 << PinId::COUNT) - 1;

/// Latched logical level of every bus line, one bit per [`PinId`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
pub struct PinState(u16);

impl PinState {
    /// All lines low.
    #[must_use]
    pub const fn new() -> Self {
        Self(0)
    }

    /// Rebuilds a latched image from its raw bitfield; bits beyond the
    /// defined lines are discarded.
    #[must_use]
    pub const fn from_raw(raw: u16) -> Self {
        Self(raw & PIN_STATE_MASK)
    }

    /// Raw bitfield, bit position per [`PinId`] discriminant.
    #[must_use]
    pub const fn raw(self) -> u16 {
        self.0
    }

    /// Current latched level of one line.
    #[must_use]
    pub const fn level(self, pin: PinId) -> bool {
        self.0 & pin.mask() != 0
    }

    /// Latches a reported level. Idempotent: re-reporting the current
    /// level leaves the image unchanged.
    #[allow(clippy::missing_const_for_fn)]
    pub fn set_level(&mut self, pin: PinId, level: bool) {
        if level {
            self.0 |= pin.mask();
        } else {
            self.0 &= !pin.mask();
        }
    }

    /// The 8-bit value currently latched on D0–D7.
    #[must_use]
    #[allow(clippy::cast_possible_truncation)]
    pub const fn data_bus(self) -> u8 {
        ((self.0 >> PinId::D0 as u8) & 0xFF) as u8
    }
}
