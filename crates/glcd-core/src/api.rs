//! Host-facing contracts for embedding the device in a simulation engine.
//!
//! The device is an explicitly owned object handed to the engine's wiring
//! step; there are no ambient globals. Collaborators appear only as trait
//! parameters: the engine drives the device through [`PinSink`], the
//! device reaches back through [`SimBus`], and presentation layers attach
//! a [`FrameSink`]. All delivery is synchronous and single-threaded — the
//! engine delivers one notification or timer callback at a time, so no
//! state transition ever interleaves with another.

use crate::chip::{Half, Instruction};
use crate::framebuffer::Framebuffer;
use crate::pins::PinId;

/// Default settle delay armed after a sampled write, in microseconds.
pub const DEFAULT_WRITE_SETTLE_US: u64 = 200;
/// Default settle delay armed after a sampled read, in microseconds.
pub const DEFAULT_READ_SETTLE_US: u64 = 500;
/// Value driven onto the bus by a dummy read. The physical part leaves
/// the latch undefined here; the model pins it down for determinism.
pub const DUMMY_READ_VALUE: u8 = 0x00;

/// Top-level immutable configuration for a device instance.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
pub struct GlcdConfig {
    /// Settle delay armed after writes, in microseconds of simulated
    /// time. Zero disables busy arming for writes.
    pub write_settle_us: u64,
    /// Settle delay armed after reads, in microseconds of simulated
    /// time. Zero disables busy arming for reads.
    pub read_settle_us: u64,
    /// Enables deterministic trace event dispatch to the attached sink.
    pub tracing_enabled: bool,
}

impl Default for GlcdConfig {
    fn default() -> Self {
        Self {
            write_settle_us: DEFAULT_WRITE_SETTLE_US,
            read_settle_us: DEFAULT_READ_SETTLE_US,
            tracing_enabled: false,
        }
    }
}

/// Opaque context handed to the engine's deferred-callback scheduler and
/// returned verbatim when the settle timer fires.
///
/// The token names the half that was armed, so a clear always lands on
/// the half that went busy even if firmware has re-targeted chip select
/// inside the settle window.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
pub struct BusyToken(Half);

impl BusyToken {
    /// Creates a token naming the half whose busy flag is to be cleared.
    #[must_use]
    pub const fn new(half: Half) -> Self {
        Self(half)
    }

    /// The half this token clears.
    #[must_use]
    pub const fn half(self) -> Half {
        self.0
    }
}

/// Services the device consumes from the simulation engine.
pub trait SimBus {
    /// Asserts a logical level on a bus line from the device side. Used
    /// to drive the data lines while a read transaction is sampled.
    fn drive_pin(&mut self, pin: PinId, level: bool);

    /// Registers a deferred callback after the given number of
    /// microseconds of simulated time. The engine hands the token back
    /// through [`PinSink::on_timer_fire`] when the delay elapses.
    fn schedule_micros(&mut self, delay_us: u64, token: BusyToken);
}

/// Notification surface the engine invokes on the device.
///
/// One subscription per bus line plus the timer callback; both arrive on
/// the engine's single logical thread of control and complete before the
/// next notification is delivered.
pub trait PinSink {
    /// A bus line's driven value changed to `level`.
    fn on_pin_changed(&mut self, bus: &mut dyn SimBus, pin: PinId, level: bool);

    /// A deferred callback registered via [`SimBus::schedule_micros`]
    /// reached its due time.
    fn on_timer_fire(&mut self, bus: &mut dyn SimBus, token: BusyToken);
}

/// Notification surface for presentation collaborators.
pub trait FrameSink {
    /// The pixel store changed under a successful data write. Cadence-
    /// free: the collaborator may re-read, coalesce, or skip frames.
    fn frame_updated(&mut self, frame: &Framebuffer);
}

/// Deterministic trace events emitted per decoded bus transaction when
/// tracing is enabled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TraceEvent {
    /// An instruction byte was sampled and applied.
    InstructionWrite {
        /// Half addressed by the transaction.
        half: Half,
        /// Decoded instruction form.
        instruction: Instruction,
    },
    /// A data byte was stored into the pixel store.
    DataWrite {
        /// Half addressed by the transaction.
        half: Half,
        /// Page register at sample time.
        page: u8,
        /// Column register at sample time (pre-advance).
        column: u8,
        /// Byte written.
        value: u8,
    },
    /// A live data read drove a stored byte onto the bus.
    DataRead {
        /// Half addressed by the transaction.
        half: Half,
        /// Page register at sample time.
        page: u8,
        /// Column register at sample time (pre-advance).
        column: u8,
        /// Byte driven.
        value: u8,
    },
    /// A data read consumed the armed throwaway and drove the
    /// placeholder instead of pixel data.
    DummyRead {
        /// Half addressed by the transaction.
        half: Half,
    },
    /// A status read drove the packed status byte.
    StatusRead {
        /// Half addressed by the transaction.
        half: Half,
        /// Status byte driven.
        value: u8,
    },
    /// A deferred settle callback cleared a half's busy flag.
    BusyCleared {
        /// Half the fired token named.
        half: Half,
    },
}

/// Sink trait for deterministic trace hooks.
pub trait TraceSink {
    /// Records an event in delivery order.
    fn on_event(&mut self, event: TraceEvent);
}
