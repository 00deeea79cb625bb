//! Simulation core for a dual-controller 128×64 monochrome graphic LCD
//! module driven purely through parallel-bus pin edges.
//!
//! The device is a reactive state machine: an external microcontroller
//! simulation engine reports line transitions one at a time, the rising
//! edge of the enable line samples a transaction for whichever
//! controller half chip select resolves to, and a deferred callback
//! clears the busy flag after a fixed settle delay. Nothing here renders
//! or loads firmware; presentation layers re-read the pixel store on
//! frame notifications and the engine owns the run loop.

/// Latched pin/bus state primitives and the line attachment table.
pub mod pins;
pub use pins::{PinDirection, PinId, PinState};

/// Controller-half registers, chip-select resolution, instruction decode.
pub mod chip;
pub use chip::{
    ControllerHalf, Half, Instruction, COLUMN_WRAP, STATUS_BUSY, STATUS_ON, STATUS_RESET,
};

/// Shared pixel store spanning both controller halves.
pub mod framebuffer;
pub use framebuffer::{
    store_column, Framebuffer, COLUMN_HALF_MASK, DISPLAY_HEIGHT, DISPLAY_WIDTH, FRAMEBUFFER_BYTES,
    HALF_WIDTH, PAGE_COUNT,
};

/// Host-facing configuration and collaborator contracts.
pub mod api;
pub use api::{
    BusyToken, FrameSink, GlcdConfig, PinSink, SimBus, TraceEvent, TraceSink,
    DEFAULT_READ_SETTLE_US, DEFAULT_WRITE_SETTLE_US, DUMMY_READ_VALUE,
};

/// The device: pin tracking, transaction dispatch, busy-timer arming.
pub mod device;
pub use device::Glcd;

/// Diagnostics counters aggregated per device.
pub mod diag;
pub use diag::DiagCounters;

/// Versioned snapshot of protocol-visible device state.
pub mod snapshot;
pub use snapshot::{GlcdSnapshot, SnapshotError, SnapshotVersion};

#[cfg(test)]
use proptest as _;
#[cfg(test)]
use rstest as _;
