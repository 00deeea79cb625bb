//! The simulated display module: pin tracking, transaction dispatch, and
//! busy-timer arming.
//!
//! One rising edge on the enable line samples exactly one bus
//! transaction for the half the chip-select lines resolve to. Everything
//! happens synchronously inside the engine's notification delivery; the
//! only deferred work is the settle callback that clears a busy flag.

use crate::api::{
    BusyToken, FrameSink, GlcdConfig, PinSink, SimBus, TraceEvent, TraceSink, DUMMY_READ_VALUE,
};
use crate::chip::{ControllerHalf, Half, Instruction};
use crate::diag::DiagCounters;
use crate::framebuffer::{store_column, Framebuffer};
use crate::pins::{PinId, PinState};
use crate::snapshot::{GlcdSnapshot, SnapshotError, SnapshotVersion};

/// A dual-controller graphic LCD module attached to a parallel bus.
///
/// The device owns the pixel store and both controller register files
/// exclusively; the engine's scheduler and pin registry outlive it and
/// are only borrowed per call.
pub struct Glcd {
    config: GlcdConfig,
    pins: PinState,
    data_latch: u8,
    halves: [ControllerHalf; 2],
    framebuffer: Framebuffer,
    in_dispatch: bool,
    counters: DiagCounters,
    frame_sink: Option<Box<dyn FrameSink>>,
    trace_sink: Option<Box<dyn TraceSink>>,
}

impl Default for Glcd {
    fn default() -> Self {
        Self::new(GlcdConfig::default())
    }
}

impl Glcd {
    /// Creates a device in its power-on state.
    #[must_use]
    #[allow(clippy::missing_const_for_fn)]
    pub fn new(config: GlcdConfig) -> Self {
        Self {
            config,
            pins: PinState::new(),
            data_latch: 0,
            halves: [ControllerHalf::new(); 2],
            framebuffer: Framebuffer::new(),
            in_dispatch: false,
            counters: DiagCounters::new(),
            frame_sink: None,
            trace_sink: None,
        }
    }

    /// The configuration this device was created with.
    #[must_use]
    pub const fn config(&self) -> &GlcdConfig {
        &self.config
    }

    /// Current latched image of every bus line.
    #[must_use]
    pub const fn pins(&self) -> PinState {
        self.pins
    }

    /// Last byte sampled from or driven onto the data bus.
    #[must_use]
    pub const fn data_latch(&self) -> u8 {
        self.data_latch
    }

    /// The shared pixel store.
    #[must_use]
    pub const fn framebuffer(&self) -> &Framebuffer {
        &self.framebuffer
    }

    /// Register file of one controller half.
    #[must_use]
    pub const fn half(&self, half: Half) -> &ControllerHalf {
        &self.halves[half.index()]
    }

    /// The half a transaction would address right now.
    #[must_use]
    pub const fn selected_half(&self) -> Half {
        Half::resolve(self.pins)
    }

    /// Diagnostics counters accumulated since creation.
    #[must_use]
    pub const fn counters(&self) -> &DiagCounters {
        &self.counters
    }

    /// Attaches the presentation collaborator notified after every data
    /// write.
    #[allow(clippy::missing_const_for_fn)]
    pub fn set_frame_sink(&mut self, sink: Box<dyn FrameSink>) {
        self.frame_sink = Some(sink);
    }

    /// Attaches the trace sink; events are delivered only while
    /// [`GlcdConfig::tracing_enabled`] is set.
    #[allow(clippy::missing_const_for_fn)]
    pub fn set_trace_sink(&mut self, sink: Box<dyn TraceSink>) {
        self.trace_sink = Some(sink);
    }

    /// Latches a reported line level and, on the rising edge of the
    /// enable line, dispatches one transaction for the currently
    /// selected half.
    ///
    /// A falling edge or a re-reported high never dispatches. Levels
    /// reported while a dispatch is executing are still latched, but a
    /// nested enable edge cannot re-enter dispatch; the guard is
    /// released unconditionally when the dispatch returns.
    pub fn pin_changed<B: SimBus + ?Sized>(&mut self, pin: PinId, level: bool, bus: &mut B) {
        let enable_was_high = self.pins.level(PinId::Enable);
        self.pins.set_level(pin, level);

        if pin == PinId::Reset {
            // Active-low: only the status-visible flag reacts, the pixel
            // store and addressing registers keep their contents.
            for half in &mut self.halves {
                half.set_reset_asserted(!level);
            }
        }

        let enable_is_high = self.pins.level(PinId::Enable);
        if enable_was_high || !enable_is_high || self.in_dispatch {
            return;
        }

        self.in_dispatch = true;
        self.dispatch(bus);
        self.in_dispatch = false;
    }

    /// Clears the busy flag of the half the fired token names.
    ///
    /// Idempotent: if a newer transaction re-armed and cleared first,
    /// the stale timer clears an already-false flag.
    pub fn timer_fired(&mut self, token: BusyToken) {
        self.halves[token.half().index()].clear_busy();
        self.counters.record_busy_clear();
        self.trace(TraceEvent::BusyCleared { half: token.half() });
    }

    /// Exports a snapshot of protocol-visible state.
    #[must_use]
    pub fn snapshot(&self) -> GlcdSnapshot {
        GlcdSnapshot {
            version: SnapshotVersion::V1,
            pins: self.pins.raw(),
            data_latch: self.data_latch,
            halves: self.halves,
            framebuffer: self.framebuffer.flattened(),
        }
    }

    /// Restores protocol-visible state from a snapshot. Counters and
    /// attached sinks are left untouched; the reentrancy guard clears.
    ///
    /// # Errors
    ///
    /// Returns [`SnapshotError::GeometryMismatch`] when the snapshot's
    /// pixel store does not match the compiled display geometry.
    pub fn restore_snapshot(&mut self, snapshot: &GlcdSnapshot) -> Result<(), SnapshotError> {
        snapshot.validate()?;
        self.pins = PinState::from_raw(snapshot.pins);
        self.data_latch = snapshot.data_latch;
        self.halves = snapshot.halves;
        self.framebuffer.copy_from_flattened(&snapshot.framebuffer);
        self.in_dispatch = false;
        Ok(())
    }

    fn dispatch<B: SimBus + ?Sized>(&mut self, bus: &mut B) {
        let half = self.selected_half();
        self.counters.record_transaction(half);

        let delay_us = if self.pins.level(PinId::Rw) {
            self.process_read(half, bus)
        } else {
            self.process_write(half)
        };

        if delay_us > 0 {
            self.halves[half.index()].set_busy();
            bus.schedule_micros(delay_us, BusyToken::new(half));
        }
    }

    fn process_write(&mut self, half: Half) -> u64 {
        self.data_latch = self.pins.data_bus();
        self.halves[half.index()].arm_dummy_read();

        if self.pins.level(PinId::Rs) {
            self.write_data(half);
        } else {
            self.write_instruction(half);
        }
        self.config.write_settle_us
    }

    fn write_data(&mut self, half: Half) {
        let (page, column) = {
            let state = &self.halves[half.index()];
            (state.page(), state.column())
        };
        let value = self.data_latch;
        self.framebuffer
            .write(usize::from(page), store_column(half, column), value);
        self.halves[half.index()].advance_column();

        self.counters.record_data_write();
        self.trace(TraceEvent::DataWrite {
            half,
            page,
            column,
            value,
        });
        if let Some(sink) = self.frame_sink.as_mut() {
            sink.frame_updated(&self.framebuffer);
        }
    }

    fn write_instruction(&mut self, half: Half) {
        let instruction = Instruction::decode(self.data_latch);
        self.halves[half.index()].apply_instruction(instruction);

        self.counters.record_instruction_write();
        self.trace(TraceEvent::InstructionWrite { half, instruction });
    }

    fn process_read<B: SimBus + ?Sized>(&mut self, half: Half, bus: &mut B) -> u64 {
        if self.pins.level(PinId::Rs) {
            if self.halves[half.index()].take_dummy_read() {
                self.drive_data(bus, DUMMY_READ_VALUE);
                self.counters.record_dummy_read();
                self.trace(TraceEvent::DummyRead { half });
            } else {
                let (page, column) = {
                    let state = &self.halves[half.index()];
                    (state.page(), state.column())
                };
                let value = self
                    .framebuffer
                    .read(usize::from(page), store_column(half, column));
                self.drive_data(bus, value);
                self.halves[half.index()].advance_column();

                self.counters.record_data_read();
                self.trace(TraceEvent::DataRead {
                    half,
                    page,
                    column,
                    value,
                });
            }
        } else {
            let value = self.halves[half.index()].status_byte();
            self.drive_data(bus, value);
            self.counters.record_status_read();
            self.trace(TraceEvent::StatusRead { half, value });
        }
        self.config.read_settle_us
    }

    fn drive_data<B: SimBus + ?Sized>(&mut self, bus: &mut B, value: u8) {
        for (bit, pin) in PinId::DATA.iter().enumerate() {
            bus.drive_pin(*pin, (value >> bit) & 1 != 0);
        }
        self.data_latch = value;
    }

    fn trace(&mut self, event: TraceEvent) {
        if !self.config.tracing_enabled {
            return;
        }
        if let Some(sink) = self.trace_sink.as_mut() {
            sink.on_event(event);
        }
    }
}

impl PinSink for Glcd {
    fn on_pin_changed(&mut self, bus: &mut dyn SimBus, pin: PinId, level: bool) {
        self.pin_changed(pin, level, bus);
    }

    fn on_timer_fire(&mut self, _bus: &mut dyn SimBus, token: BusyToken) {
        self.timer_fired(token);
    }
}
