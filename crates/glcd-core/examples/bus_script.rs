//! Deterministic bus-script fingerprint generator used for cross-host
//! comparison.
//!
//! Drives a firmware-like write sequence through both controller halves
//! and prints an FNV fingerprint of the resulting pixel state and
//! counters. Two builds disagreeing on the printed value have diverged
//! on protocol semantics.

use glcd_core::{BusyToken, Glcd, Half, PinId, SimBus};
use proptest as _;
use rstest as _;
#[cfg(feature = "serde")]
use serde as _;
use thiserror as _;

/// Host double that immediately fires every settle timer it is handed.
#[derive(Default)]
struct ImmediateBus {
    pending: Vec<BusyToken>,
}

impl SimBus for ImmediateBus {
    fn drive_pin(&mut self, _pin: PinId, _level: bool) {}

    fn schedule_micros(&mut self, _delay_us: u64, token: BusyToken) {
        self.pending.push(token);
    }
}

fn put_data(glcd: &mut Glcd, bus: &mut ImmediateBus, byte: u8) {
    for (bit, pin) in PinId::DATA.iter().enumerate() {
        glcd.pin_changed(*pin, (byte >> bit) & 1 != 0, bus);
    }
}

fn strobe(glcd: &mut Glcd, bus: &mut ImmediateBus) {
    glcd.pin_changed(PinId::Enable, true, bus);
    glcd.pin_changed(PinId::Enable, false, bus);
    for token in std::mem::take(&mut bus.pending) {
        glcd.timer_fired(token);
    }
}

fn write_instruction(glcd: &mut Glcd, bus: &mut ImmediateBus, byte: u8) {
    glcd.pin_changed(PinId::Rs, false, bus);
    glcd.pin_changed(PinId::Rw, false, bus);
    put_data(glcd, bus, byte);
    strobe(glcd, bus);
}

fn write_data_byte(glcd: &mut Glcd, bus: &mut ImmediateBus, byte: u8) {
    glcd.pin_changed(PinId::Rs, true, bus);
    glcd.pin_changed(PinId::Rw, false, bus);
    put_data(glcd, bus, byte);
    strobe(glcd, bus);
}

fn select_half(glcd: &mut Glcd, bus: &mut ImmediateBus, half: Half) {
    let cs2_level = matches!(half, Half::One);
    glcd.pin_changed(PinId::Cs2, cs2_level, bus);
}

fn hash_bytes(hash: &mut u64, bytes: &[u8]) {
    for byte in bytes {
        *hash ^= u64::from(*byte);
        *hash = hash.wrapping_mul(0x1000_0000_01B3);
    }
}

fn fingerprint() -> u64 {
    let mut glcd = Glcd::default();
    let mut bus = ImmediateBus::default();

    for half in [Half::One, Half::Two] {
        select_half(&mut glcd, &mut bus, half);
        write_instruction(&mut glcd, &mut bus, 0b0011_1111); // display on

        for page in 0..8u8 {
            write_instruction(&mut glcd, &mut bus, 0b1011_1000 | page);
            write_instruction(&mut glcd, &mut bus, 0b0100_0000);
            for column in 0..64u8 {
                // Checkerboard with a per-half phase shift.
                let phase = u8::from(matches!(half, Half::Two));
                let byte = if (column + page + phase) % 2 == 0 {
                    0x55
                } else {
                    0xAA
                };
                write_data_byte(&mut glcd, &mut bus, byte);
            }
        }
    }

    let mut hash = 0xcbf2_9ce4_8422_2325_u64;
    hash_bytes(&mut hash, &glcd.framebuffer().flattened());
    hash_bytes(&mut hash, &glcd.counters().data_writes.to_le_bytes());
    hash_bytes(&mut hash, &glcd.counters().instruction_writes.to_le_bytes());
    hash_bytes(&mut hash, &glcd.counters().busy_clears.to_le_bytes());
    hash
}

fn main() {
    println!("glcd bus-script fingerprint: {:016x}", fingerprint());
}
