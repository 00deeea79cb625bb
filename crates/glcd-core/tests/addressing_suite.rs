//! Addressing semantics: column wrap-around, half isolation across the
//! shared pixel store, and latch/edge properties.

#![allow(clippy::pedantic, clippy::nursery)]

use glcd_core::{
    store_column, ControllerHalf, Glcd, Half, Instruction, PinId, PinState, SimBus,
    COLUMN_WRAP, DISPLAY_WIDTH, HALF_WIDTH,
};
use proptest::prelude::*;
use rstest as _;
#[cfg(feature = "serde")]
use serde as _;
use thiserror as _;

#[derive(Default)]
struct NoopBus;

impl SimBus for NoopBus {
    fn drive_pin(&mut self, _pin: PinId, _level: bool) {}
    fn schedule_micros(&mut self, _delay_us: u64, _token: glcd_core::BusyToken) {}
}

fn set_pin(glcd: &mut Glcd, bus: &mut NoopBus, pin: PinId, level: bool) {
    glcd.pin_changed(pin, level, bus);
}

fn put_data(glcd: &mut Glcd, bus: &mut NoopBus, byte: u8) {
    for (bit, pin) in PinId::DATA.iter().enumerate() {
        set_pin(glcd, bus, *pin, (byte >> bit) & 1 != 0);
    }
}

fn strobe(glcd: &mut Glcd, bus: &mut NoopBus) {
    set_pin(glcd, bus, PinId::Enable, true);
    set_pin(glcd, bus, PinId::Enable, false);
}

fn select_half(glcd: &mut Glcd, bus: &mut NoopBus, half: Half) {
    match half {
        Half::One => set_pin(glcd, bus, PinId::Cs2, true),
        Half::Two => set_pin(glcd, bus, PinId::Cs2, false),
    }
}

fn write_instruction(glcd: &mut Glcd, bus: &mut NoopBus, byte: u8) {
    set_pin(glcd, bus, PinId::Rs, false);
    set_pin(glcd, bus, PinId::Rw, false);
    put_data(glcd, bus, byte);
    strobe(glcd, bus);
}

fn write_data_byte(glcd: &mut Glcd, bus: &mut NoopBus, byte: u8) {
    set_pin(glcd, bus, PinId::Rs, true);
    set_pin(glcd, bus, PinId::Rw, false);
    put_data(glcd, bus, byte);
    strobe(glcd, bus);
}

const SET_PAGE: u8 = 0b1011_1000;
const SET_COLUMN: u8 = 0b0100_0000;

#[test]
fn data_writes_walk_and_wrap_the_column_register() {
    let mut glcd = Glcd::default();
    let mut bus = NoopBus;

    select_half(&mut glcd, &mut bus, Half::One);
    write_instruction(&mut glcd, &mut bus, SET_COLUMN | 62);
    write_data_byte(&mut glcd, &mut bus, 0x01);
    write_data_byte(&mut glcd, &mut bus, 0x02);
    assert_eq!(glcd.half(Half::One).column(), 64);

    // The register keeps counting past one half's width; the store folds
    // back into the half's own 64 columns.
    write_data_byte(&mut glcd, &mut bus, 0x03);
    assert_eq!(glcd.framebuffer().read(0, 62), 0x01);
    assert_eq!(glcd.framebuffer().read(0, 63), 0x02);
    assert_eq!(glcd.framebuffer().read(0, 0), 0x03);
}

#[test]
fn half_two_writes_land_in_the_right_columns() {
    let mut glcd = Glcd::default();
    let mut bus = NoopBus;

    select_half(&mut glcd, &mut bus, Half::Two);
    write_instruction(&mut glcd, &mut bus, SET_PAGE | 2);
    write_instruction(&mut glcd, &mut bus, SET_COLUMN | 7);
    write_data_byte(&mut glcd, &mut bus, 0x99);

    assert_eq!(glcd.framebuffer().read(2, HALF_WIDTH + 7), 0x99);
    assert_eq!(glcd.framebuffer().read(2, 7), 0x00);
}

#[test]
fn halves_are_isolated_at_identical_addresses() {
    let mut glcd = Glcd::default();
    let mut bus = NoopBus;

    // Same (page, column) on both halves, different payloads.
    select_half(&mut glcd, &mut bus, Half::One);
    write_instruction(&mut glcd, &mut bus, SET_PAGE | 5);
    write_instruction(&mut glcd, &mut bus, SET_COLUMN | 20);
    write_data_byte(&mut glcd, &mut bus, 0xDE);

    select_half(&mut glcd, &mut bus, Half::Two);
    write_instruction(&mut glcd, &mut bus, SET_PAGE | 5);
    write_instruction(&mut glcd, &mut bus, SET_COLUMN | 20);
    write_data_byte(&mut glcd, &mut bus, 0xAD);

    assert_eq!(glcd.framebuffer().read(5, 20), 0xDE);
    assert_eq!(glcd.framebuffer().read(5, HALF_WIDTH + 20), 0xAD);

    // Each half's registers advanced independently.
    assert_eq!(glcd.half(Half::One).column(), 21);
    assert_eq!(glcd.half(Half::Two).column(), 21);
}

#[test]
fn full_wrap_returns_the_column_register_to_its_origin() {
    let mut glcd = Glcd::default();
    let mut bus = NoopBus;

    select_half(&mut glcd, &mut bus, Half::One);
    write_instruction(&mut glcd, &mut bus, SET_COLUMN | 9);
    for _ in 0..COLUMN_WRAP {
        write_data_byte(&mut glcd, &mut bus, 0x55);
    }
    assert_eq!(glcd.half(Half::One).column(), 9);
}

#[test]
fn dispatch_addresses_the_half_selected_at_strobe_time() {
    let mut glcd = Glcd::default();
    let mut bus = NoopBus;

    // Selection is level-resolved per transaction, never latched across
    // transactions.
    select_half(&mut glcd, &mut bus, Half::One);
    select_half(&mut glcd, &mut bus, Half::Two);
    write_data_byte(&mut glcd, &mut bus, 0x42);

    assert_eq!(glcd.counters().transactions_for(Half::One), 0);
    assert_eq!(glcd.counters().transactions_for(Half::Two), 1);
    assert_eq!(glcd.framebuffer().read(0, HALF_WIDTH), 0x42);
}

proptest! {
    #[test]
    fn property_column_register_wraps_to_its_origin(start in 0u8..64) {
        let mut half = ControllerHalf::new();
        half.apply_instruction(Instruction::SetColumn(start));
        for _ in 0..COLUMN_WRAP {
            half.advance_column();
        }
        prop_assert_eq!(half.column(), start);
    }

    #[test]
    fn property_column_register_stays_in_range(start in 0u8..64, steps in 0usize..512) {
        let mut half = ControllerHalf::new();
        half.apply_instruction(Instruction::SetColumn(start));
        for _ in 0..steps {
            half.advance_column();
            prop_assert!(half.column() < COLUMN_WRAP);
        }
    }

    #[test]
    fn property_store_columns_never_cross_halves(column in 0u8..128) {
        let one = store_column(Half::One, column);
        let two = store_column(Half::Two, column);
        prop_assert!(one < HALF_WIDTH);
        prop_assert!((HALF_WIDTH..DISPLAY_WIDTH).contains(&two));
    }

    #[test]
    fn property_latching_is_idempotent(raw in 0u16..1 << 14, bit in 0u8..14, level: bool) {
        let pin = PinId::from_u8(bit).expect("defined line");
        let mut once = PinState::from_raw(raw);
        once.set_level(pin, level);
        let mut twice = once;
        twice.set_level(pin, level);
        prop_assert_eq!(once, twice);
    }

    #[test]
    fn property_decode_is_total(byte: u8) {
        // Every byte decodes to some instruction form; none are errors.
        let _ = Instruction::decode(byte);
    }
}
