#![no_main]

use glcd_core::{BusyToken, Glcd, Half, PinId, SimBus, COLUMN_WRAP};
use libfuzzer_sys::fuzz_target;

#[derive(Default)]
struct NoopBus;

impl SimBus for NoopBus {
    fn drive_pin(&mut self, _pin: PinId, _level: bool) {}
    fn schedule_micros(&mut self, _delay_us: u64, _token: BusyToken) {}
}

fuzz_target!(|data: &[u8]| {
    let mut glcd = Glcd::default();
    let mut bus = NoopBus;

    for op in data {
        let level = op & 0x80 != 0;
        match (op & 0x7F) % 16 {
            14 => glcd.timer_fired(BusyToken::new(Half::One)),
            15 => glcd.timer_fired(BusyToken::new(Half::Two)),
            bit => {
                if let Some(pin) = PinId::from_u8(bit) {
                    glcd.pin_changed(pin, level, &mut bus);
                }
            }
        }

        assert!(glcd.half(Half::One).column() < COLUMN_WRAP);
        assert!(glcd.half(Half::Two).column() < COLUMN_WRAP);
    }

    let _ = glcd.snapshot();
});
