#![no_main] // Don't use the Rust standard entry point
#![no_std] // Don't link the Rust standard library

use cortex_m_rt::entry; // Provides our new entry point
use panic_rtt_target as _; // Handles program crashes
use rtt_target::{rprintln, rtt_init_print}; // Allows debug printing

use microbit::{
    hal::gpio::Level,
    hal::prelude::*,
    hal::twim,
    hal::uarte,
    hal::uarte::{Baudrate, Parity},
    hal::Timer,
    pac::twim0::frequency::FREQUENCY_A,
};

mod serial_setup;
use serial_setup::UartePort;

use flightgear_controller::{mma8451q, ControlSampler, Mma8451q};

/// Control loop period; the simulator expects a fresh line every 50 ms.
/// TIMER0 ticks at 1 MHz, so this is in microseconds.
const TICK_US: u32 = 50_000;
/// Ticks between idle-indicator toggles (500 ms blink).
const IDLE_TOGGLE_TICKS: u32 = 10;

#[entry]
fn main() -> ! {
    rtt_init_print!();
    let board = microbit::Board::take().unwrap();

    let mut serial = {
        let serial = uarte::Uarte::new(
            board.UARTE0,
            board.uart.into(),
            Parity::EXCLUDED,
            Baudrate::BAUD57600,
        );
        UartePort::new(serial)
    };

    let i2c = { twim::Twim::new(board.TWIM0, board.i2c_external.into(), FREQUENCY_A::K100) };

    let mut sensor = match Mma8451q::new(i2c, mma8451q::DEFAULT_ADDRESS) {
        Ok(sensor) => sensor,
        Err(_) => panic!("accelerometer did not acknowledge activation"),
    };
    match sensor.device_id() {
        Ok(id) => rprintln!("accelerometer WHO_AM_I: {:#04x}", id),
        Err(_) => rprintln!("accelerometer WHO_AM_I read failed"),
    }

    // LED in the top-left corner of the matrix as the idle indicator
    let _col1 = board.display_pins.col1.into_push_pull_output(Level::Low);
    let mut row1 = board.display_pins.row1.into_push_pull_output(Level::Low);
    let mut led_on = false;

    let sampler = ControlSampler::new();
    let mut timer = Timer::new(board.TIMER0);
    let mut ticks = 0;

    // One tick per 50 ms. The timer spans the whole period and the
    // sampler's bus and serial time runs inside it, so the cadence does
    // not stretch with the work. The tick always completes before the
    // next period starts, so the bus is never touched reentrantly.
    loop {
        timer.start(TICK_US);

        if sampler.tick(&mut sensor, &mut serial).is_err() {
            rprintln!("tick skipped: bus or serial fault");
        }

        ticks += 1;
        if ticks == IDLE_TOGGLE_TICKS {
            ticks = 0;
            led_on = !led_on;
            if led_on {
                row1.set_high().ok();
            } else {
                row1.set_low().ok();
            }
        }

        nb::block!(timer.wait()).unwrap();
    }
}
