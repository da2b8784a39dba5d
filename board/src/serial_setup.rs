//! Transmit-only `core::fmt::Write` adapter over the split UARTE driver.

use core::fmt;
use microbit::hal::uarte::{Instance, Uarte, UarteTx};

// The UARTE peripheral can only transmit from RAM, so the split driver
// needs static buffers. The receive half is discarded but split still
// wants a buffer for it.
static mut TX_BUF: [u8; 1] = [0; 1];
static mut RX_BUF: [u8; 1] = [0; 1];

pub struct UartePort<T: Instance>(UarteTx<T>);

impl<T: Instance> UartePort<T> {
    pub fn new(serial: Uarte<T>) -> UartePort<T> {
        let (tx, _rx) = serial
            .split(unsafe { &mut TX_BUF }, unsafe { &mut RX_BUF })
            .unwrap();
        UartePort(tx)
    }
}

impl<T: Instance> fmt::Write for UartePort<T> {
    fn write_str(&mut self, s: &str) -> fmt::Result {
        self.0.write_str(s)
    }
}
