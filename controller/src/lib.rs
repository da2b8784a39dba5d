//! Core of a tilt controller for FlightGear: an MMA8451Q accelerometer
//! driver and the sampling logic that turns gravity-vector readings into
//! elevator/aileron/rudder commands on a serial line.
//!
//! Everything here is `no_std` and generic over the `embedded-hal` blocking
//! I2C traits, so the same code runs on the board and under host tests.

#![cfg_attr(not(test), no_std)]

pub mod control;
pub mod mma8451q;

#[cfg(test)]
pub(crate) mod mock;

pub use control::{Attitude, ControlSampler, Controls, PiPrecision};
pub use mma8451q::{Axis, Mma8451q};

use core::fmt;

/// Faults a sampler tick can hit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Error<E> {
    /// The I2C transaction failed; the inner value is the bus error.
    Bus(E),
    /// The serial sink rejected the formatted line.
    Serial,
}

impl<E> From<fmt::Error> for Error<E> {
    fn from(_: fmt::Error) -> Self {
        Error::Serial
    }
}
