//! Attitude estimation and flight-control command generation.
//!
//! Once per tick the sampler reads the three acceleration axes, projects
//! the gravity vector into roll and pitch, clamps both to the board's ±60°
//! usable range and normalizes them into elevator/aileron commands in
//! [-1.0, 1.0]. The tuple goes out as one tab-separated CRLF line per tick.

use core::fmt;

use embedded_hal::blocking::i2c;
use micromath::F32Ext;

use crate::mma8451q::Mma8451q;
use crate::Error;

/// Largest roll angle mapped onto the aileron range, in degrees.
pub const MAX_ROLL: f32 = 60.0;
/// Largest pitch angle mapped onto the elevator range, in degrees.
pub const MAX_PITCH: f32 = 60.0;

/// Value of pi used for the radians-to-degrees conversion.
///
/// The receiving side is tested against output produced with the truncated
/// constant, so that stays the default; `Exact` trades wire compatibility
/// for full `f32` precision.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PiPrecision {
    Truncated,
    Exact,
}

impl PiPrecision {
    fn value(self) -> f32 {
        match self {
            PiPrecision::Truncated => 3.1415,
            PiPrecision::Exact => core::f32::consts::PI,
        }
    }
}

impl Default for PiPrecision {
    fn default() -> Self {
        PiPrecision::Truncated
    }
}

/// Board orientation in degrees, derived from the gravity vector.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Attitude {
    pub roll: f32,
    pub pitch: f32,
}

impl Attitude {
    /// Project normalized accelerations (in g) into roll and pitch.
    pub fn from_acceleration(x: f32, y: f32, z: f32, pi: PiPrecision) -> Attitude {
        let deg = 180.0 / pi.value();
        Attitude {
            roll: (-y).atan2(z) * deg,
            pitch: x.atan2((y * y + z * z).sqrt()) * deg,
        }
    }
}

/// One tick's worth of control surface commands, each in [-1.0, 1.0].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Controls {
    pub elevator: f32,
    pub aileron: f32,
    /// Always 0.0; the board has no input that could drive it.
    pub rudder: f32,
}

impl Controls {
    /// Saturate the attitude at the ±60° limits and normalize. Angles
    /// exactly at a limit map to exactly ±1.0.
    pub fn from_attitude(attitude: Attitude) -> Controls {
        let roll = attitude.roll.clamp(-MAX_ROLL, MAX_ROLL);
        let pitch = attitude.pitch.clamp(-MAX_PITCH, MAX_PITCH);
        Controls {
            // + 0.0 folds -0.0 into 0.0 so a zero command never
            // serializes with a sign
            elevator: pitch / MAX_PITCH + 0.0,
            aileron: roll / MAX_ROLL + 0.0,
            rudder: 0.0,
        }
    }

    /// Write the wire line: three six-decimal floats separated by tabs,
    /// CRLF terminated.
    pub fn write_line<W: fmt::Write>(&self, serial: &mut W) -> fmt::Result {
        write!(
            serial,
            "{:.6}\t{:.6}\t{:.6}\r\n",
            self.elevator, self.aileron, self.rudder
        )
    }
}

/// Periodic sampler tying the accelerometer to the serial sink.
///
/// Stateless apart from its pi setting; the caller owns the cadence and
/// must not re-enter `tick` while a previous call is still running, which
/// the single-threaded firmware loop guarantees by construction.
#[derive(Debug, Clone, Copy, Default)]
pub struct ControlSampler {
    pi: PiPrecision,
}

impl ControlSampler {
    pub fn new() -> ControlSampler {
        ControlSampler::default()
    }

    pub fn with_pi(pi: PiPrecision) -> ControlSampler {
        ControlSampler { pi }
    }

    /// Run one control-loop iteration: read all axes, derive the commands
    /// and emit the line. Returns the commands for observability.
    pub fn tick<I2C, E, W>(
        &self,
        sensor: &mut Mma8451q<I2C>,
        serial: &mut W,
    ) -> Result<Controls, Error<E>>
    where
        I2C: i2c::Write<Error = E> + i2c::WriteRead<Error = E>,
        W: fmt::Write,
    {
        let (x, y, z) = sensor.acceleration().map_err(Error::Bus)?;
        let controls = Controls::from_attitude(Attitude::from_acceleration(x, y, z, self.pi));
        controls.write_line(serial)?;
        Ok(controls)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mock::{BusFault, MockBus};
    use crate::mma8451q::DEFAULT_ADDRESS;

    type Line = heapless::String<64>;

    fn level_attitude() -> Attitude {
        Attitude::from_acceleration(0.0, 0.0, 1.0, PiPrecision::Truncated)
    }

    #[test]
    fn level_board_has_zero_attitude() {
        let attitude = level_attitude();
        assert_eq!(attitude.roll, 0.0);
        assert_eq!(attitude.pitch, 0.0);
    }

    #[test]
    fn level_board_emits_all_zero_line() {
        let controls = Controls::from_attitude(level_attitude());
        let mut line = Line::new();
        controls.write_line(&mut line).unwrap();
        assert_eq!(line.as_str(), "0.000000\t0.000000\t0.000000\r\n");
    }

    #[test]
    fn excessive_pitch_saturates_elevator_at_one() {
        // 2 g forward is beyond any reachable tilt; pitch clamps to 60°
        let attitude = Attitude::from_acceleration(2.0, 0.0, 1.0, PiPrecision::Truncated);
        assert!(attitude.pitch > MAX_PITCH);
        let controls = Controls::from_attitude(attitude);
        assert_eq!(controls.elevator, 1.0);
    }

    #[test]
    fn rudder_is_always_zero() {
        for &(x, y, z) in &[
            (0.0, 0.0, 1.0),
            (1.0, -1.0, 0.5),
            (-2.0, 2.0, -1.0),
            (0.3, 0.9, 0.1),
        ] {
            let attitude = Attitude::from_acceleration(x, y, z, PiPrecision::Truncated);
            assert_eq!(Controls::from_attitude(attitude).rudder, 0.0);
        }
    }

    #[test]
    fn clamp_is_idempotent() {
        for &roll in &[-120.0f32, -60.0, -12.5, 0.0, 59.9, 60.0, 400.0] {
            let once = roll.clamp(-MAX_ROLL, MAX_ROLL);
            let twice = once.clamp(-MAX_ROLL, MAX_ROLL);
            assert_eq!(once, twice);
        }
    }

    #[test]
    fn commands_stay_in_unit_range_for_any_finite_angle() {
        for &angle in &[-1.0e6f32, -61.0, -60.0, -1.0, 0.0, 1.0, 60.0, 61.0, 1.0e6] {
            let controls = Controls::from_attitude(Attitude {
                roll: angle,
                pitch: angle,
            });
            assert!(controls.aileron >= -1.0 && controls.aileron <= 1.0);
            assert!(controls.elevator >= -1.0 && controls.elevator <= 1.0);
        }
    }

    #[test]
    fn angles_at_the_limit_pass_through_unclamped() {
        let controls = Controls::from_attitude(Attitude {
            roll: -60.0,
            pitch: 60.0,
        });
        assert_eq!(controls.aileron, -1.0);
        assert_eq!(controls.elevator, 1.0);
    }

    #[test]
    fn pi_precision_changes_the_conversion() {
        let truncated = Attitude::from_acceleration(0.5, -0.5, 0.7, PiPrecision::Truncated);
        let exact = Attitude::from_acceleration(0.5, -0.5, 0.7, PiPrecision::Exact);
        assert!(truncated.roll != exact.roll);
        assert!(truncated.roll > exact.roll); // smaller divisor, larger degrees
    }

    #[test]
    fn tick_reads_all_axes_and_writes_the_line() {
        let mut bus = MockBus::new();
        bus.queue_read(&[0x00, 0x00]); // x = 0 g
        bus.queue_read(&[0x00, 0x00]); // y = 0 g
        bus.queue_read(&[0x40, 0x00]); // z = 1 g
        let mut sensor = Mma8451q::new(bus, DEFAULT_ADDRESS).unwrap();

        let mut line = Line::new();
        let controls = ControlSampler::new().tick(&mut sensor, &mut line).unwrap();
        assert_eq!(controls.elevator, 0.0);
        assert_eq!(controls.aileron, 0.0);
        assert_eq!(line.as_str(), "0.000000\t0.000000\t0.000000\r\n");
    }

    #[test]
    fn tick_surfaces_bus_faults() {
        let mut bus = MockBus::new();
        bus.queue_read(&[0x00, 0x00]); // only the first axis read succeeds
        let mut sensor = Mma8451q::new(bus, DEFAULT_ADDRESS).unwrap();

        let mut line = Line::new();
        let result = ControlSampler::new().tick(&mut sensor, &mut line);
        assert_eq!(result, Err(Error::Bus(BusFault)));
        assert!(line.is_empty()); // nothing goes out on a failed tick
    }
}
