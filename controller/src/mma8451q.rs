//! Register-level driver for the NXP MMA8451Q 3-axis accelerometer.
//!
//! The device speaks a plain register protocol: a one-byte register address
//! written with a repeated start, followed by the data bytes. Acceleration
//! samples are 14-bit two's complement at 4096 counts per g (±2 g full
//! scale, the power-on default). Bus errors are returned to the caller
//! unchanged; the driver never retries.

use embedded_hal::blocking::i2c;

/// 7-bit bus address with the SA0 pin pulled high.
pub const DEFAULT_ADDRESS: u8 = 0x1D;

/// Fixed contents of the WHO_AM_I register.
pub const DEVICE_ID: u8 = 0x1A;

const COUNTS_PER_G: f32 = 4096.0;

/// Register addresses from the MMA8451Q datasheet.
mod reg {
    pub const OUT_X_MSB: u8 = 0x01;
    pub const OUT_Y_MSB: u8 = 0x03;
    pub const OUT_Z_MSB: u8 = 0x05;
    pub const WHO_AM_I: u8 = 0x0D;
    pub const PULSE_CFG: u8 = 0x21;
    pub const PULSE_THSX: u8 = 0x23;
    pub const PULSE_THSY: u8 = 0x24;
    pub const PULSE_THSZ: u8 = 0x25;
    pub const PULSE_TMLT: u8 = 0x26;
    pub const PULSE_LTCY: u8 = 0x27;
    pub const PULSE_WIND: u8 = 0x28;
    pub const CTRL_REG1: u8 = 0x2A;
    pub const CTRL_REG4: u8 = 0x2D;
    pub const CTRL_REG5: u8 = 0x2E;
}

/// Measurement axis, mapped to its output register.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Axis {
    X,
    Y,
    Z,
}

impl Axis {
    fn register(self) -> u8 {
        match self {
            Axis::X => reg::OUT_X_MSB,
            Axis::Y => reg::OUT_Y_MSB,
            Axis::Z => reg::OUT_Z_MSB,
        }
    }
}

/// Reconstruct a signed sample from the MSB register and the left-justified
/// LSB register. Values above half the 14-bit range are negative.
pub fn decode_sample(msb: u8, lsb: u8) -> i16 {
    let raw = ((msb as i16) << 6) | ((lsb >> 2) as i16);
    if raw > 8191 {
        raw - 16384
    } else {
        raw
    }
}

pub struct Mma8451q<I2C> {
    i2c: I2C,
    address: u8,
}

impl<I2C, E> Mma8451q<I2C>
where
    I2C: i2c::Write<Error = E> + i2c::WriteRead<Error = E>,
{
    /// Take ownership of the bus and put the device into active mode.
    ///
    /// The activation write is the only side effect of construction; if it
    /// fails the device is left untouched and the error is returned.
    pub fn new(i2c: I2C, address: u8) -> Result<Self, E> {
        let mut dev = Mma8451q { i2c, address };
        dev.write_register(reg::CTRL_REG1, 0x01)?;
        Ok(dev)
    }

    /// Read WHO_AM_I. Diagnostics only; a healthy part answers [`DEVICE_ID`].
    pub fn device_id(&mut self) -> Result<u8, E> {
        self.read_register(reg::WHO_AM_I)
    }

    /// Read one axis as a signed 14-bit sample in counts.
    pub fn raw_axis(&mut self, axis: Axis) -> Result<i16, E> {
        let mut data = [0u8; 2];
        self.i2c
            .write_read(self.address, &[axis.register()], &mut data)?;
        Ok(decode_sample(data[0], data[1]))
    }

    /// Acceleration along one axis in units of standard gravity.
    pub fn acceleration_axis(&mut self, axis: Axis) -> Result<f32, E> {
        Ok(self.raw_axis(axis)? as f32 / COUNTS_PER_G)
    }

    pub fn acceleration_x(&mut self) -> Result<f32, E> {
        self.acceleration_axis(Axis::X)
    }

    pub fn acceleration_y(&mut self) -> Result<f32, E> {
        self.acceleration_axis(Axis::Y)
    }

    pub fn acceleration_z(&mut self) -> Result<f32, E> {
        self.acceleration_axis(Axis::Z)
    }

    /// All three axes in g, as three independent bus reads. The values are
    /// not taken from a single latched sample set, so under rapid motion
    /// they may reflect slightly different instants.
    pub fn acceleration(&mut self) -> Result<(f32, f32, f32), E> {
        let x = self.acceleration_x()?;
        let y = self.acceleration_y()?;
        let z = self.acceleration_z()?;
        Ok((x, y, z))
    }

    /// Program the double-tap detection engine (Freescale AN4072 values)
    /// and return the device to active mode.
    ///
    /// Not used by the control loop; the register values encode thresholds
    /// and timing windows characterized for the 400 Hz low-power rate and
    /// must stay exactly as written.
    pub fn enable_double_tap(&mut self) -> Result<(), E> {
        // 400 Hz, standby while reconfiguring
        self.write_register(reg::CTRL_REG1, 0x08)?;
        // double pulse on X, Y and Z, no pulse abort
        self.write_register(reg::PULSE_CFG, 0x2A)?;
        // thresholds: 3 g on X/Y, 5 g on Z at 0.063 g per count
        self.write_register(reg::PULSE_THSX, 0x30)?;
        self.write_register(reg::PULSE_THSY, 0x30)?;
        self.write_register(reg::PULSE_THSZ, 0x4F)?;
        // 60 ms pulse time limit at 1.25 ms per count
        self.write_register(reg::PULSE_TMLT, 0x30)?;
        // 200 ms latency at 2.5 ms per count
        self.write_register(reg::PULSE_LTCY, 0x50)?;
        // 300 ms second-pulse window at 2.5 ms per count
        self.write_register(reg::PULSE_WIND, 0x78)?;
        // pulse interrupt enabled and routed to INT1
        self.write_register(reg::CTRL_REG4, 0x08)?;
        self.write_register(reg::CTRL_REG5, 0x08)?;
        // back to active mode, keeping the rate bits
        let ctrl = self.read_register(reg::CTRL_REG1)?;
        self.write_register(reg::CTRL_REG1, ctrl | 0x01)
    }

    /// Give the bus handle back.
    pub fn release(self) -> I2C {
        self.i2c
    }

    fn read_register(&mut self, register: u8) -> Result<u8, E> {
        let mut data = [0u8; 1];
        self.i2c.write_read(self.address, &[register], &mut data)?;
        Ok(data[0])
    }

    fn write_register(&mut self, register: u8, value: u8) -> Result<(), E> {
        self.i2c.write(self.address, &[register, value])
    }
}
