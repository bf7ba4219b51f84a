//! A platform agnostic driver to interface with the HMC5883L (3-axis digital
//! compass)
//!
//! This driver was built using [`embedded-hal`] traits.
//!
//! The driver only deals in raw signed counts; scaling to physical units is
//! left to the caller.
//!
//! [`embedded-hal`]: https://docs.rs/embedded-hal

#![deny(missing_docs)]
#![no_std]

extern crate cast;
extern crate embedded_hal as hal;
extern crate generic_array;
#[macro_use]
extern crate log;
extern crate nalgebra;

mod conf;
mod register;

use core::mem::ManuallyDrop;
use core::ptr;

use cast::u16;
use generic_array::typenum::consts::*;
use generic_array::{ArrayLength, GenericArray};

pub use nalgebra::Vector3;

use hal::blocking::i2c::{Write, WriteRead};

use conf::RegisterBits;
pub use conf::{ConfigUpdate, DataRate, Gain, Hmc5883lConfig, IdentityPolicy,
               MagMode, MeasurementBias, MeasurementConfig, SampleAveraging};
use register::Register;
pub use register::ADDRESS as DEFAULT_ADDRESS;

/// Outcome of the chip identity check
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Identity {
    /// `ID_1..ID_3` read "H43"
    Hmc5883l,
    /// QMC5883L clone (`ID_4` reads `0xFF`); its register map differs and
    /// it is not supported by this driver
    Qmc5883l,
    /// Anything else; holds the bytes read from `ID_1..ID_3`
    Unrecognized([u8; 3]),
}

impl Identity {
    /// Classifies the chip from `ID_1..ID_3` and, when those do not match,
    /// the contents of `ID_4`
    pub fn classify(signature: [u8; 3], id_4: Option<u8>) -> Self {
        if signature == register::SIGNATURE {
            Identity::Hmc5883l
        } else if id_4 == Some(register::ALT_VARIANT_ID) {
            Identity::Qmc5883l
        } else {
            Identity::Unrecognized(signature)
        }
    }

    /// `true` for a genuine HMC5883L
    pub fn is_supported(&self) -> bool {
        *self == Identity::Hmc5883l
    }
}

/// Driver error
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Error<E> {
    /// I2C bus error
    I2c(E),
    /// The chip did not identify as an HMC5883L and
    /// [`IdentityPolicy::Enforce`] was selected
    ///
    /// [`IdentityPolicy::Enforce`]: ./enum.IdentityPolicy.html
    Identity(Identity),
}

impl<E> From<E> for Error<E> {
    fn from(e: E) -> Self {
        Error::I2c(e)
    }
}

/// Decodes one big-endian two's complement axis reading
pub fn decode_axis(msb: u8, lsb: u8) -> i16 {
    ((u16(msb) << 8) | u16(lsb)) as i16
}

/// Decodes the six output registers into X, Y and Z
pub fn decode_sample(buffer: &[u8; 6]) -> Vector3<i16> {
    Vector3::new(decode_axis(buffer[0], buffer[1]),
                 decode_axis(buffer[2], buffer[3]),
                 decode_axis(buffer[4], buffer[5]))
}

// the chip increments the register pointer after each byte read
fn read_registers<I2C, E, N>(i2c: &mut I2C,
                             address: u8,
                             reg: Register)
                             -> Result<GenericArray<u8, N>, E>
    where I2C: WriteRead<Error = E>,
          N: ArrayLength<u8>
{
    let mut buffer: GenericArray<u8, N> = GenericArray::default();

    {
        let buffer: &mut [u8] = &mut buffer;

        i2c.write_read(address, &[reg.addr()], buffer)?;
    }

    Ok(buffer)
}

// ID_4 is only read when ID_1..ID_3 do not match
fn read_identity<I2C, E>(i2c: &mut I2C, address: u8) -> Result<Identity, E>
    where I2C: WriteRead<Error = E>
{
    let signature = read_registers::<_, _, U3>(i2c, address, Register::ID_1)?;
    let signature = [signature[0], signature[1], signature[2]];
    if signature == register::SIGNATURE {
        return Ok(Identity::Hmc5883l);
    }
    let id_4 = read_registers::<_, _, U1>(i2c, address, Register::ID_4)?;
    Ok(Identity::classify(signature, Some(id_4[0])))
}

/// HMC5883L driver
///
/// The sensor is put into [`MagMode::Off`] when the driver is dropped.
///
/// [`MagMode::Off`]: ./enum.MagMode.html
pub struct Hmc5883l<I2C>
    where I2C: Write
{
    i2c: I2C,
    address: u8,
    identity: Identity,
    startup: MeasurementConfig,
    current: MeasurementConfig,
}

impl<I2C, E> Hmc5883l<I2C> where I2C: WriteRead<Error = E> + Write<Error = E>
{
    /// Creates a new driver from a I2C peripheral.
    ///
    /// Checks the chip identity, applies the startup configuration from
    /// `config` and starts continuous measurement.
    pub fn new(mut i2c: I2C, config: &Hmc5883lConfig) -> Result<Self, Error<E>> {
        // nothing is written to the bus until the identity check passes
        let identity = read_identity(&mut i2c, config.address)?;
        match identity {
            Identity::Hmc5883l => info!("chip identifies as HMC5883L"),
            Identity::Qmc5883l => {
                warn!("ID_4 reads 0xFF instead of H43 signature, chip is a \
                       QMC5883L variant which is not supported")
            }
            Identity::Unrecognized(id) => {
                warn!("unexpected ID {:?} in HMC5883L identity registers", id)
            }
        }
        if !identity.is_supported()
           && config.identity_policy == IdentityPolicy::Enforce
        {
            return Err(Error::Identity(identity));
        }

        let mut hmc5883l = Hmc5883l { i2c,
                                      address: config.address,
                                      identity,
                                      startup: config.startup,
                                      current: config.startup };

        let startup = hmc5883l.startup;
        hmc5883l.write_configuration(startup)?;
        debug!("startup configuration done");

        hmc5883l.set_continuous_mode()?;
        debug!("cont mode done");

        Ok(hmc5883l)
    }

    /// Reads the identity registers and classifies the chip
    pub fn verify_identity(&mut self) -> Result<Identity, Error<E>> {
        Ok(read_identity(&mut self.i2c, self.address)?)
    }

    /// Identity recorded when the driver was created
    pub fn identity(&self) -> Identity {
        self.identity
    }

    /// Magnetometer measurements, raw signed counts
    pub fn mag(&mut self) -> Result<Vector3<i16>, Error<E>> {
        let buffer = self.raw_data()?;
        Ok(decode_sample(&buffer))
    }

    /// Undecoded contents of the six output registers
    pub fn raw_data(&mut self) -> Result<[u8; 6], Error<E>> {
        let buffer: GenericArray<u8, U6> =
            self.read_registers(Register::X_MSB)?;
        let mut raw = [0; 6];
        raw.copy_from_slice(&buffer);
        Ok(raw)
    }

    /// Applies a partial configuration; unset fields keep their current
    /// value
    pub fn reconfigure(&mut self, update: &ConfigUpdate) -> Result<(), Error<E>> {
        let merged = update.merge(self.current);
        self.write_configuration(merged)
    }

    /// Re-applies the configuration the driver was created with
    pub fn restore_startup_configuration(&mut self) -> Result<(), Error<E>> {
        let startup = self.startup;
        self.write_configuration(startup)
    }

    /// Last configuration applied
    pub fn configuration(&self) -> MeasurementConfig {
        self.current
    }

    /// Configuration the driver was created with
    pub fn startup_configuration(&self) -> MeasurementConfig {
        self.startup
    }

    /// Reads `CONTROL_1` and `CONTROL_2` back from the chip.
    ///
    /// `None` if the chip holds a reserved bit pattern.
    pub fn read_configuration(&mut self)
                              -> Result<Option<MeasurementConfig>, Error<E>> {
        let buffer = self.read_registers::<U2>(Register::CONTROL_1)?;
        Ok(MeasurementConfig::from_registers(buffer[0], buffer[1]))
    }

    /// Sets the operating mode
    pub fn set_mode(&mut self, mode: MagMode) -> Result<(), Error<E>> {
        debug!("MODE <- {:?}", mode);
        self.write_register(Register::MODE, mode.value())
    }

    /// Reads the operating mode back from the chip
    pub fn mode(&mut self) -> Result<MagMode, Error<E>> {
        let bits = self.read_register(Register::MODE)?;
        Ok(MagMode::decode(bits))
    }

    /// Continuous measurement
    pub fn set_continuous_mode(&mut self) -> Result<(), Error<E>> {
        self.set_mode(MagMode::Continuous)
    }

    /// Single measurement; waiting for it to complete is up to the caller
    pub fn set_single_mode(&mut self) -> Result<(), Error<E>> {
        self.set_mode(MagMode::Single)
    }

    /// Idle
    pub fn set_off_mode(&mut self) -> Result<(), Error<E>> {
        self.set_mode(MagMode::Off)
    }

    /// Powers the sensor off and gives back the I2C peripheral
    pub fn release(self) -> Result<I2C, Error<E>> {
        let mut hmc5883l = ManuallyDrop::new(self);
        let off = hmc5883l.set_off_mode();
        // SAFETY: `hmc5883l` is never dropped, the bus is moved out once
        let i2c = unsafe { ptr::read(&hmc5883l.i2c) };
        off.map(|_| i2c)
    }

    // no rollback of CONTROL_1 if the CONTROL_2 write fails
    fn write_configuration(&mut self,
                           config: MeasurementConfig)
                           -> Result<(), Error<E>> {
        self.current = config;
        debug!("configuration <- {:?}", config);
        self.write_register(Register::CONTROL_1, config.control_1())?;
        self.write_register(Register::CONTROL_2, config.control_2())
    }

    fn read_register(&mut self, reg: Register) -> Result<u8, Error<E>> {
        let buffer: GenericArray<u8, U1> = self.read_registers(reg)?;
        Ok(buffer[0])
    }

    fn read_registers<N>(&mut self,
                         reg: Register)
                         -> Result<GenericArray<u8, N>, Error<E>>
        where N: ArrayLength<u8>
    {
        Ok(read_registers(&mut self.i2c, self.address, reg)?)
    }

    fn write_register(&mut self, reg: Register, byte: u8) -> Result<(), Error<E>> {
        self.i2c.write(self.address, &[reg.addr(), byte])?;
        Ok(())
    }
}

impl<I2C> Drop for Hmc5883l<I2C> where I2C: Write
{
    fn drop(&mut self) {
        debug!("MODE <- {:?}", MagMode::Off);
        if self.i2c
               .write(self.address,
                      &[Register::MODE.addr(), MagMode::Off.value()])
               .is_err()
        {
            warn!("failed to power off HMC5883L");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decode_matches_twos_complement_for_every_byte_pair() {
        for msb in 0..=255u8 {
            for lsb in 0..=255u8 {
                let raw = i32::from(msb) * 256 + i32::from(lsb);
                let expected = if raw > 32767 { raw - 65536 } else { raw };
                assert_eq!(i32::from(decode_axis(msb, lsb)), expected);
            }
        }
    }

    #[test]
    fn decode_boundaries() {
        assert_eq!(decode_axis(0x7F, 0xFF), 32767);
        assert_eq!(decode_axis(0x80, 0x00), -32768);
        assert_eq!(decode_axis(0xFF, 0xFF), -1);
        assert_eq!(decode_axis(0x00, 0x00), 0);
    }

    #[test]
    fn decode_sample_axes_independently() {
        let v = decode_sample(&[0x0F, 0x00, 0xF0, 0x00, 0x00, 0x01]);
        assert_eq!(v, Vector3::new(3840, -4096, 1));
    }

    #[test]
    fn classify_identity() {
        assert_eq!(Identity::classify(*b"H43", None), Identity::Hmc5883l);
        assert_eq!(Identity::classify(*b"H43", Some(0xFF)), Identity::Hmc5883l);
        assert_eq!(Identity::classify([0, 0, 0], Some(0xFF)),
                   Identity::Qmc5883l);
        assert_eq!(Identity::classify(*b"H44", Some(0x00)),
                   Identity::Unrecognized(*b"H44"));
        assert_eq!(Identity::classify(*b"xyz", None),
                   Identity::Unrecognized(*b"xyz"));
    }
}
