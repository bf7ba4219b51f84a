/// Default 7-bit bus address
pub const ADDRESS: u8 = 0x1E;

/// Contents of `ID_1..ID_3` on a genuine HMC5883L
pub const SIGNATURE: [u8; 3] = *b"H43";

/// `ID_4` reads back as this on QMC5883L clones
pub const ALT_VARIANT_ID: u8 = 0xFF;

#[allow(dead_code)]
#[allow(non_camel_case_types)]
#[derive(Copy, Clone, Debug)]
pub enum Register {
    CONTROL_1 = 0x00,
    CONTROL_2 = 0x01,
    MODE = 0x02,
    X_MSB = 0x03,
    X_LSB = 0x04,
    Y_MSB = 0x05,
    Y_LSB = 0x06,
    Z_MSB = 0x07,
    Z_LSB = 0x08,
    ID_1 = 0x0A,
    ID_2 = 0x0B,
    ID_3 = 0x0C,
    ID_4 = 0x0D,
}

impl Register {
    pub fn addr(&self) -> u8 {
        *self as u8
    }
}
