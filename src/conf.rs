use crate::register;

pub(crate) trait RegisterBits: Sized {
    fn mask() -> u8;
    fn value(&self) -> u8;
    fn from_bits(bits: u8) -> Option<Self>;
}

/// Number of samples averaged per measurement output
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
#[allow(non_camel_case_types)]
pub enum SampleAveraging {
    /// 1 sample
    _1_Sample = 0b0000_0000,
    /// 2 samples
    _2_Samples = 0b0010_0000,
    /// 4 samples
    _4_Samples = 0b0100_0000,
    /// 8 samples
    _8_Samples = 0b0110_0000,
}

impl Default for SampleAveraging {
    fn default() -> Self {
        SampleAveraging::_8_Samples
    }
}

impl RegisterBits for SampleAveraging {
    fn mask() -> u8 {
        SampleAveraging::_8_Samples.value()
    }

    fn value(&self) -> u8 {
        *self as u8
    }

    fn from_bits(bits: u8) -> Option<Self> {
        match bits & Self::mask() {
            0b0000_0000 => Some(SampleAveraging::_1_Sample),
            0b0010_0000 => Some(SampleAveraging::_2_Samples),
            0b0100_0000 => Some(SampleAveraging::_4_Samples),
            _ => Some(SampleAveraging::_8_Samples),
        }
    }
}

/// Output data rate in continuous mode
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
#[allow(non_camel_case_types)]
pub enum DataRate {
    /// 0.75 Hz
    _0_75_Hz = 0b0000_0000,
    /// 1.5 Hz
    _1_5_Hz = 0b0000_0100,
    /// 3 Hz
    _3_Hz = 0b0000_1000,
    /// 7.5 Hz
    _7_5_Hz = 0b0000_1100,
    /// 15 Hz
    _15_Hz = 0b0001_0000,
    /// 30 Hz
    _30_Hz = 0b0001_0100,
    /// 75 Hz
    _75_Hz = 0b0001_1000,
}

impl Default for DataRate {
    fn default() -> Self {
        DataRate::_0_75_Hz
    }
}

impl RegisterBits for DataRate {
    fn mask() -> u8 {
        0b0001_1100
    }

    fn value(&self) -> u8 {
        *self as u8
    }

    fn from_bits(bits: u8) -> Option<Self> {
        match bits & Self::mask() {
            0b0000_0000 => Some(DataRate::_0_75_Hz),
            0b0000_0100 => Some(DataRate::_1_5_Hz),
            0b0000_1000 => Some(DataRate::_3_Hz),
            0b0000_1100 => Some(DataRate::_7_5_Hz),
            0b0001_0000 => Some(DataRate::_15_Hz),
            0b0001_0100 => Some(DataRate::_30_Hz),
            0b0001_1000 => Some(DataRate::_75_Hz),
            // reserved
            _ => None,
        }
    }
}

/// Measurement bias applied to all three axes
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum MeasurementBias {
    /// Normal measurement configuration
    Normal = 0b0000_0000,
    /// Positive bias on X, Y and Z
    PositiveBias = 0b0000_0001,
    /// Negative bias on X, Y and Z
    NegativeBias = 0b0000_0010,
}

impl Default for MeasurementBias {
    fn default() -> Self {
        MeasurementBias::Normal
    }
}

impl RegisterBits for MeasurementBias {
    fn mask() -> u8 {
        0b0000_0011
    }

    fn value(&self) -> u8 {
        *self as u8
    }

    fn from_bits(bits: u8) -> Option<Self> {
        match bits & Self::mask() {
            0b00 => Some(MeasurementBias::Normal),
            0b01 => Some(MeasurementBias::PositiveBias),
            0b10 => Some(MeasurementBias::NegativeBias),
            // reserved
            _ => None,
        }
    }
}

/// Gain, occupies the whole of `CONTROL_2`
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
#[allow(non_camel_case_types)]
pub enum Gain {
    /// +/- 0.88
    _0_88_Ga = 0b0000_0000,
    /// +/- 1.3
    _1_3_Ga = 0b0010_0000,
    /// +/- 1.9
    _1_9_Ga = 0b0100_0000,
    /// +/- 2.5
    _2_5_Ga = 0b0110_0000,
    /// +/- 4.0
    _4_0_Ga = 0b1000_0000,
    /// +/- 4.7
    _4_7_Ga = 0b1010_0000,
    /// +/- 5.6
    _5_6_Ga = 0b1100_0000,
    /// +/- 8.1
    _8_1_Ga = 0b1110_0000,
}

impl Default for Gain {
    fn default() -> Self {
        Gain::_0_88_Ga
    }
}

impl RegisterBits for Gain {
    fn mask() -> u8 {
        Gain::_8_1_Ga.value()
    }

    fn value(&self) -> u8 {
        *self as u8
    }

    fn from_bits(bits: u8) -> Option<Self> {
        Some(match bits & Self::mask() {
            0b0000_0000 => Gain::_0_88_Ga,
            0b0010_0000 => Gain::_1_3_Ga,
            0b0100_0000 => Gain::_1_9_Ga,
            0b0110_0000 => Gain::_2_5_Ga,
            0b1000_0000 => Gain::_4_0_Ga,
            0b1010_0000 => Gain::_4_7_Ga,
            0b1100_0000 => Gain::_5_6_Ga,
            _ => Gain::_8_1_Ga,
        })
    }
}

/// Magnetometer operating mode
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum MagMode {
    /// Continuous measurement
    Continuous = 0x00,
    /// Single measurement, then back to idle
    Single = 0x01,
    /// Idle
    Off = 0x02,
}

impl Default for MagMode {
    fn default() -> Self {
        MagMode::Continuous
    }
}

impl RegisterBits for MagMode {
    fn mask() -> u8 {
        0b0000_0011
    }

    fn value(&self) -> u8 {
        *self as u8
    }

    fn from_bits(bits: u8) -> Option<Self> {
        Some(MagMode::decode(bits))
    }
}

impl MagMode {
    // every pattern is valid, 0b11 is idle as well
    pub(crate) fn decode(bits: u8) -> Self {
        match bits & Self::mask() {
            0x00 => MagMode::Continuous,
            0x01 => MagMode::Single,
            _ => MagMode::Off,
        }
    }
}

/// Measurement configuration held in `CONTROL_1` and `CONTROL_2`
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct MeasurementConfig {
    /// Samples averaged per output
    pub samples: SampleAveraging,
    /// Continuous mode output rate
    pub data_rate: DataRate,
    /// Measurement bias
    pub bias: MeasurementBias,
    /// Gain
    pub gain: Gain,
}

impl MeasurementConfig {
    /// Value written to `CONTROL_1`
    pub fn control_1(&self) -> u8 {
        self.samples.value() | self.data_rate.value() | self.bias.value()
    }

    /// Value written to `CONTROL_2`
    pub fn control_2(&self) -> u8 {
        self.gain.value()
    }

    /// Decodes the contents of `CONTROL_1` and `CONTROL_2`.
    ///
    /// Returns `None` if either register holds a reserved bit pattern.
    pub fn from_registers(control_1: u8, control_2: u8) -> Option<Self> {
        Some(MeasurementConfig { samples: SampleAveraging::from_bits(control_1)?,
                                 data_rate: DataRate::from_bits(control_1)?,
                                 bias: MeasurementBias::from_bits(control_1)?,
                                 gain: Gain::from_bits(control_2)? })
    }
}

/// Partial reconfiguration request.
///
/// Fields left unset keep their current value when the update is applied.
#[derive(Copy, Clone, Debug, Default)]
pub struct ConfigUpdate {
    pub(crate) samples: Option<SampleAveraging>,
    pub(crate) data_rate: Option<DataRate>,
    pub(crate) bias: Option<MeasurementBias>,
    pub(crate) gain: Option<Gain>,
}

impl ConfigUpdate {
    /// Creates an update that changes nothing
    pub fn new() -> Self {
        ConfigUpdate { samples: None,
                       data_rate: None,
                       bias: None,
                       gain: None }
    }

    /// Sets samples averaged per measurement ([`SampleAveraging`])
    ///
    /// [`SampleAveraging`]: ./enum.SampleAveraging.html
    pub fn samples(&mut self, samples: SampleAveraging) -> &mut Self {
        self.samples = Some(samples);
        self
    }

    /// Sets output data rate ([`DataRate`])
    ///
    /// [`DataRate`]: ./enum.DataRate.html
    pub fn data_rate(&mut self, data_rate: DataRate) -> &mut Self {
        self.data_rate = Some(data_rate);
        self
    }

    /// Sets measurement bias ([`MeasurementBias`])
    ///
    /// [`MeasurementBias`]: ./enum.MeasurementBias.html
    pub fn bias(&mut self, bias: MeasurementBias) -> &mut Self {
        self.bias = Some(bias);
        self
    }

    /// Sets gain ([`Gain`])
    ///
    /// [`Gain`]: ./enum.Gain.html
    pub fn gain(&mut self, gain: Gain) -> &mut Self {
        self.gain = Some(gain);
        self
    }

    /// Fills every unset field from `base`
    pub fn merge(&self, base: MeasurementConfig) -> MeasurementConfig {
        MeasurementConfig { samples: self.samples.unwrap_or(base.samples),
                            data_rate: self.data_rate.unwrap_or(base.data_rate),
                            bias: self.bias.unwrap_or(base.bias),
                            gain: self.gain.unwrap_or(base.gain) }
    }
}

/// What to do when the chip signature is not the expected one
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum IdentityPolicy {
    /// Log a warning and keep going
    Report,
    /// Fail construction with [`Error::Identity`]
    ///
    /// [`Error::Identity`]: ./enum.Error.html#variant.Identity
    Enforce,
}

impl Default for IdentityPolicy {
    fn default() -> Self {
        IdentityPolicy::Report
    }
}

/// Configuration of Hmc5883l
#[derive(Copy, Clone, Debug)]
pub struct Hmc5883lConfig {
    pub(crate) address: u8,
    pub(crate) startup: MeasurementConfig,
    pub(crate) identity_policy: IdentityPolicy,
}

impl Default for Hmc5883lConfig {
    fn default() -> Self {
        Hmc5883lConfig::new()
    }
}

impl Hmc5883lConfig {
    /// Creates Hmc5883l configuration with the default address (`0x1E`),
    /// default [`MeasurementConfig`] and [`IdentityPolicy::Report`].
    ///
    /// [`MeasurementConfig`]: ./struct.MeasurementConfig.html
    /// [`IdentityPolicy::Report`]: ./enum.IdentityPolicy.html
    pub fn new() -> Self {
        Hmc5883lConfig { address: register::ADDRESS,
                         startup: MeasurementConfig::default(),
                         identity_policy: IdentityPolicy::default() }
    }

    /// Sets the 7-bit bus address
    pub fn address(&mut self, address: u8) -> &mut Self {
        self.address = address;
        self
    }

    /// Sets samples averaged per measurement ([`SampleAveraging`])
    ///
    /// [`SampleAveraging`]: ./enum.SampleAveraging.html
    pub fn samples(&mut self, samples: SampleAveraging) -> &mut Self {
        self.startup.samples = samples;
        self
    }

    /// Sets output data rate ([`DataRate`])
    ///
    /// [`DataRate`]: ./enum.DataRate.html
    pub fn data_rate(&mut self, data_rate: DataRate) -> &mut Self {
        self.startup.data_rate = data_rate;
        self
    }

    /// Sets measurement bias ([`MeasurementBias`])
    ///
    /// [`MeasurementBias`]: ./enum.MeasurementBias.html
    pub fn bias(&mut self, bias: MeasurementBias) -> &mut Self {
        self.startup.bias = bias;
        self
    }

    /// Sets gain ([`Gain`])
    ///
    /// [`Gain`]: ./enum.Gain.html
    pub fn gain(&mut self, gain: Gain) -> &mut Self {
        self.startup.gain = gain;
        self
    }

    /// Sets the identity check policy ([`IdentityPolicy`])
    ///
    /// [`IdentityPolicy`]: ./enum.IdentityPolicy.html
    pub fn identity_policy(&mut self, policy: IdentityPolicy) -> &mut Self {
        self.identity_policy = policy;
        self
    }
}
