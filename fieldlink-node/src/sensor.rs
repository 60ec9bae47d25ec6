/// One cycle's worth of physical readings.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Reading {
    /// Temperature in °C.
    pub temperature_c: f32,
    /// Relative humidity in %.
    pub humidity_percent: f32,
    /// Distance in centimeters.
    pub distance_cm: f32,
    /// Luminosity in lux.
    pub luminosity_lux: u16,
    /// Battery level (0-100 %).
    pub battery_percent: u8,
}

/// Source of validated physical readings.
///
/// Acquisition details (ADC sampling, ultrasonic timing, simulation) live
/// behind this trait; the transmitter only consumes finished values.
pub trait SensorSource {
    type Error;

    fn read(&mut self) -> Result<Reading, Self::Error>;
}
