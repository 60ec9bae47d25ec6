use rand::Rng;
use rand_distr::{Distribution, Normal};

use fieldlink_node::{Reading, SensorSource};

use crate::settings::SimSettings;

/// Daylight curve: a smooth sunrise/sunset ramp peaking at solar noon,
/// with a little moonlight at night.
pub fn simulated_lux(day_fraction: f32) -> f32 {
    const MAX_SUNLIGHT_LUX: f32 = 15_000.0;
    const MAX_MOONLIGHT_LUX: f32 = 5.0;
    const SUNRISE: f32 = 0.25;
    const SUNSET: f32 = 0.75;

    if day_fraction >= SUNRISE && day_fraction <= SUNSET {
        let arc = (day_fraction - SUNRISE) / (SUNSET - SUNRISE) * core::f32::consts::PI;
        arc.sin() * MAX_SUNLIGHT_LUX
    } else {
        let radians = day_fraction * 2.0 * core::f32::consts::PI;
        ((radians + core::f32::consts::PI).cos().max(0.0) * MAX_MOONLIGHT_LUX).max(0.01)
    }
}

/// Soil dries out through the day and recovers overnight.
pub fn simulated_humidity(day_fraction: f32, base: f32, variation: f32) -> f32 {
    let radians = day_fraction * 2.0 * core::f32::consts::PI;
    (base - radians.sin() * variation * 0.5).clamp(0.0, 100.0)
}

/// Diurnal temperature swing, coldest before dawn.
pub fn simulated_temperature(day_fraction: f32) -> f32 {
    let radians = (day_fraction - 0.25) * 2.0 * core::f32::consts::PI;
    radians.sin() * 10.0 + 18.0
}

/// Synthetic field sensor: diurnal curves plus gaussian noise, an
/// occasional passer-by in front of the ultrasonic sensor, and a battery
/// that slowly runs down.
pub struct FieldSensor {
    settings: SimSettings,
    cycle: u32,
    noise: Normal<f32>,
}

impl FieldSensor {
    pub fn new(settings: SimSettings) -> Self {
        Self {
            settings,
            cycle: 0,
            noise: Normal::new(0.0, 1.0).expect("valid distribution"),
        }
    }

    fn day_fraction(&self) -> f32 {
        (self.cycle % self.settings.day_cycles) as f32 / self.settings.day_cycles as f32
    }
}

impl SensorSource for FieldSensor {
    type Error = ();

    fn read(&mut self) -> Result<Reading, ()> {
        self.cycle += 1;
        let mut rng = rand::rng();
        let day_fraction = self.day_fraction();

        let humidity = simulated_humidity(
            day_fraction,
            self.settings.humidity_base,
            self.settings.humidity_variation,
        ) + self.noise.sample(&mut rng);

        // Mostly an empty field; sometimes something walks through.
        let distance = if rng.random::<f32>() < 0.1 {
            rng.random_range(5.0..80.0)
        } else {
            self.settings.distance_base
                + rng.random_range(-self.settings.distance_variation * 0.1
                    ..self.settings.distance_variation * 0.1)
        };

        // Roughly one percent of battery per simulated day
        let battery = 100u8.saturating_sub((self.cycle / self.settings.day_cycles.max(1)) as u8);

        Ok(Reading {
            temperature_c: simulated_temperature(day_fraction) + self.noise.sample(&mut rng) * 0.2,
            humidity_percent: humidity.clamp(0.0, 100.0),
            distance_cm: distance.clamp(2.0, 400.0),
            luminosity_lux: simulated_lux(day_fraction).min(u16::MAX as f32) as u16,
            battery_percent: battery,
        })
    }
}
