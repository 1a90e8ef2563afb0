use crate::constants::{PhysicalConstants, C, DEFAULT_MASS, G};
use crate::error::ConfigError;
use clap::Parser;
use glam::DVec3;
use std::path::PathBuf;

/// Free fall toward a Schwarzschild black hole, in the terminal
#[derive(Parser, Debug, Clone)]
#[command(version, about)]
pub struct Config {
    /// Black hole mass in kilograms
    #[arg(long, default_value_t = DEFAULT_MASS)]
    pub mass: f64,

    /// Gravitational constant
    #[arg(long, default_value_t = G)]
    pub gravitational_constant: f64,

    /// Speed of light
    #[arg(long, default_value_t = C)]
    pub speed_of_light: f64,

    /// Black hole position as X,Y,Z
    #[arg(long, value_parser = parse_vec3, default_value = "0,0,0", allow_hyphen_values = true)]
    pub black_hole: DVec3,

    /// Observer start position as X,Y,Z
    #[arg(long, value_parser = parse_vec3, default_value = "0,0,-5000", allow_hyphen_values = true)]
    pub start: DVec3,

    /// Start with gravity switched on
    #[arg(long)]
    pub gravity: bool,

    /// Multiplier applied to simulated time
    #[arg(long, default_value_t = 1.0)]
    pub time_scale: f64,

    /// Fixed integration ticks per simulated second
    #[arg(long, default_value_t = 45.0)]
    pub tick_rate: f64,

    /// Frame rate cap for rendering
    #[arg(long, default_value_t = 45)]
    pub fps: u32,

    /// Write logs to this file (filter with RUST_LOG)
    #[arg(long)]
    pub log_file: Option<PathBuf>,

    /// Run this many ticks without a terminal UI and print the readout
    #[arg(long, value_name = "TICKS")]
    pub headless: Option<u64>,
}

impl Config {
    pub fn constants(&self) -> PhysicalConstants {
        PhysicalConstants::new(self.gravitational_constant, self.speed_of_light, self.mass)
    }

    /// Simulated seconds per tick
    pub fn tick_duration(&self) -> f64 {
        1.0 / self.tick_rate
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        positive("--mass", self.mass)?;
        positive("--gravitational-constant", self.gravitational_constant)?;
        positive("--speed-of-light", self.speed_of_light)?;
        positive("--tick-rate", self.tick_rate)?;
        positive("--fps", self.fps as f64)?;

        if !self.time_scale.is_finite() || self.time_scale < 0.0 {
            return Err(ConfigError::Negative {
                option: "--time-scale",
                value: self.time_scale,
            });
        }

        finite_vector("--black-hole", self.black_hole)?;
        finite_vector("--start", self.start)?;
        Ok(())
    }
}

fn positive(option: &'static str, value: f64) -> Result<(), ConfigError> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(ConfigError::NotPositive { option, value })
    }
}

fn finite_vector(option: &'static str, value: DVec3) -> Result<(), ConfigError> {
    if value.is_finite() {
        Ok(())
    } else {
        Err(ConfigError::NonFiniteVector { option })
    }
}

/// Parses `X,Y,Z` into a vector
pub fn parse_vec3(s: &str) -> Result<DVec3, String> {
    let parts: Vec<&str> = s.split(',').map(str::trim).collect();
    let [x, y, z] = parts.as_slice() else {
        return Err(format!("expected X,Y,Z, got '{s}'"));
    };
    let parse = |v: &str| v.parse::<f64>().map_err(|e| format!("'{v}': {e}"));
    Ok(DVec3::new(parse(*x)?, parse(*y)?, parse(*z)?))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        let config = Config::parse_from(["horizon-fall"]);
        assert_eq!(config.validate(), Ok(()));
        assert_eq!(config.constants(), PhysicalConstants::default());
        assert_eq!(config.start, DVec3::new(0.0, 0.0, -5000.0));
        assert!(!config.gravity);
    }

    #[test]
    fn negative_vector_components_parse() {
        let config = Config::parse_from(["horizon-fall", "--start", "-10,2.5,3e3"]);
        assert_eq!(config.start, DVec3::new(-10.0, 2.5, 3000.0));
    }

    #[test]
    fn rejects_non_positive_mass() {
        let config = Config::parse_from(["horizon-fall", "--mass", "0"]);
        assert_eq!(
            config.validate(),
            Err(ConfigError::NotPositive {
                option: "--mass",
                value: 0.0
            })
        );
    }

    #[test]
    fn rejects_negative_time_scale() {
        let config = Config::parse_from(["horizon-fall", "--time-scale=-1"]);
        assert!(matches!(
            config.validate(),
            Err(ConfigError::Negative { option: "--time-scale", .. })
        ));
    }

    #[test]
    fn malformed_vector_is_an_error() {
        assert!(parse_vec3("1,2").is_err());
        assert!(parse_vec3("1,two,3").is_err());
    }
}
