use glam::DVec3;

/// Gravitational constant (m^3 kg^-1 s^-2)
pub const G: f64 = 6.674_30e-11;
/// Speed of light (m/s)
pub const C: f64 = 299_792_458.0;
/// Default black hole mass (kg)
pub const DEFAULT_MASS: f64 = 1e30;

/// Distances below this are clamped before the inverse-square law is applied
pub const MIN_DISTANCE: f64 = 0.1;

/// Photon sphere radius as a multiple of the Schwarzschild radius
pub const PHOTON_SPHERE_FACTOR: f64 = 1.5;

/// Physical constants of a run. Fixed once the integrator is built.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PhysicalConstants {
    /// Gravitational constant
    pub g: f64,
    /// Speed of light
    pub c: f64,
    /// Mass of the black hole
    pub mass: f64,
}

impl Default for PhysicalConstants {
    fn default() -> Self {
        PhysicalConstants {
            g: G,
            c: C,
            mass: DEFAULT_MASS,
        }
    }
}

impl PhysicalConstants {
    pub fn new(g: f64, c: f64, mass: f64) -> Self {
        PhysicalConstants { g, c, mass }
    }

    /// Standard gravitational parameter, G * M
    pub fn gm(&self) -> f64 {
        self.g * self.mass
    }

    /// Schwarzschild radius, 2GM / c^2
    pub fn schwarzschild_radius(&self) -> f64 {
        2.0 * self.gm() / (self.c * self.c)
    }
}

/// A fixed point mass in world space
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MassSource {
    pub position: DVec3,
    pub constants: PhysicalConstants,
}

impl MassSource {
    pub fn new(position: DVec3, constants: PhysicalConstants) -> Self {
        MassSource {
            position,
            constants,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn schwarzschild_radius_of_default_mass() {
        let constants = PhysicalConstants::default();
        let expected = 2.0 * G * DEFAULT_MASS / (C * C);
        assert_relative_eq!(constants.schwarzschild_radius(), expected);
        assert_relative_eq!(constants.schwarzschild_radius(), 1485.23, epsilon = 0.01);
    }

    #[test]
    fn schwarzschild_radius_in_geometric_units() {
        // G = c = 1 gives r_s = 2M
        let constants = PhysicalConstants::new(1.0, 1.0, 0.5);
        assert_relative_eq!(constants.schwarzschild_radius(), 1.0);
    }
}
