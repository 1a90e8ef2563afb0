//! Per-tick gravity integration toward a single point mass.
//!
//! Gravity follows the Newtonian inverse-square law with the Schwarzschild radius
//! acting as a hard horizon. Velocity is advanced with explicit Euler, and every
//! step's swept path is tested against the horizon sphere so a large step can
//! never carry the observer across it unnoticed.

use crate::collision::{segment_sphere_intersection, Sphere};
use crate::constants::{MassSource, PhysicalConstants, MIN_DISTANCE};
use glam::DVec3;
use tracing::{debug, info};

/// Everything one integration step produced
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StepReport {
    /// Accumulated velocity after the step
    pub velocity: DVec3,
    /// Movement to add to the observer position
    pub displacement: DVec3,
    /// Observer is at or inside the Schwarzschild radius
    pub in_event_horizon: bool,
    /// Distance to the mass centre, clamped to `MIN_DISTANCE`
    pub distance: f64,
    pub schwarzschild_radius: f64,
    /// distance / schwarzschild_radius
    pub distance_ratio: f64,
    /// Gravitational acceleration vector, pointing at the mass
    pub acceleration: DVec3,
    pub acceleration_magnitude: f64,
    /// The swept path touched the horizon and the movement was clamped to it
    pub captured: bool,
}

/// Integrates an observer's fall toward a fixed mass.
///
/// Owns the accumulated velocity; the observer position stays with the caller,
/// which applies `StepReport::displacement` after each step.
#[derive(Debug, Clone)]
pub struct GravityIntegrator {
    source: MassSource,
    schwarzschild_radius: f64,
    velocity: DVec3,
    in_event_horizon: bool,
}

impl GravityIntegrator {
    /// Builds an integrator and derives the Schwarzschild radius once.
    pub fn new(constants: PhysicalConstants, mass_position: DVec3) -> Self {
        let schwarzschild_radius = constants.schwarzschild_radius();
        info!(
            mass = constants.mass,
            schwarzschild_radius, "gravity integrator initialised"
        );
        GravityIntegrator {
            source: MassSource::new(mass_position, constants),
            schwarzschild_radius,
            velocity: DVec3::ZERO,
            in_event_horizon: false,
        }
    }

    pub fn constants(&self) -> &PhysicalConstants {
        &self.source.constants
    }

    pub fn schwarzschild_radius(&self) -> f64 {
        self.schwarzschild_radius
    }

    pub fn velocity(&self) -> DVec3 {
        self.velocity
    }

    /// The horizon as a sphere around the mass
    pub fn horizon(&self) -> Sphere {
        Sphere::new(self.source.position, self.schwarzschild_radius)
    }

    /// Advances the fall by `dt` seconds for an observer at `observer`.
    pub fn step(&mut self, observer: DVec3, dt: f64, gravity_enabled: bool) -> StepReport {
        let direction = self.source.position - observer;
        let distance = direction.length().max(MIN_DISTANCE);
        let distance_ratio = distance / self.schwarzschild_radius;

        let acceleration =
            direction.normalize_or_zero() * (self.source.constants.gm() / (distance * distance));
        let acceleration_magnitude = acceleration.length();

        let mut displacement = DVec3::ZERO;
        let mut captured = false;

        if distance <= self.schwarzschild_radius {
            if !self.in_event_horizon {
                info!(distance, "observer is inside the event horizon");
            }
            self.velocity = DVec3::ZERO;
            self.in_event_horizon = true;
        } else {
            if self.in_event_horizon {
                info!(distance, "observer moved back outside the event horizon");
            }
            self.in_event_horizon = false;

            if gravity_enabled {
                self.velocity += acceleration * dt;
                displacement = self.velocity * dt;

                // A single step may jump over the whole horizon
                let next = observer + displacement;
                if let Some(hit) = segment_sphere_intersection(observer, next, &self.horizon()) {
                    debug!(?hit, "swept path crossed the horizon, clamping");
                    displacement = hit - observer;
                    self.velocity = DVec3::ZERO;
                    captured = true;
                }
            }
        }

        StepReport {
            velocity: self.velocity,
            displacement,
            in_event_horizon: self.in_event_horizon,
            distance,
            schwarzschild_radius: self.schwarzschild_radius,
            distance_ratio,
            acceleration,
            acceleration_magnitude,
            captured,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constants::{C, DEFAULT_MASS, G};
    use approx::assert_relative_eq;

    /// G = c = 1, M = 0.5 puts the horizon at radius 1 around the origin.
    fn unit_horizon() -> GravityIntegrator {
        GravityIntegrator::new(PhysicalConstants::new(1.0, 1.0, 0.5), DVec3::ZERO)
    }

    #[test]
    fn outside_horizon_is_not_flagged() {
        let mut integrator = unit_horizon();
        let report = integrator.step(DVec3::new(10.0, 0.0, 0.0), 0.01, true);
        assert!(!report.in_event_horizon);
        assert!(!report.captured);
        assert_relative_eq!(report.distance, 10.0);
        assert_relative_eq!(report.distance_ratio, 10.0);
    }

    #[test]
    fn inside_horizon_freezes_velocity() {
        let mut integrator = unit_horizon();
        // Build up some velocity first
        integrator.step(DVec3::new(5.0, 0.0, 0.0), 1.0, true);
        assert!(integrator.velocity().length() > 0.0);

        let report = integrator.step(DVec3::new(0.5, 0.0, 0.0), 1.0, true);
        assert!(report.in_event_horizon);
        assert_eq!(report.velocity, DVec3::ZERO);
        assert_eq!(report.displacement, DVec3::ZERO);
    }

    #[test]
    fn exactly_on_horizon_counts_as_inside() {
        let mut integrator = unit_horizon();
        let report = integrator.step(DVec3::new(0.0, 1.0, 0.0), 1.0, true);
        assert!(report.in_event_horizon);
        assert_eq!(report.velocity, DVec3::ZERO);
    }

    #[test]
    fn acceleration_follows_inverse_square_toward_mass() {
        let mut integrator = unit_horizon();
        let observer = DVec3::new(3.0, 4.0, 0.0);
        let report = integrator.step(observer, 0.01, false);

        assert_relative_eq!(report.acceleration_magnitude, 0.5 / 25.0, epsilon = 1e-15);
        let toward_mass = (-observer).normalize();
        let dir = report.acceleration.normalize();
        assert_relative_eq!(dir.x, toward_mass.x, epsilon = 1e-12);
        assert_relative_eq!(dir.y, toward_mass.y, epsilon = 1e-12);
        assert_relative_eq!(dir.z, toward_mass.z, epsilon = 1e-12);
    }

    #[test]
    fn distance_is_clamped_near_the_center() {
        let constants = PhysicalConstants::default();
        let mut integrator = GravityIntegrator::new(constants, DVec3::ZERO);
        let report = integrator.step(DVec3::new(0.01, 0.0, 0.0), 0.01, true);

        assert_relative_eq!(report.distance, MIN_DISTANCE);
        assert_relative_eq!(
            report.acceleration_magnitude,
            G * DEFAULT_MASS / (MIN_DISTANCE * MIN_DISTANCE),
            max_relative = 1e-12
        );
        assert_relative_eq!(report.acceleration_magnitude, 6.6743e21, max_relative = 1e-4);
    }

    #[test]
    fn observer_at_mass_center_has_no_direction() {
        let mut integrator = unit_horizon();
        let report = integrator.step(DVec3::ZERO, 0.01, true);
        assert!(report.in_event_horizon);
        assert_eq!(report.acceleration, DVec3::ZERO);
        assert!(report.acceleration_magnitude.is_finite());
    }

    #[test]
    fn schwarzschild_radius_is_constant_across_steps() {
        let constants = PhysicalConstants::default();
        let mut integrator = GravityIntegrator::new(constants, DVec3::new(1.0, 2.0, 3.0));
        let expected = 2.0 * G * DEFAULT_MASS / (C * C);

        let mut position = DVec3::new(0.0, 0.0, -1e7);
        for _ in 0..20 {
            let report = integrator.step(position, 1.0 / 45.0, true);
            assert_relative_eq!(report.schwarzschild_radius, expected);
            position += report.displacement;
        }
        assert_relative_eq!(integrator.schwarzschild_radius(), expected);
    }

    #[test]
    fn euler_step_accumulates_velocity() {
        let mut integrator = unit_horizon();
        let observer = DVec3::new(10.0, 0.0, 0.0);
        let dt = 0.5;

        let report = integrator.step(observer, dt, true);
        let a = 0.5 / 100.0;
        assert_relative_eq!(report.velocity.x, -a * dt);
        assert_relative_eq!(report.displacement.x, -a * dt * dt);

        let report = integrator.step(observer, dt, true);
        assert_relative_eq!(report.velocity.x, -2.0 * a * dt);
        assert_relative_eq!(report.displacement.x, -2.0 * a * dt * dt);
    }

    #[test]
    fn disabled_gravity_keeps_velocity_but_does_not_move() {
        let mut integrator = unit_horizon();
        let observer = DVec3::new(10.0, 0.0, 0.0);
        let moving = integrator.step(observer, 0.5, true);

        let report = integrator.step(observer, 0.5, false);
        assert_eq!(report.displacement, DVec3::ZERO);
        assert_eq!(report.velocity, moving.velocity);
        assert!(!report.in_event_horizon);
    }

    #[test]
    fn large_step_is_clamped_to_horizon() {
        let mut integrator = unit_horizon();
        let observer = DVec3::new(10.0, 0.0, 0.0);

        // a = 0.005, v = 0.5, uncapped displacement = 50 which overshoots the hole
        let report = integrator.step(observer, 100.0, true);
        assert!(report.captured);
        assert!(!report.in_event_horizon);
        assert_eq!(report.velocity, DVec3::ZERO);
        assert_relative_eq!(report.displacement.x, -9.0, epsilon = 1e-12);

        let landed = observer + report.displacement;
        assert_relative_eq!(landed.length(), integrator.schwarzschild_radius(), epsilon = 1e-12);

        // Standing on the horizon is inside it on the next tick
        let report = integrator.step(landed, 100.0, true);
        assert!(report.in_event_horizon);
    }

    #[test]
    fn moving_back_out_clears_the_flag() {
        let mut integrator = unit_horizon();
        assert!(integrator.step(DVec3::new(0.5, 0.0, 0.0), 0.1, true).in_event_horizon);

        let report = integrator.step(DVec3::new(4.0, 0.0, 0.0), 0.1, false);
        assert!(!report.in_event_horizon);
        assert_eq!(report.velocity, DVec3::ZERO);
    }
}
