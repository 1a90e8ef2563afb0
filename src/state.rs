use crate::math::ViewBasis;
use glam::DVec3;

/// Slowest and fastest simulated time scale
pub const MIN_TIME_SCALE: f64 = 0.0;
pub const MAX_TIME_SCALE: f64 = 100.0;

/// Observer position and orientation
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Pose {
    pub position: DVec3,
    /// Rotation about +Y in radians
    pub yaw: f64,
    /// Rotation about the local X axis in radians, positive looks up
    pub pitch: f64,
}

impl Pose {
    pub fn new(position: DVec3, yaw: f64, pitch: f64) -> Self {
        Pose {
            position,
            yaw,
            pitch,
        }
    }

    pub fn basis(&self) -> ViewBasis {
        ViewBasis::from_angles(self.yaw, self.pitch)
    }
}

/// Application state
#[derive(Debug, Clone)]
pub struct AppState {
    /// Current observer pose
    pub pose: Pose,
    /// Pose restored by a reset
    pub start_pose: Pose,
    /// Gravity pulls the observer
    pub gravity: bool,
    /// Multiplier applied to simulated time
    pub time_scale: f64,
    /// Show debug overlay
    pub debug: bool,
    /// Simulation paused
    pub paused: bool,
}

impl AppState {
    pub fn new(start_pose: Pose, gravity: bool, time_scale: f64) -> Self {
        AppState {
            pose: start_pose,
            start_pose,
            gravity,
            time_scale: time_scale.clamp(MIN_TIME_SCALE, MAX_TIME_SCALE),
            debug: false,
            paused: false,
        }
    }

    /// Puts the observer back where it started. Accumulated velocity is left alone.
    pub fn reset_pose(&mut self) {
        self.pose = self.start_pose;
    }

    pub fn set_time_scale(&mut self, value: f64) {
        self.time_scale = value.clamp(MIN_TIME_SCALE, MAX_TIME_SCALE);
    }

    /// Multiplies the time scale by ten, starting from 1e-6 when frozen.
    pub fn speed_up(&mut self) {
        let next = if self.time_scale > 0.0 {
            self.time_scale * 10.0
        } else {
            1e-6
        };
        self.set_time_scale(next);
    }

    /// Divides the time scale by ten. Scales below 1e-9 snap to zero.
    pub fn slow_down(&mut self) {
        let next = self.time_scale / 10.0;
        self.set_time_scale(if next < 1e-9 { 0.0 } else { next });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn state() -> AppState {
        AppState::new(Pose::new(DVec3::new(0.0, 0.0, -10.0), 0.0, 0.0), false, 1.0)
    }

    #[test]
    fn reset_restores_start_pose() {
        let mut state = state();
        state.pose.position = DVec3::new(4.0, 5.0, 6.0);
        state.pose.yaw = 1.0;
        state.reset_pose();
        assert_eq!(state.pose, state.start_pose);
    }

    #[test]
    fn time_scale_is_clamped() {
        let mut state = state();
        for _ in 0..5 {
            state.speed_up();
        }
        assert_relative_eq!(state.time_scale, MAX_TIME_SCALE);
        state.set_time_scale(-3.0);
        assert_relative_eq!(state.time_scale, 0.0);
    }

    #[test]
    fn time_scale_thaws_from_zero() {
        let mut state = state();
        state.set_time_scale(0.0);
        state.speed_up();
        assert_relative_eq!(state.time_scale, 1e-6);
        for _ in 0..4 {
            state.slow_down();
        }
        assert_relative_eq!(state.time_scale, 0.0);
    }
}
