//! First-person camera control from terminal key events.
//!
//! Terminals only report key presses (and auto-repeats) unless the keyboard
//! enhancement protocol is active, so a key counts as held until either its
//! release arrives or no repeat has been seen for `HOLD_TIMEOUT`.

use crate::state::Pose;
use crossterm::event::{KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use glam::DVec3;
use std::collections::HashMap;
use std::time::{Duration, Instant};

/// How long a key stays held without a repeat event
pub const HOLD_TIMEOUT: Duration = Duration::from_millis(150);

/// Continuous camera actions bound to keys
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Action {
    Forward,
    Back,
    Left,
    Right,
    Up,
    Down,
    LookLeft,
    LookRight,
    LookUp,
    LookDown,
}

impl Action {
    pub fn from_key(code: KeyCode) -> Option<Action> {
        match code {
            KeyCode::Char('w') | KeyCode::Char('W') => Some(Action::Forward),
            KeyCode::Char('s') | KeyCode::Char('S') => Some(Action::Back),
            KeyCode::Char('a') | KeyCode::Char('A') => Some(Action::Left),
            KeyCode::Char('d') | KeyCode::Char('D') => Some(Action::Right),
            KeyCode::Char(' ') => Some(Action::Up),
            KeyCode::Char('c') | KeyCode::Char('C') => Some(Action::Down),
            KeyCode::Left => Some(Action::LookLeft),
            KeyCode::Right => Some(Action::LookRight),
            KeyCode::Up => Some(Action::LookUp),
            KeyCode::Down => Some(Action::LookDown),
            _ => None,
        }
    }
}

/// Movement speed selected by modifier keys
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SpeedMode {
    #[default]
    Normal,
    Fast,
    Slow,
}

impl SpeedMode {
    fn from_event(event: &KeyEvent) -> SpeedMode {
        let shifted = event.modifiers.contains(KeyModifiers::SHIFT)
            || matches!(event.code, KeyCode::Char(c) if c.is_ascii_uppercase());
        if shifted {
            SpeedMode::Fast
        } else if event.modifiers.contains(KeyModifiers::ALT) {
            SpeedMode::Slow
        } else {
            SpeedMode::Normal
        }
    }
}

/// Tracks which camera actions are currently held
#[derive(Debug, Default)]
pub struct HeldKeys {
    pressed: HashMap<Action, Instant>,
    speed: SpeedMode,
    /// The terminal reports key releases
    release_events: bool,
}

impl HeldKeys {
    pub fn new(release_events: bool) -> Self {
        HeldKeys {
            release_events,
            ..Default::default()
        }
    }

    /// Feeds one key event. Returns true when the event was a camera action.
    pub fn handle(&mut self, event: &KeyEvent, now: Instant) -> bool {
        let Some(action) = Action::from_key(event.code) else {
            return false;
        };

        match event.kind {
            KeyEventKind::Press | KeyEventKind::Repeat => {
                self.pressed.insert(action, now);
                self.speed = SpeedMode::from_event(event);
            }
            KeyEventKind::Release => {
                self.pressed.remove(&action);
            }
        }
        true
    }

    pub fn is_held(&self, action: Action, now: Instant) -> bool {
        match self.pressed.get(&action) {
            Some(_) if self.release_events => true,
            Some(&at) => now.saturating_duration_since(at) < HOLD_TIMEOUT,
            None => false,
        }
    }

    pub fn speed(&self) -> SpeedMode {
        self.speed
    }

    pub fn clear(&mut self) {
        self.pressed.clear();
        self.speed = SpeedMode::Normal;
    }
}

/// Moves and turns the observer from held keys
#[derive(Debug, Clone)]
pub struct CameraController {
    pub normal_speed: f64,
    pub fast_speed: f64,
    pub slow_speed: f64,
    /// Turn rate in radians per second
    pub look_speed: f64,
    /// Pitch limit in radians
    pub look_limit: f64,
}

impl Default for CameraController {
    fn default() -> Self {
        CameraController {
            normal_speed: 5.0,
            fast_speed: 10.0,
            slow_speed: 2.0,
            look_speed: 90f64.to_radians(),
            look_limit: 90f64.to_radians(),
        }
    }
}

impl CameraController {
    pub fn speed(&self, mode: SpeedMode) -> f64 {
        match mode {
            SpeedMode::Normal => self.normal_speed,
            SpeedMode::Fast => self.fast_speed,
            SpeedMode::Slow => self.slow_speed,
        }
    }

    /// Applies one frame of look and movement input. `dt` is wall-clock time.
    pub fn update(&self, pose: &mut Pose, keys: &HeldKeys, now: Instant, dt: f64) {
        let held = |action| keys.is_held(action, now);

        let mut yaw_input = 0.0;
        if held(Action::LookRight) {
            yaw_input += 1.0;
        }
        if held(Action::LookLeft) {
            yaw_input -= 1.0;
        }
        let mut pitch_input = 0.0;
        if held(Action::LookUp) {
            pitch_input += 1.0;
        }
        if held(Action::LookDown) {
            pitch_input -= 1.0;
        }
        self.turn(pose, yaw_input * self.look_speed * dt, pitch_input * self.look_speed * dt);

        let direction = self.move_direction(pose, &held);
        pose.position += direction * self.speed(keys.speed()) * dt;
    }

    /// Turns the view, keeping pitch within the look limit
    pub fn turn(&self, pose: &mut Pose, yaw_delta: f64, pitch_delta: f64) {
        pose.yaw = (pose.yaw + yaw_delta).rem_euclid(std::f64::consts::TAU);
        pose.pitch = (pose.pitch + pitch_delta).clamp(-self.look_limit, self.look_limit);
    }

    /// Planar direction from WASD plus vertical from up/down, at most unit length
    fn move_direction(&self, pose: &Pose, held: &impl Fn(Action) -> bool) -> DVec3 {
        let basis = pose.basis();
        let mut direction = DVec3::ZERO;

        if held(Action::Forward) {
            direction += basis.forward;
        }
        if held(Action::Back) {
            direction -= basis.forward;
        }
        if held(Action::Left) {
            direction -= basis.right;
        }
        if held(Action::Right) {
            direction += basis.right;
        }

        // Diagonals are no faster than straight movement
        if direction.length() > 1.0 {
            direction = direction.normalize();
        }

        if held(Action::Up) {
            direction.y += 1.0;
        }
        if held(Action::Down) {
            direction.y -= 1.0;
        }

        direction
    }
}
