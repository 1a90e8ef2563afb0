//! Numeric readout and status panels drawn over the scene.

use crate::graphics::Canvas;
use crate::integrator::StepReport;
use crate::state::AppState;
use crossterm::style::Color;

/// Accelerations above this are shown divided by `ACCELERATION_RESCALE`
pub const ACCELERATION_DISPLAY_LIMIT: f64 = 1e10;
pub const ACCELERATION_RESCALE: f64 = 1e6;

/// Converts ASCII digits and '-' to their Unicode superscript forms
pub fn to_superscript(text: &str) -> String {
    text.chars()
        .map(|c| match c {
            '0' => '⁰',
            '1' => '¹',
            '2' => '²',
            '3' => '³',
            '4' => '⁴',
            '5' => '⁵',
            '6' => '⁶',
            '7' => '⁷',
            '8' => '⁸',
            '9' => '⁹',
            '-' => '⁻',
            other => other,
        })
        .collect()
}

/// Formats large numbers as `m.mm × 10ⁿ`; numbers under a million keep two decimals.
pub fn format_big_number(number: f64) -> String {
    if number == 0.0 {
        return "0".to_string();
    }

    let mut exponent = number.abs().log10().trunc() as i32;
    if exponent < 6 {
        return format!("{number:.2}");
    }

    let mut mantissa = number / 10f64.powi(exponent);
    // log10 can land a hair under an exact power of ten
    if mantissa.abs() >= 10.0 {
        mantissa /= 10.0;
        exponent += 1;
    }
    format!("{mantissa:.2} × 10{}", to_superscript(&exponent.to_string()))
}

/// Acceleration as shown on screen
pub fn display_acceleration(acceleration: f64) -> f64 {
    if acceleration > ACCELERATION_DISPLAY_LIMIT {
        acceleration / ACCELERATION_RESCALE
    } else {
        acceleration
    }
}

/// Lines of the main readout
pub fn readout_lines(report: &StepReport, mass: f64) -> Vec<String> {
    vec![
        format!("Distance (r): {:.0} km", report.distance * 1000.0),
        format!(
            "Schwarzschild radius (Rs): {:.3} km",
            report.schwarzschild_radius
        ),
        format!("r / Rs: {:.4}", report.distance_ratio),
        format!("Black hole mass (M): {} kg", format_big_number(mass)),
        format!(
            "Gravitational acceleration (g): {} m/s²",
            format_big_number(display_acceleration(report.acceleration_magnitude))
        ),
    ]
}

/// Status panels for the horizon state
pub fn panel_lines(report: &StepReport, gravity: bool) -> Vec<&'static str> {
    let mut lines = Vec::new();
    if report.in_event_horizon {
        lines.push("EVENT HORIZON CROSSED");
        if gravity {
            lines.push("Turn off gravity (G) to move out");
        }
    }
    lines
}

/// Extra lines shown with the debug overlay on
pub struct DebugInfo {
    pub fps: f64,
    pub ticks: u64,
}

pub fn debug_lines(state: &AppState, report: &StepReport, info: &DebugInfo) -> Vec<String> {
    let p = state.pose.position;
    let v = report.velocity;
    vec![
        format!("{} {}", env!("CARGO_PKG_NAME"), env!("CARGO_PKG_VERSION")),
        format!("FPS: {:.2}  ticks: {}", info.fps, info.ticks),
        format!("Position: ({:.2}, {:.2}, {:.2})", p.x, p.y, p.z),
        format!("Velocity: ({:.3e}, {:.3e}, {:.3e})", v.x, v.y, v.z),
        format!(
            "Yaw: {:.1}°  Pitch: {:.1}°",
            state.pose.yaw.to_degrees(),
            state.pose.pitch.to_degrees()
        ),
        format!("Time scale: {:e}", state.time_scale),
    ]
}

const HELP: &str = "WASD move  Space/C up/down  arrows look  G gravity  R reset  [ ] time  P pause  ? debug  Q quit";

/// Draws the readout, panels, status bar and optional debug overlay
pub fn draw_hud(canvas: &mut Canvas, state: &AppState, report: &StepReport, mass: f64, info: &DebugInfo) {
    let text = Color::White;
    for (i, line) in readout_lines(report, mass).iter().enumerate() {
        canvas.write_str(1, i, line, text);
    }

    let panel_color = Color::Rgb { r: 255, g: 80, b: 80 };
    let mid = canvas.height / 2;
    for (i, line) in panel_lines(report, state.gravity).iter().enumerate() {
        let x = canvas.width.saturating_sub(line.chars().count()) / 2;
        canvas.write_str(x, mid + 2 + i, line, panel_color);
    }

    if state.paused {
        let label = "Paused";
        canvas.write_str((canvas.width.saturating_sub(label.len())) / 2, mid.saturating_sub(2), label, text);
    }

    if state.debug {
        let top = 6;
        for (i, line) in debug_lines(state, report, info).iter().enumerate() {
            canvas.write_str(1, top + i, line, Color::Grey);
        }
    }

    if canvas.height > 0 {
        let status = format!(
            " gravity: {}  time scale: {:e}  | {HELP}",
            if state.gravity { "on" } else { "off" },
            state.time_scale
        );
        canvas.write_str(0, canvas.height - 1, &status, Color::DarkGrey);
    }
}
