use crate::config::Config;
use crate::controller::{CameraController, HeldKeys};
use crate::error::AppError;
use crate::graphics::{draw_crosshair, render_scene, Canvas};
use crate::hud::{self, DebugInfo};
use crate::integrator::{GravityIntegrator, StepReport};
use crate::state::{AppState, Pose};
use crossterm::{
    cursor,
    event::{
        self, Event, KeyCode, KeyEventKind, KeyboardEnhancementFlags,
        PopKeyboardEnhancementFlags, PushKeyboardEnhancementFlags,
    },
    execute,
    style::ResetColor,
    terminal::{
        self, BeginSynchronizedUpdate, DisableLineWrap, EnableLineWrap, EndSynchronizedUpdate,
        EnterAlternateScreen, LeaveAlternateScreen,
    },
};
use std::io::{self, Stdout, Write};
use std::time::{Duration, Instant};
use tracing::{debug, info, warn};

/// Upper bound on integration ticks run for a single frame
pub const MAX_TICKS_PER_FRAME: u32 = 240;

/// Longest wall-clock frame fed to the camera and the timestep, in seconds
pub const MAX_FRAME_DT: f64 = 0.25;

/// Wall-clock frame duration, capped so a stalled terminal cannot fling the camera
pub fn frame_dt(elapsed: Duration) -> f64 {
    elapsed.as_secs_f64().min(MAX_FRAME_DT)
}

/// Turns variable wall-clock frame time into whole fixed-size ticks
#[derive(Debug, Clone)]
pub struct FixedTimestep {
    tick: f64,
    accumulator: f64,
    max_ticks: u32,
}

impl FixedTimestep {
    pub fn new(tick: f64, max_ticks: u32) -> Self {
        FixedTimestep {
            tick,
            accumulator: 0.0,
            max_ticks,
        }
    }

    pub fn tick(&self) -> f64 {
        self.tick
    }

    /// Leftover time not yet consumed by a tick
    #[cfg(test)]
    pub fn remainder(&self) -> f64 {
        self.accumulator
    }

    /// Adds `elapsed` seconds and returns how many ticks are due.
    ///
    /// When more than `max_ticks` are due the backlog is dropped.
    pub fn advance(&mut self, elapsed: f64) -> u32 {
        self.accumulator += elapsed.max(0.0);
        let due = (self.accumulator / self.tick).floor();
        if due > self.max_ticks as f64 {
            warn!(due, "simulation fell behind, dropping backlog");
            self.accumulator = 0.0;
            return self.max_ticks;
        }
        self.accumulator -= due * self.tick;
        due as u32
    }
}

/// Observer state plus the integrator that moves it
pub struct Simulation {
    pub state: AppState,
    pub integrator: GravityIntegrator,
    timestep: FixedTimestep,
    report: StepReport,
    ticks: u64,
}

impl Simulation {
    pub fn new(config: &Config) -> Self {
        let mut integrator = GravityIntegrator::new(config.constants(), config.black_hole);
        let state = AppState::new(Pose::new(config.start, 0.0, 0.0), config.gravity, config.time_scale);
        let report = integrator.step(state.pose.position, 0.0, false);
        Simulation {
            state,
            integrator,
            timestep: FixedTimestep::new(config.tick_duration(), MAX_TICKS_PER_FRAME),
            report,
            ticks: 0,
        }
    }

    pub fn report(&self) -> &StepReport {
        &self.report
    }

    pub fn ticks(&self) -> u64 {
        self.ticks
    }

    /// Simulated seconds integrated by one tick at the current time scale
    pub fn tick_dt(&self) -> f64 {
        self.timestep.tick() * self.state.time_scale
    }

    /// One fixed integration tick; the displacement is applied to the observer.
    pub fn tick(&mut self) -> StepReport {
        let dt = self.tick_dt();
        let report = self
            .integrator
            .step(self.state.pose.position, dt, self.state.gravity);
        self.state.pose.position += report.displacement;
        self.ticks += 1;

        if report.captured {
            info!(tick = self.ticks, position = ?self.state.pose.position, "observer reached the horizon");
        }
        self.report = report;
        report
    }

    /// Runs the ticks owed for `real_dt` wall-clock seconds.
    ///
    /// Ticks come at a fixed real-time rate; the time scale shrinks or stretches
    /// the simulated time each one integrates.
    pub fn advance(&mut self, real_dt: f64) -> u32 {
        let due = self.timestep.advance(real_dt);
        for _ in 0..due {
            self.tick();
        }
        due
    }

    /// Recomputes the readout for the current position without moving anything
    pub fn refresh(&mut self) {
        self.report = self.integrator.step(self.state.pose.position, 0.0, false);
    }
}

/// Frames-per-second over one-second windows
struct FpsCounter {
    frames_since_last_update: usize,
    last_fps_calculation: Instant,
    fps: f64,
}

impl FpsCounter {
    fn new() -> Self {
        FpsCounter {
            frames_since_last_update: 0,
            last_fps_calculation: Instant::now(),
            fps: 0.0,
        }
    }

    fn frame(&mut self, now: Instant) -> f64 {
        self.frames_since_last_update += 1;
        let duration = now.duration_since(self.last_fps_calculation);
        if duration.as_secs_f64() >= 1.0 {
            self.fps = self.frames_since_last_update as f64 / duration.as_secs_f64();
            self.frames_since_last_update = 0;
            self.last_fps_calculation = now;
        }
        self.fps
    }
}

/// Runs the simulation without a terminal UI and prints the final readout to `out`
pub fn run_headless<W: Write>(config: &Config, ticks: u64, out: &mut W) -> Result<(), AppError> {
    let mut sim = Simulation::new(config);
    info!(ticks, tick_dt = sim.tick_dt(), "headless run");

    let mut captured_at = None;
    for _ in 0..ticks {
        let report = sim.tick();
        if report.captured && captured_at.is_none() {
            captured_at = Some(sim.ticks());
        }
    }
    sim.refresh();

    for line in hud::readout_lines(sim.report(), sim.integrator.constants().mass) {
        writeln!(out, "{line}")?;
    }
    let p = sim.state.pose.position;
    let v = sim.integrator.velocity();
    writeln!(out, "Position: ({:.3}, {:.3}, {:.3})", p.x, p.y, p.z)?;
    writeln!(out, "Velocity: ({:.3e}, {:.3e}, {:.3e})", v.x, v.y, v.z)?;
    writeln!(out, "Ticks: {}", sim.ticks())?;
    match captured_at {
        Some(tick) => writeln!(out, "Reached the horizon at tick {tick}")?,
        None if sim.report().in_event_horizon => writeln!(out, "Inside the event horizon")?,
        None => {}
    }
    Ok(())
}

/// Raw mode and alternate screen for the lifetime of the guard.
///
/// Dropping it restores the terminal step by step, ignoring failures, so an
/// error or panic anywhere in the frame loop still hands back a usable shell.
struct TerminalGuard {
    release_events: bool,
}

impl TerminalGuard {
    fn enter(out: &mut Stdout) -> io::Result<TerminalGuard> {
        terminal::enable_raw_mode()?;
        let mut guard = TerminalGuard {
            release_events: false,
        };

        if matches!(terminal::supports_keyboard_enhancement(), Ok(true)) {
            execute!(
                out,
                PushKeyboardEnhancementFlags(KeyboardEnhancementFlags::REPORT_EVENT_TYPES)
            )?;
            guard.release_events = true;
        }
        execute!(out, EnterAlternateScreen, cursor::Hide, DisableLineWrap)?;
        Ok(guard)
    }
}

impl Drop for TerminalGuard {
    fn drop(&mut self) {
        let mut out = io::stdout();
        if self.release_events {
            let _ = execute!(out, PopKeyboardEnhancementFlags);
        }
        let _ = execute!(
            out,
            ResetColor,
            cursor::Show,
            EnableLineWrap,
            LeaveAlternateScreen
        );
        let _ = terminal::disable_raw_mode();
    }
}

/// Runs the interactive terminal demo, restoring the terminal on exit
pub fn run(config: &Config) -> Result<(), AppError> {
    let mut out = io::stdout();
    let guard = TerminalGuard::enter(&mut out)?;
    info!(release_events = guard.release_events, "terminal ready");

    let result = event_loop(&mut out, config, guard.release_events);
    drop(guard);
    result
}

/// Current terminal size in cells
fn viewport() -> io::Result<(usize, usize)> {
    match termsize::get() {
        Some(size) => Ok((size.cols as usize, size.rows as usize)),
        None => {
            let (cols, rows) = terminal::size()?;
            Ok((cols as usize, rows as usize))
        }
    }
}

fn event_loop(out: &mut Stdout, config: &Config, release_events: bool) -> Result<(), AppError> {
    let mut sim = Simulation::new(config);
    let controller = CameraController::default();
    let mut keys = HeldKeys::new(release_events);
    let mut fps = FpsCounter::new();

    let (width, height) = viewport()?;
    let mut canvas = Canvas::new(width, height);

    let frame_time = Duration::from_secs_f64(1.0 / config.fps as f64);
    let mut last_frame = Instant::now();

    loop {
        let now = Instant::now();
        let dt = frame_dt(now.duration_since(last_frame));
        last_frame = now;

        // Input
        while event::poll(Duration::ZERO)? {
            match event::read()? {
                Event::Key(key) => {
                    if keys.handle(&key, now) || key.kind != KeyEventKind::Press {
                        continue;
                    }
                    let state = &mut sim.state;
                    match key.code {
                        KeyCode::Char('q') | KeyCode::Char('Q') | KeyCode::Esc => return Ok(()),
                        KeyCode::Char('g') | KeyCode::Char('G') => {
                            state.gravity = !state.gravity;
                            info!(gravity = state.gravity, "gravity toggled");
                        }
                        KeyCode::Char('r') | KeyCode::Char('R') => {
                            state.reset_pose();
                            keys.clear();
                            info!("observer reset to start pose");
                        }
                        KeyCode::Char('p') | KeyCode::Char('P') => {
                            state.paused = !state.paused;
                            keys.clear();
                        }
                        KeyCode::Char('[') => state.slow_down(),
                        KeyCode::Char(']') => state.speed_up(),
                        KeyCode::Char('0') => state.set_time_scale(0.0),
                        KeyCode::Char('?') | KeyCode::F(1) => state.debug = !state.debug,
                        _ => {}
                    }
                    debug!(time_scale = state.time_scale, "key handled");
                }
                Event::Resize(..) => canvas.invalidate(),
                _ => {}
            }
        }

        // Simulation: camera movement uses wall-clock time, gravity integrates scaled time
        if !sim.state.paused {
            controller.update(&mut sim.state.pose, &keys, now, dt);
            sim.advance(dt);
        }
        sim.refresh();

        // Render
        let (width, height) = viewport()?;
        canvas.resize(width, height);
        canvas.clear();
        render_scene(&mut canvas, &sim.state.pose, &sim.integrator.horizon());
        draw_crosshair(&mut canvas);
        let info = DebugInfo {
            fps: fps.frame(now),
            ticks: sim.ticks(),
        };
        hud::draw_hud(&mut canvas, &sim.state, sim.report(), sim.integrator.constants().mass, &info);

        execute!(out, BeginSynchronizedUpdate)?;
        canvas.flush(out)?;
        execute!(out, EndSynchronizedUpdate)?;
        out.flush()?;

        // Cap frame rate
        let elapsed = now.elapsed();
        if elapsed < frame_time {
            std::thread::sleep(frame_time - elapsed);
        }
    }
}
