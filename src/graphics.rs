use crate::collision::{ray_point_distance, ray_sphere_distance, Sphere};
use crate::constants::PHOTON_SPHERE_FACTOR;
use crate::math::DEFAULT_FOV;
use crate::state::Pose;
use crossterm::{
    cursor, queue,
    style::{Color, Print, SetForegroundColor},
};
use glam::DVec3;
use std::io::{self, Write};

/// One terminal cell
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Cell {
    pub ch: char,
    pub fg: Color,
}

impl Cell {
    pub const BLANK: Cell = Cell {
        ch: ' ',
        fg: Color::Reset,
    };

    pub fn new(ch: char, fg: Color) -> Self {
        Cell { ch, fg }
    }
}

/// Grid of cells drawn each frame, flushed as a diff against the previous frame
pub struct Canvas {
    pub width: usize,
    pub height: usize,
    cells: Vec<Cell>,
    previous: Vec<Option<Cell>>,
}

impl Canvas {
    pub fn new(width: usize, height: usize) -> Self {
        Canvas {
            width,
            height,
            cells: vec![Cell::BLANK; width * height],
            previous: vec![None; width * height],
        }
    }

    /// Resizes the grid, forcing a full redraw on the next flush
    pub fn resize(&mut self, width: usize, height: usize) {
        if width == self.width && height == self.height {
            return;
        }
        *self = Canvas::new(width, height);
    }

    pub fn clear(&mut self) {
        self.cells.fill(Cell::BLANK);
    }

    #[cfg(test)]
    pub fn get(&self, x: usize, y: usize) -> Option<Cell> {
        (x < self.width && y < self.height).then(|| self.cells[y * self.width + x])
    }

    pub fn set(&mut self, x: isize, y: isize, cell: Cell) {
        if x >= 0 && y >= 0 && (x as usize) < self.width && (y as usize) < self.height {
            self.cells[y as usize * self.width + x as usize] = cell;
        }
    }

    /// Writes `text` starting at (`x`, `y`), clipped to the grid
    pub fn write_str(&mut self, x: usize, y: usize, text: &str, fg: Color) {
        for (i, ch) in text.chars().enumerate() {
            self.set((x + i) as isize, y as isize, Cell::new(ch, fg));
        }
    }

    /// Row of the grid as a string
    #[cfg(test)]
    pub fn row_text(&self, y: usize) -> String {
        self.cells[y * self.width..(y + 1) * self.width]
            .iter()
            .map(|c| c.ch)
            .collect()
    }

    /// Queues every cell that changed since the last flush
    pub fn flush<W: Write>(&mut self, out: &mut W) -> io::Result<()> {
        let mut current_fg = None;
        for y in 0..self.height {
            for x in 0..self.width {
                let i = y * self.width + x;
                let cell = self.cells[i];
                if self.previous[i] == Some(cell) {
                    continue;
                }
                self.previous[i] = Some(cell);

                queue!(out, cursor::MoveTo(x as u16, y as u16))?;
                if current_fg != Some(cell.fg) {
                    current_fg = Some(cell.fg);
                    queue!(out, SetForegroundColor(cell.fg))?;
                }
                queue!(out, Print(cell.ch))?;
            }
        }
        Ok(())
    }

    /// Forgets what the terminal shows so the next flush redraws everything
    pub fn invalidate(&mut self) {
        self.previous.fill(None);
    }
}

/// Draws a line between two points using Bresenham's algorithm
pub fn draw_line(canvas: &mut Canvas, x0: isize, y0: isize, x1: isize, y1: isize, cell: Cell) {
    let (mut x0, mut y0) = (x0, y0);
    let dx = (x1 - x0).abs();
    let dy = -(y1 - y0).abs();
    let sx = if x0 < x1 { 1 } else { -1 };
    let sy = if y0 < y1 { 1 } else { -1 };
    let mut err = dx + dy; // error value e_xy

    loop {
        canvas.set(x0, y0, cell);

        if x0 == x1 && y0 == y1 {
            break;
        }
        let e2 = 2 * err;
        if e2 >= dy {
            err += dy;
            x0 += sx;
        }
        if e2 <= dx {
            err += dx;
            y0 += sy;
        }
    }
}

/// Small crosshair in the middle of the canvas
pub fn draw_crosshair(canvas: &mut Canvas) {
    let cx = (canvas.width / 2) as isize;
    let cy = (canvas.height / 2) as isize;
    let color = Color::Rgb {
        r: 90,
        g: 200,
        b: 90,
    };
    draw_line(canvas, cx - 2, cy, cx - 1, cy, Cell::new('-', color));
    draw_line(canvas, cx + 1, cy, cx + 2, cy, Cell::new('-', color));
    canvas.set(cx, cy, Cell::new('+', color));
}

/// Density ramp from faint to bright
const RAMP: &[char] = &['.', ':', '-', '=', '+', '*', '#', '%', '@'];

/// Ray-casts the scene: an opaque horizon sphere, a glow toward the photon
/// sphere, and a fixed starfield. Rays travel in straight lines.
pub fn render_scene(canvas: &mut Canvas, pose: &Pose, horizon: &Sphere) {
    let basis = pose.basis();
    let photon_radius = horizon.radius * PHOTON_SPHERE_FACTOR;

    for row in 0..canvas.height {
        for col in 0..canvas.width {
            let dir = basis.ray_through_cell(col, row, canvas.width, canvas.height, DEFAULT_FOV);
            let cell = shade_ray(pose.position, dir, horizon, photon_radius);
            canvas.set(col as isize, row as isize, cell);
        }
    }
}

/// Shade for a single view ray
pub fn shade_ray(origin: DVec3, dir: DVec3, horizon: &Sphere, photon_radius: f64) -> Cell {
    if ray_sphere_distance(origin, dir, horizon).is_some() {
        return Cell::new(' ', Color::Reset);
    }

    // Closest approach of the ray to the mass, in horizon radii
    let miss = ray_point_distance(origin, dir, horizon.center) / horizon.radius;
    let photon = photon_radius / horizon.radius;
    if miss < photon + 1.0 {
        let glow = 1.0 - ((miss - 1.0) / photon).clamp(0.0, 1.0);
        let index = ((glow * (RAMP.len() - 1) as f64).round() as usize).min(RAMP.len() - 1);
        let level = (120.0 + glow * 135.0) as u8;
        return Cell::new(
            RAMP[index],
            Color::Rgb {
                r: level,
                g: (level as f64 * 0.6) as u8,
                b: 40,
            },
        );
    }

    star(dir)
}

/// Deterministic starfield keyed on ray direction
fn star(dir: DVec3) -> Cell {
    let q = (dir * 60.0).round();
    let mut h = (q.x as i64).wrapping_mul(73_856_093)
        ^ (q.y as i64).wrapping_mul(19_349_663)
        ^ (q.z as i64).wrapping_mul(83_492_791);
    h ^= h >> 13;
    h = h.wrapping_mul(0x5bd1_e995);
    h ^= h >> 15;

    match h.rem_euclid(97) {
        0 => Cell::new('*', Color::White),
        1 | 2 => Cell::new('.', Color::Grey),
        _ => Cell::BLANK,
    }
}
