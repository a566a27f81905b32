use dla_stepper::engine::SimulationEngine;
use ratatui::style::Color;

/// Braille character rendering for high-resolution terminal graphics.
/// Each Braille character represents a 2x4 grid of dots (8 dots total).
///
/// Dot positions and their bit values:
/// ```text
/// (0,0)=0x01  (1,0)=0x08
/// (0,1)=0x02  (1,1)=0x10
/// (0,2)=0x04  (1,2)=0x20
/// (0,3)=0x40  (1,3)=0x80
/// ```
///
/// Unicode Braille patterns: U+2800 to U+28FF (256 patterns)
const BRAILLE_BASE: u32 = 0x2800;

/// Dot position to bit mapping for Braille characters
const BRAILLE_DOTS: [[u8; 4]; 2] = [
    [0x01, 0x02, 0x04, 0x40], // Left column (x=0): rows 0,1,2,3
    [0x08, 0x10, 0x20, 0x80], // Right column (x=1): rows 0,1,2,3
];

const STRUCTURE_COLOR: Color = Color::Rgb(120, 200, 255);
const PARTICLE_COLOR: Color = Color::Rgb(255, 200, 60);

/// A single rendered Braille cell with position and color
#[derive(Clone, Copy)]
pub struct BrailleCell {
    pub x: u16,
    pub y: u16,
    pub char: char,
    pub color: Color,
}

/// Render fixed cells (and optionally diffusing particles) to Braille characters.
/// A character holding any particle dot takes the particle color.
pub fn render_to_braille(
    engine: &SimulationEngine,
    canvas_width: u16,
    canvas_height: u16,
    show_particles: bool,
) -> Vec<BrailleCell> {
    let sim_width = engine.width();
    let sim_height = engine.height();

    // Braille effective resolution
    let braille_width = canvas_width as usize * 2;
    let braille_height = canvas_height as usize * 4;
    if braille_width == 0 || braille_height == 0 {
        return Vec::new();
    }

    // Scale factors (pre-calculated once)
    let scale_x = sim_width as f32 / braille_width as f32;
    let scale_y = sim_height as f32 / braille_height as f32;

    // Particle dots, indexed like the canvas
    let mut particle_dots = vec![false; braille_width * braille_height];
    if show_particles {
        for p in engine.particles() {
            let bx = ((p.x as f32 / scale_x) as usize).min(braille_width - 1);
            let by = ((p.y as f32 / scale_y) as usize).min(braille_height - 1);
            particle_dots[by * braille_width + bx] = true;
        }
    }

    let occupancy = engine.occupancy();
    let mut cells = Vec::with_capacity(canvas_width as usize * canvas_height as usize);

    for cy in 0..canvas_height {
        for cx in 0..canvas_width {
            let mut pattern: u8 = 0;
            let mut has_particle = false;

            // Sample the 2x4 dots for this Braille character
            let base_bx = cx as usize * 2;
            let base_by = cy as usize * 4;

            for dx in 0..2 {
                for dy in 0..4 {
                    let braille_x = base_bx + dx;
                    let braille_y = base_by + dy;

                    if particle_dots[braille_y * braille_width + braille_x] {
                        pattern |= BRAILLE_DOTS[dx][dy];
                        has_particle = true;
                        continue;
                    }

                    let sim_x = (braille_x as f32 * scale_x) as usize;
                    let sim_y = (braille_y as f32 * scale_y) as usize;
                    if sim_x < sim_width && sim_y < sim_height && occupancy[sim_y * sim_width + sim_x] {
                        pattern |= BRAILLE_DOTS[dx][dy];
                    }
                }
            }

            // Only emit cells that have at least one dot
            if pattern != 0 {
                let braille_char = char::from_u32(BRAILLE_BASE + pattern as u32).unwrap_or(' ');
                let color = if has_particle { PARTICLE_COLOR } else { STRUCTURE_COLOR };
                cells.push(BrailleCell {
                    x: cx,
                    y: cy,
                    char: braille_char,
                    color,
                });
            }
        }
    }

    cells
}

/// Calculate optimal simulation grid size for a given canvas size
/// Returns (width, height) for the simulation grid
pub fn calculate_simulation_size(canvas_width: u16, canvas_height: u16) -> (usize, usize) {
    // Braille gives 2x4 resolution per character
    let width = (canvas_width as usize * 2).max(64);
    let height = (canvas_height as usize * 4).max(64);
    (width, height)
}
