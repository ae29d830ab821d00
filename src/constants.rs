// Ember Engine Constants - SINGLE SOURCE OF TRUTH
//
// This file contains ALL dimension and tuning constants used throughout
// the engine. Do NOT define these anywhere else in the codebase.

/// Chunk and section dimensions (Minecraft-like world columns)
pub mod chunk {
    /// Chunk width along X, in cells
    pub const CHUNK_SIZE_X: usize = 16;
    /// Chunk height along Y, in cells
    pub const CHUNK_SIZE_Y: usize = 384;
    /// Chunk depth along Z, in cells
    pub const CHUNK_SIZE_Z: usize = 16;
    /// Cells per chunk (16 * 384 * 16)
    pub const CELLS_PER_CHUNK: usize = CHUNK_SIZE_X * CHUNK_SIZE_Y * CHUNK_SIZE_Z;

    /// Sections are 16^3 cubes stacked along Y
    pub const SECTION_EDGE: usize = 16;
    /// Number of sections per chunk column (384 / 16)
    pub const SECTIONS_PER_CHUNK: usize = CHUNK_SIZE_Y / SECTION_EDGE;
    /// Cells per section (16^3)
    pub const CELLS_PER_SECTION: usize = SECTION_EDGE * SECTION_EDGE * SECTION_EDGE;

    /// Flatten local cell coordinates into a buffer index.
    /// Layout is x + y*W + z*W*H, matching the dense per-chunk arrays.
    #[inline]
    pub const fn cell_index(x: usize, y: usize, z: usize) -> usize {
        x + y * CHUNK_SIZE_X + z * CHUNK_SIZE_X * CHUNK_SIZE_Y
    }
}

/// Thermal simulation constants - ALL TEMPERATURES IN KELVIN
pub mod thermal {
    /// Lower clamp for every stored temperature
    pub const MIN_TEMPERATURE: f32 = 0.0;
    /// Upper clamp for every stored temperature
    pub const MAX_TEMPERATURE: f32 = 6000.0;

    /// Floor for per-cell thermal capacity (mass * heat capacity) to keep
    /// the explicit update finite for degenerate materials
    pub const MIN_THERMAL_CAPACITY: f32 = 1e-8;

    /// Cell pitch in meters. Cells are 1 m^3, so 1/dx^2 = 1 and the
    /// discrete Laplacian needs no extra scaling.
    pub const CELL_PITCH_METERS: f32 = 1.0;
}

/// Stress-test tuning: random material ranges and controller pacing
pub mod stress {
    use std::ops::Range;
    use std::time::Duration;

    /// Heat capacity range, J/(kg*K)
    pub const HEAT_CAPACITY_RANGE: Range<f32> = 200.0..1200.0;
    /// Thermal conductivity range, W/(m*K)
    pub const CONDUCTIVITY_RANGE: Range<f32> = 1.0..500.0;
    /// Per-cell mass range, kg (cell is 1 m^3)
    pub const MASS_RANGE: Range<f32> = 500.0..4000.0;
    /// Molar mass range, kg/mol
    pub const MOLAR_MASS_RANGE: Range<f32> = 0.01..0.10;
    /// Fill temperature range, Kelvin
    pub const TEMPERATURE_RANGE: Range<f32> = 0.0..6000.0;

    /// Section index seeded into every freshly created spiral chunk
    pub const SEED_SECTION: usize = 8;

    /// Pause between growth iterations so the sim thread is not starved
    pub const GROW_SLEEP: Duration = Duration::from_millis(4);
    /// How often the console progress bar refreshes
    pub const REPORT_INTERVAL: Duration = Duration::from_millis(100);
    /// Width of the console progress bar, in cells
    pub const PROGRESS_BAR_CELLS: usize = 40;
}

#[cfg(test)]
mod tests {
    use super::chunk::*;

    #[test]
    fn test_chunk_dimensions() {
        assert_eq!(CELLS_PER_CHUNK, 98_304);
        assert_eq!(SECTIONS_PER_CHUNK, 24);
        assert_eq!(CELLS_PER_SECTION, 4096);
    }

    #[test]
    fn test_cell_index_layout() {
        assert_eq!(cell_index(0, 0, 0), 0);
        assert_eq!(cell_index(1, 0, 0), 1);
        assert_eq!(cell_index(0, 1, 0), CHUNK_SIZE_X);
        assert_eq!(cell_index(0, 0, 1), CHUNK_SIZE_X * CHUNK_SIZE_Y);
        assert_eq!(cell_index(15, 383, 15), CELLS_PER_CHUNK - 1);
    }
}
