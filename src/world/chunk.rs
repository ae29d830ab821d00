use std::fmt;
use std::ops::Range;

use parking_lot::{Mutex, MutexGuard};

use crate::constants::chunk::{
    cell_index, CELLS_PER_CHUNK, CHUNK_SIZE_X, CHUNK_SIZE_Y, CHUNK_SIZE_Z, SECTIONS_PER_CHUNK,
    SECTION_EDGE,
};
use crate::constants::thermal::{MAX_TEMPERATURE, MIN_TEMPERATURE};
use crate::material::{MaterialId, MaterialTable};

/// Position of a chunk column in the world (chunk coordinates)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ChunkPos {
    pub x: i32,
    pub z: i32,
}

impl ChunkPos {
    pub fn new(x: i32, z: i32) -> Self {
        Self { x, z }
    }

    /// Create a new chunk position offset by the given amounts
    pub fn offset(&self, dx: i32, dz: i32) -> Self {
        Self::new(self.x + dx, self.z + dz)
    }
}

impl fmt::Display for ChunkPos {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.x, self.z)
    }
}

/// Local Y range covered by a section index
pub fn section_y_range(sy: usize) -> Range<usize> {
    let y0 = sy * SECTION_EDGE;
    y0..y0 + SECTION_EDGE
}

/// A 16x384x16 column of cells: 24 stacked 16^3 sections.
///
/// Every cell carries a material index, a mass in kilograms and a
/// temperature in Kelvin. Temperatures are double-buffered: the front
/// buffer is the externally visible field between ticks, the back buffer
/// is the staging target of the tick in progress. The two buffers are
/// separately allocated so the publish step is a handle swap, never a
/// per-element copy.
///
/// The back buffer sits behind its own mutex: the compute phase writes it
/// while holding only shared world access, and the per-chunk lock is what
/// keeps that sound. Front data, masses and metadata are plain fields
/// guarded by the world lock.
pub struct Chunk {
    position: ChunkPos,
    /// Material index treated as empty for this chunk (typically 0)
    void_id: MaterialId,
    materials: Vec<MaterialId>,
    mass: Vec<f32>,
    temp_front: Vec<f32>,
    temp_back: Mutex<Vec<f32>>,
    /// True iff the section holds at least one non-void cell
    section_loaded: [bool; SECTIONS_PER_CHUNK],
    /// Wall-clock cost of each section during the previous tick, ms
    last_section_ms: [f64; SECTIONS_PER_CHUNK],
    /// Sum of the per-section costs during the previous tick, ms
    last_chunk_ms: f64,
}

impl Chunk {
    pub fn new(position: ChunkPos, void_id: MaterialId) -> Self {
        Self {
            position,
            void_id,
            materials: vec![void_id; CELLS_PER_CHUNK],
            mass: vec![0.0; CELLS_PER_CHUNK],
            temp_front: vec![0.0; CELLS_PER_CHUNK],
            temp_back: Mutex::new(vec![0.0; CELLS_PER_CHUNK]),
            section_loaded: [false; SECTIONS_PER_CHUNK],
            last_section_ms: [0.0; SECTIONS_PER_CHUNK],
            last_chunk_ms: 0.0,
        }
    }

    pub fn position(&self) -> ChunkPos {
        self.position
    }

    pub fn void_id(&self) -> MaterialId {
        self.void_id
    }

    /// Front temperature buffer, the externally visible field
    pub fn front(&self) -> &[f32] {
        &self.temp_front
    }

    /// Material index per cell, flattened with [`cell_index`]
    pub fn materials(&self) -> &[MaterialId] {
        &self.materials
    }

    /// Mass per cell in kilograms; 0 iff the cell is void
    pub fn masses(&self) -> &[f32] {
        &self.mass
    }

    /// Front temperature at local coordinates; 0 when out of bounds
    pub fn temperature(&self, x: usize, y: usize, z: usize) -> f32 {
        if x >= CHUNK_SIZE_X || y >= CHUNK_SIZE_Y || z >= CHUNK_SIZE_Z {
            return 0.0;
        }
        self.temp_front[cell_index(x, y, z)]
    }

    /// Material at local coordinates; the void id when out of bounds
    pub fn material(&self, x: usize, y: usize, z: usize) -> MaterialId {
        if x >= CHUNK_SIZE_X || y >= CHUNK_SIZE_Y || z >= CHUNK_SIZE_Z {
            return self.void_id;
        }
        self.materials[cell_index(x, y, z)]
    }

    /// Mass at local coordinates; 0 when out of bounds
    pub fn mass(&self, x: usize, y: usize, z: usize) -> f32 {
        if x >= CHUNK_SIZE_X || y >= CHUNK_SIZE_Y || z >= CHUNK_SIZE_Z {
            return 0.0;
        }
        self.mass[cell_index(x, y, z)]
    }

    /// Set one cell's material and temperature, keeping every derived
    /// field consistent: mass follows the material's default, both
    /// temperature buffers receive the (clamped) value so the next
    /// publish swap cannot resurrect stale data, and the section flag is
    /// updated. Out-of-bounds coordinates are ignored.
    pub fn set_cell(
        &mut self,
        x: usize,
        y: usize,
        z: usize,
        material: MaterialId,
        temperature: f32,
        table: &MaterialTable,
    ) {
        if x >= CHUNK_SIZE_X || y >= CHUNK_SIZE_Y || z >= CHUNK_SIZE_Z {
            return;
        }
        let i = cell_index(x, y, z);
        let temperature = temperature.clamp(MIN_TEMPERATURE, MAX_TEMPERATURE);

        self.materials[i] = material;
        self.mass[i] = if material == self.void_id {
            0.0
        } else {
            table.get(material).default_mass
        };
        self.temp_front[i] = temperature;
        self.temp_back.get_mut()[i] = temperature;

        let sy = y / SECTION_EDGE;
        if material != self.void_id {
            self.section_loaded[sy] = true;
        } else {
            // Clearing a cell may have emptied the section; rescan it.
            self.section_loaded[sy] = self.section_has_content(sy);
        }
    }

    /// Set every cell of section `sy` to the given material and
    /// temperature in both buffers, with mass from the material's
    /// default. Does nothing if `sy` is out of range.
    pub fn fill_section(
        &mut self,
        sy: usize,
        material: MaterialId,
        temperature: f32,
        table: &MaterialTable,
    ) {
        if sy >= SECTIONS_PER_CHUNK {
            return;
        }
        let temperature = temperature.clamp(MIN_TEMPERATURE, MAX_TEMPERATURE);
        let cell_mass = if material == self.void_id {
            0.0
        } else {
            table.get(material).default_mass
        };

        let back = self.temp_back.get_mut();
        for z in 0..CHUNK_SIZE_Z {
            for y in section_y_range(sy) {
                for x in 0..CHUNK_SIZE_X {
                    let i = cell_index(x, y, z);
                    self.materials[i] = material;
                    self.mass[i] = cell_mass;
                    self.temp_front[i] = temperature;
                    back[i] = temperature;
                }
            }
        }
        self.section_loaded[sy] = material != self.void_id;
    }

    /// Set a section's loaded flag explicitly. Does nothing if `sy` is
    /// out of range.
    pub fn mark_section_loaded(&mut self, sy: usize, loaded: bool) {
        if sy < SECTIONS_PER_CHUNK {
            self.section_loaded[sy] = loaded;
        }
    }

    /// Derive every section flag from the material array by full scan.
    pub fn recompute_section_loaded(&mut self) {
        for sy in 0..SECTIONS_PER_CHUNK {
            self.section_loaded[sy] = self.section_has_content(sy);
        }
    }

    pub fn is_section_loaded(&self, sy: usize) -> bool {
        sy < SECTIONS_PER_CHUNK && self.section_loaded[sy]
    }

    pub fn section_loaded(&self) -> &[bool; SECTIONS_PER_CHUNK] {
        &self.section_loaded
    }

    /// Per-section wall-clock costs of the previous tick, ms
    pub fn last_section_ms(&self) -> &[f64; SECTIONS_PER_CHUNK] {
        &self.last_section_ms
    }

    /// Total wall-clock cost of this chunk during the previous tick, ms
    pub fn last_chunk_ms(&self) -> f64 {
        self.last_chunk_ms
    }

    fn section_has_content(&self, sy: usize) -> bool {
        for z in 0..CHUNK_SIZE_Z {
            for y in section_y_range(sy) {
                for x in 0..CHUNK_SIZE_X {
                    if self.materials[cell_index(x, y, z)] != self.void_id {
                        return true;
                    }
                }
            }
        }
        false
    }

    /// Lock the back buffer for the compute phase. Only the simulation
    /// worker takes this lock outside the exclusive world guard.
    pub(crate) fn lock_back(&self) -> MutexGuard<'_, Vec<f32>> {
        self.temp_back.lock()
    }

    /// Swap front and back buffers in O(1). Callers must hold exclusive
    /// world access.
    pub(crate) fn swap_buffers(&mut self) {
        std::mem::swap(&mut self.temp_front, self.temp_back.get_mut());
    }

    /// Install the timing results of the tick that is being published.
    pub(crate) fn set_last_timings(
        &mut self,
        section_ms: [f64; SECTIONS_PER_CHUNK],
        chunk_ms: f64,
    ) {
        self.last_section_ms = section_ms;
        self.last_chunk_ms = chunk_ms;
    }

    #[cfg(test)]
    pub(crate) fn back_for_test(&self) -> Vec<f32> {
        self.temp_back.lock().clone()
    }
}
