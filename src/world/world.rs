use std::collections::HashMap;

use crate::constants::chunk::{cell_index, CHUNK_SIZE_X, CHUNK_SIZE_Y, CHUNK_SIZE_Z};
use crate::material::{MaterialId, MaterialTable};
use crate::world::chunk::{Chunk, ChunkPos};

/// Result of resolving a cell's axis neighbor, possibly across a chunk
/// border. When `exists` is false the cell is outside the world (above
/// or below the column, or in a chunk that was never created) and the
/// returned material is the origin's void id, which callers must not
/// interpret.
#[derive(Debug, Clone, Copy)]
pub struct NeighborSample {
    /// Neighbor temperature read from its chunk's front buffer
    pub temperature: f32,
    /// Neighbor material index
    pub material: MaterialId,
    /// True iff the resolved cell exists in the world
    pub exists: bool,
}

/// Sparse, unbounded map of chunk columns plus the shared material table.
///
/// Chunks are created on demand and never removed; material entries are
/// append-only. Iteration order over the chunk map is unspecified;
/// callers needing determinism must sort.
pub struct World {
    chunks: HashMap<ChunkPos, Chunk>,
    materials: MaterialTable,
}

impl World {
    /// Empty world. The material table starts with the reserved void
    /// entry at index 0 so freshly zeroed chunks always reference a
    /// valid material.
    pub fn new() -> Self {
        Self {
            chunks: HashMap::new(),
            materials: MaterialTable::with_void(),
        }
    }

    /// Get the chunk at `pos`, creating a zero-initialized (all-void)
    /// one if absent. Idempotent.
    pub fn ensure_chunk(&mut self, pos: ChunkPos) -> &mut Chunk {
        self.chunks.entry(pos).or_insert_with(|| {
            log::debug!("creating chunk at {}", pos);
            Chunk::new(pos, MaterialId::VOID)
        })
    }

    pub fn chunk(&self, pos: ChunkPos) -> Option<&Chunk> {
        self.chunks.get(&pos)
    }

    pub fn chunk_mut(&mut self, pos: ChunkPos) -> Option<&mut Chunk> {
        self.chunks.get_mut(&pos)
    }

    /// All chunks, keyed by position (snapshot iteration surface)
    pub fn chunks(&self) -> &HashMap<ChunkPos, Chunk> {
        &self.chunks
    }

    pub fn materials(&self) -> &MaterialTable {
        &self.materials
    }

    pub fn materials_mut(&mut self) -> &mut MaterialTable {
        &mut self.materials
    }

    /// Fill one section of the chunk at `pos`, creating the chunk if it
    /// does not exist yet. See [`Chunk::fill_section`] for the cell
    /// semantics.
    pub fn fill_section(&mut self, pos: ChunkPos, sy: usize, material: MaterialId, temperature: f32) {
        let Self { chunks, materials } = self;
        let chunk = chunks.entry(pos).or_insert_with(|| {
            log::debug!("creating chunk at {}", pos);
            Chunk::new(pos, MaterialId::VOID)
        });
        chunk.fill_section(sy, material, temperature, materials);
    }

    /// Set a single cell of the chunk at `pos`, creating the chunk if it
    /// does not exist yet. See [`Chunk::set_cell`] for the dual-write
    /// contract.
    pub fn set_cell(
        &mut self,
        pos: ChunkPos,
        x: usize,
        y: usize,
        z: usize,
        material: MaterialId,
        temperature: f32,
    ) {
        let Self { chunks, materials } = self;
        let chunk = chunks.entry(pos).or_insert_with(|| {
            log::debug!("creating chunk at {}", pos);
            Chunk::new(pos, MaterialId::VOID)
        });
        chunk.set_cell(x, y, z, material, temperature, materials);
    }

    pub fn chunk_count(&self) -> usize {
        self.chunks.len()
    }

    /// Number of loaded sections across all chunks
    pub fn loaded_section_count(&self) -> usize {
        self.chunks
            .values()
            .map(|chunk| chunk.section_loaded().iter().filter(|&&s| s).count())
            .sum()
    }

    /// Sum of per-chunk wall-clock costs from the most recent tick, ms
    pub fn total_frame_ms(&self) -> f64 {
        self.chunks.values().map(|chunk| chunk.last_chunk_ms()).sum()
    }

    /// Rederive every chunk's section flags by full scan.
    pub fn recompute_all_sections(&mut self) {
        for chunk in self.chunks.values_mut() {
            chunk.recompute_section_loaded();
        }
    }

    /// Resolve the cell at `(x+dx, y+dy, z+dz)` relative to `origin`,
    /// crossing into the adjacent chunk on X/Z. Y never wraps: chunks
    /// are columns, so leaving `[0, CHUNK_SIZE_Y)` means no neighbor.
    /// The temperature always comes from the resolved chunk's front
    /// buffer, never the back buffer being written this tick.
    pub fn sample_neighbor(
        &self,
        origin: &Chunk,
        x: usize,
        y: usize,
        z: usize,
        dx: i32,
        dy: i32,
        dz: i32,
    ) -> NeighborSample {
        let missing = NeighborSample {
            temperature: 0.0,
            material: origin.void_id(),
            exists: false,
        };

        let ny = y as i32 + dy;
        if ny < 0 || ny >= CHUNK_SIZE_Y as i32 {
            return missing;
        }

        let nx = x as i32 + dx;
        let nz = z as i32 + dz;
        let mut pos = origin.position();
        let mut lx = nx;
        let mut lz = nz;

        if nx < 0 {
            pos.x -= 1;
            lx = CHUNK_SIZE_X as i32 - 1;
        } else if nx >= CHUNK_SIZE_X as i32 {
            pos.x += 1;
            lx = 0;
        }
        if nz < 0 {
            pos.z -= 1;
            lz = CHUNK_SIZE_Z as i32 - 1;
        } else if nz >= CHUNK_SIZE_Z as i32 {
            pos.z += 1;
            lz = 0;
        }

        let chunk = if pos == origin.position() {
            origin
        } else {
            match self.chunk(pos) {
                Some(chunk) => chunk,
                None => return missing,
            }
        };

        let i = cell_index(lx as usize, ny as usize, lz as usize);
        NeighborSample {
            temperature: chunk.front()[i],
            material: chunk.materials()[i],
            exists: true,
        }
    }
}

impl Default for World {
    fn default() -> Self {
        Self::new()
    }
}
