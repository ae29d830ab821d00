//! Sparse chunked world: 16x384x16 columns of cells, 24 sections each.

mod chunk;
mod world;

pub use chunk::{section_y_range, Chunk, ChunkPos};
pub use world::{NeighborSample, World};
