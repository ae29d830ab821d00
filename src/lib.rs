//! Ember Engine: voxel-grid thermal diffusion over a sparse chunked world.
//!
//! The world is an unbounded map of 16x384x16 chunk columns, each split
//! into 24 stacked 16^3 sections. Cells carry a material index, a
//! temperature in Kelvin and a mass in kilograms. Every tick advances
//! the temperature field by one explicit finite-difference conduction
//! step over the 6-neighbor stencil, crossing chunk borders on X/Z.
//!
//! # Architecture Overview
//!
//! - **Materials**: append-only registry of physical constants, indexed
//!   by 16-bit id (`material`)
//! - **World**: sparse chunk map with cross-chunk neighbor sampling
//!   (`world`)
//! - **Simulation**: conduction kernel, double-buffered frame protocol,
//!   background sim server (`sim`)
//! - **Stress**: spiral growth controller that expands the world until
//!   one frame blows the real-time budget (`stress`)
//!
//! Three thread roles share the world: the simulation worker computes
//! into back buffers under shared access and publishes with an O(1)
//! swap under exclusive access; mutators edit cells (both buffers)
//! under exclusive access; renderers snapshot front buffers under
//! shared access, falling back to a stale frame when a try-lock misses.

pub mod constants;
pub mod material;
pub mod sim;
pub mod stress;
pub mod world;

pub use material::{Material, MaterialId, MaterialTable};
pub use sim::{compute_frame, publish_frame, step_frame, ChunkTiming, SimHandle, SimServer};
pub use stress::{SpiralCursor, StressConfig, StressController, StressReport};
pub use world::{section_y_range, Chunk, ChunkPos, NeighborSample, World};
