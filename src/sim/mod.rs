//! Simulation core: conduction kernel, double-buffered frame protocol,
//! and the background simulation server.
//!
//! A tick has two phases. Compute reads front temperature buffers only
//! (the origin chunk's and its neighbors') and writes back buffers only;
//! it needs no exclusive access to the world. Publish swaps every
//! chunk's front and back handles in O(1) under exclusive access. That
//! swap is the linearization point at which a tick becomes visible.

mod conduction;
mod frame;
mod server;

pub use frame::{compute_frame, publish_frame, step_frame, ChunkTiming};
pub use server::{SimHandle, SimServer};
