use std::time::Instant;

use rayon::prelude::*;

use crate::constants::chunk::SECTIONS_PER_CHUNK;
use crate::world::{Chunk, ChunkPos, World};

use super::conduction::simulate_section;

/// Wall-clock costs gathered for one chunk during a compute phase.
/// Installed on the chunk at publish time so snapshot readers never see
/// a half-written timing array.
pub struct ChunkTiming {
    pub position: ChunkPos,
    pub section_ms: [f64; SECTIONS_PER_CHUNK],
    pub chunk_ms: f64,
}

/// Compute phase: run the conduction kernel over every loaded section of
/// every chunk, writing back buffers only. Requires no exclusive world
/// access: chunk back buffers are disjoint and each is taken under its
/// own lock, while every temperature read goes to the unchanging front
/// buffers. Chunks are fanned out across the rayon pool.
pub fn compute_frame(world: &World, dt_seconds: f32) -> Vec<ChunkTiming> {
    let chunks: Vec<&Chunk> = world.chunks().values().collect();
    chunks
        .into_par_iter()
        .map(|chunk| compute_chunk(world, chunk, dt_seconds))
        .collect()
}

fn compute_chunk(world: &World, chunk: &Chunk, dt_seconds: f32) -> ChunkTiming {
    let mut timing = ChunkTiming {
        position: chunk.position(),
        section_ms: [0.0; SECTIONS_PER_CHUNK],
        chunk_ms: 0.0,
    };

    let mut back = chunk.lock_back();
    for sy in 0..SECTIONS_PER_CHUNK {
        if !chunk.is_section_loaded(sy) {
            continue;
        }
        let started = Instant::now();
        simulate_section(world, chunk, back.as_mut_slice(), sy, dt_seconds);
        let ms = started.elapsed().as_secs_f64() * 1000.0;
        timing.section_ms[sy] = ms;
        timing.chunk_ms += ms;
    }
    timing
}

/// Publish phase: under exclusive world access, swap every computed
/// chunk's front and back buffers (a handle exchange, O(1) per chunk)
/// and install its timing results. A chunk created after the compute
/// phase began carries identical buffers (mutators dual-write), so
/// skipping it is harmless.
pub fn publish_frame(world: &mut World, timings: Vec<ChunkTiming>) {
    for timing in timings {
        if let Some(chunk) = world.chunk_mut(timing.position) {
            chunk.swap_buffers();
            chunk.set_last_timings(timing.section_ms, timing.chunk_ms);
        }
    }
}

/// One full tick for callers that own the world directly:
/// compute, then publish.
pub fn step_frame(world: &mut World, dt_seconds: f32) {
    let timings = compute_frame(world, dt_seconds);
    publish_frame(world, timings);
}
