//! Spiral stress growth: keep adding random-material sections (and, once
//! the current chunk fills up, whole chunks along a square spiral) until
//! a single frame's compute cost exceeds the real-time budget.

use std::fmt;
use std::io::{self, Write};
use std::thread;
use std::time::{Duration, Instant};

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::constants::stress::{
    CONDUCTIVITY_RANGE, GROW_SLEEP, HEAT_CAPACITY_RANGE, MASS_RANGE, MOLAR_MASS_RANGE,
    PROGRESS_BAR_CELLS, REPORT_INTERVAL, SEED_SECTION, TEMPERATURE_RANGE,
};
use crate::material::Material;
use crate::sim::SimHandle;
use crate::world::{Chunk, ChunkPos};

mod spiral;

pub use spiral::SpiralCursor;

/// Configuration for the stress growth controller
#[derive(Debug, Clone)]
pub struct StressConfig {
    /// RNG seed; `None` draws a nondeterministic one
    pub seed: Option<u64>,
    /// Real-time budget per tick: growth trips once the world's frame
    /// time exceeds `dt_seconds * 1000` ms
    pub dt_seconds: f64,
    /// Nap between growth iterations so the sim thread is not starved
    pub grow_sleep: Duration,
    /// Progress bar refresh interval
    pub report_interval: Duration,
    /// Draw the carriage-return progress bar and print the summary
    /// block on stdout (turn off for tests)
    pub console: bool,
}

impl Default for StressConfig {
    fn default() -> Self {
        Self {
            seed: None,
            dt_seconds: 1.0,
            grow_sleep: GROW_SLEEP,
            report_interval: REPORT_INTERVAL,
            console: true,
        }
    }
}

/// Final figures printed when the growth controller trips
#[derive(Debug, Clone)]
pub struct StressReport {
    pub seed: u64,
    pub target_dt_ms: f64,
    pub chunk_count: usize,
    pub sections_loaded: usize,
    pub world_frame_ms: f64,
    pub max_chunk_ms: f64,
    pub sum_chunk_ms: f64,
}

impl fmt::Display for StressReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "=== STRESS RESULT ===")?;
        writeln!(f, "seed:            {}", self.seed)?;
        writeln!(f, "target dt:       {:.3} ms", self.target_dt_ms)?;
        writeln!(f, "chunks:          {}", self.chunk_count)?;
        writeln!(f, "sections loaded: {}", self.sections_loaded)?;
        write!(
            f,
            "world frame:     {:.3} ms (max chunk {:.3} ms, sum {:.3} ms)",
            self.world_frame_ms, self.max_chunk_ms, self.sum_chunk_ms
        )
    }
}

/// Expands the world until the tick budget trips.
///
/// Each iteration samples the previous tick's total frame time under the
/// world lock. Under budget, it fills one uniformly random empty section
/// of the current chunk with a freshly minted random material, or, when
/// the chunk is full, advances the spiral and seeds the next chunk.
/// Over budget, it pauses the sim, reports, and stops growing for good.
/// Materials are intentionally never deduplicated: one material per
/// section produces a worst-case heterogeneous conductivity field and
/// exercises the append-only table at scale.
pub struct StressController {
    sim: SimHandle,
    config: StressConfig,
    rng: StdRng,
    seed: u64,
    spiral: SpiralCursor,
    cursor: ChunkPos,
    tripped: bool,
}

impl StressController {
    pub fn new(sim: SimHandle, config: StressConfig) -> Self {
        let seed = config.seed.unwrap_or_else(rand::random);
        Self {
            sim,
            config,
            rng: StdRng::seed_from_u64(seed),
            seed,
            spiral: SpiralCursor::new(),
            cursor: ChunkPos::new(0, 0),
            tripped: false,
        }
    }

    pub fn seed(&self) -> u64 {
        self.seed
    }

    /// True once a frame has exceeded the budget; growth is disabled
    /// permanently from that point on.
    pub fn tripped(&self) -> bool {
        self.tripped
    }

    /// Grow until the budget trips, then pause the sim and return the
    /// final report. The sim server must already be ticking; this
    /// thread only mutates and measures.
    pub fn run(&mut self) -> StressReport {
        log::info!(
            "stress growth starting (seed = {}, budget = {:.1} ms)",
            self.seed,
            self.config.dt_seconds * 1000.0
        );
        self.seed_origin();

        let budget_ms = self.config.dt_seconds * 1000.0;
        let mut last_report = Instant::now();
        let mut first_report = true;

        loop {
            let world_ms = self.sim.with_world_read(|world| world.total_frame_ms());

            if world_ms > budget_ms {
                return self.trip(world_ms, budget_ms);
            }

            if self.config.console
                && (first_report || last_report.elapsed() >= self.config.report_interval)
            {
                print_progress(world_ms, budget_ms);
                last_report = Instant::now();
                first_report = false;
            }

            self.grow_step();
            thread::sleep(self.config.grow_sleep);
        }
    }

    /// Make sure chunk (0,0) has at least one loaded section so there is
    /// something to diffuse from the first tick on. Skipped when the
    /// caller pre-seeded the world.
    fn seed_origin(&mut self) {
        let origin = self.cursor;
        let material = self.random_material();
        let temperature = self.rng.gen_range(TEMPERATURE_RANGE);
        self.sim.with_world(|world| {
            let chunk = world.ensure_chunk(origin);
            if chunk.section_loaded().iter().any(|&loaded| loaded) {
                return;
            }
            let id = world.materials_mut().add(material);
            world.fill_section(origin, SEED_SECTION, id, temperature);
        });
    }

    /// One growth iteration, skipping the budget check: fill a random
    /// empty section of the current chunk, or advance the spiral and
    /// seed the next chunk when the current one is full. [`Self::run`]
    /// loops this; it is public for callers that pace growth themselves.
    pub fn grow_step(&mut self) {
        let material = self.random_material();
        let temperature = self.rng.gen_range(TEMPERATURE_RANGE);
        let cursor = self.cursor;

        // Decide on a target section under the lock, then fill it there
        // too, so growth is one atomic edit per iteration.
        let Self {
            sim, rng, spiral, ..
        } = self;
        let new_cursor = sim.with_world(|world| {
            let chunk = world.ensure_chunk(cursor);
            match pick_empty_section(chunk, rng) {
                Some(sy) => {
                    let id = world.materials_mut().add(material);
                    world.fill_section(cursor, sy, id, temperature);
                    None
                }
                None => {
                    let next = spiral.advance();
                    world.ensure_chunk(next);
                    let id = world.materials_mut().add(material);
                    world.fill_section(next, SEED_SECTION, id, temperature);
                    log::info!("new chunk created at {}", next);
                    Some(next)
                }
            }
        });
        if let Some(next) = new_cursor {
            self.cursor = next;
        }
    }

    fn trip(&mut self, world_ms: f64, budget_ms: f64) -> StressReport {
        self.tripped = true;
        self.sim.set_paused(true);

        let (chunk_count, sections_loaded, max_chunk_ms, sum_chunk_ms) =
            self.sim.with_world_read(|world| {
                let max = world
                    .chunks()
                    .values()
                    .map(|chunk| chunk.last_chunk_ms())
                    .fold(0.0_f64, f64::max);
                (
                    world.chunk_count(),
                    world.loaded_section_count(),
                    max,
                    world.total_frame_ms(),
                )
            });

        let report = StressReport {
            seed: self.seed,
            target_dt_ms: budget_ms,
            chunk_count,
            sections_loaded,
            world_frame_ms: world_ms,
            max_chunk_ms,
            sum_chunk_ms,
        };

        if self.config.console {
            print_progress(world_ms, budget_ms);
            println!();
            println!("{report}");
        }
        log::info!(
            "stress growth tripped at {:.3} ms over a {:.3} ms budget ({} chunks, {} sections)",
            world_ms,
            budget_ms,
            chunk_count,
            sections_loaded
        );
        report
    }

    fn random_material(&mut self) -> Material {
        Material::new(
            self.rng.gen_range(HEAT_CAPACITY_RANGE),
            self.rng.gen_range(CONDUCTIVITY_RANGE),
            self.rng.gen_range(MASS_RANGE),
            self.rng.gen_range(MOLAR_MASS_RANGE),
        )
    }
}

/// Choose a uniformly random unloaded section of `chunk`, or `None`
/// when every section is loaded.
fn pick_empty_section(chunk: &Chunk, rng: &mut StdRng) -> Option<usize> {
    let empty: Vec<usize> = chunk
        .section_loaded()
        .iter()
        .enumerate()
        .filter(|(_, &loaded)| !loaded)
        .map(|(sy, _)| sy)
        .collect();
    if empty.is_empty() {
        None
    } else {
        Some(empty[rng.gen_range(0..empty.len())])
    }
}

/// Carriage-return progress bar: `[####    ] 534.21 / 1000.00 ms (53.4%)`
fn print_progress(world_ms: f64, budget_ms: f64) {
    let fraction = (world_ms / budget_ms).clamp(0.0, 1.0);
    let filled = (fraction * PROGRESS_BAR_CELLS as f64) as usize;
    let bar: String = std::iter::repeat('#')
        .take(filled)
        .chain(std::iter::repeat(' ').take(PROGRESS_BAR_CELLS - filled))
        .collect();
    print!(
        "\r[{bar}] {:.2} / {:.2} ms ({:.1}%)",
        world_ms,
        budget_ms,
        fraction * 100.0
    );
    let _ = io::stdout().flush();
}
