use std::thread;
use std::time::Duration;

use anyhow::{bail, Context, Result};

use ember_engine::constants::chunk::{CHUNK_SIZE_X, CHUNK_SIZE_Z, SECTION_EDGE};
use ember_engine::{
    ChunkPos, Material, SimServer, StressConfig, StressController, World,
};

/// Section filled by the interactive demo world
const DEMO_SECTION: usize = 8;

#[derive(Debug, Default)]
struct CliArgs {
    stress: bool,
    headless: bool,
    seed: Option<u64>,
}

fn parse_args() -> Result<CliArgs> {
    let mut args = CliArgs::default();
    let mut iter = std::env::args().skip(1);
    while let Some(arg) = iter.next() {
        match arg.as_str() {
            "--stress" => args.stress = true,
            "--headless" => args.headless = true,
            "--seed" => {
                let value = iter.next().context("--seed requires a value")?;
                args.seed = Some(
                    value
                        .parse()
                        .with_context(|| format!("invalid --seed value '{value}'"))?,
                );
            }
            other => log::debug!("ignoring unknown flag '{other}'"),
        }
    }
    Ok(args)
}

/// One solid section at 300 K with a single 6000 K heater cell at its
/// center, so diffusion is visible from the very first tick.
fn demo_world() -> World {
    let mut world = World::new();
    let solid = world
        .materials_mut()
        .add(Material::new(500.0, 100.0, 1000.0, 0.0));

    let origin = ChunkPos::new(0, 0);
    world.fill_section(origin, DEMO_SECTION, solid, 300.0);
    world.set_cell(
        origin,
        CHUNK_SIZE_X / 2,
        DEMO_SECTION * SECTION_EDGE + SECTION_EDGE / 2,
        CHUNK_SIZE_Z / 2,
        solid,
        6000.0,
    );
    world
}

fn run_stress(seed: Option<u64>) -> Result<()> {
    let dt_seconds = 1.0;
    let mut server = SimServer::new(World::new(), dt_seconds as f32);
    server.start();

    let mut controller = StressController::new(
        server.handle(),
        StressConfig {
            seed,
            dt_seconds,
            ..StressConfig::default()
        },
    );
    let report = controller.run();
    log::info!(
        "stress run finished: {} chunks, {} sections, {:.3} ms frame",
        report.chunk_count,
        report.sections_loaded,
        report.world_frame_ms
    );

    server.stop();
    server.join();
    Ok(())
}

fn run_headless() -> ! {
    let mut server = SimServer::new(demo_world(), 1.0);
    server.start();
    log::info!("sim server running headless; press Ctrl+C to exit");
    loop {
        thread::sleep(Duration::from_secs(1));
        log::info!("frames={}", server.frames_simulated());
    }
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .format_timestamp_millis()
        .init();

    let args = parse_args()?;

    if !args.headless {
        // The heat-map renderer is a separate collaborator; this build
        // carries no display backend at all.
        bail!("display init failed: no renderer backend in this build (run with --headless)");
    }

    if args.stress {
        run_stress(args.seed)
    } else {
        run_headless()
    }
}
