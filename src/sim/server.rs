use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Duration;

use parking_lot::{Condvar, Mutex, RwLock};

use crate::world::World;

use super::frame::{compute_frame, publish_frame};

/// Bounded wait on the pause condvar before the worker rechecks flags
const PAUSE_WAIT: Duration = Duration::from_millis(5);

struct SimShared {
    world: RwLock<World>,
    running: AtomicBool,
    paused: AtomicBool,
    /// Nap after each tick, ms; 0 means yield instead of sleeping
    sleep_millis: AtomicU64,
    frames_simulated: AtomicU64,
    pause_mutex: Mutex<()>,
    pause_signal: Condvar,
}

/// Cheaply cloneable control surface over a running simulation.
///
/// Mutator and renderer threads hold one of these: mutators take the
/// world exclusively through [`SimHandle::with_world`], renderers
/// snapshot through [`SimHandle::with_world_read`] or the non-blocking
/// [`SimHandle::try_snapshot`].
#[derive(Clone)]
pub struct SimHandle {
    shared: Arc<SimShared>,
    dt_seconds: f32,
}

impl SimHandle {
    /// Simulated seconds advanced per tick
    pub fn dt_seconds(&self) -> f32 {
        self.dt_seconds
    }

    pub fn set_paused(&self, paused: bool) {
        self.shared.paused.store(paused, Ordering::SeqCst);
        if !paused {
            self.shared.pause_signal.notify_all();
        }
    }

    pub fn is_paused(&self) -> bool {
        self.shared.paused.load(Ordering::SeqCst)
    }

    /// Ticks completed so far. Relaxed counter, fine for display.
    pub fn frames_simulated(&self) -> u64 {
        self.shared.frames_simulated.load(Ordering::Relaxed)
    }

    pub fn set_sleep_millis(&self, millis: u64) {
        self.shared.sleep_millis.store(millis, Ordering::Relaxed);
    }

    pub fn sleep_millis(&self) -> u64 {
        self.shared.sleep_millis.load(Ordering::Relaxed)
    }

    /// Run one synchronous tick: compute under shared access, publish
    /// under exclusive access, bump the frame counter. Meant for tests
    /// and headless single-stepping; while the background worker is
    /// unpaused this interleaves extra ticks with its own.
    pub fn step_once(&self) {
        let timings = {
            let world = self.shared.world.read();
            compute_frame(&world, self.dt_seconds)
        };
        {
            let mut world = self.shared.world.write();
            publish_frame(&mut world, timings);
        }
        self.shared.frames_simulated.fetch_add(1, Ordering::Relaxed);
    }

    /// Exclusive world access for mutators. Edits made here are visible
    /// to the next compute phase that starts after the closure returns.
    pub fn with_world<R>(&self, f: impl FnOnce(&mut World) -> R) -> R {
        let mut world = self.shared.world.write();
        f(&mut world)
    }

    /// Shared world access for blocking snapshot readers.
    pub fn with_world_read<R>(&self, f: impl FnOnce(&World) -> R) -> R {
        let world = self.shared.world.read();
        f(&world)
    }

    /// Non-blocking snapshot: `None` while exclusive work (publish or a
    /// mutator) is in flight, in which case the renderer keeps drawing
    /// its previous frame.
    pub fn try_snapshot<R>(&self, f: impl FnOnce(&World) -> R) -> Option<R> {
        self.shared.world.try_read().map(|world| f(&world))
    }

    fn running(&self) -> bool {
        self.shared.running.load(Ordering::SeqCst)
    }
}

/// Owns the world and advances it on a background worker thread.
///
/// The worker loop: when paused, park on a condvar with a bounded wait;
/// otherwise compute a frame under shared world access, publish it under
/// exclusive access, count it, then nap `sleep_millis` for CPU pacing.
pub struct SimServer {
    handle: SimHandle,
    worker: Option<JoinHandle<()>>,
}

impl SimServer {
    pub fn new(world: World, dt_seconds: f32) -> Self {
        let shared = Arc::new(SimShared {
            world: RwLock::new(world),
            running: AtomicBool::new(false),
            paused: AtomicBool::new(false),
            sleep_millis: AtomicU64::new(1),
            frames_simulated: AtomicU64::new(0),
            pause_mutex: Mutex::new(()),
            pause_signal: Condvar::new(),
        });
        Self {
            handle: SimHandle { shared, dt_seconds },
            worker: None,
        }
    }

    /// A cloneable control handle for controller/renderer threads
    pub fn handle(&self) -> SimHandle {
        self.handle.clone()
    }

    /// Spawn the worker thread. No-op if it is already running.
    pub fn start(&mut self) {
        if self.handle.shared.running.swap(true, Ordering::SeqCst) {
            return;
        }
        let handle = self.handle.clone();
        let worker = thread::Builder::new()
            .name("sim-worker".into())
            .spawn(move || run_loop(handle))
            .expect("failed to spawn sim worker thread");
        self.worker = Some(worker);
        log::info!("sim server started (dt = {} s)", self.handle.dt_seconds);
    }

    /// Ask the worker to exit after its current tick. Idempotent.
    pub fn stop(&self) {
        self.handle.shared.running.store(false, Ordering::SeqCst);
        self.handle.shared.pause_signal.notify_all();
    }

    /// Wait for the worker thread to finish.
    pub fn join(&mut self) {
        if let Some(worker) = self.worker.take() {
            let _ = worker.join();
            log::info!("sim server stopped");
        }
    }

    pub fn dt_seconds(&self) -> f32 {
        self.handle.dt_seconds()
    }

    pub fn set_paused(&self, paused: bool) {
        self.handle.set_paused(paused);
    }

    pub fn is_paused(&self) -> bool {
        self.handle.is_paused()
    }

    pub fn frames_simulated(&self) -> u64 {
        self.handle.frames_simulated()
    }

    pub fn set_sleep_millis(&self, millis: u64) {
        self.handle.set_sleep_millis(millis);
    }

    /// See [`SimHandle::step_once`]
    pub fn step_once(&self) {
        self.handle.step_once();
    }

    /// See [`SimHandle::with_world`]
    pub fn with_world<R>(&self, f: impl FnOnce(&mut World) -> R) -> R {
        self.handle.with_world(f)
    }

    /// See [`SimHandle::with_world_read`]
    pub fn with_world_read<R>(&self, f: impl FnOnce(&World) -> R) -> R {
        self.handle.with_world_read(f)
    }

    /// See [`SimHandle::try_snapshot`]
    pub fn try_snapshot<R>(&self, f: impl FnOnce(&World) -> R) -> Option<R> {
        self.handle.try_snapshot(f)
    }
}

impl Drop for SimServer {
    fn drop(&mut self) {
        self.stop();
        self.join();
    }
}

fn run_loop(handle: SimHandle) {
    log::debug!("sim worker running");
    while handle.running() {
        if handle.is_paused() {
            let mut guard = handle.shared.pause_mutex.lock();
            let _ = handle.shared.pause_signal.wait_for(&mut guard, PAUSE_WAIT);
            continue;
        }

        handle.step_once();

        let millis = handle.sleep_millis();
        if millis > 0 {
            thread::sleep(Duration::from_millis(millis));
        } else {
            thread::yield_now();
        }
    }
    log::debug!("sim worker exiting");
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::material::Material;
    use crate::world::ChunkPos;

    fn seeded_server() -> SimServer {
        let mut world = World::new();
        let solid = world
            .materials_mut()
            .add(Material::new(500.0, 100.0, 1000.0, 0.0));
        world.fill_section(ChunkPos::new(0, 0), 8, solid, 300.0);
        SimServer::new(world, 1.0)
    }

    #[test]
    fn test_step_once_counts_frames() {
        let server = seeded_server();
        assert_eq!(server.frames_simulated(), 0);
        server.step_once();
        server.step_once();
        assert_eq!(server.frames_simulated(), 2);
    }

    #[test]
    fn test_mutations_survive_the_next_tick() {
        let server = seeded_server();
        let solid = crate::material::MaterialId(1);
        server.with_world(|world| {
            world.set_cell(ChunkPos::new(0, 0), 8, 136, 8, solid, 5000.0);
        });
        server.step_once();
        let temp = server.with_world_read(|world| {
            world.chunk(ChunkPos::new(0, 0)).unwrap().temperature(8, 136, 8)
        });
        // The heater conducted outward but its edit was not lost to a
        // stale back buffer.
        assert!(temp > 4000.0 && temp < 5000.0);
    }

    #[test]
    fn test_try_snapshot_succeeds_when_uncontended() {
        let server = seeded_server();
        let count = server.try_snapshot(|world| world.chunk_count());
        assert_eq!(count, Some(1));
    }

    #[test]
    fn test_stop_is_idempotent() {
        let mut server = seeded_server();
        server.start();
        server.stop();
        server.stop();
        server.join();
    }
}
