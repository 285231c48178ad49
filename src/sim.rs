use std::{
    sync::{mpsc, Arc},
    thread::{self, JoinHandle},
    time::{Duration, Instant},
};

use cellrs::{Pos, Restored, RuleCatalog, Snapshot, State, World};
use tracing::{error, info, warn};

/// What the view needs to draw one screen.
#[derive(Debug, Clone)]
pub struct Frame {
    pub name: Option<String>,
    pub cells: Snapshot,
    pub rules: Arc<RuleCatalog>,
    pub generation: u64,
    pub running: bool,
    pub interval: Duration,
    pub message: Option<String>,
}

impl Frame {
    pub fn width(&self) -> usize {
        self.cells.width()
    }

    pub fn height(&self) -> usize {
        self.cells.height()
    }

    /// reads wrap around like they do in the world.
    pub fn get(&self, pos: Pos) -> Option<State> {
        let x = pos.x.rem_euclid(self.width().max(1) as i32) as usize;
        let y = pos.y.rem_euclid(self.height().max(1) as i32) as usize;
        self.cells.get(x, y)
    }

    pub fn population(&self, state: State) -> usize {
        self.cells
            .columns()
            .iter()
            .flatten()
            .filter(|s| **s == state)
            .count()
    }
}

#[derive(Debug)]
pub enum SimCmd {
    Snapshot(mpsc::Sender<Frame>),
    Toggle,
    Step,
    Accelerate,
    Decelerate,
    Save,
    Restore,
    Clear,
    Exit,
}

#[derive(Debug, Clone)]
pub struct SimHandle {
    sender: mpsc::Sender<SimCmd>,
}

impl SimHandle {
    pub fn new(sender: mpsc::Sender<SimCmd>) -> Self {
        Self { sender }
    }

    /// `None` once the simulation thread is gone.
    pub fn snapshot(&self) -> Option<Frame> {
        let (sender, receiver) = mpsc::channel();
        self.sender.send(SimCmd::Snapshot(sender)).ok()?;
        receiver.recv().ok()
    }

    pub fn send(&self, cmd: SimCmd) -> bool {
        self.sender.send(cmd).is_ok()
    }
}

#[derive(Debug)]
pub struct Sim {
    thread: JoinHandle<()>,
    sender: mpsc::Sender<SimCmd>,
}

impl Sim {
    pub fn spawn(world: World, interval: Duration, running: bool) -> Self {
        let state = SimState {
            world,
            interval,
            running,
            message: None,
        };
        let (sender, receiver) = mpsc::channel();
        let thread = thread::spawn(move || sim_loop(receiver, state));
        Self { thread, sender }
    }

    pub fn handle(&self) -> SimHandle {
        SimHandle::new(self.sender.clone())
    }

    pub fn join(self) {
        drop(self.sender);
        if self.thread.join().is_err() {
            error!("simulation thread panicked");
        }
    }
}

const EVT_CHECK_TIMEOUT: Duration = Duration::from_millis(5);
const MIN_TICK_INTERVAL: Duration = Duration::from_millis(10);
const MAX_TICK_INTERVAL: Duration = Duration::from_secs(5);

struct SimState {
    world: World,
    interval: Duration,
    running: bool,
    message: Option<String>,
}

impl SimState {
    fn frame(&self) -> Frame {
        Frame {
            name: self.world.name().map(str::to_owned),
            cells: self.world.snapshot(),
            rules: self.world.rules().clone(),
            generation: self.world.generation(),
            running: self.running,
            interval: self.interval,
            message: self.message.clone(),
        }
    }

    fn tick(&mut self) {
        if let Err(error) = self.world.tick() {
            error!(%error, generation = self.world.generation(), "tick failed, pausing");
            self.message = Some(error.to_string());
            self.running = false;
        }
    }

    /// handles a command, `false` when the simulation must stop.
    fn handle(&mut self, cmd: SimCmd) -> bool {
        match cmd {
            SimCmd::Snapshot(sender) => {
                // the view may be gone already
                let _ = sender.send(self.frame());
            }
            SimCmd::Toggle => self.running = !self.running,
            SimCmd::Step => {
                self.running = false;
                self.tick();
            }
            SimCmd::Accelerate => self.interval = (self.interval / 2).max(MIN_TICK_INTERVAL),
            SimCmd::Decelerate => self.interval = (self.interval * 2).min(MAX_TICK_INTERVAL),
            SimCmd::Save => {
                self.message = Some(match self.world.save() {
                    Ok(()) => format!("saved generation {}", self.world.generation()),
                    Err(error) => error.to_string(),
                })
            }
            SimCmd::Restore => {
                self.message = Some(match self.world.restore() {
                    Ok(Restored::Applied) => "restored".to_string(),
                    Ok(Restored::Empty) => "nothing saved yet".to_string(),
                    Err(error) => error.to_string(),
                })
            }
            SimCmd::Clear => {
                self.world.clear();
                self.message = Some("cleared".to_string());
            }
            SimCmd::Exit => return false,
        }
        true
    }
}

fn sim_loop(receiver: mpsc::Receiver<SimCmd>, state: SimState) {
    let mut state = state;
    let mut last_update = Instant::now();
    info!(world = ?state.world, "simulation started");

    loop {
        loop {
            match receiver.try_recv() {
                Ok(cmd) => {
                    if !state.handle(cmd) {
                        info!(generation = state.world.generation(), "simulation stopped");
                        return;
                    }
                }
                Err(mpsc::TryRecvError::Empty) => break,
                Err(mpsc::TryRecvError::Disconnected) => {
                    warn!("every handle dropped, stopping the simulation");
                    return;
                }
            }
        }

        if state.running && last_update.elapsed() >= state.interval {
            state.tick();
            last_update = Instant::now();
        }

        thread::sleep(EVT_CHECK_TIMEOUT);
    }
}

#[cfg(test)]
mod tests {
    use cellrs::{catalogs, pos, MemoryStorage, MemoryStore, Pattern};

    use super::*;

    fn spawn() -> Sim {
        let mut world = World::builder()
            .name("blinker")
            .width(5)
            .height(5)
            .rules(Arc::new(catalogs::life()))
            .initial_state(catalogs::EMPTY)
            .storage(MemoryStorage::new(MemoryStore::new(), "sim"))
            .init()
            .unwrap();
        world.paint(&Pattern::parse(".lll"), pos!(0, 2)).unwrap();
        Sim::spawn(world, Duration::from_millis(100), false)
    }

    #[test]
    fn commands_drive_the_world() {
        let sim = spawn();
        let handle = sim.handle();

        let frame = handle.snapshot().unwrap();
        assert_eq!(frame.generation, 0);
        assert_eq!(frame.name.as_deref(), Some("blinker"));
        assert!(!frame.running);
        assert_eq!(frame.get(pos!(-4, 2)), Some(catalogs::ALIVE));

        assert!(handle.send(SimCmd::Save));
        assert!(handle.send(SimCmd::Step));
        let frame = handle.snapshot().unwrap();
        assert_eq!(frame.generation, 1);
        assert_eq!(frame.get(pos!(2, 1)), Some(catalogs::ALIVE));
        assert_eq!(frame.get(pos!(1, 2)), Some(catalogs::EMPTY));

        handle.send(SimCmd::Restore);
        let frame = handle.snapshot().unwrap();
        assert_eq!(frame.get(pos!(1, 2)), Some(catalogs::ALIVE));
        assert_eq!(frame.message.as_deref(), Some("restored"));

        handle.send(SimCmd::Accelerate);
        handle.send(SimCmd::Clear);
        let frame = handle.snapshot().unwrap();
        assert_eq!(frame.interval, Duration::from_millis(50));
        assert_eq!(frame.population(catalogs::ALIVE), 0);

        handle.send(SimCmd::Exit);
        sim.join();
        assert!(handle.snapshot().is_none());
    }
}
