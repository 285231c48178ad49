use std::{fmt, sync::Arc};

use rayon::prelude::*;
use tracing::{debug, info, warn};

use crate::{
    pos, utils::wrap, Direction, Error, Neighbours, Pattern, Pos, Result, RuleCatalog, Snapshot,
    State, Storage,
};

/// Worlds with at least that many cells evaluate their columns in parallel.
pub const PARALLEL_THRESHOLD: usize = 64 * 64;

/// Everything needed to allocate a world, validated as a whole by [`World::new`].
pub struct WorldConfig {
    /// label shown by drivers, worlds are anonymous without it.
    pub name: Option<String>,
    pub width: usize,
    pub height: usize,
    pub rules: Arc<RuleCatalog>,
    pub initial_state: State,
    pub storage: Option<Box<dyn Storage>>,
}

/// Outcome of a successful [`World::restore`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Restored {
    Applied,
    /// the storage had nothing saved, the world is unchanged.
    Empty,
}

/// A toroidal grid of states, advanced one generation at a time by its rule catalog.
///
/// Reads wrap around both axes, writes through [`World::update`] are bounds-checked.
pub struct World {
    name: Option<String>,
    width: usize,
    height: usize,
    cells: Vec<Vec<State>>,
    rules: Arc<RuleCatalog>,
    initial_state: State,
    storage: Option<Box<dyn Storage>>,
    generation: u64,
}

impl World {
    pub fn new(config: WorldConfig) -> Result<Self> {
        let WorldConfig {
            name,
            width,
            height,
            rules,
            initial_state,
            storage,
        } = config;

        if width == 0 || height == 0 {
            return Err(Error::config(format!(
                "dimensions must be positive, got {width}x{height}"
            )));
        }
        if width > i32::MAX as usize || height > i32::MAX as usize {
            return Err(Error::config(format!("{width}x{height} is too large")));
        }
        if !rules.contains(initial_state) {
            return Err(rules.unknown(initial_state));
        }

        debug!(?name, width, height, rules = rules.name(), %initial_state, "allocating world");
        Ok(Self {
            name,
            cells: vec![vec![initial_state; height]; width],
            width,
            height,
            rules,
            initial_state,
            storage,
            generation: 0,
        })
    }

    pub fn builder() -> WorldBuilder {
        WorldBuilder::default()
    }

    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn rules(&self) -> &Arc<RuleCatalog> {
        &self.rules
    }

    pub fn initial_state(&self) -> State {
        self.initial_state
    }

    /// number of ticks since creation or the last clear.
    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn get(&self, x: i32, y: i32) -> State {
        self.torus().get(x, y)
    }

    pub fn wrap(&self, pos: Pos) -> Pos {
        pos!(
            wrap(pos.x, self.width) as i32,
            wrap(pos.y, self.height) as i32
        )
    }

    pub fn update(&mut self, x: i32, y: i32, state: State) -> Result<()> {
        let (col, row) = self.index(x, y)?;
        if !self.rules.contains(state) {
            return Err(self.rules.unknown(state));
        }
        self.cells[col][row] = state;
        Ok(())
    }

    /// the 8 neighbours of a cell, ordered N, NE, E, SE, S, SW, W, NW.
    pub fn neighbours(&self, x: i32, y: i32) -> Neighbours {
        self.torus().neighbours(x, y)
    }

    /// Advances the world by one generation.
    ///
    /// Every next state is computed from the current cells into a fresh buffer
    /// that replaces them once complete, on error the world is left untouched.
    pub fn tick(&mut self) -> Result<()> {
        let torus = self.torus();
        let rules = self.rules.as_ref();
        let next = if self.width * self.height >= PARALLEL_THRESHOLD {
            (0..self.width)
                .into_par_iter()
                .map(|x| torus.next_column(rules, x))
                .collect::<Result<Vec<_>>>()?
        } else {
            (0..self.width)
                .map(|x| torus.next_column(rules, x))
                .collect::<Result<Vec<_>>>()?
        };
        self.cells = next;
        self.generation += 1;
        debug!(generation = self.generation, "ticked");
        Ok(())
    }

    pub fn tick_n(&mut self, count: usize) -> Result<()> {
        for _ in 0..count {
            self.tick()?;
        }
        Ok(())
    }

    pub fn clear(&mut self) {
        for column in self.cells.iter_mut() {
            column.fill(self.initial_state);
        }
        self.generation = 0;
    }

    pub fn population(&self, state: State) -> usize {
        self.cells
            .iter()
            .map(|column| column.iter().filter(|s| **s == state).count())
            .sum()
    }

    pub fn snapshot(&self) -> Snapshot {
        Snapshot::new(self.cells.clone())
    }

    /// Replaces every cell from a snapshot of the same shape holding only known states.
    pub fn load(&mut self, snapshot: Snapshot) -> Result<()> {
        if snapshot.width() != self.width
            || snapshot.columns().iter().any(|c| c.len() != self.height)
        {
            return Err(Error::Restore(format!(
                "snapshot does not match the {}x{} world",
                self.width, self.height
            )));
        }
        let unknown = snapshot
            .columns()
            .iter()
            .flatten()
            .find(|state| !self.rules.contains(**state));
        if let Some(state) = unknown {
            return Err(Error::Restore(format!(
                "state `{state}` has no rule in catalog `{}`",
                self.rules.name()
            )));
        }
        self.cells = snapshot.into_columns();
        Ok(())
    }

    /// Paints a pattern with its top left corner at `origin`, wrapping around the edges.
    pub fn paint(&mut self, pattern: &Pattern, origin: Pos) -> Result<()> {
        if let Some(state) = pattern.states().find(|s| !self.rules.contains(*s)) {
            return Err(self.rules.unknown(state));
        }
        for &(pos, state) in pattern.cells() {
            let Pos { x, y } = self.wrap(origin + pos);
            self.update(x, y, state)?;
        }
        Ok(())
    }

    pub fn save(&mut self) -> Result<()> {
        let snapshot = self.snapshot();
        self.storage_mut()?.save(&snapshot)?;
        info!(generation = self.generation, "world saved");
        Ok(())
    }

    pub fn restore(&mut self) -> Result<Restored> {
        let restored = self.storage()?.restore().map_err(|error| {
            warn!(%error, "could not read the saved world");
            Error::Restore(error.to_string())
        })?;
        let Some(snapshot) = restored else {
            info!("no saved world to restore");
            return Ok(Restored::Empty);
        };
        if let Err(error) = self.load(snapshot) {
            warn!(%error, "rejected the saved world");
            return Err(error);
        }
        info!("world restored");
        Ok(Restored::Applied)
    }

    /// Removes the saved snapshot from the bound storage.
    pub fn forget(&mut self) -> Result<()> {
        self.storage_mut()?.clear()?;
        Ok(())
    }

    fn storage(&self) -> Result<&dyn Storage> {
        self.storage
            .as_deref()
            .ok_or_else(|| Error::config("no storage bound to the world"))
    }

    fn storage_mut(&mut self) -> Result<&mut (dyn Storage + 'static)> {
        self.storage
            .as_deref_mut()
            .ok_or_else(|| Error::config("no storage bound to the world"))
    }

    fn torus(&self) -> Torus<'_> {
        Torus {
            cells: &self.cells,
            width: self.width,
            height: self.height,
        }
    }

    fn index(&self, x: i32, y: i32) -> Result<(usize, usize)> {
        let inside = |n: i32, dim: usize| usize::try_from(n).ok().filter(|n| *n < dim);
        match (inside(x, self.width), inside(y, self.height)) {
            (Some(col), Some(row)) => Ok((col, row)),
            _ => Err(Error::OutOfBounds {
                x,
                y,
                width: self.width,
                height: self.height,
            }),
        }
    }
}

/// Read-only wrapped view over a generation, shared by the workers of a tick.
#[derive(Clone, Copy)]
struct Torus<'a> {
    cells: &'a [Vec<State>],
    width: usize,
    height: usize,
}

impl Torus<'_> {
    fn get(&self, x: i32, y: i32) -> State {
        self.cells[wrap(x, self.width)][wrap(y, self.height)]
    }

    fn neighbours(&self, x: i32, y: i32) -> Neighbours {
        // wrapped first so that the offsets can not overflow
        let (x, y) = (wrap(x, self.width) as i32, wrap(y, self.height) as i32);
        Neighbours::new(Direction::ALL.map(|direction| {
            let offset = direction.offset();
            self.get(x + offset.x, y + offset.y)
        }))
    }

    fn next_column(&self, rules: &RuleCatalog, x: usize) -> Result<Vec<State>> {
        self.cells[x]
            .iter()
            .enumerate()
            .map(|(y, &state)| {
                let next = rules.get(state)?.next(&self.neighbours(x as i32, y as i32));
                if !rules.contains(next) {
                    return Err(rules.unknown(next));
                }
                Ok(next)
            })
            .collect()
    }
}

impl fmt::Debug for World {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("World")
            .field("name", &self.name)
            .field("width", &self.width)
            .field("height", &self.height)
            .field("rules", &self.rules.name())
            .field("initial_state", &self.initial_state)
            .field("generation", &self.generation)
            .field("storage", &self.storage.is_some())
            .finish()
    }
}

pub use builder::WorldBuilder;
mod builder;
