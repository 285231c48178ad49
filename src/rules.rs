use std::{collections::HashMap, fmt, sync::Arc};

use metrohash::MetroBuildHasher;
use serde::{Deserialize, Serialize};

use crate::{pos, Error, Pos, Result};

/// Opaque symbol identifying the condition of a cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct State(char);

impl State {
    pub const fn new(symbol: char) -> Self {
        Self(symbol)
    }

    pub fn symbol(&self) -> char {
        self.0
    }
}

impl From<char> for State {
    fn from(symbol: char) -> Self {
        Self(symbol)
    }
}

impl fmt::Display for State {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// The eight neighbour directions, in the order [`Neighbours`] stores them.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    N,
    NE,
    E,
    SE,
    S,
    SW,
    W,
    NW,
}

impl Direction {
    pub const ALL: [Direction; 8] = [
        Direction::N,
        Direction::NE,
        Direction::E,
        Direction::SE,
        Direction::S,
        Direction::SW,
        Direction::W,
        Direction::NW,
    ];

    /// offset of the neighbour, `y` grows southwards.
    pub fn offset(self) -> Pos {
        match self {
            Direction::N => pos!(0, -1),
            Direction::NE => pos!(1, -1),
            Direction::E => pos!(1, 0),
            Direction::SE => pos!(1, 1),
            Direction::S => pos!(0, 1),
            Direction::SW => pos!(-1, 1),
            Direction::W => pos!(-1, 0),
            Direction::NW => pos!(-1, -1),
        }
    }
}

/// States of the eight cells around a cell, ordered N, NE, E, SE, S, SW, W, NW.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Neighbours([State; 8]);

impl Neighbours {
    pub fn new(states: [State; 8]) -> Self {
        Self(states)
    }

    pub fn get(&self, direction: Direction) -> State {
        self.0[direction as usize]
    }

    pub fn count(&self, state: State) -> usize {
        self.0.iter().filter(|s| **s == state).count()
    }

    pub fn iter(&self) -> impl Iterator<Item = State> + '_ {
        self.0.iter().copied()
    }

    pub fn as_array(&self) -> &[State; 8] {
        &self.0
    }
}

pub type Transition = Arc<dyn Fn(&Neighbours) -> State + Send + Sync>;

/// How one state evolves, plus the metadata a renderer needs to draw it.
#[derive(Clone)]
pub struct Rule {
    name: String,
    color: String,
    text_color: String,
    transition: Transition,
}

impl Rule {
    pub fn new(
        name: impl Into<String>,
        color: impl Into<String>,
        text_color: impl Into<String>,
        transition: impl Fn(&Neighbours) -> State + Send + Sync + 'static,
    ) -> Self {
        Self {
            name: name.into(),
            color: color.into(),
            text_color: text_color.into(),
            transition: Arc::new(transition),
        }
    }

    /// a rule that always yields the same state regardless of the neighbourhood.
    pub fn constant(
        name: impl Into<String>,
        color: impl Into<String>,
        text_color: impl Into<String>,
        next: State,
    ) -> Self {
        Self::new(name, color, text_color, move |_| next)
    }

    pub fn next(&self, neighbours: &Neighbours) -> State {
        (self.transition)(neighbours)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn color(&self) -> &str {
        &self.color
    }

    pub fn text_color(&self) -> &str {
        &self.text_color
    }
}

impl fmt::Debug for Rule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Rule")
            .field("name", &self.name)
            .field("color", &self.color)
            .field("text_color", &self.text_color)
            .finish_non_exhaustive()
    }
}

/// Closed mapping from every legal state of an automaton family to its rule.
#[derive(Debug, Clone)]
pub struct RuleCatalog {
    name: String,
    rules: HashMap<State, Rule, MetroBuildHasher>,
}

impl RuleCatalog {
    pub fn new(name: impl Into<String>, rules: impl IntoIterator<Item = (State, Rule)>) -> Self {
        Self {
            name: name.into(),
            rules: rules.into_iter().collect(),
        }
    }

    pub fn get(&self, state: State) -> Result<&Rule> {
        self.rules.get(&state).ok_or_else(|| self.unknown(state))
    }

    pub fn contains(&self, state: State) -> bool {
        self.rules.contains_key(&state)
    }

    /// states of the catalog, sorted by symbol.
    pub fn states(&self) -> Vec<State> {
        let mut states: Vec<_> = self.rules.keys().copied().collect();
        states.sort();
        states
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    pub(crate) fn unknown(&self, state: State) -> Error {
        Error::UnknownState {
            state,
            catalog: self.name.clone(),
        }
    }
}

pub mod catalogs;
