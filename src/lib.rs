//! Pluggable cellular automata on a toroidal grid.
//!
//! A [`World`] holds one state per cell and is bound to a [`RuleCatalog`]
//! mapping every state to the [`Rule`] computing its next state from its
//! eight [`Neighbours`]. Each [`World::tick`] advances every cell at once.
//!
//! ```
//! use std::sync::Arc;
//! use cellrs::{catalogs, pos, Pattern, World};
//!
//! let mut world = World::builder()
//!     .width(16)
//!     .height(16)
//!     .rules(Arc::new(catalogs::life()))
//!     .initial_state(catalogs::EMPTY)
//!     .init()?;
//! world.paint(&Pattern::parse(".l\n..l\nlll"), pos!(4, 4))?;
//! world.tick()?;
//! assert_eq!(world.population(catalogs::ALIVE), 5);
//! # Ok::<(), cellrs::Error>(())
//! ```

pub use utils::Pos;
mod utils;

pub use error::{Error, Result};
mod error;

pub use rules::{catalogs, Direction, Neighbours, Rule, RuleCatalog, State};
pub mod rules;

pub use storage::{FileStorage, Format, MemoryStorage, MemoryStore, Snapshot, Storage, StorageError};
pub mod storage;

pub use world::{Restored, World, WorldBuilder, WorldConfig, PARALLEL_THRESHOLD};
pub mod world;

pub use pattern::Pattern;
mod pattern;
