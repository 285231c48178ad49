use thiserror::Error;

use crate::{storage::StorageError, State};

pub type Result<T, E = Error> = std::result::Result<T, E>;

#[derive(Debug, Error)]
pub enum Error {
    /// A cell, a write or a rule result carries a state the bound catalog has no rule for.
    #[error("state `{state}` has no rule in catalog `{catalog}`")]
    UnknownState { state: State, catalog: String },

    #[error("({x}, {y}) is outside of the {width}x{height} world")]
    OutOfBounds {
        x: i32,
        y: i32,
        width: usize,
        height: usize,
    },

    #[error("invalid configuration: {0}")]
    Configuration(String),

    #[error("invalid rulestring `{0}`")]
    InvalidRulestring(String),

    /// The snapshot could not be applied, the world was left untouched.
    #[error("restore failed: {0}")]
    Restore(String),

    #[error(transparent)]
    Storage(#[from] StorageError),
}

impl Error {
    pub(crate) fn config(message: impl Into<String>) -> Self {
        Self::Configuration(message.into())
    }
}
