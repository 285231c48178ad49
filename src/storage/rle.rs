//! Compact run-length text encoding of snapshots.
//!
//! Columns are separated by `/`, each column is a list of runs written as an
//! optional count followed by the state symbol: `3e2l/e2le`.
//! Symbols can therefore not be ascii digits, `/` or whitespace.

use thiserror::Error;

use super::Snapshot;
use crate::State;

const COLUMN_SEPARATOR: char = '/';
const MAX_COLUMN_LEN: usize = 1 << 20;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum CodecError {
    #[error("empty payload")]
    Empty,
    #[error("symbol `{0}` can not be run-length encoded")]
    ReservedSymbol(char),
    #[error("run count at column {column} is not followed by a symbol")]
    DanglingCount { column: usize },
    #[error("invalid run count at column {column}")]
    InvalidCount { column: usize },
    #[error("column {column} is longer than {} cells", MAX_COLUMN_LEN)]
    TooLong { column: usize },
    #[error("column {column} has {found} cells, expected {expected}")]
    Ragged {
        column: usize,
        found: usize,
        expected: usize,
    },
}

fn is_reserved(symbol: char) -> bool {
    symbol.is_ascii_digit() || symbol == COLUMN_SEPARATOR || symbol.is_whitespace()
}

pub fn encode(snapshot: &Snapshot) -> Result<String, CodecError> {
    let mut result = String::new();
    for (index, column) in snapshot.columns().iter().enumerate() {
        if index > 0 {
            result.push(COLUMN_SEPARATOR);
        }
        let mut runs = column.iter().peekable();
        while let Some(&state) = runs.next() {
            let symbol = state.symbol();
            if is_reserved(symbol) {
                return Err(CodecError::ReservedSymbol(symbol));
            }
            let mut count = 1;
            while runs.next_if(|next| **next == state).is_some() {
                count += 1;
            }
            if count > 1 {
                result += &count.to_string();
            }
            result.push(symbol);
        }
    }
    Ok(result)
}

pub fn decode(payload: &str) -> Result<Snapshot, CodecError> {
    let payload = payload.trim();
    if payload.is_empty() {
        return Err(CodecError::Empty);
    }

    let mut columns = Vec::new();
    for (column, encoded) in payload.split(COLUMN_SEPARATOR).enumerate() {
        let mut cells = Vec::new();
        let mut count = String::new();
        for c in encoded.chars() {
            if c.is_ascii_digit() {
                count.push(c);
                continue;
            }
            if is_reserved(c) {
                return Err(CodecError::ReservedSymbol(c));
            }
            let run = if count.is_empty() {
                1
            } else {
                match count.parse::<usize>() {
                    Ok(run) if run > 0 => run,
                    _ => return Err(CodecError::InvalidCount { column }),
                }
            };
            count.clear();
            if run > MAX_COLUMN_LEN - cells.len() {
                return Err(CodecError::TooLong { column });
            }
            cells.extend(std::iter::repeat(State::new(c)).take(run));
        }
        if !count.is_empty() {
            return Err(CodecError::DanglingCount { column });
        }
        if let Some(first) = columns.first().map(Vec::len) {
            if cells.len() != first {
                return Err(CodecError::Ragged {
                    column,
                    found: cells.len(),
                    expected: first,
                });
            }
        }
        columns.push(cells);
    }
    Ok(Snapshot::new(columns))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn encodes_runs() {
        let [e, l] = ['e', 'l'].map(State::new);
        let snapshot = Snapshot::new(vec![vec![e, e, e, l, l], vec![e, l, l, e, e]]);
        let encoded = encode(&snapshot).unwrap();
        assert_eq!(encoded, "3e2l/e2l2e");
        assert_eq!(decode(&encoded).unwrap(), snapshot);
    }

    #[test]
    fn long_runs_stay_compact() {
        let column = vec![State::new('e'); 200];
        let snapshot = Snapshot::new(vec![column; 200]);
        let encoded = encode(&snapshot).unwrap();
        assert!(encoded.len() < 1000);
        assert_eq!(decode(&encoded).unwrap(), snapshot);
    }

    #[test]
    fn rejects_reserved_symbols() {
        let snapshot = Snapshot::new(vec![vec![State::new('7')]]);
        assert_eq!(encode(&snapshot), Err(CodecError::ReservedSymbol('7')));
    }

    #[test]
    fn rejects_malformed_payloads() {
        assert_eq!(decode("  "), Err(CodecError::Empty));
        assert_eq!(decode("3e2"), Err(CodecError::DanglingCount { column: 0 }));
        assert_eq!(decode("e/0e"), Err(CodecError::InvalidCount { column: 1 }));
        assert_eq!(decode("e e"), Err(CodecError::ReservedSymbol(' ')));
        assert_eq!(decode("99999999e"), Err(CodecError::TooLong { column: 0 }));
        assert_eq!(
            decode("2e/3e"),
            Err(CodecError::Ragged {
                column: 1,
                found: 3,
                expected: 2
            })
        );
    }
}
