use std::str::FromStr;

use crate::{pos, Pos, State};

/// States placed relative to a top left corner, read from text.
///
/// Each line is a row and each character a cell: `.` and spaces are left
/// alone, any other character is the symbol of the state placed there.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Pattern {
    cells: Vec<(Pos, State)>,
}

impl Pattern {
    pub fn parse(text: &str) -> Self {
        let mut cells = vec![];
        let mut pos = pos!(0, 0);
        for c in text.chars() {
            match c {
                '\n' => pos = pos!(0, pos.y + 1),
                '\r' => (),
                '.' | ' ' => pos.x += 1,
                c => {
                    cells.push((pos, State::new(c)));
                    pos.x += 1
                }
            }
        }
        Self { cells }
    }

    pub fn cells(&self) -> &[(Pos, State)] {
        &self.cells
    }

    pub fn states(&self) -> impl Iterator<Item = State> + '_ {
        self.cells.iter().map(|(_, state)| *state)
    }

    /// size of the smallest box holding every placed cell.
    pub fn size(&self) -> (usize, usize) {
        let width = self.cells.iter().map(|(p, _)| p.x + 1).max().unwrap_or(0);
        let height = self.cells.iter().map(|(p, _)| p.y + 1).max().unwrap_or(0);
        (width as usize, height as usize)
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }
}

impl FromStr for Pattern {
    type Err = std::convert::Infallible;

    fn from_str(text: &str) -> Result<Self, Self::Err> {
        Ok(Self::parse(text))
    }
}

#[test]
fn test_parse() {
    let pattern = Pattern::parse(".l.\r\n..l\nlll\n");
    let l = State::new('l');
    assert_eq!(
        pattern.cells(),
        &[
            (pos!(1, 0), l),
            (pos!(2, 1), l),
            (pos!(0, 2), l),
            (pos!(1, 2), l),
            (pos!(2, 2), l),
        ]
    );
    assert_eq!(pattern.size(), (3, 3));
}

#[test]
fn test_mixed_states() {
    let pattern: Pattern = " hcc\nt  c".parse().unwrap();
    let symbols: String = pattern.states().map(|s| s.symbol()).collect();
    assert_eq!(symbols, "hcctc");
    assert_eq!(pattern.size(), (4, 2));
    assert!(Pattern::parse("..\n  \n").is_empty());
}
