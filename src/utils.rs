use std::ops::{Add, Sub};

#[derive(Debug, PartialEq, Eq, Hash, Clone, Copy, Default)]
pub struct Pos {
    pub x: i32,
    pub y: i32,
}

#[macro_export]
macro_rules! pos {
    ($x:expr, $y:expr) => {
        $crate::Pos { x: $x, y: $y }
    };
}

impl Add for Pos {
    type Output = Self;
    fn add(self, rhs: Self) -> Self::Output {
        pos!(self.x + rhs.x, self.y + rhs.y)
    }
}

impl Sub for Pos {
    type Output = Self;
    fn sub(self, rhs: Self) -> Self::Output {
        pos!(self.x - rhs.x, self.y - rhs.y)
    }
}

/// maps any coordinate onto `0..dim`, negative values land on the far edge.
pub fn wrap(n: i32, dim: usize) -> usize {
    let dim = dim as i64;
    (((n as i64 % dim) + dim) % dim) as usize
}

#[test]
fn test_wrap() {
    assert_eq!(wrap(0, 3), 0);
    assert_eq!(wrap(2, 3), 2);
    assert_eq!(wrap(3, 3), 0);
    assert_eq!(wrap(-1, 3), 2);
    assert_eq!(wrap(-3, 3), 0);
    assert_eq!(wrap(-4, 3), 2);
    assert_eq!(wrap(i32::MIN, 7), wrap(i32::MIN % 7, 7));
    assert_eq!(wrap(5, 1), 0);
}

#[test]
fn test_pos_ops() {
    assert_eq!(pos!(1, 2) + pos!(-3, 4), pos!(-2, 6));
    assert_eq!(pos!(1, 2) - pos!(1, 2), Pos::default());
}
