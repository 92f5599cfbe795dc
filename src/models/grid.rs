use serde::{Deserialize, Serialize};

use crate::utils::letters::normalize_word;

/// Side length of every puzzle grid
pub const GRID_SIZE: usize = 12;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, Hash, Eq, PartialEq)]
pub struct Position {
    pub row: usize,
    pub col: usize,
}

impl Position {
    pub fn new(row: usize, col: usize) -> Self {
        Self { row, col }
    }

    /// Whether the position lies inside a square grid of the given size
    pub fn in_bounds(&self, size: usize) -> bool {
        self.row < size && self.col < size
    }

    /// Step `distance` cells from this position along an orientation.
    /// Returns `None` when the step would leave the grid.
    pub fn step(&self, orientation: Orientation, distance: usize, size: usize) -> Option<Position> {
        let (dr, dc) = orientation.delta();
        let row = self.row as isize + dr * distance as isize;
        let col = self.col as isize + dc * distance as isize;

        if row < 0 || col < 0 {
            return None;
        }

        let pos = Position::new(row as usize, col as usize);
        pos.in_bounds(size).then_some(pos)
    }
}

/// Direction along which a word is laid out.
///
/// Horizontal, vertical and the main diagonal, each in both directions.
/// The anti-diagonal is not used.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, Hash, Eq, PartialEq)]
#[serde(rename_all = "snake_case")]
pub enum Orientation {
    Right,
    Down,
    DownRight,
    Left,
    Up,
    UpLeft,
}

impl Orientation {
    pub const ALL: [Orientation; 6] = [
        Orientation::Right,
        Orientation::Down,
        Orientation::DownRight,
        Orientation::Left,
        Orientation::Up,
        Orientation::UpLeft,
    ];

    /// Unit step as `(row delta, column delta)`
    pub fn delta(self) -> (isize, isize) {
        match self {
            Orientation::Right => (0, 1),
            Orientation::Down => (1, 0),
            Orientation::DownRight => (1, 1),
            Orientation::Left => (0, -1),
            Orientation::Up => (-1, 0),
            Orientation::UpLeft => (-1, -1),
        }
    }
}

/// Square matrix of uppercase letters.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(transparent)]
pub struct Grid {
    cells: Vec<Vec<char>>,
}

impl Grid {
    /// Build a grid from rows. Every row must be as long as there are rows.
    pub fn from_rows(cells: Vec<Vec<char>>) -> Option<Self> {
        let size = cells.len();
        cells
            .iter()
            .all(|row| row.len() == size)
            .then_some(Self { cells })
    }

    /// Wrap rows already known to form a square
    pub(crate) fn from_square(cells: Vec<Vec<char>>) -> Self {
        Self { cells }
    }

    pub fn size(&self) -> usize {
        self.cells.len()
    }

    pub fn rows(&self) -> &[Vec<char>] {
        &self.cells
    }

    pub fn letter_at(&self, pos: Position) -> Option<char> {
        self.cells.get(pos.row).and_then(|row| row.get(pos.col)).copied()
    }

    /// Read `len` letters starting at `start` along `orientation`
    pub fn read(&self, start: Position, orientation: Orientation, len: usize) -> Option<String> {
        (0..len)
            .map(|i| {
                start
                    .step(orientation, i, self.size())
                    .and_then(|pos| self.letter_at(pos))
            })
            .collect()
    }

    /// Find the first occurrence of `word` in any supported orientation
    pub fn find_word(&self, word: &str) -> Option<(Position, Orientation)> {
        let target: String = normalize_word(word).into_iter().collect();
        let len = target.chars().count();
        if len == 0 {
            return None;
        }

        for row in 0..self.size() {
            for col in 0..self.size() {
                let start = Position::new(row, col);
                for orientation in Orientation::ALL {
                    if self.read(start, orientation, len).as_deref() == Some(target.as_str()) {
                        return Some((start, orientation));
                    }
                }
            }
        }

        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn grid_from(rows: &[&str]) -> Grid {
        Grid::from_rows(rows.iter().map(|r| r.chars().collect()).collect()).unwrap()
    }

    #[test]
    fn test_step_stays_in_bounds() {
        let pos = Position::new(0, 0);
        assert_eq!(pos.step(Orientation::DownRight, 2, 3), Some(Position::new(2, 2)));
        assert_eq!(pos.step(Orientation::Left, 1, 3), None);
        assert_eq!(pos.step(Orientation::Down, 3, 3), None);
    }

    #[test]
    fn test_from_rows_rejects_ragged_grid() {
        assert!(Grid::from_rows(vec![vec!['A', 'B'], vec!['C']]).is_none());
    }

    #[test]
    fn test_find_word_backwards_and_diagonal() {
        let grid = grid_from(&["TAC", "XOY", "ZZG"]);
        assert_eq!(
            grid.find_word("cat"),
            Some((Position::new(0, 2), Orientation::Left))
        );
        assert_eq!(
            grid.find_word("GOT"),
            Some((Position::new(2, 2), Orientation::UpLeft))
        );
        assert_eq!(grid.find_word("DOG"), None);
    }
}
