use crate::{
    models::{Grid, Position},
    utils::letters::same_word,
};

pub struct PathValidator;

impl PathValidator {
    /// Check that every click is adjacent to the one before it.
    ///
    /// Only consecutive pairs in click order are compared, so a path that
    /// covers a valid shape but was clicked out of order is rejected.
    pub fn is_connected_sequence(positions: &[Position]) -> bool {
        positions
            .windows(2)
            .all(|pair| Self::are_adjacent(&pair[0], &pair[1]))
    }

    /// Check if two positions are adjacent (including diagonals)
    pub fn are_adjacent(pos1: &Position, pos2: &Position) -> bool {
        let row_diff = pos1.row.abs_diff(pos2.row);
        let col_diff = pos1.col.abs_diff(pos2.col);

        row_diff <= 1 && col_diff <= 1
    }

    /// Extract word from grid positions, in the given order.
    /// Positions must lie on the grid; `SelectionEngine::toggle` only admits those.
    pub fn extract_word(grid: &Grid, positions: &[Position]) -> String {
        positions
            .iter()
            .filter_map(|pos| grid.letter_at(*pos))
            .collect()
    }

    /// Case-insensitive match against the expected answer
    pub fn is_correct(word: &str, correct: &str) -> bool {
        same_word(word, correct)
    }
}
