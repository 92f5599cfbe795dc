use std::ops::RangeInclusive;

use rand::Rng;
use serde::Serialize;

use crate::{
    models::{Grid, Orientation, Position, GRID_SIZE},
    utils::letters::{normalize_word, random_letter},
};

/// Attempts made to place a single word before giving up on it
pub const MAX_PLACEMENT_ATTEMPTS: usize = 100;

/// Where a word ended up on the grid
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct Placement {
    /// Uppercased word as laid out
    pub word: String,
    pub start: Position,
    pub orientation: Orientation,
    /// Cells holding the word's letters, in reading order
    pub positions: Vec<Position>,
}

/// A filled grid together with what was and wasn't placed on it
#[derive(Debug, Clone, Serialize)]
pub struct GeneratedGrid {
    pub grid: Grid,
    pub placements: Vec<Placement>,
    /// Uppercased words that found no spot within the attempt budget
    pub unplaced: Vec<String>,
}

impl GeneratedGrid {
    pub fn placement(&self, word: &str) -> Option<&Placement> {
        let target: String = normalize_word(word).into_iter().collect();
        self.placements.iter().find(|p| p.word == target)
    }

    pub fn is_placed(&self, word: &str) -> bool {
        self.placement(word).is_some()
    }
}

pub struct GridGenerator;

impl GridGenerator {
    /// Generate a 12x12 word soup hiding `words`, using the thread RNG
    pub fn generate<S: AsRef<str>>(words: &[S]) -> GeneratedGrid {
        Self::generate_with_rng(words, &mut rand::rng())
    }

    /// Generate a 12x12 word soup hiding `words`.
    ///
    /// Placement is best-effort: each word gets [`MAX_PLACEMENT_ATTEMPTS`] random
    /// orientation/start draws, and words that never fit are reported in
    /// [`GeneratedGrid::unplaced`]. Cells left empty are filled with uniform A-Z noise.
    /// The result depends only on the draws taken from `rng`.
    pub fn generate_with_rng<S, R>(words: &[S], rng: &mut R) -> GeneratedGrid
    where
        S: AsRef<str>,
        R: Rng + ?Sized,
    {
        let mut cells: Vec<Vec<Option<char>>> = vec![vec![None; GRID_SIZE]; GRID_SIZE];
        let mut placements = Vec::with_capacity(words.len());
        let mut unplaced = Vec::new();

        for word in words {
            let letters = normalize_word(word.as_ref());
            if letters.is_empty() {
                tracing::debug!("Skipping empty word");
                continue;
            }

            match Self::place_word(&mut cells, &letters, rng) {
                Some(placement) => placements.push(placement),
                None => {
                    let word: String = letters.iter().collect();
                    tracing::warn!(
                        "Could not place word {} after {} attempts",
                        word,
                        MAX_PLACEMENT_ATTEMPTS
                    );
                    unplaced.push(word);
                }
            }
        }

        let rows = cells
            .into_iter()
            .map(|row| {
                row.into_iter()
                    .map(|cell| cell.unwrap_or_else(|| random_letter(rng)))
                    .collect()
            })
            .collect();

        GeneratedGrid {
            grid: Grid::from_square(rows),
            placements,
            unplaced,
        }
    }

    fn place_word<R: Rng + ?Sized>(
        cells: &mut [Vec<Option<char>>],
        letters: &[char],
        rng: &mut R,
    ) -> Option<Placement> {
        for _ in 0..MAX_PLACEMENT_ATTEMPTS {
            let orientation = Orientation::ALL[rng.random_range(0..Orientation::ALL.len())];
            let (dr, dc) = orientation.delta();

            // Orientation too long for the grid; the attempt is spent
            let (Some(rows), Some(cols)) = (
                Self::start_range(dr, letters.len()),
                Self::start_range(dc, letters.len()),
            ) else {
                continue;
            };

            let start = Position::new(rng.random_range(rows), rng.random_range(cols));

            if let Some(positions) = Self::walk(cells, letters, start, orientation) {
                for (pos, letter) in positions.iter().zip(letters) {
                    cells[pos.row][pos.col] = Some(*letter);
                }
                return Some(Placement {
                    word: letters.iter().collect(),
                    start,
                    orientation,
                    positions,
                });
            }
        }

        None
    }

    /// Legal start indices on one axis so a word of `len` letters stays on the grid
    fn start_range(delta: isize, len: usize) -> Option<RangeInclusive<usize>> {
        let len = len as isize;
        let size = GRID_SIZE as isize;
        let min = if delta == -1 { len - 1 } else { 0 };
        let max = if delta == 1 { size - len } else { size - 1 };

        (max >= min).then(|| min as usize..=max as usize)
    }

    /// Cells the word would cover, or `None` if it leaves the grid or
    /// disagrees with a letter already there
    fn walk(
        cells: &[Vec<Option<char>>],
        letters: &[char],
        start: Position,
        orientation: Orientation,
    ) -> Option<Vec<Position>> {
        let mut positions = Vec::with_capacity(letters.len());

        for (i, letter) in letters.iter().enumerate() {
            let pos = start.step(orientation, i, GRID_SIZE)?;
            match cells[pos.row][pos.col] {
                Some(existing) if existing != *letter => return None,
                _ => positions.push(pos),
            }
        }

        Some(positions)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    fn words(list: &[&str]) -> Vec<String> {
        list.iter().map(|w| w.to_string()).collect()
    }

    #[test]
    fn test_grid_generation() {
        let generated = GridGenerator::generate(&words(&["PARIS", "MADRID"]));
        assert_eq!(generated.grid.size(), GRID_SIZE);
        assert!(generated.grid.rows().iter().all(|row| row.len() == GRID_SIZE));
    }

    #[test]
    fn test_every_cell_is_an_uppercase_letter() {
        let mut rng = ChaCha8Rng::seed_from_u64(1);
        for _ in 0..20 {
            let generated =
                GridGenerator::generate_with_rng(&words(&["ONZE", "DEZ", "DOZE", "DUAS"]), &mut rng);
            assert!(generated
                .grid
                .rows()
                .iter()
                .flatten()
                .all(|c| c.is_ascii_uppercase()));
        }
    }

    #[test]
    fn test_placed_words_read_back() {
        let mut rng = ChaCha8Rng::seed_from_u64(42);
        let list = words(&["dominicano", "franciscanos", "diocesanos", "beneditinos"]);
        let generated = GridGenerator::generate_with_rng(&list, &mut rng);

        for placement in &generated.placements {
            let spelled: String = placement
                .positions
                .iter()
                .map(|pos| generated.grid.letter_at(*pos).unwrap())
                .collect();
            assert_eq!(spelled, placement.word);
            assert_eq!(
                generated
                    .grid
                    .read(placement.start, placement.orientation, placement.positions.len()),
                Some(placement.word.clone())
            );
        }
        assert_eq!(
            generated.placements.len() + generated.unplaced.len(),
            list.len()
        );
    }

    #[test]
    fn test_overlapping_placements_agree() {
        let mut rng = ChaCha8Rng::seed_from_u64(9);
        for _ in 0..50 {
            let generated = GridGenerator::generate_with_rng(
                &words(&["AMIGA", "PRIMA", "IRMA", "AMANTE", "MARIA", "RAMA"]),
                &mut rng,
            );
            for a in &generated.placements {
                for b in &generated.placements {
                    for (pa, la) in a.positions.iter().zip(a.word.chars()) {
                        for (pb, lb) in b.positions.iter().zip(b.word.chars()) {
                            if pa == pb {
                                assert_eq!(la, lb);
                            }
                        }
                    }
                }
            }
        }
    }

    #[test]
    fn test_same_seed_same_grid() {
        let list = words(&["SEIS", "UMA", "TRES", "DEZ"]);
        let first = GridGenerator::generate_with_rng(&list, &mut ChaCha8Rng::seed_from_u64(5));
        let second = GridGenerator::generate_with_rng(&list, &mut ChaCha8Rng::seed_from_u64(5));
        assert_eq!(first.grid, second.grid);
        assert_eq!(first.placements, second.placements);
    }

    #[test]
    fn test_word_longer_than_grid_is_unplaced() {
        let generated = GridGenerator::generate(&words(&["ABCDEFGHIJKLMNOP"]));
        assert!(generated.placements.is_empty());
        assert_eq!(generated.unplaced, vec!["ABCDEFGHIJKLMNOP".to_string()]);
        assert!(generated.grid.rows().iter().flatten().all(|c| c.is_ascii_uppercase()));
    }

    #[test]
    fn test_placed_words_are_discoverable() {
        let mut rng = ChaCha8Rng::seed_from_u64(2024);
        for _ in 0..25 {
            let generated = GridGenerator::generate_with_rng(&words(&["PARIS", "MADRID"]), &mut rng);
            for word in ["PARIS", "MADRID"] {
                if generated.is_placed(word) {
                    assert!(generated.grid.find_word(word).is_some(), "{word} not found");
                }
            }
        }
    }

    #[test]
    fn test_padded_word_is_found_by_its_letters() {
        let mut rng = ChaCha8Rng::seed_from_u64(3);
        let generated = GridGenerator::generate_with_rng(&words(&[" cat "]), &mut rng);
        assert_eq!(generated.placements[0].word, "CAT");
        assert!(generated.is_placed(" CAT "));
        assert!(generated.is_placed("cat"));
    }

    #[test]
    fn test_start_range() {
        assert_eq!(GridGenerator::start_range(1, 5), Some(0..=7));
        assert_eq!(GridGenerator::start_range(-1, 5), Some(4..=11));
        assert_eq!(GridGenerator::start_range(0, 5), Some(0..=11));
        assert_eq!(GridGenerator::start_range(1, 13), None);
        assert_eq!(GridGenerator::start_range(-1, 13), None);
    }
}
