use rand::Rng;

/// Letters used to fill the cells no word occupies
pub const ALPHABET: &[u8; 26] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZ";

/// Draw a noise letter uniformly from A-Z
pub fn random_letter<R: Rng + ?Sized>(rng: &mut R) -> char {
    ALPHABET[rng.random_range(0..ALPHABET.len())] as char
}

/// Uppercase a word the way it is laid out on the grid, one cell per char.
/// Placement, lookup and answer checking all go through this.
pub fn normalize_word(word: &str) -> Vec<char> {
    word.trim().to_uppercase().chars().collect()
}

/// Compare a spelled word and an answer as they would appear on the grid
pub fn same_word(a: &str, b: &str) -> bool {
    normalize_word(a) == normalize_word(b)
}
