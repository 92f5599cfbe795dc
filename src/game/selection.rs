use std::time::{Duration, Instant};

use crate::{
    game::validator::PathValidator,
    models::{AnswerOutcome, Grid, Notification, Position},
};

/// How long a notification stays visible before it dismisses itself
pub const NOTIFICATION_DURATION: Duration = Duration::from_secs(3);

#[derive(Debug, Clone)]
struct ActiveNotification {
    notification: Notification,
    expires_at: Instant,
}

/// Tracks the cells a player has clicked for one question and judges the
/// selection when they confirm it.
///
/// A fresh engine is created for every question; it starts with an empty
/// selection and no notification.
#[derive(Debug, Clone)]
pub struct SelectionEngine {
    grid: Grid,
    correct: String,
    selection: Vec<Position>,
    notification: Option<ActiveNotification>,
    notification_ttl: Duration,
}

impl SelectionEngine {
    pub fn new(grid: Grid, correct: impl Into<String>) -> Self {
        Self {
            grid,
            correct: correct.into(),
            selection: Vec::new(),
            notification: None,
            notification_ttl: NOTIFICATION_DURATION,
        }
    }

    pub fn with_notification_ttl(mut self, ttl: Duration) -> Self {
        self.notification_ttl = ttl;
        self
    }

    pub fn grid(&self) -> &Grid {
        &self.grid
    }

    /// Add the cell to the end of the selection, or drop it if already selected.
    /// Cells outside the grid are ignored, so every selected cell has a letter.
    /// Returns whether the selection changed.
    pub fn toggle(&mut self, pos: Position) -> bool {
        if !pos.in_bounds(self.grid.size()) {
            return false;
        }
        match self.selection.iter().position(|p| *p == pos) {
            Some(index) => {
                self.selection.remove(index);
            }
            None => self.selection.push(pos),
        }
        true
    }

    pub fn clear(&mut self) {
        self.selection.clear();
    }

    /// Letters under the selection, in click order
    pub fn spelled_word(&self) -> String {
        PathValidator::extract_word(&self.grid, &self.selection)
    }

    pub fn current_selection(&self) -> &[Position] {
        &self.selection
    }

    pub fn current_notification(&self) -> Option<&Notification> {
        self.current_notification_at(Instant::now())
    }

    pub fn current_notification_at(&self, now: Instant) -> Option<&Notification> {
        self.notification
            .as_ref()
            .filter(|active| now < active.expires_at)
            .map(|active| &active.notification)
    }

    /// Most recent notification, whether or not it has expired
    pub fn last_notification(&self) -> Option<&Notification> {
        self.notification.as_ref().map(|active| &active.notification)
    }

    pub fn confirm(&mut self) -> Option<AnswerOutcome> {
        self.confirm_at(Instant::now())
    }

    /// Judge the current selection.
    ///
    /// A disconnected selection only raises an error notification and is kept
    /// as-is. A connected one always yields an outcome, right or wrong, and
    /// clears the selection.
    pub fn confirm_at(&mut self, now: Instant) -> Option<AnswerOutcome> {
        let word = self.spelled_word();

        if !PathValidator::is_connected_sequence(&self.selection) {
            tracing::debug!("Rejected disconnected selection {:?}", self.selection);
            self.notify(Notification::error("Letters must be connected!"), now);
            return None;
        }

        let correct = PathValidator::is_correct(&word, &self.correct);
        let notification = if correct {
            Notification::success("Congratulations! Correct answer.")
        } else {
            Notification::error(format!(
                "Incorrect answer. You chose \"{}\", but the correct one is \"{}\".",
                word,
                self.correct.trim()
            ))
        };
        self.notify(notification, now);
        self.selection.clear();

        Some(AnswerOutcome { word, correct })
    }

    fn notify(&mut self, notification: Notification, now: Instant) {
        self.notification = Some(ActiveNotification {
            notification,
            expires_at: now + self.notification_ttl,
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{NotificationKind, GRID_SIZE};

    fn p(row: usize, col: usize) -> Position {
        Position::new(row, col)
    }

    /// 12x12 grid of 'Z' with the given letters written in
    fn grid_with(letters: &[(Position, char)]) -> Grid {
        let mut rows = vec![vec!['Z'; GRID_SIZE]; GRID_SIZE];
        for (pos, letter) in letters {
            rows[pos.row][pos.col] = *letter;
        }
        Grid::from_rows(rows).unwrap()
    }

    fn cat_engine() -> SelectionEngine {
        let grid = grid_with(&[(p(2, 2), 'C'), (p(2, 3), 'A'), (p(2, 4), 'T'), (p(5, 5), 'T')]);
        SelectionEngine::new(grid, "CAT")
    }

    #[test]
    fn test_toggle_adds_and_removes() {
        let mut engine = cat_engine();
        engine.toggle(p(2, 2));
        engine.toggle(p(2, 3));
        engine.toggle(p(2, 2));
        assert_eq!(engine.current_selection(), &[p(2, 3)]);

        engine.toggle(p(2, 2));
        assert_eq!(engine.current_selection(), &[p(2, 3), p(2, 2)]);
        assert_eq!(engine.spelled_word(), "AC");
        assert!(engine.current_notification().is_none());
    }

    #[test]
    fn test_toggle_outside_grid_is_ignored() {
        let mut engine = cat_engine();
        engine.toggle(p(2, 2));
        assert!(!engine.toggle(p(GRID_SIZE, 0)));
        assert!(!engine.toggle(p(0, GRID_SIZE)));
        assert_eq!(engine.current_selection(), &[p(2, 2)]);
        assert_eq!(
            engine.spelled_word().chars().count(),
            engine.current_selection().len()
        );
    }

    #[test]
    fn test_spelled_word_empty_selection() {
        assert_eq!(cat_engine().spelled_word(), "");
    }

    #[test]
    fn test_confirm_correct_word() {
        let mut engine = cat_engine();
        for pos in [p(2, 2), p(2, 3), p(2, 4)] {
            engine.toggle(pos);
        }

        let outcome = engine.confirm();
        assert_eq!(
            outcome,
            Some(AnswerOutcome {
                word: "CAT".to_string(),
                correct: true
            })
        );
        assert!(engine.current_selection().is_empty());
        assert_eq!(
            engine.current_notification().map(|n| n.kind),
            Some(NotificationKind::Success)
        );
    }

    #[test]
    fn test_confirm_disconnected_keeps_selection() {
        let mut engine = cat_engine();
        let clicks = [p(2, 2), p(2, 3), p(5, 5)];
        for pos in clicks {
            engine.toggle(pos);
        }

        assert_eq!(engine.confirm(), None);
        assert_eq!(engine.current_selection(), &clicks);
        let notification = engine.current_notification().unwrap();
        assert_eq!(notification.kind, NotificationKind::Error);
        assert_eq!(notification.message, "Letters must be connected!");
    }

    #[test]
    fn test_confirm_wrong_word_is_still_reported() {
        let grid = grid_with(&[(p(1, 1), 'X'), (p(1, 2), 'Y')]);
        let mut engine = SelectionEngine::new(grid, "CAT");
        engine.toggle(p(1, 1));
        engine.toggle(p(1, 2));

        let outcome = engine.confirm().unwrap();
        assert_eq!(outcome.word, "XY");
        assert!(!outcome.correct);
        assert!(engine.current_selection().is_empty());

        let notification = engine.current_notification().unwrap();
        assert_eq!(notification.kind, NotificationKind::Error);
        assert!(notification.message.contains("\"XY\""));
    }

    #[test]
    fn test_confirm_matches_case_insensitively() {
        let grid = grid_with(&[(p(0, 0), 'C'), (p(1, 1), 'A'), (p(2, 2), 'T')]);
        let mut engine = SelectionEngine::new(grid, "cat");
        for pos in [p(0, 0), p(1, 1), p(2, 2)] {
            engine.toggle(pos);
        }
        assert!(engine.confirm().unwrap().correct);
    }

    #[test]
    fn test_clear_drops_selection_quietly() {
        let mut engine = cat_engine();
        engine.toggle(p(2, 2));
        engine.toggle(p(2, 3));
        engine.clear();
        assert!(engine.current_selection().is_empty());
        assert!(engine.current_notification().is_none());
    }

    #[test]
    fn test_notification_expires() {
        let mut engine = cat_engine();
        let now = Instant::now();
        engine.toggle(p(2, 2));
        engine.toggle(p(5, 5));
        engine.confirm_at(now);

        assert!(engine.current_notification_at(now + Duration::from_secs(2)).is_some());
        assert!(engine.current_notification_at(now + NOTIFICATION_DURATION).is_none());
        assert!(engine.last_notification().is_some());
    }

    #[test]
    fn test_new_notification_replaces_previous() {
        let mut engine = cat_engine();
        let now = Instant::now();
        engine.toggle(p(2, 2));
        engine.toggle(p(5, 5));
        engine.confirm_at(now);

        engine.clear();
        for pos in [p(2, 2), p(2, 3), p(2, 4)] {
            engine.toggle(pos);
        }
        let later = now + Duration::from_secs(2);
        engine.confirm_at(later);

        // Expiry is measured from the replacement, not the first notification
        let shown = engine.current_notification_at(now + Duration::from_secs(4)).unwrap();
        assert_eq!(shown.kind, NotificationKind::Success);
        assert!(engine.current_notification_at(later + NOTIFICATION_DURATION).is_none());
    }

    #[test]
    fn test_custom_notification_ttl() {
        let mut engine = cat_engine().with_notification_ttl(Duration::from_millis(10));
        let now = Instant::now();
        engine.confirm_at(now);
        assert!(engine.current_notification_at(now + Duration::from_millis(5)).is_some());
        assert!(engine.current_notification_at(now + Duration::from_millis(10)).is_none());
    }
}
