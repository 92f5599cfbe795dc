// Word soup engine: grid generation and selection handling

pub mod grid;
pub mod selection;
pub mod validator;

pub use grid::{GeneratedGrid, GridGenerator, Placement};
pub use selection::SelectionEngine;
pub use validator::PathValidator;
