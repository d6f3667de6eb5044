//! Find the cell tower that will serve a user best, and a nearby spot with better signal.

pub mod coords;
pub mod distance;
pub mod export;
pub mod model;
pub mod selector;
pub mod signal;
pub mod source;
pub mod traffic;

pub use coords::CoordinateError;
pub use distance::distance;
pub use model::{Congestion, GeoPoint, RadioTechnology, Tower};
pub use selector::{select_best, select_best_with, ScoredTower, Selection, Weights, WeightsError};
