mod favorites;
mod generation;
mod persistence;
mod selection;
mod session;

pub use favorites::{FavoriteSet, FavoriteToggleController};
pub use generation::{Generation, RequestGeneration};
pub use persistence::export_results;
pub use selection::{SelectionStateTracker, SelectionStatus, Submission};
pub use session::SessionContext;
