pub mod assistant;
pub mod auth;
pub mod error;
pub mod extract;
pub mod history;
pub mod library;
pub mod middleware;
pub mod queries;
pub mod router;
pub mod shares;
pub mod state;

pub use router::router;
pub use state::{AppState, AppStateInner, Settings};
