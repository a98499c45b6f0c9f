//! Local view host.
//!
//! JSON endpoints that hand the composed map view to a browser front-end
//! and forward its refresh, recommendation and mode actions.

mod dto;
mod routes;
mod state;

pub use dto::*;
pub use routes::create_router;
pub use state::{AppState, spawn_mode_watcher};
