pub mod cli;
pub mod config;
pub mod error;
pub mod logging;
pub mod openapi;
pub mod routes;
pub mod state;

pub use state::AppState;
