pub mod domains;
pub mod models;
pub mod processing;
pub mod screens;
pub mod state;
pub mod store;

pub use state::AppState;
