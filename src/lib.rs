pub mod config;
pub mod deck;
pub mod errors;
pub mod handlers;
pub mod outline;
pub mod state;
pub mod templates_structs;
