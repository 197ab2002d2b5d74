pub mod config;
pub mod guard;
pub mod state;
pub mod verify;
