pub mod blending;
pub mod config;
pub mod config_processors;
pub mod endpoints;
pub mod error;
pub mod io;
pub mod stopwatch;
pub mod stores;
