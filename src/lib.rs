pub mod clock;
pub mod config;
pub mod db;
pub mod domain;
pub mod error;
pub mod handlers;
pub mod paths;
pub mod profiling;
pub mod services;
pub mod srs;
pub mod state;

#[cfg(test)]
pub mod testing;
