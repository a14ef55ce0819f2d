//! Library exports for reusing multimark subsystems.
//!
//! Exposes the configuration, drawing, and input-routing modules alongside
//! the remote-control protocol so that external tools can share validation
//! logic and drive a running instance programmatically.

pub mod config;
pub mod draw;
pub mod input;
pub mod remote;
pub mod util;

pub use config::Config;
