//! Utility modules for DogMail
//!
//! Configuration, error types and the debug switch.

pub mod config;
pub mod debug;
pub mod error;
