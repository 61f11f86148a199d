//! Command-line front end for DogMail: serves the submission endpoint,
//! submits addresses and plays the treat sequence in the terminal.

pub mod commands;
pub mod logging;
pub mod render;

pub use render::{render_frame, FrameRenderer};
