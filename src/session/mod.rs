//! Client-side voice session handling: the lifecycle controller, transcript
//! accumulation, and the traits it talks through.

pub mod client;
pub mod controller;
pub mod transcript;
