//! Button-Action-Choser: per-frame VR input normalization
//!
//! Feature code declares which button drives it ([`mapping::BindingConfig`]),
//! the engine validates that against the active backend and turns raw samples
//! into start / is / stop events for click and touch.

pub mod config;
pub mod controller;
pub mod mapping;
pub mod persistence;
