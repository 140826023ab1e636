//! Raw-input side of the engine
//!
//! 1. [`input_table`] - Watch channels per `(hand, button)` the engine wires to
//! 2. [`replay`] - Scripted collaborator publishing samples into the table
//!
//! # Architecture
//!
//! ```text
//! ReplayScript ──► ReplayCollector ──► RawInputTable ──► SourceHandle (engine)
//!                   (per frame)        (latest sample)
//! ```

pub mod input_table;
pub mod replay;
