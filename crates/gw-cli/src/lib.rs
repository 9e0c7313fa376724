//! guestwire: CLI for the Guestwire sync engine
//!
//! The CLI is the engine's reference collaborator: one-shot reads against
//! the REST surface, a live feed over the sync engine, and seating edits
//! through the validated, debounced mutation path.

pub mod commands;
pub mod output;
