// VarSleuth - app/mod.rs
//
// Application layer: orchestration of reading, parsing, and classification.
// Dependencies: core layer, platform file reading.
// Must NOT depend on: ui.

pub mod analysis;
