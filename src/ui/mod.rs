// VarSleuth - ui/mod.rs
//
// Presentation layer. Consumes a finished Analysis; never parses.

pub mod report;
