//! Scan orchestrator: jurisdictions × keywords → search → change gate → fetch → flatten.

pub mod run;
pub mod scanner;
#[cfg(test)]
mod testing;

pub use run::{ScanOptions, ScanOutcome, ScanStats, run_scan};
pub use scanner::{ScanError, ScanReport, ScanState, Scanner};
