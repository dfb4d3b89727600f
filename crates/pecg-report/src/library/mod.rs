//! Definition libraries for the PECG report

pub mod cohorts;
pub mod indicators;
