//! PECG report module
//!
//! Defines the "PECG Report" - patients currently on ART, broken down by
//! age band and sex - as declarative definitions submitted to a report
//! service. The cohort and indicator libraries build the pieces; the setup
//! entry point assembles, registers, and removes the report.

pub mod library;

mod setup;

pub use setup::*;

// The toolkit crates, re-exported for callers that only depend on this one
pub use pecg_defs as defs;
pub use pecg_engine as engine;
