//! Host-platform boundary and reference evaluator
//!
//! The reporting module proper only constructs definitions; this crate
//! supplies everything it talks to: a clinical data model with an in-memory
//! store, the report service that owns persisted definitions, and a
//! reference evaluator that turns cohort definitions into patient sets and
//! report definitions into count tables. In production the store and
//! service sit in front of the host platform; here they are self-contained
//! so the definitions are testable without one.

mod clinical;
mod context;
mod error;
mod evaluate;
mod service;
mod sql;
mod store;

pub use clinical::*;
pub use context::*;
pub use error::*;
pub use evaluate::*;
pub use service::*;
pub use sql::*;
pub use store::*;
