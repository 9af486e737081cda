//! `asnsweep-recon`: ASN blocklist reconciliation engine.
//!
//! Pure engine crate: ingests fetched source content through the [`Fetch`]
//! trait, returns a reconciliation result and renders it.
//! No HTTP client or process I/O of its own.

pub mod adapter;
pub mod canonical;
pub mod config;
pub mod curated;
pub mod engine;
pub mod error;
pub mod extract;
pub mod model;
pub mod reconcile;
pub mod report;
pub mod tokenize;

pub use config::SweepConfig;
pub use curated::CuratedTable;
pub use engine::{run, Fetch, FetchRequest};
pub use error::{FetchError, ReconError};
pub use model::{Asn, AsnRange, CandidateRecord, CanonicalSet, ReconciliationResult};
