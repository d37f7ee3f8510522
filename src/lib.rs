//! Reconcile crop demand observations recorded under inconsistent names and
//! rank the crops whose recent average meets their historical peak.
//!
//! Pipeline: [`loader`] builds the tables, [`aggregate`] folds case variants
//! of a crop, [`merge`] folds letter-order variants, [`rank`] joins against
//! thresholds. [`collect`] produces the input CSVs from per-crop folders and
//! [`reports`] / [`output`] render the result.

pub mod aggregate;
pub mod collect;
pub mod config;
pub mod error;
pub mod loader;
pub mod logging;
pub mod merge;
pub mod normalize;
pub mod output;
pub mod rank;
pub mod reports;
pub mod types;
pub mod util;

pub use error::{DemandError, Result};
pub use rank::{compute_top_n, DEFAULT_TOP_N};
pub use types::{
    AggregateStat, MergedDemandRecord, ObservationEntry, ObservationTable, RankedResult,
    ThresholdTable,
};
