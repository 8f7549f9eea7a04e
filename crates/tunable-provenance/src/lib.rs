//! Tunable Provenance
//!
//! A write-only sink that records every stored tunable in a SHA-256
//! hash-chained log, for auditing which parameter values produced a result.
//!
//! ```rust
//! use tunable_core::{shared, Interceptor, Schema, Tunable, TunableMeta};
//! use tunable_provenance::ProvenanceLog;
//!
//! struct Filter {
//!     threshold: f64,
//! }
//!
//! impl Tunable for Filter {
//!     fn declare(&self, schema: &mut Schema<Self>) {
//!         schema.float(
//!             "threshold",
//!             TunableMeta::new("filter", "Minimum edge weight"),
//!             |f| f.threshold,
//!             |f, v| f.threshold = v,
//!         );
//!     }
//! }
//!
//! let filter = shared(Filter { threshold: 0.25 });
//! let interceptor = Interceptor::new();
//! interceptor.register(&filter).unwrap();
//!
//! let mut log = ProvenanceLog::new();
//! interceptor.store(&mut log, [&filter]).unwrap();
//!
//! assert_eq!(log.render_lines(), vec!["filter.threshold = 0.25  # Minimum edge weight"]);
//! assert!(log.verify_integrity().is_ok());
//! ```

#![warn(missing_docs)]
#![warn(unreachable_pub)]

pub mod error;
pub mod log;

pub use error::{ProvenanceError, ProvenanceResult};
pub use log::{ProvenanceEntry, ProvenanceLog, GENESIS_HASH};
