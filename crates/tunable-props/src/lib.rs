//! Tunable Props
//!
//! Property-map backends for tunable parameters.
//!
//! - [`PropertyMap`]: ordered in-memory map, both source and sink
//! - [`PropertyFile`]: file on disk, buffered and written on commit
//! - [`PropertyFormat`]: `.properties`, JSON or YAML, chosen by extension
//!
//! # Example
//!
//! ```rust
//! use tunable_core::{shared, Interceptor, Schema, Tunable, TunableMeta};
//! use tunable_props::{PropertyFormat, PropertyMap};
//!
//! struct Spring {
//!     length: f64,
//! }
//!
//! impl Tunable for Spring {
//!     fn declare(&self, schema: &mut Schema<Self>) {
//!         schema.float(
//!             "length",
//!             TunableMeta::new("spring", "Rest length"),
//!             |s| s.length,
//!             |s, v| s.length = v,
//!         );
//!     }
//! }
//!
//! let spring = shared(Spring { length: 1.0 });
//! let interceptor = Interceptor::new();
//! interceptor.register(&spring).unwrap();
//!
//! let props = PropertyMap::parse("spring.length = 2.5\n", PropertyFormat::Properties).unwrap();
//! interceptor.load(&props, [&spring]).unwrap();
//! assert!((spring.read().length - 2.5).abs() < f64::EPSILON);
//! ```

#![warn(missing_docs)]
#![warn(unreachable_pub)]

pub mod error;
pub mod file;
pub mod format;
pub mod map;
pub mod properties;

pub use error::{PropsError, PropsResult};
pub use file::PropertyFile;
pub use format::PropertyFormat;
pub use map::PropertyMap;
