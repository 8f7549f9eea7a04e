//! Tunable Core
//!
//! Declarative binding of an object's externally settable parameters
//! ("tunables") to external representations.
//!
//! # Overview
//!
//! - **[`Tunable`]**: implemented by host types to declare their fields
//! - **[`HandlerFactory`]**: turns each declaration into a [`TunableHandler`]
//! - **[`Interceptor`]**: registry of handlers with batch `load`/`store`
//! - **[`TunableSource`] / [`TunableSink`]**: backends (property maps, files,
//!   command lines, provenance logs)
//!
//! # Example
//!
//! ```rust
//! use std::collections::HashMap;
//! use tunable_core::{shared, Interceptor, Schema, Tunable, TunableMeta};
//!
//! struct Layout {
//!     iterations: i64,
//! }
//!
//! impl Tunable for Layout {
//!     fn declare(&self, schema: &mut Schema<Self>) {
//!         schema.integer(
//!             "iterations",
//!             TunableMeta::new("layout", "Number of iterations"),
//!             |l| l.iterations,
//!             |l, v| l.iterations = v,
//!         );
//!     }
//! }
//!
//! let layout = shared(Layout { iterations: 10 });
//! let interceptor = Interceptor::new();
//! interceptor.register(&layout).unwrap();
//!
//! let mut props: HashMap<String, String> = HashMap::new();
//! props.insert("layout.iterations".to_string(), "250".to_string());
//! interceptor.load(&props, [&layout]).unwrap();
//! assert_eq!(layout.read().iterations, 250);
//! ```

#![warn(missing_docs)]
#![warn(unreachable_pub)]

pub mod backend;
pub mod config;
pub mod declaration;
pub mod error;
pub mod factory;
pub mod form;
pub mod handler;
pub mod interceptor;
pub mod report;
pub mod target;
pub mod value;

// Re-exports
pub use backend::{FieldRecord, TunableSink, TunableSource};
pub use config::{InterceptorConfig, UnregisteredPolicy, UnsupportedPolicy};
pub use declaration::{Binding, Schema, Site, Tunable, TunableMeta};
pub use error::{BackendError, FieldError, InterceptError, InterceptResult, SelectionError};
pub use factory::{HandlerFactory, RestrictedFactory, StandardFactory};
pub use form::{FormControl, FormRenderer, Widget};
pub use handler::{FieldHandler, TunableHandler};
pub use interceptor::{HandlerDescriptor, Interceptor, Registration};
pub use report::{BatchReport, FieldFailure};
pub use target::{shared, Shared, TargetId};
pub use value::{ListSingleSelection, ValueKind};

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Prelude module for common imports
pub mod prelude {
    //! Common imports for declaring and binding tunables
    pub use crate::{
        shared, BatchReport, Interceptor, InterceptorConfig, ListSingleSelection, Schema, Shared,
        Tunable, TunableMeta, TunableSink, TunableSource,
    };
}
