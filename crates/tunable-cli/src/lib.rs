//! Tunable CLI
//!
//! Command-line backend for tunable parameters: each registered tunable
//! becomes a `--namespace.field` option.
//!
//! # Example
//!
//! ```rust
//! use tunable_cli::{CliOutcome, CommandLineInterceptor};
//! use tunable_core::{shared, Interceptor, Schema, Tunable, TunableMeta};
//!
//! struct Render {
//!     antialias: bool,
//! }
//!
//! impl Tunable for Render {
//!     fn declare(&self, schema: &mut Schema<Self>) {
//!         schema.boolean(
//!             "antialias",
//!             TunableMeta::new("render", "Smooth edges"),
//!             |r| r.antialias,
//!             |r, v| r.antialias = v,
//!         );
//!     }
//! }
//!
//! let render = shared(Render { antialias: false });
//! let interceptor = Interceptor::new();
//! interceptor.register(&render).unwrap();
//!
//! let cli = CommandLineInterceptor::new(&interceptor, "viewer");
//! match cli.apply(["--render.antialias", "true"]) {
//!     CliOutcome::Proceed(report) => assert!(report.is_clean()),
//!     CliOutcome::Exit(exit) => panic!("{}", exit.message),
//! }
//! assert!(render.read().antialias);
//! ```

#![warn(missing_docs)]
#![warn(unreachable_pub)]

pub mod command;
pub mod outcome;

pub use command::CommandLineInterceptor;
pub use outcome::{CliOutcome, ExitRequest, EXIT_SUCCESS, EXIT_USAGE};
