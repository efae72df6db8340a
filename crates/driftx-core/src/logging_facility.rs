//! Structured logging facility for DriftX
//!
//! - Single initialization point via `init(profile)`
//! - Structured logging macros (`log_op_start!`, `log_op_end!`, `log_op_error!`)
//! - Test capture mode for deterministic assertions
//!
//! Every generate or check run emits exactly one start event and exactly one
//! end (or end_error) event carrying the same `run_id`. Per-artifact events
//! are emitted at debug level so production output stays one line per run.
//!
//! # Usage
//!
//! ```rust
//! use driftx_core::logging_facility::{init, Profile};
//!
//! init(Profile::Development);
//! ```

pub mod init;
pub mod macros;
pub mod test_capture;

pub use init::{init, Profile};
pub use test_capture::{init_test_capture, CapturedEvent, TestCapture};
