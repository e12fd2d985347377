//! Structured logging facility for equivex
//!
//! - Single initialization point via `init(profile)`
//! - Structured logging macros (`log_op_start!`, `log_op_end!`, `log_op_error!`)
//! - Test capture mode for deterministic assertions
//!
//! Every top-level comparison emits a `start` and an `end` (or `end_error`)
//! event carrying the invocation id; steps emit `trace` events keyed by the
//! node path they handled.
//!
//! # Usage
//!
//! ```rust
//! use equivex_core::logging_facility::{init, Profile};
//!
//! init(Profile::Development);
//! ```

pub mod init;
pub mod macros;
pub mod test_capture;

pub use init::{init, Profile};
pub use test_capture::{init_test_capture, CapturedEvent, TestCapture};
