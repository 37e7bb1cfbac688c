//! hubfx Testing Infrastructure
//!
//! Shared fixtures for hub and forms tests: the contact form configuration,
//! sample sync and async validators, a message recorder and proptest
//! strategies.

#![allow(clippy::unwrap_used)]
#![allow(clippy::expect_used)]
//!
//! # Usage
//!
//! ```toml
//! [dev-dependencies]
//! hubfx-testkit = { path = "../hubfx-testkit" }
//! ```
//!
//! ```rust,no_run
//! use hubfx_testkit::*;
//!
//! #[test]
//! fn my_test() {
//!     init_test_tracing();
//!     let tree = hubfx_forms::build_control_state(contact_form_config());
//!     assert!(!tree.valid);
//! }
//! ```

pub mod async_validators;
pub mod fixtures;
pub mod recorder;
pub mod strategies;
pub mod validators;

pub use async_validators::*;
pub use fixtures::*;
pub use recorder::MessageRecorder;
pub use validators::*;

use tracing_subscriber::EnvFilter;

/// Install a test subscriber honouring `RUST_LOG`.
///
/// Safe to call from every test; only the first call installs.
pub fn init_test_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}
