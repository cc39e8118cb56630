//! Shared test utilities for btncount.
//!
//! - [`mod@must`] - unwrap helpers with `#[track_caller]` messages
//! - [`button`] - scripted presses on a [`SimulatedPlatform`](btncount_gpio::SimulatedPlatform)
//!
//! ```toml
//! [dev-dependencies]
//! btncount-test-helpers = { workspace = true }
//! ```

#![deny(unsafe_op_in_unsafe_fn)]
#![allow(clippy::panic)]

pub mod button;
pub mod must;

pub use button::SimButton;
pub use must::*;
