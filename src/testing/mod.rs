//! Testing utilities for the lakeFS SDK.
//!
//! Provides a scripted transport for testing applications that use the SDK.

mod mock;

pub use mock::{MockCall, MockTransport};
