//! Common test utilities for litellm-ws-gateway
//!
//! # Usage
//!
//! ```rust
//! use crate::common::{fixtures, providers::ScriptedProvider};
//!
//! #[tokio::test]
//! async fn my_test() {
//!     let request = fixtures::chat_request("r1", "gpt-4", false);
//!     let provider = ScriptedProvider::replying("openai", "hello");
//!     // ...
//! }
//! ```

pub mod fixtures;
pub mod ledger;
pub mod providers;
pub mod transport;

pub use ledger::FakeLedger;
pub use providers::ScriptedProvider;
pub use transport::RecordingTransport;

/// Assert that a result is Ok and return the value
#[macro_export]
macro_rules! assert_ok {
    ($expr:expr) => {
        match $expr {
            Ok(v) => v,
            Err(e) => panic!("Expected Ok, got Err: {:?}", e),
        }
    };
}

/// Assert that a result is Err
#[macro_export]
macro_rules! assert_err {
    ($expr:expr) => {
        match $expr {
            Ok(v) => panic!("Expected Err, got Ok: {:?}", v),
            Err(e) => e,
        }
    };
}
