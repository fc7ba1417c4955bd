//! Integration tests for litellm-ws-gateway
//!
//! These tests drive several components together: adapters against a mock HTTP backend,
//! the router over real breakers, and the full request pipeline.

pub mod config_tests;
pub mod gateway_tests;
pub mod ledger_tests;
pub mod provider_tests;
pub mod router_tests;
