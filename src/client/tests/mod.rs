//! Unit tests for the client layer.

mod pin_store_tests;
mod support;
mod sync_tests;
