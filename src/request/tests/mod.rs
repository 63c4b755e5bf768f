//! Unit tests for the request context.

mod domain_tests;
mod support;
