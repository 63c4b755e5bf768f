//! Unit tests for pricing.

mod domain_tests;
