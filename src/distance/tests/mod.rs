//! Unit tests for the distance module.

mod estimator_tests;
