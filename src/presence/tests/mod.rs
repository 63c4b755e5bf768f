//! Unit tests for presence.

mod presence_tests;
