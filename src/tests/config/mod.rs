//! Config module tests.

mod spec_tests;
