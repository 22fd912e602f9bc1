//! Internal tests.


mod config;
mod error;
mod format;
