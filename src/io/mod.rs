//! I/O abstractions for input providers and output targets.
//!
//! This module provides:
//! - `InputStream`: A byte stream tagged with its read capability
//! - `MarkableReader`: Buffering adapter adding mark/reset to any reader
//! - `InputProvider`: Trait for input sources
//! - `OutputTarget`: Trait for output destinations
//! - Standard implementations for files, stdin/stdout
//! - In-memory implementations for testing

mod input;
mod memory;
mod output;
mod std_io;
mod stream;

pub use input::InputProvider;
pub use memory::{InMemorySink, InMemorySource};
pub use output::OutputTarget;
pub use std_io::{FileInput, FileOutput, StdinInput, StdoutOutput};
pub use stream::{Capability, InputStream, MarkReset, MarkableReader, PositionalRead};
