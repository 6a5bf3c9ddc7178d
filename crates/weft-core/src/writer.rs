//! Markup writer abstraction
//!
//! The weaver treats the writer as an opaque sink: it only needs the type
//! for signature validation and argument passing, never the contents.

/// Opaque markup sink passed to render phase methods
pub trait MarkupWriter {
    /// Append raw text to the output
    fn write(&mut self, text: &str);
}

/// Buffer-backed writer for tests and demos
#[derive(Debug, Default)]
pub struct MemoryWriter {
    buffer: String,
}

impl MemoryWriter {
    /// Create an empty writer
    pub fn new() -> Self {
        Self::default()
    }

    /// Everything written so far
    pub fn contents(&self) -> &str {
        &self.buffer
    }
}

impl MarkupWriter for MemoryWriter {
    fn write(&mut self, text: &str) {
        self.buffer.push_str(text);
    }
}
