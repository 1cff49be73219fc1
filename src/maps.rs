//! Module containing containers for holding readers and writers

use std::collections::HashMap;
use std::error::Error;

use crate::ast::Document;
use crate::traits::{DocReader, DocWriter};

/// Wrapper over a [`DocReader`] type that takes a function creating the reader and calls it,
/// calls the read function and wraps an error into a boxed trait object
pub type Reader = Box<dyn Fn(&str) -> Result<Document, Box<dyn Error>>>;

/// Container for holding readers
#[derive(Default)]
pub struct ReaderMap(HashMap<&'static str, Reader>);

impl ReaderMap {
    /// Creates a new empty reader map
    #[must_use]
    pub fn new() -> Self { Self(HashMap::new()) }

    /// Adds a new reader to the map from a function creating an instance of the reader
    pub fn add<T, F>(&mut self, name: &'static str, reader_creator: F)
    where
        T: DocReader + 'static,
        T::ReadError: Error + 'static,
        F: Fn() -> T + 'static,
    {
        self.0.insert(
            name,
            Box::new(move |s| match reader_creator().read(s) {
                Ok(d) => Ok(d),
                Err(e) => Err(Box::new(e)),
            }),
        );
    }

    /// Gets an iterator over the keys of the map
    pub fn keys(&self) -> impl Iterator<Item = &&'static str> { self.0.keys() }

    /// Reads a string to a [`Document`] with a given reader
    /// # Errors
    /// Returns an error received from a reader as a boxed trait object
    /// # Panics
    /// If key is not in map
    pub fn read(&self, name: &str, source: &str) -> Result<Document, Box<dyn Error>> {
        self.0.get(name).unwrap()(source)
    }
}

/// Wrapper over a [`DocWriter`] type that takes a function creating the writer and calls it,
/// calls the write function and wraps an error into a boxed trait object
pub type Writer = Box<dyn Fn(Document) -> Result<String, Box<dyn Error>>>;

/// Container for holding writers
#[derive(Default)]
pub struct WriterMap(HashMap<&'static str, Writer>);

impl WriterMap {
    /// Creates a new empty writer map
    #[must_use]
    pub fn new() -> Self { Self(HashMap::new()) }

    /// Adds a new writer to the map from a function creating an instance of the writer
    pub fn add<T, F>(&mut self, name: &'static str, writer_creator: F)
    where
        T: DocWriter + 'static,
        T::WriteError: Error + 'static,
        F: Fn() -> T + 'static,
    {
        self.0.insert(
            name,
            Box::new(move |d| match writer_creator().write(d) {
                Ok(s) => Ok(s),
                Err(e) => Err(Box::new(e)),
            }),
        );
    }

    /// Gets an iterator over the keys of the map
    pub fn keys(&self) -> impl Iterator<Item = &&'static str> { self.0.keys() }

    /// Writes a [`Document`] to a string with a given writer
    /// # Errors
    /// Returns an error received from a writer as a boxed trait object
    /// # Panics
    /// If key is not in map
    pub fn write(&self, name: &str, doc: Document) -> Result<String, Box<dyn Error>> {
        self.0.get(name).unwrap()(doc)
    }
}
