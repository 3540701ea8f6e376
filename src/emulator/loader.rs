//! Program images: a big-endian origin word followed by big-endian words loaded from there on.
use crate::errors::ImageError;
use crate::hardware::memory::{MEMORY_SIZE, Memory};
use log::debug;
use std::fs::File;
use std::io::Read;
use std::path::Path;

/// A parsed image, words are in host byte order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProgramImage {
    pub origin: u16,
    pub words: Vec<u16>,
}

impl ProgramImage {
    /// Parses image bytes. A trailing odd byte is ignored.
    ///
    /// # Errors
    /// - fewer than two bytes, so no origin word
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, ImageError> {
        let mut words = bytes
            .chunks_exact(2)
            .map(|pair| u16::from_be_bytes([pair[0], pair[1]]));
        let origin = words
            .next()
            .ok_or(ImageError::MissingOrigin { length: bytes.len() })?;
        Ok(Self {
            origin,
            words: words.collect(),
        })
    }

    /// # Errors
    /// - reading the stream failed
    /// - the stream ended before the origin word
    pub fn from_reader(mut reader: impl Read) -> Result<Self, ImageError> {
        let mut bytes = Vec::new();
        reader.read_to_end(&mut bytes).map_err(ImageError::Read)?;
        Self::from_bytes(&bytes)
    }

    /// # Errors
    /// - the file cannot be opened or read
    /// - the file is shorter than the origin word
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ImageError> {
        let path = path.as_ref();
        let file = File::open(path).map_err(|source| ImageError::Open {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_reader(file)
    }

    /// Stores the words starting at `origin`, words beyond the end of memory are dropped.
    /// Returns the number of words stored.
    pub fn load_into(&self, memory: &mut Memory) -> usize {
        let stored = memory.load(self.origin, &self.words);
        if stored < self.words.len() {
            debug!(
                "Image truncated at end of memory, dropped {} of {} words",
                self.words.len() - stored,
                self.words.len()
            );
        }
        debug!(
            "Loaded {stored} words at origin {:#06X}, {} words of memory left",
            self.origin,
            MEMORY_SIZE - usize::from(self.origin) - stored
        );
        stored
    }
}
