use std::error::Error;
use std::io;

/// Errors while loading a program image into memory, execution never starts.
#[derive(displaydoc::Display, Debug)]
pub enum ImageError {
    /// Could not open program image {path}: {source}
    Open { path: String, source: io::Error },
    /// Could not read program image: {0}
    Read(io::Error),
    /// Program image is missing its origin word, got {length} bytes
    MissingOrigin { length: usize },
}

impl Error for ImageError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Open { source, .. } | Self::Read(source) => Some(source),
            Self::MissingOrigin { .. } => None,
        }
    }
}

/// Errors ending a running program.
#[derive(displaydoc::Display, Debug)]
pub enum ExecutionError {
    /// Error during reading Stdin or writing program output to Stdout: {0}
    HostIo(io::Error),
    /// Execution interrupted by user
    Interrupted,
    /// Illegal instruction {instruction:#06X} at address {address:#06X}
    IllegalInstruction { instruction: u16, address: u16 },
}

impl Error for ExecutionError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::HostIo(source) => Some(source),
            Self::Interrupted | Self::IllegalInstruction { .. } => None,
        }
    }
}

impl From<io::Error> for ExecutionError {
    fn from(error: io::Error) -> Self {
        if error.kind() == io::ErrorKind::Interrupted {
            Self::Interrupted
        } else {
            Self::HostIo(error)
        }
    }
}
