use std::error::Error;
use std::fmt;

#[derive(Debug)]
pub enum LodestoneError {
    Io(std::io::Error),
    /// No supported schematic dialect accepts the byte stream.
    UnsupportedFormat(String),
    /// The operation was rejected before any write was issued.
    Validation(String),
    /// The operation was rejected because another run holds the guard.
    State(String),
}

impl fmt::Display for LodestoneError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LodestoneError::Io(err) => write!(f, "IO error: {}", err),
            LodestoneError::UnsupportedFormat(msg) => write!(f, "Unsupported format: {}", msg),
            LodestoneError::Validation(msg) => write!(f, "Validation error: {}", msg),
            LodestoneError::State(msg) => write!(f, "State error: {}", msg),
        }
    }
}

impl Error for LodestoneError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            LodestoneError::Io(err) => Some(err),
            _ => None,
        }
    }
}

impl From<std::io::Error> for LodestoneError {
    fn from(err: std::io::Error) -> Self {
        LodestoneError::Io(err)
    }
}
