use std::error::Error;
use std::fmt;

#[derive(Debug)]
pub enum StoreError {
    Io(String),
    Corrupt(String),
    Serialize(String),
}

impl fmt::Display for StoreError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StoreError::Io(msg) => write!(f, "Storage I/O error: {msg}"),
            StoreError::Corrupt(msg) => write!(f, "Stored data is malformed: {msg}"),
            StoreError::Serialize(msg) => write!(f, "Serialization error: {msg}"),
        }
    }
}

impl Error for StoreError {}
