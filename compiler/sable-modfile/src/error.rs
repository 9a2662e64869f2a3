//! Error definitions for reading and writing module files.

use std::{fmt, io};

pub type ModfileResult<T> = Result<T, ModfileError>;

/// An error that occurred whilst reading or writing a module file.
#[derive(Debug)]
pub enum ModfileError {
    /// An underlying I/O failure that is unrelated to the contents of the
    /// stream.
    Io(io::Error),
    /// The stream is not a well-formed module file.
    Corrupt(CorruptKind),
}

/// The ways in which a module file can be malformed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CorruptKind {
    /// The stream does not begin with the module file magic.
    BadMagic([u8; 4]),
    /// The file was produced by a compiler with an incompatible module
    /// file format.
    UnsupportedVersion(u16),
    /// The stream ended in the middle of a record.
    Truncated,
    /// A value marker byte that the reader does not recognise.
    UnknownValueMarker(u8),
    /// A string record that is not valid UTF-8.
    InvalidString,
    /// A value nested deeper than the codec accepts.
    DepthLimitExceeded,
    /// A declaration kind tag that the reader does not recognise.
    UnknownDeclKind(u8),
    /// A known attribute whose payload does not have the shape that the
    /// attribute defines.
    MalformedPayload(&'static str),
}

impl From<io::Error> for ModfileError {
    fn from(err: io::Error) -> Self {
        // Running out of bytes in the middle of a record means the file
        // has been cut short.
        if err.kind() == io::ErrorKind::UnexpectedEof {
            ModfileError::Corrupt(CorruptKind::Truncated)
        } else {
            ModfileError::Io(err)
        }
    }
}

impl fmt::Display for CorruptKind {
    fn fmt(&self, out: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CorruptKind::BadMagic(magic) => {
                write!(out, "the stream does not begin with the module magic, found `{magic:x?}`")
            }
            CorruptKind::UnsupportedVersion(version) => {
                write!(out, "unsupported module format version `{version}`")
            }
            CorruptKind::Truncated => write!(out, "the stream ended in the middle of a record"),
            CorruptKind::UnknownValueMarker(marker) => {
                write!(out, "unknown value marker `{marker:#04x}`")
            }
            CorruptKind::InvalidString => write!(out, "a string record is not valid UTF-8"),
            CorruptKind::DepthLimitExceeded => {
                write!(out, "a value exceeds the nesting depth limit")
            }
            CorruptKind::UnknownDeclKind(kind) => {
                write!(out, "unknown declaration kind tag `{kind:#04x}`")
            }
            CorruptKind::MalformedPayload(attr) => {
                write!(out, "malformed payload for the `{attr}` attribute")
            }
        }
    }
}

impl fmt::Display for ModfileError {
    fn fmt(&self, out: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ModfileError::Io(err) => write!(out, "failed to access module file: {err}"),
            ModfileError::Corrupt(kind) => write!(out, "corrupt module file: {kind}"),
        }
    }
}

impl std::error::Error for ModfileError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ModfileError::Io(err) => Some(err),
            ModfileError::Corrupt(_) => None,
        }
    }
}
