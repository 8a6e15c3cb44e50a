use super::class_file::Tag;
use std::error::Error as StdError;
use std::fmt;
use std::io;

/// Errors produced while parsing, encoding, or editing a class file
///
/// Every parse error carries the byte offset of the first byte of the read that failed.
#[derive(Debug)]
pub enum Error {
    /// The buffer does not start with `0xCAFEBABE`
    WrongMagic { magic: u32, offset: usize },

    /// A read would run past the end of the readable window
    NotEnoughBytes {
        offset: usize,
        needed: usize,
        available: usize,
    },

    /// A constant pool entry had a tag outside the known set
    UnknownTag { tag: u8, offset: usize },

    /// A `Utf8` constant does not hold well-formed modified UTF-8
    InvalidText { index: u16 },

    /// The index is slot 0, past the end of the pool, or a wide entry's placeholder
    InvalidConstantIndex { index: u16 },

    /// The constant at `index` is not of the kind the caller asked for
    UnexpectedConstant { index: u16, expected: Tag, found: Tag },

    /// An `Empty` placeholder was offered as a constant in its own right
    EmptyEntry { index: u16 },

    /// A `Long` or `Double` sits in the last slot of the pool, leaving no room for its placeholder
    WideEntryPastPoolEnd { index: u16, offset: usize },

    /// The pool would need more slots than a `u16` count can describe
    ConstantPoolOverflow { slots: usize },

    /// An attribute view finished decoding before the end of the payload
    TrailingBytes { offset: usize, remaining: usize },

    IoError(io::Error),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::WrongMagic { magic, offset } => {
                write!(f, "wrong magic {magic:#010x} at byte {offset}")
            }
            Error::NotEnoughBytes {
                offset,
                needed,
                available,
            } => write!(
                f,
                "not enough bytes at byte {offset}: needed {needed}, {available} available"
            ),
            Error::UnknownTag { tag, offset } => {
                write!(f, "unknown constant pool tag {tag} at byte {offset}")
            }
            Error::InvalidText { index } => {
                write!(f, "constant #{index} is not valid modified UTF-8")
            }
            Error::InvalidConstantIndex { index } => {
                write!(f, "#{index} does not address a usable constant pool slot")
            }
            Error::UnexpectedConstant {
                index,
                expected,
                found,
            } => write!(f, "constant #{index} is {found:?}, expected {expected:?}"),
            Error::EmptyEntry { index } => {
                write!(f, "cannot store an empty placeholder at #{index}")
            }
            Error::WideEntryPastPoolEnd { index, offset } => write!(
                f,
                "wide constant #{index} at byte {offset} overruns the constant pool count"
            ),
            Error::ConstantPoolOverflow { slots } => {
                write!(f, "constant pool of {slots} slots does not fit a u16 count")
            }
            Error::TrailingBytes { offset, remaining } => {
                write!(f, "{remaining} trailing bytes at byte {offset}")
            }
            Error::IoError(err) => write!(f, "IO error: {err}"),
        }
    }
}

impl StdError for Error {
    fn source(&self) -> Option<&(dyn StdError + 'static)> {
        match self {
            Error::IoError(err) => Some(err),
            _ => None,
        }
    }
}

impl From<io::Error> for Error {
    fn from(err: io::Error) -> Self {
        Error::IoError(err)
    }
}
