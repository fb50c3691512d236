//! Object-code text parsing.
//!
//! An object file is a sequence of whitespace-separated two-digit hexadecimal
//! byte tokens terminated by `zz`:
//!
//! ```text
//! C0 00 05 E1 00 10
//! 00 zz
//! ```
//!
//! The file is treated as raw bytes; only the tokens before the terminator
//! must be ASCII. Text after the terminator is ignored. A missing terminator
//! is accepted.

use std::fs;
use std::path::{Path, PathBuf};

use pep8_core::ADDRESS_SPACE_BYTES;
use thiserror::Error;

const TERMINATOR: &[u8] = b"zz";

/// Errors produced while loading object code.
#[derive(Debug, Error)]
pub enum LoadError {
    /// A token is not a two-digit hexadecimal byte or the terminator.
    #[error("line {line}: invalid object code token `{token}`")]
    InvalidToken {
        /// 1-indexed line number.
        line: usize,
        /// Offending token text.
        token: String,
    },
    /// The program does not fit the address space.
    #[error("object code is {len} bytes, larger than the 64 KiB address space")]
    ImageTooLarge {
        /// Number of bytes parsed.
        len: usize,
    },
    /// The object file could not be read.
    #[error("failed to read {}", path.display())]
    Io {
        /// Path that failed.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },
}

const fn hex_value(byte: u8) -> Option<u8> {
    match byte {
        b'0'..=b'9' => Some(byte - b'0'),
        b'a'..=b'f' => Some(byte - b'a' + 10),
        b'A'..=b'F' => Some(byte - b'A' + 10),
        _ => None,
    }
}

fn parse_byte(token: &[u8]) -> Option<u8> {
    match *token {
        [hi, lo] => Some((hex_value(hi)? << 4) | hex_value(lo)?),
        _ => None,
    }
}

/// Parses object-code text into a program image.
///
/// # Errors
///
/// Returns [`LoadError::InvalidToken`] for the first malformed token and
/// [`LoadError::ImageTooLarge`] when more than 64 KiB of bytes precede the
/// terminator.
pub fn parse_object_code(text: &[u8]) -> Result<Vec<u8>, LoadError> {
    let mut image = Vec::new();
    for (index, line) in text.split(|b| *b == b'\n').enumerate() {
        for token in line
            .split(u8::is_ascii_whitespace)
            .filter(|token| !token.is_empty())
        {
            if token.eq_ignore_ascii_case(TERMINATOR) {
                log::debug!("object code terminator on line {}", index + 1);
                return Ok(image);
            }
            let byte = parse_byte(token).ok_or_else(|| LoadError::InvalidToken {
                line: index + 1,
                token: String::from_utf8_lossy(token).into_owned(),
            })?;
            if image.len() == ADDRESS_SPACE_BYTES {
                return Err(LoadError::ImageTooLarge {
                    len: image.len() + 1,
                });
            }
            image.push(byte);
        }
    }
    log::debug!("object code ended without terminator");
    Ok(image)
}

/// Reads and parses an object file.
///
/// # Errors
///
/// Returns [`LoadError::Io`] when the file cannot be read, otherwise the
/// errors of [`parse_object_code`].
pub fn load_object_file(path: &Path) -> Result<Vec<u8>, LoadError> {
    let text = fs::read(path).map_err(|source| LoadError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    parse_object_code(&text)
}
