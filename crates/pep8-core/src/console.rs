//! Console I/O adapter for the character and decimal instructions.
//!
//! The core reads one byte at a time and never closes the underlying
//! streams; hosts supply them at construction.

use std::collections::VecDeque;
use std::io::{ErrorKind, Read, Write};

use thiserror::Error;

use crate::fault::FaultCode;

/// Host stream failure observed by the console adapter.
#[derive(Debug, Error)]
pub enum ConsoleError {
    /// Reading the input stream failed.
    #[error("console input read failed")]
    Read(#[source] std::io::Error),
    /// Writing the output stream failed.
    #[error("console output write failed")]
    Write(#[source] std::io::Error),
}

impl ConsoleError {
    /// Maps the stream failure onto the machine fault taxonomy.
    #[must_use]
    pub const fn fault_code(&self) -> FaultCode {
        match self {
            Self::Read(_) => FaultCode::InputFailed,
            Self::Write(_) => FaultCode::OutputFailed,
        }
    }
}

/// Byte-oriented console used by `DECI`, `DECO`, `STRO`, `CHARI` and `CHARO`.
pub trait ConsoleIo {
    /// Reads the next input byte, `None` at end of input.
    ///
    /// # Errors
    ///
    /// Returns [`ConsoleError::Read`] when the host stream fails.
    fn read_byte(&mut self) -> Result<Option<u8>, ConsoleError>;

    /// Writes bytes to the output stream.
    ///
    /// # Errors
    ///
    /// Returns [`ConsoleError::Write`] when the host stream fails.
    fn write_bytes(&mut self, bytes: &[u8]) -> Result<(), ConsoleError>;

    /// Pushes one byte back so the next [`ConsoleIo::read_byte`] returns it.
    fn unread_byte(&mut self, byte: u8);
}

impl<T: ConsoleIo + ?Sized> ConsoleIo for &mut T {
    fn read_byte(&mut self) -> Result<Option<u8>, ConsoleError> {
        (**self).read_byte()
    }

    fn write_bytes(&mut self, bytes: &[u8]) -> Result<(), ConsoleError> {
        (**self).write_bytes(bytes)
    }

    fn unread_byte(&mut self, byte: u8) {
        (**self).unread_byte(byte);
    }
}

/// Console over borrowed host streams.
pub struct StreamConsole<'io> {
    input: &'io mut dyn Read,
    output: &'io mut dyn Write,
    pushback: Option<u8>,
}

impl<'io> StreamConsole<'io> {
    /// Wraps borrowed input and output streams.
    #[must_use]
    pub const fn new(input: &'io mut dyn Read, output: &'io mut dyn Write) -> Self {
        Self {
            input,
            output,
            pushback: None,
        }
    }
}

impl std::fmt::Debug for StreamConsole<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StreamConsole").finish_non_exhaustive()
    }
}

impl ConsoleIo for StreamConsole<'_> {
    fn read_byte(&mut self) -> Result<Option<u8>, ConsoleError> {
        if let Some(byte) = self.pushback.take() {
            return Ok(Some(byte));
        }
        let mut byte = [0u8; 1];
        loop {
            match self.input.read(&mut byte) {
                Ok(0) => return Ok(None),
                Ok(_) => return Ok(Some(byte[0])),
                Err(err) if err.kind() == ErrorKind::Interrupted => {}
                Err(err) => return Err(ConsoleError::Read(err)),
            }
        }
    }

    fn write_bytes(&mut self, bytes: &[u8]) -> Result<(), ConsoleError> {
        self.output.write_all(bytes).map_err(ConsoleError::Write)
    }

    fn unread_byte(&mut self, byte: u8) {
        self.pushback = Some(byte);
    }
}

/// In-memory console for hosts and tests.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BufferConsole {
    input: VecDeque<u8>,
    output: Vec<u8>,
}

impl BufferConsole {
    /// Creates a console whose input yields `input` and then ends.
    #[must_use]
    pub fn with_input(input: &[u8]) -> Self {
        Self {
            input: input.iter().copied().collect(),
            output: Vec::new(),
        }
    }

    /// Bytes written so far.
    #[must_use]
    pub fn output(&self) -> &[u8] {
        &self.output
    }

    /// Number of input bytes not yet consumed.
    #[must_use]
    pub fn remaining_input(&self) -> usize {
        self.input.len()
    }
}

impl ConsoleIo for BufferConsole {
    fn read_byte(&mut self) -> Result<Option<u8>, ConsoleError> {
        Ok(self.input.pop_front())
    }

    fn write_bytes(&mut self, bytes: &[u8]) -> Result<(), ConsoleError> {
        self.output.extend_from_slice(bytes);
        Ok(())
    }

    fn unread_byte(&mut self, byte: u8) {
        self.input.push_front(byte);
    }
}

/// Parsed `DECI` input.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DecimalInput {
    /// Value truncated to 16-bit two's complement.
    pub value: u16,
    /// The parsed integer was below zero.
    pub negative: bool,
    /// The parsed integer was zero.
    pub zero: bool,
    /// The parsed integer was outside `-32768..=32767`.
    pub overflow: bool,
}

impl DecimalInput {
    const ZERO: Self = Self {
        value: 0,
        negative: false,
        zero: true,
        overflow: false,
    };
}

const fn digit_value(byte: u8) -> Option<u16> {
    if byte.is_ascii_digit() {
        Some((byte - b'0') as u16)
    } else {
        None
    }
}

fn next_byte(console: &mut dyn ConsoleIo) -> Result<Option<u8>, FaultCode> {
    console.read_byte().map_err(|e| e.fault_code())
}

/// Reads a signed decimal integer: an optional `-` followed by digits up to
/// the first non-digit (which is consumed) or end of input.
///
/// A `-` not followed by a digit reads as 0; the byte after it is left
/// unread.
///
/// # Errors
///
/// * [`FaultCode::InputExhausted`] when the input ends before the first
///   character, unless `zero_on_exhaustion` is set (then the value is 0).
/// * [`FaultCode::InvalidDecimalInput`] when the first character is neither a
///   digit nor `-`.
/// * [`FaultCode::InputFailed`] when the host stream fails.
pub fn read_decimal(
    console: &mut dyn ConsoleIo,
    zero_on_exhaustion: bool,
) -> Result<DecimalInput, FaultCode> {
    let Some(first) = next_byte(console)? else {
        return if zero_on_exhaustion {
            Ok(DecimalInput::ZERO)
        } else {
            Err(FaultCode::InputExhausted)
        };
    };

    let negative = first == b'-';
    let mut digit = if negative {
        match next_byte(console)? {
            Some(byte) => match digit_value(byte) {
                Some(digit) => digit,
                None => {
                    console.unread_byte(byte);
                    return Ok(DecimalInput::ZERO);
                }
            },
            None => return Ok(DecimalInput::ZERO),
        }
    } else {
        digit_value(first).ok_or(FaultCode::InvalidDecimalInput)?
    };

    let mut value = 0u16;
    let mut magnitude = 0u32;
    loop {
        value = value.wrapping_mul(10).wrapping_add(digit);
        magnitude = magnitude
            .saturating_mul(10)
            .saturating_add(u32::from(digit));
        match next_byte(console)?.and_then(digit_value) {
            Some(next) => digit = next,
            None => break,
        }
    }

    let limit = if negative { 32_768 } else { 32_767 };
    Ok(DecimalInput {
        value: if negative {
            value.wrapping_neg()
        } else {
            value
        },
        negative: negative && magnitude != 0,
        zero: magnitude == 0,
        overflow: magnitude > limit,
    })
}

/// Renders a word as a signed decimal number.
#[must_use]
pub fn format_decimal(value: u16) -> String {
    i16::from_be_bytes(value.to_be_bytes()).to_string()
}
