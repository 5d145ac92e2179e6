//! Unified error types for the station firmware.
//!
//! A single `Error` enum that every subsystem can convert into, keeping
//! adapter-side error handling uniform.  All variants are `Copy` so they can
//! be logged and passed around without allocation.
//!
//! Errors never cross into the control core: adapters absorb them and
//! report "absent reading" or "submission failed" through the ports.

use core::fmt;

// ---------------------------------------------------------------------------
// Top-level firmware error
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Error {
    /// A sensor could not be read or returned implausible data.
    Sensor(SensorError),
    /// Upstream reporting failed.
    Report(ReportError),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Sensor(e) => write!(f, "sensor: {e}"),
            Self::Report(e) => write!(f, "report: {e}"),
        }
    }
}

// ---------------------------------------------------------------------------
// Sensor errors
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SensorError {
    /// Bus transaction (I2C/UART) failed or timed out.
    BusFailed,
    /// CRC / checksum mismatch on the received frame.
    Checksum,
    /// The sensor has no data ready yet.
    NotReady,
    /// Reading is outside the physically plausible range.
    OutOfRange,
    /// The operation is not supported by this sensor (e.g. heater).
    Unsupported,
}

impl fmt::Display for SensorError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::BusFailed => write!(f, "bus transaction failed"),
            Self::Checksum => write!(f, "checksum mismatch"),
            Self::NotReady => write!(f, "no data ready"),
            Self::OutOfRange => write!(f, "reading out of range"),
            Self::Unsupported => write!(f, "operation not supported"),
        }
    }
}

impl From<SensorError> for Error {
    fn from(e: SensorError) -> Self {
        Self::Sensor(e)
    }
}

// ---------------------------------------------------------------------------
// Reporting errors
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReportError {
    /// No upstream token configured.
    NoToken,
    /// None of the queued values has an upstream id.
    NothingToSend,
    /// Payload did not fit the request buffer.
    PayloadTooLarge,
    /// HTTP connection or request failed.
    Transport,
    /// Upstream answered with a non-success status.
    Rejected(u16),
}

impl fmt::Display for ReportError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NoToken => write!(f, "no upstream token configured"),
            Self::NothingToSend => write!(f, "no reportable values"),
            Self::PayloadTooLarge => write!(f, "payload too large"),
            Self::Transport => write!(f, "transport failed"),
            Self::Rejected(status) => write!(f, "rejected with HTTP {status}"),
        }
    }
}

impl From<ReportError> for Error {
    fn from(e: ReportError) -> Self {
        Self::Report(e)
    }
}

// ---------------------------------------------------------------------------
// Convenience Result alias
// ---------------------------------------------------------------------------

/// Firmware-wide `Result` alias.
pub type Result<T> = core::result::Result<T, Error>;
