//! # Airframe
//!
//! A packet-construction and callback-dispatch library for raw IEEE 802.11
//! MAC data frames on a station/access-point capable radio.
//!
//! The library lets a host application allocate wire-correct frames from
//! semantic fields, register a pipeline of callbacks that inspect or mutate a
//! frame's fields before it is logged and transmitted, and receive the same
//! treatment for frames captured off the air in promiscuous mode.
//!
//! ## Architecture
//!
//! The implementation is organized into several modules:
//! - `frame`: MAC data frame model, wire encoding and log renderings
//! - `callbacks`: per-field callback registry and print-mode selectors
//! - `interface`: station/access-point role state machine
//! - `config`: station, access-point and association configuration
//! - `driver`: radio driver seam (transmit/capture primitives)
//! - `engine`: the context object tying driver, state and callbacks together
//! - `pipeline`: ordered callback dispatch for the send and receive paths
//!
//! Radio bring-up, the actual transmit/capture primitives and persistence are
//! external collaborators reached through the [`driver::WifiDriver`] trait;
//! the library's contract ends at "bytes were handed to the transmit
//! primitive" / "bytes were delivered by the capture primitive".

pub mod callbacks;
pub mod config;
pub mod driver;
pub mod engine;
pub mod frame;
pub mod interface;
pub mod pipeline;

// Re-export commonly used types
pub use crate::{
    callbacks::{CallbackSet, PrintMode},
    config::{AccessPointConfig, AssociationPolicy, EngineConfig, StationConfig},
    driver::{MockDriver, PacketType, PacketTypeFilter, WifiDriver},
    engine::PacketEngine,
    frame::{format_mac, MacDataFrame},
    interface::{ApRecord, InterfaceState, Role},
};

// Error types
use thiserror::Error;

#[derive(Error, Debug)]
pub enum AirframeError {
    /// A send was attempted before any role was configured.
    #[error("wifi interface not configured")]
    InterfaceNotConfigured,

    /// A role-gated helper was called under the wrong role.
    #[error("wrong role for operation: expected {expected:?}, active {active:?}")]
    WrongRole {
        expected: Role,
        active: Option<Role>,
    },

    /// A station-side helper was called before association completed.
    #[error("not associated with an access point")]
    NotAssociated,

    /// Association polling exhausted its bounded attempt budget.
    #[error("association timed out after {attempts} attempts")]
    AssociationTimeout { attempts: u32 },

    /// An address argument was not exactly six bytes.
    #[error("invalid length for {field}: expected {expected} bytes, got {actual}")]
    InvalidFieldLength {
        field: &'static str,
        expected: usize,
        actual: usize,
    },

    /// A captured buffer is too small for the claimed frame.
    #[error("frame too short: expected at least {expected} bytes, got {actual}")]
    FrameTooShort { expected: usize, actual: usize },

    /// The radio backend reported a fault.
    #[error("driver error: {0}")]
    Driver(String),

    #[error("configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, AirframeError>;

// Constants
/// Fixed MAC data frame header size on the wire, in bytes
/// (frame_control 2 + duration_id 2 + three addresses 18 +
/// sequence_control 2 + address_4 6).
pub const MAC_HEADER_LEN: usize = 30;
/// The all-ones broadcast MAC address.
pub const BROADCAST_ADDR: [u8; 6] = [0xFF; 6];
/// Largest station list the access-point side reports.
pub const MAX_STATIONS: usize = 10;

/// Log target used by the dispatch pipeline's print stages.
pub(crate) const LOG_TARGET: &str = "airframe";

// Utility functions
pub fn init_logging() {
    env_logger::init();
}
