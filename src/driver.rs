//! Radio driver seam
//!
//! This module defines the interface the library consumes from the radio
//! backend: role bring-up, the transmit primitive, promiscuous-mode control
//! and the MAC/association queries. Everything behind [`WifiDriver`] is an
//! external collaborator; the library never reaches past it.
//!
//! The trait is synchronous on purpose: the source system is
//! single-threaded cooperative, with receive dispatch running inside the
//! driver's own delivery context.
//!
//! A [`MockDriver`] backend is provided for tests and simulations. It
//! records every transmitted buffer and counts the calls it receives, and
//! its association outcome and station list are programmable.

use serde::{Deserialize, Serialize};

use crate::config::{AccessPointConfig, StationConfig};
use crate::interface::ApRecord;
use crate::{AirframeError, Result};

/// Coarse packet classification delivered alongside captured buffers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PacketType {
    Management,
    Control,
    Data,
    /// Anything the radio cannot classify.
    Misc,
}

/// Promiscuous-mode type filter applied by the radio before delivery.
///
/// The dispatch pipeline itself only handles data frames; this filter
/// restricts what the capture primitive delivers in the first place.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct PacketTypeFilter {
    pub data: bool,
    pub management: bool,
    pub control: bool,
}

impl PacketTypeFilter {
    /// Filter that admits only data frames, the common configuration.
    pub fn data_only() -> Self {
        Self {
            data: true,
            management: false,
            control: false,
        }
    }
}

impl Default for PacketTypeFilter {
    fn default() -> Self {
        Self::data_only()
    }
}

/// Interface to the station/access-point capable radio backend.
pub trait WifiDriver {
    /// Bring the radio up in station mode.
    fn start_station(&mut self) -> Result<()>;

    /// Bring the radio up in access-point mode with the given config.
    fn start_access_point(&mut self, config: &AccessPointConfig) -> Result<()>;

    /// MAC address of the active interface.
    fn own_mac(&self) -> Result<[u8; 6]>;

    /// Initiate association with the configured access point. Returns once
    /// the attempt is underway; completion is observed via
    /// [`WifiDriver::associated_ap`].
    fn begin_association(&mut self, config: &StationConfig) -> Result<()>;

    /// Record of the currently associated access point. Errors until the
    /// association resolves; polled by the engine's bounded retry loop.
    fn associated_ap(&self) -> Result<ApRecord>;

    /// MAC addresses of the currently associated stations, up to
    /// [`crate::MAX_STATIONS`]. Access-point mode only.
    fn station_list(&self) -> Result<Vec<[u8; 6]>>;

    /// Hand a fully encoded frame to the radio.
    ///
    /// `sys_sequence = true` documents that the hardware manages (and may
    /// overwrite) the sequence-control field. Delivery, ordering and
    /// retransmission are the radio's concern; success here means only that
    /// the bytes were accepted.
    fn transmit(&mut self, frame: &[u8], sys_sequence: bool) -> Result<()>;

    /// Enable or disable promiscuous capture.
    fn set_promiscuous(&mut self, enabled: bool) -> Result<()>;

    /// Install the promiscuous-mode type filter.
    fn set_type_filter(&mut self, filter: PacketTypeFilter) -> Result<()>;
}

/// Simulated radio backend for tests.
///
/// Transmitted buffers are kept verbatim so tests can assert on exact wire
/// bytes; `transmit_calls` doubles as a call-count spy. Association succeeds
/// after `association_ready_after` polls of [`MockDriver::associated_ap`]
/// when an `ap_record` is present, and fails forever otherwise.
#[derive(Debug, Default)]
pub struct MockDriver {
    pub mac: [u8; 6],
    pub ap_record: Option<ApRecord>,
    /// Number of `associated_ap` polls that fail before success.
    pub association_ready_after: u32,
    pub stations: Vec<[u8; 6]>,
    pub transmitted: Vec<Vec<u8>>,
    pub transmit_calls: u32,
    pub association_polls: std::cell::Cell<u32>,
    pub promiscuous: bool,
    pub filter: Option<PacketTypeFilter>,
    started: bool,
}

impl MockDriver {
    pub fn new(mac: [u8; 6]) -> Self {
        Self {
            mac,
            ..Self::default()
        }
    }

    /// Mock that associates successfully on the first poll.
    pub fn with_ap(mac: [u8; 6], ap_record: ApRecord) -> Self {
        Self {
            mac,
            ap_record: Some(ap_record),
            ..Self::default()
        }
    }

    /// Last buffer handed to [`WifiDriver::transmit`].
    pub fn last_transmitted(&self) -> Option<&[u8]> {
        self.transmitted.last().map(Vec::as_slice)
    }
}

impl WifiDriver for MockDriver {
    fn start_station(&mut self) -> Result<()> {
        self.started = true;
        Ok(())
    }

    fn start_access_point(&mut self, _config: &AccessPointConfig) -> Result<()> {
        self.started = true;
        Ok(())
    }

    fn own_mac(&self) -> Result<[u8; 6]> {
        if !self.started {
            return Err(AirframeError::Driver("radio not started".to_string()));
        }
        Ok(self.mac)
    }

    fn begin_association(&mut self, _config: &StationConfig) -> Result<()> {
        self.association_polls.set(0);
        Ok(())
    }

    fn associated_ap(&self) -> Result<ApRecord> {
        let polls = self.association_polls.get() + 1;
        self.association_polls.set(polls);
        match &self.ap_record {
            Some(record) if polls > self.association_ready_after => Ok(record.clone()),
            _ => Err(AirframeError::Driver("not yet associated".to_string())),
        }
    }

    fn station_list(&self) -> Result<Vec<[u8; 6]>> {
        Ok(self.stations.clone())
    }

    fn transmit(&mut self, frame: &[u8], _sys_sequence: bool) -> Result<()> {
        self.transmit_calls += 1;
        self.transmitted.push(frame.to_vec());
        Ok(())
    }

    fn set_promiscuous(&mut self, enabled: bool) -> Result<()> {
        self.promiscuous = enabled;
        Ok(())
    }

    fn set_type_filter(&mut self, filter: PacketTypeFilter) -> Result<()> {
        self.filter = Some(filter);
        Ok(())
    }
}
