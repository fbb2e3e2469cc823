//! Packet engine
//!
//! [`PacketEngine`] is the context object that ties the radio driver, the
//! interface state and the two callback sets together. It replaces the
//! process-wide statics of the source system with an explicit, owned value:
//! a host application creates one engine per radio and passes it wherever
//! dispatch is needed, which also lets independent instances run side by
//! side in tests.
//!
//! The engine owns role setup, the bounded association-polling loop and the
//! four role-aware addressed-send helpers. The dispatch stages themselves
//! live in [`crate::pipeline`].

use std::thread;

use crate::callbacks::CallbackSet;
use crate::config::{AccessPointConfig, AssociationPolicy, StationConfig};
use crate::driver::{PacketTypeFilter, WifiDriver};
use crate::frame::MacDataFrame;
use crate::interface::{ApRecord, InterfaceState, Role};
use crate::{format_mac, AirframeError, Result, BROADCAST_ADDR, MAX_STATIONS};

/// Frame-control value for a plain data frame.
pub const FRAME_CONTROL_DATA: u16 = 0x0008;
/// Frame-control value for a data frame travelling toward the AP (To-DS).
pub const FRAME_CONTROL_DATA_TO_DS: u16 = 0x0108;
/// Frame-control value for a data frame leaving the AP (From-DS).
pub const FRAME_CONTROL_DATA_FROM_DS: u16 = 0x0208;
/// Duration value the addressed-send helpers stamp on outgoing frames.
pub const DEFAULT_DURATION_ID: u16 = 0x00FA;

/// Context object owning the driver, interface state and callback sets.
pub struct PacketEngine<D: WifiDriver> {
    pub(crate) driver: D,
    pub(crate) interface: InterfaceState,
    pub(crate) send_callbacks: CallbackSet,
    pub(crate) receive_callbacks: CallbackSet,
    policy: AssociationPolicy,
}

impl<D: WifiDriver> PacketEngine<D> {
    pub fn new(driver: D) -> Self {
        Self::with_policy(driver, AssociationPolicy::default())
    }

    pub fn with_policy(driver: D, policy: AssociationPolicy) -> Self {
        Self {
            driver,
            interface: InterfaceState::new(),
            send_callbacks: CallbackSet::new(),
            receive_callbacks: CallbackSet::new(),
            policy,
        }
    }

    pub fn driver(&self) -> &D {
        &self.driver
    }

    pub fn driver_mut(&mut self) -> &mut D {
        &mut self.driver
    }

    pub fn interface(&self) -> &InterfaceState {
        &self.interface
    }

    /// Callback registry consulted by the send path.
    pub fn send_callbacks_mut(&mut self) -> &mut CallbackSet {
        &mut self.send_callbacks
    }

    /// Callback registry consulted by the receive path.
    pub fn receive_callbacks_mut(&mut self) -> &mut CallbackSet {
        &mut self.receive_callbacks
    }

    // ----------------------------------------------------------------
    // Setup and association
    // ----------------------------------------------------------------

    /// Bring the radio up as a station and store the local MAC. The node
    /// can receive and send raw frames afterwards but is not associated.
    pub fn configure_as_station(&mut self) -> Result<()> {
        self.driver.start_station()?;
        let mac = self.driver.own_mac()?;
        self.interface.set_station(mac);
        Ok(())
    }

    /// Bring the radio up as an access point and start accepting
    /// associations.
    pub fn configure_as_access_point(&mut self, config: &AccessPointConfig) -> Result<()> {
        self.driver.start_access_point(config)?;
        let mac = self.driver.own_mac()?;
        self.interface.set_access_point(mac);
        Ok(())
    }

    /// Associate with an access point, polling the driver a bounded number
    /// of times.
    ///
    /// Polls [`WifiDriver::associated_ap`] up to `policy.max_attempts`
    /// times with a fixed `policy.poll_interval` sleep between attempts.
    /// On success the AP record is stored and station-side send helpers
    /// become legal; after exhausting the budget the interface stays in
    /// station role and [`AirframeError::AssociationTimeout`] is returned.
    pub fn connect_to_access_point(&mut self, config: &StationConfig) -> Result<()> {
        self.interface.require_role(Role::Station)?;
        self.driver.begin_association(config)?;

        for attempt in 1..=self.policy.max_attempts {
            log::info!("connecting to AP, attempt {attempt}");
            match self.driver.associated_ap() {
                Ok(record) => {
                    self.interface.set_associated(record)?;
                    return Ok(());
                }
                Err(err) => {
                    log::debug!("association poll {attempt} failed: {err}");
                }
            }
            if attempt < self.policy.max_attempts && !self.policy.poll_interval.is_zero() {
                thread::sleep(self.policy.poll_interval);
            }
        }

        Err(AirframeError::AssociationTimeout {
            attempts: self.policy.max_attempts,
        })
    }

    /// Enable or disable promiscuous capture on the radio.
    pub fn set_promiscuous(&mut self, enabled: bool) -> Result<()> {
        self.driver.set_promiscuous(enabled)
    }

    /// Install the promiscuous type filter on the radio.
    pub fn set_type_filter(&mut self, filter: PacketTypeFilter) -> Result<()> {
        self.driver.set_type_filter(filter)
    }

    /// Convenience: install a receive-side general callback and enable
    /// promiscuous capture in one step.
    pub fn setup_promiscuous_with_general(
        &mut self,
        callback: impl FnMut(&mut MacDataFrame, usize) + Send + 'static,
    ) -> Result<()> {
        self.receive_callbacks.set_general(callback);
        self.driver.set_promiscuous(true)
    }

    // ----------------------------------------------------------------
    // Queries
    // ----------------------------------------------------------------

    /// This node's MAC address.
    pub fn own_mac(&self) -> Result<[u8; 6]> {
        self.interface.own_mac()
    }

    /// Full record of the associated access point. Station role only.
    pub fn ap_record(&self) -> Result<&ApRecord> {
        self.interface.ap_record()
    }

    /// BSSID of the associated access point. Station role only.
    pub fn ap_mac(&self) -> Result<[u8; 6]> {
        Ok(self.interface.ap_record()?.bssid)
    }

    /// MAC addresses of the currently associated stations, capped at
    /// [`MAX_STATIONS`]. Access-point role only.
    pub fn connected_station_macs(&self) -> Result<Vec<[u8; 6]>> {
        self.interface.require_role(Role::AccessPoint)?;
        let mut stations = self.driver.station_list()?;
        stations.truncate(MAX_STATIONS);
        Ok(stations)
    }

    // ----------------------------------------------------------------
    // Addressed-send helpers
    // ----------------------------------------------------------------

    /// AP → one station: addr1 is the target, addr2 and addr3 are the AP's
    /// own MAC, frame control marks "data, From-DS".
    pub fn ap_send_to_station(&mut self, payload: &[u8], station: [u8; 6]) -> Result<()> {
        self.interface.require_role(Role::AccessPoint)?;
        let own = self.interface.own_mac()?;
        let mut frame = MacDataFrame::new(
            FRAME_CONTROL_DATA_FROM_DS,
            DEFAULT_DURATION_ID,
            station,
            own,
            own,
            // Managed by the radio and overwritten on transmit.
            0x0000,
            [0; 6],
            payload.to_vec(),
        );
        log::debug!("AP send to station {}", format_mac(&station));
        self.send_frame(&mut frame)
    }

    /// AP → broadcast: same header as [`Self::ap_send_to_station`] with the
    /// all-ones target, regardless of the current station list.
    pub fn ap_send_broadcast(&mut self, payload: &[u8]) -> Result<()> {
        self.interface.require_role(Role::AccessPoint)?;
        self.ap_send_to_station(payload, BROADCAST_ADDR)
    }

    /// Station → associated AP: addr1 and addr3 carry the BSSID, addr2 the
    /// station's own MAC, frame control marks "data, To-DS". Fails with
    /// [`AirframeError::NotAssociated`] before association completes.
    pub fn sta_send_to_access_point(&mut self, payload: &[u8]) -> Result<()> {
        let bssid = self.interface.require_associated()?.bssid;
        let own = self.interface.own_mac()?;
        let mut frame = MacDataFrame::new(
            FRAME_CONTROL_DATA_TO_DS,
            DEFAULT_DURATION_ID,
            bssid,
            own,
            bssid,
            0x0000,
            [0; 6],
            payload.to_vec(),
        );
        self.send_frame(&mut frame)
    }

    /// Station → target station, relayed through the AP.
    ///
    /// The header is addressed exactly like [`Self::sta_send_to_access_point`];
    /// the real destination travels in front of the payload (the relay
    /// contract: the AP-side application reads the first six payload bytes
    /// as the final destination). Fails before association completes.
    pub fn sta_send_through_access_point(
        &mut self,
        payload: &[u8],
        target: [u8; 6],
    ) -> Result<()> {
        let bssid = self.interface.require_associated()?.bssid;
        let own = self.interface.own_mac()?;
        let mut relayed = Vec::with_capacity(6 + payload.len());
        relayed.extend_from_slice(&target);
        relayed.extend_from_slice(payload);
        let mut frame = MacDataFrame::new(
            FRAME_CONTROL_DATA_TO_DS,
            DEFAULT_DURATION_ID,
            bssid,
            own,
            bssid,
            0x0000,
            [0; 6],
            relayed,
        );
        log::debug!("relay send toward {}", format_mac(&target));
        self.send_frame(&mut frame)
    }
}
