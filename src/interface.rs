//! Role and interface state
//!
//! Tracks whether the local node is configured as a station or an access
//! point, its own MAC address and, for stations, the record of the
//! associated access point. The state gates which send helpers are legal at
//! a given moment; role-gated operations fail closed without building a
//! frame or touching the radio.

use serde::{Deserialize, Serialize};

use crate::{format_mac, AirframeError, Result};

/// Active radio role.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Role {
    /// Node associates with an access point.
    Station,
    /// Node accepts associations from stations.
    AccessPoint,
}

/// Record of the access point a station is associated with.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApRecord {
    /// BSSID of the access point.
    pub bssid: [u8; 6],
    /// Broadcast network name.
    pub ssid: String,
    /// Primary channel.
    pub channel: u8,
    /// Signal strength at association time, in dBm.
    pub rssi: i8,
}

/// Interface state consulted by every send path.
///
/// Lifecycle: `Unconfigured → StationConfigured → StationAssociated`, or
/// `Unconfigured → AccessPointConfigured`. Exactly one role is active at a
/// time; configuring a role replaces the previous one wholesale.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct InterfaceState {
    role: Option<Role>,
    own_mac: [u8; 6],
    associated: bool,
    ap_record: Option<ApRecord>,
}

impl InterfaceState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Enter station role with the given local MAC. Clears any previous
    /// association.
    pub fn set_station(&mut self, own_mac: [u8; 6]) {
        log::info!("interface role: {:?} -> Station ({})", self.role, format_mac(&own_mac));
        self.role = Some(Role::Station);
        self.own_mac = own_mac;
        self.associated = false;
        self.ap_record = None;
    }

    /// Enter access-point role with the given local MAC.
    pub fn set_access_point(&mut self, own_mac: [u8; 6]) {
        log::info!(
            "interface role: {:?} -> AccessPoint ({})",
            self.role,
            format_mac(&own_mac)
        );
        self.role = Some(Role::AccessPoint);
        self.own_mac = own_mac;
        self.associated = false;
        self.ap_record = None;
    }

    /// Record a completed association. Station role only.
    pub fn set_associated(&mut self, record: ApRecord) -> Result<()> {
        self.require_role(Role::Station)?;
        log::info!("associated with AP {}", format_mac(&record.bssid));
        self.associated = true;
        self.ap_record = Some(record);
        Ok(())
    }

    pub fn role(&self) -> Option<Role> {
        self.role
    }

    /// Whether the transmit primitive may legally be invoked.
    pub fn is_ready(&self) -> bool {
        self.role.is_some()
    }

    pub fn is_associated(&self) -> bool {
        self.associated
    }

    /// This node's MAC address. Errors until a role has been configured.
    pub fn own_mac(&self) -> Result<[u8; 6]> {
        if self.role.is_none() {
            return Err(AirframeError::InterfaceNotConfigured);
        }
        Ok(self.own_mac)
    }

    /// Record of the associated access point. Errors until association
    /// completes.
    pub fn ap_record(&self) -> Result<&ApRecord> {
        self.ap_record.as_ref().ok_or(AirframeError::NotAssociated)
    }

    /// Fail-closed check used before any send.
    pub fn require_ready(&self) -> Result<()> {
        if self.role.is_none() {
            return Err(AirframeError::InterfaceNotConfigured);
        }
        Ok(())
    }

    /// Fail-closed role check used by the role-gated helpers.
    pub fn require_role(&self, expected: Role) -> Result<()> {
        match self.role {
            None => Err(AirframeError::InterfaceNotConfigured),
            Some(active) if active != expected => Err(AirframeError::WrongRole {
                expected,
                active: Some(active),
            }),
            Some(_) => Ok(()),
        }
    }

    /// Fail-closed association check used by the station-side helpers.
    pub fn require_associated(&self) -> Result<&ApRecord> {
        self.require_role(Role::Station)?;
        if !self.associated {
            return Err(AirframeError::NotAssociated);
        }
        self.ap_record.as_ref().ok_or(AirframeError::NotAssociated)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record() -> ApRecord {
        ApRecord {
            bssid: [0xA0, 0xA1, 0xA2, 0xA3, 0xA4, 0xA5],
            ssid: "esp32SSID".to_string(),
            channel: 6,
            rssi: -42,
        }
    }

    #[test]
    fn test_unconfigured_fails_closed() {
        let state = InterfaceState::new();
        assert!(!state.is_ready());
        assert!(matches!(
            state.require_ready(),
            Err(AirframeError::InterfaceNotConfigured)
        ));
        assert!(matches!(
            state.own_mac(),
            Err(AirframeError::InterfaceNotConfigured)
        ));
        assert!(matches!(
            state.require_role(Role::Station),
            Err(AirframeError::InterfaceNotConfigured)
        ));
    }

    #[test]
    fn test_station_lifecycle() {
        let mut state = InterfaceState::new();
        state.set_station([1, 2, 3, 4, 5, 6]);

        assert_eq!(state.role(), Some(Role::Station));
        assert!(state.is_ready());
        assert!(!state.is_associated());
        assert_eq!(state.own_mac().unwrap(), [1, 2, 3, 4, 5, 6]);
        assert!(matches!(
            state.require_associated(),
            Err(AirframeError::NotAssociated)
        ));

        state.set_associated(record()).unwrap();
        assert!(state.is_associated());
        assert_eq!(state.require_associated().unwrap().channel, 6);
        assert_eq!(state.ap_record().unwrap().bssid[0], 0xA0);
    }

    #[test]
    fn test_role_mismatch() {
        let mut state = InterfaceState::new();
        state.set_access_point([9; 6]);

        let err = state.require_role(Role::Station).unwrap_err();
        assert!(matches!(
            err,
            AirframeError::WrongRole {
                expected: Role::Station,
                active: Some(Role::AccessPoint),
            }
        ));
    }

    #[test]
    fn test_reconfigure_clears_association() {
        let mut state = InterfaceState::new();
        state.set_station([1; 6]);
        state.set_associated(record()).unwrap();
        assert!(state.is_associated());

        state.set_access_point([2; 6]);
        assert_eq!(state.role(), Some(Role::AccessPoint));
        assert!(!state.is_associated());
        assert!(state.ap_record().is_err());
    }

    #[test]
    fn test_associate_requires_station_role() {
        let mut state = InterfaceState::new();
        state.set_access_point([2; 6]);
        assert!(state.set_associated(record()).is_err());
    }
}
