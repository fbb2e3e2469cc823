//! MAC data frame model
//!
//! This module contains the wire-exact model of an IEEE 802.11 MAC data
//! frame with the unconditional 4-address layout, its encode/decode
//! functions and the two human-readable renderings used by the dispatch
//! pipeline's print stages.

use bytes::{Buf, BufMut};

use crate::{AirframeError, Result, MAC_HEADER_LEN};

/// One MAC data unit: fixed 30-byte header plus a variable-length payload.
///
/// `frame_control` is carried as an opaque 16-bit value. The bit-to-semantic
/// mapping of the capture/transmit primitive is not re-derived here; callers
/// populate it from known-good constants (`0x0008` plain data, `0x0108`
/// To-DS, `0x0208` From-DS).
///
/// `sequence_control` is commonly overwritten by the radio hardware on
/// transmit, so an application-supplied value is not guaranteed to survive
/// to the wire.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MacDataFrame {
    pub frame_control: u16,
    pub duration_id: u16,
    pub address_1: [u8; 6],
    pub address_2: [u8; 6],
    pub address_3: [u8; 6],
    pub sequence_control: u16,
    pub address_4: [u8; 6],
    pub payload: Vec<u8>,
}

impl MacDataFrame {
    /// Create a frame from explicit field values and an owned payload.
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        frame_control: u16,
        duration_id: u16,
        address_1: [u8; 6],
        address_2: [u8; 6],
        address_3: [u8; 6],
        sequence_control: u16,
        address_4: [u8; 6],
        payload: Vec<u8>,
    ) -> Self {
        Self {
            frame_control,
            duration_id,
            address_1,
            address_2,
            address_3,
            sequence_control,
            address_4,
            payload,
        }
    }

    /// Create a frame from borrowed address slices, copying every field.
    ///
    /// All-or-nothing: fails with [`AirframeError::InvalidFieldLength`] if
    /// any address slice is not exactly six bytes; no partial frame is
    /// produced.
    #[allow(clippy::too_many_arguments)]
    pub fn from_slices(
        frame_control: u16,
        duration_id: u16,
        address_1: &[u8],
        address_2: &[u8],
        address_3: &[u8],
        sequence_control: u16,
        address_4: &[u8],
        payload: &[u8],
    ) -> Result<Self> {
        Ok(Self {
            frame_control,
            duration_id,
            address_1: copy_addr("address_1", address_1)?,
            address_2: copy_addr("address_2", address_2)?,
            address_3: copy_addr("address_3", address_3)?,
            sequence_control,
            address_4: copy_addr("address_4", address_4)?,
            payload: payload.to_vec(),
        })
    }

    /// Scaffolding constructor: all control and address fields zeroed,
    /// payload zero-filled to `payload_length`.
    pub fn zeroed(payload_length: usize) -> Self {
        Self::with_payload(vec![0; payload_length])
    }

    /// Scaffolding constructor: all control and address fields zeroed
    /// around the given payload.
    pub fn with_payload(payload: Vec<u8>) -> Self {
        Self {
            frame_control: 0,
            duration_id: 0,
            address_1: [0; 6],
            address_2: [0; 6],
            address_3: [0; 6],
            sequence_control: 0,
            address_4: [0; 6],
            payload,
        }
    }

    /// Payload length in bytes.
    pub fn payload_len(&self) -> usize {
        self.payload.len()
    }

    /// Total on-wire size: fixed header plus payload.
    pub fn wire_len(&self) -> usize {
        MAC_HEADER_LEN + self.payload.len()
    }

    /// Serialize the frame in wire order.
    ///
    /// Layout: `frame_control(2) | duration_id(2) | address_1(6) |
    /// address_2(6) | address_3(6) | sequence_control(2) | address_4(6) |
    /// payload`. The u16 fields are little-endian, matching the in-memory
    /// layout the capture/transmit primitive observes. The payload carries
    /// no length prefix; its length travels out of band.
    pub fn encode_into(&self, buf: &mut impl BufMut) {
        buf.put_u16_le(self.frame_control);
        buf.put_u16_le(self.duration_id);
        buf.put_slice(&self.address_1);
        buf.put_slice(&self.address_2);
        buf.put_slice(&self.address_3);
        buf.put_u16_le(self.sequence_control);
        buf.put_slice(&self.address_4);
        buf.put_slice(&self.payload);
    }

    /// Serialize the frame to a freshly allocated buffer.
    pub fn encode(&self) -> Vec<u8> {
        let mut buf = Vec::with_capacity(self.wire_len());
        self.encode_into(&mut buf);
        buf
    }

    /// Parse a frame from a wire buffer.
    ///
    /// `payload_length` is supplied out of band by the capture path and is
    /// authoritative; nothing inside the buffer describes it.
    pub fn decode(mut buf: &[u8], payload_length: usize) -> Result<Self> {
        let expected = MAC_HEADER_LEN + payload_length;
        if buf.remaining() < expected {
            return Err(AirframeError::FrameTooShort {
                expected,
                actual: buf.remaining(),
            });
        }

        let frame_control = buf.get_u16_le();
        let duration_id = buf.get_u16_le();
        let mut address_1 = [0u8; 6];
        let mut address_2 = [0u8; 6];
        let mut address_3 = [0u8; 6];
        let mut address_4 = [0u8; 6];
        buf.copy_to_slice(&mut address_1);
        buf.copy_to_slice(&mut address_2);
        buf.copy_to_slice(&mut address_3);
        let sequence_control = buf.get_u16_le();
        buf.copy_to_slice(&mut address_4);

        let mut payload = vec![0u8; payload_length];
        buf.copy_to_slice(&mut payload);

        Ok(Self {
            frame_control,
            duration_id,
            address_1,
            address_2,
            address_3,
            sequence_control,
            address_4,
            payload,
        })
    }

    /// Annotated multi-line rendering: every field by name in hexadecimal,
    /// followed by a payload line only when the payload is non-empty.
    pub fn render_annotated(&self) -> String {
        let mut out = format!(
            "Frame Control: {:04X}\nDuration ID: {:04X}\nAddress 1: {}\nAddress 2: {}\nAddress 3: {}\nSequence Control: {:04X}\nAddress 4: {}",
            self.frame_control,
            self.duration_id,
            format_mac(&self.address_1),
            format_mac(&self.address_2),
            format_mac(&self.address_3),
            self.sequence_control,
            format_mac(&self.address_4),
        );
        if !self.payload.is_empty() {
            out.push_str("\nPayload: 0x");
            push_hex(&mut out, &self.payload);
        }
        out
    }

    /// Compact single-line rendering: every fixed field in wire order
    /// followed directly by the payload hex, no separators, no prefix.
    pub fn render_hex(&self) -> String {
        let mut out = String::with_capacity(self.wire_len() * 2);
        out.push_str(&format!("{:04X}", self.frame_control));
        out.push_str(&format!("{:04X}", self.duration_id));
        push_hex(&mut out, &self.address_1);
        push_hex(&mut out, &self.address_2);
        push_hex(&mut out, &self.address_3);
        out.push_str(&format!("{:04X}", self.sequence_control));
        push_hex(&mut out, &self.address_4);
        push_hex(&mut out, &self.payload);
        out
    }
}

/// Format a MAC address as `AA:BB:CC:DD:EE:FF`.
pub fn format_mac(addr: &[u8; 6]) -> String {
    format!(
        "{:02X}:{:02X}:{:02X}:{:02X}:{:02X}:{:02X}",
        addr[0], addr[1], addr[2], addr[3], addr[4], addr[5]
    )
}

fn push_hex(out: &mut String, bytes: &[u8]) {
    for b in bytes {
        out.push_str(&format!("{:02X}", b));
    }
}

fn copy_addr(field: &'static str, slice: &[u8]) -> Result<[u8; 6]> {
    <[u8; 6]>::try_from(slice).map_err(|_| AirframeError::InvalidFieldLength {
        field,
        expected: 6,
        actual: slice.len(),
    })
}
