//! Dispatch pipeline
//!
//! The strictly ordered procedure that runs a frame through its callback
//! stages. For both directions the order is fixed: pre-print, general
//! callback, the seven per-field callbacks (frame_control, duration_id,
//! address_1 through address_4, sequence_control), payload callback,
//! post-print. The send direction finishes by handing the possibly-mutated
//! frame to the transmit primitive; that transmit is the pipeline's only
//! external side effect beyond logging.
//!
//! There is no short-circuiting except for disabled stages, no error
//! channel for callbacks (they run to completion and log their own
//! problems), and no cancellation once dispatch has started. The receive
//! entry point runs synchronously in the driver's delivery context, so
//! registered callbacks must stay fast and non-blocking.

use crate::callbacks::{CallbackSet, PrintMode};
use crate::driver::{PacketType, WifiDriver};
use crate::engine::PacketEngine;
use crate::frame::MacDataFrame;
use crate::{AirframeError, Result, LOG_TARGET, MAC_HEADER_LEN};

/// Traffic direction a dispatch runs under.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Send,
    Receive,
}

impl Direction {
    fn marker(self) -> &'static str {
        match self {
            Direction::Send => "SEND",
            Direction::Receive => "PROM",
        }
    }
}

/// Run print and callback stages 1-5 over a frame.
///
/// Mutations made by any stage are visible to every later stage, including
/// the send direction's eventual transmit.
pub(crate) fn run_stages(set: &mut CallbackSet, frame: &mut MacDataFrame, direction: Direction) {
    let payload_length = frame.payload.len();

    emit_print(set.pre_print, frame, direction, "PRECALL");

    if let Some(cb) = set.general.as_mut() {
        cb(frame, payload_length);
    }
    if let Some(cb) = set.frame_control.as_mut() {
        cb(&mut frame.frame_control);
    }
    if let Some(cb) = set.duration_id.as_mut() {
        cb(&mut frame.duration_id);
    }
    if let Some(cb) = set.address_1.as_mut() {
        cb(&mut frame.address_1);
    }
    if let Some(cb) = set.address_2.as_mut() {
        cb(&mut frame.address_2);
    }
    if let Some(cb) = set.address_3.as_mut() {
        cb(&mut frame.address_3);
    }
    if let Some(cb) = set.address_4.as_mut() {
        cb(&mut frame.address_4);
    }
    if let Some(cb) = set.sequence_control.as_mut() {
        cb(&mut frame.sequence_control);
    }
    if let Some(cb) = set.payload.as_mut() {
        cb(frame.payload.as_mut_slice(), payload_length);
    }

    emit_print(set.post_print, frame, direction, "POSTCALL");
}

fn emit_print(mode: PrintMode, frame: &MacDataFrame, direction: Direction, stage: &str) {
    if mode == PrintMode::Disabled {
        return;
    }
    log::info!(target: LOG_TARGET, "{} {} START", direction.marker(), stage);
    match mode {
        PrintMode::Annotated => {
            log::info!(target: LOG_TARGET, "{}", frame.render_annotated());
        }
        PrintMode::Hex => {
            log::info!(target: LOG_TARGET, "{}", frame.render_hex());
        }
        PrintMode::Disabled => unreachable!(),
    }
    log::info!(target: LOG_TARGET, "{} {} END", direction.marker(), stage);
}

impl<D: WifiDriver> PacketEngine<D> {
    /// Dispatch a frame down the send path.
    ///
    /// Checks interface readiness before anything else: an unconfigured
    /// interface fails without logging, without running a single callback
    /// and without touching the radio. Otherwise all enabled stages run in
    /// order and the final, possibly mutated frame is encoded and handed to
    /// the transmit primitive (wire length = header + payload length). The
    /// frame stays owned by the caller throughout.
    pub fn send_frame(&mut self, frame: &mut MacDataFrame) -> Result<()> {
        self.interface.require_ready()?;
        run_stages(&mut self.send_callbacks, frame, Direction::Send);
        self.driver.transmit(&frame.encode(), true)
    }

    /// Hand raw bytes to the transmit primitive with no callback or print
    /// stages. Only the interface readiness check applies.
    pub fn send_raw(&mut self, bytes: &[u8], sys_sequence: bool) -> Result<()> {
        self.interface.require_ready()?;
        self.driver.transmit(bytes, sys_sequence)
    }

    /// Receive-direction entry point, invoked once per captured frame.
    ///
    /// Non-data packet types are ignored. `signal_length` covers the whole
    /// frame as seen on the air; the payload length every payload-touching
    /// stage uses is derived from it as `signal_length - MAC_HEADER_LEN`,
    /// never read out of the frame itself.
    pub fn handle_capture(
        &mut self,
        buf: &[u8],
        signal_length: usize,
        packet_type: PacketType,
    ) -> Result<()> {
        if packet_type != PacketType::Data {
            return Ok(());
        }
        if signal_length < MAC_HEADER_LEN || buf.len() < signal_length {
            return Err(AirframeError::FrameTooShort {
                expected: MAC_HEADER_LEN.max(signal_length),
                actual: buf.len().min(signal_length),
            });
        }

        let payload_length = signal_length - MAC_HEADER_LEN;
        let mut frame = MacDataFrame::decode(&buf[..signal_length], payload_length)?;
        run_stages(&mut self.receive_callbacks, &mut frame, Direction::Receive);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::driver::MockDriver;
    use std::sync::{Arc, Mutex};

    fn engine() -> PacketEngine<MockDriver> {
        let mut engine = PacketEngine::new(MockDriver::new([0x02; 6]));
        engine.configure_as_station().unwrap();
        engine
    }

    fn scenario_frame() -> MacDataFrame {
        MacDataFrame::new(
            0x0008,
            0xFA,
            [0x10, 0x11, 0x12, 0x13, 0x14, 0x15],
            [0x20, 0x21, 0x22, 0x23, 0x24, 0x25],
            [0x30, 0x31, 0x32, 0x33, 0x34, 0x35],
            0xFA,
            [0x40, 0x41, 0x42, 0x43, 0x44, 0x45],
            vec![0x50, 0x51, 0x52, 0x53, 0x54, 0x55],
        )
    }

    #[test]
    fn test_dispatch_order_is_fixed() {
        let order = Arc::new(Mutex::new(Vec::new()));
        let mut engine = engine();

        let set = engine.send_callbacks_mut();
        set.set_pre_print(PrintMode::Hex);
        set.set_post_print(PrintMode::Annotated);
        macro_rules! record {
            ($name:expr) => {{
                let order = order.clone();
                move |_: &mut _| order.lock().unwrap().push($name)
            }};
        }
        let o = order.clone();
        set.set_general(move |_, _| o.lock().unwrap().push("general"));
        set.set_frame_control(record!("frame_control"));
        set.set_duration_id(record!("duration_id"));
        set.set_address_1(record!("address_1"));
        set.set_address_2(record!("address_2"));
        set.set_address_3(record!("address_3"));
        set.set_address_4(record!("address_4"));
        set.set_sequence_control(record!("sequence_control"));
        let o = order.clone();
        set.set_payload(move |_, _| o.lock().unwrap().push("payload"));

        engine.send_frame(&mut scenario_frame()).unwrap();

        assert_eq!(
            *order.lock().unwrap(),
            vec![
                "general",
                "frame_control",
                "duration_id",
                "address_1",
                "address_2",
                "address_3",
                "address_4",
                "sequence_control",
                "payload",
            ]
        );
    }

    #[test]
    fn test_field_mutation_reaches_the_wire() {
        let mut engine = engine();
        engine
            .send_callbacks_mut()
            .set_duration_id(|d| *d = 0xCAB0);

        let mut frame = scenario_frame();
        engine.send_frame(&mut frame).unwrap();

        // duration_id lives at wire bytes 2-3, little-endian.
        let wire = engine.driver().last_transmitted().unwrap();
        assert_eq!(&wire[2..4], &[0xB0, 0xCA]);
        // Mutation is also visible to the caller's frame.
        assert_eq!(frame.duration_id, 0xCAB0);
    }

    #[test]
    fn test_payload_mutation_reaches_the_wire() {
        let mut engine = engine();
        engine.send_callbacks_mut().set_payload(|payload, len| {
            if len > 3 {
                payload[3] = 0xFF;
            }
        });

        engine.send_frame(&mut scenario_frame()).unwrap();
        let wire = engine.driver().last_transmitted().unwrap();
        assert_eq!(wire[MAC_HEADER_LEN + 3], 0xFF);
    }

    #[test]
    fn test_general_callback_sees_payload_length() {
        let seen = Arc::new(Mutex::new(0usize));
        let mut engine = engine();
        let s = seen.clone();
        engine
            .send_callbacks_mut()
            .set_general(move |_, len| *s.lock().unwrap() = len);

        engine.send_frame(&mut scenario_frame()).unwrap();
        assert_eq!(*seen.lock().unwrap(), 6);
    }

    #[test]
    fn test_unconfigured_send_runs_nothing() {
        let mut engine = PacketEngine::new(MockDriver::new([0x02; 6]));
        let ran = Arc::new(Mutex::new(false));
        let r = ran.clone();
        engine
            .send_callbacks_mut()
            .set_general(move |_, _| *r.lock().unwrap() = true);

        let err = engine.send_frame(&mut scenario_frame()).unwrap_err();
        assert!(matches!(err, AirframeError::InterfaceNotConfigured));
        assert_eq!(engine.driver().transmit_calls, 0);
        assert!(!*ran.lock().unwrap());
    }

    #[test]
    fn test_send_raw_skips_callbacks() {
        let mut engine = engine();
        let ran = Arc::new(Mutex::new(false));
        let r = ran.clone();
        engine
            .send_callbacks_mut()
            .set_general(move |_, _| *r.lock().unwrap() = true);

        engine.send_raw(&[0x01, 0x02, 0x03], false).unwrap();
        assert_eq!(engine.driver().transmit_calls, 1);
        assert!(!*ran.lock().unwrap());
    }

    #[test]
    fn test_capture_ignores_non_data_frames() {
        let mut engine = engine();
        let ran = Arc::new(Mutex::new(false));
        let r = ran.clone();
        engine
            .receive_callbacks_mut()
            .set_general(move |_, _| *r.lock().unwrap() = true);

        let wire = scenario_frame().encode();
        engine
            .handle_capture(&wire, wire.len(), PacketType::Management)
            .unwrap();
        assert!(!*ran.lock().unwrap());
    }

    #[test]
    fn test_capture_derives_payload_length_from_signal() {
        let lengths = Arc::new(Mutex::new(Vec::new()));
        let mut engine = engine();
        let l = lengths.clone();
        engine
            .receive_callbacks_mut()
            .set_payload(move |payload, len| {
                assert_eq!(payload.len(), len);
                l.lock().unwrap().push(len);
            });

        let wire = scenario_frame().encode();
        engine
            .handle_capture(&wire, wire.len(), PacketType::Data)
            .unwrap();
        // Signal length shorter than the buffer: the derived length wins.
        engine
            .handle_capture(&wire, MAC_HEADER_LEN + 2, PacketType::Data)
            .unwrap();

        assert_eq!(*lengths.lock().unwrap(), vec![6, 2]);
    }

    #[test]
    fn test_capture_rejects_short_signal() {
        let mut engine = engine();
        let wire = scenario_frame().encode();
        let err = engine
            .handle_capture(&wire, MAC_HEADER_LEN - 1, PacketType::Data)
            .unwrap_err();
        assert!(matches!(err, AirframeError::FrameTooShort { .. }));
    }

    #[test]
    fn test_receive_dispatch_sees_decoded_fields() {
        let seen = Arc::new(Mutex::new(None));
        let mut engine = engine();
        let s = seen.clone();
        engine.receive_callbacks_mut().set_general(move |frame, _| {
            *s.lock().unwrap() = Some((frame.frame_control, frame.address_1));
        });

        let wire = scenario_frame().encode();
        engine
            .handle_capture(&wire, wire.len(), PacketType::Data)
            .unwrap();

        let (fc, a1) = seen.lock().unwrap().take().unwrap();
        assert_eq!(fc, 0x0008);
        assert_eq!(a1, [0x10, 0x11, 0x12, 0x13, 0x14, 0x15]);
    }
}
