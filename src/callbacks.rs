//! Callback registry
//!
//! One [`CallbackSet`] instance exists per traffic direction (send and
//! receive). Each set holds one optional "general" whole-frame callback, one
//! optional callback per individual header field, one optional payload
//! callback, and independent pre/post print-mode selectors consulted by the
//! dispatch pipeline.
//!
//! Registration is last-write-wins: installing a callback for a kind
//! replaces whatever was there; there is no chaining. Clearing a slot makes
//! the dispatch pipeline skip it. No operation here performs I/O or touches
//! interface state.

use serde::{Deserialize, Serialize};

use crate::frame::MacDataFrame;

/// Rendering selected for the pipeline's pre/post print stages.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum PrintMode {
    /// No print stage.
    #[default]
    Disabled,
    /// Multi-line field-by-field rendering.
    Annotated,
    /// Single-line concatenated hex rendering.
    Hex,
}

/// Header fields that carry an individual callback slot, in dispatch order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FieldKind {
    FrameControl,
    DurationId,
    Address1,
    Address2,
    Address3,
    Address4,
    SequenceControl,
}

impl FieldKind {
    /// Per-field dispatch order used by the pipeline.
    pub const DISPATCH_ORDER: [FieldKind; 7] = [
        FieldKind::FrameControl,
        FieldKind::DurationId,
        FieldKind::Address1,
        FieldKind::Address2,
        FieldKind::Address3,
        FieldKind::Address4,
        FieldKind::SequenceControl,
    ];
}

/// Whole-frame callback, invoked with the frame and its payload length.
pub type GeneralCallback = Box<dyn FnMut(&mut MacDataFrame, usize) + Send>;
/// Callback over a single u16 header field.
pub type FieldCallback = Box<dyn FnMut(&mut u16) + Send>;
/// Callback over a single 6-byte address field.
pub type AddressCallback = Box<dyn FnMut(&mut [u8; 6]) + Send>;
/// Callback over the payload bytes; may mutate in place, must not resize.
pub type PayloadCallback = Box<dyn FnMut(&mut [u8], usize) + Send>;

/// Mutable table of optional callback slots for one traffic direction.
#[derive(Default)]
pub struct CallbackSet {
    pub(crate) general: Option<GeneralCallback>,
    pub(crate) frame_control: Option<FieldCallback>,
    pub(crate) duration_id: Option<FieldCallback>,
    pub(crate) address_1: Option<AddressCallback>,
    pub(crate) address_2: Option<AddressCallback>,
    pub(crate) address_3: Option<AddressCallback>,
    pub(crate) address_4: Option<AddressCallback>,
    pub(crate) sequence_control: Option<FieldCallback>,
    pub(crate) payload: Option<PayloadCallback>,
    pub(crate) pre_print: PrintMode,
    pub(crate) post_print: PrintMode,
}

impl CallbackSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_general(&mut self, callback: impl FnMut(&mut MacDataFrame, usize) + Send + 'static) {
        self.general = Some(Box::new(callback));
    }

    pub fn clear_general(&mut self) {
        self.general = None;
    }

    pub fn set_frame_control(&mut self, callback: impl FnMut(&mut u16) + Send + 'static) {
        self.frame_control = Some(Box::new(callback));
    }

    pub fn clear_frame_control(&mut self) {
        self.frame_control = None;
    }

    pub fn set_duration_id(&mut self, callback: impl FnMut(&mut u16) + Send + 'static) {
        self.duration_id = Some(Box::new(callback));
    }

    pub fn clear_duration_id(&mut self) {
        self.duration_id = None;
    }

    pub fn set_address_1(&mut self, callback: impl FnMut(&mut [u8; 6]) + Send + 'static) {
        self.address_1 = Some(Box::new(callback));
    }

    pub fn clear_address_1(&mut self) {
        self.address_1 = None;
    }

    pub fn set_address_2(&mut self, callback: impl FnMut(&mut [u8; 6]) + Send + 'static) {
        self.address_2 = Some(Box::new(callback));
    }

    pub fn clear_address_2(&mut self) {
        self.address_2 = None;
    }

    pub fn set_address_3(&mut self, callback: impl FnMut(&mut [u8; 6]) + Send + 'static) {
        self.address_3 = Some(Box::new(callback));
    }

    pub fn clear_address_3(&mut self) {
        self.address_3 = None;
    }

    pub fn set_address_4(&mut self, callback: impl FnMut(&mut [u8; 6]) + Send + 'static) {
        self.address_4 = Some(Box::new(callback));
    }

    pub fn clear_address_4(&mut self) {
        self.address_4 = None;
    }

    pub fn set_sequence_control(&mut self, callback: impl FnMut(&mut u16) + Send + 'static) {
        self.sequence_control = Some(Box::new(callback));
    }

    pub fn clear_sequence_control(&mut self) {
        self.sequence_control = None;
    }

    pub fn set_payload(&mut self, callback: impl FnMut(&mut [u8], usize) + Send + 'static) {
        self.payload = Some(Box::new(callback));
    }

    pub fn clear_payload(&mut self) {
        self.payload = None;
    }

    /// Select the rendering emitted before any callback runs.
    pub fn set_pre_print(&mut self, mode: PrintMode) {
        self.pre_print = mode;
    }

    /// Select the rendering emitted after all callbacks have run.
    pub fn set_post_print(&mut self, mode: PrintMode) {
        self.post_print = mode;
    }

    pub fn pre_print(&self) -> PrintMode {
        self.pre_print
    }

    pub fn post_print(&self) -> PrintMode {
        self.post_print
    }
}

impl std::fmt::Debug for CallbackSet {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CallbackSet")
            .field("general", &self.general.is_some())
            .field("frame_control", &self.frame_control.is_some())
            .field("duration_id", &self.duration_id.is_some())
            .field("address_1", &self.address_1.is_some())
            .field("address_2", &self.address_2.is_some())
            .field("address_3", &self.address_3.is_some())
            .field("address_4", &self.address_4.is_some())
            .field("sequence_control", &self.sequence_control.is_some())
            .field("payload", &self.payload.is_some())
            .field("pre_print", &self.pre_print)
            .field("post_print", &self.post_print)
            .finish()
    }
}
