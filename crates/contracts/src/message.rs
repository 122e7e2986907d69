//! Inbound host messages
//!
//! The wire encoding belongs to the host platform; the bridge only sees
//! these decoded message kinds.

use bytes::Bytes;
use serde::{Deserialize, Serialize};

use crate::{ContractError, DefinitionId, RequestId};

/// A message drained from the host transport
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum HostMessage {
    /// Connection established
    Open { application_name: String },
    /// Host is shutting the connection down
    Quit,
    /// Host rejected an earlier call
    Exception {
        /// Host-defined exception code, see [`crate::HostException`]
        code: u32,
        /// Packet id of the offending call, if known
        send_id: u32,
        /// Parameter index the exception refers to
        index: u32,
    },
    /// Answer to a record request
    SimObjectData(SimObjectData),
    /// Message kinds the bridge does not handle
    Other { kind: u32 },
}

impl HostMessage {
    /// Short label used for logging and metrics
    pub fn kind(&self) -> &'static str {
        match self {
            HostMessage::Open { .. } => "open",
            HostMessage::Quit => "quit",
            HostMessage::Exception { .. } => "exception",
            HostMessage::SimObjectData(_) => "sim_object_data",
            HostMessage::Other { .. } => "other",
        }
    }
}

/// Record response payload
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimObjectData {
    /// Request identifier the response answers
    pub request_id: RequestId,
    /// Layout the payload was encoded with
    pub definition_id: DefinitionId,
    /// Host object the data belongs to
    pub object_id: u32,
    /// Raw record bytes
    pub payload: Bytes,
}

impl SimObjectData {
    pub fn new(request_id: RequestId, definition_id: DefinitionId, payload: Bytes) -> Self {
        Self {
            request_id,
            definition_id,
            object_id: 0,
            payload,
        }
    }

    /// Length-checked view of the payload for a record of `expected` bytes
    ///
    /// # Errors
    /// `SizeMismatch` if the payload is shorter or longer than `expected`.
    pub fn view(&self, name: &str, expected: usize) -> Result<RecordView<'_>, ContractError> {
        RecordView::new(name, &self.payload, expected)
    }
}

/// Payload bytes whose length is known to equal the record size
#[derive(Debug, Clone, Copy)]
pub struct RecordView<'a> {
    bytes: &'a [u8],
}

impl<'a> RecordView<'a> {
    /// Wrap `bytes`, rejecting any length other than `expected`
    pub fn new(name: &str, bytes: &'a [u8], expected: usize) -> Result<Self, ContractError> {
        if bytes.len() != expected {
            return Err(ContractError::size_mismatch(name, expected, bytes.len()));
        }
        Ok(Self { bytes })
    }

    #[inline]
    pub fn as_bytes(&self) -> &'a [u8] {
        self.bytes
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }
}
