//! Host transport abstraction
//!
//! Defines the trait the data manager uses to talk to the host simulation,
//! supporting a real platform binding and mock testing.

use contracts::{DefinitionId, FieldDescriptor, HostMessage, RequestId, Unit};

use crate::error::Result;

/// Host transport trait
///
/// Every call is non-blocking. Reads of scalar variables are answered
/// synchronously by the host; record requests are answered asynchronously
/// through [`HostTransport::next_message`].
pub trait HostTransport {
    /// Open the connection to the host
    fn open(&mut self, client_name: &str) -> Result<()>;

    /// Close the connection
    ///
    /// Idempotent: returns Ok if already closed
    fn close(&mut self) -> Result<()>;

    /// Whether `open` succeeded and `close` has not been called since
    fn is_open(&self) -> bool;

    /// Pop the next pending message, `None` once the queue is empty
    fn next_message(&mut self) -> Option<HostMessage>;

    /// Read a named (local) variable
    fn read_named_variable(&mut self, name: &str, unit: Unit) -> Result<f64>;

    /// Write a named (local) variable
    fn write_named_variable(&mut self, name: &str, unit: Unit, value: f64) -> Result<()>;

    /// Read an aircraft variable; `index` 0 means not indexed
    fn read_aircraft_variable(&mut self, name: &str, index: u32, unit: Unit) -> Result<f64>;

    /// Fire a setter event with a value
    ///
    /// Aircraft variables are read-only on the host; writable ones are set
    /// through an event. `index` 0 means the event takes no index.
    fn transmit_setter_event(&mut self, event: &str, index: u32, value: f64) -> Result<()>;

    /// Describe a record's field layout to the host
    ///
    /// Called once per record when its handle is created.
    fn register_record_layout(
        &mut self,
        definition_id: DefinitionId,
        fields: &[FieldDescriptor],
    ) -> Result<()>;

    /// Ask the host for the current value of a record
    ///
    /// The answer arrives as `HostMessage::SimObjectData` tagged with
    /// `request_id`.
    fn request_record(&mut self, request_id: RequestId, definition_id: DefinitionId)
        -> Result<()>;

    /// Write a whole record as one unit
    fn write_record(&mut self, definition_id: DefinitionId, data: &[u8]) -> Result<()>;
}
