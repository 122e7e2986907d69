//! Mock host transport
//!
//! In-memory host used by unit tests and offline runs. Failure scenarios can
//! be injected, every call is counted, and record requests can be answered
//! immediately or on demand.
//!
//! Clones share the same state, so a test can keep a clone to inspect the host after
//! handing the transport to the data manager.

use std::cell::RefCell;
use std::collections::{HashMap, VecDeque};
use std::rc::Rc;

use bytes::Bytes;
use contracts::{DefinitionId, FieldDescriptor, HostMessage, RequestId, SimObjectData, Unit};
use tracing::instrument;

use crate::client::HostTransport;
use crate::error::{HostError, Result};

/// Mock host configuration
#[derive(Debug, Default, Clone)]
pub struct MockHostConfig {
    /// `open` fails
    pub refuse_open: bool,
    /// Variable names whose reads fail
    pub fail_reads: Vec<String>,
    /// Variable or event names whose writes fail
    pub fail_writes: Vec<String>,
    /// Record requests that fail
    pub fail_requests: Vec<RequestId>,
    /// Record writes that fail
    pub fail_record_writes: Vec<DefinitionId>,
    /// Answer record requests right away instead of waiting for
    /// [`MockHostTransport::respond_to_pending`]
    pub auto_respond: bool,
}

/// Number of calls the mock received, per operation
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct MockCallCounts {
    pub reads: u64,
    pub named_writes: u64,
    pub setter_events: u64,
    pub layouts: u64,
    pub record_requests: u64,
    pub record_writes: u64,
    pub polls: u64,
}

impl MockCallCounts {
    /// Every host write, scalar and record
    pub fn total_writes(&self) -> u64 {
        self.named_writes + self.setter_events + self.record_writes
    }
}

#[derive(Debug, Default)]
struct MockState {
    config: MockHostConfig,
    open: bool,
    named: HashMap<String, f64>,
    aircraft: HashMap<String, f64>,
    events: Vec<(String, u32, f64)>,
    layouts: HashMap<DefinitionId, Vec<FieldDescriptor>>,
    records: HashMap<DefinitionId, Vec<u8>>,
    pending: Vec<(RequestId, DefinitionId)>,
    queue: VecDeque<HostMessage>,
    calls: MockCallCounts,
}

impl MockState {
    fn ensure_open(&self) -> Result<()> {
        if self.open {
            Ok(())
        } else {
            Err(HostError::NotOpen)
        }
    }

    fn record_size(&self, definition_id: DefinitionId) -> usize {
        self.layouts
            .get(&definition_id)
            .map(|fields| fields.iter().map(FieldDescriptor::end).max().unwrap_or(0))
            .unwrap_or(0)
    }

    fn response_for(&self, request_id: RequestId, definition_id: DefinitionId) -> HostMessage {
        let payload = self
            .records
            .get(&definition_id)
            .cloned()
            .unwrap_or_else(|| vec![0u8; self.record_size(definition_id)]);
        HostMessage::SimObjectData(SimObjectData::new(
            request_id,
            definition_id,
            Bytes::from(payload),
        ))
    }
}

/// Mock host transport
#[derive(Debug, Clone, Default)]
pub struct MockHostTransport {
    state: Rc<RefCell<MockState>>,
}

impl MockHostTransport {
    /// Create default mock host
    pub fn new() -> Self {
        Self::with_config(MockHostConfig::default())
    }

    /// Create mock host with configuration
    pub fn with_config(config: MockHostConfig) -> Self {
        Self {
            state: Rc::new(RefCell::new(MockState {
                config,
                ..MockState::default()
            })),
        }
    }

    /// Replace the failure/response configuration
    pub fn set_config(&self, config: MockHostConfig) {
        self.state.borrow_mut().config = config;
    }

    /// Make reads of `name` fail from now on
    pub fn fail_reads_of(&self, name: &str) {
        self.state
            .borrow_mut()
            .config
            .fail_reads
            .push(name.to_string());
    }

    /// Set a named variable on the host side
    pub fn set_named(&self, name: &str, value: f64) {
        self.state.borrow_mut().named.insert(name.to_string(), value);
    }

    /// Current host-side value of a named variable
    pub fn named(&self, name: &str) -> Option<f64> {
        self.state.borrow().named.get(name).copied()
    }

    /// Set an aircraft variable on the host side
    pub fn set_aircraft(&self, name: &str, index: u32, value: f64) {
        self.state
            .borrow_mut()
            .aircraft
            .insert(aircraft_key(name, index), value);
    }

    /// Set the host-side bytes of a record
    pub fn set_record_bytes(&self, definition_id: DefinitionId, bytes: &[u8]) {
        self.state
            .borrow_mut()
            .records
            .insert(definition_id, bytes.to_vec());
    }

    /// Host-side bytes of a record (last written or set)
    pub fn record_bytes(&self, definition_id: DefinitionId) -> Option<Vec<u8>> {
        self.state.borrow().records.get(&definition_id).cloned()
    }

    /// Registered layout of a record
    pub fn layout(&self, definition_id: DefinitionId) -> Option<Vec<FieldDescriptor>> {
        self.state.borrow().layouts.get(&definition_id).cloned()
    }

    /// Setter events received so far: (event, index, value)
    pub fn events(&self) -> Vec<(String, u32, f64)> {
        self.state.borrow().events.clone()
    }

    /// Record requests not yet answered
    pub fn pending_requests(&self) -> Vec<(RequestId, DefinitionId)> {
        self.state.borrow().pending.clone()
    }

    /// Queue a message for the next poll
    pub fn push_message(&self, message: HostMessage) {
        self.state.borrow_mut().queue.push_back(message);
    }

    /// Number of messages waiting to be polled
    pub fn queued_messages(&self) -> usize {
        self.state.borrow().queue.len()
    }

    /// Answer every pending record request with the record's current bytes
    ///
    /// Returns the number of responses queued.
    pub fn respond_to_pending(&self) -> usize {
        let mut state = self.state.borrow_mut();
        let pending = std::mem::take(&mut state.pending);
        let count = pending.len();
        for (request_id, definition_id) in pending {
            let message = state.response_for(request_id, definition_id);
            state.queue.push_back(message);
        }
        count
    }

    /// Call counters
    pub fn calls(&self) -> MockCallCounts {
        self.state.borrow().calls
    }
}

fn aircraft_key(name: &str, index: u32) -> String {
    format!("{name}:{index}")
}

impl HostTransport for MockHostTransport {
    #[instrument(name = "mock_host_open", skip(self))]
    fn open(&mut self, client_name: &str) -> Result<()> {
        let mut state = self.state.borrow_mut();
        if state.config.refuse_open {
            return Err(HostError::ConnectionFailed {
                message: "mock failure".into(),
            });
        }
        if state.open {
            return Err(HostError::AlreadyOpen);
        }
        state.open = true;
        state.queue.push_back(HostMessage::Open {
            application_name: client_name.to_string(),
        });
        Ok(())
    }

    #[instrument(name = "mock_host_close", skip(self))]
    fn close(&mut self) -> Result<()> {
        // Idempotent
        self.state.borrow_mut().open = false;
        Ok(())
    }

    fn is_open(&self) -> bool {
        self.state.borrow().open
    }

    fn next_message(&mut self) -> Option<HostMessage> {
        let mut state = self.state.borrow_mut();
        state.calls.polls += 1;
        state.queue.pop_front()
    }

    #[instrument(name = "mock_host_read_named", level = "trace", skip(self))]
    fn read_named_variable(&mut self, name: &str, unit: Unit) -> Result<f64> {
        let mut state = self.state.borrow_mut();
        state.ensure_open()?;
        state.calls.reads += 1;
        if state.config.fail_reads.iter().any(|n| n == name) {
            return Err(HostError::rejected("read", name, "mock failure"));
        }
        // Unknown local variables read as 0 like on the host
        Ok(state.named.get(name).copied().unwrap_or(0.0))
    }

    #[instrument(name = "mock_host_write_named", level = "trace", skip(self))]
    fn write_named_variable(&mut self, name: &str, unit: Unit, value: f64) -> Result<()> {
        let mut state = self.state.borrow_mut();
        state.ensure_open()?;
        state.calls.named_writes += 1;
        if state.config.fail_writes.iter().any(|n| n == name) {
            return Err(HostError::rejected("write", name, "mock failure"));
        }
        state.named.insert(name.to_string(), value);
        Ok(())
    }

    #[instrument(name = "mock_host_read_aircraft", level = "trace", skip(self))]
    fn read_aircraft_variable(&mut self, name: &str, index: u32, unit: Unit) -> Result<f64> {
        let mut state = self.state.borrow_mut();
        state.ensure_open()?;
        state.calls.reads += 1;
        if state.config.fail_reads.iter().any(|n| n == name) {
            return Err(HostError::rejected("read", name, "mock failure"));
        }
        state
            .aircraft
            .get(&aircraft_key(name, index))
            .copied()
            .ok_or_else(|| HostError::rejected("read", name, "unknown aircraft variable"))
    }

    #[instrument(name = "mock_host_setter_event", level = "trace", skip(self))]
    fn transmit_setter_event(&mut self, event: &str, index: u32, value: f64) -> Result<()> {
        let mut state = self.state.borrow_mut();
        state.ensure_open()?;
        state.calls.setter_events += 1;
        if state.config.fail_writes.iter().any(|n| n == event) {
            return Err(HostError::rejected("event", event, "mock failure"));
        }
        state.events.push((event.to_string(), index, value));
        Ok(())
    }

    #[instrument(name = "mock_host_register_layout", skip(self, fields), fields(fields = fields.len()))]
    fn register_record_layout(
        &mut self,
        definition_id: DefinitionId,
        fields: &[FieldDescriptor],
    ) -> Result<()> {
        let mut state = self.state.borrow_mut();
        state.ensure_open()?;
        state.calls.layouts += 1;
        state.layouts.insert(definition_id, fields.to_vec());
        Ok(())
    }

    #[instrument(name = "mock_host_request_record", level = "trace", skip(self))]
    fn request_record(
        &mut self,
        request_id: RequestId,
        definition_id: DefinitionId,
    ) -> Result<()> {
        let mut state = self.state.borrow_mut();
        state.ensure_open()?;
        state.calls.record_requests += 1;
        if state.config.fail_requests.contains(&request_id) {
            return Err(HostError::rejected(
                "request",
                request_id.to_string(),
                "mock failure",
            ));
        }
        if !state.layouts.contains_key(&definition_id) {
            return Err(HostError::rejected(
                "request",
                definition_id.to_string(),
                "unknown definition",
            ));
        }

        if state.config.auto_respond {
            let message = state.response_for(request_id, definition_id);
            state.queue.push_back(message);
        } else {
            state.pending.push((request_id, definition_id));
        }
        Ok(())
    }

    #[instrument(name = "mock_host_write_record", level = "trace", skip(self, data), fields(len = data.len()))]
    fn write_record(&mut self, definition_id: DefinitionId, data: &[u8]) -> Result<()> {
        let mut state = self.state.borrow_mut();
        state.ensure_open()?;
        state.calls.record_writes += 1;
        if state.config.fail_record_writes.contains(&definition_id) {
            return Err(HostError::rejected(
                "record write",
                definition_id.to_string(),
                "mock failure",
            ));
        }
        state.records.insert(definition_id, data.to_vec());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn opened() -> MockHostTransport {
        let mut host = MockHostTransport::new();
        host.open("test").unwrap();
        host
    }

    #[test]
    fn test_calls_before_open_fail() {
        let mut host = MockHostTransport::new();
        assert!(matches!(
            host.read_named_variable("A32NX_X", Unit::Number),
            Err(HostError::NotOpen)
        ));
        assert!(!host.is_open());
    }

    #[test]
    fn test_open_queues_open_message() {
        let mut host = opened();
        assert!(matches!(
            host.next_message(),
            Some(HostMessage::Open { application_name }) if application_name == "test"
        ));
        assert!(host.next_message().is_none());
    }

    #[test]
    fn test_named_write_then_read() {
        let mut host = opened();
        host.write_named_variable("A32NX_X", Unit::Number, 4.5)
            .unwrap();
        assert_eq!(host.read_named_variable("A32NX_X", Unit::Number).unwrap(), 4.5);
        assert_eq!(host.calls().reads, 1);
        assert_eq!(host.calls().named_writes, 1);
    }

    #[test]
    fn test_injected_read_failure() {
        let mut host = opened();
        host.fail_reads_of("BROKEN");
        assert!(host.read_named_variable("BROKEN", Unit::Number).is_err());
    }

    #[test]
    fn test_pending_requests_answered_on_demand() {
        let mut host = opened();
        host.next_message();
        let def = DefinitionId(1);
        host.register_record_layout(def, &[FieldDescriptor::new("A", Unit::Number, 0, 8)])
            .unwrap();
        host.request_record(RequestId(1), def).unwrap();
        assert!(host.next_message().is_none());

        assert_eq!(host.respond_to_pending(), 1);
        match host.next_message() {
            Some(HostMessage::SimObjectData(data)) => {
                assert_eq!(data.request_id, RequestId(1));
                assert_eq!(data.payload.len(), 8);
            }
            other => panic!("unexpected message: {other:?}"),
        }
    }

    #[test]
    fn test_close_is_idempotent() {
        let mut host = opened();
        host.close().unwrap();
        host.close().unwrap();
        assert!(!host.is_open());
    }
}
