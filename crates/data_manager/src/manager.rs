//! Data manager: handle registry, frame phases and response dispatch.

use std::collections::HashMap;
use std::rc::Rc;

use bytemuck::Pod;
use contracts::{
    validate_layout, ContractError, DataManagerConfig, DefinitionId, FieldDescriptor,
    FrameContext, FrameStats, HostException, HostMessage, IdGenerator, RequestId, SimObjectData,
    Unit, VariableKey,
};
use host_client::HostTransport;
use metrics::counter;
use tracing::{debug, error, info, instrument, trace, warn};

use crate::aircraft_variable::{AircraftVariable, AircraftVariablePtr};
use crate::cache::VariablePolicy;
use crate::data_definition::{DataDefinitionVariable, DataDefinitionVariablePtr};
use crate::error::{DataManagerError, Result};
use crate::named_variable::{NamedVariable, NamedVariablePtr};
use crate::variable::{ManagedVariable, SimObjectRecord};

/// Owns every handle and is the single point of contact with the host.
///
/// Handles are created once during module initialization. Each frame
/// [`pre_update`](Self::pre_update) refreshes auto-read handles and drains
/// the host's message queue, then [`post_update`](Self::post_update)
/// flushes dirty auto-write handles. A failing handle is logged and skipped;
/// it never aborts the frame.
pub struct DataManager {
    /// Configuration
    config: DataManagerConfig,
    /// Host connection, `None` before `initialize` and after `shutdown`
    transport: Option<Box<dyn HostTransport>>,
    /// Source of definition and request identifiers
    id_generator: IdGenerator,
    /// Scalar handles in creation order
    variables: Vec<Rc<dyn ManagedVariable>>,
    /// Full key to the newest handle registered under it
    variable_index: HashMap<VariableKey, usize>,
    /// Record handles in creation order
    data_definitions: Vec<Rc<dyn SimObjectRecord>>,
    /// Request identifier to record slot
    request_index: HashMap<RequestId, usize>,
    /// Frame counter, 1 on the first `pre_update`
    tick_counter: u64,
    /// Simulation time of the current frame
    time_stamp: f64,
    /// Counts of the frame in progress
    frame_stats: FrameStats,
    /// Counts of the last completed frame
    last_frame_stats: FrameStats,
    /// Message polled past the drain limit, handled first next frame
    deferred_message: Option<HostMessage>,
}

impl DataManager {
    pub fn new(config: DataManagerConfig) -> Self {
        Self {
            config,
            transport: None,
            id_generator: IdGenerator::new(),
            variables: Vec::new(),
            variable_index: HashMap::new(),
            data_definitions: Vec::new(),
            request_index: HashMap::new(),
            tick_counter: 0,
            time_stamp: 0.0,
            frame_stats: FrameStats::default(),
            last_frame_stats: FrameStats::default(),
            deferred_message: None,
        }
    }

    /// Take ownership of the host transport, opening it if necessary
    ///
    /// # Errors
    /// The host refused the connection. The manager stays uninitialized.
    #[instrument(name = "data_manager_initialize", skip_all, fields(client = %self.config.client_name))]
    pub fn initialize(&mut self, mut transport: Box<dyn HostTransport>) -> Result<()> {
        if !transport.is_open() {
            transport.open(&self.config.client_name).map_err(|err| {
                error!(error = %err, "failed to open host transport");
                err
            })?;
        }
        self.transport = Some(transport);
        info!("data manager initialized");
        Ok(())
    }

    #[inline]
    pub fn is_initialized(&self) -> bool {
        self.transport.is_some()
    }

    pub fn config(&self) -> &DataManagerConfig {
        &self.config
    }

    /// Frames started so far
    #[inline]
    pub fn tick_counter(&self) -> u64 {
        self.tick_counter
    }

    /// Simulation time of the current frame
    #[inline]
    pub fn time_stamp(&self) -> f64 {
        self.time_stamp
    }

    /// Host interaction counts of the last completed frame
    pub fn last_frame_stats(&self) -> FrameStats {
        self.last_frame_stats
    }

    pub fn variable_count(&self) -> usize {
        self.variables.len()
    }

    pub fn data_definition_count(&self) -> usize {
        self.data_definitions.len()
    }

    /// Read phase: refresh auto-read handles, then drain host messages
    ///
    /// # Errors
    /// Only `TransportNotReady`; per-handle failures are logged and counted.
    #[instrument(level = "trace", name = "data_manager_pre_update", skip_all, fields(sim_time = frame.sim_time))]
    pub fn pre_update(&mut self, frame: &FrameContext) -> Result<()> {
        let Some(host) = self.transport.as_deref_mut() else {
            error!("pre_update called but data manager is not initialized");
            return Err(DataManagerError::not_ready("pre_update"));
        };

        self.tick_counter += 1;
        self.time_stamp = frame.sim_time;
        self.frame_stats = FrameStats {
            tick: self.tick_counter,
            ..FrameStats::default()
        };
        let (time, tick) = (self.time_stamp, self.tick_counter);

        for var in &self.variables {
            match var.refresh(host, time, tick) {
                Ok(true) => self.frame_stats.host_reads += 1,
                Ok(false) => {}
                Err(err) => {
                    self.frame_stats.host_failures += 1;
                    counter!("sim_bridge_host_failures_total", "op" => "read").increment(1);
                    warn!(name = %var.key(), error = %err, "variable refresh failed");
                }
            }
        }

        for record in &self.data_definitions {
            match record.refresh(host, time, tick) {
                Ok(true) => self.frame_stats.record_requests += 1,
                Ok(false) => {}
                Err(err) => {
                    self.frame_stats.host_failures += 1;
                    counter!("sim_bridge_host_failures_total", "op" => "request").increment(1);
                    warn!(name = record.name(), error = %err, "record request failed");
                }
            }
        }

        self.drain_messages();
        Ok(())
    }

    /// Domain phase; the manager has nothing to do here
    pub fn update(&mut self, _frame: &FrameContext) -> Result<()> {
        if !self.is_initialized() {
            error!("update called but data manager is not initialized");
            return Err(DataManagerError::not_ready("update"));
        }
        Ok(())
    }

    /// Write phase: flush dirty auto-write variables, then records
    ///
    /// # Errors
    /// Only `TransportNotReady`; per-handle failures are logged and counted.
    #[instrument(level = "trace", name = "data_manager_post_update", skip_all, fields(sim_time = frame.sim_time))]
    pub fn post_update(&mut self, frame: &FrameContext) -> Result<()> {
        let Some(host) = self.transport.as_deref_mut() else {
            error!("post_update called but data manager is not initialized");
            return Err(DataManagerError::not_ready("post_update"));
        };
        let (time, tick) = (self.time_stamp, self.tick_counter);
        trace!(delta_time = frame.delta_time, "flushing handles");

        for var in &self.variables {
            match var.flush(host, time, tick) {
                Ok(true) => self.frame_stats.host_writes += 1,
                Ok(false) => {}
                Err(err) => {
                    self.frame_stats.host_failures += 1;
                    counter!("sim_bridge_host_failures_total", "op" => "write").increment(1);
                    warn!(name = %var.key(), error = %err, "variable flush failed");
                }
            }
        }

        for record in &self.data_definitions {
            match record.flush(host, time, tick) {
                Ok(true) => self.frame_stats.host_writes += 1,
                Ok(false) => {}
                Err(err) => {
                    self.frame_stats.host_failures += 1;
                    counter!("sim_bridge_host_failures_total", "op" => "record_write")
                        .increment(1);
                    warn!(name = record.name(), error = %err, "record write failed");
                }
            }
        }

        self.last_frame_stats = self.frame_stats;
        observability::record_frame_stats(&self.last_frame_stats);
        Ok(())
    }

    /// Close the transport and release every handle
    ///
    /// Handles still held by modules stay usable as plain values but are no
    /// longer synchronized.
    #[instrument(name = "data_manager_shutdown", skip_all)]
    pub fn shutdown(&mut self) -> Result<()> {
        self.variables.clear();
        self.variable_index.clear();
        self.data_definitions.clear();
        self.request_index.clear();
        self.deferred_message = None;

        if let Some(mut transport) = self.transport.take() {
            transport.close()?;
        }
        info!(ticks = self.tick_counter, "data manager shut down");
        Ok(())
    }

    /// Register a named (local) variable
    ///
    /// Registering a key twice keeps both handles synchronized; lookups by
    /// key return the newer one.
    pub fn make_named_variable(
        &mut self,
        name: &str,
        unit: Unit,
        policy: VariablePolicy,
    ) -> NamedVariablePtr {
        let var = Rc::new(NamedVariable::new(name, unit, policy));
        self.register_variable(var.clone());
        var
    }

    /// Register an aircraft variable
    ///
    /// `index` selects the host sub-variable (0 for scalar host variables).
    /// The registry key is always `name:index`. Without a `setter_event` the
    /// variable is read-only and never auto-writes.
    pub fn make_aircraft_variable(
        &mut self,
        name: &str,
        index: u32,
        setter_event: Option<&str>,
        unit: Unit,
        policy: VariablePolicy,
    ) -> AircraftVariablePtr {
        let var = Rc::new(AircraftVariable::new(name, index, setter_event, unit, policy));
        self.register_variable(var.clone());
        var
    }

    /// Register a record bound to `T` and describe its layout to the host
    ///
    /// # Errors
    /// - `TransportNotReady` before `initialize`
    /// - `InvalidLayout` if `fields` do not fit `T`
    /// - the host rejected the layout
    pub fn make_data_definition_variable<T: Pod>(
        &mut self,
        name: &str,
        fields: Vec<FieldDescriptor>,
        initial: T,
        policy: VariablePolicy,
    ) -> Result<DataDefinitionVariablePtr<T>> {
        let Some(host) = self.transport.as_deref_mut() else {
            return Err(DataManagerError::not_ready("make_data_definition_variable"));
        };
        validate_layout(name, &fields, std::mem::size_of::<T>())?;

        // One allocation per record; both identifiers carry it.
        let id = self.id_generator.next_id();
        let definition_id = DefinitionId(id);
        let request_id = RequestId(id);
        host.register_record_layout(definition_id, &fields)?;

        let var = Rc::new(DataDefinitionVariable::new(
            name,
            fields,
            definition_id,
            request_id,
            initial,
            policy,
        ));
        self.request_index
            .insert(request_id, self.data_definitions.len());
        self.data_definitions.push(var.clone());
        debug!(name, %request_id, size = std::mem::size_of::<T>(), "data definition registered");
        Ok(var)
    }

    /// Look up a scalar handle by full key (`name` or `name:index`)
    pub fn variable(&self, key: &str) -> Option<Rc<dyn ManagedVariable>> {
        self.variable_index
            .get(key)
            .map(|&slot| Rc::clone(&self.variables[slot]))
    }

    /// Look up a record handle by request identifier
    pub fn data_definition(&self, request_id: RequestId) -> Option<Rc<dyn SimObjectRecord>> {
        self.request_index
            .get(&request_id)
            .map(|&slot| Rc::clone(&self.data_definitions[slot]))
    }

    /// Read a handle now, ignoring its auto-read flag and max ages
    ///
    /// For records this issues the request; the answer is routed on the
    /// next drain.
    pub fn read_now(&mut self, var: &dyn ManagedVariable) -> Result<()> {
        let Some(host) = self.transport.as_deref_mut() else {
            return Err(DataManagerError::not_ready("read_now"));
        };
        var.read_from_sim(host, self.time_stamp, self.tick_counter)?;
        self.frame_stats.host_reads += 1;
        Ok(())
    }

    /// Write a handle now, ignoring its auto-write flag and dirty state
    pub fn write_now(&mut self, var: &dyn ManagedVariable) -> Result<()> {
        let Some(host) = self.transport.as_deref_mut() else {
            return Err(DataManagerError::not_ready("write_now"));
        };
        var.write_to_sim(host, self.time_stamp, self.tick_counter)?;
        self.frame_stats.host_writes += 1;
        Ok(())
    }

    /// Handle one message drained from the host
    ///
    /// Never fails; problems are logged and counted.
    pub fn process_dispatch_message(&mut self, message: HostMessage) {
        self.frame_stats.messages += 1;
        counter!("sim_bridge_messages_total", "kind" => message.kind()).increment(1);

        match message {
            HostMessage::SimObjectData(data) => {
                // Failures are already logged and counted
                let _ = self.process_sim_object_data(&data);
            }
            HostMessage::Open { application_name } => {
                info!(application = %application_name, "host connection established");
            }
            HostMessage::Quit => {
                info!("received host connection quit message");
            }
            HostMessage::Exception {
                code,
                send_id,
                index,
            } => {
                self.frame_stats.exceptions += 1;
                let exception = HostException::describe(code);
                counter!("sim_bridge_host_exceptions_total", "exception" => exception.clone())
                    .increment(1);
                error!(code, send_id, index, exception = %exception, "exception in host connection");
            }
            HostMessage::Other { kind } => {
                trace!(kind, "ignoring host message");
            }
        }
    }

    /// Route a record response to the record whose request identifier it
    /// carries
    ///
    /// # Errors
    /// - `UnmatchedResponse`: no record uses the identifier; nothing changed
    /// - `SizeMismatch`: the payload does not fit the record; nothing changed
    pub fn process_sim_object_data(&mut self, data: &SimObjectData) -> Result<()> {
        let Some(&slot) = self.request_index.get(&data.request_id) else {
            self.frame_stats.unmatched_responses += 1;
            warn!(request_id = %data.request_id, "no matching request id found, response discarded");
            return Err(ContractError::UnmatchedResponse {
                request_id: data.request_id,
            }
            .into());
        };

        let record = &self.data_definitions[slot];
        match record.update_from_sim_object_data(data) {
            Ok(()) => {
                self.frame_stats.routed_responses += 1;
                Ok(())
            }
            Err(err) => {
                self.frame_stats.size_mismatches += 1;
                warn!(name = record.name(), error = %err, "record response rejected");
                Err(err)
            }
        }
    }

    /// Drain the messages currently queued, at most `max_messages_per_frame`
    ///
    /// When the limit is hit one more message is polled to tell a full
    /// queue from an empty one; it is kept and handled first next frame.
    fn drain_messages(&mut self) {
        let limit = self.config.max_messages_per_frame;
        let mut drained = 0usize;
        while drained < limit {
            let Some(message) = self.next_message() else {
                return;
            };
            drained += 1;
            self.process_dispatch_message(message);
        }
        if let Some(message) = self.next_message() {
            self.deferred_message = Some(message);
            debug!(limit, "message drain limit reached, remaining messages wait for next frame");
        }
    }

    fn next_message(&mut self) -> Option<HostMessage> {
        self.deferred_message
            .take()
            .or_else(|| self.transport.as_deref_mut().and_then(|t| t.next_message()))
    }

    fn register_variable(&mut self, var: Rc<dyn ManagedVariable>) {
        let key = var.key().clone();
        let slot = self.variables.len();
        self.variables.push(var);
        if self.variable_index.insert(key.clone(), slot).is_some() {
            warn!(name = %key, "variable registered twice, lookups return the newer handle");
        }
    }
}
