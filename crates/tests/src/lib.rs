//! # Integration Tests
//!
//! 跨 crate 集成测试。
//!
//! 负责：
//! - 请求标识唯一性与响应路由
//! - 尺寸校验与未匹配响应的丢弃
//! - 自动写入门控与过期读取省略
//! - 写入失败后保留本地值并重试
//! - 帧驱动端到端场景（使用内存宿主）

#[cfg(test)]
mod support {
    use bytemuck::{Pod, Zeroable};
    use bytes::Bytes;
    use contracts::{
        DataManagerConfig, FieldDescriptor, FrameContext, HostMessage, SimObjectData, Unit,
    };
    use data_manager::{DataManager, SimObjectRecord};
    use host_client::{MockHostConfig, MockHostTransport};

    #[repr(C)]
    #[derive(Debug, Clone, Copy, PartialEq, Pod, Zeroable)]
    pub struct Triple {
        pub x: f64,
        pub y: f64,
        pub z: f64,
    }

    impl Triple {
        pub fn splat(v: f64) -> Self {
            Self { x: v, y: v, z: v }
        }
    }

    pub fn triple_fields() -> Vec<FieldDescriptor> {
        FieldDescriptor::f64_fields([
            ("PLANE LATITUDE", Unit::Degrees),
            ("PLANE LONGITUDE", Unit::Degrees),
            ("PLANE ALTITUDE", Unit::Feet),
        ])
    }

    pub fn manager_with(config: MockHostConfig) -> (DataManager, MockHostTransport) {
        let host = MockHostTransport::with_config(config);
        let mut manager = DataManager::new(DataManagerConfig::default());
        manager.initialize(Box::new(host.clone())).unwrap();
        (manager, host)
    }

    pub fn manager() -> (DataManager, MockHostTransport) {
        manager_with(MockHostConfig::default())
    }

    /// Response for `record` carrying an arbitrary payload
    pub fn response_for(record: &dyn SimObjectRecord, payload: &[u8]) -> HostMessage {
        HostMessage::SimObjectData(SimObjectData::new(
            record.request_id(),
            record.definition_id(),
            Bytes::copy_from_slice(payload),
        ))
    }

    pub fn frame(tick: u64) -> FrameContext {
        FrameContext::new(tick as f64 / 60.0, 1.0 / 60.0)
    }
}

#[cfg(test)]
mod routing_tests {
    use std::collections::HashSet;

    use bytemuck::Zeroable;
    use bytes::Bytes;
    use contracts::{HostMessage, RequestId, SimObjectData};
    use data_manager::{SimObjectRecord, VariablePolicy};

    use crate::support::*;

    #[test]
    fn test_request_ids_are_pairwise_distinct() {
        let (mut manager, _host) = manager();
        let records: Vec<_> = (0..64)
            .map(|i| {
                manager
                    .make_data_definition_variable(
                        &format!("record_{i}"),
                        triple_fields(),
                        Triple::zeroed(),
                        VariablePolicy::manual(),
                    )
                    .unwrap()
            })
            .collect();

        let ids: HashSet<RequestId> = records.iter().map(|r| r.request_id()).collect();
        assert_eq!(ids.len(), records.len());
        assert!(!ids.contains(&RequestId(0)));
    }

    #[test]
    fn test_response_reaches_only_its_record() {
        let (mut manager, _host) = manager();
        let records: Vec<_> = (0..5)
            .map(|i| {
                manager
                    .make_data_definition_variable(
                        &format!("record_{i}"),
                        triple_fields(),
                        Triple::splat(i as f64),
                        VariablePolicy::manual(),
                    )
                    .unwrap()
            })
            .collect();

        let target = &records[3];
        let payload = Triple { x: 47.4, y: 8.5, z: 1400.0 };
        manager
            .process_sim_object_data(&SimObjectData::new(
                target.request_id(),
                target.definition_id(),
                Bytes::copy_from_slice(bytemuck::bytes_of(&payload)),
            ))
            .unwrap();

        for (i, record) in records.iter().enumerate() {
            if i == 3 {
                assert_eq!(record.data(), payload);
                assert_eq!(record.received_count(), 1);
            } else {
                assert_eq!(record.data(), Triple::splat(i as f64));
                assert_eq!(record.received_count(), 0);
            }
        }
    }

    #[test]
    fn test_unknown_request_id_is_discarded() {
        let (mut manager, _host) = manager();
        let a = manager
            .make_data_definition_variable("a", triple_fields(), Triple::splat(1.0), VariablePolicy::manual())
            .unwrap();
        let b = manager
            .make_data_definition_variable("b", triple_fields(), Triple::splat(2.0), VariablePolicy::manual())
            .unwrap();

        let stray = SimObjectData::new(
            RequestId(4242),
            a.definition_id(),
            Bytes::copy_from_slice(bytemuck::bytes_of(&Triple::splat(9.0))),
        );
        assert!(manager.process_sim_object_data(&stray).is_err());
        manager.process_dispatch_message(HostMessage::SimObjectData(stray));

        assert_eq!(a.data(), Triple::splat(1.0));
        assert_eq!(b.data(), Triple::splat(2.0));
    }

    #[test]
    fn test_wrong_payload_size_leaves_buffer_bit_identical() {
        let (mut manager, _host) = manager();
        let initial = Triple { x: -0.0, y: f64::MIN_POSITIVE, z: 3.25 };
        let record = manager
            .make_data_definition_variable("record", triple_fields(), initial, VariablePolicy::manual())
            .unwrap();
        let before = bytemuck::bytes_of(&record.data()).to_vec();

        for len in [0usize, 8, 23, 25, 48] {
            let payload = vec![0xAB; len];
            let message = response_for(&*record, &payload);
            let HostMessage::SimObjectData(data) = &message else {
                unreachable!()
            };
            assert!(manager.process_sim_object_data(data).is_err());
            manager.process_dispatch_message(message);
        }

        assert_eq!(bytemuck::bytes_of(&record.data()), before.as_slice());
        assert_eq!(record.received_count(), 0);
    }

    #[test]
    fn test_interleaved_responses_update_in_arrival_order() {
        let (mut manager, _host) = manager();
        let a = manager
            .make_data_definition_variable("a", triple_fields(), Triple::zeroed(), VariablePolicy::manual())
            .unwrap();
        let b = manager
            .make_data_definition_variable("b", triple_fields(), Triple::zeroed(), VariablePolicy::manual())
            .unwrap();
        assert_eq!(a.request_id(), RequestId(1));
        assert_eq!(b.request_id(), RequestId(2));

        manager.process_dispatch_message(response_for(&*b, bytemuck::bytes_of(&Triple::splat(1.0))));
        assert_eq!(b.data(), Triple::splat(1.0));
        assert_eq!(a.data(), Triple::zeroed());

        manager.process_dispatch_message(response_for(&*a, bytemuck::bytes_of(&Triple::splat(2.0))));
        assert_eq!(a.data(), Triple::splat(2.0));
        assert_eq!(b.data(), Triple::splat(1.0));

        manager.process_dispatch_message(response_for(&*b, bytemuck::bytes_of(&Triple::splat(3.0))));
        assert_eq!(b.data(), Triple::splat(3.0));
        assert_eq!(a.data(), Triple::splat(2.0));
        assert_eq!(a.received_count(), 1);
        assert_eq!(b.received_count(), 2);
    }

    #[test]
    fn test_queued_responses_route_during_pre_update() {
        let (mut manager, host) = manager();
        let a = manager
            .make_data_definition_variable("a", triple_fields(), Triple::zeroed(), VariablePolicy::manual())
            .unwrap();
        let b = manager
            .make_data_definition_variable("b", triple_fields(), Triple::zeroed(), VariablePolicy::manual())
            .unwrap();

        host.push_message(response_for(&*b, bytemuck::bytes_of(&Triple::splat(1.0))));
        host.push_message(response_for(&*a, bytemuck::bytes_of(&Triple::splat(2.0))));
        host.push_message(response_for(&*b, bytemuck::bytes_of(&Triple::splat(3.0))));

        manager.pre_update(&frame(1)).unwrap();
        manager.post_update(&frame(1)).unwrap();

        assert_eq!(a.data(), Triple::splat(2.0));
        assert_eq!(b.data(), Triple::splat(3.0));
        assert_eq!(manager.last_frame_stats().routed_responses, 3);
    }
}

#[cfg(test)]
mod policy_tests {
    use bytemuck::Zeroable;
    use contracts::Unit;
    use data_manager::{ManagedVariable, SimObjectRecord, VariablePolicy};
    use host_client::MockHostConfig;

    use crate::support::*;

    #[test]
    fn test_manual_handles_never_write() {
        let (mut manager, host) = manager();
        let named = manager.make_named_variable("A32NX_MANUAL", Unit::Number, VariablePolicy::manual());
        let read_only = manager.make_named_variable("A32NX_READ", Unit::Number, VariablePolicy::auto_read());
        let aircraft = manager.make_aircraft_variable(
            "LIGHT LANDING",
            1,
            Some("LANDING_LIGHTS_SET"),
            Unit::Bool,
            VariablePolicy::manual(),
        );
        let record = manager
            .make_data_definition_variable("record", triple_fields(), Triple::zeroed(), VariablePolicy::auto_read())
            .unwrap();

        for tick in 1..=500 {
            manager.pre_update(&frame(tick)).unwrap();
            named.set(tick as f64);
            read_only.set(tick as f64);
            aircraft.set((tick % 2) as f64);
            record.set_data(Triple::splat(tick as f64));
            manager.post_update(&frame(tick)).unwrap();
        }

        let calls = host.calls();
        assert_eq!(calls.total_writes(), 0);
        assert!(host.events().is_empty());
        assert!(named.is_dirty());
    }

    #[test]
    fn test_tick_max_age_elides_reads() {
        let (mut manager, host) = manager();
        let var = manager.make_named_variable(
            "A32NX_SLOW",
            Unit::Number,
            VariablePolicy::auto_read().with_max_age_ticks(100),
        );

        for tick in 1..=10_000 {
            manager.pre_update(&frame(tick)).unwrap();
            manager.post_update(&frame(tick)).unwrap();
        }

        let reads = host.calls().reads;
        assert!(reads <= 100, "expected at most 100 reads, got {reads}");
        assert!(reads >= 99);
        assert!(var.has_value());
    }

    #[test]
    fn test_tick_max_age_elides_record_requests() {
        let (mut manager, host) = manager_with(MockHostConfig {
            auto_respond: true,
            ..Default::default()
        });
        let record = manager
            .make_data_definition_variable(
                "record",
                triple_fields(),
                Triple::zeroed(),
                VariablePolicy::auto_read().with_max_age_ticks(100),
            )
            .unwrap();
        host.set_record_bytes(
            record.definition_id(),
            bytemuck::bytes_of(&Triple::splat(5.0)),
        );

        for tick in 1..=1_000 {
            manager.pre_update(&frame(tick)).unwrap();
            manager.post_update(&frame(tick)).unwrap();
        }

        assert!(host.calls().record_requests <= 10);
        assert_eq!(record.data(), Triple::splat(5.0));
    }

    #[test]
    fn test_unset_max_age_reads_every_frame() {
        let (mut manager, host) = manager();
        let _var = manager.make_named_variable("A32NX_FAST", Unit::Number, VariablePolicy::auto_read());

        for tick in 1..=50 {
            manager.pre_update(&frame(tick)).unwrap();
        }
        assert_eq!(host.calls().reads, 50);
    }
}

#[cfg(test)]
mod write_retry_tests {
    use contracts::Unit;
    use data_manager::{ManagedVariable, SimObjectRecord, VariablePolicy};
    use host_client::MockHostConfig;

    use crate::support::*;

    #[test]
    fn test_failed_flush_is_retried_with_local_value() {
        let (mut manager, host) = manager();
        host.set_named("A32NX_RW", 1.0);
        let var = manager.make_named_variable("A32NX_RW", Unit::Number, VariablePolicy::auto_read_write());

        manager.pre_update(&frame(1)).unwrap();
        assert_eq!(var.get(), 1.0);
        var.set(5.0);
        host.set_config(MockHostConfig {
            fail_writes: vec!["A32NX_RW".to_string()],
            ..Default::default()
        });
        manager.post_update(&frame(1)).unwrap();
        assert_eq!(manager.last_frame_stats().host_failures, 1);
        assert_eq!(host.named("A32NX_RW"), Some(1.0));

        manager.pre_update(&frame(2)).unwrap();
        assert_eq!(var.get(), 5.0);
        assert!(var.is_dirty());

        host.set_config(MockHostConfig::default());
        manager.post_update(&frame(2)).unwrap();
        assert_eq!(host.named("A32NX_RW"), Some(5.0));
        assert!(!var.is_dirty());

        // Clean again: reads resume
        host.set_named("A32NX_RW", 7.0);
        manager.pre_update(&frame(3)).unwrap();
        assert_eq!(var.get(), 7.0);
    }

    #[test]
    fn test_failed_record_write_is_retried_with_local_data() {
        let (mut manager, host) = manager_with(MockHostConfig {
            auto_respond: true,
            ..Default::default()
        });
        let record = manager
            .make_data_definition_variable("record", triple_fields(), Triple::splat(1.0), VariablePolicy::auto_read_write())
            .unwrap();
        host.set_record_bytes(record.definition_id(), bytemuck::bytes_of(&Triple::splat(1.0)));

        manager.pre_update(&frame(1)).unwrap();
        record.set_data(Triple::splat(5.0));
        host.set_config(MockHostConfig {
            auto_respond: true,
            fail_record_writes: vec![record.definition_id()],
            ..Default::default()
        });
        manager.post_update(&frame(1)).unwrap();
        assert_eq!(manager.last_frame_stats().host_failures, 1);

        // A late answer to an earlier request must not clobber the local data
        host.push_message(response_for(&*record, bytemuck::bytes_of(&Triple::splat(1.0))));
        manager.pre_update(&frame(2)).unwrap();
        assert_eq!(record.data(), Triple::splat(5.0));

        host.set_config(MockHostConfig {
            auto_respond: true,
            ..Default::default()
        });
        manager.post_update(&frame(2)).unwrap();
        assert_eq!(
            host.record_bytes(record.definition_id()).unwrap(),
            bytemuck::bytes_of(&Triple::splat(5.0))
        );
    }
}

#[cfg(test)]
mod driver_tests {
    use contracts::{DataManagerConfig, FrameContext};
    use data_manager::DataManager;
    use host_client::{MockHostConfig, MockHostTransport};
    use modules::{
        Arinc429LvarBridge, Arinc429Word, BridgePair, FrameDriver, Pushback, PushbackProfile,
        SignStatus,
    };

    fn driver() -> (FrameDriver, MockHostTransport) {
        let host = MockHostTransport::with_config(MockHostConfig {
            auto_respond: true,
            ..Default::default()
        });
        let driver = FrameDriver::new(DataManager::new(DataManagerConfig::default()))
            .with_module(Arinc429LvarBridge::new(vec![BridgePair::new(
                "A32NX_ADIRS_IR_1_PITCH",
                "A32NX_ADIRS_IR_1_PITCH_RAW",
            )]))
            .with_module(Pushback::new(PushbackProfile::a32nx()));
        (driver, host)
    }

    #[test]
    fn test_bridge_writes_decoded_value_in_same_frame() {
        let (mut driver, host) = driver();
        for name in ["SIM ON GROUND", "PUSHBACK ATTACHED", "PLANE HEADING DEGREES TRUE", "RELATIVE WIND VELOCITY BODY Z"] {
            host.set_aircraft(name, 0, 0.0);
        }
        host.set_named("A32NX_IS_READY", 1.0);
        host.set_named("A32NX_ARINC429_LVAR_BRIDGE_ON", 1.0);
        host.set_named(
            "A32NX_ADIRS_IR_1_PITCH",
            Arinc429Word::new(-2.5, SignStatus::NormalOperation).to_f64(),
        );
        driver.initialize(Box::new(host.clone())).unwrap();

        let stats = driver.run_frame(&FrameContext::new(0.0, 0.1)).unwrap();

        assert_eq!(host.named("A32NX_ADIRS_IR_1_PITCH_RAW"), Some(-2.5));
        assert!(stats.host_writes >= 1);
        assert_eq!(stats.host_failures, 0);
    }

    #[test]
    fn test_idle_pushback_writes_nothing() {
        let (mut driver, host) = driver();
        driver.initialize(Box::new(host.clone())).unwrap();

        let mut frame = FrameContext::new(0.0, 0.1);
        for _ in 0..10 {
            driver.run_frame(&frame).unwrap();
            frame = frame.next();
        }

        assert_eq!(host.calls().record_writes, 0);
        assert_eq!(host.named("A32NX_PUSHBACK_SPD"), None);
        assert_eq!(driver.frames(), 10);
    }

    #[test]
    fn test_shutdown_then_frame_is_rejected() {
        let (mut driver, host) = driver();
        driver.initialize(Box::new(host.clone())).unwrap();
        driver.run_frame(&FrameContext::new(0.0, 0.1)).unwrap();
        driver.shutdown().unwrap();

        assert!(driver.run_frame(&FrameContext::new(0.1, 0.1)).is_err());
    }
}
