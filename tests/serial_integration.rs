// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Integration tests against in-memory serial ports.

use std::sync::Arc;
use std::time::Duration;

use serial_send::config::{CoverConfig, LightConfig, PortConfig};
use serial_send::entity::{SerialCover, SerialLight};
use serial_send::protocol::{MemoryOpener, PortRegistry};
use serial_send::{ActuatorState, CommandPacket, ConfigError, Direction, TimedActuator};
use tokio::time::sleep;

fn packet(hex: &str) -> CommandPacket {
    hex.parse().unwrap()
}

fn ms(millis: u64) -> Duration {
    Duration::from_millis(millis)
}

// ============================================================================
// Command Packets
// ============================================================================

mod packets {
    use super::*;

    #[test]
    fn hex_round_trip() {
        for hex in ["A1B2", "00FF", "DEADBEEF", "0102030405060708090A"] {
            let decoded = packet(hex);
            assert_eq!(decoded.to_hex(), hex);
        }
    }

    #[test]
    fn invalid_hex_fails_without_opening_port() {
        let opener = MemoryOpener::new();
        let registry = PortRegistry::new(opener.clone());

        for bad in ["A1B", "GG", "12 3", "0x12"] {
            let json = format!(
                r#"{{
                    "serial_port": "/dev/ttyUSB0",
                    "serial_cmd_turn_on": "{bad}",
                    "serial_cmd_turn_off": "A1B2"
                }}"#
            );
            let err = SerialLight::from_json(&registry, &json).unwrap_err();
            assert!(matches!(err, ConfigError::InvalidHex { .. }), "{bad}: {err}");
        }

        assert!(registry.is_empty());
        assert_eq!(opener.open_attempts(), 0);
    }
}

// ============================================================================
// Port Registry and Dispatch
// ============================================================================

mod dispatch {
    use super::*;

    #[test]
    fn acquire_returns_same_handle_per_path() {
        let registry = PortRegistry::new(MemoryOpener::new());

        let first = registry.acquire(&PortConfig::new("/dev/ttyUSB0"));
        let second = registry.acquire(
            &PortConfig::new("/dev/ttyUSB0")
                .with_baud_rate(57_600)
                .with_xonxoff(),
        );

        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(second.config().baud_rate, 9600);
        assert!(!second.config().xonxoff);
    }

    #[test]
    fn unopened_handle_opens_exactly_once_before_write() {
        let opener = MemoryOpener::new();
        let registry = PortRegistry::new(opener.clone());
        let handle = registry.acquire(&PortConfig::new("/dev/ttyUSB0"));

        assert_eq!(opener.open_attempts(), 0);
        assert_eq!(handle.send(&packet("A1B2")).unwrap(), 2);
        assert_eq!(opener.open_attempts(), 1);
        assert_eq!(opener.opened_paths(), vec!["/dev/ttyUSB0".to_string()]);

        handle.send(&packet("C3D4")).unwrap();
        assert_eq!(opener.open_attempts(), 1);
    }

    #[test]
    fn concurrent_sends_do_not_interleave() {
        let opener = MemoryOpener::new();
        let registry = PortRegistry::new(opener.clone());
        let handle = registry.acquire(&PortConfig::new("/dev/ttyUSB0"));

        let a = packet("A1A2A3A4A5A6A7A8A9AA");
        let b = packet("B1B2B3B4B5B6B7B8B9BA");

        std::thread::scope(|s| {
            for _ in 0..4 {
                s.spawn(|| {
                    for _ in 0..25 {
                        handle.send(&a).unwrap();
                    }
                });
                s.spawn(|| {
                    for _ in 0..25 {
                        handle.send(&b).unwrap();
                    }
                });
            }
        });

        let writes = opener.writes();
        assert_eq!(writes.len(), 200);
        assert!(
            writes
                .iter()
                .all(|w| w == a.as_bytes() || w == b.as_bytes())
        );

        // The wire is the packets back to back, in write order
        let expected: Vec<u8> = writes.concat();
        assert_eq!(opener.wire(), expected);
        assert_eq!(opener.open_attempts(), 1);
    }

    #[test]
    fn shutdown_closes_every_port() {
        let opener = MemoryOpener::new();
        let registry = PortRegistry::new(opener.clone());
        let first = registry.acquire(&PortConfig::new("/dev/ttyUSB0"));
        let second = registry.acquire(&PortConfig::new("/dev/ttyUSB1"));
        first.send(&packet("AA")).unwrap();
        second.send(&packet("BB")).unwrap();

        registry.shutdown();

        assert!(!first.is_open());
        assert!(!second.is_open());
        assert!(first.send(&packet("AA")).is_err());
        assert_eq!(opener.open_attempts(), 2);
    }
}

// ============================================================================
// Timed Actuator Scenarios
// ============================================================================

mod actuator {
    use super::*;

    fn actuator(opener: &MemoryOpener) -> (PortRegistry, TimedActuator) {
        let registry = PortRegistry::new(opener.clone());
        let actuator = TimedActuator::new(registry.acquire(&PortConfig::new("/dev/ttyUSB0")));
        (registry, actuator)
    }

    #[tokio::test(start_paused = true)]
    async fn stop_before_interval_suppresses_late_end() {
        let opener = MemoryOpener::new();
        let (_registry, actuator) = actuator(&opener);

        actuator
            .start(Direction::Open, &packet("AA"), &packet("BB"), ms(500))
            .await
            .unwrap();
        actuator.stop().await.unwrap();

        sleep(ms(2000)).await;
        assert_eq!(opener.writes(), vec![vec![0xAA], vec![0xBB]]);
        assert_eq!(actuator.state(), ActuatorState::Idle);
    }

    #[tokio::test(start_paused = true)]
    async fn end_follows_start_after_interval() {
        let opener = MemoryOpener::new();
        let (_registry, actuator) = actuator(&opener);

        actuator
            .start(Direction::Open, &packet("AA"), &packet("BB"), ms(500))
            .await
            .unwrap();
        assert_eq!(opener.writes(), vec![vec![0xAA]]);

        sleep(ms(400)).await;
        assert_eq!(opener.writes(), vec![vec![0xAA]]);
        assert_eq!(actuator.state(), ActuatorState::Opening);

        sleep(ms(200)).await;
        assert_eq!(opener.writes(), vec![vec![0xAA], vec![0xBB]]);
        assert_eq!(actuator.state(), ActuatorState::Idle);
    }

    #[tokio::test(start_paused = true)]
    async fn start_returns_before_end_is_due() {
        let opener = MemoryOpener::new();
        let (_registry, actuator) = actuator(&opener);

        let before = tokio::time::Instant::now();
        actuator
            .start(Direction::Close, &packet("CC"), &packet("DD"), ms(10_000))
            .await
            .unwrap();
        assert_eq!(tokio::time::Instant::now(), before);
        assert!(actuator.port().is_busy());
    }
}

// ============================================================================
// Entities
// ============================================================================

mod entities {
    use super::*;

    #[tokio::test(start_paused = true)]
    async fn light_and_cover_share_one_port() {
        let opener = MemoryOpener::new();
        let registry = PortRegistry::new(opener.clone());

        let light = SerialLight::new(
            &registry,
            LightConfig::from_value(serde_json::json!({
                "name": "Lamp",
                "serial_port": "/dev/ttyUSB0",
                "serial_cmd_turn_on": "01",
                "serial_cmd_turn_off": "02"
            }))
            .unwrap(),
        );
        let cover = SerialCover::new(
            &registry,
            CoverConfig::from_value(serde_json::json!({
                "name": "Blind",
                "serial_port": "/dev/ttyUSB0",
                "baudrate": 115200,
                "serial_cmd_start_open": "AA",
                "serial_cmd_end_open": "AB",
                "serial_cmd_start_close": "BA",
                "serial_cmd_end_close": "BB",
                "serial_cmd_interval_ms": 300
            }))
            .unwrap(),
        );

        assert_eq!(registry.len(), 1);
        assert_eq!(registry.get("/dev/ttyUSB0").unwrap().config().baud_rate, 9600);

        cover.close_cover().await.unwrap();
        light.turn_on().await.unwrap();
        sleep(ms(400)).await;

        assert_eq!(
            opener.writes(),
            vec![vec![0xBA], vec![0x01], vec![0xBB]]
        );
        assert_eq!(opener.open_attempts(), 1);
        assert!(light.is_on());
        assert!(!cover.is_closing());
    }

    #[tokio::test(start_paused = true)]
    async fn cover_reports_features() {
        let registry = PortRegistry::new(MemoryOpener::new());
        let cover = SerialCover::from_json(
            &registry,
            r#"{
                "serial_port": "/dev/ttyUSB0",
                "serial_cmd_start_open": "AA",
                "serial_cmd_end_open": "AB"
            }"#,
        )
        .unwrap();

        let features = cover.supported_features();
        assert!(features.supports_open());
        assert!(features.supports_stop());
        assert!(!features.supports_close());
        assert_eq!(cover.name(), "Serial Sensor");
    }
}
