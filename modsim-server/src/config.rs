//! YAML description of the bus and the slaves to emulate

use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

use modsim::device::{Device, RegisterDescriptor};
use modsim::UnitId;

/// Errors that prevent the configuration from being used
#[derive(Debug, thiserror::Error)]
pub(crate) enum ConfigError {
    #[error("unable to read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("invalid YAML: {0}")]
    Yaml(#[from] serde_yaml::Error),
    #[error("no connection is configured")]
    NoConnection,
    #[error("slave address {0} is outside of 1..=247")]
    BadAddress(u32),
    #[error("slave address {0} is configured more than once")]
    DuplicateAddress(u8),
    #[error("slave {address} configures location {location} more than once")]
    DuplicateLocation { address: u8, location: u16 },
    #[error("slave {address} location {location}: min ({min}) is greater than max ({max})")]
    BadBounds {
        address: u8,
        location: u16,
        min: u16,
        max: u16,
    },
}

/// Serial port the bus is attached to
#[derive(Clone, Debug, PartialEq, Eq, serde::Deserialize)]
pub(crate) struct Connection {
    pub(crate) port: String,
    pub(crate) speed: u32,
}

#[derive(Clone, Debug, serde::Deserialize)]
struct Slave {
    address: u32,
    #[serde(default)]
    description: String,
    #[serde(default)]
    registries: Vec<RegisterDescriptor>,
}

#[derive(Clone, Debug, serde::Deserialize)]
struct RawConfig {
    connection: Vec<Connection>,
    #[serde(default)]
    slaves: Vec<Slave>,
}

/// A validated configuration
#[derive(Debug)]
pub(crate) struct Config {
    connection: Connection,
    devices: Vec<Device>,
}

impl Config {
    pub(crate) fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_owned(),
            source,
        })?;
        Self::parse(&text)
    }

    pub(crate) fn parse(text: &str) -> Result<Self, ConfigError> {
        let raw: RawConfig = serde_yaml::from_str(text)?;

        // only the first connection is used
        let connection = raw
            .connection
            .into_iter()
            .next()
            .ok_or(ConfigError::NoConnection)?;

        let mut addresses = BTreeSet::new();
        let mut devices = Vec::with_capacity(raw.slaves.len());
        for slave in raw.slaves {
            let address = match u8::try_from(slave.address) {
                Ok(x) if !UnitId::new(x).is_rtu_reserved() => x,
                _ => return Err(ConfigError::BadAddress(slave.address)),
            };
            if !addresses.insert(address) {
                return Err(ConfigError::DuplicateAddress(address));
            }
            let registers = validate_registers(address, slave.registries)?;
            devices.push(Device::new(
                UnitId::new(address),
                slave.description,
                registers,
            ));
        }

        Ok(Self {
            connection,
            devices,
        })
    }

    pub(crate) fn connection(&self) -> &Connection {
        &self.connection
    }

    pub(crate) fn into_parts(self) -> (Connection, Vec<Device>) {
        (self.connection, self.devices)
    }
}

fn validate_registers(
    address: u8,
    mut registers: Vec<RegisterDescriptor>,
) -> Result<Vec<RegisterDescriptor>, ConfigError> {
    registers.sort_by_key(|reg| reg.location);

    for pair in registers.windows(2) {
        if pair[0].location == pair[1].location {
            return Err(ConfigError::DuplicateLocation {
                address,
                location: pair[0].location,
            });
        }
    }

    if let Some(reg) = registers.iter().find(|reg| reg.min > reg.max) {
        return Err(ConfigError::BadBounds {
            address,
            location: reg.location,
            min: reg.min,
            max: reg.max,
        });
    }

    Ok(registers)
}

#[cfg(test)]
mod tests {
    use super::*;
    use modsim::device::{RegisterKind, ValueMode};

    const SAMPLE: &str = r#"
connection:
  - port: /dev/ttyUSB0
    speed: 9600
slaves:
  - address: 10
    description: boiler
    registries:
      - { location: 12, length: 1, min: 1, max: 2, type: input, value: random_generated }
      - { location: 10, length: 1, min: 0, max: 122, type: holding, value: fixed }
      - { location: 11, min: 0, max: 0, type: coil, value: read }
  - address: 11
    description: relays
    registries:
      - { location: 0, length: 1, min: 0, max: 1, type: input_discrete, value: fixed }
"#;

    #[test]
    fn parses_sample_configuration() {
        let config = Config::parse(SAMPLE).unwrap();
        assert_eq!(
            config.connection(),
            &Connection {
                port: "/dev/ttyUSB0".to_string(),
                speed: 9600,
            }
        );

        let (_, devices) = config.into_parts();
        assert_eq!(devices.len(), 2);
        assert_eq!(devices[0].unit_id(), UnitId::new(10));
        assert_eq!(devices[0].description(), "boiler");

        // registers are sorted by location
        let registers = devices[0].store().registers();
        assert_eq!(
            registers,
            &[
                RegisterDescriptor::new(10, RegisterKind::Holding, ValueMode::Fixed, 0, 122),
                RegisterDescriptor::new(11, RegisterKind::Coil, ValueMode::ExternalRead, 0, 0),
                RegisterDescriptor::new(12, RegisterKind::Input, ValueMode::Random, 1, 2),
            ]
        );
        assert_eq!(devices[1].store().registers()[0].kind, RegisterKind::InputDiscrete);
    }

    #[test]
    fn rejects_duplicate_addresses() {
        let text = r#"
connection: [{ port: COM1, speed: 19200 }]
slaves:
  - { address: 5, description: a, registries: [] }
  - { address: 5, description: b, registries: [] }
"#;
        assert!(matches!(
            Config::parse(text),
            Err(ConfigError::DuplicateAddress(5))
        ));
    }

    #[test]
    fn rejects_reserved_addresses() {
        for address in [0, 248, 300] {
            let text = format!(
                "connection: [{{ port: COM1, speed: 9600 }}]\nslaves: [{{ address: {address} }}]"
            );
            assert!(matches!(
                Config::parse(&text),
                Err(ConfigError::BadAddress(x)) if x == address
            ));
        }
    }

    #[test]
    fn rejects_duplicate_locations() {
        let text = r#"
connection: [{ port: COM1, speed: 9600 }]
slaves:
  - address: 1
    registries:
      - { location: 3, min: 0, max: 1, type: coil, value: fixed }
      - { location: 3, min: 0, max: 1, type: holding, value: fixed }
"#;
        assert!(matches!(
            Config::parse(text),
            Err(ConfigError::DuplicateLocation {
                address: 1,
                location: 3
            })
        ));
    }

    #[test]
    fn rejects_inverted_bounds() {
        let text = r#"
connection: [{ port: COM1, speed: 9600 }]
slaves:
  - address: 1
    registries:
      - { location: 3, min: 9, max: 1, type: holding, value: random_generated }
"#;
        assert!(matches!(
            Config::parse(text),
            Err(ConfigError::BadBounds { location: 3, .. })
        ));
    }

    #[test]
    fn rejects_missing_connection_and_unknown_kinds() {
        assert!(matches!(
            Config::parse("connection: []\nslaves: []"),
            Err(ConfigError::NoConnection)
        ));

        let text = r#"
connection: [{ port: COM1, speed: 9600 }]
slaves:
  - address: 1
    registries:
      - { location: 3, min: 0, max: 1, type: eeprom, value: fixed }
"#;
        assert!(matches!(Config::parse(text), Err(ConfigError::Yaml(_))));
    }
}
