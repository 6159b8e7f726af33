//! An emulator for one or more [Modbus](http://modbus.org/) RTU slave devices sharing a single
//! serial bus, built on [Tokio](https://docs.rs/tokio).
//!
//! # Features
//!
//! * Any number of virtual slaves, each with its own register map
//! * Fixed, randomized, or externally sourced register values
//! * Non-blocking frame assembly that tolerates idle-line noise
//! * Panic-free parsing: corrupted or foreign traffic is never answered
//! * Serial transport with automatic port re-open (feature `serial`)
//!
//! # Supported Functions
//!
//! * Read Coils
//! * Read Discrete Inputs
//! * Read Holding Registers
//! * Read Input Registers
//! * Write Single Coil (acknowledged, not stored)
//! * Write Single Register (acknowledged, not stored)
//!
//! Every other function code receives an `ILLEGAL FUNCTION` exception.
//!
//! # Example
//!
//! Driving the protocol engine directly, without any transport:
//!
//! ```
//! use modsim::device::*;
//! use modsim::server::*;
//! use modsim::UnitId;
//!
//! let device = Device::new(
//!     UnitId::new(10),
//!     "boiler",
//!     vec![RegisterDescriptor::new(10, RegisterKind::Holding, ValueMode::Fixed, 0, 122)],
//! );
//!
//! let mut dispatcher = Dispatcher::new(vec![device]);
//!
//! // read one holding register at address 10
//! dispatcher.feed(&[0x0A, 0x03, 0x00, 0x0A, 0x00, 0x01, 0xA5, 0x73]);
//!
//! match dispatcher.poll_once() {
//!     Reply::PackageOk(bytes) => assert_eq!(bytes, &[0x0A, 0x03, 0x02, 0x00, 122, 0x9C, 0x66]),
//!     other => panic!("unexpected reply: {other:?}"),
//! }
//! ```

/// Public constant values related to the Modbus specification
pub mod constants;
/// Virtual slave devices and their register maps
pub mod device;
/// Frame dispatching and the serial server task
pub mod server;

mod common;
mod decode;
mod error;
mod exception;
#[cfg(feature = "serial")]
mod retry;
#[cfg(feature = "serial")]
mod serial;
mod types;

// re-exports
pub use crate::common::crc::crc16;
pub use crate::decode::*;
pub use crate::error::*;
pub use crate::exception::*;
#[cfg(feature = "serial")]
pub use crate::retry::*;
#[cfg(feature = "serial")]
pub use crate::serial::*;
pub use crate::types::*;
