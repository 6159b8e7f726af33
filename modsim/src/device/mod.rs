use crate::common::frame::Frame;
use crate::decode::AppDecodeLevel;
use crate::error::{InternalError, NoSuchRegistry};
use crate::exception::ExceptionCode;
use crate::server::request::{max_read_count, Request, RequestDisplay};
use crate::server::response::Response;
use crate::types::{AddressRange, UnitId};

pub use register::*;
pub use source::*;
pub use store::*;

mod register;
mod source;
mod store;

/// A virtual slave on the bus
///
/// A device is immutable once built: every read resolves its values afresh from
/// the register map, so nothing a master sends can change what it reports.
pub struct Device {
    unit_id: UnitId,
    description: String,
    store: RegisterStore,
    source: Box<dyn ValueSource>,
}

impl std::fmt::Debug for Device {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Device")
            .field("unit_id", &self.unit_id)
            .field("description", &self.description)
            .field("registers", &self.store.len())
            .finish()
    }
}

impl Device {
    /// Create a device whose externally sourced registers read from [`PlaceholderSource`]
    ///
    /// `registers` must be sorted by ascending location.
    pub fn new(
        unit_id: UnitId,
        description: impl Into<String>,
        registers: Vec<RegisterDescriptor>,
    ) -> Self {
        Self {
            unit_id,
            description: description.into(),
            store: RegisterStore::new(registers),
            source: Box::new(PlaceholderSource),
        }
    }

    /// Replace the source consulted for [`ValueMode::ExternalRead`] registers
    pub fn with_source(mut self, source: impl ValueSource + 'static) -> Self {
        self.source = Box::new(source);
        self
    }

    /// Address the device answers to
    pub fn unit_id(&self) -> UnitId {
        self.unit_id
    }

    /// Human readable description
    pub fn description(&self) -> &str {
        &self.description
    }

    /// The device's register map
    pub fn store(&self) -> &RegisterStore {
        &self.store
    }

    /// Resolve the current values of `count` registers of type `kind` starting at `start`
    pub fn read_values(
        &self,
        kind: RegisterKind,
        start: u16,
        count: u16,
    ) -> Result<Vec<u16>, NoSuchRegistry> {
        self.store.read_values(
            kind,
            AddressRange::new(start, count),
            self.unit_id,
            self.source.as_ref(),
        )
    }

    /// Decide how to answer a frame addressed to this device
    pub(crate) fn respond<'a>(
        &self,
        frame: &'a Frame,
        level: AppDecodeLevel,
    ) -> Result<Response<'a>, InternalError> {
        if frame.unit_id() != self.unit_id {
            return Err(InternalError::UnitIdMismatch(self.unit_id, frame.unit_id()));
        }

        let request = Request::parse(frame)?;

        if level.enabled() {
            tracing::info!("PDU RX - {}", RequestDisplay::new(level, &request));
        }

        let response = match request {
            Request::WriteSingleCoil(_) | Request::WriteSingleRegister(_) => {
                Response::Echo(frame.as_slice())
            }
            Request::Unsupported(function) => {
                tracing::debug!("unsupported function code: {:#04X}", function);
                Response::exception(function, ExceptionCode::IllegalFunction)
            }
            _ => match request.read_target() {
                Some((function, kind, range)) => {
                    if range.count == 0 || range.count > max_read_count(kind) {
                        tracing::debug!("illegal quantity for {}: {}", function, range.count);
                        return Ok(Response::exception(
                            function.get_value(),
                            ExceptionCode::IllegalDataValue,
                        ));
                    }
                    match self.read_values(kind, range.start, range.count) {
                        Ok(values) if kind.is_bit() => Response::Bits {
                            function,
                            start: range.start,
                            values,
                        },
                        Ok(values) => Response::Registers {
                            function,
                            start: range.start,
                            values,
                        },
                        Err(err) => {
                            tracing::debug!("device {}: {}", self.unit_id, err);
                            Response::exception(
                                function.get_value(),
                                ExceptionCode::IllegalDataAddress,
                            )
                        }
                    }
                }
                None => Response::exception(request.function(), ExceptionCode::IllegalFunction),
            },
        };

        Ok(response)
    }
}
