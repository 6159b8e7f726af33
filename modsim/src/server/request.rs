use crate::common::frame::Frame;
use crate::common::function::FunctionCode;
use crate::constants::{coil, limits};
use crate::decode::AppDecodeLevel;
use crate::device::RegisterKind;
use crate::error::InternalError;
use crate::types::{AddressRange, Indexed};

use scursor::ReadCursor;

/// A request decoded from a received frame
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Request {
    ReadCoils(AddressRange),
    ReadDiscreteInputs(AddressRange),
    ReadHoldingRegisters(AddressRange),
    ReadInputRegisters(AddressRange),
    WriteSingleCoil(Indexed<u16>),
    WriteSingleRegister(Indexed<u16>),
    /// Multi-write codes and everything unknown
    Unsupported(u8),
}

impl Request {
    pub(crate) fn parse(frame: &Frame) -> Result<Self, InternalError> {
        let function = match FunctionCode::get(frame.function()) {
            Some(x) => x,
            None => return Ok(Request::Unsupported(frame.function())),
        };

        let mut cursor = ReadCursor::new(frame.body());

        let request = match function {
            FunctionCode::ReadCoils => Request::ReadCoils(parse_range(&mut cursor)?),
            FunctionCode::ReadDiscreteInputs => {
                Request::ReadDiscreteInputs(parse_range(&mut cursor)?)
            }
            FunctionCode::ReadHoldingRegisters => {
                Request::ReadHoldingRegisters(parse_range(&mut cursor)?)
            }
            FunctionCode::ReadInputRegisters => {
                Request::ReadInputRegisters(parse_range(&mut cursor)?)
            }
            FunctionCode::WriteSingleCoil => Request::WriteSingleCoil(parse_indexed(&mut cursor)?),
            FunctionCode::WriteSingleRegister => {
                Request::WriteSingleRegister(parse_indexed(&mut cursor)?)
            }
            FunctionCode::WriteMultipleCoils | FunctionCode::WriteMultipleRegisters => {
                Request::Unsupported(function.get_value())
            }
        };

        Ok(request)
    }

    pub(crate) fn function(&self) -> u8 {
        match self {
            Request::ReadCoils(_) => FunctionCode::ReadCoils.get_value(),
            Request::ReadDiscreteInputs(_) => FunctionCode::ReadDiscreteInputs.get_value(),
            Request::ReadHoldingRegisters(_) => FunctionCode::ReadHoldingRegisters.get_value(),
            Request::ReadInputRegisters(_) => FunctionCode::ReadInputRegisters.get_value(),
            Request::WriteSingleCoil(_) => FunctionCode::WriteSingleCoil.get_value(),
            Request::WriteSingleRegister(_) => FunctionCode::WriteSingleRegister.get_value(),
            Request::Unsupported(x) => *x,
        }
    }

    /// The register kind and range of a read request
    pub(crate) fn read_target(&self) -> Option<(FunctionCode, RegisterKind, AddressRange)> {
        let (function, range) = match self {
            Request::ReadCoils(range) => (FunctionCode::ReadCoils, range),
            Request::ReadDiscreteInputs(range) => (FunctionCode::ReadDiscreteInputs, range),
            Request::ReadHoldingRegisters(range) => (FunctionCode::ReadHoldingRegisters, range),
            Request::ReadInputRegisters(range) => (FunctionCode::ReadInputRegisters, range),
            _ => return None,
        };
        RegisterKind::for_read(function).map(|kind| (function, kind, *range))
    }
}

/// Largest quantity a single read of `kind` may request
pub(crate) fn max_read_count(kind: RegisterKind) -> u16 {
    if kind.is_bit() {
        limits::MAX_READ_COILS_COUNT
    } else {
        limits::MAX_READ_REGISTERS_COUNT
    }
}

fn parse_range(cursor: &mut ReadCursor) -> Result<AddressRange, InternalError> {
    let start = cursor.read_u16_be()?;
    let count = cursor.read_u16_be()?;
    Ok(AddressRange::new(start, count))
}

fn parse_indexed(cursor: &mut ReadCursor) -> Result<Indexed<u16>, InternalError> {
    let index = cursor.read_u16_be()?;
    let value = cursor.read_u16_be()?;
    Ok(Indexed::new(index, value))
}

pub(crate) struct RequestDisplay<'a> {
    request: &'a Request,
    level: AppDecodeLevel,
}

impl<'a> RequestDisplay<'a> {
    pub(crate) fn new(level: AppDecodeLevel, request: &'a Request) -> Self {
        Self { request, level }
    }
}

impl std::fmt::Display for RequestDisplay<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match FunctionCode::get(self.request.function()) {
            Some(function) => write!(f, "{function}")?,
            None => write!(f, "UNKNOWN ({:#04X})", self.request.function())?,
        }

        if self.level.data_headers() {
            match self.request {
                Request::ReadCoils(range)
                | Request::ReadDiscreteInputs(range)
                | Request::ReadHoldingRegisters(range)
                | Request::ReadInputRegisters(range) => write!(f, " {range}")?,
                Request::WriteSingleCoil(value) => match value.value {
                    coil::ON => write!(f, " idx: {:#06X} value: ON", value.index)?,
                    coil::OFF => write!(f, " idx: {:#06X} value: OFF", value.index)?,
                    _ => write!(f, " {value}")?,
                },
                Request::WriteSingleRegister(value) => write!(f, " {value}")?,
                Request::Unsupported(_) => {}
            }
        }

        Ok(())
    }
}
