use crate::common::frame::FrameWriter;
use crate::common::function::FunctionCode;
use crate::common::serialize::{BitValues, RegisterValues};
use crate::decode::AppDecodeLevel;
use crate::error::InternalError;
use crate::exception::ExceptionCode;
use crate::types::{Indexed, UnitId};

/// What a device decided to send back for one request
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum Response<'a> {
    /// Write requests are acknowledged by repeating them verbatim
    Echo(&'a [u8]),
    /// Values for a read coils / read discrete inputs request
    Bits {
        function: FunctionCode,
        start: u16,
        values: Vec<u16>,
    },
    /// Values for a read holding / input registers request
    Registers {
        function: FunctionCode,
        start: u16,
        values: Vec<u16>,
    },
    Exception {
        function: u8,
        exception: ExceptionCode,
    },
}

impl<'a> Response<'a> {
    pub(crate) fn exception(function: u8, exception: ExceptionCode) -> Self {
        Response::Exception {
            function,
            exception,
        }
    }

    /// Serialize the response into the writer, appending a CRC unless it is an echo
    pub(crate) fn write<'b>(
        &self,
        unit_id: UnitId,
        writer: &'b mut FrameWriter,
    ) -> Result<&'b [u8], InternalError> {
        match self {
            Response::Echo(request) => writer.echo(request),
            Response::Bits {
                function, values, ..
            } => writer.format(unit_id, function.get_value(), &BitValues::new(values)),
            Response::Registers {
                function, values, ..
            } => writer.format(unit_id, function.get_value(), &RegisterValues::new(values)),
            Response::Exception {
                function,
                exception,
            } => Ok(writer.exception(unit_id, *function, *exception)),
        }
    }
}

pub(crate) struct ResponseDisplay<'a, 'b> {
    response: &'a Response<'b>,
    level: AppDecodeLevel,
}

impl<'a, 'b> ResponseDisplay<'a, 'b> {
    pub(crate) fn new(level: AppDecodeLevel, response: &'a Response<'b>) -> Self {
        Self { response, level }
    }
}

impl std::fmt::Display for ResponseDisplay<'_, '_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.response {
            Response::Echo(request) => {
                write!(f, "ECHO ({} bytes)", request.len())?;
            }
            Response::Bits {
                function,
                start,
                values,
            } => {
                write!(f, "{function}")?;
                if self.level.data_headers() {
                    write!(f, " start: {:#06X} qty: {}", start, values.len())?;
                }
                if self.level.data_values() {
                    for (index, value) in (*start..).zip(values.iter()) {
                        write!(f, "\n{}", Indexed::new(index, *value != 0))?;
                    }
                }
            }
            Response::Registers {
                function,
                start,
                values,
            } => {
                write!(f, "{function}")?;
                if self.level.data_headers() {
                    write!(f, " start: {:#06X} qty: {}", start, values.len())?;
                }
                if self.level.data_values() {
                    for (index, value) in (*start..).zip(values.iter()) {
                        write!(f, "\n{}", Indexed::new(index, *value))?;
                    }
                }
            }
            Response::Exception {
                function,
                exception,
            } => {
                write!(f, "EXCEPTION ({function:#04X}) {exception}")?;
            }
        }
        Ok(())
    }
}
