use crate::constants::exceptions;

/// Exception codes a slave can answer with
///
/// Only the codes the emulator itself produces have a name. Any other value
/// from the Modbus specification is carried by [`ExceptionCode::Unknown`].
#[derive(Clone, Copy, Debug, PartialEq, PartialOrd, Ord, Eq)]
#[cfg_attr(feature = "serialization", derive(serde::Serialize, serde::Deserialize))]
pub enum ExceptionCode {
    /// The function code is not supported by the slave
    IllegalFunction,
    /// A requested location is not configured with the requested type
    IllegalDataAddress,
    /// The requested quantity is zero or above the protocol limit
    IllegalDataValue,
    /// The slave could not build its response
    ServerDeviceFailure,
    /// Any other exception code
    Unknown(u8),
}

impl From<u8> for ExceptionCode {
    fn from(value: u8) -> Self {
        match value {
            exceptions::ILLEGAL_FUNCTION => ExceptionCode::IllegalFunction,
            exceptions::ILLEGAL_DATA_ADDRESS => ExceptionCode::IllegalDataAddress,
            exceptions::ILLEGAL_DATA_VALUE => ExceptionCode::IllegalDataValue,
            exceptions::SERVER_DEVICE_FAILURE => ExceptionCode::ServerDeviceFailure,
            _ => ExceptionCode::Unknown(value),
        }
    }
}

impl From<ExceptionCode> for u8 {
    fn from(ex: ExceptionCode) -> Self {
        match ex {
            ExceptionCode::IllegalFunction => exceptions::ILLEGAL_FUNCTION,
            ExceptionCode::IllegalDataAddress => exceptions::ILLEGAL_DATA_ADDRESS,
            ExceptionCode::IllegalDataValue => exceptions::ILLEGAL_DATA_VALUE,
            ExceptionCode::ServerDeviceFailure => exceptions::SERVER_DEVICE_FAILURE,
            ExceptionCode::Unknown(value) => value,
        }
    }
}

impl std::error::Error for ExceptionCode {}

impl std::fmt::Display for ExceptionCode {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        match self {
            ExceptionCode::IllegalFunction => f.write_str("illegal function"),
            ExceptionCode::IllegalDataAddress => f.write_str("illegal data address"),
            ExceptionCode::IllegalDataValue => f.write_str("illegal data value"),
            ExceptionCode::ServerDeviceFailure => f.write_str("server device failure"),
            ExceptionCode::Unknown(code) => write!(f, "exception code {code:#04X}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn converts_to_and_from_wire_values() {
        assert_eq!(u8::from(ExceptionCode::IllegalFunction), 0x01);
        assert_eq!(u8::from(ExceptionCode::IllegalDataAddress), 0x02);
        assert_eq!(ExceptionCode::from(0x03), ExceptionCode::IllegalDataValue);
        assert_eq!(ExceptionCode::from(0x0B), ExceptionCode::Unknown(0x0B));
        assert_eq!(u8::from(ExceptionCode::Unknown(0x0B)), 0x0B);
    }

    #[test]
    fn displays_short_names() {
        assert_eq!(ExceptionCode::IllegalDataAddress.to_string(), "illegal data address");
        assert_eq!(ExceptionCode::Unknown(6).to_string(), "exception code 0x06");
    }
}
