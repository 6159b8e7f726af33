use std::fmt::{Display, Formatter};

/// Set in the function code of an exception response
pub(crate) const ERROR_DELIMITER: u8 = 0x80;

/// Function codes the frame assembler and the devices know about
///
/// The multi-write codes are only recognized so their variable length frames can be
/// consumed whole. The devices refuse them.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
#[repr(u8)]
pub(crate) enum FunctionCode {
    ReadCoils = 1,
    ReadDiscreteInputs = 2,
    ReadHoldingRegisters = 3,
    ReadInputRegisters = 4,
    WriteSingleCoil = 5,
    WriteSingleRegister = 6,
    WriteMultipleCoils = 15,
    WriteMultipleRegisters = 16,
}

const ALL: [FunctionCode; 8] = [
    FunctionCode::ReadCoils,
    FunctionCode::ReadDiscreteInputs,
    FunctionCode::ReadHoldingRegisters,
    FunctionCode::ReadInputRegisters,
    FunctionCode::WriteSingleCoil,
    FunctionCode::WriteSingleRegister,
    FunctionCode::WriteMultipleCoils,
    FunctionCode::WriteMultipleRegisters,
];

impl FunctionCode {
    pub(crate) const fn get_value(self) -> u8 {
        self as u8
    }

    pub(crate) fn get(value: u8) -> Option<Self> {
        ALL.into_iter().find(|code| code.get_value() == value)
    }

    fn name(self) -> &'static str {
        match self {
            FunctionCode::ReadCoils => "READ COILS",
            FunctionCode::ReadDiscreteInputs => "READ DISCRETE INPUTS",
            FunctionCode::ReadHoldingRegisters => "READ HOLDING REGISTERS",
            FunctionCode::ReadInputRegisters => "READ INPUT REGISTERS",
            FunctionCode::WriteSingleCoil => "WRITE SINGLE COIL",
            FunctionCode::WriteSingleRegister => "WRITE SINGLE REGISTER",
            FunctionCode::WriteMultipleCoils => "WRITE MULTIPLE COILS",
            FunctionCode::WriteMultipleRegisters => "WRITE MULTIPLE REGISTERS",
        }
    }

    /// Multi-write requests carry a byte count and a variable payload
    pub(crate) fn has_extended_payload(self) -> bool {
        matches!(
            self,
            FunctionCode::WriteMultipleCoils | FunctionCode::WriteMultipleRegisters
        )
    }
}

impl Display for FunctionCode {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} ({:#04X})", self.name(), self.get_value())
    }
}
