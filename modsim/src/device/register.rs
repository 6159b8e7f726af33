use crate::common::function::FunctionCode;

/// The four Modbus data tables a register can live in
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serialization", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serialization", serde(rename_all = "snake_case"))]
pub enum RegisterKind {
    /// Single read/write bit
    Coil,
    /// Single read-only bit
    InputDiscrete,
    /// 16-bit read/write register
    Holding,
    /// 16-bit read-only register
    Input,
}

impl RegisterKind {
    /// Kind of register addressed by a read function code
    pub(crate) fn for_read(function: FunctionCode) -> Option<Self> {
        match function {
            FunctionCode::ReadCoils => Some(RegisterKind::Coil),
            FunctionCode::ReadDiscreteInputs => Some(RegisterKind::InputDiscrete),
            FunctionCode::ReadHoldingRegisters => Some(RegisterKind::Holding),
            FunctionCode::ReadInputRegisters => Some(RegisterKind::Input),
            _ => None,
        }
    }

    /// True for coils and discrete inputs
    pub fn is_bit(self) -> bool {
        matches!(self, RegisterKind::Coil | RegisterKind::InputDiscrete)
    }
}

impl std::fmt::Display for RegisterKind {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        let name = match self {
            RegisterKind::Coil => "coil",
            RegisterKind::InputDiscrete => "input_discrete",
            RegisterKind::Holding => "holding",
            RegisterKind::Input => "input",
        };
        f.write_str(name)
    }
}

/// How the value of a register is produced each time it is read
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serialization", derive(serde::Serialize, serde::Deserialize))]
pub enum ValueMode {
    /// Always the configured `max`
    #[cfg_attr(feature = "serialization", serde(rename = "fixed"))]
    Fixed,
    /// Uniformly drawn from `[min, max]` on every read
    #[cfg_attr(feature = "serialization", serde(rename = "random_generated"))]
    Random,
    /// Supplied by the device's [`ValueSource`](crate::device::ValueSource)
    #[cfg_attr(feature = "serialization", serde(rename = "read"))]
    ExternalRead,
}

#[cfg(feature = "serialization")]
fn default_length() -> u16 {
    1
}

/// Static description of one register of a device
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serialization", derive(serde::Serialize, serde::Deserialize))]
pub struct RegisterDescriptor {
    /// Modbus address of the register
    pub location: u16,
    /// Reserved, always 1
    #[cfg_attr(feature = "serialization", serde(default = "default_length"))]
    pub length: u16,
    /// Data table the register belongs to
    #[cfg_attr(feature = "serialization", serde(rename = "type"))]
    pub kind: RegisterKind,
    /// Value strategy
    #[cfg_attr(feature = "serialization", serde(rename = "value"))]
    pub mode: ValueMode,
    /// Lower bound for random values
    pub min: u16,
    /// Upper bound for random values, and the value of fixed registers
    pub max: u16,
}

impl RegisterDescriptor {
    /// Create a descriptor of length 1
    pub fn new(location: u16, kind: RegisterKind, mode: ValueMode, min: u16, max: u16) -> Self {
        Self {
            location,
            length: 1,
            kind,
            mode,
            min,
            max,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn maps_read_functions_to_kinds() {
        assert_eq!(
            RegisterKind::for_read(FunctionCode::ReadCoils),
            Some(RegisterKind::Coil)
        );
        assert_eq!(
            RegisterKind::for_read(FunctionCode::ReadDiscreteInputs),
            Some(RegisterKind::InputDiscrete)
        );
        assert_eq!(
            RegisterKind::for_read(FunctionCode::ReadHoldingRegisters),
            Some(RegisterKind::Holding)
        );
        assert_eq!(
            RegisterKind::for_read(FunctionCode::ReadInputRegisters),
            Some(RegisterKind::Input)
        );
        assert_eq!(RegisterKind::for_read(FunctionCode::WriteSingleCoil), None);
    }

    #[test]
    fn displays_configuration_names() {
        assert_eq!(RegisterKind::InputDiscrete.to_string(), "input_discrete");
        assert_eq!(RegisterKind::Holding.to_string(), "holding");
    }

    #[test]
    fn descriptor_defaults_to_length_one() {
        let desc = RegisterDescriptor::new(3, RegisterKind::Input, ValueMode::Fixed, 0, 7);
        assert_eq!(desc.length, 1);
    }
}
