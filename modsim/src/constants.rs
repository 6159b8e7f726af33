/// Constants used for coil values
pub mod coil {
    /// u16 representation of COIL == ON when performing write single coil
    pub const ON: u16 = 0xFF00;
    /// u16 representation of COIL == OFF when performing write single coil
    pub const OFF: u16 = 0x0000;
}

/// Limits of request sizes
pub mod limits {
    /// Maximum count allowed in a read coils/discrete inputs request
    pub const MAX_READ_COILS_COUNT: u16 = 0x07D0;
    /// Maximum count allowed in a read holding/input registers request
    pub const MAX_READ_REGISTERS_COUNT: u16 = 0x007D;
    /// Highest unit id a slave may answer to on a serial line
    pub const MAX_UNIT_ID: u8 = 247;
}

/// Exception codes sent by the emulated slaves
pub mod exceptions {
    /// Unsupported function code
    pub const ILLEGAL_FUNCTION: u8 = 0x01;
    /// Location missing or of another type
    pub const ILLEGAL_DATA_ADDRESS: u8 = 0x02;
    /// Quantity out of range
    pub const ILLEGAL_DATA_VALUE: u8 = 0x03;
    /// Response could not be built
    pub const SERVER_DEVICE_FAILURE: u8 = 0x04;
}
