use crate::common::bits::{num_bytes_for_bits, pack_bits};
use crate::common::traits::Serialize;
use crate::error::InternalError;
use crate::exception::ExceptionCode;

use scursor::WriteCursor;

/// Bit values of a read coils / read discrete inputs response
pub(crate) struct BitValues<'a> {
    values: &'a [u16],
}

/// Word values of a read holding / input registers response
pub(crate) struct RegisterValues<'a> {
    values: &'a [u16],
}

impl<'a> BitValues<'a> {
    pub(crate) fn new(values: &'a [u16]) -> Self {
        Self { values }
    }
}

impl<'a> RegisterValues<'a> {
    pub(crate) fn new(values: &'a [u16]) -> Self {
        Self { values }
    }
}

fn byte_count(count: usize) -> Result<u8, InternalError> {
    u8::try_from(count).map_err(|_| InternalError::BadByteCount(count))
}

impl Serialize for ExceptionCode {
    fn serialize(&self, cursor: &mut WriteCursor) -> Result<(), InternalError> {
        cursor.write_u8((*self).into())?;
        Ok(())
    }
}

impl Serialize for BitValues<'_> {
    fn serialize(&self, cursor: &mut WriteCursor) -> Result<(), InternalError> {
        let count = u16::try_from(self.values.len())
            .map_err(|_| InternalError::BadByteCount(self.values.len()))?;
        cursor.write_u8(byte_count(num_bytes_for_bits(count))?)?;
        for byte in pack_bits(self.values) {
            cursor.write_u8(byte)?;
        }
        Ok(())
    }
}

impl Serialize for RegisterValues<'_> {
    fn serialize(&self, cursor: &mut WriteCursor) -> Result<(), InternalError> {
        cursor.write_u8(byte_count(2 * self.values.len())?)?;
        for value in self.values {
            cursor.write_u16_be(*value)?;
        }
        Ok(())
    }
}
