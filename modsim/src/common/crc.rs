/// precomputes the CRC table as a constant!
///
/// CRC-16/MODBUS: reflected polynomial 0xA001, initial value 0xFFFF, no final XOR
const CRC: crc::Crc<u16> = crc::Crc::<u16>::new(&crc::CRC_16_MODBUS);

pub(crate) const CRC_LENGTH: usize = 2;

/// Compute the Modbus CRC-16 of a byte sequence
///
/// On the wire the result is transmitted low byte first.
///
/// ```
/// let crc = modsim::crc16(&[0x01, 0x03, 0x00, 0x00, 0x00, 0x0A]);
/// assert_eq!(crc.to_le_bytes(), [0xC5, 0xCD]);
/// ```
pub fn crc16(bytes: &[u8]) -> u16 {
    CRC.checksum(bytes)
}

/// Split a complete frame into the checked bytes and the little-endian CRC trailer
pub(crate) fn split_trailer(frame: &[u8]) -> Option<(&[u8], u16)> {
    if frame.len() < CRC_LENGTH {
        return None;
    }
    let (data, trailer) = frame.split_at(frame.len() - CRC_LENGTH);
    Some((data, u16::from_le_bytes([trailer[0], trailer[1]])))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bitwise_crc16(bytes: &[u8]) -> u16 {
        let mut crc: u16 = 0xFFFF;
        for byte in bytes {
            crc ^= *byte as u16;
            for _ in 0..8 {
                let mask = if crc & 1 != 0 { 0xA001 } else { 0 };
                crc = (crc >> 1) ^ mask;
            }
        }
        crc
    }

    #[test]
    fn matches_canonical_modbus_vector() {
        let crc = crc16(&[0x01, 0x03, 0x00, 0x00, 0x00, 0x0A]);
        assert_eq!(crc, 0xCDC5);
        assert_eq!(crc.to_le_bytes(), [0xC5, 0xCD]);
    }

    #[test]
    fn table_matches_bitwise_algorithm() {
        let inputs: &[&[u8]] = &[
            &[],
            &[0x00],
            &[0xFF, 0xFF, 0xFF],
            &[0x0A, 0x03, 0x00, 0x0A, 0x00, 0x01],
            &[0x2A, 0x06, 0x00, 0x10, 0x12, 0x34],
            b"123456789",
        ];
        for input in inputs {
            assert_eq!(crc16(input), bitwise_crc16(input));
        }
    }

    #[test]
    fn empty_input_yields_initial_value() {
        assert_eq!(crc16(&[]), 0xFFFF);
    }

    #[test]
    fn splits_trailer_low_byte_first() {
        let frame = [0x01, 0x03, 0x00, 0x00, 0x00, 0x0A, 0xC5, 0xCD];
        let (data, crc) = split_trailer(&frame).unwrap();
        assert_eq!(data, &frame[..6]);
        assert_eq!(crc, 0xCDC5);
        assert!(split_trailer(&[0x01]).is_none());
    }
}
