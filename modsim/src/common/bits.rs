pub(crate) fn num_bytes_for_bits(count: u16) -> usize {
    (count as usize + 7) / 8
}

/// Pack bit values eight to a byte, most significant bit first
///
/// The first value of each group lands in bit 7 and a trailing partial group is
/// left-aligned. Any non-zero value counts as ON.
pub(crate) fn pack_bits(values: &[u16]) -> impl Iterator<Item = u8> + '_ {
    values.chunks(8).map(|chunk| {
        chunk
            .iter()
            .enumerate()
            .fold(0u8, |acc, (i, value)| {
                if *value != 0 {
                    acc | (0x80 >> i)
                } else {
                    acc
                }
            })
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn calculates_number_of_bytes_needed_for_count_of_packed_bits() {
        assert_eq!(num_bytes_for_bits(7), 1);
        assert_eq!(num_bytes_for_bits(8), 1);
        assert_eq!(num_bytes_for_bits(9), 2);
        assert_eq!(num_bytes_for_bits(15), 2);
        assert_eq!(num_bytes_for_bits(16), 2);
        assert_eq!(num_bytes_for_bits(17), 3);
        assert_eq!(num_bytes_for_bits(0xFFFF), 8192); // ensure that it's free from overflow
    }

    #[test]
    fn packs_first_value_into_most_significant_bit() {
        let values = [1, 0, 1, 1, 0, 0, 0, 0, 1, 1];
        let packed: Vec<u8> = pack_bits(&values).collect();
        assert_eq!(packed, vec![0xB0, 0xC0]);
    }

    #[test]
    fn treats_any_non_zero_value_as_on() {
        let packed: Vec<u8> = pack_bits(&[122, 0, 0xFFFF]).collect();
        assert_eq!(packed, vec![0xA0]);
    }

    #[test]
    fn packs_full_bytes() {
        let packed: Vec<u8> = pack_bits(&[1; 16]).collect();
        assert_eq!(packed, vec![0xFF, 0xFF]);
        let packed: Vec<u8> = pack_bits(&[0; 8]).collect();
        assert_eq!(packed, vec![0x00]);
    }
}
