//! Frame checksum
//!
//! CRC-8, polynomial `0x07`, initial value `0x02`, final XOR `0x02`,
//! MSB first with no reflection. Covers the length byte through the last
//! payload byte of a frame.

const POLYNOMIAL: u8 = 0x07;
const INITIAL: u8 = 0x02;
const FINAL_XOR: u8 = 0x02;

const TABLE: [u8; 256] = build_table();

const fn build_table() -> [u8; 256] {
    let mut table = [0u8; 256];
    let mut i = 0;
    while i < 256 {
        let mut crc = i as u8;
        let mut bit = 0;
        while bit < 8 {
            crc = if crc & 0x80 != 0 {
                (crc << 1) ^ POLYNOMIAL
            } else {
                crc << 1
            };
            bit += 1;
        }
        table[i] = crc;
        i += 1;
    }
    table
}

/// Compute the device checksum over `bytes`
pub fn checksum(bytes: &[u8]) -> u8 {
    let crc = bytes
        .iter()
        .fold(INITIAL, |crc, &b| TABLE[(crc ^ b) as usize]);
    crc ^ FINAL_XOR
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bitwise(bytes: &[u8]) -> u8 {
        let mut crc = INITIAL;
        for &b in bytes {
            crc ^= b;
            for _ in 0..8 {
                crc = if crc & 0x80 != 0 {
                    (crc << 1) ^ POLYNOMIAL
                } else {
                    crc << 1
                };
            }
        }
        crc ^ FINAL_XOR
    }

    #[test]
    fn test_config_request_vector() {
        assert_eq!(checksum(&[0x05, 0x0A, 0xBF, 0x04]), 0x77);
    }

    #[test]
    fn test_filter_config_request_vector() {
        assert_eq!(checksum(&[0x08, 0x0A, 0xBF, 0x22, 0x01, 0x00, 0x00]), 0x34);
    }

    #[test]
    fn test_table_matches_bitwise() {
        let data: Vec<u8> = (0..=255u8).rev().collect();
        assert_eq!(checksum(&data), bitwise(&data));
        assert_eq!(checksum(&[]), bitwise(&[]));
    }
}
