use {
    super::errors::{MpegPsError, MpegPsErrorValue},
    byteorder::{BigEndian, ByteOrder},
};

//ISO/IEC 13818-1 Annex B, MSB first, no reflection and no final xor
const CRC32_POLYNOMIAL: u32 = 0x04C1_1DB7;
pub const CRC32_INIT: u32 = 0xFFFF_FFFF;

static CRC32_TABLE: [u32; 256] = gen_crc32_table();

const fn gen_crc32_table() -> [u32; 256] {
    let mut table = [0u32; 256];
    let mut i = 0;
    while i < 256 {
        let mut crc = (i as u32) << 24;
        let mut bit = 0;
        while bit < 8 {
            crc = if crc & 0x8000_0000 != 0 {
                (crc << 1) ^ CRC32_POLYNOMIAL
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

/// Continues a running crc over `buffer`.
pub fn gen_crc32(crc: u32, buffer: &[u8]) -> u32 {
    buffer.iter().fold(crc, |crc, byte| {
        (crc << 8) ^ CRC32_TABLE[((crc >> 24) ^ *byte as u32) as usize & 0xFF]
    })
}

pub fn compute(buffer: &[u8]) -> u32 {
    gen_crc32(CRC32_INIT, buffer)
}

/// Checks a section whose last 4 bytes carry its big-endian CRC_32.
pub fn verify(section: &[u8]) -> Result<u32, MpegPsError> {
    if section.len() < 4 {
        return Err(MpegPsError {
            value: MpegPsErrorValue::TruncatedInput,
        });
    }

    let (data, crc_field) = section.split_at(section.len() - 4);
    let carried = BigEndian::read_u32(crc_field);
    let computed = compute(data);

    if carried != computed {
        return Err(MpegPsError {
            value: MpegPsErrorValue::ChecksumMismatch { carried, computed },
        });
    }
    Ok(carried)
}

#[cfg(test)]
mod tests {
    use super::{compute, gen_crc32, verify, CRC32_INIT, CRC32_TABLE};
    use crate::errors::MpegPsErrorValue;

    #[test]
    fn test_table() {
        assert_eq!(CRC32_TABLE[0], 0x0000_0000);
        assert_eq!(CRC32_TABLE[1], 0x04C1_1DB7);
        assert_eq!(CRC32_TABLE[255], 0xB1F7_40B4);
    }

    #[test]
    fn test_check_value() {
        // CRC-32/MPEG-2 check value
        assert_eq!(compute(b"123456789"), 0x0376_E6E7);
        assert_eq!(compute(&[]), CRC32_INIT);
    }

    #[test]
    fn test_incremental() {
        let data = b"program stream map";
        let (head, tail) = data.split_at(7);
        assert_eq!(gen_crc32(compute(head), tail), compute(data));
    }

    #[test]
    fn test_verify() {
        let mut section = vec![0x02, 0xB0, 0x17, 0x00, 0x01, 0xC1];
        let crc = compute(&section);
        section.extend_from_slice(&crc.to_be_bytes());

        assert_eq!(verify(&section).unwrap(), crc);
        // a section with its crc appended leaves no remainder
        assert_eq!(compute(&section), 0);

        section[3] ^= 0x01;
        let err = verify(&section).unwrap_err();
        match err.value {
            MpegPsErrorValue::ChecksumMismatch { carried, .. } => assert_eq!(carried, crc),
            other => panic!("unexpected error: {other}"),
        }
    }
}
