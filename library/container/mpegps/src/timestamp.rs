use {
    super::{
        define::SYSTEM_CLOCK_FREQUENCY_KHZ,
        errors::{MpegPsError, MpegPsErrorValue},
        Marshal, Unmarshal,
    },
    bytes::{BufMut, BytesMut},
    bytesio::bits_reader::BitsReader,
};

pub const PTS_ONLY_PREFIX: u8 = 0b0010;
pub const PTS_WITH_DTS_PREFIX: u8 = 0b0011;
pub const DTS_PREFIX: u8 = 0b0001;

const TIMESTAMP_MASK: u64 = 0x1_FFFF_FFFF; // 33 bits

pub fn read_marker_bit(reader: &mut BitsReader, field: &'static str) -> Result<(), MpegPsError> {
    if reader.read_bit()? != 0x01 {
        return Err(MpegPsError {
            value: MpegPsErrorValue::MarkerBitViolation(field),
        });
    }
    Ok(())
}

// [32..30] 3 bits, marker_bit, [29..15] 15 bits, marker_bit, [14..0] 15 bits, marker_bit
fn read_33_bits(reader: &mut BitsReader, field: &'static str) -> Result<u64, MpegPsError> {
    let mut value = reader.read_n_bits(3)?;
    read_marker_bit(reader, field)?;
    value = (value << 15) | reader.read_n_bits(15)?;
    read_marker_bit(reader, field)?;
    value = (value << 15) | reader.read_n_bits(15)?;
    read_marker_bit(reader, field)?;
    Ok(value)
}

/// A 33-bit PTS or DTS at 90kHz together with the 4-bit prefix that
/// precedes it in the PES header.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Timestamp {
    pub prefix: u8,
    pub value: u64,
}

impl Timestamp {
    pub fn new(prefix: u8, value: u64) -> Self {
        Self {
            prefix: prefix & 0x0F,
            value: value & TIMESTAMP_MASK,
        }
    }

    pub fn to_milliseconds(&self) -> i64 {
        (self.value / SYSTEM_CLOCK_FREQUENCY_KHZ) as i64
    }

    /// Reads a timestamp and checks its prefix.
    pub fn read_expected(reader: &mut BitsReader, expected: u8) -> Result<Self, MpegPsError> {
        let timestamp = Self::unmarshal(reader)?;
        if timestamp.prefix != expected {
            return Err(MpegPsError {
                value: MpegPsErrorValue::TimestampPrefixNotCorrect {
                    expected,
                    found: timestamp.prefix,
                },
            });
        }
        Ok(timestamp)
    }
}

impl Unmarshal<&mut BitsReader, Result<Self, MpegPsError>> for Timestamp {
    fn unmarshal(reader: &mut BitsReader) -> Result<Self, MpegPsError>
    where
        Self: Sized,
    {
        let prefix = reader.read_n_bits(4)? as u8;
        let value = read_33_bits(reader, "timestamp")?;
        Ok(Timestamp { prefix, value })
    }
}

impl Marshal<BytesMut> for Timestamp {
    fn marshal(&self) -> BytesMut {
        let mut bytes = BytesMut::with_capacity(5);
        let value = self.value & TIMESTAMP_MASK;

        bytes.put_u8((self.prefix << 4) | (((value >> 30) & 0x07) as u8) << 1 | 0x01);
        bytes.put_u16((((value >> 15) & 0x7FFF) as u16) << 1 | 0x01);
        bytes.put_u16(((value & 0x7FFF) as u16) << 1 | 0x01);
        bytes
    }
}

/// SCR or ESCR: a 33-bit base at 90kHz plus a 9-bit extension at 27MHz.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ClockReference {
    pub base: u64,
    pub extension: u16,
}

impl ClockReference {
    /// Reads base, extension and their four marker bits. The caller has
    /// already consumed the 2 leading bits.
    pub fn read(reader: &mut BitsReader, field: &'static str) -> Result<Self, MpegPsError> {
        let base = read_33_bits(reader, field)?;
        let extension = reader.read_n_bits(9)? as u16;
        read_marker_bit(reader, field)?;
        Ok(ClockReference { base, extension })
    }

    pub fn to_milliseconds(&self) -> i64 {
        (self.base / SYSTEM_CLOCK_FREQUENCY_KHZ) as i64
    }

    /// value in 27MHz ticks
    pub fn to_27mhz(&self) -> u64 {
        self.base * 300 + self.extension as u64
    }
}

#[cfg(test)]
mod tests {
    use super::{ClockReference, Timestamp, DTS_PREFIX, PTS_ONLY_PREFIX};
    use crate::{errors::MpegPsErrorValue, Marshal, Unmarshal};
    use bytes::BytesMut;
    use bytesio::{bits_reader::BitsReader, bytes_reader::BytesReader};

    fn reader(data: &[u8]) -> BitsReader {
        BitsReader::new(BytesReader::new(BytesMut::from(data)))
    }

    #[test]
    fn test_decode_pts() {
        // '0010' 101 1 | 0x1234 << 1 | 1 | 0x0567 << 1 | 1
        let data = [0x2B, 0x24, 0x69, 0x0A, 0xCF];
        let pts = Timestamp::unmarshal(&mut reader(&data)).unwrap();

        let expected = (0b101u64 << 30) | (0x1234 << 15) | 0x0567;
        assert_eq!(pts.prefix, PTS_ONLY_PREFIX);
        assert_eq!(pts.value, expected);
        assert_eq!(pts.to_milliseconds(), (expected / 90) as i64);
    }

    #[test]
    fn test_marker_bit_violation() {
        // last marker bit cleared
        let data = [0x2B, 0x24, 0x69, 0x0A, 0xCE];
        let err = Timestamp::unmarshal(&mut reader(&data)).unwrap_err();
        assert!(matches!(err.value, MpegPsErrorValue::MarkerBitViolation(_)));
    }

    #[test]
    fn test_prefix_check() {
        let bytes = Timestamp::new(PTS_ONLY_PREFIX, 900).marshal();
        let err = Timestamp::read_expected(&mut reader(&bytes), DTS_PREFIX).unwrap_err();
        assert!(matches!(
            err.value,
            MpegPsErrorValue::TimestampPrefixNotCorrect {
                expected: DTS_PREFIX,
                found: PTS_ONLY_PREFIX
            }
        ));
    }

    #[test]
    fn test_milliseconds_truncate() {
        let samples = [
            0u64,
            1,
            89,
            90,
            91,
            3_600 * 90_000,
            0x1_0000_0000,
            (1 << 33) - 1,
        ];
        for value in samples {
            let bytes = Timestamp::new(DTS_PREFIX, value).marshal();
            let decoded = Timestamp::unmarshal(&mut reader(&bytes)).unwrap();
            assert_eq!(decoded.value, value);
            assert_eq!(decoded.to_milliseconds(), (value / 90) as i64);
        }
    }

    #[test]
    fn test_value_wraps_at_33_bits() {
        let timestamp = Timestamp::new(PTS_ONLY_PREFIX, (1 << 33) + 5);
        assert_eq!(timestamp.value, 5);
    }

    #[test]
    fn test_clock_reference() {
        // base 0, ext 0x1FF, all markers set
        let data = [0x04, 0x00, 0x04, 0x00, 0x07, 0xFF];
        let mut reader = reader(&data);
        reader.read_n_bits(2).unwrap();
        let scr = ClockReference::read(&mut reader, "scr").unwrap();
        assert_eq!(scr.base, 0);
        assert_eq!(scr.extension, 0x1FF);
        assert_eq!(scr.to_27mhz(), 0x1FF);
    }
}
