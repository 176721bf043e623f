use {
    super::{
        bits_errors::{BitError, BitErrorValue},
        bytes_errors::{BytesReadError, BytesReadErrorValue},
        bytes_reader::BytesReader,
    },
    bytes::BytesMut,
};

/// Big-endian bit reader on top of a [`BytesReader`].
///
/// Whole bytes pulled from the inner reader are counted so that callers can
/// compare what they parsed against a declared length field.
pub struct BitsReader {
    reader: BytesReader,
    cur_byte: u8,
    cur_bit_left: u8,
    consumed: usize,
}

impl BitsReader {
    pub fn new(reader: BytesReader) -> Self {
        Self {
            reader,
            cur_byte: 0,
            cur_bit_left: 0,
            consumed: 0,
        }
    }

    /// remaining bits
    pub fn len(&self) -> usize {
        self.reader.len() * 8 + self.cur_bit_left as usize
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Bytes taken from the underlying reader so far. A partly read byte
    /// counts as consumed.
    pub fn bytes_consumed(&self) -> usize {
        self.consumed
    }

    fn ensure_aligned(&self) -> Result<(), BitError> {
        if self.cur_bit_left != 0 {
            return Err(BitError {
                value: BitErrorValue::CannotReadByte,
            });
        }
        Ok(())
    }

    pub fn read_byte(&mut self) -> Result<u8, BitError> {
        self.ensure_aligned()?;
        let byte = self.reader.read_u8()?;
        self.consumed += 1;
        Ok(byte)
    }

    pub fn read_bytes(&mut self, bytes_num: usize) -> Result<BytesMut, BitError> {
        self.ensure_aligned()?;
        let bytes = self.reader.read_bytes(bytes_num)?;
        self.consumed += bytes_num;
        Ok(bytes)
    }

    pub fn skip_bytes(&mut self, bytes_num: usize) -> Result<(), BitError> {
        self.ensure_aligned()?;
        self.reader.skip_bytes(bytes_num)?;
        self.consumed += bytes_num;
        Ok(())
    }

    /// Peeks at the next bytes without consuming them.
    pub fn advance_bytes(&self, bytes_num: usize) -> Result<&[u8], BitError> {
        self.ensure_aligned()?;
        Ok(self.reader.advance_bytes(bytes_num)?)
    }

    pub fn read_bit(&mut self) -> Result<u8, BitError> {
        if self.cur_bit_left == 0 {
            self.cur_byte = self.reader.read_u8()?;
            self.consumed += 1;
            self.cur_bit_left = 8;
        }
        self.cur_bit_left -= 1;
        Ok((self.cur_byte >> self.cur_bit_left) & 0x01)
    }

    pub fn read_n_bits(&mut self, n: usize) -> Result<u64, BitError> {
        if n > 64 {
            return Err(BitError {
                value: BitErrorValue::TooBig(n),
            });
        }
        // fail before touching the cursor
        if n > self.len() {
            return Err(BitError::from(BytesReadError {
                value: BytesReadErrorValue::NotEnoughBytes,
            }));
        }

        let mut result: u64 = 0;
        for _ in 0..n {
            result = (result << 1) | self.read_bit()? as u64;
        }
        Ok(result)
    }

    pub fn bits_aligment_8(&mut self) {
        self.cur_bit_left = 0;
    }
}

#[cfg(test)]
mod tests {

    use super::BitsReader;
    use super::BytesReader;
    use bytes::BytesMut;

    fn bits_reader(data: &[u8]) -> BitsReader {
        let mut bytes_reader = BytesReader::new(BytesMut::new());
        bytes_reader.extend_from_slice(data);
        BitsReader::new(bytes_reader)
    }

    #[test]
    fn test_read_bit() {
        let mut bit_reader = bits_reader(&[2u8, 7u8]);

        let expected = [0, 0, 0, 0, 0, 0, 1, 0, 0, 0, 0, 0, 0, 1, 1, 1];
        for bit in expected {
            assert_eq!(bit_reader.read_bit().unwrap(), bit);
        }
        assert!(bit_reader.is_empty());
    }

    #[test]
    fn test_read_n_bits() {
        let mut bit_reader = bits_reader(&[2u8, 7u8, 0b00000010]);
        assert_eq!(bit_reader.read_n_bits(16).unwrap(), 0x207);
        assert_eq!(bit_reader.read_n_bits(5).unwrap(), 0);
        assert_eq!(bit_reader.read_n_bits(3).unwrap(), 2);
        assert_eq!(bit_reader.bytes_consumed(), 3);
    }

    #[test]
    fn test_read_across_bytes() {
        // 3 bits, 15 bits, 6 bits spread over three bytes
        let mut bit_reader = bits_reader(&[0b1011_1111, 0b1111_1111, 0b1100_0101]);
        assert_eq!(bit_reader.read_n_bits(3).unwrap(), 0b101);
        assert_eq!(bit_reader.read_n_bits(15).unwrap(), 0x7FFF);
        assert_eq!(bit_reader.read_n_bits(6).unwrap(), 0b00_0101);
    }

    #[test]
    fn test_not_enough_bits() {
        let mut bit_reader = bits_reader(&[0xFF]);
        assert_eq!(bit_reader.read_n_bits(4).unwrap(), 0x0F);

        let err = bit_reader.read_n_bits(5).unwrap_err();
        assert!(err.is_not_enough_bytes());
        // the cursor did not move
        assert_eq!(bit_reader.len(), 4);
    }

    #[test]
    fn test_too_big() {
        let mut bit_reader = bits_reader(&[0u8; 10]);
        assert!(bit_reader.read_n_bits(65).is_err());
    }

    #[test]
    fn test_bytes_need_alignment() {
        let mut bit_reader = bits_reader(&[0xAB, 0xCD, 0xEF]);
        bit_reader.read_bit().unwrap();
        assert!(bit_reader.read_bytes(1).is_err());

        bit_reader.bits_aligment_8();
        assert_eq!(&bit_reader.read_bytes(2).unwrap()[..], &[0xCD, 0xEF]);
        assert_eq!(bit_reader.bytes_consumed(), 3);
    }
}
