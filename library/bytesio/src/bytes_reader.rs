use {
    super::bytes_errors::{BytesReadError, BytesReadErrorValue},
    byteorder::ByteOrder,
    bytes::{Buf, BytesMut},
};

/// A growable buffer consumed from the front.
///
/// `read_*` methods remove bytes, `advance_*` methods only peek at them.
pub struct BytesReader {
    buffer: BytesMut,
}

impl BytesReader {
    pub fn new(input: BytesMut) -> Self {
        Self { buffer: input }
    }

    pub fn extend_from_slice(&mut self, extend: &[u8]) {
        self.buffer.extend_from_slice(extend)
    }

    fn check_len(&self, bytes_num: usize) -> Result<(), BytesReadError> {
        if self.buffer.len() < bytes_num {
            return Err(BytesReadError {
                value: BytesReadErrorValue::NotEnoughBytes,
            });
        }
        Ok(())
    }

    pub fn read_bytes(&mut self, bytes_num: usize) -> Result<BytesMut, BytesReadError> {
        self.check_len(bytes_num)?;
        Ok(self.buffer.split_to(bytes_num))
    }

    pub fn advance_bytes(&self, bytes_num: usize) -> Result<&[u8], BytesReadError> {
        self.check_len(bytes_num)?;
        Ok(&self.buffer[..bytes_num])
    }

    pub fn skip_bytes(&mut self, bytes_num: usize) -> Result<(), BytesReadError> {
        self.check_len(bytes_num)?;
        self.buffer.advance(bytes_num);
        Ok(())
    }

    pub fn read_u8(&mut self) -> Result<u8, BytesReadError> {
        self.check_len(1)?;
        Ok(self.buffer.get_u8())
    }

    pub fn advance_u8(&self) -> Result<u8, BytesReadError> {
        self.get(0)
    }

    pub fn read_u16<T: ByteOrder>(&mut self) -> Result<u16, BytesReadError> {
        let val = T::read_u16(self.advance_bytes(2)?);
        self.buffer.advance(2);
        Ok(val)
    }

    pub fn read_u32<T: ByteOrder>(&mut self) -> Result<u32, BytesReadError> {
        let val = T::read_u32(self.advance_bytes(4)?);
        self.buffer.advance(4);
        Ok(val)
    }

    pub fn advance_u32<T: ByteOrder>(&self) -> Result<u32, BytesReadError> {
        Ok(T::read_u32(self.advance_bytes(4)?))
    }

    pub fn get(&self, index: usize) -> Result<u8, BytesReadError> {
        match self.buffer.get(index) {
            Some(byte) => Ok(*byte),
            None => Err(BytesReadError {
                value: BytesReadErrorValue::IndexOutofRange,
            }),
        }
    }

    pub fn len(&self) -> usize {
        self.buffer.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buffer.is_empty()
    }

    pub fn extract_remaining_bytes(&mut self) -> BytesMut {
        self.buffer.split()
    }
}
