use {
    super::bytes_errors::BytesWriteError,
    byteorder::{ByteOrder, WriteBytesExt},
    bytes::BytesMut,
    std::io::Write,
};

#[derive(Default)]
pub struct BytesWriter {
    pub bytes: Vec<u8>,
}

impl BytesWriter {
    pub fn new() -> Self {
        Self { bytes: Vec::new() }
    }

    pub fn write_u8(&mut self, byte: u8) -> Result<(), BytesWriteError> {
        self.bytes.write_u8(byte)?;
        Ok(())
    }

    pub fn write_u16<T: ByteOrder>(&mut self, bytes: u16) -> Result<(), BytesWriteError> {
        self.bytes.write_u16::<T>(bytes)?;
        Ok(())
    }

    pub fn write_u32<T: ByteOrder>(&mut self, bytes: u32) -> Result<(), BytesWriteError> {
        self.bytes.write_u32::<T>(bytes)?;
        Ok(())
    }

    pub fn write(&mut self, buf: &[u8]) -> Result<(), BytesWriteError> {
        self.bytes.write_all(buf)?;
        Ok(())
    }

    pub fn get_current_bytes(&self) -> BytesMut {
        BytesMut::from(&self.bytes[..])
    }

    pub fn extract_current_bytes(&mut self) -> BytesMut {
        let rv_data = BytesMut::from(&self.bytes[..]);
        self.bytes.clear();
        rv_data
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }
}
