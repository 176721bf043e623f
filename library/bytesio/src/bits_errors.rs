use {
    super::bytes_errors::BytesReadError,
    failure::{Backtrace, Fail},
    std::fmt,
};

#[derive(Debug, Fail)]
pub enum BitErrorValue {
    #[fail(display = "bytes read error: {}", _0)]
    BytesReadError(#[cause] BytesReadError),
    #[fail(display = "cannot read {} bits at once, the limit is 64", _0)]
    TooBig(usize),
    #[fail(display = "cannot read whole bytes from an unaligned position")]
    CannotReadByte,
}

#[derive(Debug)]
pub struct BitError {
    pub value: BitErrorValue,
}

impl BitError {
    pub fn is_not_enough_bytes(&self) -> bool {
        match &self.value {
            BitErrorValue::BytesReadError(err) => err.is_not_enough_bytes(),
            _ => false,
        }
    }
}

impl From<BitErrorValue> for BitError {
    fn from(val: BitErrorValue) -> Self {
        BitError { value: val }
    }
}

impl From<BytesReadError> for BitError {
    fn from(error: BytesReadError) -> Self {
        BitError {
            value: BitErrorValue::BytesReadError(error),
        }
    }
}

impl fmt::Display for BitError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        fmt::Display::fmt(&self.value, f)
    }
}

impl Fail for BitError {
    fn cause(&self) -> Option<&dyn Fail> {
        self.value.cause()
    }

    fn backtrace(&self) -> Option<&Backtrace> {
        self.value.backtrace()
    }
}
