use {
    bytesio::{
        bits_errors::BitError,
        bytes_errors::{BytesReadError, BytesWriteError},
    },
    failure::{Backtrace, Fail},
    std::fmt,
};

#[derive(Debug, Fail)]
pub enum MpegPsErrorValue {
    #[fail(display = "truncated input, not enough bytes for the current field")]
    TruncatedInput,

    #[fail(display = "bytes read error: {}", _0)]
    BytesReadError(#[cause] BytesReadError),

    #[fail(display = "bytes write error: {}", _0)]
    BytesWriteError(#[cause] BytesWriteError),

    #[fail(display = "bits error: {}", _0)]
    BitError(#[cause] BitError),

    #[fail(display = "start code not correct: {:#010x}", _0)]
    StartCodeNotCorrect(u32),

    #[fail(display = "unsupported mpeg version, pack header starts with {:#04x}", _0)]
    UnsupportedMpegVersion(u8),

    #[fail(display = "marker bit of {} is not 1", _0)]
    MarkerBitViolation(&'static str),

    #[fail(display = "timestamp prefix {:#06b} does not match {:#06b}", found, expected)]
    TimestampPrefixNotCorrect { expected: u8, found: u8 },

    #[fail(display = "malformed table: {}", _0)]
    MalformedTable(String),

    #[fail(
        display = "declared length {} is smaller than the {} bytes required by the header",
        declared, required
    )]
    NegativeLength { declared: usize, required: usize },

    #[fail(
        display = "declared length {} does not match the {} bytes consumed",
        declared, consumed
    )]
    LengthMismatch { declared: usize, consumed: usize },

    #[fail(
        display = "crc32 mismatch, carried {:#010x} but computed {:#010x}",
        carried, computed
    )]
    ChecksumMismatch { carried: u32, computed: u32 },
}

#[derive(Debug)]
pub struct MpegPsError {
    pub value: MpegPsErrorValue,
}

impl MpegPsError {
    pub fn is_truncated(&self) -> bool {
        matches!(self.value, MpegPsErrorValue::TruncatedInput)
    }
}

impl From<MpegPsErrorValue> for MpegPsError {
    fn from(val: MpegPsErrorValue) -> Self {
        MpegPsError { value: val }
    }
}

impl From<BytesReadError> for MpegPsError {
    fn from(error: BytesReadError) -> Self {
        let value = if error.is_not_enough_bytes() {
            MpegPsErrorValue::TruncatedInput
        } else {
            MpegPsErrorValue::BytesReadError(error)
        };
        MpegPsError { value }
    }
}

impl From<BytesWriteError> for MpegPsError {
    fn from(error: BytesWriteError) -> Self {
        MpegPsError {
            value: MpegPsErrorValue::BytesWriteError(error),
        }
    }
}

impl From<BitError> for MpegPsError {
    fn from(error: BitError) -> Self {
        let value = if error.is_not_enough_bytes() {
            MpegPsErrorValue::TruncatedInput
        } else {
            MpegPsErrorValue::BitError(error)
        };
        MpegPsError { value }
    }
}

impl fmt::Display for MpegPsError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        fmt::Display::fmt(&self.value, f)
    }
}

impl Fail for MpegPsError {
    fn cause(&self) -> Option<&dyn Fail> {
        self.value.cause()
    }

    fn backtrace(&self) -> Option<&Backtrace> {
        self.value.backtrace()
    }
}
