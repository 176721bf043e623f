use {
    crate::{
        define::start_code::PACK_HEADER,
        errors::{MpegPsError, MpegPsErrorValue},
        timestamp::{read_marker_bit, ClockReference},
        Unmarshal,
    },
    bytes::BytesMut,
    bytesio::bits_reader::BitsReader,
};

//T-REC-H.222.0-201703-S!!PDF-E.pdf Table 2-38 P64
// pack_header() {
//     pack_start_code                           32 bslbf
//     '01'                                       2 bslbf
//     system_clock_reference_base [32..30]       3 bslbf
//     marker_bit                                 1 bslbf
//     system_clock_reference_base [29..15]      15 bslbf
//     marker_bit                                 1 bslbf
//     system_clock_reference_base [14..0]       15 bslbf
//     marker_bit                                 1 bslbf
//     system_clock_reference_extension           9 uimsbf
//     marker_bit                                 1 bslbf
//     program_mux_rate                          22 uimsbf
//     marker_bit                                 1 bslbf
//     marker_bit                                 1 bslbf
//     reserved                                   5 bslbf
//     pack_stuffing_length                       3 uimsbf
//     for (i = 0; i < pack_stuffing_length; i++) {
//         stuffing_byte                          8 bslbf
//     }
//     if (nextbits() == system_header_start_code) {
//         system_header ()
//     }
// }
#[derive(Debug, Clone, Default)]
pub struct PsPackHeader {
    pub system_clock_reference: ClockReference,
    pub program_mux_rate: u32,
    pub pack_stuffing_length: u8,
    pub stuffing_bytes: BytesMut,
}

impl PsPackHeader {
    pub fn system_clock_reference_base(&self) -> u64 {
        self.system_clock_reference.base
    }

    pub fn system_clock_reference_extension(&self) -> u16 {
        self.system_clock_reference.extension
    }

    pub fn size(&self) -> usize {
        crate::define::PACK_HEADER_LEN + self.pack_stuffing_length as usize
    }
}

impl Unmarshal<&mut BitsReader, Result<Self, MpegPsError>> for PsPackHeader {
    fn unmarshal(reader: &mut BitsReader) -> Result<Self, MpegPsError>
    where
        Self: Sized,
    {
        let start_code = reader.read_n_bits(32)? as u32;
        if start_code != PACK_HEADER {
            return Err(MpegPsError {
                value: MpegPsErrorValue::StartCodeNotCorrect(start_code),
            });
        }

        //'0010' is the mpeg1 layout
        let first_byte = reader.advance_bytes(1)?[0];
        if reader.read_n_bits(2)? != 0b01 {
            return Err(MpegPsError {
                value: MpegPsErrorValue::UnsupportedMpegVersion(first_byte),
            });
        }

        let system_clock_reference = ClockReference::read(reader, "system_clock_reference")?;

        let program_mux_rate = reader.read_n_bits(22)? as u32;
        read_marker_bit(reader, "program_mux_rate")?;
        read_marker_bit(reader, "program_mux_rate")?;

        //reserved
        reader.read_n_bits(5)?;
        let pack_stuffing_length = reader.read_n_bits(3)? as u8;
        let stuffing_bytes = reader.read_bytes(pack_stuffing_length as usize)?;

        Ok(PsPackHeader {
            system_clock_reference,
            program_mux_rate,
            pack_stuffing_length,
            stuffing_bytes,
        })
    }
}
