use {
    super::{
        define::{PES_HEADER_LEN, PES_OPTIONAL_HEADER_LEN},
        errors::{MpegPsError, MpegPsErrorValue},
        timestamp::{
            read_marker_bit, ClockReference, Timestamp, DTS_PREFIX, PTS_ONLY_PREFIX,
            PTS_WITH_DTS_PREFIX,
        },
        Unmarshal,
    },
    bytes::BytesMut,
    bytesio::bits_reader::BitsReader,
};

const PES_PRIVATE_DATA_LEN: usize = 16;

pub mod trick_mode_control {
    pub const FAST_FORWARD: u8 = 0b000;
    pub const SLOW_MOTION: u8 = 0b001;
    pub const FREEZE_FRAME: u8 = 0b010;
    pub const FAST_REVERSE: u8 = 0b011;
    pub const SLOW_REVERSE: u8 = 0b100;
}

/// Fields of the optional PES header that are gated by a flag. Each has a
/// minimum width, the PES extension may grow past its own.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum OptionalField {
    Pts,
    PtsDts,
    Escr,
    EsRate,
    DsmTrickMode,
    AdditionalCopyInfo,
    PreviousPesCrc,
    Extension,
}

impl OptionalField {
    fn min_width(self) -> usize {
        match self {
            OptionalField::Pts => 5,
            OptionalField::PtsDts => 10,
            OptionalField::Escr => 6,
            OptionalField::EsRate => 3,
            OptionalField::DsmTrickMode => 1,
            OptionalField::AdditionalCopyInfo => 1,
            OptionalField::PreviousPesCrc => 2,
            OptionalField::Extension => 1,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TrickMode {
    pub trick_mode_control: u8,
    pub field_id: u8,
    pub intra_slice_refresh: u8,
    pub frequency_truncation: u8,
    pub rep_cntrl: u8,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProgramPacketSequenceCounter {
    pub program_packet_sequence_counter: u8,
    pub mpeg1_mpeg2_identifier: u8,
    pub original_stuff_length: u8,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PStdBuffer {
    pub p_std_buffer_scale: u8,
    pub p_std_buffer_size: u16,
}

impl PStdBuffer {
    pub fn buffer_size_bytes(&self) -> usize {
        let unit = if self.p_std_buffer_scale == 0 { 128 } else { 1024 };
        self.p_std_buffer_size as usize * unit
    }
}

#[derive(Debug, Clone, Default)]
pub struct PesExtension {
    pub pes_private_data: Option<BytesMut>,
    pub pack_header_field: Option<BytesMut>,
    pub program_packet_sequence_counter: Option<ProgramPacketSequenceCounter>,
    pub p_std_buffer: Option<PStdBuffer>,
    pub pes_extension_field: Option<BytesMut>,
}

#[derive(Debug, Clone, Default)]
pub struct OptionalPesHeader {
    pub pes_scrambling_control: u8,    //2
    pub pes_priority: u8,              //1
    pub data_alignment_indicator: u8,  //1
    pub copyright: u8,                 //1
    pub original_or_copy: u8,          //1
    pub pts_dts_flags: u8,             //2
    pub escr_flag: u8,                 //1
    pub es_rate_flag: u8,              //1
    pub dsm_trick_mode_flag: u8,       //1
    pub additional_copy_info_flag: u8, //1
    pub pes_crc_flag: u8,              //1
    pub pes_extension_flag: u8,        //1
    pub pes_header_data_length: u8,    //8

    pub escr: Option<ClockReference>,
    pub es_rate: Option<u32>,
    pub trick_mode: Option<TrickMode>,
    pub additional_copy_info: Option<u8>,
    pub previous_pes_packet_crc: Option<u16>,
    pub extension: Option<PesExtension>,
}

impl OptionalPesHeader {
    fn present_fields(&self) -> Vec<OptionalField> {
        let mut fields = Vec::new();
        match self.pts_dts_flags {
            0b10 => fields.push(OptionalField::Pts),
            0b11 => fields.push(OptionalField::PtsDts),
            _ => {}
        }
        for (flag, field) in [
            (self.escr_flag, OptionalField::Escr),
            (self.es_rate_flag, OptionalField::EsRate),
            (self.dsm_trick_mode_flag, OptionalField::DsmTrickMode),
            (self.additional_copy_info_flag, OptionalField::AdditionalCopyInfo),
            (self.pes_crc_flag, OptionalField::PreviousPesCrc),
            (self.pes_extension_flag, OptionalField::Extension),
        ] {
            if flag == 1 {
                fields.push(field);
            }
        }
        fields
    }

    /// Smallest number of bytes the flagged fields occupy.
    pub fn flagged_fields_length(&self) -> usize {
        self.present_fields()
            .into_iter()
            .map(OptionalField::min_width)
            .sum()
    }
}

#[derive(Debug, Clone, Default)]
pub struct Pes {
    pub stream_id: u8,
    pub pes_packet_length: u16,
    pub header: OptionalPesHeader,
    pub pts: Option<Timestamp>,
    pub dts: Option<Timestamp>,
    pub payload: BytesMut,
}

impl Pes {
    pub fn pts_milliseconds(&self) -> Option<i64> {
        self.pts.map(|pts| pts.to_milliseconds())
    }

    pub fn dts_milliseconds(&self) -> Option<i64> {
        self.dts.map(|dts| dts.to_milliseconds())
    }

    pub fn size(&self) -> usize {
        PES_HEADER_LEN + self.pes_packet_length as usize
    }

    fn read_trick_mode(reader: &mut BitsReader) -> Result<TrickMode, MpegPsError> {
        let mut trick_mode = TrickMode {
            trick_mode_control: reader.read_n_bits(3)? as u8,
            ..Default::default()
        };

        match trick_mode.trick_mode_control {
            trick_mode_control::FAST_FORWARD | trick_mode_control::FAST_REVERSE => {
                trick_mode.field_id = reader.read_n_bits(2)? as u8;
                trick_mode.intra_slice_refresh = reader.read_bit()?;
                trick_mode.frequency_truncation = reader.read_n_bits(2)? as u8;
            }
            trick_mode_control::SLOW_MOTION | trick_mode_control::SLOW_REVERSE => {
                trick_mode.rep_cntrl = reader.read_n_bits(5)? as u8;
            }
            trick_mode_control::FREEZE_FRAME => {
                trick_mode.field_id = reader.read_n_bits(2)? as u8;
                //reserved
                reader.read_n_bits(3)?;
            }
            _ => {
                //reserved
                reader.read_n_bits(5)?;
            }
        }
        Ok(trick_mode)
    }

    fn read_extension(reader: &mut BitsReader) -> Result<PesExtension, MpegPsError> {
        let pes_private_data_flag = reader.read_bit()?;
        let pack_header_field_flag = reader.read_bit()?;
        let program_packet_sequence_counter_flag = reader.read_bit()?;
        let p_std_buffer_flag = reader.read_bit()?;
        //reserved
        reader.read_n_bits(3)?;
        let pes_extension_flag_2 = reader.read_bit()?;

        let mut extension = PesExtension::default();

        if pes_private_data_flag == 1 {
            extension.pes_private_data = Some(reader.read_bytes(PES_PRIVATE_DATA_LEN)?);
        }

        if pack_header_field_flag == 1 {
            let pack_field_length = reader.read_byte()?;
            extension.pack_header_field = Some(reader.read_bytes(pack_field_length as usize)?);
        }

        if program_packet_sequence_counter_flag == 1 {
            read_marker_bit(reader, "program_packet_sequence_counter")?;
            let program_packet_sequence_counter = reader.read_n_bits(7)? as u8;
            read_marker_bit(reader, "program_packet_sequence_counter")?;
            extension.program_packet_sequence_counter = Some(ProgramPacketSequenceCounter {
                program_packet_sequence_counter,
                mpeg1_mpeg2_identifier: reader.read_bit()?,
                original_stuff_length: reader.read_n_bits(6)? as u8,
            });
        }

        if p_std_buffer_flag == 1 {
            if reader.read_n_bits(2)? != 0b01 {
                return Err(MpegPsError {
                    value: MpegPsErrorValue::MalformedTable(String::from(
                        "P-STD buffer field does not start with '01'",
                    )),
                });
            }
            extension.p_std_buffer = Some(PStdBuffer {
                p_std_buffer_scale: reader.read_bit()?,
                p_std_buffer_size: reader.read_n_bits(13)? as u16,
            });
        }

        if pes_extension_flag_2 == 1 {
            read_marker_bit(reader, "PES_extension_field_length")?;
            let pes_extension_field_length = reader.read_n_bits(7)? as usize;
            extension.pes_extension_field = Some(reader.read_bytes(pes_extension_field_length)?);
        }

        Ok(extension)
    }
}

//  T-REC-H.222.0-201703-S!!PDF-E.pdf Table 2-21 P37
// PES_packet() {
//     packet_start_code_prefix 24 bslbf
//     stream_id 8 uimsbf
//     PES_packet_length 16 uimsbf
//     '10' 2 bslbf
//     PES_scrambling_control 2 bslbf
//     PES_priority 1 bslbf
//     data_alignment_indicator 1 bslbf
//     copyright 1 bslbf
//     original_or_copy 1 bslbf
//     PTS_DTS_flags 2 bslbf
//     ESCR_flag 1 bslbf
//     ES_rate_flag 1 bslbf
//     DSM_trick_mode_flag 1 bslbf
//     additional_copy_info_flag 1 bslbf
//     PES_CRC_flag 1 bslbf
//     PES_extension_flag 1 bslbf
//     PES_header_data_length 8 uimsbf
//     if (PTS_DTS_flags == '10') { '0010' PTS }                    40
//     if (PTS_DTS_flags == '11') { '0011' PTS '0001' DTS }         80
//     if (ESCR_flag == '1') { reserved 2, ESCR_base, ESCR_ext }    48
//     if (ES_rate_flag == '1') { marker, ES_rate 22, marker }      24
//     if (DSM_trick_mode_flag == '1') { trick_mode_control 3 .. }   8
//     if (additional_copy_info_flag == '1') { marker, info 7 }      8
//     if (PES_CRC_flag == '1') { previous_PES_packet_CRC }         16
//     if (PES_extension_flag == '1') { .. }                       >=8
//     for (i < 0; i < N1; i++) { stuffing_byte 8 }
//     for (i < 0; i < N2; i++) { PES_packet_data_byte 8 }
// }
impl Unmarshal<&mut BitsReader, Result<Self, MpegPsError>> for Pes {
    fn unmarshal(reader: &mut BitsReader) -> Result<Self, MpegPsError>
    where
        Self: Sized,
    {
        let start_code = reader.read_n_bits(32)? as u32;
        if start_code >> 8 != 0x01 {
            return Err(MpegPsError {
                value: MpegPsErrorValue::StartCodeNotCorrect(start_code),
            });
        }

        let mut pes = Pes {
            stream_id: start_code as u8,
            pes_packet_length: reader.read_n_bits(16)? as u16,
            ..Default::default()
        };
        let declared = pes.pes_packet_length as usize;
        if declared < PES_OPTIONAL_HEADER_LEN {
            return Err(MpegPsError {
                value: MpegPsErrorValue::NegativeLength {
                    declared,
                    required: PES_OPTIONAL_HEADER_LEN,
                },
            });
        }

        let first_byte = reader.advance_bytes(1)?[0];
        if reader.read_n_bits(2)? != 0b10 {
            return Err(MpegPsError {
                value: MpegPsErrorValue::UnsupportedMpegVersion(first_byte),
            });
        }

        let header = &mut pes.header;
        header.pes_scrambling_control = reader.read_n_bits(2)? as u8;
        header.pes_priority = reader.read_bit()?;
        header.data_alignment_indicator = reader.read_bit()?;
        header.copyright = reader.read_bit()?;
        header.original_or_copy = reader.read_bit()?;

        header.pts_dts_flags = reader.read_n_bits(2)? as u8;
        header.escr_flag = reader.read_bit()?;
        header.es_rate_flag = reader.read_bit()?;
        header.dsm_trick_mode_flag = reader.read_bit()?;
        header.additional_copy_info_flag = reader.read_bit()?;
        header.pes_crc_flag = reader.read_bit()?;
        header.pes_extension_flag = reader.read_bit()?;
        header.pes_header_data_length = reader.read_byte()?;

        let header_data_length = header.pes_header_data_length as usize;
        let flagged_length = header.flagged_fields_length();

        if flagged_length > header_data_length {
            return Err(MpegPsError {
                value: MpegPsErrorValue::NegativeLength {
                    declared: header_data_length,
                    required: flagged_length,
                },
            });
        }
        if PES_OPTIONAL_HEADER_LEN + header_data_length > declared {
            return Err(MpegPsError {
                value: MpegPsErrorValue::NegativeLength {
                    declared,
                    required: PES_OPTIONAL_HEADER_LEN + header_data_length,
                },
            });
        }

        let header_start = reader.bytes_consumed();

        match header.pts_dts_flags {
            0b10 => {
                pes.pts = Some(Timestamp::read_expected(reader, PTS_ONLY_PREFIX)?);
            }
            0b11 => {
                pes.pts = Some(Timestamp::read_expected(reader, PTS_WITH_DTS_PREFIX)?);
                pes.dts = Some(Timestamp::read_expected(reader, DTS_PREFIX)?);
            }
            0b01 => {
                log::warn!(
                    "forbidden PTS_DTS_flags '01' on stream {:#04x}, no timestamp read",
                    pes.stream_id
                );
            }
            _ => {}
        }

        if header.escr_flag == 1 {
            //reserved
            reader.read_n_bits(2)?;
            header.escr = Some(ClockReference::read(reader, "ESCR")?);
        }

        if header.es_rate_flag == 1 {
            read_marker_bit(reader, "ES_rate")?;
            header.es_rate = Some(reader.read_n_bits(22)? as u32);
            read_marker_bit(reader, "ES_rate")?;
        }

        if header.dsm_trick_mode_flag == 1 {
            header.trick_mode = Some(Self::read_trick_mode(reader)?);
        }

        if header.additional_copy_info_flag == 1 {
            read_marker_bit(reader, "additional_copy_info")?;
            header.additional_copy_info = Some(reader.read_n_bits(7)? as u8);
        }

        if header.pes_crc_flag == 1 {
            header.previous_pes_packet_crc = Some(reader.read_n_bits(16)? as u16);
        }

        if header.pes_extension_flag == 1 {
            header.extension = Some(Self::read_extension(reader)?);
        }

        let used = reader.bytes_consumed() - header_start;
        if used > header_data_length {
            return Err(MpegPsError {
                value: MpegPsErrorValue::NegativeLength {
                    declared: header_data_length,
                    required: used,
                },
            });
        }
        //stuffing bytes
        reader.skip_bytes(header_data_length - used)?;

        let payload_length = declared - PES_OPTIONAL_HEADER_LEN - header_data_length;
        pes.payload = reader.read_bytes(payload_length)?;

        Ok(pes)
    }
}

#[cfg(test)]
mod tests {
    use super::{trick_mode_control, Pes};
    use crate::{
        errors::MpegPsErrorValue,
        timestamp::{Timestamp, DTS_PREFIX, PTS_WITH_DTS_PREFIX},
        Unmarshal,
    };
    use bytes::BytesMut;
    use bytesio::{bits_reader::BitsReader, bytes_reader::BytesReader};

    const PTS_900000: [u8; 5] = [0x21, 0x00, 0x37, 0x77, 0x41];

    fn pes(stream_id: u8, flags: u8, header_data: &[u8], payload: &[u8]) -> Vec<u8> {
        let packet_length = 3 + header_data.len() + payload.len();
        let mut data = vec![0x00, 0x00, 0x01, stream_id];
        data.extend_from_slice(&(packet_length as u16).to_be_bytes());
        data.extend_from_slice(&[0x80, flags, header_data.len() as u8]);
        data.extend_from_slice(header_data);
        data.extend_from_slice(payload);
        data
    }

    fn reader(data: &[u8]) -> BitsReader {
        BitsReader::new(BytesReader::new(BytesMut::from(data)))
    }

    #[test]
    fn test_parse_pts_only() {
        let payload = [0x00, 0x00, 0x00, 0x01, 0x67];
        let data = pes(0xE0, 0x80, &PTS_900000, &payload);

        let mut reader = reader(&data);
        let pes = Pes::unmarshal(&mut reader).unwrap();

        assert_eq!(pes.stream_id, 0xE0);
        assert_eq!(pes.pes_packet_length, 13);
        assert_eq!(pes.header.pts_dts_flags, 0b10);
        assert_eq!(pes.pts.unwrap().value, 900_000);
        assert_eq!(pes.pts_milliseconds(), Some(10_000));
        assert!(pes.dts.is_none());
        assert_eq!(&pes.payload[..], &payload);
        assert_eq!(reader.bytes_consumed(), data.len());
        assert_eq!(pes.size(), data.len());
    }

    #[test]
    fn test_pts_from_chunks() {
        // [32..30] = 0b101, [29..15] = 0x1234, [14..0] = 0x0567
        let data = pes(0xC0, 0x80, &[0x2B, 0x24, 0x69, 0x0A, 0xCF], &[0xFF]);
        let pes = Pes::unmarshal(&mut reader(&data)).unwrap();

        let expected: u64 = (0b101 << 30) | (0x1234 << 15) | 0x0567;
        assert_eq!(pes.pts.unwrap().value, expected);
        assert_eq!(pes.pts_milliseconds(), Some((expected / 90) as i64));
    }

    #[test]
    fn test_parse_pts_dts_with_stuffing() {
        let header_data = [
            0x31, 0x00, 0x37, 0x93, 0x61, // PTS 903600
            0x11, 0x00, 0x37, 0x77, 0x41, // DTS 900000
            0xFF, 0xFF,
        ];
        let data = pes(0xE0, 0xC0, &header_data, &[0x09, 0xF0]);

        let mut reader = reader(&data);
        let pes = Pes::unmarshal(&mut reader).unwrap();

        assert_eq!(pes.pts, Some(Timestamp::new(PTS_WITH_DTS_PREFIX, 903_600)));
        assert_eq!(pes.dts, Some(Timestamp::new(DTS_PREFIX, 900_000)));
        assert_eq!(pes.dts_milliseconds(), Some(10_000));
        assert_eq!(&pes.payload[..], &[0x09, 0xF0]);
        assert_eq!(reader.bytes_consumed(), data.len());
    }

    #[test]
    fn test_parse_optional_fields() {
        let mut header_data = PTS_900000.to_vec();
        header_data.extend_from_slice(&[0xC4, 0x00, 0xDD, 0xDD, 0x04, 0x0B]); // ESCR 900000/5
        header_data.extend_from_slice(&[0x80, 0x07, 0xD1]); // ES rate 1000
        header_data.push(0x23); // slow motion, rep_cntrl 3
        header_data.push(0x95); // additional copy info 0x15
        header_data.extend_from_slice(&[0xAB, 0xCD]);
        let data = pes(0xE0, 0xBE, &header_data, &[0xAA]);

        let mut reader = reader(&data);
        let pes = Pes::unmarshal(&mut reader).unwrap();

        let escr = pes.header.escr.unwrap();
        assert_eq!(escr.base, 900_000);
        assert_eq!(escr.extension, 5);
        assert_eq!(pes.header.es_rate, Some(1000));
        let trick_mode = pes.header.trick_mode.clone().unwrap();
        assert_eq!(trick_mode.trick_mode_control, trick_mode_control::SLOW_MOTION);
        assert_eq!(trick_mode.rep_cntrl, 3);
        assert_eq!(pes.header.additional_copy_info, Some(0x15));
        assert_eq!(pes.header.previous_pes_packet_crc, Some(0xABCD));
        assert_eq!(pes.pts_milliseconds(), Some(10_000));
        assert_eq!(&pes.payload[..], &[0xAA]);
        assert_eq!(reader.bytes_consumed(), data.len());
    }

    #[test]
    fn test_parse_extension() {
        let mut header_data = vec![0xBF];
        header_data.extend_from_slice(&[0x5A; 16]); // PES_private_data
        header_data.extend_from_slice(&[0x85, 0xC0]); // sequence counter 5, mpeg2
        header_data.extend_from_slice(&[0x61, 0x00]); // P-STD scale 1, size 0x100
        header_data.extend_from_slice(&[0x82, 0x71, 0xFF]); // extension 2, 2 bytes
        let data = pes(0xC0, 0x01, &header_data, &[0x01, 0x02]);

        let mut reader = reader(&data);
        let pes = Pes::unmarshal(&mut reader).unwrap();

        let extension = pes.header.extension.unwrap();
        assert_eq!(&extension.pes_private_data.unwrap()[..], &[0x5A; 16]);
        assert!(extension.pack_header_field.is_none());
        let counter = extension.program_packet_sequence_counter.unwrap();
        assert_eq!(counter.program_packet_sequence_counter, 5);
        assert_eq!(counter.mpeg1_mpeg2_identifier, 1);
        assert_eq!(counter.original_stuff_length, 0);
        let p_std_buffer = extension.p_std_buffer.unwrap();
        assert_eq!(p_std_buffer.p_std_buffer_scale, 1);
        assert_eq!(p_std_buffer.p_std_buffer_size, 0x100);
        assert_eq!(p_std_buffer.buffer_size_bytes(), 0x100 * 1024);
        assert_eq!(&extension.pes_extension_field.unwrap()[..], &[0x71, 0xFF]);
        assert_eq!(&pes.payload[..], &[0x01, 0x02]);
        assert_eq!(reader.bytes_consumed(), data.len());
    }

    #[test]
    fn test_packet_length_smaller_than_flags() {
        let mut data = pes(0xE0, 0xC0, &[0u8; 10], &[]);
        // packet length 8 cannot hold the 3 + 10 header bytes PTS_DTS_flags '11' needs
        data[4] = 0x00;
        data[5] = 0x08;

        let err = Pes::unmarshal(&mut reader(&data)).unwrap_err();
        assert!(matches!(
            err.value,
            MpegPsErrorValue::NegativeLength {
                declared: 8,
                required: 13
            }
        ));
    }

    #[test]
    fn test_header_data_length_smaller_than_flags() {
        let data = pes(0xE0, 0xC0, &PTS_900000, &[0x00; 5]);

        let err = Pes::unmarshal(&mut reader(&data)).unwrap_err();
        assert!(matches!(
            err.value,
            MpegPsErrorValue::NegativeLength {
                declared: 5,
                required: 10
            }
        ));
    }

    #[test]
    fn test_zero_packet_length() {
        let data = [0x00, 0x00, 0x01, 0xE0, 0x00, 0x00, 0x80, 0x00, 0x00];

        let err = Pes::unmarshal(&mut reader(&data)).unwrap_err();
        assert!(matches!(
            err.value,
            MpegPsErrorValue::NegativeLength { declared: 0, .. }
        ));
    }

    #[test]
    fn test_timestamp_marker_violation() {
        let mut pts = PTS_900000;
        pts[2] &= 0xFE;
        let data = pes(0xE0, 0x80, &pts, &[0x00]);

        let err = Pes::unmarshal(&mut reader(&data)).unwrap_err();
        assert!(matches!(err.value, MpegPsErrorValue::MarkerBitViolation(_)));
    }

    #[test]
    fn test_timestamp_prefix_mismatch() {
        // '0010' where PTS_DTS_flags '11' requires '0011'
        let mut header_data = PTS_900000.to_vec();
        header_data.extend_from_slice(&[0x11, 0x00, 0x37, 0x77, 0x41]);
        let data = pes(0xE0, 0xC0, &header_data, &[0x00]);

        let err = Pes::unmarshal(&mut reader(&data)).unwrap_err();
        assert!(matches!(
            err.value,
            MpegPsErrorValue::TimestampPrefixNotCorrect {
                expected: 0b0011,
                found: 0b0010
            }
        ));
    }

    #[test]
    fn test_forbidden_pts_dts_flags() {
        let data = pes(0xC0, 0x40, &[], &[0x01, 0x02, 0x03]);

        let pes = Pes::unmarshal(&mut reader(&data)).unwrap();
        assert!(pes.pts.is_none());
        assert!(pes.dts.is_none());
        assert_eq!(pes.payload.len(), 3);
    }

    #[test]
    fn test_mpeg1_pes_not_supported() {
        let mut data = pes(0xE0, 0x00, &[], &[0x00]);
        data[6] = 0x0F;

        let err = Pes::unmarshal(&mut reader(&data)).unwrap_err();
        assert!(matches!(
            err.value,
            MpegPsErrorValue::UnsupportedMpegVersion(0x0F)
        ));
    }

    #[test]
    fn test_truncated_payload() {
        let data = pes(0xE0, 0x80, &PTS_900000, &[0x00; 16]);

        let err = Pes::unmarshal(&mut reader(&data[..data.len() - 4])).unwrap_err();
        assert!(err.is_truncated());
    }
}
