use {
    crate::{
        define::start_code::SYSTEM_HEADER,
        errors::{MpegPsError, MpegPsErrorValue},
        timestamp::read_marker_bit,
        Unmarshal,
    },
    bytesio::bits_reader::BitsReader,
};

// marker_bit .. reserved_bits
pub const SYSTEM_HEADER_FIXED_LEN: usize = 6;
const STREAM_BOUND_LEN: usize = 3;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PsStreamBound {
    pub stream_id: u8,
    pub buffer_bound_scale: u8,
    pub buffer_size_bound: u16,
}

impl PsStreamBound {
    /// P-STD_buffer_size_bound is counted in 128 byte units when the scale
    /// is 0 (audio) and in 1024 byte units when it is 1 (video).
    pub fn buffer_size_bytes(&self) -> usize {
        let unit = if self.buffer_bound_scale == 0 { 128 } else { 1024 };
        self.buffer_size_bound as usize * unit
    }
}

#[derive(Debug, Clone, Default)]
pub struct PsSystemHeader {
    pub header_length: u16,
    pub rate_bound: u32,
    pub audio_bound: u8,
    pub fixed_flag: u8,
    pub csps_flag: u8,
    pub system_audio_lock_flag: u8,
    pub system_video_lock_flag: u8,
    pub video_bound: u8,
    pub packet_rate_restriction_flag: u8,
    pub streams: Vec<PsStreamBound>,
}

//T-REC-H.222.0-201703-S!!PDF-E.pdf Table 2-40 P66
// system_header () {
//     system_header_start_code 				32 bslbf
//     header_length 							16 uimsbf
//     marker_bit 								1 bslbf
//     rate_bound 								22 uimsbf
//     marker_bit 								1 bslbf
//     audio_bound 							    6 uimsbf
//     fixed_flag 								1 bslbf
//     CSPS_flag 								1 bslbf
//     system_audio_lock_flag 					1 bslbf
//     system_video_lock_flag 					1 bslbf
//     marker_bit								1 bslbf
//     video_bound 							    5 uimsbf
//     packet_rate_restriction_flag			    1 bslbf
//     reserved_bits 						    7 bslbf
//     while (nextbits () == '1') {
//         stream_id 							8 uimsbf
//         '11' 							    2 bslbf
//         P-STD_buffer_bound_scale 		    1 bslbf
//         P-STD_buffer_size_bound 		    13 uimsbf
//     }
// }
impl Unmarshal<&mut BitsReader, Result<Self, MpegPsError>> for PsSystemHeader {
    fn unmarshal(reader: &mut BitsReader) -> Result<Self, MpegPsError>
    where
        Self: Sized,
    {
        let start_code = reader.read_n_bits(32)? as u32;
        if start_code != SYSTEM_HEADER {
            return Err(MpegPsError {
                value: MpegPsErrorValue::StartCodeNotCorrect(start_code),
            });
        }

        let mut system_header = PsSystemHeader {
            header_length: reader.read_n_bits(16)? as u16,
            ..Default::default()
        };
        let body_start = reader.bytes_consumed();

        read_marker_bit(reader, "rate_bound")?;
        system_header.rate_bound = reader.read_n_bits(22)? as u32;
        read_marker_bit(reader, "rate_bound")?;

        system_header.audio_bound = reader.read_n_bits(6)? as u8;
        system_header.fixed_flag = reader.read_bit()?;
        system_header.csps_flag = reader.read_bit()?;

        system_header.system_audio_lock_flag = reader.read_bit()?;
        system_header.system_video_lock_flag = reader.read_bit()?;
        read_marker_bit(reader, "video_bound")?;
        system_header.video_bound = reader.read_n_bits(5)? as u8;

        system_header.packet_rate_restriction_flag = reader.read_bit()?;
        //reserved_bits
        reader.read_n_bits(7)?;

        let header_length = system_header.header_length as usize;
        let consumed = reader.bytes_consumed() - body_start;
        if header_length < consumed {
            return Err(MpegPsError {
                value: MpegPsErrorValue::NegativeLength {
                    declared: header_length,
                    required: consumed,
                },
            });
        }

        let streams_length = header_length - consumed;
        if streams_length % STREAM_BOUND_LEN != 0 {
            return Err(MpegPsError {
                value: MpegPsErrorValue::MalformedTable(format!(
                    "system header carries {streams_length} stream bound bytes, not a multiple of {STREAM_BOUND_LEN}"
                )),
            });
        }

        for _ in 0..streams_length / STREAM_BOUND_LEN {
            let stream_id = reader.read_n_bits(8)? as u8;
            if reader.read_n_bits(2)? != 0b11 {
                return Err(MpegPsError {
                    value: MpegPsErrorValue::MalformedTable(format!(
                        "stream bound of stream {stream_id:#04x} does not start with '11'"
                    )),
                });
            }
            let buffer_bound_scale = reader.read_bit()?;
            let buffer_size_bound = reader.read_n_bits(13)? as u16;

            system_header.streams.push(PsStreamBound {
                stream_id,
                buffer_bound_scale,
                buffer_size_bound,
            });
        }

        log::trace!(
            "system header: rate bound {}, {} stream(s)",
            system_header.rate_bound,
            system_header.streams.len()
        );

        Ok(system_header)
    }
}

#[cfg(test)]
mod tests {
    use super::{PsStreamBound, PsSystemHeader, SYSTEM_HEADER_FIXED_LEN};
    use crate::{errors::MpegPsErrorValue, Unmarshal};
    use bytes::BytesMut;
    use bytesio::{bits_reader::BitsReader, bytes_reader::BytesReader};

    const FIXED_FIELDS: [u8; 6] = [0x81, 0x86, 0xA1, 0x04, 0xE1, 0x7F];

    fn system_header(header_length: u16, streams: &[u8]) -> Vec<u8> {
        let mut data = vec![0x00, 0x00, 0x01, 0xBB];
        data.extend_from_slice(&header_length.to_be_bytes());
        data.extend_from_slice(&FIXED_FIELDS);
        data.extend_from_slice(streams);
        data
    }

    fn reader(data: &[u8]) -> BitsReader {
        BitsReader::new(BytesReader::new(BytesMut::from(data)))
    }

    #[test]
    fn test_parse_system_header() {
        let streams = [0xE0, 0xE1, 0x00, 0xC0, 0xC0, 0x20];
        let data = system_header(12, &streams);

        let mut reader = reader(&data);
        let header = PsSystemHeader::unmarshal(&mut reader).unwrap();

        assert_eq!(header.header_length, 12);
        assert_eq!(header.rate_bound, 50000);
        assert_eq!(header.audio_bound, 1);
        assert_eq!(header.fixed_flag, 0);
        assert_eq!(header.csps_flag, 0);
        assert_eq!(header.system_audio_lock_flag, 1);
        assert_eq!(header.system_video_lock_flag, 1);
        assert_eq!(header.video_bound, 1);
        assert_eq!(header.packet_rate_restriction_flag, 0);
        assert_eq!(
            header.streams,
            vec![
                PsStreamBound {
                    stream_id: 0xE0,
                    buffer_bound_scale: 1,
                    buffer_size_bound: 0x100,
                },
                PsStreamBound {
                    stream_id: 0xC0,
                    buffer_bound_scale: 0,
                    buffer_size_bound: 0x20,
                },
            ]
        );
        assert_eq!(header.streams[0].buffer_size_bytes(), 0x100 * 1024);
        assert_eq!(header.streams[1].buffer_size_bytes(), 0x20 * 128);
        assert_eq!(reader.bytes_consumed(), data.len());
    }

    #[test]
    fn test_no_stream_bounds() {
        let data = system_header(SYSTEM_HEADER_FIXED_LEN as u16, &[]);
        let header = PsSystemHeader::unmarshal(&mut reader(&data)).unwrap();
        assert!(header.streams.is_empty());
    }

    #[test]
    fn test_stream_bytes_not_multiple_of_3() {
        let data = system_header(10, &[0xE0, 0xE1, 0x00, 0xC0]);

        let err = PsSystemHeader::unmarshal(&mut reader(&data)).unwrap_err();
        assert!(matches!(err.value, MpegPsErrorValue::MalformedTable(_)));
    }

    #[test]
    fn test_header_length_too_small() {
        let data = system_header(4, &[]);

        let err = PsSystemHeader::unmarshal(&mut reader(&data)).unwrap_err();
        assert!(matches!(
            err.value,
            MpegPsErrorValue::NegativeLength {
                declared: 4,
                required: 6
            }
        ));
    }

    #[test]
    fn test_marker_bit_violation() {
        let mut data = system_header(6, &[]);
        data[6] = 0x01; // first marker bit cleared

        let err = PsSystemHeader::unmarshal(&mut reader(&data)).unwrap_err();
        assert!(matches!(err.value, MpegPsErrorValue::MarkerBitViolation(_)));
    }

    #[test]
    fn test_truncated_stream_bounds() {
        let data = system_header(12, &[0xE0, 0xE1, 0x00]);

        let err = PsSystemHeader::unmarshal(&mut reader(&data)).unwrap_err();
        assert!(err.is_truncated());
    }
}
