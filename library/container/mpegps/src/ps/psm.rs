use {
    crate::{
        crc32,
        define::{epsi_stream_type, start_code::PROGRAM_STREAM_MAP},
        errors::{MpegPsError, MpegPsErrorValue},
        timestamp::read_marker_bit,
        utils::{is_audio_stream_id, is_video_stream_id},
        Unmarshal,
    },
    byteorder::{BigEndian, ByteOrder},
    bytes::BytesMut,
    bytesio::bits_reader::BitsReader,
    std::fmt,
};

const ELEMENTARY_STREAM_ENTRY_LEN: usize = 4;
const EXTENDED_STREAM_ID: u8 = 0xFD;

/// Codec of an elementary stream, resolved from its stream_type together
/// with the range its elementary_stream_id falls in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Codec {
    Mpeg4,
    H264,
    H265,
    SvacVideo,
    Aac,
    G711A,
    G711U,
    G722,
    G723,
    G729,
    SvacAudio,
    Unknown(u8),
}

impl Codec {
    pub fn classify(stream_type: u8, elementary_stream_id: u8) -> Self {
        if is_video_stream_id(elementary_stream_id) {
            match stream_type {
                epsi_stream_type::PSI_STREAM_MPEG4 => Codec::Mpeg4,
                epsi_stream_type::PSI_STREAM_H264 => Codec::H264,
                epsi_stream_type::PSI_STREAM_H265 => Codec::H265,
                epsi_stream_type::PSI_STREAM_VIDEO_SVAC => Codec::SvacVideo,
                _ => Codec::Unknown(stream_type),
            }
        } else if is_audio_stream_id(elementary_stream_id) {
            match stream_type {
                epsi_stream_type::PSI_STREAM_AAC => Codec::Aac,
                epsi_stream_type::PSI_STREAM_AUDIO_G711A => Codec::G711A,
                epsi_stream_type::PSI_STREAM_AUDIO_G711U => Codec::G711U,
                epsi_stream_type::PSI_STREAM_AUDIO_G722 => Codec::G722,
                epsi_stream_type::PSI_STREAM_AUDIO_G723 => Codec::G723,
                epsi_stream_type::PSI_STREAM_AUDIO_G729 => Codec::G729,
                epsi_stream_type::PSI_STREAM_AUDIO_SVAC => Codec::SvacAudio,
                _ => Codec::Unknown(stream_type),
            }
        } else {
            Codec::Unknown(stream_type)
        }
    }

    pub fn is_video(&self) -> bool {
        matches!(
            self,
            Codec::Mpeg4 | Codec::H264 | Codec::H265 | Codec::SvacVideo
        )
    }

    pub fn is_audio(&self) -> bool {
        !self.is_video() && !matches!(self, Codec::Unknown(_))
    }
}

impl fmt::Display for Codec {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Codec::Mpeg4 => write!(f, "mpeg4"),
            Codec::H264 => write!(f, "h264"),
            Codec::H265 => write!(f, "h265"),
            Codec::SvacVideo => write!(f, "svac"),
            Codec::Aac => write!(f, "aac"),
            Codec::G711A => write!(f, "G711"),
            Codec::G711U => write!(f, "G711U"),
            Codec::G722 => write!(f, "G722"),
            Codec::G723 => write!(f, "G723"),
            Codec::G729 => write!(f, "G729"),
            Codec::SvacAudio => write!(f, "svacaudio"),
            Codec::Unknown(stream_type) => write!(f, "unknown{stream_type:02x}"),
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct PseudoDescriptor {
    pub pseudo_descriptor_tag: u8,
    pub pseudo_descriptor_length: u8,
    pub elementary_stream_id_extension: u8,
}

#[derive(Debug, Clone)]
pub struct ElementaryStreamMap {
    pub stream_type: u8,
    pub elementary_stream_id: u8,
    pub elementary_stream_info_length: u16,
    pub pseudo_descriptor: Option<PseudoDescriptor>,
    pub descriptors: BytesMut,
    pub codec: Codec,
}

//T-REC-H.222.0-201703-S!!PDF-E.pdf Table 2-41 P69
// program_stream_map() {
//     packet_start_code_prefix    		            24 bslbf
//     map_stream_id               		            8 uimsbf
//     program_stream_map_length 			        16 uimsbf
//     current_next_indicator		 		        1 bslbf
//     single_extension_stream_flag 		        1 bslbf
//     reserved 							        1 bslbf
//     program_stream_map_version 			        5 uimsbf
//     reserved						 	            7 bslbf
//     marker_bit 							        1 bslbf
//     program_stream_info_length 			        16 uimsbf
//     for (i = 0; i < N; i++) {
//     	  descriptor()
//     }
//     elementary_stream_map_length 		        16 uimsbf
//     for (i = 0; i < N1; i++) {
//     	stream_type					 	            8 uimsbf
//     	elementary_stream_id 			            8 uimsbf
//     	elementary_stream_info_length	            16 Uimsbf
//    	if ( elementary_stream_id = = 0xFD &&
//     		single_extension_stream_flag == 0) {
//     		pseudo_descriptor_tag 				    8 Uimsbf
//     		pseudo_descriptor_length 			    8 Uimsbf
//     		marker_bit 							    1 Bslbf
//     		elementary_stream_id_extension 		    7 Uimsbf
//     		for (i = 3; i < N2; i++) {
//     			descriptor()
//     		}
//     	}
//     	else {
//     		for (i = 0; i < N2; i++) {
//     			descriptor()
//     		}
//     	}
//     }
//     CRC_32 32 rpchof
// }
#[derive(Debug, Clone, Default)]
pub struct ProgramStreamMap {
    pub program_stream_map_length: u16,
    pub current_next_indicator: u8,
    pub single_extension_stream_flag: u8,
    pub program_stream_map_version: u8,
    pub program_stream_info_length: u16,
    pub program_descriptors: BytesMut,
    pub elementary_stream_map_length: u16,
    pub stream_map: Vec<ElementaryStreamMap>,
    pub crc_32: u32,
}

fn malformed(reason: String) -> MpegPsError {
    MpegPsError {
        value: MpegPsErrorValue::MalformedTable(reason),
    }
}

impl ProgramStreamMap {
    fn read_entry(
        reader: &mut BitsReader,
        single_extension_stream_flag: u8,
        remaining: usize,
    ) -> Result<ElementaryStreamMap, MpegPsError> {
        if remaining < ELEMENTARY_STREAM_ENTRY_LEN {
            return Err(malformed(format!(
                "{remaining} trailing bytes in the elementary stream map"
            )));
        }

        let stream_type = reader.read_byte()?;
        let elementary_stream_id = reader.read_byte()?;
        let elementary_stream_info_length = reader.read_n_bits(16)? as u16;
        let info_length = elementary_stream_info_length as usize;

        if ELEMENTARY_STREAM_ENTRY_LEN + info_length > remaining {
            return Err(malformed(format!(
                "stream {elementary_stream_id:#04x} info length {info_length} overruns the elementary stream map"
            )));
        }

        let (pseudo_descriptor, descriptors) =
            if elementary_stream_id == EXTENDED_STREAM_ID && single_extension_stream_flag == 0 {
                if info_length < 3 {
                    return Err(malformed(format!(
                        "extended stream info length {info_length} cannot hold its pseudo descriptor"
                    )));
                }
                let pseudo_descriptor_tag = reader.read_byte()?;
                let pseudo_descriptor_length = reader.read_byte()?;
                read_marker_bit(reader, "elementary_stream_id_extension")?;
                let elementary_stream_id_extension = reader.read_n_bits(7)? as u8;
                (
                    Some(PseudoDescriptor {
                        pseudo_descriptor_tag,
                        pseudo_descriptor_length,
                        elementary_stream_id_extension,
                    }),
                    reader.read_bytes(info_length - 3)?,
                )
            } else {
                (None, reader.read_bytes(info_length)?)
            };

        let codec = Codec::classify(stream_type, elementary_stream_id);
        if let Codec::Unknown(stream_type) = codec {
            log::warn!(
                "unknown codec, stream type {:#04x} on elementary stream {:#04x}",
                stream_type,
                elementary_stream_id
            );
        }

        Ok(ElementaryStreamMap {
            stream_type,
            elementary_stream_id,
            elementary_stream_info_length,
            pseudo_descriptor,
            descriptors,
            codec,
        })
    }
}

impl Unmarshal<&mut BitsReader, Result<Self, MpegPsError>> for ProgramStreamMap {
    fn unmarshal(reader: &mut BitsReader) -> Result<Self, MpegPsError>
    where
        Self: Sized,
    {
        // the crc covers the whole map, so check it before decoding anything
        let head = reader.advance_bytes(6)?;
        let start_code = BigEndian::read_u32(&head[..4]);
        if start_code != PROGRAM_STREAM_MAP {
            return Err(MpegPsError {
                value: MpegPsErrorValue::StartCodeNotCorrect(start_code),
            });
        }
        let total_length = 6 + BigEndian::read_u16(&head[4..6]) as usize;
        let crc_32 = crc32::verify(reader.advance_bytes(total_length)?)?;

        reader.read_n_bits(32)?;
        let mut psm = ProgramStreamMap {
            program_stream_map_length: reader.read_n_bits(16)? as u16,
            crc_32,
            ..Default::default()
        };

        psm.current_next_indicator = reader.read_bit()?;
        psm.single_extension_stream_flag = reader.read_bit()?;
        //reserved
        reader.read_bit()?;
        psm.program_stream_map_version = reader.read_n_bits(5)? as u8;
        //reserved
        reader.read_n_bits(7)?;
        read_marker_bit(reader, "program_stream_map_version")?;

        psm.program_stream_info_length = reader.read_n_bits(16)? as u16;
        psm.program_descriptors = reader.read_bytes(psm.program_stream_info_length as usize)?;

        psm.elementary_stream_map_length = reader.read_n_bits(16)? as u16;

        let mut remaining = psm.elementary_stream_map_length as usize;
        while remaining > 0 {
            let entry =
                Self::read_entry(reader, psm.single_extension_stream_flag, remaining)?;
            remaining -= ELEMENTARY_STREAM_ENTRY_LEN + entry.elementary_stream_info_length as usize;
            psm.stream_map.push(entry);
        }

        //CRC_32, already checked
        reader.read_n_bits(32)?;

        log::trace!(
            "program stream map: version {}, {} stream(s)",
            psm.program_stream_map_version,
            psm.stream_map.len()
        );

        Ok(psm)
    }
}
