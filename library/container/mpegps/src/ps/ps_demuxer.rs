use {
    super::{
        pack_header::PsPackHeader,
        psm::{Codec, ProgramStreamMap},
        system_header::PsSystemHeader,
    },
    crate::{
        define::{epes_stream_id, PACK_HEADER_LEN, PES_HEADER_LEN},
        errors::{MpegPsError, MpegPsErrorValue},
        pes::Pes,
        utils::{is_audio_stream_id, is_video_stream_id},
        Unmarshal,
    },
    byteorder::{BigEndian, ByteOrder},
    bytes::BytesMut,
    bytesio::{bits_reader::BitsReader, bytes_reader::BytesReader},
    std::collections::HashMap,
};

const START_CODE_LEN: usize = 4;

#[derive(Debug, Clone)]
pub enum PsUnit {
    PackHeader(PsPackHeader),
    SystemHeader(PsSystemHeader),
    ProgramStreamMap(ProgramStreamMap),
    Pes { pes: Pes, codec: Codec },
    StreamEnd,
    Unknown { stream_id: u8, length: usize },
}

/// A decoded unit together with its position in the stream.
#[derive(Debug, Clone)]
pub struct PsRecord {
    pub index: usize,
    pub pack_index: usize,
    pub unit: PsUnit,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DemuxStats {
    pub pack_headers: usize,
    pub system_headers: usize,
    pub program_stream_maps: usize,
    pub audio_packets: usize,
    pub video_packets: usize,
    pub stream_ends: usize,
    pub unknown_units: usize,
    pub corrupt_units: usize,
    pub skipped_bytes: usize,
}

enum Frame {
    /// not a start code, drop one byte
    Skip,
    /// wait for more data
    Incomplete,
    Unit { stream_id: u8, length: usize },
}

pub type OnUnitFn<'a> = Box<dyn FnMut(PsRecord) -> Result<(), MpegPsError> + 'a>;

pub struct PsDemuxer<'a> {
    reader: BytesReader,
    streams: HashMap<u8, Codec>,
    last_audio_codec: Option<Codec>,
    last_video_codec: Option<Codec>,
    unit_index: usize,
    pack_index: usize,
    seen_pack: bool,
    in_sync: bool,
    max_units: Option<usize>,
    stats: DemuxStats,
    on_unit_handler: OnUnitFn<'a>,
}

impl<'a> PsDemuxer<'a> {
    pub fn new(on_unit_handler: OnUnitFn<'a>) -> Self {
        Self {
            reader: BytesReader::new(BytesMut::default()),
            streams: HashMap::default(),
            last_audio_codec: None,
            last_video_codec: None,
            unit_index: 0,
            pack_index: 0,
            seen_pack: false,
            in_sync: true,
            max_units: None,
            stats: DemuxStats::default(),
            on_unit_handler,
        }
    }

    /// Stop after this many framed units, 0 means no limit.
    pub fn set_max_units(&mut self, max_units: usize) {
        self.max_units = if max_units == 0 {
            None
        } else {
            Some(max_units)
        };
    }

    pub fn is_finished(&self) -> bool {
        matches!(self.max_units, Some(max) if self.unit_index >= max)
    }

    pub fn stats(&self) -> &DemuxStats {
        &self.stats
    }

    pub fn codec_of(&self, stream_id: u8) -> Option<Codec> {
        self.streams.get(&stream_id).copied()
    }

    /// Bytes held back waiting for the rest of a unit.
    pub fn buffered(&self) -> usize {
        self.reader.len()
    }

    pub fn demux(&mut self, data: &[u8]) -> Result<(), MpegPsError> {
        self.reader.extend_from_slice(data);

        while !self.is_finished() {
            match self.next_frame()? {
                Frame::Incomplete => break,
                Frame::Skip => {
                    if self.in_sync {
                        log::warn!("lost sync at unit {}, scanning for a start code", self.unit_index);
                        self.in_sync = false;
                    }
                    self.reader.read_u8()?;
                    self.stats.skipped_bytes += 1;
                }
                Frame::Unit { stream_id, length } => {
                    self.in_sync = true;
                    let data = self.reader.read_bytes(length)?;
                    self.demux_unit(stream_id, data)?;
                }
            }
        }

        Ok(())
    }

    /// Drops whatever is left in the buffer at end of input.
    pub fn flush(&mut self) -> usize {
        let remaining = self.reader.extract_remaining_bytes().len();
        if remaining > 0 {
            log::warn!("{} trailing bytes do not form a complete unit", remaining);
            self.stats.skipped_bytes += remaining;
        }
        remaining
    }

    fn next_frame(&self) -> Result<Frame, MpegPsError> {
        if self.reader.len() < START_CODE_LEN {
            return Ok(Frame::Incomplete);
        }

        let prefix_code = self.reader.advance_bytes(START_CODE_LEN)?;
        if prefix_code[0] != 0x00 || prefix_code[1] != 0x00 || prefix_code[2] != 0x01 {
            return Ok(Frame::Skip);
        }

        let stream_id = prefix_code[3];
        let length = match stream_id {
            epes_stream_id::PES_SID_END => START_CODE_LEN,
            epes_stream_id::PES_SID_START => {
                if self.reader.len() < PACK_HEADER_LEN {
                    return Ok(Frame::Incomplete);
                }
                PACK_HEADER_LEN + (self.reader.get(PACK_HEADER_LEN - 1)? & 0x07) as usize
            }
            id if id > epes_stream_id::PES_SID_END => {
                if self.reader.len() < PES_HEADER_LEN {
                    return Ok(Frame::Incomplete);
                }
                let head = self.reader.advance_bytes(PES_HEADER_LEN)?;
                PES_HEADER_LEN + BigEndian::read_u16(&head[4..6]) as usize
            }
            // slice or other elementary start codes are not system units
            _ => return Ok(Frame::Skip),
        };

        if self.reader.len() < length {
            return Ok(Frame::Incomplete);
        }
        Ok(Frame::Unit { stream_id, length })
    }

    fn demux_unit(&mut self, stream_id: u8, data: BytesMut) -> Result<(), MpegPsError> {
        let index = self.unit_index;
        self.unit_index += 1;

        let length = data.len();
        let mut reader = BitsReader::new(BytesReader::new(data));

        let unit = match self.parse_unit(stream_id, &mut reader) {
            Ok(_) if reader.bytes_consumed() != length => {
                let consumed = reader.bytes_consumed();
                self.drop_unit(
                    index,
                    stream_id,
                    MpegPsError {
                        value: MpegPsErrorValue::LengthMismatch {
                            declared: length,
                            consumed,
                        },
                    },
                );
                return Ok(());
            }
            Ok(unit) => unit,
            Err(err) => {
                self.drop_unit(index, stream_id, err);
                return Ok(());
            }
        };

        if let PsUnit::PackHeader(_) = unit {
            if self.seen_pack {
                self.pack_index += 1;
            }
            self.seen_pack = true;
        }
        self.count(&unit);

        (self.on_unit_handler)(PsRecord {
            index,
            pack_index: self.pack_index,
            unit,
        })
    }

    fn drop_unit(&mut self, index: usize, stream_id: u8, err: MpegPsError) {
        log::warn!(
            "drop corrupt unit {} (stream id {:#04x}): {}",
            index,
            stream_id,
            err
        );
        self.stats.corrupt_units += 1;
    }

    fn parse_unit(&mut self, stream_id: u8, reader: &mut BitsReader) -> Result<PsUnit, MpegPsError> {
        match stream_id {
            epes_stream_id::PES_SID_END => {
                log::trace!("epes_stream_id::PES_SID_END");
                reader.read_n_bits(32)?;
                Ok(PsUnit::StreamEnd)
            }
            epes_stream_id::PES_SID_START => {
                log::trace!("epes_stream_id::PES_SID_START");
                Ok(PsUnit::PackHeader(PsPackHeader::unmarshal(reader)?))
            }
            epes_stream_id::PES_SID_SYS => {
                log::trace!("epes_stream_id::PES_SID_SYS");
                Ok(PsUnit::SystemHeader(PsSystemHeader::unmarshal(reader)?))
            }
            epes_stream_id::PES_SID_PSM => {
                log::trace!("epes_stream_id::PES_SID_PSM");
                let psm = ProgramStreamMap::unmarshal(reader)?;
                self.update_codecs(&psm);
                Ok(PsUnit::ProgramStreamMap(psm))
            }
            id if is_audio_stream_id(id) || is_video_stream_id(id) => {
                let pes = Pes::unmarshal(reader)?;
                let codec = self.resolve_codec(id);
                Ok(PsUnit::Pes { pes, codec })
            }
            id => {
                log::trace!("skip unit with stream id {:#04x}", id);
                let length = reader.len() / 8;
                reader.skip_bytes(length)?;
                Ok(PsUnit::Unknown {
                    stream_id: id,
                    length,
                })
            }
        }
    }

    fn update_codecs(&mut self, psm: &ProgramStreamMap) {
        for stream in &psm.stream_map {
            self.streams.insert(stream.elementary_stream_id, stream.codec);
            if stream.codec.is_audio() {
                self.last_audio_codec = Some(stream.codec);
            } else if stream.codec.is_video() {
                self.last_video_codec = Some(stream.codec);
            }
        }
    }

    fn resolve_codec(&self, stream_id: u8) -> Codec {
        if let Some(codec) = self.streams.get(&stream_id) {
            return *codec;
        }

        let last_codec = if is_audio_stream_id(stream_id) {
            self.last_audio_codec
        } else {
            self.last_video_codec
        };
        last_codec.unwrap_or_else(|| {
            log::warn!("no program stream map entry for stream {:#04x}", stream_id);
            Codec::Unknown(0)
        })
    }

    fn count(&mut self, unit: &PsUnit) {
        match unit {
            PsUnit::PackHeader(_) => self.stats.pack_headers += 1,
            PsUnit::SystemHeader(_) => self.stats.system_headers += 1,
            PsUnit::ProgramStreamMap(_) => self.stats.program_stream_maps += 1,
            PsUnit::Pes { pes, .. } if is_audio_stream_id(pes.stream_id) => {
                self.stats.audio_packets += 1
            }
            PsUnit::Pes { .. } => self.stats.video_packets += 1,
            PsUnit::StreamEnd => self.stats.stream_ends += 1,
            PsUnit::Unknown { .. } => self.stats.unknown_units += 1,
        }
    }
}
