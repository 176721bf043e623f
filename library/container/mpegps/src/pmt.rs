use {
    super::{
        crc32,
        define::{epat_pid, epsi_stream_type, AUDIO_PID, PROGRAM_NUMBER, VIDEO_PID},
        errors::{MpegPsError, MpegPsErrorValue},
        Unmarshal,
    },
    byteorder::{BigEndian, ByteOrder},
    bytes::{BufMut, BytesMut},
    bytesio::bytes_reader::BytesReader,
};

// program_number .. program_info_length
const PMT_FIXED_LEN: usize = 9;
const PMT_STREAM_LEN: usize = 5;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PmtStream {
    pub stream_type: u8,
    pub elementary_pid: u16, //13 bits
    pub es_info: BytesMut,
}

#[derive(Debug, Clone, Default)]
pub struct Pmt {
    pub program_number: u16,
    pub version_number: u8, //5 bits
    pub pcr_pid: u16,       //13 bits
    pub program_info: BytesMut,
    pub streams: Vec<PmtStream>,
    pub crc_32: u32,
}

impl Pmt {
    pub fn section_length(&self) -> u16 {
        let streams_length: usize = self
            .streams
            .iter()
            .map(|stream| PMT_STREAM_LEN + stream.es_info.len())
            .sum();
        (PMT_FIXED_LEN + self.program_info.len() + streams_length + 4) as u16
    }
}

#[derive(Default)]
pub struct PmtMuxer {
    pub bytes: BytesMut,
}

//ITU-T H.222.0 Table 2-33
impl PmtMuxer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn write(&mut self, pmt: &Pmt) -> BytesMut {
        /*table id*/
        self.bytes.put_u8(epat_pid::PAT_TID_PMS);
        /*section_length*/
        self.bytes.put_u16(0xB000 | pmt.section_length());
        /*program_number*/
        self.bytes.put_u16(pmt.program_number);
        /*version_number*/
        self.bytes.put_u8(0xC1 | ((pmt.version_number & 0x1F) << 1));
        /*section_number*/
        self.bytes.put_u8(0x00);
        /*last_section_number*/
        self.bytes.put_u8(0x00);
        /*PCR_PID*/
        self.bytes.put_u16(0xE000 | (pmt.pcr_pid & 0x1FFF));
        /*program_info_length*/
        self.bytes
            .put_u16(0xF000 | (pmt.program_info.len() as u16 & 0x0FFF));
        self.bytes.put_slice(&pmt.program_info[..]);

        for stream in &pmt.streams {
            /*stream_type*/
            self.bytes.put_u8(stream.stream_type);
            /*elementary_PID*/
            self.bytes.put_u16(0xE000 | (stream.elementary_pid & 0x1FFF));
            /*ES_info_length*/
            self.bytes
                .put_u16(0xF000 | (stream.es_info.len() as u16 & 0x0FFF));
            self.bytes.put_slice(&stream.es_info[..]);
        }

        /*crc32*/
        let crc32_value = crc32::compute(&self.bytes[..]);
        self.bytes.put_u32(crc32_value);

        self.bytes.split()
    }
}

/// The single-program PMT: ADTS audio on `AUDIO_PID`, H.264 video on
/// `VIDEO_PID` which also carries the PCR.
pub fn build_pmt() -> (Pmt, BytesMut) {
    let mut pmt = Pmt {
        program_number: PROGRAM_NUMBER,
        pcr_pid: VIDEO_PID,
        ..Default::default()
    };
    pmt.streams.push(PmtStream {
        stream_type: epsi_stream_type::PSI_STREAM_AAC,
        elementary_pid: AUDIO_PID,
        es_info: BytesMut::new(),
    });
    pmt.streams.push(PmtStream {
        stream_type: epsi_stream_type::PSI_STREAM_H264,
        elementary_pid: VIDEO_PID,
        es_info: BytesMut::new(),
    });

    let bytes = PmtMuxer::new().write(&pmt);
    pmt.crc_32 = BigEndian::read_u32(&bytes[bytes.len() - 4..]);
    (pmt, bytes)
}

fn malformed(reason: String) -> MpegPsError {
    MpegPsError {
        value: MpegPsErrorValue::MalformedTable(reason),
    }
}

impl Unmarshal<&mut BytesReader, Result<Self, MpegPsError>> for Pmt {
    fn unmarshal(reader: &mut BytesReader) -> Result<Self, MpegPsError>
    where
        Self: Sized,
    {
        let head = reader.advance_bytes(3)?;
        let section_length = (BigEndian::read_u16(&head[1..3]) & 0x0FFF) as usize;
        let crc_32 = crc32::verify(reader.advance_bytes(3 + section_length)?)?;

        let table_id = reader.read_u8()?;
        if table_id != epat_pid::PAT_TID_PMS {
            return Err(malformed(format!("table id {table_id:#04x} is not a PMT")));
        }
        reader.read_u16::<BigEndian>()?;
        if section_length < PMT_FIXED_LEN + 4 {
            return Err(malformed(format!(
                "PMT section length {section_length} is too short"
            )));
        }

        let mut pmt = Pmt {
            program_number: reader.read_u16::<BigEndian>()?,
            version_number: (reader.read_u8()? >> 1) & 0x1F,
            crc_32,
            ..Default::default()
        };
        reader.read_u16::<BigEndian>()?;
        pmt.pcr_pid = reader.read_u16::<BigEndian>()? & 0x1FFF;

        let program_info_length = (reader.read_u16::<BigEndian>()? & 0x0FFF) as usize;
        let mut remaining = section_length - PMT_FIXED_LEN - 4;
        if program_info_length > remaining {
            return Err(malformed(format!(
                "program info length {program_info_length} overruns the section"
            )));
        }
        pmt.program_info = reader.read_bytes(program_info_length)?;
        remaining -= program_info_length;

        while remaining > 0 {
            if remaining < PMT_STREAM_LEN {
                return Err(malformed(format!(
                    "{remaining} trailing bytes in the PMT stream loop"
                )));
            }
            let stream_type = reader.read_u8()?;
            let elementary_pid = reader.read_u16::<BigEndian>()? & 0x1FFF;
            let es_info_length = (reader.read_u16::<BigEndian>()? & 0x0FFF) as usize;
            if PMT_STREAM_LEN + es_info_length > remaining {
                return Err(malformed(format!(
                    "ES info length {es_info_length} of pid {elementary_pid:#06x} overruns the section"
                )));
            }
            pmt.streams.push(PmtStream {
                stream_type,
                elementary_pid,
                es_info: reader.read_bytes(es_info_length)?,
            });
            remaining -= PMT_STREAM_LEN + es_info_length;
        }
        reader.read_u32::<BigEndian>()?;

        Ok(pmt)
    }
}
