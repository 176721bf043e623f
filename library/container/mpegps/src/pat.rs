use {
    super::{
        crc32,
        define::{epat_pid, PMT_PID, PROGRAM_NUMBER, TRANSPORT_STREAM_ID},
        errors::{MpegPsError, MpegPsErrorValue},
        Unmarshal,
    },
    byteorder::{BigEndian, ByteOrder},
    bytes::{BufMut, BytesMut},
    bytesio::bytes_reader::BytesReader,
};

// transport_stream_id .. last_section_number
const PAT_FIXED_LEN: usize = 5;
const PAT_ENTRY_LEN: usize = 4;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PatEntry {
    pub program_number: u16,
    pub pid: u16, //13 bits
}

#[derive(Debug, Clone, Default)]
pub struct Pat {
    pub transport_stream_id: u16,
    pub version_number: u8, //5 bits
    pub programs: Vec<PatEntry>,
    pub crc_32: u32,
}

impl Pat {
    pub fn new(transport_stream_id: u16) -> Self {
        Self {
            transport_stream_id,
            ..Default::default()
        }
    }

    pub fn section_length(&self) -> u16 {
        (PAT_FIXED_LEN + self.programs.len() * PAT_ENTRY_LEN + 4) as u16
    }
}

#[derive(Default)]
pub struct PatMuxer {
    pub bytes: BytesMut,
}

//ITU-T H.222.0 Table 2-30
impl PatMuxer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn write(&mut self, pat: &Pat) -> BytesMut {
        /*table id*/
        self.bytes.put_u8(epat_pid::PAT_TID_PAS);
        /*section_syntax_indicator '0' reserved section length*/
        self.bytes.put_u16(0xB000 | pat.section_length());
        /*transport_stream_id*/
        self.bytes.put_u16(pat.transport_stream_id);
        /*reserved version_number current_next_indicator*/
        self.bytes.put_u8(0xC1 | ((pat.version_number & 0x1F) << 1));
        /*section_number*/
        /*last_section_number*/
        self.bytes.put_u16(0x00);

        for program in &pat.programs {
            self.bytes.put_u16(program.program_number);
            self.bytes.put_u16(0xE000 | (program.pid & 0x1FFF));
        }

        /*crc32*/
        let crc32_value = crc32::compute(&self.bytes[..]);
        self.bytes.put_u32(crc32_value);

        self.bytes.split()
    }
}

/// The single-program PAT: program 1 carried on `PMT_PID`.
pub fn build_pat() -> (Pat, BytesMut) {
    let mut pat = Pat::new(TRANSPORT_STREAM_ID);
    pat.programs.push(PatEntry {
        program_number: PROGRAM_NUMBER,
        pid: PMT_PID,
    });

    let bytes = PatMuxer::new().write(&pat);
    pat.crc_32 = BigEndian::read_u32(&bytes[bytes.len() - 4..]);
    (pat, bytes)
}

impl Unmarshal<&mut BytesReader, Result<Self, MpegPsError>> for Pat {
    fn unmarshal(reader: &mut BytesReader) -> Result<Self, MpegPsError>
    where
        Self: Sized,
    {
        let head = reader.advance_bytes(3)?;
        let section_length = (BigEndian::read_u16(&head[1..3]) & 0x0FFF) as usize;
        let crc_32 = crc32::verify(reader.advance_bytes(3 + section_length)?)?;

        let table_id = reader.read_u8()?;
        if table_id != epat_pid::PAT_TID_PAS {
            return Err(MpegPsError {
                value: MpegPsErrorValue::MalformedTable(format!(
                    "table id {table_id:#04x} is not a PAT"
                )),
            });
        }
        reader.read_u16::<BigEndian>()?;

        if section_length < PAT_FIXED_LEN + 4
            || (section_length - PAT_FIXED_LEN - 4) % PAT_ENTRY_LEN != 0
        {
            return Err(MpegPsError {
                value: MpegPsErrorValue::MalformedTable(format!(
                    "PAT section length {section_length} does not hold whole program entries"
                )),
            });
        }

        let mut pat = Pat {
            transport_stream_id: reader.read_u16::<BigEndian>()?,
            version_number: (reader.read_u8()? >> 1) & 0x1F,
            crc_32,
            ..Default::default()
        };
        reader.read_u16::<BigEndian>()?;

        for _ in 0..(section_length - PAT_FIXED_LEN - 4) / PAT_ENTRY_LEN {
            pat.programs.push(PatEntry {
                program_number: reader.read_u16::<BigEndian>()?,
                pid: reader.read_u16::<BigEndian>()? & 0x1FFF,
            });
        }
        reader.read_u32::<BigEndian>()?;

        Ok(pat)
    }
}
