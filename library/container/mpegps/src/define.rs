pub mod epat_pid {
    pub const PAT_TID_PAS: u8 = 0x00; // program_association_section
    pub const PAT_TID_PMS: u8 = 0x02; // TS_program_map_section
}

pub mod epsi_stream_type {
    pub const PSI_STREAM_AAC: u8 = 0x0f; // ISO/IEC 13818-7 Audio with ADTS transport syntax
    pub const PSI_STREAM_MPEG4: u8 = 0x10; // ISO/IEC 14496-2 Visual
    pub const PSI_STREAM_H264: u8 = 0x1b;
    pub const PSI_STREAM_H265: u8 = 0x24;
    pub const PSI_STREAM_VIDEO_SVAC: u8 = 0x80; // GB/T 25724-2010 SVAC video
    pub const PSI_STREAM_AUDIO_G711A: u8 = 0x90;
    pub const PSI_STREAM_AUDIO_G711U: u8 = 0x91;
    pub const PSI_STREAM_AUDIO_G722: u8 = 0x92; // G.722.1
    pub const PSI_STREAM_AUDIO_G723: u8 = 0x93; // G.723.1
    pub const PSI_STREAM_AUDIO_G729: u8 = 0x99;
    pub const PSI_STREAM_AUDIO_SVAC: u8 = 0x9b;
}

pub mod epes_stream_id {
    pub const PES_SID_END: u8 = 0xB9; // MPEG_program_end_code
    pub const PES_SID_START: u8 = 0xBA; // Pack start code
    pub const PES_SID_SYS: u8 = 0xBB; // System header start code
    pub const PES_SID_PSM: u8 = 0xBC; // program_stream_map
    pub const PES_SID_AUDIO: u8 = 0xC0; // '110x xxxx'
    pub const PES_SID_AUDIO_LAST: u8 = 0xDF;
    pub const PES_SID_VIDEO: u8 = 0xE0; // '1110 xxxx'
    pub const PES_SID_VIDEO_LAST: u8 = 0xEF;
}

pub mod start_code {
    pub const START_CODE_PREFIX: u32 = 0x000001;
    pub const MPEG_PROGRAM_END: u32 = 0x0000_01B9;
    pub const PACK_HEADER: u32 = 0x0000_01BA;
    pub const SYSTEM_HEADER: u32 = 0x0000_01BB;
    pub const PROGRAM_STREAM_MAP: u32 = 0x0000_01BC;
}

pub const VIDEO_PID: u16 = 0x100;
pub const AUDIO_PID: u16 = 0x101;
pub const PMT_PID: u16 = 0x1001;
pub const PAT_PID: u16 = 0x0;

pub const TRANSPORT_STREAM_ID: u16 = 0x01;
pub const PROGRAM_NUMBER: u16 = 0x01;

pub const SYSTEM_CLOCK_FREQUENCY_KHZ: u64 = 90; // ISO/IEC 13818-1, 90kHz

pub const TS_PACKET_SIZE: usize = 188;

pub const PACK_HEADER_LEN: usize = 14; // without stuffing bytes
pub const PES_HEADER_LEN: usize = 6; // 3-bytes packet_start_code_prefix + 1-byte stream_id + 2-bytes PES_packet_length
pub const PES_OPTIONAL_HEADER_LEN: usize = 3; // 2 flag bytes + PES_header_data_length
