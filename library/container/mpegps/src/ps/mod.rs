pub mod pack_header;
pub mod ps_demuxer;
pub mod psm;
pub mod system_header;
