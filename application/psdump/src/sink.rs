use {
    crate::config::config::OutputConfig,
    std::{
        fs, io,
        path::{Path, PathBuf},
    },
    xmpegps::{
        pat::build_pat,
        pmt::build_pmt,
        ps::ps_demuxer::{PsRecord, PsUnit},
        utils::is_audio_stream_id,
    },
};

pub const PAT_FILE_NAME: &str = "pat.ts.data";
pub const PMT_FILE_NAME: &str = "pmt.ts.data";

/// Writes one file per decoded unit into the output directory.
pub struct FileSink {
    path: PathBuf,
    save_payload: bool,
    save_diagnostics: bool,
    pub files_written: usize,
    pub bytes_written: usize,
    pub failures: usize,
}

impl FileSink {
    pub fn new(config: &OutputConfig) -> io::Result<Self> {
        fs::create_dir_all(&config.path)?;
        Ok(Self {
            path: PathBuf::from(&config.path),
            save_payload: config.save_payload,
            save_diagnostics: config.save_diagnostics,
            files_written: 0,
            bytes_written: 0,
            failures: 0,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// 0000144_ps44_audio_G711_320_10020.data
    pub fn file_name(record: &PsRecord) -> Option<String> {
        let prefix = format!("{:07}_ps{}", record.index, record.pack_index);
        match &record.unit {
            PsUnit::PackHeader(_) => Some(format!("{prefix}_psHeader_scr.data")),
            PsUnit::SystemHeader(header) => Some(format!(
                "{prefix}_sysHeader_stream{}.data",
                header.streams.len()
            )),
            PsUnit::ProgramStreamMap(psm) => Some(format!(
                "{prefix}_psMap_mapStream{}.data",
                psm.stream_map.len()
            )),
            PsUnit::Pes { pes, codec } => {
                let media = if is_audio_stream_id(pes.stream_id) {
                    "audio"
                } else {
                    "video"
                };
                Some(format!(
                    "{prefix}_{media}_{codec}_{}_{}.data",
                    pes.payload.len(),
                    pes.pts_milliseconds().unwrap_or(0)
                ))
            }
            PsUnit::StreamEnd | PsUnit::Unknown { .. } => None,
        }
    }

    pub fn on_record(&mut self, record: &PsRecord) {
        let Some(file_name) = Self::file_name(record) else {
            return;
        };

        match &record.unit {
            PsUnit::Pes { pes, .. } => {
                if self.save_payload {
                    self.write_file(&file_name, &pes.payload[..]);
                }
            }
            unit => {
                if self.save_diagnostics {
                    let info = format!("{unit:#?}\n");
                    self.write_file(&file_name, info.as_bytes());
                }
            }
        }
    }

    pub fn write_tables(&mut self) {
        let (pat, pat_bytes) = build_pat();
        log::info!("pat crc32 {:#010x}", pat.crc_32);
        self.write_file(PAT_FILE_NAME, &pat_bytes[..]);

        let (pmt, pmt_bytes) = build_pmt();
        log::info!("pmt crc32 {:#010x}", pmt.crc_32);
        self.write_file(PMT_FILE_NAME, &pmt_bytes[..]);
    }

    fn write_file(&mut self, file_name: &str, data: &[u8]) {
        let full_path = self.path.join(file_name);
        match fs::write(&full_path, data) {
            Ok(()) => {
                self.files_written += 1;
                self.bytes_written += data.len();
            }
            Err(err) => {
                log::error!("write {} error: {}", full_path.display(), err);
                self.failures += 1;
            }
        }
    }
}
