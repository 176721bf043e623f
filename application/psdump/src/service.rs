use {
    crate::{config::config::Config, sink::FileSink},
    anyhow::{anyhow, Result},
    chrono::{DateTime, Local},
    tokio::{fs::File, io::AsyncReadExt},
    xmpegps::ps::ps_demuxer::{DemuxStats, PsDemuxer},
};

pub struct Summary {
    pub stats: DemuxStats,
    pub files_written: usize,
    pub bytes_written: usize,
    pub write_failures: usize,
    pub started_at: DateTime<Local>,
    pub finished_at: DateTime<Local>,
}

impl Summary {
    pub fn print(&self) {
        let elapsed = self.finished_at - self.started_at;
        println!(
            "started {}, finished in {} ms",
            self.started_at.format("%Y-%m-%d %H:%M:%S"),
            elapsed.num_milliseconds()
        );
        println!("pack headers:        {}", self.stats.pack_headers);
        println!("system headers:      {}", self.stats.system_headers);
        println!("program stream maps: {}", self.stats.program_stream_maps);
        println!("video packets:       {}", self.stats.video_packets);
        println!("audio packets:       {}", self.stats.audio_packets);
        println!("stream ends:         {}", self.stats.stream_ends);
        println!("unknown units:       {}", self.stats.unknown_units);
        println!("corrupt units:       {}", self.stats.corrupt_units);
        println!("skipped bytes:       {}", self.stats.skipped_bytes);
        println!(
            "files written:       {} ({} bytes, {} failed)",
            self.files_written, self.bytes_written, self.write_failures
        );
    }
}

pub struct Service {
    cfg: Config,
}

impl Service {
    pub fn new(cfg: Config) -> Self {
        Service { cfg }
    }

    pub async fn run(&mut self) -> Result<Summary> {
        let started_at = Local::now();

        let input = self
            .cfg
            .input
            .clone()
            .ok_or_else(|| anyhow!("no input file configured"))?;
        let output_config = self.cfg.output_config();
        let demux_config = self.cfg.demux_config();

        let mut file = File::open(&input)
            .await
            .map_err(|err| anyhow!("open {}: {}", input, err))?;
        let mut sink = FileSink::new(&output_config)?;
        log::info!("dump {} into {}", input, sink.path().display());

        if output_config.save_tables {
            sink.write_tables();
        }

        let mut buffer = vec![0u8; demux_config.chunk_size];
        let stats = {
            let mut demuxer = PsDemuxer::new(Box::new(|record| {
                sink.on_record(&record);
                Ok(())
            }));
            demuxer.set_max_units(demux_config.max_units);

            loop {
                let n = file.read(&mut buffer[..]).await?;
                if n == 0 {
                    break;
                }
                demuxer
                    .demux(&buffer[..n])
                    .map_err(|err| anyhow!("demux {}: {}", input, err))?;
                if demuxer.is_finished() {
                    log::info!("reached {} units, stop", demux_config.max_units);
                    break;
                }
            }

            if !demuxer.is_finished() {
                demuxer.flush();
            }
            demuxer.stats().clone()
        };

        Ok(Summary {
            stats,
            files_written: sink.files_written,
            bytes_written: sink.bytes_written,
            write_failures: sink.failures,
            started_at,
            finished_at: Local::now(),
        })
    }
}

#[cfg(test)]
mod tests {
    use {
        super::Service,
        crate::config::config::Config,
        std::fs,
        xmpegps::{
            crc32,
            timestamp::{Timestamp, PTS_ONLY_PREFIX},
            Marshal,
        },
    };

    fn ps_stream() -> Vec<u8> {
        let mut data = vec![
            0x00, 0x00, 0x01, 0xBA, 0x47, 0xA6, 0xEF, 0xCC, 0x54, 0x01, 0x00, 0x5F, 0x6B, 0xF8,
        ];

        let mut psm = vec![0x00, 0x00, 0x01, 0xBC, 0x00, 0x12, 0x80, 0x01, 0x00, 0x00, 0x00, 0x08];
        psm.extend_from_slice(&[0x1B, 0xE0, 0x00, 0x00, 0x90, 0xC0, 0x00, 0x00]);
        let crc = crc32::compute(&psm);
        psm.extend_from_slice(&crc.to_be_bytes());
        data.extend(psm);

        for (stream_id, payload_len) in [(0xE0u8, 12usize), (0xC0, 320)] {
            data.extend_from_slice(&[0x00, 0x00, 0x01, stream_id]);
            data.extend_from_slice(&((8 + payload_len) as u16).to_be_bytes());
            data.extend_from_slice(&[0x80, 0x80, 0x05]);
            data.extend_from_slice(&Timestamp::new(PTS_ONLY_PREFIX, 900_000).marshal()[..]);
            data.extend(std::iter::repeat(0x11).take(payload_len));
        }

        data.extend_from_slice(&[0x00, 0x00, 0x01, 0xB9]);
        data
    }

    #[tokio::test]
    async fn test_run() {
        let dir = std::env::temp_dir().join(format!("psdump-service-{}", std::process::id()));
        fs::create_dir_all(&dir).unwrap();
        let input = dir.join("input.ps");
        fs::write(&input, ps_stream()).unwrap();
        let output = dir.join("out");

        let config = Config::new(
            input.to_string_lossy().to_string(),
            Some(output.to_string_lossy().to_string()),
            7,
            0,
            true,
            String::from("info"),
        );
        let summary = Service::new(config).run().await.unwrap();

        assert_eq!(summary.stats.pack_headers, 1);
        assert_eq!(summary.stats.program_stream_maps, 1);
        assert_eq!(summary.stats.video_packets, 1);
        assert_eq!(summary.stats.audio_packets, 1);
        assert_eq!(summary.stats.stream_ends, 1);
        assert_eq!(summary.stats.corrupt_units, 0);
        assert_eq!(summary.files_written, 6);
        assert_eq!(summary.write_failures, 0);

        let mut names: Vec<String> = fs::read_dir(&output)
            .unwrap()
            .map(|entry| entry.unwrap().file_name().to_string_lossy().to_string())
            .collect();
        names.sort();
        assert_eq!(
            names,
            vec![
                "0000000_ps0_psHeader_scr.data",
                "0000001_ps0_psMap_mapStream2.data",
                "0000002_ps0_video_h264_12_10000.data",
                "0000003_ps0_audio_G711_320_10000.data",
                "pat.ts.data",
                "pmt.ts.data",
            ]
        );

        fs::remove_dir_all(&dir).unwrap();
    }

    #[tokio::test]
    async fn test_max_units() {
        let dir = std::env::temp_dir().join(format!("psdump-max-{}", std::process::id()));
        fs::create_dir_all(&dir).unwrap();
        let input = dir.join("input.ps");
        fs::write(&input, ps_stream()).unwrap();

        let config = Config::new(
            input.to_string_lossy().to_string(),
            Some(dir.join("out").to_string_lossy().to_string()),
            4096,
            2,
            false,
            String::from("info"),
        );
        let summary = Service::new(config).run().await.unwrap();

        assert_eq!(summary.stats.pack_headers, 1);
        assert_eq!(summary.stats.program_stream_maps, 1);
        assert_eq!(summary.stats.video_packets, 0);
        assert_eq!(summary.files_written, 2);

        fs::remove_dir_all(&dir).unwrap();
    }

    #[tokio::test]
    async fn test_missing_input() {
        let config = Config::new(
            String::from("/nonexistent/psdump/input.ps"),
            None,
            4096,
            0,
            false,
            String::from("info"),
        );
        assert!(Service::new(config).run().await.is_err());
    }
}
