use super::define::epes_stream_id;

pub fn is_audio_stream_id(stream_id: u8) -> bool {
    (epes_stream_id::PES_SID_AUDIO..=epes_stream_id::PES_SID_AUDIO_LAST).contains(&stream_id)
}

pub fn is_video_stream_id(stream_id: u8) -> bool {
    (epes_stream_id::PES_SID_VIDEO..=epes_stream_id::PES_SID_VIDEO_LAST).contains(&stream_id)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stream_id_ranges() {
        assert!(is_audio_stream_id(0xC0));
        assert!(is_audio_stream_id(0xDF));
        assert!(!is_audio_stream_id(0xE0));
        assert!(is_video_stream_id(0xE0));
        assert!(is_video_stream_id(0xEF));
        assert!(!is_video_stream_id(0xF0));
        assert!(!is_video_stream_id(0xBD));
    }

}
