use super::*;
use crate::encode::sink::AudioInputConfig;
use crate::foundation::core::Fps;

fn cfg(width: u32, height: u32) -> SinkConfig {
    SinkConfig {
        width,
        height,
        fps: Fps::new(30, 1).unwrap(),
        total_frames: 1,
        audio: None,
    }
}

fn args(cmd: &Command) -> Vec<String> {
    cmd.get_args()
        .map(|a| a.to_string_lossy().into_owned())
        .collect()
}

#[test]
fn flatten_transparent_shows_background() {
    let mut dst = vec![0u8; 4];
    flatten_to_opaque(&mut dst, &[0, 0, 0, 0], Rgba8::rgb(10, 20, 30)).unwrap();
    assert_eq!(dst, vec![10, 20, 30, 255]);
}

#[test]
fn flatten_opaque_is_identity() {
    let mut dst = vec![0u8; 4];
    flatten_to_opaque(&mut dst, &[1, 2, 3, 255], Rgba8::rgb(10, 20, 30)).unwrap();
    assert_eq!(dst, vec![1, 2, 3, 255]);
}

#[test]
fn flatten_rejects_mismatched_lengths() {
    let mut dst = vec![0u8; 8];
    assert!(flatten_to_opaque(&mut dst, &[0; 4], Rgba8::rgb(0, 0, 0)).is_err());
}

#[test]
fn odd_dimensions_are_rejected_before_spawning() {
    let dir = tempfile::tempdir().unwrap();
    let mut sink = FfmpegSink::new(FfmpegSinkOpts::new(dir.path().join("o.mp4")));
    let err = sink.begin(cfg(1919, 1080)).unwrap_err();
    assert!(err.to_string().contains("even"));
}

#[test]
fn command_carries_audio_and_encoder_settings() {
    let sink = FfmpegSink::new(FfmpegSinkOpts::new("out/final.mp4"));
    let mut c = cfg(1920, 1080);
    c.audio = Some(AudioInputConfig {
        path: PathBuf::from("/tmp/mix.f32le"),
        sample_rate: 48_000,
        channels: 2,
    });
    let a = args(&sink.command(&c).unwrap());
    let joined = a.join(" ");
    assert!(joined.contains("-s 1920x1080"));
    assert!(joined.contains("-r 30/1"));
    assert!(joined.contains("-f f32le -ar 48000 -ac 2 -i /tmp/mix.f32le"));
    assert!(joined.contains("-c:a aac"));
    assert!(joined.contains("-preset medium"));
    assert!(joined.contains("-threads 4"));
    assert_eq!(a.last().map(String::as_str), Some("out/final.mp4"));
}

#[test]
fn command_without_audio_disables_it() {
    let sink = FfmpegSink::new(FfmpegSinkOpts::new("o.mp4"));
    let a = args(&sink.command(&cfg(2, 2)).unwrap());
    assert!(a.iter().any(|s| s == "-an"));
    assert!(!a.iter().any(|s| s == "aac"));
}

#[test]
fn push_before_begin_fails() {
    let mut sink = FfmpegSink::new(FfmpegSinkOpts::new("o.mp4"));
    let frame = FrameRGBA {
        width: 2,
        height: 2,
        data: vec![0; 16],
    };
    assert!(sink.push_frame(FrameIndex(0), &frame).is_err());
}
