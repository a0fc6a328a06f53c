use super::*;

fn args_as_strings(opts: &FfmpegSinkOpts, cfg: &SinkConfig) -> Vec<String> {
    ffmpeg_args(opts, cfg)
        .into_iter()
        .map(|a| a.to_string_lossy().into_owned())
        .collect()
}

fn value_after<'a>(args: &'a [String], flag: &str) -> Option<&'a str> {
    args.iter()
        .position(|a| a == flag)
        .and_then(|i| args.get(i + 1))
        .map(String::as_str)
}

#[test]
fn args_describe_raw_input_and_h264_output() {
    let opts = FfmpegSinkOpts::new("out/loop.mp4");
    let cfg = SinkConfig {
        width: 512,
        height: 512,
        fps: 30,
    };
    let args = args_as_strings(&opts, &cfg);

    assert_eq!(args[0], "-y");
    assert_eq!(value_after(&args, "-f"), Some("rawvideo"));
    assert_eq!(value_after(&args, "-s"), Some("512x512"));
    assert_eq!(value_after(&args, "-r"), Some("30"));
    assert_eq!(value_after(&args, "-i"), Some("pipe:0"));
    assert_eq!(value_after(&args, "-c:v"), Some("libx264"));
    assert_eq!(value_after(&args, "-profile:v"), Some("high"));
    assert_eq!(value_after(&args, "-level"), Some("4.1"));
    assert_eq!(value_after(&args, "-movflags"), Some("+faststart"));
    assert_eq!(value_after(&args, "-crf"), Some("22"));
    assert_eq!(value_after(&args, "-preset"), Some("veryfast"));
    assert_eq!(value_after(&args, "-g"), Some("60"));
    assert!(args.contains(&"-an".to_string()));
    assert_eq!(args.last().map(String::as_str), Some("out/loop.mp4"));

    let pix: Vec<&str> = args
        .iter()
        .enumerate()
        .filter(|(_, a)| *a == "-pix_fmt")
        .filter_map(|(i, _)| args.get(i + 1).map(String::as_str))
        .collect();
    assert_eq!(pix, vec!["rgb24", "yuv420p"]);
}

#[test]
fn args_follow_encoder_settings() {
    let encoder = EncoderConfig {
        crf: 30,
        preset: "slow".to_string(),
        keyframe_secs: 1.0,
        overwrite: false,
        ..EncoderConfig::default()
    };
    let opts = FfmpegSinkOpts::new("a.mp4").with_encoder(encoder);
    let cfg = SinkConfig {
        width: 64,
        height: 64,
        fps: 12,
    };
    let args = args_as_strings(&opts, &cfg);
    assert_eq!(args[0], "-n");
    assert_eq!(value_after(&args, "-crf"), Some("30"));
    assert_eq!(value_after(&args, "-preset"), Some("slow"));
    assert_eq!(value_after(&args, "-g"), Some("12"));
}

#[test]
fn odd_dimensions_are_rejected_before_spawning() {
    let mut sink = FfmpegSink::new(FfmpegSinkOpts::new(
        std::env::temp_dir().join("loopmorph-unit").join("odd.mp4"),
    ));
    let err = sink
        .begin(SinkConfig {
            width: 15,
            height: 16,
            fps: 10,
        })
        .unwrap_err();
    assert!(err.to_string().contains("even"));
}

#[test]
fn existing_output_is_refused_without_overwrite() {
    let out = std::env::temp_dir()
        .join("loopmorph-unit")
        .join("existing.mp4");
    std::fs::create_dir_all(out.parent().unwrap()).unwrap();
    std::fs::write(&out, b"earlier").unwrap();
    let encoder = EncoderConfig {
        overwrite: false,
        ..EncoderConfig::default()
    };
    let mut sink = FfmpegSink::new(FfmpegSinkOpts::new(&out).with_encoder(encoder));
    assert_eq!(sink.out_path(), out.as_path());

    let err = sink
        .begin(SinkConfig {
            width: 16,
            height: 16,
            fps: 10,
        })
        .unwrap_err();
    assert!(matches!(err, MorphError::Validation(_)));
    assert_eq!(std::fs::read(&out).unwrap(), b"earlier");
}

#[test]
fn write_without_begin_fails() {
    let mut sink = FfmpegSink::new(FfmpegSinkOpts::new("never.mp4"));
    assert!(sink.write(&RgbImage::new(2, 2)).is_err());
    assert!(sink.close().is_err());
}

#[test]
fn missing_binary_is_an_encode_error() {
    let encoder = EncoderConfig {
        program: "loopmorph-definitely-not-an-encoder".to_string(),
        ..EncoderConfig::default()
    };
    assert!(!is_encoder_on_path(&encoder.program));
    let out = std::env::temp_dir()
        .join("loopmorph-unit")
        .join("missing.mp4");
    let mut sink = FfmpegSink::new(FfmpegSinkOpts::new(out).with_encoder(encoder));
    let err = sink
        .begin(SinkConfig {
            width: 16,
            height: 16,
            fps: 10,
        })
        .unwrap_err();
    assert!(matches!(err, MorphError::Encode(_)));
}
