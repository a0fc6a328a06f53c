use super::*;

fn scratch(name: &str) -> PathBuf {
    std::env::temp_dir().join("loopmorph-unit").join(name)
}

#[test]
fn delay_is_hundredths_of_a_second() {
    assert_eq!(frame_delay(10), 10);
    assert_eq!(frame_delay(30), 3);
    assert_eq!(frame_delay(25), 4);
    assert_eq!(frame_delay(500), 1);
}

#[test]
fn writes_a_decodable_looping_gif() {
    let path = scratch("two_frames.gif");
    let mut sink = GifSink::new(&path, true);
    assert_eq!(sink.out_path(), path.as_path());
    sink.begin(SinkConfig {
        width: 8,
        height: 8,
        fps: 10,
    })
    .unwrap();
    sink.write(&RgbImage::from_pixel(8, 8, image::Rgb([255, 0, 0])))
        .unwrap();
    sink.write(&RgbImage::from_pixel(8, 8, image::Rgb([0, 0, 255])))
        .unwrap();
    sink.close().unwrap();

    let mut opts = gif::DecodeOptions::new();
    opts.set_color_output(gif::ColorOutput::RGBA);
    let mut decoder = opts.read_info(File::open(&path).unwrap()).unwrap();
    let mut frames = Vec::new();
    while let Some(frame) = decoder.read_next_frame().unwrap() {
        frames.push((frame.delay, frame.buffer[0..3].to_vec()));
    }
    assert_eq!(frames.len(), 2);
    assert_eq!(frames[0].0, 10);
    assert!(frames[0].1[0] > 200 && frames[0].1[2] < 50);
    assert!(frames[1].1[2] > 200 && frames[1].1[0] < 50);
}

#[test]
fn oversized_frames_are_rejected() {
    let mut sink = GifSink::new(scratch("huge.gif"), true);
    assert!(
        sink.begin(SinkConfig {
            width: 70_000,
            height: 8,
            fps: 10,
        })
        .is_err()
    );
}

#[test]
fn write_requires_begin() {
    let mut sink = GifSink::new(scratch("unused.gif"), true);
    assert!(sink.write(&RgbImage::new(2, 2)).is_err());
    assert!(sink.close().is_err());
}

#[test]
fn existing_file_is_kept_without_overwrite() {
    let path = scratch("kept.gif");
    std::fs::create_dir_all(path.parent().unwrap()).unwrap();
    std::fs::write(&path, b"earlier").unwrap();
    let cfg = SinkConfig {
        width: 4,
        height: 4,
        fps: 10,
    };

    let mut sink = GifSink::new(&path, false);
    let err = sink.begin(cfg).unwrap_err();
    assert!(err.to_string().contains("already exists"));
    assert_eq!(std::fs::read(&path).unwrap(), b"earlier");

    let mut sink = GifSink::new(&path, true);
    sink.begin(cfg).unwrap();
    sink.write(&RgbImage::new(4, 4)).unwrap();
    sink.close().unwrap();
    assert!(std::fs::read(&path).unwrap().starts_with(b"GIF89a"));
}
