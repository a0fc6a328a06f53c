use super::*;

fn cfg(fps: u32, hold: f64, transition: f64) -> MorphConfig {
    MorphConfig {
        fps,
        hold_secs: hold,
        transition_secs: transition,
        ..MorphConfig::default()
    }
}

#[test]
fn two_images_alternate_hold_and_transition() {
    let s = LoopSchedule::new(2, &cfg(10, 0.5, 1.0)).unwrap();
    assert_eq!(
        s.segments(),
        &[
            Segment::Hold {
                image: 0,
                frames: 5
            },
            Segment::Transition {
                from: 0,
                to: 1,
                frames: 10
            },
            Segment::Hold {
                image: 1,
                frames: 5
            },
            Segment::Transition {
                from: 1,
                to: 0,
                frames: 10
            },
        ]
    );
    assert_eq!(s.total_frames(), 30);
}

#[test]
fn three_images_wrap_last_to_first() {
    let s = LoopSchedule::new(3, &MorphConfig::default()).unwrap();
    assert_eq!(s.segments().len(), 6);
    assert_eq!(s.transition_count(), 3);
    assert_eq!(
        s.segments()[5],
        Segment::Transition {
            from: 2,
            to: 0,
            frames: 30
        }
    );
}

#[test]
fn single_image_gets_extended_hold() {
    let s = LoopSchedule::new(1, &cfg(12, 0.5, 1.0)).unwrap();
    assert_eq!(
        s.segments(),
        &[Segment::Hold {
            image: 0,
            frames: 24
        }]
    );

    let long = LoopSchedule::new(1, &cfg(12, 3.0, 1.0)).unwrap();
    assert_eq!(long.total_frames(), 36);
}

#[test]
fn empty_group_is_rejected() {
    assert!(LoopSchedule::new(0, &MorphConfig::default()).is_err());
}

#[test]
fn counts_round_and_floor() {
    assert_eq!(hold_frame_count(30, 0.0), 0);
    assert_eq!(hold_frame_count(30, 0.01), 0);
    assert_eq!(hold_frame_count(30, 0.05), 2);
    assert_eq!(transition_frame_count(30, 0.0), 1);
    assert_eq!(transition_frame_count(30, 0.01), 1);
    assert_eq!(transition_frame_count(24, 1.0), 24);
}

#[test]
fn zero_hold_still_transitions() {
    let s = LoopSchedule::new(2, &cfg(10, 0.0, 0.0)).unwrap();
    assert_eq!(s.total_frames(), 2);
}

#[test]
fn transition_times_sample_half_steps() {
    let ts: Vec<f32> = (0..4).map(|k| transition_time(k, 4)).collect();
    assert_eq!(ts, vec![0.125, 0.375, 0.625, 0.875]);
    assert_eq!(transition_time(0, 1), 0.5);
}
