use super::*;

fn pattern(x: f32, y: f32) -> f32 {
    let tau = std::f32::consts::TAU;
    128.0 + 60.0 * (tau * x / 20.0).sin() + 60.0 * (tau * y / 24.0).cos()
}

fn interior_mean(flow: &FlowField, margin: u32) -> (f32, f32) {
    let (mut sx, mut sy, mut n) = (0.0f32, 0.0f32, 0.0f32);
    for y in margin..flow.height - margin {
        for x in margin..flow.width - margin {
            let v = flow.get(x, y);
            sx += v[0];
            sy += v[1];
            n += 1.0;
        }
    }
    (sx / n, sy / n)
}

#[test]
fn identical_frames_give_zero_flow() {
    let g = GrayFrame::from_fn(48, 48, |x, y| pattern(x as f32, y as f32));
    for algo in [DisFlow::fast(3), DisFlow::smooth(3)] {
        let flow = algo.compute(&g, &g).unwrap();
        assert_eq!(flow.dimensions(), (48, 48));
        assert!(flow.vectors.iter().all(|v| v[0].abs() < 1e-4 && v[1].abs() < 1e-4));
    }
}

#[test]
fn recovers_horizontal_translation() {
    let a = GrayFrame::from_fn(64, 64, |x, y| pattern(x as f32, y as f32));
    let b = GrayFrame::from_fn(64, 64, |x, y| pattern(x as f32 - 2.0, y as f32));
    let flow = DisFlow::smooth(3).compute(&a, &b).unwrap();
    assert!(flow.is_finite());
    let (mx, my) = interior_mean(&flow, 12);
    assert!(mx > 1.0 && mx < 3.0, "mean dx = {mx}");
    assert!(my.abs() < 0.75, "mean dy = {my}");
}

#[test]
fn solid_frames_stay_still() {
    let a = GrayFrame::from_fn(32, 32, |_, _| 76.0);
    let b = GrayFrame::from_fn(32, 32, |_, _| 29.0);
    let flow = DisFlow::smooth(2).compute(&a, &b).unwrap();
    assert!(flow.vectors.iter().all(|v| v[0] == 0.0 && v[1] == 0.0));
}

#[test]
fn frames_smaller_than_a_patch_are_rejected() {
    let g = GrayFrame::from_fn(4, 4, |x, _| x as f32);
    let err = DisFlow::fast(1).compute(&g, &g).unwrap_err();
    assert!(matches!(err, MorphError::Flow(_)));
}

#[test]
fn size_mismatch_is_rejected() {
    let a = GrayFrame::from_fn(16, 16, |_, _| 0.0);
    let b = GrayFrame::from_fn(16, 17, |_, _| 0.0);
    assert!(DisFlow::fast(1).compute(&a, &b).is_err());
}

#[test]
fn patch_origins_cover_the_far_edge() {
    assert_eq!(patch_origins(16, 8, 4), vec![0, 4, 8]);
    assert_eq!(patch_origins(18, 8, 4), vec![0, 4, 8, 10]);
    assert_eq!(patch_origins(8, 8, 4), vec![0]);
}
