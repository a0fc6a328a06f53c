use image::Rgb;

use super::*;

fn solid(c: [u8; 3]) -> RgbImage {
    RgbImage::from_pixel(16, 16, Rgb(c))
}

fn distance(a: &RgbImage, b: &RgbImage) -> f64 {
    a.as_raw()
        .iter()
        .zip(b.as_raw())
        .map(|(&x, &y)| (f64::from(x) - f64::from(y)).abs())
        .sum()
}

fn zero_pair(w: u32, h: u32) -> PairFlows {
    PairFlows::new(
        FlowField::zeros(w, h),
        FlowField::zeros(w, h),
        &MaskConfig::default(),
    )
    .unwrap()
}

#[test]
fn weight_is_linear_without_confidence() {
    for t in [0.05f32, 0.3, 0.5, 0.95] {
        assert_eq!(blend_weight(t, 0.0), t);
    }
}

#[test]
fn weight_is_pulled_toward_half_with_confidence() {
    assert!((blend_weight(0.1, 1.0) - 0.2).abs() < 1e-6);
    assert!((blend_weight(0.9, 1.0) - 0.8).abs() < 1e-6);
    assert!((blend_weight(0.5, 1.0) - 0.5).abs() < 1e-6);
}

#[test]
fn cross_dissolve_mixes_linearly() {
    let out = cross_dissolve(&solid([200, 0, 100]), &solid([0, 200, 100]), 0.25).unwrap();
    assert_eq!(*out.get_pixel(3, 3), Rgb([150, 50, 100]));
}

#[test]
fn missing_flows_degrade_to_cross_dissolve() {
    let (a, b) = (solid([255, 0, 0]), solid([0, 0, 255]));
    for k in 0..10 {
        let t = (k as f32 + 0.5) / 10.0;
        assert_eq!(
            interpolate(&a, &b, None, t).unwrap(),
            cross_dissolve(&a, &b, t).unwrap()
        );
    }
}

#[test]
fn endpoints_are_rejected() {
    let (a, b) = (solid([0; 3]), solid([255; 3]));
    assert!(interpolate(&a, &b, None, 0.0).is_err());
    assert!(interpolate(&a, &b, None, 1.0).is_err());
    assert!(interpolate(&a, &b, None, f32::NAN).is_err());
}

#[test]
fn output_moves_monotonically_from_a_to_b() {
    let (a, b) = (solid([255, 0, 0]), solid([0, 0, 255]));
    let flows = zero_pair(16, 16);
    let mut last_da = -1.0;
    let mut last_db = f64::MAX;
    for k in 0..10 {
        let t = (k as f32 + 0.5) / 10.0;
        let out = interpolate(&a, &b, Some(&flows), t).unwrap();
        let (da, db) = (distance(&out, &a), distance(&out, &b));
        assert!(da > last_da);
        assert!(db < last_db);
        last_da = da;
        last_db = db;
    }
    let early = interpolate(&a, &b, Some(&flows), 0.01).unwrap();
    assert!(distance(&early, &a) < distance(&early, &b));
    let late = interpolate(&a, &b, Some(&flows), 0.99).unwrap();
    assert!(distance(&late, &b) < distance(&late, &a));
}

#[test]
fn zero_flow_warp_is_identity() {
    let mut img = RgbImage::new(8, 8);
    for (x, y, p) in img.enumerate_pixels_mut() {
        *p = Rgb([(x * 30) as u8, (y * 30) as u8, 7]);
    }
    let out = warp_image(&img, &FlowField::zeros(8, 8), 0.7).unwrap();
    assert_eq!(out, img);
}

#[test]
fn warp_samples_along_scaled_flow() {
    let mut img = RgbImage::new(8, 1);
    for (x, _, p) in img.enumerate_pixels_mut() {
        *p = Rgb([(x * 10) as u8; 3]);
    }
    let out = warp_image(&img, &FlowField::uniform(8, 1, 4.0, 0.0), 0.5).unwrap();
    assert_eq!(out.get_pixel(1, 0)[0], 30);
    // Past the right edge the source reflects back, edge pixel included.
    assert_eq!(out.get_pixel(6, 0)[0], 70);
    assert_eq!(out.get_pixel(7, 0)[0], 60);
}

#[test]
fn size_mismatch_is_rejected() {
    let a = RgbImage::new(4, 4);
    let b = RgbImage::new(4, 5);
    assert!(cross_dissolve(&a, &b, 0.5).is_err());
    assert!(warp_image(&a, &FlowField::zeros(5, 5), 1.0).is_err());
    let flows = zero_pair(8, 8);
    assert!(interpolate(&a, &a, Some(&flows), 0.5).is_err());
}
