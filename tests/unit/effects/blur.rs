use super::*;

#[test]
fn blur_radius_0_is_identity() {
    let src = vec![1.0f32, 2.0, 3.0, 4.0, 5.0, 6.0];
    let out = gaussian_blur_plane(&src, 3, 2, 0, 1.0).unwrap();
    assert_eq!(out, src);
}

#[test]
fn blur_constant_plane_is_identity() {
    let (w, h) = (5usize, 4usize);
    let src = vec![0.75f32; w * h];
    let out = gaussian_blur_plane(&src, w, h, 3, 1.4).unwrap();
    assert!(out.iter().all(|v| (v - 0.75).abs() < 1e-5));

    let boxed = box_blur_plane(&src, w, h, 2).unwrap();
    assert!(boxed.iter().all(|v| (v - 0.75).abs() < 1e-5));
}

#[test]
fn blur_spreads_energy_from_single_pixel() {
    let (w, h) = (9usize, 9usize);
    let mut src = vec![0.0f32; w * h];
    src[4 * w + 4] = 1.0;

    let out = gaussian_blur_plane(&src, w, h, 2, 1.2).unwrap();

    let nonzero = out.iter().filter(|v| **v > 0.0).count();
    assert!(nonzero > 1);
    let sum: f32 = out.iter().sum();
    assert!((sum - 1.0).abs() < 1e-4);
    assert!(out[4 * w + 4] < 1.0);
}

#[test]
fn kernel_is_normalized_and_symmetric() {
    let k = gaussian_kernel(3, 1.4).unwrap();
    assert_eq!(k.len(), 7);
    let sum: f32 = k.iter().sum();
    assert!((sum - 1.0).abs() < 1e-5);
    assert!((k[0] - k[6]).abs() < 1e-7);
    assert!(k[3] > k[2]);
}

#[test]
fn mismatched_plane_is_rejected() {
    assert!(gaussian_blur_plane(&[0.0; 5], 2, 2, 1, 1.0).is_err());
    assert!(gaussian_kernel(2, 0.0).is_err());
}
