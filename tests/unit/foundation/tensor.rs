use super::*;

#[test]
fn new_checks_element_count() {
    assert!(Tensor::new(vec![1, 2, 2], vec![0.0; 4]).is_ok());
    let err = Tensor::new(vec![1, 2, 2], vec![0.0; 3]).unwrap_err();
    assert!(matches!(err, CanvasError::Shape(_)));
}

#[test]
fn spatial_reads_h_and_w() {
    assert_eq!(Tensor::zeros(vec![1, 3, 5]).spatial(), Some((3, 5)));
    assert_eq!(Tensor::zeros(vec![2, 4, 6, 3]).spatial(), Some((4, 6)));
    assert_eq!(Tensor::zeros(vec![4, 6]).spatial(), None);
}

#[test]
fn mean_and_first_item() {
    let t = Tensor::new(vec![2, 1, 2], vec![0.0, 1.0, 0.5, 0.5]).unwrap();
    assert!((t.mean() - 0.5).abs() < 1e-6);
    assert_eq!(t.first_item(), &[0.0, 1.0]);
    assert_eq!(Tensor::zeros(vec![0, 2, 2]).mean(), 0.0);
}

#[test]
fn u8_conversion_clips_and_truncates() {
    assert_eq!(unit_to_u8(-0.5), 0);
    assert_eq!(unit_to_u8(0.0), 0);
    assert_eq!(unit_to_u8(0.999), 254);
    assert_eq!(unit_to_u8(1.0), 255);
    assert_eq!(unit_to_u8(2.0), 255);
    assert_eq!(unit_to_u8(f32::NAN), 0);
}

#[test]
fn from_u8_maps_to_unit_range() {
    let t = Tensor::from_u8(vec![1, 1, 2], &[0, 255]).unwrap();
    assert_eq!(t.data(), &[0.0, 1.0]);
}
