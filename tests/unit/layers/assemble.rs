use super::*;

fn image(h: usize, w: usize) -> Tensor {
    Tensor::filled(vec![1, h, w, 3], 0.5)
}

fn mask_with(h: usize, w: usize, values: impl Fn(usize) -> f32) -> Tensor {
    Tensor::new(vec![1, h, w], (0..h * w).map(values).collect()).unwrap()
}

#[test]
fn unmasked_foreground_is_opaque_with_ones_mask() {
    let inputs = LayerInputs::new(image(8, 8), image(4, 6));
    let layers = assemble_layers(&inputs, 64).unwrap();
    assert_eq!(layers.len(), 1);
    let first = &layers[0];
    assert_eq!(first.opacity, 1.0);
    assert_eq!(first.index, 0);
    assert_eq!(first.name, "Layer 1");
    assert_eq!(first.mask.shape(), &[1, 4, 6]);
    assert!(first.mask.data().iter().all(|&v| v == 1.0));
}

#[test]
fn supplied_mask_opacity_is_its_mean() {
    let mask = mask_with(4, 4, |i| if i % 4 == 0 { 1.0 } else { 0.2 });
    let expected = mask.mean();
    let inputs = LayerInputs::new(image(8, 8), image(4, 4)).with_foreground_mask(mask);
    let layers = assemble_layers(&inputs, 64).unwrap();
    assert!((layers[0].opacity - expected).abs() < 1e-6);
    assert!((layers[0].opacity - 0.4).abs() < 1e-6);
}

#[test]
fn background_must_be_rgb_batch() {
    let inputs = LayerInputs::new(Tensor::zeros(vec![1, 8, 8, 4]), image(4, 4));
    let err = assemble_layers(&inputs, 64).unwrap_err();
    assert!(matches!(err, CanvasError::Shape(ref m) if m.contains("[1, 8, 8, 4]")));

    let inputs = LayerInputs::new(Tensor::zeros(vec![8, 8, 3]), image(4, 4));
    assert!(matches!(
        assemble_layers(&inputs, 64),
        Err(CanvasError::Shape(_))
    ));
}

#[test]
fn first_mask_must_be_three_dimensional() {
    let inputs = LayerInputs::new(image(8, 8), image(4, 4))
        .with_foreground_mask(Tensor::ones(vec![4, 4]));
    assert!(matches!(
        assemble_layers(&inputs, 64),
        Err(CanvasError::Shape(_))
    ));
}

#[test]
fn extras_keep_stable_index_and_skip_empty_slots() {
    let inputs = LayerInputs::new(image(8, 8), image(4, 4))
        .with_extra(3, image(2, 2), None)
        .unwrap()
        .with_extra(10, image(3, 3), Some(mask_with(3, 3, |_| 0.25)))
        .unwrap();
    let layers = assemble_layers(&inputs, 64).unwrap();
    let summary: Vec<_> = layers
        .iter()
        .map(|l| (l.index, l.name.as_str()))
        .collect();
    assert_eq!(summary, vec![(0, "Layer 1"), (2, "Layer 3"), (9, "Layer 10")]);
    assert_eq!(layers[1].opacity, 1.0);
    assert!((layers[2].opacity - 0.25).abs() < 1e-6);
}

#[test]
fn placeholder_sized_extra_mask_is_a_configuration_error() {
    for fill in [0.0, 0.5, 1.0] {
        let inputs = LayerInputs::new(image(8, 8), image(4, 4))
            .with_extra(2, image(64, 64), Some(Tensor::filled(vec![1, 64, 64], fill)))
            .unwrap();
        let err = assemble_layers(&inputs, 64).unwrap_err();
        assert!(matches!(err, CanvasError::Configuration(ref m) if m.contains("fore_mask2")));
    }
}

#[test]
fn extra_mask_must_match_its_image() {
    let inputs = LayerInputs::new(image(8, 8), image(4, 4))
        .with_extra(2, image(5, 5), Some(Tensor::ones(vec![1, 4, 4])))
        .unwrap();
    assert!(matches!(
        assemble_layers(&inputs, 64),
        Err(CanvasError::Shape(_))
    ));
}

#[test]
fn with_extra_rejects_out_of_range_ordinals() {
    let base = || LayerInputs::new(image(8, 8), image(4, 4));
    assert!(base().with_extra(1, image(2, 2), None).is_err());
    assert!(base().with_extra(11, image(2, 2), None).is_err());
}
