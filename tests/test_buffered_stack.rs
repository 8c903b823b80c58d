mod common;

use common::{init_logging, swir_bands, to_dn, SyntheticScene};
use firestack::io::{InMemoryRaster, InMemoryScene, StackSources};
use firestack::{
    load_buffered_stack, BufferedStack, FireError, LogicalBand, Resampling, ResolutionGroup,
    ResolutionReader, StackConfig,
};
use ndarray::{array, Array2, Zip};

fn reader(scene: &SyntheticScene, group: ResolutionGroup) -> ResolutionReader<InMemoryRaster> {
    ResolutionReader::new(scene.raster(group), group)
}

fn gradient(rows: usize, cols: usize) -> Array2<f32> {
    Array2::from_shape_fn((rows, cols), |(r, c)| 0.01 * (r * cols + c) as f32 + 0.05)
}

#[test]
fn test_native_resolution_load_matches_direct_read() {
    init_logging();
    let scene = SyntheticScene::new(6, 6).band(LogicalBand::B12, gradient(6, 6));
    let reader = reader(&scene, ResolutionGroup::R20m);

    let mut stack = BufferedStack::new();
    stack.load(LogicalBand::B12, 20.0, &reader).unwrap();

    let direct = reader.read_reflectance(LogicalBand::B12).unwrap();
    let buffered = stack.read(LogicalBand::B12).unwrap();
    assert_eq!(buffered.dim(), direct.dim());
    assert!(buffered
        .iter()
        .zip(direct.iter())
        .all(|(a, b)| a.to_bits() == b.to_bits()));
}

#[test]
fn test_bands_from_all_groups_share_working_grid() {
    init_logging();
    let scene = SyntheticScene::new(6, 6).with_nodata();
    let bands = [LogicalBand::B4, LogicalBand::B12, LogicalBand::B9];
    let stack = load_buffered_stack(&scene.build(), &bands, &StackConfig::default()).unwrap();

    assert_eq!(stack.bands(), bands.to_vec());
    for band in bands {
        assert_eq!(stack.read(band).unwrap().dim(), (6, 6), "{}", band);
        let meta = stack.meta(band).unwrap();
        assert!((meta.transform.pixel_width - 20.0).abs() < 1e-9);
        assert_eq!(meta.crs.as_deref(), Some("EPSG:32636"));
    }
    assert_eq!(stack.read_stacked().unwrap().dim(), (6, 6, 3));
}

#[test]
fn test_reloading_band_keeps_latest_version() {
    init_logging();
    let scene = SyntheticScene::new(4, 4);
    let reader = reader(&scene, ResolutionGroup::R20m);

    let mut stack = BufferedStack::new();
    stack.load(LogicalBand::B12, 20.0, &reader).unwrap();
    stack.load(LogicalBand::B12, 10.0, &reader).unwrap();

    assert_eq!(stack.len(), 1);
    assert_eq!(stack.read(LogicalBand::B12).unwrap().dim(), (8, 8));
    assert_eq!(stack.band_mask(LogicalBand::B12).unwrap().dim(), (8, 8));
    assert!((stack.meta(LogicalBand::B12).unwrap().transform.pixel_width - 10.0).abs() < 1e-9);
}

#[test]
fn test_reload_at_new_resolution_rejected_when_other_bands_buffered() {
    let scene = SyntheticScene::new(4, 4).band(LogicalBand::B12, gradient(4, 4));
    let reader = reader(&scene, ResolutionGroup::R20m);

    let mut stack = BufferedStack::new();
    stack.load(LogicalBand::B12, 20.0, &reader).unwrap();
    stack.load(LogicalBand::B11, 20.0, &reader).unwrap();
    let before = stack.read(LogicalBand::B12).unwrap().clone();

    let result = stack.load(LogicalBand::B12, 10.0, &reader);
    assert!(matches!(
        result,
        Err(FireError::ShapeMismatch {
            expected: (4, 4),
            actual: (8, 8),
            ..
        })
    ));

    assert_eq!(stack.bands(), vec![LogicalBand::B12, LogicalBand::B11]);
    assert_eq!(stack.read(LogicalBand::B12).unwrap(), &before);
    assert!((stack.meta(LogicalBand::B12).unwrap().transform.pixel_width - 20.0).abs() < 1e-9);
}

#[test]
fn test_incompatible_shapes_rejected() {
    let scene = SyntheticScene::new(4, 4);
    let reader = reader(&scene, ResolutionGroup::R20m);

    let mut stack = BufferedStack::new();
    stack.load(LogicalBand::B11, 20.0, &reader).unwrap();
    let result = stack.load(LogicalBand::B12, 10.0, &reader);

    assert!(matches!(result, Err(FireError::ShapeMismatch { .. })));
    assert!(stack.read(LogicalBand::B12).is_none());
}

#[test]
fn test_stack_mask_is_and_of_band_masks() {
    init_logging();
    let scene = SyntheticScene::new(3, 3)
        .with_nodata()
        .band(LogicalBand::B8A, array![[0.0, 0.3, 0.3], [0.3, 0.3, 0.3], [0.3, 0.3, 0.3]])
        .band(LogicalBand::B11, array![[0.2, 0.0, 0.2], [0.2, 0.2, 0.2], [0.2, 0.2, 0.0]])
        .band(LogicalBand::B12, array![[0.1, 0.1, 0.1], [0.1, 0.0, 0.1], [0.1, 0.1, 0.0]]);
    let sources = scene.build();

    let subsets: [&[LogicalBand]; 5] = [
        &[LogicalBand::B12],
        &[LogicalBand::B8A, LogicalBand::B11],
        &[LogicalBand::B11, LogicalBand::B12],
        &[LogicalBand::B12, LogicalBand::B8A],
        &swir_bands(),
    ];

    for bands in subsets {
        let stack = load_buffered_stack(&sources, bands, &StackConfig::default()).unwrap();
        let combined = stack.read_validity_mask(None).unwrap();

        let mut expected = Array2::from_elem((3, 3), true);
        for &band in bands {
            let mask = stack.read_validity_mask(Some(band)).unwrap();
            Zip::from(&mut expected).and(&mask).for_each(|e, &m| *e = *e && m);
        }
        assert_eq!(combined, expected, "subset {:?}", bands);
    }
}

#[test]
fn test_apply_validity_mask_is_idempotent() {
    init_logging();
    let scene = SyntheticScene::new(3, 3)
        .with_nodata()
        .band(LogicalBand::B11, array![[0.0, 0.2, 0.2], [0.2, 0.2, 0.2], [0.2, 0.2, 0.2]])
        .band(LogicalBand::B12, array![[0.4, 0.4, 0.4], [0.4, 0.4, 0.4], [0.4, 0.4, 0.0]]);

    let mut stack = scene.stack(&[LogicalBand::B11, LogicalBand::B12]);
    stack.apply_validity_mask().unwrap();
    let once = stack.read_stacked().unwrap();
    stack.apply_validity_mask().unwrap();
    let twice = stack.read_stacked().unwrap();

    assert_eq!(once, twice);
    let b12 = stack.read(LogicalBand::B12).unwrap();
    assert_eq!(b12[[0, 0]], 0.0);
    assert_eq!(b12[[2, 2]], 0.0);
    assert!((b12[[1, 1]] - 0.4).abs() < 1e-6);
}

#[test]
fn test_config_applies_validity_mask() {
    let scene = SyntheticScene::new(3, 3)
        .with_nodata()
        .band(LogicalBand::B11, array![[0.0, 0.2, 0.2], [0.2, 0.2, 0.2], [0.2, 0.2, 0.2]]);
    let config = StackConfig {
        apply_validity_mask: true,
        ..StackConfig::default()
    };

    let stack = load_buffered_stack(&scene.build(), &[LogicalBand::B11, LogicalBand::B12], &config).unwrap();
    assert_eq!(stack.read(LogicalBand::B12).unwrap()[[0, 0]], 0.0);
}

#[test]
fn test_downsampled_mask_follows_data_grid() {
    let mut b4 = Array2::from_elem((4, 4), 0.05f32);
    // Nearest-neighbour 10 m -> 20 m picks source pixel (2r + 1, 2c + 1)
    b4[[1, 1]] = 0.0;
    b4[[0, 0]] = 0.0;
    let scene = SyntheticScene::new(2, 2).with_nodata().band(LogicalBand::B4, b4);

    let stack = scene.stack(&[LogicalBand::B4]);
    let mask = stack.read_validity_mask(Some(LogicalBand::B4)).unwrap();
    assert_eq!(mask, array![[false, true], [true, true]]);
}

#[test]
fn test_bilinear_upsample() {
    let scene = SyntheticScene::new(6, 6).band(LogicalBand::B12, gradient(6, 6));
    let config = StackConfig::default()
        .with_working_resolution(10.0)
        .with_resampling(Resampling::Bilinear);

    let stack = load_buffered_stack(&scene.build(), &[LogicalBand::B12, LogicalBand::B4], &config).unwrap();
    assert_eq!(stack.shape(), Some((12, 12)));
    let b12 = stack.read(LogicalBand::B12).unwrap();
    assert!(b12.iter().all(|v| v.is_finite()));
    assert!(b12[[0, 1]] > b12[[0, 0]] - 1e-6);
}

#[test]
fn test_raw_config_keeps_digital_numbers() {
    let b12 = array![[0.5f32, 1.3], [0.2, 0.1]];
    let scene = SyntheticScene::new(2, 2).band(LogicalBand::B12, b12.clone());
    let config = StackConfig {
        raw: true,
        ..StackConfig::default()
    };

    let stack = load_buffered_stack(&scene.build(), &[LogicalBand::B12], &config).unwrap();
    assert_eq!(stack.read(LogicalBand::B12).unwrap(), &to_dn(&b12));
}

#[test]
fn test_saturation_mask_tracks_raw_sentinel() {
    let scene = SyntheticScene::new(2, 2).band(LogicalBand::B11, array![[6.5535f32, 0.2], [0.2, 0.2]]);
    let stack = scene.stack(&[LogicalBand::B11]);

    let saturated = stack.saturated_mask(LogicalBand::B11).unwrap();
    assert_eq!(saturated, &array![[true, false], [false, false]]);
}

#[test]
fn test_missing_group_is_upstream_error() {
    let scene = InMemoryScene::new().with_group(
        ResolutionGroup::R20m,
        SyntheticScene::new(3, 3).raster(ResolutionGroup::R20m),
    );
    assert!(scene.open(ResolutionGroup::R20m).is_ok());

    let result = load_buffered_stack(&scene, &[LogicalBand::B12, LogicalBand::B4], &StackConfig::default());
    assert!(matches!(result, Err(FireError::UpstreamIo(_))));
}

#[test]
fn test_reader_from_other_group_rejected() {
    let scene = SyntheticScene::new(3, 3);
    let reader = reader(&scene, ResolutionGroup::R10m);

    let mut stack = BufferedStack::new();
    let result = stack.load(LogicalBand::B12, 20.0, &reader);
    assert!(matches!(result, Err(FireError::UnknownBand(_))));
    assert!(stack.is_empty());
}

#[test]
fn test_invalid_working_resolution() {
    let scene = SyntheticScene::new(3, 3);
    let config = StackConfig::default().with_working_resolution(-20.0);
    let result = load_buffered_stack(&scene.build(), &[LogicalBand::B12], &config);
    assert!(matches!(result, Err(FireError::InvalidParameter { .. })));
}

#[test]
fn test_center_coordinate_of_stack() {
    let scene = SyntheticScene::new(4, 6);
    let stack = scene.stack(&[LogicalBand::B12]);

    let (x, y) = stack.center_coordinate(None).unwrap();
    // pixel (2, 3) centre on a 20 m grid
    assert!((x - (common::ORIGIN_X + 70.0)).abs() < 1e-9);
    assert!((y - (common::ORIGIN_Y - 50.0)).abs() < 1e-9);
}
