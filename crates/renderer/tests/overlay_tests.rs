//! Overlay rendering properties.

use landcover_common::{GeoBounds, Raster, SourceCrs};
use projection::{BoundsReprojector, GeographicOnly, ProjectionError};
use renderer::gradient::{PRESENT_ALPHA, RAMP_BLUE};
use renderer::{render_overlay, ClipBounds, RenderError};

const NODATA: f64 = -9999.0;
const GT: [f64; 6] = [-70.95, 0.01, 0.0, -33.36, 0.0, -0.01];

fn raster(width: usize, height: usize, values: Vec<f64>) -> Raster {
    Raster::new(
        "/data/processed/delta_ndvi_2017_2024.tif",
        width,
        height,
        values,
        Some(NODATA),
        SourceCrs::Undeclared,
        GT,
    )
}

/// A reprojector that always fails, standing in for a broken CRS.
struct Broken;

impl BoundsReprojector for Broken {
    fn to_geographic(&self, _crs: &SourceCrs, _native: GeoBounds) -> Result<GeoBounds, ProjectionError> {
        Err(ProjectionError::UnsupportedCrs("LOCAL_CS[\"bogus\"]".to_string()))
    }
}

#[test]
fn test_nodata_is_transparent_for_any_bounds() {
    let values = vec![NODATA, -0.4, 0.1, NODATA, 0.7, f64::NAN];
    let r = raster(3, 2, values.clone());
    for clip in [
        ClipBounds::default(),
        ClipBounds::explicit(-1.0, 1.0),
        ClipBounds::explicit(-9999.0, 0.0),
        ClipBounds::new(None, Some(0.2)),
    ] {
        let overlay = render_overlay(&r, clip, &GeographicOnly).unwrap();
        for (i, v) in values.iter().enumerate() {
            let px = overlay.pixel(i % 3, i / 3);
            if *v == NODATA || v.is_nan() {
                assert_eq!(px, [0, 0, 0, 0], "pixel {} with clip {:?}", i, clip);
            } else {
                assert_eq!(px[3], PRESENT_ALPHA);
            }
        }
    }
}

#[test]
fn test_identical_values_render_solid_midpoint() {
    let r = raster(4, 3, vec![0.42; 12]);
    let overlay = render_overlay(&r, ClipBounds::default(), &GeographicOnly).unwrap();
    let expected = [128, 128, RAMP_BLUE, PRESENT_ALPHA];
    for y in 0..3 {
        for x in 0..4 {
            assert_eq!(overlay.pixel(x, y), expected);
        }
    }
}

#[test]
fn test_explicit_unit_bounds_midpoint() {
    let r = raster(3, 1, vec![0.0, 0.5, 1.0]);
    let overlay = render_overlay(&r, ClipBounds::explicit(0.0, 1.0), &GeographicOnly).unwrap();
    let mid = overlay.pixel(1, 0);
    assert!((mid[0] as i32 - 128).abs() <= 1);
    assert!((mid[1] as i32 - 128).abs() <= 1);
    assert_eq!(mid[2], RAMP_BLUE);
    assert_eq!(mid[3], PRESENT_ALPHA);
    assert_eq!(overlay.pixel(0, 0), [255, 0, RAMP_BLUE, PRESENT_ALPHA]);
    assert_eq!(overlay.pixel(2, 0), [0, 255, RAMP_BLUE, PRESENT_ALPHA]);
}

#[test]
fn test_geographic_bounds_unchanged() {
    let r = raster(24, 16, vec![0.2; 24 * 16]);
    let overlay = render_overlay(&r, ClipBounds::default(), &GeographicOnly).unwrap();
    let native = r.native_bounds();
    assert_eq!(overlay.bounds, native);
    assert_eq!(
        overlay.corner_pairs(),
        [[native.south, native.west], [native.north, native.east]]
    );
    assert!((overlay.bounds.west - -70.95).abs() < 1e-12);
    assert!((overlay.bounds.north - -33.36).abs() < 1e-12);
}

#[test]
fn test_all_nodata_is_empty_raster() {
    let r = raster(2, 2, vec![NODATA; 4]);
    let err = render_overlay(&r, ClipBounds::default(), &GeographicOnly).unwrap_err();
    match err {
        RenderError::EmptyRaster { source_name } => assert_eq!(source_name, "delta_ndvi_2017_2024.tif"),
        other => panic!("expected EmptyRaster, got {:?}", other),
    }
}

#[test]
fn test_reprojection_failure_propagates() {
    let r = raster(1, 1, vec![0.3]);
    let err = render_overlay(&r, ClipBounds::default(), &Broken).unwrap_err();
    assert!(matches!(err, RenderError::Reprojection { .. }));
}

#[test]
fn test_rendering_is_deterministic() {
    let values: Vec<f64> = (0..400).map(|i| ((i * 37) % 101) as f64 / 50.0 - 1.0).collect();
    let r = raster(20, 20, values);
    let a = render_overlay(&r, ClipBounds::default(), &GeographicOnly).unwrap();
    let b = render_overlay(&r, ClipBounds::default(), &GeographicOnly).unwrap();
    assert_eq!(a, b);
    assert_eq!(a.to_png().unwrap(), b.to_png().unwrap());
}

#[test]
fn test_inverted_bounds_render_saturated() {
    let r = raster(3, 1, vec![-0.4, 0.0, 0.4]);
    let overlay = render_overlay(&r, ClipBounds::explicit(0.5, -0.5), &GeographicOnly).unwrap();
    assert_eq!(overlay.clip.lower, 0.5);
    assert_eq!(overlay.clip.upper, -0.5);
    // Everything clips to the upper bound, one solid ramp end
    for x in 0..3 {
        assert_eq!(overlay.pixel(x, 0), [0, 255, RAMP_BLUE, PRESENT_ALPHA]);
    }
}

#[test]
fn test_explicit_bounds_on_empty_raster_still_fail() {
    let r = raster(1, 1, vec![NODATA]);
    let err = render_overlay(&r, ClipBounds::explicit(-0.5, 0.5), &GeographicOnly).unwrap_err();
    assert!(matches!(err, RenderError::EmptyRaster { .. }));
}
