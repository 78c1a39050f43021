//! GeoTIFF reading against files written through GDAL.

use landcover_common::SourceCrs;
use storage::{read_raster, StorageError};
use test_utils::{
    assert_approx_eq, create_delta_band, create_gradient_band, temp_test_dir_with_prefix, transforms, write_geotiff,
    TiffSpec, DELTA_NODATA,
};

#[test]
fn test_read_geographic_band() {
    let dir = temp_test_dir_with_prefix("raster_");
    let path = dir.path().join("ndvi_pudahuel_2017.tif");
    let values = create_gradient_band(6, 4, 0.0, 0.9);
    write_geotiff(&path, &TiffSpec::geographic(6, 4, values.clone()));

    let raster = read_raster(&path).unwrap();
    assert_eq!((raster.width, raster.height), (6, 4));
    assert_eq!(raster.values, values);
    assert_eq!(raster.nodata, None);
    assert_eq!(raster.crs, SourceCrs::Geographic);
    assert_eq!(raster.geo_transform, transforms::SANTIAGO_GEOGRAPHIC);
    assert_eq!(raster.source_name(), "ndvi_pudahuel_2017.tif");

    let bounds = raster.native_bounds();
    assert_approx_eq!(bounds.west, -70.85, 1e-9);
    assert_approx_eq!(bounds.east, -70.79, 1e-9);
    assert_approx_eq!(bounds.north, -33.40, 1e-9);
    assert_approx_eq!(bounds.south, -33.44, 1e-9);
}

#[test]
fn test_nodata_travels_with_values() {
    let dir = temp_test_dir_with_prefix("raster_");
    let path = dir.path().join("delta_ndvi_2017_2024.tif");
    let values = create_delta_band(5, 5, DELTA_NODATA, 4);
    write_geotiff(&path, &TiffSpec::geographic(5, 5, values).with_nodata(DELTA_NODATA));

    let raster = read_raster(&path).unwrap();
    assert_eq!(raster.nodata, Some(DELTA_NODATA));
    assert_eq!(raster.valid_values().len(), 25 - 7);
    assert!(raster.values.contains(&DELTA_NODATA));
}

#[test]
fn test_projected_crs_is_kept() {
    let dir = temp_test_dir_with_prefix("raster_");
    let path = dir.path().join("ndbi_cerrillos_2024.tif");
    write_geotiff(&path, &TiffSpec::projected(3, 3, vec![0.1; 9]));

    let raster = read_raster(&path).unwrap();
    assert!(raster.crs.needs_reprojection());
    assert!(raster.is_north_up());
}

#[test]
fn test_missing_crs_is_undeclared() {
    let dir = temp_test_dir_with_prefix("raster_");
    let path = dir.path().join("plain.tif");
    write_geotiff(&path, &TiffSpec::geographic(2, 2, vec![1.0; 4]).without_crs());

    assert_eq!(read_raster(&path).unwrap().crs, SourceCrs::Undeclared);
}

#[test]
fn test_missing_file() {
    let dir = temp_test_dir_with_prefix("raster_");
    let err = read_raster(&dir.path().join("ndvi_pudahuel_2030.tif")).unwrap_err();
    assert!(matches!(err, StorageError::NotFound(_)));
}

#[test]
fn test_unreadable_file() {
    let dir = temp_test_dir_with_prefix("raster_");
    let path = dir.path().join("broken.tif");
    std::fs::write(&path, b"not a tiff").unwrap();
    assert!(matches!(read_raster(&path), Err(StorageError::Gdal { .. })));
}
