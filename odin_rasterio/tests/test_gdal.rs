/*
 * Copyright © 2025, United States Government, as represented by the Administrator of
 * the National Aeronautics and Space Administration. All rights reserved.
 *
 * The “ODIN” software is licensed under the Apache License, Version 2.0 (the "License");
 * you may not use this file except in compliance with the License. You may obtain a copy
 * of the License at http://www.apache.org/licenses/LICENSE-2.0.
 *
 * Unless required by applicable law or agreed to in writing, software distributed under
 * the License is distributed on an "AS IS" BASIS, WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND,
 * either express or implied. See the License for the specific language governing permissions
 * and limitations under the License.
 */

use odin_rasterio::*;
use odin_rasterio::gdal::{DriverManager, raster::Buffer, spatial_ref::SpatialRef};
use odin_rasterio::gdal::config::get_config_option;

// 2 bands, 2 cols, 3 rows in UTM zone 11N with 30m pixels
fn mem_raster ()->GdalRaster {
    let driver = DriverManager::get_driver_by_name("MEM").unwrap();
    let mut ds = driver.create_with_band_type::<f64,_>( "", 2, 3, 2).unwrap();
    ds.set_geo_transform( &[500000.0, 30.0, 0.0, 4000000.0, 0.0, -30.0]).unwrap();
    ds.set_spatial_ref( &SpatialRef::from_epsg(32611).unwrap()).unwrap();

    for b in 1..=2 {
        let mut band = ds.rasterband(b).unwrap();
        let base = (b * 10) as f64;
        let mut buf = Buffer::new( (2,3), vec![base, base+1.0, base+2.0, base+3.0, base+4.0, base+5.0]);
        band.write( (0,0), (2,3), &mut buf).unwrap();
    }

    GdalRaster::from_dataset( ds, RasterEnvConfig::default())
}

#[test]
fn test_gdal_metadata() {
    let src = mem_raster();
    assert_eq!( src.width(), 2);
    assert_eq!( src.height(), 3);
    assert_eq!( src.count(), 2);
    assert_eq!( src.indexes(), vec![1, 2]);
    assert_eq!( src.res().unwrap(), (30.0, 30.0));

    let bounds = src.bounds().unwrap();
    assert_eq!( bounds.left, 500000.0);
    assert_eq!( bounds.top, 4000000.0);
    assert_eq!( bounds.bottom, 3999910.0);
    assert_eq!( bounds.right, 500060.0);

    assert_eq!( src.dtype(1).unwrap(), "float64");
}

#[test]
fn test_gdal_store() {
    let store = RasterStore::from_source( mem_raster()).unwrap();

    assert_eq!( store.dimensions(), DimensionSet::BandYX);
    let coords = store.coordinates();
    assert_eq!( coords.y.to_vec(), vec![4000000.0, 3999970.0, 3999940.0]);
    assert_eq!( coords.x.to_vec(), vec![500000.0, 500030.0]);
    assert_eq!( coords.band.as_ref().unwrap().to_vec(), vec![1.0, 2.0]);

    let attrs = store.attributes();
    assert_eq!( attrs.crs.as_deref(), Some("EPSG:32611"));
    assert_eq!( attrs.affine, Some([500000.0, 30.0, 0.0, 4000000.0, 0.0, -30.0]));
    assert!( attrs.proj.is_some());

    let var = store.open_variable( RASTER_VAR_NAME).unwrap();
    let px = var.band(2).unwrap().get( &[AxisIndex::At(2), AxisIndex::At(1)]).unwrap();
    assert_eq!( px, Indexed::Scalar(25.0));

    let a = var.load().unwrap();
    assert_eq!( a.shape(), &[2, 3, 2]);
    assert_eq!( a[[0,1,0]], 12.0);
    drop(var);

    store.close().unwrap();
}

#[test]
fn test_gdal_latlon() {
    let store = RasterStore::from_source( mem_raster()).unwrap();
    let mut da = store.to_dataarray().unwrap();
    attach_latlon_coords( &mut da).unwrap();

    let lat = &da.coord("latitude").unwrap().values;
    let lon = &da.coord("longitude").unwrap().values;

    // easting 500000 is the central meridian of zone 11
    assert!( (lon[[0,0]] + 117.0).abs() < 1e-6);
    assert!( lat[[0,0]] > 36.0 && lat[[0,0]] < 36.3);
    assert!( lat[[2,0]] < lat[[0,0]]);
    assert!( lon[[0,1]] > lon[[0,0]]);
}

#[test]
fn test_gdal_same_proj() {
    let p = Proj::new("EPSG:32611");
    let x = [500000.0];
    let y = [4000000.0];
    let (xc,yc) = reproject_points( &p, &p.clone(), &x, &y, false).unwrap();
    assert_eq!( xc.to_vec(), vec![500000.0]);
    assert_eq!( yc.to_vec(), vec![4000000.0]);
}

#[test]
fn test_gdal_south_up() {
    let driver = DriverManager::get_driver_by_name("MEM").unwrap();
    let mut ds = driver.create_with_band_type::<f64,_>( "", 2, 3, 1).unwrap();
    ds.set_geo_transform( &[0.0, 10.0, 0.0, 0.0, 0.0, 10.0]).unwrap();
    let src = GdalRaster::from_dataset( ds, RasterEnvConfig::default());

    assert_eq!( src.res().unwrap(), (10.0, -10.0));
    assert_eq!( src.bounds().unwrap().bottom, 30.0);

    let store = RasterStore::from_source( src).unwrap();
    assert_eq!( store.coordinates().y.to_vec(), vec![0.0, 10.0, 20.0]);
    assert_eq!( store.coordinates().x.to_vec(), vec![0.0, 10.0]);
}

#[test]
fn test_gdal_no_geo_transform() {
    let driver = DriverManager::get_driver_by_name("MEM").unwrap();
    let ds = driver.create_with_band_type::<u8,_>( "", 3, 2, 1).unwrap();
    let src = GdalRaster::from_dataset( ds, RasterEnvConfig::default());
    assert!( src.path().is_none());

    // pixel coordinates
    let store = RasterStore::from_source( src).unwrap();
    assert_eq!( store.dimensions(), DimensionSet::YX);
    assert_eq!( store.coordinates().x.to_vec(), vec![0.0, 1.0, 2.0]);
    assert_eq!( store.coordinates().y.to_vec(), vec![0.0, 1.0]);
    assert!( store.attributes().affine.is_none());
    assert!( store.attributes().crs.is_none());
    assert_eq!( store.source().dtype(1).unwrap(), "uint8");
}

// 4 cols, 3 rows single band byte GeoTIFF in UTM zone 11N with values 0..12
fn write_gtiff (path: &std::path::Path) {
    let driver = DriverManager::get_driver_by_name("GTiff").unwrap();
    let mut ds = driver.create_with_band_type::<u8,_>( path, 4, 3, 1).unwrap();
    ds.set_geo_transform( &[500000.0, 30.0, 0.0, 4000000.0, 0.0, -30.0]).unwrap();
    ds.set_spatial_ref( &SpatialRef::from_epsg(32611).unwrap()).unwrap();

    let mut band = ds.rasterband(1).unwrap();
    let mut buf = Buffer::new( (4,3), (0u8..12).collect::<Vec<u8>>());
    band.write( (0,0), (4,3), &mut buf).unwrap();
} // dataset is flushed when dropped

#[test]
fn test_open_gtiff() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("utm11.tif");
    write_gtiff( &path);

    let store = open( &path, "r").unwrap();
    assert_eq!( store.source().path(), Some(path.as_path()));
    assert_eq!( store.source().dataset().driver().short_name(), "GTiff");

    assert_eq!( store.dimensions(), DimensionSet::YX);
    assert_eq!( store.coordinates().x.to_vec(), vec![500000.0, 500030.0, 500060.0, 500090.0]);
    assert_eq!( store.coordinates().y.to_vec(), vec![4000000.0, 3999970.0, 3999940.0]);
    assert_eq!( store.attributes().crs.as_deref(), Some("EPSG:32611"));

    let var = store.open_variable( RASTER_VAR_NAME).unwrap();
    let band = var.band(1).unwrap();
    assert_eq!( band.dtype().unwrap(), "uint8");
    assert_eq!( band.get( &[AxisIndex::At(1), AxisIndex::At(2)]).unwrap(), Indexed::Scalar(6.0));
    drop(var);
    store.close().unwrap();

    let store = open( &path, "r+").unwrap();
    assert_eq!( store.get_dimensions().get("x"), Some(&4));
    assert_eq!( store.attributes().crs.as_deref(), Some("EPSG:32611"));
    store.close().unwrap();
}

#[test]
fn test_open_restricts_driver_to_extension() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("not_a_png.png"); // GeoTIFF content
    write_gtiff( &path);

    match open( &path, "r") {
        Err(e) => assert!( e.is_open_error(), "unexpected error: {}", e),
        Ok(_) => panic!("GeoTIFF should not open with the PNG driver")
    }
}

#[test]
fn test_open_errors() {
    match open( "/nonexistent/odin_rasterio/missing.tif", "r") {
        Err(e) => assert!( e.is_open_error(), "unexpected error: {}", e),
        Ok(_) => panic!("missing file should not open")
    }

    match open( "/nonexistent/odin_rasterio/missing.tif", "w") {
        Err(OdinRasterError::OpenError(_,msg)) => assert!( msg.contains("'w'")),
        Err(e) => panic!("unexpected error: {}", e),
        Ok(_) => panic!("unsupported mode should not open")
    }
}

#[test]
fn test_raster_env_scope() {
    let key = "ODIN_RASTERIO_TEST_OPTION";
    let config = RasterEnvConfig::default().with_option( key, "on");

    let value = with_raster_env( &config, || Ok( get_config_option( key, "")?)).unwrap();
    assert_eq!( value, "on");
    assert_eq!( get_config_option( key, "").unwrap(), "");

    // also restored when the guarded call fails
    let res: Result<()> = with_raster_env( &config, || Err( OdinRasterError::IndexError("boom".into())));
    assert!( res.is_err());
    assert_eq!( get_config_option( key, "").unwrap(), "");
}

#[test]
fn test_env_config() {
    let config: RasterEnvConfig = ron::from_str( r#"(options: [("GDAL_DISABLE_READDIR_ON_OPEN","EMPTY_DIR")], quiet: false)"#).unwrap();
    assert_eq!( config.options.len(), 1);
    assert!( !config.quiet);

    let config: RasterEnvConfig = ron::from_str( "()").unwrap();
    assert_eq!( config, RasterEnvConfig::default());
}
