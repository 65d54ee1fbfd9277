/*
 * Copyright © 2024, United States Government, as represented by the Administrator of
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

//! the raster sources we can build stores from: GDAL datasets and in-memory band stacks

use std::{cell::Cell, collections::HashMap, fmt, ops::{Deref, Range}, path::{Path,PathBuf}, rc::Rc, str::FromStr};
use lazy_static::lazy_static;
use ndarray::{s, Array2, Array3};
use tracing::{debug, warn};
use gdal::{Dataset, DatasetOptions, GdalOpenFlags, GeoTransform};
use gdal::raster::Buffer;
use gdal::spatial_ref::SpatialRef;

use crate::attrs::RasterAttrs;
use crate::env::{with_raster_env, RasterEnvConfig};
use crate::errors::{gdal_open_error, index_error, open_error, Result};

lazy_static! {
    // several GDAL drivers share extensions so we can't derive this from the DriverManager
    static ref EXT_MAP: HashMap<&'static str, &'static str> = HashMap::from( [ // file extension -> driver short name
        ("tif", "GTiff"),
        ("tiff", "GTiff"),
        ("vrt", "VRT"),
        ("png", "PNG"),
        ("webp", "WEBP"),
        ("jp2", "JP2OpenJPEG"),
        ("nc", "netCDF"),
        ("grib2", "GRIB"),
    ]);
}

/// Note that filename extension has to be lower case
pub fn get_driver_name_from_filename (path: &Path)->Option<&'static str> {
    path.extension().and_then( |ext| ext.to_str()).and_then( |ext| EXT_MAP.get( ext)).copied()
}

/* #region support types ********************************************************************************/

/// the outer edges of a raster in its own spatial reference
#[derive(Debug,Clone,Copy,PartialEq)]
pub struct RasterBounds {
    pub left: f64,
    pub bottom: f64,
    pub right: f64,
    pub top: f64
}

/// a pixel window given as row and column ranges (end exclusive)
#[derive(Debug,Clone,PartialEq,Eq)]
pub struct Window {
    pub rows: Range<usize>,
    pub cols: Range<usize>,
}

impl Window {
    pub fn new (rows: Range<usize>, cols: Range<usize>)->Self { Window { rows, cols } }

    pub fn full (width: usize, height: usize)->Self { Window { rows: 0..height, cols: 0..width } }

    #[inline] pub fn width (&self)->usize { self.cols.len() }
    #[inline] pub fn height (&self)->usize { self.rows.len() }
    #[inline] pub fn is_empty (&self)->bool { self.rows.is_empty() || self.cols.is_empty() }

    pub fn fits (&self, width: usize, height: usize)->bool {
        self.rows.start <= self.rows.end && self.cols.start <= self.cols.end
            && self.rows.end <= height && self.cols.end <= width
    }
}

/// open mode for raster resources
#[derive(Debug,Clone,Copy,PartialEq,Eq,Default)]
pub enum OpenMode {
    #[default]
    Read,
    Update,
}

impl OpenMode {
    fn open_flags (&self)->GdalOpenFlags {
        match *self {
            OpenMode::Read => GdalOpenFlags::GDAL_OF_RASTER | GdalOpenFlags::GDAL_OF_READONLY,
            OpenMode::Update => GdalOpenFlags::GDAL_OF_RASTER | GdalOpenFlags::GDAL_OF_UPDATE,
        }
    }
}

impl FromStr for OpenMode {
    type Err = String;

    fn from_str (s: &str)->std::result::Result<OpenMode,String> {
        match s {
            "" | "r" => Ok(OpenMode::Read),
            "r+" => Ok(OpenMode::Update),
            _ => Err( format!("unsupported open mode '{}'", s))
        }
    }
}

impl fmt::Display for OpenMode {
    fn fmt (&self, f: &mut fmt::Formatter<'_>)->fmt::Result {
        match *self {
            OpenMode::Read => write!( f, "r"),
            OpenMode::Update => write!( f, "r+"),
        }
    }
}

/* #endregion support types */

/// what we need from an open raster resource. Band indexes are 1-based
pub trait RasterSource {
    fn width (&self)->usize;
    fn height (&self)->usize;

    fn bounds (&self)->Result<RasterBounds>;

    /// (x,y) pixel size as `(a, -e)` of the affine transform. Both are positive for north-up rasters,
    /// `y` is negative if rows go south-up
    fn res (&self)->Result<(f64,f64)>;

    /// signed since some sources can report bogus counts
    fn count (&self)->isize;

    fn indexes (&self)->Vec<usize> {
        let n = self.count();
        if n > 0 { (1..=n as usize).collect() } else { Vec::new() }
    }

    fn crs (&self)->Option<String> { None }
    fn affine (&self)->Option<GeoTransform> { None }
    fn proj (&self)->Option<String> { None }

    /// element type name of the given band (e.g. "uint8", "float64")
    fn dtype (&self, band: usize)->Result<String>;

    /// read the given window of a band as (rows,cols) array
    fn read (&self, band: usize, window: &Window)->Result<Array2<f64>>;

    fn close (self)->Result<()> where Self: Sized;
}

/// a RasterSource shared between a store and its lazy bands. The wrapped source is closed
/// when the last owner releases it, unless it was closed explicitly before
pub struct SharedSource<R: RasterSource> {
    src: Option<R>, // only None inside of close/drop
}

impl <R: RasterSource> SharedSource<R> {
    pub fn new (src: R)->Self { SharedSource { src: Some(src) } }

    /// close now and report errors to the caller
    pub fn close (mut self)->Result<()> {
        match self.src.take() {
            Some(src) => src.close(),
            None => Ok(())
        }
    }
}

impl <R: RasterSource> Deref for SharedSource<R> {
    type Target = R;

    fn deref (&self)->&R {
        self.src.as_ref().expect("raster source accessed while closing")
    }
}

impl <R: RasterSource> Drop for SharedSource<R> {
    fn drop (&mut self) {
        if let Some(src) = self.src.take() {
            debug!("closing raster source after last release");
            if let Err(e) = src.close() {
                warn!("failed to close raster source: {}", e);
            }
        }
    }
}

fn check_read_args<R: RasterSource> (src: &R, band: usize, window: &Window)->Result<()> {
    if band == 0 || band as isize > src.count() {
        return Err( index_error( format!("band index {} out of range 1..={}", band, src.count())))
    }
    if !window.fits( src.width(), src.height()) {
        return Err( index_error( format!("window {:?} outside of {}x{} raster", window, src.width(), src.height())))
    }
    Ok(())
}

/* #region GdalRaster ***********************************************************************************/

// used for datasets without geo transform, yields pixel coordinates
const IDENTITY_TRANSFORM: GeoTransform = [0.0, 1.0, 0.0, 0.0, 0.0, 1.0];

/// a RasterSource backed by a GDAL dataset
pub struct GdalRaster {
    ds: Dataset,
    path: Option<PathBuf>,
    env: RasterEnvConfig,
}

impl GdalRaster {
    pub fn open<P: AsRef<Path>> (path: P, mode: OpenMode, env: RasterEnvConfig)->Result<GdalRaster> {
        let path = path.as_ref();
        let drivers = get_driver_name_from_filename( path).map( |d| [d]);

        let ds = with_raster_env( &env, || {
            let dso = DatasetOptions {
                open_flags: mode.open_flags(),
                allowed_drivers: drivers.as_ref().map( |d| d.as_slice()),
                open_options: None,
                sibling_files: None
            };
            Dataset::open_ex( path, dso).map_err( |e| gdal_open_error( path.display(), e))
        })?;

        debug!("opened raster {:?} mode={} driver={}", path, mode, ds.driver().short_name());
        Ok( GdalRaster { ds, path: Some(path.to_path_buf()), env } )
    }

    /// parse the mode string and open
    pub fn open_with_mode<P: AsRef<Path>> (path: P, mode: &str, env: RasterEnvConfig)->Result<GdalRaster> {
        let open_mode = OpenMode::from_str( mode).map_err( |msg| open_error( path.as_ref().display(), msg))?;
        Self::open( path, open_mode, env)
    }

    /// wrap an already open dataset (e.g. one created with the MEM driver)
    pub fn from_dataset (ds: Dataset, env: RasterEnvConfig)->GdalRaster {
        GdalRaster { ds, path: None, env }
    }

    pub fn path (&self)->Option<&Path> { self.path.as_deref() }

    pub fn dataset (&self)->&Dataset { &self.ds }

    /// the dataset geo transform, or the identity if it is not georeferenced
    fn transform (&self)->GeoTransform {
        self.ds.geo_transform().unwrap_or( IDENTITY_TRANSFORM)
    }
}

/// "AUTH:CODE" if the spatial ref has an authority, PROJ string otherwise
pub fn crs_string (srs: &SpatialRef)->Option<String> {
    match (srs.auth_name(), srs.auth_code()) {
        (Some(name), Ok(code)) => Some( format!("{}:{}", name, code)),
        _ => srs.to_proj4().ok().filter( |s| !s.is_empty())
    }
}

impl RasterSource for GdalRaster {
    fn width (&self)->usize { self.ds.raster_size().0 }

    fn height (&self)->usize { self.ds.raster_size().1 }

    fn bounds (&self)->Result<RasterBounds> {
        let (cols,rows) = self.ds.raster_size();
        let a = self.transform();

        let left = a[0];
        let top = a[3];
        let right = left + a[1] * cols as f64;
        let bottom = top + a[5] * rows as f64;

        Ok( RasterBounds { left, bottom, right, top } )
    }

    fn res (&self)->Result<(f64,f64)> {
        let a = self.transform();
        Ok( (a[1], -a[5]) )
    }

    fn count (&self)->isize { self.ds.raster_count() as isize }

    fn crs (&self)->Option<String> {
        self.ds.spatial_ref().ok().and_then( |srs| crs_string( &srs))
    }

    fn affine (&self)->Option<GeoTransform> {
        self.ds.geo_transform().ok()
    }

    fn proj (&self)->Option<String> {
        let wkt = self.ds.projection();
        if wkt.is_empty() { None } else { Some(wkt) }
    }

    fn dtype (&self, band: usize)->Result<String> {
        let band = self.ds.rasterband( band)?;
        Ok( format!("{:?}", band.band_type()).to_lowercase() )
    }

    fn read (&self, band_index: usize, window: &Window)->Result<Array2<f64>> {
        check_read_args( self, band_index, window)?;

        with_raster_env( &self.env, || {
            let band = self.ds.rasterband( band_index)?;
            let size = (window.width(), window.height());
            let offset = (window.cols.start as isize, window.rows.start as isize);
            let buf: Buffer<f64> = band.read_as( offset, size, size, None)?;

            Ok( Array2::from_shape_vec( (window.height(), window.width()), buf.data().to_vec())? )
        })
    }

    fn close (self)->Result<()> {
        debug!("closing raster {:?}", self.path);
        drop( self.ds);
        Ok(())
    }
}

/* #endregion GdalRaster */

/* #region MemRaster ************************************************************************************/

/// access statistics of a MemRaster, shared with the caller
#[derive(Debug,Default)]
pub struct MemStats {
    reads: Cell<usize>,
    closed: Cell<bool>,
}

impl MemStats {
    pub fn reads (&self)->usize { self.reads.get() }
    pub fn is_closed (&self)->bool { self.closed.get() }
}

/// a RasterSource for a (band,row,col) stack that is already in memory
pub struct MemRaster {
    data: Array3<f64>,
    left: f64,
    top: f64,
    res_x: f64,
    res_y: f64,
    attrs: RasterAttrs,
    stats: Rc<MemStats>,
}

impl MemRaster {
    /// `res_y` is positive for north-up data (rows go south from `top`)
    pub fn new (data: Array3<f64>, left: f64, top: f64, res_x: f64, res_y: f64)->Self {
        MemRaster { data, left, top, res_x, res_y, attrs: RasterAttrs::default(), stats: Rc::new( MemStats::default()) }
    }

    /// a raster of given size with all pixels set to their linear (band,row,col) position
    pub fn sequential (n_bands: usize, width: usize, height: usize, left: f64, top: f64, res_x: f64, res_y: f64)->Self {
        let data = Array3::from_shape_fn( (n_bands,height,width), |(b,r,c)| (b*height*width + r*width + c) as f64);
        Self::new( data, left, top, res_x, res_y)
    }

    pub fn with_attrs (mut self, attrs: RasterAttrs)->Self {
        self.attrs = attrs;
        self
    }

    pub fn stats (&self)->Rc<MemStats> { self.stats.clone() }
}

impl RasterSource for MemRaster {
    fn width (&self)->usize { self.data.dim().2 }

    fn height (&self)->usize { self.data.dim().1 }

    fn bounds (&self)->Result<RasterBounds> {
        Ok( RasterBounds {
            left: self.left,
            bottom: self.top - self.res_y * self.height() as f64,
            right: self.left + self.res_x * self.width() as f64,
            top: self.top
        })
    }

    fn res (&self)->Result<(f64,f64)> { Ok( (self.res_x, self.res_y)) }

    fn count (&self)->isize { self.data.dim().0 as isize }

    fn crs (&self)->Option<String> { self.attrs.crs.clone() }
    fn affine (&self)->Option<GeoTransform> { self.attrs.affine }
    fn proj (&self)->Option<String> { self.attrs.proj.clone() }

    fn dtype (&self, band: usize)->Result<String> {
        if band == 0 || band > self.data.dim().0 { return Err( index_error( format!("band index {} out of range", band))) }
        Ok( "float64".to_string() )
    }

    fn read (&self, band: usize, window: &Window)->Result<Array2<f64>> {
        check_read_args( self, band, window)?;
        self.stats.reads.set( self.stats.reads.get() + 1);

        let view = self.data.slice( s![band-1, window.rows.clone(), window.cols.clone()]);
        Ok( view.to_owned() )
    }

    fn close (self)->Result<()> {
        self.stats.closed.set( true);
        Ok(())
    }
}

/* #endregion MemRaster */
