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

//! best-effort projection helpers for raster coordinates

use std::borrow::Cow;
use ndarray::Array2;
use tracing::debug;
use gdal::spatial_ref::{CoordTransform, SpatialRef};

use crate::array::{Coordinate, DataArray};
use crate::coords::{DIM_X, DIM_Y};
use crate::errors::{index_error, Result};

pub const COORD_LATITUDE: &str = "latitude";
pub const COORD_LONGITUDE: &str = "longitude";

/// a projection descriptor. Two descriptors are the same projection if their definitions are equal
#[derive(Debug,Clone,PartialEq,Eq)]
pub struct Proj {
    srs: String
}

impl Proj {
    pub fn new (definition: &str)->Self {
        Proj { srs: definition.to_string() }
    }

    pub fn wgs84 ()->Self { Proj::new("EPSG:4326") }

    pub fn srs (&self)->&str { &self.srs }

    pub fn spatial_ref (&self)->Result<SpatialRef> {
        Ok( SpatialRef::from_definition( &self.srs)? )
    }
}

/// the point transformation routine of a projection library
pub trait PointTransform {
    /// transform x/y values in place
    fn transform (&self, src: &Proj, dst: &Proj, x: &mut [f64], y: &mut [f64])->Result<()>;
}

/// PointTransform based on GDAL/OSR coordinate transformations
#[derive(Debug,Default,Clone,Copy)]
pub struct GdalPointTransform;

// EPSG geographic systems use lat,lon axis order (we don't change the axis mapping strategy)
fn is_lat_first (srs: &SpatialRef)->bool {
    srs.is_geographic() && srs.auth_name().map( |n| n.eq_ignore_ascii_case("EPSG")).unwrap_or(false)
}

impl PointTransform for GdalPointTransform {
    fn transform (&self, src: &Proj, dst: &Proj, x: &mut [f64], y: &mut [f64])->Result<()> {
        if x.len() != y.len() { return Err( index_error("x/y length mismatch")) }

        let s_srs = src.spatial_ref()?;
        let t_srs = dst.spatial_ref()?;
        let s_lat_first = is_lat_first( &s_srs);
        let t_lat_first = is_lat_first( &t_srs);

        let transform = CoordTransform::new( &s_srs, &t_srs)?;
        let mut z: [f64;0] = [];

        if s_lat_first {
            transform.transform_coords( y, x, &mut z)?;
        } else {
            transform.transform_coords( x, y, &mut z)?;
        }

        if s_lat_first != t_lat_first {
            x.swap_with_slice( y);
        }
        Ok(())
    }
}

/// reproject points with the default (GDAL) transform
pub fn reproject_points<'a> (src: &Proj, dst: &Proj, x: &'a [f64], y: &'a [f64], nocopy: bool)->Result<(Cow<'a,[f64]>,Cow<'a,[f64]>)> {
    reproject_points_with( &GdalPointTransform, src, dst, x, y, nocopy)
}

/// reproject x/y from `src` to `dst`. If both are the same projection we skip the transform and return
/// the inputs (borrowed if `nocopy` is set)
pub fn reproject_points_with<'a,T> (transform: &T, src: &Proj, dst: &Proj, x: &'a [f64], y: &'a [f64], nocopy: bool)
    -> Result<(Cow<'a,[f64]>,Cow<'a,[f64]>)>
    where T: PointTransform + ?Sized
{
    if x.len() != y.len() {
        return Err( index_error( format!("x/y length mismatch: {} vs {}", x.len(), y.len())))
    }

    if src == dst {
        return if nocopy {
            Ok( (Cow::Borrowed(x), Cow::Borrowed(y)) )
        } else {
            Ok( (Cow::Owned(x.to_vec()), Cow::Owned(y.to_vec())) )
        }
    }

    let mut xs = x.to_vec();
    let mut ys = y.to_vec();
    transform.transform( src, dst, &mut xs, &mut ys)?;
    Ok( (Cow::Owned(xs), Cow::Owned(ys)) )
}

/// attach 2D latitude/longitude coordinates to a DataArray that has a `crs` attribute
pub fn attach_latlon_coords (da: &mut DataArray)->Result<()> {
    attach_latlon_coords_with( &GdalPointTransform, da)
}

pub fn attach_latlon_coords_with<T> (transform: &T, da: &mut DataArray)->Result<()> where T: PointTransform + ?Sized {
    let Some(crs) = da.attrs.crs.clone() else {
        return Ok(())
    };

    let xs = da.coord_values_1d( DIM_X).ok_or_else( || index_error("no 1D x coordinate"))?.to_vec();
    let ys = da.coord_values_1d( DIM_Y).ok_or_else( || index_error("no 1D y coordinate"))?.to_vec();
    let (ny,nx) = (ys.len(), xs.len());

    // meshgrid in (y,x) row major order
    let gx: Vec<f64> = (0..ny).flat_map( |_| xs.iter().copied()).collect();
    let gy: Vec<f64> = ys.iter().flat_map( |&y| std::iter::repeat(y).take(nx)).collect();

    debug!("computing lat/lon for {}x{} grid from {}", nx, ny, crs);
    let (lon,lat) = reproject_points_with( transform, &Proj::new( &crs), &Proj::wgs84(), &gx, &gy, true)?;

    let dims = vec![ DIM_Y.to_string(), DIM_X.to_string()];
    let lat = Array2::from_shape_vec( (ny,nx), lat.into_owned())?.into_dyn();
    let lon = Array2::from_shape_vec( (ny,nx), lon.into_owned())?.into_dyn();

    let lat_coord = Coordinate { dims: dims.clone(), values: lat, attrs: Default::default() }
        .with_attr( "units", "degrees_north")
        .with_attr( "long_name", COORD_LATITUDE)
        .with_attr( "standard_name", COORD_LATITUDE);
    let lon_coord = Coordinate { dims, values: lon, attrs: Default::default() }
        .with_attr( "units", "degrees_east")
        .with_attr( "long_name", COORD_LONGITUDE)
        .with_attr( "standard_name", COORD_LONGITUDE);

    da.set_coord( COORD_LATITUDE, lat_coord)?;
    da.set_coord( COORD_LONGITUDE, lon_coord)?;
    Ok(())
}
