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

use std::fmt;
use ndarray::Array1;

use crate::errors::{OdinRasterError, Result};
use crate::source::RasterSource;

pub const DIM_BAND: &str = "band";
pub const DIM_Y: &str = "y";
pub const DIM_X: &str = "x";

/* #region DimensionSet **********************************************************************************/

/// the ordered dimension names of the raster variable
#[derive(Debug,Clone,Copy,PartialEq,Eq)]
pub enum DimensionSet {
    YX,
    BandYX,
}

impl DimensionSet {
    /// single band rasters are 2D, everything with more bands gets a leading band axis
    pub fn from_band_count (count: isize)->Result<DimensionSet> {
        match count {
            1 => Ok(DimensionSet::YX),
            n if n >= 2 => Ok(DimensionSet::BandYX),
            n => Err( OdinRasterError::UnsupportedShapeError(n))
        }
    }

    pub fn names (&self)->&'static [&'static str] {
        match *self {
            DimensionSet::YX => &[DIM_Y, DIM_X],
            DimensionSet::BandYX => &[DIM_BAND, DIM_Y, DIM_X],
        }
    }

    #[inline] pub fn len (&self)->usize { self.names().len() }

    #[inline] pub fn has_band (&self)->bool { *self == DimensionSet::BandYX }

    pub fn position (&self, dim: &str)->Option<usize> {
        self.names().iter().position( |d| *d == dim)
    }
}

impl fmt::Display for DimensionSet {
    fn fmt (&self, f: &mut fmt::Formatter<'_>)->fmt::Result {
        write!( f, "({})", self.names().join(", "))
    }
}

/* #endregion DimensionSet */

/* #region CoordRange ************************************************************************************/

/// a regularly spaced coordinate axis with `n` values starting at `first`
/// values are computed as `first + i*step` so that the length never depends on float rounding
#[derive(Debug,Clone,Copy,PartialEq)]
pub struct CoordRange {
    first: f64,
    step: f64,
    n: usize
}

impl CoordRange {
    pub fn new (first: f64, step: f64, n: usize)->Self {
        CoordRange { first, step, n }
    }

    #[inline] pub fn at (&self, idx: usize)->Option<f64> {
        if idx < self.n { Some( self.first + self.step * idx as f64) } else { None }
    }

    #[inline] pub fn first (&self)->f64 { self.first }

    #[inline] pub fn step (&self)->f64 { self.step }

    #[inline] pub fn len (&self)->usize { self.n }

    #[inline] pub fn is_empty (&self)->bool { self.n == 0 }

    /// the exclusive end of the range (what `arange` would call `stop`)
    #[inline] pub fn stop (&self)->f64 { self.first + self.step * self.n as f64 }

    pub fn iter (&self)->impl Iterator<Item=f64> + '_ {
        (0..self.n).map( move |i| self.first + self.step * i as f64)
    }

    pub fn to_array (&self)->Array1<f64> {
        Array1::from_iter( self.iter())
    }
}

/* #endregion CoordRange */

/* #region CoordinateMap *********************************************************************************/

/// dimension name -> 1D coordinate values
#[derive(Debug,Clone,PartialEq)]
pub struct CoordinateMap {
    pub y: Array1<f64>,
    pub x: Array1<f64>,
    pub band: Option<Array1<f64>>,
}

impl CoordinateMap {
    pub fn get (&self, dim: &str)->Option<&Array1<f64>> {
        match dim {
            DIM_Y => Some(&self.y),
            DIM_X => Some(&self.x),
            DIM_BAND => self.band.as_ref(),
            _ => None
        }
    }

    pub fn contains (&self, dim: &str)->bool { self.get(dim).is_some() }

    /// (name,values) pairs in dimension order
    pub fn iter (&self)->impl Iterator<Item=(&'static str,&Array1<f64>)> {
        self.band.iter().map( |b| (DIM_BAND,b))
            .chain( [(DIM_Y,&self.y), (DIM_X,&self.x)])
    }

    pub fn len (&self)->usize { if self.band.is_some() { 3 } else { 2 } }
}

/// the axis ranges of a raster with the given metadata. `y` steps down from `top` by `res_y`
pub fn axis_ranges (width: usize, height: usize, left: f64, top: f64, res_x: f64, res_y: f64)->(CoordRange,CoordRange) {
    let y = CoordRange::new( top, -res_y, height);
    let x = CoordRange::new( left, res_x, width);
    (y,x)
}

/// derive coordinate arrays for the provided dims from raster source metadata
pub fn derive_coordinates<R: RasterSource> (src: &R, dims: DimensionSet)->Result<CoordinateMap> {
    let bounds = src.bounds()?;
    let (res_x, res_y) = src.res()?;
    let (y,x) = axis_ranges( src.width(), src.height(), bounds.left, bounds.top, res_x, res_y);

    let band = if dims.has_band() {
        Some( Array1::from_iter( src.indexes().into_iter().map( |i| i as f64)))
    } else {
        None
    };

    Ok( CoordinateMap { y: y.to_array(), x: x.to_array(), band } )
}

/* #endregion CoordinateMap */

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_band_count_dims() {
        assert_eq!( DimensionSet::from_band_count(1).unwrap(), DimensionSet::YX);
        assert_eq!( DimensionSet::from_band_count(2).unwrap().names(), &["band","y","x"]);
        assert!( matches!( DimensionSet::from_band_count(0), Err(OdinRasterError::UnsupportedShapeError(0))));
        assert!( matches!( DimensionSet::from_band_count(-3), Err(OdinRasterError::UnsupportedShapeError(-3))));

        assert_eq!( DimensionSet::BandYX.position("x"), Some(2));
        assert_eq!( DimensionSet::YX.position("x"), Some(1));
        assert_eq!( DimensionSet::YX.position("band"), None);
    }

    #[test]
    fn test_coordinate_map() {
        let (y,x) = axis_ranges( 2, 3, 0.0, 30.0, 10.0, 10.0);
        let mut coords = CoordinateMap { y: y.to_array(), x: x.to_array(), band: None };
        assert_eq!( coords.len(), 2);
        assert_eq!( coords.get("x").map( |c| c.len()), Some(2));
        assert!( coords.get("band").is_none());

        coords.band = Some( Array1::from_vec( vec![1.0, 2.0]));
        assert_eq!( coords.len(), 3);
        assert_eq!( coords.iter().map( |(d,_)| d).collect::<Vec<_>>(), vec!["band","y","x"]);
    }

    #[test]
    fn test_axis_ranges() {
        let (y,x) = axis_ranges( 2, 3, 0.0, 30.0, 10.0, 10.0);
        assert_eq!( y.to_array().to_vec(), vec![30.0, 20.0, 10.0]);
        assert_eq!( x.to_array().to_vec(), vec![0.0, 10.0]);
        assert_eq!( y.stop(), 0.0);
        assert_eq!( x.at(2), None);
    }

    #[test]
    fn test_fractional_resolution_length() {
        // non-representable steps must not change the axis length
        let (y,x) = axis_ranges( 10, 7, -180.0, 90.0, 0.1, 0.3);
        assert_eq!( x.to_array().len(), 10);
        assert_eq!( y.to_array().len(), 7);
    }
}
