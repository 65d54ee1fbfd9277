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

//! deferred (lazily indexed) access to raster bands

use std::{ops::Range, rc::Rc};
use ndarray::{stack, ArrayD, Axis, IxDyn};
use tracing::debug;

use crate::attrs::RasterAttrs;
use crate::coords::DimensionSet;
use crate::errors::{index_error, Result};
use crate::source::{RasterSource, SharedSource, Window};
use crate::RASTER_VAR_NAME;

/// index key for one axis
#[derive(Debug,Clone,PartialEq,Eq)]
pub enum AxisIndex {
    All,
    At(usize),
    Slice(Range<usize>),
}

/// result of indexing a lazy band
#[derive(Debug,Clone,PartialEq)]
pub enum Indexed {
    Scalar(f64),
    Array(ArrayD<f64>),
}

impl Indexed {
    pub fn as_scalar (&self)->Option<f64> {
        if let Indexed::Scalar(v) = self { Some(*v) } else { None }
    }

    pub fn into_array (self)->ArrayD<f64> {
        match self {
            Indexed::Scalar(v) => ArrayD::from_elem( IxDyn(&[]), v),
            Indexed::Array(a) => a
        }
    }
}

/// selected pixel range of one axis. Dropped axes were selected by a single position
#[derive(Debug,Clone,PartialEq,Eq)]
struct AxisSel {
    range: Range<usize>,
    dropped: bool,
}

impl AxisSel {
    fn apply (&self, key: &AxisIndex)->Result<AxisSel> {
        let len = self.range.len();
        let start = self.range.start;

        match key {
            AxisIndex::All => Ok( self.clone()),
            AxisIndex::At(i) => {
                if *i >= len { return Err( index_error( format!("index {} out of bounds 0..{}", i, len))) }
                Ok( AxisSel { range: start+i..start+i+1, dropped: true } )
            }
            AxisIndex::Slice(r) => {
                if r.start > r.end || r.end > len {
                    return Err( index_error( format!("slice {:?} out of bounds 0..{}", r, len)))
                }
                Ok( AxisSel { range: start+r.start..start+r.end, dropped: false } )
            }
        }
    }
}

/// deferred read handle for one band of a raster source. Nothing is read until the band is loaded.
/// Each load is one windowed read of the source, results are never cached
pub struct LazyBand<R: RasterSource> {
    src: Rc<SharedSource<R>>, // strong ref - the source has to outlive any pending read
    band: usize,
    rows: AxisSel,
    cols: AxisSel,
}

impl <R: RasterSource> Clone for LazyBand<R> {
    fn clone (&self)->Self {
        LazyBand { src: self.src.clone(), band: self.band, rows: self.rows.clone(), cols: self.cols.clone() }
    }
}

impl <R: RasterSource> LazyBand<R> {
    pub fn new (src: Rc<SharedSource<R>>, band: usize)->Self {
        let rows = AxisSel { range: 0..src.height(), dropped: false };
        let cols = AxisSel { range: 0..src.width(), dropped: false };
        LazyBand { src, band, rows, cols }
    }

    #[inline] pub fn band_index (&self)->usize { self.band }

    pub fn dtype (&self)->Result<String> { self.src.dtype( self.band) }

    fn axes (&self)->[&AxisSel;2] { [&self.rows, &self.cols] }

    /// shape of the remaining (not dropped) axes in (row,col) order
    pub fn shape (&self)->Vec<usize> {
        self.axes().iter().filter( |a| !a.dropped).map( |a| a.range.len()).collect()
    }

    #[inline] pub fn ndim (&self)->usize { self.shape().len() }

    /// the pixel window this band would currently read
    pub fn window (&self)->Window {
        Window::new( self.rows.range.clone(), self.cols.range.clone())
    }

    /// compose a new selection on top of the current one, keys apply to the remaining axes in order.
    /// This does not read any data
    pub fn isel (&self, key: &[AxisIndex])->Result<LazyBand<R>> {
        if key.len() > self.ndim() {
            return Err( index_error( format!("too many indices: {} for {} dimensional band", key.len(), self.ndim())))
        }

        let mut rows = self.rows.clone();
        let mut cols = self.cols.clone();
        let mut keys = key.iter();

        for sel in [&mut rows, &mut cols] {
            if !sel.dropped {
                if let Some(k) = keys.next() {
                    *sel = sel.apply( k)?;
                }
            }
        }

        Ok( LazyBand { src: self.src.clone(), band: self.band, rows, cols } )
    }

    /// index and materialize. An empty key on a zero dimensional band yields its scalar value
    pub fn get (&self, key: &[AxisIndex])->Result<Indexed> {
        if key.is_empty() && self.ndim() == 0 {
            return Ok( Indexed::Scalar( self.read_scalar()?))
        }

        let sub = self.isel( key)?;
        if sub.ndim() == 0 {
            Ok( Indexed::Scalar( sub.read_scalar()?))
        } else {
            Ok( Indexed::Array( sub.load()?))
        }
    }

    /// materialize the current selection
    pub fn load (&self)->Result<ArrayD<f64>> {
        let shape = self.shape();
        let window = self.window();

        if window.is_empty() {
            return Ok( ArrayD::zeros( IxDyn(&shape)))
        }

        debug!("reading band {} window {:?}", self.band, window);
        let data = self.src.read( self.band, &window)?;
        Ok( data.into_dyn().into_shape_with_order( IxDyn(&shape))? )
    }

    fn read_scalar (&self)->Result<f64> {
        let data = self.src.read( self.band, &self.window())?;
        data.iter().next().copied().ok_or_else( || index_error("empty zero dimensional read"))
    }
}

/// the single variable of a raster store, representing the whole band stack
pub struct LazyRaster<R: RasterSource> {
    dims: DimensionSet,
    attrs: RasterAttrs,
    bands: Vec<LazyBand<R>>,
}

impl <R: RasterSource> LazyRaster<R> {
    pub(crate) fn new (src: &Rc<SharedSource<R>>, dims: DimensionSet, attrs: RasterAttrs)->Self {
        let bands = src.indexes().into_iter().map( |i| LazyBand::new( src.clone(), i)).collect();
        LazyRaster { dims, attrs, bands }
    }

    pub fn name (&self)->&'static str { RASTER_VAR_NAME }

    pub fn dims (&self)->DimensionSet { self.dims }

    pub fn attrs (&self)->&RasterAttrs { &self.attrs }

    pub fn shape (&self)->Vec<usize> {
        let band_shape = self.bands.first().map( |b| b.shape()).unwrap_or_default();
        if self.dims.has_band() {
            let mut shape = vec![ self.bands.len()];
            shape.extend( band_shape);
            shape
        } else {
            band_shape
        }
    }

    /// get the lazy band for a 1-based band index
    pub fn band (&self, band_index: usize)->Option<&LazyBand<R>> {
        self.bands.iter().find( |b| b.band_index() == band_index)
    }

    pub fn bands (&self)->&[LazyBand<R>] { &self.bands }

    /// read all bands, stacking them along a leading band axis if this is a multi band raster
    pub fn load (&self)->Result<ArrayD<f64>> {
        if self.dims.has_band() {
            let arrays = self.bands.iter().map( |b| b.load()).collect::<Result<Vec<_>>>()?;
            let views: Vec<_> = arrays.iter().map( |a| a.view()).collect();
            Ok( stack( Axis(0), &views)? )
        } else {
            match self.bands.first() {
                Some(band) => band.load(),
                None => Err( index_error("raster has no bands"))
            }
        }
    }
}
