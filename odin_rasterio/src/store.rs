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

use std::{collections::BTreeMap, path::Path, rc::Rc};
use tracing::{debug, warn};

use crate::array::DataArray;
use crate::attrs::RasterAttrs;
use crate::coords::{derive_coordinates, CoordinateMap, DimensionSet};
use crate::env::RasterEnvConfig;
use crate::errors::{OdinRasterError, Result};
use crate::lazy::LazyRaster;
use crate::source::{GdalRaster, RasterSource, SharedSource};
use crate::RASTER_VAR_NAME;

/// read-only labeled array view of a raster source.
/// Dimensions, coordinates and attributes are derived once when the store is created
pub struct RasterStore<R: RasterSource> {
    src: Rc<SharedSource<R>>,
    dims: DimensionSet,
    coords: CoordinateMap,
    attrs: RasterAttrs,
}

impl RasterStore<GdalRaster> {
    /// open the raster at `path` with mode "r" (default) or "r+"
    pub fn open<P: AsRef<Path>> (path: P, mode: &str)->Result<Self> {
        Self::open_with_env( path, mode, RasterEnvConfig::default())
    }

    pub fn open_with_env<P: AsRef<Path>> (path: P, mode: &str, env: RasterEnvConfig)->Result<Self> {
        let src = GdalRaster::open_with_mode( path, mode, env)?;
        RasterStore::from_source( src)
    }
}

impl <R: RasterSource> RasterStore<R> {
    pub fn from_source (src: R)->Result<Self> {
        let dims = DimensionSet::from_band_count( src.count())?;
        let coords = derive_coordinates( &src, dims)?;
        let attrs = RasterAttrs::from_source( &src);
        debug!("raster store dims={} size={}x{} attrs={:?}", dims, src.width(), src.height(), attrs.keys());

        Ok( RasterStore { src: Rc::new( SharedSource::new(src)), dims, coords, attrs } )
    }

    pub fn dimensions (&self)->DimensionSet { self.dims }

    pub fn coordinates (&self)->&CoordinateMap { &self.coords }

    pub fn attributes (&self)->&RasterAttrs { &self.attrs }

    pub fn source (&self)->&R { &self.src }

    /// get a lazily indexed handle for the (only) raster variable. Does not read pixel data
    pub fn open_variable (&self, name: &str)->Result<LazyRaster<R>> {
        if name != RASTER_VAR_NAME {
            return Err( OdinRasterError::UnknownVariableError( name.to_string(), RASTER_VAR_NAME))
        }
        Ok( LazyRaster::new( &self.src, self.dims, self.attrs.clone()) )
    }

    pub fn get_variables (&self)->Vec<(&'static str,LazyRaster<R>)> {
        vec![ (RASTER_VAR_NAME, LazyRaster::new( &self.src, self.dims, self.attrs.clone())) ]
    }

    pub fn get_attrs (&self)->&RasterAttrs { &self.attrs }

    /// dimension name -> size
    pub fn get_dimensions (&self)->BTreeMap<&'static str,usize> {
        self.dims.names().iter().map( |&d| {
            let n = self.coords.get( d).map( |c| c.len()).unwrap_or(0);
            (d, n)
        }).collect()
    }

    /// load the raster variable with its coordinates and attributes
    pub fn to_dataarray (&self)->Result<DataArray> {
        let var = self.open_variable( RASTER_VAR_NAME)?;
        let data = var.load()?;
        DataArray::new( RASTER_VAR_NAME, self.dims.names(), data, &self.coords, self.attrs.clone())
    }

    /// release the source. If lazy bands still hold it, it is closed once the last of them is dropped
    pub fn close (self)->Result<()> {
        match Rc::try_unwrap( self.src) {
            Ok(shared) => shared.close(),
            Err(src) => {
                warn!("deferring raster close, {} lazy band references outstanding", Rc::strong_count(&src) - 1);
                Ok(())
            }
        }
    }
}
