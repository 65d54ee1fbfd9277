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

//! labeled array (named dims, coordinates, attributes) access to GDAL rasters

pub mod errors;
pub mod env;
pub mod source;
pub mod coords;
pub mod attrs;
pub mod lazy;
pub mod array;
pub mod store;
pub mod proj;

use std::path::Path;

// we re-export these so that other crates don't need a direct gdal dependency
pub use gdal::{self, Dataset, GeoTransform, errors::GdalError};

pub use errors::{OdinRasterError, Result};
pub use env::{RasterEnv, RasterEnvConfig, load_env_config, with_raster_env};
pub use source::{RasterSource, SharedSource, GdalRaster, MemRaster, MemStats, OpenMode, RasterBounds, Window};
pub use coords::{DimensionSet, CoordinateMap, CoordRange};
pub use attrs::{RasterAttrs, AttrValue};
pub use lazy::{LazyBand, LazyRaster, AxisIndex, Indexed};
pub use array::{DataArray, Coordinate};
pub use store::RasterStore;
pub use proj::{Proj, PointTransform, GdalPointTransform, reproject_points, attach_latlon_coords};

/// the name of the only variable of a raster store, which represents the whole band stack
pub const RASTER_VAR_NAME: &str = "raster";

/// open a GDAL raster as RasterStore. `mode` is "r" or "r+"
pub fn open<P: AsRef<Path>> (path: P, mode: &str)->Result<RasterStore<GdalRaster>> {
    RasterStore::open( path, mode)
}

/// open, load and close a raster, optionally adding latitude/longitude coordinates
pub fn open_dataarray<P: AsRef<Path>> (path: P, with_latlon: bool)->Result<DataArray> {
    let store = RasterStore::open( path, "r")?;
    let mut da = store.to_dataarray()?;
    store.close()?;

    if with_latlon {
        attach_latlon_coords( &mut da)?;
    }
    Ok(da)
}
