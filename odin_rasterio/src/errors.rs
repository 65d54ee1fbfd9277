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
use thiserror::Error;
use gdal::errors::GdalError;

pub type Result<T> = std::result::Result<T, OdinRasterError>;

#[derive(Error,Debug)]
pub enum OdinRasterError {

    #[error("cannot open raster {0}: {1}")]
    OpenError(String, String),

    #[error("cannot open raster {path}: {source}")]
    GdalOpenError { path: String, #[source] source: GdalError },

    #[error("unsupported raster shape: band count {0}")]
    UnsupportedShapeError(isize),

    #[error("unknown variable '{0}', raster variables are all named '{1}'")]
    UnknownVariableError(String, &'static str),

    #[error("index error: {0}")]
    IndexError(String),

    #[error("array shape error {0}")]
    ShapeError( #[from] ndarray::ShapeError),

    // pass through for everything GDAL reports outside of open
    #[error("GDAL error {0}")]
    GdalError( #[from] GdalError),

    #[error("IO error {0}")]
    IOError( #[from] std::io::Error),

    #[error("config RON error {0}")]
    ConfigError( #[from] ron::error::SpannedError),
}

impl OdinRasterError {
    /// true for both flavors of open failures
    pub fn is_open_error (&self)->bool {
        matches!( self, OdinRasterError::OpenError(..) | OdinRasterError::GdalOpenError{..})
    }
}

pub fn open_error<P: ToString, S: ToString> (path: P, msg: S)->OdinRasterError {
    OdinRasterError::OpenError( path.to_string(), msg.to_string())
}

pub fn gdal_open_error<P: ToString> (path: P, source: GdalError)->OdinRasterError {
    OdinRasterError::GdalOpenError { path: path.to_string(), source }
}

pub fn index_error<S: ToString> (msg: S)->OdinRasterError {
    OdinRasterError::IndexError( msg.to_string())
}
