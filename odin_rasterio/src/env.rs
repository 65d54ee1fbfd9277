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

//! scoped GDAL execution context for raster open/read calls

use std::{fs, path::Path};
use serde::{Serialize,Deserialize};
use tracing::debug;
use gdal::config::{get_config_option, set_config_option, clear_config_option};

use crate::errors::Result;

/// GDAL configuration that is established around each delegated open/read call
#[derive(Debug,Clone,Serialize,Deserialize,PartialEq)]
#[serde(default)]
pub struct RasterEnvConfig {
    /// (key,value) GDAL config options, e.g. ("GDAL_DISABLE_READDIR_ON_OPEN","EMPTY_DIR")
    pub options: Vec<(String,String)>,

    /// suppress GDAL console error/warning output while in scope
    pub quiet: bool,
}

impl Default for RasterEnvConfig {
    fn default()->Self {
        RasterEnvConfig { options: Vec::new(), quiet: true }
    }
}

impl RasterEnvConfig {
    pub fn with_option (mut self, key: &str, value: &str)->Self {
        self.options.push( (key.to_string(), value.to_string()));
        self
    }
}

pub fn load_env_config<P: AsRef<Path>> (path: P)->Result<RasterEnvConfig> {
    let data = fs::read_to_string( path.as_ref())?;
    Ok( ron::from_str( &data)? )
}

/// RAII guard for a GDAL execution context. Config options are set on `enter` and the previous
/// values are restored when the guard is dropped, which also happens if the guarded call errors or panics
pub struct RasterEnv {
    saved: Vec<(String,Option<String>)>,
    quiet: bool,
}

impl RasterEnv {
    pub fn enter (config: &RasterEnvConfig)->Result<RasterEnv> {
        let mut env = RasterEnv { saved: Vec::with_capacity( config.options.len()), quiet: false };

        for (key,value) in &config.options {
            let prev = get_config_option( key, "")?;
            // record before setting so that a partially entered env still gets restored
            env.saved.push( (key.clone(), if prev.is_empty() { None } else { Some(prev) }));
            set_config_option( key, value)?;
        }

        if config.quiet {
            unsafe { gdal_sys::CPLPushErrorHandler( Some(gdal_sys::CPLQuietErrorHandler)); }
            env.quiet = true;
        }

        Ok(env)
    }
}

impl Drop for RasterEnv {
    fn drop (&mut self) {
        if self.quiet {
            unsafe { gdal_sys::CPLPopErrorHandler(); }
        }

        for (key,prev) in self.saved.drain(..).rev() {
            let res = match prev {
                Some(value) => set_config_option( &key, &value),
                None => clear_config_option( &key)
            };
            if let Err(e) = res {
                debug!("failed to restore GDAL config option {}: {}", key, e);
            }
        }
    }
}

/// run the provided closure inside of a scoped GDAL execution context
pub fn with_raster_env<T,F> (config: &RasterEnvConfig, f: F)->Result<T> where F: FnOnce()->Result<T> {
    let _env = RasterEnv::enter( config)?;
    f()
}
