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

use anyhow::Result;
use clap::Parser;
use tracing_subscriber::EnvFilter;
use odin_rasterio::{attach_latlon_coords, load_env_config, RasterEnvConfig, RasterStore, RASTER_VAR_NAME};

#[derive(Parser, Debug)]
#[command(version, about, long_about = "show_raster - show dimensions, coordinates and attributes of a raster file")]
pub struct Args {
    /// open mode ("r" or "r+")
    #[arg(short,long, default_value = "r")]
    pub mode: String,

    /// RON file with GDAL environment options
    #[arg(short,long)]
    pub env: Option<String>,

    /// also compute latitude/longitude of the grid corners (loads the raster)
    #[arg(short,long)]
    pub latlon: bool,

    /// path to raster file
    pub path: String,
}

fn main()->Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter( EnvFilter::from_default_env())  // use RUST_LOG to set max level
        .init();

    let args = Args::parse();
    let env = if let Some(path) = &args.env { load_env_config( path)? } else { RasterEnvConfig::default() };

    let store = RasterStore::open_with_env( &args.path, &args.mode, env)?;

    println!("dimensions: {}", store.dimensions());
    for (dim,size) in store.get_dimensions() {
        println!("    {}: {}", dim, size);
    }

    println!("coordinates:");
    for (dim,values) in store.coordinates().iter() {
        let n = values.len();
        if n > 0 {
            println!("    {}: [{} .. {}] ({} values)", dim, values[0], values[n-1], n);
        } else {
            println!("    {}: []", dim);
        }
    }

    println!("attributes:");
    for (key,value) in store.attributes().iter() {
        println!("    {}: {}", key, value);
    }

    let var = store.open_variable( RASTER_VAR_NAME)?;
    println!("variable '{}' shape {:?}", var.name(), var.shape());
    for band in var.bands() {
        println!("    band {}: {}", band.band_index(), band.dtype()?);
    }
    drop(var);

    if args.latlon {
        let mut da = store.to_dataarray()?;
        attach_latlon_coords( &mut da)?;

        if let (Some(lat), Some(lon)) = (da.coord("latitude"), da.coord("longitude")) {
            let shape = lat.values.shape().to_vec();
            let (ny,nx) = (shape[0], shape[1]);
            if ny == 0 || nx == 0 { return Ok(()) }
            for (r,c) in [(0,0), (0,nx-1), (ny-1,0), (ny-1,nx-1)] {
                println!("    [{},{}] lat={:.6} lon={:.6}", r, c, lat.values[[r,c]], lon.values[[r,c]]);
            }
        } else {
            println!("no crs, no lat/lon coordinates");
        }
    }

    store.close()?;
    Ok(())
}
