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
use gdal::GeoTransform;

use crate::source::RasterSource;

pub const ATTR_CRS: &str = "crs";
pub const ATTR_AFFINE: &str = "affine";
pub const ATTR_PROJ: &str = "proj";

/// the recognized georeferencing attributes of a raster. Each one is optional
#[derive(Debug,Clone,Default,PartialEq)]
pub struct RasterAttrs {
    /// coordinate reference system identifier (e.g. "EPSG:32611" or a PROJ string)
    pub crs: Option<String>,

    /// GDAL ordered geo transform `[left, res_x, row_rot, top, col_rot, -res_y]`
    pub affine: Option<GeoTransform>,

    /// projection definition (WKT)
    pub proj: Option<String>,
}

/// value of a single attribute entry
#[derive(Debug,Clone,Copy,PartialEq)]
pub enum AttrValue<'a> {
    Text(&'a str),
    Affine(&'a GeoTransform),
}

impl fmt::Display for AttrValue<'_> {
    fn fmt (&self, f: &mut fmt::Formatter<'_>)->fmt::Result {
        match self {
            AttrValue::Text(s) => write!( f, "{}", s),
            AttrValue::Affine(a) => write!( f, "[{}, {}, {}, {}, {}, {}]", a[0], a[1], a[2], a[3], a[4], a[5]),
        }
    }
}

impl RasterAttrs {
    /// collect whatever the source provides, missing attributes are just omitted
    pub fn from_source<R: RasterSource> (src: &R)->Self {
        RasterAttrs {
            crs: src.crs(),
            affine: src.affine(),
            proj: src.proj(),
        }
    }

    pub fn get (&self, key: &str)->Option<AttrValue<'_>> {
        match key {
            ATTR_CRS => self.crs.as_deref().map( AttrValue::Text),
            ATTR_AFFINE => self.affine.as_ref().map( AttrValue::Affine),
            ATTR_PROJ => self.proj.as_deref().map( AttrValue::Text),
            _ => None
        }
    }

    pub fn contains (&self, key: &str)->bool { self.get(key).is_some() }

    /// the names of all present attributes, in fixed order
    pub fn keys (&self)->Vec<&'static str> {
        [ATTR_CRS, ATTR_AFFINE, ATTR_PROJ].into_iter().filter( |k| self.contains(k)).collect()
    }

    pub fn iter (&self)->impl Iterator<Item=(&'static str,AttrValue<'_>)> {
        [ATTR_CRS, ATTR_AFFINE, ATTR_PROJ].into_iter().filter_map( |k| self.get(k).map( |v| (k,v)))
    }

    pub fn is_empty (&self)->bool {
        self.crs.is_none() && self.affine.is_none() && self.proj.is_none()
    }
}
