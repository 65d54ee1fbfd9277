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

use std::collections::BTreeMap;
use ndarray::{Array1, ArrayD, ArrayView1};

use crate::attrs::RasterAttrs;
use crate::coords::CoordinateMap;
use crate::errors::{index_error, Result};

/// a named coordinate array over one or more dimensions
#[derive(Debug,Clone,PartialEq)]
pub struct Coordinate {
    pub dims: Vec<String>,
    pub values: ArrayD<f64>,
    pub attrs: BTreeMap<String,String>,
}

impl Coordinate {
    pub fn new_1d (dim: &str, values: Array1<f64>)->Self {
        Coordinate { dims: vec![dim.to_string()], values: values.into_dyn(), attrs: BTreeMap::new() }
    }

    pub fn with_attr (mut self, key: &str, value: &str)->Self {
        self.attrs.insert( key.to_string(), value.to_string());
        self
    }
}

/// an eagerly loaded labeled array
#[derive(Debug,Clone,PartialEq)]
pub struct DataArray {
    pub name: String,
    pub dims: Vec<String>,
    pub data: ArrayD<f64>,
    pub coords: BTreeMap<String,Coordinate>,
    pub attrs: RasterAttrs,
}

impl DataArray {
    /// check that data rank matches dims and each 1D dimension coordinate matches its axis length
    pub fn new (name: &str, dims: &[&str], data: ArrayD<f64>, coords: &CoordinateMap, attrs: RasterAttrs)->Result<Self> {
        if dims.len() != data.ndim() {
            return Err( index_error( format!("{} dims for {} dimensional data", dims.len(), data.ndim())))
        }

        let mut da = DataArray {
            name: name.to_string(),
            dims: dims.iter().map( |d| d.to_string()).collect(),
            data,
            coords: BTreeMap::new(),
            attrs
        };

        for (dim,values) in coords.iter() {
            da.set_coord( dim, Coordinate::new_1d( dim, values.clone()))?;
        }
        Ok(da)
    }

    pub fn dim_len (&self, dim: &str)->Option<usize> {
        self.dims.iter().position( |d| d == dim).map( |i| self.data.shape()[i])
    }

    pub fn coord (&self, name: &str)->Option<&Coordinate> { self.coords.get( name) }

    /// 1D values of a dimension coordinate
    pub fn coord_values_1d (&self, name: &str)->Option<ArrayView1<'_,f64>> {
        self.coords.get( name).and_then( |c| c.values.view().into_dimensionality().ok())
    }

    /// add or replace a coordinate. Its dims have to exist and match the data shape
    pub fn set_coord (&mut self, name: &str, coord: Coordinate)->Result<()> {
        if coord.dims.len() != coord.values.ndim() {
            return Err( index_error( format!("coordinate {} has {} dims for {} dimensional values", name, coord.dims.len(), coord.values.ndim())))
        }
        for (i,dim) in coord.dims.iter().enumerate() {
            match self.dim_len( dim) {
                Some(n) if n == coord.values.shape()[i] => {}
                Some(n) => return Err( index_error( format!("coordinate {} size {} does not match dim {} size {}", name, coord.values.shape()[i], dim, n))),
                None => return Err( index_error( format!("coordinate {} uses unknown dim {}", name, dim)))
            }
        }
        self.coords.insert( name.to_string(), coord);
        Ok(())
    }
}
