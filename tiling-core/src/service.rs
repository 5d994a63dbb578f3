//! Request/response contract spoken by front-ends.
//!
//! The browser front-end and the CLI both go through [`TileService`], which
//! rejects bad input before the engine runs. [`calculate_json`] covers callers
//! that only hold the raw JSON body.

use serde::{Deserialize, Serialize};

use crate::catalog::Catalog;
use crate::engine::{AreaSpec, LayoutEngine, LayoutResult};
use crate::error::{Result, TilingError};

/// Body of a `calculate` call: area in centimeters plus a catalog key.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CalculateRequest {
    pub area_width: f64,
    pub area_height: f64,
    pub tile_size: String,
}

impl CalculateRequest {
    pub fn new(area_width: f64, area_height: f64, tile_size: impl Into<String>) -> Self {
        CalculateRequest {
            area_width,
            area_height,
            tile_size: tile_size.into(),
        }
    }

    pub fn area(&self) -> AreaSpec {
        AreaSpec::new(self.area_width, self.area_height)
    }

    pub fn validate(&self) -> Result<()> {
        self.area().validate()
    }
}

#[derive(Clone, Copy, Debug)]
pub struct TileService<'a> {
    engine: LayoutEngine<'a>,
}

impl<'a> TileService<'a> {
    pub fn new(catalog: &'a Catalog) -> Self {
        TileService {
            engine: LayoutEngine::new(catalog),
        }
    }

    pub fn calculate(&self, request: &CalculateRequest) -> Result<LayoutResult> {
        request.validate()?;
        self.engine.calculate(request.area(), &request.tile_size)
    }

    pub fn list_sizes(&self) -> Vec<String> {
        self.engine.catalog().list_keys()
    }
}

/// Parse a JSON `calculate` body, run it, and serialize the layout.
pub fn calculate_json(catalog: &Catalog, body: &str) -> Result<String> {
    let request: CalculateRequest =
        serde_json::from_str(body).map_err(|e| TilingError::InvalidRequest(e.to_string()))?;
    let layout = TileService::new(catalog).calculate(&request)?;
    serde_json::to_string(&layout).map_err(|e| TilingError::InvalidRequest(e.to_string()))
}
