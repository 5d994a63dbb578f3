use thiserror::Error;

/// Unified result type for tile layout operations.
pub type Result<T> = std::result::Result<T, TilingError>;

/// Errors surfaced by the catalog, the engine and the request layer.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum TilingError {
    #[error("area dimensions must be positive numbers (got {width} x {height})")]
    InvalidInput { width: f64, height: f64 },
    #[error("invalid tile size `{0}`")]
    InvalidSizeKey(String),
    #[error("layout would need {needed} tiles, the limit is {limit}")]
    DegenerateGeometry { needed: u64, limit: u64 },
    #[error("tile size `{0}` is listed more than once")]
    DuplicateSize(String),
    #[error("tile size `{key}` must have positive dimensions (got {width} x {height})")]
    InvalidTileSize { key: String, width: f64, height: f64 },
    #[error("malformed catalog: {0}")]
    MalformedCatalog(String),
    #[error("malformed request: {0}")]
    InvalidRequest(String),
}
