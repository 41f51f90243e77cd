use thiserror::Error;

use crate::config::ConfigError;

#[derive(Debug, Error)]
pub enum ModelError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error("{rows} attribute rows but {geometries} geometries")]
    GeometryMismatch { rows: usize, geometries: usize },
    #[error(transparent)]
    Shapefile(#[from] streets_shp::ShpError),
    #[error(transparent)]
    Polars(#[from] polars::prelude::PolarsError),
}

pub type Result<T> = std::result::Result<T, ModelError>;
