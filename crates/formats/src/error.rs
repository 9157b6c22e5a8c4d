use thiserror::Error;

#[derive(Debug, Error)]
pub enum FormatError {
    #[error("csv: {0}")]
    Csv(#[from] csv::Error),

    #[error("geojson: {0}")]
    GeoJson(#[from] geojson::Error),

    #[error("invalid geometry: {0}")]
    Geometry(String),

    #[error("encoding: {0}")]
    Encoding(String),
}
