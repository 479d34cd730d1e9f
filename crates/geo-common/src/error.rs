//! Error types for the terrain scene pipeline.

use thiserror::Error;

/// Result type alias using GeoError.
pub type GeoResult<T> = Result<T, GeoError>;

/// Primary error type for coordinate normalization and mesh generation.
#[derive(Debug, Error)]
pub enum GeoError {
    // === Construction Errors ===
    #[error("Invalid bounds in {crs}: {reason}")]
    InvalidBounds { crs: String, reason: String },

    #[error("Unknown CRS: {0}")]
    UnknownCrs(String),

    #[error("Empty input: {0}")]
    EmptyInput(String),

    // === Source Errors ===
    #[error("Failed to decode raster: {0}")]
    Decode(String),

    #[error("No CRS metadata embedded in {0} and no fallback CRS supplied")]
    MissingCrs(String),

    #[error("Failed to fetch {url}: {message}")]
    Fetch { url: String, message: String },

    // === Geometry Errors ===
    #[error("Unsupported geometry type: {0}")]
    UnsupportedGeometry(String),

    #[error("Projection error: {0}")]
    Projection(String),

    // === Configuration Errors ===
    #[error("Invalid configuration: {0}")]
    Config(String),
}

impl GeoError {
    /// Create an InvalidBounds error.
    pub fn invalid_bounds(crs: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidBounds {
            crs: crs.into(),
            reason: reason.into(),
        }
    }

    /// Create a Decode error.
    pub fn decode(msg: impl Into<String>) -> Self {
        Self::Decode(msg.into())
    }

    /// Create a Fetch error.
    pub fn fetch(url: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Fetch {
            url: url.into(),
            message: message.into(),
        }
    }

    /// Create a Projection error.
    pub fn projection(msg: impl Into<String>) -> Self {
        Self::Projection(msg.into())
    }

    /// Whether this error only removes a single layer from the scene.
    ///
    /// Scene-fatal errors (empty unification, bad configuration, unknown
    /// target CRS) return `false`.
    pub fn is_layer_local(&self) -> bool {
        matches!(
            self,
            GeoError::InvalidBounds { .. }
                | GeoError::Decode(_)
                | GeoError::MissingCrs(_)
                | GeoError::Fetch { .. }
                | GeoError::UnsupportedGeometry(_)
        )
    }

    /// Short machine-readable code, used in scene summaries.
    pub fn code(&self) -> &'static str {
        match self {
            GeoError::InvalidBounds { .. } => "InvalidBounds",
            GeoError::UnknownCrs(_) => "UnknownCrs",
            GeoError::EmptyInput(_) => "EmptyInput",
            GeoError::Decode(_) => "Decode",
            GeoError::MissingCrs(_) => "MissingCrs",
            GeoError::Fetch { .. } => "Fetch",
            GeoError::UnsupportedGeometry(_) => "UnsupportedGeometry",
            GeoError::Projection(_) => "Projection",
            GeoError::Config(_) => "Config",
        }
    }
}

impl From<std::io::Error> for GeoError {
    fn from(err: std::io::Error) -> Self {
        GeoError::Fetch {
            url: String::from("<io>"),
            message: err.to_string(),
        }
    }
}

impl From<serde_json::Error> for GeoError {
    fn from(err: serde_json::Error) -> Self {
        GeoError::Decode(format!("JSON error: {}", err))
    }
}
