use thiserror::Error;

/// Errors raised while building or loading terrain.
#[derive(Debug, Error, PartialEq)]
pub enum TerrainError {
    #[error("grid data has {actual} cells but dimensions {width}x{height} need {expected}")]
    ShapeMismatch {
        width: u32,
        height: u32,
        expected: usize,
        actual: usize,
    },
    #[error("terrain dimensions must be non-zero (got {width}x{height})")]
    EmptyDimensions { width: u32, height: u32 },
    #[error("heightmap is not valid UTF-8")]
    InvalidUtf8,
    #[error("unsupported heightmap magic {0:?}, expected P2")]
    BadMagic(String),
    #[error("heightmap header is missing the {0} field")]
    MissingHeader(&'static str),
    #[error("invalid number {value:?} in heightmap {field}")]
    InvalidNumber { field: &'static str, value: String },
    #[error("heightmap maxval must be positive")]
    ZeroMaxval,
    #[error("sample {sample} exceeds maxval {maxval}")]
    SampleOutOfRange { sample: u32, maxval: u32 },
    #[error("heightmap has {actual} samples, expected {expected}")]
    SampleCount { expected: usize, actual: usize },
    #[error("heightmap of {width}x{height} cells is too large")]
    TooLarge { width: u32, height: u32 },
}

/// Errors raised while loading a scenario library description.
#[derive(Debug, Error)]
pub enum ScenarioError {
    #[error("invalid scenario XML: {0}")]
    Xml(#[from] roxmltree::Error),
    #[error("<scenario> is missing the name attribute")]
    MissingName,
    #[error("scenario {0:?} does not describe a terrain")]
    MissingTerrain(String),
    #[error("scenario {scenario:?} has unknown terrain kind <{kind}>")]
    UnknownTerrain { scenario: String, kind: String },
    #[error("scenario {scenario:?}: attribute {attribute} is missing or invalid")]
    InvalidAttribute { scenario: String, attribute: String },
    #[error("scenario library does not define any scenarios")]
    Empty,
}

/// Errors raised while decoding a host input event.
#[derive(Debug, Error, PartialEq)]
pub enum EventError {
    #[error("unknown event type {0:?}")]
    UnknownKind(String),
    #[error("{kind} event is missing the {field} field")]
    MissingField { kind: String, field: &'static str },
    #[error("{kind} event has a non-finite {field} field")]
    NonFinite { kind: String, field: &'static str },
    #[error("unrecognised key {0:?}")]
    UnknownKey(String),
}
