use thiserror::Error;

/// Malformed transform parameters.
///
/// Each variant carries the raw, unparsed input so the HTTP layer can echo it
/// back in a bad-request response.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FormatError {
    /// Resolution is not `W` or `WxH` with positive dimensions
    #[error("'{raw}' is not a valid resolution format")]
    Resolution { raw: String },

    /// Colour is neither a known colour name nor six hex digits
    #[error("'{raw}' is not a valid colour format")]
    Colour { raw: String },

    /// Image type is not one of the supported output formats
    #[error("'{raw}' is not a supported image type")]
    ImageType { raw: String },
}

impl FormatError {
    /// The raw input that failed to parse.
    pub fn raw(&self) -> &str {
        match self {
            FormatError::Resolution { raw }
            | FormatError::Colour { raw }
            | FormatError::ImageType { raw } => raw,
        }
    }
}

/// Errors from encoding, decoding or (de)serializing rasters.
#[derive(Debug, Clone, Error)]
pub enum ImageError {
    /// Raster could not be encoded into the target format
    #[error("Failed to encode image as {format}: {message}")]
    Encode {
        format: &'static str,
        message: String,
    },

    /// Encoded bytes could not be decoded into a raster
    #[error("Failed to decode image: {message}")]
    Decode { message: String },

    /// Serialized image record is truncated or malformed
    #[error("Corrupt image record: {0}")]
    Corrupt(String),
}

/// Errors raised by the image cache or its byte store backend.
#[derive(Debug, Clone, Error)]
pub enum CacheError {
    /// The key/value backend failed
    #[error("Cache backend error: {0}")]
    Backend(String),

    /// A cached value could not be written or read back
    #[error("Cache serialization error: {0}")]
    Serialization(#[from] ImageError),
}

/// Errors raised while loading images from the origin library.
#[derive(Debug, Clone, Error)]
pub enum LoaderError {
    /// Image identifier is empty or whitespace
    #[error("Invalid image identifier: {0:?}")]
    InvalidIdentifier(String),

    /// The configured library directory does not exist
    #[error("Image library folder '{path}' was not found")]
    LibraryNotFound { path: String },

    /// Filesystem error while searching or reading the library
    #[error("I/O error: {0}")]
    Io(String),

    /// A matching file exists but is not a decodable image
    #[error("Image file '{path}' could not be decoded: {source}")]
    Decode {
        path: String,
        #[source]
        source: ImageError,
    },
}

/// Errors raised by the transform engine.
#[derive(Debug, Clone, Error)]
pub enum TransformError {
    /// The input image has no raster payload
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// A transform parameter failed to parse
    #[error(transparent)]
    Format(#[from] FormatError),

    /// Re-encoding the canvas failed
    #[error(transparent)]
    Image(#[from] ImageError),

    /// The blocking transform task did not complete
    #[error("Transform aborted: {0}")]
    Aborted(String),
}

/// The underlying cause of a [`LibraryError::Pipeline`].
#[derive(Debug, Clone, Error)]
pub enum PipelineFailure {
    #[error(transparent)]
    Format(#[from] FormatError),

    #[error(transparent)]
    Cache(#[from] CacheError),

    #[error(transparent)]
    Loader(#[from] LoaderError),

    #[error(transparent)]
    Transform(#[from] TransformError),
}

/// Errors returned by the image library's retrieval pipeline.
///
/// Only [`LibraryError::InvalidArgument`] and [`LibraryError::NotAvailable`]
/// are raised directly; every other failure is wrapped in
/// [`LibraryError::Pipeline`] with its cause attached.
#[derive(Debug, Clone, Error)]
pub enum LibraryError {
    /// Image name is empty or whitespace (maps to HTTP 400)
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// The origin has no image with this name (maps to HTTP 404)
    #[error("Image not available: {image_name}")]
    NotAvailable { image_name: String },

    /// Any other failure while retrieving the image
    #[error("An unexpected error occurred while retrieving the requested image: {source}")]
    Pipeline {
        #[from]
        source: PipelineFailure,
    },
}

impl LibraryError {
    /// Wrap a failure from one of the pipeline's collaborators.
    pub fn pipeline(cause: impl Into<PipelineFailure>) -> Self {
        LibraryError::Pipeline {
            source: cause.into(),
        }
    }

    /// The format error behind a wrapped pipeline failure, if any.
    ///
    /// Format errors can surface from key building or from transform parsing;
    /// both are reported here.
    pub fn format_error(&self) -> Option<&FormatError> {
        match self {
            LibraryError::Pipeline {
                source: PipelineFailure::Format(err),
            }
            | LibraryError::Pipeline {
                source: PipelineFailure::Transform(TransformError::Format(err)),
            } => Some(err),
            _ => None,
        }
    }
}
