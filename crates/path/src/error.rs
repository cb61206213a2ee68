use thiserror::Error;

/// Errors reported when reading host paths.
///
/// None of them are fatal: the host's memory is never touched past the point where
/// the error is detected and the caller decides what to do next.
#[non_exhaustive]
#[derive(Error, Clone, Debug, PartialEq, Eq)]
pub enum Error {
    /// The host version is not one the crate knows the path layout of.
    #[error("Unsupported host path layout (version: {version}).")]
    UnsupportedLayout { version: String },
    /// The path handle is null or points to something that can't be read as a path.
    #[error("Invalid path handle.")]
    InvalidHandle,
    /// The iterator handle refers to an iterator that was destroyed.
    #[error("The path iterator was used after being destroyed.")]
    UseAfterFree,
    #[error("The points buffer is too small: {required} floats required, got {actual}.")]
    BufferTooSmall { required: usize, actual: usize },
}

pub type Result<T> = core::result::Result<T, Error>;
