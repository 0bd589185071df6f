use thiserror::Error;

#[derive(Error, Debug)]
pub enum WavError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Unsupported format: {0}")]
    UnsupportedFormat(String),

    #[error("Malformed WAV file: {0}")]
    Malformed(String),
}

pub type WavResult<T> = Result<T, WavError>;

impl From<hound::Error> for WavError {
    fn from(err: hound::Error) -> Self {
        match err {
            hound::Error::IoError(err) => WavError::Io(err),
            hound::Error::Unsupported | hound::Error::InvalidSampleFormat => {
                WavError::UnsupportedFormat(err.to_string())
            }
            _ => WavError::Malformed(err.to_string()),
        }
    }
}
