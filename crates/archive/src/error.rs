use thiserror::Error;

pub type Result<T> = std::result::Result<T, DecodeError>;

#[derive(Error, Debug)]
pub enum DecodeError {
    #[error("Envelope is missing field '{0}'")]
    MissingField(&'static str),

    #[error("Base64 error: {0}")]
    Base64(#[from] base64::DecodeError),

    #[error("Archive error: {0}")]
    Archive(#[from] zip::result::ZipError),
}
