use thiserror::Error;

pub type Result<T> = std::result::Result<T, ApiError>;

#[derive(Error, Debug)]
pub enum ApiError {
    #[error(transparent)]
    Request(#[from] reqwest::Error),
    #[error(transparent)]
    Image(#[from] image::ImageError),
    #[error(transparent)]
    Decode(#[from] base64::DecodeError),
    #[error("service answered {status}: {body}")]
    Status { status: u16, body: String },
    #[error("service answered without an image")]
    EmptyResponse,
}
