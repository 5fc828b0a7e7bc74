use thiserror::Error;

pub type Result<T> = std::result::Result<T, WeaveError>;

#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum WeaveError {
    /// A line source or a set of alternatives had no candidate left once
    /// zero-weighted entries were dropped.
    #[error("nothing to choose from")]
    EmptyInput,
    #[error("every provider has a weight of zero")]
    NoProviderAvailable,
    #[error("no provider left with an available resource")]
    AllProvidersExhausted,
}
