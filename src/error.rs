use thiserror::Error;

#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum Error {
    #[error("invalid argument: {0}")]
    InvalidArgument(&'static str),
    #[error("state buffer has not absorbed a full 624-word cycle yet")]
    NotReady,
    #[error("observed word {observed:#010x} does not match the predicted {predicted:#010x}")]
    ConsistencyMismatch { observed: u32, predicted: u32 },
    #[error("empty range")]
    EmptyRange,
}
