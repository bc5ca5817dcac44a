pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum Error {
    #[error(transparent)]
    Graph(#[from] crate::graphlib::Error),

    #[error("invalid layout option `{name}`: {value} (expected a finite, non-negative number)")]
    InvalidOption { name: &'static str, value: f64 },
}
