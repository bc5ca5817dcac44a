pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum Error {
    #[error("cannot nest `{child}` under `{parent}`: graph was not created as compound")]
    NotCompound { child: String, parent: String },

    #[error("cannot nest `{child}` under `{parent}`: `{parent}` is `{child}` or one of its descendants")]
    NestingCycle { child: String, parent: String },
}
