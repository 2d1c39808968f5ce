use derive_more::{Display, Error};
use std::path::PathBuf;

pub type Error = exn::Exn<ErrorKind>;
pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Display, Error)]
pub enum ErrorKind {
    #[display("unable to load configuration")]
    Config,
    #[display("unable to load pack definitions")]
    Packs,
    #[display("unable to scan asset tree")]
    Scan,
    /// Problems that are only warnings outside of `--strict`.
    #[display("strict mode: {_0}")]
    Strict(#[error(not(source))] String),
    #[display("unable to render artifact")]
    Render,
    #[display("unable to write artifact: {}", _0.display())]
    Write(#[error(not(source))] PathBuf),
    #[display("{_0} of {_1} manifest assets could not be cached")]
    Verify(#[error(not(source))] usize, #[error(not(source))] usize),
}
