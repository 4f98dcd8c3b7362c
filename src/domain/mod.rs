mod offer;
mod destination;

pub use offer::*;
pub use destination::*;

#[derive(Debug, derive_more::Display, derive_more::Error)]
pub struct DomainAssertionError(#[error(not(source))] &'static str);
