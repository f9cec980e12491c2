pub mod catalog;
pub mod error;
pub mod http;
pub mod pages;

pub use catalog::Catalog;
pub use error::PlatformError;
pub use error::Result;
