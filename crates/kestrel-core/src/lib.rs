pub mod analysis;
pub mod cache;
pub mod error;
pub mod export;
pub mod format;
pub mod history;
pub mod psi;
pub mod session;
pub mod target;

pub use error::{Error, Result};
