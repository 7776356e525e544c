mod reader;
mod types;

pub use reader::PayloadReader;
pub use types::*;
