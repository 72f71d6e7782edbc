//! Request extractors that reject with the JSON failure envelope.

mod path_id;
mod validated;

pub use path_id::{PathId, PathIds};
pub use validated::{ValidatedJson, ValidatedQuery};
