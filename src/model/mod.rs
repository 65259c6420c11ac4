pub mod output;
pub mod position;
pub mod snapshot;

pub use output::*;
pub use position::*;
pub use snapshot::*;
