pub mod aggregate;
pub mod contribution;
pub mod payout;
pub mod playoff;
pub mod position;
pub mod selection;
pub mod sort_utils;

pub use aggregate::*;
pub use contribution::*;
pub use payout::*;
pub use playoff::*;
pub use position::*;
pub use selection::*;
pub use sort_utils::*;
