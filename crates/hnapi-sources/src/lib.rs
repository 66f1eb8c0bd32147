//! Wire-level definitions of the Hacker News dataset.
//!
//! Includes the raw item and user records as served by the remote API, the strict coercion
//! rules applied while deserializing them, and the names of the remote id lists.

#![warn(missing_docs)]

mod de;
mod lists;
mod records;
mod types;

pub use lists::*;
pub use records::*;
pub use types::*;
