//! Lazy, composable collections over remote entities.
//!
//! An [`Element`] is a single value that is fetched on demand, and a [`List`] is a paginated
//! sequence of elements. Neither does any work when constructed; transformations compose the
//! deferred steps instead of running them. Lists resolve the values of a page through
//! [`fetch_batched`], which bounds the number of concurrent requests.

mod batch;
mod element;
mod list;
pub mod pager;

pub use batch::fetch_batched;
pub use element::Element;
pub use list::{DEFAULT_MAX_CONCURRENCY, DEFAULT_PAGE_SIZE, List, ListSettings, Page};
