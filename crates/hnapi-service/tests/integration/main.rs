// See <https://matklad.github.io/2021/02/27/delete-cargo-integration-tests.html>

pub mod api;
pub mod http_source;
pub mod utils;

pub use utils::*;
