//! PyPI registry protocol: project index fetching and caching, wheel
//! filename tag parsing, wheel METADATA extraction, and artifact download.

pub mod download;
pub mod registry;
pub mod release;
pub mod wheel;
