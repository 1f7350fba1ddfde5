//! Generator for `test_multi_size.pdf`, a five-page PDF whose pages
//! alternate between A4 portrait, A4 landscape, Letter and A3, each
//! labelled with its index and size. Page-size handling code can be
//! pointed at the file to check it reports every page correctly.

pub mod config;
pub mod generator;
pub mod pages;

pub use config::FixtureConfig;
pub use generator::{generate, generate_with, write_fixture, FixtureError};
pub use pages::{multi_size_pages, PageSpec};
