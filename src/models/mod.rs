pub mod common;
pub mod data_uri;
pub mod image;
pub mod prompt;
pub mod request;

pub use common::*;
pub use data_uri::*;
pub use image::*;
pub use prompt::*;
pub use request::*;
