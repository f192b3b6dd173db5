pub mod base_directory;
pub mod configure;
pub mod dockerfile;
pub mod engine;
pub mod image;
pub(crate) mod process;
pub mod request;
pub(crate) mod temp_path;

pub mod cli;

pub use base_directory::BaseDirectoryImage;
pub use configure::Configure;
pub use engine::{BuildEngine, BuildOutput};
pub use image::{BuiltImage, ImageFromDockerfile};
pub use request::BuildRequest;

pub type Result<T, E = Box<dyn std::error::Error + Send + Sync + 'static>> =
    std::result::Result<T, E>;
