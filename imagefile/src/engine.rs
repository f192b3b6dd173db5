mod docker;

pub use docker::*;

use crate::{request::BuildRequest, Result};

#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
pub struct BuildOutput {
    pub image_id: String,
}

/// Executes configured build requests and manages the resulting images.
pub trait BuildEngine {
    fn build(&self, request: &BuildRequest) -> Result<BuildOutput>;

    fn pull(&self, image: &str) -> Result<()>;

    fn remove_image(&self, image: &str) -> Result<()>;
}

impl<T: BuildEngine + ?Sized> BuildEngine for &T {
    fn build(&self, request: &BuildRequest) -> Result<BuildOutput> {
        (**self).build(request)
    }

    fn pull(&self, image: &str) -> Result<()> {
        (**self).pull(image)
    }

    fn remove_image(&self, image: &str) -> Result<()> {
        (**self).remove_image(image)
    }
}
