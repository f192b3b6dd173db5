use std::{
    ffi::{OsStr, OsString},
    path::Path,
};

use log::{debug, warn};

use super::{BuildEngine, BuildOutput};
use crate::{process, request::BuildRequest, temp_path, Result};

pub const DEFAULT_PROGRAM: &str = "docker";

/// Builds images by invoking the `docker` command line.
#[derive(Debug, Clone)]
pub struct DockerCli {
    program: OsString,
}

impl Default for DockerCli {
    fn default() -> Self {
        Self::with_program(DEFAULT_PROGRAM)
    }
}

impl DockerCli {
    pub fn new() -> Self {
        Self::default()
    }

    /// Use a different docker compatible binary, for example `podman`.
    pub fn with_program(program: impl Into<OsString>) -> Self {
        Self {
            program: program.into(),
        }
    }

    pub fn program(&self) -> &OsStr {
        &self.program
    }

    /// Renders the `docker build` invocation for `request`. The id of the built image will be written to `iid_file`.
    pub(crate) fn build_command(&self, request: &BuildRequest, iid_file: &Path) -> process::Command {
        let mut command = process::command!(&self.program, "build", request.context_dir());

        if let Some(dockerfile) = request.dockerfile_path() {
            command = process::args!(command, "--file", dockerfile.as_os_str());
        }
        for tag in &request.tags {
            command = process::args!(command, "--tag", tag);
        }
        for (key, value) in &request.build_args {
            command = process::args!(command, "--build-arg", format!("{key}={value}"));
        }
        if let Some(target) = &request.target {
            command = process::args!(command, "--target", target);
        }
        for (key, value) in &request.labels {
            command = process::args!(command, "--label", format!("{key}={value}"));
        }
        if request.pull {
            command = command.arg("--pull");
        }
        if request.no_cache {
            command = command.arg("--no-cache");
        }
        if let Some(platform) = &request.platform {
            command = process::args!(command, "--platform", platform);
        }

        process::args!(command, "--iidfile", iid_file)
    }

    fn build_and_read_image_id(&self, request: &BuildRequest, iid_file: &Path) -> Result<String> {
        self.build_command(request, iid_file).status()?;
        read_image_id(iid_file)
    }
}

fn read_image_id(iid_file: &Path) -> Result<String> {
    let contents = std::fs::read_to_string(iid_file)
        .map_err(|error| format!("failed to read image id file {iid_file:?}: {error}"))?;
    let image_id = contents.trim();
    if image_id.is_empty() {
        return Err(format!("image id file {iid_file:?} is empty").into());
    }
    Ok(image_id.to_owned())
}

impl BuildEngine for DockerCli {
    fn build(&self, request: &BuildRequest) -> Result<BuildOutput> {
        let iid_file = temp_path::tmp_path("imagefile-", ".iid");

        let result = self.build_and_read_image_id(request, &iid_file);

        if iid_file.exists() {
            if let Err(error) = std::fs::remove_file(&iid_file) {
                warn!("failed to remove image id file {iid_file:?}: {error}");
            }
        }

        let image_id = result?;
        debug!("image_id: {image_id}");
        Ok(BuildOutput { image_id })
    }

    fn pull(&self, image: &str) -> Result<()> {
        process::command!(&self.program, "pull", image).output()?;
        Ok(())
    }

    fn remove_image(&self, image: &str) -> Result<()> {
        process::command!(&self.program, "image", "rm", "--force", image).output()?;
        Ok(())
    }
}
