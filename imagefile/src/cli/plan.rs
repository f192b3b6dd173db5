use std::path::Path;

use itertools::Itertools;

use super::common::ImageArgs;
use crate::{engine::DockerCli, BuildRequest, Configure, Result};

fn request(args: &ImageArgs) -> BuildRequest {
    let mut request = BuildRequest::new();
    args.image(false).configure(&mut request);
    request
}

fn render_command(docker: &DockerCli, request: &BuildRequest) -> String {
    let command = docker.build_command(request, Path::new("<iidfile>"));
    std::iter::once(command.program().to_owned())
        .chain(command.arguments())
        .map(|arg| arg.to_string_lossy().into_owned())
        .join(" ")
}

pub fn plan(docker: &DockerCli, args: &ImageArgs) -> Result<()> {
    let request = request(args);
    println!("{}", serde_json::to_string_pretty(&request)?);
    println!("{}", render_command(docker, &request));
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::image::MANAGED_LABEL;

    #[test]
    fn test_render_command() {
        let args = ImageArgs {
            name: Some("demo:latest".to_owned()),
            base_dir: Some("/src/app".into()),
            file: None,
            build_args: vec![("VERSION".to_owned(), "1.0".to_owned())],
            labels: Vec::new(),
            target: None,
            pull: false,
            no_cache: true,
            platform: None,
        };
        let request = request(&args);
        assert_eq!(
            render_command(&DockerCli::with_program("podman"), &request),
            format!("podman build /src/app --tag demo:latest --build-arg VERSION=1.0 --label {MANAGED_LABEL}=true --no-cache --iidfile <iidfile>")
        );
    }

    #[test]
    fn test_request_serializes_to_json() {
        let args = ImageArgs {
            name: Some("demo:latest".to_owned()),
            base_dir: Some("/src/app".into()),
            file: None,
            build_args: Vec::new(),
            labels: Vec::new(),
            target: None,
            pull: false,
            no_cache: false,
            platform: None,
        };
        let json = serde_json::to_value(request(&args)).unwrap();
        assert_eq!(json["tags"], serde_json::json!(["demo:latest"]));
        assert_eq!(json["base_directory"], "/src/app");
        assert_eq!(json["dockerfile"], serde_json::Value::Null);
    }
}
