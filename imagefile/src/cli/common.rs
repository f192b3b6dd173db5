use std::path::PathBuf;

use clap::Args;

use crate::{image, BaseDirectoryImage};

#[derive(Debug, Args)]
pub struct ImageArgs {
    /// Name of the image. A random name under `localhost/imagefile/` is generated when omitted.
    #[arg(long = "name")]
    pub name: Option<String>,

    /// The build context. Relative dockerfile paths are resolved against it. Defaults to the current directory.
    #[arg(long = "base-dir")]
    pub base_dir: Option<PathBuf>,

    /// Path of the Dockerfile, defaults to `Dockerfile` in the build context.
    #[arg(long = "file", short = 'f')]
    pub file: Option<PathBuf>,

    /// Build-time variable in the form KEY=VALUE, can be repeated.
    #[arg(long = "build-arg", value_parser = parse_key_value)]
    pub build_args: Vec<(String, String)>,

    /// Image label in the form KEY=VALUE, can be repeated.
    #[arg(long = "label", value_parser = parse_key_value)]
    pub labels: Vec<(String, String)>,

    /// The build stage to stop at.
    #[arg(long = "target")]
    pub target: Option<String>,

    /// Always attempt to pull newer versions of the base images.
    #[arg(long = "pull", default_value_t)]
    pub pull: bool,

    #[arg(long = "no-cache", default_value_t)]
    pub no_cache: bool,

    /// Target platform, for example `linux/amd64`.
    #[arg(long = "platform")]
    pub platform: Option<String>,
}

impl ImageArgs {
    pub fn image(&self, delete_on_exit: bool) -> BaseDirectoryImage {
        let name = self.name.clone().unwrap_or_else(image::generate_name);
        let mut image = BaseDirectoryImage::named_with_delete_on_exit(name, delete_on_exit);

        if let Some(base_dir) = &self.base_dir {
            image.with_base_directory(base_dir);
        }
        if let Some(file) = &self.file {
            image.with_dockerfile(file);
        }
        image
            .with_build_args(self.build_args.iter().cloned())
            .with_pull(self.pull)
            .with_no_cache(self.no_cache);
        for (key, value) in &self.labels {
            image.with_label(key, value);
        }
        if let Some(target) = &self.target {
            image.with_target(target);
        }
        if let Some(platform) = &self.platform {
            image.with_platform(platform);
        }
        image
    }
}

fn parse_key_value(value: &str) -> Result<(String, String), String> {
    let (key, value) = value
        .split_once('=')
        .ok_or_else(|| format!("expected KEY=VALUE but no `=` found in {value:?}"))?;
    if key.is_empty() {
        return Err("expected a non-empty KEY in KEY=VALUE".to_owned());
    }
    Ok((key.to_owned(), value.to_owned()))
}

#[cfg(test)]
mod tests {
    use std::path::Path;

    use super::*;
    use crate::{BuildRequest, Configure};

    fn args() -> ImageArgs {
        ImageArgs {
            name: Some("demo:latest".to_owned()),
            base_dir: Some("/src/app".into()),
            file: Some("Dockerfile.release".into()),
            build_args: vec![("VERSION".to_owned(), "1.0".to_owned())],
            labels: vec![("team".to_owned(), "infra".to_owned())],
            target: Some("runtime".to_owned()),
            pull: true,
            no_cache: false,
            platform: None,
        }
    }

    #[test]
    fn test_parse_key_value() {
        assert_eq!(
            parse_key_value("A=b=c"),
            Ok(("A".to_owned(), "b=c".to_owned()))
        );
        assert_eq!(parse_key_value("A="), Ok(("A".to_owned(), String::new())));
        assert!(parse_key_value("A").is_err());
        assert!(parse_key_value("=b").is_err());
    }

    #[test]
    fn test_image_from_args() {
        let image = args().image(false);
        assert_eq!(image.name(), "demo:latest");
        assert!(!image.delete_on_exit());
        assert_eq!(image.base_directory(), Some(Path::new("/src/app")));

        let mut request = BuildRequest::new();
        image.configure(&mut request);
        assert_eq!(request.tags, ["demo:latest"]);
        assert_eq!(
            request.dockerfile_path().as_deref(),
            Some(Path::new("/src/app/Dockerfile.release"))
        );
        assert_eq!(request.build_args["VERSION"], "1.0");
        assert_eq!(request.labels["team"], "infra");
        assert_eq!(request.target.as_deref(), Some("runtime"));
        assert!(request.pull);
    }

    #[test]
    fn test_generated_name_respects_delete_on_exit() {
        let args = ImageArgs {
            name: None,
            ..args()
        };
        assert!(args.image(true).delete_on_exit());
        let image = args.image(false);
        assert!(!image.delete_on_exit());
        assert!(image.name().starts_with(crate::image::DEFAULT_NAME_PREFIX));
    }
}
