use std::{
    ops::{Deref, DerefMut},
    path::{Path, PathBuf},
};

use crate::{
    configure::Configure,
    engine::BuildEngine,
    image::{BuiltImage, ImageFromDockerfile},
    request::BuildRequest,
    Result,
};

/// An [`ImageFromDockerfile`] that can be built from a base directory other than the current working directory.
///
/// The base directory becomes the build context and relative dockerfile paths are resolved against it. All other
/// settings are those of the wrapped image. The common setters are forwarded so that they can be chained with
/// [`Self::with_base_directory`], anything else is reachable through [`Deref`] and [`DerefMut`]. Build with
/// [`Self::resolve`] on this type, resolving the wrapped image directly does not apply the base directory.
///
/// ```
/// use imagefile::{BaseDirectoryImage, BuildRequest, Configure};
///
/// let mut image = BaseDirectoryImage::named("demo:latest");
/// image.with_base_directory("/src/app");
///
/// let mut request = BuildRequest::new();
/// image.configure(&mut request);
/// assert_eq!(request.base_directory.as_deref(), Some(std::path::Path::new("/src/app")));
/// ```
#[derive(Debug, Default)]
pub struct BaseDirectoryImage {
    inner: ImageFromDockerfile,
    base_directory: Option<PathBuf>,
}

impl BaseDirectoryImage {
    pub fn new() -> Self {
        ImageFromDockerfile::new().into()
    }

    pub fn named(name: impl Into<String>) -> Self {
        ImageFromDockerfile::named(name).into()
    }

    pub fn named_with_delete_on_exit(name: impl Into<String>, delete_on_exit: bool) -> Self {
        ImageFromDockerfile::named_with_delete_on_exit(name, delete_on_exit).into()
    }

    /// Sets the base directory, replacing any previously set one. The path is not checked, a missing directory is
    /// reported by the engine when building.
    pub fn with_base_directory(&mut self, path: impl Into<PathBuf>) -> &mut Self {
        self.base_directory = Some(path.into());
        self
    }

    pub fn with_dockerfile(&mut self, path: impl Into<PathBuf>) -> &mut Self {
        self.inner.with_dockerfile(path);
        self
    }

    pub fn with_build_arg(&mut self, key: impl Into<String>, value: impl Into<String>) -> &mut Self {
        self.inner.with_build_arg(key, value);
        self
    }

    pub fn with_build_args<I, K, V>(&mut self, args: I) -> &mut Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        self.inner.with_build_args(args);
        self
    }

    pub fn with_target(&mut self, target: impl Into<String>) -> &mut Self {
        self.inner.with_target(target);
        self
    }

    pub fn with_label(&mut self, key: impl Into<String>, value: impl Into<String>) -> &mut Self {
        self.inner.with_label(key, value);
        self
    }

    pub fn with_pull(&mut self, pull: bool) -> &mut Self {
        self.inner.with_pull(pull);
        self
    }

    pub fn with_no_cache(&mut self, no_cache: bool) -> &mut Self {
        self.inner.with_no_cache(no_cache);
        self
    }

    pub fn with_platform(&mut self, platform: impl Into<String>) -> &mut Self {
        self.inner.with_platform(platform);
        self
    }

    pub fn with_request_modifier<F>(&mut self, modifier: F) -> &mut Self
    where
        F: Fn(&mut BuildRequest) + 'static,
    {
        self.inner.with_request_modifier(modifier);
        self
    }

    pub fn base_directory(&self) -> Option<&Path> {
        self.base_directory.as_deref()
    }

    pub fn inner(&self) -> &ImageFromDockerfile {
        &self.inner
    }

    pub fn into_inner(self) -> ImageFromDockerfile {
        self.inner
    }

    /// Builds the image with the base directory applied.
    pub fn resolve<E: BuildEngine>(&self, engine: E) -> Result<BuiltImage<E>> {
        self.inner.resolve_with(self, engine)
    }
}

impl From<ImageFromDockerfile> for BaseDirectoryImage {
    fn from(inner: ImageFromDockerfile) -> Self {
        Self {
            inner,
            base_directory: None,
        }
    }
}

impl Deref for BaseDirectoryImage {
    type Target = ImageFromDockerfile;

    fn deref(&self) -> &Self::Target {
        &self.inner
    }
}

impl DerefMut for BaseDirectoryImage {
    fn deref_mut(&mut self) -> &mut Self::Target {
        &mut self.inner
    }
}

impl Configure for BaseDirectoryImage {
    fn configure(&self, request: &mut BuildRequest) {
        // Must happen first, the wrapped image resolves paths and runs modifiers against the request.
        if let Some(base_directory) = &self.base_directory {
            request.base_directory = Some(base_directory.clone());
        }
        self.inner.configure(request);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn configured(image: &impl Configure) -> BuildRequest {
        let mut request = BuildRequest::new();
        image.configure(&mut request);
        request
    }

    #[test]
    fn test_base_directory_is_applied() {
        let mut image = BaseDirectoryImage::named("demo:latest");
        image.with_base_directory("/src/app");
        assert_eq!(
            configured(&image).base_directory,
            Some(PathBuf::from("/src/app"))
        );
    }

    #[test]
    fn test_absent_base_directory_is_a_no_op() {
        let image = BaseDirectoryImage::named("demo:latest");
        assert_eq!(image.base_directory(), None);
        assert_eq!(configured(&image).base_directory, None);
    }

    #[test]
    fn test_absent_base_directory_keeps_existing_value() {
        let image = BaseDirectoryImage::named("demo:latest");
        let mut request = BuildRequest {
            base_directory: Some("/already/set".into()),
            ..Default::default()
        };
        image.configure(&mut request);
        assert_eq!(request.base_directory, Some(PathBuf::from("/already/set")));
    }

    #[test]
    fn test_last_base_directory_wins() {
        let mut image = BaseDirectoryImage::named("demo:latest");
        image
            .with_base_directory("/src/first")
            .with_base_directory("/src/second");
        assert_eq!(
            configured(&image).base_directory,
            Some(PathBuf::from("/src/second"))
        );
    }

    #[test]
    fn test_with_base_directory_returns_same_instance() {
        let mut image = BaseDirectoryImage::new();
        let expected: *const BaseDirectoryImage = &image;
        let returned: *const BaseDirectoryImage = image.with_base_directory("/src/app");
        assert!(std::ptr::eq(expected, returned));
    }

    #[test]
    fn test_constructors_start_without_base_directory() {
        let images = [
            BaseDirectoryImage::new(),
            BaseDirectoryImage::named("demo:latest"),
            BaseDirectoryImage::named_with_delete_on_exit("demo:latest", false),
        ];
        for image in &images {
            assert_eq!(image.base_directory(), None);
            assert_eq!(configured(image), configured(image.inner()));
        }
    }

    #[test]
    fn test_constructors_forward_to_wrapped_image() {
        assert!(BaseDirectoryImage::new()
            .name()
            .starts_with(crate::image::DEFAULT_NAME_PREFIX));
        let image = BaseDirectoryImage::named("demo:latest");
        assert_eq!(image.name(), "demo:latest");
        assert!(image.delete_on_exit());
        let image = BaseDirectoryImage::named_with_delete_on_exit("demo:latest", false);
        assert_eq!(image.name(), "demo:latest");
        assert!(!image.delete_on_exit());
    }

    #[test]
    fn test_other_fields_match_wrapped_image() {
        let mut image = BaseDirectoryImage::named("demo:latest");
        image.with_base_directory("/src/app");

        let expected = BuildRequest {
            base_directory: Some("/src/app".into()),
            ..configured(image.inner())
        };
        assert_eq!(configured(&image), expected);
    }

    #[test]
    fn test_base_directory_is_visible_to_wrapped_modifiers() {
        let mut image = BaseDirectoryImage::named("demo:latest");
        image.with_base_directory("/src/app");
        image.with_request_modifier(|request| {
            assert_eq!(request.base_directory, Some(PathBuf::from("/src/app")));
            request.labels.insert(
                "context".to_owned(),
                request.context_dir().display().to_string(),
            );
        });
        assert_eq!(configured(&image).labels["context"], "/src/app");
    }

    #[test]
    fn test_wrapped_setters_chain_with_base_directory() {
        let mut image = BaseDirectoryImage::named("demo:latest");
        let expected: *const BaseDirectoryImage = &image;
        let returned: *const BaseDirectoryImage = image
            .with_dockerfile("build/Dockerfile")
            .with_build_arg("VERSION", "1.0")
            .with_target("runtime")
            .with_label("team", "infra")
            .with_pull(true)
            .with_base_directory("/src/app");
        assert!(std::ptr::eq(expected, returned));

        let request = configured(&image);
        assert_eq!(request.base_directory, Some(PathBuf::from("/src/app")));
        assert_eq!(request.dockerfile, Some(PathBuf::from("build/Dockerfile")));
        assert_eq!(request.build_args["VERSION"], "1.0");
        assert_eq!(request.target.as_deref(), Some("runtime"));
        assert_eq!(request.labels["team"], "infra");
        assert!(request.pull);
    }

    #[test]
    fn test_relative_dockerfile_resolves_against_base_directory() {
        let mut image = BaseDirectoryImage::named("demo:latest");
        image.with_base_directory("/src/app");
        image.with_dockerfile("build/Dockerfile");
        let request = configured(&image);
        assert_eq!(
            request.dockerfile_path().as_deref(),
            Some(Path::new("/src/app/build/Dockerfile"))
        );
    }
}
