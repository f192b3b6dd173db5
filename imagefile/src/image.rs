use std::{collections::BTreeMap, fmt, path::PathBuf};

use constcat::concat;
use log::{debug, info, warn};

use crate::{
    configure::Configure,
    dockerfile,
    engine::{BuildEngine, BuildOutput},
    request::BuildRequest,
    temp_path, Result,
};

/// Images built without an explicit name are tagged as `localhost/imagefile/<random>`.
pub const DEFAULT_NAME_PREFIX: &str = "localhost/imagefile/";

pub const LABEL_NAMESPACE: &str = "org.imagefile";

/// Set to `true` on every image built by [`ImageFromDockerfile`], so leftovers can be found with
/// `docker image ls --filter label=org.imagefile.managed=true`.
pub const MANAGED_LABEL: &str = concat!(LABEL_NAMESPACE, ".managed");

type RequestModifier = Box<dyn Fn(&mut BuildRequest)>;

/// Returns a new random name of the form `localhost/imagefile/<16 lowercase alphanumerics>`.
pub fn generate_name() -> String {
    let mut name = DEFAULT_NAME_PREFIX.to_owned();
    name.push_str(&temp_path::lowercase_alphanumeric(16));
    name
}

/// Describes how to build an image from a Dockerfile.
///
/// The image is built when [`Self::resolve`] is called. Settings are applied to the [`BuildRequest`] through the
/// [`Configure`] implementation, which wrapping configurators delegate to.
pub struct ImageFromDockerfile {
    name: String,
    delete_on_exit: bool,
    dockerfile: Option<PathBuf>,
    build_args: BTreeMap<String, String>,
    target: Option<String>,
    labels: BTreeMap<String, String>,
    pull: bool,
    no_cache: bool,
    platform: Option<String>,
    modifiers: Vec<RequestModifier>,
}

impl fmt::Debug for ImageFromDockerfile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ImageFromDockerfile")
            .field("name", &self.name)
            .field("delete_on_exit", &self.delete_on_exit)
            .field("dockerfile", &self.dockerfile)
            .field("build_args", &self.build_args)
            .field("target", &self.target)
            .field("labels", &self.labels)
            .field("pull", &self.pull)
            .field("no_cache", &self.no_cache)
            .field("platform", &self.platform)
            .field("modifiers", &self.modifiers.len())
            .finish()
    }
}

impl Default for ImageFromDockerfile {
    fn default() -> Self {
        Self::new()
    }
}

impl ImageFromDockerfile {
    /// An image with a generated name that is removed once the [`BuiltImage`] is dropped.
    pub fn new() -> Self {
        Self::named_with_delete_on_exit(generate_name(), true)
    }

    pub fn named(name: impl Into<String>) -> Self {
        Self::named_with_delete_on_exit(name, true)
    }

    pub fn named_with_delete_on_exit(name: impl Into<String>, delete_on_exit: bool) -> Self {
        Self {
            name: name.into(),
            delete_on_exit,
            dockerfile: None,
            build_args: BTreeMap::new(),
            target: None,
            labels: BTreeMap::new(),
            pull: false,
            no_cache: false,
            platform: None,
            modifiers: Vec::new(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn delete_on_exit(&self) -> bool {
        self.delete_on_exit
    }

    /// Path of the Dockerfile. Relative paths are resolved against the base directory of the request, if any.
    pub fn with_dockerfile(&mut self, path: impl Into<PathBuf>) -> &mut Self {
        self.dockerfile = Some(path.into());
        self
    }

    pub fn with_build_arg(&mut self, key: impl Into<String>, value: impl Into<String>) -> &mut Self {
        self.build_args.insert(key.into(), value.into());
        self
    }

    pub fn with_build_args<I, K, V>(&mut self, args: I) -> &mut Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        self.build_args
            .extend(args.into_iter().map(|(k, v)| (k.into(), v.into())));
        self
    }

    /// The build stage to stop at in a multi-stage Dockerfile.
    pub fn with_target(&mut self, target: impl Into<String>) -> &mut Self {
        self.target = Some(target.into());
        self
    }

    pub fn with_label(&mut self, key: impl Into<String>, value: impl Into<String>) -> &mut Self {
        self.labels.insert(key.into(), value.into());
        self
    }

    pub fn with_pull(&mut self, pull: bool) -> &mut Self {
        self.pull = pull;
        self
    }

    pub fn with_no_cache(&mut self, no_cache: bool) -> &mut Self {
        self.no_cache = no_cache;
        self
    }

    pub fn with_platform(&mut self, platform: impl Into<String>) -> &mut Self {
        self.platform = Some(platform.into());
        self
    }

    /// Registers a function that can make arbitrary changes to the request. Modifiers run last, in the order in which
    /// they were added.
    pub fn with_request_modifier<F>(&mut self, modifier: F) -> &mut Self
    where
        F: Fn(&mut BuildRequest) + 'static,
    {
        self.modifiers.push(Box::new(modifier));
        self
    }

    /// Builds the image.
    pub fn resolve<E: BuildEngine>(&self, engine: E) -> Result<BuiltImage<E>> {
        self.resolve_with(self, engine)
    }

    /// Builds the image with the request produced by `configurator`, which is expected to delegate to `self`.
    pub fn resolve_with<C, E>(&self, configurator: &C, engine: E) -> Result<BuiltImage<E>>
    where
        C: Configure + ?Sized,
        E: BuildEngine,
    {
        let mut request = BuildRequest::new();
        configurator.configure(&mut request);
        debug!("build request: {request:?}");

        pull_dependency_images(&request, &engine);

        info!("Building image {name}...", name = self.name);
        let BuildOutput { image_id } = engine.build(&request)?;
        info!("Built image {name} ({image_id})", name = self.name);

        Ok(BuiltImage {
            name: self.name.clone(),
            image_id,
            delete_on_exit: self.delete_on_exit,
            engine,
        })
    }
}

/// Pulls the images the Dockerfile depends on ahead of the build. Failures are not fatal, the build itself will
/// report images that really can not be obtained.
fn pull_dependency_images(request: &BuildRequest, engine: &impl BuildEngine) {
    let path = request.effective_dockerfile_path();
    if !path.is_file() {
        debug!("not pre-pulling dependency images, {path:?} is not a file");
        return;
    }

    let images = match dockerfile::dependency_images_from_path(&path) {
        Ok(images) => images,
        Err(error) => {
            warn!("Failed to determine dependency images: {error}");
            return;
        }
    };

    for image in images {
        debug!("pre-pulling dependency image {image}");
        if let Err(error) = engine.pull(&image) {
            warn!("Failed to pull dependency image {image}: {error}");
        }
    }
}

impl Configure for ImageFromDockerfile {
    fn configure(&self, request: &mut BuildRequest) {
        request.tags.push(self.name.clone());
        if let Some(dockerfile) = &self.dockerfile {
            request.dockerfile = Some(dockerfile.clone());
        }
        request.build_args.extend(
            self.build_args
                .iter()
                .map(|(k, v)| (k.clone(), v.clone())),
        );
        if let Some(target) = &self.target {
            request.target = Some(target.clone());
        }
        request
            .labels
            .insert(MANAGED_LABEL.to_owned(), "true".to_owned());
        request.labels.extend(
            self.labels
                .iter()
                .map(|(k, v)| (k.clone(), v.clone())),
        );
        request.pull |= self.pull;
        request.no_cache |= self.no_cache;
        if let Some(platform) = &self.platform {
            request.platform = Some(platform.clone());
        }

        for modifier in &self.modifiers {
            modifier(&mut *request);
        }
    }
}

/// An image produced by [`ImageFromDockerfile::resolve`].
///
/// When delete-on-exit is set the image is removed through the engine that built it once this value is dropped.
#[derive(Debug)]
pub struct BuiltImage<E: BuildEngine> {
    name: String,
    image_id: String,
    delete_on_exit: bool,
    engine: E,
}

impl<E: BuildEngine> BuiltImage<E> {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn image_id(&self) -> &str {
        &self.image_id
    }

    pub fn delete_on_exit(&self) -> bool {
        self.delete_on_exit
    }

    /// Prevents the image from being removed on drop.
    pub fn keep(&mut self) {
        self.delete_on_exit = false;
    }
}

impl<E: BuildEngine> Drop for BuiltImage<E> {
    fn drop(&mut self) {
        if !self.delete_on_exit {
            return;
        }
        debug!("removing image {name}", name = self.name);
        if let Err(error) = self.engine.remove_image(&self.name) {
            warn!("Failed to remove image {name}: {error}", name = self.name);
        }
    }
}
