use std::{
    borrow::Cow,
    collections::BTreeMap,
    path::{Path, PathBuf},
};

/// The parameters of a single image build.
///
/// A request starts out empty and is filled in by one or more [`Configure`](crate::Configure) implementations before
/// it is handed to a [`BuildEngine`](crate::BuildEngine).
#[derive(Debug, Default, Clone, PartialEq, Eq, serde::Serialize)]
pub struct BuildRequest {
    pub tags: Vec<String>,
    /// The directory that serves as the build context. Relative dockerfile paths are resolved against it.
    pub base_directory: Option<PathBuf>,
    pub dockerfile: Option<PathBuf>,
    pub build_args: BTreeMap<String, String>,
    pub target: Option<String>,
    pub labels: BTreeMap<String, String>,
    pub pull: bool,
    pub no_cache: bool,
    pub platform: Option<String>,
}

impl BuildRequest {
    pub fn new() -> Self {
        Self::default()
    }

    /// The build context, which is the base directory when set and the current working directory otherwise.
    pub fn context_dir(&self) -> &Path {
        self.base_directory
            .as_deref()
            .unwrap_or_else(|| Path::new("."))
    }

    /// The dockerfile path with relative paths resolved against [`Self::context_dir`]. Returns `None` when no
    /// dockerfile was configured, in which case the engine looks for `Dockerfile` in the context.
    pub fn dockerfile_path(&self) -> Option<Cow<'_, Path>> {
        let dockerfile = self.dockerfile.as_deref()?;
        if dockerfile.is_absolute() || self.base_directory.is_none() {
            Some(Cow::Borrowed(dockerfile))
        } else {
            Some(Cow::Owned(self.context_dir().join(dockerfile)))
        }
    }

    /// Like [`Self::dockerfile_path`] but falls back to `Dockerfile` inside the context.
    pub fn effective_dockerfile_path(&self) -> Cow<'_, Path> {
        self.dockerfile_path()
            .unwrap_or_else(|| Cow::Owned(self.context_dir().join("Dockerfile")))
    }
}
