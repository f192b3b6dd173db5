use std::{collections::BTreeMap, path::PathBuf};

use clap::{Args, ValueEnum};
use itertools::Itertools;

use super::common::ImageArgs;
use crate::{engine::DockerCli, image::BuiltImage, BaseDirectoryImage, BuildEngine, Result};

#[derive(Debug, Args)]
pub struct BuildArgs {
    #[command(flatten)]
    pub image: ImageArgs,

    /// Remove the image again before exiting. Useful to check that a Dockerfile builds.
    #[arg(long = "delete-on-exit", default_value_t)]
    pub delete_on_exit: bool,

    #[arg(long = "output", value_enum, default_value_t)]
    pub output: OutputFormat,
}

#[derive(Debug, Default, Clone, Copy, ValueEnum, PartialEq, Eq)]
pub enum OutputFormat {
    /// A human readable table.
    #[default]
    Table,
    /// A JSON object.
    Json,
}

#[derive(Debug, serde::Serialize)]
struct Summary {
    name: String,
    image_id: String,
    base_directory: Option<PathBuf>,
    build_args: Vec<String>,
    removed: bool,
}

impl Summary {
    fn new<E: BuildEngine>(
        args: &ImageArgs,
        image: &BaseDirectoryImage,
        built: &BuiltImage<E>,
    ) -> Self {
        let build_args: BTreeMap<&str, &str> = args
            .build_args
            .iter()
            .map(|(key, value)| (key.as_str(), value.as_str()))
            .collect();
        Self {
            name: built.name().to_owned(),
            image_id: built.image_id().to_owned(),
            base_directory: image.base_directory().map(ToOwned::to_owned),
            build_args: build_args
                .into_iter()
                .map(|(key, value)| format!("{key}={value}"))
                .collect(),
            removed: built.delete_on_exit(),
        }
    }

    fn table(&self) -> comfy_table::Table {
        use comfy_table::{presets::UTF8_FULL, Attribute, Cell, ContentArrangement, Table};

        let mut table = Table::new();
        table
            .load_preset(UTF8_FULL)
            .set_content_arrangement(ContentArrangement::Dynamic);
        let row = |key: &str, value: String| {
            vec![
                Cell::new(key).add_attribute(Attribute::Bold),
                Cell::new(value),
            ]
        };
        table.add_row(row("name", self.name.clone()));
        table.add_row(row("image id", self.image_id.clone()));
        table.add_row(row(
            "base directory",
            self.base_directory
                .as_ref()
                .map_or_else(|| ".".to_owned(), |path| path.display().to_string()),
        ));
        table.add_row(row("build args", self.build_args.iter().join("\n")));
        table.add_row(row("removed on exit", self.removed.to_string()));
        table
    }
}

pub fn build(docker: &DockerCli, args: BuildArgs) -> Result<()> {
    let BuildArgs {
        image: image_args,
        delete_on_exit,
        output,
    } = args;

    let image = image_args.image(delete_on_exit);
    let built = image.resolve(docker)?;
    let summary = Summary::new(&image_args, &image, &built);

    match output {
        OutputFormat::Table => println!("{}", summary.table()),
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&summary)?),
    }

    Ok(())
}
