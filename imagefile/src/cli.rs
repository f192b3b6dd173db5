mod build;
mod common;
mod plan;

use clap::{Parser, Subcommand};
use constcat::concat;

use crate::{engine, Result};

pub const DOCKER_ENV: &str = "IMAGEFILE_DOCKER";

#[derive(Debug, Parser)]
#[command(version, about)]
pub struct Cli {
    #[command(subcommand)]
    command: Commands,

    #[arg(
        long = "docker",
        global = true,
        env = DOCKER_ENV,
        default_value = engine::DEFAULT_PROGRAM,
        help = concat!("The docker compatible binary used to build, pull and remove images. Can also be set through the ", DOCKER_ENV, " environment variable.")
    )]
    docker: String,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Build an image from a Dockerfile
    Build(build::BuildArgs),

    /// Print the build request and the docker command without building
    Plan(common::ImageArgs),
}

impl Cli {
    pub fn run(self) -> Result<()> {
        let docker = engine::DockerCli::with_program(&self.docker);
        match self.command {
            Commands::Build(args) => build::build(&docker, args),
            Commands::Plan(args) => plan::plan(&docker, &args),
        }
    }
}
