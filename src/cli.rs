use clap::Parser;
use std::path::PathBuf;

/// Dataforge - build a record schema, generate synthetic data, fan it out
#[derive(Parser, Debug, Clone)]
#[command(name = "dataforge", version, about, long_about = None)]
pub struct Cli {
    /// Path to the configuration file
    #[arg(short, long, env = "DATAFORGE_CONFIG", default_value = "dataforge.toml")]
    pub config: PathBuf,

    /// Server host address
    #[arg(long, env = "DATAFORGE_HOST")]
    pub host: Option<String>,

    /// Server port
    #[arg(long, env = "DATAFORGE_PORT")]
    pub port: Option<u16>,

    /// Command used to spawn the generator collaborator
    #[arg(long, env = "DATAFORGE_GENERATOR_COMMAND")]
    pub generator_command: Option<String>,

    /// Generate records in-process instead of spawning the generator
    #[arg(long, env = "DATAFORGE_BUILTIN_GENERATOR", num_args = 0..=1, default_missing_value = "true")]
    pub builtin_generator: Option<bool>,

    /// Serve the builder UI from this directory instead of the embedded copy
    #[arg(long, env = "DATAFORGE_STATIC_DIR")]
    pub static_dir: Option<PathBuf>,
}
