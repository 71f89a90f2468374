use std::path::PathBuf;

use clap::Parser;

/// Version reported by `--version`: the build-time `MIRDIR_VERSION` when set,
/// otherwise the package version.
pub const VERSION: &str = match option_env!("MIRDIR_VERSION") {
    Some(v) => v,
    None => env!("CARGO_PKG_VERSION"),
};

/// Mirror a template directory structure, substituting `[KEY]` tokens from the
/// environment in names and rendering `.tpl` file contents.
#[derive(Parser, Debug)]
#[command(
    name = "mirdir",
    about = "CLI tool that mirrors and templates a directory structure",
    version = VERSION
)]
pub struct Cli {
    /// Template directory to read from
    #[arg(value_name = "TPL_DIR")]
    pub template_dir: PathBuf,

    /// Destination directory to write into
    #[arg(value_name = "DST_DIR")]
    pub destination_dir: PathBuf,

    /// Don't ask, just do
    #[arg(short, long)]
    pub yes: bool,

    /// Print output without writing
    #[arg(short, long)]
    pub dry_run: bool,

    /// Delete file if its only whitespace
    #[arg(short = 'e', long)]
    pub delete_empty: bool,

    /// Preserve permissions and ownership
    #[arg(short, long)]
    pub preserve: bool,

    /// Print verbose output
    #[arg(short, long)]
    pub verbose: bool,
}
