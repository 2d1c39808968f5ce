use clap::{ArgAction, Parser, Subcommand};
use flagpack_config::Overrides;
use flagpack_manifest::{EvictionPolicy, Format};
use std::path::PathBuf;

/// Generate the offline cache controller from the asset tree.
#[derive(Debug, Parser)]
#[command(name = "flagpack", about, long_about = None, disable_version_flag = true)]
pub struct Cli {
    /// Release version; the cache is named `flag-game-<VERSION>` [default: 2.1.0]
    #[arg(long, global = true)]
    pub version: Option<String>,

    /// Print the artifact instead of writing it
    #[arg(long, global = true)]
    pub dry_run: bool,

    /// Project root containing `assets/` and `countries.js` [default: .]
    #[arg(long, global = true)]
    pub root: Option<PathBuf>,

    /// Voice whose clips are cached [default: kPzsL2i3teMYv0FxEYQ6]
    #[arg(long, global = true)]
    pub voice_id: Option<String>,

    /// Artifact path, relative to the project root [default: sw.js]
    #[arg(short, long, global = true)]
    pub output: Option<PathBuf>,

    /// Artifact format: `service-worker` or `json`
    #[arg(long, global = true)]
    pub format: Option<Format>,

    /// Which cache stores activation deletes: `all-foreign` or `owned-prefix`
    #[arg(long, global = true)]
    pub eviction: Option<EvictionPolicy>,

    /// Fail on unrecognized voice clips and on pack countries without assets
    #[arg(long, global = true)]
    pub strict: bool,

    /// Additional configuration file (TOML, YAML or JSON)
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Increase logging verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Subcommand)]
pub enum Command {
    /// Write the controller artifact (the default)
    Generate,
    /// Install the manifest into a scratch cache, served from the asset tree
    Verify,
}

impl Cli {
    pub fn overrides(&self) -> Overrides {
        Overrides {
            root: self.root.clone(),
            version: self.version.clone(),
            voice_id: self.voice_id.clone(),
            output: self.output.clone(),
            format: self.format,
            eviction: self.eviction,
            strict: self.strict.then_some(true),
        }
    }
}
