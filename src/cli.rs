use clap::Parser;
use std::path::PathBuf;

#[derive(Debug, Clone, Parser)]
#[command(name = "jarwalk", version)]
#[command(about = "Recursively disassemble every class inside jar/aar/apk archives with javap")]
pub struct Cli {
    /// Archive to walk (jar, aar or apk)
    #[arg(value_name = "JAR_FILE")]
    pub jar_file: PathBuf,

    /// Extra parameters for javap; write `^` for a leading `-` (e.g. `^c`) or pass them after `--`
    #[arg(value_name = "EXTRA")]
    pub extra: Vec<String>,

    /// Only process classes whose fully-qualified name matches this glob
    #[arg(long, value_name = "GLOB")]
    pub only: Option<String>,

    /// Skip classes whose fully-qualified name matches this glob
    #[arg(long = "not", value_name = "GLOB")]
    pub not: Option<String>,

    /// Path to the dex2jar executable (default: searched in $DEXTOOLS_HOME)
    #[arg(long, value_name = "FILE")]
    pub dex2jar: Option<PathBuf>,

    /// Path to the javap executable
    #[arg(long, value_name = "FILE", env = "JARWALK_JAVAP", default_value = "javap")]
    pub javap: PathBuf,

    /// Increase log verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,
}
