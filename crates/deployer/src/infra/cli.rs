use std::path::PathBuf;

#[derive(Debug, clap::Parser)]
pub struct Args {
    /// The log filter.
    #[clap(long, env, default_value = "warn,deployer=debug")]
    pub log: String,

    /// At which log level logs should be printed to stderr instead of stdout.
    #[clap(long, env)]
    pub stderr_threshold: Option<tracing::Level>,

    /// Path to the deployer configuration file. This file should be in TOML
    /// format; see `example.toml` in this crate for a sample.
    #[clap(long, env)]
    pub config: PathBuf,
}

impl std::fmt::Display for Args {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "log: {}", self.log)?;
        writeln!(f, "stderr_threshold: {:?}", self.stderr_threshold)?;
        writeln!(f, "config: {:?}", self.config)?;
        Ok(())
    }
}
