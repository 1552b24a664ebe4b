use anyhow::{bail, Result};
use tablestore::{execute_command, Store, StoreConfig};
use tracing_subscriber::EnvFilter;

/// Overrides the configured save directory.
const SAVE_DIR_ENV: &str = "TABLESTORE_DIR";

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_writer(std::io::stderr)
        .init();

    // Parse arguments
    let args = std::env::args().collect::<Vec<_>>();
    match args.len() {
        0 | 1 => bail!("Missing <database name> and <command>"),
        2 => bail!("Missing <command>"),
        _ => {}
    }

    let database = &args[1];
    let command = args[2..].join(" ");

    let mut config = StoreConfig::load_default()?;
    if let Some(dir) = std::env::var_os(SAVE_DIR_ENV) {
        config = config.with_save_dir(dir);
    }
    let store = Store::new(config);

    let stdout = std::io::stdout();
    execute_command(&store, database, &command, &mut stdout.lock())
}
