//! Dashboard server entry point.
//!
//! Loads every dataset table, then serves the three exploration pages.
//! Configuration comes from the environment (HOST, PORT, DATA_DIR, DEBUG,
//! LOG_LEVEL); a missing or malformed data file aborts startup.

use std::sync::Arc;

use anyhow::{Context, Result};

use metabodash::config::Config;
use metabodash::dataset::DatasetStore;
use metabodash::logging::{log, obj, v_str, Domain, Level};
use metabodash::server;

#[tokio::main]
async fn main() -> Result<()> {
    let cfg = Config::from_env();
    log(
        Level::Info,
        Domain::System,
        "startup",
        obj(&[
            ("data_dir", v_str(&cfg.data_dir.display().to_string())),
            ("addr", v_str(&cfg.bind_addr())),
        ]),
    );

    let store = DatasetStore::load(&cfg.data_dir)
        .with_context(|| format!("loading datasets from {}", cfg.data_dir.display()))?;

    server::serve(Arc::new(store), &cfg).await
}
