pub mod activity;
pub mod cli;
pub mod commands;
pub mod config;
pub mod error;
pub mod render;
pub mod search;
pub mod storage;
pub mod store;

use std::ffi::OsString;

use anyhow::Context;
use clap::Parser;
use tracing::{
  debug,
  info
};

pub use activity::{
  Activity,
  Color
};
pub use error::{
  StorageError,
  StoreError
};
pub use search::search;
pub use storage::KeyValueStore;
pub use store::{
  ActivityStore,
  STORAGE_KEY
};

#[tracing::instrument(skip_all)]
pub fn run(
  raw_args: Vec<OsString>
) -> anyhow::Result<()> {
  let cli =
    cli::GlobalCli::parse_from(raw_args);

  cli::init_tracing(
    cli.verbose,
    cli.quiet
  )?;

  info!(
    verbose = cli.verbose,
    quiet = cli.quiet,
    "starting activities CLI"
  );
  debug!(overrides = cli.rc_overrides.len(), "parsed rc overrides");

  let mut cfg = config::Config::load(
    cli.activityrc.as_deref()
  )?;
  cfg.apply_overrides(
    cli
      .rc_overrides
      .into_iter()
      .map(|kv| (kv.key, kv.value))
  );

  let data_dir =
    cfg.data_dir(cli.data.as_deref());

  let backend =
    storage::FileStore::open(
      &data_dir
    )
    .with_context(|| {
      format!(
        "failed to open storage at {}",
        data_dir.display()
      )
    })?;
  let mut store =
    ActivityStore::new(backend);

  let renderer =
    render::Renderer::new(&cfg)?;

  commands::dispatch(
    &mut store,
    &cfg,
    &renderer,
    cli.command.unwrap_or_default()
  )?;

  info!("done");
  Ok(())
}
