pub mod cli;
pub mod commands;
pub mod config;
pub mod datastore;
pub mod render;

use std::ffi::OsString;

use anyhow::Context;
use blackbelt_shared::{KeyValueStorage, QuestStore};
use clap::Parser;
use tracing::{debug, info};

#[tracing::instrument(skip_all)]
pub fn run(raw_args: Vec<OsString>) -> anyhow::Result<()> {
    let pre = cli::preprocess_args(&raw_args)?;
    let cli = cli::GlobalCli::parse_from(pre.cleaned_args);

    cli::init_tracing(cli.verbose, cli.quiet)?;

    info!(
        verbose = cli.verbose,
        quiet = cli.quiet,
        "starting blackbelt CLI"
    );
    debug!(?pre.rc_overrides, "preprocessed rc overrides");

    let mut cfg = config::Config::load(cli.rc_file.as_deref())?;
    cfg.apply_overrides(
        pre.rc_overrides
            .into_iter()
            .chain(cli.rc_overrides)
            .map(cli::RcOverride::into_pair),
    );

    let data_dir = config::resolve_data_dir(&cfg, cli.data.as_deref())
        .context("failed to resolve data directory")?;

    let storage = datastore::FileStorage::open(&data_dir)
        .with_context(|| format!("failed to open datastore at {}", data_dir.display()))?;
    let mut store = QuestStore::new(storage).with_name_match(cfg.name_match());

    let mut renderer = render::Renderer::new(&cfg)?;
    let inv = cli::Invocation::parse(&cfg, cli.rest)?;

    if cli.quiet == 0 {
        greet_first_visit(&mut store, &cfg, &inv)?;
    }

    commands::dispatch(&mut store, &cfg, &mut renderer, inv)?;

    info!("done");
    Ok(())
}

/// Prints the welcome hint once, the first time the data directory is used.
pub fn greet_first_visit<S: KeyValueStorage>(
    store: &mut QuestStore<S>,
    cfg: &config::Config,
    inv: &cli::Invocation,
) -> anyhow::Result<bool> {
    if !cfg.welcome_enabled() || inv.command == "help" || store.has_visited()? {
        return Ok(false);
    }

    eprintln!("{}", commands::WELCOME_HINT);
    store.mark_visited()?;
    Ok(true)
}
