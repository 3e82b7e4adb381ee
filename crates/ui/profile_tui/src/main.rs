mod action;
mod cli;
mod commands;
mod components;
mod config;
mod errors;
mod profile;
mod tui;

use std::sync::Arc;

use clap::Parser;
use color_eyre::{
    eyre::{eyre, WrapErr},
    Result,
};
use profile_form::{CollectionClient, FallbackCatalog, GeoDataset, ProfileForm};
use tracing::info;

use crate::cli::{Cli, Cmd};
use crate::config::Config;
use crate::profile::ProfileApp;

#[tokio::main]
pub async fn main() -> Result<()> {
    errors::init()?;
    let args = Cli::parse();
    // Keeps the log writer alive until the end of main.
    let context = app::init::<ProfileApp>(env!("CARGO_PKG_VERSION"))
        .map_err(|e| eyre!("initialization failed: {e}"))?;

    let mut config = Config::new(context.path_context()).wrap_err("loading settings")?;
    config.apply_cli(&args);

    let geo = match config.dataset_path(context.path_context()) {
        Some(path) => GeoDataset::from_path(&path)
            .wrap_err_with(|| format!("reading geo dataset {}", path.display()))?,
        None => GeoDataset::embedded()?,
    };
    let client = CollectionClient::new(&config.api.base_url, config.api.timeout())?;

    match args.command_or_default() {
        Cmd::Run => {
            let catalog = FallbackCatalog::embedded()?;
            let form = ProfileForm::new(Arc::new(geo), catalog, config.form_settings());
            let mut app = ProfileApp::new(config, form, client);
            app.run().await?;
        }
        Cmd::Fetch { collection } => commands::fetch(&client, collection).await?,
        Cmd::Keys { pattern } => commands::keys(&client, pattern.as_deref()).await?,
        Cmd::Key { key } => commands::key(&client, &key).await?,
        Cmd::Countries => commands::countries(&geo)?,
    }
    info!(version = context.version, "exit");
    Ok(())
}
