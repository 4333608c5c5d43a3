pub mod cache;
pub mod cli;
pub mod config;
pub mod domain;
pub mod errors;
pub mod http;
pub mod rating;
pub mod remote;
pub mod services;
pub mod storage;
pub mod ui;
pub mod vote;

use std::sync::Arc;

use anyhow::Result;
use clap::Parser;
use cli::Cli;
use log::info;

use crate::cli::GlobalOptions;
use crate::config::AppConfig;
use crate::domain::TraitRatings;
use crate::errors::SubmitError;
use crate::remote::RealtimeDbClient;
use crate::services::{AggregationController, CancelSignal, ControllerSettings, SystemClock};
use crate::storage::SqliteStore;

pub fn interpret() -> Cli {
    Cli::parse()
}

pub fn handle_vote(options: &GlobalOptions, ratings: TraitRatings) -> Result<()> {
    let runtime = tokio::runtime::Runtime::new()?;
    runtime.block_on(async {
        let mut controller = build_controller(options)?;
        cancel_on_ctrl_c(controller.cancel_handle());

        match controller.submit(ratings).await {
            Ok(outcome) => info!("Vote submitted, refresh outcome: {:?}", outcome),
            Err(SubmitError::AlreadyVoted) => {
                info!("Vote rejected, this device already voted");
                controller.request_refresh().await;
            }
            Err(SubmitError::Storage(e)) => return Err(e),
        }

        println!("{}", ui::render_vote_page(&controller.snapshot()));
        Ok(())
    })
}

pub fn handle_show(options: &GlobalOptions) -> Result<()> {
    let runtime = tokio::runtime::Runtime::new()?;
    runtime.block_on(async {
        let mut controller = build_controller(options)?;
        cancel_on_ctrl_c(controller.cancel_handle());

        let snapshot = controller.snapshot();
        if snapshot.general.ratings().is_some() {
            println!("{}\n", ui::render_vote_page(&snapshot));
        }

        controller.request_refresh().await;
        println!("{}", ui::render_vote_page(&controller.snapshot()));
        Ok(())
    })
}

pub fn handle_results(options: &GlobalOptions) -> Result<()> {
    let runtime = tokio::runtime::Runtime::new()?;
    runtime.block_on(async {
        let mut controller = build_controller(options)?;
        cancel_on_ctrl_c(controller.cancel_handle());

        controller.load_public_results().await;
        println!("{}", ui::render_public_results(&controller.snapshot()));
        Ok(())
    })
}

fn build_config(options: &GlobalOptions) -> AppConfig {
    let mut config = AppConfig::from_env();

    if let Some(path) = &options.store {
        config.store.path = path.clone();
    }
    if let Some(url) = &options.database_url {
        config.remote.database_url = url.clone();
    }
    config
}

fn build_controller(options: &GlobalOptions) -> Result<AggregationController<RealtimeDbClient>> {
    let config = build_config(options);
    let store = Arc::new(SqliteStore::open(&config.store.path)?);
    let remote = RealtimeDbClient::new(&config.remote)?;

    Ok(AggregationController::init(
        ControllerSettings::from(&config),
        store,
        remote,
        Arc::new(SystemClock),
    ))
}

fn cancel_on_ctrl_c(signal: CancelSignal) {
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            info!("Interrupted, cancelling pending requests");
            signal.cancel();
        }
    });
}
