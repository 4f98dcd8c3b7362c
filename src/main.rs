mod domain;
mod handlers;
mod repo;
mod help;
mod metrics;
mod config;
mod commands;
mod offers;
mod dedup;
mod notifier;
mod polling;

use std::net::SocketAddr;
use std::sync::Arc;
use rust_i18n::i18n;
use serenity::all::{Client, GatewayIntents};
use serenity::http::Http;
use crate::notifier::DiscordNotifier;
use crate::offers::EpicGamesSource;
use crate::polling::{LoopStatus, ManualTrigger, PollingLoop, Shutdown};

i18n!(fallback = "en");    // load localizations with default parameters

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    #[cfg(debug_assertions)]
    dotenvy::dotenv()?;

    pretty_env_logger::init();

    let token: String = config::get_env_mandatory_value("DISCORD_TOKEN")?;
    let app_config = config::AppConfig::from_env()?;
    let epic_config = config::EpicApiConfig::from_env()?;
    let database_config = config::DatabaseConfig::from_env();
    let db_conn = repo::establish_database_connection(&database_config).await?;
    let repos = repo::Repositories::new(&db_conn);

    let me = Http::new(&token).get_current_user().await?;
    let help_container = help::render_help_messages(help::Context {
        bot_name: me.name.clone(),
        interval: help::format_interval(app_config.polling.interval),
        announce_upcoming: app_config.polling.announce_upcoming,
    })?;

    let status = LoopStatus::default();
    let shutdown = Shutdown::default();
    let (trigger, trigger_rx) = ManualTrigger::channel();

    let handler = handlers::Handler::new(repos.clone(), app_config.clone(), help_container,
                                         status.clone(), trigger, shutdown.clone());
    let mut client = Client::builder(&token, GatewayIntents::GUILDS)
        .event_handler(handler)
        .await?;
    let shard_manager = client.shard_manager.clone();

    let source = EpicGamesSource::new(epic_config, repos.api_calls.clone())?;
    let notifier = DiscordNotifier::new(client.http.clone(), app_config.locale.clone());
    let polling_loop = PollingLoop::new(Arc::new(source), Arc::new(notifier), repos,
                                        app_config.polling.clone(), status, shutdown.clone());
    let mut polling_handle = tokio::spawn(polling_loop.run(trigger_rx));

    {
        let shutdown = shutdown.clone();
        tokio::spawn(async move {
            match tokio::signal::ctrl_c().await {
                Ok(()) => shutdown.trigger(),
                Err(e) => log::error!("failed to install CTRL+C signal handler: {e}"),
            }
        });
    }

    let addr = SocketAddr::from(([0, 0, 0, 0], app_config.metrics_port));
    let metrics_router = metrics::init();
    let srv = {
        let shutdown = shutdown.clone();
        tokio::spawn(async move {
            let tcp_listener = tokio::net::TcpListener::bind(addr).await?;
            axum::serve(tcp_listener, metrics_router)
                .with_graceful_shutdown(async move {
                    shutdown.wait().await;
                    log::info!("Shutdown of the metrics server")
                })
                .await
        })
    };

    log::info!("The gateway client is starting as {}...", me.name);
    let mut gateway = tokio::spawn(async move { client.start().await });
    tokio::select! {
        _ = shutdown.wait() => {}
        res = &mut gateway => {
            match res {
                Ok(Ok(())) => log::warn!("the gateway client has stopped"),
                Ok(Err(e)) => log::error!("the gateway client has failed: {e}"),
                Err(e) => log::error!("the gateway client task has failed: {e}"),
            }
            shutdown.trigger();
        }
    }

    let drain_timeout = app_config.polling.drain_timeout;
    match tokio::time::timeout(drain_timeout, &mut polling_handle).await {
        Ok(Ok(())) => log::info!("the polling loop has drained"),
        Ok(Err(e)) => log::error!("the polling loop task has failed: {e}"),
        Err(_) => {
            log::warn!("the polling loop didn't stop within {drain_timeout:?}, abandoning it");
            polling_handle.abort();
        }
    }

    shard_manager.shutdown_all().await;
    if let Err(e) = srv.await? {
        log::error!("the metrics server has failed: {e}");
    }
    db_conn.close().await;
    log::info!("Bye!");
    Ok(())
}
