// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

use std::{process, sync::Arc, time::Duration};

use axum_server::{tls_rustls::RustlsConfig, Handle};
use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn};

use domain_claim_bot::{
    api::router,
    claim::{ClaimWorkflow, PendingClaims, PendingSweeper, WorkflowSettings},
    config::Config,
    discord::{claim_command, CommandRegistrar, RequestVerifier},
    signing::StarkSigner,
    state::AppState,
    storage::ClaimDatabase,
    telemetry,
};

const SHUTDOWN_GRACE: Duration = Duration::from_secs(10);

#[tokio::main]
async fn main() {
    let config = match Config::from_env() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Configuration error: {e}");
            process::exit(1);
        }
    };
    telemetry::init(config.log_format);

    if let Err(e) = run(config).await {
        error!(error = %e, "Server exited with error");
        process::exit(1);
    }
}

async fn run(config: Config) -> Result<(), Box<dyn std::error::Error>> {
    // Install the ring crypto provider for rustls (must be done before any TLS operations)
    if rustls::crypto::ring::default_provider()
        .install_default()
        .is_err()
    {
        warn!("rustls crypto provider already installed");
    }

    let db = ClaimDatabase::open(&config.claims_db_path)?;
    info!(
        path = %config.claims_db_path.display(),
        claims = db.count()?,
        "Claims database opened"
    );

    let signer = StarkSigner::from_private_key(&config.signer_private_key)?;
    info!(public_key = %signer.public_key(), "Claim signer loaded");

    let verifier =
        RequestVerifier::from_hex(&config.discord.public_key)?.with_max_skew(config.discord.max_skew);

    let workflow = Arc::new(ClaimWorkflow::new(
        WorkflowSettings {
            required_role_id: config.og_role_id.clone(),
            claim_site: config.website_url.clone(),
        },
        Arc::new(db),
        Arc::new(signer),
        PendingClaims::new(config.pending_capacity, config.pending_ttl),
    ));

    let shutdown = CancellationToken::new();
    let sweeper = PendingSweeper::new(workflow.clone()).with_interval(config.sweep_interval);
    tokio::spawn(sweeper.run(shutdown.clone()));

    match &config.discord.bot_token {
        Some(token) => {
            let registrar = CommandRegistrar::new(config.discord.application_id.clone(), token)?;
            if let Err(e) = registrar.register(&[claim_command()]).await {
                error!(error = %e, "Failed to register slash commands");
            }
        }
        None => info!("BOT_TOKEN not set, skipping slash command registration"),
    }

    let app = router(AppState::new(workflow, verifier));
    let addr = config.bind_addr()?;

    let handle = Handle::new();
    let signal_handle = handle.clone();
    let signal_shutdown = shutdown.clone();
    tokio::spawn(async move {
        wait_for_signal().await;
        info!("Shutdown signal received, draining connections");
        signal_shutdown.cancel();
        signal_handle.graceful_shutdown(Some(SHUTDOWN_GRACE));
    });

    match &config.tls {
        Some(tls) => {
            let tls_config = RustlsConfig::from_pem_file(&tls.cert_path, &tls.key_path).await?;
            info!(%addr, "Domain claim bot listening on https (docs at /docs)");
            axum_server::bind_rustls(addr, tls_config)
                .handle(handle)
                .serve(app.into_make_service())
                .await?;
        }
        None => {
            info!(%addr, "Domain claim bot listening on http (docs at /docs)");
            axum_server::bind(addr)
                .handle(handle)
                .serve(app.into_make_service())
                .await?;
        }
    }

    shutdown.cancel();
    info!("Server stopped");
    Ok(())
}

async fn wait_for_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            error!(error = %e, "Failed to listen for Ctrl-C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                error!(error = %e, "Failed to listen for SIGTERM");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {}
        _ = terminate => {}
    }
}
