// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

#![deny(
    clippy::pedantic,
    clippy::nursery,
    clippy::style,
    clippy::correctness,
    clippy::all
)]
#![allow(clippy::multiple_crate_versions)]

mod app;
mod config;
mod session;

#[cfg(test)]
mod tests;

use std::path::PathBuf;
use std::sync::Arc;

use axum::Router;
use clap::{Parser, Subcommand};
use eidiv_api::ReportDelivery;
use eidiv_persistence::{Persistence, PersistenceError};
use eidiv_reports::{
    LogTransport, MailTransport, PdfReportRenderer, ReportDistributor, SpoolTransport,
};
use time::OffsetDateTime;
use tracing::{info, warn};

use crate::app::{AppState, build_router};
use crate::config::{Config, MailTransportKind};

/// `EiDiV` Server - incident and duty records of a volunteer fire department
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// TOML configuration file. Defaults to `eidiv.toml` if present.
    #[arg(short, long, env = "EIDIV_CONFIG")]
    config: Option<PathBuf>,

    /// Path to the `SQLite` database file. If not provided, uses in-memory database.
    #[arg(short, long)]
    database: Option<PathBuf>,

    /// Address to bind the server to
    #[arg(long)]
    bind: Option<String>,

    /// Port to bind the server to
    #[arg(short, long)]
    port: Option<u16>,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
enum Command {
    /// Run the HTTP server (default)
    Serve,
    /// Create an admin operator unless the login already exists
    EnsureAdmin {
        #[arg(long)]
        login: String,
        /// Generated and printed when omitted
        #[arg(long)]
        password: Option<String>,
    },
    /// Send a test message to all active recipients
    SendTestMail {
        /// Attach a one-page PDF
        #[arg(long)]
        with_pdf: bool,
    },
}

impl Args {
    /// Applies command-line overrides on top of the loaded configuration.
    fn apply(&self, config: &mut Config) {
        if let Some(database) = &self.database {
            config.database.path = Some(database.clone());
        }
        if let Some(bind) = &self.bind {
            config.server.bind.clone_from(bind);
        }
        if let Some(port) = self.port {
            config.server.port = port;
        }
    }
}

fn open_persistence(config: &Config) -> Result<Persistence, PersistenceError> {
    if let Some(db_path) = &config.database.path {
        info!("Using file-based database at: {}", db_path.display());
        Persistence::new_with_file(db_path)
    } else {
        info!("Using in-memory database");
        Persistence::new_in_memory()
    }
}

fn build_transport(config: &Config) -> Arc<dyn MailTransport> {
    match config.mail.transport {
        MailTransportKind::Log => Arc::new(LogTransport),
        MailTransportKind::Spool => {
            info!("Spooling mail to {}", config.mail.spool_dir.display());
            Arc::new(SpoolTransport::new(config.mail.spool_dir.clone()))
        }
    }
}

fn build_distributor(config: &Config) -> ReportDistributor {
    ReportDistributor::new(build_transport(config), config.mail_settings())
}

/// 128 random bits, hex encoded.
fn generate_password() -> String {
    format!("{:016x}{:016x}", rand::random::<u64>(), rand::random::<u64>())
}

async fn serve(
    config: &Config,
    mut persistence: Persistence,
) -> Result<(), Box<dyn std::error::Error>> {
    let expired: usize = persistence.delete_expired_sessions(OffsetDateTime::now_utc())?;
    if expired > 0 {
        info!(expired, "Removed expired sessions");
    }

    let renderer = PdfReportRenderer::new(&config.department.name, config.timezone()?);
    let delivery = ReportDelivery::new(Arc::new(renderer), build_distributor(config));
    let app_state: AppState = AppState::new(persistence, delivery, config.recording_settings()?);

    let app: Router = build_router(app_state);

    let addr: std::net::SocketAddr = config.socket_addr()?;
    info!("Server listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!(error = %e, "Failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    info!("Shutdown signal received");
}

fn ensure_admin(
    persistence: &mut Persistence,
    login: &str,
    password: Option<&str>,
) -> Result<(), Box<dyn std::error::Error>> {
    let (password, generated): (String, bool) = password.map_or_else(
        || (generate_password(), true),
        |password| (password.to_string(), false),
    );
    let login_name: String = login.trim().to_uppercase();

    if !eidiv_api::ensure_admin(persistence, login, &password)? {
        println!("Operator {login_name} already exists, nothing changed");
    } else if generated {
        println!("Created admin operator {login_name} with password: {password}");
    } else {
        println!("Created admin operator {login_name}");
    }
    Ok(())
}

fn send_test_mail(
    config: &Config,
    persistence: &mut Persistence,
    with_pdf: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    let recipients: Vec<String> = persistence.active_recipient_emails()?;
    if recipients.is_empty() {
        warn!("No active mail recipients configured, nothing sent");
        return Ok(());
    }

    let now: OffsetDateTime = OffsetDateTime::now_utc();
    let renderer = PdfReportRenderer::new(&config.department.name, config.timezone()?);
    let pdf: Option<Vec<u8>> = with_pdf.then(|| renderer.render_test_page(now));

    let sent: usize = build_distributor(config).send_test(&recipients, now, pdf)?;
    info!(sent, recipients = recipients.len(), "Test mail sent");
    Ok(())
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args: Args = Args::parse();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let mut config: Config = Config::load(args.config.as_deref())?;
    args.apply(&mut config);
    config.validate()?;

    info!(department = %config.department.name, "Initializing EiDiV Server");
    let mut persistence: Persistence = open_persistence(&config)?;

    match args.command.clone().unwrap_or(Command::Serve) {
        Command::Serve => serve(&config, persistence).await,
        Command::EnsureAdmin { login, password } => {
            ensure_admin(&mut persistence, &login, password.as_deref())
        }
        Command::SendTestMail { with_pdf } => send_test_mail(&config, &mut persistence, with_pdf),
    }
}
