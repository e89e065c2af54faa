//! `maildigest` - short plain-text digests of unread email.
//!
//! Reads messages from files, a directory of `.eml` files or a Gmail inbox
//! and prints one digest per message to stdout. Logs go to stderr.

#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![forbid(unsafe_code)]

mod cli;
mod settings;

use anyhow::{Context, Result};
use clap::Parser;
use maildigest_core::DigestOptions;
use maildigest_source::{
    Credentials, DEFAULT_QUERY, DigestEntry, DirectorySource, FileSource, FileTokenStore,
    GmailSource, KeyringTokenStore, MessageSource, OAuthClient, collect_digests,
    collect_summaries, mark_digested_read,
};
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use cli::{Cli, Command, GmailArgs};
use settings::Settings;

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                "maildigest=info,maildigest_source=info,maildigest_core=warn".into()
            }),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();
    let settings = Settings::load(cli.config.as_deref())?;
    let options = cli.digest.apply(settings.digest);

    let entries = match &cli.command {
        Command::Files { paths } => {
            let source = FileSource::new(paths.iter().cloned());
            run(&source, &options, cli.mark_read).await?
        }
        Command::Dir { path } => {
            let source = DirectorySource::new(path);
            run(&source, &options, cli.mark_read).await?
        }
        Command::Gmail(args) => gmail(args, &settings, &options, &cli).await?,
    };

    println!("{}", render(&entries, &settings.separator));
    Ok(())
}

async fn run<S>(source: &S, options: &DigestOptions, mark_read: bool) -> Result<Vec<DigestEntry>>
where
    S: MessageSource + Sync,
{
    let entries = collect_digests(source, options)
        .await
        .context("Failed to list messages")?;
    if mark_read {
        finish(source, &entries).await?;
    }
    Ok(entries)
}

async fn finish<S>(source: &S, entries: &[DigestEntry]) -> Result<()>
where
    S: MessageSource + Sync,
{
    let marked = mark_digested_read(source, entries)
        .await
        .context("Failed to mark messages read")?;
    info!("Marked {marked} messages read");
    Ok(())
}

async fn gmail(
    args: &GmailArgs,
    settings: &Settings,
    options: &DigestOptions,
    cli: &Cli,
) -> Result<Vec<DigestEntry>> {
    let credentials_path = args
        .credentials
        .clone()
        .unwrap_or_else(|| settings.credentials_path());
    let credentials = Credentials::from_file(&credentials_path)?;

    let http_client = reqwest::Client::new();
    let oauth = OAuthClient::new(credentials, http_client.clone());
    let token = match args.keyring.as_ref().or(settings.keyring_account.as_ref()) {
        Some(account) => oauth.fresh_token(&KeyringTokenStore::new(account)).await,
        None => {
            let path = args.token.clone().unwrap_or_else(|| settings.token_path());
            oauth.fresh_token(&FileTokenStore::new(path)).await
        }
    }
    .context("No usable Gmail token")?;

    let query = args
        .query
        .as_deref()
        .or(settings.query.as_deref())
        .unwrap_or(DEFAULT_QUERY);
    let source = GmailSource::new(http_client, token)?.with_query(query);

    let entries = if args.tree {
        collect_summaries(&source, options, &cli.indent)
            .await
            .context("Failed to list messages")?
    } else {
        collect_digests(&source, options)
            .await
            .context("Failed to list messages")?
    };

    if cli.mark_read {
        finish(&source, &entries).await?;
    }
    Ok(entries)
}

/// Formats a batch for stdout: a count line, then the digests.
fn render(entries: &[DigestEntry], separator: &str) -> String {
    let digests: Vec<&str> = entries
        .iter()
        .filter_map(|entry| match &entry.result {
            Ok(digest) => Some(digest.as_str()),
            Err(e) => {
                warn!("{}: {e}", entry.id);
                None
            }
        })
        .collect();

    format!("{} unread messages\n{}", entries.len(), digests.join(separator))
}
