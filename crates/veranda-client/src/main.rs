use std::time::Duration;

use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::info;

use veranda_geo::{ProviderSpec, UnsupportedBridge};
use veranda_store::{AttachmentStoreClient, LogStoreClient, StoreConfig};
use veranda_sync::{Delivery, Phase, SyncEngine, ViewEntry, engine::DEFAULT_TICK};
use veranda_types::{AttachmentUpload, MessageDraft};

/// File types accepted for attachments at this boundary.
const ALLOWED_EXTENSIONS: &[&str] = &["png", "jpg", "jpeg", "gif", "pdf", "txt"];

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env if present
    let _ = dotenvy::dotenv();

    // Init logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "veranda=info".into()),
        )
        .init();

    // Config
    let config = StoreConfig::from_env();
    if config.api_key.is_empty() {
        eprintln!("FATAL: VERANDA_STORE_KEY is unset.");
        eprintln!("       Set it in your .env file and restart.");
        std::process::exit(1);
    }
    let tick = std::env::var("VERANDA_TICK_SECS")
        .ok()
        .and_then(|v| v.parse().ok())
        .map(Duration::from_secs)
        .unwrap_or(DEFAULT_TICK);

    let log_store = LogStoreClient::new(&config)?;
    let attachments = AttachmentStoreClient::new(&config)?;
    let mut engine = SyncEngine::new(
        log_store,
        attachments,
        ProviderSpec::builtin(),
        UnsupportedBridge,
    );

    info!(store = %config.base_url, session = %engine.session().id, "veranda client starting");
    engine.record_visit().await;

    println!("Welcome to veranda.");
    println!("Type /start to join, then `name: message` to post.");
    println!("Stage a file with /attach <path>; it goes out with your next message.");

    let mut interval = tokio::time::interval(tick);
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut staged: Option<AttachmentUpload> = None;
    let mut shown = 0usize;

    loop {
        tokio::select! {
            _ = interval.tick() => {
                engine.tick().await;
                shown = render(&engine.view().entries(), shown);
            }
            line = lines.next_line() => {
                let Some(line) = line? else { break };
                handle_line(&mut engine, line.trim(), &mut staged).await;
                shown = render(&engine.view().entries(), shown);
            }
        }
    }

    Ok(())
}

async fn handle_line(
    engine: &mut SyncEngine<UnsupportedBridge>,
    line: &str,
    staged: &mut Option<AttachmentUpload>,
) {
    if line.is_empty() {
        return;
    }

    if line == "/start" {
        engine.grant_consent().await;
        println!("-- chat active --");
        return;
    }

    if let Some(path) = line.strip_prefix("/attach ") {
        match stage_attachment(path.trim()).await {
            Ok(upload) => {
                println!("staged {} ({} bytes)", upload.file_name, upload.data.len());
                *staged = Some(upload);
            }
            Err(e) => println!("! {e}"),
        }
        return;
    }

    if engine.phase() != Phase::Active {
        println!("! type /start first");
        return;
    }

    let Some((author, body)) = line.split_once(':') else {
        println!("! use `name: message`");
        return;
    };

    let draft = MessageDraft {
        author: author.trim().to_string(),
        body: body.trim().to_string(),
        attachment: staged.take(),
    };

    match engine.submit(draft).await {
        Ok(outcome) => {
            if let Some(e) = outcome.upload_error {
                println!("! attachment not stored: {e}");
            }
            if let Some(e) = outcome.append_error {
                println!("! message not delivered: {e}");
            }
        }
        Err(e) => println!("! {e}"),
    }
}

async fn stage_attachment(path: &str) -> anyhow::Result<AttachmentUpload> {
    let file_name = std::path::Path::new(path)
        .file_name()
        .and_then(|n| n.to_str())
        .ok_or_else(|| anyhow::anyhow!("not a file path: {path}"))?
        .to_string();

    let extension = std::path::Path::new(&file_name)
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or_default()
        .to_ascii_lowercase();
    if !ALLOWED_EXTENSIONS.contains(&extension.as_str()) {
        anyhow::bail!("unsupported file type .{extension} (allowed: {ALLOWED_EXTENSIONS:?})");
    }

    let data = tokio::fs::read(path).await?;
    Ok(AttachmentUpload {
        content_type: content_type_for(&extension),
        file_name,
        data,
    })
}

fn content_type_for(extension: &str) -> String {
    match extension {
        "png" => "image/png",
        "jpg" | "jpeg" => "image/jpeg",
        "gif" => "image/gif",
        "pdf" => "application/pdf",
        "txt" => "text/plain",
        _ => "application/octet-stream",
    }
    .to_string()
}

/// Print entries past the high-water mark; the log is append-only so new
/// rows land at the end.
fn render(entries: &[ViewEntry], shown: usize) -> usize {
    for entry in entries.iter().skip(shown) {
        let badge = match entry.delivery {
            Delivery::Synced => "",
            Delivery::Pending => " [sending]",
            Delivery::Failed => " [failed]",
        };
        let attachment = entry
            .message
            .attachment
            .as_ref()
            .map(|a| format!(" ({} {})", a.file_name, a.content_type))
            .unwrap_or_default();
        println!(
            "{} [{}]: {}{}{}",
            entry.message.author,
            entry.message.created_at.format("%Y-%m-%d %H:%M:%S"),
            entry.message.body,
            attachment,
            badge,
        );
    }
    entries.len().max(shown)
}
