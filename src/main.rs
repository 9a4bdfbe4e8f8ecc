use clap::Parser;
use color_eyre::eyre::Result;
use tokio::io::{AsyncBufReadExt, BufReader};

use threadsync::{
    cli::Cli,
    core::msg::SyncMsg,
    core::state::{SyncLimits, SyncState},
    infrastructure::{config::Config, runtime::SyncRuntime},
    utils::{initialize_logging, initialize_panic_handler},
};

async fn tokio_main() -> Result<()> {
    initialize_logging()?;

    initialize_panic_handler()?;

    let args = <Cli as Parser>::parse();

    // Load configuration (file-based), then apply CLI overrides
    let mut config = Config::new()?;
    if let Some(backend_url) = args.backend_url.clone() {
        config.backend_url = backend_url;
    }
    if let Some(page_size) = args.page_size {
        config.page_size = page_size;
    }
    if let Some(viewer_id) = args.viewer_id {
        config.viewer_id = Some(viewer_id);
    }

    let thread = args.thread_id();
    let state = SyncState::new(thread).with_limits(SyncLimits {
        fallback_page_size: config.page_size,
        max_message_length: config.max_message_length,
    });

    let mut runtime = SyncRuntime::new(state, &config)?;

    // Stdin lines become drafts; "/older" pages further back.
    let sender = runtime.msg_sender();
    tokio::spawn(async move {
        let mut lines = BufReader::new(tokio::io::stdin()).lines();
        while let Ok(Some(line)) = lines.next_line().await {
            if line.trim() == "/older" {
                if sender.send(SyncMsg::LoadOlder).is_err() {
                    break;
                }
                continue;
            }
            if sender.send(SyncMsg::EditDraft(line)).is_err() {
                break;
            }
            if sender.send(SyncMsg::Submit).is_err() {
                break;
            }
        }
    });

    println!("Tailing {thread}. Type a message and press enter to send; /older loads history.");
    runtime.run().await
}

#[tokio::main]
async fn main() -> Result<()> {
    if let Err(e) = tokio_main().await {
        eprintln!("{} error: Something went wrong", env!("CARGO_PKG_NAME"));
        Err(e)
    } else {
        Ok(())
    }
}
