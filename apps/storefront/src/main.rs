use std::{path::PathBuf, sync::Arc};

use anyhow::{Context, Result};
use clap::Parser;
use client_core::{
    config::SETTINGS_FILE, coordinator::WidgetOptions, load_settings, FeedbackChannel,
    HttpCartEndpoint, ProductWidget,
};
use tokio::{
    io::{AsyncBufReadExt, BufReader},
    sync::broadcast,
};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

mod catalog;
mod commands;
mod terminal;

use catalog::{find_entry, load_catalog, render_catalog};
use commands::{parse, Command, HELP};
use terminal::{render_event, render_selection, TerminalNavigator};

#[derive(Parser, Debug)]
struct Args {
    /// Settings file; missing files fall back to defaults.
    #[arg(long, default_value = SETTINGS_FILE)]
    config: PathBuf,
    /// Overrides `server_url` from the settings.
    #[arg(long)]
    server_url: Option<String>,
    /// JSON array of catalog entries.
    #[arg(long)]
    catalog: PathBuf,
    /// Session cookies to present, e.g. `sessionid=...` or `csrftoken=...`.
    #[arg(long = "cookie")]
    cookies: Vec<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();
    let args = Args::parse();

    let mut settings = load_settings(&args.config)?;
    if let Some(server_url) = args.server_url {
        settings.server_url = server_url;
    }
    let catalog = load_catalog(&args.catalog)?;
    info!(
        server_url = %settings.server_url,
        entries = catalog.len(),
        "storefront starting"
    );

    let endpoint = HttpCartEndpoint::new(&settings).context("failed to build cart endpoint")?;
    for cookie in &args.cookies {
        endpoint.add_cookie(cookie);
    }

    let (events, mut event_rx) = broadcast::channel(256);
    let feedback = Arc::new(FeedbackChannel::new(settings.toast_duration(), events.clone()));
    let (navigator, mut redirected) = TerminalNavigator::new();
    let widget = ProductWidget::new(
        Arc::new(endpoint),
        feedback.clone(),
        Arc::new(navigator),
        WidgetOptions::from_settings(&settings)?,
        events,
    );

    tokio::spawn(async move {
        loop {
            match event_rx.recv().await {
                Ok(event) => {
                    if let Some(line) = render_event(&event) {
                        println!("{line}");
                    }
                }
                Err(broadcast::error::RecvError::Lagged(skipped)) => {
                    warn!(skipped, "terminal fell behind widget events");
                }
                Err(broadcast::error::RecvError::Closed) => break,
            }
        }
    });

    println!("{}\n\ntype 'help' for commands", render_catalog(&catalog));
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        let line = tokio::select! {
            line = lines.next_line() => line.context("failed to read stdin")?,
            _ = redirected.changed() => break,
        };
        let Some(line) = line else { break };
        if line.trim().is_empty() {
            continue;
        }

        let command = match parse(&line) {
            Ok(command) => command,
            Err(usage) => {
                println!("{usage}");
                continue;
            }
        };

        match command {
            Command::List => println!("{}", render_catalog(&catalog)),
            Command::Open(key) => match find_entry(&catalog, &key) {
                Some(entry) => {
                    widget.open(entry);
                    if let Some(selection) = widget.selection() {
                        println!("{}", render_selection(&selection));
                    }
                }
                None => println!("no product '{key}'"),
            },
            Command::Show => match widget.selection() {
                Some(selection) => println!("{}", render_selection(&selection)),
                None => println!("no product open"),
            },
            Command::Increment => report_quantity(widget.increment_quantity()),
            Command::Decrement => report_quantity(widget.decrement_quantity()),
            Command::Quantity(raw) => match widget.set_quantity_raw(&raw) {
                Some(shown) => println!("quantity: {shown}"),
                None => println!("no product open"),
            },
            Command::Cutlery => match widget.toggle_cutlery() {
                Some(on) => println!("cutlery: {}", if on { "yes" } else { "no" }),
                None => println!("no product open"),
            },
            Command::Add => {
                let widget = Arc::clone(&widget);
                // outcomes reach the terminal through widget events
                tokio::spawn(async move {
                    let _ = widget.submit().await;
                });
            }
            Command::Close(reason) => {
                widget.close(reason);
            }
            Command::Remove(item_id) => {
                if let Ok(Some(total)) = widget.remove_item(item_id).await {
                    println!("cart total: {total}");
                }
            }
            Command::Clear => {
                let _ = widget.clear_cart().await;
            }
            Command::Help => println!("{HELP}"),
            Command::Quit => break,
        }
    }

    let badge = feedback.badge_view();
    info!(cart_total_items = badge.count, "storefront exiting");
    Ok(())
}

fn report_quantity(quantity: Option<u32>) {
    match quantity {
        Some(quantity) => println!("quantity: {quantity}"),
        None => println!("no product open"),
    }
}
