use std::{fs, path::PathBuf, sync::Arc};

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use client_core::{
    load_settings, load_settings_from, ClientSettings, ControlDescriptor, DispatchOutcome,
    InMemoryNavigator, NavigationEvent, ShopClient,
};
use shared::domain::SortValue;
use tracing::info;
use url::Url;

#[derive(Parser, Debug)]
#[command(about = "Drive the shop's cart and sort controls from the terminal")]
struct Cli {
    /// Settings file; defaults to ./shop_client.toml when present.
    #[arg(long)]
    config: Option<PathBuf>,
    #[arg(long)]
    base_url: Option<String>,
    #[arg(long)]
    csrf_token: Option<String>,
    /// Session identity rendered by the page (`AnonymousUser` when logged out).
    #[arg(long)]
    user: Option<String>,
    #[arg(long)]
    serialize_per_product: bool,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    UpdateCart {
        #[arg(long)]
        product: String,
        #[arg(long)]
        action: String,
        #[arg(long, default_value = "http://127.0.0.1:8000/cart/")]
        page_url: String,
    },
    Sort {
        #[arg(long)]
        page_url: String,
        #[arg(long)]
        value: String,
    },
    /// Bind a JSON list of control descriptors and click one of them.
    Click {
        #[arg(long)]
        page_url: String,
        #[arg(long)]
        controls: PathBuf,
        #[arg(long)]
        index: usize,
    },
}

fn resolve_settings(cli: &Cli) -> Result<ClientSettings> {
    let mut settings = match &cli.config {
        Some(path) => {
            load_settings_from(Some(path.as_path()), |key| std::env::var(key).ok())?
        }
        None => load_settings()?,
    };
    if let Some(v) = &cli.base_url {
        settings.base_url = v.clone();
    }
    if let Some(v) = &cli.csrf_token {
        settings.csrf_token = v.clone();
    }
    if let Some(v) = &cli.user {
        settings.session_user = v.clone();
    }
    if cli.serialize_per_product {
        settings.serialize_per_product = true;
    }
    Ok(settings)
}

fn build_client(
    settings: &ClientSettings,
    page_url: &str,
) -> Result<(ShopClient, Arc<InMemoryNavigator>)> {
    let start = Url::parse(page_url).with_context(|| format!("invalid page url '{page_url}'"))?;
    let navigator = Arc::new(InMemoryNavigator::new(start));
    let client = ShopClient::from_settings(settings, navigator.clone())
        .with_context(|| format!("invalid shop base url '{}'", settings.base_url))?;
    Ok((client, navigator))
}

fn report_cart_outcome(outcome: DispatchOutcome) -> Result<()> {
    match outcome {
        DispatchOutcome::SkippedAnonymous => println!("skipped: anonymous session"),
        DispatchOutcome::Reloaded { response } => {
            println!("response {}", serde_json::to_string(&response)?)
        }
    }
    Ok(())
}

fn print_navigation(navigator: &InMemoryNavigator) {
    for event in navigator.history() {
        match event {
            NavigationEvent::Navigated(url) => println!("navigate {url}"),
            NavigationEvent::Reloaded(url) => println!("reload {url}"),
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();
    let cli = Cli::parse();
    let settings = resolve_settings(&cli)?;
    info!(
        base_url = %settings.base_url,
        user = %settings.session_user,
        serialize_per_product = settings.serialize_per_product,
        "shop client configured"
    );

    match &cli.command {
        Command::UpdateCart {
            product,
            action,
            page_url,
        } => {
            let (client, navigator) = build_client(&settings, page_url)?;
            let control = ControlDescriptor::update_cart(product.clone(), action.clone());
            let outcome = client
                .dispatcher()
                .handle_click(&control)
                .await
                .context("cart update failed")?;
            report_cart_outcome(outcome)?;
            print_navigation(&navigator);
        }
        Command::Sort { page_url, value } => {
            let (client, _navigator) = build_client(&settings, page_url)?;
            let next = client
                .sorter()
                .update_sort_value(&SortValue::new(value.clone()));
            println!("navigate {next}");
        }
        Command::Click {
            page_url,
            controls,
            index,
        } => {
            let raw = fs::read_to_string(controls).with_context(|| {
                format!("failed to read controls file '{}'", controls.display())
            })?;
            let descriptors: Vec<ControlDescriptor> =
                serde_json::from_str(&raw).with_context(|| {
                    format!("failed to parse controls file '{}'", controls.display())
                })?;

            let (client, navigator) = build_client(&settings, page_url)?;
            let page = client.bind_page(descriptors);
            let outcome = page.click(*index).await;
            if outcome.is_unbound() {
                println!("no listener bound to control {index}");
                return Ok(());
            }
            if let Some(cart) = outcome.cart {
                report_cart_outcome(cart.context("cart update failed")?)?;
            }
            if let Some(Err(err)) = outcome.sort {
                bail!("sort failed: {err}");
            }
            print_navigation(&navigator);
        }
    }

    Ok(())
}
