use std::sync::Arc;

use actix_web::{web, App, HttpServer};
use anyhow::{bail, Context};
use clap::Parser;
use env_logger::Env;
use log::{error, info};

use subprofile::interfaces::ConversionOptions;
use subprofile::models::AppState;
use subprofile::parser::{explode_batch, ParseOutcome};
use subprofile::settings::init_settings;
use subprofile::storage::Database;
use subprofile::web_handlers::interfaces;
use subprofile::Settings;

/// Convert proxy share links into Clash profiles served by token
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Path to the configuration file
    #[arg(short, long, value_name = "FILE")]
    config: Option<String>,

    /// Listen address (e.g., 127.0.0.1 or 0.0.0.0)
    #[arg(short, long, value_name = "ADDRESS")]
    address: Option<String>,

    /// Listen port
    #[arg(short, long, value_name = "PORT")]
    port: Option<u16>,

    /// Subscription URL to convert directly instead of starting the server
    #[arg(long, value_name = "URL", conflicts_with = "links")]
    url: Option<String>,

    /// File with one share link per line to convert directly
    #[arg(long, value_name = "FILE")]
    links: Option<String>,

    /// Rule set used for direct conversion
    #[arg(long, value_name = "NAME", default_value = "default")]
    rule: String,

    /// Where to write the profile of a direct conversion
    #[arg(short, long, value_name = "OUTPUT_FILE")]
    output: Option<String>,
}

fn open_state(settings: &Settings) -> anyhow::Result<Arc<AppState>> {
    let db = Arc::new(
        Database::open(&settings.database.path)
            .with_context(|| format!("opening database {}", settings.database.path))?,
    );
    let state = AppState::new(db, settings);
    state
        .accounts
        .ensure_default_user(
            &settings.default_user.username,
            &settings.default_user.password,
        )
        .context("creating default user")?;
    Ok(Arc::new(state))
}

/// Converts `--url` or `--links` input and writes the profile to `output`.
async fn convert_once(state: &AppState, args: &Args, output: &str) -> anyhow::Result<()> {
    let options = ConversionOptions::default().rule(&args.rule);
    let result = match (&args.url, &args.links) {
        (Some(url), _) => state.converter.convert_subscription(url, &options).await?,
        (None, Some(path)) => {
            let content = tokio::fs::read_to_string(path)
                .await
                .with_context(|| format!("reading links from {}", path))?;
            let ParseOutcome { nodes, failures } = explode_batch(content.lines());
            if failures > 0 {
                info!("{} links in {} could not be parsed", failures, path);
            }
            state.converter.generate_from_nodes(nodes, &options)?
        }
        (None, None) => bail!("--output needs --url or --links"),
    };

    let profile = state.converter.fetch_profile(&result.token)?;
    tokio::fs::write(output, profile.document)
        .await
        .with_context(|| format!("writing {}", output))?;
    info!(
        "Wrote {} proxies to {} (token {})",
        result.proxies_count, output, result.token
    );
    Ok(())
}

#[actix_web::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    let direct = args.url.is_some() || args.links.is_some();
    if direct != args.output.is_some() {
        eprintln!("Error: --url/--links and -o/--output must be used together");
        std::process::exit(1);
    }

    if let Err(err) = init_settings(args.config.as_deref().unwrap_or("")) {
        eprintln!("Error: failed to load settings: {}", err);
        std::process::exit(1);
    }

    {
        let mut settings_guard = Settings::current_mut();
        let settings = Arc::make_mut(&mut *settings_guard);
        if let Some(address) = &args.address {
            settings.server.listen_address = address.clone();
        }
        if let Some(port) = args.port {
            settings.server.listen_port = port;
        }
    }
    let settings = Settings::current();

    env_logger::init_from_env(Env::default().default_filter_or(settings.log.level.as_str()));

    let app_state = open_state(&settings)?;

    if let Some(output) = &args.output {
        if let Err(err) = convert_once(&app_state, &args, output).await {
            error!("Conversion failed: {:#}", err);
            return Err(err);
        }
        return Ok(());
    }

    let listen_address = if settings.server.listen_address.contains(':') {
        settings.server.listen_address.clone()
    } else {
        format!(
            "{}:{}",
            settings.server.listen_address, settings.server.listen_port
        )
    };
    let base_path = settings.server.base_path.clone();
    info!("subprofile starting on {}{}", listen_address, base_path);

    HttpServer::new(move || {
        App::new()
            .app_data(web::Data::new(Arc::clone(&app_state)))
            .service(web::scope(&base_path).configure(interfaces::config))
            .route("/health", web::get().to(|| async { "subprofile is running" }))
    })
    .bind(listen_address.as_str())?
    .workers(settings.server.max_concur_threads.max(1))
    .run()
    .await?;
    Ok(())
}
