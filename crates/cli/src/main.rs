//! Moepictures search CLI (`moesearch`)
//!
//! Compiles post, tag, tag category and group searches and either prints
//! the statements (`explain`) or runs them against PostgreSQL.

mod config;

use clap::Parser;
use serde_json::{Value, json};
use tracing::info;

use moepictures_search::core::Executor;
use moepictures_search::dispatch::SearchService;
use moepictures_search::query::{Statement, compile_post_search};
use moepictures_search::types::Condition;

use crate::config::{CliConfig, Command, PostArgs};

/// Initializes the tracing subscriber.
///
/// `RUST_LOG` takes precedence over the configured level.
fn init_logging(level: &str) {
    use tracing_subscriber::{EnvFilter, fmt, prelude::*};

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new(format!("moepictures_search={level},moesearch={level}"))
    });

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(filter)
        .init();
}

fn print_json(value: &Value) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

/// Renders a statement with each parameter's placeholder and bound type.
fn describe(statement: &Statement) -> Value {
    let params: Vec<Value> = statement
        .values
        .iter()
        .enumerate()
        .map(|(i, param)| {
            json!({
                "placeholder": format!("${}", i + 1),
                "type": param.sql_type(),
                "value": param,
            })
        })
        .collect();
    json!({
        "text": statement.text,
        "rowMode": statement.row_mode,
        "params": params,
    })
}

fn explain(args: &PostArgs) -> anyhow::Result<()> {
    let search = args.to_search()?;
    let statements = compile_post_search(&search);
    print_json(&json!({
        "sort": statements.sort.to_string(),
        "count": describe(&statements.count),
        "page": describe(&statements.page),
    }))
}

#[cfg_attr(not(feature = "postgres"), allow(dead_code))]
async fn run<E: Executor>(service: SearchService<E>, command: &Command) -> anyhow::Result<()> {
    let rows = match command {
        Command::Explain(args) => return explain(args),
        Command::Posts(args) => {
            let search = args.to_search()?;
            let rows = match (&search.condition, &search.format) {
                (Some(Condition::PixivId(id)), _) => service.search_pixiv_id(id, &search).await?,
                (Some(Condition::TwitterId(id)), _) => {
                    service.search_twitter_id(id, &search).await?
                }
                (Some(Condition::Source(source)), _) => {
                    service.search_source(source, &search).await?
                }
                (None, Some(format)) => service.search_format(format, &search).await?,
                (None, None) => service.search(&search).await?,
            };
            serde_json::to_value(rows)?
        }
        Command::Tags(args) => serde_json::to_value(service.tag_search(&args.to_search()?).await?)?,
        Command::Category(args) => {
            serde_json::to_value(service.tag_category(&args.to_search()?).await?)?
        }
        Command::Groups(args) => {
            serde_json::to_value(service.group_search(&args.to_search()?).await?)?
        }
    };
    print_json(&rows)
}

#[cfg(feature = "postgres")]
async fn start(config: &CliConfig) -> anyhow::Result<()> {
    use moepictures_search::backends::postgres::{PostgresConfig, PostgresExecutor};
    use moepictures_search::core::CachingExecutor;

    let url = config
        .database_url
        .as_deref()
        .ok_or_else(|| anyhow::anyhow!("A database URL is required"))?;
    let pg_config =
        PostgresConfig::from_connection_string(url)?.with_max_connections(config.max_connections);
    info!(host = %pg_config.host, dbname = %pg_config.dbname, "Connecting to PostgreSQL");

    let executor = PostgresExecutor::new(pg_config).await?;
    let service = SearchService::new(CachingExecutor::new(executor, config.cache_config()));
    run(service, &config.command).await
}

#[cfg(not(feature = "postgres"))]
async fn start(_config: &CliConfig) -> anyhow::Result<()> {
    anyhow::bail!(
        "Running searches requires the 'postgres' feature. \
         Build with: cargo build -p moepictures-cli --features postgres"
    )
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = CliConfig::parse();
    init_logging(&config.log_level);

    if let Err(errors) = config.validate() {
        for error in &errors {
            eprintln!("Configuration error: {}", error);
        }
        std::process::exit(1);
    }

    if let Command::Explain(args) = &config.command {
        return explain(args);
    }

    start(&config).await
}
