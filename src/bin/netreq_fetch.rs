//! netreq-fetch: issue one request through the cached, retrying executor.
//!
//! Usage:
//!   netreq-fetch [--cache] [--config <path>] [--header <name:value>]... [--post-json <json>] <url>

use anyhow::{bail, Context};
use bungie_netreq::{HttpRequest, NetreqConfig, RequestExecutor};
use tracing_subscriber::EnvFilter;

struct Args {
    use_cache: bool,
    headers: Vec<(String, String)>,
    post_json: Option<serde_json::Value>,
    url: String,
}

fn print_usage() {
    println!(
        r#"netreq-fetch: send a request through the bot's request layer

USAGE:
    netreq-fetch [OPTIONS] <URL>

OPTIONS:
    --cache                     Mark the request cache-eligible and send it twice
    --header <name:value>       Add a request header (repeatable)
    --post-json <json>          Send a POST with this JSON body instead of a GET
    --config <path>             Load YAML configuration before env overrides
    -h, --help                  Show this help message

ENVIRONMENT:
    NETREQ_*                    Configuration overrides (see crate docs)
    BUNGIE_API_KEY              Sent as X-API-Key when set
    RUST_LOG                    Log filter (default: info)"#
    );
}

fn parse_args(raw: &[String]) -> anyhow::Result<(Args, Option<String>)> {
    let mut use_cache = false;
    let mut headers = Vec::new();
    let mut post_json = None;
    let mut config_path = None;
    let mut url = None;

    let mut iter = raw.iter();
    while let Some(arg) = iter.next() {
        match arg.as_str() {
            "--cache" => use_cache = true,
            "--header" => {
                let value = iter.next().context("--header needs a value")?;
                let (name, v) = value
                    .split_once(':')
                    .with_context(|| format!("header '{}' is not name:value", value))?;
                headers.push((name.trim().to_string(), v.trim().to_string()));
            }
            "--post-json" => {
                let value = iter.next().context("--post-json needs a value")?;
                post_json = Some(serde_json::from_str(value).context("--post-json is not JSON")?);
            }
            "--config" => {
                config_path = Some(iter.next().context("--config needs a path")?.clone());
            }
            other if other.starts_with('-') => bail!("unknown option: {}", other),
            other => {
                if url.replace(other.to_string()).is_some() {
                    bail!("only one URL may be given");
                }
            }
        }
    }

    let url = url.context("missing URL")?;
    Ok((
        Args {
            use_cache,
            headers,
            post_json,
            url,
        },
        config_path,
    ))
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let raw: Vec<String> = std::env::args().skip(1).collect();
    if raw.is_empty() || raw.iter().any(|a| a == "-h" || a == "--help") {
        print_usage();
        return Ok(());
    }
    let (args, config_path) = parse_args(&raw)?;

    let config = match config_path {
        Some(path) => NetreqConfig::from_path(&path)
            .with_context(|| format!("loading {}", path))?
            .with_env_overrides(),
        None => NetreqConfig::from_env(),
    };
    let executor = RequestExecutor::builder().config(config).build()?;

    let mut request = match args.post_json {
        Some(body) => HttpRequest::post_json(&args.url, body),
        None => HttpRequest::get(&args.url),
    };
    if let Ok(key) = std::env::var("BUNGIE_API_KEY") {
        request = request.with_header("x-api-key", key);
    }
    request = request.with_headers(args.headers);

    let rounds = if args.use_cache { 2 } else { 1 };
    for round in 1..=rounds {
        let started = std::time::Instant::now();
        let response = executor.execute(args.use_cache, &request).await?;
        println!(
            "[{}] HTTP {} in {:?} ({} bytes)",
            round,
            response.status(),
            started.elapsed(),
            response.body().len()
        );
        if round == rounds {
            println!("{}", response.text());
        }
    }

    let stats = executor.cache().stats();
    println!(
        "cache: {} entries, {} hits, {} misses, hit ratio {:.2}",
        executor.cache().len(),
        stats.hits,
        stats.misses,
        stats.hit_ratio()
    );
    Ok(())
}
