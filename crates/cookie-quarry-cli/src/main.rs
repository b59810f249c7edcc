use std::path::PathBuf;

use clap::Parser;
use cookie_quarry::{CookieSpec, QueryOptions};

#[derive(Parser)]
#[command(
    name = "cookie-quarry",
    about = "Query browser cookie stores by name and domain pattern"
)]
struct Cli {
    /// Cookie name pattern (% or * matches everything)
    name: String,

    /// Cookie domain pattern (% or * matches everything)
    domain: String,

    /// Restrict to one browser: chrome, chromium, edge, arc, opera,
    /// opera-gx, brave, firefox, safari
    #[arg(long)]
    browser: Option<String>,

    /// Read a single store file instead of discovering profiles
    #[arg(long)]
    store: Option<PathBuf>,

    /// Copy locked databases to a scratch path and retry
    #[arg(long)]
    force: bool,

    /// Maximum number of cookies to return
    #[arg(long)]
    limit: Option<usize>,

    /// Drop cookies whose expiry is in the past
    #[arg(long)]
    remove_expired: bool,

    /// Output format: json or text
    #[arg(long, default_value = "json")]
    output: String,

    /// Increase log verbosity (-v info, -vv debug)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let spec = CookieSpec::new(cli.name, cli.domain);
    let options = QueryOptions {
        limit: cli.limit,
        remove_expired: cli.remove_expired,
        store: cli.store,
        force: cli.force,
        browser: cli.browser,
    };

    let cookies = cookie_quarry::query_cookies(&[spec], &options).await;

    match cli.output.as_str() {
        "text" => {
            for cookie in &cookies {
                println!("{}\t{}\t{}", cookie.name, cookie.domain, cookie.value);
            }
        }
        _ => match serde_json::to_string_pretty(&cookies) {
            Ok(json) => println!("{json}"),
            Err(err) => {
                eprintln!("failed to render output: {err}");
                std::process::exit(1);
            }
        },
    }
}

fn init_tracing(verbosity: u8) {
    use tracing_subscriber::EnvFilter;

    let default = match verbosity {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}
