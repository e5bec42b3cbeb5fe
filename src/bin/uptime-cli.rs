use clap::{Parser, Subcommand};
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION};
use serde_json::Value;

#[derive(Parser)]
#[command(name = "uptime-cli")]
#[command(about = "Management CLI for the uptime scheduler", long_about = None)]
struct Cli {
    #[arg(short, long, default_value = "http://localhost:8081")]
    url: String,

    #[arg(short, long, env = "UPTIME_ADMIN_KEY", default_value = "CHANGE_ME_IN_PRODUCTION")]
    key: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show whether the scheduler runs and what it has scheduled
    Status,
    /// List recent check outcomes for a monitor, newest first
    Runs {
        id: String,
        #[arg(short, long, default_value_t = 50)]
        limit: usize,
    },
    /// Show uptime and response-time stats for a monitor
    Stats { id: String },
    /// Run a check for a monitor right now
    Check { id: String },
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let client = reqwest::Client::new();
    let base = cli.url.trim_end_matches('/');

    let mut headers = HeaderMap::new();
    headers.insert(
        AUTHORIZATION,
        HeaderValue::from_str(&format!("Bearer {}", cli.key))?,
    );

    let request = match &cli.command {
        Commands::Status => client.get(format!("{}/scheduler/status", base)),
        Commands::Runs { id, limit } => client
            .get(format!("{}/monitors/{}/runs", base, id))
            .query(&[("limit", limit)]),
        Commands::Stats { id } => client.get(format!("{}/monitors/{}/stats", base, id)),
        Commands::Check { id } => client.post(format!("{}/monitors/{}/check", base, id)),
    };

    let res = request.headers(headers).send().await?;
    print_response(res).await?;

    Ok(())
}

async fn print_response(res: reqwest::Response) -> Result<(), Box<dyn std::error::Error>> {
    let status = res.status();
    if !status.is_success() {
        eprintln!("Error: Admin API returned status {}", status);
        if let Ok(text) = res.text().await {
            eprintln!("Response: {}", text);
        }
        std::process::exit(1);
    }

    let json: Value = res.json().await?;
    println!("{}", serde_json::to_string_pretty(&json)?);
    Ok(())
}
