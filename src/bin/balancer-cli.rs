use clap::{Parser, Subcommand};
use serde_json::{json, Value};

#[derive(Parser)]
#[command(name = "balancer-cli")]
#[command(about = "Management CLI for rr-balancer", long_about = None)]
struct Cli {
    #[arg(short, long, default_value = "http://localhost:8081")]
    url: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Check balancer status
    Status,
    /// List the pool with per-backend liveness
    Backends,
    /// Add a backend, e.g. http://127.0.0.1:5003
    Add {
        address: String,
        #[arg(short, long, default_value_t = 1)]
        weight: u32,
    },
    /// Remove the backend at a pool index
    Remove { index: usize },
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let client = reqwest::Client::new();
    let base = cli.url.trim_end_matches('/');

    let res = match cli.command {
        Commands::Status => client.get(format!("{}/admin/status", base)).send().await?,
        Commands::Backends => client.get(format!("{}/admin/backends", base)).send().await?,
        Commands::Add { address, weight } => {
            client
                .post(format!("{}/admin/backends", base))
                .json(&json!({ "address": address, "weight": weight }))
                .send()
                .await?
        }
        Commands::Remove { index } => {
            client
                .delete(format!("{}/admin/backends/{}", base, index))
                .send()
                .await?
        }
    };

    print_response(res).await
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
