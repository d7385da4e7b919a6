use clap::{Parser, Subcommand};
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION};
use serde_json::{json, Value};

#[derive(Parser)]
#[command(name = "estate-cli")]
#[command(about = "Operator CLI for the estate-market API", long_about = None)]
struct Cli {
    #[arg(short, long, default_value = "http://localhost:8080", env = "ESTATE_URL")]
    url: String,

    #[arg(short, long, default_value = "CHANGE_ME_IN_PRODUCTION", env = "ESTATE_ADMIN_KEY")]
    key: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show version and enabled integrations
    Status,
    /// Show document counts, open sessions and drafts
    Stats,
    /// List properties, optionally filtered by status (e.g. "FOR RENT")
    Properties {
        #[arg(short, long)]
        status: Option<String>,
    },
    /// Maintenance requests for a house ID
    Requests { house_id: String },
    /// Re-check an agreement transaction
    Verify { transaction_id: String },
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let client = reqwest::Client::new();

    let mut headers = HeaderMap::new();
    headers.insert(
        AUTHORIZATION,
        HeaderValue::from_str(&format!("Bearer {}", cli.key))?,
    );

    let res = match cli.command {
        Commands::Status => {
            client
                .get(format!("{}/admin/status", cli.url))
                .headers(headers)
                .send()
                .await?
        }
        Commands::Stats => {
            client
                .get(format!("{}/admin/stats", cli.url))
                .headers(headers)
                .send()
                .await?
        }
        Commands::Properties { status } => {
            let mut request = client.get(format!("{}/api/properties", cli.url));
            if let Some(status) = status {
                request = request.query(&[("status", status)]);
            }
            request.send().await?
        }
        Commands::Requests { house_id } => {
            client
                .get(format!("{}/api/maintenance/houses/{}/requests", cli.url, house_id))
                .send()
                .await?
        }
        Commands::Verify { transaction_id } => {
            client
                .post(format!("{}/api/agreements/verify", cli.url))
                .json(&json!({ "transactionId": transaction_id }))
                .send()
                .await?
        }
    };
    print_response(res).await
}

async fn print_response(res: reqwest::Response) -> Result<(), Box<dyn std::error::Error>> {
    let status = res.status();
    if !status.is_success() {
        eprintln!("Error: API returned status {}", status);
        if let Ok(text) = res.text().await {
            eprintln!("Response: {}", text);
        }
        return Ok(());
    }

    let json: Value = res.json().await?;
    println!("{}", serde_json::to_string_pretty(&json)?);
    Ok(())
}
