use clap::{Parser, Subcommand};
use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use serde_json::Value;

#[derive(Parser)]
#[command(name = "player-cli")]
#[command(about = "Command-line client for the player-info proxy", long_about = None)]
struct Cli {
    #[arg(short, long, default_value = "http://localhost:3000")]
    url: String,

    #[arg(short, long, env = "MY_API_KEY", default_value = "")]
    key: String,

    /// Header carrying the API key
    #[arg(long, default_value = "x-api-key")]
    key_header: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Check proxy liveness
    Health,
    /// Look up a player by id
    Lookup {
        #[arg(long)]
        uid: String,
        /// Print the full upstream payload instead of the account name only
        #[arg(long)]
        raw: bool,
    },
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let client = reqwest::Client::new();

    match cli.command {
        Commands::Health => {
            let res = client.get(format!("{}/health", cli.url))
                .send()
                .await?;
            if let Some(json) = read_json(res).await? {
                println!("{}", serde_json::to_string_pretty(&json)?);
            }
        }
        Commands::Lookup { uid, raw } => {
            let mut headers = HeaderMap::new();
            headers.insert(
                HeaderName::from_bytes(cli.key_header.as_bytes())?,
                HeaderValue::from_str(&cli.key)?,
            );

            let res = client.get(format!("{}/player-info", cli.url))
                .query(&[("uid", uid.as_str())])
                .headers(headers)
                .send()
                .await?;

            if let Some(json) = read_json(res).await? {
                if raw {
                    println!("{}", serde_json::to_string_pretty(&json)?);
                } else {
                    match json.get("AccountName").and_then(Value::as_str) {
                        Some(name) => println!("{}", name),
                        None => println!("(no account name)"),
                    }
                }
            }
        }
    }

    Ok(())
}

async fn read_json(res: reqwest::Response) -> Result<Option<Value>, Box<dyn std::error::Error>> {
    let status = res.status();
    if !status.is_success() {
        eprintln!("Error: proxy returned status {}", status);
        if let Ok(text) = res.text().await {
            eprintln!("Response: {}", text);
        }
        return Ok(None);
    }

    Ok(Some(res.json().await?))
}
