use clap::{Parser, Subcommand};
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION};
use serde_json::{json, Value};

#[derive(Parser)]
#[command(name = "session-cli")]
#[command(about = "Management CLI for the session API", long_about = None)]
struct Cli {
    #[arg(short, long, default_value = "http://localhost:8080")]
    url: String,

    /// Session token (as returned by `login` when cookies are disabled).
    #[arg(short, long, env = "SESSION_TOKEN")]
    token: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Check server health
    Health,
    /// Log in and print the session data
    Login { username: String, password: String },
    /// Show the current session
    Whoami,
    /// End the current session
    Logout,
    /// List members
    Members {
        #[arg(long, default_value_t = 0)]
        limit: usize,
        #[arg(long, default_value_t = 0)]
        offset: usize,
    },
    /// Show room settings
    Settings,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let client = reqwest::Client::new();

    let mut headers = HeaderMap::new();
    if let Some(token) = &cli.token {
        headers.insert(AUTHORIZATION, HeaderValue::from_str(&format!("Bearer {}", token))?);
    }

    let res = match cli.command {
        Commands::Health => client.get(format!("{}/health", cli.url)).send().await?,
        Commands::Login { username, password } => {
            client
                .post(format!("{}/login", cli.url))
                .json(&json!({ "username": username, "password": password }))
                .send()
                .await?
        }
        Commands::Whoami => {
            client
                .get(format!("{}/whoami", cli.url))
                .headers(headers)
                .send()
                .await?
        }
        Commands::Logout => {
            client
                .post(format!("{}/logout", cli.url))
                .headers(headers)
                .send()
                .await?
        }
        Commands::Members { limit, offset } => {
            client
                .get(format!("{}/members", cli.url))
                .query(&[("limit", limit), ("offset", offset)])
                .headers(headers)
                .send()
                .await?
        }
        Commands::Settings => {
            client
                .get(format!("{}/room/settings", cli.url))
                .headers(headers)
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
