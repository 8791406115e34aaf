use clap::{Parser, Subcommand};
use serde_json::Value;

#[derive(Parser)]
#[command(name = "urlrank-cli")]
#[command(about = "Management CLI for the urlrank index server", long_about = None)]
struct Cli {
    #[arg(short, long, default_value = "http://localhost:18080")]
    url: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Check server status
    Status {
        /// Include index and ingest counters
        #[arg(short, long)]
        verbose: bool,
    },
    /// Count one visit to a URL
    Add { url: String },
    /// Ranked search: prefix text followed by an optional regex
    Search {
        query: String,
        /// Maximum number of entries to return
        #[arg(short)]
        n: Option<usize>,
        /// Print the JSON payload instead of the text report
        #[arg(long)]
        json: bool,
    },
    /// Write the index snapshot on the server
    Dump,
    /// Wipe the index
    Reset,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let client = reqwest::Client::new();

    match cli.command {
        Commands::Status { verbose } => {
            let mut req = client.get(format!("{}/status", cli.url));
            if verbose {
                req = req.query(&[("verbose", "1")]);
            }
            print_response(req.send().await?, verbose).await?;
        }
        Commands::Add { url } => {
            let res = client
                .get(format!("{}/add", cli.url))
                .query(&[("q", url.as_str())])
                .send()
                .await?;
            print_response(res, false).await?;
        }
        Commands::Search { query, n, json } => {
            let mut params = vec![("q", query)];
            if let Some(n) = n {
                params.push(("n", n.to_string()));
            }
            if json {
                params.push(("json", "1".to_string()));
            }
            let res = client
                .get(format!("{}/search", cli.url))
                .query(&params)
                .send()
                .await?;
            print_response(res, json).await?;
        }
        Commands::Dump => {
            let res = client.get(format!("{}/dump", cli.url)).send().await?;
            print_response(res, false).await?;
        }
        Commands::Reset => {
            let res = client.get(format!("{}/reset", cli.url)).send().await?;
            print_response(res, false).await?;
        }
    }

    Ok(())
}

async fn print_response(
    res: reqwest::Response,
    json: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    let status = res.status();
    if !status.is_success() {
        eprintln!("Error: server returned status {}", status);
        if let Ok(text) = res.text().await {
            eprintln!("Response: {}", text.trim_end());
        }
        return Ok(());
    }

    if json {
        let body: Value = res.json().await?;
        println!("{}", serde_json::to_string_pretty(&body)?);
    } else {
        let text = res.text().await?;
        if !text.is_empty() {
            println!("{}", text.trim_end());
        }
    }
    Ok(())
}
