//! Bull Board CLI - Command-line interface for the Bull Board daemon

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use colored::Colorize;
use serde::{Deserialize, Serialize};
use serde_json::json;
use tabled::{Table, Tabled};

const DEFAULT_RPC_URL: &str = "http://127.0.0.1:3000";

#[derive(Parser)]
#[command(name = "bullboard-cli")]
#[command(about = "Bull Board CLI", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// RPC server URL
    #[arg(long, env = "BULLBOARD_RPC_URL", default_value = DEFAULT_RPC_URL)]
    rpc_url: String,
}

#[derive(Subcommand)]
enum Commands {
    /// Rediscover and list queues
    Queues,

    /// Show job counts per queue
    Counts {
        /// Only this queue
        queue: Option<String>,
    },

    /// Show discovery engine status
    Status,
}

#[derive(Serialize)]
struct JsonRpcRequest {
    jsonrpc: String,
    method: String,
    params: serde_json::Value,
    id: u64,
}

#[derive(Deserialize)]
struct JsonRpcResponse {
    #[allow(dead_code)]
    jsonrpc: String,
    #[allow(dead_code)]
    id: u64,
    result: Option<serde_json::Value>,
    error: Option<JsonRpcError>,
}

#[derive(Deserialize)]
struct JsonRpcError {
    code: i32,
    message: String,
}

#[derive(Deserialize)]
struct QueueList {
    generation: u64,
    refreshed: bool,
    refresh_error: Option<String>,
    queues: Vec<QueueRow>,
}

#[derive(Deserialize, Tabled)]
struct QueueRow {
    name: String,
    variant: String,
    key_prefix: String,
}

#[derive(Deserialize)]
struct CountsList {
    refreshed: bool,
    queues: Vec<QueueCounts>,
}

#[derive(Deserialize)]
struct QueueCounts {
    name: String,
    counts: Option<JobCounts>,
    error: Option<String>,
}

#[derive(Deserialize)]
struct JobCounts {
    waiting: u64,
    active: u64,
    completed: u64,
    failed: u64,
    delayed: u64,
    paused: u64,
}

#[derive(Tabled)]
struct CountsRow {
    queue: String,
    waiting: String,
    active: String,
    completed: String,
    failed: String,
    delayed: String,
    paused: String,
}

impl From<QueueCounts> for CountsRow {
    fn from(q: QueueCounts) -> Self {
        match q.counts {
            Some(c) => Self {
                queue: q.name,
                waiting: c.waiting.to_string(),
                active: c.active.to_string(),
                completed: c.completed.to_string(),
                failed: c.failed.to_string(),
                delayed: c.delayed.to_string(),
                paused: c.paused.to_string(),
            },
            None => {
                let na = "-".to_string();
                Self {
                    queue: format!("{} ({})", q.name, q.error.unwrap_or_default()),
                    waiting: na.clone(),
                    active: na.clone(),
                    completed: na.clone(),
                    failed: na.clone(),
                    delayed: na.clone(),
                    paused: na,
                }
            }
        }
    }
}

async fn call_rpc(url: &str, method: &str, params: serde_json::Value) -> Result<serde_json::Value> {
    let request = JsonRpcRequest {
        jsonrpc: "2.0".to_string(),
        method: method.to_string(),
        params,
        id: 1,
    };

    let client = reqwest::Client::new();
    let response: JsonRpcResponse = client
        .post(url)
        .json(&request)
        .send()
        .await
        .context("Failed to connect to daemon")?
        .json()
        .await
        .context("Failed to parse response")?;

    if let Some(error) = response.error {
        anyhow::bail!("RPC error ({}): {}", error.code, error.message);
    }

    response
        .result
        .ok_or_else(|| anyhow::anyhow!("No result in response"))
}

fn warn_stale(refreshed: bool, error: Option<&str>) {
    if !refreshed {
        println!(
            "{} {}",
            "⚠ Refresh failed, showing last known queues:".yellow().bold(),
            error.unwrap_or("unknown error")
        );
        println!();
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Queues => {
            let result = call_rpc(&cli.rpc_url, "queues.list.v1", json!({})).await?;
            let list: QueueList = serde_json::from_value(result)?;

            warn_stale(list.refreshed, list.refresh_error.as_deref());

            if list.queues.is_empty() {
                println!("{}", "No queues found".yellow());
            } else {
                println!(
                    "{}",
                    format!("{} queues (generation {})", list.queues.len(), list.generation)
                        .cyan()
                        .bold()
                );
                println!();
                println!("{}", Table::new(list.queues));
            }
        }

        Commands::Counts { queue } => {
            let params = json!({ "queue": queue });
            let result = call_rpc(&cli.rpc_url, "queues.counts.v1", params).await?;
            let list: CountsList = serde_json::from_value(result)?;

            warn_stale(list.refreshed, None);

            let rows: Vec<CountsRow> = list.queues.into_iter().map(CountsRow::from).collect();
            if rows.is_empty() {
                println!("{}", "No queues found".yellow());
            } else {
                println!("{}", Table::new(rows));
            }
        }

        Commands::Status => {
            println!("{}", "Discovery Status".cyan().bold());
            println!();

            match call_rpc(&cli.rpc_url, "admin.status.v1", json!({})).await {
                Ok(status) => {
                    println!("  {} {}", "RPC URL:".bold(), cli.rpc_url);
                    println!("  {} {}", "Status:".bold(), "ONLINE".green());
                    println!();
                    println!("  {} {}", "Engine:".bold(), status["variant"]);
                    println!("  {} {}", "Namespace:".bold(), status["namespace"]);
                    println!("  {} {}", "State:".bold(), status["state"]);
                    println!("  {} {}", "Generation:".bold(), status["generation"]);
                    println!("  {} {}", "Queues:".bold(), status["queue_count"]);
                    match status["last_outcome"].as_str() {
                        Some("FAILED") => println!(
                            "  {} {} ({})",
                            "Last refresh:".bold(),
                            "FAILED".red(),
                            status["last_error"].as_str().unwrap_or("unknown error")
                        ),
                        Some(outcome) => {
                            println!("  {} {}", "Last refresh:".bold(), outcome.green())
                        }
                        None => println!("  {} never", "Last refresh:".bold()),
                    }
                    println!("  {} {} seconds", "Uptime:".bold(), status["uptime_seconds"]);
                }
                Err(e) => {
                    println!("  {} {}", "Status:".bold(), "ERROR".red());
                    println!("  {} {}", "Error:".bold(), e);
                }
            }
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_counts_row_for_failed_lookup() {
        let row = CountsRow::from(QueueCounts {
            name: "emails".to_string(),
            counts: None,
            error: Some("timeout".to_string()),
        });
        assert_eq!(row.queue, "emails (timeout)");
        assert_eq!(row.waiting, "-");
    }

    #[test]
    fn test_parses_list_response() {
        let list: QueueList = serde_json::from_value(json!({
            "generation": 3,
            "refreshed": true,
            "refresh_error": null,
            "queues": [{"name": "emails", "variant": "BULLMQ", "prefix": "bull", "key_prefix": "bull"}]
        }))
        .unwrap();
        assert_eq!(list.generation, 3);
        assert_eq!(list.queues[0].name, "emails");
    }
}
