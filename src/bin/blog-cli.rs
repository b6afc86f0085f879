use std::path::PathBuf;

use clap::{Parser, Subcommand};
use serde_json::{json, Value};

use blogd::config::{load_config, BlogConfig, PathsConfig};
use blogd::routing::{Dispatcher, PathTable, PathTableError};

#[derive(Parser)]
#[command(name = "blog-cli")]
#[command(about = "Inspection CLI for the blog server", long_about = None)]
struct Cli {
    #[arg(short, long, default_value = "http://localhost:8080")]
    url: String,

    /// Viewer name forwarded in the session header
    #[arg(long)]
    viewer: Option<String>,

    /// Config file providing the path keywords and viewer header
    #[arg(short, long)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show which view a route path dispatches to, without a server.
    /// The path is read percent-encoded, as it appears in a URL.
    Route { path: String },
    /// Fetch a page from a running server
    Get { path: String },
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let config = match &cli.config {
        Some(path) => load_config(path)?,
        None => BlogConfig::default(),
    };

    match cli.command {
        Commands::Route { path } => {
            let out = route_report(&config.paths, &path)?;
            println!("{}", serde_json::to_string_pretty(&out)?);
        }
        Commands::Get { path } => {
            let url = format!(
                "{}/{}",
                cli.url.trim_end_matches('/'),
                path.trim_start_matches('/')
            );
            let mut req = reqwest::Client::new().get(url);
            if let Some(viewer) = &cli.viewer {
                req = req.header(config.session.viewer_header.as_str(), viewer.as_str());
            }
            print_response(req.send().await?).await?;
        }
    }

    Ok(())
}

/// Dispatch `path` the way the server does and describe the decision.
fn route_report(paths: &PathsConfig, path: &str) -> Result<Value, PathTableError> {
    let table = PathTable::from_config(paths)?;
    let decision = Dispatcher::new(&table).dispatch_encoded(path);
    Ok(json!({
        "path": path,
        "view": decision.kind,
        "param": decision.param,
        "handled": decision.is_handled(),
    }))
}

async fn print_response(res: reqwest::Response) -> Result<(), Box<dyn std::error::Error>> {
    let status = res.status();
    let is_json = res
        .headers()
        .get(reqwest::header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .is_some_and(|v| v.starts_with("application/json"));

    if !status.is_success() {
        eprintln!("Error: server returned status {}", status);
        if let Ok(text) = res.text().await {
            eprintln!("Response: {}", text);
        }
        return Ok(());
    }

    if is_json {
        let json: Value = res.json().await?;
        println!("{}", serde_json::to_string_pretty(&json)?);
    } else {
        println!("{}", res.text().await?);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_route_report_decodes_like_the_server() {
        let paths = PathsConfig::default();

        let report = route_report(&paths, "/tags/hello%20world").unwrap();
        assert_eq!(report["view"], "tag_articles");
        assert_eq!(report["param"], "hello world");
        assert_eq!(report["handled"], true);

        let report = route_report(&paths, "tags%2Frust").unwrap();
        assert_eq!(report["view"], "unhandled");
        assert_eq!(report["handled"], false);
    }

    #[test]
    fn test_route_report_rejects_bad_table() {
        let mut paths = PathsConfig::default();
        paths.tags = "archives".into();
        assert!(route_report(&paths, "tags").is_err());
    }
}
