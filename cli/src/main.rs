#![allow(clippy::print_stdout)]
use crate::cli::{Args, Command};
use anyhow::{bail, Context};
use clap::Parser;
use prettytable::{Cell, Row, Table};
use sparql_analytics_client::{validate_query, SparqlClient};
use sparql_analytics_model::{ExportFormat, QueryResult};
use sparql_analytics_web::ServerConfig;
use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

mod cli;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let args = Args::parse();
    match args.command {
        Command::Serve {
            bind,
            cors,
            page_size,
        } => {
            sparql_analytics_web::serve(ServerConfig {
                bind,
                cors,
                page_size,
            })
            .await
        }
        Command::Query {
            endpoint,
            query,
            query_file,
            format,
            output,
        } => run_query(&endpoint, query, query_file, &format, output).await,
    }
}

async fn run_query(
    endpoint: &str,
    query: Option<String>,
    query_file: Option<PathBuf>,
    format: &str,
    output: Option<PathBuf>,
) -> anyhow::Result<()> {
    let query = match (query, query_file) {
        (Some(query), _) => query,
        (None, Some(path)) => fs::read_to_string(&path)
            .with_context(|| format!("could not read query file {}", path.display()))?,
        (None, None) => bail!("either --query or --query-file must be given"),
    };
    validate_query(&query)?;

    let result = SparqlClient::new().execute(endpoint, &query).await;
    if !result.success {
        bail!(
            "query execution failed: {}",
            result.error.unwrap_or_else(|| "unknown error".to_owned())
        );
    }
    tracing::info!(
        rows = result.rows.len(),
        duration = ?result.duration,
        "query finished"
    );

    if format == "table" {
        if result.is_empty() {
            println!("No results found.");
        } else {
            print_table(&result);
        }
        return Ok(());
    }

    let format = format
        .parse::<ExportFormat>()
        .map_err(|e| anyhow::anyhow!("{e}; expected table, csv, json or xlsx"))?;
    let payload = sparql_analytics_export::export(&result, format)?;
    match output {
        Some(path) => write_file(&path, &payload.bytes)?,
        None => {
            if format == ExportFormat::Excel {
                bail!("xlsx output is binary, use --output to write it to a file");
            }
            io::stdout().write_all(&payload.bytes)?;
        }
    }
    Ok(())
}

fn print_table(result: &QueryResult) {
    let mut table = Table::new();
    table.set_titles(Row::new(
        result.columns.iter().map(|c| Cell::new(c)).collect(),
    ));
    for row in &result.rows {
        table.add_row(Row::new(row.iter().map(|v| Cell::new(v)).collect()));
    }
    table.printstd();
}

fn write_file(path: &Path, bytes: &[u8]) -> anyhow::Result<()> {
    fs::write(path, bytes).with_context(|| format!("could not write {}", path.display()))
}
