use clap::{Parser, Subcommand, ValueHint};
use std::path::PathBuf;

#[derive(Parser)]
#[command(about, version, name = "sparql-analytics")]
/// SPARQL Analytics command line toolkit and web front-end server
pub struct Args {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// Start the SPARQL Analytics web front-end
    Serve {
        /// Host and port to listen to
        #[arg(short, long, default_value = "localhost:7878", value_hint = ValueHint::Hostname)]
        bind: String,
        /// Allows cross-origin requests
        #[arg(long)]
        cors: bool,
        /// Rows per page in the table view
        #[arg(long, default_value_t = 25)]
        page_size: usize,
    },
    /// Execute a single query against an endpoint and print or export the results
    Query {
        /// SPARQL endpoint URL
        #[arg(short, long, value_hint = ValueHint::Url)]
        endpoint: String,
        /// The query to execute
        ///
        /// If no query is given, --query-file is read instead.
        #[arg(short, long)]
        query: Option<String>,
        /// File to read the query from
        #[arg(long, value_hint = ValueHint::FilePath, conflicts_with = "query", required_unless_present = "query")]
        query_file: Option<PathBuf>,
        /// Output format: table, csv, json or xlsx
        #[arg(short, long, default_value = "table")]
        format: String,
        /// File to write to
        ///
        /// If no file is given, stdout is written; xlsx always needs a file.
        #[arg(short, long, value_hint = ValueHint::FilePath)]
        output: Option<PathBuf>,
    },
}
