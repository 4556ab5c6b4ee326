use clap::{Parser, Subcommand, ValueEnum};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
#[value(rename_all = "lowercase")]
pub enum OutputFormat {
    Plain,
    Json,
    Csv,
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OutputFormat::Plain => write!(f, "plain"),
            OutputFormat::Json => write!(f, "json"),
            OutputFormat::Csv => write!(f, "csv"),
        }
    }
}

#[derive(Parser)]
#[command(name = "datascope")]
#[command(about = "Browse and query hierarchical data services", long_about = None)]
#[command(version)]
pub struct Cli {
    /// Gateway endpoint, e.g. http://localhost:8080
    #[arg(long, global = true)]
    pub endpoint: Option<String>,

    /// Numeric service id at the gateway
    #[arg(long, global = true)]
    pub service_id: Option<i64>,

    /// Named service from the config file (alternative to --endpoint/--service-id)
    #[arg(long, global = true)]
    pub service: Option<String>,

    /// Path to the config file (default: platform data dir)
    #[arg(long, global = true)]
    pub config: Option<String>,

    #[arg(long, default_value = "plain", global = true)]
    pub format: OutputFormat,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand)]
pub enum Commands {
    #[command(about = "Show the service's hierarchy and capability table")]
    Capabilities,

    #[command(about = "List containers at a path (root when omitted)")]
    Containers {
        /// Slash-joined container path, e.g. mydb/public
        path: Option<String>,
    },

    #[command(about = "List entities held by a container")]
    Entities {
        /// Slash-joined container path
        path: String,
    },

    #[command(about = "Show details and schema of one entity")]
    Info {
        /// Slash-joined container path
        path: String,
        /// Entity name within the container
        entity: String,
    },

    #[command(about = "Run a paginated query against an entity")]
    Query {
        /// Slash-joined container path
        path: String,
        /// Entity name within the container
        entity: String,

        /// Free-text filter passed through to the backend (e.g. a WHERE clause)
        #[arg(long)]
        filter: Option<String>,

        /// Structured filter as a JSON object, for services with a filter schema
        #[arg(long, conflicts_with = "filter")]
        filter_json: Option<String>,

        /// Field to sort by
        #[arg(long)]
        sort: Option<String>,

        /// Sort descending instead of ascending
        #[arg(long, requires = "sort")]
        desc: bool,

        /// 1-based page number
        #[arg(long, default_value = "1")]
        page: usize,

        /// Rows per page (overrides the configured page size)
        #[arg(long)]
        page_size: Option<usize>,
    },

    #[command(about = "Download a blob entity's content")]
    Download {
        /// Slash-joined container path
        path: String,
        /// Entity name within the container
        entity: String,

        /// Write to this file instead of stdout
        #[arg(long, short)]
        output: Option<String>,
    },

    #[command(about = "Delete an entity")]
    Delete {
        /// Slash-joined container path
        path: String,
        /// Entity name within the container
        entity: String,

        /// Skip the confirmation prompt
        #[arg(long, short)]
        yes: bool,
    },

    #[command(about = "Manage named services in the config file")]
    Service {
        #[command(subcommand)]
        command: ServiceCommand,
    },

    #[command(about = "Browse the service interactively")]
    Browse {
        /// Location to open, as a shareable query string
        /// (e.g. "path=mydb/public&entity=events")
        location: Option<String>,
    },
}

#[derive(Subcommand)]
pub enum ServiceCommand {
    #[command(about = "List configured services")]
    List,

    #[command(about = "Add or update a named service")]
    Set {
        name: String,

        #[arg(long)]
        endpoint: String,

        #[arg(long)]
        service_id: i64,
    },
}
