use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, builder::BoolishValueParser};

/// Command-line arguments for the bamboo-admin binary.
#[derive(Debug, Parser)]
#[command(
    name = "bamboo-admin",
    version,
    about = "Moderation panel for the bamboo board"
)]
pub struct CliArgs {
    /// Optional path to a configuration file.
    #[arg(long = "config-file", env = "BAMBOO_CONFIG_FILE", value_name = "PATH")]
    pub config_file: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Debug, Subcommand, Clone)]
pub enum Command {
    /// Run the moderation panel HTTP service.
    Serve(Box<ServeArgs>),
    /// Print the sequence number the next accepted post will receive.
    #[command(name = "next-number")]
    NextNumber(NextNumberArgs),
    /// Submit a new post to the board.
    Submit(SubmitArgs),
}

#[derive(Debug, Args, Default, Clone)]
pub struct ApiOverride {
    /// Override the board API base URL.
    #[arg(long = "api-base-url", value_name = "URL")]
    pub api_base_url: Option<String>,
}

#[derive(Debug, Args, Clone)]
pub struct ClientCredential {
    /// Moderator credential sent as the bearer token.
    #[arg(long = "token", env = "BAMBOO_TOKEN", value_name = "TOKEN", hide_env_values = true)]
    pub token: String,
}

#[derive(Debug, Args, Default, Clone)]
pub struct ServeArgs {
    #[command(flatten)]
    pub overrides: ServeOverrides,
}

#[derive(Debug, Args, Default, Clone)]
pub struct ServeOverrides {
    #[command(flatten)]
    pub api: ApiOverride,

    /// Override the listener host.
    #[arg(long = "server-host", value_name = "HOST")]
    pub server_host: Option<String>,

    /// Override the listener port.
    #[arg(long = "server-port", value_name = "PORT")]
    pub server_port: Option<u16>,

    /// Override the base log level (trace|debug|info|warn|error).
    #[arg(long = "log-level", value_name = "LEVEL")]
    pub log_level: Option<String>,

    /// Toggle JSON logging.
    #[arg(
        long = "log-json",
        value_name = "BOOL",
        value_parser = BoolishValueParser::new()
    )]
    pub log_json: Option<bool>,

    /// Override the size of the first page shown on the panel.
    #[arg(long = "panel-initial-page-size", value_name = "COUNT")]
    pub panel_initial_page_size: Option<u32>,

    /// Override the size of every page fetched after the first.
    #[arg(long = "panel-page-size", value_name = "COUNT")]
    pub panel_page_size: Option<u32>,

    /// Mark the credential cookie as Secure.
    #[arg(
        long = "session-cookie-secure",
        value_name = "BOOL",
        value_parser = BoolishValueParser::new()
    )]
    pub session_cookie_secure: Option<bool>,
}

#[derive(Debug, Args, Clone)]
pub struct NextNumberArgs {
    #[command(flatten)]
    pub api: ApiOverride,

    #[command(flatten)]
    pub credential: ClientCredential,
}

#[derive(Debug, Args, Clone)]
pub struct SubmitArgs {
    #[command(flatten)]
    pub api: ApiOverride,

    #[command(flatten)]
    pub credential: ClientCredential,

    /// Post title.
    #[arg(long, value_name = "TITLE")]
    pub title: Option<String>,

    /// Post body.
    #[arg(long, value_name = "TEXT")]
    pub content: String,

    /// Optional tag.
    #[arg(long, value_name = "TAG")]
    pub tag: Option<String>,

    /// Id of the verifier question being answered.
    #[arg(long = "verifier-id", value_name = "ID")]
    pub verifier_id: String,

    /// Answer to the verifier question.
    #[arg(long, value_name = "ANSWER")]
    pub answer: String,
}
