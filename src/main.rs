mod chat;
mod cli;
mod color;
mod config;
mod generate;
mod platform;
mod providers;
mod registry;
mod render;
mod theme;
mod utils;
mod version;

use std::path::PathBuf;
use std::time::Duration;

use clap::{Parser, Subcommand, ValueEnum};
use cli::{generate::generate_cmd, list::list_cmd, output::OutputFormat, send::send_cmd, ColorMode};
use color::configure_color;
use config::read_config;
use platform::PlatformKind;
use providers::{providers::ProviderIdentifier, HttpClient};
use registry::populate::populated_registry;
use theme::ThemeKind;
use utils::logging::init_logging;

#[derive(
    Parser, Default, Clone, Copy, ValueEnum, strum_macros::Display, strum_macros::EnumString,
)]
#[strum(serialize_all = "lowercase")]
pub(crate) enum RequestedColorMode {
    #[default]
    Auto,
    On,
    Off,
}

#[derive(Parser)]
#[command(name = "mockchat")]
#[command(
    about = "Generate fabricated chat transcripts styled after popular messaging apps",
    version
)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
    #[arg(long, default_value_t = RequestedColorMode::default())]
    color: RequestedColorMode,
    /// Read the configuration from this file instead of the default locations
    #[arg(long, global = true)]
    config: Option<PathBuf>,
    /// Increase diagnostic output on stderr (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,
    /// Seconds to wait for a model before falling back
    #[arg(long, global = true, value_parser = clap::value_parser!(u64).range(1..))]
    timeout: Option<u64>,
}

#[derive(Subcommand)]
enum Commands {
    /// Generate a conversation, then keep chatting when attached to a terminal
    Generate(GenerateArgs),
    /// Send one message and print the transcript with the reply
    Send(SendArgs),
    /// List models, providers, platforms or themes
    List(ListArgs),
}

#[derive(Parser)]
pub(crate) struct GenerateArgs {
    /// Messaging app to imitate
    #[arg(short, long)]
    platform: Option<PlatformKind>,
    /// Scenario for the conversation
    #[arg(short, long)]
    theme: Option<ThemeKind>,
    /// Name shown for the other person
    #[arg(short = 'n', long)]
    contact: Option<String>,
    /// Name used for your own messages in plain output
    #[arg(long)]
    me: Option<String>,
    /// Model to generate with, as `provider/model` or a bare model name
    #[arg(short, long)]
    model: Option<String>,
    /// Print the transcript in this format and exit
    #[arg(short, long)]
    format: Option<OutputFormat>,
    /// Chat with the contact after generating, even when not at a terminal
    #[arg(short, long)]
    interactive: bool,
    /// Width of the rendered screen in columns
    #[arg(long, default_value_t = render::DEFAULT_WIDTH)]
    width: usize,
}

impl Default for GenerateArgs {
    fn default() -> Self {
        GenerateArgs {
            platform: None,
            theme: None,
            contact: None,
            me: None,
            model: None,
            format: None,
            interactive: false,
            width: render::DEFAULT_WIDTH,
        }
    }
}

#[derive(Parser)]
pub(crate) struct SendArgs {
    /// Messaging app to imitate
    #[arg(short, long)]
    platform: Option<PlatformKind>,
    /// Scenario the reply should stay in
    #[arg(short, long)]
    theme: Option<ThemeKind>,
    /// Name shown for the other person
    #[arg(short = 'n', long)]
    contact: Option<String>,
    /// Name used for your own messages in plain output
    #[arg(long)]
    me: Option<String>,
    /// Model to reply with, as `provider/model` or a bare model name
    #[arg(short, long)]
    model: Option<String>,
    /// Output format, JSON when stdout is not a terminal
    #[arg(short, long)]
    format: Option<OutputFormat>,
    /// JSON transcript to continue, read from stdin when omitted and piped
    #[arg(long)]
    transcript: Option<PathBuf>,
    /// Width of the rendered screen in columns
    #[arg(long, default_value_t = render::DEFAULT_WIDTH)]
    width: usize,
    /// The message to send
    text: String,
}

/// Possible listings
#[derive(Subcommand)]
pub(crate) enum ListObject {
    /// Models of the active providers
    Models(ListModelArgs),
    /// Providers
    Providers,
    /// Messaging apps a chat can be styled after
    Platforms,
    /// Conversation scenarios
    Themes,
}

/// Output formats
#[derive(
    Parser, ValueEnum, Default, Clone, Copy, strum_macros::Display, strum_macros::EnumString,
)]
#[strum(serialize_all = "snake_case")]
pub(crate) enum ListingFormat {
    /// Format the output as a table
    #[default]
    Table,
    /// Format the output as JSON
    Json,
    /// Format the output as a table without a header
    HeaderlessTable,
}

#[derive(Parser)]
pub(crate) struct ListArgs {
    /// Output the listing with the specified format
    #[arg(short, long, default_value_t = ListingFormat::default())]
    format: ListingFormat,
    /// List the specified object
    #[command(subcommand)]
    object: ListObject,
}

#[derive(Parser, Default)]
pub(crate) struct ListModelArgs {
    /// Limit listing to the specified provider
    #[arg(short, long)]
    provider: Option<ProviderIdentifier>,
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    configure_color(ColorMode::resolve_auto(cli.color));
    init_logging(cli.verbose);

    let config = read_config(cli.config);

    let timeout = cli.timeout.unwrap_or(config.request.timeout_secs).max(1);
    let client = HttpClient::with_timeout(Duration::from_secs(timeout));

    let registry = populated_registry(&config, &client).await;

    match &cli.command {
        Some(Commands::Generate(args)) => generate_cmd(&config, &registry, args).await,
        Some(Commands::Send(args)) => send_cmd(&config, &registry, args).await,
        Some(Commands::List(args)) => list_cmd(&registry, args).await,
        None => generate_cmd(&config, &registry, &GenerateArgs::default()).await,
    }
}
