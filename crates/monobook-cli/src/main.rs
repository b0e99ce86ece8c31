mod inspect;
mod replay;

use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};
use monobook_widget::PayloadSchema;
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
#[command(name = "monobook")]
#[command(about = "Inspect and replay Monobook widget payload delivery")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Run the payload extractor on a JSON file
    Extract {
        /// JSON file holding a tool result, message, or bridge value
        file: PathBuf,
        #[arg(long, value_enum, default_value_t = WidgetKind::Rooms)]
        widget: WidgetKind,
    },
    /// Read the bootstrap element and query string of a saved page
    Bootstrap {
        /// Saved HTML page
        html: PathBuf,
        /// Page query string (e.g. `?payload=...`)
        #[arg(long)]
        query: Option<String>,
        #[arg(long, value_enum, default_value_t = WidgetKind::Rooms)]
        widget: WidgetKind,
    },
    /// Mount a widget against a scripted host and print what it renders
    Replay {
        /// YAML fixture describing the bridge and inbound messages
        fixture: PathBuf,
        #[arg(long, value_enum, default_value_t = WidgetKind::Rooms)]
        widget: WidgetKind,
        /// Select this room once the widget has loaded
        #[arg(long)]
        select_room: Option<String>,
        /// Confirm the booking once the widget has loaded
        #[arg(long)]
        confirm: bool,
    },
}

/// Which widget's schema to sniff for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum WidgetKind {
    Rooms,
    Booking,
}

impl From<WidgetKind> for PayloadSchema {
    fn from(kind: WidgetKind) -> Self {
        match kind {
            WidgetKind::Rooms => PayloadSchema::RoomSearch,
            WidgetKind::Booking => PayloadSchema::Booking,
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let config = monobook_core::load_app_config_from_env()?;

    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(config.log_level.clone()))?;
    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    match cli.command {
        Some(Commands::Extract { file, widget }) => {
            inspect::run_extract(&config, &file, widget.into())?;
        }
        Some(Commands::Bootstrap {
            html,
            query,
            widget,
        }) => {
            inspect::run_bootstrap(&config, &html, query.as_deref(), widget.into())?;
        }
        Some(Commands::Replay {
            fixture,
            widget,
            select_room,
            confirm,
        }) => {
            let actions = replay::ReplayActions {
                select_room,
                confirm,
            };
            replay::run_replay(&config, &fixture, widget.into(), actions).await?;
        }
        None => println!("monobook: run with --help for available commands"),
    }

    Ok(())
}
