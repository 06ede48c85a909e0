//! Switchboard CLI entry point.

use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::sync::Arc;

use clap::Parser;
use switchboard_engine::{Catalog, Dispatcher, GuildStore, MemoryStore, Transport};
use switchboard_foundation::{Error, ErrorKind, UserId};
use switchboard_runtime::{
    Config, Console, ConsoleTransport, Identity, LineEditor, RustylineEditor, ScriptedEditor,
    load_from_file, save_to_file,
};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

/// Command-line arguments.
#[derive(Parser, Debug)]
#[command(name = "switchboard", version, about = "Chat command engine with a console transport")]
struct Cli {
    /// Configuration file (TOML)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Snapshot file for guild state, overriding the configuration
    #[arg(short, long)]
    state: Option<PathBuf>,

    /// Run the lines of a file instead of reading the terminal
    #[arg(short, long)]
    batch: Option<PathBuf>,

    /// Log filter, overriding the configuration (RUST_LOG overrides both)
    #[arg(long)]
    log: Option<String>,
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("\x1b[31mError: {e}\x1b[0m");
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> Result<(), Error> {
    let mut config = Config::load(cli.config.as_deref())?;
    if let Some(filter) = cli.log {
        config.log_filter = filter;
    }
    if let Some(state) = cli.state {
        config.state.snapshot = Some(state);
    }

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.log_filter)),
        )
        .with_writer(std::io::stderr)
        .init();

    let store = Arc::new(match &config.state.snapshot {
        Some(path) if path.exists() => {
            info!(path = %path.display(), "restoring guild state");
            MemoryStore::from_snapshot(load_from_file(path)?)
        }
        _ => MemoryStore::new(),
    });

    let dispatch = config.dispatch_config()?;
    let mut catalog = Catalog::english();
    if let Some(path) = &config.locale.catalog {
        catalog = catalog.merged(Catalog::from_toml(&read_text(path)?)?);
    }
    catalog.default_language.clone_from(&dispatch.default_language);

    let dispatcher = Dispatcher::builder(
        Arc::clone(&store) as Arc<dyn GuildStore>,
        Arc::new(catalog),
        Arc::new(ConsoleTransport) as Arc<dyn Transport>,
    )?
    .config(dispatch)
    .build();

    let sweeper = {
        let dispatcher = dispatcher.clone();
        let mut interval = tokio::time::interval(config.sweep_interval());
        tokio::spawn(async move {
            loop {
                interval.tick().await;
                let removed = dispatcher.sweep();
                if removed > 0 {
                    info!(removed, "swept idle rate-limit buckets");
                }
            }
        })
    };

    let (guild, channel) = config.console_location();
    let identity = Identity {
        user: UserId(config.console.user),
        authority: config.console.authority,
        guild,
        channel,
    };

    let result = match &cli.batch {
        Some(path) => {
            let lines: Vec<String> = read_text(path)?.lines().map(str::to_string).collect();
            run_console(dispatcher, ScriptedEditor::new(lines), identity).await
        }
        None => {
            println!(
                "\x1b[1mSwitchboard\x1b[0m {} - speaking as {identity}. :quit or Ctrl+D to exit.",
                env!("CARGO_PKG_VERSION")
            );
            run_console(dispatcher, RustylineEditor::new()?, identity).await
        }
    };
    sweeper.abort();

    if let Some(path) = &config.state.snapshot {
        match save_to_file(&store.snapshot(), path) {
            Ok(()) => info!(path = %path.display(), "saved guild state"),
            Err(e) => warn!(error = %e, "failed to save guild state"),
        }
    }
    result
}

async fn run_console<E: LineEditor>(
    dispatcher: Dispatcher,
    editor: E,
    identity: Identity,
) -> Result<(), Error> {
    Console::new(dispatcher, editor, identity).run().await
}

fn read_text(path: &Path) -> Result<String, Error> {
    std::fs::read_to_string(path).map_err(|e| {
        Error::new(ErrorKind::Io(format!(
            "failed to read '{}': {e}",
            path.display()
        )))
    })
}
