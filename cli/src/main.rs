//! Playground CLI - runs, formats and shares Rust code on a remote playground.
//!
//! Every subcommand drives the same [`playground_engine::Playground`] the
//! library exposes: the source is loaded into the session, one action is
//! triggered, and the settled record decides what is printed and the exit
//! status.
//!
//! ```text
//! main() -> Cli::parse() -> Playground::new(client, configuration)
//!                                  |
//!                                  v
//!                  perform(action) -> settle(ticket) -> report(record)
//! ```

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use std::{
    fs::{self, File, OpenOptions},
    io::{self, Read},
    path::{Path, PathBuf},
    process::ExitCode,
    sync::{Arc, Mutex},
};
use tracing_subscriber::{EnvFilter, fmt, prelude::*};
use url::Url;

use playground_client::PlaygroundClient;
use playground_config::{PlaygroundConfig, Settings};
use playground_core::page::PageQuery;
use playground_core::share;
use playground_engine::{Playground, RecordStatus, RequestRecord, Response};
use playground_types::{Action, Backtrace, Channel, Edition, Mode, Snippet};

#[derive(Debug, Parser)]
#[command(name = "playground", version, about = "Run Rust code on a remote playground")]
struct Cli {
    /// Backend root, overriding the config file and PLAYGROUND_BASE_URL.
    #[arg(long, global = true, value_name = "URL")]
    base_url: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Run, build or test a source file (stdin when no file is given).
    Run(RunArgs),
    /// Format a source file with rustfmt and print the result.
    Fmt(SourceArgs),
    /// Save a source file as a snippet and print its share links.
    Share(ShareArgs),
    /// Open a playground link or snippet id and print its source.
    Load {
        /// A playground URL (`?gist=...` or `?code=...`) or a bare snippet id.
        target: String,
    },
    /// Print the toolchain versions the backend uses.
    Versions,
    /// Print the crates available to snippets.
    Crates,
}

#[derive(Debug, Args)]
struct SourceArgs {
    /// Source file; reads stdin when omitted.
    file: Option<PathBuf>,

    #[arg(long)]
    channel: Option<Channel>,

    #[arg(long)]
    mode: Option<Mode>,

    #[arg(long)]
    edition: Option<Edition>,
}

#[derive(Debug, Args)]
struct RunArgs {
    #[command(flatten)]
    source: SourceArgs,

    /// Action to perform instead of the one derived from the source
    /// (e.g. `test`, `asm`, `clippy`, `miri`).
    #[arg(long)]
    action: Option<Action>,

    /// Set RUST_BACKTRACE for the run.
    #[arg(long)]
    backtrace: bool,
}

#[derive(Debug, Args)]
struct ShareArgs {
    #[command(flatten)]
    source: SourceArgs,

    /// Run the code first so the snippet carries its output.
    #[arg(long)]
    run: bool,
}

/// Installs the subscriber. Events only ever go to a log file: stdout and
/// stderr carry the program's own output and must stay parseable.
fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    let mut skipped = Vec::new();
    let log = log_paths()
        .into_iter()
        .find_map(|path| match open_log(&path) {
            Ok(file) => Some((path, file)),
            Err(err) => {
                skipped.push(format!("{}: {err}", path.display()));
                None
            }
        });

    let registry = tracing_subscriber::registry().with(filter);
    match log {
        Some((path, file)) => {
            registry
                .with(fmt::layer().with_ansi(false).with_writer(Mutex::new(file)))
                .init();
            tracing::info!(path = %path.display(), "Logging initialized");
            for reason in skipped {
                tracing::warn!("Skipped log file {reason}");
            }
        }
        None => registry.init(),
    }
}

fn open_log(path: &Path) -> io::Result<File> {
    if let Some(dir) = path.parent() {
        fs::create_dir_all(dir)?;
    }
    OpenOptions::new().create(true).append(true).open(path)
}

/// `logs/playground.log` next to the config file, then under `./.playground`.
fn log_paths() -> Vec<PathBuf> {
    PlaygroundConfig::path()
        .and_then(|config| config.parent().map(Path::to_path_buf))
        .into_iter()
        .chain([PathBuf::from(".playground")])
        .map(|dir| dir.join("logs").join("playground.log"))
        .collect()
}

fn load_settings(base_override: Option<String>) -> Result<Settings> {
    let config = PlaygroundConfig::load().ok().flatten().unwrap_or_default();
    let settings = match base_override.filter(|url| !url.trim().is_empty()) {
        Some(url) => config.resolve_with_base_override(Some(url)),
        None => config.resolve(),
    };
    settings.context("invalid playground configuration")
}

fn read_source(file: Option<&PathBuf>) -> Result<String> {
    match file {
        Some(path) => fs::read_to_string(path)
            .with_context(|| format!("failed to read {}", path.display())),
        None => {
            let mut code = String::new();
            io::stdin()
                .read_to_string(&mut code)
                .context("failed to read source from stdin")?;
            Ok(code)
        }
    }
}

type Session = Playground<PlaygroundClient>;

/// Loads the source and applies the per-invocation overrides.
fn prepare(playground: &mut Session, args: &SourceArgs) -> Result<()> {
    playground.edit_code(read_source(args.file.as_ref())?);
    if let Some(channel) = args.channel {
        playground.change_channel(channel);
    }
    if let Some(mode) = args.mode {
        playground.change_mode(mode);
    }
    if let Some(edition) = args.edition {
        playground.change_edition(edition);
    }
    Ok(())
}

/// Prints a settled record. Failed records exit non-zero.
fn report(record: &RequestRecord) -> ExitCode {
    match record.status() {
        RecordStatus::Succeeded(response) => {
            print_response(response);
            match response {
                Response::Format(r) if !r.success => ExitCode::FAILURE,
                Response::Tool(r) if !r.success => ExitCode::FAILURE,
                _ => ExitCode::SUCCESS,
            }
        }
        RecordStatus::Failed(err) => {
            eprintln!("error: {}", err.message());
            ExitCode::FAILURE
        }
        RecordStatus::Idle | RecordStatus::Pending => {
            eprintln!("error: request did not complete");
            ExitCode::FAILURE
        }
    }
}

fn print_response(response: &Response) {
    let (stdout, stderr) = response.output();
    if !stderr.is_empty() {
        eprint!("{stderr}");
    }
    if !stdout.is_empty() {
        print!("{stdout}");
    }
    if let Response::Compile(r) = response
        && !r.code.is_empty()
    {
        println!("{}", r.code);
    }
}

async fn run(playground: &mut Session, args: RunArgs) -> Result<ExitCode> {
    prepare(playground, &args.source)?;
    if args.backtrace {
        playground.change_backtrace(Backtrace::Enabled);
    }

    let ticket = match args.action {
        Some(action) => playground.perform(action)?,
        None => playground.perform_primary()?,
    };
    tracing::info!(action = %ticket.action(), "Running");
    Ok(report(playground.settle(&ticket).await))
}

async fn format(playground: &mut Session, args: SourceArgs) -> Result<ExitCode> {
    prepare(playground, &args)?;
    let ticket = playground.perform(Action::Format)?;
    let record = playground.settle(&ticket).await;

    let formatted = matches!(
        record.status(),
        RecordStatus::Succeeded(Response::Format(r)) if r.success
    );
    if !formatted {
        return Ok(report(record));
    }
    print!("{}", playground.state().code());
    Ok(ExitCode::SUCCESS)
}

async fn share(playground: &mut Session, base: &Url, args: ShareArgs) -> Result<ExitCode> {
    prepare(playground, &args.source)?;
    if args.run {
        let ticket = playground.perform_primary()?;
        playground.settle(&ticket).await;
    }

    let ticket = playground.save_snippet()?;
    let record = playground.settle(&ticket).await;
    let Some(Response::Snippet(snippet)) = record.response() else {
        return Ok(report(record));
    };
    print_share_links(base, snippet)?;
    Ok(ExitCode::SUCCESS)
}

fn print_share_links(base: &Url, snippet: &Snippet) -> Result<()> {
    let permalink = share::permalink(base, snippet);
    let forum = share::forum_url(&share::forum_snippet(snippet, &permalink))
        .context("failed to build forum link")?;

    println!("Permalink: {permalink}");
    println!("Gist:      {}", snippet.url);
    println!("Code:      {}", share::code_url(base, snippet));
    println!("Forum:     {forum}");
    Ok(())
}

async fn load(playground: &mut Session, target: &str) -> Result<ExitCode> {
    let query = match Url::parse(target) {
        Ok(url) => PageQuery::from_url(&url),
        Err(_) => PageQuery {
            gist: Some(target.to_string()),
            ..PageQuery::default()
        },
    };

    if let Some(ticket) = playground.index_page_load(&query) {
        let record = playground.settle(&ticket).await;
        if let RecordStatus::Failed(err) = record.status() {
            eprintln!("error: {}", err.message());
            return Ok(ExitCode::FAILURE);
        }
    }

    let state = playground.state();
    let config = state.configuration();
    eprintln!(
        "channel: {}, mode: {}, edition: {}",
        config.channel, config.mode, config.edition
    );
    print!("{}", state.code());
    Ok(ExitCode::SUCCESS)
}

async fn versions(playground: &mut Session) -> Result<ExitCode> {
    let versions = playground
        .refresh_versions()
        .await
        .context("failed to fetch toolchain versions")?;
    for (name, version) in [
        ("stable", &versions.stable),
        ("beta", &versions.beta),
        ("nightly", &versions.nightly),
        ("rustfmt", &versions.rustfmt),
        ("clippy", &versions.clippy),
        ("miri", &versions.miri),
    ] {
        println!("{name:<8} {} ({})", version.version, version.details());
    }
    Ok(ExitCode::SUCCESS)
}

async fn crates(playground: &Session) -> Result<ExitCode> {
    let crates = playground
        .crates()
        .await
        .context("failed to fetch crate list")?;
    for info in crates {
        println!("{} {}", info.name, info.version);
    }
    Ok(ExitCode::SUCCESS)
}

#[tokio::main]
async fn main() -> Result<ExitCode> {
    let cli = Cli::parse();
    init_tracing();

    let settings = load_settings(cli.base_url)?;
    let base = settings.server.base_url.clone();
    let client = PlaygroundClient::new(base.clone(), settings.server.timeout)
        .context("failed to build HTTP client")?;
    let mut playground = Playground::new(Arc::new(client), settings.configuration);

    match cli.command {
        Command::Run(args) => run(&mut playground, args).await,
        Command::Fmt(args) => format(&mut playground, args).await,
        Command::Share(args) => share(&mut playground, &base, args).await,
        Command::Load { target } => load(&mut playground, &target).await,
        Command::Versions => versions(&mut playground).await,
        Command::Crates => crates(&playground).await,
    }
}
