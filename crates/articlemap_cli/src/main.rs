//! Terminal explorer for the semantic article map.
//!
//! # Responsibility
//! - Drive one explorer session from line-oriented commands on stdin.
//! - Print each resulting frame as a plain-text listing.

use articlemap_core::{
    default_log_level, init_logging, ArticleId, ArticleSource, ExplorerConfig, ExplorerSession,
    HttpGateway, JsonFileSource, Resolution, SearchContract, SessionFrame,
};
use clap::Parser;
use log::{info, warn};
use std::io::{self, BufRead, Write};
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;
use std::time::Duration;

const MAX_LISTED_POINTS: usize = 25;

#[derive(Debug, Parser)]
#[command(name = "articlemap", version, about = "Explore a semantic article map")]
struct Cli {
    /// Backend base URL (overrides ARTICLEMAP_BASE_URL).
    #[arg(long)]
    base_url: Option<String>,
    /// Load the dataset from a local `/raw-data`-shaped JSON file.
    #[arg(long)]
    data: Option<PathBuf>,
    /// Per-request timeout in milliseconds.
    #[arg(long)]
    timeout_ms: Option<u64>,
    /// Search result contract: `ids` or legacy `labels`.
    #[arg(long)]
    contract: Option<String>,
    /// Absolute directory for rolling log files; logging is off when unset.
    #[arg(long)]
    log_dir: Option<PathBuf>,
    /// How long to wait for a remote result before returning to the prompt.
    #[arg(long, default_value_t = 15_000)]
    wait_ms: u64,
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Command {
    Query(String),
    Search(Option<String>),
    Filter(Option<String>),
    Similar(ArticleId),
    Click(ArticleId),
    Reset,
    Show,
    Poll,
    Help,
    Quit,
}

fn parse_command(line: &str) -> Result<Option<Command>, String> {
    let line = line.trim();
    if line.is_empty() {
        return Ok(None);
    }
    let (verb, rest) = line
        .split_once(char::is_whitespace)
        .map(|(verb, rest)| (verb, rest.trim()))
        .unwrap_or((line, ""));
    let text = (!rest.is_empty()).then(|| rest.to_string());
    let id = || {
        rest.parse::<ArticleId>()
            .map_err(|err| format!("`{verb}` needs an article id: {err}"))
    };

    let command = match verb.to_ascii_lowercase().as_str() {
        "query" | "q" => Command::Query(rest.to_string()),
        "search" | "s" => Command::Search(text),
        "filter" | "f" => Command::Filter(text),
        "similar" | "sim" => Command::Similar(id()?),
        "click" | "select" => Command::Click(id()?),
        "reset" => Command::Reset,
        "show" | "ls" => Command::Show,
        "poll" => Command::Poll,
        "help" | "?" => Command::Help,
        "quit" | "exit" => Command::Quit,
        other => return Err(format!("unknown command `{other}`; type `help`")),
    };
    Ok(Some(command))
}

fn resolve_config(cli: &Cli) -> Result<ExplorerConfig, String> {
    let mut config = ExplorerConfig::from_env().map_err(|err| err.to_string())?;
    if let Some(base_url) = cli.base_url.as_deref() {
        config = config.with_base_url(base_url).map_err(|err| err.to_string())?;
    }
    if let Some(timeout_ms) = cli.timeout_ms {
        config = config
            .with_timeout_ms(timeout_ms)
            .map_err(|err| err.to_string())?;
    }
    if let Some(raw) = cli.contract.as_deref() {
        config.search_contract = SearchContract::parse(raw)
            .ok_or_else(|| format!("unsupported contract `{raw}`; expected ids|labels"))?;
    }
    Ok(config)
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    match run(&cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("articlemap: {err}");
            ExitCode::FAILURE
        }
    }
}

fn run(cli: &Cli) -> Result<(), String> {
    let config = resolve_config(cli)?;
    if let Some(log_dir) = cli.log_dir.as_deref() {
        let level = if config.log_level.is_empty() {
            default_log_level()
        } else {
            config.log_level.as_str()
        };
        init_logging(level, &log_dir.to_string_lossy())?;
    }

    let gateway = Arc::new(HttpGateway::new(&config).map_err(|err| err.to_string())?);
    let mut session = ExplorerSession::new(Arc::clone(&gateway));
    info!(
        "event=cli_session module=cli status=open session={} base_url={}",
        session.controller().session_id(),
        gateway.base_url()
    );
    let wait = Duration::from_millis(cli.wait_ms);

    let source: Box<dyn ArticleSource> = match cli.data.as_deref() {
        Some(path) => Box::new(JsonFileSource::new(path)),
        None => Box::new(HttpGateway::clone(&gateway)),
    };
    println!("loading articles from {}", source.describe());
    match session.load(source.as_ref()) {
        Ok(count) => {
            info!("event=cli_load module=cli status=ok count={count}");
            println!("loaded {count} article(s)");
        }
        Err(err) => {
            warn!("event=cli_load module=cli status=error code={}", err.code());
            println!("load failed: {err}");
        }
    }
    print_frame(&session.frame());

    let stdin = io::stdin();
    let mut stdout = io::stdout();
    loop {
        print!("articlemap> ");
        stdout.flush().map_err(|err| err.to_string())?;

        let mut line = String::new();
        let read = stdin
            .lock()
            .read_line(&mut line)
            .map_err(|err| err.to_string())?;
        if read == 0 {
            return Ok(());
        }

        let command = match parse_command(&line) {
            Ok(Some(command)) => command,
            Ok(None) => continue,
            Err(message) => {
                println!("{message}");
                continue;
            }
        };

        match command {
            Command::Quit => return Ok(()),
            Command::Help => print_help(),
            command => {
                execute(&mut session, command, wait);
                print_frame(&session.frame());
            }
        }
    }
}

fn execute(session: &mut ExplorerSession<HttpGateway>, command: Command, wait: Duration) {
    match command {
        Command::Query(text) => session.set_query(text),
        Command::Search(text) => {
            if let Some(text) = text {
                session.set_query(text);
            }
            if session.search().is_some() {
                report(&session.wait_idle(wait));
            }
        }
        Command::Filter(text) => {
            if let Some(text) = text {
                session.set_query(text);
            }
            session.local_filter();
        }
        Command::Similar(id) => match session.find_similar(&id) {
            Ok(_) => report(&session.wait_idle(wait)),
            Err(err) => println!("{err}"),
        },
        Command::Click(id) => {
            if !session.click(&id) {
                println!("article {id} is not on the map");
            }
        }
        Command::Reset => session.reset(),
        Command::Poll => report(&session.pump()),
        Command::Show | Command::Help | Command::Quit => {}
    }
}

fn report(resolutions: &[Resolution]) {
    for resolution in resolutions {
        match resolution {
            Resolution::Applied { kind, shown } => {
                println!("{} returned {shown} article(s)", kind.as_str())
            }
            Resolution::Failed { kind, error } => println!("{} failed: {error}", kind.as_str()),
            Resolution::Discarded { kind } => {
                println!("dropped a stale {} response", kind.as_str())
            }
        }
    }
}

fn print_frame(frame: &SessionFrame) {
    let busy = frame
        .busy
        .map(|kind| format!(" busy={}", kind.as_str()))
        .unwrap_or_default();
    println!(
        "[{}] {} | {} point(s) | query={:?}{}",
        frame.load_status.as_str(),
        frame.operation,
        frame.points.len(),
        frame.query,
        busy
    );
    if let Some(error) = frame.error.as_deref() {
        println!("  ! {error}");
    }

    for point in frame.points.iter().take(MAX_LISTED_POINTS) {
        let marker = if point.selected { '*' } else { ' ' };
        println!(
            " {marker} {:>8}  ({:>7.3}, {:>7.3})  {}",
            point.id.as_str(),
            point.x,
            point.y,
            point.label
        );
    }
    if frame.points.len() > MAX_LISTED_POINTS {
        println!("   ... {} more", frame.points.len() - MAX_LISTED_POINTS);
    }

    if let Some(article) = frame.selected.as_ref() {
        println!("--- {}", article.title);
        println!("  id: {}  journal: {}  year: {}", article.id, article.journal, article.year);
        if !article.authors.is_empty() {
            println!("  authors: {}", article.authors.join(", "));
        }
        println!("  {}", article.abstract_text);
    }
}

fn print_help() {
    println!(
        "commands:
  query <text>     set the query without searching
  search [text]    semantic search (blank query shows everything)
  filter [text]    local title/abstract filter
  similar <id>     articles similar to <id>
  click <id>       select a point
  reset            restore the full map
  show | poll      redraw / apply late responses
  quit"
    );
}
