mod config;
mod error;

use std::future::Future;
use std::io::{self, BufRead, Write};
use std::path::PathBuf;
use std::time::Duration;

use chrono::{Local, TimeZone};
use clap::{ArgAction, Parser, Subcommand};
use client::{QuoteController, QuoteState, RequestOutcome, Transport, View};
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

use config::Config;
use error::{Error, Result};

/// How long a request may run before the "still working" notice appears.
const LOADING_NOTICE_DELAY: Duration = Duration::from_secs(1);

#[derive(Parser)]
#[command(name = "dailyquote")]
#[command(about = "Personalized daily quotes in your terminal", long_about = None)]
#[command(version)]
struct Cli {
    /// Increase log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,

    /// Path to a config file (default: ./dailyquote.toml if present)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Quote endpoint URL
    #[arg(long, global = true)]
    endpoint: Option<String>,

    /// Request deadline in milliseconds
    #[arg(long, global = true)]
    timeout_ms: Option<u64>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Prompt for names and show quotes until you quit
    Interactive,
    /// Fetch a single quote
    Get {
        /// Name to personalize the quote for
        name: String,
    },
    /// Validate a name without contacting the server
    Check {
        /// Name to validate
        name: String,
    },
}

#[tokio::main]
async fn main() {
    if let Err(e) = run().await {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}

async fn run() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let config = Config::resolve(cli.config.as_deref())?
        .with_env(|key| std::env::var(key).ok())
        .with_overrides(cli.endpoint, cli.timeout_ms)?;
    debug!(?config, "configuration loaded");

    match cli.command {
        Some(Commands::Interactive) | None => cmd_interactive(&config).await,
        Some(Commands::Get { name }) => cmd_get(&config, &name).await,
        Some(Commands::Check { name }) => cmd_check(&config, &name),
    }
}

fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

fn build_controller(config: &Config, token: Option<CancellationToken>) -> Result<QuoteController> {
    let mut builder = QuoteController::builder(&config.endpoint.url)
        .timeout(config.timeout())
        .rules(config.name);
    if let Some(token) = token {
        builder = builder.cancellation_token(token);
    }
    Ok(builder.build()?)
}

async fn cmd_get(config: &Config, name: &str) -> Result<()> {
    let controller = build_controller(config, None)?;
    let mut state = QuoteState::new();

    let outcome = with_loading_notice(controller.submit(&mut state, name), &mut io::stderr())
        .await??;
    match outcome {
        RequestOutcome::Success(_) => {
            print_quote(&state, &mut io::stdout())?;
            Ok(())
        }
        RequestOutcome::Failure { kind, message } => Err(Error::Quote { kind, message }),
    }
}

fn cmd_check(config: &Config, name: &str) -> Result<()> {
    let controller = build_controller(config, None)?;
    let valid = controller.validate(name)?;
    println!("'{valid}' is a valid name.");
    Ok(())
}

async fn cmd_interactive(config: &Config) -> Result<()> {
    println!("dailyquote v{}", env!("CARGO_PKG_VERSION"));

    let token = CancellationToken::new();
    let controller = build_controller(config, Some(token.clone()))?;
    println!("Endpoint: {}", controller.endpoint());
    println!("Type 'quit' or Ctrl+D to exit.\n");

    let watcher = token.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            info!("interrupt received");
            watcher.cancel();
        }
    });

    let mut lines = spawn_stdin_reader();
    let mut state = QuoteState::new();
    run_session(&controller, &mut state, &mut lines, &token, &mut io::stdout()).await?;

    println!("\nGoodbye.");
    Ok(())
}

/// What the session loop does after handling a line.
#[derive(Debug, PartialEq, Eq)]
enum Step {
    Continue,
    Quit,
}

/// Prompt, read and dispatch lines until quit, EOF or interrupt.
async fn run_session<T: Transport, W: Write>(
    controller: &QuoteController<T>,
    state: &mut QuoteState,
    lines: &mut mpsc::UnboundedReceiver<String>,
    token: &CancellationToken,
    out: &mut W,
) -> Result<()> {
    loop {
        let prompt = match state.view() {
            View::Input => "Your name: ",
            View::Quote => "[n]ew quote, [r]etry with another name, [q]uit: ",
            View::Error => "[r]etry, [q]uit: ",
        };
        let Some(input) = read_line(lines, prompt, token, out).await? else {
            break;
        };
        if handle_line(controller, state, input.trim(), out).await? == Step::Quit {
            break;
        }
        if token.is_cancelled() {
            break;
        }
    }
    Ok(())
}

/// Quit words. A bare `q` only quits outside the input view, where it
/// could be a name.
fn is_quit(view: View, input: &str) -> bool {
    match input {
        "quit" | "exit" => true,
        "q" => view != View::Input,
        _ => false,
    }
}

async fn handle_line<T: Transport, W: Write>(
    controller: &QuoteController<T>,
    state: &mut QuoteState,
    input: &str,
    out: &mut W,
) -> Result<Step> {
    let view = state.view();
    if is_quit(view, input) {
        return Ok(Step::Quit);
    }

    match view {
        View::Input => {
            let submitted = with_loading_notice(controller.submit(state, input), out).await?;
            match submitted {
                Ok(_) => render(state, out)?,
                Err(invalid) => writeln!(out, "{invalid}\n")?,
            }
        }
        View::Quote if input == "n" || input.is_empty() => {
            let outcome = with_loading_notice(controller.new_quote(state), out).await?;
            if outcome.is_some() {
                render(state, out)?;
            }
        }
        View::Quote | View::Error if input == "r" => {
            state.retry();
        }
        _ => {}
    }
    Ok(Step::Continue)
}

/// Forward stdin lines from a plain thread, so a pending read never holds
/// up runtime shutdown.
fn spawn_stdin_reader() -> mpsc::UnboundedReceiver<String> {
    let (tx, rx) = mpsc::unbounded_channel();
    std::thread::spawn(move || {
        for line in io::stdin().lock().lines() {
            let Ok(line) = line else { break };
            if tx.send(line).is_err() {
                break;
            }
        }
    });
    rx
}

/// Prompt and read one line. `None` on EOF or interrupt.
async fn read_line<W: Write>(
    lines: &mut mpsc::UnboundedReceiver<String>,
    prompt: &str,
    token: &CancellationToken,
    out: &mut W,
) -> Result<Option<String>> {
    write!(out, "{prompt}")?;
    out.flush()?;

    tokio::select! {
        _ = token.cancelled() => Ok(None),
        line = lines.recv() => Ok(line),
    }
}

/// Await `fut`, writing a notice to `out` if it runs past
/// [`LOADING_NOTICE_DELAY`].
async fn with_loading_notice<F: Future, W: Write>(fut: F, out: &mut W) -> io::Result<F::Output> {
    tokio::pin!(fut);
    tokio::select! {
        output = &mut fut => return Ok(output),
        _ = tokio::time::sleep(LOADING_NOTICE_DELAY) => {
            writeln!(out, "Still generating your quote...")?;
            out.flush()?;
        }
    }
    Ok(fut.await)
}

fn render<W: Write>(state: &QuoteState, out: &mut W) -> io::Result<()> {
    match state.last_outcome() {
        Some(RequestOutcome::Success(_)) => print_quote(state, out),
        Some(RequestOutcome::Failure { message, .. }) => writeln!(out, "\n{message}\n"),
        None => Ok(()),
    }
}

fn print_quote<W: Write>(state: &QuoteState, out: &mut W) -> io::Result<()> {
    let Some(quote) = state.last_outcome().and_then(RequestOutcome::quote) else {
        return Ok(());
    };

    writeln!(out, "\n  \"{}\"\n", quote.quote)?;
    writeln!(out, "  {}", quote.attribution(state.user_name()))?;
    match state.last_request_at() {
        Some(at) => {
            let time = Local.from_utc_datetime(&at.naive_utc()).format("%H:%M:%S");
            writeln!(out, "  {} at {time}\n", quote.powered_by())
        }
        None => writeln!(out, "  {}\n", quote.powered_by()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use client::ErrorKind;
    use client::transport::{RawResponse, TransportError, Url};
    use std::sync::{Arc, Mutex};

    const ENDPOINT: &str = "http://quotes.test/Prod/quote/";

    /// Answers every request with the same quote and records the URLs.
    #[derive(Clone, Default)]
    struct Recorder {
        urls: Arc<Mutex<Vec<String>>>,
    }

    impl Recorder {
        fn urls(&self) -> Vec<String> {
            self.urls.lock().unwrap().clone()
        }
    }

    impl Transport for Recorder {
        async fn get(&self, url: &Url) -> std::result::Result<RawResponse, TransportError> {
            self.urls.lock().unwrap().push(url.to_string());
            Ok(RawResponse {
                status: 200,
                status_text: "OK".into(),
                body: br#"{"quote":"Be bold.","personalized":true,"model":"gpt"}"#.to_vec(),
            })
        }
    }

    /// Never answers.
    struct Silent;

    impl Transport for Silent {
        async fn get(&self, _url: &Url) -> std::result::Result<RawResponse, TransportError> {
            std::future::pending().await
        }
    }

    fn feed(input: &[&str]) -> mpsc::UnboundedReceiver<String> {
        let (tx, rx) = mpsc::unbounded_channel();
        for line in input {
            tx.send(line.to_string()).unwrap();
        }
        rx
    }

    async fn session(recorder: &Recorder, input: &[&str]) -> (QuoteState, String) {
        let controller = QuoteController::builder(ENDPOINT)
            .build_with(recorder.clone())
            .unwrap();
        let mut state = QuoteState::new();
        let mut out = Vec::new();
        run_session(
            &controller,
            &mut state,
            &mut feed(input),
            &CancellationToken::new(),
            &mut out,
        )
        .await
        .unwrap();
        (state, String::from_utf8(out).unwrap())
    }

    #[tokio::test(start_paused = true)]
    async fn notice_after_one_second() {
        let mut out = Vec::new();
        let value = with_loading_notice(
            async {
                tokio::time::sleep(Duration::from_millis(1500)).await;
                7
            },
            &mut out,
        )
        .await
        .unwrap();

        assert_eq!(value, 7);
        assert_eq!(
            String::from_utf8(out).unwrap(),
            "Still generating your quote...\n"
        );
    }

    #[tokio::test(start_paused = true)]
    async fn no_notice_for_fast_requests() {
        let mut out = Vec::new();
        let value = with_loading_notice(
            async {
                tokio::time::sleep(Duration::from_millis(200)).await;
                7
            },
            &mut out,
        )
        .await
        .unwrap();

        assert_eq!(value, 7);
        assert!(out.is_empty());
    }

    #[tokio::test]
    async fn session_walks_through_views() {
        let recorder = Recorder::default();
        let (state, out) =
            session(&recorder, &["Ada", "n", "r", "John@Doe", "Bob", "quit"]).await;

        assert_eq!(
            recorder.urls(),
            vec![
                format!("{ENDPOINT}?name=Ada"),
                format!("{ENDPOINT}?name=Ada"),
                format!("{ENDPOINT}?name=Bob"),
            ]
        );
        assert_eq!(state.view(), View::Quote);
        assert_eq!(state.user_name(), "Bob");
        assert!(out.contains("\"Be bold.\""));
        assert!(out.contains("Personalized for Ada"));
        assert!(out.contains("Powered by gpt"));
        assert!(out.contains("Please use only letters"));
        assert!(out.contains("[n]ew quote, [r]etry with another name, [q]uit: "));
    }

    #[tokio::test]
    async fn empty_line_on_quote_view_fetches_again() {
        let recorder = Recorder::default();
        let (state, _) = session(&recorder, &["Ada", ""]).await;

        assert_eq!(recorder.urls().len(), 2);
        assert_eq!(state.view(), View::Quote);
    }

    #[tokio::test]
    async fn q_is_a_name_on_the_input_view() {
        let recorder = Recorder::default();
        let (state, _) = session(&recorder, &["q", "q", "n"]).await;

        assert_eq!(recorder.urls(), vec![format!("{ENDPOINT}?name=q")]);
        assert_eq!(state.user_name(), "q");
    }

    #[test]
    fn quit_words_depend_on_view() {
        assert!(is_quit(View::Input, "quit"));
        assert!(is_quit(View::Input, "exit"));
        assert!(!is_quit(View::Input, "q"));
        assert!(is_quit(View::Quote, "q"));
        assert!(is_quit(View::Error, "q"));
        assert!(!is_quit(View::Quote, "n"));
    }

    #[tokio::test(start_paused = true)]
    async fn interrupt_cancels_request_and_ends_session() {
        let token = CancellationToken::new();
        let controller = QuoteController::builder(ENDPOINT)
            .cancellation_token(token.clone())
            .build_with(Silent)
            .unwrap();
        let mut state = QuoteState::new();
        let mut out = Vec::new();
        let (tx, mut lines) = mpsc::unbounded_channel();
        tx.send("Ada".to_string()).unwrap();

        let interrupt = token.clone();
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(10)).await;
            interrupt.cancel();
        });

        run_session(&controller, &mut state, &mut lines, &token, &mut out)
            .await
            .unwrap();

        assert_eq!(
            state.last_outcome().and_then(RequestOutcome::error_kind),
            Some(ErrorKind::Cancelled)
        );
        assert!(!state.is_loading());
        assert!(String::from_utf8(out).unwrap().contains("Request cancelled."));
        drop(tx);
    }
}
