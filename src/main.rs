use std::time::Duration;

use clap::Parser;
use github_typeahead::{
    ApiConfig, GitHubClient, Point, PointerBus, PointerDown, Typeahead, TypeaheadConfig,
};
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::{Level, info, warn};
use tracing_subscriber::EnvFilter;

/// Type-ahead search for GitHub users, driven from stdin.
///
/// Every line typed becomes the new input text. Lines starting with `:` are
/// widget events; see `:help`.
#[derive(Parser, Debug)]
#[command(name = "typeahead", about = "Type-ahead search for GitHub users")]
struct Cli {
    /// Quiet period before a search is sent, in milliseconds.
    #[arg(long, env = "TYPEAHEAD_DEBOUNCE_MS", default_value_t = 300)]
    debounce_ms: u64,

    /// Override the API host (defaults to GITHUB_API_HOST or api.github.com).
    #[arg(long)]
    host: Option<String>,
}

#[derive(Debug, PartialEq)]
enum Command {
    Input(String),
    Focus,
    Click(Point),
    Clear,
    Open(usize),
    Help,
    Quit,
    Invalid(String),
}

impl Command {
    fn parse(line: &str) -> Self {
        let Some(rest) = line.strip_prefix(':') else {
            return Command::Input(line.to_string());
        };

        let mut words = rest.split_whitespace();
        match (words.next(), words.next(), words.next()) {
            (Some("focus"), None, None) => Command::Focus,
            (Some("clear"), None, None) => Command::Clear,
            (Some("help"), None, None) => Command::Help,
            (Some("quit" | "q"), None, None) => Command::Quit,
            (Some("open"), Some(n), None) => match n.parse::<usize>() {
                Ok(n) if n > 0 => Command::Open(n),
                _ => Command::Invalid(line.to_string()),
            },
            (Some("click"), Some(x), Some(y)) => match (x.parse::<f32>(), y.parse::<f32>()) {
                (Ok(x), Ok(y)) if words.next().is_none() => Command::Click(Point::new(x, y)),
                _ => Command::Invalid(line.to_string()),
            },
            _ => Command::Invalid(line.to_string()),
        }
    }
}

const HELP: &str = "\
Type a line to replace the search text. Commands:
  :focus        focus the input (opens the dropdown)
  :click X Y    press the pointer at X,Y (the widget spans 0,0 to 480,320)
  :clear        clear the input
  :open N       open the profile of result N in the browser
  :help         show this text
  :quit         exit";

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env variables
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive(Level::INFO.into()))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let mut api = ApiConfig::from_env();
    if let Some(host) = cli.host {
        api.host = host.trim_end_matches('/').to_string();
    }
    if api.api_key.is_none() {
        warn!("GITHUB_API_KEY is not set; searches are unauthenticated and heavily rate limited");
    }
    info!(host = %api.host, "using search API");

    let client = GitHubClient::new(api)?;
    let bus = PointerBus::global();
    let config = TypeaheadConfig {
        debounce: Duration::from_millis(cli.debounce_ms),
        ..TypeaheadConfig::default()
    };
    let widget = Typeahead::spawn(client, config, bus);

    // Re-render on every state change
    let mut view = widget.subscribe();
    let renderer = tokio::spawn(async move {
        while view.changed().await.is_ok() {
            let snapshot = view.borrow_and_update().clone();
            println!("{snapshot}");
        }
    });

    println!("{HELP}");
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await? {
        match Command::parse(&line) {
            Command::Input(text) => widget.input(text),
            Command::Focus => widget.focus(),
            Command::Clear => widget.clear(),
            Command::Click(position) => {
                bus.publish(PointerDown { position });
            }
            Command::Open(n) => match widget.view().visible_results().get(n - 1) {
                Some(user) => {
                    if let Err(e) = open::that(&user.html_url) {
                        warn!(url = %user.html_url, error = %e, "failed to open profile");
                    }
                }
                None => warn!("no visible result #{n}"),
            },
            Command::Help => println!("{HELP}"),
            Command::Quit => break,
            Command::Invalid(line) => warn!("unrecognised command: {line}"),
        }
    }

    widget.shutdown().await;
    renderer.abort();
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plain_lines_are_input() {
        assert_eq!(Command::parse("octocat"), Command::Input("octocat".into()));
        assert_eq!(Command::parse(""), Command::Input(String::new()));
        assert_eq!(Command::parse("  a b "), Command::Input("  a b ".into()));
    }

    #[test]
    fn parses_commands() {
        assert_eq!(Command::parse(":focus"), Command::Focus);
        assert_eq!(Command::parse(":clear"), Command::Clear);
        assert_eq!(Command::parse(":q"), Command::Quit);
        assert_eq!(Command::parse(":open 2"), Command::Open(2));
        assert_eq!(
            Command::parse(":click 500 12.5"),
            Command::Click(Point::new(500.0, 12.5))
        );
    }

    #[test]
    fn rejects_bad_arguments() {
        for line in [":open 0", ":open x", ":click 1", ":click 1 2 3", ":nope", ":focus now"] {
            assert_eq!(Command::parse(line), Command::Invalid(line.to_string()));
        }
    }
}
