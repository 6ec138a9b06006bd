use std::io::IsTerminal;

use clap::Parser;
use colored::{control, Colorize};
use gh_contrib::{
    client::GitHubClient, config::Config, range::DateRange, report, version::LocalRegistry,
    ReportOptions,
};

#[derive(Parser)]
#[command(name = "gh-contrib", version, about = "Show your GitHub contribution calendar")]
struct Cli {
    /// First day to show (YYYY-MM-DD), defaults to 5 days ago
    #[arg(long, value_name = "YYYY-MM-DD")]
    from: Option<String>,

    /// Last day to show (YYYY-MM-DD), defaults to today
    #[arg(long, value_name = "YYYY-MM-DD")]
    to: Option<String>,

    /// Disable colored output
    #[arg(long)]
    no_color: bool,

    /// Don't look for a newer release of the extension
    #[arg(long)]
    skip_version_check: bool,
}

async fn run(cli: Cli, colorize: bool) -> anyhow::Result<()> {
    let config = Config::from_env()?;
    let client = GitHubClient::new(&config)?;
    let options = ReportOptions {
        from: cli.from,
        to: cli.to,
        colorize,
        registry: if cli.skip_version_check {
            None
        } else {
            LocalRegistry::locate()
        },
    };
    report(&client, &options, DateRange::today()).await
}

#[tokio::main(flavor = "current_thread")]
async fn main() {
    env_logger::init();
    let cli = Cli::parse();

    let colors_allowed = !(cli.no_color
        || std::env::var_os("NO_COLOR").is_some()
        || std::env::var_os("TERM").is_some_and(|v| v == "dumb"));
    // styling is decided per stream below, not by colored's own detection
    control::set_override(colors_allowed);
    let colorize = colors_allowed && std::io::stdout().is_terminal();
    let color_errors = colors_allowed && std::io::stderr().is_terminal();

    std::panic::set_hook(Box::new(move |info| {
        eprintln!("{}", error_line(&info.to_string(), color_errors));
    }));

    if let Err(e) = run(cli, colorize).await {
        eprintln!("{}", error_line(&format!("{e:#}"), color_errors));
        std::process::exit(1);
    }
}

fn error_line(message: &str, color: bool) -> String {
    let line = format!("error: {message}");
    if color { line.red().to_string() } else { line }
}
