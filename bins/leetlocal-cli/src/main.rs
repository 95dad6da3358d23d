mod commands;
mod generator;

use clap::{Parser, Subcommand};
use commands::App;
use leetlocal_common::types::Language;
use leetlocal_common::Config;
use std::path::PathBuf;
use std::process::ExitCode;

#[derive(Parser)]
#[command(name = "leetlocal")]
#[command(about = "LeetLocal - Practice algorithm problems locally in JavaScript and Python", long_about = None)]
struct Cli {
    /// Config file (defaults to ./leetlocal.json when present)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Disable coloured output
    #[arg(long, global = true, default_value = "false")]
    no_color: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Generate a solution stub for a problem
    Gen {
        /// Problem ID (directory name under problems/)
        id: String,

        /// Target language (js, python)
        #[arg(short, long, value_parser = parse_language)]
        lang: Language,
    },

    /// Run a solution against the problem's test cases
    Test {
        /// Problem ID (directory name under problems/)
        id: String,

        /// Target language (js, python)
        #[arg(short, long, value_parser = parse_language)]
        lang: Language,

        /// Run only the first, middle and last test cases
        #[arg(long, default_value = "false")]
        sample: bool,
    },

    /// List all problems
    List,

    /// Show progress statistics
    Stats,

    /// Scaffold a new problem
    Add {
        /// Problem title (e.g., "Two Sum")
        #[arg(short, long)]
        title: String,

        /// Difficulty (Easy, Medium, Hard)
        #[arg(short, long)]
        difficulty: String,

        /// Problem ID (defaults to the slugified title)
        #[arg(long)]
        id: Option<String>,

        /// Function name (defaults to the camel-cased title)
        #[arg(short, long)]
        function: Option<String>,

        /// Function parameters, comma-separated (e.g., nums,target)
        #[arg(short, long, value_delimiter = ',', required = true)]
        params: Vec<String>,

        /// Compare outputs ignoring array order
        #[arg(long, default_value = "false")]
        unordered: bool,
    },
}

fn parse_language(s: &str) -> Result<Language, String> {
    s.parse()
}

fn init_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

fn load_config(path: Option<&PathBuf>) -> anyhow::Result<Config> {
    match path {
        Some(path) => {
            let mut config = Config::load(path)?;
            config.apply_env(|key| std::env::var(key).ok())?;
            Ok(config)
        }
        None => Ok(Config::load_default()?),
    }
}

async fn run(cli: Cli) -> anyhow::Result<bool> {
    let config = load_config(cli.config.as_ref())?;
    let color = !cli.no_color && commands::color_enabled();
    let app = App::new(config, color);

    match cli.command {
        Commands::Gen { id, lang } => {
            commands::generate_solution(&app, &id, lang)?;
        }
        Commands::Test { id, lang, sample } => {
            return commands::run_tests(&app, &id, lang, sample).await;
        }
        Commands::List => {
            commands::list_problems(&app);
        }
        Commands::Stats => {
            commands::show_stats(&app);
        }
        Commands::Add {
            title,
            difficulty,
            id,
            function,
            params,
            unordered,
        } => {
            commands::add_problem(
                &app,
                &title,
                &difficulty,
                id.as_deref(),
                function.as_deref(),
                &params,
                unordered,
            )?;
        }
    }

    Ok(true)
}

#[tokio::main]
async fn main() -> ExitCode {
    init_tracing();

    // Usage errors are fatal errors too and exit 1; help and version still exit 0.
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(e) => {
            let _ = e.print();
            return if e.use_stderr() {
                ExitCode::FAILURE
            } else {
                ExitCode::SUCCESS
            };
        }
    };

    match run(cli).await {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::FAILURE,
        Err(e) => {
            eprintln!("Error: {:#}", e);
            ExitCode::FAILURE
        }
    }
}
