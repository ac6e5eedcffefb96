use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use snippet_lens::commands::{self, Format};
use snippet_lens::diagnostics;
use snippet_lens::mkdocs::MkdocsConfigReader;
use snippet_lens::watch;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "snippet-lens", about = "Check and preview MkDocs snippet references")]
struct Cli {
    /// Project root containing mkdocs.yml and the markdown sources
    #[arg(long, global = true, default_value = ".")]
    root: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Report snippet references whose files cannot be resolved
    Check {
        #[arg(long, value_enum, default_value = "text")]
        format: Format,
    },
    /// Show an inline preview of every snippet reference in a file
    Preview {
        /// Markdown file, relative to the root
        file: PathBuf,
    },
    /// Show the hover text for the reference at a position
    Hover {
        /// Markdown file, relative to the root
        file: PathBuf,
        /// 1-based line
        line: usize,
        /// 1-based column, in characters
        column: usize,
    },
    /// List where each snippet reference in a file resolves to
    Links {
        /// Markdown file, relative to the root
        file: PathBuf,
        #[arg(long, value_enum, default_value = "text")]
        format: Format,
    },
    /// Watch for changes and re-run check
    Watch {
        #[arg(long, value_enum, default_value = "text")]
        format: Format,
    },
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_writer(std::io::stderr)
        .without_time()
        .init();

    let cli = Cli::parse();
    let reader = MkdocsConfigReader::default();
    let root = cli.root;

    let result = match cli.command {
        Commands::Check { format } => commands::check(&root, format, &reader),
        Commands::Preview { file } => commands::preview(&root, &file, &reader),
        Commands::Hover { file, line, column } => commands::hover(&root, &file, line, column, &reader),
        Commands::Links { file, format } => commands::links(&root, &file, format, &reader),
        Commands::Watch { format } => watch::run(&root, format),
    };

    match result {
        Ok(code) => code,
        Err(e) => {
            diagnostics::print_error(&e);
            ExitCode::from(3)
        },
    }
}
