use clap::{Parser as ClapParser, Subcommand};
use sift_lang::cli::{self, CheckOptions, CheckResult, CliError};
use std::fs;
use std::io::{self, Read};
use tracing_subscriber::EnvFilter;

#[derive(ClapParser)]
#[command(name = "sift")]
#[command(about = "Sift - A safe filter and sort language for JSON records")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Validate a filter and run it against JSON records
    Check {
        /// The filter expression
        filter: String,

        /// Catalog file (JSON) declaring the queryable columns
        #[arg(short, long)]
        catalog: String,

        /// Order-by expression, e.g. "name asc, hired desc"
        #[arg(short, long)]
        order_by: Option<String>,

        /// JSON input (reads from stdin if not provided)
        #[arg(short, long)]
        input: Option<String>,

        /// Records per page
        #[arg(long)]
        page_size: Option<usize>,

        /// 0-based page number
        #[arg(long, default_value_t = 0)]
        page: usize,

        /// Pretty-print the output
        #[arg(short, long)]
        pretty: bool,

        /// Only validate the query, don't execute
        #[arg(long)]
        syntax_only: bool,
    },

    /// List documentation categories
    Docs,

    /// Show documentation for a specific category
    Doc {
        /// Category name (use 'sift docs' to list categories)
        category: String,
    },
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_writer(io::stderr)
        .init();

    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Check {
            filter,
            catalog,
            order_by,
            input,
            page_size,
            page,
            pretty,
            syntax_only,
        } => fs::read_to_string(&catalog)
            .map_err(CliError::from)
            .and_then(|catalog| {
                run_check(
                    CheckOptions {
                        filter,
                        order_by,
                        catalog,
                        input,
                        page_size,
                        page,
                        syntax_only,
                    },
                    pretty,
                )
            }),
        Commands::Docs => {
            print!("{}", cli::get_docs_overview());
            Ok(())
        }
        Commands::Doc { category } => cli::get_doc_category(&category).map(|content| {
            print!("{}", content);
        }),
    };

    if let Err(e) = result {
        eprintln!("{}", e);
        std::process::exit(1);
    }
}

fn run_check(mut options: CheckOptions, pretty: bool) -> Result<(), CliError> {
    if options.input.is_none() && !options.syntax_only && !atty::is(atty::Stream::Stdin) {
        let mut buffer = String::new();
        io::stdin().read_to_string(&mut buffer)?;
        options.input = Some(buffer);
    }

    match cli::execute_check(&options)? {
        CheckResult::SyntaxValid { filter, order_by } => {
            println!("Syntax is valid");
            println!("filter:   {}", filter);
            if !order_by.is_empty() {
                println!("order by: {}", order_by);
            }
        }
        CheckResult::Success(output) => {
            let json = if pretty {
                serde_json::to_string_pretty(&output)?
            } else {
                serde_json::to_string(&output)?
            };
            println!("{}", json);
        }
    }
    Ok(())
}
