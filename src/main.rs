//! ccg CLI: parse categories and sentences with a CCG lexicon.

use std::io::{BufRead, Write};
use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand};
use miette::{IntoDiagnostic, Result};

use ccg_chart::agenda::ApplicationPreference;
use ccg_chart::chart::ChartParser;
use ccg_chart::config::ParserConfig;
use ccg_chart::derivation::DerivationTree;
use ccg_chart::error::CcgError;
use ccg_chart::lexicon::Lexicon;
use ccg_chart::notation;

#[derive(Parser)]
#[command(name = "ccg", version, about = "Combinatory Categorial Grammar chart parser")]
struct Cli {
    /// Parser config file (TOML).
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Disable crossing composition.
    #[arg(long, global = true)]
    no_crossing: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Parse a category expression and print it back.
    Category {
        /// Category in standard notation, e.g. "(S\NP)/NP".
        expr: String,

        /// Print the category as JSON.
        #[arg(long)]
        json: bool,
    },

    /// Parse a sentence and print its derivations.
    Parse {
        /// Lexicon file (TOML).
        #[arg(long)]
        lexicon: PathBuf,

        /// Keep a single derivation per chart cell.
        #[arg(long)]
        deterministic: bool,

        /// Print only the best derivation, preferring application.
        #[arg(long, conflicts_with = "deterministic")]
        best: bool,

        /// Print derivations as JSON.
        #[arg(long)]
        json: bool,

        /// Words of the sentence.
        #[arg(required = true)]
        words: Vec<String>,
    },

    /// Read sentences from stdin, one per line. Lines starting with `:c ` are
    /// parsed as categories.
    Repl {
        /// Lexicon file (TOML).
        #[arg(long)]
        lexicon: PathBuf,
    },
}

#[derive(Clone, Copy)]
enum Mode {
    All,
    Deterministic,
    Best,
}

fn main() -> Result<()> {
    miette::set_hook(Box::new(|_| {
        Box::new(
            miette::MietteHandlerOpts::new()
                .terminal_links(true)
                .unicode(true)
                .context_lines(3)
                .build(),
        )
    }))
    .ok(); // Ignore error if hook already set (e.g., in tests)

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let config = load_config(cli.config.as_deref(), cli.no_crossing)?;

    match cli.command {
        Commands::Category { expr, json } => {
            let category = notation::parse_category(&expr).map_err(CcgError::from)?;
            if json {
                println!("{}", serde_json::to_string_pretty(&category).into_diagnostic()?);
            } else {
                println!("{category}");
            }
        }

        Commands::Parse {
            lexicon,
            deterministic,
            best,
            json,
            words,
        } => {
            let lexicon = Lexicon::load(&lexicon).map_err(CcgError::from)?;
            let parser = ChartParser::with_config(&lexicon, config);
            let words: Vec<&str> = words.iter().map(String::as_str).collect();
            let mode = if deterministic {
                Mode::Deterministic
            } else if best {
                Mode::Best
            } else {
                Mode::All
            };
            run_parse(&parser, &words, mode, json)?;
        }

        Commands::Repl { lexicon } => {
            let lexicon = Lexicon::load(&lexicon).map_err(CcgError::from)?;
            let parser = ChartParser::with_config(&lexicon, config);
            repl(&parser)?;
        }
    }

    Ok(())
}

fn load_config(path: Option<&Path>, no_crossing: bool) -> Result<ParserConfig> {
    let mut config = match path {
        Some(path) => ParserConfig::load(path).map_err(CcgError::from)?,
        None => ParserConfig::default(),
    };
    if no_crossing {
        config.crossing = false;
    }
    Ok(config)
}

fn run_parse(
    parser: &ChartParser<'_, Lexicon>,
    words: &[&str],
    mode: Mode,
    json: bool,
) -> Result<()> {
    match mode {
        Mode::All => {
            let trees = parser.try_parse(words).map_err(CcgError::from)?;
            if json {
                println!("{}", serde_json::to_string_pretty(&trees).into_diagnostic()?);
            } else {
                print_trees(&trees, words);
            }
        }
        Mode::Deterministic => {
            let tree = parser
                .try_parse_deterministic(words)
                .map_err(CcgError::from)?;
            if json {
                println!("{}", serde_json::to_string_pretty(&tree).into_diagnostic()?);
            } else {
                print_trees(tree.as_slice(), words);
            }
        }
        Mode::Best => {
            let best = parser
                .try_parse_best(words, &ApplicationPreference)
                .map_err(CcgError::from)?;
            if json {
                println!("{}", serde_json::to_string_pretty(&best).into_diagnostic()?);
            } else if let Some(best) = best {
                println!("score {} (head \"{}\")", best.score, best.head_word);
                print!("{}", best.tree.render(words));
            } else {
                println!("no derivation");
            }
        }
    }
    Ok(())
}

fn print_trees(trees: &[DerivationTree], words: &[&str]) {
    if trees.is_empty() {
        println!("no derivation");
        return;
    }
    println!("{} derivation(s)", trees.len());
    for (i, tree) in trees.iter().enumerate() {
        println!();
        println!("[{}]", i + 1);
        print!("{}", tree.render(words));
    }
}

fn repl(parser: &ChartParser<'_, Lexicon>) -> Result<()> {
    let stdin = std::io::stdin();
    let mut stdout = std::io::stdout();
    let mut line = String::new();
    loop {
        print!("ccg> ");
        stdout.flush().into_diagnostic()?;
        line.clear();
        if stdin.lock().read_line(&mut line).into_diagnostic()? == 0 {
            println!();
            break;
        }
        let input = line.trim();
        if input.is_empty() {
            continue;
        }
        if matches!(input, ":q" | ":quit") {
            break;
        }
        if let Some(expr) = input.strip_prefix(":c ") {
            match notation::parse_category(expr) {
                Ok(category) => println!("{category}"),
                Err(err) => eprintln!("{:?}", miette::Report::new(err)),
            }
            continue;
        }
        let words: Vec<&str> = input.split_whitespace().collect();
        if let Err(err) = run_parse(parser, &words, Mode::All, false) {
            eprintln!("{err:?}");
        }
    }
    Ok(())
}
