use anyhow::{bail, Context, Result};
use clap::{Args, Parser, Subcommand};
use ferromath_core::{Config, MathSession, Position};
use ferromath_syntax::SourceBuffer;
use serde_json::json;
use std::borrow::Cow;
use std::fs;
use std::io::Read;
use std::path::{Path, PathBuf};

#[derive(Parser)]
#[command(name = "ferromath")]
#[command(about = "FerroMath LaTeX math editing tools", long_about = None)]
struct Cli {
    /// Configuration file (default: .ferromath.json in the current directory)
    #[arg(long, global = true, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Log at debug level unless RUST_LOG is set
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the math region around the cursor as JSON
    Locate {
        /// Path to the .tex file, or - for stdin
        #[arg(value_name = "FILE")]
        path: PathBuf,
        #[command(flatten)]
        cursor: CursorArgs,
    },
    /// Print the jump points of the region around the cursor, or of the whole input
    Jumps {
        #[arg(value_name = "FILE")]
        path: PathBuf,
        #[command(flatten)]
        cursor: CursorArgs,
    },
    /// Split the equation around the cursor, or the whole input, at top-level `=`
    Split {
        #[arg(value_name = "FILE")]
        path: PathBuf,
        #[command(flatten)]
        cursor: CursorArgs,
        /// Rewrite the file instead of printing the result
        #[arg(long)]
        in_place: bool,
    },
    /// Run auto-bracing on a line as if the character before END was just typed
    Brace {
        line: String,
        /// Byte offset just after the typed character (default: end of line)
        #[arg(long)]
        end: Option<usize>,
    },
    /// Dump the scanner's tokens as JSON
    Tokens {
        #[arg(value_name = "FILE")]
        path: PathBuf,
    },
    /// Print the document's label/reference graph as JSON
    Refs {
        #[arg(value_name = "FILE")]
        path: PathBuf,
    },
}

#[derive(Args)]
struct CursorArgs {
    /// Cursor offset
    #[arg(long, conflicts_with_all = ["line", "column"])]
    offset: Option<usize>,
    /// Zero-based cursor line
    #[arg(long, requires = "column")]
    line: Option<u32>,
    /// Zero-based cursor column
    #[arg(long, requires = "line")]
    column: Option<u32>,
    /// Count --offset and --column in UTF-16 code units instead of bytes
    #[arg(long)]
    utf16: bool,
}

impl CursorArgs {
    fn position(&self) -> Option<Position> {
        match (self.offset, self.line, self.column) {
            (Some(units), _, _) if self.utf16 => Some(Position::Utf16Offset(units)),
            (Some(offset), _, _) => Some(Position::Offset(offset)),
            (None, Some(line), Some(col)) if self.utf16 => Some(Position::Utf16LineCol { line, col }),
            (None, Some(line), Some(col)) => Some(Position::LineCol { line, col }),
            _ => None,
        }
    }

    fn resolve(&self, buffer: &SourceBuffer) -> Result<Option<usize>> {
        match self.position() {
            Some(position) => Ok(Some(position.resolve(buffer)?)),
            None => Ok(None),
        }
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let config = load_config(cli.config.as_deref())?;
    let mut session = MathSession::new(config);

    match &cli.command {
        Commands::Locate { path, cursor } => {
            let buffer = SourceBuffer::new(read_input(path)?);
            let Some(offset) = cursor.resolve(&buffer)? else {
                bail!("locate needs a cursor: pass --offset or --line/--column");
            };
            let region = session.locate_math_region(buffer.text(), offset);
            println!("{}", serde_json::to_string_pretty(&region)?);
        }
        Commands::Jumps { path, cursor } => {
            let buffer = SourceBuffer::new(read_input(path)?);
            let output = match cursor.resolve(&buffer)? {
                Some(offset) => match session.locate_math_region(buffer.text(), offset) {
                    Some(region) => json!({
                        "points": session.compute_jump_points(&region.text),
                        "region": region,
                    }),
                    None => serde_json::Value::Null,
                },
                None => json!({
                    "points": session.compute_jump_points(buffer.text().trim_end()),
                }),
            };
            println!("{}", serde_json::to_string_pretty(&output)?);
        }
        Commands::Split {
            path,
            cursor,
            in_place,
        } => {
            let buffer = SourceBuffer::new(read_input(path)?);
            let text = buffer.text();
            let result: Cow<'_, str> = match cursor.resolve(&buffer)? {
                Some(offset) => match session.split_at(text, offset) {
                    Some(edit) => Cow::Owned(edit.apply(text)),
                    None => Cow::Borrowed(text),
                },
                None => session.split_equation(text.trim_end()),
            };

            if matches!(result, Cow::Borrowed(_)) {
                eprintln!("Nothing to split.");
                if !*in_place {
                    print!("{}", text);
                }
                return Ok(());
            }

            if *in_place {
                if is_stdin(path) {
                    bail!("--in-place cannot be used with stdin");
                }
                fs::write(path, result.as_bytes())
                    .with_context(|| format!("failed to write {}", path.display()))?;
                log::info!("Rewrote {}", path.display());
            } else {
                println!("{}", result);
            }
        }
        Commands::Brace { line, end } => {
            let end = end.unwrap_or(line.len());
            let candidate = session.on_character_inserted(line, end);
            println!("{}", serde_json::to_string_pretty(&candidate)?);
        }
        Commands::Tokens { path } => {
            let text = read_input(path)?;
            let tokens: Vec<_> = ferromath_syntax::scan(&text).collect();
            println!("{}", serde_json::to_string_pretty(&tokens)?);
        }
        Commands::Refs { path } => {
            let graph = ferromath_core::build_reference_graph(&read_input(path)?);
            log::info!(
                "{} labels, {} references",
                graph.nodes.len(),
                graph.edges.len()
            );
            println!("{}", serde_json::to_string_pretty(&graph)?);
        }
    }
    Ok(())
}

fn init_logging(verbose: bool) {
    let default_filter = if verbose { "debug" } else { "warn" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_filter))
        .init();
}

fn load_config(path: Option<&Path>) -> Result<Config> {
    if let Some(path) = path {
        return Config::load(path)
            .with_context(|| format!("failed to load config {}", path.display()));
    }
    let cwd = std::env::current_dir()?;
    Ok(Config::discover(&cwd)?.unwrap_or_default())
}

fn is_stdin(path: &Path) -> bool {
    path.as_os_str() == "-"
}

fn read_input(path: &Path) -> Result<String> {
    if is_stdin(path) {
        let mut content = String::new();
        std::io::stdin()
            .read_to_string(&mut content)
            .context("failed to read stdin")?;
        return Ok(content);
    }
    fs::read_to_string(path).with_context(|| format!("failed to read {}", path.display()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_cursor_positions() {
        let cli = Cli::parse_from(["ferromath", "locate", "a.tex", "--line", "2", "--column", "5"]);
        let Commands::Locate { cursor, .. } = cli.command else {
            panic!("expected locate");
        };
        assert_eq!(cursor.position(), Some(Position::LineCol { line: 2, col: 5 }));

        let cli = Cli::parse_from(["ferromath", "jumps", "-", "--offset", "7", "--utf16"]);
        let Commands::Jumps { cursor, .. } = cli.command else {
            panic!("expected jumps");
        };
        assert_eq!(cursor.position(), Some(Position::Utf16Offset(7)));
    }

    #[test]
    fn test_refs_takes_a_file() {
        let cli = Cli::parse_from(["ferromath", "--verbose", "refs", "paper.tex"]);
        assert!(cli.verbose);
        assert!(matches!(cli.command, Commands::Refs { path } if path == Path::new("paper.tex")));
    }

    #[test]
    fn test_offset_conflicts_with_line() {
        let result = Cli::try_parse_from([
            "ferromath", "locate", "a.tex", "--offset", "1", "--line", "0", "--column", "0",
        ]);
        assert!(result.is_err());
    }

    #[test]
    fn test_resolve_against_buffer() {
        let cli = Cli::parse_from(["ferromath", "split", "a.tex", "--offset", "99"]);
        let Commands::Split { cursor, .. } = cli.command else {
            panic!("expected split");
        };
        let buffer = SourceBuffer::new("$a = b$");
        assert!(cursor.resolve(&buffer).is_err());
    }
}
