use clap::{Parser, Subcommand};
use mdpress::{config, output, pipeline::Pipeline, site};
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

fn version_string() -> &'static str {
    let hash = env!("MDPRESS_GIT_HASH");
    if env!("MDPRESS_RELEASE_TAG") == "true" {
        env!("CARGO_PKG_VERSION")
    } else if hash.is_empty() {
        "dev@unknown"
    } else {
        // Called once at startup
        Box::leak(format!("dev@{hash}").into_boxed_str())
    }
}

#[derive(Parser)]
#[command(name = "mdpress")]
#[command(about = "Markdown renderer for a small blog")]
#[command(long_about = "\
Markdown renderer for a small blog

Posts are markdown files. A numeric filename prefix is the post's entry
number: it orders the index (highest first) and scopes footnote ids, so
post 12's first footnote is #footnote-12-1.

Content structure:

  content/
  ├── config.toml            # Site config (optional, cascades to subdirs)
  ├── 001-hello.md           # Post 1 → dist/hello/index.html
  ├── about.md               # Unnumbered post → dist/about/index.html
  └── notes/
      ├── config.toml        # Overrides for posts under notes/
      └── 002-short.md

Rendering rules:
  **strong** is rendered as <em>
  paragraphs holding only whitespace are dropped
  footnotes are collected into a section at the end of each post

Set RUST_LOG=debug to trace rendering decisions.
Run 'mdpress gen-config' to generate a documented config.toml.")]
#[command(version = version_string())]
struct Cli {
    /// Content directory
    #[arg(long, default_value = "content", global = true)]
    source: PathBuf,

    /// Output directory
    #[arg(long, default_value = "dist", global = true)]
    output: PathBuf,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Render one markdown file to an HTML fragment on stdout
    Render {
        /// Markdown file
        file: PathBuf,
        /// Footnote scope (defaults to the file's entry number)
        #[arg(long)]
        scope: Option<u32>,
    },
    /// Print the presentation tree of one markdown file as JSON
    Ast {
        /// Markdown file
        file: PathBuf,
    },
    /// Render every post into the output directory
    Build,
    /// Render every post without writing anything
    Check,
    /// Print a stock config.toml with all options documented
    GenConfig,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Command::Render { file, scope } => {
            let pipeline = pipeline_for(&cli.source, &file)?;
            let scope = scope.or_else(|| entry_number(&file));
            let markdown = std::fs::read_to_string(&file)?;
            let rendered = pipeline.render(&markdown, scope);
            println!("{}", rendered.html);
        }
        Command::Ast { file } => {
            let pipeline = pipeline_for(&cli.source, &file)?;
            let markdown = std::fs::read_to_string(&file)?;
            let doc = pipeline.parse(&markdown);
            let tree = pipeline.transform(&doc.root, entry_number(&file));
            println!("{}", serde_json::to_string_pretty(&tree)?);
        }
        Command::Build => {
            let root_config = config::load_config(&cli.source)?;
            init_thread_pool(&root_config.processing);
            println!("==> Building {} → {}", cli.source.display(), cli.output.display());
            let report = site::build(&cli.source, &cli.output)?;
            output::print_build_output(&report, &cli.source);
            println!("==> Build complete: {}", cli.output.display());
        }
        Command::Check => {
            let root_config = config::load_config(&cli.source)?;
            init_thread_pool(&root_config.processing);
            println!("==> Checking {}", cli.source.display());
            let loaded = site::load_site(&cli.source)?;
            output::print_check_output(&loaded, &cli.source);
            println!("==> Content is valid");
        }
        Command::GenConfig => {
            print!("{}", config::stock_config_toml());
        }
    }

    Ok(())
}

fn pipeline_for(source: &Path, file: &Path) -> Result<Pipeline, site::SiteError> {
    let config = site::config_for_file(source, file)?;
    Ok(Pipeline::from_config(&config))
}

fn entry_number(file: &Path) -> Option<u32> {
    let stem = file.file_stem()?.to_string_lossy();
    mdpress::naming::parse_post_name(&stem).number
}

/// Initialize the rayon thread pool based on processing config.
///
/// Capped at the number of available cores; config can only lower it.
fn init_thread_pool(processing: &config::ProcessingConfig) {
    let threads = config::effective_threads(processing);
    rayon::ThreadPoolBuilder::new()
        .num_threads(threads)
        .build_global()
        .ok();
}
