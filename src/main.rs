use clap::{Parser, Subcommand};
use paper_gallery::pipeline::{self, BuildOptions};
use paper_gallery::{config, output};
use std::path::PathBuf;

/// Shared flags for commands that process images.
#[derive(clap::Args, Clone)]
struct CacheArgs {
    /// Disable the image cache — force re-encoding of all card images
    #[arg(long)]
    no_cache: bool,
}

#[derive(Parser)]
#[command(name = "paper-gallery")]
#[command(about = "Render a bibliography as a gallery of publication cards")]
#[command(long_about = "\
Render a bibliography as a gallery of publication cards

Reads a BibTeX/BibLaTeX export and replaces everything between

  <!-- PUBLICATIONS-START -->
  <!-- PUBLICATIONS-END -->

in the target HTML page with one card per publication.

Site layout (paths relative to the HTML page, configurable):

  index.html
  gallery.toml                     # Optional config
  img/papers/
  ├── placeholder.jpg              # Used when no cover is available
  ├── original/                    # One source image per publication
  │   └── 2021_Smith_FooBar.jpg    # Drop a curated cover here to use it
  └── cards/                       # Normalized card images (generated)

Image filenames are <year>_<FirstAuthorSurname>_<TitleSlug>.jpg.

Run 'paper-gallery gen-config' to generate a documented gallery.toml.")]
#[command(version)]
struct Cli {
    /// Bibliography file
    #[arg(long, default_value = "scholar.bib", global = true)]
    bib: PathBuf,

    /// HTML page containing the publication markers
    #[arg(long, default_value = "index.html", global = true)]
    html: PathBuf,

    /// Config file (default: gallery.toml next to the HTML page)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Log cache decisions and fetch attempts
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Resolve images, render cards and update the HTML page
    Build(CacheArgs),
    /// List entries with their derived image paths and links
    Scan {
        /// Emit JSON instead of text
        #[arg(long)]
        json: bool,
    },
    /// Validate bibliography, markers and placeholder without writing
    Check,
    /// Print a stock gallery.toml with all options documented
    GenConfig,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let site_root = pipeline::site_root(&cli.html);
    let load_config = || match &cli.config {
        Some(path) => config::load_config_file(path),
        None => config::load_config(&site_root),
    };

    match cli.command {
        Command::Build(cache_args) => {
            let gallery_config = load_config()?;
            let options = BuildOptions {
                use_cache: !cache_args.no_cache,
            };
            let report = pipeline::build(&cli.bib, &cli.html, &gallery_config, options)?;
            output::print_build_output(&report);
        }
        Command::Scan { json } => {
            let gallery_config = load_config()?;
            let records = pipeline::scan(&cli.bib, &site_root, &gallery_config)?;
            if json {
                println!("{}", serde_json::to_string_pretty(&records)?);
            } else {
                output::print_scan_output(&records);
            }
        }
        Command::Check => {
            println!("==> Checking {}", cli.html.display());
            let gallery_config = load_config()?;
            let report = pipeline::check(&cli.bib, &cli.html, &gallery_config)?;
            output::print_check_output(&report);
            println!("==> Site is valid");
        }
        Command::GenConfig => {
            print!("{}", config::stock_config_toml());
        }
    }

    Ok(())
}

/// `warn` by default, `debug` with `--verbose`; `RUST_LOG` overrides both.
fn init_logging(verbose: bool) {
    let default_level = if verbose { "debug" } else { "warn" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_level))
        .format_timestamp(None)
        .init();
}
