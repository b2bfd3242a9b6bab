use bibfolio::config::{self, Overrides};
use bibfolio::site::Site;
use bibfolio::{generate, output};
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};

/// Flags that override values from the config file.
#[derive(clap::Args, Clone, Default)]
struct OverrideArgs {
    /// Field whose value names the groups (e.g. year, keywords)
    #[arg(long, global = true)]
    group_by: Option<String>,

    /// Only list entries whose author list contains this text
    #[arg(long = "author", global = true)]
    author_filter: Option<String>,

    /// HTML fragment written before every page body
    #[arg(long, global = true)]
    preamble: Option<String>,

    /// HTML fragment written after every page body
    #[arg(long, global = true)]
    postamble: Option<String>,

    /// Tab-separated name → homepage file for author links
    #[arg(long, global = true)]
    homepages: Option<String>,

    /// Read author and editor fields into person lists
    #[arg(long, global = true)]
    expand_person_lists: bool,
}

impl From<OverrideArgs> for Overrides {
    fn from(args: OverrideArgs) -> Self {
        Overrides {
            group_by: args.group_by,
            author_filter: args.author_filter,
            preamble: args.preamble,
            postamble: args.postamble,
            homepages: args.homepages,
            expand_person_lists: args.expand_person_lists,
        }
    }
}

#[derive(Parser)]
#[command(name = "bibfolio")]
#[command(about = "Static publication pages from a BibTeX database")]
#[command(long_about = "\
Static publication pages from a BibTeX database

Reads a .bib file and writes an overview page grouped by a field (year by
default, newest first) plus one detail page per entry with its BibTeX
source. Only entries whose author list contains the author filter and
that have a year are listed.

Output structure:

  dist/
  ├── all.html              # Group index + grouped entry list
  └── details/
      └── <key>.html        # Entry + BibTeX source

Homepage file (optional, tab-separated, last column is the URL):

  Sebastian Riedel<TAB>S. Riedel<TAB>http://example.org/~riedel

Run 'bibfolio gen-config' to generate a documented bibfolio.toml.")]
#[command(version)]
struct Cli {
    /// Config file (optional; defaults are used when it does not exist)
    #[arg(long, default_value = "bibfolio.toml", global = true)]
    config: PathBuf,

    #[command(flatten)]
    overrides: OverrideArgs,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Generate the overview and detail pages
    Build {
        /// BibTeX database
        bib: PathBuf,
        /// Output directory
        #[arg(long, default_value = "dist")]
        output: PathBuf,
    },
    /// Read the database and report groups without writing anything
    Check {
        /// BibTeX database
        bib: PathBuf,
    },
    /// Print the grouped, sorted view model as JSON
    View {
        /// BibTeX database
        bib: PathBuf,
    },
    /// Print a stock bibfolio.toml with all options documented
    GenConfig,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let overrides = Overrides::from(cli.overrides);

    match cli.command {
        Command::Build { bib, output } => {
            let site = load_site(&cli.config, &overrides, &bib)?;
            let view = site.view();
            output::print_site_summary(&site, &view);

            println!("==> Generating HTML → {}", output.display());
            let report = generate::generate(&site, &output)?;
            output::print_generate_output(&report, &output);
        }
        Command::Check { bib } => {
            let site = load_site(&cli.config, &overrides, &bib)?;
            let view = site.view();
            output::print_site_summary(&site, &view);
            println!("==> Bibliography is readable");
        }
        Command::View { bib } => {
            let site = load_site(&cli.config, &overrides, &bib)?;
            println!("{}", serde_json::to_string_pretty(&site.view())?);
        }
        Command::GenConfig => {
            print!("{}", config::stock_config_toml());
        }
    }

    Ok(())
}

fn load_site(
    config_path: &Path,
    overrides: &Overrides,
    bib: &Path,
) -> Result<Site, Box<dyn std::error::Error>> {
    let site_config = config::load_config_with(config_path, overrides)?;
    Ok(Site::load(bib, site_config)?)
}
