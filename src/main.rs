use clap::{Parser, Subcommand, ValueEnum};
use darkroom::contact::{ContactError, ContactService, InquiryEmail, MailTransport};
use darkroom::scan::ScanOptions;
use darkroom::{Gallery, GalleryCollection, GalleryKind, GallerySummary, config, output};
use serde::Serialize;
use std::path::PathBuf;
use std::time::Instant;
use tracing::debug;
use tracing_subscriber::{EnvFilter, fmt};

#[derive(Parser)]
#[command(name = "darkroom")]
#[command(about = "Inspect the gallery data behind a photography portfolio")]
#[command(long_about = "\
Inspect the gallery data behind a photography portfolio

Every folder under public/albums/ or public/events/ is a collection, and every
file in it is a photograph. Nothing is decoded: dimensions are read from image
headers and placeholders are generated from the file path.

Site structure:

  site/
  ├── config.toml                  # Optional, see 'darkroom gen-config'
  └── public/
      ├── albums/
      │   └── weddings/
      │       ├── 001.jpg
      │       ├── 001.json         # EXIF side-car (flat string/number map)
      │       └── 002.webp
      └── events/
          └── car-meet-2024/
              └── hero.png

Log verbosity follows RUST_LOG (default: darkroom=info).")]
#[command(version)]
struct Cli {
    /// Site directory holding config.toml
    #[arg(long, default_value = ".", global = true)]
    root: PathBuf,

    /// Override the public directory (albums/ and events/ live here)
    #[arg(long, global = true)]
    public: Option<PathBuf>,

    /// Print JSON instead of the text listing
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Clone, Copy, ValueEnum)]
enum KindArg {
    Albums,
    Events,
}

impl From<KindArg> for GalleryKind {
    fn from(kind: KindArg) -> Self {
        match kind {
            KindArg::Albums => GalleryKind::Albums,
            KindArg::Events => GalleryKind::Events,
        }
    }
}

#[derive(Subcommand)]
enum Command {
    /// List every collection of one kind
    Summaries { kind: KindArg },
    /// List albums and events together, most recently updated first
    All,
    /// Show one collection with all of its images
    Collection { kind: KindArg, slug: String },
    /// List collection folder names of one kind
    Slugs { kind: KindArg },
    /// Show the most recently updated collections
    Featured {
        /// Number of collections (defaults to [featured] count)
        #[arg(long)]
        count: Option<usize>,
    },
    /// Dry-run a contact form submission and print the composed email
    Contact {
        /// JSON payload as the form would post it
        payload: PathBuf,
        /// Value of the X-Forwarded-For header
        #[arg(long)]
        forwarded_for: Option<String>,
    },
    /// Print a stock config.toml with all options documented
    GenConfig,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    init_logging();

    if let Command::GenConfig = cli.command {
        print!("{}", config::stock_config_toml());
        return Ok(());
    }

    let site_config = config::load_config(&cli.root)?;
    init_thread_pool(&site_config.processing);

    let gallery = match &cli.public {
        Some(public) => {
            let mut options = ScanOptions::from_config(&site_config, &cli.root);
            options.public_root = public.clone();
            Gallery::with_options(options)
        }
        None => Gallery::from_config(&site_config, &cli.root),
    };
    debug!(public_root = %gallery.public_root().display(), "gallery ready");

    match cli.command {
        Command::Summaries { kind } => {
            let kind = GalleryKind::from(kind);
            let collections = gallery.summaries(kind)?;
            if cli.json {
                print_json(&summaries_of(&collections))?;
            } else {
                let heading = match kind {
                    GalleryKind::Albums => "Albums",
                    GalleryKind::Events => "Events",
                };
                output::print_summaries(Some(heading), &collections);
            }
        }
        Command::All => {
            let collections = gallery.all_summaries()?;
            if cli.json {
                print_json(&summaries_of(&collections))?;
            } else {
                output::print_summaries(Some("All"), &collections);
            }
        }
        Command::Collection { kind, slug } => {
            let kind = GalleryKind::from(kind);
            let Some(collection) = gallery.collection(kind, &slug)? else {
                return Err(format!("not found: {kind}/{slug}").into());
            };
            if cli.json {
                print_json(collection.as_ref())?;
            } else {
                output::print_collection(&collection);
            }
        }
        Command::Slugs { kind } => {
            let kind = GalleryKind::from(kind);
            let slugs = gallery.slugs(kind)?;
            if cli.json {
                print_json(slugs.as_ref())?;
            } else {
                output::print_slugs(kind, &slugs);
            }
        }
        Command::Featured { count } => {
            let count = count.unwrap_or(site_config.featured.count);
            let featured = gallery.featured(count)?;
            if cli.json {
                print_json(featured.as_ref())?;
            } else {
                output::print_featured(&featured);
            }
        }
        Command::Contact {
            payload,
            forwarded_for,
        } => {
            let body = std::fs::read_to_string(&payload)?;
            let service = ContactService::new(site_config.contact.clone(), PrintTransport);
            let response = service.handle(forwarded_for.as_deref(), &body, Instant::now());
            if cli.json {
                print_json(&response.body)?;
            } else {
                output::print_contact_response(&response);
            }
        }
        Command::GenConfig => unreachable!("handled before config load"),
    }

    Ok(())
}

/// Prints the composed email instead of sending it.
struct PrintTransport;

impl MailTransport for PrintTransport {
    fn send(&self, email: &InquiryEmail) -> Result<(), ContactError> {
        output::print_email(email);
        println!();
        Ok(())
    }
}

/// Summaries without image lists, for `--json` listings.
fn summaries_of(collections: &[GalleryCollection]) -> Vec<GallerySummary> {
    collections.iter().map(|c| c.to_summary()).collect()
}

fn print_json<T: Serialize + ?Sized>(value: &T) -> Result<(), serde_json::Error> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

/// Install the stderr log subscriber. `RUST_LOG` overrides the default filter.
fn init_logging() {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("darkroom=info"));
    fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

/// Initialize the rayon thread pool based on processing config.
///
/// Caps at the number of available CPU cores; user can constrain down, not up.
fn init_thread_pool(processing: &config::ProcessingConfig) {
    let threads = config::effective_threads(processing);
    rayon::ThreadPoolBuilder::new()
        .num_threads(threads)
        .build_global()
        .ok();
}
