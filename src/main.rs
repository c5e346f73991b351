use clap::{Parser, Subcommand};
use folio_pages::content::{JsonContentStore, parse_date};
use folio_pages::materialize::{JsonDirSink, MemorySink};
use folio_pages::pipeline::Build;
use folio_pages::types::BuildTimestamp;
use folio_pages::{config, output};
use std::path::PathBuf;

fn version_string() -> &'static str {
    let on_tag = env!("ON_RELEASE_TAG");
    if on_tag == "true" {
        env!("CARGO_PKG_VERSION")
    } else {
        let hash = env!("GIT_HASH");
        if hash.is_empty() {
            "dev@unknown"
        } else {
            Box::leak(format!("dev@{hash}").into_boxed_str())
        }
    }
}

#[derive(Parser)]
#[command(name = "folio-pages")]
#[command(about = "Materialize the page set of an article site")]
#[command(long_about = "\
Materialize the page set of an article site

Reads a snapshot of content entries and emits one JSON page description per
URL: entry pages, the home/posts listing, and paginated category and author
collections. A renderer turns each page.json into HTML.

Content snapshot (a file, or a directory of *.json files):

  [
    {
      \"id\": \"a1\",
      \"slug\": \"/hello-world\",
      \"title\": \"Hello, world\",
      \"date\": \"2024-05-01T09:00:00Z\",
      \"draft\": false,
      \"private\": false,
      \"link\": null,
      \"category\": { \"id\": \"c1\", \"name\": \"Travel\", \"slug\": \"travel\" },
      \"tags\": [{ \"id\": \"t1\" }],
      \"author\": { \"id\": \"u1\", \"name\": \"Ann\", \"slug\": \"ann\" },
      \"featured\": true
    }
  ]

Output layout:

  dist/
  ├── pages.json                   # Every page, in emission order
  ├── page.json                    # /
  ├── hello-world/page.json        # /hello-world
  └── category/travel/page.json    # /category/travel

Run 'folio-pages gen-config' to generate a documented config.toml.")]
#[command(version = version_string())]
struct Cli {
    /// Content snapshot file or directory
    #[arg(long, default_value = "content", global = true)]
    content: PathBuf,

    /// Site config file (stock defaults when missing)
    #[arg(long, default_value = "config.toml", global = true)]
    config: PathBuf,

    /// Output directory
    #[arg(long, default_value = "dist", global = true)]
    output: PathBuf,

    /// Build timestamp (RFC 3339 or YYYY-MM-DD); defaults to the current time
    #[arg(long, env = "FOLIO_BUILD_TIMESTAMP", global = true)]
    now: Option<String>,

    /// Verbosity level (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Fetch content and write every page to the output directory
    Build,
    /// Plan the page set and report it without writing anything
    Check,
    /// Print a stock config.toml with all options documented
    GenConfig,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match cli.command {
        Command::Build => {
            let site_config = config::load_config(&cli.config)?;
            init_thread_pool(&site_config.processing);
            let now = build_timestamp(cli.now.as_deref())?;
            let store = JsonContentStore::new(&cli.content);

            println!("==> Building {} → {}", cli.content.display(), cli.output.display());
            let mut sink = JsonDirSink::new(&cli.output);
            let summary = Build::new(&store, &site_config, now).run(&mut sink)?;
            output::print_build_output(&summary);
            println!("==> Build complete: {}", cli.output.display());
        }
        Command::Check => {
            let site_config = config::load_config(&cli.config)?;
            init_thread_pool(&site_config.processing);
            let now = build_timestamp(cli.now.as_deref())?;
            let store = JsonContentStore::new(&cli.content);

            println!("==> Checking {}", cli.content.display());
            let mut sink = MemorySink::new();
            let summary = Build::new(&store, &site_config, now).run(&mut sink)?;
            output::print_plan(&summary.plan);
            println!("==> {} pages, no collisions", summary.created);
        }
        Command::GenConfig => {
            print!("{}", config::stock_config_toml());
        }
    }

    Ok(())
}

/// Resolve the build timestamp once; every page of the build shares it.
fn build_timestamp(raw: Option<&str>) -> Result<BuildTimestamp, String> {
    match raw {
        Some(raw) => parse_date(raw)
            .map(BuildTimestamp::new)
            .ok_or_else(|| format!("invalid build timestamp {raw:?}")),
        None => Ok(BuildTimestamp::now()),
    }
}

/// Log to stderr so page listings on stdout stay clean.
fn init_tracing(verbose: u8) {
    use tracing_subscriber::{EnvFilter, fmt};

    let filter = match verbose {
        0 => "folio_pages=warn",
        1 => "folio_pages=info",
        2 => "folio_pages=debug",
        _ => "folio_pages=trace",
    };
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter));

    fmt()
        .with_env_filter(env_filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

/// Initialize the rayon thread pool based on processing config.
///
/// Capped at the number of available cores.
fn init_thread_pool(processing: &config::ProcessingConfig) {
    let threads = config::effective_threads(processing);
    rayon::ThreadPoolBuilder::new()
        .num_threads(threads)
        .build_global()
        .ok();
}
