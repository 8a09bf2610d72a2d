//! mvnfetch CLI - download artifacts from Maven-style repositories.
//!
//! Resolves the given coordinates (and, by default, their transitive
//! dependencies) into a local directory tree and prints one line per
//! downloaded artifact. Exits non-zero if any artifact failed.

use std::path::PathBuf;
use std::process;

use clap::Parser;
use tracing_subscriber::EnvFilter;
use url::Url;

use mvnfetch::artifact::{Coordinate, Dependency};
use mvnfetch::resolver::{DownloadResult, Resolver};

#[derive(Parser)]
#[command(name = "mvnfetch")]
#[command(
    about = "Download artifacts and their dependencies from Maven-style repositories",
    long_about = None
)]
struct Args {
    /// Artifact coordinates as group:artifact:version[:classifier]
    #[arg(required = true)]
    coordinates: Vec<String>,

    /// Repository base URL (repeatable, tried in order)
    #[arg(long = "repo", default_value = "https://repo.maven.apache.org/maven2")]
    repositories: Vec<Url>,

    /// Directory artifacts are installed into
    #[arg(long, default_value = "libs")]
    dir: PathBuf,

    /// Maximum number of concurrent downloads
    #[arg(long, default_value_t = 8)]
    workers: usize,

    /// Only download the named artifacts, not their dependencies
    #[arg(long)]
    intransitive: bool,
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let args = Args::parse();

    let mut roots = Vec::with_capacity(args.coordinates.len());
    for raw in &args.coordinates {
        match parse_coordinate(raw) {
            Ok(coordinate) => {
                roots.push(Dependency::new(coordinate).transitive(!args.intransitive));
            }
            Err(reason) => {
                eprintln!("Error: invalid coordinate '{}': {}", raw, reason);
                process::exit(2);
            }
        }
    }

    let resolver = match Resolver::new(args.repositories.clone(), &args.dir) {
        Ok(resolver) => resolver.with_workers(args.workers),
        Err(e) => {
            eprintln!("Error creating HTTP client: {}", e);
            process::exit(1);
        }
    };

    let results = resolver.resolve(roots).await;

    let mut failed = false;
    for result in &results {
        print_tree(result, 0);
        if !result.is_success() || !result.failures().is_empty() {
            failed = true;
        }
    }

    if failed {
        process::exit(1);
    }
}

/// Parse a `group:artifact:version[:classifier]` coordinate.
fn parse_coordinate(raw: &str) -> Result<Coordinate, String> {
    let parts: Vec<&str> = raw.split(':').collect();
    let coordinate = match parts.as_slice() {
        [group, artifact, version] => Coordinate::new(*group, *artifact, *version),
        [group, artifact, version, classifier] => Coordinate::new(*group, *artifact, *version)
            .map(|coordinate| coordinate.with_classifier(*classifier)),
        _ => return Err("expected group:artifact:version[:classifier]".to_string()),
    };
    coordinate.map_err(|e| e.to_string())
}

/// Print a result and its transitive results, indented by depth.
fn print_tree(result: &DownloadResult, depth: usize) {
    let indent = "  ".repeat(depth);
    match result.error() {
        None => println!(
            "{indent}{} -> {}",
            result.dependency(),
            result.artifact_path().display()
        ),
        Some(error) => println!("{indent}{} FAILED: {}", result.dependency(), error),
    }
    for child in result.transitive() {
        print_tree(child, depth + 1);
    }
}
