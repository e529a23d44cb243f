use anyhow::{Context, Result};
use clap::Parser;
use mvn_docs::cache::{CachedArtifact, PersistentCache};
use mvn_docs::cli::{Cli, Commands, OutputFormat};
use mvn_docs::config::{cached_jar_path, clear_home, db_path, resolve_home};
use mvn_docs::coordinate::MavenCoordinate;
use mvn_docs::extract::{Extraction, extract_archive, extract_path};
use mvn_docs::fetch::{Fetcher, ProxyConfig};
use mvn_docs::logger::init_logger;
use mvn_docs::record::PairedRecord;
use serde::Serialize;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::time::{Instant, SystemTime, UNIX_EPOCH};
use tracing::{debug, error, info};

fn main() -> ExitCode {
    let cli = parse_cli();
    init_logger(cli.log_level, cli.verbose);

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            error!("{err:#}");
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> Result<()> {
    match cli.command.clone() {
        Commands::Fetch {
            coordinate,
            format,
            output,
            no_cache,
        } => {
            let coordinate = MavenCoordinate::parse(&coordinate)?;
            let start = Instant::now();
            let extraction = fetch_and_extract(&cli, &coordinate, no_cache)?;
            let report = ExtractReport::new(coordinate.to_string(), &extraction, start);
            write_output(&report, format, output.as_deref())?;
        }
        Commands::Scan {
            paths,
            format,
            output,
        } => {
            let start = Instant::now();
            let mut extraction = Extraction::default();
            for path in &paths {
                extraction.merge(extract_path(path)?);
            }
            let source = paths
                .iter()
                .map(|p| p.display().to_string())
                .collect::<Vec<_>>()
                .join(" ");
            let report = ExtractReport::new(source, &extraction, start);
            write_output(&report, format, output.as_deref())?;
        }
        Commands::Stats => {
            let home = resolve_home(&cli)?;
            let cache = PersistentCache::open(db_path(&home))?;
            let stats = cache.stats()?;
            println!("{}", serde_json::to_string_pretty(&stats)?);
        }
        Commands::Clear => {
            let home = resolve_home(&cli)?;
            clear_home(&home)?;
            info!(home = %home.display(), "cache cleared");
        }
    }

    Ok(())
}

fn parse_cli() -> Cli {
    let args: Vec<String> = std::env::args().collect();
    Cli::parse_from(rewrite_args_for_implicit_fetch(args))
}

fn rewrite_args_for_implicit_fetch(mut args: Vec<String>) -> Vec<String> {
    if args.len() <= 1 {
        return args;
    }

    let subcommands = ["fetch", "scan", "stats", "clear", "help"];
    let valued = ["-r", "--repo", "--home", "--http-proxy", "--https-proxy", "-l", "--log-level"];

    let mut idx = 1usize;
    while idx < args.len() {
        let a = args[idx].as_str();
        if a == "--" {
            idx += 1;
            break;
        }

        if valued.contains(&a) {
            idx += 2;
            continue;
        }

        if a.starts_with('-') {
            idx += 1;
            continue;
        }

        break;
    }

    if idx < args.len() {
        let token = args[idx].as_str();
        if !subcommands.contains(&token) {
            args.insert(idx, "fetch".to_string());
        }
    }

    args
}

fn fetch_and_extract(cli: &Cli, coordinate: &MavenCoordinate, no_cache: bool) -> Result<Extraction> {
    let proxy = ProxyConfig::from_args_and_env(cli.http_proxy.clone(), cli.https_proxy.clone());
    let fetcher = Fetcher::new(&cli.repo, &proxy)?;
    debug!(repo = fetcher.repo(), %coordinate, "fetching");

    let resolved_version = fetcher.resolve_version(coordinate)?;
    let url = fetcher.sources_jar_url(coordinate, &resolved_version);

    if no_cache {
        let tmp = temp_jar_path(coordinate, &resolved_version);
        let result = fetcher
            .download(&url, &tmp)
            .and_then(|download| extract_archive(&download.path));
        let _ = std::fs::remove_file(&tmp);
        debug!(path = %tmp.display(), "removed temporary jar");
        return result;
    }

    let home = resolve_home(cli)?;
    let cache = PersistentCache::open(db_path(&home))?;
    let key = coordinate.with_version(&resolved_version).to_string();

    let jar_path = match cache.get_artifact(&key)? {
        Some(hit) => {
            info!(%key, path = %hit.jar_path.display(), "using cached sources jar");
            hit.jar_path
        }
        None => {
            let dest = cached_jar_path(&home, coordinate, &resolved_version);
            let download = fetcher.download(&url, &dest)?;
            cache.put_artifact(
                &key,
                &CachedArtifact {
                    coordinate: key.clone(),
                    url: download.url,
                    jar_path: download.path.clone(),
                    sha256: download.sha256,
                    size: download.size,
                    fetched_at: unix_now(),
                },
            )?;
            download.path
        }
    };

    extract_archive(&jar_path)
}

fn temp_jar_path(coordinate: &MavenCoordinate, resolved_version: &str) -> PathBuf {
    std::env::temp_dir().join(format!(
        "mvn-docs-{}-{}-{}-sources.jar",
        std::process::id(),
        coordinate.artifact_id,
        resolved_version
    ))
}

fn unix_now() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or(0)
}

#[derive(Debug, Serialize)]
struct ExtractReport<'a> {
    source: String,
    units_scanned: usize,
    duration_ms: u64,
    records: &'a [PairedRecord],
}

impl<'a> ExtractReport<'a> {
    fn new(source: String, extraction: &'a Extraction, start: Instant) -> Self {
        info!(
            %source,
            units = extraction.units,
            records = extraction.records.len(),
            "extraction finished"
        );
        Self {
            source,
            units_scanned: extraction.units,
            duration_ms: start.elapsed().as_millis() as u64,
            records: &extraction.records,
        }
    }
}

fn render_text(records: &[PairedRecord]) -> String {
    records
        .iter()
        .map(|r| format!("{r}\n"))
        .collect::<Vec<_>>()
        .join("\n")
}

fn write_output(report: &ExtractReport<'_>, format: OutputFormat, output: Option<&Path>) -> Result<()> {
    let content = match format {
        OutputFormat::Json => serde_json::to_string_pretty(report)?,
        OutputFormat::Text => render_text(report.records),
    };

    if let Some(path) = output {
        if let Some(parent) = path.parent()
            && !parent.as_os_str().is_empty()
        {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create directory: {}", parent.display()))?;
        }
        std::fs::write(path, content)
            .with_context(|| format!("Failed to write output: {}", path.display()))?;
    } else {
        print!("{content}");
        if !content.is_empty() && !content.ends_with('\n') {
            println!();
        }
    }

    Ok(())
}
