use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

use crate::config::DEFAULT_REPOSITORY;

#[derive(Debug, Clone, Parser)]
#[command(name = "mvn-docs", arg_required_else_help = true)]
#[command(
    about = "Download Maven sources JARs and extract doc-comment/declaration pairs for LLM processing"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Maven repository base URL
    #[arg(short = 'r', long, global = true, value_name = "URL", default_value = DEFAULT_REPOSITORY)]
    pub repo: String,

    /// Cache directory for downloaded JARs and the index
    #[arg(long, global = true, value_name = "DIR")]
    pub home: Option<PathBuf>,

    /// HTTP proxy URL (overrides HTTP_PROXY)
    #[arg(long, global = true, value_name = "URL")]
    pub http_proxy: Option<String>,

    /// HTTPS proxy URL (overrides HTTPS_PROXY)
    #[arg(long, global = true, value_name = "URL")]
    pub https_proxy: Option<String>,

    /// Debug logging, shorthand for `--log-level debug`
    #[arg(short = 'v', long, global = true)]
    pub verbose: bool,

    #[arg(short = 'l', long, global = true, value_enum, value_name = "LEVEL", ignore_case = true)]
    pub log_level: Option<LogLevel>,
}

#[derive(Debug, Clone, Subcommand)]
pub enum Commands {
    /// Download the sources JAR of groupId:artifactId:version and extract its docs
    Fetch {
        coordinate: String,

        #[arg(short = 'f', long, value_enum, default_value_t = OutputFormat::Text)]
        format: OutputFormat,

        #[arg(short = 'o', long, value_name = "FILE")]
        output: Option<PathBuf>,

        /// Download to a temporary file and leave the cache untouched
        #[arg(long)]
        no_cache: bool,
    },
    /// Extract docs from local .java files, .jar/.zip archives or directories
    Scan {
        #[arg(required = true, value_name = "PATH")]
        paths: Vec<PathBuf>,

        #[arg(short = 'f', long, value_enum, default_value_t = OutputFormat::Text)]
        format: OutputFormat,

        #[arg(short = 'o', long, value_name = "FILE")]
        output: Option<PathBuf>,
    },
    Stats,
    Clear,
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Text,
    Json,
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, ValueEnum)]
pub enum LogLevel {
    Off,
    #[value(alias = "severe")]
    Error,
    #[value(alias = "warning")]
    Warn,
    Info,
    #[value(alias = "fine")]
    Debug,
    #[value(aliases = ["finer", "finest", "all"])]
    Trace,
}

impl LogLevel {
    pub fn as_filter(self) -> &'static str {
        match self {
            LogLevel::Off => "off",
            LogLevel::Error => "error",
            LogLevel::Warn => "warn",
            LogLevel::Info => "info",
            LogLevel::Debug => "debug",
            LogLevel::Trace => "trace",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_global_options_and_fetch() {
        let cli = Cli::parse_from([
            "mvn-docs",
            "--repo",
            "http://localhost:1/repo",
            "-l",
            "fine",
            "fetch",
            "tech.kwik:kwik:0.9.1",
            "-f",
            "json",
        ]);
        assert_eq!(cli.repo, "http://localhost:1/repo");
        assert_eq!(cli.log_level, Some(LogLevel::Debug));
        match cli.command {
            Commands::Fetch {
                coordinate,
                format,
                no_cache,
                ..
            } => {
                assert_eq!(coordinate, "tech.kwik:kwik:0.9.1");
                assert_eq!(format, OutputFormat::Json);
                assert!(!no_cache);
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn java_style_level_names_are_accepted() {
        for (name, level) in [
            ("SEVERE", LogLevel::Error),
            ("warning", LogLevel::Warn),
            ("FINEST", LogLevel::Trace),
            ("off", LogLevel::Off),
        ] {
            let cli = Cli::try_parse_from(["mvn-docs", "-l", name, "stats"]).unwrap();
            assert_eq!(cli.log_level, Some(level), "level {name}");
        }
    }

    #[test]
    fn global_options_may_follow_the_subcommand() {
        let cli = Cli::parse_from(["mvn-docs", "scan", "src", "-v", "--home", "/tmp/h"]);
        assert!(cli.verbose);
        assert_eq!(cli.home, Some(PathBuf::from("/tmp/h")));
    }

    #[test]
    fn short_repo_flag_sets_repository() {
        let cli = Cli::try_parse_from(["mvn-docs", "-r", "http://x/repo", "fetch", "a:b:1"]).unwrap();
        assert_eq!(cli.repo, "http://x/repo");
        assert!(matches!(cli.command, Commands::Fetch { ref coordinate, .. } if coordinate == "a:b:1"));
    }

    #[test]
    fn default_repository_is_central() {
        let cli = Cli::parse_from(["mvn-docs", "stats"]);
        assert_eq!(cli.repo, DEFAULT_REPOSITORY);
        assert!(!cli.verbose);
    }
}
