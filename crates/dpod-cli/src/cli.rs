//! Argument parsing, logging setup and dispatch for the `dpod` binary.

use std::path::PathBuf;
use std::time::Duration;

use clap::{Parser, ValueEnum};
use dpod_config::defaults::{
    DEFAULT_REMOTE, GITHUB_API_URL, HEROKU_API_URL, MAX_POLL_ATTEMPTS, POLL_INTERVAL,
};
use dpod_config::{ConfigSources, PollPolicy, parse_api_url};
use dpod_telemetry::{LogFormat, LoggingConfig, build_sha, init_logging};
use tracing::{Instrument, info_span};
use url::Url;
use uuid::Uuid;

use crate::client::{CliDependencies, CliResult};
use crate::commands::deploy::handle_deploy;

const DEFAULT_TIMEOUT_SECS: u64 = 60;

/// Parses CLI arguments, runs the deployment, and reports errors on stderr.
/// Returns the process exit code.
pub async fn run() -> i32 {
    let cli = Cli::parse();

    let logging = LoggingConfig {
        format: cli.log_format.map_or_else(LogFormat::infer, LogFormat::from),
        ..LoggingConfig::default()
    };
    if let Err(err) = init_logging(&logging) {
        eprintln!("warning: {err:#}");
    }

    let trace_id = Uuid::new_v4().to_string();
    let span = info_span!("dpod", trace_id = %trace_id, build_sha = %build_sha());

    match dispatch(cli, &trace_id).instrument(span).await {
        Ok(()) => 0,
        Err(err) => {
            eprintln!("error: {}", err.display_message());
            err.exit_code()
        }
    }
}

async fn dispatch(cli: Cli, trace_id: &str) -> CliResult<()> {
    let deps = CliDependencies::new(cli.timeout, trace_id)?;
    handle_deploy(&deps, &cli.config_sources()).await
}

#[derive(Parser, Debug)]
#[command(
    name = "dpod",
    version,
    about = "Deploy the current branch of a private GitHub repository to Heroku"
)]
pub(crate) struct Cli {
    #[arg(long, env = "GITHUB_API_TOKEN", hide_env_values = true)]
    github_token: Option<String>,
    #[arg(long, env = "DPOD_REPO_PATH", default_value = ".")]
    repo_path: PathBuf,
    #[arg(long, env = "DPOD_REMOTE", default_value = DEFAULT_REMOTE)]
    remote: String,
    #[arg(long, env = "DPOD_BRANCH")]
    branch: Option<String>,
    #[arg(long, env = "NETRC")]
    netrc: Option<PathBuf>,
    #[arg(
        long,
        env = "DPOD_GITHUB_API_URL",
        value_parser = parse_github_url,
        default_value = GITHUB_API_URL
    )]
    github_api_url: Url,
    #[arg(
        long,
        env = "DPOD_HEROKU_API_URL",
        value_parser = parse_heroku_url,
        default_value = HEROKU_API_URL
    )]
    heroku_api_url: Url,
    #[arg(
        long,
        env = "DPOD_POLL_INTERVAL_SECS",
        value_parser = clap::value_parser!(u64).range(1..),
        default_value_t = POLL_INTERVAL.as_secs()
    )]
    poll_interval_secs: u64,
    #[arg(
        long,
        env = "DPOD_MAX_POLL_ATTEMPTS",
        value_parser = clap::value_parser!(u32).range(1..),
        default_value_t = MAX_POLL_ATTEMPTS
    )]
    max_poll_attempts: u32,
    #[arg(
        long,
        env = "DPOD_HTTP_TIMEOUT_SECS",
        default_value_t = DEFAULT_TIMEOUT_SECS
    )]
    timeout: u64,
    #[arg(
        long,
        env = "DPOD_LOG_FORMAT",
        value_enum,
        help = "Log output format; defaults to pretty in debug builds and json otherwise"
    )]
    log_format: Option<LogFormatArg>,
}

impl Cli {
    fn config_sources(&self) -> ConfigSources {
        ConfigSources {
            github_token: self.github_token.clone(),
            repo_path: self.repo_path.clone(),
            remote: self.remote.clone(),
            branch: self.branch.clone(),
            netrc_path: self.netrc.clone(),
            github_api_url: self.github_api_url.clone(),
            heroku_api_url: self.heroku_api_url.clone(),
            poll: PollPolicy {
                interval: Duration::from_secs(self.poll_interval_secs),
                max_attempts: self.max_poll_attempts,
            },
        }
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
enum LogFormatArg {
    Json,
    Pretty,
}

impl From<LogFormatArg> for LogFormat {
    fn from(value: LogFormatArg) -> Self {
        match value {
            LogFormatArg::Json => Self::Json,
            LogFormatArg::Pretty => Self::Pretty,
        }
    }
}

fn parse_github_url(input: &str) -> Result<Url, String> {
    parse_api_url("--github-api-url", input).map_err(|err| err.to_string())
}

fn parse_heroku_url(input: &str) -> Result<Url, String> {
    parse_api_url("--heroku-api-url", input).map_err(|err| err.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> Cli {
        let mut argv = vec!["dpod"];
        argv.extend_from_slice(args);
        Cli::try_parse_from(argv).expect("valid arguments")
    }

    #[test]
    fn flags_map_onto_config_sources() {
        let cli = parse(&[
            "--github-token",
            "T",
            "--repo-path",
            "/work/myapp",
            "--remote",
            "upstream",
            "--branch",
            "release",
            "--netrc",
            "/tmp/netrc",
            "--github-api-url",
            "https://ghe.example.com/api/v3/",
            "--heroku-api-url",
            "https://api.heroku.test",
            "--poll-interval-secs",
            "2",
            "--max-poll-attempts",
            "10",
        ]);
        let sources = cli.config_sources();

        assert_eq!(sources.github_token.as_deref(), Some("T"));
        assert_eq!(sources.repo_path, PathBuf::from("/work/myapp"));
        assert_eq!(sources.remote, "upstream");
        assert_eq!(sources.branch.as_deref(), Some("release"));
        assert_eq!(sources.netrc_path, Some(PathBuf::from("/tmp/netrc")));
        assert_eq!(
            sources.github_api_url.as_str(),
            "https://ghe.example.com/api/v3/"
        );
        assert_eq!(sources.heroku_api_url.as_str(), "https://api.heroku.test/");
        assert_eq!(
            sources.poll,
            PollPolicy {
                interval: Duration::from_secs(2),
                max_attempts: 10,
            }
        );
    }

    #[test]
    fn relative_api_url_is_rejected() {
        let result = Cli::try_parse_from(["dpod", "--heroku-api-url", "api.heroku.com"]);
        assert!(result.is_err());
    }

    #[test]
    fn zero_poll_attempts_is_rejected() {
        let result = Cli::try_parse_from(["dpod", "--max-poll-attempts", "0"]);
        assert!(result.is_err());
    }

    #[test]
    fn zero_poll_interval_is_rejected() {
        let result = Cli::try_parse_from(["dpod", "--poll-interval-secs", "0"]);
        assert!(result.is_err());
    }

    #[test]
    fn log_format_flag_maps_to_telemetry_format() {
        let cli = parse(&["--log-format", "json"]);
        assert_eq!(cli.log_format.map(LogFormat::from), Some(LogFormat::Json));
    }
}
