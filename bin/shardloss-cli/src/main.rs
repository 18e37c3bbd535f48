//! ShardLoss CLI - data-loss simulator
//!
//! Places shards on servers with the selected strategy and prints the
//! share of server pairs whose simultaneous loss destroys a shard.

mod settings;

use anyhow::{Context, Result};
use clap::{ArgGroup, Parser};
use shardloss_analysis::run_trials;
use shardloss_common::{Error, Settings};
use shardloss_placement::Strategy;
use std::path::PathBuf;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser, Debug)]
#[command(name = "shardloss")]
#[command(about = "Estimate data loss from simultaneous server failures")]
#[command(version)]
#[command(group(ArgGroup::new("mode").required(true).args(["random", "mirror"])))]
struct Args {
    /// Amount of virtual servers
    #[arg(short = 'n', default_value_t = 10)]
    servers: u32,

    /// Random mode of data replication
    #[arg(long)]
    random: bool,

    /// Mirror mode of data replication
    #[arg(long)]
    mirror: bool,

    /// With --random, keep the two replicas of a shard on servers of different parity
    #[arg(long, conflicts_with = "mirror")]
    pairs: bool,

    /// Seed for the random generator (drawn from the OS when omitted)
    #[arg(long)]
    seed: Option<u64>,

    /// Number of independent simulations to average
    #[arg(long, default_value_t = 1)]
    trials: u32,

    /// Retry budget for random placement (overrides settings)
    #[arg(long)]
    max_attempts: Option<u32>,

    /// Settings file (TOML)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Log level
    #[arg(long, default_value = "warn")]
    log_level: String,
}

impl Args {
    fn strategy(&self) -> Strategy {
        match (self.mirror, self.pairs) {
            (true, _) => Strategy::Mirror,
            (false, true) => Strategy::PairedRandom,
            (false, false) => Strategy::Random,
        }
    }
}

fn report_line(lost_servers: u32, percent: u32) -> String {
    format!("Killing {lost_servers} arbitrary servers results in data loss in {percent}% cases")
}

/// Run the simulation described by `args` and return the report line
fn run(args: &Args, mut settings: Settings) -> Result<String> {
    if let Some(max_attempts) = args.max_attempts {
        settings.max_attempts = max_attempts;
    }

    let config = settings
        .config(args.servers)
        .context("invalid simulation parameters")?;
    // Every random mode, paired or not, shares shards evenly among servers
    if args.random && !config.shards_divide_evenly() {
        return Err(Error::invalid_configuration(format!(
            "{} shards cannot be shared evenly among {} servers",
            config.shard_count(),
            config.server_count()
        )))
        .context("invalid simulation parameters");
    }

    let strategy = args.strategy();
    let placement = strategy.build(settings.max_attempts);
    placement
        .validate(&config)
        .with_context(|| format!("invalid parameters for {strategy} placement"))?;

    let seed = args.seed.unwrap_or_else(rand::random);
    info!(
        %strategy,
        seed,
        servers = config.server_count(),
        shards = config.shard_count(),
        replicas = config.replication_factor(),
        capacity = config.capacity(),
        trials = args.trials,
        "starting simulation"
    );

    let summary = run_trials(placement.as_ref(), &config, seed, args.trials)
        .with_context(|| format!("{strategy} simulation failed"))?;
    info!(
        mean = summary.mean_percent,
        min = summary.min_percent,
        max = summary.max_percent,
        attempts = summary.total_attempts,
        "simulation finished"
    );

    Ok(report_line(
        settings.lost_servers_count,
        summary.mean_percent,
    ))
}

fn main() -> Result<()> {
    let args = Args::parse();

    // Logs go to stderr; stdout carries only the result line
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| args.log_level.clone().into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let settings =
        settings::load(args.config.as_deref()).context("failed to load simulation settings")?;
    println!("{}", run(&args, settings)?);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;
    use clap::error::ErrorKind;

    fn parse(argv: &[&str]) -> std::result::Result<Args, clap::Error> {
        Args::try_parse_from(std::iter::once("shardloss").chain(argv.iter().copied()))
    }

    #[test]
    fn test_command_is_well_formed() {
        Args::command().debug_assert();
    }

    #[test]
    fn test_defaults() {
        let args = parse(&["--mirror"]).unwrap();
        assert_eq!(args.servers, 10);
        assert_eq!(args.trials, 1);
        assert!(args.seed.is_none());
        assert_eq!(args.strategy(), Strategy::Mirror);
    }

    #[test]
    fn test_mode_selection() {
        assert_eq!(parse(&["--random"]).unwrap().strategy(), Strategy::Random);
        assert_eq!(
            parse(&["--random", "--pairs", "-n", "20"]).unwrap().strategy(),
            Strategy::PairedRandom
        );
        assert_eq!(parse(&["-n", "4", "--mirror"]).unwrap().servers, 4);
    }

    #[test]
    fn test_mode_is_required() {
        let err = parse(&["-n", "10"]).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::MissingRequiredArgument);
    }

    #[test]
    fn test_modes_conflict() {
        let err = parse(&["--random", "--mirror"]).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::ArgumentConflict);
    }

    #[test]
    fn test_pairs_only_with_random() {
        let err = parse(&["--mirror", "--pairs"]).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::ArgumentConflict);

        let err = parse(&["--pairs"]).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::MissingRequiredArgument);
    }

    #[test]
    fn test_negative_server_count_rejected() {
        assert!(parse(&["--mirror", "-n", "-4"]).is_err());
    }

    #[test]
    fn test_report_line() {
        assert_eq!(
            report_line(2, 33),
            "Killing 2 arbitrary servers results in data loss in 33% cases"
        );
    }

    fn run_with(argv: &[&str], env: &[(&str, &str)]) -> Result<String> {
        let env = env
            .iter()
            .map(|(key, value)| ((*key).to_string(), (*value).to_string()))
            .collect();
        let settings = settings::load_from(None, Some(env)).unwrap();
        run(&parse(argv).unwrap(), settings)
    }

    fn assert_rejected(argv: &[&str]) {
        let err = run_with(argv, &[]).unwrap_err();
        assert!(
            matches!(
                err.downcast_ref::<Error>(),
                Some(Error::InvalidConfiguration(_))
            ),
            "expected invalid configuration for {argv:?}, got {err:#}"
        );
    }

    #[test]
    fn test_run_rejects_odd_server_count() {
        assert_rejected(&["-n", "7", "--mirror"]);
    }

    #[test]
    fn test_run_rejects_uneven_random_split() {
        // capacity 200 / 8 = 25 is integral, but 100 shards do not split over 8 servers
        assert_rejected(&["-n", "8", "--random", "--seed", "1"]);
        assert_rejected(&["-n", "8", "--random", "--pairs", "--seed", "1"]);
    }

    #[test]
    fn test_run_rejects_too_many_servers() {
        assert_rejected(&["-n", "100", "--mirror"]);
    }

    #[test]
    fn test_run_mirror_four_servers() {
        // two mirror pairs out of six server pairs
        let line = run_with(&["-n", "4", "--mirror"], &[("SHARDLOSS_SHARD_COUNT", "8")]).unwrap();
        assert_eq!(
            line,
            "Killing 2 arbitrary servers results in data loss in 33% cases"
        );
    }

    #[test]
    fn test_run_default_mirror() {
        let line = run_with(&["--mirror"], &[]).unwrap();
        assert_eq!(line, report_line(2, 11));
    }

    #[test]
    fn test_run_paired_random_is_reproducible() {
        let argv = ["-n", "10", "--random", "--pairs", "--seed", "7", "--trials", "3"];
        let first = run_with(&argv, &[]).unwrap();
        assert_eq!(first, run_with(&argv, &[]).unwrap());
    }

    #[test]
    fn test_run_reports_lost_servers_setting() {
        let line = run_with(&["--mirror"], &[("SHARDLOSS_LOST_SERVERS_COUNT", "3")]).unwrap();
        assert_eq!(line, report_line(3, 11));
    }
}
