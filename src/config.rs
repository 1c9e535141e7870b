//! コマンドライン引数と夕食会の設定

use std::time::Duration;

use clap::Parser;

use crate::error::ConfigError;

pub const MIN_PHILOSOPHERS: usize = 2;

/// Dining philosophers with a fair talking privilege
#[derive(Parser, Debug, Clone)]
#[command(name = "dining_monitor", version)]
pub struct DinnerArgs {
    /// Number of philosophers (and chopsticks) at the table
    #[arg(short = 'n', long, default_value_t = 4, value_name = "NUM")]
    pub philosophers: usize,

    /// How many times each philosopher eats
    #[arg(short = 's', long, default_value_t = 10, value_name = "NUM")]
    pub steps: usize,

    /// Upper bound of a single eat/think/talk period
    #[arg(long, default_value_t = 1000, value_name = "MILLIS")]
    pub max_delay_ms: u64,

    /// Chance that a philosopher wants to talk after thinking
    #[arg(long, default_value_t = 0.5, value_name = "P")]
    pub talk_probability: f64,

    /// Seed for reproducible delays and decisions
    #[arg(long, value_name = "SEED")]
    pub seed: Option<u64>,

    /// Show monitor hand-offs
    #[arg(short = 'v', long, conflicts_with = "quiet")]
    pub verbose: bool,

    /// Only show warnings and errors
    #[arg(short = 'q', long)]
    pub quiet: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct DinnerConfig {
    pub philosophers: usize,
    pub steps: usize,
    pub max_delay: Duration,
    pub talk_probability: f64,
    pub seed: Option<u64>,
}

impl DinnerConfig {
    pub fn new(philosophers: usize) -> Self {
        DinnerConfig {
            philosophers,
            steps: 10,
            max_delay: Duration::from_millis(1000),
            talk_probability: 0.5,
            seed: None,
        }
    }

    pub fn from_args(args: &DinnerArgs) -> Result<Self, ConfigError> {
        DinnerConfig {
            philosophers: args.philosophers,
            steps: args.steps,
            max_delay: Duration::from_millis(args.max_delay_ms),
            talk_probability: args.talk_probability,
            seed: args.seed,
        }
        .validate()
    }

    pub fn with_steps(mut self, steps: usize) -> Self {
        self.steps = steps;
        self
    }

    pub fn with_max_delay(mut self, max_delay: Duration) -> Self {
        self.max_delay = max_delay;
        self
    }

    pub fn with_talk_probability(mut self, p: f64) -> Self {
        self.talk_probability = p;
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    pub fn validate(self) -> Result<Self, ConfigError> {
        // 1 人だと左右の箸が同じになり、自分自身を待ち続ける
        if self.philosophers < MIN_PHILOSOPHERS {
            return Err(ConfigError::TooFewPhilosophers {
                count: self.philosophers,
                min: MIN_PHILOSOPHERS,
            });
        }
        if self.steps == 0 {
            return Err(ConfigError::ZeroSteps);
        }
        if !(0.0..=1.0).contains(&self.talk_probability) {
            return Err(ConfigError::InvalidTalkProbability {
                value: self.talk_probability,
            });
        }
        Ok(self)
    }
}

#[cfg(test)]
mod test {
    use super::*;

    fn parse(args: &[&str]) -> Result<DinnerConfig, ConfigError> {
        let argv = std::iter::once("dining_monitor").chain(args.iter().copied());
        let args = DinnerArgs::try_parse_from(argv).unwrap();
        DinnerConfig::from_args(&args)
    }

    #[test]
    fn test_defaults() {
        let config = parse(&[]).unwrap();
        assert_eq!(config, DinnerConfig::new(4));
    }

    #[test]
    fn test_overrides() {
        let config =
            parse(&["-n", "7", "-s", "2", "--max-delay-ms", "5", "--seed", "42"]).unwrap();
        assert_eq!(config.philosophers, 7);
        assert_eq!(config.steps, 2);
        assert_eq!(config.max_delay, Duration::from_millis(5));
        assert_eq!(config.seed, Some(42));
    }

    #[test]
    fn test_too_few() {
        assert_eq!(
            parse(&["-n", "1"]),
            Err(ConfigError::TooFewPhilosophers { count: 1, min: 2 })
        );
    }

    #[test]
    fn test_bad_probability() {
        assert!(matches!(
            parse(&["--talk-probability", "1.5"]),
            Err(ConfigError::InvalidTalkProbability { .. })
        ));
        assert!(parse(&["--talk-probability", "NaN"]).is_err());
    }

    #[test]
    fn test_zero_steps() {
        assert_eq!(parse(&["-s", "0"]), Err(ConfigError::ZeroSteps));
    }

    #[test]
    fn test_not_a_number() {
        assert!(DinnerArgs::try_parse_from(["dining_monitor", "-n", "-7.a"]).is_err());
    }
}
