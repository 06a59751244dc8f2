//! Host configuration: defaults, then `SPLITRIS_*` environment variables, then
//! command-line arguments.

use std::path::PathBuf;

use anyhow::{anyhow, Result};

use crate::types::MAX_PLAYERS;

pub const DEFAULT_HIGH_SCORE_PATH: &str = "high_score.json";
pub const DEFAULT_LOG_PATH: &str = "splitris.log";

pub const USAGE: &str = "usage: splitris [--players N] [--seed N] [--schemes PATH] \
[--high-score PATH] [--log PATH|off] [--mute]";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// Player count preselected in the menu (1..=4).
    pub players: usize,
    /// Fixed rng seed; `None` draws one per match.
    pub seed: Option<u32>,
    /// Scheme resource to load instead of the embedded one.
    pub schemes: Option<PathBuf>,
    pub high_score_path: PathBuf,
    /// `None` disables logging.
    pub log_path: Option<PathBuf>,
    pub mute: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            players: 1,
            seed: None,
            schemes: None,
            high_score_path: PathBuf::from(DEFAULT_HIGH_SCORE_PATH),
            log_path: Some(PathBuf::from(DEFAULT_LOG_PATH)),
            mute: false,
        }
    }
}

impl Config {
    /// Build from the process environment and `args` (without the program
    /// name).
    pub fn load(args: &[String]) -> Result<Self> {
        let mut config = Self::from_env(|key| std::env::var(key).ok())?;
        config.apply_args(args)?;
        Ok(config)
    }

    /// Defaults overridden by whatever `var` returns for the `SPLITRIS_*`
    /// keys.
    pub fn from_env<F>(var: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();
        let var = |key: &str| {
            var(key)
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty())
        };

        if let Some(v) = var("SPLITRIS_PLAYERS") {
            config.players = parse_players(&v)
                .map_err(|_| anyhow!("config: invalid SPLITRIS_PLAYERS value: {}", v))?;
        }
        if let Some(v) = var("SPLITRIS_SEED") {
            config.seed = Some(
                v.parse::<u32>()
                    .map_err(|_| anyhow!("config: invalid SPLITRIS_SEED value: {}", v))?,
            );
        }
        if let Some(v) = var("SPLITRIS_SCHEMES") {
            config.schemes = Some(PathBuf::from(v));
        }
        if let Some(v) = var("SPLITRIS_HIGH_SCORE") {
            config.high_score_path = PathBuf::from(v);
        }
        if let Some(v) = var("SPLITRIS_LOG") {
            config.log_path = log_path(&v);
        }
        if let Some(v) = var("SPLITRIS_MUTE") {
            config.mute = v == "1" || v.eq_ignore_ascii_case("true");
        }

        Ok(config)
    }

    /// Apply command-line overrides on top of `self`.
    pub fn apply_args(&mut self, args: &[String]) -> Result<()> {
        let mut i = 0usize;
        while i < args.len() {
            match args[i].as_str() {
                "--players" => {
                    i += 1;
                    let v = args
                        .get(i)
                        .ok_or_else(|| anyhow!("config: missing value for --players"))?;
                    self.players = parse_players(v)
                        .map_err(|_| anyhow!("config: invalid --players value: {}", v))?;
                }
                "--seed" => {
                    i += 1;
                    let v = args
                        .get(i)
                        .ok_or_else(|| anyhow!("config: missing value for --seed"))?;
                    self.seed = Some(
                        v.parse::<u32>()
                            .map_err(|_| anyhow!("config: invalid --seed value: {}", v))?,
                    );
                }
                "--schemes" => {
                    i += 1;
                    let v = args
                        .get(i)
                        .ok_or_else(|| anyhow!("config: missing value for --schemes"))?;
                    self.schemes = Some(PathBuf::from(v));
                }
                "--high-score" => {
                    i += 1;
                    let v = args
                        .get(i)
                        .ok_or_else(|| anyhow!("config: missing value for --high-score"))?;
                    self.high_score_path = PathBuf::from(v);
                }
                "--log" => {
                    i += 1;
                    let v = args
                        .get(i)
                        .ok_or_else(|| anyhow!("config: missing value for --log"))?;
                    self.log_path = log_path(v);
                }
                "--mute" => self.mute = true,
                other => {
                    return Err(anyhow!("config: unknown argument: {}\n{}", other, USAGE));
                }
            }
            i += 1;
        }
        Ok(())
    }
}

fn parse_players(v: &str) -> Result<usize, ()> {
    match v.parse::<usize>() {
        Ok(n) if (1..=MAX_PLAYERS).contains(&n) => Ok(n),
        _ => Err(()),
    }
}

fn log_path(v: &str) -> Option<PathBuf> {
    if v.eq_ignore_ascii_case("off") {
        None
    } else {
        Some(PathBuf::from(v))
    }
}
