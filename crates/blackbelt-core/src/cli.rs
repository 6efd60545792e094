use std::ffi::OsString;
use std::io::IsTerminal;
use std::path::PathBuf;

use anyhow::anyhow;
use clap::{ArgAction, Parser};
use tracing::{debug, warn};
use tracing_subscriber::EnvFilter;

use crate::commands::{expand_command_abbrev, known_command_names};
use crate::config::Config;

/// One `KEY=VALUE` config override, taken from `--rc` or a positional
/// `rc.KEY=VALUE` word. The key never carries the `rc.` prefix.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RcOverride {
    pub key: String,
    pub value: String,
}

impl RcOverride {
    pub fn into_pair(self) -> (String, String) {
        (self.key, self.value)
    }
}

impl std::str::FromStr for RcOverride {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let body = s.strip_prefix("rc.").unwrap_or(s);
        let (k, v) = body
            .split_once('=')
            .ok_or_else(|| anyhow!("expected KEY=VALUE, got: {s}"))?;
        let key = k.trim();
        if key.is_empty() {
            return Err(anyhow!("override has an empty key: {s}"));
        }
        if Config::default().get(key).is_none() {
            warn!(key, "override sets a key blackbelt does not read");
        }
        Ok(Self {
            key: key.to_string(),
            value: v.trim().to_string(),
        })
    }
}

#[derive(Debug, Clone)]
pub struct PreprocessedArgs {
    pub cleaned_args: Vec<OsString>,
    pub rc_overrides: Vec<RcOverride>,
}

/// Global flags. Everything after them is the quest command and its words.
#[derive(Parser, Debug, Clone)]
#[command(
    name = "blackbelt",
    version,
    about = "BlackBelt: earn your belts one quest at a time",
    disable_help_subcommand = true
)]
pub struct GlobalCli {
    /// Log more to stderr (-v info, -vv debug, -vvv trace).
    #[arg(short = 'v', long = "verbose", action = ArgAction::Count)]
    pub verbose: u8,

    /// Log less and skip the first-run welcome hint.
    #[arg(short = 'q', long = "quiet", action = ArgAction::Count)]
    pub quiet: u8,

    /// Override one config key, e.g. `--rc duplicate.notice=inline`.
    #[arg(long = "rc", action = ArgAction::Append)]
    pub rc_overrides: Vec<RcOverride>,

    /// Read this rc file instead of `$BLACKBELTRC` or `~/.blackbeltrc`.
    #[arg(long = "rc-file")]
    pub rc_file: Option<PathBuf>,

    /// Keep quests in this directory instead of `data.location`.
    #[arg(long = "data")]
    pub data: Option<PathBuf>,

    #[arg(trailing_var_arg = true, allow_hyphen_values = true)]
    pub rest: Vec<OsString>,
}

/// Default log filter for the `-v`/`-q` counts. Quiet wins over verbose.
pub fn log_level(verbose: u8, quiet: u8) -> &'static str {
    match (quiet, verbose) {
        (2.., _) => "error",
        (1, _) | (0, 0) => "warn",
        (0, 1) => "info",
        (0, 2) => "debug",
        (0, _) => "trace",
    }
}

/// Logs go to stderr so tables and labels on stdout stay clean. `RUST_LOG`
/// takes precedence over the flag counts.
pub fn init_tracing(verbose: u8, quiet: u8) -> anyhow::Result<()> {
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(log_level(verbose, quiet)))
        .map_err(|e| anyhow!("invalid RUST_LOG / log filter: {e}"))?;

    let init_result = tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .with_ansi(std::io::stderr().is_terminal())
        .try_init();

    if let Err(err) = init_result {
        debug!(error = %err, "tracing subscriber already set, continuing");
    }

    Ok(())
}

/// Pulls positional `rc.KEY=VALUE` words out of the argument list before
/// clap sees it. A bare `rc.KEY` with no `=` is left for the command.
#[tracing::instrument(skip_all)]
pub fn preprocess_args(raw: &[OsString]) -> anyhow::Result<PreprocessedArgs> {
    let mut cleaned = Vec::with_capacity(raw.len());
    let mut overrides = Vec::new();

    let mut iter = raw.iter().cloned();
    if let Some(bin) = iter.next() {
        cleaned.push(bin);
    }

    for arg in iter {
        let word = arg.to_string_lossy();
        if word.starts_with("rc.") && word.contains('=') {
            let parsed: RcOverride = word.parse()?;
            debug!(key = %parsed.key, value = %parsed.value, "captured positional rc override");
            overrides.push(parsed);
            continue;
        }
        cleaned.push(arg);
    }

    Ok(PreprocessedArgs {
        cleaned_args: cleaned,
        rc_overrides: overrides,
    })
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Invocation {
    pub command: String,
    pub command_args: Vec<String>,
}

impl Invocation {
    #[tracing::instrument(skip(cfg, rest))]
    pub fn parse(cfg: &Config, rest: Vec<OsString>) -> anyhow::Result<Self> {
        let tokens: Vec<String> = rest
            .into_iter()
            .map(|arg| arg.to_string_lossy().to_string())
            .collect();

        let default_command = cfg
            .get("default.command")
            .unwrap_or_else(|| "list".to_string());

        let Some((first, args)) = tokens.split_first() else {
            debug!(command = %default_command, "no explicit command, using default");
            return Ok(Self {
                command: default_command,
                command_args: vec![],
            });
        };

        if let Some(full) = expand_command_abbrev(first, &known_command_names()) {
            debug!(token = %first, expanded = %full, "resolved command token");
            return Ok(Self {
                command: full.to_string(),
                command_args: args.to_vec(),
            });
        }

        warn!(
            token = %first,
            command = %default_command,
            "no command detected, passing all terms to the default command"
        );
        Ok(Self {
            command: default_command,
            command_args: tokens,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(items: &[&str]) -> Vec<OsString> {
        items.iter().map(OsString::from).collect()
    }

    fn pair(key: &str, value: &str) -> RcOverride {
        RcOverride {
            key: key.to_string(),
            value: value.to_string(),
        }
    }

    #[test]
    fn positional_rc_overrides_are_extracted() {
        let pre = preprocess_args(&args(&[
            "blackbelt",
            "rc.color=off",
            "list",
            "rc.welcome = no",
            "rc.notakeyvalue",
        ]))
        .expect("preprocess");
        assert_eq!(
            pre.cleaned_args,
            args(&["blackbelt", "list", "rc.notakeyvalue"])
        );
        assert_eq!(
            pre.rc_overrides,
            vec![pair("color", "off"), pair("welcome", "no")]
        );
    }

    #[test]
    fn rc_flag_overrides_are_parsed_by_clap() {
        let cli = GlobalCli::parse_from(args(&[
            "blackbelt",
            "--rc",
            "duplicate.notice=inline",
            "--rc",
            "rc.lookup.normalized=on",
            "add",
            "Kata",
        ]));
        assert_eq!(
            cli.rc_overrides,
            vec![
                pair("duplicate.notice", "inline"),
                pair("lookup.normalized", "on"),
            ]
        );
        assert_eq!(cli.rest, args(&["add", "Kata"]));
    }

    #[test]
    fn malformed_overrides_are_rejected() {
        assert!("color".parse::<RcOverride>().is_err());
        assert!("rc.=on".parse::<RcOverride>().is_err());
        assert!(preprocess_args(&args(&["blackbelt", "rc. =x"])).is_err());
    }

    #[test]
    fn quiet_beats_verbose_when_picking_the_log_level() {
        assert_eq!(log_level(0, 0), "warn");
        assert_eq!(log_level(1, 0), "info");
        assert_eq!(log_level(2, 0), "debug");
        assert_eq!(log_level(5, 0), "trace");
        assert_eq!(log_level(3, 1), "warn");
        assert_eq!(log_level(0, 2), "error");
    }

    #[test]
    fn empty_invocation_uses_default_command() {
        let inv = Invocation::parse(&Config::default(), vec![]).expect("parse");
        assert_eq!(inv.command, "list");
        assert!(inv.command_args.is_empty());
    }

    #[test]
    fn abbreviated_command_is_expanded() {
        let inv = Invocation::parse(&Config::default(), args(&["pro", "Kata", "50"])).expect("parse");
        assert_eq!(inv.command, "progress");
        assert_eq!(inv.command_args, vec!["Kata".to_string(), "50".to_string()]);
    }

    #[test]
    fn unknown_first_token_goes_to_default_command() {
        let inv = Invocation::parse(&Config::default(), args(&["completed"])).expect("parse");
        assert_eq!(inv.command, "list");
        assert_eq!(inv.command_args, vec!["completed".to_string()]);
    }
}
