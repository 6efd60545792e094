use anyhow::{Context, anyhow};
use blackbelt_shared::{KeyValueStorage, QuestError, QuestStore, StatusFilter};
use tracing::{debug, info, instrument, warn};

use crate::cli::Invocation;
use crate::config::Config;
use crate::render::Renderer;

pub const HELP_TEXT: &str = "\
BlackBelt turns your tasks into quests. Every quest starts at White Belt;
raise its progress and it climbs through Blue, Purple and Brown until it
reaches Black Belt at 100%.

Commands:
  add <name> [--progress N]    start a new quest (names are unique, ignoring case)
  progress <name> <percent>    set a quest's progress, 0 to 100
  delete <name>                remove a quest
  list [all|pending|completed] show quests, optionally by status
  belts                        show the belt ranks
  help                         show this text
  version                      print the version

Any unique prefix of a command works, e.g. `pro Kata 60`.";

pub const WELCOME_HINT: &str =
    "Welcome to BlackBelt! Run `blackbelt help` to learn how quests and belts work.";

pub fn known_command_names() -> Vec<&'static str> {
    vec![
        "add", "progress", "delete", "list", "belts", "help", "version",
    ]
}

pub fn expand_command_abbrev<'a>(token: &str, known: &[&'a str]) -> Option<&'a str> {
    if let Some(exact) = known.iter().copied().find(|name| *name == token) {
        return Some(exact);
    }

    let mut matches = known.iter().copied().filter(|name| name.starts_with(token));
    let first = matches.next()?;
    if matches.next().is_some() {
        None
    } else {
        Some(first)
    }
}

#[instrument(skip(store, cfg, renderer, inv))]
pub fn dispatch<S: KeyValueStorage>(
    store: &mut QuestStore<S>,
    cfg: &Config,
    renderer: &mut Renderer,
    inv: Invocation,
) -> anyhow::Result<()> {
    let command = inv.command.as_str();
    debug!(command, args = ?inv.command_args, "dispatching command");

    match command {
        "add" => cmd_add(store, cfg, renderer, &inv.command_args),
        "progress" => cmd_progress(store, renderer, &inv.command_args),
        "delete" => cmd_delete(store, renderer, &inv.command_args),
        "list" => cmd_list(store, renderer, &inv.command_args),
        "belts" => renderer.print_belt_table(),
        "help" => cmd_help(store, renderer),
        "version" => renderer.print_line(env!("CARGO_PKG_VERSION")),
        other => Err(anyhow!("unknown command: {other}")),
    }
}

#[instrument(skip(store, cfg, renderer, args))]
fn cmd_add<S: KeyValueStorage>(
    store: &mut QuestStore<S>,
    cfg: &Config,
    renderer: &mut Renderer,
    args: &[String],
) -> anyhow::Result<()> {
    info!("command add");

    let (name_parts, progress) = split_progress_flag(args)?;
    let name = name_parts.join(" ");
    let name = name.trim();

    match store.create(name, progress) {
        Ok(quest) => renderer.print_label(&quest),
        Err(QuestError::EmptyName) => {
            debug!("empty quest name, nothing to add");
            Ok(())
        }
        Err(QuestError::DuplicateName(_)) => {
            let notice = cfg.duplicate_notice()?;
            Err(anyhow!(notice.message()))
        }
        Err(err) => Err(err).context("failed to add quest"),
    }
}

#[instrument(skip(store, renderer, args))]
fn cmd_progress<S: KeyValueStorage>(
    store: &mut QuestStore<S>,
    renderer: &mut Renderer,
    args: &[String],
) -> anyhow::Result<()> {
    info!("command progress");

    let Some((percent, name_parts)) = args.split_last() else {
        return Err(anyhow!("usage: progress <name> <percent>"));
    };
    if name_parts.is_empty() {
        return Err(anyhow!("usage: progress <name> <percent>"));
    }
    let progress = parse_percent(percent)?;
    let name = name_parts.join(" ");

    if !store.update(&name, progress)? {
        warn!(name = %name, "no quest matched");
        return renderer.print_line(&format!("No quest named {name:?}."));
    }

    let quest = store
        .load()?
        .into_iter()
        .find(|quest| store.name_match().matches(&quest.name, &name))
        .ok_or_else(|| anyhow!("quest {name:?} vanished after update"))?;
    renderer.print_label(&quest)
}

#[instrument(skip(store, renderer, args))]
fn cmd_delete<S: KeyValueStorage>(
    store: &mut QuestStore<S>,
    renderer: &mut Renderer,
    args: &[String],
) -> anyhow::Result<()> {
    info!("command delete");

    let name = args.join(" ");
    if name.is_empty() {
        return Err(anyhow!("usage: delete <name>"));
    }

    if store.delete(&name)? {
        renderer.print_line(&format!("Deleted quest {name:?}."))
    } else {
        warn!(name = %name, "no quest matched");
        renderer.print_line(&format!("No quest named {name:?}."))
    }
}

#[instrument(skip(store, renderer, args))]
fn cmd_list<S: KeyValueStorage>(
    store: &mut QuestStore<S>,
    renderer: &mut Renderer,
    args: &[String],
) -> anyhow::Result<()> {
    let filter = match args {
        [] => StatusFilter::All,
        [one] => one.parse()?,
        _ => return Err(anyhow!("usage: list [all|pending|completed]")),
    };

    let shown = store.list(filter)?;
    let total = store.count()?;
    debug!(%filter, total, shown = shown.len(), "listing quests");

    renderer.print_quest_table(&shown, filter, total)
}

fn cmd_help<S: KeyValueStorage>(
    store: &mut QuestStore<S>,
    renderer: &mut Renderer,
) -> anyhow::Result<()> {
    renderer.print_line(HELP_TEXT)?;
    store.mark_visited()?;
    Ok(())
}

/// Separates `--progress N` / `-p N` / `--progress=N` from the name words.
fn split_progress_flag(args: &[String]) -> anyhow::Result<(Vec<String>, u8)> {
    let mut name = Vec::with_capacity(args.len());
    let mut progress = 0;
    let mut iter = args.iter();

    while let Some(arg) = iter.next() {
        if let Some(value) = arg.strip_prefix("--progress=") {
            progress = parse_percent(value)?;
        } else if arg == "--progress" || arg == "-p" {
            let value = iter
                .next()
                .ok_or_else(|| anyhow!("{arg} needs a percentage"))?;
            progress = parse_percent(value)?;
        } else {
            name.push(arg.clone());
        }
    }

    Ok((name, progress))
}

fn parse_percent(raw: &str) -> anyhow::Result<u8> {
    let trimmed = raw.trim().trim_end_matches('%');
    let value: u8 = trimmed
        .parse()
        .with_context(|| format!("invalid percentage: {raw}"))?;
    if value > 100 {
        return Err(QuestError::ProgressOutOfRange(value).into());
    }
    Ok(value)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn abbreviations_must_be_unique() {
        let known = known_command_names();
        assert_eq!(expand_command_abbrev("pro", &known), Some("progress"));
        assert_eq!(expand_command_abbrev("l", &known), Some("list"));
        assert_eq!(expand_command_abbrev("list", &known), Some("list"));
        assert_eq!(expand_command_abbrev("x", &known), None);
    }

    #[test]
    fn progress_flag_is_split_from_name() {
        let args: Vec<String> = ["Morning", "-p", "40", "run"]
            .iter()
            .map(ToString::to_string)
            .collect();
        let (name, progress) = split_progress_flag(&args).expect("split");
        assert_eq!(name.join(" "), "Morning run");
        assert_eq!(progress, 40);

        let args = vec!["Kata".to_string(), "--progress=100%".to_string()];
        assert_eq!(split_progress_flag(&args).expect("split").1, 100);
    }

    #[test]
    fn percent_parsing_rejects_out_of_range() {
        assert_eq!(parse_percent("75%").expect("parse"), 75);
        assert!(parse_percent("101").is_err());
        assert!(parse_percent("-1").is_err());
        assert!(parse_percent("half").is_err());
    }
}
