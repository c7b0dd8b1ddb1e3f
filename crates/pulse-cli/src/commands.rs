use anyhow::{Result, anyhow, bail};
use serde_json::{Value, json};

use pulse_store::PreferenceStore;
use pulse_types::models::{ActionKind, ColorMode, ProfileId};

use crate::session::DiscoverySession;

pub const USAGE: &str = "\
usage: pulse <command>

  history [pass|favorite|connect]            list logged swipes, newest first
  stats                                      counts per action and for today
  swipe <profile-id> <name> <action> [photo] log a swipe
  previous <profile-id>                      latest swipe on a profile
  clear                                      delete the swipe history
  pulse-save <profile-id> <index> <true|false> <result>
  pulse-load <profile-id>                    saved pulse answers
  theme [id]                                 show or set the color theme
  mode [light|dark]                          show or set light/dark mode";

#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    History(Option<ActionKind>),
    Stats,
    Swipe {
        profile_id: ProfileId,
        name: String,
        action: ActionKind,
        photo_index: u32,
    },
    Previous(ProfileId),
    Clear,
    PulseSave {
        profile_id: ProfileId,
        index: usize,
        value: bool,
        result: String,
    },
    PulseLoad(ProfileId),
    Theme(Option<String>),
    Mode(Option<ColorMode>),
}

impl Command {
    /// Parse arguments after the program name.
    pub fn parse(args: &[String]) -> Result<Self> {
        let Some((name, rest)) = args.split_first() else {
            bail!("missing command");
        };
        let arg = |i: usize, what: &'static str| -> Result<String> {
            rest.get(i)
                .cloned()
                .ok_or_else(|| anyhow!("{}: missing {}", name, what))
        };
        let profile = |i: usize| -> Result<ProfileId> {
            Ok(arg(i, "profile id")?
                .parse::<ProfileId>()
                .unwrap_or_else(|never| match never {}))
        };

        let cmd = match name.as_str() {
            "history" => Self::History(
                rest.first()
                    .map(|s| s.parse::<ActionKind>().map_err(|e: String| anyhow!(e)))
                    .transpose()?,
            ),
            "stats" => Self::Stats,
            "swipe" => Self::Swipe {
                profile_id: profile(0)?,
                name: arg(1, "name")?,
                action: arg(2, "action")?.parse::<ActionKind>().map_err(|e: String| anyhow!(e))?,
                photo_index: match rest.get(3) {
                    Some(v) => v.parse()?,
                    None => 0,
                },
            },
            "previous" => Self::Previous(profile(0)?),
            "clear" => Self::Clear,
            "pulse-save" => Self::PulseSave {
                profile_id: profile(0)?,
                index: arg(1, "question index")?.parse()?,
                value: arg(2, "answer")?.parse()?,
                result: arg(3, "result")?,
            },
            "pulse-load" => Self::PulseLoad(profile(0)?),
            "theme" => Self::Theme(rest.first().cloned()),
            "mode" => Self::Mode(
                rest.first()
                    .map(|s| s.parse::<ColorMode>().map_err(|e: String| anyhow!(e)))
                    .transpose()?,
            ),
            other => bail!("unknown command: {}", other),
        };
        Ok(cmd)
    }
}

/// Execute a command and return what should be printed.
pub fn run(cmd: Command, session: &DiscoverySession, prefs: &PreferenceStore) -> Result<Value> {
    let out = match cmd {
        Command::History(filter) => json!(session.actions().get_action_history(filter)),
        Command::Stats => json!(session.actions().get_action_stats()),
        Command::Swipe {
            profile_id,
            name,
            action,
            photo_index,
        } => json!({ "saved": session.record_swipe(profile_id, &name, action, photo_index) }),
        Command::Previous(profile_id) => json!(session.actions().get_previous_action(&profile_id)),
        Command::Clear => json!({ "cleared": session.clear_history() }),
        Command::PulseSave {
            profile_id,
            index,
            value,
            result,
        } => json!({ "saved": session.answer_pulse(&profile_id, index, value, &result) }),
        Command::PulseLoad(profile_id) => json!(session.pulse().load_pulse_answers(&profile_id)),
        Command::Theme(Some(theme)) => json!({ "saved": prefs.set_color_theme(&theme) }),
        Command::Theme(None) => json!({ "theme": prefs.color_theme() }),
        Command::Mode(Some(mode)) => json!({ "saved": prefs.set_color_mode(mode) }),
        Command::Mode(None) => json!({ "mode": prefs.color_mode().as_str() }),
    };
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pulse_notify::Dispatcher;
    use pulse_store::LocalStorage;
    use std::sync::Arc;

    fn parse(args: &[&str]) -> Result<Command> {
        let args: Vec<String> = args.iter().map(|s| s.to_string()).collect();
        Command::parse(&args)
    }

    #[test]
    fn parses_swipe() {
        assert_eq!(
            parse(&["swipe", "12", "Dr. Ama Obi", "connect", "3"]).unwrap(),
            Command::Swipe {
                profile_id: ProfileId::Int(12),
                name: "Dr. Ama Obi".into(),
                action: ActionKind::Connect,
                photo_index: 3,
            }
        );
        assert!(matches!(
            parse(&["swipe", "ext-1", "B", "pass"]).unwrap(),
            Command::Swipe { photo_index: 0, .. }
        ));
    }

    #[test]
    fn parses_optional_filters() {
        assert_eq!(parse(&["history"]).unwrap(), Command::History(None));
        assert_eq!(
            parse(&["history", "favorite"]).unwrap(),
            Command::History(Some(ActionKind::Favorite))
        );
        assert_eq!(parse(&["mode", "dark"]).unwrap(), Command::Mode(Some(ColorMode::Dark)));
    }

    #[test]
    fn rejects_bad_input() {
        assert!(parse(&[]).is_err());
        assert!(parse(&["dance"]).is_err());
        assert!(parse(&["history", "superlike"]).is_err());
        assert!(parse(&["swipe", "1"]).is_err());
        assert!(parse(&["pulse-save", "1", "x", "true", "match"]).is_err());
    }

    #[test]
    fn run_round_trip() {
        let storage = Arc::new(LocalStorage::open_in_memory().unwrap());
        let session = DiscoverySession::new(storage.clone(), 1000, Dispatcher::new());
        let prefs = PreferenceStore::new(storage);

        let saved = run(parse(&["swipe", "5", "Dr. E", "favorite"]).unwrap(), &session, &prefs).unwrap();
        assert_eq!(saved["saved"], true);

        let stats = run(Command::Stats, &session, &prefs).unwrap();
        assert_eq!(stats["total"], 1);
        assert_eq!(stats["favorites"], 1);

        let prev = run(Command::Previous(ProfileId::Int(5)), &session, &prefs).unwrap();
        assert_eq!(prev["profileName"], "Dr. E");

        run(parse(&["pulse-save", "5", "0", "true", "match"]).unwrap(), &session, &prefs).unwrap();
        let answers = run(Command::PulseLoad(ProfileId::Int(5)), &session, &prefs).unwrap();
        assert_eq!(answers["0"]["result"], "match");

        let mode = run(Command::Mode(None), &session, &prefs).unwrap();
        assert_eq!(mode["mode"], "light");
    }
}
