// Keyboard input handling and command dispatch.
//
// Translates crossterm key events either into local ViewState changes
// (tabs, cursors, sorting, filtering) or into UserCommands for the session.

use std::path::PathBuf;

use crossterm::event::{KeyCode, KeyEvent, KeyEventKind, KeyModifiers};

use courtside_app::{PredictField, UserCommand};
use courtside_core::ImportMode;
use courtside_nba::predict::keys as predict_keys;
use courtside_nba::teams::Conference;

use super::{all_teams, TabId, TeamView, ViewState};

/// Step used by `+`/`-` on prediction columns.
pub const PREDICTION_STEP: f64 = 0.5;

/// Handle a keyboard event. Returns a command when the key should reach the
/// session.
pub fn handle_key(key_event: KeyEvent, view_state: &mut ViewState) -> Option<UserCommand> {
    if key_event.kind != KeyEventKind::Press {
        return None;
    }

    if key_event.modifiers.contains(KeyModifiers::CONTROL) && key_event.code == KeyCode::Char('c')
    {
        return Some(UserCommand::Quit);
    }

    if view_state.command_mode {
        return handle_command_mode(key_event, view_state);
    }
    if view_state.filter_mode {
        handle_filter_mode(key_event, view_state);
        return None;
    }
    if view_state.detail.is_some() {
        if matches!(key_event.code, KeyCode::Esc | KeyCode::Enter | KeyCode::Char('q')) {
            view_state.detail = None;
        }
        return None;
    }

    match key_event.code {
        KeyCode::Char('1') => view_state.switch_tab(TabId::Players),
        KeyCode::Char('2') => view_state.switch_tab(TabId::Teams),
        KeyCode::Char('3') => view_state.switch_tab(TabId::Predict),

        KeyCode::Up | KeyCode::Char('k') => {
            view_state.selected = view_state.selected.saturating_sub(1);
        }
        KeyCode::Down | KeyCode::Char('j') => {
            view_state.selected += 1;
            view_state.clamp_cursors();
        }
        KeyCode::Left | KeyCode::Char('h') => {
            view_state.column = view_state.column.saturating_sub(1);
        }
        KeyCode::Right | KeyCode::Char('l') => {
            view_state.column += 1;
            view_state.clamp_cursors();
        }

        KeyCode::Char('s') => {
            view_state.activate_sort();
        }

        KeyCode::Enter => {
            view_state.detail = view_state.selected_player_id();
        }

        KeyCode::Char('/') => {
            if view_state.active_tab == TabId::Players {
                view_state.filter_mode = true;
            }
        }
        KeyCode::Esc => {
            view_state.filter_text.clear();
            view_state.clamp_cursors();
        }

        KeyCode::Char('[') => cycle_team(view_state, false),
        KeyCode::Char(']') => cycle_team(view_state, true),
        KeyCode::Char('t') => {
            if view_state.active_tab == TabId::Teams {
                view_state.team_view = match view_state.team_view {
                    TeamView::Ratings => TeamView::Salary,
                    TeamView::Salary => TeamView::Ratings,
                };
                view_state.clamp_cursors();
            }
        }
        KeyCode::Char('c') => {
            if view_state.active_tab == TabId::Predict {
                view_state.conference = match view_state.conference {
                    Conference::East => Conference::West,
                    Conference::West => Conference::East,
                };
                view_state.selected = 0;
            }
        }

        KeyCode::Char('+') | KeyCode::Char('=') => return adjust_prediction(view_state, 1.0),
        KeyCode::Char('-') => return adjust_prediction(view_state, -1.0),

        KeyCode::Char(':') => {
            view_state.command_mode = true;
            view_state.command_text.clear();
        }

        KeyCode::Char('q') => return Some(UserCommand::Quit),

        _ => {}
    }
    None
}

fn handle_filter_mode(key_event: KeyEvent, view_state: &mut ViewState) {
    match key_event.code {
        KeyCode::Esc => {
            view_state.filter_mode = false;
            view_state.filter_text.clear();
        }
        KeyCode::Enter => view_state.filter_mode = false,
        KeyCode::Backspace => {
            view_state.filter_text.pop();
        }
        KeyCode::Char(c) => view_state.filter_text.push(c),
        _ => {}
    }
    view_state.clamp_cursors();
}

fn handle_command_mode(key_event: KeyEvent, view_state: &mut ViewState) -> Option<UserCommand> {
    match key_event.code {
        KeyCode::Esc => {
            view_state.command_mode = false;
            view_state.command_text.clear();
            None
        }
        KeyCode::Backspace => {
            view_state.command_text.pop();
            None
        }
        KeyCode::Char(c) => {
            view_state.command_text.push(c);
            None
        }
        KeyCode::Enter => {
            view_state.command_mode = false;
            let line = std::mem::take(&mut view_state.command_text);
            if line.trim().is_empty() {
                return None;
            }
            match parse_command(&line, view_state.import_mode) {
                Ok(cmd) => Some(cmd),
                Err(msg) => {
                    view_state.set_notice(msg, true);
                    None
                }
            }
        }
        _ => None,
    }
}

fn cycle_team(view_state: &mut ViewState, forward: bool) {
    if view_state.active_tab != TabId::Teams {
        return;
    }
    let count = all_teams().len();
    view_state.team_index = if forward {
        (view_state.team_index + 1) % count
    } else {
        (view_state.team_index + count - 1) % count
    };
    view_state.selected = 0;
}

/// `+`/`-` on the Line, Optimistic or Pessimistic column of the Predict tab.
fn adjust_prediction(view_state: &ViewState, sign: f64) -> Option<UserCommand> {
    let field = match view_state.column_key()? {
        predict_keys::LINE => PredictField::Line,
        predict_keys::OPTIMISTIC => PredictField::Optimistic,
        predict_keys::PESSIMISTIC => PredictField::Pessimistic,
        _ => return None,
    };
    let team = view_state.selected_prediction_team()?;
    let current = view_state.data.prediction(team);
    let value = match field {
        PredictField::Line => current.line,
        PredictField::Optimistic => current.optimistic,
        _ => current.pessimistic,
    };
    Some(UserCommand::SetPrediction {
        team: team.abbr.to_string(),
        field,
        value: value + sign * PREDICTION_STEP,
    })
}

fn parse_mode(word: &str) -> Option<ImportMode> {
    match word.to_ascii_lowercase().as_str() {
        "replace" => Some(ImportMode::Replace),
        "append" => Some(ImportMode::Append),
        _ => None,
    }
}

fn required_path(rest: &str, usage: &str) -> Result<PathBuf, String> {
    if rest.is_empty() {
        Err(format!("usage: {usage}"))
    } else {
        Ok(PathBuf::from(rest))
    }
}

/// Parse a `:` command line.
///
/// ```text
/// import <path> [replace|append]
/// export <path>
/// backup <path>
/// restore <path>
/// reset
/// set <TEAM> <wins|line|opt|pes> <number>
/// card <player-id> [image]
/// logo <TEAM> [image]
/// quit
/// ```
pub fn parse_command(line: &str, default_mode: ImportMode) -> Result<UserCommand, String> {
    let line = line.trim();
    let (verb, rest) = match line.split_once(char::is_whitespace) {
        Some((verb, rest)) => (verb, rest.trim()),
        None => (line, ""),
    };

    match verb.to_ascii_lowercase().as_str() {
        "import" | "i" => {
            let (path, mode) = match rest.rsplit_once(char::is_whitespace) {
                Some((path, last)) => match parse_mode(last) {
                    Some(mode) => (path.trim(), mode),
                    None => (rest, default_mode),
                },
                None => (rest, default_mode),
            };
            Ok(UserCommand::ImportCsv {
                path: required_path(path, "import <path> [replace|append]")?,
                mode,
            })
        }
        "export" | "e" => Ok(UserCommand::ExportCsv {
            path: required_path(rest, "export <path>")?,
        }),
        "backup" | "b" => Ok(UserCommand::Backup {
            path: required_path(rest, "backup <path>")?,
        }),
        "restore" => Ok(UserCommand::Restore {
            path: required_path(rest, "restore <path>")?,
        }),
        "reset" => Ok(UserCommand::Reset),
        "set" => {
            let parts: Vec<&str> = rest.split_whitespace().collect();
            let [team, field, value] = parts.as_slice() else {
                return Err("usage: set <TEAM> <wins|line|opt|pes> <number>".into());
            };
            let field =
                PredictField::parse(field).ok_or_else(|| format!("unknown field: {field}"))?;
            let value: f64 = value
                .parse()
                .map_err(|_| format!("not a number: {value}"))?;
            Ok(UserCommand::SetPrediction {
                team: team.to_string(),
                field,
                value,
            })
        }
        "card" | "logo" => {
            let (target, image) = match rest.split_once(char::is_whitespace) {
                Some((target, image)) => (target, Some(image.trim().to_string())),
                None => (rest, None),
            };
            if target.is_empty() {
                return Err(format!("usage: {verb} <target> [image]"));
            }
            let image = image.filter(|i| !i.is_empty());
            if verb.eq_ignore_ascii_case("card") {
                Ok(UserCommand::SetCardImage {
                    id: target.to_string(),
                    image,
                })
            } else {
                Ok(UserCommand::SetTeamImage {
                    team: target.to_string(),
                    image,
                })
            }
        }
        "quit" | "q" => Ok(UserCommand::Quit),
        other => Err(format!("unknown command: {other}")),
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tui::tests::view_with_sample;

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    fn type_str(state: &mut ViewState, s: &str) {
        for c in s.chars() {
            handle_key(key(KeyCode::Char(c)), state);
        }
    }

    #[test]
    fn number_keys_switch_tabs() {
        let mut state = view_with_sample();
        handle_key(key(KeyCode::Char('3')), &mut state);
        assert_eq!(state.active_tab, TabId::Predict);
        handle_key(key(KeyCode::Char('2')), &mut state);
        assert_eq!(state.active_tab, TabId::Teams);
        handle_key(key(KeyCode::Char('1')), &mut state);
        assert_eq!(state.active_tab, TabId::Players);
    }

    #[test]
    fn cursor_is_clamped() {
        let mut state = view_with_sample();
        for _ in 0..10 {
            handle_key(key(KeyCode::Down), &mut state);
        }
        assert_eq!(state.selected, 2);
        handle_key(key(KeyCode::Left), &mut state);
        assert_eq!(state.column, 0);
        for _ in 0..20 {
            handle_key(key(KeyCode::Right), &mut state);
        }
        assert_eq!(state.column, 10);
    }

    #[test]
    fn s_toggles_sort_on_active_column() {
        let mut state = view_with_sample();
        state.column = 5; // rating, active descending
        handle_key(key(KeyCode::Char('s')), &mut state);
        assert!(state.players_sort.ascending);
        handle_key(key(KeyCode::Char('s')), &mut state);
        assert!(!state.players_sort.ascending);
    }

    #[test]
    fn enter_opens_and_esc_closes_detail() {
        let mut state = view_with_sample();
        state.selected = 1;
        handle_key(key(KeyCode::Enter), &mut state);
        assert_eq!(state.detail.as_deref(), Some("p2"));
        // Tab keys are swallowed while the popup is open.
        handle_key(key(KeyCode::Char('3')), &mut state);
        assert_eq!(state.active_tab, TabId::Players);
        handle_key(key(KeyCode::Esc), &mut state);
        assert!(state.detail.is_none());
    }

    #[test]
    fn filter_mode_captures_text() {
        let mut state = view_with_sample();
        handle_key(key(KeyCode::Char('/')), &mut state);
        assert!(state.filter_mode);
        type_str(&mut state, "bos");
        assert_eq!(state.filter_text, "bos");
        handle_key(key(KeyCode::Backspace), &mut state);
        assert_eq!(state.filter_text, "bo");
        handle_key(key(KeyCode::Enter), &mut state);
        assert!(!state.filter_mode);
        assert_eq!(state.filter_text, "bo");
    }

    #[test]
    fn filter_only_on_players_tab() {
        let mut state = view_with_sample();
        state.switch_tab(TabId::Teams);
        handle_key(key(KeyCode::Char('/')), &mut state);
        assert!(!state.filter_mode);
    }

    #[test]
    fn team_cycling_wraps() {
        let mut state = view_with_sample();
        state.switch_tab(TabId::Teams);
        handle_key(key(KeyCode::Char('[')), &mut state);
        assert_eq!(state.team_index, 29);
        handle_key(key(KeyCode::Char(']')), &mut state);
        assert_eq!(state.team_index, 0);
        handle_key(key(KeyCode::Char('t')), &mut state);
        assert_eq!(state.team_view, TeamView::Salary);
    }

    #[test]
    fn conference_toggle() {
        let mut state = view_with_sample();
        state.switch_tab(TabId::Predict);
        handle_key(key(KeyCode::Char('c')), &mut state);
        assert_eq!(state.conference, Conference::West);
    }

    #[test]
    fn plus_on_line_column_sets_prediction() {
        let mut state = view_with_sample();
        state.switch_tab(TabId::Predict);
        state.column = 2;
        let cmd = handle_key(key(KeyCode::Char('+')), &mut state);
        assert_eq!(
            cmd,
            Some(UserCommand::SetPrediction {
                team: "BOS".into(),
                field: PredictField::Line,
                value: 53.0,
            })
        );
        state.column = 5;
        assert_eq!(handle_key(key(KeyCode::Char('-')), &mut state), None);
    }

    #[test]
    fn command_line_round_trip() {
        let mut state = view_with_sample();
        handle_key(key(KeyCode::Char(':')), &mut state);
        assert!(state.command_mode);
        type_str(&mut state, "export out.csv");
        let cmd = handle_key(key(KeyCode::Enter), &mut state);
        assert_eq!(
            cmd,
            Some(UserCommand::ExportCsv {
                path: PathBuf::from("out.csv")
            })
        );
        assert!(!state.command_mode);
        assert!(state.command_text.is_empty());
    }

    #[test]
    fn bad_command_becomes_error_notice() {
        let mut state = view_with_sample();
        handle_key(key(KeyCode::Char(':')), &mut state);
        type_str(&mut state, "frobnicate");
        assert_eq!(handle_key(key(KeyCode::Enter), &mut state), None);
        assert!(state.notice.as_ref().unwrap().is_error);
    }

    #[test]
    fn q_quits_and_ctrl_c_always_quits() {
        let mut state = view_with_sample();
        assert_eq!(
            handle_key(key(KeyCode::Char('q')), &mut state),
            Some(UserCommand::Quit)
        );
        state.command_mode = true;
        let ctrl_c = KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL);
        assert_eq!(handle_key(ctrl_c, &mut state), Some(UserCommand::Quit));
    }

    #[test]
    fn parse_import_variants() {
        assert_eq!(
            parse_command("import data/players.csv", ImportMode::Append),
            Ok(UserCommand::ImportCsv {
                path: "data/players.csv".into(),
                mode: ImportMode::Append,
            })
        );
        assert_eq!(
            parse_command("import my players.csv replace", ImportMode::Append),
            Ok(UserCommand::ImportCsv {
                path: "my players.csv".into(),
                mode: ImportMode::Replace,
            })
        );
        assert!(parse_command("import", ImportMode::Replace).is_err());
    }

    #[test]
    fn parse_set_and_images() {
        assert_eq!(
            parse_command("set lal opt 51.5", ImportMode::Replace),
            Ok(UserCommand::SetPrediction {
                team: "lal".into(),
                field: PredictField::Optimistic,
                value: 51.5,
            })
        );
        assert!(parse_command("set lal opt many", ImportMode::Replace).is_err());
        assert!(parse_command("set lal bogus 1", ImportMode::Replace).is_err());
        assert_eq!(
            parse_command("card p1 cards/a.png", ImportMode::Replace),
            Ok(UserCommand::SetCardImage {
                id: "p1".into(),
                image: Some("cards/a.png".into()),
            })
        );
        assert_eq!(
            parse_command("logo BOS", ImportMode::Replace),
            Ok(UserCommand::SetTeamImage {
                team: "BOS".into(),
                image: None,
            })
        );
        assert_eq!(parse_command("reset", ImportMode::Replace), Ok(UserCommand::Reset));
    }
}
