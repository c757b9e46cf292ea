//! Line-oriented front end. One command per line; results and errors are
//! written back as plain text.

use std::fmt::Write as _;

use anyhow::Result;
use log::info;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt};

use crate::{
    audio::PlaybackSnapshot,
    catalog::Activity,
    commands,
    dashboard::{DashboardMetrics, WeeklyAverage},
    db::MoodEntry,
    AppState,
};

const HELP: &str = "\
commands:
  mood <1-5> [notes]   record a check-in
  history [days]       list check-ins, optionally only the last N days
  goal                 show the current goal
  complete [id]        finish a goal (defaults to the current one)
  dashboard            weekly average, streak and risk
  play <activity-id>   play an activity's audio
  pause | reset        control playback
  toggle               play or pause
  volume <0..1>        set playback volume
  status               show playback position
  say <text>           add an interim voice fragment
  final <text>         add a final voice fragment
  note | clear-note    show or discard the voice note
  help | quit";

#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    Mood { value: i64, notes: Option<String> },
    History { days: Option<u32> },
    Goal,
    Complete { id: Option<String> },
    Dashboard,
    Play { activity_id: String },
    Pause,
    Reset,
    Toggle,
    Volume { level: f32 },
    Status,
    Say { text: String, is_final: bool },
    Note,
    ClearNote,
    Help,
    Quit,
}

impl Command {
    pub fn parse(line: &str) -> Result<Option<Command>, String> {
        let line = line.trim();
        if line.is_empty() {
            return Ok(None);
        }

        let (word, rest) = match line.split_once(char::is_whitespace) {
            Some((word, rest)) => (word, rest.trim()),
            None => (line, ""),
        };
        let rest_opt = || (!rest.is_empty()).then(|| rest.to_string());

        let command = match word.to_ascii_lowercase().as_str() {
            "mood" => {
                let (value, notes) = match rest.split_once(char::is_whitespace) {
                    Some((value, notes)) => (value, Some(notes.trim().to_string())),
                    None => (rest, None),
                };
                if value.is_empty() {
                    return Err("select a mood between 1 and 5".to_string());
                }
                let value = value
                    .parse::<i64>()
                    .map_err(|_| format!("mood must be a number, got {value:?}"))?;
                Command::Mood { value, notes }
            }
            "history" => Command::History {
                days: match rest_opt() {
                    Some(days) => Some(
                        days.parse()
                            .map_err(|_| format!("days must be a whole number, got {days:?}"))?,
                    ),
                    None => None,
                },
            },
            "goal" => Command::Goal,
            "complete" | "done" => Command::Complete { id: rest_opt() },
            "dashboard" => Command::Dashboard,
            "play" => Command::Play {
                activity_id: rest_opt().ok_or_else(|| "usage: play <activity-id>".to_string())?,
            },
            "pause" => Command::Pause,
            "reset" => Command::Reset,
            "toggle" => Command::Toggle,
            "volume" => Command::Volume {
                level: rest
                    .parse()
                    .map_err(|_| format!("volume must be a number, got {rest:?}"))?,
            },
            "status" => Command::Status,
            "say" => Command::Say {
                text: rest.to_string(),
                is_final: false,
            },
            "final" => Command::Say {
                text: rest.to_string(),
                is_final: true,
            },
            "note" => Command::Note,
            "clear-note" => Command::ClearNote,
            "help" | "?" => Command::Help,
            "quit" | "exit" => Command::Quit,
            other => return Err(format!("unknown command {other:?}, try `help`")),
        };
        Ok(Some(command))
    }
}

pub async fn execute(state: &AppState, command: Command) -> Result<String, String> {
    match command {
        Command::Mood { value, notes } => {
            let check_in = commands::check_in(state, value, notes).await?;
            Ok(format!(
                "Saved {} {} ({}).\nSuggested goal:\n{}",
                check_in.entry.mood.emoji(),
                check_in.entry.mood.label(),
                check_in.entry.mood,
                render_goal(&check_in.goal)
            ))
        }
        Command::History { days } => {
            let history = commands::get_history(state, days).await?;
            Ok(render_history(&history))
        }
        Command::Goal => Ok(render_goal(&commands::get_goal(state).await?)),
        Command::Complete { id } => {
            let completion = commands::complete_goal(state, id).await?;
            Ok(format!(
                "Completed goal {}. Next up:\n{}",
                completion.record.goal_id,
                render_goal(&completion.next)
            ))
        }
        Command::Dashboard => Ok(render_dashboard(&commands::get_dashboard(state).await?)),
        Command::Play { activity_id } => {
            Ok(render_playback(&commands::play_activity(state, &activity_id).await?))
        }
        Command::Pause => Ok(render_playback(&commands::pause_audio(state).await?)),
        Command::Reset => Ok(render_playback(&commands::reset_audio(state).await?)),
        Command::Toggle => Ok(render_playback(&commands::toggle_audio(state).await?)),
        Command::Volume { level } => {
            let applied = commands::set_volume(state, level).await?;
            Ok(format!("Volume {:.0}%", applied * 100.0))
        }
        Command::Status => Ok(match commands::audio_status(state).await? {
            Some(snapshot) => render_playback(&snapshot),
            None => "No audio session.".to_string(),
        }),
        Command::Say { text, is_final } => {
            let note = commands::voice_fragment(state, &text, is_final).await?;
            Ok(if note.is_empty() {
                "Voice input is off; type your notes instead.".to_string()
            } else {
                format!("Note: {note}")
            })
        }
        Command::Note => {
            let note = commands::voice_note(state).await?;
            Ok(if note.is_empty() {
                "No voice note.".to_string()
            } else {
                format!("Note: {note}")
            })
        }
        Command::ClearNote => {
            commands::clear_voice_note(state).await?;
            Ok("Voice note cleared.".to_string())
        }
        Command::Help => Ok(HELP.to_string()),
        Command::Quit => Ok(String::new()),
    }
}

/// Reads commands until `quit` or end of input.
pub async fn run<R, W>(state: &AppState, input: R, output: &mut W) -> Result<()>
where
    R: AsyncBufRead + Unpin,
    W: AsyncWrite + Unpin,
{
    let mut lines = input.lines();
    output.write_all(b"Type `help` for commands.\n").await?;
    output.flush().await?;

    while let Some(line) = lines.next_line().await? {
        let reply = match Command::parse(&line) {
            Ok(None) => continue,
            Ok(Some(Command::Quit)) => break,
            Ok(Some(command)) => execute(state, command).await,
            Err(err) => Err(err),
        };

        let text = match reply {
            Ok(text) => text,
            Err(err) => format!("error: {err}"),
        };
        output.write_all(text.as_bytes()).await?;
        output.write_all(b"\n").await?;
        output.flush().await?;
    }

    if let Err(err) = commands::shutdown(state).await {
        log::warn!("Shutdown failed: {err}");
    }
    info!("Shell closed");
    Ok(())
}

fn render_goal(goal: &Activity) -> String {
    let mut out = format!(
        "[{}] {} ({}, {}, {})\n  {}",
        goal.id,
        goal.title,
        goal.category,
        goal.duration,
        goal.difficulty.as_str(),
        goal.description
    );
    if let Some(audio) = &goal.audio {
        let _ = write!(out, "\n  audio: {audio} (play {})", goal.id);
    }
    out
}

fn render_history(history: &[MoodEntry]) -> String {
    if history.is_empty() {
        return "No check-ins yet.".to_string();
    }
    history
        .iter()
        .map(|entry| {
            let mut line = format!(
                "{} {} {}",
                entry.timestamp.format("%Y-%m-%d %H:%M"),
                entry.mood.emoji(),
                entry.mood.label()
            );
            if !entry.notes.is_empty() {
                let _ = write!(line, ": {}", entry.notes);
            }
            line
        })
        .collect::<Vec<_>>()
        .join("\n")
}

fn render_dashboard(metrics: &DashboardMetrics) -> String {
    let average = match metrics.weekly_average {
        WeeklyAverage::Value(avg) => format!("{avg:.1}/5"),
        WeeklyAverage::InsufficientData => "not enough data".to_string(),
    };
    let mut out = format!(
        "Weekly average: {average}\nStreak: {} days\nCheck-ins this month: {}\nRisk level: {}",
        metrics.streak_days,
        metrics.total_check_ins,
        metrics.risk_level.as_str()
    );
    for recent in &metrics.recent_moods {
        let _ = write!(out, "\n  {} {} {}", recent.emoji, recent.label, recent.when);
    }
    out
}

fn render_playback(snapshot: &PlaybackSnapshot) -> String {
    format!(
        "{} {:?} ({:?}) {} / {} vol {:.0}%",
        snapshot.session.resource_ref,
        snapshot.session.status,
        snapshot.session.mode,
        snapshot.elapsed,
        snapshot.total,
        snapshot.session.volume * 100.0
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_mood_with_notes() {
        assert_eq!(
            Command::parse("mood 4 slept well").unwrap(),
            Some(Command::Mood {
                value: 4,
                notes: Some("slept well".into())
            })
        );
        assert_eq!(
            Command::parse("  mood 2 ").unwrap(),
            Some(Command::Mood {
                value: 2,
                notes: None
            })
        );
    }

    #[test]
    fn missing_mood_is_rejected() {
        assert!(Command::parse("mood").is_err());
        assert!(Command::parse("mood great").is_err());
    }

    #[test]
    fn parses_voice_and_audio_commands() {
        assert_eq!(
            Command::parse("final feeling calmer").unwrap(),
            Some(Command::Say {
                text: "feeling calmer".into(),
                is_final: true
            })
        );
        assert_eq!(
            Command::parse("volume 0.25").unwrap(),
            Some(Command::Volume { level: 0.25 })
        );
        assert_eq!(
            Command::parse("complete").unwrap(),
            Some(Command::Complete { id: None })
        );
        assert!(Command::parse("play").is_err());
    }

    #[test]
    fn parses_history_windows() {
        assert_eq!(
            Command::parse("history").unwrap(),
            Some(Command::History { days: None })
        );
        assert_eq!(
            Command::parse("history 4000000000").unwrap(),
            Some(Command::History {
                days: Some(4_000_000_000)
            })
        );
        assert!(Command::parse("history -1").is_err());
    }

    #[test]
    fn blank_and_unknown_lines() {
        assert_eq!(Command::parse("   ").unwrap(), None);
        assert!(Command::parse("dance").is_err());
    }
}
