//! Now-playing feed: newline-delimited JSON commands on stdin.
//!
//! ```text
//! {"type":"update","title":"Song A","artist":"Band B","start":1700000000,"end":1700000180}
//! {"type":"clear"}
//! ```

use navicord_common::PresenceUpdate;
use navicord_config::schema::ActivityNameMode;
use serde::Deserialize;

/// A parsed feed line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FeedCommand {
    Publish(PresenceUpdate),
    Clear,
}

#[derive(Debug, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
enum FeedLine {
    Update(UpdateLine),
    Clear,
}

#[derive(Debug, Deserialize)]
struct UpdateLine {
    title: String,
    artist: String,
    album: Option<String>,
    start: Option<i64>,
    end: Option<i64>,
    art_url: Option<String>,
    activity_name: Option<String>,
}

/// Parse one line. Blank lines yield `None`.
///
/// A missing `activity_name` is derived with `mode`; a missing `start`
/// becomes `now` (epoch seconds).
pub fn parse_line(
    line: &str,
    mode: &ActivityNameMode,
    now: i64,
) -> Result<Option<FeedCommand>, serde_json::Error> {
    let line = line.trim();
    if line.is_empty() {
        return Ok(None);
    }

    let command = match serde_json::from_str::<FeedLine>(line)? {
        FeedLine::Clear => FeedCommand::Clear,
        FeedLine::Update(u) => {
            let activity_name = u
                .activity_name
                .unwrap_or_else(|| mode.label(&u.title, &u.artist, u.album.as_deref()));
            FeedCommand::Publish(PresenceUpdate {
                title: u.title,
                artist: u.artist,
                album: u.album,
                start: u.start.unwrap_or(now),
                end: u.end,
                art_url: u.art_url,
                activity_name,
            })
        }
    };
    Ok(Some(command))
}

/// Current time in epoch seconds.
pub fn now_epoch_secs() -> i64 {
    chrono::Utc::now().timestamp()
}

#[cfg(test)]
mod tests {
    use super::*;

    const NOW: i64 = 1_700_000_000;

    fn parse(line: &str, mode: &ActivityNameMode) -> FeedCommand {
        parse_line(line, mode, NOW).unwrap().unwrap()
    }

    #[test]
    fn parses_full_update() {
        let line = r#"{"type":"update","title":"Song A","artist":"Band B","album":"Record C","start":1000,"end":1180,"art_url":"https://art.test/1.jpg","activity_name":"Navidrome"}"#;
        let expected = PresenceUpdate::new("Song A", "Band B", 1000)
            .with_album("Record C")
            .with_end(1180)
            .with_art_url("https://art.test/1.jpg")
            .with_activity_name("Navidrome");
        assert_eq!(
            parse(line, &ActivityNameMode::Artist),
            FeedCommand::Publish(expected)
        );
    }

    #[test]
    fn missing_fields_use_defaults() {
        let line = r#"{"type":"update","title":"Song A","artist":"Band B","album":"Record C"}"#;
        match parse(line, &ActivityNameMode::Album) {
            FeedCommand::Publish(update) => {
                assert_eq!(update.start, NOW);
                assert_eq!(update.end, None);
                assert_eq!(update.art_url, None);
                assert_eq!(update.activity_name, "Record C");
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn parses_clear() {
        assert_eq!(
            parse(r#"{"type":"clear"}"#, &ActivityNameMode::Artist),
            FeedCommand::Clear
        );
    }

    #[test]
    fn blank_lines_are_skipped() {
        assert_eq!(parse_line("   ", &ActivityNameMode::Artist, NOW).unwrap(), None);
    }

    #[test]
    fn malformed_lines_are_errors() {
        let mode = ActivityNameMode::Artist;
        assert!(parse_line("not json", &mode, NOW).is_err());
        assert!(parse_line(r#"{"type":"pause"}"#, &mode, NOW).is_err());
        assert!(parse_line(r#"{"type":"update","title":"Song A"}"#, &mode, NOW).is_err());
    }

    #[test]
    fn clock_is_plausible() {
        assert!(now_epoch_secs() > NOW);
    }
}
