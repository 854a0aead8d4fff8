use crate::*;
use pfc_core::*;
use pfc_store::IndexTerms;
use pfc_store::Pack;
use serde::Deserialize;
use serde::Serialize;
use std::collections::BTreeMap;

/// Where a game came from: PGN file basename, game number within it, and
/// the byte offset at which the next game starts.
#[derive(Clone, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
pub struct GameReference {
    pub file: String,
    pub game: String,
    pub offset: u64,
}

/// Imported PGN game headers.
///
/// The full tag map is kept; the tags of interest for selection are
/// Result, Date, TimeControl, and Mode, plus the tags naming the event
/// and the two players. Games are immutable once inserted.
#[derive(Clone, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
pub struct Game {
    pub reference: GameReference,
    pub headers: BTreeMap<String, String>,
}

impl Game {
    pub fn new(file: &str, game: &str, offset: u64, headers: BTreeMap<String, String>) -> Self {
        Self {
            reference: GameReference {
                file: file.to_string(),
                game: game.to_string(),
                offset,
            },
            headers,
        }
    }

    pub fn decode(raw: &str) -> Outcome<Self> {
        decode_json(raw, "game record")
    }

    fn tag(&self, name: &str) -> Option<&str> {
        self.headers.get(name).map(String::as_str)
    }

    pub fn result(&self) -> Option<&str> {
        self.tag(TAG_RESULT)
    }

    /// True if the Result tag names a win, draw, or loss.
    pub fn has_reportable_result(&self) -> bool {
        self.result()
            .map(|result| WIN_DRAW_LOSS.contains(&result))
            .unwrap_or(false)
    }

    fn side_key(&self, name: &str, team: &str, fideid: &str) -> String {
        encode_json(&(
            self.tag(name),
            self.tag(TAG_EVENT),
            self.tag(TAG_EVENTDATE),
            self.tag(TAG_SECTION),
            self.tag(TAG_STAGE),
            self.tag(team),
            self.tag(fideid),
        ))
    }

    /// Player-side key for the white pieces.
    pub fn white_key(&self) -> String {
        self.side_key(TAG_WHITE, TAG_WHITETEAM, TAG_WHITEFIDEID)
    }

    /// Player-side key for the black pieces.
    pub fn black_key(&self) -> String {
        self.side_key(TAG_BLACK, TAG_BLACKTEAM, TAG_BLACKFIDEID)
    }

    /// Event key shared by every game of the same event.
    pub fn event_key(&self) -> String {
        encode_json(&(
            self.tag(TAG_EVENT),
            self.tag(TAG_EVENTDATE),
            self.tag(TAG_SECTION),
            self.tag(TAG_STAGE),
        ))
    }
}

impl Pack for Game {
    fn value(&self) -> String {
        encode_json(self)
    }

    fn index(&self) -> IndexTerms {
        let mut terms = vec![
            (GAME_PGNFILE_INDEX, vec![self.reference.file.clone()]),
            (GAME_NUMBER_INDEX, vec![self.reference.game.clone()]),
            (
                GAME_PLAYER_INDEX,
                vec![self.black_key(), self.white_key()],
            ),
            (GAME_EVENT_INDEX, vec![self.event_key()]),
        ];
        for (tag, index) in [
            (TAG_DATE, GAME_DATE_INDEX),
            (TAG_TIMECONTROL, GAME_TIMECONTROL_INDEX),
            (TAG_MODE, GAME_MODE_INDEX),
        ] {
            if let Some(value) = self.tag(tag) {
                terms.push((index, vec![value.to_string()]));
            }
        }
        terms
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn headers(pairs: &[(&str, &str)]) -> BTreeMap<String, String> {
        pairs
            .iter()
            .map(|(tag, value)| (tag.to_string(), value.to_string()))
            .collect()
    }

    fn game() -> Game {
        Game::new(
            "club.pgn",
            "1",
            240,
            headers(&[
                (TAG_EVENT, "Club Championship"),
                (TAG_EVENTDATE, "2024.01.01"),
                (TAG_DATE, "2024.01.06"),
                (TAG_WHITE, "Smith, J"),
                (TAG_BLACK, "Jones, K"),
                (TAG_RESULT, "1-0"),
                (TAG_TIMECONTROL, "5400+30"),
            ]),
        )
    }

    #[test]
    fn side_keys_carry_the_seven_components() {
        let white = game().white_key();
        let parsed: PlayerTuple = serde_json::from_str(&white).unwrap();
        assert_eq!(parsed.0.as_deref(), Some("Smith, J"));
        assert_eq!(parsed.1.as_deref(), Some("Club Championship"));
        assert_eq!(parsed.5, None);
        assert_eq!(parsed.6, None);
        assert_ne!(white, game().black_key());
    }

    #[test]
    fn index_terms_skip_absent_tags() {
        let terms = game().index();
        let names: Vec<&str> = terms.iter().map(|(index, _)| *index).collect();
        assert!(names.contains(&GAME_DATE_INDEX));
        assert!(names.contains(&GAME_TIMECONTROL_INDEX));
        assert!(!names.contains(&GAME_MODE_INDEX));
        let players = terms
            .iter()
            .find(|(index, _)| *index == GAME_PLAYER_INDEX)
            .map(|(_, keys)| keys.len());
        assert_eq!(players, Some(2));
    }

    #[test]
    fn reportable_results_are_the_three_outcomes() {
        let mut game = game();
        assert!(game.has_reportable_result());
        game.headers.insert(TAG_RESULT.to_string(), "*".to_string());
        assert!(!game.has_reportable_result());
        game.headers.remove(TAG_RESULT);
        assert!(!game.has_reportable_result());
    }

    #[test]
    fn record_round_trips_through_serialization() {
        let game = game();
        let raw = game.value();
        assert_eq!(Game::decode(&raw).unwrap(), game);
    }
}
