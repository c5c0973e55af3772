//! Extraction of structured fields from raw server replies.
//!
//! The server answers in free text; these helpers pull out the few values the
//! harness actually acts on. All functions are total. Malformed input yields
//! `None` (or `false`), never a panic, so polling callers can keep retrying
//! until a reply of the right shape arrives.

/// Marker prefix of a failed-command reply.
pub const ERROR_MARKER: &str = "ERROR";

/// Number of cards in a turn snapshot. The scripted game plays exactly one
/// card per turn, so this is also the number of turns.
pub const TURN_CARD_COUNT: usize = 5;

/// Width of a single card code in characters.
const CARD_CODE_LEN: usize = 2;

/// Keyword that introduces the card line of a `game state` reply.
const CARDS_KEYWORD: &str = "cards";

/// Returns `true` iff `text` is a failed-command reply.
pub fn is_error(text: &str) -> bool {
    text.starts_with(ERROR_MARKER)
}

/// Extracts the first table handle from a `table list` reply.
///
/// Listing lines lead with the handle token, separated from the rest of the
/// line by whitespace. Returns `None` for empty input, pure whitespace, or an
/// error reply.
pub fn extract_table_handle(text: &str) -> Option<&str> {
    if is_error(text) {
        return None;
    }
    text.lines()
        .find_map(|line| line.split_whitespace().next())
}

/// Extracts the five card codes from a `game state` reply.
///
/// Matches a line of the shape `cards c1 c2 c3 c4 c5` where every code is
/// exactly two characters wide. Any other reply shape, such as the status
/// line the server sends while the game has not started yet, yields `None`.
pub fn extract_turn_cards(text: &str) -> Option<[String; TURN_CARD_COUNT]> {
    for line in text.lines() {
        let mut tokens = line.split_whitespace();
        if tokens.next() != Some(CARDS_KEYWORD) {
            continue;
        }
        let codes: Vec<&str> = tokens.collect();
        if codes.len() == TURN_CARD_COUNT
            && codes.iter().all(|code| code.chars().count() == CARD_CODE_LEN)
        {
            let cards: Vec<String> = codes.iter().map(|code| (*code).to_owned()).collect();
            return cards.try_into().ok();
        }
    }
    None
}

// ******************************************************************************************
// ************************************* UNIT TESTS *****************************************
// ******************************************************************************************

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn detects_error_replies() {
        assert!(is_error("ERROR not your turn"));
        assert!(is_error("ERROR"));
        assert!(!is_error("OK"));
        assert!(!is_error(""));
        assert!(!is_error("an ERROR in the middle does not count"));
    }

    #[test]
    fn extracts_table_handle_from_listing() {
        assert_eq!(extract_table_handle("7f3a\tOpen\n"), Some("7f3a"));
        assert_eq!(extract_table_handle("7f3a Open 2/4\nb2c1 Open 0/4\n"), Some("7f3a"));
    }

    #[test]
    fn table_handle_absent_for_malformed_input() {
        assert_eq!(extract_table_handle(""), None);
        assert_eq!(extract_table_handle("\n"), None);
        assert_eq!(extract_table_handle("   \n   \n"), None);
        assert_eq!(extract_table_handle("ERROR no tables"), None);
    }

    #[test]
    fn extracts_five_turn_cards() {
        assert_eq!(
            extract_turn_cards("cards ab cd ef gh ij"),
            Some(["ab", "cd", "ef", "gh", "ij"].map(String::from))
        );
    }

    #[test]
    fn turn_cards_found_on_later_lines() {
        assert_eq!(
            extract_turn_cards("turn 1\ncards qa kb jc td 9h\n"),
            Some(["qa", "kb", "jc", "td", "9h"].map(String::from))
        );
    }

    #[test]
    fn turn_cards_absent_for_malformed_input() {
        assert_eq!(extract_turn_cards(""), None);
        assert_eq!(extract_turn_cards("waiting for players"), None);
        // Wrong count.
        assert_eq!(extract_turn_cards("cards ab cd ef gh"), None);
        assert_eq!(extract_turn_cards("cards ab cd ef gh ij kl"), None);
        // Wrong code width.
        assert_eq!(extract_turn_cards("cards abc cd ef gh ij"), None);
        assert_eq!(extract_turn_cards("cards a cd ef gh ij"), None);
        // Keyword must lead the line.
        assert_eq!(extract_turn_cards("your cards ab cd ef gh ij"), None);
    }
}
