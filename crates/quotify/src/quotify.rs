// Copyright (C) 2025 Micah R Ledbetter
// SPDX-License-Identifier: Apache-2.0

#![warn(missing_docs)]

//! This library provides the joke-making function of the
//! [salaciouspatronym](https://github.com/mrled/salaciouspatronym) project.
//!
//! u see, the joke is that if you put something in quotes, it makes it sound
//! dirty:
//!
//! ```rust
//! assert_eq!(quotify::quotify("Ada Lovelace", false, "").unwrap(),
//!            "Ada's \"Lovelace\"");
//! assert_eq!(quotify::quotify("Jens Stoltenberg", false, "").unwrap(),
//!            "Jens' \"Stoltenberg\"");
//! assert_eq!(quotify::quotify("Prince", false, "").unwrap(),
//!            "\"Prince\", lol");
//! ```

use rand::seq::SliceRandom;
use thiserror::Error;

/// The decoration symbols appended when an emoji is requested.
pub const SEXTEMOJI: [&str; 8] = ["🍆", "💦", "🍑", "😏", "🤤", "👉👌", "♋", "😳"];

/// The joke-making error.
#[derive(Error, Debug, PartialEq, Eq)]
pub enum Error {
    /// The input string was empty.
    #[error("u can't make joek without sum nput dude")]
    EmptyInput,
}

/// Pick a decoration symbol uniformly at random.
pub fn random_emoji() -> &'static str {
    SEXTEMOJI
        .choose(&mut rand::thread_rng())
        .expect("the symbol set is not empty")
}

/// Make a morally bankrupt joke from an input string.
///
/// The input is split on single space characters, so consecutive spaces
/// yield empty tokens that are kept as-is. A single-token input becomes
/// `"<input>", lol`; otherwise the first token gets a possessive suffix
/// (a bare apostrophe when it already ends in `s`) and the remaining
/// tokens are quoted. When `emoji` is set, a random symbol from
/// [SEXTEMOJI] is appended. A non-empty `after_newline` is appended on
/// its own line.
pub fn quotify(input: &str, emoji: bool, after_newline: &str) -> Result<String, Error> {
    if input.is_empty() {
        return Err(Error::EmptyInput);
    }
    let split: Vec<&str> = input.split(' ').collect();
    let mut output = if split.len() == 1 {
        format!("\"{}\", lol", input)
    } else {
        let fname = split[0];
        let possessive = if fname.ends_with('s') { "'" } else { "'s" };
        let lname = split[1..].join(" ");
        format!("{}{} \"{}\"", fname, possessive, lname)
    };

    if emoji {
        output.push(' ');
        output.push_str(random_emoji());
    }

    if !after_newline.is_empty() {
        output.push('\n');
        output.push_str(after_newline);
    }

    Ok(output)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_single_token() {
        assert_eq!(quotify("Prince", false, "").unwrap(), "\"Prince\", lol");
    }

    #[test]
    fn test_possessive() {
        assert_eq!(
            quotify("Ada Lovelace", false, "").unwrap(),
            "Ada's \"Lovelace\""
        );
    }

    #[test]
    fn test_possessive_trailing_s() {
        assert_eq!(
            quotify("Jens Stoltenberg", false, "").unwrap(),
            "Jens' \"Stoltenberg\""
        );
    }

    #[test]
    fn test_three_tokens() {
        assert_eq!(
            quotify("Martin Luther King", false, "").unwrap(),
            "Martin's \"Luther King\""
        );
    }

    #[test]
    fn test_consecutive_spaces_kept() {
        // Literal split semantics: the empty token survives the rejoin.
        assert_eq!(quotify("Ada  Lovelace", false, "").unwrap(), "Ada's \" Lovelace\"");
    }

    #[test]
    fn test_empty_input() {
        assert_eq!(quotify("", false, ""), Err(Error::EmptyInput));
    }

    #[test]
    fn test_after_newline() {
        assert_eq!(
            quotify("Ada Lovelace", false, "https://en.wikipedia.org/wiki/Ada_Lovelace").unwrap(),
            "Ada's \"Lovelace\"\nhttps://en.wikipedia.org/wiki/Ada_Lovelace"
        );
    }

    #[test]
    fn test_emoji_suffix() {
        let output = quotify("Ada Lovelace", true, "").unwrap();
        assert!(
            SEXTEMOJI
                .iter()
                .any(|emoji| output == format!("Ada's \"Lovelace\" {}", emoji)),
            "unexpected output: {}",
            output
        );
    }

    #[test]
    fn test_emoji_before_after_newline() {
        let output = quotify("Ada Lovelace", true, "https://example.com").unwrap();
        let (joke, annotation) = output.split_once('\n').unwrap();
        assert_eq!(annotation, "https://example.com");
        assert!(SEXTEMOJI.iter().any(|emoji| joke.ends_with(emoji)));
    }

    #[test]
    fn test_emoji_distribution() {
        let mut counts = std::collections::HashMap::new();
        for _ in 0..4000 {
            *counts.entry(random_emoji()).or_insert(0usize) += 1;
        }
        assert_eq!(counts.len(), SEXTEMOJI.len());
        for (emoji, count) in counts {
            // 4000 uniform draws over 8 symbols expect 500 each; a count
            // outside 350..650 is over 7 sigmas away.
            assert!(
                (350..650).contains(&count),
                "{} appeared {} times",
                emoji,
                count
            );
        }
    }
}
