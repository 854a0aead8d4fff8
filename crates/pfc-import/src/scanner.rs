//! Tag-pair extraction.
//!
//! Yields one (tag map, byte offset) pair per game. Only the tag section
//! is interpreted; movetext is consumed untouched. The offset is the byte
//! position at which the next game starts, so a reader can resume there.

use std::collections::BTreeMap;

/// Tag pairs of one game plus the byte offset of the next game.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct TagPairs {
    pub tags: BTreeMap<String, String>,
    pub offset: u64,
}

/// Iterator over the games of one PGN text.
pub struct GameScanner<'a> {
    text: &'a str,
    position: usize,
}

impl<'a> GameScanner<'a> {
    pub fn new(text: &'a str) -> Self {
        Self { text, position: 0 }
    }

    /// Next line with the byte position just past it.
    fn next_line(&mut self) -> Option<(&'a str, usize)> {
        if self.position >= self.text.len() {
            return None;
        }
        let rest = &self.text[self.position..];
        let end = rest
            .find('\n')
            .map(|at| self.position + at + 1)
            .unwrap_or(self.text.len());
        let line = self.text[self.position..end].trim_end_matches(['\n', '\r']);
        let start = self.position;
        self.position = end;
        Some((line, start))
    }
}

impl Iterator for GameScanner<'_> {
    type Item = TagPairs;

    fn next(&mut self) -> Option<TagPairs> {
        let mut tags = BTreeMap::new();
        let mut in_movetext = false;
        loop {
            let mark = self.position;
            let Some((line, _)) = self.next_line() else {
                break;
            };
            match parse_tag_pair(line) {
                Some((name, value)) => {
                    if in_movetext {
                        // First tag of the next game; rewind to it.
                        self.position = mark;
                        break;
                    }
                    tags.insert(name, value);
                }
                None => {
                    if !line.trim().is_empty() && !tags.is_empty() {
                        in_movetext = true;
                    }
                }
            }
        }
        if tags.is_empty() {
            None
        } else {
            Some(TagPairs {
                tags,
                offset: self.position as u64,
            })
        }
    }
}

/// Parse one `[Name "value"]` line; None if the line is not a tag pair.
fn parse_tag_pair(line: &str) -> Option<(String, String)> {
    let line = line.trim();
    let inner = line.strip_prefix('[')?.strip_suffix(']')?;
    let name_end = inner.find(|c: char| c.is_whitespace())?;
    let name = &inner[..name_end];
    if name.is_empty() || !name.chars().all(|c| c.is_ascii_alphanumeric() || c == '_') {
        return None;
    }
    let rest = inner[name_end..].trim_start();
    let rest = rest.strip_prefix('"')?;
    let mut value = String::new();
    let mut characters = rest.chars();
    loop {
        match characters.next()? {
            '\\' => match characters.next()? {
                '"' => value.push('"'),
                '\\' => value.push('\\'),
                other => {
                    value.push('\\');
                    value.push(other);
                }
            },
            '"' => break,
            other => value.push(other),
        }
    }
    if !characters.as_str().trim().is_empty() {
        return None;
    }
    Some((name.to_string(), value))
}
