use crate::error::NameListError;
use log::debug;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

const LINE_SEPARATOR: char = '|';
const COMMENT_PREFIX: char = '#';
const FALLBACK_SLUG: &str = "guest";

/// One recipient: the name as supplied, its display lines and the identifier
/// its output document is filed under.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NameEntry {
    raw_name: String,
    display_lines: Vec<String>,
    output_id: String,
    index: usize,
}

impl NameEntry {
    pub fn raw_name(&self) -> &str {
        &self.raw_name
    }

    /// The lines stacked on the page, top to bottom. Never empty.
    pub fn display_lines(&self) -> &[String] {
        &self.display_lines
    }

    pub fn output_id(&self) -> &str {
        &self.output_id
    }

    /// Zero-based position in the list the entry came from.
    pub fn index(&self) -> usize {
        self.index
    }
}

/// An ordered, non-empty list of recipients with unique output ids.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NameList {
    entries: Vec<NameEntry>,
}

/// A JSON recipient: a single string or an array of display lines.
#[derive(Deserialize)]
#[serde(untagged)]
enum JsonName {
    Single(String),
    Lines(Vec<String>),
}

impl NameList {
    /// Parses a plain-text roster: one recipient per line, `|` between the
    /// display lines of one recipient, blank lines and `#` comments skipped.
    pub fn parse(source: &str) -> Result<Self, NameListError> {
        let mut builder = Builder::default();
        for (line_no, line) in source.lines().enumerate() {
            let trimmed = line.trim();
            if trimmed.is_empty() || trimmed.starts_with(COMMENT_PREFIX) {
                continue;
            }
            let lines = trimmed.split(LINE_SEPARATOR).map(str::to_string).collect();
            builder.push(trimmed.to_string(), lines, line_no + 1)?;
        }
        builder.finish()
    }

    /// Parses a JSON array whose items are strings or arrays of lines.
    pub fn from_json(json: &str) -> Result<Self, NameListError> {
        let items: Vec<JsonName> = serde_json::from_str(json)?;
        let mut builder = Builder::default();
        for (i, item) in items.into_iter().enumerate() {
            let (raw, lines) = match item {
                JsonName::Single(raw) => {
                    let lines = split_display_lines(&raw);
                    (raw, lines)
                }
                JsonName::Lines(lines) => (lines.join("\n"), lines),
            };
            builder.push(raw, lines, i + 1)?;
        }
        builder.finish()
    }

    /// Builds a list from raw names, splitting each on newlines and `|`.
    pub fn from_names<I, S>(names: I) -> Result<Self, NameListError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut builder = Builder::default();
        for (i, name) in names.into_iter().enumerate() {
            let raw = name.as_ref();
            builder.push(raw.to_string(), split_display_lines(raw), i + 1)?;
        }
        builder.finish()
    }

    pub fn entries(&self) -> &[NameEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, NameEntry> {
        self.entries.iter()
    }

    pub fn into_entries(self) -> Vec<NameEntry> {
        self.entries
    }
}

impl IntoIterator for NameList {
    type Item = NameEntry;
    type IntoIter = std::vec::IntoIter<NameEntry>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.into_iter()
    }
}

impl<'a> IntoIterator for &'a NameList {
    type Item = &'a NameEntry;
    type IntoIter = std::slice::Iter<'a, NameEntry>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}

fn split_display_lines(raw: &str) -> Vec<String> {
    raw.split(['\n', LINE_SEPARATOR]).map(str::to_string).collect()
}

/// Accumulates entries and hands out `<slug>-<occurrence>` ids.
#[derive(Default)]
struct Builder {
    entries: Vec<NameEntry>,
    occurrences: HashMap<String, usize>,
}

impl Builder {
    fn push(
        &mut self,
        raw_name: String,
        lines: Vec<String>,
        position: usize,
    ) -> Result<(), NameListError> {
        let display_lines: Vec<String> = lines
            .iter()
            .map(|line| line.trim())
            .filter(|line| !line.is_empty())
            .map(str::to_string)
            .collect();
        if display_lines.is_empty() {
            return Err(NameListError::EmptyName { position });
        }

        let mut base = slug::slugify(display_lines.join(" "));
        if base.is_empty() {
            base = FALLBACK_SLUG.to_string();
        }
        let count = self.occurrences.entry(base.clone()).or_insert(0);
        *count += 1;
        let output_id = format!("{}-{}", base, count);

        self.entries.push(NameEntry {
            raw_name,
            display_lines,
            output_id,
            index: self.entries.len(),
        });
        Ok(())
    }

    fn finish(self) -> Result<NameList, NameListError> {
        if self.entries.is_empty() {
            return Err(NameListError::NoRecipients);
        }
        debug!("Name list holds {} recipients", self.entries.len());
        Ok(NameList {
            entries: self.entries,
        })
    }
}
