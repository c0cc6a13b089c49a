//! Section-oriented key/value text codec.
//!
//! Reads `[section]` headers followed by `key = value` (or `key: value`)
//! lines. Full-line `#`/`;` comments and blank lines are skipped, indented
//! lines continue the previous value, and keys are lower-cased. Writing emits
//! `key = value` pairs with a blank line after every section.

/// A parse failure with its one-based line number.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct ParseError {
    pub(crate) line: usize,
    pub(crate) reason: &'static str,
}

/// A named block of ordered key/value entries.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct IniSection {
    name: String,
    entries: Vec<(String, String)>,
}

impl IniSection {
    pub(crate) fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            entries: Vec::new(),
        }
    }

    pub(crate) fn name(&self) -> &str {
        &self.name
    }

    pub(crate) fn get(&self, key: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|(existing, _)| existing == key)
            .map(|(_, value)| value.as_str())
    }

    /// Replace the value of `key` in place, or append it when absent.
    pub(crate) fn set(&mut self, key: &str, value: impl Into<String>) {
        let value = value.into();
        if let Some(entry) = self.entries.iter_mut().find(|(existing, _)| existing == key) {
            entry.1 = value;
        } else {
            self.entries.push((key.to_string(), value));
        }
    }

    pub(crate) fn entries(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries
            .iter()
            .map(|(key, value)| (key.as_str(), value.as_str()))
    }

    pub(crate) fn render(&self) -> String {
        let mut out = format!("[{}]\n", self.name);
        for (key, value) in &self.entries {
            if value.is_empty() {
                out.push_str(key);
                out.push_str(" =\n");
            } else {
                out.push_str(key);
                out.push_str(" = ");
                out.push_str(&value.replace('\n', "\n\t"));
                out.push('\n');
            }
        }
        out.push('\n');
        out
    }
}

/// Ordered collection of sections.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub(crate) struct IniDocument {
    sections: Vec<IniSection>,
}

impl IniDocument {
    pub(crate) fn parse(text: &str) -> Result<Self, ParseError> {
        let mut document = Self::default();
        // Key of the last entry in the current section; continuation target.
        let mut last_key: Option<String> = None;

        for (index, raw) in text.lines().enumerate() {
            let line_no = index + 1;
            let line = raw.trim_end_matches('\r');
            let trimmed = line.trim();

            if trimmed.is_empty() {
                last_key = None;
                continue;
            }
            if trimmed.starts_with('#') || trimmed.starts_with(';') {
                continue;
            }

            let indented = line.starts_with(char::is_whitespace);
            if indented {
                if let (Some(key), Some(section)) = (&last_key, document.sections.last_mut()) {
                    if let Some(entry) = section
                        .entries
                        .iter_mut()
                        .find(|(existing, _)| existing == key)
                    {
                        entry.1.push('\n');
                        entry.1.push_str(trimmed);
                        continue;
                    }
                }
            }

            if let Some(rest) = trimmed.strip_prefix('[') {
                let name = rest.strip_suffix(']').ok_or(ParseError {
                    line: line_no,
                    reason: "unterminated section header",
                })?;
                if name.is_empty() {
                    return Err(ParseError {
                        line: line_no,
                        reason: "empty section name",
                    });
                }
                if document.contains(name) {
                    return Err(ParseError {
                        line: line_no,
                        reason: "duplicate section",
                    });
                }
                document.sections.push(IniSection::new(name));
                last_key = None;
                continue;
            }

            let Some(section) = document.sections.last_mut() else {
                return Err(ParseError {
                    line: line_no,
                    reason: "entry outside of a section",
                });
            };
            let (key, value) = split_entry(trimmed).ok_or(ParseError {
                line: line_no,
                reason: "expected key and value",
            })?;
            if section.get(&key).is_some() {
                return Err(ParseError {
                    line: line_no,
                    reason: "duplicate option",
                });
            }
            section.entries.push((key.clone(), value.to_string()));
            last_key = Some(key);
        }

        Ok(document)
    }

    pub(crate) fn render(&self) -> String {
        self.sections.iter().map(IniSection::render).collect()
    }

    pub(crate) fn sections(&self) -> &[IniSection] {
        &self.sections
    }

    pub(crate) fn contains(&self, name: &str) -> bool {
        self.section(name).is_some()
    }

    pub(crate) fn section(&self, name: &str) -> Option<&IniSection> {
        self.sections.iter().find(|section| section.name == name)
    }

    pub(crate) fn section_mut(&mut self, name: &str) -> Option<&mut IniSection> {
        self.sections.iter_mut().find(|section| section.name == name)
    }

    pub(crate) fn remove_section(&mut self, name: &str) -> bool {
        let before = self.sections.len();
        self.sections.retain(|section| section.name != name);
        self.sections.len() != before
    }
}

/// Split `key = value` or `key: value` at whichever delimiter comes first.
fn split_entry(line: &str) -> Option<(String, &str)> {
    let at = line.find(['=', ':'])?;
    let key = line[..at].trim();
    if key.is_empty() {
        return None;
    }
    Some((key.to_lowercase(), line[at + 1..].trim()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_sections_in_file_order() {
        let text = "[office]\ntype = opus\nname = office\n\n[music]\ntype=opus\nsignal: music\n";
        let document = IniDocument::parse(text).expect("document should parse");
        let names: Vec<&str> = document.sections().iter().map(IniSection::name).collect();
        assert_eq!(names, ["office", "music"]);
        let music = document.section("music").expect("music section");
        assert_eq!(music.get("type"), Some("opus"));
        assert_eq!(music.get("signal"), Some("music"));
    }

    #[test]
    fn skips_comments_and_lowercases_keys() {
        let text = "; managed by hand\n[office]\n# note\nPacket_Loss = 10\n";
        let document = IniDocument::parse(text).expect("document should parse");
        let office = document.section("office").expect("office section");
        assert_eq!(office.get("packet_loss"), Some("10"));
    }

    #[test]
    fn joins_indented_continuation_lines() {
        let text = "[office]\nnote = first\n  second\nbitrate = 6000\n";
        let document = IniDocument::parse(text).expect("document should parse");
        let office = document.section("office").expect("office section");
        assert_eq!(office.get("note"), Some("first\nsecond"));
        assert_eq!(office.get("bitrate"), Some("6000"));
    }

    #[test]
    fn rejects_structural_errors() {
        let cases = [
            ("type = opus\n", 1, "entry outside of a section"),
            ("[office\n", 1, "unterminated section header"),
            ("[]\n", 1, "empty section name"),
            ("[a]\n[a]\n", 2, "duplicate section"),
            ("[a]\nfec = yes\nfec = no\n", 3, "duplicate option"),
            ("[a]\njust-a-word\n", 2, "expected key and value"),
        ];
        for (text, line, reason) in cases {
            let err = IniDocument::parse(text).expect_err(text);
            assert_eq!(err, ParseError { line, reason }, "input: {text:?}");
        }
    }

    #[test]
    fn render_matches_expected_layout() {
        let mut section = IniSection::new("office");
        section.set("type", "opus");
        section.set("name", "office");
        section.set("note", "first\nsecond");
        section.set("empty", "");
        assert_eq!(
            section.render(),
            "[office]\ntype = opus\nname = office\nnote = first\n\tsecond\nempty =\n\n"
        );
    }

    #[test]
    fn rendered_document_parses_back() {
        let text = "[office]\ntype = opus\nnote = first\n\tsecond\n\n[music]\ntype = opus\n\n";
        let document = IniDocument::parse(text).expect("document should parse");
        assert_eq!(document.render(), text);
    }

    #[test]
    fn set_replaces_in_place_and_remove_reports_presence() {
        let mut document = IniDocument::parse("[a]\nfec = yes\ndtx = no\n\n[b]\n")
            .expect("document should parse");
        let section = document.section_mut("a").expect("section a");
        section.set("fec", "no");
        let entries: Vec<(&str, &str)> = section.entries().collect();
        assert_eq!(entries, [("fec", "no"), ("dtx", "no")]);

        assert!(document.remove_section("b"));
        assert!(!document.remove_section("b"));
        assert_eq!(document.sections().len(), 1);
    }
}
