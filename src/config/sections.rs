//! Lightweight tokenizer/writer for WireGuard config text.
//!
//! Turns the file into ordered raw sections and back. Comment lines are kept
//! so a load/save cycle does not lose them; the first comment of a `[Peer]`
//! section is surfaced as a `Name` entry with its marker intact.
//!
//! Comment lines directly above a header stay with the section before it
//! (or the preamble), so they never displace a peer's name.

use crate::error::{ConfigError, Result};

/// Pseudo-key under which a peer's name comment is surfaced
pub const NAME_KEY: &str = "Name";

/// One line of a section
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Entry {
    Field { key: String, value: String },
    Comment(String),
}

/// Ordered entries of one `[Interface]` or `[Peer]` section
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Section {
    entries: Vec<Entry>,
}

impl Section {
    pub fn new() -> Self {
        Self::default()
    }

    /// First value of `key`. Keys are matched case-insensitively.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.fields()
            .find(|(k, _)| k.eq_ignore_ascii_case(key))
            .map(|(_, v)| v)
    }

    /// Replace the value of `key` in place, or append it if absent
    pub fn set(&mut self, key: &str, value: impl Into<String>) {
        let value = value.into();
        for entry in &mut self.entries {
            if let Entry::Field { key: k, value: v } = entry {
                if k.eq_ignore_ascii_case(key) {
                    *v = value;
                    return;
                }
            }
        }
        self.push_field(key, value);
    }

    /// Remove every field named `key`
    pub fn remove(&mut self, key: &str) {
        self.entries.retain(|entry| match entry {
            Entry::Field { key: k, .. } => !k.eq_ignore_ascii_case(key),
            Entry::Comment(_) => true,
        });
    }

    pub fn push_field(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.entries.push(Entry::Field {
            key: key.into(),
            value: value.into(),
        });
    }

    pub fn push_comment(&mut self, text: impl Into<String>) {
        self.entries.push(Entry::Comment(text.into()));
    }

    pub fn entries(&self) -> &[Entry] {
        &self.entries
    }

    /// Key/value pairs in file order, comments skipped
    pub fn fields(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().filter_map(|entry| match entry {
            Entry::Field { key, value } => Some((key.as_str(), value.as_str())),
            Entry::Comment(_) => None,
        })
    }

    pub fn comments(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().filter_map(|entry| match entry {
            Entry::Comment(text) => Some(text.as_str()),
            Entry::Field { .. } => None,
        })
    }
}

/// A whole config file in raw form
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawConfig {
    /// Comment lines before the first section
    pub preamble: Vec<String>,
    pub interface: Section,
    pub peers: Vec<Section>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum SectionKind {
    Interface,
    Peer,
    Unknown,
}

fn is_comment(line: &str) -> bool {
    line.starts_with('#') || line.starts_with(';')
}

/// Add a comment to a section being built. The first comment of a peer
/// becomes its name.
fn attach_comment(kind: SectionKind, section: &mut Section, text: String) {
    if kind == SectionKind::Peer && section.get(NAME_KEY).is_none() {
        section.push_field(NAME_KEY, text);
    } else {
        section.push_comment(text);
    }
}

/// Split config text into raw sections
pub fn parse_sections(content: &str) -> Result<RawConfig> {
    let mut preamble = Vec::new();
    let mut interface: Option<Section> = None;
    let mut peers = Vec::new();

    let mut current: Option<(SectionKind, Section)> = None;
    // Comments not yet attached to the current section
    let mut pending: Vec<String> = Vec::new();

    fn flush(
        pending: &mut Vec<String>,
        current: &mut Option<(SectionKind, Section)>,
        preamble: &mut Vec<String>,
    ) {
        match current {
            Some((kind, section)) => {
                for text in pending.drain(..) {
                    attach_comment(*kind, section, text);
                }
            }
            None => preamble.append(pending),
        }
    }

    fn finish(
        current: Option<(SectionKind, Section)>,
        interface: &mut Option<Section>,
        peers: &mut Vec<Section>,
    ) -> Result<()> {
        match current {
            Some((SectionKind::Interface, section)) => {
                if interface.is_some() {
                    return Err(ConfigError::Parse("more than one [Interface] section".into()).into());
                }
                *interface = Some(section);
            }
            Some((SectionKind::Peer, section)) => peers.push(section),
            Some((SectionKind::Unknown, _)) | None => {}
        }
        Ok(())
    }

    for (idx, raw_line) in content.lines().enumerate() {
        let line_no = idx + 1;
        let line = raw_line.trim();

        if line.is_empty() {
            flush(&mut pending, &mut current, &mut preamble);
            continue;
        }

        // Trailing whitespace of a comment can be part of a peer name
        if is_comment(line) {
            pending.push(raw_line.trim_start().to_string());
            continue;
        }

        if line.starts_with('[') && line.ends_with(']') {
            match current.as_mut() {
                Some((_, section)) => {
                    for text in pending.drain(..) {
                        section.push_comment(text);
                    }
                }
                None => preamble.append(&mut pending),
            }
            finish(current.take(), &mut interface, &mut peers)?;

            let kind = if line.eq_ignore_ascii_case("[Interface]") {
                SectionKind::Interface
            } else if line.eq_ignore_ascii_case("[Peer]") {
                SectionKind::Peer
            } else {
                tracing::warn!("Ignoring unknown section {} on line {}", line, line_no);
                SectionKind::Unknown
            };

            current = Some((kind, Section::new()));
            continue;
        }

        let (key, value) = line
            .split_once('=')
            .ok_or_else(|| ConfigError::Parse(format!("line {}: expected 'key = value'", line_no)))?;

        flush(&mut pending, &mut current, &mut preamble);
        match current.as_mut() {
            Some((_, section)) => section.push_field(key.trim(), value.trim()),
            None => {
                return Err(ConfigError::Parse(format!(
                    "line {}: field outside of any section",
                    line_no
                ))
                .into())
            }
        }
    }

    flush(&mut pending, &mut current, &mut preamble);
    finish(current, &mut interface, &mut peers)?;

    let interface = interface.ok_or(ConfigError::MissingField("Interface section"))?;

    tracing::debug!(
        "Tokenized config: {} interface entries, {} peer sections",
        interface.entries().len(),
        peers.len()
    );

    Ok(RawConfig {
        preamble,
        interface,
        peers,
    })
}

/// Render raw sections back to config text
pub fn render_sections(raw: &RawConfig) -> String {
    let mut out = String::new();

    for line in &raw.preamble {
        push_line(&mut out, line);
    }
    if !raw.preamble.is_empty() {
        out.push('\n');
    }

    out.push_str("[Interface]\n");
    render_entries(&mut out, raw.interface.entries());

    for peer in &raw.peers {
        out.push_str("\n[Peer]\n");
        // The name comment sits directly under the header
        if let Some(name) = peer.get(NAME_KEY) {
            push_line(&mut out, name);
        }
        for entry in peer.entries() {
            match entry {
                Entry::Field { key, .. } if key.eq_ignore_ascii_case(NAME_KEY) => {}
                entry => render_entry(&mut out, entry),
            }
        }
    }

    out
}

fn render_entries(out: &mut String, entries: &[Entry]) {
    for entry in entries {
        render_entry(out, entry);
    }
}

fn render_entry(out: &mut String, entry: &Entry) {
    match entry {
        Entry::Field { key, value } => {
            out.push_str(key);
            out.push_str(" = ");
            push_line(out, value);
        }
        Entry::Comment(text) => push_line(out, text),
    }
}

fn push_line(out: &mut String, line: &str) {
    out.push_str(line);
    out.push('\n');
}
