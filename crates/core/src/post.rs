//! Parsing of tagged post text into named sections.
//!
//! A post is plain text where lines like `[HOOK]` or `[CTA]` open a section
//! and the following non-blank lines belong to it.

use serde::Serialize;
use std::collections::BTreeMap;
use unicode_normalization::UnicodeNormalization;

/// Section tags recognized in a post. Tag lines naming anything else are ignored.
pub const SECTIONS: &[&str] = &[
    "HOOK",
    "HOOK_SUB",
    "STORY",
    "STORY_SUB",
    "TOPIC",
    "TOPIC_SUB",
    "INSIGHT",
    "VALUE",
    "SUBJECT",
    "ONE",
    "ONE_SUB",
    "IMAGE_TOP",
    "IMAGE_TOP_SUB",
    "IMAGE_BOTTOM",
    "IMAGE_BOTTOM_SUB",
    "IMAGE_BOTTOM_RIGHT",
    "IMAGE_BOTTOM_RIGHT_SUB",
    "IMAGE_BOTTOM_RIGHT_CAP",
    "IMAGE_BOTTOM_LEFT",
    "IMAGE_BOTTOM_LEFT_SUB",
    "IMAGE_BOTTOM_LEFT_CAP",
    "CTA",
    "CTA_SUB",
];

/// Check whether a tag name is a known section.
pub fn is_section(tag: &str) -> bool {
    SECTIONS.contains(&tag)
}

/// Sections of a post, keyed by tag name.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct PostSections {
    parts: BTreeMap<String, Vec<String>>,
}

impl PostSections {
    /// Parse post text into sections.
    ///
    /// Lines are trimmed and blank lines dropped. A line wrapped in brackets is
    /// a tag line; a known tag starts (or restarts) its section. Text before the
    /// first known tag is ignored.
    pub fn parse(post_text: &str) -> Self {
        let normalized: String = post_text.nfc().collect();
        let mut parts: BTreeMap<String, Vec<String>> = BTreeMap::new();
        let mut current: Option<String> = None;

        for line in normalized.lines() {
            let line = line.trim();
            if line.is_empty() {
                continue;
            }

            if line.starts_with('[') && line.ends_with(']') {
                let tag = line.trim_matches(|c| c == '[' || c == ']').to_uppercase();
                if is_section(&tag) {
                    parts.insert(tag.clone(), Vec::new());
                    current = Some(tag);
                } else {
                    log::debug!("Ignoring unknown section tag {}", line);
                }
            } else if let Some(ref key) = current {
                if let Some(lines) = parts.get_mut(key) {
                    lines.push(line.to_string());
                }
            }
        }

        Self { parts }
    }

    /// Lines of a section, if the post has it.
    pub fn get(&self, key: &str) -> Option<&[String]> {
        self.parts.get(key).map(|v| v.as_slice())
    }

    /// Whether the post contains a section.
    pub fn contains(&self, key: &str) -> bool {
        self.parts.contains_key(key)
    }

    /// Section text with lines joined by `\n`; empty when absent.
    pub fn block_text(&self, key: &str) -> String {
        self.get(key).map(|lines| lines.join("\n")).unwrap_or_default()
    }

    /// Section names present in the post.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.parts.keys().map(|k| k.as_str())
    }

    /// Number of sections.
    pub fn len(&self) -> usize {
        self.parts.len()
    }

    /// Whether no section was found.
    pub fn is_empty(&self) -> bool {
        self.parts.is_empty()
    }
}
