use domains::{InsightSection, InsightSections};
use once_cell::sync::Lazy;
use regex::Regex;

// "<digit>. <heading words>:" at the very start of a line
static HEADING: Lazy<Regex> = Lazy::new(|| Regex::new(r"^\d\.\s+([\w\s&]+):").expect("heading pattern"));
static KEY_SEPARATOR: Lazy<Regex> = Lazy::new(|| Regex::new(r"[&\s]+").expect("separator pattern"));

/// Best-effort split of a free-text report into numbered sections of bullets.
///
/// Lines that are neither a heading nor a bullet under a heading are dropped.
/// A response that ignores the heading format yields an empty map.
pub(crate) fn parse_sections(raw: &str) -> InsightSections {
    let mut sections = InsightSections::new();
    let mut current: Option<(String, InsightSection)> = None;

    for line in raw.lines() {
        if let Some(caps) = HEADING.captures(line) {
            if let Some((key, section)) = current.take() {
                sections.insert(key, section);
            }
            let title = caps[1].trim().to_string();
            current = Some((
                section_key(&title),
                InsightSection {
                    title,
                    content: Vec::new(),
                },
            ));
            continue;
        }

        let trimmed = line.trim();
        if let (Some(rest), Some((_, section))) = (trimmed.strip_prefix('-'), current.as_mut()) {
            let bullet = rest.trim();
            if !bullet.is_empty() {
                section.content.push(bullet.to_string());
            }
        }
    }

    if let Some((key, section)) = current {
        sections.insert(key, section);
    }
    sections
}

/// `Housing & Rent` → `housing_rent`
pub(crate) fn section_key(title: &str) -> String {
    KEY_SEPARATOR
        .replace_all(&title.to_lowercase(), "_")
        .into_owned()
}
