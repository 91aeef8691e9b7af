//! Heading-aligned markdown segmentation

/// One segment of a markdown document.
#[derive(Debug, Clone, PartialEq)]
pub struct Section {
    /// Body lines joined by newline, trimmed
    pub text: String,
    /// Heading trail for this segment (the enclosing top-level heading)
    pub headings: Vec<String>,
    /// Nearest enclosing heading title
    pub section: String,
}

/// Split a markdown document into ordered, non-overlapping sections aligned
/// to heading boundaries.
///
/// The scan is line-oriented: a `# ` line opens a new top-level scope and
/// resets the accumulation buffer; a `## ` line closes the buffered segment
/// under the previous section title, then starts a new buffer containing the
/// heading line itself; every other line accumulates verbatim. At end of
/// input a non-empty buffer is flushed under the current section.
///
/// Text before the first top-level heading carries an empty-string section
/// title. Whitespace-only segments are still emitted; discarding them is the
/// caller's responsibility.
pub fn segment(content: &str) -> Vec<Section> {
    let mut current_h1 = String::new();
    let mut current_section = String::new();
    let mut buffer: Vec<&str> = Vec::new();
    let mut sections = Vec::new();

    for line in content.lines() {
        if let Some(title) = line.strip_prefix("# ") {
            current_h1 = title.trim().to_string();
            current_section = current_h1.clone();
            buffer.clear();
        } else if let Some(title) = line.strip_prefix("## ") {
            if !buffer.is_empty() {
                sections.push(Section {
                    text: buffer.join("\n").trim().to_string(),
                    headings: vec![current_h1.clone()],
                    section: current_section.clone(),
                });
            }
            current_section = title.trim().to_string();
            buffer.clear();
            buffer.push(line);
        } else {
            buffer.push(line);
        }
    }

    if !buffer.is_empty() {
        sections.push(Section {
            text: buffer.join("\n").trim().to_string(),
            headings: vec![current_h1],
            section: current_section,
        });
    }

    sections
}
