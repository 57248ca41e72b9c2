//! Forum-post HTML → plain changelog text

use once_cell::sync::Lazy;
use regex::Regex;

use super::ChangelogError;

static TAG: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"<\s*(/?)\s*([A-Za-z][A-Za-z0-9]*)[^>]*?(/?)\s*>").expect("valid tag pattern")
});

/// Tags that never have a closing tag
const VOID_TAGS: &[&str] = &["br", "hr", "img", "wbr", "meta", "link"];

/// Tags that are dropped without a line break
const INLINE_TAGS: &[&str] = &["b", "strong", "i", "em", "u", "a", "span", "font", "s"];

/// Convert an HTML changelog post into the plain-text format.
///
/// `<br>` and `</p>` end a line, `<li>` starts a `- ` bullet, inline
/// formatting is removed. Every opened tag must be closed.
pub fn html_to_text(html: &str) -> Result<String, ChangelogError> {
    let mut out = String::with_capacity(html.len());
    let mut open: Vec<String> = Vec::new();
    let mut last = 0;

    for caps in TAG.captures_iter(html) {
        let (Some(whole), Some(name)) = (caps.get(0), caps.get(2)) else {
            continue;
        };
        out.push_str(&decode_entities(&html[last..whole.start()]));
        last = whole.end();

        let name = name.as_str().to_ascii_lowercase();
        let closing = caps.get(1).is_some_and(|m| !m.as_str().is_empty());
        let self_closing = caps.get(3).is_some_and(|m| !m.as_str().is_empty());

        if VOID_TAGS.contains(&name.as_str()) {
            if name == "br" {
                out.push('\n');
            }
            continue;
        }
        if self_closing {
            continue;
        }

        if closing {
            match open.pop() {
                Some(top) if top == name => {}
                Some(top) => return Err(ChangelogError::UnclosedTag { tag: top }),
                None => return Err(ChangelogError::UnexpectedClosingTag { tag: name }),
            }
            if !INLINE_TAGS.contains(&name.as_str()) {
                out.push('\n');
            }
        } else {
            if name == "li" {
                out.push_str("\n- ");
            }
            open.push(name);
        }
    }
    out.push_str(&decode_entities(&html[last..]));

    if let Some(tag) = open.pop() {
        return Err(ChangelogError::UnclosedTag { tag });
    }

    Ok(tidy_lines(&out))
}

fn decode_entities(text: &str) -> String {
    text.replace("&nbsp;", " ")
        .replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&#39;", "'")
        .replace("&amp;", "&")
}

/// Trim every line and drop blank ones
fn tidy_lines(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for line in text.lines().map(str::trim).filter(|l| !l.is_empty()) {
        out.push_str(line);
        out.push('\n');
    }
    out
}
