use std::collections::HashSet;

use crate::error::AppError;

/// Strips markup from user-supplied plain text (comments, names).
///
/// The result is plain text, not HTML: `&`, `<` and quotes that are not part
/// of a tag are kept as typed, so the stored value never grows. `<script>`
/// and `<style>` lose their content as well.
pub fn clean_text(input: &str) -> String {
    if !input.contains('<') {
        return input.trim().to_string();
    }
    let html = ammonia::Builder::default()
        .tags(HashSet::new())
        .clean(input)
        .to_string();
    unescape(&html).trim().to_string()
}

/// [`clean_text`], then the length rule checked again on what will be stored.
pub fn clean_bounded(input: &str, field: &str, max_chars: usize) -> Result<String, AppError> {
    let text = clean_text(input);
    if text.is_empty() {
        return Err(AppError::BadRequest(format!("{} is required", field)));
    }
    if text.chars().count() > max_chars {
        return Err(AppError::BadRequest(format!(
            "{} must be {} characters or less",
            field, max_chars
        )));
    }
    Ok(text)
}

// Reverses the serializer's text escaping. `&amp;` goes last so an escaped
// entity name stays literal.
fn unescape(html: &str) -> String {
    html.replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&#39;", "'")
        .replace("&nbsp;", "\u{a0}")
        .replace("&amp;", "&")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plain_text_is_kept() {
        assert_eq!(clean_text("  Salt & pepper \"to taste\" "), "Salt & pepper \"to taste\"");
    }

    #[test]
    fn tags_are_removed() {
        assert_eq!(clean_text("<b>Great</b> soup"), "Great soup");
        assert_eq!(clean_text("<script>alert(1)</script>Nice"), "Nice");
    }

    #[test]
    fn text_around_tags_is_not_escaped() {
        assert_eq!(clean_text("a <3 & b"), "a <3 & b");
        assert_eq!(clean_text("<i>Fish</i> & chips"), "Fish & chips");
        assert_eq!(clean_text("<p>say &amp;lt; here</p>"), "say &lt; here");
    }

    #[test]
    fn cleaning_never_lengthens_the_text() {
        let input = format!("I <3 this {}", "&".repeat(490));
        assert_eq!(input.chars().count(), 500);

        let cleaned = clean_bounded(&input, "Comment", 500).unwrap();
        assert_eq!(cleaned, input);
    }

    #[test]
    fn bounded_rejects_empty_and_long_results() {
        assert!(matches!(
            clean_bounded("<b></b>", "Name", 50),
            Err(AppError::BadRequest(msg)) if msg == "Name is required"
        ));
        assert!(matches!(
            clean_bounded(&"x".repeat(51), "Name", 50),
            Err(AppError::BadRequest(_))
        ));
        assert_eq!(clean_bounded(" <em>Ada</em> ", "Name", 50).unwrap(), "Ada");
    }
}
