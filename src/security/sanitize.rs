// Markup stripping for free-text form fields.
//
// Every keystroke goes through `sanitize` before it lands in the form record,
// and every field goes through it again right before the relay send.

use std::sync::LazyLock;

use regex_lite::Regex;

/// `<script>` / `<style>` elements, contents included. An unterminated one
/// runs to the end of the input.
static EXECUTABLE_ELEMENT_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?is)<(?:script|style)\b[^>]*>.*?(?:</(?:script|style)\s*>|$)")
        .expect("executable element pattern is valid")
});

/// HTML comments, terminated or not.
static COMMENT_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?s)<!--.*?(?:-->|$)")
        .expect("comment pattern is valid")
});

/// Opening/closing tags, doctypes and processing instructions. A bare `<`
/// followed by whitespace or a digit is ordinary text and is left alone.
static TAG_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"<(?:/?[a-zA-Z]|[!?])[^>]*(?:>|$)")
        .expect("tag pattern is valid")
});

/// Strip all markup from `input`, keeping only its text content.
///
/// Script and style bodies are dropped entirely; the text inside any other
/// element is kept. Stripping repeats until nothing tag-shaped is left, so
/// fragments like `<<b>script>` can't reassemble into a tag.
pub fn sanitize(input: &str) -> String {
    let mut current = input.to_string();
    loop {
        let stripped = strip_once(&current);
        if stripped == current {
            return stripped;
        }
        current = stripped;
    }
}

fn strip_once(input: &str) -> String {
    let without_scripts = EXECUTABLE_ELEMENT_RE.replace_all(input, "");
    let without_comments = COMMENT_RE.replace_all(&without_scripts, "");
    TAG_RE.replace_all(&without_comments, "").into_owned()
}
