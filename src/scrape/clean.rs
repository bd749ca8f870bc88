//! Text cleanup for rendered pages.

/// Normalizes extracted page text.
///
/// Line endings become `\n`, every line is trimmed, empty lines are dropped
/// and runs of whitespace inside a line collapse to a single space.
///
/// # Examples
///
/// ```
/// use pagequery::scrape::normalize_whitespace;
///
/// let text = "  Title \r\n\r\n  first   para\t here \r  ";
/// assert_eq!(normalize_whitespace(text), "Title\nfirst para here");
/// ```
#[must_use]
pub fn normalize_whitespace(text: &str) -> String {
    let unified = text.replace("\r\n", "\n").replace('\r', "\n");

    unified
        .split('\n')
        .filter_map(|line| {
            let line = line.trim();
            if line.is_empty() {
                None
            } else {
                Some(line.split_whitespace().collect::<Vec<_>>().join(" "))
            }
        })
        .collect::<Vec<_>>()
        .join("\n")
}
