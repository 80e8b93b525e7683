//! Result extraction from accumulated CLI output.
//!
//! Three pure parsers turn free-text shell responses into domain results.
//! Callers pass text that has already been scrubbed of NUL bytes and,
//! where relevant, stripped of the trailing completion prompt.

use once_cell::sync::Lazy;
use regex::Regex;

use crate::channel::ShellPrompt;

/// Fixed pattern the Junos `| count` filter prints.
static COUNT_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"Count: (\d+) lines").unwrap());

/// File paths from a directory listing: one per line beginning with `prefix`,
/// in output order.
pub fn file_paths(text: &str, prefix: &str) -> Vec<String> {
    text.lines()
        .filter(|line| line.starts_with(prefix))
        .map(|line| line.trim_end().to_string())
        .collect()
}

/// The authoritative line count from `| count` output.
///
/// Absence (or a non-numeric count) is a soft failure the caller logs;
/// the record keeps its prior count.
pub fn match_count(text: &str) -> Option<u64> {
    COUNT_RE
        .captures(text)
        .and_then(|caps| caps.get(1))
        .and_then(|m| m.as_str().parse().ok())
}

/// Lines containing `needle`, excluding echoed prompt lines, in output order.
pub fn matching_lines(text: &str, needle: &str, prompt: &ShellPrompt) -> Vec<String> {
    text.lines()
        .filter(|line| line.contains(needle) && !prompt.is_echo_line(line))
        .map(str::to_string)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_file_paths_from_listing() {
        let listing = "/var/log/messages\r\n/var/log/messages.0\r\nmist@device> ";
        assert_eq!(
            file_paths(listing, "/var/log/"),
            vec!["/var/log/messages", "/var/log/messages.0"]
        );
    }

    #[test]
    fn test_file_paths_ignores_non_matching_lines() {
        let listing = "mist@device> file list /var/log/messages*\r\n/var/log/messages\r\ntotal 1\r\n";
        assert_eq!(file_paths(listing, "/var/log/"), vec!["/var/log/messages"]);

        assert!(file_paths("", "/var/log/").is_empty());
        assert!(file_paths("no paths here\r\n", "/var/log/").is_empty());
    }

    #[test]
    fn test_file_paths_idempotent() {
        let listing = "/var/log/messages\r\n/var/log/messages.0\r\n";
        let first = file_paths(listing, "/var/log/");
        let second = file_paths(listing, "/var/log/");
        assert_eq!(first, second);
    }

    #[test]
    fn test_match_count() {
        assert_eq!(match_count("Count: 42 lines\r\nmist@device> "), Some(42));
        assert_eq!(match_count("Count: 0 lines\r\n"), Some(0));

        // First match wins when several counts appear
        assert_eq!(
            match_count("Count: 7 lines\r\nCount: 9 lines\r\n"),
            Some(7)
        );
    }

    #[test]
    fn test_match_count_absent_or_malformed() {
        assert_eq!(match_count("No matches\r\nmist@device> "), None);
        assert_eq!(match_count(""), None);

        // The digits are mandatory
        assert_eq!(match_count("Count:  lines\r\n"), None);
    }

    #[test]
    fn test_matching_lines_excludes_prompt_echo() {
        let prompt = ShellPrompt::mist();
        let response = "mist@device> file show /var/log/messages | match ERROR | no-more\r\nERROR: bad\r\nERROR: worse\r\nmist@device> ";

        assert_eq!(
            matching_lines(response, "ERROR", &prompt),
            vec!["ERROR: bad", "ERROR: worse"]
        );
    }

    #[test]
    fn test_matching_lines_filters_by_needle() {
        let prompt = ShellPrompt::mist();
        let response = "Aug 25 10:00:01 device foo: ERROR one\r\nAug 25 10:00:02 device foo: fine\r\nAug 25 10:00:03 device foo: ERROR two\r\n";

        assert_eq!(
            matching_lines(response, "ERROR", &prompt),
            vec![
                "Aug 25 10:00:01 device foo: ERROR one",
                "Aug 25 10:00:03 device foo: ERROR two"
            ]
        );

        assert!(matching_lines(response, "FATAL", &prompt).is_empty());
        assert!(matching_lines("", "ERROR", &prompt).is_empty());
    }
}
