//! Utility functions for path resolution, ANSI stripping, and time formatting.
use std::ffi::OsString;
use std::path::PathBuf;

/// Strip ANSI escape sequences from a string.
///
/// Handles SGR sequences (ending in `m`) and other CSI sequences (ending
/// in any letter in the `@`..`~` range).
pub(super) fn strip_ansi(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut chars = s.chars();
    while let Some(c) = chars.next() {
        if c == '\x1b' {
            if let Some(next) = chars.next()
                && next == '['
            {
                for inner in chars.by_ref() {
                    if ('@'..='~').contains(&inner) {
                        break;
                    }
                }
            }
        } else {
            out.push(c);
        }
    }
    out
}

/// Resolve `$XDG_CACHE_HOME/kanata-setup/` (or `~/.cache/kanata-setup/`).
///
/// Nothing is created on disk.
fn cache_dir() -> PathBuf {
    cache_dir_from(std::env::var_os("XDG_CACHE_HOME"), std::env::var_os("HOME"))
}

fn cache_dir_from(xdg_cache_home: Option<OsString>, home: Option<OsString>) -> PathBuf {
    let base = xdg_cache_home
        .filter(|v| !v.is_empty())
        .map_or_else(
            || home.map_or_else(|| PathBuf::from("."), PathBuf::from).join(".cache"),
            PathBuf::from,
        );
    base.join("kanata-setup")
}

/// Path of the log file for `command`.
#[must_use]
pub fn log_file_path(command: &str) -> PathBuf {
    cache_dir().join(format!("{command}.log"))
}

/// Format the current UTC time as `YYYY-MM-DD HH:MM:SS`.
pub(super) fn format_utc_datetime() -> String {
    chrono::Utc::now().format("%Y-%m-%d %H:%M:%S").to_string()
}

/// Format the current UTC time as `HH:MM:SS`.
pub(super) fn format_utc_time() -> String {
    chrono::Utc::now().format("%H:%M:%S").to_string()
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn strip_ansi_removes_sgr() {
        assert_eq!(strip_ansi("\x1b[32mok\x1b[0m"), "ok");
    }

    #[test]
    fn strip_ansi_removes_cursor_sequences() {
        assert_eq!(strip_ansi("\r\x1b[Kdone"), "\rdone");
    }

    #[test]
    fn strip_ansi_leaves_plain_text() {
        assert_eq!(strip_ansi("plain [text]"), "plain [text]");
    }

    #[test]
    fn cache_dir_prefers_xdg_cache_home() {
        let dir = cache_dir_from(Some("/xdg".into()), Some("/home/me".into()));
        assert_eq!(dir, PathBuf::from("/xdg/kanata-setup"));
    }

    #[test]
    fn cache_dir_falls_back_to_home() {
        let dir = cache_dir_from(Some(OsString::new()), Some("/home/me".into()));
        assert_eq!(dir, PathBuf::from("/home/me/.cache/kanata-setup"));
    }

    #[test]
    fn resolving_the_log_path_creates_nothing() {
        let tmp = tempfile::tempdir().unwrap();
        let dir = cache_dir_from(Some(tmp.path().as_os_str().to_owned()), None);
        assert_eq!(dir, tmp.path().join("kanata-setup"));
        assert!(!dir.exists());
    }

    #[test]
    fn utc_time_has_expected_shape() {
        let t = format_utc_time();
        assert_eq!(t.len(), 8);
        assert_eq!(t.matches(':').count(), 2);
    }

    #[test]
    fn utc_datetime_has_expected_shape() {
        let t = format_utc_datetime();
        assert_eq!(t.len(), 19);
        assert!(t.contains(' '));
    }
}
