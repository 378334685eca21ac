use crate::monitor::ForegroundWindow;

/// Drops windows that should never become sessions
#[derive(Debug, Clone, Default)]
pub struct PrivacyFilter {
    ignore_keywords: Vec<String>,
}

impl PrivacyFilter {
    #[must_use]
    pub fn new(ignore_keywords: Vec<String>) -> Self {
        Self {
            ignore_keywords: ignore_keywords
                .into_iter()
                .filter(|keyword| !keyword.is_empty())
                .collect(),
        }
    }

    /// Check if a window should be excluded from tracking.
    ///
    /// Windows with a blank title, or whose title contains an ignore-list
    /// keyword (desktop, lock screen and similar shell surfaces), are excluded.
    #[must_use]
    pub fn should_exclude(&self, window: &ForegroundWindow) -> bool {
        let title = window.window_title.trim();
        title.is_empty()
            || self
                .ignore_keywords
                .iter()
                .any(|keyword| title.contains(keyword.as_str()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;

    fn filter() -> PrivacyFilter {
        PrivacyFilter::new(Config::default().ignore_window_keywords)
    }

    #[test]
    fn test_blank_titles_are_excluded() {
        assert!(filter().should_exclude(&ForegroundWindow::new("explorer.exe", "")));
        assert!(filter().should_exclude(&ForegroundWindow::new("explorer.exe", "   ")));
    }

    #[test]
    fn test_ignore_list_substrings_are_excluded() {
        let f = filter();
        assert!(f.should_exclude(&ForegroundWindow::new("explorer.exe", "Program Manager")));
        assert!(f.should_exclude(&ForegroundWindow::new("LockApp.exe", "Windows Default Lock Screen")));
        assert!(f.should_exclude(&ForegroundWindow::new("explorer.exe", "\u{684c}\u{9762}")));
    }

    #[test]
    fn test_ordinary_windows_pass() {
        assert!(!filter().should_exclude(&ForegroundWindow::new("chrome.exe", "Gmail")));
    }

    #[test]
    fn test_empty_keywords_do_not_match_everything() {
        let f = PrivacyFilter::new(vec![String::new()]);
        assert!(!f.should_exclude(&ForegroundWindow::new("chrome.exe", "Gmail")));
    }
}
