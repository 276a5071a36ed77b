use std::fmt;

use crate::models::User;

/// Everything the view layer needs to draw the widget.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ViewState {
    pub query: String,
    pub results: Vec<User>,
    pub loading: bool,
    pub is_open: bool,
    pub no_results: bool,
}

impl ViewState {
    /// Result rows are only visible while the dropdown is open.
    pub fn visible_results(&self) -> &[User] {
        if self.is_open { self.results.as_slice() } else { &[] }
    }
}

impl fmt::Display for ViewState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let icon = if self.loading { "…" } else { "?" };
        write!(f, "[{icon}] {}", self.query)?;
        if !self.query.is_empty() && self.is_open {
            write!(f, " [x]")?;
        }
        writeln!(f)?;

        if !self.is_open {
            return Ok(());
        }
        if self.query.is_empty() {
            writeln!(f, "    Try searching for github users.")?;
        }
        if self.no_results {
            writeln!(f, "    No results found.")?;
        }
        for (i, user) in self.results.iter().enumerate() {
            writeln!(
                f,
                "{:>3}. {}  {}  (avatar: {})",
                i + 1,
                user.login,
                user.html_url,
                user.avatar_url
            )?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn octocat() -> User {
        User {
            id: 1,
            login: "octocat".into(),
            avatar_url: "a.png".into(),
            html_url: "https://github.com/octocat".into(),
        }
    }

    #[test]
    fn closed_dropdown_renders_only_the_input() {
        let view = ViewState {
            query: "octo".into(),
            results: vec![octocat()],
            ..ViewState::default()
        };
        assert_eq!(view.to_string(), "[?] octo\n");
        assert!(view.visible_results().is_empty());
    }

    #[test]
    fn open_empty_query_shows_hint() {
        let view = ViewState {
            is_open: true,
            ..ViewState::default()
        };
        assert_eq!(view.to_string(), "[?] \n    Try searching for github users.\n");
    }

    #[test]
    fn open_with_results_lists_rows() {
        let view = ViewState {
            query: "octo".into(),
            results: vec![octocat()],
            loading: true,
            is_open: true,
            no_results: false,
        };
        assert_eq!(
            view.to_string(),
            "[…] octo [x]\n  1. octocat  https://github.com/octocat  (avatar: a.png)\n"
        );
        assert_eq!(view.visible_results().len(), 1);
    }

    #[test]
    fn no_results_message() {
        let view = ViewState {
            query: "zzzz".into(),
            is_open: true,
            no_results: true,
            ..ViewState::default()
        };
        assert!(view.to_string().contains("No results found."));
    }
}
