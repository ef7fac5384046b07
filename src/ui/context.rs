//! Terminal detection

use console::Term;

/// Environment variables whose presence means output goes to a CI log
const CI_MARKERS: &[&str] = &[
    "CI",
    "GITHUB_ACTIONS",
    "GITLAB_CI",
    "BUILDKITE",
    "JENKINS_URL",
    "TF_BUILD",
];

/// Decides between cliclack/indicatif rendering and plain tagged lines
#[derive(Debug, Clone, Copy)]
pub struct UiContext {
    fancy: bool,
}

impl UiContext {
    /// Fancy output only on a real terminal outside CI
    pub fn detect() -> Self {
        let in_ci = CI_MARKERS.iter().any(|var| std::env::var_os(var).is_some());
        Self {
            fancy: Term::stdout().is_term() && !in_ci,
        }
    }

    /// Plain line output regardless of the terminal
    pub fn plain() -> Self {
        Self { fancy: false }
    }

    pub fn is_fancy(&self) -> bool {
        self.fancy
    }
}
