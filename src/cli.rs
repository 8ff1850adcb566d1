//! Command-line arguments for the `applink-filter` binary.

use std::path::PathBuf;

use clap::Parser;

/// Rewrite `data-app-link` anchors in an HTML fragment so they open the companion app.
#[derive(Parser, Debug)]
#[command(name = "applink-filter", version, about)]
pub struct Cli {
    /// HTML file to filter. Reads stdin when omitted or `-`.
    pub input: Option<PathBuf>,

    /// Site root URL. Overrides `wwwroot` from the settings file.
    #[arg(long)]
    pub base_url: Option<String>,

    /// Scheme of a custom app to open. Overrides `urlscheme` from the settings file.
    #[arg(long)]
    pub scheme: Option<String>,

    /// Username of the logged in user, used by `data-username` anchors.
    #[arg(long)]
    pub username: Option<String>,

    /// Treat the request as coming from a web-service client (output is left untouched).
    #[arg(long)]
    pub non_interactive: bool,

    /// Settings file. Defaults to `applink.config.json` in the current directory.
    #[arg(long)]
    pub config: Option<PathBuf>,
}

impl Cli {
    /// Whether the input should come from stdin.
    pub fn reads_stdin(&self) -> bool {
        self.input
            .as_deref()
            .is_none_or(|path| path.as_os_str() == "-")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_all_options() {
        let cli = Cli::try_parse_from([
            "applink-filter",
            "page.html",
            "--base-url",
            "https://school.test",
            "--scheme",
            "custom",
            "--username",
            "alice",
            "--non-interactive",
        ])
        .unwrap();

        assert_eq!(cli.input, Some(PathBuf::from("page.html")));
        assert_eq!(cli.base_url.as_deref(), Some("https://school.test"));
        assert_eq!(cli.scheme.as_deref(), Some("custom"));
        assert_eq!(cli.username.as_deref(), Some("alice"));
        assert!(cli.non_interactive);
        assert!(!cli.reads_stdin());
    }

    #[test]
    fn dash_means_stdin() {
        let cli = Cli::try_parse_from(["applink-filter", "-"]).unwrap();
        assert!(cli.reads_stdin());
        let cli = Cli::try_parse_from(["applink-filter"]).unwrap();
        assert!(cli.reads_stdin());
    }
}
