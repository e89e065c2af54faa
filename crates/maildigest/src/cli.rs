//! Command line interface.

use clap::{Args, Parser, Subcommand};
use maildigest_core::DigestOptions;
use std::path::PathBuf;

/// Print short plain-text digests of unread email.
#[derive(Debug, Parser)]
#[command(name = "maildigest", version, max_term_width = 80)]
pub struct Cli {
    /// Settings file [default: <config dir>/maildigest/settings.json]
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    #[command(flatten)]
    pub digest: DigestArgs,

    /// Prefix for every body line of a part-tree summary (gmail --tree).
    #[arg(long, global = true, default_value = "")]
    pub indent: String,

    /// Mark digested messages as read afterwards.
    #[arg(long, global = true)]
    pub mark_read: bool,

    #[command(subcommand)]
    pub command: Command,
}

/// Overrides for the configured digest options.
#[derive(Debug, Args)]
#[allow(clippy::struct_excessive_bools)] // One switch per flag
pub struct DigestArgs {
    /// Maximum body lines per digest (0 = unlimited).
    #[arg(long, global = true)]
    pub lines: Option<usize>,

    /// Maximum characters per body line (0 = unlimited).
    #[arg(long, global = true)]
    pub cols: Option<usize>,

    /// Print HTML bodies as-is instead of converting them to text.
    #[arg(long, global = true)]
    pub skip_html: bool,

    /// Keep link targets in converted HTML.
    #[arg(long, global = true)]
    pub keep_links: bool,

    /// Render HTML tables as aligned pipe tables.
    #[arg(long, global = true)]
    pub pretty_tables: bool,

    /// Keep lines that contain no letters.
    #[arg(long, global = true)]
    pub allow_non_letter_lines: bool,
}

impl DigestArgs {
    /// Applies the flags on top of `options`. Flags only ever switch
    /// behavior on; absent limits keep the configured values.
    #[must_use]
    pub fn apply(&self, mut options: DigestOptions) -> DigestOptions {
        if let Some(lines) = self.lines {
            options = options.with_line_limit(lines);
        }
        if let Some(cols) = self.cols {
            options = options.with_col_limit(cols);
        }
        if self.skip_html {
            options = options.with_skip_html(true);
        }
        if self.keep_links {
            options = options.with_omit_links(false);
        }
        if self.pretty_tables {
            options = options.with_pretty_tables(true);
        }
        if self.allow_non_letter_lines {
            options = options.with_allow_non_letter_lines(true);
        }
        options
    }
}

/// Where messages come from.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Digest message files. Use `-` to read one message from stdin.
    Files {
        /// Message files.
        #[arg(required = true)]
        paths: Vec<String>,
    },
    /// Digest every `.eml` file in a directory.
    Dir {
        /// Directory holding the messages.
        path: PathBuf,
    },
    /// Digest unread Gmail inbox messages.
    Gmail(GmailArgs),
}

/// Gmail source options.
#[derive(Debug, Args)]
pub struct GmailArgs {
    /// Google client credentials file.
    #[arg(long)]
    pub credentials: Option<PathBuf>,

    /// Token file.
    #[arg(long, conflicts_with = "keyring")]
    pub token: Option<PathBuf>,

    /// Keep the token in the platform keyring under this account.
    #[arg(long)]
    pub keyring: Option<String>,

    /// Gmail search query [default: "in:inbox is:unread"]
    #[arg(long)]
    pub query: Option<String>,

    /// Summarize Gmail's parsed part tree instead of the raw message.
    #[arg(long)]
    pub tree: bool,
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_flags_override_settings() {
        let cli = Cli::try_parse_from([
            "maildigest",
            "--lines",
            "3",
            "--keep-links",
            "--pretty-tables",
            "dir",
            "/var/mail",
        ])
        .unwrap();

        let base = DigestOptions::new()
            .with_line_limit(10)
            .with_col_limit(80)
            .with_omit_links(true);
        let options = cli.digest.apply(base);
        assert_eq!(options.line_limit, 3);
        assert_eq!(options.col_limit, 80);
        assert!(!options.omit_links);
        assert!(options.pretty_tables);
        assert!(!options.skip_html);
        assert!(matches!(cli.command, Command::Dir { .. }));
    }

    #[test]
    fn test_global_flags_after_subcommand() {
        let cli = Cli::try_parse_from(["maildigest", "files", "-", "--cols", "0", "--mark-read"])
            .unwrap();
        assert_eq!(cli.digest.cols, Some(0));
        assert!(cli.mark_read);
        match cli.command {
            Command::Files { paths } => assert_eq!(paths, vec!["-"]),
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn test_files_requires_paths() {
        assert!(Cli::try_parse_from(["maildigest", "files"]).is_err());
    }

    #[test]
    fn test_gmail_args() {
        let cli = Cli::try_parse_from([
            "maildigest",
            "--indent",
            "    ",
            "gmail",
            "--tree",
            "--keyring",
            "me@example.com",
        ])
        .unwrap();
        assert_eq!(cli.indent, "    ");
        let Command::Gmail(args) = cli.command else {
            panic!("expected gmail");
        };
        assert!(args.tree);
        assert_eq!(args.keyring.as_deref(), Some("me@example.com"));

        assert!(
            Cli::try_parse_from(["maildigest", "gmail", "--token", "t.json", "--keyring", "x"])
                .is_err()
        );
    }
}
