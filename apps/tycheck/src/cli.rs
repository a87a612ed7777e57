//! CLI argument parsing via `clap`.

use crate::config::Overrides;
use crate::models::LintCountUnit;
use clap::{ArgAction, Parser, ValueEnum};

#[derive(Parser)]
#[command(
    name = "tycheck",
    version,
    about = "Typecheck and lint a project, then decide the pipeline outcome",
    long_about = "Tycheck runs the type checker and the linter over a project, prints one combined report and exits according to the configured throwOn*/quit/finished policy.\n\nConfiguration precedence: CLI > tycheck.toml > defaults.",
    after_help = "Examples:\n  tycheck\n  tycheck --project tsconfig.json --tslint tslint.json --finished\n  tycheck --listen --parent-channel /tmp/tycheck.chan"
)]
/// Top-level CLI options.
pub struct Cli {
    #[arg(long, help = "Directory to start config discovery from (default: current dir)")]
    pub root: Option<String>,
    #[arg(long, help = "Project base path, relative to the config directory")]
    pub base_path: Option<String>,
    #[arg(long, help = "JSON project file, relative to the base path")]
    pub project: Option<String>,
    #[arg(long, help = "Lint configuration file, relative to the base path")]
    pub tslint: Option<String>,
    #[arg(long, help = "Name shown in the report header")]
    pub name: Option<String>,
    #[arg(long, action = ArgAction::SetTrue, help = "Quit after this run and signal the parent with 'done'")]
    pub quit: bool,
    #[arg(long, action = ArgAction::SetTrue, help = "Quit after this run without signalling")]
    pub finished: bool,
    #[arg(long, value_enum, help = "What the TsLint counter counts: files|failures")]
    pub lint_count: Option<LintCountArg>,
    #[arg(long, help = "File or pipe to append 'done'/'error' indicators to")]
    pub parent_channel: Option<String>,
    #[arg(long, action = ArgAction::SetTrue, help = "After a keep-alive outcome, re-run on each line read from stdin")]
    pub listen: bool,
    #[arg(long, action = ArgAction::SetTrue, help = "Disable colors (NO_COLOR is honored too)")]
    pub no_color: bool,
    #[arg(long, short = 'v', action = ArgAction::SetTrue, help = "Info-level logging to stderr")]
    pub verbose: bool,
    #[arg(long, action = ArgAction::SetTrue, help = "Debug-level logging to stderr")]
    pub debug: bool,
}

#[derive(Clone, Copy, ValueEnum)]
pub enum LintCountArg {
    Files,
    Failures,
}

impl From<LintCountArg> for LintCountUnit {
    fn from(a: LintCountArg) -> Self {
        match a {
            LintCountArg::Files => LintCountUnit::Files,
            LintCountArg::Failures => LintCountUnit::Failures,
        }
    }
}

impl Cli {
    /// Config overrides; unset switches leave the file value alone.
    pub fn overrides(&self) -> Overrides {
        Overrides {
            base_path: self.base_path.clone(),
            ts_config: self.project.clone(),
            ts_lint: self.tslint.clone(),
            name: self.name.clone(),
            quit: self.quit.then_some(true),
            finished: self.finished.then_some(true),
            lint_count: self.lint_count.map(Into::into),
        }
    }
}
