use clap::{ArgAction, Parser, ValueHint};

#[derive(Parser)]
#[command(
    author,
    version,
    about,
    help_template = "{before-help}{name} {version}
{author-with-newline}{about-with-newline}
{usage-heading} {usage}

{all-args}{after-help}",
    arg_required_else_help = true
)]
pub struct Args {
    /// Enable a repository from a URL, descriptor file, or package directory
    /// (repeatable; directories end in a path separator)
    #[arg(long = "tmprepo", value_name = "SOURCE", value_hint = ValueHint::AnyPath)]
    pub tmprepo: Vec<String>,

    /// Keep created directory-based repositories instead of removing them at
    /// exit
    #[arg(long = "tmprepo-keep-created")]
    pub tmprepo_keep_created: bool,

    /// Provide custom config file
    #[arg(short, long)]
    pub config: Option<String>,

    /// Set output verbosity
    #[arg(short = 'v', long, action = ArgAction::Count)]
    pub verbose: u8,

    /// Suppress outputs
    #[arg(short, long)]
    pub quiet: bool,

    /// Disable colors in output
    #[arg(long)]
    pub no_color: bool,
}
