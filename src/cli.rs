use std::path::PathBuf;

use clap::Parser;

#[derive(Parser, Debug, Default)]
#[command(name = "termexam", version, about = "Terminal client for timed multiple-choice exams")]
pub struct Cli {
    /// Exam server base URL [default: http://127.0.0.1:5000]
    #[arg(long, value_name = "url")]
    pub base_url: Option<String>,

    /// Config file [default: <config dir>/termexam/config.yaml]
    #[arg(long, value_name = "path")]
    pub config: Option<PathBuf>,

    /// Where the login token is kept between runs
    #[arg(long, value_name = "path")]
    pub token_file: Option<PathBuf>,

    /// Request timeout in seconds
    #[arg(long, value_name = "secs")]
    pub timeout: Option<u64>,

    /// Forget the stored login token and exit
    #[arg(long)]
    pub logout: bool,

    /// Show whether a login token is stored, without entering the TUI
    #[arg(long)]
    pub status: bool,
}
