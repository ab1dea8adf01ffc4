use clap::Parser;
use std::path::PathBuf;

#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    Text,
    Json,
}

#[derive(Parser)]
#[command(
    name = "ytsum",
    about = "YouTube video summarizer",
    version = env!("GIT_DESCRIBE"),
)]
pub struct Cli {
    /// YouTube video URL or video ID (reads from stdin if omitted)
    pub url: Option<String>,

    /// Skip the AI summary; output the transcript only
    #[arg(long)]
    pub no_summary: bool,

    /// Show video metadata without transcribing
    #[arg(long)]
    pub info: bool,

    /// Output format: text (default), json
    #[arg(short, long, value_enum)]
    pub format: Option<OutputFormat>,

    /// Caption language preference order, e.g. zh-HK,zh-CN,en
    #[arg(short, long, value_delimiter = ',')]
    pub langs: Option<Vec<String>>,

    /// Write output to file instead of stdout
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Skip caption extraction, always transcribe the audio
    #[arg(long)]
    pub transcribe_only: bool,

    /// Don't fall back to transcription if captions unavailable
    #[arg(long)]
    pub captions_only: bool,

    /// Gemini model for summarization
    #[arg(long)]
    pub model: Option<String>,

    /// Show processing steps and metadata
    #[arg(short, long)]
    pub verbose: bool,
}
