use std::io::{self, BufRead};
use std::path::PathBuf;
use std::process::Command;
use std::time::Instant;

use eyre::{Result, bail};
use log::{debug, info};

mod cli;

use cli::{Cli, OutputFormat};

fn setup_logging() -> Result<()> {
    let log_dir = log_dir();
    std::fs::create_dir_all(&log_dir)?;
    let log_file = log_dir.join("ytsum.log");

    let target = Box::new(std::fs::OpenOptions::new().create(true).append(true).open(&log_file)?);

    env_logger::Builder::from_default_env()
        .target(env_logger::Target::Pipe(target))
        .init();

    info!("Logging initialized: {}", log_file.display());
    Ok(())
}

fn log_dir() -> PathBuf {
    dirs::data_local_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("ytsum")
        .join("logs")
}

fn tool_version(name: &str, flag: &str) -> Option<String> {
    Command::new(name)
        .arg(flag)
        .output()
        .ok()
        .filter(|o| o.status.success())
        .map(|o| {
            String::from_utf8_lossy(&o.stdout)
                .trim()
                .lines()
                .next()
                .unwrap_or("")
                .to_string()
        })
}

fn build_after_help() -> String {
    let yt_dlp = tool_version("yt-dlp", "--version");
    let ffmpeg = tool_version("ffmpeg", "-version");

    let yt_dlp_line = match &yt_dlp {
        Some(v) => format!("  \x1b[32m✅\x1b[0m yt-dlp     {v}"),
        None => "  \x1b[31m❌\x1b[0m yt-dlp     (not found — required for metadata and captions)".to_string(),
    };

    let ffmpeg_line = match &ffmpeg {
        Some(v) => format!("  \x1b[32m✅\x1b[0m ffmpeg     {v}"),
        None => "  \x1b[31m❌\x1b[0m ffmpeg     (not found — optional; audio is uploaded without re-encoding)".to_string(),
    };

    let log_path = log_dir().join("ytsum.log");

    format!(
        "\nEXTERNAL TOOLS:\n{yt_dlp_line}\n{ffmpeg_line}\n\nLogs are written to: {}",
        log_path.display()
    )
}

#[tokio::main]
async fn main() -> Result<()> {
    setup_logging()?;

    let after_help = build_after_help();
    let cmd = <Cli as clap::CommandFactory>::command().after_help(after_help);
    let matches = cmd.get_matches();
    let cli = <Cli as clap::FromArgMatches>::from_arg_matches(&matches)?;

    // Load config file (non-fatal if missing/invalid)
    let config = ytsum::config::Config::load().unwrap_or_default();

    // Apply config defaults (CLI flags take priority)
    let format = cli
        .format
        .or_else(|| {
            config
                .default_format
                .as_deref()
                .and_then(|s| <OutputFormat as clap::ValueEnum>::from_str(s, true).ok())
        })
        .unwrap_or(OutputFormat::Text);

    let model = cli
        .model
        .clone()
        .or_else(|| config.default_model.clone())
        .unwrap_or_else(|| "gemini-2.5-pro".to_string());

    let langs = cli
        .langs
        .clone()
        .or_else(|| config.default_langs.clone())
        .unwrap_or_else(|| vec!["zh-HK".to_string(), "zh-CN".to_string(), "en".to_string()]);

    if cli.verbose {
        let config_path = ytsum::config::config_path();
        if config_path.exists() {
            eprintln!("Config: {}", config_path.display());
        }
        debug!("model: {model}, langs: {langs:?}");
    }

    let client = reqwest::Client::new();

    // Collect URLs: from arg or stdin
    let urls = if let Some(ref url) = cli.url {
        vec![url.clone()]
    } else {
        let stdin = io::stdin();
        stdin.lock().lines().collect::<Result<Vec<_>, _>>()?
    };

    if urls.is_empty() {
        bail!("no URL or video ID provided\n\nUsage: ytsum <URL>\n       echo <URL> | ytsum");
    }

    for url_input in &urls {
        let url_input = url_input.trim();
        if url_input.is_empty() {
            continue;
        }
        process_url(&client, &cli, url_input, format, &model, &langs).await?;
    }

    Ok(())
}

async fn process_url(
    client: &reqwest::Client,
    cli: &Cli,
    url_input: &str,
    format: OutputFormat,
    model: &str,
    langs: &[String],
) -> Result<()> {
    let start = Instant::now();

    let url = ytsum::normalize_video_url(url_input)
        .ok_or_else(|| eyre::eyre!("could not extract video ID from: {url_input}\n\nSupported formats:\n  https://www.youtube.com/watch?v=ID\n  https://youtu.be/ID\n  https://www.youtube.com/embed/ID\n  https://www.youtube.com/shorts/ID\n  <11-character video ID>"))?;

    info!("processing {url}");
    let video_info = ytsum::youtube::extract_video_info(&url).await?;
    let meta = ytsum::video_metadata(&video_info);

    if cli.verbose {
        eprintln!("Video: {} by {}", meta.title, meta.author);
    }

    if cli.info {
        let rendered = match format {
            OutputFormat::Text => ytsum::output::render_info_text(&meta),
            OutputFormat::Json => ytsum::output::render_info_json(&meta)?,
        };
        return emit(cli, &rendered);
    }

    let (transcript, source) = obtain_transcript(client, cli, &video_info, langs).await?;

    // Bracketed sentinel transcripts skip formatting and summarization
    let is_sentinel = transcript.starts_with('[');
    let transcript = if is_sentinel {
        transcript
    } else {
        ytsum::subtitle::simple_format(&transcript)
    };

    let gemini_configured = std::env::var("GEMINI_API_KEY").map(|k| !k.is_empty()).unwrap_or(false);
    let summary = if cli.no_summary || is_sentinel {
        None
    } else if !gemini_configured {
        Some("[GEMINI_API_KEY not configured - please set your Gemini API key]".to_string())
    } else {
        if cli.verbose {
            eprintln!("Generating summary...");
        }
        let content = format!(
            "Title: {}\nAuthor: {}\nTranscript:\n{}",
            meta.title, meta.author, transcript
        );
        match ytsum::summarize::summarize(client, model, &content).await {
            Ok(summary) => Some(summary),
            Err(e) => Some(format!("Summary generation failed: {e}")),
        }
    };

    let processing_time = format!("{:.1}s", start.elapsed().as_secs_f64());
    info!("completed {url} in {processing_time}");

    let result = ytsum::ProcessResult {
        meta,
        transcript,
        source,
        summary,
        processing_time,
        url,
    };

    let rendered = match format {
        OutputFormat::Text => ytsum::output::render_text(&result),
        OutputFormat::Json => ytsum::output::render_json(&result)?,
    };
    emit(cli, &rendered)
}

async fn obtain_transcript(
    client: &reqwest::Client,
    cli: &Cli,
    video_info: &ytsum::youtube::VideoInfo,
    langs: &[String],
) -> Result<(String, ytsum::TranscriptSource)> {
    if !cli.transcribe_only {
        match ytsum::youtube::fetch_subtitle(client, video_info, langs).await {
            Ok(Some(text)) => {
                if cli.verbose {
                    eprintln!("Found existing captions - skipping transcription");
                }
                return Ok((text, ytsum::TranscriptSource::Captions));
            }
            Ok(None) => {
                if cli.captions_only {
                    bail!("no captions available in preferred languages and --captions-only set");
                }
                if cli.verbose {
                    eprintln!("No captions found - falling back to transcription");
                }
            }
            Err(e) => {
                if cli.captions_only {
                    return Err(e.wrap_err("caption extraction failed and --captions-only set"));
                }
                if cli.verbose {
                    eprintln!("Caption extraction failed: {e}");
                    eprintln!("Falling back to transcription...");
                }
            }
        }
    }

    let transcript = transcribe_audio(client, cli, video_info).await;
    Ok((transcript, ytsum::TranscriptSource::SpeechToText))
}

/// Audio-path failures downgrade to a sentinel transcript so the run still
/// produces output for this video
async fn transcribe_audio(
    client: &reqwest::Client,
    cli: &Cli,
    video_info: &ytsum::youtube::VideoInfo,
) -> String {
    let audio = match fetch_audio(client, cli, video_info).await {
        Ok(bytes) => bytes,
        Err(e) => return format!("[Audio processing failed: {e}]"),
    };

    let verbose = cli.verbose;
    let result = ytsum::transcribe::transcribe(client, audio, |line| {
        info!("FAL: {line}");
        if verbose {
            eprintln!("FAL: {line}");
        }
    })
    .await;

    match result {
        Ok(text) => {
            if verbose {
                eprintln!("Transcription completed");
            }
            text
        }
        Err(e) => e.user_message(),
    }
}

async fn fetch_audio(
    client: &reqwest::Client,
    cli: &Cli,
    video_info: &ytsum::youtube::VideoInfo,
) -> Result<Vec<u8>> {
    let format = ytsum::formats::select_audio_format(&video_info.formats)?;
    if cli.verbose {
        eprintln!("Downloading audio ({})...", format.format_id);
    }
    let audio = ytsum::youtube::download_audio(client, format).await?;
    if cli.verbose {
        eprintln!("Optimizing audio for transcription...");
    }
    Ok(ytsum::audio::optimize_for_transcription(&audio).await)
}

fn emit(cli: &Cli, rendered: &str) -> Result<()> {
    if let Some(ref path) = cli.output {
        std::fs::write(path, rendered)?;
        if cli.verbose {
            eprintln!("Output written to: {}", path.display());
        }
    } else {
        println!("{rendered}");
    }
    Ok(())
}
