use anyhow::{anyhow, Result};
use clap::{Arg, Command};
use std::path::{Path, PathBuf};
use tracing::{error, info, warn};

use adapt_ai::{
    Config, ContentRepurposer, HistoryInput, HistoryStore, Lecture, OutputType, RepurposeOutput,
    RepurposeRequest,
};

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter("adapt_ai=info,warn")
        .init();

    let matches = Command::new("Adapt AI")
        .version("0.1.0")
        .about("Repurpose educational content into summaries, notes, quizzes and narrated lectures")
        .arg(
            Arg::new("input")
                .value_name("FILE")
                .help("Input text file (stdin when omitted)")
        )
        .arg(
            Arg::new("format")
                .short('f')
                .long("format")
                .value_name("FORMAT")
                .help("Output format: summary, notes, quiz or lecture")
                .default_value("summary")
        )
        .arg(
            Arg::new("language")
                .short('l')
                .long("language")
                .value_name("LANG")
                .help("Target language for the generated content")
                .default_value("English")
        )
        .arg(
            Arg::new("out-dir")
                .short('o')
                .long("out-dir")
                .value_name("DIR")
                .help("Output directory for generated files")
                .default_value("./output")
        )
        .arg(
            Arg::new("play")
                .long("play")
                .help("Play a generated lecture with narration")
                .action(clap::ArgAction::SetTrue)
        )
        .arg(
            Arg::new("serve")
                .long("serve")
                .help("Start the REST API server")
                .action(clap::ArgAction::SetTrue)
        )
        .arg(
            Arg::new("port")
                .short('p')
                .long("port")
                .value_name("PORT")
                .help("API server port")
                .default_value("8080")
        )
        .arg(
            Arg::new("verbose")
                .short('v')
                .long("verbose")
                .help("Enable verbose logging")
                .action(clap::ArgAction::SetTrue)
        )
        .get_matches();

    if matches.get_flag("verbose") {
        info!("Verbose logging enabled");
    }

    // Load configuration
    let config = Config::load().unwrap_or_else(|e| {
        warn!("Failed to load config, using defaults: {}", e);
        Config::default().with_env_overrides()
    });
    config.validate()?;

    info!("🚀 Adapt AI starting...");

    if matches.get_flag("serve") {
        let port: u16 = matches.get_one::<String>("port").unwrap().parse()?;
        return serve(config, port).await;
    }

    let format: OutputType = matches.get_one::<String>("format").unwrap().parse()?;
    let language = matches.get_one::<String>("language").unwrap().clone();
    let out_dir = PathBuf::from(matches.get_one::<String>("out-dir").unwrap());
    let input = matches.get_one::<String>("input").map(String::as_str);

    let content = read_content(input).await?;
    let request = RepurposeRequest::new(content, format, language.clone());

    let repurposer = ContentRepurposer::from_config(&config.llm).await?;

    let start_time = std::time::Instant::now();
    let output = match repurposer.repurpose(&request).await {
        Ok(output) => output,
        Err(e) => {
            error!("❌ Generation failed: {}", e);
            return Err(e);
        }
    };
    info!("🎉 Generation completed in {:.1}s", start_time.elapsed().as_secs_f64());

    if config.history.enabled {
        let store = HistoryStore::new(config.history.dir.clone()).await?;
        store
            .record(
                HistoryInput {
                    content: request.content.clone(),
                    output_type: request.output_type,
                    language: request.language.clone(),
                },
                output.clone(),
            )
            .await?;
    }

    let path = write_output(&out_dir, &output).await?;
    info!("📝 Output written to: {}", path.display());

    match &output {
        RepurposeOutput::Summary { summary } => println!("{}", summary),
        RepurposeOutput::Notes { notes } => println!("{}", notes),
        RepurposeOutput::Quiz { quiz } => println!("Generated {} quiz questions", quiz.len()),
        RepurposeOutput::Lecture { lecture } => {
            println!(
                "Generated lecture \"{}\" with {} slides",
                lecture.title.as_deref().unwrap_or("untitled"),
                lecture.slides.len()
            );
            if matches.get_flag("play") {
                play_lecture(&config, lecture.clone(), &language).await?;
            }
        }
    }

    if matches.get_flag("play") && output.output_type() != OutputType::Lecture {
        warn!("--play only applies to lecture output");
    }

    Ok(())
}

/// Read input content from a file, or stdin when no path is given.
async fn read_content(input: Option<&str>) -> Result<String> {
    let content = match input {
        Some(path) if path != "-" => {
            info!("📄 Reading content from: {}", path);
            tokio::fs::read_to_string(path).await?
        }
        _ => {
            info!("📄 Reading content from stdin");
            use tokio::io::AsyncReadExt;
            let mut buffer = String::new();
            tokio::io::stdin().read_to_string(&mut buffer).await?;
            buffer
        }
    };

    if content.trim().is_empty() {
        return Err(anyhow!("no input content provided"));
    }
    Ok(content)
}

/// Write the generated output to the output directory.
async fn write_output(out_dir: &Path, output: &RepurposeOutput) -> Result<PathBuf> {
    tokio::fs::create_dir_all(out_dir).await?;
    let stamp = chrono::Local::now().format("%Y%m%d-%H%M%S");

    let path = match output {
        RepurposeOutput::Summary { summary } => {
            let path = out_dir.join(format!("summary-{}.md", stamp));
            tokio::fs::write(&path, summary).await?;
            path
        }
        RepurposeOutput::Notes { notes } => {
            let path = out_dir.join(format!("notes-{}.md", stamp));
            tokio::fs::write(&path, notes).await?;
            path
        }
        RepurposeOutput::Quiz { quiz } => {
            let path = out_dir.join(format!("quiz-{}.json", stamp));
            tokio::fs::write(&path, serde_json::to_string_pretty(quiz)?).await?;
            path
        }
        RepurposeOutput::Lecture { lecture } => {
            let path = out_dir.join(format!("lecture-{}.json", stamp));
            tokio::fs::write(&path, serde_json::to_string_pretty(lecture)?).await?;
            path
        }
    };

    Ok(path)
}

/// Play a lecture in the terminal: slides print to stdout while narration
/// plays through the default audio device.
#[cfg(feature = "playback")]
async fn play_lecture(config: &Config, lecture: Lecture, language: &str) -> Result<()> {
    use adapt_ai::narration::language_code;
    use adapt_ai::{GoogleSynthesizer, LecturePlayer, PlaybackStatus, RodioSink, Synthesizer};
    use std::sync::Arc;

    let synthesizer: Arc<dyn Synthesizer> =
        Arc::new(GoogleSynthesizer::new(config.narration.clone())?);
    let sink = Arc::new(RodioSink::new());

    let mut playback = config.playback.clone();
    playback.language_code = language_code(language);

    let player = LecturePlayer::with_config(synthesizer, sink, playback);
    let mut rx = player.subscribe();
    player.start(lecture)?;

    let mut seen_playback = false;
    loop {
        let snapshot = rx.borrow_and_update().clone();
        match snapshot.status {
            PlaybackStatus::ShowingTitle => {
                seen_playback = true;
                if let Some(title) = &snapshot.title {
                    println!("\n=== {} ===", title);
                }
            }
            PlaybackStatus::Playing => {
                seen_playback = true;
                if !snapshot.board_text.is_empty() {
                    println!(
                        "\n[slide {}]\n{}",
                        snapshot.slide_index.map(|i| i + 1).unwrap_or_default(),
                        snapshot.board_text
                    );
                }
            }
            PlaybackStatus::Idle if seen_playback => break,
            PlaybackStatus::Idle => {}
        }
        if rx.changed().await.is_err() {
            break;
        }
    }

    player.teardown();
    Ok(())
}

#[cfg(not(feature = "playback"))]
async fn play_lecture(_config: &Config, _lecture: Lecture, _language: &str) -> Result<()> {
    Err(anyhow!("lecture playback requires the 'playback' feature"))
}

/// Start the REST API server.
#[cfg(feature = "api")]
async fn serve(config: Config, port: u16) -> Result<()> {
    use adapt_ai::{GoogleSynthesizer, Synthesizer};
    use std::sync::Arc;

    let repurposer = Arc::new(ContentRepurposer::from_config(&config.llm).await?);
    let synthesizer: Arc<dyn Synthesizer> =
        Arc::new(GoogleSynthesizer::new(config.narration.clone())?);
    let history = Arc::new(HistoryStore::new(config.history.dir.clone()).await?);

    adapt_ai::api::ApiServer::new(repurposer, synthesizer, history, port)
        .start()
        .await
}

#[cfg(not(feature = "api"))]
async fn serve(_config: Config, _port: u16) -> Result<()> {
    Err(anyhow!("the REST API requires the 'api' feature"))
}
