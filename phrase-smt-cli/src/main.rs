use clap::{Arg, ArgAction, ArgMatches, Command, value_parser};
use phrase_smt::{Translation, Translator, TranslatorConfig};
use std::fs;
use std::io::{self, Read, Write};
use std::path::Path;
use std::sync::Arc;
use tokio::sync::Semaphore;
use tracing::{info, warn};

type BoxError = Box<dyn std::error::Error + Send + Sync>;

fn cli() -> Command {
    Command::new("phrase-smt")
        .version("0.1.0")
        .about("Translate tokenized text with a phrase-based SMT model")
        .arg(
            Arg::new("config")
                .long("config")
                .short('c')
                .help("Translator configuration (JSON)")
                .required(true),
        )
        .arg(
            Arg::new("input-text")
                .long("input-text")
                .short('t')
                .help("Translate this text instead of reading input lines")
                .conflicts_with("input-file"),
        )
        .arg(
            Arg::new("input-file")
                .long("input-file")
                .short('i')
                .help("File with one sentence per line (default: stdin)"),
        )
        .arg(
            Arg::new("output")
                .long("output")
                .short('o')
                .help("Write translations here (default: stdout)"),
        )
        .arg(
            Arg::new("max-threads")
                .long("max-threads")
                .short('n')
                .help("Sentences decoded in parallel")
                .value_parser(value_parser!(usize))
                .default_value("5"),
        )
        .arg(
            Arg::new("json")
                .long("json")
                .help("Print one JSON object per sentence with phrases and cost")
                .action(ArgAction::SetTrue),
        )
        .arg(
            Arg::new("verbose")
                .long("verbose")
                .short('v')
                .help("Log search statistics")
                .action(ArgAction::SetTrue),
        )
}

#[tokio::main]
async fn main() -> Result<(), BoxError> {
    let matches = cli().get_matches();

    let level = if matches.get_flag("verbose") {
        "debug"
    } else {
        "info"
    };
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env().add_directive(level.parse()?))
        .with_writer(io::stderr)
        .init();

    let config_path = matches
        .get_one::<String>("config")
        .ok_or("Missing --config")?;
    let max_threads = matches
        .get_one::<usize>("max-threads")
        .copied()
        .unwrap_or(5);

    let config = TranslatorConfig::from_file(Path::new(config_path))?;
    let translator =
        Arc::new(tokio::task::spawn_blocking(move || Translator::from_config(&config)).await??);

    let lines = read_input(&matches)?;
    info!(
        "Translating {} lines with up to {} threads",
        lines.len(),
        max_threads
    );
    let translations = translate_lines(translator, lines, max_threads).await?;

    let output = render_output(&translations, matches.get_flag("json"))?;
    match matches.get_one::<String>("output") {
        Some(path) => fs::write(path, output)?,
        None => io::stdout().write_all(output.as_bytes())?,
    }
    Ok(())
}

fn read_input(matches: &ArgMatches) -> io::Result<Vec<String>> {
    if let Some(text) = matches.get_one::<String>("input-text") {
        return Ok(vec![text.clone()]);
    }
    let content = match matches.get_one::<String>("input-file") {
        Some(path) => fs::read_to_string(path)?,
        None => {
            let mut buffer = String::new();
            io::stdin().read_to_string(&mut buffer)?;
            buffer
        }
    };
    Ok(content.lines().map(|line| line.to_string()).collect())
}

/// Decode every line on the blocking pool, at most `max_threads` at a time,
/// returning results in input order
async fn translate_lines(
    translator: Arc<Translator>,
    lines: Vec<String>,
    max_threads: usize,
) -> Result<Vec<Translation>, BoxError> {
    let semaphore = Arc::new(Semaphore::new(max_threads.max(1)));
    let mut handles = Vec::with_capacity(lines.len());

    for (idx, line) in lines.into_iter().enumerate() {
        let permit = Arc::clone(&semaphore).acquire_owned().await?;
        let translator = Arc::clone(&translator);
        handles.push(tokio::task::spawn_blocking(move || {
            let _permit = permit;
            translate_or_copy(&translator, idx + 1, &line)
        }));
    }

    let mut translations = Vec::with_capacity(handles.len());
    for handle in handles {
        translations.push(handle.await?);
    }
    Ok(translations)
}

fn translate_or_copy(translator: &Translator, line_number: usize, line: &str) -> Translation {
    match translator.translate(line) {
        Ok(translation) => translation,
        Err(e) => {
            warn!("Line {}: {}; copying the input", line_number, e);
            Translation::pass_through(line)
        }
    }
}

fn render_output(translations: &[Translation], json: bool) -> serde_json::Result<String> {
    let mut output = String::new();
    for translation in translations {
        if json {
            output.push_str(&serde_json::to_string(translation)?);
        } else {
            output.push_str(&translation.text);
        }
        output.push('\n');
    }
    Ok(output)
}
