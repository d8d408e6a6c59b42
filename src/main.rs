use clap::{Arg, ArgAction, Command};
use serde::Serialize;
use static_i18n::{Event, Options, SourceFile, Translator};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, error, info, warn};
use tracing_subscriber::EnvFilter;

#[derive(Serialize)]
struct Written {
    source: PathBuf,
    lang: String,
    path: PathBuf,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let matches = Command::new("static-i18n")
        .version(env!("CARGO_PKG_VERSION"))
        .about("Translate static site templates into every locale of a gettext catalog tree")
        .arg(
            Arg::new("files")
                .help("Template files to translate")
                .required(true)
                .num_args(1..)
                .index(1),
        )
        .arg(
            Arg::new("locale-dir")
                .long("locale-dir")
                .short('l')
                .help("Locale directory; repeat for more, the first one lists the locales (default: locale)")
                .action(ArgAction::Append),
        )
        .arg(
            Arg::new("default-lang")
                .long("default-lang")
                .short('d')
                .help("Locale always translated into (default: fa)"),
        )
        .arg(
            Arg::new("config")
                .long("config")
                .short('c')
                .help("JSON file with localeDirs, defaultLang and completionDelayMs"),
        )
        .arg(
            Arg::new("base")
                .long("base")
                .short('b')
                .help("Directory output paths are relative to")
                .default_value("."),
        )
        .arg(
            Arg::new("out")
                .long("out")
                .short('o')
                .help("Destination directory")
                .default_value("dist"),
        )
        .arg(
            Arg::new("completion-delay")
                .long("completion-delay")
                .help("Report files as translated this many milliseconds late")
                .value_parser(clap::value_parser!(u64)),
        )
        .arg(
            Arg::new("verbose")
                .long("verbose")
                .short('v')
                .help("Log catalog loading and every written file")
                .action(ArgAction::SetTrue),
        )
        .arg(
            Arg::new("json")
                .long("json")
                .help("Print a JSON manifest of the written files")
                .action(ArgAction::SetTrue),
        )
        .get_matches();

    let level = if matches.get_flag("verbose") {
        "debug"
    } else {
        "info"
    };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level)),
        )
        .with_writer(std::io::stderr)
        .init();

    let mut options = match matches.get_one::<String>("config") {
        Some(path) => Options::load(Path::new(path))?,
        None => Options::default(),
    };
    if let Some(dirs) = matches.get_many::<String>("locale-dir") {
        options.locale_dirs = dirs.map(PathBuf::from).collect();
    }
    if let Some(lang) = matches.get_one::<String>("default-lang") {
        options.default_lang = lang.clone();
    }
    if let Some(delay_ms) = matches.get_one::<u64>("completion-delay") {
        options.completion_delay_ms = Some(*delay_ms);
    }

    let base = matches
        .get_one::<String>("base")
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from("."));
    let out = matches
        .get_one::<String>("out")
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from("dist"));

    let translator = Arc::new(Translator::with_builtin_handlers(options));
    info!(locales = ?translator.locales()?, "🌍 Translating");

    let mut stream = Arc::clone(&translator).stream();
    if let Some(files) = matches.get_many::<String>("files") {
        for path in files.map(Path::new) {
            let file = match SourceFile::read(path, &base).await {
                Ok(file) => file,
                Err(e) => {
                    warn!(path = %path.display(), error = %e, "cannot read file");
                    SourceFile::empty(path).with_base(&base)
                }
            };
            stream.files.send(file)?;
        }
    }
    drop(stream.files);

    let mut written = Vec::new();
    let mut failures = 0;
    while let Some(event) = stream.events.recv().await {
        match event {
            Event::File(file) => {
                let Some(contents) = file.contents() else {
                    debug!(source = %file.source.display(), lang = %file.lang, "no handler for file kind");
                    continue;
                };
                let dest = out.join(file.relative_path());
                if let Some(parent) = dest.parent() {
                    tokio::fs::create_dir_all(parent).await?;
                }
                tokio::fs::write(&dest, contents).await?;
                debug!(path = %dest.display(), "written");
                written.push(Written {
                    source: file.source.clone(),
                    lang: file.lang.clone(),
                    path: dest,
                });
            }
            Event::Error { plugin, error } => {
                error!(plugin, %error, "❌ Translation failed");
                failures += 1;
            }
            Event::Translated(file) => {
                info!(path = %file.path.display(), "✅ Translated");
            }
        }
    }
    stream.task.await?;

    if matches.get_flag("json") {
        println!("{}", serde_json::to_string_pretty(&written)?);
    }
    info!(files = written.len(), out = %out.display(), "Done");

    if failures > 0 {
        return Err(format!("{} translation error(s)", failures).into());
    }
    Ok(())
}
