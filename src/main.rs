use std::{
    path::{
        Path,
        PathBuf,
    },
    process::ExitCode,
};

use clap::{
    Parser,
    Subcommand,
};
use kotodeck::{
    anki::{
        write_archive,
        write_package,
        AnkiConnectClient,
        DeckAssembler,
    },
    audio::{
        elevenlabs::ElevenLabsSynthesizer,
        AudioGenerator,
    },
    core::{
        input::{
            read_input_file,
            validate_input,
        },
        pipeline::{
            build_deck,
            VocabularyProcessor,
        },
        Config,
        KotoError,
    },
    report::{
        create_results_directory,
        save_csv,
        save_data_json,
        save_summary,
        Metadata,
    },
    segmentation::tokenizer::VibratoTools,
};
use log::{
    error,
    info,
    warn,
};

#[derive(Parser, Debug)]
#[command(name = "kotodeck", version, about = "Japanese vocabulary to flashcard deck compiler")]
struct Args {
    /// Path to config.json (defaults to the per-user data directory)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Enable verbose (debug) logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Build a deck from a vocabulary JSON file
    Generate {
        input: PathBuf,

        /// Skip speech synthesis even for entries that request audio
        #[arg(long)]
        no_audio: bool,

        /// Also push the deck into a running Anki through AnkiConnect
        #[arg(long)]
        anki_connect: bool,
    },
    /// Print the effective configuration
    Config,
}

fn main() -> ExitCode {
    let args = Args::parse();

    let default_level = if args.verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_level)).init();

    let result = Config::load(args.config.as_deref()).and_then(|config| match args.command {
        Command::Generate { input, no_audio, anki_connect } => {
            generate(&config, &input, no_audio, anki_connect)
        }
        Command::Config => show_config(&config),
    });

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{}", e);
            ExitCode::FAILURE
        }
    }
}

fn show_config(config: &Config) -> Result<(), KotoError> {
    println!("{}", serde_json::to_string_pretty(&config.to_masked_json()?)?);
    Ok(())
}

fn generate(config: &Config, input_path: &Path, no_audio: bool, anki_connect: bool) -> Result<(), KotoError> {
    let input = read_input_file(input_path)?;
    let entries = validate_input(&input.vocabulary)?;
    info!("Loaded {} vocabulary items from {}", entries.len(), input_path.display());

    let results = create_results_directory(&config.results_dir)?;
    let tools = VibratoTools::load(config.dictionary, None)?;

    let wants_audio = !no_audio && entries.iter().any(|e| e.audio_count.is_some());
    let synthesizer = match wants_audio {
        true if config.api_key_set() => Some(ElevenLabsSynthesizer::new(&config.tts)?),
        true => {
            warn!("No ElevenLabs API key configured, generating cards without audio");
            None
        }
        false => None,
    };
    let generator = synthesizer
        .as_ref()
        .map(|synthesizer| AudioGenerator::new(synthesizer, config.tts.concurrency))
        .transpose()?;

    let mut processor = VocabularyProcessor::new(&tools, &tools);
    if let Some(generator) = &generator {
        processor = processor.with_audio(generator, config.audio_failure);
    }

    let words = processor.process_vocabulary(&entries, &results.audio_dir)?;
    let deck = build_deck(&words, &DeckAssembler::new(&config.anki)?, &results.media_dir)?;
    let package_path = write_package(&deck, &results.root)?;
    let archive_path = write_archive(&deck, &results.root)?;

    if anki_connect {
        let runtime = tokio::runtime::Runtime::new()?;
        match runtime.block_on(AnkiConnectClient::new(&config.anki).export(&deck)) {
            Ok(added) => info!("Added {} notes to Anki deck {}", added, deck.name),
            Err(e) => warn!("AnkiConnect export failed, {} can still be imported: {}", package_path.display(), e),
        }
    }

    let json_path = save_data_json(&results.root, &input.vocabulary, &words)?;
    let summary_path = save_summary(&results.root, &words)?;
    let csv_path = save_csv(&results.root, &words)?;

    let metadata = Metadata::from_words(&words);
    println!("Processed {} words into {} notes", metadata.total_words, metadata.total_notes);
    println!("  Audio files: {}", metadata.total_audio_files);
    println!("  Media files: {}", deck.media_files.len());
    println!("Saved:");
    for path in [&package_path, &archive_path, &json_path, &summary_path, &csv_path] {
        println!("  - {}", path.display());
    }

    Ok(())
}
