use std::cmp;
use std::error::Error;
use std::path::{Path, PathBuf};

use clap::{Args, Parser, Subcommand};
use serde::Serialize;
use serde_json::json;
use tracing::info;
use tracing_subscriber::EnvFilter;
use wordwise_rs::config::{DEFAULT_DICTIONARY_PATH, DEFAULT_LEMMA_PATH};
use wordwise_rs::{
    AnnotateOptions, AnnotationReport, Annotator, BookJob, Converter, HintLevel, HintRecord,
    Language, Lexicon, Lookup, MatchSource, ResourcePaths, annotate_html_file, load_lexicon,
};

use crate::terminal::{TimedProgress, percent_bar};

#[derive(Parser, Debug)]
#[command(name = "wordwise-rs", about = "Add inline word hints to e-books", version)]
pub struct Cli {
    /// Emit JSON instead of human-readable output.
    #[arg(long, global = true)]
    json: bool,

    /// Log debug details to stderr.
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Convert a book to HTML, annotate it and convert it back.
    Book {
        /// Book to annotate; any format Calibre can read.
        input: PathBuf,
        /// Output format, e.g. `epub`. Defaults to the input's format.
        #[arg(short, long)]
        format: Option<String>,
        /// Path to `ebook-convert`, when it is not on PATH.
        #[arg(long)]
        converter: Option<PathBuf>,
        #[command(flatten)]
        hints: HintArgs,
        #[command(flatten)]
        lexicon: LexiconArgs,
    },
    /// Annotate an HTML document directly.
    Html {
        /// HTML file to annotate.
        input: PathBuf,
        /// Where to write the result. Defaults to rewriting the input.
        #[arg(short, long)]
        output: Option<PathBuf>,
        #[command(flatten)]
        hints: HintArgs,
        #[command(flatten)]
        lexicon: LexiconArgs,
    },
    /// Show how words and phrases resolve against the dictionary.
    Lookup {
        /// Words or quoted phrases to resolve.
        #[arg(required_unless_present = "prefix")]
        words: Vec<String>,
        /// List dictionary entries starting with this prefix instead.
        #[arg(long)]
        prefix: Option<String>,
        /// Maximum number of prefix matches to return.
        #[arg(long, default_value_t = 10)]
        limit: usize,
        #[command(flatten)]
        hints: HintArgs,
        #[command(flatten)]
        lexicon: LexiconArgs,
    },
}

#[derive(Args, Debug)]
struct HintArgs {
    /// From 1 to 5: 1 shows hints only for the hardest words, 5 for every word.
    #[arg(short = 'l', long, default_value_t = HintLevel::MAX)]
    hint_level: HintLevel,
    /// Language of the hint text: `en` or `vi`.
    #[arg(long, default_value_t = Language::English)]
    language: Language,
}

impl HintArgs {
    fn options(&self) -> AnnotateOptions {
        AnnotateOptions::new(self.hint_level, self.language)
    }
}

#[derive(Args, Debug)]
struct LexiconArgs {
    /// Dictionary CSV with `word,phoneme,en,vi,hint_level` rows.
    #[arg(long, default_value = DEFAULT_DICTIONARY_PATH)]
    dictionary: PathBuf,
    /// Lemma CSV with `lemma,inflected` rows.
    #[arg(long, default_value = DEFAULT_LEMMA_PATH)]
    lemmas: PathBuf,
}

impl LexiconArgs {
    fn load(&self) -> Result<Lexicon, Box<dyn Error>> {
        let paths = ResourcePaths {
            dictionary: self.dictionary.clone(),
            lemmas: self.lemmas.clone(),
        };
        info!("loading dictionary and lemma map");
        let lexicon = load_lexicon(&paths)?;
        info!(
            entries = lexicon.dictionary().len(),
            lemmas = lexicon.lemmas().len(),
            "lexicon ready"
        );
        Ok(lexicon)
    }
}

pub fn run() -> Result<(), Box<dyn Error>> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);
    match cli.command {
        Command::Book {
            input,
            format,
            converter,
            hints,
            lexicon,
        } => handle_book(
            &input,
            format.as_deref(),
            converter.as_deref(),
            &hints,
            &lexicon,
            cli.json,
        ),
        Command::Html {
            input,
            output,
            hints,
            lexicon,
        } => handle_html(&input, output.as_deref(), &hints, &lexicon, cli.json),
        Command::Lookup {
            words,
            prefix,
            limit,
            hints,
            lexicon,
        } => handle_lookup(words, prefix, limit, &hints, &lexicon, cli.json),
    }
}

fn init_tracing(verbose: bool) {
    let default_level = if verbose { "debug" } else { "info" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn handle_book(
    input: &Path,
    format: Option<&str>,
    converter: Option<&Path>,
    hints: &HintArgs,
    lexicon_args: &LexiconArgs,
    as_json: bool,
) -> Result<(), Box<dyn Error>> {
    info!(hint_level = %hints.hint_level, language = %hints.language, "annotating book");
    let lexicon = lexicon_args.load()?;
    let converter = match converter {
        Some(program) => Converter::with_program(program)?,
        None => Converter::locate()?,
    };
    let job = BookJob::new(input, format, converter)?;
    info!(
        input = %job.input().display(),
        output = %job.output().display(),
        "book job prepared"
    );

    let progress = TimedProgress::start("Converting book");
    let extracted = job.extract();
    progress.finish();
    extracted?;

    let annotator = Annotator::new(&lexicon, hints.options());
    let report = annotate_with_bar(|on_progress| job.annotate(&annotator, on_progress))?;
    job.patch_title();

    let progress = TimedProgress::start("Creating book");
    let built = job.rebuild().map(Path::to_path_buf);
    progress.finish();
    let output = built?;

    print_report(&report, &output, as_json)
}

fn handle_html(
    input: &Path,
    output: Option<&Path>,
    hints: &HintArgs,
    lexicon_args: &LexiconArgs,
    as_json: bool,
) -> Result<(), Box<dyn Error>> {
    let lexicon = lexicon_args.load()?;
    let annotator = Annotator::new(&lexicon, hints.options());
    let output = output.unwrap_or(input);
    let report = annotate_with_bar(|on_progress| {
        annotate_html_file(input, output, &annotator, on_progress)
    })?;
    print_report(&report, output, as_json)
}

/// Runs an annotation pass while a percentage bar follows the scanner.
fn annotate_with_bar<F, E>(annotate: F) -> Result<AnnotationReport, E>
where
    F: FnOnce(&mut dyn FnMut(usize, usize)) -> Result<AnnotationReport, E>,
{
    let bar = percent_bar("Processing book");
    let mut on_progress = |offset: usize, total: usize| {
        if total > 0 {
            bar.set_position((offset.saturating_mul(100) / total) as u64);
        }
    };
    let result = annotate(&mut on_progress);
    bar.finish();
    result
}

fn print_report(
    report: &AnnotationReport,
    output: &Path,
    as_json: bool,
) -> Result<(), Box<dyn Error>> {
    if as_json {
        let payload = json!({
            "words": report.words,
            "annotated": report.annotated,
            "output": output.display().to_string(),
        });
        println!("{}", serde_json::to_string_pretty(&payload)?);
    } else {
        println!(
            "Processed {} words, added hints for {} words",
            report.words, report.annotated
        );
        println!("Annotated output written to {}", output.display());
    }
    Ok(())
}

#[derive(Debug, Serialize)]
struct LookupRow<'a> {
    query: &'a str,
    status: &'static str,
    word: Option<&'a str>,
    lemma: Option<&'a str>,
    hint_level: Option<HintLevel>,
    meaning: Option<String>,
}

fn handle_lookup(
    words: Vec<String>,
    prefix: Option<String>,
    limit: usize,
    hints: &HintArgs,
    lexicon_args: &LexiconArgs,
    as_json: bool,
) -> Result<(), Box<dyn Error>> {
    let lexicon = lexicon_args.load()?;
    if let Some(prefix) = prefix {
        let limit = cmp::max(1, limit);
        let matches = lexicon.dictionary().prefix(&prefix.to_lowercase(), limit);
        return print_prefix(&prefix, &matches, hints.language, as_json);
    }

    let annotator = Annotator::new(&lexicon, hints.options());
    let rows: Vec<LookupRow<'_>> = words
        .iter()
        .map(|query| lookup_row(query, annotator.lookup(query), hints.language))
        .collect();

    if as_json {
        println!("{}", serde_json::to_string_pretty(&rows)?);
    } else {
        print_lookup_table(&rows);
    }
    Ok(())
}

fn lookup_row<'a>(query: &'a str, lookup: Lookup<'a>, language: Language) -> LookupRow<'a> {
    let (status, resolution) = match lookup {
        Lookup::Hint(resolution) => ("hint", Some(resolution)),
        Lookup::AboveThreshold(resolution) => ("above-threshold", Some(resolution)),
        Lookup::Unknown => ("unknown", None),
    };
    LookupRow {
        query,
        status,
        word: resolution.map(|r| r.record.word.as_str()),
        lemma: resolution.and_then(|r| match r.source {
            MatchSource::Lemma(lemma) => Some(lemma),
            MatchSource::Exact => None,
        }),
        hint_level: resolution.map(|r| r.record.hint_level),
        meaning: resolution.map(|r| r.record.meaning(language)),
    }
}

fn print_lookup_table(rows: &[LookupRow<'_>]) {
    if rows.is_empty() {
        println!("No words provided.");
        return;
    }
    let width = rows
        .iter()
        .map(|row| row.query.chars().count())
        .max()
        .unwrap_or(4)
        .max("WORD".len());
    println!("{:<width$}  {:<15}  {:<5}  {}", "WORD", "STATUS", "LEVEL", "HINT");
    println!("{:-<width$}  {:-<15}  {:-<5}  {}", "", "", "", "----");
    for row in rows {
        let level = row
            .hint_level
            .map(|level| level.to_string())
            .unwrap_or_else(|| "-".to_string());
        let mut hint = row.meaning.clone().unwrap_or_default();
        if let Some(lemma) = row.lemma {
            hint = format!("{hint} (via {lemma})");
        }
        println!(
            "{:<width$}  {:<15}  {:<5}  {}",
            row.query, row.status, level, hint
        );
    }
}

fn print_prefix(
    prefix: &str,
    matches: &[&HintRecord],
    language: Language,
    as_json: bool,
) -> Result<(), Box<dyn Error>> {
    if as_json {
        let payload = json!({
            "prefix": prefix,
            "results": matches,
        });
        println!("{}", serde_json::to_string_pretty(&payload)?);
        return Ok(());
    }
    if matches.is_empty() {
        println!("No entries matched prefix \"{prefix}\".");
        return Ok(());
    }
    let width = matches
        .iter()
        .map(|record| record.word.chars().count())
        .max()
        .unwrap_or(prefix.len())
        .max("WORD".len());
    println!("Matches for prefix \"{prefix}\":");
    println!("{:<width$}  {:<5}  {}", "WORD", "LEVEL", "HINT");
    println!("{:-<width$}  {:-<5}  {}", "", "", "----");
    for record in matches {
        println!(
            "{:<width$}  {:<5}  {}",
            record.word,
            record.hint_level.to_string(),
            record.meaning(language)
        );
    }
    Ok(())
}
