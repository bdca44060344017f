// src/bin/ax.rs

//! Driver program _ax_ for the library _axlib_.
//!
//! Processes user-passed command-line arguments. Then finds the files under
//! the passed paths, matches each file to a parser, and prints the extracted
//! events of each file in the order they were found.
//!
//! Files are processed on a set of worker threads. Each worker processes one
//! file at a time with its own [`BufferedMediator`] and sends the result to
//! the main thread over a channel. The main thread prints results in the
//! order of the passed paths.
//!
//! Ctrl-C sets the abort flag polled by the parsers; files being processed
//! stop early and files not yet started are skipped.
//!
//! [`BufferedMediator`]: axlib::readers::mediator::BufferedMediator

#![allow(non_camel_case_types)]

cfg_if::cfg_if! {
    if #[cfg(feature = "jemalloc")] {
        use ::tikv_jemallocator::Jemalloc;
        #[global_allocator]
        static GLOBAL: Jemalloc = Jemalloc;
        const CLI_HELP_AFTER_ALLOCATOR: &str = "jemalloc";
    }
    else if #[cfg(feature = "mimalloc")] {
        use ::mimalloc::MiMalloc;
        #[global_allocator]
        static GLOBAL: MiMalloc = MiMalloc;
        const CLI_HELP_AFTER_ALLOCATOR: &str = "mimalloc";
    }
    else {
        const CLI_HELP_AFTER_ALLOCATOR: &str = "system";
    }
}

use std::collections::BTreeMap;
use std::io::Write;
use std::process::ExitCode;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;

use ::axlib::common::{Count, FPath, File, FileProcessingResult, FileSz};
use ::axlib::data::datetime::{systemtime_to_year, year_now, Year};
use ::axlib::data::event::ExtractionWarning;
#[allow(unused_imports)]
use ::axlib::debug::printers::{de_err, de_wrn, e_err, e_wrn, eprint_colored, Color, ColorChoice};
use ::axlib::plugins::{build_parser_registry, PRESETS};
use ::axlib::readers::dispatcher::{DispatchError, Dispatcher, ProcessedFile};
use ::axlib::readers::filepreprocessor::{process_path, ProcessPathResult};
use ::axlib::readers::filter::FilterExpression;
use ::axlib::readers::mediator::{BufferedMediator, ParserContext, ProducedEvent};
use ::axlib::readers::registry::{HandlerClass, ParserRegistry};
use ::axlib::readers::summary::{SummaryFile, SummaryParserData};

use ::anyhow::Context;
use ::clap::{Parser, ValueEnum};
use ::const_format::concatcp;
use ::crossbeam_channel;
#[allow(unused_imports)]
use ::si_trace_print::{defn, defo, defx, defñ};

// --------------------
// command-line parsing

/// CLI enum that maps to [`termcolor::ColorChoice`].
///
/// [`termcolor::ColorChoice`]: https://docs.rs/termcolor/1.1.2/termcolor/enum.ColorChoice.html
#[derive(Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd, ValueEnum)]
enum CLI_Color_Choice {
    always,
    auto,
    never,
}

impl CLI_Color_Choice {
    const fn color_choice(&self) -> ColorChoice {
        match self {
            CLI_Color_Choice::always => ColorChoice::Always,
            CLI_Color_Choice::auto => ColorChoice::Auto,
            CLI_Color_Choice::never => ColorChoice::Never,
        }
    }
}

/// Default count of file processing threads.
const CLI_THREADS_DEFAULT: usize = 4;

#[cfg(debug_assertions)]
const CLI_HELP_AFTER_NOTE_DEBUG: &str = "\nDEBUG BUILD";
#[cfg(not(debug_assertions))]
const CLI_HELP_AFTER_NOTE_DEBUG: &str = "";

/// `--help` _afterword_ message.
const CLI_HELP_AFTER: &str = concatcp!(
    "\
Every file found is offered to each selected parser in turn; the first parser
that recognizes the file extracts its events. Files no parser recognizes are
reported and skipped.

PARSERS is a comma-separated filter expression, e.g.
    \"linux\"               every parser and plugin of preset \"linux\"
    \"text\"                parser \"text\" and all its plugins
    \"text/syslog\"         only plugin \"syslog\" of parser \"text\"
    \"!jsonl\"              every parser except \"jsonl\"
    \"text,!text/xchatlog\" parser \"text\" except its plugin \"xchatlog\"
See --list-parsers and --list-presets.

Year-less timestamps, e.g. syslog \"Jan  2 03:04:05\", presume the year of the
file modification time for the first record, unless --year is passed.",
    CLI_HELP_AFTER_NOTE_DEBUG,
);

#[derive(Parser, Debug)]
#[clap(
    about = env!("CARGO_PKG_DESCRIPTION"),
    author = env!("CARGO_PKG_AUTHORS"),
    name = "ax",
    version = concatcp!(
        "Version: ",
        env!("CARGO_PKG_VERSION"), "\n",
        "MSRV: ", env!("CARGO_PKG_RUST_VERSION"), "\n",
        "Allocator: ", CLI_HELP_AFTER_ALLOCATOR, "\n",
        "License: ", env!("CARGO_PKG_LICENSE"), "\n",
    ),
    after_help = CLI_HELP_AFTER,
    verbatim_doc_comment,
)]
struct CLI_Args {
    /// Path(s) of artifact files or directories.
    /// Directories will be recursed. Symlinks will be followed.
    #[clap(
        required_unless_present_any = ["list_parsers", "list_presets"],
        verbatim_doc_comment,
    )]
    paths: Vec<String>,

    /// Filter expression selecting the parsers and plugins to use.
    /// If not passed then every parser is used.
    #[clap(
        short = 'p',
        long,
        verbatim_doc_comment,
        default_value = "",
        hide_default_value = true,
    )]
    parsers: String,

    /// Encoding of text files when a plugin does not declare one, e.g.
    /// "utf-8", "windows-1252", "shift_jis".
    #[clap(
        long = "code-page",
        verbatim_doc_comment,
        default_value = BufferedMediator::CODE_PAGE_DEFAULT,
    )]
    code_page: String,

    /// Year of the first record of files with year-less timestamps.
    /// If not passed then the year of the file modification time is used.
    #[clap(
        short = 'y',
        long,
        verbatim_doc_comment,
    )]
    year: Option<Year>,

    /// Print the registered parsers and their plugins, then exit.
    #[clap(
        long = "list-parsers",
        verbatim_doc_comment,
    )]
    list_parsers: bool,

    /// Print the filter presets, then exit.
    #[clap(
        long = "list-presets",
        verbatim_doc_comment,
    )]
    list_presets: bool,

    /// Print a summary of each file processed to stderr.
    #[clap(
        short = 's',
        long,
        verbatim_doc_comment,
    )]
    summary: bool,

    /// Print events as JSON, one object per line.
    #[clap(
        short = 'j',
        long,
        verbatim_doc_comment,
    )]
    json: bool,

    /// Count of files processed at once.
    #[clap(
        long,
        verbatim_doc_comment,
        default_value_t = CLI_THREADS_DEFAULT,
        value_parser = cli_parse_threads,
    )]
    threads: usize,

    /// Choose to print to terminal using colors.
    #[clap(
        required = false,
        short = 'c',
        long = "color",
        verbatim_doc_comment,
        value_enum,
        default_value_t=CLI_Color_Choice::auto,
    )]
    color_choice: CLI_Color_Choice,
}

/// `clap` argument validator for `--threads`.
fn cli_parse_threads(value: &str) -> Result<usize, String> {
    match value.parse::<usize>() {
        Ok(val) if (1..=256).contains(&val) => Ok(val),
        Ok(val) => Err(format!("threads {} not in range 1 to 256", val)),
        Err(err) => Err(err.to_string()),
    }
}

// ---------------
// file processing

/// Settings shared by every file processing thread.
#[derive(Debug)]
struct ProcessingConfig {
    code_page: String,
    year: Option<Year>,
    latest_year: Year,
    abort: Arc<AtomicBool>,
}

/// Everything one file processing thread sends to the main thread.
#[derive(Debug)]
struct FileOutput {
    result: FileProcessingResult<std::io::Error>,
    events: Vec<ProducedEvent>,
    warnings: Vec<ExtractionWarning>,
    summary: SummaryFile,
}

/// Index of a path in the order passed, and the path.
type ChanJob = (usize, FPath, FileSz);
type ChanResult = (usize, FileOutput);

/// The estimated year of the first record of `file`.
fn estimated_year(
    config: &ProcessingConfig,
    file: &File,
) -> Year {
    if let Some(year) = config.year {
        return year;
    }
    match file.metadata().and_then(|metadata| metadata.modified()) {
        Ok(modified) => systemtime_to_year(&modified),
        Err(_err) => {
            de_wrn!("file modified time: {}", _err);
            year_now()
        }
    }
}

/// Provenance chain of a processed file, e.g. `"text/syslog"`.
fn parser_chain(processed: &ProcessedFile) -> String {
    let plugin: &str = match &processed.summary {
        SummaryParserData::Text(summary) => &summary.TextParser_plugin,
        SummaryParserData::Jsonl(summary) => &summary.JsonlParser_plugin,
        SummaryParserData::Dummy => "",
    };
    if plugin.is_empty() {
        return processed.parser.clone();
    }

    format!("{}/{}", processed.parser, plugin)
}

/// Match `path` to a parser and extract its events.
fn process_file(
    dispatcher: &Dispatcher,
    config: &ProcessingConfig,
    path: &FPath,
) -> FileOutput {
    defn!("({:?})", path);
    let mut file: File = match File::open(path) {
        Ok(val) => val,
        Err(err) => {
            let summary = SummaryFile::new_failed(path.clone(), Some(err.to_string()));
            return FileOutput {
                result: FileProcessingResult::FileErrIo(err),
                events: Vec::new(),
                warnings: Vec::new(),
                summary,
            };
        }
    };
    let estimated: Year = estimated_year(config, &file);
    let mut mediator = BufferedMediator::new(path, estimated)
        .with_code_page(&config.code_page)
        .with_latest_year(Some(config.latest_year.max(estimated)))
        .with_abort(config.abort.clone());
    let processed: Result<ProcessedFile, DispatchError> = {
        let mut context = ParserContext::new(&mut mediator);
        dispatcher.process(&mut context, &mut file)
    };
    let (events, warnings) = mediator.take();
    let (result, summary) = match processed {
        Ok(processed) => {
            let result = match processed.summary.aborted() {
                true => FileProcessingResult::FileErrAborted,
                false => FileProcessingResult::FileOk,
            };
            let chain: String = parser_chain(&processed);
            let summary = SummaryFile::new(
                path.clone(),
                Some(chain),
                events.len() as Count,
                warnings.len() as Count,
                processed.summary,
                None,
            );
            (result, summary)
        }
        Err(DispatchError::NoMatch(name)) => {
            let summary = SummaryFile::new_failed(path.clone(), Some(format!("no parser recognized {:?}", name)));
            (FileProcessingResult::FileErrNoParser, summary)
        }
        Err(DispatchError::Io(err)) => {
            let summary = SummaryFile::new_failed(path.clone(), Some(err.to_string()));
            (FileProcessingResult::FileErrIo(err), summary)
        }
    };
    defx!("({:?}) {:?}", path, result);

    FileOutput {
        result,
        events,
        warnings,
        summary,
    }
}

/// Worker thread; process jobs until the job channel closes.
fn exec_fileprocessor_thread(
    dispatcher: &Dispatcher,
    config: &ProcessingConfig,
    recv_job: crossbeam_channel::Receiver<ChanJob>,
    send_result: crossbeam_channel::Sender<ChanResult>,
) {
    for (index, path, _filesz) in recv_job.iter() {
        if config.abort.load(Ordering::Relaxed) {
            defo!("abort, skip {:?}", path);
            continue;
        }
        let output: FileOutput = process_file(dispatcher, config, &path);
        if send_result.send((index, output)).is_err() {
            de_err!("send_result.send failed for {:?}", path);
            break;
        }
    }
}

// --------
// printing

/// Print the events of one file to stdout, and its warnings to stderr.
fn print_output(
    path: &FPath,
    output: &FileOutput,
    json: bool,
    color_choice: ColorChoice,
) -> std::io::Result<()> {
    let stdout = std::io::stdout();
    let mut stdout = stdout.lock();
    for produced in output.events.iter() {
        if json {
            let object = ::serde_json::json!({
                "path": path,
                "timestamp": produced.event.as_ref().map(|event| event.timestamp.to_rfc3339()),
                "timestamp_description": produced.event.as_ref().map(|event| event.timestamp_description.as_str()),
                "event_data": &produced.event_data,
            });
            writeln!(stdout, "{}", object)?;
            continue;
        }
        match &produced.event {
            Some(event) => write!(stdout, "{} {:<14} ", event.timestamp.to_rfc3339(), event.timestamp_description)?,
            None => write!(stdout, "{:<32} {:<14} ", "-", "-")?,
        }
        writeln!(stdout, "[{}] {}", produced.event_data.parser, produced.event_data)?;
    }
    stdout.flush()?;
    for warning in output.warnings.iter() {
        eprint_colored("WARNING: ", Color::Yellow, &format!("{:?}: {}", path, warning), color_choice);
    }

    Ok(())
}

fn print_parsers(registry: &ParserRegistry) {
    for (name, class) in registry.iter() {
        println!("{}: {}", name, class.descriptor().data_format);
        for plugin in class.plugins().iter() {
            println!("  {}/{}: {}", name, plugin.name, plugin.data_format);
        }
    }
}

fn print_presets() {
    for (name, tokens) in PRESETS.iter() {
        println!("{}: {}", name, tokens.join(","));
    }
}

/// set a process signal handler that sets `abort`
fn set_signal_handler(abort: Arc<AtomicBool>) -> Result<(), ::ctrlc::Error> {
    ::ctrlc::set_handler(move || {
        defñ!("signal");
        abort.store(true, Ordering::Relaxed);
    })
}

// ----
// main

/// Find the files of every path. Invalid paths are reported.
fn find_files(paths: &[String]) -> (Vec<(FPath, FileSz)>, bool) {
    let mut files: Vec<(FPath, FileSz)> = Vec::new();
    let mut all_ok: bool = true;
    for path in paths.iter() {
        for result in process_path(path) {
            match result {
                ProcessPathResult::FileValid(fpath, filesz) => files.push((fpath, filesz)),
                ProcessPathResult::FileErrEmpty(fpath) => {
                    defo!("empty file {:?}", fpath);
                }
                ProcessPathResult::FileErrNotAFile(fpath) => {
                    e_wrn!("not a file {:?}", fpath);
                }
                ProcessPathResult::FileErrNotExist(fpath) => {
                    e_err!("path not found {:?}", fpath);
                    all_ok = false;
                }
            }
        }
    }

    (files, all_ok)
}

fn run(args: CLI_Args) -> anyhow::Result<bool> {
    let registry: ParserRegistry = build_parser_registry().context("parser registration failed")?;
    if args.list_parsers {
        print_parsers(&registry);
    }
    if args.list_presets {
        print_presets();
    }
    if args.list_parsers || args.list_presets {
        return Ok(true);
    }

    let filter: FilterExpression = match args.parsers.trim().is_empty() {
        true => FilterExpression::all(),
        false => FilterExpression::parse(&args.parsers, &PRESETS),
    };
    let dispatcher: Dispatcher = Dispatcher::new(&registry, &filter);
    if dispatcher.candidates().is_empty() {
        anyhow::bail!("parsers {:?} selects no parser", args.parsers);
    }
    defo!("candidates {:?}", dispatcher.candidates());

    let abort: Arc<AtomicBool> = Arc::new(AtomicBool::new(false));
    set_signal_handler(abort.clone()).context("set Ctrl-C handler failed")?;
    let config = ProcessingConfig {
        code_page: args.code_page.clone(),
        year: args.year,
        latest_year: year_now(),
        abort,
    };
    let color_choice: ColorChoice = args.color_choice.color_choice();

    let (files, mut all_ok) = find_files(&args.paths);
    let threads: usize = args.threads.min(files.len()).max(1);
    let (send_job, recv_job) = crossbeam_channel::bounded::<ChanJob>(threads);
    let (send_result, recv_result) = crossbeam_channel::unbounded::<ChanResult>();

    thread::scope(|scope| -> anyhow::Result<()> {
        for _ in 0..threads {
            let recv_job = recv_job.clone();
            let send_result = send_result.clone();
            let dispatcher = &dispatcher;
            let config = &config;
            thread::Builder::new()
                .spawn_scoped(scope, move || exec_fileprocessor_thread(dispatcher, config, recv_job, send_result))
                .context("spawn file processing thread failed")?;
        }
        drop(send_result);
        drop(recv_job);
        let files_ = &files;
        scope.spawn(move || {
            for (index, (path, filesz)) in files_.iter().enumerate() {
                if send_job.send((index, path.clone(), *filesz)).is_err() {
                    break;
                }
            }
        });

        // print in the order of the paths passed
        let mut pending: BTreeMap<usize, FileOutput> = BTreeMap::new();
        let mut index_next: usize = 0;
        for (index, output) in recv_result.iter() {
            pending.insert(index, output);
            while let Some(output) = pending.remove(&index_next) {
                let path: &FPath = &files[index_next].0;
                match &output.result {
                    FileProcessingResult::FileErrNoParser => e_wrn!("no parser recognized {:?}", path),
                    FileProcessingResult::FileErrIo(err) => e_err!("{:?}: {}", path, err),
                    _ => {}
                }
                if output.result.is_err() {
                    all_ok = false;
                }
                print_output(path, &output, args.json, color_choice)?;
                if args.summary {
                    eprintln!("{}", output.summary);
                }
                index_next += 1;
            }
        }

        Ok(())
    })?;

    if config.abort.load(Ordering::Relaxed) {
        e_wrn!("interrupted");
        all_ok = false;
    }

    Ok(all_ok)
}

pub fn main() -> ExitCode {
    let args = CLI_Args::parse();
    defo!("{:?}", args);
    match run(args) {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::FAILURE,
        Err(err) => {
            e_err!("{:#}", err);
            ExitCode::FAILURE
        }
    }
}
