//! `postbox-batch`: download documents from a saved or live ING Post-Box page.

use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::sync::Arc;

use clap::{Args, Parser, Subcommand};
use engine_logging::{engine_info, engine_warn, level_for_verbosity, LogDestination};
use postbox_core::{
    filename_for, select_entries, text, AppState, AppViewModel, CancelFlag, Entry, EntrySource,
    Msg, Preferences, TextKey,
};
use postbox_engine::{
    ensure_output_dir, BatchRunner, Fetcher, HtmlEntrySource, HttpDownloader, HttpReadMarker,
    LogProgressSink, ReqwestFetcher, RunReport, RonPreferenceStore,
};
use tokio::sync::mpsc;

use postbox_app::config::{self, Credentials};
use postbox_app::effects::EffectRunner;
use postbox_app::session::Session;
use postbox_app::settings::{self, toggle, Overrides};

/// Batch-download documents from an ING Post-Box page
#[derive(Parser)]
#[command(name = "postbox-batch")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Enable verbose output (repeat for more)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Preferences file
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Also write the log to this file
    #[arg(long, global = true)]
    log_file: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Download the documents of a postbox page
    Run(RunArgs),

    /// Show the rows of a postbox page and their file names
    List(ListArgs),

    /// Show or change stored preferences
    Prefs(PrefsArgs),
}

#[derive(Args)]
struct PageArgs {
    /// Saved postbox page (HTML file) or its URL
    #[arg(short, long)]
    page: String,

    /// Base URL for relative links in a saved page
    #[arg(long)]
    base_url: Option<String>,

    /// Raw Cookie header of a logged-in banking session
    #[arg(long, conflicts_with = "cookie_file")]
    cookie: Option<String>,

    /// File holding the Cookie header
    #[arg(long)]
    cookie_file: Option<PathBuf>,

    /// User agent sent with every request
    #[arg(long)]
    user_agent: Option<String>,
}

impl PageArgs {
    fn credentials(&self) -> Credentials {
        Credentials {
            cookie: self.cookie.clone(),
            cookie_file: self.cookie_file.clone(),
            user_agent: self.user_agent.clone(),
        }
    }

    async fn load(&self, fetcher: &dyn Fetcher) -> anyhow::Result<HtmlEntrySource> {
        Ok(HtmlEntrySource::load(&self.page, self.base_url.as_deref(), fetcher).await?)
    }
}

#[derive(Args)]
struct NamingArgs {
    /// Filename template, e.g. "{date}_{doctype}_{subject_complete}"
    #[arg(long)]
    template: Option<String>,

    /// Date format for {date}: YYYY, YY, MM, DD
    #[arg(long)]
    date_format: Option<String>,
}

#[derive(Args)]
struct RunArgs {
    #[command(flatten)]
    page: PageArgs,

    #[command(flatten)]
    naming: NamingArgs,

    /// Language for status messages (de, en)
    #[arg(long, value_parser = settings::parse_lang)]
    lang: Option<postbox_core::Lang>,

    /// Earliest date (DD.MM.YYYY, "start" or empty)
    #[arg(long)]
    from: Option<String>,

    /// Latest date (DD.MM.YYYY, "today" or empty)
    #[arg(long)]
    to: Option<String>,

    /// Only these rows (1-based, page order), e.g. 1,3,5
    #[arg(long, value_delimiter = ',')]
    select: Vec<usize>,

    /// Directory for downloaded documents
    #[arg(short, long, default_value = ".")]
    output: PathBuf,

    /// Name files from the template
    #[arg(long, conflicts_with = "original_names")]
    rename: bool,

    /// Keep the server-provided file names
    #[arg(long)]
    original_names: bool,

    /// Open each message before downloading it
    #[arg(long, conflicts_with = "no_mark_read")]
    mark_read: bool,

    #[arg(long)]
    no_mark_read: bool,

    /// Wait longer between documents
    #[arg(long, conflicts_with = "fast")]
    slow: bool,

    #[arg(long)]
    fast: bool,
}

impl RunArgs {
    fn overrides(&self) -> Overrides {
        Overrides {
            template: self.naming.template.clone(),
            date_format: self.naming.date_format.clone(),
            use_custom_names: toggle(self.rename, self.original_names),
            mark_read: toggle(self.mark_read, self.no_mark_read),
            slow_mode: toggle(self.slow, self.fast),
            lang: self.lang,
        }
    }
}

#[derive(Args)]
struct ListArgs {
    #[command(flatten)]
    page: PageArgs,

    #[command(flatten)]
    naming: NamingArgs,

    /// Print JSON instead of a table
    #[arg(long)]
    json: bool,
}

#[derive(Args)]
struct PrefsArgs {
    #[command(subcommand)]
    command: PrefsCommand,
}

#[derive(Subcommand)]
enum PrefsCommand {
    /// Show all preferences
    Show,

    /// Print the preferences file path
    Path,

    /// Change one preference
    Set {
        /// template, date-format, custom-names, mark-read, slow-mode or lang
        name: String,
        value: String,
    },

    /// Restore the default filename template
    ResetTemplate,

    /// Restore the default date format
    ResetDateFormat,

    /// Restore all defaults except the language
    ResetAll,
}

#[tokio::main]
async fn main() -> anyhow::Result<ExitCode> {
    let cli = Cli::parse();

    let level = level_for_verbosity(cli.verbose);
    match cli.log_file.as_deref() {
        Some(path) => engine_logging::initialize(LogDestination::Both(path), level),
        None => engine_logging::initialize(LogDestination::Terminal, level),
    }

    let prefs_path = config::preferences_path(cli.config.as_deref());
    match cli.command {
        Commands::Run(args) => run(args, &prefs_path).await,
        Commands::List(args) => list(args, &prefs_path).await,
        Commands::Prefs(args) => prefs(args, &prefs_path),
    }
}

async fn run(args: RunArgs, prefs_path: &Path) -> anyhow::Result<ExitCode> {
    let cancel = CancelFlag::new();
    let store = RonPreferenceStore::open(prefs_path);
    let prefs = Preferences::load(&store, config::locale_lang());
    let effects = EffectRunner::new(Box::new(store), cancel.clone()).without_persistence();
    let mut session = Session::new(AppState::new(prefs), effects);
    for msg in args.overrides().messages() {
        session.dispatch(msg);
    }
    if let Some(from) = args.from.clone() {
        session.dispatch(Msg::FromChanged(from));
    }
    if let Some(to) = args.to.clone() {
        session.dispatch(Msg::ToChanged(to));
    }
    // "Ready." is implied.
    session.take_status_change();

    let today = chrono::Local::now().date_naive();
    session.dispatch(Msg::DatesConfirmed { today });
    if session.state().status().is_error() {
        print_status(&mut session);
        return Ok(exit_code(&session, None));
    }

    let base_settings = args.page.credentials().fetch_settings()?;
    let page_fetcher = ReqwestFetcher::new(base_settings.clone().for_pages());
    let source = args.page.load(&page_fetcher).await?;
    if let Some(max) = args.select.iter().max().filter(|max| **max > source.len()) {
        engine_warn!("Row {} selected but the page has {} rows", max, source.len());
    }
    let rows = select_entries(source.entries(), &args.select);

    let plan = session.dispatch(Msg::StartClicked {
        entries: rows,
        today,
    });
    print_status(&mut session);
    let Some(plan) = plan else {
        return Ok(exit_code(&session, None));
    };

    ensure_output_dir(&args.output)?;
    let documents: Arc<dyn Fetcher> =
        Arc::new(ReqwestFetcher::new(base_settings.clone().for_documents()));
    let messages: Arc<dyn Fetcher> = Arc::new(ReqwestFetcher::new(base_settings));
    let runner = BatchRunner::new(
        Arc::new(HttpDownloader::new(documents, args.output.clone())),
        Arc::new(HttpReadMarker::new(messages)),
        Arc::new(LogProgressSink),
    );

    let (stop_tx, mut stop_rx) = mpsc::unbounded_channel();
    let ctrl_c = tokio::spawn(async move {
        loop {
            if let Err(err) = tokio::signal::ctrl_c().await {
                engine_warn!("Cannot listen for Ctrl-C: {}", err);
                break;
            }
            if stop_tx.send(()).is_err() {
                break;
            }
        }
    });
    let report = session
        .drive_batch(runner.run(&plan, &cancel), &mut stop_rx, |line| {
            println!("{line}")
        })
        .await;
    ctrl_c.abort();

    session.dispatch(Msg::RunFinished {
        aborted: report.as_ref().is_none_or(|report| report.aborted),
    });
    print_status(&mut session);
    if let Some(report) = &report {
        println!(
            "{} downloaded, {} skipped, {} failed",
            report.downloaded, report.skipped, report.failed
        );
    }
    Ok(exit_code(&session, report.as_ref()))
}

async fn list(args: ListArgs, prefs_path: &Path) -> anyhow::Result<ExitCode> {
    let store = RonPreferenceStore::open(prefs_path);
    let mut prefs = Preferences::load(&store, config::locale_lang());
    if let Some(template) = args.naming.template.clone() {
        prefs.template = template;
    }
    if let Some(format) = args.naming.date_format.clone() {
        prefs.date_format = format;
    }

    let settings = args.page.credentials().fetch_settings()?.for_pages();
    let source = args.page.load(&ReqwestFetcher::new(settings)).await?;
    let entries = Entry::from_retained(&source.entries(), &prefs.date_format);
    engine_info!("{} rows on page", entries.len());

    if args.json {
        let rows = entries
            .iter()
            .map(|entry| {
                let mut value = serde_json::to_value(entry)?;
                if let Some(object) = value.as_object_mut() {
                    object.insert(
                        "filename".to_string(),
                        filename_for(&prefs.template, entry).into(),
                    );
                }
                Ok(value)
            })
            .collect::<Result<Vec<_>, serde_json::Error>>()?;
        println!("{}", serde_json::to_string_pretty(&rows)?);
        return Ok(ExitCode::SUCCESS);
    }

    for entry in &entries {
        println!(
            "{:>3} {} {:<10}  {:<24}  {}",
            entry.index,
            if entry.unread { '*' } else { ' ' },
            entry.date_iso,
            entry.doctype,
            entry.subject_complete
        );
        println!("      -> {}", filename_for(&prefs.template, entry));
    }
    Ok(ExitCode::SUCCESS)
}

fn prefs(args: PrefsArgs, prefs_path: &Path) -> anyhow::Result<ExitCode> {
    if let PrefsCommand::Path = args.command {
        println!("{}", prefs_path.display());
        return Ok(ExitCode::SUCCESS);
    }

    let store = RonPreferenceStore::open(prefs_path);
    let prefs = Preferences::load(&store, config::locale_lang());
    let effects = EffectRunner::new(Box::new(store), CancelFlag::new());
    let mut session = Session::new(AppState::new(prefs), effects);

    let msg = match args.command {
        PrefsCommand::Show | PrefsCommand::Path => None,
        PrefsCommand::Set { name, value } => Some(settings::setting_msg(&name, &value)?),
        PrefsCommand::ResetTemplate => Some(Msg::ResetTemplateClicked),
        PrefsCommand::ResetDateFormat => Some(Msg::ResetDateFormatClicked),
        PrefsCommand::ResetAll => Some(Msg::ResetAllClicked),
    };
    if let Some(msg) = msg {
        session.dispatch(msg);
    }

    print_prefs(&session.view());
    Ok(ExitCode::SUCCESS)
}

fn print_prefs(view: &AppViewModel) {
    let lang = view.lang;
    let flag = |on: bool| if on { "on" } else { "off" };

    println!("{}", text(lang, TextKey::Title));
    println!("{}: {}", text(lang, TextKey::FilenameLabel), view.template);
    println!("    {}", text(lang, TextKey::FilenameTokens));
    println!("{}: {}", text(lang, TextKey::DateFormatLabel), view.date_format);
    println!("    {}", text(lang, TextKey::DateFormatTokens));
    println!("{}: {}", text(lang, TextKey::CustomNames), flag(view.use_custom_names));
    println!("{}: {}", text(lang, TextKey::MarkRead), flag(view.mark_read));
    println!("{}: {}", text(lang, TextKey::SlowMode), flag(view.slow_mode));
    println!("{}: {}", text(lang, TextKey::LangLabel), lang.code());
}

fn print_status(session: &mut Session) {
    if let Some(line) = session.take_status_change() {
        println!("{line}");
    }
}

/// 1 for validation errors and empty selections, 2 when downloads failed.
fn exit_code(session: &Session, report: Option<&RunReport>) -> ExitCode {
    if session.state().status().is_error() {
        return ExitCode::from(1);
    }
    match report {
        Some(report) if report.failed > 0 => ExitCode::from(2),
        _ => ExitCode::SUCCESS,
    }
}
