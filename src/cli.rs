// src/cli.rs
use crate::config::AppConfig;
use crate::cycles::{deliver, plan_notification, run_fetch, NotificationPlan};
use crate::db::properties::{add_property, import_properties, list_properties, remove_property};
use crate::db::{init_db, Database};
use crate::domain::category::Classifier;
use crate::domain::snapshot::Property;
use crate::mailer::{BrevoMailer, Notifier};
use crate::notify::{ReportFormatter, ReportVariant};
use crate::responses::error_response;
use crate::router::{handle, AppState};
use crate::scraper::{RetryPolicy, SuumoScraper};
use crate::store::{HistoryStore, JsonFileStore};
use anyhow::{bail, Context, Result};
use astra::Server;
use chrono::Utc;
use std::fmt;
use std::path::PathBuf;
use tracing::info;

const USAGE: &str = "\
usage: suumo_tracker <command> [args]

commands:
  fetch                          scrape every registered property and record a snapshot
  notify [--compact] [--force]   mail a report when the flagged month changed
  add-property <name> <url>      register a SUUMO library page
  remove-property <name-or-id>   unregister a property
  list-properties                print the registry
  import-properties <file>       load a properties.json array into the registry
  serve                          run the dashboard";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Fetch,
    Notify { compact: bool, force: bool },
    AddProperty { name: String, url: String },
    RemoveProperty { identifier: String },
    ListProperties,
    ImportProperties { path: PathBuf },
    Serve,
    Help,
}

#[derive(Debug, PartialEq, Eq)]
pub enum CliError {
    MissingCommand,
    UnknownCommand(String),
    MissingArgument(&'static str),
    UnexpectedArgument(String),
}

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CliError::MissingCommand => write!(f, "no command given\n\n{USAGE}"),
            CliError::UnknownCommand(c) => write!(f, "unknown command '{c}'\n\n{USAGE}"),
            CliError::MissingArgument(what) => write!(f, "missing argument: {what}"),
            CliError::UnexpectedArgument(a) => write!(f, "unexpected argument '{a}'"),
        }
    }
}

impl std::error::Error for CliError {}

/// Parses arguments after the program name.
pub fn parse_args<I>(args: I) -> Result<Command, CliError>
where
    I: IntoIterator<Item = String>,
{
    let mut args = args.into_iter();
    let command = args.next().ok_or(CliError::MissingCommand)?;

    let parsed = match command.as_str() {
        "fetch" => Command::Fetch,
        "serve" => Command::Serve,
        "list-properties" => Command::ListProperties,
        "-h" | "--help" | "help" => Command::Help,
        "notify" => {
            let (mut compact, mut force) = (false, false);
            for a in args.by_ref() {
                match a.as_str() {
                    "--compact" => compact = true,
                    "--force" => force = true,
                    _ => return Err(CliError::UnexpectedArgument(a)),
                }
            }
            Command::Notify { compact, force }
        }
        "add-property" => Command::AddProperty {
            name: args.next().ok_or(CliError::MissingArgument("name"))?,
            url: args.next().ok_or(CliError::MissingArgument("url"))?,
        },
        "remove-property" => Command::RemoveProperty {
            identifier: args.next().ok_or(CliError::MissingArgument("name or id"))?,
        },
        "import-properties" => Command::ImportProperties {
            path: PathBuf::from(args.next().ok_or(CliError::MissingArgument("file"))?),
        },
        other => return Err(CliError::UnknownCommand(other.to_string())),
    };

    match args.next() {
        Some(extra) => Err(CliError::UnexpectedArgument(extra)),
        None => Ok(parsed),
    }
}

pub fn run(command: Command, config: &AppConfig) -> Result<()> {
    if command == Command::Help {
        println!("{USAGE}");
        return Ok(());
    }

    let db = Database::new(config.database_path.to_string_lossy().into_owned());
    init_db(&db, &config.schema_path).context("database initialization failed")?;
    let store = JsonFileStore::new(&config.history_file);
    let classifier = Classifier::new(config.flagged_month);

    match command {
        Command::Fetch => {
            let scraper = SuumoScraper::new(RetryPolicy::default())?;
            let outcome = run_fetch(&db, &scraper, &store, Utc::now())?;
            if !outcome.saved {
                bail!("none of {} properties could be fetched", outcome.attempted);
            }
        }

        Command::Notify { compact, force } => {
            let variant = if compact {
                ReportVariant::Compact
            } else {
                ReportVariant::Full
            };
            let formatter = ReportFormatter::new(classifier.clone(), &config.site_url, variant);
            let history = store.load()?;
            let plan = plan_notification(&history, &classifier, &formatter, force || config.force_send)?;

            let mailer = config
                .mail
                .as_ref()
                .map(|m| BrevoMailer::new(m.api_key.clone(), m.from_email.clone(), m.from_name.clone()));
            let recipient = config.mail.as_ref().map(|m| m.recipient.as_str()).unwrap_or_default();

            if let NotificationPlan::Send { subject, .. } = &plan {
                info!("✉️ {subject}");
            }
            deliver(&plan, mailer.as_ref().map(|m| m as &dyn Notifier), recipient)?;
        }

        Command::AddProperty { name, url } => {
            let property = db.with_conn(|conn| add_property(conn, &name, &url))?;
            println!("added {} ({})", property.name, property.id);
        }

        Command::RemoveProperty { identifier } => {
            let property = db
                .with_conn(|conn| remove_property(conn, &identifier))
                .with_context(|| format!("no property named or with id '{identifier}'"))?;
            println!("removed {} ({})", property.name, property.id);
        }

        Command::ListProperties => {
            let properties = db.with_conn(|conn| list_properties(conn))?;
            if properties.is_empty() {
                println!("no properties registered");
            }
            for (i, p) in properties.iter().enumerate() {
                println!("{}. {}\t{}\t{}", i + 1, p.name, p.id, p.url);
            }
        }

        Command::ImportProperties { path } => {
            let raw = std::fs::read_to_string(&path)
                .with_context(|| format!("reading {}", path.display()))?;
            let properties: Vec<Property> = serde_json::from_str(&raw)
                .with_context(|| format!("parsing {}", path.display()))?;
            let inserted = db.with_conn(|conn| import_properties(conn, &properties))?;
            println!("imported {inserted} of {} properties", properties.len());
        }

        Command::Serve => serve(config, db, store, classifier)?,

        Command::Help => {}
    }

    Ok(())
}

fn serve(config: &AppConfig, db: Database, store: JsonFileStore, classifier: Classifier) -> Result<()> {
    let state = AppState::new(db, store, classifier, &config.data_dir);
    let addr = config.bind_addr;
    info!("🌐 Dashboard at http://{addr}");

    Server::bind(&addr)
        .max_workers(8)
        .serve(move |req, _info| match handle(req, &state) {
            Ok(resp) => resp,
            Err(err) => error_response(err),
        })
        .context("server ended with error")?;

    info!("Server shut down cleanly.");
    Ok(())
}
