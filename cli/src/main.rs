mod logging;

use std::io::{self, BufRead, Write};

use async_std::task;
use clap::{Parser, Subcommand};
use core_types::{CourseId, FileId, UserId};
use service::{
    app_services::{AppServices, create_app_services},
    error::Error,
    report_service::ReportService,
};

#[derive(Parser, Debug)]
#[command(about = "Finds and removes files that no course content refers to")]
struct Cli {
    /// Log everything at debug level unless RUST_LOG is set
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// List unused files of a course
    Scan {
        #[arg(long)]
        course: CourseId,
        #[arg(long)]
        user: UserId,
        /// Print the report as JSON
        #[arg(long)]
        json: bool,
    },
    /// Print counts and total size of unused files
    Summary {
        #[arg(long)]
        course: CourseId,
        #[arg(long)]
        user: UserId,
    },
    /// Print storage statistics of a course
    Analyze {
        #[arg(long)]
        course: CourseId,
        #[arg(long)]
        user: UserId,
        #[arg(long)]
        json: bool,
    },
    /// Show where a single file lives and whether it is referenced
    Usage {
        #[arg(long)]
        course: CourseId,
        #[arg(long)]
        user: UserId,
        #[arg(long)]
        file: FileId,
    },
    /// Delete unused files. Files that are referenced again are left alone.
    Delete {
        #[arg(long)]
        course: CourseId,
        #[arg(long)]
        user: UserId,
        /// Comma separated file ids
        #[arg(long, value_delimiter = ',', required = true)]
        files: Vec<FileId>,
        /// Skip the confirmation prompt
        #[arg(short, long)]
        yes: bool,
    },
    /// Drop cached scan results
    ClearCache {
        /// Only this course, otherwise every course
        #[arg(long)]
        course: Option<CourseId>,
    },
    /// Show or change settings
    Settings {
        #[command(subcommand)]
        action: SettingsAction,
    },
}

#[derive(Subcommand, Debug)]
enum SettingsAction {
    Show,
    Set { key: String, value: String },
    Reset { key: String },
}

async fn ensure_can_view(
    report: &ReportService,
    user: UserId,
    course: CourseId,
) -> Result<(), Error> {
    if report.can_view(user, course).await {
        Ok(())
    } else {
        Err(Error::NotAuthorized(format!(
            "User {} may not view files of course {}",
            user, course
        )))
    }
}

fn confirm(prompt: &str) -> io::Result<bool> {
    print!("{} [y/N] ", prompt);
    io::stdout().flush()?;
    let mut answer = String::new();
    io::stdin().lock().read_line(&mut answer)?;
    Ok(matches!(answer.trim().to_lowercase().as_str(), "y" | "yes"))
}

async fn run(command: Command, services: &AppServices) -> Result<(), Box<dyn std::error::Error>> {
    let report = services.report();
    match command {
        Command::Scan { course, user, json } => {
            ensure_can_view(&report, user, course).await?;
            let result = report.get_scan_result(course).await?;
            if json {
                println!("{}", serde_json::to_string_pretty(&*result)?);
                return Ok(());
            }
            for entry in &result.entries {
                println!(
                    "{:>8}  {:>10}{}  {:<20}  {:<16}  {}{}",
                    entry.file_id,
                    entry.file_size_formatted,
                    if entry.is_large { "*" } else { " " },
                    entry.location,
                    entry.activity_type,
                    entry.file_path,
                    entry.file_name
                );
            }
            for notice in &result.notices {
                println!("note: {}", notice);
            }
            println!(
                "{} unused of {} scanned files",
                result.entries.len(),
                result.scanned_file_count
            );
        }
        Command::Summary { course, user } => {
            ensure_can_view(&report, user, course).await?;
            let summary = report.get_summary(course).await?;
            if summary.has_unused_files {
                println!(
                    "{} unused files ({}) in {} locations",
                    summary.total_count,
                    summary.total_size_formatted,
                    summary.affected_location_count
                );
            } else {
                println!("No unused files");
            }
        }
        Command::Analyze { course, user, json } => {
            ensure_can_view(&report, user, course).await?;
            if json {
                let analysis = report.get_analysis(course).await?;
                println!("{}", serde_json::to_string_pretty(&*analysis)?);
                return Ok(());
            }
            let stats = report.get_storage_stats(course).await?;
            println!(
                "{} files, {} total, {} average, {} file types",
                stats.total_files,
                stats.total_size_formatted,
                stats.average_file_size_formatted,
                stats.file_type_count
            );
            for file in &stats.largest_files {
                println!("{:>8}  {:>12}  {}", file.id, file.file_size, file.file_name);
            }
        }
        Command::Usage { course, user, file } => {
            ensure_can_view(&report, user, course).await?;
            match report.get_file_usage(course, file).await? {
                Some(usage) => println!("{}", serde_json::to_string_pretty(&usage)?),
                None => println!("File {} does not belong to course {}", file, course),
            }
        }
        Command::Delete {
            course,
            user,
            files,
            yes,
        } => {
            if report.settings().require_confirmation
                && !yes
                && !confirm(&format!("Delete {} files?", files.len()))?
            {
                println!("Cancelled");
                return Ok(());
            }
            let outcome = report.request_deletion(course, &files, user).await?;
            println!(
                "attempted {}, deleted {}, still referenced {}, not found {}, failed {}",
                outcome.attempted,
                outcome.deleted,
                outcome.skipped_referenced,
                outcome.skipped_not_found,
                outcome.failed
            );
            for error in &outcome.errors {
                println!("error: {}", error);
            }
            if let Some(reason) = outcome.failure_reason() {
                println!("{}", reason);
            }
        }
        Command::ClearCache { course } => {
            report.clear_cache(course);
        }
        Command::Settings { action } => {
            let settings_service = services.settings();
            match action {
                SettingsAction::Show => {
                    let settings = settings_service.load_settings().await?;
                    let mut entries: Vec<_> = settings.to_setting_map()?.into_iter().collect();
                    entries.sort_by_key(|(name, _)| name.as_str());
                    for (name, value) in entries {
                        println!("{} = {}", name.as_str(), value);
                    }
                }
                SettingsAction::Set { key, value } => {
                    settings_service.save_setting(&key, &value).await?;
                }
                SettingsAction::Reset { key } => {
                    settings_service.reset_setting(&key).await?;
                }
            }
        }
    }
    Ok(())
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Cli::parse();
    let _guard = logging::init_logging(args.verbose);

    task::block_on(async {
        let services = create_app_services().await?;
        if let Err(e) = run(args.command, &services).await {
            tracing::error!(error = %e, "Command failed");
            return Err(e);
        }
        Ok::<_, Box<dyn std::error::Error>>(())
    })
}
