use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use practice_companion::catalog::{filter_by_category, ALL_CATEGORY_KEY};
use practice_companion::reminder::TimeOfDay;
use practice_companion::{
    create_router, App, AppState, CohortUpdate, Config, HeadlessPlayer, PlaybackSession,
    RecordDraft, Route,
};
use std::time::Duration;
use tracing::{info, warn};

#[derive(Parser)]
#[command(name = "practice-companion")]
#[command(about = "Guided mindfulness practice: catalog, timed sessions, records and reminders")]
struct Cli {
    /// Config file path without extension
    #[arg(short, long, default_value = "config/practice-companion")]
    config: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the HTTP API
    Serve,
    /// List audio visible to the current cohort
    Catalog {
        #[arg(short = 'k', long, default_value = ALL_CATEGORY_KEY)]
        category: String,
    },
    /// Show today's recommendation
    Recommend,
    /// Play an audio item to the end and record the practice
    Play {
        audio_id: String,
        /// Self-reported anxiety (0-100)
        #[arg(short, long)]
        anxiety: Option<u32>,
        #[arg(short, long)]
        note: Option<String>,
        #[arg(short, long)]
        tag: Vec<String>,
        /// Skip the record entry
        #[arg(long)]
        no_record: bool,
    },
    /// List saved practice records
    History,
    /// Practice totals and this week's progress
    Stats,
    /// Daily reminder settings
    Reminder {
        #[command(subcommand)]
        action: ReminderAction,
    },
    /// Enter a study code (empty resets to the default cohort)
    Cohort {
        #[arg(default_value = "")]
        code: String,
        #[arg(short, long, default_value = "")]
        subject: String,
    },
    /// Show the local profile
    Profile,
}

#[derive(Subcommand)]
enum ReminderAction {
    Show,
    On,
    Off,
    /// Set the reminder time (HH:MM)
    Time { time: String },
    /// Apply a preset time (08:00, 12:00 or 20:00); ignored while off
    Quick { preset: String },
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();
    let cfg = Config::load(&cli.config)?;

    info!("Loaded config: {}", cfg.service.name);

    let app = App::from_config(&cfg)?;

    match cli.command {
        Commands::Serve => serve(&cfg, app).await?,
        Commands::Catalog { category } => {
            let cohort = app.user.cohort_code().await;
            let snapshot = app.catalog.load(&cohort).await?;

            let labels: Vec<String> = snapshot
                .categories
                .iter()
                .map(|c| format!("{} ({})", c.title, c.key))
                .collect();
            println!("Cohort {} | categories: {}", cohort, labels.join(", "));

            let items = filter_by_category(&snapshot.items, &category);
            if items.is_empty() {
                println!("{}", practice_companion::catalog::EMPTY_LIST_TEXT);
            }
            for item in items {
                println!(
                    "[{}] {} · {} · {} · {}",
                    item.id,
                    item.title,
                    item.category_label,
                    item.duration_label(),
                    item.difficulty
                );
            }
        }
        Commands::Recommend => {
            let cohort = app.user.cohort_code().await;
            match app.catalog.recommend(&cohort).await? {
                Some(item) => println!(
                    "[{}] {} · {} · {}\n{}",
                    item.id,
                    item.title,
                    item.category_label,
                    item.duration_label(),
                    item.description
                ),
                None => println!("No recommendation for cohort {}", cohort),
            }
        }
        Commands::Play {
            audio_id,
            anxiety,
            note,
            tag,
            no_record,
        } => {
            let route = play(&app, &audio_id).await?;

            if let Route::RecordEntry {
                audio_id,
                practice_duration_seconds,
            } = route
            {
                println!(
                    "Practice finished: {}s",
                    practice_duration_seconds.unwrap_or(0)
                );
                if !no_record {
                    let mut draft = RecordDraft::for_practice(audio_id, practice_duration_seconds);
                    if let Some(anxiety) = anxiety {
                        draft.set_anxiety_rating(anxiety);
                    }
                    if let Some(note) = note {
                        if !draft.set_description(&note) {
                            bail!("Note is too long");
                        }
                    }
                    for tag in &tag {
                        draft.select_tag(tag);
                    }
                    let record = app.records.save(draft).await?;
                    println!("Saved record {} at {}", record.id, record.display_time);
                    // Give the background upload a moment before the runtime shuts down
                    tokio::time::sleep(Duration::from_secs(1)).await;
                }
            }
        }
        Commands::History => {
            let entries = app.records.history().await;
            if entries.is_empty() {
                println!("No practice records yet");
            }
            for entry in entries {
                println!(
                    "{} {} · {} · {}分钟 · VAS {} · {}",
                    entry.date,
                    entry.time,
                    entry.practice_type,
                    entry.duration_minutes,
                    entry.anxiety_level,
                    entry.feeling
                );
            }
        }
        Commands::Stats => {
            let stats = app.records.stats().await;
            println!(
                "{} practices, {} minutes",
                stats.total_practice_count, stats.total_practice_minutes
            );
            let week: String = stats
                .week_progress
                .daily_progress
                .iter()
                .map(|done| if *done { '●' } else { '○' })
                .collect();
            println!(
                "This week: {} ({}/{})",
                week, stats.week_progress.completed_days, stats.week_progress.total_days
            );
        }
        Commands::Reminder { action } => {
            let update = match action {
                ReminderAction::Show => {
                    let setting = app.reminders.load().await;
                    println!(
                        "Reminder {} at {}",
                        if setting.enabled { "on" } else { "off" },
                        setting.time
                    );
                    return Ok(());
                }
                ReminderAction::On => app.reminders.set_enabled(true).await,
                ReminderAction::Off => app.reminders.set_enabled(false).await,
                ReminderAction::Time { time } => {
                    app.reminders.set_time(TimeOfDay::parse(&time)?).await
                }
                ReminderAction::Quick { preset } => app.reminders.apply_quick_time(&preset).await?,
            };

            println!(
                "Reminder {} at {}",
                if update.setting.enabled { "on" } else { "off" },
                update.setting.time
            );
            if let Some(alert) = update.alert {
                warn!("{}", alert);
            }
        }
        Commands::Cohort { code, subject } => match app.cohort.submit(&code, &subject).await? {
            CohortUpdate::Reset { code, .. } => println!("Cohort reset to {}", code),
            CohortUpdate::Verified {
                code, description, ..
            } => println!("Cohort set to {} ({})", code, description),
            CohortUpdate::Rejected { alert } => bail!("{}", alert),
        },
        Commands::Profile => {
            println!("Device:  {}", app.user.device_id().await);
            println!("Cohort:  {}", app.user.cohort_code().await);
            println!(
                "Subject: {}",
                app.user.subject_id().await.unwrap_or_else(|| "-".to_string())
            );
        }
    }

    Ok(())
}

async fn serve(cfg: &Config, app: App) -> Result<()> {
    let addr = format!("{}:{}", cfg.service.http.bind, cfg.service.http.port);
    let router = create_router(AppState::new(app));

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;
    info!("HTTP server listening on {}", addr);

    axum::serve(listener, router)
        .with_graceful_shutdown(async {
            let _ = tokio::signal::ctrl_c().await;
            info!("Shutting down");
        })
        .await?;

    Ok(())
}

/// Play to the natural end; Ctrl-C exits without recording
async fn play(app: &App, audio_id: &str) -> Result<Route> {
    let cohort = app.user.cohort_code().await;
    let snapshot = app.catalog.load(&cohort).await?;
    let audio = snapshot
        .items
        .into_iter()
        .find(|item| item.id == audio_id)
        .with_context(|| format!("Audio {} is not available to cohort {}", audio_id, cohort))?;

    let player = HeadlessPlayer::new(Duration::from_secs(audio.duration_secs));
    let mut session = PlaybackSession::new(audio, Box::new(player));
    session.start().await?;

    let snapshot = session.snapshot();
    println!(
        "Playing '{}' ({}), Ctrl-C to stop",
        session.audio().title,
        snapshot.duration_label
    );

    tokio::select! {
        route = session.next_route() => {
            route.context("Player stopped before the end of the media")
        }
        _ = tokio::signal::ctrl_c() => {
            let route = session.exit().await;
            println!("Stopped, practice not recorded");
            Ok(route)
        }
    }
}
