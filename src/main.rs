mod commands;

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};

use pocketclock::app::ClockApp;
use pocketclock::config::{ClockConfig, load_clock_config, parse_locale};
use pocketclock::time_provider::{parse_local_datetime, select_source};

#[derive(Parser, Debug)]
#[command(
    name = "pocketclock",
    version,
    about = "Alarm list, clock, countdown timer and stopwatch"
)]
struct Cli {
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[arg(long, global = true)]
    at: Option<String>,

    #[arg(long, global = true)]
    locale: Option<String>,

    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    Clock {
        #[arg(long, default_value_t = 1, value_parser = clap::value_parser!(u32).range(1..))]
        ticks: u32,

        #[arg(long)]
        use_24h: bool,
    },
    Alarms {
        #[command(subcommand)]
        action: Option<AlarmAction>,
    },
    Timer {
        #[arg(long)]
        duration: Option<String>,
    },
    Stopwatch {
        #[arg(long, default_value = "1s")]
        run: String,
    },
}

#[derive(Subcommand, Debug)]
enum AlarmAction {
    List,
    Template,
    Add {
        #[arg(long)]
        time: String,

        #[arg(long)]
        period: String,

        #[arg(long)]
        label: Option<String>,

        #[arg(long, value_delimiter = ',')]
        days: Vec<String>,

        #[arg(long)]
        inactive: bool,
    },
    Toggle {
        id: String,
    },
    Edit {
        id: String,

        #[arg(long, default_value_t = 0, allow_negative_numbers = true)]
        hour_step: i32,

        #[arg(long, default_value_t = 0, allow_negative_numbers = true)]
        minute_step: i32,

        #[arg(long)]
        period: Option<String>,

        #[arg(long)]
        label: Option<String>,

        #[arg(long, value_delimiter = ',')]
        toggle_day: Vec<String>,

        #[arg(long)]
        active: Option<bool>,
    },
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();
    if let Err(err) = run() {
        eprintln!("error: {err:#}");
        std::process::exit(1);
    }
}

fn run() -> Result<()> {
    let cli = Cli::parse();

    let mut config = match &cli.config {
        Some(path) => load_clock_config(path)
            .with_context(|| format!("failed to load {}", path.display()))?,
        None => ClockConfig::default(),
    };
    if let Some(name) = cli.locale.as_deref() {
        config.settings.locale = parse_locale(name)?;
    }
    if let Command::Clock { use_24h: true, .. } = cli.command {
        config.settings.use_24h = true;
    }
    if let Command::Timer {
        duration: Some(text),
    } = &cli.command
    {
        config.settings.timer_duration_secs = commands::parse_timer_secs(text)?;
    }

    let anchor = cli.at.as_deref().map(parse_local_datetime).transpose()?;
    let selected = select_source(anchor)?;
    log::debug!("time source: {}", selected.label);
    let mut app = ClockApp::new(selected.source, config)?;

    match cli.command {
        Command::Clock { ticks, .. } => commands::run_clock(&mut app, ticks, cli.json),
        Command::Alarms { action } => match action.unwrap_or(AlarmAction::List) {
            AlarmAction::List => commands::print_alarms(&app, cli.json),
            AlarmAction::Template => commands::print_template(&mut app, cli.json),
            AlarmAction::Add {
                time,
                period,
                label,
                days,
                inactive,
            } => {
                let request = commands::NewAlarm {
                    time,
                    period,
                    label,
                    days,
                    active: !inactive,
                };
                commands::add_alarm(&mut app, &request)?;
                commands::print_alarms(&app, cli.json)
            }
            AlarmAction::Toggle { id } => {
                commands::toggle_alarm(&mut app, &id)?;
                commands::print_alarms(&app, cli.json)
            }
            AlarmAction::Edit {
                id,
                hour_step,
                minute_step,
                period,
                label,
                toggle_day,
                active,
            } => {
                let request = commands::AlarmEdit {
                    hour_step,
                    minute_step,
                    period,
                    label,
                    toggle_days: toggle_day,
                    active,
                };
                commands::edit_alarm(&mut app, &id, &request)?;
                commands::print_alarms(&app, cli.json)
            }
        },
        Command::Timer { .. } => commands::run_timer(&mut app, cli.json),
        Command::Stopwatch { run } => {
            let run_ms = commands::parse_run_ms(&run)?;
            commands::run_stopwatch(&mut app, run_ms, cli.json)
        }
    }
}
