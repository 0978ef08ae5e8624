use anyhow::Context;
use astro_config::{build_context, load_engine_settings, EngineSettings};
use astro_engine::chart::{NatalChart, NatalChartCalculator};
use astro_engine::compatibility::CompatibilityScorer;
use astro_engine::ephemeris::{Body, EphemerisContext};
use astro_engine::houses::{HouseMode, HouseSystem};
use astro_engine::time::{BirthData, JulianDay};
use astro_engine::transit::{StationDirection, TransitEngine};
use chrono::{DateTime, NaiveDate, Utc};
use clap::{Args, Parser, Subcommand};
use serde::Serialize;
use std::collections::BTreeMap;
use std::fs;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(author, version, about = "Compute charts, transits and compatibility scores as JSON")]
struct Cli {
    /// Engine config (default: configs/engine.toml if present).
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Emit single-line JSON instead of pretty-printed output.
    #[arg(long, global = true)]
    compact: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Natal chart for a birth moment and place.
    Natal {
        #[command(flatten)]
        birth: BirthArgs,
        /// House system override (placidus, whole_sign, koch, ...).
        #[arg(long)]
        houses: Option<String>,
    },
    /// Moon sign, lunar phase and retrograde planets for a date.
    Daily {
        /// Calendar date (default: today, UTC).
        #[arg(long)]
        date: Option<NaiveDate>,
    },
    /// Outer-planet transits to a natal chart.
    Weekly {
        #[command(flatten)]
        birth: BirthArgs,
        #[arg(long)]
        houses: Option<String>,
        /// Instant to compute for, RFC 3339 (default: now).
        #[arg(long)]
        at: Option<DateTime<Utc>>,
    },
    /// Nearest retrograde station, or the whole period if no direction is given.
    Station {
        #[arg(long)]
        body: Body,
        /// `start` searches backward, `end` searches forward.
        #[arg(long)]
        direction: Option<StationDirection>,
        #[arg(long)]
        at: Option<DateTime<Utc>>,
    },
    /// Weighted compatibility score from a JSON object of 16 scores.
    Compat {
        #[arg(long)]
        scores: PathBuf,
        /// consistent | complicated | toxic
        #[arg(long)]
        relationship: String,
    },
}

#[derive(Args, Debug, Clone)]
struct BirthArgs {
    /// Birth date, YYYY-MM-DD.
    #[arg(long)]
    date: NaiveDate,
    #[arg(long)]
    hour: u32,
    #[arg(long, default_value_t = 0)]
    minute: u32,
    #[arg(long, allow_hyphen_values = true)]
    lat: f64,
    #[arg(long, allow_hyphen_values = true)]
    lon: f64,
    /// Local offset from UTC in hours, e.g. -5 or 5.5.
    #[arg(long, allow_hyphen_values = true, default_value_t = 0.0)]
    utc_offset: f64,
}

impl BirthArgs {
    fn to_birth_data(&self) -> BirthData {
        use chrono::Datelike;
        BirthData {
            day: self.date.day(),
            month: self.date.month(),
            year: self.date.year(),
            hour: self.hour,
            minute: self.minute,
            latitude: self.lat,
            longitude: self.lon,
            utc_offset_hours: self.utc_offset,
        }
    }
}

fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let cli = Cli::parse();

    let settings = load_engine_settings(cli.config.as_deref())?;
    let ctx = build_context(&settings).context("Failed to initialise the ephemeris")?;
    log::debug!("engine settings: {:?}", settings);

    match &cli.command {
        Command::Natal { birth, houses } => {
            let chart = natal_chart(&ctx, &settings, birth, houses.as_deref())?;
            print_json(&chart, cli.compact)
        }
        Command::Daily { date } => {
            let date = date.unwrap_or_else(|| Utc::now().date_naive());
            let snapshot = TransitEngine::new(&ctx)
                .with_daily_hour(settings.daily_hour_utc)
                .daily(date)
                .with_context(|| format!("Failed to compute daily transits for {}", date))?;
            print_json(&snapshot, cli.compact)
        }
        Command::Weekly { birth, houses, at } => {
            let chart = natal_chart(&ctx, &settings, birth, houses.as_deref())?;
            let now = at.unwrap_or_else(Utc::now);
            let snapshot = TransitEngine::new(&ctx)
                .weekly(&chart, now)
                .context("Failed to compute weekly transits")?;
            print_json(&snapshot, cli.compact)
        }
        Command::Station { body, direction, at } => {
            let jd = JulianDay::from_datetime(at.unwrap_or_else(Utc::now));
            let engine = TransitEngine::new(&ctx);
            match direction {
                Some(direction) => {
                    let station = engine
                        .find_retrograde_station(jd, *body, *direction)
                        .with_context(|| format!("Station search for {} failed", body))?;
                    let found = match station {
                        Some(station) => Some((station, station.to_datetime()?)),
                        None => None,
                    };
                    print_json(&found, cli.compact)
                }
                None => {
                    let period = engine
                        .retrograde_period(jd, *body)
                        .with_context(|| format!("Retrograde period search for {} failed", body))?;
                    print_json(&period, cli.compact)
                }
            }
        }
        Command::Compat { scores, relationship } => {
            let text = fs::read_to_string(scores)
                .with_context(|| format!("Failed to read scores file {}", scores.display()))?;
            let map: BTreeMap<String, f64> = serde_json::from_str(&text)
                .with_context(|| format!("Failed to parse scores JSON from {}", scores.display()))?;
            let result = CompatibilityScorer::new().score_map(&map, relationship)?;
            print_json(&result, cli.compact)
        }
    }
}

fn natal_chart(
    ctx: &EphemerisContext,
    settings: &EngineSettings,
    birth: &BirthArgs,
    houses: Option<&str>,
) -> anyhow::Result<NatalChart> {
    let house_system = match houses {
        Some(name) => HouseSystem::new(name.parse::<HouseMode>()?),
        None => settings.house_system,
    };
    let chart = NatalChartCalculator::new(ctx, house_system)
        .compute(&birth.to_birth_data())
        .context("Failed to compute natal chart")?;
    Ok(chart)
}

fn print_json<T: Serialize>(value: &T, compact: bool) -> anyhow::Result<()> {
    let out = if compact {
        serde_json::to_string(value)?
    } else {
        serde_json::to_string_pretty(value)?
    };
    println!("{}", out);
    Ok(())
}
