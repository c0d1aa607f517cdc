// Copyright Sarathi Roadways Platform Team
// Attribution cannot be removed

#![deny(
    clippy::mutable_key_type,
    clippy::map_entry,
    clippy::boxed_local,
    clippy::let_unit_value,
    clippy::redundant_allocation,
    clippy::bool_comparison,
    clippy::bind_instead_of_map,
    clippy::vec_box,
    clippy::while_let_loop,
    clippy::useless_asref,
    clippy::repeat_once,
    clippy::deref_addrof,
    clippy::suspicious_map,
    clippy::arc_with_non_send_sync,
    clippy::single_char_pattern,
    clippy::for_kv_map,
    clippy::let_unit_value,
    clippy::let_and_return,
    clippy::iter_nth,
    clippy::iter_cloned_collect,
    clippy::bytes_nth,
    clippy::deprecated_clippy_cfg_attr,
    clippy::match_result_ok,
    clippy::cmp_owned,
    clippy::cmp_null,
    clippy::op_ref
)]

#[cfg(not(target_env = "msvc"))]
use tikv_jemallocator::Jemalloc;

#[cfg(not(target_env = "msvc"))]
#[global_allocator]
static GLOBAL: Jemalloc = Jemalloc;

use anyhow::{Context, Result};
use chrono::Utc;
use clap::{Parser, Subcommand};
use diesel_async::AsyncConnection;
use diesel_async::AsyncPgConnection;
use dotenvy::dotenv;
use sarathi::booking::register_beneficiary;
use sarathi::errors::BookingError;
use sarathi::operators::add_operator;
use sarathi::route_model::route_for_schedule;
use sarathi::schedule_store::{
    ParsedSchedule, create_schedule, list_schedules, replace_stops, set_booking_enabled,
};
use sarathi::settings::seed_default_settings;
use std::path::{Path, PathBuf};
use std::{fs, io};

#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Load schedule JSON files from a file or directory
    Ingest {
        #[arg(long)]
        path: String,
        /// Replace the stop chain of schedules that already exist
        #[arg(long)]
        replace: bool,
    },
    /// Write default values for any missing system setting
    SeedSettings,
    /// Register a free ticket beneficiary
    AddBeneficiary {
        #[arg(long)]
        registration_number: String,
        #[arg(long)]
        full_name: String,
        #[arg(long)]
        phone: String,
    },
    /// Create or update a console operator account
    AddOperator {
        #[arg(long)]
        username: String,
        #[arg(long)]
        display_name: String,
        #[arg(long)]
        admin: bool,
        /// Comma separated district names for non admin operators
        #[arg(long)]
        districts: Option<String>,
    },
    /// Print every schedule with its stop chain
    ListSchedules,
    /// Open or close online booking for one schedule
    SetBooking {
        #[arg(long)]
        schedule_id: String,
        #[arg(long)]
        enabled: bool,
    },
}

fn find_json_files_recursive(dir: &Path) -> io::Result<Vec<PathBuf>> {
    let mut json_files: Vec<PathBuf> = Vec::new();
    if dir.is_dir() {
        for entry in fs::read_dir(dir)? {
            let entry = entry?;
            let path = entry.path();
            if path.is_dir() {
                json_files.extend(find_json_files_recursive(&path)?);
            } else if path.is_file() && path.extension().and_then(|s| s.to_str()) == Some("json") {
                json_files.push(path);
            }
        }
    }
    Ok(json_files)
}

async fn ingest_file(conn: &mut AsyncPgConnection, path: &Path, replace: bool) -> Result<()> {
    let raw = fs::read_to_string(path)?;
    let parsed: ParsedSchedule = serde_json::from_str(&raw)
        .with_context(|| format!("{} is not a valid schedule document", path.display()))?;

    match create_schedule(conn, &parsed, Utc::now()).await {
        Ok(()) => {
            println!("Created schedule {}", parsed.schedule_id.trim());
            Ok(())
        }
        Err(BookingError::DuplicateSchedule(schedule_id)) if replace => {
            replace_stops(conn, &schedule_id, &parsed.stops).await?;
            println!("Replaced stops for schedule {}", schedule_id);
            Ok(())
        }
        Err(err) => Err(err.into()),
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenv().ok();
    env_logger::init();

    let args = Args::parse();

    let database_url = std::env::var("DATABASE_URL").context("DATABASE_URL must be set")?;
    let mut conn = AsyncPgConnection::establish(&database_url).await?;

    match args.command {
        Commands::Ingest { path, replace } => {
            let path = PathBuf::from(path);
            let files = if path.is_dir() {
                find_json_files_recursive(&path)?
            } else {
                vec![path]
            };

            if files.is_empty() {
                println!("No JSON files found");
                return Ok(());
            }

            for file in &files {
                if let Err(err) = ingest_file(&mut conn, file, replace).await {
                    eprintln!("Failed to ingest {}: {}", file.display(), err);
                }
            }
        }
        Commands::SeedSettings => {
            seed_default_settings(&mut conn, Utc::now()).await?;
            println!("Seeded default settings");
        }
        Commands::AddBeneficiary {
            registration_number,
            full_name,
            phone,
        } => {
            register_beneficiary(&mut conn, &registration_number, &full_name, &phone, Utc::now())
                .await?;
            println!("Registered beneficiary {}", registration_number.trim());
        }
        Commands::AddOperator {
            username,
            display_name,
            admin,
            districts,
        } => {
            let districts: Vec<String> = districts
                .as_deref()
                .unwrap_or_default()
                .split(',')
                .map(|district| district.trim().to_string())
                .filter(|district| !district.is_empty())
                .collect();
            add_operator(&mut conn, &username, &display_name, admin, districts).await?;
            println!("Saved operator {}", username.trim());
        }
        Commands::ListSchedules => {
            let schedules = list_schedules(&mut conn).await?;
            for schedule in &schedules {
                match route_for_schedule(&mut conn, schedule).await {
                    Ok(route) => {
                        let summary = route.summary();
                        println!(
                            "{} {} | {} -> {} | {} stops | booking {}",
                            summary.schedule_id,
                            summary.bus_name,
                            summary.origin,
                            summary.destination,
                            summary.stops.len(),
                            if summary.booking_enabled {
                                "open"
                            } else {
                                "closed"
                            }
                        );
                    }
                    Err(BookingError::ScheduleNotFound) => {
                        println!("{} {} | no usable stops", schedule.schedule_id, schedule.bus_name);
                    }
                    Err(err) => return Err(err.into()),
                }
            }
        }
        Commands::SetBooking {
            schedule_id,
            enabled,
        } => {
            set_booking_enabled(&mut conn, &schedule_id, enabled).await?;
            println!(
                "Booking for {} is now {}",
                schedule_id,
                if enabled { "open" } else { "closed" }
            );
        }
    }

    Ok(())
}
