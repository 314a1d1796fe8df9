pub mod config;
pub mod features;
pub mod filters;
pub mod jsonapi;
pub mod models;

pub use config::AppConfig;

use anyhow::{Context, Result};
use chrono::{Local, NaiveTime};

use features::{actor_feature, event_feature, write_feature_collection};
use filters::{is_current_or_upcoming, is_in_location_bounds};
use jsonapi::{walk_collection, HttpSource};
use models::{Actor, Event};

const ACTORS_FILE: &str = "kieznotiz.geojson";
const EVENTS_FILE: &str = "kieznotiz-events.geojson";

/// Runs the full export: actors first, then events, each as its own walk.
/// A failure in either walk aborts the run without writing that file.
pub fn run(config: &AppConfig) -> Result<()> {
    config.validate()?;
    export_actors(config)?;
    export_events(config)?;
    Ok(())
}

fn export_actors(config: &AppConfig) -> Result<()> {
    let source = HttpSource::new(config.actors_url.clone(), config.page_size);
    let actors: Vec<Actor> =
        walk_collection(&source, config.page_size).context("actor walk failed")?;
    println!("Total actors: {}", actors.len());

    let in_bounds: Vec<&Actor> = actors
        .iter()
        .filter(|actor| is_in_location_bounds(actor.core.geodata.as_ref()))
        .collect();
    println!(
        "Actors in Neustadt-Neuschönefeld and Volkmarsdorf: {}",
        in_bounds.len()
    );

    let features = in_bounds.iter().map(|actor| actor_feature(actor)).collect();
    let path = write_feature_collection(features, &config.output_dir.join(ACTORS_FILE))?;
    println!("{} written", path.display());
    Ok(())
}

fn export_events(config: &AppConfig) -> Result<()> {
    let source = HttpSource::new(config.events_url.clone(), config.page_size);
    let events: Vec<Event> =
        walk_collection(&source, config.page_size).context("event walk failed")?;
    println!("Total events: {}", events.len());

    let in_bounds: Vec<&Event> = events
        .iter()
        .filter(|event| is_in_location_bounds(event.core.geodata.as_ref()))
        .collect();
    println!(
        "Events in Neustadt-Neuschönefeld and Volkmarsdorf: {}",
        in_bounds.len()
    );

    // One midnight per run; every event is judged against the same day.
    let today = Local::now().date_naive().and_time(NaiveTime::MIN);
    let current: Vec<&Event> = in_bounds
        .into_iter()
        .filter(|event| is_current_or_upcoming(event, today))
        .collect();
    println!(
        "Events in Neustadt-Neuschönefeld and Volkmarsdorf after today: {}",
        current.len()
    );

    let now = Local::now().naive_local();
    let features = current
        .iter()
        .map(|event| event_feature(event, now))
        .collect();
    let path = write_feature_collection(features, &config.output_dir.join(EVENTS_FILE))?;
    println!("{} written", path.display());
    Ok(())
}
