use super::context::AppContext;
use crate::output::{detail_table, new_table, Output};
use color_eyre::Result;
use comfy_table::Cell;
use indicatif::{ProgressBar, ProgressStyle};
use keepup_models::{Show, ShowType};
use owo_colors::OwoColorize;
use serde_json::json;
use std::io::IsTerminal;
use std::time::Duration;

pub async fn run_search(query: &str, output: &Output) -> Result<()> {
    let ctx = AppContext::load()?;
    let service = ctx.service().await?;
    let shows = service.search(query).await?;
    tracing::debug!(query = query, results = shows.len(), "Search finished");

    if !output.is_human() {
        output.json(&serde_json::to_value(&shows)?);
        return Ok(());
    }

    if shows.is_empty() {
        output.info(format!("No movies or shows found for '{}'", query));
        return Ok(());
    }

    let mut table = new_table(&["ID", "Title", "Year", "Type"]);
    for show in &shows {
        table.add_row(vec![
            Cell::new(&show.id),
            Cell::new(&show.title),
            Cell::new(&show.year),
            Cell::new(show.show_type.display_name()),
        ]);
    }
    output.table(&table);
    Ok(())
}

/// Seed for a catalog id; the detail fetch fills in everything else
pub fn seed_show(id: &str, movie: bool) -> Show {
    let show_type = if movie { ShowType::Movie } else { ShowType::Series };
    Show::new(id, "", "", show_type)
}

pub async fn run_details(id: &str, movie: bool, output: &Output) -> Result<()> {
    let ctx = AppContext::load()?;
    let service = ctx.service().await?;
    let show = service.fetch_details(seed_show(id, movie)).await?;

    if !output.is_human() {
        output.json(&serde_json::to_value(&show)?);
        return Ok(());
    }

    let mut rows = vec![
        ("Type", show.show_type.display_name().to_string()),
        ("Year", show.year.clone()),
    ];
    let optional = [
        ("Genre", &show.genre),
        ("Rating", &show.rating),
        ("Runtime", &show.runtime),
        (if show.is_series() { "Created by" } else { "Director" }, &show.director),
        ("Starring", &show.actors),
        ("Status", &show.tmdb_status),
        ("Next episode", &show.ai_summary),
        ("Released", &show.theatrical_release_date),
    ];
    rows.extend(
        optional
            .into_iter()
            .filter_map(|(label, value)| value.as_ref().map(|v| (label, v.clone()))),
    );
    if let Some(seasons) = show.total_seasons {
        rows.push(("Seasons", format!("{} ({} episodes)", seasons, show.total_episodes.unwrap_or(0))));
    }
    if let Some(providers) = &show.watch_providers {
        let names: Vec<&str> = providers.iter().map(|p| p.name.as_str()).collect();
        rows.push(("Stream on", names.join(", ")));
    }
    if let Some(key) = &show.trailer_key {
        rows.push(("Trailer", format!("https://www.youtube.com/watch?v={}", key)));
    }

    output.table(&detail_table(&show.title, &rows));
    if let Some(plot) = &show.plot {
        output.info(format!("\n{}", plot));
    }
    Ok(())
}

pub async fn run_season(show_id: &str, season: u32, output: &Output) -> Result<()> {
    let ctx = AppContext::load()?;
    let service = ctx.service().await?;
    let episodes = service.fetch_season_episodes(show_id, season).await;

    if !output.is_human() {
        output.json(&serde_json::to_value(&episodes)?);
        return Ok(());
    }

    if episodes.is_empty() {
        output.warn(format!("No episodes found for season {} of show {}", season, show_id));
        return Ok(());
    }

    let progress = match service.current_user() {
        Some(_) => service.get_watch_progress(show_id).await?,
        None => None,
    };

    let mut table = new_table(&["#", "Title", "Air date", "Runtime", "Watched"]);
    for episode in &episodes {
        let watched = progress
            .as_ref()
            .map_or(false, |p| p.is_watched(episode.season_number, episode.episode_number));
        table.add_row(vec![
            Cell::new(format!("S{}E{}", episode.season_number, episode.episode_number)),
            Cell::new(&episode.name),
            Cell::new(episode.air_date.as_deref().unwrap_or("TBD")),
            Cell::new(episode.runtime.map(|r| format!("{} min", r)).unwrap_or_default()),
            Cell::new(if watched { "✓".green().to_string() } else { String::new() }),
        ]);
    }
    output.table(&table);
    Ok(())
}

pub async fn run_updates(output: &Output) -> Result<()> {
    let ctx = AppContext::load()?;
    let service = ctx.service().await?;

    let spinner = updates_spinner(output, service.tracked_shows().len());
    let feed = service.fetch_updates().await;
    if let Some(spinner) = spinner {
        spinner.finish_and_clear();
    }

    if !output.is_human() {
        let items: Vec<_> = feed
            .iter()
            .map(|show| {
                json!({
                    "id": show.id,
                    "title": show.title,
                    "nextAirDate": show.next_air_date(),
                    "summary": show.ai_summary,
                })
            })
            .collect();
        output.json(&json!(items));
        return Ok(());
    }

    if feed.is_empty() {
        output.info("No upcoming episodes for your tracked shows");
        return Ok(());
    }

    let mut table = new_table(&["Show", "Next episode", "Air date"]);
    for show in &feed {
        let episode = show
            .ai_summary
            .as_deref()
            .and_then(|s| s.strip_prefix("Next Episode: "))
            .and_then(|s| s.split_whitespace().next())
            .unwrap_or("");
        table.add_row(vec![
            Cell::new(&show.title),
            Cell::new(episode),
            Cell::new(show.next_air_date().unwrap_or("TBD")),
        ]);
    }
    output.table(&table);
    Ok(())
}

fn updates_spinner(output: &Output, tracked: usize) -> Option<ProgressBar> {
    let interactive = std::io::stdout().is_terminal() && std::io::stderr().is_terminal();
    if !interactive || !output.is_human() {
        tracing::info!(operation = "updates", tracked = tracked, "Fetching updates");
        return None;
    }

    let spinner = ProgressBar::new_spinner();
    if let Ok(style) = ProgressStyle::default_spinner()
        .template("{spinner:.green} {msg}")
        .map(|s| s.tick_chars("⠋⠙⠹⠸⠼⠴⠦⠧⠇⠏"))
    {
        spinner.set_style(style);
    }
    spinner.set_message(format!("Checking {} tracked shows for new episodes...", tracked));
    spinner.enable_steady_tick(Duration::from_millis(100));
    Some(spinner)
}
