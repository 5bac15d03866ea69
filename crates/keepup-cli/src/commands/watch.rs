use super::context::AppContext;
use crate::output::{new_table, Output};
use crate::WatchCommands;
use color_eyre::Result;
use comfy_table::Cell;
use keepup_models::WatchProgress;

pub async fn run_watch(cmd: WatchCommands, output: &Output) -> Result<()> {
    let ctx = AppContext::load()?;
    let service = ctx.service().await?;

    match cmd {
        WatchCommands::Mark { show_id, season, episode } => {
            let progress = service.mark_episode_watched(&show_id, season, episode).await?;
            service.shutdown().await?;
            if output.is_human() {
                output.success(format!(
                    "Marked S{}E{} watched ({} episodes watched)",
                    season,
                    episode,
                    progress.watched_episodes.len()
                ));
            } else {
                output.json(&serde_json::to_value(&progress)?);
            }
        }
        WatchCommands::Progress { show_id } => {
            let progress = service.get_watch_progress(&show_id).await?;
            if output.is_human() {
                print_progress(&show_id, progress.as_ref(), output);
            } else {
                output.json(&serde_json::to_value(&progress)?);
            }
        }
    }
    Ok(())
}

fn print_progress(show_id: &str, progress: Option<&WatchProgress>, output: &Output) {
    let Some(progress) = progress.filter(|p| !p.watched_episodes.is_empty()) else {
        output.info(format!("No episodes of show {} marked watched", show_id));
        return;
    };

    if let Some((season, episode)) = progress.last_watched() {
        output.info(format!("Last watched: S{}E{}", season, episode));
    }

    let mut episodes = progress.watched_episodes.clone();
    episodes.sort_by_key(|e| (e.season_number, e.episode_number));

    let mut table = new_table(&["Episode", "Watched at"]);
    for episode in &episodes {
        table.add_row(vec![
            Cell::new(format!("S{}E{}", episode.season_number, episode.episode_number)),
            Cell::new(episode.watched_at.format("%Y-%m-%d %H:%M UTC")),
        ]);
    }
    output.table(&table);
}
