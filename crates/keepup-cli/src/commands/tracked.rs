use super::catalog::seed_show;
use super::context::AppContext;
use crate::output::{new_table, Output};
use color_eyre::Result;
use comfy_table::Cell;
use serde_json::json;

/// Fetch the show and toggle it in the tracked list
pub async fn run_track(id: &str, movie: bool, output: &Output) -> Result<()> {
    let ctx = AppContext::load()?;
    let service = ctx.service().await?;

    let show = service.fetch_details(seed_show(id, movie)).await?;
    let title = show.title.clone();
    let now_tracked = service.toggle_tracked(show).await?;
    service.shutdown().await?;

    if !output.is_human() {
        output.json(&json!({ "id": id, "title": title, "tracked": now_tracked }));
    } else if now_tracked {
        output.success(format!("Now tracking {}", title));
    } else {
        output.success(format!("Stopped tracking {}", title));
    }
    Ok(())
}

pub async fn run_list(output: &Output) -> Result<()> {
    let ctx = AppContext::load()?;
    let service = ctx.service().await?;
    let shows = service.tracked_shows();

    if !output.is_human() {
        output.json(&serde_json::to_value(&shows)?);
        return Ok(());
    }

    if shows.is_empty() {
        output.info("You are not tracking any shows yet. Use 'keepup track <id>' to start.");
        return Ok(());
    }

    let mut table = new_table(&["ID", "Title", "Year", "Type", "Status"]);
    for show in &shows {
        table.add_row(vec![
            Cell::new(&show.id),
            Cell::new(&show.title),
            Cell::new(&show.year),
            Cell::new(show.show_type.display_name()),
            Cell::new(show.tmdb_status.as_deref().unwrap_or("")),
        ]);
    }
    output.table(&table);
    Ok(())
}
