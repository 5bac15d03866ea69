use super::context::AppContext;
use crate::output::{new_table, Output};
use crate::ReviewCommands;
use color_eyre::Result;
use comfy_table::Cell;
use keepup_core::NewReview;
use keepup_models::{format_rating, Review, ReviewTag};
use owo_colors::OwoColorize;
use serde_json::json;

pub async fn run_review(cmd: ReviewCommands, output: &Output) -> Result<()> {
    match cmd {
        ReviewCommands::Submit { show_id, rating, text, tags, spoiler } => {
            submit(show_id, rating, text, tags, spoiler, output).await
        }
        ReviewCommands::List { show_id, follow } => list(&show_id, follow, output).await,
        ReviewCommands::Summary { show_id } => summary(&show_id, output).await,
        ReviewCommands::Vote { review_id, helpful, not_helpful } => {
            if !helpful && !not_helpful {
                return Err(color_eyre::eyre::eyre!("Pass --helpful or --not-helpful"));
            }
            vote(&review_id, helpful, output).await
        }
    }
}

pub fn parse_tag(tag: &str) -> Result<ReviewTag> {
    serde_json::from_value(json!(tag.trim().to_lowercase()))
        .map_err(|_| color_eyre::eyre::eyre!("Unknown review tag '{}'", tag))
}

async fn submit(show_id: String, rating: f64, text: String, tags: Vec<String>, spoiler: bool, output: &Output) -> Result<()> {
    let tags = tags.iter().map(|t| parse_tag(t)).collect::<Result<Vec<_>>>()?;

    let ctx = AppContext::load()?;
    let service = ctx.service().await?;
    let review = service
        .submit_review(NewReview {
            show_id,
            rating,
            text,
            tags,
            is_spoiler: spoiler,
        })
        .await?;
    service.shutdown().await?;

    if output.is_human() {
        output.success(format!("Review {} posted ({} stars)", review.id, format_rating(review.rating)));
    } else {
        output.json(&serde_json::to_value(&review)?);
    }
    Ok(())
}

async fn list(show_id: &str, follow: bool, output: &Output) -> Result<()> {
    let ctx = AppContext::load()?;
    let service = ctx.service().await?;

    if !follow {
        let reviews = service.list_reviews(show_id).await?;
        print_reviews(&reviews, output);
        return Ok(());
    }

    let (tx, mut rx) = tokio::sync::mpsc::unbounded_channel();
    let subscription = service.observe_reviews(show_id, move |reviews| {
        let _ = tx.send(reviews);
    });
    output.info("Watching for review changes, press Ctrl-C to stop");

    loop {
        tokio::select! {
            reviews = rx.recv() => match reviews {
                Some(reviews) => print_reviews(&reviews, output),
                None => break,
            },
            _ = tokio::signal::ctrl_c() => break,
        }
    }
    subscription.unsubscribe();
    Ok(())
}

fn print_reviews(reviews: &[Review], output: &Output) {
    if !output.is_human() {
        let items: Vec<_> = reviews
            .iter()
            .map(|r| {
                let mut value = serde_json::to_value(r).unwrap_or_default();
                value["userVotedHelpful"] = json!(r.user_voted_helpful);
                value
            })
            .collect();
        output.json(&json!(items));
        return;
    }

    if reviews.is_empty() {
        output.info("No reviews yet");
        return;
    }

    let mut table = new_table(&["ID", "Author", "Rating", "Review", "Helpful", "Your vote"]);
    for review in reviews {
        let text = if review.is_spoiler {
            "[spoiler hidden]".bright_black().to_string()
        } else {
            review.text.clone()
        };
        let own_vote = match review.user_voted_helpful {
            Some(true) => "helpful",
            Some(false) => "not helpful",
            None => "",
        };
        table.add_row(vec![
            Cell::new(&review.id),
            Cell::new(&review.user_name),
            Cell::new(format_rating(review.rating)),
            Cell::new(text),
            Cell::new(format!("{} / {}", review.helpful_count, review.not_helpful_count)),
            Cell::new(own_vote),
        ]);
    }
    output.table(&table);
}

async fn summary(show_id: &str, output: &Output) -> Result<()> {
    let ctx = AppContext::load()?;
    let service = ctx.service().await?;
    let summary = service.get_review_summary(show_id).await?;

    if !output.is_human() {
        output.json(&serde_json::to_value(&summary)?);
        return Ok(());
    }

    let Some(summary) = summary else {
        output.info(format!("Show {} has no reviews yet", show_id));
        return Ok(());
    };

    output.info(format!(
        "{} {} from {} reviews",
        "★".yellow(),
        format_rating(summary.average_rating).bold(),
        summary.total_reviews
    ));
    let mut table = new_table(&["Stars", "Reviews"]);
    for stars in (0..=5u8).rev() {
        let count = summary.rating_distribution.get(&stars).copied().unwrap_or(0);
        table.add_row(vec![Cell::new(stars), Cell::new(count)]);
    }
    output.table(&table);
    Ok(())
}

async fn vote(review_id: &str, helpful: bool, output: &Output) -> Result<()> {
    let ctx = AppContext::load()?;
    let service = ctx.service().await?;
    let counts = service.vote_review(review_id, helpful).await?;
    service.shutdown().await?;

    if output.is_human() {
        output.success(format!(
            "Vote recorded: {} helpful, {} not helpful",
            counts.helpful, counts.not_helpful
        ));
    } else {
        output.json(&serde_json::to_value(counts)?);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_tag() {
        assert_eq!(parse_tag("Funny").unwrap(), ReviewTag::Funny);
        assert_eq!(parse_tag(" boring ").unwrap(), ReviewTag::Boring);
        assert!(parse_tag("meh").is_err());
    }
}
