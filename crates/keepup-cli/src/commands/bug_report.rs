use super::context::AppContext;
use super::prompts;
use crate::output::Output;
use color_eyre::Result;

pub async fn run_bug_report(title: Option<String>, description: Option<String>, output: &Output) -> Result<()> {
    let title = prompts::value_or_prompt(title, "Title", false)?;
    let description = prompts::value_or_prompt(description, "What happened?", true)?;

    let ctx = AppContext::load()?;
    let service = ctx.service().await?;
    let report = service.submit_bug_report(&title, &description, &device_info()).await?;
    service.shutdown().await?;

    if output.is_human() {
        output.success(format!("Bug report {} filed. Thank you!", report.id));
    } else {
        output.json(&serde_json::to_value(&report)?);
    }
    Ok(())
}

fn device_info() -> String {
    format!(
        "keepup {} ({} {})",
        env!("CARGO_PKG_VERSION"),
        std::env::consts::OS,
        std::env::consts::ARCH
    )
}
