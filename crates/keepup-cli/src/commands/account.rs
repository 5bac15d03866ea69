use super::context::AppContext;
use super::prompts;
use crate::output::{detail_table, Output};
use crate::AccountCommands;
use chrono::Utc;
use color_eyre::Result;
use keepup_models::UserIdentity;
use serde_json::json;

pub async fn run_account(cmd: AccountCommands, output: &Output) -> Result<()> {
    let mut ctx = AppContext::load()?;

    match cmd {
        AccountCommands::SignIn { user_id, name, email } => {
            let identity = UserIdentity {
                user_id,
                display_name: name,
                email,
            };
            let service = ctx.service().await?;
            service.sign_in(identity.clone()).await?;
            service.shutdown().await?;

            ctx.credentials.set_session(&identity, Utc::now());
            ctx.save_credentials()?;
            output.success(format!("Signed in as {}", identity.display_name));
        }
        AccountCommands::SignOut => {
            let service = ctx.service().await?;
            service.sign_out().await?;

            ctx.credentials.clear_session();
            ctx.save_credentials()?;
            output.success("Signed out");
        }
        AccountCommands::Whoami => whoami(&ctx, output).await?,
        AccountCommands::Delete { yes } => {
            let service = ctx.service().await?;
            let Some(user) = service.current_user() else {
                return Err(color_eyre::eyre::eyre!("Not signed in"));
            };

            let confirmed = yes
                || prompts::prompt_yes_no(
                    &format!("Delete the account of {} with all reviews and progress?", user.display_name),
                    false,
                )?;
            if !confirmed {
                output.warn("Account deletion cancelled");
                return Ok(());
            }

            service.delete_account().await?;
            service.shutdown().await?;
            ctx.credentials.clear_session();
            ctx.save_credentials()?;
            output.success("Account deleted");
        }
    }
    Ok(())
}

async fn whoami(ctx: &AppContext, output: &Output) -> Result<()> {
    let service = ctx.service().await?;
    let Some(user) = service.current_user() else {
        if output.is_human() {
            output.info("Not signed in");
        } else {
            output.json(&json!({ "signedIn": false }));
        }
        return Ok(());
    };
    let profile = service.profile().await?;
    let signed_in_at = ctx.credentials.get_session_signed_in_at();

    if !output.is_human() {
        output.json(&json!({
            "signedIn": true,
            "user": user,
            "profile": profile,
            "signedInAt": signed_in_at,
        }));
        return Ok(());
    }

    let mut rows = vec![("User ID", user.user_id.clone()), ("Name", user.display_name.clone())];
    if let Some(email) = &user.email {
        rows.push(("Email", email.clone()));
    }
    if let Some(profile) = profile {
        rows.push(("Member since", profile.created_at.format("%Y-%m-%d").to_string()));
    }
    if let Some(at) = signed_in_at {
        rows.push(("Signed in", at.format("%Y-%m-%d %H:%M UTC").to_string()));
    }
    output.table(&detail_table("Account", &rows));
    Ok(())
}
