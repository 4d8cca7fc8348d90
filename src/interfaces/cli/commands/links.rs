//! List and remove link commands

use colored::Colorize;

use crate::errors::SnappyError;
use crate::interfaces::cli::CliError;
use crate::services::{AuthService, UrlService};

pub async fn list_links(
    url_service: &UrlService,
    auth_service: &AuthService,
    user: Option<String>,
) -> Result<(), CliError> {
    let links = match user {
        Some(email) => {
            let owner = auth_service
                .find_by_email(&email)
                .await?
                .ok_or_else(|| CliError::CommandError(format!("No user with email {}", email)))?;
            url_service.get_user_urls(&owner.id).await?
        }
        None => url_service.list_all_urls().await?,
    };

    if links.is_empty() {
        println!("{} No short links found", "ℹ".bold().blue());
        return Ok(());
    }

    println!("{}", "Short link list:".bold().green());
    println!();
    for link in &links {
        let mut info_parts = vec![format!(
            "{} -> {}",
            link.short_code.cyan(),
            link.original_url.blue().underline()
        )];

        if let Some(title) = &link.title {
            info_parts.push(format!("\"{}\"", title).dimmed().to_string());
        }

        if let Some(expires_at) = link.expires_at {
            info_parts.push(
                format!("(expires: {})", expires_at.format("%Y-%m-%d %H:%M:%S UTC"))
                    .dimmed()
                    .yellow()
                    .to_string(),
            );
        }

        if link.clicks > 0 {
            info_parts.push(
                format!("(clicks: {})", link.clicks)
                    .dimmed()
                    .cyan()
                    .to_string(),
            );
        }

        println!("  {}", info_parts.join(" "));
    }
    println!();
    println!(
        "{} Total {} short links",
        "ℹ".bold().blue(),
        links.len().to_string().green()
    );
    Ok(())
}

pub async fn remove_link(url_service: &UrlService, short_code: String) -> Result<(), CliError> {
    match url_service.remove_by_code(&short_code).await {
        Ok(()) => {
            println!(
                "{} Deleted short link: {}",
                "✓".bold().green(),
                short_code.cyan()
            );
            Ok(())
        }
        Err(SnappyError::NotFound(_)) => Err(CliError::CommandError(format!(
            "Short link does not exist: {}",
            short_code
        ))),
        Err(e) => Err(CliError::CommandError(format!("Failed to delete: {}", e))),
    }
}
