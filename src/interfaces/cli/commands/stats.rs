use colored::Colorize;

use crate::interfaces::cli::CliError;
use crate::services::UrlService;

pub async fn show_stats(url_service: &UrlService) -> Result<(), CliError> {
    let stats = url_service.global_stats().await?;

    println!("{}", "snappylink statistics".bold().green());
    println!("  {:<8} {}", "Users:", stats.users.to_string().cyan());
    println!("  {:<8} {}", "Links:", stats.links.to_string().cyan());
    println!("  {:<8} {}", "Clicks:", stats.clicks.to_string().cyan());
    Ok(())
}
