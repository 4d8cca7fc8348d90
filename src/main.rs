use clap::Parser;

use snappylink::cli::Cli;
use snappylink::runtime::modes::{self, Mode};

#[actix_web::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    dotenvy::dotenv().ok();

    snappylink::config::init_config();
    let config = snappylink::config::get_config();

    match modes::detect_mode(cli.command) {
        Mode::Server => {
            // guard 必须活到进程结束
            let _log_guard = snappylink::system::logging::init_logging(&config.logging)?;
            modes::run_server().await
        }
        #[cfg(feature = "cli")]
        Mode::Cli(cmd) => {
            if let Err(e) = modes::run_cli(cmd).await {
                eprintln!("{}", e.format_colored());
                std::process::exit(1);
            }
            Ok(())
        }
    }
}
