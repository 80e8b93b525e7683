//! mistgrep binary: resolve the environment, provision a shell, run the
//! script, print and write the report.

use std::process::ExitCode;

use log::{error, info};

use mistgrep::report::write_report;
use mistgrep::{ApiClient, Config, Result, Session, SessionOptions, WsTransport};

#[tokio::main]
async fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    match run().await {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            error!("{err}");
            ExitCode::FAILURE
        }
    }
}

async fn run() -> Result<()> {
    let config = Config::from_env()?;

    println!("{:-^72}", " settings ");
    println!("host:      {}", config.host);
    println!("api host:  {}", config.api_host);
    println!("api token: {}", config.redacted_token());
    println!("site:      {}", config.site_id);
    println!("device:    {}", config.device_id);
    println!("match:     {}", config.log_match);
    println!("{:-^72}", "");

    let api = ApiClient::from_config(&config)?;
    let endpoint = api
        .shell_endpoint(&config.site_id, &config.device_id)
        .await?;

    let transport = WsTransport::connect(&endpoint.url, config.read_timeout).await?;
    let options = SessionOptions::new(&config.log_match)
        .with_read_timeout(config.read_timeout)
        .with_session_timeout(config.session_timeout);
    let report = Session::new(transport, options).run().await?;

    println!("{:-^72}", " results ");
    for line in &report.lines {
        println!("{line}");
    }
    println!("{:-^72}", "");
    println!(
        "{} matching lines across {} files in {:.2?}",
        report.lines.len(),
        report.files.len(),
        report.elapsed
    );
    for record in report.shortfalls() {
        println!("incomplete: {record}");
    }

    write_report(&config.out_file, &report)?;
    info!("wrote report to {}", config.out_file.display());

    Ok(())
}
