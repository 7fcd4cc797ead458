use clap::Parser;
use dotenv::dotenv;
use feature_roi_agent::cli::Args;
use log::debug;

#[tokio::main]
async fn main() {
    dotenv().ok();
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let args = Args::parse();

    if let Err(e) = feature_roi_agent::run(args).await {
        debug!("Report generation failed: {:?}", e);
        eprintln!("{}", e);
        std::process::exit(1);
    }
}
