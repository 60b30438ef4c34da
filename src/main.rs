use clap::Parser;

use log::{error, info};
use std::process::ExitCode;

use caption_prep::{process_dataset, setup_output_directories, Args};

fn main() -> ExitCode {
    // Initialize the logger
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let args = Args::parse();

    info!("Starting dataset preparation...");

    let output_dirs = match setup_output_directories(&args.output_dir) {
        Ok(output_dirs) => output_dirs,
        Err(e) => {
            error!("Failed to set up output directories: {}", e);
            return ExitCode::FAILURE;
        }
    };

    match process_dataset(&output_dirs, &args) {
        Ok(stats) => {
            stats.print_summary();
            info!("Dataset preparation completed successfully.");
            ExitCode::SUCCESS
        }
        Err(e) => {
            error!("Failed to process dataset: {}", e);
            ExitCode::FAILURE
        }
    }
}
