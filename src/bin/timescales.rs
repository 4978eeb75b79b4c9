use std::path::PathBuf;

use clap::Parser;
use log::LevelFilter;
use log4rs::append::file::FileAppender;
use log4rs::config::{Appender, Config, Root};
use log4rs::encode::pattern::PatternEncoder;
use sha2::{Digest, Sha256};

use spike_timescales::analysis::{run, AnalysisConfig};
use spike_timescales::data_io::load_matrix;
use spike_timescales::error::TimescaleError;
use spike_timescales::spike_train::SpikeThreshold;

#[derive(Parser, Debug)]
struct Args {
    /// The text file with the spike probabilities (rows are cells, columns are time points)
    #[arg(long)]
    data: PathBuf,
    /// A JSON file with the analysis parameters, overriding the ones below
    #[arg(long)]
    config: Option<PathBuf>,
    /// The seed used for the random spike threshold
    #[arg(long, default_value = "0")]
    seed: u64,
    /// The time step of the spike probabilities (in seconds)
    #[arg(long, default_value = "0.1")]
    dt: f64,
    /// The time step after down-sampling (in seconds)
    #[arg(long, default_value = "1.0")]
    down_sample_timescale: f64,
    /// The spike threshold, must be one of: random, or a number in [0, 1]
    #[arg(long, default_value = "random")]
    spike_threshold: String,
}

fn main() -> Result<(), TimescaleError> {
    let args = Args::parse();

    let mut hasher = Sha256::new();
    hasher.update(format!("{:?}", args));
    let hash = hasher.finalize();
    let log_path = format!("log/{:x}.log", hash);

    let logfile = FileAppender::builder()
        .encoder(Box::new(PatternEncoder::new("{l} - {m}\n")))
        .build(log_path)
        .map_err(|e| TimescaleError::IOError(e.to_string()))?;

    let config = Config::builder()
        .appender(Appender::builder().build("logfile", Box::new(logfile)))
        .build(Root::builder().appender("logfile").build(LevelFilter::Info))
        .map_err(|e| TimescaleError::IOError(e.to_string()))?;

    log4rs::init_config(config).map_err(|e| TimescaleError::IOError(e.to_string()))?;

    log::info!("{:?}", args);

    let config = match &args.config {
        Some(path) => AnalysisConfig::load_from(path)?,
        None => AnalysisConfig {
            seed: args.seed,
            dt: args.dt,
            down_sample_timescale: args.down_sample_timescale,
            spike_threshold: args.spike_threshold.parse::<SpikeThreshold>()?,
        },
    };
    log::info!("{:?}", config);

    let spike_probs = load_matrix(&args.data)?;
    log::info!(
        "Data loading: done! {} cells and {} time points",
        spike_probs.nrows(),
        spike_probs.ncols()
    );

    let analysis = run(&spike_probs, &config)?;
    log::info!("Analysis: done!");

    let report = serde_json::to_string_pretty(&analysis.report())
        .map_err(|e| TimescaleError::IOError(e.to_string()))?;
    println!("{}", report);

    Ok(())
}
