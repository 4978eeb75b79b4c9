use std::fs::File;
use std::io::Write;

use approx::assert_relative_eq;
use nalgebra::DMatrix;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use tempfile::tempdir;

use spike_timescales::analysis::{run, AnalysisConfig};
use spike_timescales::data_io::DataLoader;
use spike_timescales::metrics::{interval_variation, PopulationSummary};
use spike_timescales::munging::down_sample_spike_probs;
use spike_timescales::spike_train::{SpikeThreshold, Threshold};

const FOOPSI: &str = "\
0  0  0 .1  0  0 .2 .3  0  0 .9  0 .1
.3 .3  0 .4 .1  0 .2 .1 .7 .9 .1  0  0
.1 .9 .9 .9 .2 .5  0  0 .1 .4 .2 .1  0
";

#[test]
fn test_down_sample_from_file() {
    let dir = tempdir().unwrap();
    let mut file = File::create(dir.path().join("foopsi.txt")).unwrap();
    file.write_all(FOOPSI.as_bytes()).unwrap();

    let spike_probs = DataLoader::new(dir.path())
        .spike_probs("foopsi.txt")
        .unwrap();
    let (down_sampled, t_starts, t_ends) = down_sample_spike_probs(&spike_probs, 4).unwrap();

    let expected = [
        [0.09999999999999998, 0.44000000000000006, 0.9],
        [0.7060000000000001, 0.35199999999999987, 0.973],
        [0.9991, 0.6, 0.6112],
    ];
    for (cell, row) in expected.iter().enumerate() {
        for (t, value) in row.iter().enumerate() {
            assert_relative_eq!(down_sampled[(cell, t)], *value, epsilon = 1e-9);
        }
    }
    assert_eq!(t_starts, vec![0, 4, 8]);
    assert_eq!(t_ends, vec![4, 8, 12]);
}

#[test]
fn test_poisson_spiking_has_unit_variation() {
    // Bernoulli spiking with a small probability approximates a Poisson process
    let spike_probs = DMatrix::from_element(20, 20_000, 0.02);
    let mut threshold = Threshold::Chance(ChaCha8Rng::seed_from_u64(42));
    let spike_train = threshold.to_spike_train(&spike_probs).unwrap();

    let (cvs, summary) = interval_variation(&spike_train, 0.1).unwrap();
    assert!(cvs.iter().all(|cv| cv.is_some()));
    assert_eq!(summary.num_valid, 20);
    assert!((summary.mean.unwrap() - 1.0).abs() < 0.05);
}

#[test]
fn test_same_mode_at_both_resolutions() {
    let spike_probs = DMatrix::from_fn(4, 40, |cell, t| ((cell * 7 + t * 3) % 10) as f64 / 10.0);

    let config = AnalysisConfig {
        seed: 3,
        dt: 0.5,
        down_sample_timescale: 2.0,
        spike_threshold: SpikeThreshold::Fixed(0.65),
    };
    let analysis = run(&spike_probs, &config).unwrap();

    assert_eq!(
        analysis.spike_train.spikes(),
        &spike_probs.map(|p| p >= 0.65)
    );
    assert_eq!(
        analysis.spike_train_down_sampled.spikes(),
        &analysis.spike_probs_down_sampled.map(|p| p >= 0.65)
    );
    assert_eq!(analysis.summary, PopulationSummary::from_values(&analysis.cvs));
}

#[test]
fn test_degenerate_analysis() {
    // the down-sampling timescale exceeds the recording
    let spike_probs = DMatrix::from_element(2, 5, 0.5);
    let config = AnalysisConfig {
        seed: 0,
        dt: 1.0,
        down_sample_timescale: 10.0,
        spike_threshold: SpikeThreshold::Random,
    };
    let report = run(&spike_probs, &config).unwrap().report();

    assert_eq!(report.num_time_points_down_sampled, 0);
    assert_eq!(report.num_spikes_down_sampled, 0);
    assert_eq!(report.cvs, vec![None, None]);
    assert_eq!(report.summary.mean, None);
    assert_eq!(report.summary.std, None);
    assert_eq!(report.summary.sem, None);
}
