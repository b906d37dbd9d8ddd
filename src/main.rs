//! ECG rhythm classification CLI
//!
//! Command-line harness for training and validating waveform classifiers

use anyhow::Result;
use clap::{Parser, Subcommand};
use colored::Colorize;
use ecg_rhythm::{
    classify::ClassifierBuilder,
    data::{partition, take_next, Waveform, WaveformCsvReader, WaveformGenerator},
};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "ecg_rhythm")]
#[command(about = "HMM-based rhythm classification for ECG waveform recordings")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Classify one patient's normal rhythms vs. arrhythmias
    Classify {
        /// Directory of normal rhythm CSV files (one waveform per file)
        #[arg(short, long)]
        normal_dir: String,

        /// Directory of arrhythmia CSV files
        #[arg(short, long)]
        arrhythmia_dir: String,

        /// Number of hidden states per model
        #[arg(short, long, default_value = "5")]
        states: usize,

        /// Symbol alphabet size
        #[arg(short = 'k', long, default_value = "5")]
        symbols: usize,

        /// Waveforms per class used for training
        #[arg(short, long, default_value = "10")]
        train_count: usize,

        /// Waveforms per validation window
        #[arg(short, long, default_value = "3")]
        window: usize,

        /// Input files start with a header line
        #[arg(long)]
        header: bool,

        /// Zero-based CSV column holding the amplitude
        #[arg(long, default_value = "1")]
        amplitude_column: usize,

        /// RNG seed for codebook and model initialization
        #[arg(long, default_value = "42")]
        seed: u64,
    },

    /// Predict which patient sourced each rhythm sequence
    Patients {
        /// One directory per patient (repeat the flag)
        #[arg(short, long)]
        dir: Vec<String>,

        /// Number of hidden states per model
        #[arg(short, long, default_value = "5")]
        states: usize,

        /// Symbol alphabet size
        #[arg(short = 'k', long, default_value = "5")]
        symbols: usize,

        /// Waveforms per patient used for training
        #[arg(short, long, default_value = "10")]
        train_count: usize,

        /// Waveforms per validation window
        #[arg(short, long, default_value = "3")]
        window: usize,

        /// Input files start with a header line
        #[arg(long)]
        header: bool,

        /// Zero-based CSV column holding the amplitude
        #[arg(long, default_value = "1")]
        amplitude_column: usize,

        /// RNG seed for codebook and model initialization
        #[arg(long, default_value = "42")]
        seed: u64,
    },

    /// Run a self-contained demo on generated waveforms
    Synthetic {
        /// Number of hidden states per model
        #[arg(short, long, default_value = "5")]
        states: usize,

        /// Symbol alphabet size
        #[arg(short = 'k', long, default_value = "5")]
        symbols: usize,

        /// Waveforms per class used for training
        #[arg(short, long, default_value = "10")]
        train_count: usize,

        /// Waveforms per validation window
        #[arg(short, long, default_value = "3")]
        window: usize,

        /// RNG seed for generation, codebook, and models
        #[arg(long, default_value = "42")]
        seed: u64,
    },

    /// Sweep state and symbol counts on generated waveforms
    Sweep {
        /// Waveforms per class used for training
        #[arg(short, long, default_value = "10")]
        train_count: usize,

        /// Waveforms per validation window
        #[arg(short, long, default_value = "3")]
        window: usize,

        /// RNG seed for generation, codebook, and models
        #[arg(long, default_value = "42")]
        seed: u64,
    },
}

/// Model and validation knobs shared by the experiment runners
#[derive(Clone, Copy)]
struct RunConfig {
    states: usize,
    symbols: usize,
    train_count: usize,
    window: usize,
    seed: u64,
}

fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive("ecg_rhythm=info".parse()?))
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Classify {
            normal_dir,
            arrhythmia_dir,
            states,
            symbols,
            train_count,
            window,
            header,
            amplitude_column,
            seed,
        } => {
            let reader = WaveformCsvReader::new()
                .with_header(header)
                .with_amplitude_column(amplitude_column);
            let config = RunConfig {
                states,
                symbols,
                train_count,
                window,
                seed,
            };
            run_classify(&normal_dir, &arrhythmia_dir, &reader, config)?;
        }
        Commands::Patients {
            dir,
            states,
            symbols,
            train_count,
            window,
            header,
            amplitude_column,
            seed,
        } => {
            let reader = WaveformCsvReader::new()
                .with_header(header)
                .with_amplitude_column(amplitude_column);
            let config = RunConfig {
                states,
                symbols,
                train_count,
                window,
                seed,
            };
            run_patients(&dir, &reader, config)?;
        }
        Commands::Synthetic {
            states,
            symbols,
            train_count,
            window,
            seed,
        } => {
            let config = RunConfig {
                states,
                symbols,
                train_count,
                window,
                seed,
            };
            run_synthetic(config)?;
        }
        Commands::Sweep {
            train_count,
            window,
            seed,
        } => {
            run_sweep(train_count, window, seed)?;
        }
    }

    Ok(())
}

fn run_classify(
    normal_dir: &str,
    arrhythmia_dir: &str,
    reader: &WaveformCsvReader,
    config: RunConfig,
) -> Result<()> {
    println!(
        "{}",
        "Classifying a single patient's normal rhythms vs. arrhythmias...".cyan()
    );

    let normal = reader.load_directory(normal_dir)?;
    let arrhythmia = reader.load_directory(arrhythmia_dir)?;
    println!(
        "Loaded {} normal and {} arrhythmia waveforms",
        normal.len(),
        arrhythmia.len()
    );

    for (name, waveforms) in [("normal", &normal), ("arrhythmia", &arrhythmia)] {
        if waveforms.len() < config.train_count + config.window {
            anyhow::bail!(
                "{} class has {} waveforms; need at least {} for training plus one window",
                name,
                waveforms.len(),
                config.train_count + config.window
            );
        }
    }

    println!(
        "{}",
        format!(
            "Training {}-state, {}-symbol models on {} waveforms per class...",
            config.states, config.symbols, config.train_count
        )
        .cyan()
    );

    let mut classifier = ClassifierBuilder::new()
        .add_rhythms(1, normal[..config.train_count].to_vec())
        .add_rhythms(2, arrhythmia[..config.train_count].to_vec())
        .with_model_parameters(config.states, config.symbols)
        .with_seed(config.seed)
        .build()?;
    classifier.learn()?;

    println!("\n{}", "=== Validation ===".bold());
    let mut correct = 0;
    let mut total = 0;
    for (expected, holdout) in [
        (1, &normal[config.train_count..]),
        (2, &arrhythmia[config.train_count..]),
    ] {
        for group in partition(holdout, config.window, false) {
            let predicted = classifier.predict(group)?;
            write_expected_vs_predicted(expected, predicted);
            total += 1;
            if predicted == expected {
                correct += 1;
            }
        }
    }

    print_accuracy(correct, total);
    Ok(())
}

fn run_patients(dirs: &[String], reader: &WaveformCsvReader, config: RunConfig) -> Result<()> {
    if dirs.len() < 2 {
        anyhow::bail!("need at least two patient directories");
    }

    println!(
        "{}",
        "Predicting which patient sourced each rhythm sequence...".cyan()
    );

    let mut patients: Vec<(u32, Vec<Waveform>)> = Vec::new();
    for (index, dir) in dirs.iter().enumerate() {
        let waveforms = reader.load_directory(dir)?;
        if waveforms.len() < config.train_count + config.window {
            anyhow::bail!(
                "{} has {} waveforms; need at least {} for training plus one window",
                dir,
                waveforms.len(),
                config.train_count + config.window
            );
        }
        println!(
            "Patient {}: {} waveforms from {}",
            index,
            waveforms.len(),
            dir
        );
        patients.push((index as u32, waveforms));
    }

    println!(
        "{}",
        format!(
            "Training {}-state, {}-symbol models on {} waveforms per patient...",
            config.states, config.symbols, config.train_count
        )
        .cyan()
    );

    let mut builder = ClassifierBuilder::new()
        .with_model_parameters(config.states, config.symbols)
        .with_seed(config.seed);
    for (label, waveforms) in &patients {
        builder = builder.add_rhythms(*label, waveforms[..config.train_count].to_vec());
    }
    let mut classifier = builder.build()?;
    classifier.learn()?;

    println!("\n{}", "=== Validation ===".bold());
    let mut correct = 0;
    let mut total = 0;
    for (label, waveforms) in &patients {
        for group in take_next(waveforms, config.train_count, config.window) {
            let predicted = classifier.predict(group)?;
            write_expected_vs_predicted(*label, predicted);
            total += 1;
            if predicted == *label {
                correct += 1;
            }
        }
    }

    print_accuracy(correct, total);
    Ok(())
}

fn run_synthetic(config: RunConfig) -> Result<()> {
    println!("{}", "Classifying generated slow vs. fast rhythms...".cyan());

    let (slow, fast) = synthetic_pair(config.train_count, config.window, config.seed);

    let mut classifier = ClassifierBuilder::new()
        .add_rhythms(1, slow[..config.train_count].to_vec())
        .add_rhythms(2, fast[..config.train_count].to_vec())
        .with_model_parameters(config.states, config.symbols)
        .with_seed(config.seed)
        .build()?;
    classifier.learn()?;

    // Per-model scores for one window of each class
    println!("\n{}", "=== Log-likelihoods ===".bold());
    for (name, holdout) in [
        ("slow", &slow[config.train_count..]),
        ("fast", &fast[config.train_count..]),
    ] {
        let scores = classifier.log_likelihoods(&holdout[..config.window])?;
        let formatted: Vec<String> = scores
            .iter()
            .map(|(label, log_ll)| format!("model {} = {:.4}", label, log_ll))
            .collect();
        println!("  {} window: {}", name, formatted.join(", "));
    }

    println!("\n{}", "=== Validation ===".bold());
    let mut correct = 0;
    let mut total = 0;
    for (expected, holdout) in [
        (1, &slow[config.train_count..]),
        (2, &fast[config.train_count..]),
    ] {
        for group in partition(holdout, config.window, false) {
            let predicted = classifier.predict(group)?;
            write_expected_vs_predicted(expected, predicted);
            total += 1;
            if predicted == expected {
                correct += 1;
            }
        }
    }

    print_accuracy(correct, total);
    Ok(())
}

fn run_sweep(train_count: usize, window: usize, seed: u64) -> Result<()> {
    if train_count < 4 {
        anyhow::bail!("sweep needs a training count of at least 4");
    }

    println!(
        "{}",
        "Sweeping state and symbol counts on generated rhythms...".cyan()
    );

    let (slow, fast) = synthetic_pair(train_count, window, seed);

    println!(
        "\n{}",
        format!("{:>8} {:>8} {:>10}", "states", "symbols", "accuracy").bold()
    );
    for &states in &[2, 3, 5, 8] {
        for &symbols in &[2, 3, 5, 8] {
            let mut classifier = ClassifierBuilder::new()
                .add_rhythms(1, slow[..train_count].to_vec())
                .add_rhythms(2, fast[..train_count].to_vec())
                .with_model_parameters(states, symbols)
                .with_seed(seed)
                .build()?;
            classifier.learn()?;

            let mut correct = 0;
            let mut total = 0;
            for (expected, holdout) in [(1, &slow[train_count..]), (2, &fast[train_count..])] {
                for group in partition(holdout, window, false) {
                    if classifier.predict(group)? == expected {
                        correct += 1;
                    }
                    total += 1;
                }
            }

            let accuracy = correct as f64 / total as f64 * 100.0;
            let row = format!("{:>8} {:>8} {:>9.1}%", states, symbols, accuracy);
            if correct == total {
                println!("{}", row.green());
            } else {
                println!("{}", row);
            }
        }
    }

    Ok(())
}

/// Two well-separated synthetic rhythm classes sharing a seed
///
/// The classes differ in rate, amplitude, and baseline level, so their
/// signal vectors quantize to disjoint symbol groups.
fn synthetic_pair(train_count: usize, window: usize, seed: u64) -> (Vec<Waveform>, Vec<Waveform>) {
    let count = train_count + window * 2;

    let slow = WaveformGenerator::new(1.5, 1.0)
        .with_noise(0.05)
        .with_seed(seed)
        .generate(count);
    let fast = WaveformGenerator::new(5.0, 2.0)
        .with_baseline(8.0)
        .with_noise(0.05)
        .with_seed(seed.wrapping_add(1))
        .generate(count);

    (slow, fast)
}

fn write_expected_vs_predicted(expected: u32, predicted: u32) {
    let line = format!("Expected = {} || Predicted = {}", expected, predicted);
    if expected == predicted {
        println!("  {}", line.green());
    } else {
        println!("  {}", line.red());
    }
}

fn print_accuracy(correct: usize, total: usize) {
    if total == 0 {
        println!("{}", "No validation windows".yellow());
        return;
    }

    let accuracy = correct as f64 / total as f64 * 100.0;
    let line = format!("Accuracy: {}/{} ({:.1}%)", correct, total, accuracy);
    if correct == total {
        println!("\n{}", line.green().bold());
    } else {
        println!("\n{}", line.yellow().bold());
    }
}
