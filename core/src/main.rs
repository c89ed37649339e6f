use clap::Parser;
use log::{error, info};
use mrnet_core::cli::report::{BatchSummary, DatasetSummary, TextReport};
use mrnet_core::cli::{Cli, OutputFormat, StoreFormat};
use mrnet_core::{
    BatchGenerator, ClassWeights, DicomExamStore, ExamCatalog, ExamStore, GeneratorConfig,
    LabelTable, NpyExamStore, Result,
};
use std::process;

fn main() {
    let cli = Cli::parse();

    // Setup logging
    setup_logging(cli.verbose);

    // Verify dataset root exists
    if !cli.root.is_dir() {
        eprintln!("Error: {} is not a directory", cli.root.display());
        process::exit(1);
    }

    info!("Processing dataset: {}", cli.root.display());

    let (summary, batch) = match run(&cli) {
        Ok(output) => output,
        Err(e) => {
            error!("{}", e);
            eprintln!("Error: {}", e);
            process::exit(1);
        }
    };

    match cli.format {
        OutputFormat::Text => {
            let report = TextReport::new(&summary, batch.as_ref());
            println!("{}", report);
        }
        OutputFormat::Json => {
            #[cfg(feature = "json")]
            {
                match output_json(&summary, batch.as_ref()) {
                    Ok(json) => println!("{}", json),
                    Err(e) => {
                        error!("Failed to serialize to JSON: {}", e);
                        eprintln!("Error: Failed to serialize to JSON: {}", e);
                        process::exit(1);
                    }
                }
            }
            #[cfg(not(feature = "json"))]
            {
                eprintln!("Error: JSON output requires the 'json' feature");
                eprintln!("Rebuild with: cargo build --features json");
                process::exit(1);
            }
        }
    }
}

fn setup_logging(verbose: bool) {
    if verbose {
        env_logger::Builder::from_default_env()
            .filter_level(log::LevelFilter::Debug)
            .init();
    } else {
        env_logger::Builder::from_default_env()
            .filter_level(log::LevelFilter::Info)
            .init();
    }
}

fn run(cli: &Cli) -> Result<(DatasetSummary, Option<BatchSummary>)> {
    let mut config = cli.apply(base_config(cli)?);

    let catalog = ExamCatalog::scan(&cli.root, cli.store.extension())?;
    let labels = LabelTable::from_csv_dir(&cli.root, &config.data_type, &[&config.label_type])?;
    info!("Loaded {} labeled exams", labels.len());

    if cli.balanced {
        let ids = catalog.ids(&config.data_type, &config.exam_type)?;
        let weights = ClassWeights::balanced(labels.labels_for(ids, &config.label_type)?)?;
        info!("Balanced class weights: {}", weights);
        config = config.with_class_weight(weights);
    }

    let store: Box<dyn ExamStore> = match cli.store {
        StoreFormat::Npy => Box::new(NpyExamStore::new(&cli.root, labels)),
        StoreFormat::Dicom => Box::new(DicomExamStore::new(&cli.root, labels)),
    };

    let mut generator = BatchGenerator::new(store, &catalog, config)?;
    let summary = DatasetSummary::from_generator(cli.root.clone(), &generator)?;

    let batch = match cli.batch {
        Some(index) => {
            let batch = generator.get(index)?;
            info!("Generated batch {} from exam {}", index, batch.id);
            Some(BatchSummary::new(index, &batch))
        }
        None => None,
    };

    Ok((summary, batch))
}

#[cfg(feature = "json")]
fn base_config(cli: &Cli) -> Result<GeneratorConfig> {
    match &cli.config {
        Some(path) => {
            info!("Reading generator config: {}", path.display());
            GeneratorConfig::from_json_file(path)
        }
        None => Ok(GeneratorConfig::default()),
    }
}

#[cfg(not(feature = "json"))]
fn base_config(cli: &Cli) -> Result<GeneratorConfig> {
    match &cli.config {
        Some(_) => Err(mrnet_core::MrnetError::InvalidConfig(
            "reading a config file requires the 'json' feature".to_string(),
        )),
        None => Ok(GeneratorConfig::default()),
    }
}

#[cfg(feature = "json")]
fn output_json(
    summary: &DatasetSummary,
    batch: Option<&BatchSummary>,
) -> std::result::Result<String, serde_json::Error> {
    use serde::Serialize;

    #[derive(Serialize)]
    struct ReportJson<'a> {
        dataset: &'a DatasetSummary,
        batch: Option<&'a BatchSummary>,
    }

    serde_json::to_string_pretty(&ReportJson {
        dataset: summary,
        batch,
    })
}
