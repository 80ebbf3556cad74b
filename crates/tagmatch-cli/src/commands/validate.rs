use std::path::PathBuf;
use tagmatch_core::error::TagMatchError;

use crate::commands::{load_effective_config, pdftotext_extractor};
use crate::output;

pub struct ValidateArgs {
    pub drawing1: PathBuf,
    pub drawing2: PathBuf,
    pub mapping: PathBuf,
    pub config: Option<PathBuf>,
    pub tolerance: Option<f32>,
    pub out: Option<PathBuf>,
    pub output_format: String,
    pub show_all: bool,
}

pub fn run(args: ValidateArgs) -> Result<(), TagMatchError> {
    let extractor = pdftotext_extractor()?;
    let mut config = load_effective_config(args.config.as_deref())?;
    if let Some(tolerance) = args.tolerance {
        config.tolerance = tolerance;
    }

    let mapping = tagmatch_core::mapping::load_mapping(&args.mapping)?;
    let drawing1 = std::fs::read(&args.drawing1)?;
    let drawing2 = std::fs::read(&args.drawing2)?;

    let report = match &args.out {
        Some(path) => {
            let validated = tagmatch_core::validate_drawings(
                &drawing1, &drawing2, &mapping, &extractor, &config,
            )?;
            std::fs::write(path, &validated.annotated_pdf)?;
            eprintln!("Annotated drawing written to {}", path.display());
            validated.report
        }
        None => tagmatch_core::match_drawings(&drawing1, &drawing2, &mapping, &extractor, &config)?,
    };

    match args.output_format.as_str() {
        "json" => output::json::print(&report)?,
        _ => output::table::print(&report, args.show_all),
    }

    Ok(())
}
