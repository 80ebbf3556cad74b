use tagmatch_core::error::TagMatchError;
use tagmatch_core::MatchReport;

pub fn print(report: &MatchReport) -> Result<(), TagMatchError> {
    let json = serde_json::to_string_pretty(report)?;
    println!("{json}");
    Ok(())
}
