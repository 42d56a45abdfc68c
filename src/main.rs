use std::env;
use std::error::Error;

use vawg::{AppConfig, AppContext, Selection};

fn main() -> Result<(), Box<dyn Error>> {
    let cfg = match env::args().nth(1) {
        Some(path) => AppConfig::from_file(path)?,
        None => AppConfig::default(),
    };

    let ctx = AppContext::load(cfg)?;
    let stats = ctx.dataset().stats();
    println!(
        "Loaded {} survey rows ({} dropped for missing Value)",
        ctx.dataset().len(),
        stats.rows_dropped
    );

    let selection = Selection {
        country: "Kenya".to_string(),
        gender: "Female".to_string(),
        demographics_question: "Age".to_string(),
        demographics_response: "15-19".to_string(),
        question: "Wife is unfaithful".to_string(),
        survey_year: 2014,
    };

    let prediction = ctx.predict(&selection)?;
    println!("Predicted justification: {}", prediction.formatted());

    Ok(())
}
