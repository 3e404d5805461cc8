use std::error::Error;
use std::fs::File;
use std::io::{BufRead, BufReader};

use map_model::attribution::{Attribution, OperatorExtract};

/// Reads the transitland operator ndjson extract and writes the attribution
/// JSON array the site's about page fetches. Operators whose feed license
/// is empty, or allows use without attribution, are left out.
fn mainr() -> Result<(), Box<dyn Error>> {
    let path = std::env::args()
        .nth(1)
        .ok_or("usage: attribution <operators.ndjson>")?;
    let reader = BufReader::new(File::open(&path)?);

    let mut attributions = Vec::new();
    for line in reader.lines() {
        let line = line?;
        if line.is_empty() {
            continue;
        }
        let operator: OperatorExtract = serde_json::from_str(&line)?;
        if let Some(attribution) = Attribution::from_operator(&operator.properties) {
            attributions.push(attribution);
        }
    }

    eprintln!("{} operators require attribution", attributions.len());
    println!("{}", serde_json::to_string(&attributions)?);
    Ok(())
}

fn main() {
    env_logger::init();
    mainr().unwrap()
}
