use std::error::Error;
use std::fs;
use regex::Regex;

/// Directory holding the sample traces and their expected results
pub const FIXTURES_PATH: &str = concat!(env!("CARGO_MANIFEST_DIR"), "/fixtures");

pub struct TestCasePaths {
    pub name: String,
    pub trace: String,
    pub output: String,
}

/// Finds every `expected-<trace>.json` in the fixtures directory, paired with `<trace>.trace`
pub fn get_cases() -> Result<Vec<TestCasePaths>, Box<dyn Error>> {
    let output_pattern = Regex::new(r"^expected-(?P<trace>[0-9a-zA-Z_]+)\.json$")?;
    let mut names = Vec::new();
    for entry in fs::read_dir(FIXTURES_PATH)? {
        let file_name = entry?
            .file_name()
            .into_string()
            .map_err(|e| format!("Can't convert OS string ({e:?}) to standard string"))?;
        if output_pattern.is_match(&file_name) {
            names.push(file_name);
        }
    }
    names.sort();
    let mut out = Vec::new();
    for file_name in names {
        let tokens = output_pattern.captures(&file_name).ok_or("Couldn't parse the file name".to_string())?;
        let trace = tokens.name("trace").ok_or("Couldn't get the trace name from the output file name".to_string())?.as_str();
        out.push(TestCasePaths {
            name: trace.to_string(),
            trace: format!("{FIXTURES_PATH}/{trace}.trace"),
            output: format!("{FIXTURES_PATH}/{file_name}"),
        })
    }
    Ok(out)
}
