use anyhow::{bail, Context, Result};
use clap::error::ErrorKind;
use clap::Parser;
use contentrec_core::{respond, respond_str, RecommenderConfig, Response, DEFAULT_TOP_K};
use serde_json::Value;
use tracing_subscriber::{fmt, EnvFilter};
use walkdir::WalkDir;

use std::ffi::OsString;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::{Path, PathBuf};
use std::process::ExitCode;

const USAGE: &str = "usage: contentrec <ITEM_ID> <ITEMS_JSON> | contentrec <ITEM_ID> --input <PATH>";

#[derive(Parser, Debug)]
#[command(name = "contentrec", version)]
#[command(about = "Recommend items with similar descriptions (TF-IDF cosine similarity)", long_about = None)]
struct Cli {
    /// Id of the reference item
    #[arg(allow_negative_numbers = true)]
    item_id: i64,
    /// Items as a JSON array of {"id", "description"} records
    items_json: Option<String>,
    /// Read items from a .json/.jsonl file, or from every such file under a directory
    #[arg(long, conflicts_with = "items_json")]
    input: Option<PathBuf>,
    /// Maximum number of recommendations
    #[arg(long, default_value_t = DEFAULT_TOP_K)]
    top_k: usize,
    /// Stem terms with the English Snowball stemmer
    #[arg(long, default_value_t = false)]
    stem: bool,
    /// Apply NFKC normalization before tokenizing
    #[arg(long, default_value_t = false)]
    nfkc: bool,
    /// Emit {"id", "score"} pairs instead of bare ids
    #[arg(long, default_value_t = false)]
    scores: bool,
}

/// Body for stdout plus whether the invocation shape itself was wrong.
#[derive(Debug)]
struct Outcome {
    response: Response,
    usage_error: bool,
}

impl Outcome {
    fn exit_code(&self) -> ExitCode {
        if self.usage_error { ExitCode::FAILURE } else { ExitCode::SUCCESS }
    }
}

fn main() -> ExitCode {
    fmt().with_env_filter(EnvFilter::from_default_env()).with_writer(std::io::stderr).init();
    let outcome = run(std::env::args_os());
    println!("{}", outcome.response.to_json());
    outcome.exit_code()
}

/// Only a malformed invocation is a failure; every pipeline error is just an error body.
fn run<I, T>(args: I) -> Outcome
where
    I: IntoIterator<Item = T>,
    T: Into<OsString> + Clone,
{
    let cli = match Cli::try_parse_from(args) {
        Ok(cli) => cli,
        Err(e) if matches!(e.kind(), ErrorKind::DisplayHelp | ErrorKind::DisplayVersion) => e.exit(),
        Err(e) => return usage_failure(first_line(&e.to_string())),
    };

    let config = RecommenderConfig::default()
        .with_top_k(cli.top_k)
        .with_stemming(cli.stem)
        .with_unicode_normalization(cli.nfkc);

    let response = match (&cli.items_json, &cli.input) {
        (Some(raw), _) => respond_str(cli.item_id, raw, &config, cli.scores),
        (None, Some(path)) => match load_items(path) {
            Ok(items) => respond(cli.item_id, &items, &config, cli.scores),
            Err(e) => {
                tracing::error!(path = %path.display(), error = %e, "failed to read items");
                Response::error(format!("failed to read items: {e:#}"))
            }
        },
        (None, None) => return usage_failure("missing items: pass ITEMS_JSON or --input"),
    };
    Outcome { response, usage_error: false }
}

fn usage_failure(reason: &str) -> Outcome {
    Outcome { response: Response::error(format!("{USAGE} ({reason})")), usage_error: true }
}

fn first_line(message: &str) -> &str {
    let line = message.lines().next().unwrap_or("").trim();
    line.strip_prefix("error: ").unwrap_or(line)
}

/// Collect item records from a file or a directory of .json/.jsonl files.
fn load_items(path: &Path) -> Result<Value> {
    let mut files: Vec<PathBuf> = Vec::new();
    if path.is_dir() {
        for entry in WalkDir::new(path).sort_by_file_name().into_iter().filter_map(|e| e.ok()) {
            let p = entry.path();
            if p.is_file() && matches!(extension(p), Some("json" | "jsonl")) {
                files.push(p.to_path_buf());
            }
        }
    } else if path.is_file() {
        files.push(path.to_path_buf());
    } else {
        bail!("{} does not exist", path.display());
    }

    let mut records: Vec<Value> = Vec::new();
    for file in files {
        if extension(&file) == Some("jsonl") {
            read_jsonl(&file, &mut records)?;
        } else {
            read_json(&file, &mut records)?;
        }
    }
    tracing::info!(num_items = records.len(), path = %path.display(), "read items");
    Ok(Value::Array(records))
}

fn extension(path: &Path) -> Option<&str> { path.extension().and_then(|s| s.to_str()) }

fn read_jsonl(file: &Path, records: &mut Vec<Value>) -> Result<()> {
    let reader = BufReader::new(File::open(file).with_context(|| format!("opening {}", file.display()))?);
    for (lineno, line) in reader.lines().enumerate() {
        let line = line?;
        if line.trim().is_empty() { continue; }
        let record: Value = serde_json::from_str(&line)
            .with_context(|| format!("{}:{}: invalid JSON", file.display(), lineno + 1))?;
        records.push(record);
    }
    Ok(())
}

fn read_json(file: &Path, records: &mut Vec<Value>) -> Result<()> {
    let reader = BufReader::new(File::open(file).with_context(|| format!("opening {}", file.display()))?);
    let json: Value = serde_json::from_reader(reader).with_context(|| format!("{}: invalid JSON", file.display()))?;
    match json {
        Value::Array(arr) => records.extend(arr),
        Value::Object(_) => records.push(json),
        _ => bail!("{}: expected an array of items or a single item object", file.display()),
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    fn ids(items: &Value) -> Vec<i64> {
        items.as_array().unwrap().iter().map(|r| r["id"].as_i64().unwrap()).collect()
    }

    #[test]
    fn reads_directory_in_file_name_order() {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join("b.jsonl"), "{\"id\":3,\"description\":\"wool coat\"}\n\n{\"id\":4}\n").unwrap();
        fs::write(dir.path().join("a.json"), r#"[{"id":1,"description":"red dress"},{"id":2,"description":null}]"#).unwrap();
        fs::write(dir.path().join("notes.txt"), "ignored").unwrap();
        let items = load_items(dir.path()).unwrap();
        assert_eq!(ids(&items), vec![1, 2, 3, 4]);
    }

    #[test]
    fn single_object_file_is_one_item() {
        let dir = tempdir().unwrap();
        let file = dir.path().join("item.json");
        fs::write(&file, r#"{"id":9,"description":"silk scarf"}"#).unwrap();
        assert_eq!(ids(&load_items(&file).unwrap()), vec![9]);
    }

    #[test]
    fn bad_input_is_reported() {
        let dir = tempdir().unwrap();
        let file = dir.path().join("broken.jsonl");
        fs::write(&file, "{\"id\":1}\n{oops\n").unwrap();
        let err = load_items(&file).unwrap_err();
        assert!(format!("{err:#}").contains("broken.jsonl:2"));
        assert!(load_items(&dir.path().join("missing.json")).is_err());
    }

    #[test]
    fn parses_invocation_shapes() {
        let cli = Cli::try_parse_from(["contentrec", "1", "[]"]).unwrap();
        assert_eq!(cli.item_id, 1);
        assert_eq!(cli.top_k, DEFAULT_TOP_K);
        let cli = Cli::try_parse_from(["contentrec", "-3", "--input", "items.json", "--top-k", "5"]).unwrap();
        assert_eq!(cli.item_id, -3);
        assert_eq!(cli.top_k, 5);
        assert!(Cli::try_parse_from(["contentrec"]).is_err());
        assert!(Cli::try_parse_from(["contentrec", "1", "[]", "extra"]).is_err());
        assert!(Cli::try_parse_from(["contentrec", "abc", "[]"]).is_err());
        assert!(Cli::try_parse_from(["contentrec", "1", "[]", "--input", "x.json"]).is_err());
    }

    fn error_of(outcome: &Outcome) -> &str {
        match &outcome.response {
            Response::Error { error } => error,
            other => panic!("expected an error body, got {other:?}"),
        }
    }

    #[test]
    fn wrong_invocation_shape_fails_with_usage_body() {
        for args in [
            vec!["contentrec"],
            vec!["contentrec", "1"],
            vec!["contentrec", "1", "[]", "extra"],
            vec!["contentrec", "abc", "[]"],
            vec!["contentrec", "1", "[]", "--input", "x.json"],
        ] {
            let outcome = run(args.clone());
            assert!(outcome.usage_error, "{args:?}");
            assert!(error_of(&outcome).starts_with("usage: contentrec"), "{args:?}");
        }
        let missing = run(["contentrec", "1"]);
        assert!(error_of(&missing).contains("missing items"));
    }

    #[test]
    fn pipeline_errors_complete_normally() {
        let unknown = run(["contentrec", "99", r#"[{"id":1,"description":"wool coat"}]"#]);
        assert!(!unknown.usage_error);
        assert!(error_of(&unknown).contains("99"));

        let malformed = run(["contentrec", "1", "[{\"description\":\"no id\"}]"]);
        assert!(!malformed.usage_error);
        assert!(malformed.response.is_error());

        let dir = tempdir().unwrap();
        let missing = dir.path().join("missing.json");
        let unreadable = run([OsString::from("contentrec"), "1".into(), "--input".into(), missing.into_os_string()]);
        assert!(!unreadable.usage_error);
        assert!(error_of(&unreadable).starts_with("failed to read items"));
    }

    #[test]
    fn recommends_from_argument_and_file() {
        let items = r#"[{"id":1,"description":"apple fruit"},{"id":2,"description":"apple fruit"},{"id":3,"description":"car engine"}]"#;
        let outcome = run(["contentrec", "1", items]);
        assert!(!outcome.usage_error);
        assert_eq!(outcome.response, Response::Recommendations { recommendations: vec![2, 3] });

        let dir = tempdir().unwrap();
        let file = dir.path().join("items.json");
        fs::write(&file, items).unwrap();
        let outcome = run([OsString::from("contentrec"), "3".into(), "--input".into(), file.into_os_string(), "--top-k".into(), "1".into()]);
        assert!(!outcome.usage_error);
        assert_eq!(outcome.response.to_json(), r#"{"recommendations":[1]}"#);
    }

    #[test]
    fn usage_reason_drops_clap_prefix() {
        assert_eq!(first_line("error: unexpected argument 'x' found\n\nUsage: ..."), "unexpected argument 'x' found");
    }
}
