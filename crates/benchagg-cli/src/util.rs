use std::{
    fs::File,
    io::{self, BufWriter, StdoutLock, Write as _},
    path::{Path, PathBuf},
};

use anyhow::Context;
use benchagg_analysis::record::Record;

#[derive(Debug)]
pub enum Output {
    Stdout {
        writer: StdoutLock<'static>,
    },
    File {
        writer: BufWriter<File>,
        path: PathBuf,
    },
}

impl Output {
    pub fn save_json<T>(value: &T, output_path: Option<PathBuf>) -> anyhow::Result<()>
    where
        T: serde::Serialize,
    {
        let mut output = Output::from_output_path(output_path)?;
        output.write_json(value)
    }

    pub fn from_output_path(output_path: Option<PathBuf>) -> anyhow::Result<Self> {
        match output_path {
            Some(path) => Output::open(path),
            None => Ok(Output::stdout()),
        }
    }

    pub fn stdout() -> Self {
        Output::Stdout {
            writer: io::stdout().lock(),
        }
    }

    pub fn open(path: PathBuf) -> anyhow::Result<Self> {
        let file = File::create(&path)
            .with_context(|| format!("Failed to create output file: {}", path.display()))?;
        Ok(Output::File {
            writer: BufWriter::new(file),
            path,
        })
    }

    pub fn display_path(&self) -> String {
        match self {
            Output::Stdout { .. } => "stdout".to_string(),
            Output::File { path, .. } => path.display().to_string(),
        }
    }

    pub fn write_json<T>(&mut self, value: T) -> anyhow::Result<()>
    where
        T: serde::Serialize,
    {
        serde_json::to_writer_pretty(&mut *self, &value)
            .with_context(|| format!("Failed to write JSON to {}", self.display_path()))?;
        writeln!(&mut *self).with_context(|| {
            format!(
                "Failed to write newline after JSON to {}",
                self.display_path()
            )
        })?;
        self.flush()
            .with_context(|| format!("Failed to flush output to {}", self.display_path()))?;
        tracing::info!(path = %self.display_path(), "JSON written");
        Ok(())
    }
}

impl io::Write for Output {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        match self {
            Output::Stdout { writer } => writer.write(buf),
            Output::File { writer, .. } => writer.write(buf),
        }
    }

    fn flush(&mut self) -> io::Result<()> {
        match self {
            Output::Stdout { writer } => writer.flush(),
            Output::File { writer, .. } => writer.flush(),
        }
    }
}

pub fn read_json_file<T, P>(file_kind: &str, path: P) -> anyhow::Result<T>
where
    T: serde::de::DeserializeOwned,
    P: AsRef<Path>,
{
    let path = path.as_ref();
    let file = File::open(path)
        .with_context(|| format!("Failed to open {} file: {}", file_kind, path.display()))?;

    let reader = io::BufReader::new(file);
    let value = serde_json::from_reader(reader).with_context(|| {
        format!(
            "Failed to parse {} JSON file: {}",
            file_kind,
            path.display()
        )
    })?;

    Ok(value)
}

/// Read benchmark run records from a JSON file
///
/// The file must hold a top-level array of run objects.
///
/// # Errors
///
/// Returns error if file cannot be opened or parsed
pub fn read_results_file<P>(path: P) -> anyhow::Result<Vec<Record>>
where
    P: AsRef<Path>,
{
    let path = path.as_ref();
    let records: Vec<Record> = read_json_file("benchmark results", path)?;
    tracing::info!(path = %path.display(), runs = records.len(), "loaded results");
    Ok(records)
}

/// Series labels for the given results files
///
/// Uses `labels` when given, otherwise the file stems.
pub fn series_labels(paths: &[PathBuf], labels: &[String]) -> anyhow::Result<Vec<String>> {
    if !labels.is_empty() {
        anyhow::ensure!(
            labels.len() == paths.len(),
            "Got {} labels for {} results files",
            labels.len(),
            paths.len()
        );
        return Ok(labels.to_vec());
    }
    Ok(paths
        .iter()
        .map(|path| {
            path.file_stem()
                .map_or_else(|| path.display().to_string(), |s| s.to_string_lossy().into_owned())
        })
        .collect())
}

#[cfg(test)]
mod tests {
    use std::io::Write as _;

    use super::*;

    #[test]
    fn test_read_results_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            r#"[{{"name": "s1", "sequenceElement": {{"template": "q"}}, "time": 1.5}}]"#
        )
        .unwrap();
        let records = read_results_file(file.path()).unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].get("time").and_then(|v| v.as_f64()), Some(1.5));
    }

    #[test]
    fn test_read_results_file_rejects_non_array() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{"time": 1}}"#).unwrap();
        let err = read_results_file(file.path()).unwrap_err();
        assert!(err.to_string().contains("Failed to parse benchmark results"));
    }

    #[test]
    fn test_read_missing_file() {
        assert!(read_results_file("/nonexistent/results.json").is_err());
    }

    #[test]
    fn test_output_path_selects_destination() {
        assert_eq!(Output::from_output_path(None).unwrap().display_path(), "stdout");

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("report.json");
        Output::save_json(&serde_json::json!({"runs": 2}), Some(path.clone())).unwrap();
        let value: serde_json::Value = read_json_file("report", &path).unwrap();
        assert_eq!(value["runs"], 2);
    }

    #[test]
    fn test_series_labels_default_to_file_stem() {
        let paths = [
            PathBuf::from("data/query-results-raw-default.json"),
            PathBuf::from("data/query-results-raw-m.json"),
        ];
        assert_eq!(
            series_labels(&paths, &[]).unwrap(),
            ["query-results-raw-default", "query-results-raw-m"]
        );
    }

    #[test]
    fn test_series_labels_must_match_files() {
        let paths = [PathBuf::from("a.json"), PathBuf::from("b.json")];
        assert!(series_labels(&paths, &["only-one".to_string()]).is_err());
        assert_eq!(
            series_labels(&paths, &["x".to_string(), "y".to_string()]).unwrap(),
            ["x", "y"]
        );
    }
}
