use std::path::Path;
use std::sync::Arc;

use anyhow::{bail, Context, Result};
use arrow::array::{
    Array, AsArray, Float32Array, Float64Array, Int32Array, Int64Array, LargeListArray,
    ListArray, StringArray,
};
use arrow::datatypes::DataType;
use arrow::record_batch::RecordBatch;
use parquet::arrow::arrow_reader::ParquetRecordBatchReaderBuilder;
use serde::Deserialize;
use serde_json::Value as JsonValue;

use super::model::{ExperienceLevel, JobDataset, JobPosting};
use super::skills::tokenize_skills;

// ---------------------------------------------------------------------------
// Public entry-point
// ---------------------------------------------------------------------------

/// Load a job posting dataset from a file.  Dispatch by extension.
///
/// Supported formats:
/// * `.csv`     – header row; columns are matched by (trimmed) name, extras ignored
/// * `.json`    – `[{ "job_title": ..., "salary_usd": ..., ... }, ...]`
/// * `.parquet` – flat columns with string or numeric types
pub fn load_file(path: &Path) -> Result<JobDataset> {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_ascii_lowercase();

    let postings = match ext.as_str() {
        "parquet" | "pq" => load_parquet(path)?,
        "json" => load_json(path)?,
        "csv" => load_csv(path)?,
        other => bail!("Unsupported file extension: .{other}"),
    };

    log::info!("Loaded {} postings from {}", postings.len(), path.display());
    Ok(JobDataset::from_postings(postings))
}

// ---------------------------------------------------------------------------
// RawPosting – one untyped row, shared by all formats
// ---------------------------------------------------------------------------

/// A row as it comes out of the file, before type coercion and validation.
#[derive(Debug, Default, Deserialize)]
struct RawPosting {
    #[serde(default)]
    job_id: Option<String>,
    #[serde(default)]
    job_title: Option<String>,
    #[serde(default)]
    salary_usd: Option<f64>,
    #[serde(default)]
    experience_level: Option<String>,
    #[serde(default)]
    employment_type: Option<String>,
    #[serde(default)]
    company_location: Option<String>,
    #[serde(default)]
    employee_residence: Option<String>,
    #[serde(default)]
    remote_ratio: Option<f64>,
    #[serde(default)]
    required_skills: Option<String>,
    #[serde(default)]
    years_experience: Option<f64>,
    #[serde(default)]
    benefits_score: Option<f64>,
}

impl RawPosting {
    /// Coerce and validate into a [`JobPosting`]. `row` is only used in
    /// error messages: data rows are numbered from 1, header excluded, so
    /// CSV row N sits on file line N + 1.
    fn into_posting(self, row: usize) -> Result<JobPosting> {
        let job_title = required_text(self.job_title, row, "job_title")?;
        let company_location = required_text(self.company_location, row, "company_location")?;
        let employee_residence =
            required_text(self.employee_residence, row, "employee_residence")?;

        let salary_usd = self
            .salary_usd
            .with_context(|| format!("Row {row}: missing 'salary_usd'"))?;
        if !salary_usd.is_finite() || salary_usd < 0.0 {
            bail!("Row {row}: salary_usd must be a non-negative number, got {salary_usd}");
        }

        let experience_level: ExperienceLevel =
            required_text(self.experience_level, row, "experience_level")?
                .parse()
                .with_context(|| format!("Row {row}: invalid 'experience_level'"))?;

        Ok(JobPosting {
            job_id: optional_text(self.job_id),
            job_title,
            salary_usd,
            experience_level,
            employment_type: optional_text(self.employment_type),
            company_location,
            employee_residence,
            remote_ratio: self.remote_ratio.filter(|v| v.is_finite()),
            required_skills: self
                .required_skills
                .as_deref()
                .map(tokenize_skills)
                .unwrap_or_default(),
            years_experience: self.years_experience.filter(|v| v.is_finite()),
            benefits_score: self.benefits_score.filter(|v| v.is_finite()),
        })
    }
}

fn required_text(value: Option<String>, row: usize, col: &str) -> Result<String> {
    optional_text(value).with_context(|| format!("Row {row}: missing '{col}'"))
}

fn optional_text(value: Option<String>) -> Option<String> {
    value
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
}

// ---------------------------------------------------------------------------
// CSV loader
// ---------------------------------------------------------------------------

/// CSV layout: header row with column names (surrounding whitespace is
/// ignored). Numeric cells that are empty count as missing.
fn load_csv(path: &Path) -> Result<Vec<JobPosting>> {
    let mut reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::Headers)
        .from_path(path)
        .context("opening CSV")?;

    let mut postings = Vec::new();
    for (i, result) in reader.deserialize::<RawPosting>().enumerate() {
        let row = i + 1;
        let raw = result.with_context(|| format!("CSV row {row} (line {})", row + 1))?;
        postings.push(raw.into_posting(row)?);
    }
    Ok(postings)
}

// ---------------------------------------------------------------------------
// JSON loader
// ---------------------------------------------------------------------------

/// Expected JSON schema (records-oriented, the default `df.to_json(orient='records')`):
///
/// ```json
/// [
///   {
///     "job_title": "ML Engineer",
///     "salary_usd": 120000,
///     "experience_level": "SE",
///     "company_location": "Germany",
///     "employee_residence": "Germany",
///     "remote_ratio": 50,
///     "required_skills": "Python, PyTorch"
///   },
///   ...
/// ]
/// ```
///
/// `required_skills` may also be an array of strings; numbers may be quoted.
fn load_json(path: &Path) -> Result<Vec<JobPosting>> {
    let text = std::fs::read_to_string(path).context("reading JSON file")?;
    let root: JsonValue = serde_json::from_str(&text).context("parsing JSON")?;

    let records = root.as_array().context("Expected top-level JSON array")?;

    let mut postings = Vec::with_capacity(records.len());
    for (i, rec) in records.iter().enumerate() {
        let i = i + 1;
        let obj = rec
            .as_object()
            .with_context(|| format!("Row {i} is not a JSON object"))?;

        let text = |key: &str| obj.get(key).and_then(json_to_text);
        let number = |key: &str| -> Result<Option<f64>> {
            match obj.get(key) {
                None => Ok(None),
                Some(v) => json_to_f64(v).with_context(|| format!("Row {i}, {key}: not a number")),
            }
        };

        let raw = RawPosting {
            job_id: text("job_id"),
            job_title: text("job_title"),
            salary_usd: number("salary_usd")?,
            experience_level: text("experience_level"),
            employment_type: text("employment_type"),
            company_location: text("company_location"),
            employee_residence: text("employee_residence"),
            remote_ratio: number("remote_ratio")?,
            required_skills: obj.get("required_skills").and_then(json_to_skill_text),
            years_experience: number("years_experience")?,
            benefits_score: number("benefits_score")?,
        };
        postings.push(raw.into_posting(i)?);
    }
    Ok(postings)
}

fn json_to_text(val: &JsonValue) -> Option<String> {
    match val {
        JsonValue::String(s) => Some(s.clone()),
        JsonValue::Number(n) => Some(n.to_string()),
        JsonValue::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

/// `Ok(None)` for null or blank strings, `Err` for anything non-numeric.
fn json_to_f64(val: &JsonValue) -> Result<Option<f64>> {
    match val {
        JsonValue::Null => Ok(None),
        JsonValue::Number(n) => Ok(n.as_f64()),
        JsonValue::String(s) if s.trim().is_empty() => Ok(None),
        JsonValue::String(s) => Ok(Some(s.trim().parse::<f64>()?)),
        other => bail!("unexpected value {other}"),
    }
}

fn json_to_skill_text(val: &JsonValue) -> Option<String> {
    match val {
        JsonValue::Array(items) => Some(
            items
                .iter()
                .filter_map(json_to_text)
                .collect::<Vec<_>>()
                .join(","),
        ),
        other => json_to_text(other),
    }
}

// ---------------------------------------------------------------------------
// Parquet loader
// ---------------------------------------------------------------------------

/// Load a Parquet file of job postings.
///
/// Expected schema: one flat column per field, named as in the CSV header.
/// Text columns may be Utf8 or LargeUtf8, numeric columns any of
/// Int32/Int64/Float32/Float64. Works with files written by both **Pandas**
/// (`df.to_parquet()`) and **Polars** (`df.write_parquet()`).
fn load_parquet(path: &Path) -> Result<Vec<JobPosting>> {
    let file = std::fs::File::open(path).context("opening parquet file")?;
    let builder =
        ParquetRecordBatchReaderBuilder::try_new(file).context("reading parquet metadata")?;
    let reader = builder.build().context("building parquet reader")?;

    let mut postings = Vec::new();
    for batch_result in reader {
        let batch = batch_result.context("reading parquet record batch")?;
        let offset = postings.len() + 1;
        for row in 0..batch.num_rows() {
            let raw = raw_from_batch(&batch, row)
                .with_context(|| format!("Row {}", offset + row))?;
            postings.push(raw.into_posting(offset + row)?);
        }
    }
    Ok(postings)
}

fn raw_from_batch(batch: &RecordBatch, row: usize) -> Result<RawPosting> {
    let text = |name: &str| -> Result<Option<String>> {
        match batch.schema().index_of(name) {
            Ok(idx) => extract_text(batch.column(idx), row),
            Err(_) => Ok(None),
        }
    };
    let number = |name: &str| -> Result<Option<f64>> {
        match batch.schema().index_of(name) {
            Ok(idx) => extract_f64(batch.column(idx), row)
                .with_context(|| format!("column '{name}'")),
            Err(_) => Ok(None),
        }
    };

    Ok(RawPosting {
        job_id: text("job_id")?,
        job_title: text("job_title")?,
        salary_usd: number("salary_usd")?,
        experience_level: text("experience_level")?,
        employment_type: text("employment_type")?,
        company_location: text("company_location")?,
        employee_residence: text("employee_residence")?,
        remote_ratio: number("remote_ratio")?,
        required_skills: text("required_skills")?,
        years_experience: number("years_experience")?,
        benefits_score: number("benefits_score")?,
    })
}

// -- Parquet / Arrow helpers --

/// Extract a cell as text. Numeric cells are rendered with `Display`; list
/// cells (e.g. `required_skills` as `List<Utf8>`) are joined with commas.
fn extract_text(col: &Arc<dyn Array>, row: usize) -> Result<Option<String>> {
    if col.is_null(row) {
        return Ok(None);
    }
    let value = match col.data_type() {
        DataType::Utf8 => {
            let arr = col
                .as_any()
                .downcast_ref::<StringArray>()
                .context("expected StringArray")?;
            arr.value(row).to_string()
        }
        DataType::LargeUtf8 => col.as_string::<i64>().value(row).to_string(),
        DataType::List(_) | DataType::LargeList(_) => {
            let items = list_cell(col, row)?;
            let mut parts = Vec::with_capacity(items.len());
            for i in 0..items.len() {
                if let Some(item) = extract_text(&items, i)? {
                    parts.push(item);
                }
            }
            parts.join(",")
        }
        _ => match extract_f64(col, row)? {
            Some(v) => v.to_string(),
            None => return Ok(None),
        },
    };
    Ok(Some(value))
}

/// The values of one List or LargeList cell.
fn list_cell(col: &Arc<dyn Array>, row: usize) -> Result<Arc<dyn Array>> {
    match col.data_type() {
        DataType::List(_) => Ok(col
            .as_any()
            .downcast_ref::<ListArray>()
            .context("expected ListArray")?
            .value(row)),
        DataType::LargeList(_) => Ok(col
            .as_any()
            .downcast_ref::<LargeListArray>()
            .context("expected LargeListArray")?
            .value(row)),
        other => bail!("Expected List or LargeList column, got {other:?}"),
    }
}

/// Extract a cell as `f64`. Text cells are parsed; blank text is missing.
fn extract_f64(col: &Arc<dyn Array>, row: usize) -> Result<Option<f64>> {
    if col.is_null(row) {
        return Ok(None);
    }
    let value = match col.data_type() {
        DataType::Int32 => {
            let arr = col
                .as_any()
                .downcast_ref::<Int32Array>()
                .context("expected Int32Array")?;
            arr.value(row) as f64
        }
        DataType::Int64 => {
            let arr = col
                .as_any()
                .downcast_ref::<Int64Array>()
                .context("expected Int64Array")?;
            arr.value(row) as f64
        }
        DataType::Float32 => {
            let arr = col
                .as_any()
                .downcast_ref::<Float32Array>()
                .context("expected Float32Array")?;
            arr.value(row) as f64
        }
        DataType::Float64 => {
            let arr = col
                .as_any()
                .downcast_ref::<Float64Array>()
                .context("expected Float64Array")?;
            arr.value(row)
        }
        DataType::Utf8 | DataType::LargeUtf8 => {
            let text = extract_text(col, row)?.unwrap_or_default();
            if text.trim().is_empty() {
                return Ok(None);
            }
            text.trim()
                .parse::<f64>()
                .with_context(|| format!("'{text}' is not a number"))?
        }
        other => bail!("Expected a numeric column, got {other:?}"),
    };
    Ok(Some(value))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn raw() -> RawPosting {
        RawPosting {
            job_title: Some(" ML Engineer ".to_string()),
            salary_usd: Some(100_000.0),
            experience_level: Some("SE".to_string()),
            company_location: Some("Germany".to_string()),
            employee_residence: Some("France".to_string()),
            required_skills: Some("Python, SQL".to_string()),
            ..RawPosting::default()
        }
    }

    #[test]
    fn raw_posting_is_coerced() {
        let p = raw().into_posting(0).unwrap();
        assert_eq!(p.job_title, "ML Engineer");
        assert_eq!(p.experience_level, ExperienceLevel::Senior);
        assert_eq!(p.required_skills, vec!["Python", "SQL"]);
        assert_eq!(p.remote_ratio, None);
        assert!(!p.is_same_location());
    }

    #[test]
    fn negative_salary_is_rejected() {
        let mut r = raw();
        r.salary_usd = Some(-1.0);
        let err = r.into_posting(7).unwrap_err();
        assert!(err.to_string().contains("Row 7"));
    }

    #[test]
    fn blank_required_text_is_missing() {
        let mut r = raw();
        r.company_location = Some("   ".to_string());
        assert!(r.into_posting(0).is_err());
    }

    #[test]
    fn unknown_extension_is_rejected() {
        assert!(load_file(Path::new("postings.xlsx")).is_err());
    }

    #[test]
    fn list_cells_are_joined_as_skill_text() {
        use arrow::array::{ListBuilder, StringBuilder};

        let mut builder = ListBuilder::new(StringBuilder::new());
        builder.values().append_value("Python");
        builder.values().append_value("SQL");
        builder.append(true);
        builder.append(false);
        let col: Arc<dyn Array> = Arc::new(builder.finish());

        assert_eq!(extract_text(&col, 0).unwrap(), Some("Python,SQL".to_string()));
        assert_eq!(extract_text(&col, 1).unwrap(), None);
        assert!(extract_f64(&col, 0).is_err());
    }

    #[test]
    fn json_numbers_may_be_quoted() {
        assert_eq!(json_to_f64(&JsonValue::from("50")).unwrap(), Some(50.0));
        assert_eq!(json_to_f64(&JsonValue::from(" ")).unwrap(), None);
        assert!(json_to_f64(&JsonValue::from("remote")).is_err());
    }
}
