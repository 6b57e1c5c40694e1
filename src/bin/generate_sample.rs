use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use arrow::array::{ArrayRef, Float64Array, Int64Array, StringArray};
use arrow::datatypes::{DataType, Field, Schema};
use arrow::record_batch::RecordBatch;
use clap::Parser;
use parquet::arrow::ArrowWriter;

/// Write a deterministic synthetic AI job posting dataset as Parquet and CSV.
#[derive(Parser)]
#[command(name = "generate_sample", version)]
struct Args {
    /// Number of postings to generate.
    #[arg(long, default_value_t = 2000)]
    rows: usize,

    /// PRNG seed.
    #[arg(long, default_value_t = 42)]
    seed: u64,

    /// Output directory.
    #[arg(long, default_value = ".")]
    out: PathBuf,
}

/// Minimal deterministic PRNG (xoshiro256**)
struct SimpleRng {
    state: [u64; 4],
}

impl SimpleRng {
    fn new(seed: u64) -> Self {
        let mut s = [0u64; 4];
        let mut x = seed;
        for slot in &mut s {
            x = x.wrapping_mul(6364136223846793005).wrapping_add(1);
            *slot = x;
        }
        SimpleRng { state: s }
    }

    fn next_u64(&mut self) -> u64 {
        let result = (self.state[1].wrapping_mul(5)).rotate_left(7).wrapping_mul(9);
        let t = self.state[1] << 17;
        self.state[2] ^= self.state[0];
        self.state[3] ^= self.state[1];
        self.state[1] ^= self.state[2];
        self.state[0] ^= self.state[3];
        self.state[2] ^= t;
        self.state[3] = self.state[3].rotate_left(45);
        result
    }

    fn next_f64(&mut self) -> f64 {
        (self.next_u64() >> 11) as f64 / (1u64 << 53) as f64
    }

    /// Box-Muller transform for normal distribution
    fn gauss(&mut self, mean: f64, std_dev: f64) -> f64 {
        let u1 = self.next_f64().max(1e-15);
        let u2 = self.next_f64();
        let z = (-2.0 * u1.ln()).sqrt() * (2.0 * std::f64::consts::PI * u2).cos();
        mean + std_dev * z
    }

    fn pick<'a, T>(&mut self, items: &'a [T]) -> &'a T {
        &items[(self.next_u64() % items.len() as u64) as usize]
    }
}

/// (title, base salary, typical skills)
const ROLES: [(&str, f64, &[&str]); 8] = [
    ("Machine Learning Engineer", 135_000.0, &["Python", "PyTorch", "TensorFlow", "MLOps", "Docker"]),
    ("Data Scientist", 120_000.0, &["Python", "SQL", "Statistics", "Scikit-learn", "Tableau"]),
    ("Data Analyst", 80_000.0, &["SQL", "Excel", "Tableau", "Python", "Data Visualization"]),
    ("AI Research Scientist", 160_000.0, &["Python", "Deep Learning", "Mathematics", "PyTorch"]),
    ("NLP Engineer", 140_000.0, &["Python", "NLP", "Hugging Face", "PyTorch"]),
    ("Computer Vision Engineer", 138_000.0, &["Python", "Computer Vision", "OpenCV", "C++"]),
    ("Data Engineer", 115_000.0, &["SQL", "Spark", "Hadoop", "AWS", "Scala"]),
    ("AI Product Manager", 145_000.0, &["Product Strategy", "SQL", "Communication"]),
];

/// (country, salary multiplier)
const COUNTRIES: [(&str, f64); 10] = [
    ("United States", 1.25),
    ("United Kingdom", 1.0),
    ("Germany", 0.95),
    ("Canada", 1.05),
    ("France", 0.85),
    ("India", 0.35),
    ("Singapore", 1.0),
    ("Australia", 1.05),
    ("Netherlands", 0.95),
    ("Japan", 0.8),
];

/// (code, salary multiplier, years of experience range)
const LEVELS: [(&str, f64, (f64, f64)); 4] = [
    ("EN", 0.7, (0.0, 2.0)),
    ("MI", 1.0, (2.0, 5.0)),
    ("SE", 1.3, (5.0, 10.0)),
    ("EX", 1.7, (10.0, 20.0)),
];

const EMPLOYMENT_TYPES: [&str; 4] = ["FT", "FT", "CT", "PT"];
const REMOTE_RATIOS: [i64; 3] = [0, 50, 100];

struct Columns {
    job_id: Vec<String>,
    job_title: Vec<String>,
    salary_usd: Vec<i64>,
    experience_level: Vec<String>,
    employment_type: Vec<String>,
    company_location: Vec<String>,
    employee_residence: Vec<String>,
    remote_ratio: Vec<i64>,
    required_skills: Vec<String>,
    years_experience: Vec<i64>,
    benefits_score: Vec<f64>,
}

fn generate(rows: usize, rng: &mut SimpleRng) -> Columns {
    let mut cols = Columns {
        job_id: Vec::with_capacity(rows),
        job_title: Vec::with_capacity(rows),
        salary_usd: Vec::with_capacity(rows),
        experience_level: Vec::with_capacity(rows),
        employment_type: Vec::with_capacity(rows),
        company_location: Vec::with_capacity(rows),
        employee_residence: Vec::with_capacity(rows),
        remote_ratio: Vec::with_capacity(rows),
        required_skills: Vec::with_capacity(rows),
        years_experience: Vec::with_capacity(rows),
        benefits_score: Vec::with_capacity(rows),
    };

    for i in 0..rows {
        let (title, base, skills) = *rng.pick(&ROLES);
        let (country, country_mult) = *rng.pick(&COUNTRIES);
        let (level, level_mult, (lo, hi)) = *rng.pick(&LEVELS);
        // Most hires live where the company is.
        let residence = if rng.next_f64() < 0.8 {
            country
        } else {
            rng.pick(&COUNTRIES).0
        };

        let salary = rng
            .gauss(base * country_mult * level_mult, base * 0.12)
            .max(15_000.0);
        let n_skills = 2 + (rng.next_u64() % 3) as usize;
        let mut chosen: Vec<&str> = Vec::with_capacity(n_skills);
        for _ in 0..n_skills {
            let skill = *rng.pick(skills);
            if !chosen.contains(&skill) {
                chosen.push(skill);
            }
        }

        cols.job_id.push(format!("AI{:05}", i + 1));
        cols.job_title.push(title.to_string());
        cols.salary_usd.push(salary.round() as i64);
        cols.experience_level.push(level.to_string());
        cols.employment_type.push(rng.pick(&EMPLOYMENT_TYPES).to_string());
        cols.company_location.push(country.to_string());
        cols.employee_residence.push(residence.to_string());
        cols.remote_ratio.push(*rng.pick(&REMOTE_RATIOS));
        cols.required_skills.push(chosen.join(", "));
        cols.years_experience
            .push((lo + rng.next_f64() * (hi - lo)).floor() as i64);
        cols.benefits_score
            .push((5.0 + rng.next_f64() * 5.0 * 10.0).round() / 10.0);
    }
    cols
}

fn record_batch(cols: &Columns) -> Result<RecordBatch> {
    let text = |name: &str| Field::new(name, DataType::Utf8, false);
    let schema = Arc::new(Schema::new(vec![
        text("job_id"),
        text("job_title"),
        Field::new("salary_usd", DataType::Int64, false),
        text("experience_level"),
        text("employment_type"),
        text("company_location"),
        text("employee_residence"),
        Field::new("remote_ratio", DataType::Int64, false),
        text("required_skills"),
        Field::new("years_experience", DataType::Int64, false),
        Field::new("benefits_score", DataType::Float64, false),
    ]));

    let strings = |v: &[String]| -> ArrayRef {
        Arc::new(StringArray::from(v.iter().map(String::as_str).collect::<Vec<_>>()))
    };
    let columns: Vec<ArrayRef> = vec![
        strings(&cols.job_id),
        strings(&cols.job_title),
        Arc::new(Int64Array::from(cols.salary_usd.clone())),
        strings(&cols.experience_level),
        strings(&cols.employment_type),
        strings(&cols.company_location),
        strings(&cols.employee_residence),
        Arc::new(Int64Array::from(cols.remote_ratio.clone())),
        strings(&cols.required_skills),
        Arc::new(Int64Array::from(cols.years_experience.clone())),
        Arc::new(Float64Array::from(cols.benefits_score.clone())),
    ];

    RecordBatch::try_new(schema, columns).context("building record batch")
}

fn write_csv(path: &std::path::Path, cols: &Columns) -> Result<()> {
    let mut writer = csv::Writer::from_path(path).context("creating CSV")?;
    writer.write_record([
        "job_id",
        "job_title",
        "salary_usd",
        "experience_level",
        "employment_type",
        "company_location",
        "employee_residence",
        "remote_ratio",
        "required_skills",
        "years_experience",
        "benefits_score",
    ])?;
    for i in 0..cols.job_id.len() {
        writer.write_record([
            cols.job_id[i].clone(),
            cols.job_title[i].clone(),
            cols.salary_usd[i].to_string(),
            cols.experience_level[i].clone(),
            cols.employment_type[i].clone(),
            cols.company_location[i].clone(),
            cols.employee_residence[i].clone(),
            cols.remote_ratio[i].to_string(),
            cols.required_skills[i].clone(),
            cols.years_experience[i].to_string(),
            cols.benefits_score[i].to_string(),
        ])?;
    }
    writer.flush()?;
    Ok(())
}

fn main() -> Result<()> {
    env_logger::init();
    let args = Args::parse();

    let mut rng = SimpleRng::new(args.seed);
    let cols = generate(args.rows, &mut rng);
    let batch = record_batch(&cols)?;

    std::fs::create_dir_all(&args.out)
        .with_context(|| format!("creating {}", args.out.display()))?;

    let parquet_path = args.out.join("ai_jobs_sample.parquet");
    let file = std::fs::File::create(&parquet_path).context("creating parquet file")?;
    let mut writer =
        ArrowWriter::try_new(file, batch.schema(), None).context("creating parquet writer")?;
    writer.write(&batch).context("writing parquet batch")?;
    writer.close().context("closing parquet writer")?;

    let csv_path = args.out.join("ai_jobs_sample.csv");
    write_csv(&csv_path, &cols)?;

    log::info!(
        "Wrote {} postings to {} and {}",
        args.rows,
        parquet_path.display(),
        csv_path.display()
    );
    println!("Wrote {} postings to {}", args.rows, args.out.display());
    Ok(())
}
