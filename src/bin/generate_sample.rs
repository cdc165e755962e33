use std::path::{Path, PathBuf};
use std::sync::Arc;

use arrow::array::{Array, ArrayRef, Float64Array, Int64Array, StringArray};
use arrow::datatypes::{DataType, Field, Schema};
use arrow::record_batch::RecordBatch;
use chrono::{Duration, NaiveDate};
use parquet::arrow::ArrowWriter;

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
        let result = (self.state[1].wrapping_mul(5))
            .rotate_left(7)
            .wrapping_mul(9);
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
}

struct Country {
    iso_code: &'static str,
    continent: &'static str,
    location: &'static str,
    population: i64,
    gdp_per_capita: f64,
    /// Day of the epidemic peak, and its height in cases per million.
    peak_day: f64,
    peak_per_million: f64,
    reports_icu: bool,
}

static COUNTRIES: [Country; 6] = [
    Country { iso_code: "FRA", continent: "Europe", location: "France", population: 67_391_582, gdp_per_capita: 38605.671, peak_day: 310.0, peak_per_million: 700.0, reports_icu: true },
    Country { iso_code: "DEU", continent: "Europe", location: "Germany", population: 83_900_471, gdp_per_capita: 45229.245, peak_day: 330.0, peak_per_million: 350.0, reports_icu: true },
    Country { iso_code: "JPN", continent: "Asia", location: "Japan", population: 126_050_796, gdp_per_capita: 39002.223, peak_day: 560.0, peak_per_million: 180.0, reports_icu: false },
    Country { iso_code: "IND", continent: "Asia", location: "India", population: 1_393_409_033, gdp_per_capita: 6426.674, peak_day: 470.0, peak_per_million: 280.0, reports_icu: false },
    Country { iso_code: "BRA", continent: "South America", location: "Brazil", population: 213_993_441, gdp_per_capita: 14103.452, peak_day: 440.0, peak_per_million: 360.0, reports_icu: false },
    Country { iso_code: "USA", continent: "North America", location: "United States", population: 332_915_074, gdp_per_capita: 54225.446, peak_day: 350.0, peak_per_million: 750.0, reports_icu: true },
];

const DAYS: i64 = 640;
const SMOOTHING_WINDOW: usize = 7;
const VACCINATION_START_DAY: i64 = 340;

/// Metrics of one country on one day.
struct DayRecord {
    date: NaiveDate,
    total_cases: f64,
    new_cases: f64,
    new_cases_smoothed: Option<f64>,
    total_deaths: f64,
    new_deaths: f64,
    total_deaths_per_million: f64,
    icu_patients_per_million: Option<f64>,
    total_vaccinations_per_hundred: Option<f64>,
}

fn simulate(country: &Country, start: NaiveDate, rng: &mut SimpleRng) -> Vec<DayRecord> {
    let millions = country.population as f64 / 1e6;
    let mut records: Vec<DayRecord> = Vec::with_capacity(DAYS as usize);
    let mut total_cases = 0.0;
    let mut total_deaths = 0.0;
    let mut vaccinations = 0.0;

    for day in 0..DAYS {
        let t = day as f64;
        let wave = (-(t - country.peak_day).powi(2) / (2.0 * 60.0f64.powi(2))).exp();
        let new_cases = (country.peak_per_million * millions * wave + rng.gauss(0.0, 5.0 * millions))
            .max(0.0)
            .round();
        let new_deaths = (new_cases * 0.015 + rng.gauss(0.0, 0.5)).max(0.0).round();
        total_cases += new_cases;
        total_deaths += new_deaths;

        let recent: Vec<f64> = records
            .iter()
            .rev()
            .take(SMOOTHING_WINDOW - 1)
            .map(|r| r.new_cases)
            .chain(std::iter::once(new_cases))
            .collect();
        let new_cases_smoothed = (recent.len() == SMOOTHING_WINDOW)
            .then(|| recent.iter().sum::<f64>() / SMOOTHING_WINDOW as f64);

        let icu_patients_per_million = country
            .reports_icu
            .then(|| (new_cases / millions * 0.12 + rng.gauss(0.0, 0.3)).max(0.0));

        let total_vaccinations_per_hundred = (day >= VACCINATION_START_DAY).then(|| {
            vaccinations = (vaccinations + rng.next_f64() * 0.6).min(220.0);
            vaccinations
        });

        records.push(DayRecord {
            date: start + Duration::days(day),
            total_cases,
            new_cases,
            new_cases_smoothed,
            total_deaths,
            new_deaths,
            total_deaths_per_million: total_deaths / millions,
            icu_patients_per_million,
            total_vaccinations_per_hundred,
        });
    }
    records
}

fn opt(v: Option<f64>) -> String {
    v.map(|x| format!("{x:.3}")).unwrap_or_default()
}

fn write_historical(path: &Path, series: &[(&Country, Vec<DayRecord>)]) {
    let mut writer = csv::Writer::from_path(path).expect("Failed to create historical CSV");
    writer
        .write_record([
            "iso_code",
            "continent",
            "location",
            "date",
            "total_cases",
            "new_cases",
            "new_cases_smoothed",
            "total_deaths",
            "new_deaths",
            "total_deaths_per_million",
            "icu_patients_per_million",
            "total_vaccinations_per_hundred",
            "population",
            "gdp_per_capita",
        ])
        .expect("Failed to write header");

    for (country, records) in series {
        for r in records {
            writer
                .write_record([
                    country.iso_code.to_string(),
                    country.continent.to_string(),
                    country.location.to_string(),
                    r.date.format("%Y-%m-%d").to_string(),
                    format!("{:.1}", r.total_cases),
                    format!("{:.1}", r.new_cases),
                    opt(r.new_cases_smoothed),
                    format!("{:.1}", r.total_deaths),
                    format!("{:.1}", r.new_deaths),
                    format!("{:.3}", r.total_deaths_per_million),
                    opt(r.icu_patients_per_million),
                    opt(r.total_vaccinations_per_hundred),
                    country.population.to_string(),
                    format!("{:.3}", country.gdp_per_capita),
                ])
                .expect("Failed to write row");
        }
    }
    writer.flush().expect("Failed to flush historical CSV");
}

fn latest_batch(series: &[(&Country, Vec<DayRecord>)]) -> RecordBatch {
    let last: Vec<(&Country, &DayRecord)> = series
        .iter()
        .filter_map(|(c, records)| records.last().map(|r| (*c, r)))
        .collect();

    let text = |f: fn(&Country) -> &'static str| -> ArrayRef {
        Arc::new(StringArray::from(last.iter().map(|(c, _)| f(c)).collect::<Vec<_>>()))
    };
    let metric = |f: fn(&DayRecord) -> Option<f64>| -> ArrayRef {
        Arc::new(Float64Array::from(last.iter().map(|(_, r)| f(r)).collect::<Vec<_>>()))
    };

    let columns: Vec<(&str, DataType, ArrayRef)> = vec![
        ("iso_code", DataType::Utf8, text(|c| c.iso_code)),
        ("continent", DataType::Utf8, text(|c| c.continent)),
        ("location", DataType::Utf8, text(|c| c.location)),
        (
            "last_updated_date",
            DataType::Utf8,
            Arc::new(StringArray::from(
                last.iter()
                    .map(|(_, r)| r.date.format("%Y-%m-%d").to_string())
                    .collect::<Vec<_>>(),
            )) as ArrayRef,
        ),
        ("total_cases", DataType::Float64, metric(|r| Some(r.total_cases))),
        ("new_cases", DataType::Float64, metric(|r| Some(r.new_cases))),
        ("new_cases_smoothed", DataType::Float64, metric(|r| r.new_cases_smoothed)),
        ("total_deaths", DataType::Float64, metric(|r| Some(r.total_deaths))),
        ("total_deaths_per_million", DataType::Float64, metric(|r| Some(r.total_deaths_per_million))),
        ("icu_patients_per_million", DataType::Float64, metric(|r| r.icu_patients_per_million)),
        (
            "total_vaccinations_per_hundred",
            DataType::Float64,
            metric(|r| r.total_vaccinations_per_hundred),
        ),
        (
            "population",
            DataType::Int64,
            Arc::new(Int64Array::from(last.iter().map(|(c, _)| c.population).collect::<Vec<_>>())) as ArrayRef,
        ),
        (
            "gdp_per_capita",
            DataType::Float64,
            Arc::new(Float64Array::from(last.iter().map(|(c, _)| c.gdp_per_capita).collect::<Vec<_>>())) as ArrayRef,
        ),
    ];

    let schema = Arc::new(Schema::new(
        columns
            .iter()
            .map(|(name, dtype, _)| Field::new(*name, dtype.clone(), true))
            .collect::<Vec<_>>(),
    ));
    RecordBatch::try_new(schema, columns.into_iter().map(|(_, _, array)| array).collect())
        .expect("Failed to create RecordBatch")
}

fn write_latest_csv(path: &Path, batch: &RecordBatch) {
    let mut writer = csv::Writer::from_path(path).expect("Failed to create latest CSV");
    let schema = batch.schema();
    writer
        .write_record(schema.fields().iter().map(|f| f.name().as_str()))
        .expect("Failed to write header");
    for row in 0..batch.num_rows() {
        let record: Vec<String> = batch
            .columns()
            .iter()
            .map(|col| {
                if col.is_null(row) {
                    return String::new();
                }
                arrow::util::display::array_value_to_string(col, row).unwrap_or_default()
            })
            .collect();
        writer.write_record(&record).expect("Failed to write row");
    }
    writer.flush().expect("Failed to flush latest CSV");
}

fn write_latest_parquet(path: &Path, batch: &RecordBatch) {
    let file = std::fs::File::create(path).expect("Failed to create output file");
    let mut writer = ArrowWriter::try_new(file, batch.schema(), None).expect("Failed to create writer");
    writer.write(batch).expect("Failed to write batch");
    writer.close().expect("Failed to close writer");
}

fn main() {
    let out_dir = std::env::args()
        .nth(1)
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from("data"));
    std::fs::create_dir_all(&out_dir).expect("Failed to create output directory");

    let mut rng = SimpleRng::new(42);
    let start = NaiveDate::from_ymd_opt(2020, 2, 24).expect("valid start date");
    let series: Vec<(&Country, Vec<DayRecord>)> = COUNTRIES
        .iter()
        .map(|c| (c, simulate(c, start, &mut rng)))
        .collect();

    let historical_path = out_dir.join("owid-covid-data.csv");
    write_historical(&historical_path, &series);

    let batch = latest_batch(&series);
    let latest_csv = out_dir.join("owid-covid-latest.csv");
    let latest_parquet = out_dir.join("owid-covid-latest.parquet");
    write_latest_csv(&latest_csv, &batch);
    write_latest_parquet(&latest_parquet, &batch);

    println!(
        "Wrote {} countries x {DAYS} days to {}, latest snapshot to {} and {}",
        COUNTRIES.len(),
        historical_path.display(),
        latest_csv.display(),
        latest_parquet.display()
    );
}
