//! Writes a synthetic car sales dataset (CSV and Parquet) for trying the dashboard.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};
use arrow::array::{ArrayRef, Date32Array, Float64Array, Int32Array, Int64Array, StringArray};
use arrow::datatypes::{Field, Schema};
use arrow::record_batch::RecordBatch;
use chrono::{Duration, NaiveDate};
use clap::Parser;
use parquet::arrow::ArrowWriter;

/// Same names and order as `columns::REQUIRED` in `src/data/model.rs`; a loader
/// test reads this list back and compares.
const HEADERS: [&str; 14] = [
    "ID_vente",
    "Date_vente",
    "Marque",
    "Modèle",
    "Pays_vente",
    "Prix_vente (€)",
    "Année_modèle",
    "Kilométrage (km)",
    "Garantie (mois)",
    "Client_type",
    "Score_satisfaction_client (1-10)",
    "Remise (€)",
    "Délai_livraison (jours)",
    "Type_carburant",
];

/// Brand, its models and a base price in euros.
const CATALOGUE: [(&str, &[&str], f64); 8] = [
    ("Renault", &["Clio", "Mégane", "Captur"], 21_000.0),
    ("Peugeot", &["208", "308", "3008"], 24_000.0),
    ("Volkswagen", &["Polo", "Golf", "Tiguan"], 27_000.0),
    ("Toyota", &["Yaris", "Corolla", "RAV4"], 26_000.0),
    ("Audi", &["A3", "Q5"], 42_000.0),
    ("BMW", &["Série 3", "X1", "i4"], 46_000.0),
    ("Mercedes", &["Classe A", "Classe C", "GLC"], 48_000.0),
    ("Tesla", &["Model 3", "Model Y"], 45_000.0),
];

const COUNTRIES: [&str; 5] = ["France", "Allemagne", "Espagne", "Italie", "Belgique"];
const FUELS: [(&str, f64); 4] = [
    ("Essence", 1.0),
    ("Diesel", 1.05),
    ("Hybride", 1.15),
    ("Électrique", 1.3),
];
const CLIENTS: [&str; 2] = ["Particulier", "Professionnel"];
const YEARS: std::ops::RangeInclusive<i32> = 2019..=2023;

#[derive(Parser, Debug)]
#[command(about = "Generate a synthetic automobile sales dataset")]
struct Args {
    /// Number of sales to generate
    #[arg(long, default_value_t = 2_000)]
    rows: usize,

    /// Seed for the generator
    #[arg(long, default_value_t = 42)]
    seed: u64,

    /// Output directory
    #[arg(long, default_value = ".")]
    out_dir: PathBuf,
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

    fn below(&mut self, n: usize) -> usize {
        (self.next_u64() % n as u64) as usize
    }

    fn pick<'a, T>(&mut self, items: &'a [T]) -> &'a T {
        &items[self.below(items.len())]
    }

    /// Box-Muller transform for normal distribution
    fn gauss(&mut self, mean: f64, std_dev: f64) -> f64 {
        let u1 = self.next_f64().max(1e-15);
        let u2 = self.next_f64();
        let z = (-2.0 * u1.ln()).sqrt() * (2.0 * std::f64::consts::PI * u2).cos();
        mean + std_dev * z
    }
}

struct Sale {
    id: i64,
    date: NaiveDate,
    brand: &'static str,
    model: &'static str,
    country: &'static str,
    price: f64,
    model_year: i32,
    mileage: i32,
    warranty: i32,
    client: &'static str,
    satisfaction: f64,
    discount: f64,
    delay: i32,
    fuel: &'static str,
}

fn generate(rows: usize, rng: &mut SimpleRng) -> Result<Vec<Sale>> {
    let years: Vec<i32> = YEARS.collect();
    let mut sales = Vec::with_capacity(rows);

    for i in 0..rows {
        let year = *rng.pick(&years);
        let start = NaiveDate::from_ymd_opt(year, 1, 1).context("invalid sale year")?;
        let date = start + Duration::days(rng.below(365) as i64);

        let (brand, models, base) = *rng.pick(&CATALOGUE);
        let model = *rng.pick(models);
        let (fuel, premium) = *rng.pick(&FUELS);
        let client = *rng.pick(&CLIENTS);

        let age = rng.below(4) as i32;
        let mileage = if age == 0 {
            rng.below(500)
        } else {
            rng.below(15_000 * age as usize)
        };
        let price = (rng.gauss(base * premium, base * 0.12) * (1.0 - 0.06 * age as f64)).max(5_000.0);
        let discount = (price * rng.next_f64() * 0.08).round();
        let bonus = if client == "Professionnel" { 0.4 } else { 0.0 };
        let satisfaction = (rng.gauss(7.0 + bonus, 1.4).clamp(1.0, 10.0) * 10.0).round() / 10.0;

        sales.push(Sale {
            id: i as i64 + 1,
            date,
            brand,
            model,
            country: *rng.pick(&COUNTRIES),
            price: price.round(),
            model_year: year - age,
            mileage: mileage as i32,
            warranty: [12, 24, 36, 48][rng.below(4)],
            client,
            satisfaction,
            discount,
            delay: 3 + rng.below(60) as i32,
            fuel,
        });
    }
    Ok(sales)
}

fn write_csv(path: &Path, sales: &[Sale]) -> Result<()> {
    let mut writer = csv::Writer::from_path(path)
        .with_context(|| format!("cannot create {}", path.display()))?;
    writer.write_record(HEADERS)?;
    for s in sales {
        writer.write_record([
            s.id.to_string(),
            s.date.format("%Y-%m-%d").to_string(),
            s.brand.to_string(),
            s.model.to_string(),
            s.country.to_string(),
            s.price.to_string(),
            s.model_year.to_string(),
            s.mileage.to_string(),
            s.warranty.to_string(),
            s.client.to_string(),
            s.satisfaction.to_string(),
            s.discount.to_string(),
            s.delay.to_string(),
            s.fuel.to_string(),
        ])?;
    }
    writer.flush()?;
    Ok(())
}

fn text_column(sales: &[Sale], f: impl Fn(&Sale) -> &'static str) -> ArrayRef {
    Arc::new(StringArray::from(sales.iter().map(f).collect::<Vec<_>>()))
}

fn int_column(sales: &[Sale], f: impl Fn(&Sale) -> i32) -> ArrayRef {
    Arc::new(Int32Array::from(sales.iter().map(f).collect::<Vec<_>>()))
}

fn float_column(sales: &[Sale], f: impl Fn(&Sale) -> f64) -> ArrayRef {
    Arc::new(Float64Array::from(sales.iter().map(f).collect::<Vec<_>>()))
}

fn write_parquet(path: &Path, sales: &[Sale]) -> Result<()> {
    let epoch = NaiveDate::from_ymd_opt(1970, 1, 1).context("invalid epoch")?;
    let arrays: Vec<ArrayRef> = vec![
        Arc::new(Int64Array::from(sales.iter().map(|s| s.id).collect::<Vec<_>>())),
        Arc::new(Date32Array::from(
            sales
                .iter()
                .map(|s| (s.date - epoch).num_days() as i32)
                .collect::<Vec<_>>(),
        )),
        text_column(sales, |s| s.brand),
        text_column(sales, |s| s.model),
        text_column(sales, |s| s.country),
        float_column(sales, |s| s.price),
        int_column(sales, |s| s.model_year),
        int_column(sales, |s| s.mileage),
        int_column(sales, |s| s.warranty),
        text_column(sales, |s| s.client),
        float_column(sales, |s| s.satisfaction),
        float_column(sales, |s| s.discount),
        int_column(sales, |s| s.delay),
        text_column(sales, |s| s.fuel),
    ];
    let fields: Vec<Field> = HEADERS
        .iter()
        .zip(&arrays)
        .map(|(name, array)| Field::new(*name, array.data_type().clone(), false))
        .collect();
    let schema = Arc::new(Schema::new(fields));

    let batch = RecordBatch::try_new(schema.clone(), arrays).context("failed to build record batch")?;
    let file = std::fs::File::create(path).with_context(|| format!("cannot create {}", path.display()))?;
    let mut writer = ArrowWriter::try_new(file, schema, None)?;
    writer.write(&batch)?;
    writer.close()?;
    Ok(())
}

fn main() -> Result<()> {
    env_logger::init();
    let args = Args::parse();

    let mut rng = SimpleRng::new(args.seed);
    let sales = generate(args.rows, &mut rng)?;

    std::fs::create_dir_all(&args.out_dir)
        .with_context(|| format!("cannot create {}", args.out_dir.display()))?;
    let csv_path = args.out_dir.join("sample_sales.csv");
    let parquet_path = args.out_dir.join("sample_sales.parquet");
    write_csv(&csv_path, &sales)?;
    write_parquet(&parquet_path, &sales)?;

    log::info!("Generated {} sales with seed {}", sales.len(), args.seed);
    println!(
        "Wrote {} sales to {} and {}",
        sales.len(),
        csv_path.display(),
        parquet_path.display()
    );
    Ok(())
}
