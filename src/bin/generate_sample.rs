use std::path::PathBuf;

use anyhow::{Context, Result};

use sheet_search::data::{export_table, CellValue, Column, Table};

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

    fn below(&mut self, n: usize) -> usize {
        (self.next_u64() % n as u64) as usize
    }

    fn pick<'a>(&mut self, items: &[&'a str]) -> &'a str {
        items[self.below(items.len())]
    }
}

const FIRST_NAMES: &[&str] = &[
    "Alice", "Bob", "Charlie", "Diana", "Eve", "Frank", "Grace", "Hassan", "Ines", "Jamal",
    "Karim", "Leila", "Mona", "Noor", "Omar", "Priya",
];
const LAST_NAMES: &[&str] = &[
    "Smith", "Johnson", "Brown", "Prince", "Wilson", "Haddad", "Khan", "Garcia", "Nguyen", "Rossi",
];
const CITIES: &[&str] = &[
    "New York", "Los Angeles", "Chicago", "Houston", "Phoenix", "Cairo", "Amman", "Dubai",
    "Riyadh", "Beirut",
];
const DEPARTMENTS: &[&str] = &["Sales", "Engineering", "Support", "Finance", "HR"];

fn main() -> Result<()> {
    env_logger::init();

    let n_rows: usize = std::env::args()
        .nth(1)
        .map(|s| s.parse::<usize>())
        .transpose()
        .context("row count must be a whole number")?
        .unwrap_or(5_000);

    let mut rng = SimpleRng::new(42);

    let mut ids = Vec::with_capacity(n_rows);
    let mut names = Vec::with_capacity(n_rows);
    let mut emails = Vec::with_capacity(n_rows);
    let mut cities = Vec::with_capacity(n_rows);
    let mut departments = Vec::with_capacity(n_rows);
    let mut scores = Vec::with_capacity(n_rows);
    let mut phones = Vec::with_capacity(n_rows);

    for i in 0..n_rows {
        let first = rng.pick(FIRST_NAMES);
        let last = rng.pick(LAST_NAMES);
        ids.push(CellValue::Integer(i as i64 + 1));
        names.push(CellValue::Text(format!("{first} {last}")));
        emails.push(CellValue::Text(format!(
            "{}.{}{}@example.com",
            first.to_lowercase(),
            last.to_lowercase(),
            i
        )));
        cities.push(CellValue::Text(rng.pick(CITIES).to_string()));
        departments.push(CellValue::Text(rng.pick(DEPARTMENTS).to_string()));
        scores.push(CellValue::Float(50.0 + rng.below(500) as f64 / 10.0));
        // Every seventh row has no phone number.
        phones.push(if i % 7 == 0 {
            CellValue::Null
        } else {
            CellValue::Text(format!(
                "{:03}-{:03}-{:04}",
                200 + rng.below(800),
                rng.below(1000),
                rng.below(10_000)
            ))
        });
    }

    let table = Table::new(vec![
        Column::new("ID", ids),
        Column::new("Name", names),
        Column::new("Email", emails),
        Column::new("City", cities),
        Column::new("Department", departments),
        Column::new("Score", scores),
        Column::new("Phone", phones),
    ])?;

    for output_path in ["sample_data.xlsx", "sample_data.csv"] {
        let path = PathBuf::from(output_path);
        let written = export_table(&table, &path)
            .with_context(|| format!("writing {output_path}"))?;
        println!("Wrote {written} rows ({} columns) to {output_path}", table.n_cols());
    }
    Ok(())
}
