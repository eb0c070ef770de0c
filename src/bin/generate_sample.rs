//! Writes `sample_data.csv`: a synthetic housing table with numeric
//! predictors, a few discrete columns and a numeric `price` target.

use anyhow::Context;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

const N_ROWS: usize = 400;
const CITIES: [(&str, f64); 4] = [
    ("North", 40.0),
    ("South", 10.0),
    ("East", 25.0),
    ("West", 0.0),
];

/// Box-Muller transform for a normal draw.
fn gauss(rng: &mut ChaCha8Rng, mean: f64, std_dev: f64) -> f64 {
    let u1: f64 = rng.gen::<f64>().max(1e-15);
    let u2: f64 = rng.gen();
    let z = (-2.0 * u1.ln()).sqrt() * (2.0 * std::f64::consts::PI * u2).cos();
    mean + std_dev * z
}

fn main() -> anyhow::Result<()> {
    env_logger::init();
    let mut rng = ChaCha8Rng::seed_from_u64(42);

    let out_path = "sample_data.csv";
    let mut writer = csv::Writer::from_path(out_path)
        .with_context(|| format!("creating {out_path}"))?;

    writer.write_record([
        "price", "area", "rooms", "age", "distance", "quality", "city", "garden",
    ])?;

    for _ in 0..N_ROWS {
        let area = gauss(&mut rng, 95.0, 25.0).max(25.0);
        let rooms = ((area / 30.0).round() as i64 + rng.gen_range(-1..=1)).max(1);
        let age = rng.gen_range(0..80);
        let distance = rng.gen_range(0.5..30.0_f64);
        // Integer-coded category; shows up as a type warning when treated as discrete.
        let quality: i64 = rng.gen_range(1..=5);
        let (city, city_premium) = CITIES[rng.gen_range(0..CITIES.len())];
        let garden = rng.gen_bool(0.4);

        let price = 50.0
            + 2.2 * area
            + 8.0 * rooms as f64
            - 0.6 * age as f64
            - 2.5 * distance
            + 12.0 * quality as f64
            + city_premium
            + if garden { 15.0 } else { 0.0 }
            + gauss(&mut rng, 0.0, 15.0);

        // A few holes so the loader's missing-value handling is visible.
        let distance_cell = if rng.gen_bool(0.02) {
            String::new()
        } else {
            format!("{distance:.2}")
        };

        writer.write_record([
            format!("{price:.1}"),
            format!("{area:.1}"),
            rooms.to_string(),
            age.to_string(),
            distance_cell,
            quality.to_string(),
            city.to_string(),
            if garden { "True" } else { "False" }.to_string(),
        ])?;
    }

    writer.flush().with_context(|| format!("writing {out_path}"))?;
    log::info!("Wrote {N_ROWS} rows to {out_path}");
    println!("Wrote {N_ROWS} rows to {out_path}");
    Ok(())
}
