use rand::Rng;
use std::fs::File;
use std::io::{BufWriter, Write};

fn main() {
    let path = "data/data_1m.csv";
    std::fs::create_dir_all("data").unwrap();
    let file = File::create(path).unwrap();
    let mut writer = BufWriter::new(file);

    writeln!(writer, "id,income,state,category").unwrap();

    let mut rng = rand::rng();
    for i in 0..1_000_000 {
        let income = rng.random_range(1..100) * 100;
        let state = ["CA", "NY", "TX", "WA", "FL", "OH"][rng.random_range(0..6)];
        let category = ['A', 'B', 'C', 'D'][rng.random_range(0..4)];
        writeln!(writer, "{},{},{},{}", i, income, state, category).unwrap();
    }

    println!("Sample CSV generated: {}", path);
}
