use meshline_desc::{ancestor_tree_numbers, parse_mesh, parse_mesh_str};
use meshline_desc::transform::DescriptorAccumulator;

fn data_path(filename: &str) -> std::path::PathBuf {
    let dir = std::env::var("BENCH_DATA_DIR")
        .expect("set BENCH_DATA_DIR to directory with sample data files");
    std::path::Path::new(&dir).join(filename)
}

fn load_doc(filename: &str) -> String {
    let path = data_path(filename);
    std::fs::read_to_string(&path).unwrap_or_else(|e| panic!("{}: {e}", path.display()))
}

#[divan::bench]
fn parse_desc_str(bencher: divan::Bencher) {
    // Small slice of a descriptor file (a few hundred records)
    let doc = load_doc("desc_sample.xml");
    bencher.bench(|| parse_mesh_str(&doc).unwrap());
}

#[divan::bench]
fn parse_desc_file(bencher: divan::Bencher) {
    let path = data_path("desc_sample.xml");
    bencher.bench(|| parse_mesh(&path).unwrap().map(|r| r.unwrap()).count());
}

#[divan::bench]
fn ancestors(bencher: divan::Bencher) {
    let trees = [
        "C04.588.443.591.824",
        "C04.588.531.423",
        "C06.301.371.411",
        "C10.228.140.211",
    ];
    bencher.bench(|| ancestor_tree_numbers(&trees));
}

#[divan::bench]
fn to_record_batch(bencher: divan::Bencher) {
    let records = parse_mesh_str(&load_doc("desc_sample.xml")).unwrap();
    bencher.bench(|| {
        let mut acc = DescriptorAccumulator::new(records.len());
        for rec in &records {
            acc.push(rec.clone());
        }
        acc.take_batch().unwrap()
    });
}

fn main() {
    divan::main();
}
