use std::fs;

use dupflag::{run, RunOpts, RunStatus};

const HEADER: &str = "@HD\tVN:1.6\tSO:coordinate\n@SQ\tSN:chr1\tLN:1000000\n";

fn line(sample: &str, reference: &str, start: u64, x: i64, y: i64) -> String {
    format!("{sample}:24:HW2MM:2:1101:{x}:{y}\t0\t{reference}\t{start}\t60\t100M\t*\t0\t0\tACGT\tFFFF")
}

#[test]
fn full_pipeline_writes_the_report_set() {
    let dir = tempfile::tempdir().unwrap();
    let outdir = tempfile::tempdir().unwrap();

    let unique_a = line("S1", "chr1", 100, 10, 10);
    let pcr_rep = line("S1", "chr1", 500, 1000, 1000);
    let pcr_copy = line("S1", "chr1", 500, 8000, 8000);
    let optical_a = line("S1", "chr2", 700, 1000, 1000);
    let optical_b = line("S2", "chr2", 700, 1100, 1000); // dx = 100: inclusive boundary
    let unique_b = line("S2", "chr2", 900, 20, 20);

    let input = format!(
        "{HEADER}{unique_a}\n{pcr_rep}\n{pcr_copy}\nnot a sam line\n{optical_a}\n{optical_b}\n{unique_b}\n"
    );
    let input_path = dir.path().join("sorted.sam");
    fs::write(&input_path, &input).unwrap();

    let opts = RunOpts {
        input: input_path,
        outdir: outdir.path().to_path_buf(),
        pixel_distance: 100,
    };
    let stat = match run(&opts).unwrap() {
        RunStatus::Classified(stat) => stat,
        RunStatus::NoDuplicates => panic!("input contains duplicates"),
    };
    assert_eq!(stat.total, 6);
    assert_eq!(stat.skipped, 1);
    assert_eq!(stat.accounted(), stat.total);

    let read = |name: &str| fs::read_to_string(outdir.path().join(name)).unwrap();

    assert_eq!(
        read("nonduplicates.txt"),
        format!("{HEADER}{unique_a}\n{unique_b}\n")
    );
    assert_eq!(read("pcr_duplicates.txt"), format!("{pcr_rep}\n"));
    assert_eq!(
        read("optical_duplicates.txt"),
        format!("{optical_a}\n{optical_b}\n")
    );
    assert_eq!(
        read("count_table.txt"),
        "\
reference,start,tile_cigar,S1,S2,All
chr1,500,1101_100M,2,0,2
chr2,700,1101_100M,1,1,2
All,,,3,1,4
"
    );
}

#[test]
fn input_without_duplicates_passes_through_unchanged() {
    let dir = tempfile::tempdir().unwrap();
    let outdir = tempfile::tempdir().unwrap();

    let input = format!(
        "{HEADER}{}\n{}\n{}\n",
        line("S1", "chr1", 100, 10, 10),
        line("S1", "chr1", 250, 20, 20),
        line("S2", "chr1", 900, 30, 30),
    );
    let input_path = dir.path().join("sorted.sam");
    fs::write(&input_path, &input).unwrap();

    let opts = RunOpts {
        input: input_path,
        outdir: outdir.path().to_path_buf(),
        pixel_distance: 100,
    };
    match run(&opts).unwrap() {
        RunStatus::NoDuplicates => {}
        RunStatus::Classified(stat) => panic!("unexpected duplicates: {stat:?}"),
    }

    // The nonduplicates listing reproduces the whole input; no other report
    // file is produced.
    assert_eq!(
        fs::read_to_string(outdir.path().join("nonduplicates.txt")).unwrap(),
        input
    );
    assert!(!outdir.path().join("pcr_duplicates.txt").exists());
    assert!(!outdir.path().join("optical_duplicates.txt").exists());
    assert!(!outdir.path().join("count_table.txt").exists());
}

#[test]
fn rerunning_the_same_input_is_idempotent() {
    let dir = tempfile::tempdir().unwrap();

    let input = format!(
        "{HEADER}{}\n{}\n{}\n{}\n",
        line("S1", "chr1", 500, 1000, 1000),
        line("S2", "chr1", 500, 1050, 1020),
        line("S1", "chr2", 700, 10, 10),
        line("S1", "chr2", 700, 9000, 9000),
    );
    let input_path = dir.path().join("sorted.sam");
    fs::write(&input_path, &input).unwrap();

    let export = |outdir: &std::path::Path| {
        let opts = RunOpts {
            input: input_path.clone(),
            outdir: outdir.to_path_buf(),
            pixel_distance: 100,
        };
        run(&opts).unwrap();
        [
            "nonduplicates.txt",
            "pcr_duplicates.txt",
            "optical_duplicates.txt",
            "count_table.txt",
        ]
        .map(|name| fs::read_to_string(outdir.join(name)).unwrap())
    };

    let first_dir = tempfile::tempdir().unwrap();
    let second_dir = tempfile::tempdir().unwrap();
    assert_eq!(export(first_dir.path()), export(second_dir.path()));
}
