//! Index Build Benchmarking Tool
//!
//! Measures how long each stage of an index build takes on a real corpus
//! file, and compares the two k-gram build strategies on the same input.
//!
//! ## Input
//!
//! One document per line. A line of the form `id<TAB>text` uses `id` as the
//! document id; any other line is keyed by its line number.
//!
//! ## What It Benchmarks
//!
//! 1. **Analyze**: preprocessing + tokenization + term normalization
//! 2. **Inverted**: full inverted-index build
//! 3. **K-gram ordered**: full build inserting words into ordered sets
//! 4. **K-gram buffered**: full build with late sort
//!
//! ## Usage
//!
//! ```bash
//! ./target/release/build_bench /path/to/corpus.tsv
//!
//! # Trigram index instead of bigrams
//! ./target/release/build_bench /path/to/corpus.tsv 3
//! ```
//!
//! ## Example Output
//!
//! ```text
//! === K-gram buffered ===
//! --------------------------------
//! Mode        : K-gram buffered
//! Elapsed     : 0.052 s
//! Throughput  : 0.43 GiB/s
//! Items       : 1_254_331
//! Items/sec   : 24_121_750
//! --------------------------------
//! ```
//!
//! Build in release mode and use a corpus of a few MiB or more for stable
//! numbers.

use std::env;
use std::fs;
use std::io;
use std::time::{Duration, Instant};

use sift_core::analyzer::Analyzer;
use sift_core::{InvertedIndex, KGramIndex};
use sift_types::{Document, KGramConfig};

const WARMUP_RUNS: usize = 1;
const MEASURE_RUNS: usize = 5;

fn main() -> io::Result<()> {
    let args: Vec<String> = env::args().collect();

    if args.len() < 2 {
        eprintln!("Usage: build_bench <path> [k]");
        std::process::exit(1);
    }

    let path = &args[1];
    let k = args
        .get(2)
        .and_then(|s| s.parse::<usize>().ok())
        .unwrap_or(2);

    println!("Loading file...");
    let bytes = fs::read(path)?;
    let input =
        std::str::from_utf8(&bytes).map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))?;

    let (docs, rejected) = load_documents(input);

    println!("File size: {}", fmt_bytes(input.len() as u64));
    println!("Documents: {} ({} rejected)", fmt_count(docs.len() as u64), rejected);
    println!("Gram size: {}\n", k);

    bench_analyze(input.len(), &docs);
    let inverted = bench_inverted(input.len(), &docs)?;
    bench_kgram(input.len(), &inverted, KGramConfig::ordered().with_k(k), "K-gram ordered");
    bench_kgram(input.len(), &inverted, KGramConfig::buffered().with_k(k), "K-gram buffered");

    Ok(())
}

fn load_documents(input: &str) -> (Vec<Document>, usize) {
    let mut docs = Vec::new();
    let mut rejected = 0usize;

    for (line_no, line) in input.lines().enumerate() {
        if line.trim().is_empty() {
            continue;
        }
        let (id, text) = match line.split_once('\t') {
            Some((id, text)) if !id.is_empty() => (id.to_string(), text),
            _ => (format!("{line_no:09}"), line),
        };
        match Document::new(id, text) {
            Ok(doc) => docs.push(doc),
            Err(_) => rejected += 1,
        }
    }

    (docs, rejected)
}

fn bench_analyze(input_bytes: usize, docs: &[Document]) {
    let mut analyzer = Analyzer::new();

    println!("=== Analyze ===");

    warmup(|| {
        let mut sink = 0u64;
        for doc in docs {
            analyzer.analyze(doc.text(), |_t| sink += 1);
        }
        std::hint::black_box(sink);
    });

    let mut tokens = 0u64;
    let elapsed = measure(|| {
        let mut local = 0u64;
        for doc in docs {
            analyzer.analyze(doc.text(), |_t| local += 1);
        }
        tokens = local;
        std::hint::black_box(tokens);
    });

    print_perf("Analyze", input_bytes, elapsed, tokens);
}

fn bench_inverted(input_bytes: usize, docs: &[Document]) -> io::Result<InvertedIndex> {
    let mut analyzer = Analyzer::new();
    let mut index = InvertedIndex::new();
    let to_io = |e| io::Error::new(io::ErrorKind::Other, e);

    println!("=== Inverted ===");

    for _ in 0..WARMUP_RUNS {
        index.build(&mut analyzer, docs, docs.len()).map_err(to_io)?;
    }

    let mut total = Duration::ZERO;
    for _ in 0..MEASURE_RUNS {
        let start = Instant::now();
        index.build(&mut analyzer, docs, docs.len()).map_err(to_io)?;
        total += start.elapsed();
    }

    print_perf("Inverted", input_bytes, total / MEASURE_RUNS as u32, index.total_postings() as u64);
    Ok(index)
}

fn bench_kgram(input_bytes: usize, inverted: &InvertedIndex, config: KGramConfig, label: &str) {
    let mut index = KGramIndex::new(config);
    let words: Vec<&str> = inverted.terms().map(|t| t.text()).collect();

    println!("=== {label} ===");

    warmup(|| {
        index.build(words.iter().copied());
    });

    let elapsed = measure(|| {
        index.build(words.iter().copied());
        std::hint::black_box(index.len());
    });

    print_perf(label, input_bytes, elapsed, index.total_words() as u64);
}

fn warmup<F: FnMut()>(mut f: F) {
    for _ in 0..WARMUP_RUNS {
        f();
    }
}

fn measure<F: FnMut()>(mut f: F) -> Duration {
    let mut total = Duration::ZERO;

    for _ in 0..MEASURE_RUNS {
        let start = Instant::now();
        f();
        total += start.elapsed();
    }

    total / MEASURE_RUNS as u32
}

fn print_perf(label: &str, input_bytes: usize, elapsed: Duration, items: u64) {
    let secs = elapsed.as_secs_f64();
    let gib = input_bytes as f64 / (1024.0 * 1024.0 * 1024.0);

    println!("--------------------------------");
    println!("Mode        : {}", label);
    println!("Elapsed     : {:.3} s", secs);
    println!("Throughput  : {:.3} GiB/s", gib / secs);

    if items > 0 {
        println!("Items       : {}", fmt_count(items));
        println!("Items/sec   : {}", fmt_count((items as f64 / secs) as u64));
    }

    println!("--------------------------------\n");
}

fn fmt_bytes(b: u64) -> String {
    if b >= 1024 * 1024 * 1024 {
        format!("{:.2} GiB", b as f64 / (1024.0 * 1024.0 * 1024.0))
    } else if b >= 1024 * 1024 {
        format!("{:.2} MiB", b as f64 / (1024.0 * 1024.0))
    } else if b >= 1024 {
        format!("{:.2} KiB", b as f64 / 1024.0)
    } else {
        format!("{} B", b)
    }
}

fn fmt_count(n: u64) -> String {
    let s = n.to_string();
    let mut out = String::with_capacity(s.len() + s.len() / 3);

    for (i, ch) in s.chars().rev().enumerate() {
        if i > 0 && i % 3 == 0 {
            out.push('_');
        }
        out.push(ch);
    }

    out.chars().rev().collect()
}
