use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use clap::Parser;
use sift_core::cluster::{KMeans, KMeansOptimizer};
use sift_core::IndexController;
use sift_types::{DisplayOptions, Document, IndexConfig, KGramConfig, QueryOptions};
use tracing::{info, warn};
use tracing_subscriber::{fmt, EnvFilter};

#[derive(Parser, Debug)]
#[command(name = "sift")]
#[command(about = "Index a corpus and query it", long_about = None)]
struct Cli {
    /// Corpus file, one `id<TAB>text` document per line
    corpus: PathBuf,
    /// Query terms
    terms: Vec<String>,
    /// Expand terms containing `*` through the k-gram index
    #[arg(long, default_value_t = false)]
    wildcard: bool,
    /// Rank the whole corpus by cosine similarity
    #[arg(long, default_value_t = false)]
    ranked: bool,
    /// Maximum number of results
    #[arg(long)]
    limit: Option<usize>,
    /// Print the document, inverted and k-gram tables
    #[arg(long, default_value_t = false)]
    dump: bool,
    /// Include full rows in dumps
    #[arg(long, default_value_t = false)]
    verbose: bool,
    /// Maximum rows per dumped table
    #[arg(long)]
    rows: Option<usize>,
    /// Gram length
    #[arg(long, default_value_t = 2)]
    k: usize,
    /// Insert words into ordered gram sets instead of sorting once per build
    #[arg(long, default_value_t = false)]
    ordered: bool,
    /// Skip the k-gram index
    #[arg(long, default_value_t = false)]
    no_kgram: bool,
    /// Suggest indexed terms within this edit distance of each query term
    #[arg(long)]
    suggest: Option<usize>,
    /// Cluster documents into this many groups over the query terms
    #[arg(long)]
    clusters: Option<usize>,
    /// Number of k-means seeds to try
    #[arg(long, default_value_t = 10)]
    seeds: u64,
}

impl Cli {
    fn index_config(&self) -> IndexConfig {
        if self.no_kgram {
            return IndexConfig::without_kgram();
        }
        let kgram = if self.ordered {
            KGramConfig::ordered()
        } else {
            KGramConfig::buffered()
        };
        IndexConfig::with_kgram(kgram.with_k(self.k))
    }

    fn query_options(&self) -> QueryOptions {
        let mut options = QueryOptions {
            wildcard: self.wildcard,
            ranked: self.ranked,
            limit: None,
        };
        if let Some(limit) = self.limit {
            options = options.with_limit(limit);
        }
        options
    }

    fn display_options(&self) -> DisplayOptions {
        let mut options = if self.verbose {
            DisplayOptions::verbose()
        } else {
            DisplayOptions::default()
        };
        if let Some(rows) = self.rows {
            options = options.with_max_rows(rows);
        }
        options
    }
}

fn main() -> Result<()> {
    fmt().with_env_filter(EnvFilter::from_default_env()).init();
    let cli = Cli::parse();

    let docs = load_corpus(&cli.corpus)?;
    let mut index = IndexController::with_config(cli.index_config());
    let accepted = index.set_documents(docs);
    let report = index.build(false)?;
    info!(accepted, terms = report.terms, grams = report.grams, "corpus indexed");
    println!("{}", index.stats());

    if cli.dump {
        let display = cli.display_options();
        println!("\n{}", index.render_documents(display));
        println!("{}", index.render_inverted(display)?);
        if !cli.no_kgram {
            println!("{}", index.render_kgram(display)?);
        }
    }

    let terms: Vec<&str> = cli.terms.iter().map(String::as_str).collect();
    if terms.is_empty() {
        return Ok(());
    }

    let hits = index.query(&terms, cli.query_options())?;
    println!("\n{} hits for {:?}", hits.len(), terms);
    for hit in &hits {
        println!("  {hit}");
    }

    if let Some(max_distance) = cli.suggest {
        let searcher = index.searcher()?;
        for term in &terms {
            let suggestions = searcher.suggest(term, max_distance, 5)?;
            let listed: Vec<String> = suggestions
                .iter()
                .map(|s| format!("{} ({}, df {})", s.term, s.distance, s.doc_freq))
                .collect();
            println!("did you mean for {term}: {}", listed.join(", "));
        }
    }

    if let Some(k) = cli.clusters {
        let instances = index.term_vectors(&terms)?;
        let optimizer = KMeansOptimizer::new(KMeans::new(k), cli.seeds.max(1));
        let clustering = optimizer.train(&instances)?;
        println!("\n{clustering}");
        for cluster in clustering.clusters() {
            let members: Vec<String> = cluster
                .members_by_distance(&instances)
                .into_iter()
                .filter_map(|i| instances[i].payload().map(ToString::to_string))
                .collect();
            println!("  #{}: {}", cluster.label(), members.join(" "));
        }
    }

    Ok(())
}

/// Reads `id<TAB>text` lines. Blank lines are skipped; lines without an id
/// are keyed by line number.
fn load_corpus(path: &Path) -> Result<Vec<Document>> {
    let input = fs::read_to_string(path)
        .with_context(|| format!("reading corpus {}", path.display()))?;

    let mut docs = Vec::new();
    for (line_no, line) in input.lines().enumerate() {
        if line.trim().is_empty() {
            continue;
        }
        let (id, text) = match line.split_once('\t') {
            Some((id, text)) if !id.trim().is_empty() => (id.trim().to_string(), text),
            _ => (format!("{:06}", line_no + 1), line),
        };
        match Document::new(id, text) {
            Ok(doc) => docs.push(doc),
            Err(err) => warn!(line = line_no + 1, %err, "document rejected"),
        }
    }

    if docs.is_empty() {
        bail!("no documents in {}", path.display());
    }
    Ok(docs)
}
