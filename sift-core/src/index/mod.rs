//! Indexing and query infrastructure.
//!
//! Memory Layout:
//! - Terms and grams live in `FxHashMap`s keyed by their text
//! - Posting lists and gram word sets are sorted `Vec`s, so merges and
//!   lookups are binary searches and intersections are two-pointer walks
//! - Documents live in a `BTreeMap`, giving ascending-id iteration everywhere
//!
//! Threading:
//! - [`IndexController`] mutates through `&mut self`. Once built, any number
//!   of [`Searcher`]s can borrow it immutably and query in parallel.

mod api;
mod builder;
mod docs;
mod inverted;
mod kgram;
mod render;
mod scoring;
mod search;
mod stats;
mod suggest;
mod types;

pub use builder::{BuildKind, BuildReport};
pub use docs::DocStore;
pub use inverted::{fetch_terms, InvertedIndex};
pub use kgram::KGramIndex;
pub use render::{render_inverted, render_kgram, DocumentTable, InvertedTable, KGramTable};
pub use scoring::{calc_idf, calc_tf, cosine_similarity, IDF_MULTIPLIER, TF_MULTIPLIER};
pub use search::Searcher;
pub use stats::IndexStats;
pub use suggest::{levenshtein, EditMatrix, Suggestion};
pub use types::{ControllerMetrics, Gram, IndexController, Posting, Term};

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cluster::{KMeans, KMeansOptimizer};
    use proptest::prelude::*;
    use sift_types::{
        DisplayOptions, DocId, Document, IndexConfig, IndexError, IndexKind, KGramConfig,
        QueryOptions, Similarity,
    };

    const DOC_A: &str = "hello world, this is a test document about information retrieval";
    const DOC_B: &str = "hello to do some test";

    fn doc(id: &str, text: &str) -> Document {
        Document::new(id, text).expect("valid document")
    }

    fn corpus() -> IndexController {
        let mut engine = IndexController::new();
        engine.set_documents([doc("A", DOC_A), doc("B", DOC_B)]);
        engine
    }

    fn ids(hits: &[sift_types::QueryHit]) -> Vec<&str> {
        hits.iter().map(|h| h.doc_id.as_str()).collect()
    }

    type TermSnapshot = (String, usize, f64, Vec<(String, u32, f64)>);

    fn snapshot(engine: &IndexController) -> Vec<TermSnapshot> {
        engine
            .inverted_index()
            .expect("built")
            .sorted_terms()
            .into_iter()
            .map(|t| {
                let postings = t
                    .postings()
                    .iter()
                    .map(|p| (p.doc_id().to_string(), p.count(), p.tf()))
                    .collect();
                (t.text().to_string(), t.doc_freq(), t.idf(), postings)
            })
            .collect()
    }

    fn gram_snapshot(engine: &IndexController) -> Vec<(String, Vec<String>)> {
        engine
            .kgram_index()
            .expect("built")
            .sorted_grams()
            .into_iter()
            .map(|g| (g.text().to_string(), g.words().as_slice().to_vec()))
            .collect()
    }

    #[test]
    fn exact_terms_hit_both_documents() {
        let mut engine = corpus();
        let hits = engine.query(&["hello"], QueryOptions::exact()).expect("query");
        assert_eq!(ids(&hits), ["A", "B"]);

        let hits = engine.query(&["test"], QueryOptions::exact()).expect("query");
        assert_eq!(ids(&hits), ["A", "B"]);
        assert!(hits.iter().all(|h| h.similarity.is_none()));
    }

    #[test]
    fn wildcard_prefix_matches_information_only() {
        let mut engine = corpus();
        let hits = engine.query(&["inf*"], QueryOptions::wildcard()).expect("query");
        assert_eq!(ids(&hits), ["A"]);
    }

    #[test]
    fn ranked_query_orders_best_first() {
        let mut engine = corpus();
        let hits = engine
            .query(&["information", "retrieval"], QueryOptions::ranked())
            .expect("query");

        assert_eq!(ids(&hits), ["A", "B"]);
        let top = hits[0].score().expect("A contains both terms");
        assert!((top - 1.0).abs() < 1e-9);
        assert_eq!(hits[1].similarity, Some(Similarity::Undefined));
        assert_ne!(hits[0].similarity, hits[1].similarity);
    }

    #[test]
    fn ranked_scores_partial_matches_below_full_matches() {
        let mut engine = IndexController::new();
        engine.set_documents([
            doc("1", "rust search engine"),
            doc("2", "rust compiler"),
            doc("3", "search party"),
            doc("4", "unrelated words"),
        ]);
        let hits = engine
            .query(&["rust", "search"], QueryOptions::ranked())
            .expect("query");

        assert_eq!(ids(&hits), ["1", "2", "3", "4"]);
        let s1 = hits[0].score().expect("defined");
        let s2 = hits[1].score().expect("defined");
        let s3 = hits[2].score().expect("defined");
        assert!(s1 > s2);
        assert!((s2 - s3).abs() < 1e-12, "symmetric partial matches tie");
        assert_eq!(hits[3].score(), None);
    }

    #[test]
    fn boolean_result_ignores_term_order() {
        let mut engine = corpus();
        let ab = engine.query(&["hello", "test"], QueryOptions::exact()).expect("query");
        let ba = engine.query(&["test", "hello"], QueryOptions::exact()).expect("query");
        assert_eq!(ids(&ab), ids(&ba));
        assert_eq!(ids(&ab), ["A", "B"]);

        let hits = engine.query(&["hello", "retrieval"], QueryOptions::exact()).expect("query");
        assert_eq!(ids(&hits), ["A"]);
    }

    #[test]
    fn unknown_terms_give_empty_results() {
        let mut engine = corpus();
        assert!(engine.query(&["missing"], QueryOptions::exact()).expect("query").is_empty());
        assert!(engine
            .query(&["hello", "missing"], QueryOptions::exact())
            .expect("query")
            .is_empty());
        assert!(engine.query(&["zz*"], QueryOptions::wildcard()).expect("query").is_empty());
        assert!(engine.query(&[], QueryOptions::exact()).expect("query").is_empty());
    }

    #[test]
    fn ranked_query_without_indexed_terms_is_empty() {
        let mut engine = corpus();
        assert!(engine.query(&["missing"], QueryOptions::ranked()).expect("query").is_empty());
        assert!(engine
            .query(&["missing", "absent"], QueryOptions::ranked())
            .expect("query")
            .is_empty());
        assert!(engine
            .query(&["zz*"], QueryOptions::ranked().with_wildcard())
            .expect("query")
            .is_empty());

        // One indexed term is enough to rank the whole corpus.
        let hits = engine
            .query(&["missing", "retrieval"], QueryOptions::ranked())
            .expect("query");
        assert_eq!(ids(&hits), ["A", "B"]);
        assert_eq!(hits[1].similarity, Some(Similarity::Undefined));
    }

    #[test]
    fn term_normalizing_to_nothing_empties_a_boolean_query() {
        let mut engine = corpus();
        assert!(engine
            .query(&["hello", "..."], QueryOptions::exact())
            .expect("query")
            .is_empty());
        assert!(engine.query(&["#"], QueryOptions::exact()).expect("query").is_empty());
        assert!(engine
            .query(&["hello", "@:"], QueryOptions::wildcard())
            .expect("query")
            .is_empty());

        let ranked = engine
            .query(&["hello", "..."], QueryOptions::ranked())
            .expect("query");
        assert_eq!(ranked.len(), 2);
    }

    #[test]
    fn query_terms_are_normalized() {
        let mut engine = corpus();
        let hits = engine.query(&["Hello,"], QueryOptions::exact()).expect("query");
        assert_eq!(ids(&hits), ["A", "B"]);
    }

    #[test]
    fn limit_truncates() {
        let mut engine = corpus();
        let hits = engine
            .query(&["hello"], QueryOptions::exact().with_limit(1))
            .expect("query");
        assert_eq!(ids(&hits), ["A"]);
    }

    #[test]
    fn star_is_literal_without_wildcard_mode() {
        let mut engine = corpus();
        assert!(engine.query(&["inf*"], QueryOptions::exact()).expect("query").is_empty());
    }

    #[test]
    fn wildcard_without_kgram_index_is_an_error() {
        let mut engine = IndexController::with_config(IndexConfig::without_kgram());
        engine.set_documents([doc("A", DOC_A)]);
        assert_eq!(
            engine.query(&["inf*"], QueryOptions::wildcard()),
            Err(IndexError::ComponentNotFound(IndexKind::KGram))
        );
        assert_eq!(
            engine.kgram_index().err(),
            Some(IndexError::ComponentNotFound(IndexKind::KGram))
        );
        // Exact queries still work.
        let hits = engine.query(&["hello"], QueryOptions::exact()).expect("query");
        assert_eq!(ids(&hits), ["A"]);
    }

    #[test]
    fn components_are_unavailable_until_built() {
        let engine = corpus();
        assert_eq!(
            engine.inverted_index().err(),
            Some(IndexError::NotBuilt(IndexKind::Inverted))
        );
        assert_eq!(
            engine.kgram_index().err(),
            Some(IndexError::NotBuilt(IndexKind::KGram))
        );
        assert!(engine.searcher().is_err());
    }

    #[test]
    fn ranked_wildcard_expands_into_dimensions() {
        let mut engine = IndexController::new();
        engine.set_documents([
            doc("1", "information retrieval"),
            doc("2", "informal chat"),
            doc("3", "retrieval only"),
        ]);
        let options = QueryOptions {
            wildcard: true,
            ranked: true,
            limit: None,
        };
        let hits = engine.query(&["inform*"], options).expect("query");
        assert_eq!(hits.len(), 3);
        assert!(hits[0].score().is_some());
        assert!(hits[1].score().is_some());
        assert_eq!(hits[2].doc_id.as_str(), "3");
        assert_eq!(hits[2].similarity, Some(Similarity::Undefined));
    }

    #[test]
    fn build_without_force_is_a_noop() {
        let mut engine = corpus();
        let first = engine.build(false).expect("build");
        assert_eq!(first.kind, BuildKind::Full);
        let before = snapshot(&engine);

        let again = engine.build(false).expect("build");
        assert_eq!(again.kind, BuildKind::Skipped);
        assert_eq!(snapshot(&engine), before);

        let forced = engine.build(true).expect("build");
        assert_eq!(forced.kind, BuildKind::Full);
        assert_eq!(snapshot(&engine), before);
        assert_eq!(engine.metrics().builds, 2);
    }

    #[test]
    fn incremental_add_equals_scratch_build() {
        for config in [KGramConfig::ordered(), KGramConfig::buffered()] {
            let mut incremental = IndexController::with_config(IndexConfig::with_kgram(config));
            incremental.set_documents([doc("B", DOC_B), doc("D", "information overload")]);
            incremental.build(false).expect("build");
            let added = incremental
                .add_documents([doc("A", DOC_A), doc("C", "hello hello again")])
                .expect("add");
            assert_eq!(added, 2);
            assert!(incremental.is_built());

            let mut scratch = IndexController::with_config(IndexConfig::with_kgram(config));
            scratch.set_documents([
                doc("A", DOC_A),
                doc("B", DOC_B),
                doc("C", "hello hello again"),
                doc("D", "information overload"),
            ]);
            scratch.build(false).expect("build");

            assert_eq!(snapshot(&incremental), snapshot(&scratch));
            assert_eq!(gram_snapshot(&incremental), gram_snapshot(&scratch));
        }
    }

    #[test]
    fn add_before_build_defers_indexing() {
        let mut engine = IndexController::new();
        engine.add_documents([doc("A", DOC_A)]).expect("add");
        assert!(!engine.is_built());
        let hits = engine.query(&["retrieval"], QueryOptions::exact()).expect("query");
        assert_eq!(ids(&hits), ["A"]);
    }

    #[test]
    fn duplicate_documents_are_skipped() {
        let mut engine = corpus();
        engine.build(false).expect("build");
        let added = engine
            .add_documents([doc("A", "replacement text"), doc("C", "fresh")])
            .expect("add");
        assert_eq!(added, 1);
        assert_eq!(engine.get("A").map(Document::text), Some(DOC_A));
        let hits = engine.query(&["replacement"], QueryOptions::exact()).expect("query");
        assert!(hits.is_empty());
    }

    #[test]
    fn set_documents_replaces_corpus() {
        let mut engine = corpus();
        engine.build(false).expect("build");
        engine.set_documents([doc("Z", "only zebra")]);
        assert!(!engine.is_built());
        assert!(engine.query(&["hello"], QueryOptions::exact()).expect("query").is_empty());
        let hits = engine.query(&["zebra"], QueryOptions::exact()).expect("query");
        assert_eq!(ids(&hits), ["Z"]);
    }

    #[test]
    fn idf_reflects_corpus_growth() {
        let mut engine = corpus();
        engine.build(false).expect("build");
        let hello = |e: &IndexController| {
            e.inverted_index()
                .expect("built")
                .get("hello")
                .map(Term::idf)
                .expect("indexed")
        };
        assert_eq!(hello(&engine), 0.0);

        engine.add_documents([doc("C", "goodbye")]).expect("add");
        let expected = calc_idf(2, 3).expect("in domain");
        assert_eq!(hello(&engine), expected);
    }

    #[test]
    fn stats_histogram_sums_to_term_count() {
        let mut engine = corpus();
        engine.build(false).expect("build");
        let stats = engine.stats();

        assert_eq!(stats.num_documents, 2);
        assert_eq!(stats.df_histogram.values().sum::<usize>(), stats.num_terms);
        // hello and test are shared, every other term is unique to one doc.
        assert_eq!(stats.df_histogram.get(&2), Some(&2));
        assert_eq!(stats.hapax_terms(), stats.num_terms - 2);
        assert!(stats.num_grams > 0);
        assert!(stats.to_string().contains("2 docs"));
    }

    #[test]
    fn render_tables() {
        let mut engine = corpus();
        engine.build(false).expect("build");

        let table = engine.render_inverted(DisplayOptions::verbose()).expect("built");
        assert!(table.starts_with("[TERM - DOC_COUNT - IDF]"));
        assert!(table.contains("[hello - 2 - 0] -> [A - 1 - 1000] [B - 1 - 1000]"));

        let limited = engine
            .render_inverted(DisplayOptions::default().with_max_rows(1))
            .expect("built");
        assert!(limited.contains("more terms"));

        let grams = engine.render_kgram(DisplayOptions::verbose()).expect("built");
        assert!(grams.contains("[$h - "));

        let docs = engine.render_documents(DisplayOptions::default());
        assert_eq!(docs.lines().count(), 2);
    }

    #[test]
    fn suggestions_rank_by_distance() {
        let mut engine = IndexController::new();
        engine.set_documents([
            doc("1", "retrieval"),
            doc("2", "retrieve"),
            doc("3", "information"),
        ]);
        engine.build(false).expect("build");

        let suggestions = engine
            .searcher()
            .expect("built")
            .suggest("retreival", 2, 5)
            .expect("kgram present");
        assert_eq!(suggestions[0].term, "retrieval");
        assert_eq!(suggestions[0].distance, 2);
        assert!(suggestions.iter().all(|s| s.term != "information"));
    }

    #[test]
    fn term_vectors_feed_kmeans() {
        let mut engine = IndexController::new();
        engine.set_documents([
            doc("a1", "rust rust compiler"),
            doc("a2", "rust borrow compiler"),
            doc("b1", "soup recipe kitchen"),
            doc("b2", "soup kitchen dinner"),
        ]);
        engine.build(false).expect("build");

        let vectors = engine
            .term_vectors(&["rust", "compiler", "soup", "kitchen"])
            .expect("built");
        assert_eq!(vectors.len(), 4);
        assert_eq!(vectors[0].payload().map(DocId::as_str), Some("a1"));
        assert!(vectors[0].values()[0] > vectors[1].values()[0]);

        let clustering = KMeansOptimizer::new(KMeans::new(2), 3)
            .train(&vectors)
            .expect("valid input");
        assert_eq!(clustering.cluster_of(0), clustering.cluster_of(1));
        assert_eq!(clustering.cluster_of(2), clustering.cluster_of(3));
        assert_ne!(clustering.cluster_of(0), clustering.cluster_of(2));
    }

    #[test]
    fn clear_resets() {
        let mut engine = corpus();
        engine.query(&["hello"], QueryOptions::exact()).expect("query");
        assert_eq!(engine.metrics().queries_executed, 1);

        engine.clear();
        assert!(engine.is_empty());
        assert_eq!(engine.metrics().queries_executed, 0);
        assert!(engine.query(&["hello"], QueryOptions::exact()).expect("query").is_empty());
    }

    proptest! {
        #[test]
        fn arrival_order_does_not_change_the_index(
            docs in prop::collection::btree_map(0u16..400, "[a-d]{1,3}( [a-d]{1,3}){0,5}", 1..25)
        ) {
            let forward: Vec<Document> = docs
                .iter()
                .map(|(id, text)| doc(&format!("{id:03}"), text))
                .collect();
            let mut backward = forward.clone();
            backward.reverse();

            let mut a = IndexController::new();
            a.set_documents(forward);
            a.build(false).expect("build");

            let mut b = IndexController::new();
            let (first, rest) = backward.split_at(1);
            b.set_documents(first.to_vec());
            b.build(false).expect("build");
            b.add_documents(rest.to_vec()).expect("add");

            let snap = snapshot(&a);
            prop_assert_eq!(&snap, &snapshot(&b));
            for (_, df, _, postings) in &snap {
                prop_assert_eq!(*df, postings.len());
                prop_assert!(postings.windows(2).all(|w| w[0].0 < w[1].0));
            }
        }
    }
}
