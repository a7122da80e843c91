use articlemap_core::{project, Article, ArticleId, Collection, Operation};
use std::collections::HashSet;

fn corpus() -> Collection {
    Collection::from_articles(vec![
        Article::new(10, "Deep Learning for Cats", 0.1, 0.2).with_abstract("Convolutional models"),
        Article::new(20, "Bayesian inference", 0.3, 0.4)
            .with_abstract("Posterior sampling of CAT scans"),
        Article::new(30, "Graph theory", 0.5, 0.6),
        Article::new(40, "Ocean currents", 0.7, 0.8).with_abstract("Thermohaline circulation"),
    ])
    .0
}

fn ids(values: &[i64]) -> Vec<ArticleId> {
    values.iter().copied().map(ArticleId::from).collect()
}

#[test]
fn show_all_returns_canonical_unchanged() {
    let canonical = corpus();
    let view = project(&canonical, &Collection::empty(), &Operation::ShowAll);
    assert_eq!(view, canonical);
}

#[test]
fn local_filter_matches_title_or_abstract_case_insensitively() {
    let canonical = corpus();
    let view = project(
        &canonical,
        &canonical,
        &Operation::LocalFilter("cAt".to_string()),
    );
    assert_eq!(view.ids(), ids(&[10, 20]));
}

#[test]
fn local_filter_with_empty_text_matches_everything() {
    let canonical = corpus();
    let view = project(&canonical, &canonical, &Operation::LocalFilter(String::new()));
    assert_eq!(view.ids(), canonical.ids());
}

#[test]
fn local_filter_result_is_exactly_the_matching_subsequence() {
    let canonical = corpus();
    for needle in ["o", "ION", "graph", "zzz", " "] {
        let view = project(&canonical, &canonical, &Operation::LocalFilter(needle.to_string()));
        let lowered = needle.to_lowercase();
        let expected = canonical
            .iter()
            .filter(|article| {
                article.title.to_lowercase().contains(&lowered)
                    || article.abstract_text.to_lowercase().contains(&lowered)
            })
            .map(|article| article.id.clone())
            .collect::<Vec<_>>();
        assert_eq!(view.ids(), expected, "needle `{needle}`");
    }
}

#[test]
fn id_filter_preserves_canonical_order_not_result_order() {
    let canonical = corpus();
    let view = project(&canonical, &canonical, &Operation::id_filter(ids(&[40, 10, 30])));
    assert_eq!(view.ids(), ids(&[10, 30, 40]));
}

#[test]
fn id_filter_drops_unknown_ids_silently() {
    let canonical = corpus();
    let view = project(&canonical, &canonical, &Operation::id_filter(ids(&[20, 999])));
    assert_eq!(view.ids(), ids(&[20]));

    let none = project(&canonical, &canonical, &Operation::IdFilter(HashSet::new()));
    assert!(none.is_empty());
}

#[test]
fn projected_view_is_always_a_subsequence_of_canonical() {
    let canonical = corpus();
    let operations = [
        Operation::ShowAll,
        Operation::LocalFilter("in".to_string()),
        Operation::id_filter(ids(&[30, 20])),
    ];
    for operation in &operations {
        let view = project(&canonical, &canonical, operation);
        let mut cursor = canonical.iter();
        for article in &view {
            assert!(
                cursor.any(|candidate| candidate.id == article.id),
                "{} out of order for {}",
                article.id,
                operation.kind()
            );
        }
    }
}
