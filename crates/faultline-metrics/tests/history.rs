use faultline_history::fixture::RepoBuilder;
use faultline_history::{CancelToken, HistoryAccessor};
use faultline_metrics::{Accumulator, RenameConfidence};

const FIVE_LINES: &str = "l1\nl2\nl3\nl4\nl5\n";

fn metrics_of(repo: &RepoBuilder) -> (Accumulator, Vec<faultline_metrics::CommitMetrics>) {
    let history = HistoryAccessor::open(repo.path()).unwrap();
    let mut acc = Accumulator::default();
    let report = acc
        .run(history.commits_of(None).unwrap(), &CancelToken::new())
        .unwrap();
    (acc, report.items)
}

#[test]
fn three_commit_scenario() {
    let mut repo = RepoBuilder::new();
    let a = repo.commit("alice", "create f", &[("f.py", Some(FIVE_LINES))]);
    let b = repo.commit("bob", "rework line 3", &[("f.py", Some("l1\nl2\nL3 changed\nl4\nl5\n"))]);
    let c = repo.commit("carol", "fix: drop line 3", &[("f.py", Some("l1\nl2\nl4\nl5\n"))]);

    let (acc, metrics) = metrics_of(&repo);
    let hashes: Vec<&str> = metrics.iter().map(|m| m.hash.as_str()).collect();
    assert_eq!(hashes, vec![a.as_str(), b.as_str(), c.as_str()]);

    assert_eq!((metrics[0].la, metrics[0].nuc), (5, 0));
    assert_eq!((metrics[1].la, metrics[1].ld), (1, 1));
    assert_eq!(metrics[1].nuc, 1);
    assert_eq!(metrics[1].lt, 5.0);
    assert_eq!(metrics[1].age, 1.0);
    assert_eq!(metrics[1].ndev, 1);
    assert_eq!(metrics[2].nuc, 2);
    assert_eq!(metrics[2].ndev, 2);
    assert_eq!(metrics[2].message, "fix: drop line 3");

    let state = acc.files().get("f.py").unwrap();
    assert_eq!(state.loc, 4);
    assert_eq!(state.nuc, 3);
}

#[test]
fn rename_keeps_history_across_paths() {
    let mut repo = RepoBuilder::new();
    repo.commit("alice", "create", &[("util.py", Some(FIVE_LINES))]);
    repo.rename("bob", "move util", "util.py", "pkg/util.py");
    repo.commit("carol", "touch", &[("pkg/util.py", Some("l1\nl2\nl3\nl4\nl5\nl6\n"))]);

    let (acc, metrics) = metrics_of(&repo);
    assert_eq!(metrics.len(), 3);
    assert_eq!(metrics[1].nuc, 1);
    assert_eq!(metrics[2].nuc, 2);
    assert_eq!(metrics[2].ndev, 2);

    assert!(acc.files().get("util.py").is_none());
    let state = acc.files().get("pkg/util.py").unwrap();
    assert_eq!(state.loc, 6);
    assert_eq!(
        state.lineage.as_ref().unwrap().confidence,
        RenameConfidence::Recorded
    );
}

#[test]
fn merges_are_reported_as_skipped() {
    let mut repo = RepoBuilder::new();
    repo.commit("alice", "base", &[("a.py", Some("a\n"))]);
    let side = repo.commit_detached("bob", "side", &[("b.py", Some("b\n"))]);
    let merge = repo.merge("alice", "Merge side", &side, &[]);

    let history = HistoryAccessor::open(repo.path()).unwrap();
    let report = Accumulator::default()
        .run(history.commits_of(None).unwrap(), &CancelToken::new())
        .unwrap();
    assert_eq!(report.processed, 2);
    assert_eq!(report.skipped.len(), 1);
    assert_eq!(report.skipped[0].id, merge);
}

#[test]
fn reruns_produce_identical_json() {
    let mut repo = RepoBuilder::new();
    repo.commit("alice", "one", &[("src/a.py", Some(FIVE_LINES)), ("README.md", Some("hi\n"))]);
    repo.commit("bob", "two", &[("src/a.py", Some("l1\n")), ("lib/b.rs", Some("fn b() {}\n"))]);
    repo.commit("alice", "three", &[("lib/b.rs", None)]);

    let first = serde_json::to_string(&metrics_of(&repo).1).unwrap();
    let second = serde_json::to_string(&metrics_of(&repo).1).unwrap();
    assert_eq!(first, second);
}

#[test]
fn file_recreated_after_moving_out_of_the_tracked_set_starts_fresh() {
    let mut repo = RepoBuilder::new();
    repo.commit("alice", "create util", &[("util.py", Some(FIVE_LINES))]);
    repo.commit("bob", "tweak util", &[("util.py", Some("l1\nl2\nX\nl4\nl5\n"))]);
    repo.rename("alice", "park util", "util.py", "util.py.orig");
    repo.commit("carol", "new util", &[("util.py", Some("a\nb\n"))]);

    let (acc, metrics) = metrics_of(&repo);
    let last = metrics.last().unwrap();
    assert_eq!(last.nuc, 0);
    assert_eq!(last.lt, 0.0);
    assert_eq!(last.ndev, 0);
    assert_eq!(last.age, 0.0);

    let state = acc.files().get("util.py").unwrap();
    assert_eq!(state.loc, 2);
    assert_eq!(state.nuc, 1);
    assert_eq!(state.authors.len(), 1);
}
