use std::sync::Arc;

use faultline_core::RunReport;
use faultline_history::fixture::RepoBuilder;
use faultline_history::{CancelToken, HistoryAccessor, SourceFilter};
use faultline_szz::{LinkOptions, LinkReport, Linker};

const FIVE_LINES: &str = "l1\nl2\nl3\nl4\nl5\n";

fn link(repo: &RepoBuilder, fixes: &[&str], workers: usize, cancel: &CancelToken) -> RunReport<LinkReport> {
    let history = HistoryAccessor::open(repo.path()).unwrap();
    let linker = Linker::new(
        repo.path(),
        Arc::new(SourceFilter::default()),
        LinkOptions {
            workers: Some(workers),
        },
    );
    let fixes: Vec<String> = fixes.iter().map(|s| s.to_string()).collect();
    linker
        .link(history.headers_of(None).unwrap(), &fixes, cancel)
        .unwrap()
}

#[test]
fn fix_is_linked_to_the_commit_that_wrote_the_removed_line() {
    let mut repo = RepoBuilder::new();
    let a = repo.commit("alice", "create f", &[("f.py", Some(FIVE_LINES))]);
    let b = repo.commit("bob", "rework line 3", &[("f.py", Some("l1\nl2\nL3 changed\nl4\nl5\n"))]);
    let c = repo.commit("carol", "fix: drop line 3", &[("f.py", Some("l1\nl2\nl4\nl5\n"))]);

    let report = link(&repo, &[c.as_str()], 2, &CancelToken::new());
    assert_eq!(report.processed, 1);
    assert!(report.skipped.is_empty());

    let links = &report.items.links;
    assert_eq!(links.len(), 1);
    assert!(!links.contains(&a));
    let fixes: Vec<&String> = links.fixes_for(&b).unwrap().iter().collect();
    assert_eq!(fixes, vec![&c]);

    let record = &report.items.fixes[0];
    assert_eq!(record.fix, c);
    assert_eq!(record.linked_to, vec![b]);
    let lines: Vec<u32> = record
        .modified_regions
        .lines("f.py")
        .unwrap()
        .iter()
        .copied()
        .collect();
    assert_eq!(lines, vec![3]);
}

#[test]
fn root_fix_yields_no_links() {
    let mut repo = RepoBuilder::new();
    let a = repo.commit("alice", "fix: initial", &[("f.py", Some(FIVE_LINES))]);

    let report = link(&repo, &[a.as_str()], 1, &CancelToken::new());
    assert!(report.items.links.is_empty());
    assert_eq!(report.skipped.len(), 1);
    assert_eq!(report.skipped[0].reason, "root commit");
}

#[test]
fn two_fixes_blaming_one_origin_both_appear() {
    let mut repo = RepoBuilder::new();
    repo.commit("alice", "create", &[("f.py", Some(FIVE_LINES))]);
    let bug = repo.commit("bob", "rewrite 2 and 4", &[("f.py", Some("l1\nX2\nl3\nX4\nl5\n"))]);
    let fix1 = repo.commit("carol", "fix line 2", &[("f.py", Some("l1\nl2\nl3\nX4\nl5\n"))]);
    let fix2 = repo.commit("dave", "fix line 4", &[("f.py", Some(FIVE_LINES))]);

    let report = link(&repo, &[fix1.as_str(), fix2.as_str()], 4, &CancelToken::new());
    let fixes: Vec<&String> = report.items.links.fixes_for(&bug).unwrap().iter().collect();
    let mut expected = vec![&fix1, &fix2];
    expected.sort();
    assert_eq!(fixes, expected);
}

#[test]
fn output_does_not_depend_on_worker_count() {
    let mut repo = RepoBuilder::new();
    repo.commit("alice", "create", &[("f.py", Some(FIVE_LINES)), ("g.rs", Some(FIVE_LINES))]);
    repo.commit("bob", "edit", &[("f.py", Some("l1\nX2\nl3\nl4\nl5\n")), ("g.rs", Some("l1\nl2\nl3\nY4\nl5\n"))]);
    let fix1 = repo.commit("carol", "fix f", &[("f.py", Some(FIVE_LINES))]);
    let fix2 = repo.commit("carol", "fix g", &[("g.rs", Some(FIVE_LINES))]);
    let fixes = [fix2.as_str(), fix1.as_str(), fix2.as_str()];

    let serial = link(&repo, &fixes, 1, &CancelToken::new());
    let parallel = link(&repo, &fixes, 4, &CancelToken::new());
    assert_eq!(serial.items, parallel.items);
    assert_eq!(serial.items.fixes.len(), 2, "duplicate fix ids are analysed once");
    assert_eq!(serial.items.fixes[0].fix, fix2);
    assert_eq!(
        serde_json::to_string(&serial.items).unwrap(),
        serde_json::to_string(&parallel.items).unwrap()
    );
}

#[test]
fn abbreviated_and_unknown_fix_ids() {
    let mut repo = RepoBuilder::new();
    repo.commit("alice", "create", &[("f.py", Some(FIVE_LINES))]);
    let fix = repo.commit("bob", "fix", &[("f.py", Some("l1\n"))]);

    let report = link(&repo, &[&fix[..12], "cafebabe", "not a hash"], 2, &CancelToken::new());
    assert_eq!(report.items.fixes[0].fix, fix);
    let reasons: Vec<&str> = report.skipped.iter().map(|s| s.reason.as_str()).collect();
    assert_eq!(reasons, vec!["unresolvable commit id", "unresolvable commit id"]);
}

#[test]
fn cancelled_run_skips_every_fix() {
    let mut repo = RepoBuilder::new();
    repo.commit("alice", "create", &[("f.py", Some(FIVE_LINES))]);
    let fix = repo.commit("bob", "fix", &[("f.py", Some("l1\n"))]);

    let history = HistoryAccessor::open(repo.path()).unwrap();
    let headers: Vec<_> = history.headers_of(None).unwrap().collect();

    let cancel = CancelToken::new();
    cancel.cancel();
    let linker = Linker::new(repo.path(), Arc::new(SourceFilter::default()), LinkOptions::default());
    let report = linker.link(headers, &[fix], &cancel).unwrap();
    assert_eq!(report.processed, 0);
    assert_eq!(report.skipped[0].reason, "cancelled");
}

#[test]
fn linking_a_plain_directory_fails() {
    let dir = tempfile::tempdir().unwrap();
    let linker = Linker::new(dir.path(), Arc::new(SourceFilter::default()), LinkOptions::default());
    assert!(linker.link(Vec::new(), &[], &CancelToken::new()).is_err());
}

#[test]
fn non_ascii_paths_are_linked() {
    let mut repo = RepoBuilder::new();
    repo.commit("alice", "create", &[("src/caf\u{e9}.py", Some(FIVE_LINES))]);
    let b = repo.commit("bob", "rework line 3", &[("src/caf\u{e9}.py", Some("l1\nl2\nL3 changed\nl4\nl5\n"))]);
    let c = repo.commit("carol", "fix: drop line 3", &[("src/caf\u{e9}.py", Some("l1\nl2\nl4\nl5\n"))]);

    let report = link(&repo, &[c.as_str()], 1, &CancelToken::new());
    let fixes: Vec<&String> = report.items.links.fixes_for(&b).unwrap().iter().collect();
    assert_eq!(fixes, vec![&c]);
    assert!(report.items.fixes[0]
        .modified_regions
        .lines("src/caf\u{e9}.py")
        .is_some());
}

#[test]
fn lines_written_by_a_merge_resolution_are_not_linked() {
    let mut repo = RepoBuilder::new();
    repo.commit("alice", "create", &[("f.py", Some(FIVE_LINES))]);
    let side = repo.commit_detached("bob", "side edit", &[("f.py", Some("l1\nl2\nside\nl4\nl5\n"))]);
    repo.commit("carol", "main edit", &[("f.py", Some("l1\nl2\nmain\nl4\nl5\n"))]);
    let merge = repo.merge("carol", "Merge side", &side, &[("f.py", Some("l1\nl2\nresolved\nl4\nl5\n"))]);
    let fix = repo.commit("dave", "fix: drop resolved line", &[("f.py", Some("l1\nl2\nl4\nl5\n"))]);

    let history = HistoryAccessor::open(repo.path()).unwrap();
    let header = history.resolve(&fix).unwrap();
    assert_eq!(history.origin_of("f.py", 3, &header).unwrap(), Some(merge));

    let report = link(&repo, &[fix.as_str()], 2, &CancelToken::new());
    assert_eq!(report.processed, 1);
    assert!(report.skipped.is_empty());
    assert!(report.items.links.is_empty());
    assert_eq!(report.items.fixes[0].fix, fix);
    assert!(report.items.fixes[0].linked_to.is_empty());
}

#[test]
fn origins_outside_the_walked_branch_are_dropped() {
    let mut repo = RepoBuilder::new();
    let a = repo.commit("alice", "create", &[("f.py", Some(FIVE_LINES))]);
    repo.commit("bob", "rework line 3", &[("f.py", Some("l1\nl2\nL3 changed\nl4\nl5\n"))]);
    let fix = repo.commit("carol", "fix: drop line 3", &[("f.py", Some("l1\nl2\nl4\nl5\n"))]);
    repo.branch("old", &a);

    let history = HistoryAccessor::open(repo.path()).unwrap();
    let linker = Linker::new(repo.path(), Arc::new(SourceFilter::default()), LinkOptions::default());
    let report = linker
        .link(history.headers_of(Some("old")).unwrap(), &[fix.clone()], &CancelToken::new())
        .unwrap();

    assert_eq!(report.processed, 1);
    assert!(report.items.links.is_empty());
    assert!(report.items.fixes[0].linked_to.is_empty());
}
