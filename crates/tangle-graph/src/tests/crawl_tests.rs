//! Crawl scenarios over an in-memory project.

use std::collections::BTreeSet;
use std::path::PathBuf;
use std::sync::Arc;

use async_trait::async_trait;

use super::test_helpers::*;
use crate::classify::{ClassifyError, Location, ModuleClassifier};
use crate::crawl::{CrawlOptions, Crawler, Graph};
use crate::env::{CrawlEnv, ForeignPackage, PackageId};
use crate::error::{CrawlError, ModuleError};
use crate::header::{Header, HeaderParseError, HeaderParser, ModuleTag};
use crate::module_name::ModuleName;
use crate::runtime::memory::MemoryRuntime;

fn crawler(env: CrawlEnv, runtime: MemoryRuntime) -> (Crawler, Arc<MemoryRuntime>) {
    let runtime = Arc::new(runtime);
    (Crawler::new(env, runtime.clone()), runtime)
}

fn keys<V>(map: &std::collections::BTreeMap<ModuleName, V>) -> Vec<&str> {
    map.keys().map(ModuleName::as_str).collect()
}

fn assert_partitioned(graph: &Graph) {
    let mut seen = BTreeSet::new();
    for name in graph
        .locals
        .keys()
        .chain(graph.natives.keys())
        .chain(graph.foreigns.keys())
        .chain(graph.problems.keys())
    {
        assert!(seen.insert(name.clone()), "{name} appears in two maps");
    }
}

#[tokio::test]
async fn test_end_to_end_scenario() {
    let runtime = project(&[("Main", &["Util", "Native.Json"]), ("Util", &[])])
        .with_file("native/Json.js", "// host code");
    let (crawler, _) = crawler(app_env(), runtime);

    let graph = crawler.crawl([name("Main")]).await.unwrap();

    assert_eq!(keys(&graph.locals), vec!["Main", "Util"]);
    assert_eq!(keys(&graph.natives), vec!["Native.Json"]);
    assert!(graph.foreigns.is_empty());
    assert!(graph.problems.is_empty());
    assert_eq!(
        graph.natives[&name("Native.Json")],
        PathBuf::from("/project/native/Json.js")
    );
    assert_eq!(graph.locals[&name("Main")].deps, names(&["Util", "Native.Json"]));
    assert_eq!(graph.build_order().unwrap(), names(&["Util", "Main"]));
}

#[tokio::test]
async fn test_foreign_modules_are_not_crawled() {
    let env = app_env().with_dependency(ForeignPackage {
        id: PackageId::new("acme/json", "2.1.0"),
        modules: [name("Json.Decode")].into_iter().collect(),
    });
    let (crawler, _) = crawler(env, project(&[("Main", &["Json.Decode"])]));

    let graph = crawler.crawl([name("Main")]).await.unwrap();

    assert_eq!(
        graph.foreigns[&name("Json.Decode")],
        PackageId::new("acme/json", "2.1.0")
    );
    assert_eq!(keys(&graph.locals), vec!["Main"]);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_partition_and_no_missed_work() {
    let runtime = project(&[
        ("Main", &["A", "B", "Native.Dom"]),
        ("A", &["Shared", "C"]),
        ("B", &["Shared", "C"]),
        ("C", &["Shared"]),
        ("Shared", &[]),
    ])
    .with_file("native/Dom.js", "");
    let (crawler, _) = crawler(app_env(), runtime);

    let graph = crawler.crawl([name("Main")]).await.unwrap();

    assert_partitioned(&graph);
    for info in graph.locals.values() {
        for dep in &info.deps {
            assert!(graph.contains(dep), "{dep} was never crawled");
        }
    }
    assert_eq!(graph.len(), 6);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_dedup_dispatches_each_module_once() {
    // every module imports Shared; the diamonds race to dispatch it
    let runtime = Arc::new(project(&[
        ("Main", &["A", "B", "C", "D", "Shared"]),
        ("A", &["Shared", "B"]),
        ("B", &["Shared", "C"]),
        ("C", &["Shared", "D"]),
        ("D", &["Shared"]),
        ("Shared", &[]),
    ]));
    let classifier = Arc::new(CountingClassifier::new(runtime.clone()));
    let crawler = Crawler::new(app_env(), runtime.clone()).with_classifier(classifier.clone());

    let graph = crawler.crawl([name("Main")]).await.unwrap();

    assert_eq!(graph.locals.len(), 6);
    assert_eq!(classifier.total(), 6);
    for module in ["Main", "A", "B", "C", "D", "Shared"] {
        assert_eq!(classifier.calls(module), 1, "{module} classified more than once");
        assert_eq!(runtime.read_count(src_path(module)), 1, "{module} read more than once");
    }
}

#[tokio::test]
async fn test_duplicate_roots_are_seeded_once() {
    let runtime = Arc::new(project(&[("Main", &[])]));
    let classifier = Arc::new(CountingClassifier::new(runtime.clone()));
    let crawler = Crawler::new(app_env(), runtime).with_classifier(classifier.clone());

    crawler
        .crawl([name("Main"), name("Main"), name("Main")])
        .await
        .unwrap();

    assert_eq!(classifier.calls("Main"), 1);
}

#[tokio::test]
async fn test_no_roots_is_rejected() {
    let (crawler, _) = crawler(app_env(), project(&[]));
    let err = crawler.crawl(Vec::new()).await.unwrap_err();
    assert!(matches!(err, CrawlError::NoRoots));
}

#[tokio::test]
async fn test_cycle_is_rejected() {
    let runtime = project(&[("A", &["B"]), ("B", &["C"]), ("C", &["A"])]);
    let (crawler, _) = crawler(app_env(), runtime);

    let err = crawler.crawl([name("A")]).await.unwrap_err();
    match err {
        CrawlError::Cycle(cycle) => assert_eq!(cycle.modules, names(&["A", "B", "C"])),
        other => panic!("expected a cycle, got {other:?}"),
    }
}

#[tokio::test]
async fn test_acyclic_chain_passes() {
    let runtime = project(&[("A", &["B"]), ("B", &["C"]), ("C", &[])]);
    let (crawler, _) = crawler(app_env(), runtime);

    let graph = crawler.crawl([name("A")]).await.unwrap();
    assert_eq!(graph.build_order().unwrap(), names(&["C", "B", "A"]));
}

#[tokio::test]
async fn test_self_import_is_not_a_cycle() {
    let (crawler, _) = crawler(app_env(), project(&[("Main", &["Main"])]));
    let graph = crawler.crawl([name("Main")]).await.unwrap();
    assert_eq!(keys(&graph.locals), vec!["Main"]);
}

#[tokio::test]
async fn test_failures_skip_cycle_check() {
    // the cycle is real, but the missing module is reported instead
    let runtime = project(&[("A", &["B", "Missing"]), ("B", &["A"])]);
    let (crawler, _) = crawler(app_env(), runtime);

    let err = crawler.crawl([name("A")]).await.unwrap_err();
    assert!(matches!(err, CrawlError::Modules { .. }));
}

#[tokio::test]
async fn test_port_module_in_library_fails() {
    let runtime = MemoryRuntime::new(ROOT).with_file("src/Ports.tgl", "port module Ports exposing (..)");

    let (crawler, _) = crawler(lib_env(), runtime);
    let err = crawler.crawl([name("Ports")]).await.unwrap_err();
    let CrawlError::Modules { problems, .. } = err else {
        panic!("expected module failures");
    };
    assert!(matches!(
        problems[&name("Ports")],
        ModuleError::PortsInPackage { .. }
    ));
}

#[tokio::test]
async fn test_port_module_in_application_succeeds() {
    let runtime = MemoryRuntime::new(ROOT).with_file("src/Ports.tgl", "port module Ports exposing (..)");

    let (crawler, _) = crawler(app_env(), runtime);
    let graph = crawler.crawl([name("Ports")]).await.unwrap();
    assert!(graph.locals.contains_key(&name("Ports")));
}

#[tokio::test]
async fn test_name_mismatch_fails_under_requested_name() {
    let runtime = project(&[("Main", &["Foo.Bar"])])
        .with_file("src/Foo/Bar.tgl", "module Foo.Baz exposing (..)");
    let (crawler, _) = crawler(app_env(), runtime);

    let err = crawler.crawl([name("Main")]).await.unwrap_err();
    let CrawlError::Modules { problems, .. } = &err else {
        panic!("expected module failures");
    };
    assert_eq!(keys(problems), vec!["Foo.Bar"]);
    assert!(matches!(
        &problems[&name("Foo.Bar")],
        ModuleError::BadName { declared, .. } if declared == &name("Foo.Baz")
    ));
    assert_eq!(err.import_chain(&name("Foo.Bar")), names(&["Main", "Foo.Bar"]));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_partial_failure_expands_successful_branches() {
    let runtime = Arc::new(project(&[
        ("One", &["One.Dep"]),
        ("One.Dep", &[]),
        ("Two", &["Two.Dep"]),
        ("Two.Dep", &["Two.Deeper"]),
        ("Two.Deeper", &[]),
        ("Three", &[]),
    ]));
    let crawler = Crawler::new(app_env(), runtime.clone());

    let err = crawler
        .crawl(names(&["One", "Missing", "Two", "Gone", "Three"]))
        .await
        .unwrap_err();

    let CrawlError::Modules {
        problems,
        importers,
    } = err
    else {
        panic!("expected module failures");
    };
    assert_eq!(keys(&problems), vec!["Gone", "Missing"]);
    assert!(problems.values().all(|e| matches!(
        e,
        ModuleError::Classify(ClassifyError::NotFound { .. })
    )));

    for module in ["One", "One.Dep", "Two", "Two.Dep", "Two.Deeper", "Three"] {
        assert_eq!(runtime.read_count(src_path(module)), 1, "{module} not crawled");
    }
    assert_eq!(importers[&name("Two.Deeper")], name("Two.Dep"));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_repeated_crawls_are_deterministic() {
    let runtime = Arc::new(
        project(&[
            ("Main", &["A", "B", "Native.Dom"]),
            ("A", &["C", "D"]),
            ("B", &["D", "E"]),
            ("C", &[]),
            ("D", &["E"]),
            ("E", &[]),
        ])
        .with_file("native/Dom.js", ""),
    );
    let crawler = Crawler::new(app_env(), runtime);

    let first = crawler.crawl([name("Main")]).await.unwrap();
    for _ in 0..10 {
        let again = crawler.crawl([name("Main")]).await.unwrap();
        assert_eq!(again.locals, first.locals);
        assert_eq!(again.natives, first.natives);
        assert_eq!(again.foreigns, first.foreigns);
        assert_eq!(again.build_order().unwrap(), first.build_order().unwrap());
    }
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_bounded_parallelism_gives_same_graph() {
    let modules: Vec<(String, Vec<String>)> = (0..40)
        .map(|i| {
            let deps = (i + 1..(i + 4).min(40)).map(|j| format!("M{j}")).collect();
            (format!("M{i}"), deps)
        })
        .collect();
    let runtime = Arc::new(modules.iter().fold(MemoryRuntime::new(ROOT), |rt, (m, deps)| {
        let deps: Vec<&str> = deps.iter().map(String::as_str).collect();
        rt.with_file(src_path(m), source(m, &deps))
    }));

    let unbounded = Crawler::new(app_env(), runtime.clone())
        .crawl([name("M0")])
        .await
        .unwrap();
    let bounded = Crawler::new(app_env(), runtime)
        .with_options(CrawlOptions::default().with_max_parallel(2))
        .crawl([name("M0")])
        .await
        .unwrap();

    assert_eq!(unbounded.locals.len(), 40);
    assert_eq!(bounded.locals, unbounded.locals);
}

#[derive(Debug)]
struct ExplodesOn(&'static str, Arc<CountingClassifier>);

#[async_trait]
impl ModuleClassifier for ExplodesOn {
    async fn classify(&self, env: &CrawlEnv, name: &ModuleName) -> Result<Location, ClassifyError> {
        if name.as_str() == self.0 {
            panic!("classifier failed on {name}");
        }
        self.1.classify(env, name).await
    }
}

#[tokio::test]
async fn test_lost_worker_still_terminates() {
    let runtime = Arc::new(project(&[("Main", &["Boom", "Fine"]), ("Fine", &[])]));
    let inner = Arc::new(CountingClassifier::new(runtime.clone()));
    let crawler =
        Crawler::new(app_env(), runtime).with_classifier(Arc::new(ExplodesOn("Boom", inner)));

    let err = crawler.crawl([name("Main")]).await.unwrap_err();
    let CrawlError::Modules { problems, .. } = err else {
        panic!("expected module failures");
    };
    assert_eq!(keys(&problems), vec!["Boom"]);
    assert!(matches!(problems[&name("Boom")], ModuleError::WorkerLost));
}

/// Parser that treats every line of the file as an import.
#[derive(Debug)]
struct LineListParser;

impl HeaderParser for LineListParser {
    fn parse(&self, package: &PackageId, source: &str) -> Result<Header, HeaderParseError> {
        assert_eq!(package.name, "acme/app");
        let mut lines = source.lines();
        let first = lines.next().ok_or(HeaderParseError {
            line: 1,
            message: "empty file".to_string(),
        })?;
        let parse = |s: &str| {
            ModuleName::new(s.trim()).map_err(|e| HeaderParseError {
                line: 1,
                message: e.to_string(),
            })
        };
        Ok(Header {
            tag: ModuleTag::Normal,
            name: parse(first)?,
            imports: lines.map(parse).collect::<Result<_, _>>()?,
        })
    }
}

#[tokio::test]
async fn test_custom_header_parser() {
    let runtime = MemoryRuntime::new(ROOT)
        .with_file("src/Main.tgl", "Main\nUtil")
        .with_file("src/Util.tgl", "Util");
    let (crawler, _) = crawler(app_env(), runtime);

    let graph = crawler
        .with_parser(Arc::new(LineListParser))
        .crawl([name("Main")])
        .await
        .unwrap();
    assert_eq!(keys(&graph.locals), vec!["Main", "Util"]);
}

#[tokio::test]
async fn test_bad_header_carries_parser_message() {
    let runtime = MemoryRuntime::new(ROOT).with_file("src/Main.tgl", "\n\nmain = 1");
    let (crawler, _) = crawler(app_env(), runtime);

    let err = crawler.crawl([name("Main")]).await.unwrap_err();
    let CrawlError::Modules { problems, .. } = err else {
        panic!("expected module failures");
    };
    assert!(matches!(
        &problems[&name("Main")],
        ModuleError::BadHeader { message, .. } if message.starts_with("line 3")
    ));
}

#[tokio::test]
async fn test_malformed_import_fails_module_instead_of_dropping_imports() {
    let runtime = project(&[("Util", &[]), ("Other", &[])]).with_file(
        src_path("Main"),
        "module Main exposing (..)\nimport Util\nimport json\nimport Other\n",
    );
    let (crawler, runtime) = crawler(app_env(), runtime);

    let err = crawler.crawl([name("Main")]).await.unwrap_err();
    let CrawlError::Modules { problems, .. } = err else {
        panic!("expected module failures");
    };
    assert_eq!(keys(&problems), vec!["Main"]);
    assert!(matches!(
        &problems[&name("Main")],
        ModuleError::BadHeader { message, .. } if message.starts_with("line 3")
    ));
    assert_eq!(runtime.read_count(src_path("Other")), 0);
}
