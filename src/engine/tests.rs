//! Tests for staleness decisions and build ordering.

use super::*;
use crate::buildfile;
use crate::executor::{CommandError, MockExecutor};
use anyhow::Result;
use camino::Utf8PathBuf;
use mockall::Sequence;
use rstest::{fixture, rstest};
use test_support::{Project, set_mtime};

/// Executor that records commands and interprets a tiny command language:
/// `touch NAME...` stamps each file with an ever-increasing time and
/// `false` fails with exit code 1.
struct Recorder {
    root: Utf8PathBuf,
    clock: u64,
    log: Vec<String>,
}

impl Recorder {
    fn new(project: &Project) -> Self {
        Self {
            root: project.root().to_owned(),
            clock: 1_000,
            log: Vec::new(),
        }
    }
}

impl Executor for Recorder {
    fn execute(&mut self, command: &str) -> Result<(), CommandError> {
        self.log.push(command.to_owned());
        let mut words = command.split_whitespace();
        match words.next() {
            Some("false") => Err(CommandError::Failed {
                command: command.to_owned(),
                code: Some(1),
            }),
            Some("touch") => {
                for name in words {
                    let path = self.root.join(name);
                    std::fs::write(&path, b"").expect("touch output");
                    set_mtime(&path, self.clock, 0).expect("stamp output");
                    self.clock += 1;
                }
                Ok(())
            }
            _ => Ok(()),
        }
    }
}

#[fixture]
fn project() -> Project {
    Project::new().expect("project")
}

fn build(
    project: &Project,
    graph: &mut TargetGraph,
    executor: &mut impl Executor,
    root: Option<&str>,
) -> Result<BuildOutcome, BuildError> {
    let workspace = Workspace::new(project.root());
    let mut engine = Engine::new(graph, &workspace, executor);
    match root {
        Some(name) => engine.build_named(name),
        None => engine.build_default(),
    }
}

fn parse(text: &str) -> TargetGraph {
    buildfile::from_str(text).expect("parse build file")
}

#[rstest]
fn missing_target_runs_its_commands(project: Project) -> Result<()> {
    project.touch_at("main.c", 100, 0)?;
    let mut graph = parse("prog: main.c\n\ttouch prog\n");
    let mut recorder = Recorder::new(&project);

    let outcome = build(&project, &mut graph, &mut recorder, None)?;

    assert_eq!(recorder.log, ["touch prog"]);
    assert_eq!(outcome.rebuilt(), ["prog"]);
    assert_eq!(outcome.commands_run(), 1);
    assert!(!outcome.is_up_to_date());
    assert!(project.exists("prog"));
    Ok(())
}

#[rstest]
#[case::target_newer((100, 0), (200, 0), false)]
#[case::same_time((100, 0), (100, 0), false)]
#[case::dependency_newer((300, 0), (200, 0), true)]
#[case::same_second_newer_nanos((200, 500), (200, 100), true)]
#[case::same_second_older_nanos((200, 100), (200, 500), false)]
fn compares_dependency_and_target_times(
    project: Project,
    #[case] source: (u64, u32),
    #[case] target: (u64, u32),
    #[case] rebuilds: bool,
) -> Result<()> {
    project.touch_at("main.c", source.0, source.1)?;
    project.touch_at("prog", target.0, target.1)?;
    let mut graph = parse("prog: main.c\n\ttouch prog\n");
    let mut recorder = Recorder::new(&project);

    let outcome = build(&project, &mut graph, &mut recorder, None)?;

    assert_eq!(!outcome.is_up_to_date(), rebuilds);
    assert_eq!(recorder.log.len(), usize::from(rebuilds));
    Ok(())
}

#[rstest]
fn existing_target_without_dependencies_is_up_to_date(project: Project) -> Result<()> {
    project.touch_at("config", 100, 0)?;
    let mut graph = parse("config:\n\ttouch config\n");
    let mut executor = MockExecutor::new();
    executor.expect_execute().never();

    let outcome = build(&project, &mut graph, &mut executor, None)?;

    assert!(outcome.is_up_to_date());
    assert!(outcome.rebuilt().is_empty());
    Ok(())
}

#[rstest]
fn dependencies_build_before_dependents_in_declaration_order(project: Project) -> Result<()> {
    let mut graph = parse("top: left right\n\ttouch top\nleft:\n\ttouch left\nright:\n\ttouch right\n");
    let mut executor = MockExecutor::new();
    let mut seq = Sequence::new();
    for expected in ["touch left", "touch right", "touch top"] {
        executor
            .expect_execute()
            .withf(move |command| command == expected)
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_| Ok(()));
    }

    let outcome = build(&project, &mut graph, &mut executor, None)?;

    assert_eq!(outcome.rebuilt(), ["left", "right", "top"]);
    Ok(())
}

#[rstest]
fn shared_dependency_is_visited_once(project: Project) -> Result<()> {
    let mut graph = parse(
        "top: l r\n\ttouch top\nl: base\n\ttouch l\nr: base\n\ttouch r\nbase:\n\ttouch base\n",
    );
    let mut recorder = Recorder::new(&project);

    build(&project, &mut graph, &mut recorder, None)?;

    assert_eq!(recorder.log, ["touch base", "touch l", "touch r", "touch top"]);
    Ok(())
}

#[rstest]
fn rebuilt_dependency_makes_dependent_stale(project: Project) -> Result<()> {
    project.touch_at("main.c", 300, 0)?;
    project.touch_at("main.o", 150, 0)?;
    project.touch_at("prog", 200, 0)?;
    let mut graph = parse("prog: main.o\n\ttouch prog\nmain.o: main.c\n\ttouch main.o\n");
    let mut recorder = Recorder::new(&project);

    let outcome = build(&project, &mut graph, &mut recorder, None)?;

    assert_eq!(recorder.log, ["touch main.o", "touch prog"]);
    assert_eq!(outcome.rebuilt(), ["main.o", "prog"]);
    Ok(())
}

#[rstest]
fn target_left_missing_keeps_dependents_stale(project: Project) -> Result<()> {
    project.touch_at("all", 500, 0)?;
    let mut graph = parse("all: phony\n\ttouch all\nphony:\n");
    let mut recorder = Recorder::new(&project);

    let outcome = build(&project, &mut graph, &mut recorder, None)?;

    assert_eq!(recorder.log, ["touch all"]);
    assert_eq!(outcome.rebuilt(), ["phony", "all"]);
    let phony = graph.node_id("phony").expect("phony");
    assert!(!graph.node(phony).exists_on_disk());
    Ok(())
}

#[rstest]
fn missing_prerequisite_runs_no_commands(project: Project) {
    let mut graph = parse("all: a ghost\n\ttouch all\na:\n\ttouch a\n");
    let mut recorder = Recorder::new(&project);

    let err = build(&project, &mut graph, &mut recorder, None).expect_err("missing");

    assert!(
        matches!(
            &err,
            BuildError::MissingPrerequisite { name, needed_by }
                if name == "ghost" && needed_by == "all"
        ),
        "{err:?}"
    );
    assert!(recorder.log.is_empty());
    assert!(!project.exists("a"));
}

#[rstest]
fn cycle_is_reported_before_any_command(project: Project) {
    let mut graph = parse("all: a\n\ttouch all\na: b\n\ttouch a\nb: a\n\ttouch b\n");
    let mut executor = MockExecutor::new();
    executor.expect_execute().never();

    let err = build(&project, &mut graph, &mut executor, None).expect_err("cycle");

    let BuildError::CyclicDependency { cycle } = &err else {
        panic!("expected cycle, got {err:?}");
    };
    assert_eq!(cycle, &["a", "b", "a"]);
    assert_eq!(err.to_string(), "dependency cycle detected: a -> b -> a");
}

#[rstest]
fn failing_command_stops_the_build(project: Project) {
    let mut graph = parse("all: a b\n\ttouch all\na:\n\tfalse\n\ttouch a\nb:\n\ttouch b\n");
    let mut recorder = Recorder::new(&project);

    let err = build(&project, &mut graph, &mut recorder, None).expect_err("failure");

    let BuildError::Command(command) = &err else {
        panic!("expected command failure, got {err:?}");
    };
    assert_eq!(command.exit_code(), Some(1));
    assert_eq!(recorder.log, ["false"]);
}

#[rstest]
fn earlier_commands_are_kept_after_a_failure(project: Project) {
    let mut graph = parse("all: a b\n\ttouch all\na:\n\ttouch a\nb:\n\tfalse\n");
    let mut recorder = Recorder::new(&project);

    build(&project, &mut graph, &mut recorder, None).expect_err("failure");

    assert_eq!(recorder.log, ["touch a", "false"]);
    assert!(project.exists("a"));
    assert!(!project.exists("all"));
}

#[rstest]
fn second_build_is_up_to_date(project: Project) -> Result<()> {
    project.touch_at("input", 100, 0)?;
    let text = "out: mid\n\ttouch out\nmid: input\n\ttouch mid\n";
    let mut recorder = Recorder::new(&project);

    let mut first = parse(text);
    let outcome = build(&project, &mut first, &mut recorder, None)?;
    assert_eq!(outcome.commands_run(), 2);

    let mut second = parse(text);
    let outcome = build(&project, &mut second, &mut recorder, None)?;
    assert!(outcome.is_up_to_date());
    assert_eq!(recorder.log.len(), 2);
    Ok(())
}

#[rstest]
fn reset_graph_can_be_built_again(project: Project) -> Result<()> {
    let mut graph = parse("a:\n\ttouch a\n");
    let mut recorder = Recorder::new(&project);

    build(&project, &mut graph, &mut recorder, None)?;
    graph.reset_traversal();
    let outcome = build(&project, &mut graph, &mut recorder, Some("a"))?;

    assert!(outcome.is_up_to_date());
    assert_eq!(recorder.log, ["touch a"]);
    Ok(())
}

#[rstest]
#[case::never_mentioned("ghost")]
#[case::only_a_dependency("main.c")]
fn unknown_root_is_rejected(project: Project, #[case] name: &str) {
    let mut graph = parse("prog: main.c\n\ttouch prog\n");
    let mut executor = MockExecutor::new();
    executor.expect_execute().never();

    let err = build(&project, &mut graph, &mut executor, Some(name)).expect_err("unknown");

    assert!(
        matches!(&err, BuildError::UnknownTarget { name: found } if found == name),
        "{err:?}"
    );
}

#[rstest]
fn named_root_ignores_other_targets(project: Project) -> Result<()> {
    let mut graph = parse("all: a\n\ttouch all\na:\n\ttouch a\nclean:\n\ttouch clean\n");
    let mut recorder = Recorder::new(&project);

    let outcome = build(&project, &mut graph, &mut recorder, Some("clean"))?;

    assert_eq!(outcome.root(), "clean");
    assert_eq!(recorder.log, ["touch clean"]);
    Ok(())
}

#[rstest]
fn deep_chain_does_not_exhaust_the_stack(project: Project) -> Result<()> {
    const DEPTH: usize = 20_000;
    let mut text = String::new();
    for idx in 0..DEPTH {
        text.push_str(&format!("t{idx}: t{}\n", idx + 1));
    }
    text.push_str(&format!("t{DEPTH}:\n"));
    let mut graph = parse(&text);
    let mut executor = MockExecutor::new();
    executor.expect_execute().never();

    let outcome = build(&project, &mut graph, &mut executor, None)?;

    assert_eq!(outcome.rebuilt().len(), DEPTH + 1);
    assert_eq!(outcome.rebuilt().first().map(String::as_str), Some("t20000"));
    assert_eq!(outcome.rebuilt().last().map(String::as_str), Some("t0"));
    Ok(())
}
