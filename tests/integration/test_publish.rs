//! Integration tests for the publish dispatcher

use crate::helpers::{RecordingRenderer, ScriptedEngine, config, context, graph};
use cargo_convoy::core::error::ConvoyError;
use cargo_convoy::release::engine::DispatchOutcome;
use cargo_convoy::release::{PublishArgs, publish, publish_with};

fn two_group_context() -> cargo_convoy::core::context::WorkspaceContext {
  let graph = graph(&[
    ("lib-core", &[], true),
    ("lib-util", &["lib-core"], true),
    ("cli", &["lib-util"], true),
  ]);
  let config = config(&[("core", &["lib-core", "lib-util"]), ("tools", &["cli"])]);
  context(graph, config)
}

#[test]
fn all_groups_succeeding_returns_zero() {
  let ctx = two_group_context();
  let engine = ScriptedEngine::new();
  let renderer = RecordingRenderer::new();

  let status = publish_with(&ctx, &PublishArgs::default(), &engine, &renderer).unwrap();

  assert_eq!(status, 0);
  assert_eq!(engine.dispatch_count(), 2);
  assert!(renderer.renders().is_empty());
}

#[test]
fn groups_dispatch_in_configuration_order() {
  let ctx = two_group_context();
  let engine = ScriptedEngine::new();
  let renderer = RecordingRenderer::new();

  publish_with(&ctx, &PublishArgs::default(), &engine, &renderer).unwrap();

  let dispatches = engine.dispatches();
  assert_eq!(dispatches[0].request.projects, vec!["lib-core", "lib-util"]);
  assert_eq!(dispatches[1].request.projects, vec!["cli"]);
}

#[test]
fn single_failing_group_status_propagates() {
  let ctx = two_group_context();
  let engine = ScriptedEngine::with_outcomes(&[DispatchOutcome::Failure(2)]);
  let renderer = RecordingRenderer::new();

  let args = PublishArgs {
    groups: vec!["core".to_string()],
    ..Default::default()
  };

  let status = publish_with(&ctx, &args, &engine, &renderer).unwrap();
  assert_eq!(status, 2);
}

#[test]
fn failure_then_success_keeps_failure() {
  let ctx = two_group_context();
  let engine = ScriptedEngine::with_outcomes(&[DispatchOutcome::Failure(2), DispatchOutcome::Success]);
  let renderer = RecordingRenderer::new();

  let status = publish_with(&ctx, &PublishArgs::default(), &engine, &renderer).unwrap();

  // Both groups were still attempted; the recorded failure survives
  assert_eq!(engine.dispatch_count(), 2);
  assert_eq!(status, 2);
}

#[test]
fn later_failure_overwrites_earlier_status() {
  let ctx = two_group_context();
  let engine = ScriptedEngine::with_outcomes(&[DispatchOutcome::Failure(2), DispatchOutcome::Failure(3)]);
  let renderer = RecordingRenderer::new();

  let status = publish_with(&ctx, &PublishArgs::default(), &engine, &renderer).unwrap();
  assert_eq!(status, 3);
}

#[test]
fn codeless_failure_exits_with_one() {
  let ctx = two_group_context();
  let engine = ScriptedEngine::with_outcomes(&[DispatchOutcome::Failure(0)]);
  let renderer = RecordingRenderer::new();

  let args = PublishArgs {
    groups: vec!["core".to_string()],
    ..Default::default()
  };

  let status = publish_with(&ctx, &args, &engine, &renderer).unwrap();
  assert_eq!(status, 1);
}

#[test]
fn programmatic_caller_gets_a_publish_error() {
  let ctx = two_group_context();
  let engine = ScriptedEngine::with_outcomes(&[DispatchOutcome::Failure(2)]);
  let renderer = RecordingRenderer::new();

  let args = PublishArgs {
    groups: vec!["core".to_string()],
    ..Default::default()
  };

  let err = publish(&ctx, &args, &engine, &renderer).unwrap_err();
  assert!(matches!(err, ConvoyError::PublishFailed { status: 2 }));
  assert_eq!(err.exit_code(), 2);
  assert_eq!(err.to_string(), "One or more selected projects could not be published");
}

#[test]
fn programmatic_caller_resolves_on_success() {
  let ctx = two_group_context();
  let engine = ScriptedEngine::new();
  let renderer = RecordingRenderer::new();

  publish(&ctx, &PublishArgs::default(), &engine, &renderer).unwrap();
}

#[test]
fn project_filter_excludes_task_dependencies() {
  let ctx = two_group_context();
  let engine = ScriptedEngine::new();
  let renderer = RecordingRenderer::new();

  let args = PublishArgs {
    projects: vec!["lib-util".to_string()],
    ..Default::default()
  };

  publish_with(&ctx, &args, &engine, &renderer).unwrap();

  let dispatches = engine.dispatches();
  assert_eq!(dispatches.len(), 1);
  assert_eq!(dispatches[0].request.projects, vec!["lib-util"]);
  assert!(dispatches[0].request.exclude_task_dependencies);
}

#[test]
fn group_filter_excludes_task_dependencies() {
  let ctx = two_group_context();
  let engine = ScriptedEngine::new();
  let renderer = RecordingRenderer::new();

  let args = PublishArgs {
    groups: vec!["tools".to_string()],
    ..Default::default()
  };

  publish_with(&ctx, &args, &engine, &renderer).unwrap();

  let dispatches = engine.dispatches();
  assert_eq!(dispatches.len(), 1);
  assert!(dispatches[0].request.exclude_task_dependencies);
}

#[test]
fn unfiltered_run_includes_task_dependencies() {
  let ctx = two_group_context();
  let engine = ScriptedEngine::new();
  let renderer = RecordingRenderer::new();

  publish_with(&ctx, &PublishArgs::default(), &engine, &renderer).unwrap();

  for dispatch in engine.dispatches() {
    assert!(!dispatch.request.exclude_task_dependencies);
  }
}

#[test]
fn ineligible_group_aborts_before_its_dispatch() {
  // Group A publishes fine; no project of group B declares the publish target
  let graph = graph(&[
    ("p1", &[], true),
    ("p2", &[], true),
    ("p3", &[], false),
  ]);
  let config = config(&[("a", &["p1", "p2"]), ("b", &["p3"])]);
  let ctx = context(graph, config);

  let engine = ScriptedEngine::new();
  let renderer = RecordingRenderer::new();

  let err = publish_with(&ctx, &PublishArgs::default(), &engine, &renderer).unwrap_err();

  // Group A was dispatched, group B raised before any engine call
  assert_eq!(engine.dispatch_count(), 1);
  assert_eq!(engine.dispatches()[0].request.projects, vec!["p1", "p2"]);

  let message = err.to_string();
  assert!(message.contains("p3"));
  assert!(message.contains("'b'"));
}

#[test]
fn partially_eligible_group_drops_silently() {
  let graph = graph(&[("p1", &[], true), ("p2", &[], false)]);
  let config = config(&[("mixed", &["p1", "p2"])]);
  let ctx = context(graph, config);

  let engine = ScriptedEngine::new();
  let renderer = RecordingRenderer::new();

  let status = publish_with(&ctx, &PublishArgs::default(), &engine, &renderer).unwrap();

  assert_eq!(status, 0);
  assert_eq!(engine.dispatches()[0].request.projects, vec!["p1"]);
}

#[test]
fn graph_preview_never_touches_the_engine() {
  let ctx = two_group_context();
  let engine = ScriptedEngine::with_outcomes(&[DispatchOutcome::Failure(7)]);
  let renderer = RecordingRenderer::new();

  let args = PublishArgs {
    graph: true,
    ..Default::default()
  };

  let status = publish_with(&ctx, &args, &engine, &renderer).unwrap();

  assert_eq!(status, 0);
  assert_eq!(engine.dispatch_count(), 0);

  let renders = renderer.renders();
  assert_eq!(renders.len(), 2);
  for render in &renders {
    assert!(!render.watch);
    assert!(!render.all);
    assert!(render.open);
    assert_eq!(render.targets, vec!["nx-release-publish"]);
  }
  assert_eq!(renders[0].projects, vec!["lib-core", "lib-util"]);
  assert_eq!(renders[1].projects, vec!["cli"]);
}

#[test]
fn dry_run_reaches_every_dispatch() {
  let ctx = two_group_context();
  let engine = ScriptedEngine::new();
  let renderer = RecordingRenderer::new();

  let args = PublishArgs {
    dry_run: true,
    ..Default::default()
  };

  publish_with(&ctx, &args, &engine, &renderer).unwrap();

  let dispatches = engine.dispatches();
  assert_eq!(dispatches.len(), 2);
  for dispatch in dispatches {
    assert!(dispatch.env.dry_run());
    assert!(dispatch.request.overrides.is_truthy("dry-run"));
  }
}

#[test]
fn verbose_flag_reaches_every_dispatch() {
  let ctx = two_group_context();
  let engine = ScriptedEngine::new();
  let renderer = RecordingRenderer::new();

  let args = PublishArgs {
    verbose: true,
    ..Default::default()
  };

  publish_with(&ctx, &args, &engine, &renderer).unwrap();

  for dispatch in engine.dispatches() {
    assert!(dispatch.env.verbose());
  }
}

#[test]
fn named_flags_beat_unparsed_overrides() {
  let ctx = two_group_context();
  let engine = ScriptedEngine::new();
  let renderer = RecordingRenderer::new();

  let args = PublishArgs {
    registry: Some("https://real.test".to_string()),
    tag: Some("latest".to_string()),
    overrides_unparsed: vec![
      "registry=https://stale.test".to_string(),
      "tag=old".to_string(),
      "otp=123456".to_string(),
    ],
    ..Default::default()
  };

  publish_with(&ctx, &args, &engine, &renderer).unwrap();

  for dispatch in engine.dispatches() {
    let overrides = &dispatch.request.overrides;
    assert_eq!(overrides.get_str("registry"), Some("https://real.test"));
    assert_eq!(overrides.get_str("tag"), Some("latest"));
    // No named otp flag: the raw token survives
    assert_eq!(overrides.get_str("otp"), Some("123456"));
  }
}

#[test]
fn dispatch_targets_are_the_publish_target() {
  let ctx = two_group_context();
  let engine = ScriptedEngine::new();
  let renderer = RecordingRenderer::new();

  publish_with(&ctx, &PublishArgs::default(), &engine, &renderer).unwrap();

  for dispatch in engine.dispatches() {
    assert_eq!(dispatch.request.targets, vec!["nx-release-publish"]);
  }
}

#[test]
fn engine_infrastructure_error_is_fatal() {
  let ctx = two_group_context();
  let engine = ScriptedEngine::broken();
  let renderer = RecordingRenderer::new();

  let err = publish_with(&ctx, &PublishArgs::default(), &engine, &renderer).unwrap_err();
  assert!(err.to_string().contains("engine exploded"));
}

#[test]
fn unknown_group_filter_is_fatal_before_any_dispatch() {
  let ctx = two_group_context();
  let engine = ScriptedEngine::new();
  let renderer = RecordingRenderer::new();

  let args = PublishArgs {
    groups: vec!["ghost".to_string()],
    ..Default::default()
  };

  let err = publish_with(&ctx, &args, &engine, &renderer).unwrap_err();

  assert_eq!(engine.dispatch_count(), 0);
  assert!(err.to_string().contains("'ghost'"));
  assert_eq!(err.exit_code(), 1);
}
