//! Tests for startup enumeration, incremental adds and unload passes.

mod common;

use std::collections::HashSet;

use class_track::{ClassStatus, Tag, TrackerConfig, DEFAULT_OUTPUT_CAPACITY};
use common::{set_of, tracked_set, FakeVm};

// ============================================================================
// initialize
// ============================================================================

#[test]
fn test_initialize_tracks_prepared_classes() {
    let vm = FakeVm::new();
    vm.load("LA;");
    vm.load("LB;");
    vm.load("LC;");

    let mut tracker = vm.tracker();
    tracker.initialize().unwrap();

    assert!(tracker.is_initialized());
    assert_eq!(tracked_set(&tracker), set_of(&["LA;", "LB;", "LC;"]));

    let tags: HashSet<Tag> = tracker.tracked().map(|class| class.tag()).collect();
    assert_eq!(tags.len(), 3);
}

#[test]
fn test_initialize_filters_by_status() {
    let vm = FakeVm::new();
    vm.load("LPrepared;");
    vm.load_with_status("[I", ClassStatus::ARRAY);
    vm.load_with_status("LLoading;", ClassStatus::empty());
    vm.load_with_status("LVerified;", ClassStatus::VERIFIED);
    vm.load_with_status("I", ClassStatus::PRIMITIVE);

    let mut tracker = vm.tracker();
    tracker.initialize().unwrap();

    assert_eq!(tracked_set(&tracker), set_of(&["LPrepared;", "[I"]));
}

#[test]
fn test_initialize_respects_configured_mask() {
    let vm = FakeVm::new();
    vm.load("LPrepared;");
    vm.load_with_status("LVerified;", ClassStatus::VERIFIED);

    let config = TrackerConfig::default().with_wanted_status(ClassStatus::VERIFIED);
    let mut tracker = vm.tracker_with(config);
    tracker.initialize().unwrap();

    // "LPrepared;" is VERIFIED | PREPARED, so it matches too.
    assert_eq!(tracked_set(&tracker), set_of(&["LPrepared;", "LVerified;"]));
}

#[test]
fn test_initialize_preserves_enumeration_order() {
    let vm = FakeVm::new();
    for name in ["LA;", "LB;", "LC;"] {
        vm.load(name);
    }

    let mut tracker = vm.tracker();
    tracker.initialize().unwrap();

    // Tags follow enumeration order; iteration is most recent first.
    let order: Vec<(u64, &str)> = tracker
        .tracked()
        .map(|class| (class.tag().get(), class.signature()))
        .collect();
    assert_eq!(order, [(3, "LC;"), (2, "LB;"), (1, "LA;")]);
}

#[test]
fn test_initialize_empty_vm() {
    let vm = FakeVm::new();
    let mut tracker = vm.tracker();
    tracker.initialize().unwrap();

    assert!(tracker.is_empty());
    assert!(tracker.process_unloads().unwrap().is_empty());
}

// ============================================================================
// add_prepared_class
// ============================================================================

#[test]
fn test_incremental_tags_strictly_increase() {
    let vm = FakeVm::new();
    let mut tracker = vm.tracker();
    tracker.initialize().unwrap();

    let mut previous: Option<Tag> = None;
    let mut seen = HashSet::new();
    for i in 0..200 {
        let class = vm.load(&format!("LGen{i};"));
        let tag = tracker.add_prepared_class(&class).unwrap();
        if let Some(previous) = previous {
            assert!(tag > previous);
        }
        assert!(seen.insert(tag));
        previous = Some(tag);
    }

    assert_eq!(tracker.len(), 200);
    assert_eq!(tracker.last_tag(), previous);
}

#[test]
fn test_added_class_is_looked_up_by_tag() {
    let vm = FakeVm::new();
    let mut tracker = vm.tracker();
    tracker.initialize().unwrap();

    let class = vm.load("Ljava/lang/Thread;");
    let tag = tracker.add_prepared_class(&class).unwrap();

    assert!(tracker.is_tracked(tag));
    assert_eq!(tracker.signature(tag), Some("Ljava/lang/Thread;"));
}

// ============================================================================
// process_unloads
// ============================================================================

#[test]
fn test_unloaded_class_is_reported_once() {
    let vm = FakeVm::new();
    vm.load("LA;");
    let b = vm.load("LB;");
    vm.load("LC;");

    let mut tracker = vm.tracker();
    tracker.initialize().unwrap();

    vm.unload(b);
    let unloaded = tracker.process_unloads().unwrap();

    assert_eq!(unloaded.as_set(), HashSet::from(["LB;"]));
    assert_eq!(tracked_set(&tracker), set_of(&["LA;", "LC;"]));

    // Already removed: a second pass has nothing to report.
    assert!(tracker.process_unloads().unwrap().is_empty());
}

#[test]
fn test_pass_without_unloads_is_idempotent() {
    let vm = FakeVm::new();
    vm.load("LA;");
    vm.load("LB;");

    let mut tracker = vm.tracker();
    tracker.initialize().unwrap();
    let before = tracked_set(&tracker);

    for _ in 0..3 {
        assert!(tracker.process_unloads().unwrap().is_empty());
        assert_eq!(tracked_set(&tracker), before);
    }
}

#[test]
fn test_new_live_class_is_not_reported() {
    let vm = FakeVm::new();
    vm.load("LA;");

    let mut tracker = vm.tracker();
    tracker.initialize().unwrap();

    let d = vm.load("LD;");
    let tag = tracker.add_prepared_class(&d).unwrap();

    assert!(tracker.process_unloads().unwrap().is_empty());
    assert!(tracker.is_tracked(tag));
}

#[test]
fn test_unload_many_compares_as_set() {
    let vm = FakeVm::new();
    let classes: Vec<_> = (0..20).map(|i| vm.load(&format!("LK{i};"))).collect();

    let mut tracker = vm.tracker();
    tracker.initialize().unwrap();

    let mut expected = HashSet::new();
    for (i, class) in classes.iter().enumerate() {
        if i % 3 == 0 {
            vm.unload(*class);
            expected.insert(format!("LK{i};"));
        }
    }

    let unloaded: HashSet<String> = tracker.process_unloads().unwrap().into_iter().collect();
    assert_eq!(unloaded, expected);
    assert_eq!(tracker.len(), 20 - expected.len());
}

#[test]
fn test_unload_everything() {
    let vm = FakeVm::new();
    let a = vm.load("LA;");
    let b = vm.load("[LA;");

    let mut tracker = vm.tracker();
    tracker.initialize().unwrap();
    vm.unload(a);
    vm.unload(b);

    let unloaded = tracker.process_unloads().unwrap();
    assert_eq!(unloaded.len(), 2);
    assert!(tracker.is_empty());
}

#[test]
fn test_one_query_per_tracked_class() {
    let vm = FakeVm::new();
    for i in 0..5 {
        vm.load(&format!("LQ{i};"));
    }

    let mut tracker = vm.tracker();
    tracker.initialize().unwrap();
    tracker.process_unloads().unwrap();

    assert_eq!(vm.live_queries(), 5);
}

#[test]
fn test_metrics_follow_passes() {
    let vm = FakeVm::new();
    let a = vm.load("LA;");
    vm.load("LB;");

    let mut tracker = vm.tracker();
    tracker.initialize().unwrap();
    vm.unload(a);
    tracker.process_unloads().unwrap();
    tracker.process_unloads().unwrap();

    let metrics = tracker.metrics();
    assert_eq!(metrics.classes_tracked, 1);
    assert_eq!(metrics.tags_allocated, 2);
    assert_eq!(metrics.unload_passes, 2);
    assert_eq!(metrics.total_unloaded, 1);
    assert_eq!(metrics.last_pass.examined, 1);
    assert_eq!(metrics.last_pass.unloaded, 0);
}

#[test]
fn test_output_capacity_is_configurable() {
    let vm = FakeVm::new();
    vm.load("LA;");

    let mut tracker = vm.tracker_with(TrackerConfig::default().with_output_capacity(64));
    tracker.initialize().unwrap();

    let unloaded = tracker.process_unloads().unwrap();
    assert!(unloaded.is_empty());
    assert!(unloaded.capacity() >= 64);
}

#[test]
fn test_output_capacity_defaults_to_ten() {
    let vm = FakeVm::new();
    let mut tracker = vm.tracker();
    tracker.initialize().unwrap();

    let unloaded = tracker.process_unloads().unwrap();
    assert!(unloaded.capacity() >= DEFAULT_OUTPUT_CAPACITY);
}
