// Handle issuing and root context construction

mod common;

use std::sync::Arc;
use std::time::Duration;

use common::*;
use statetree_core::types::{ContentId, NodePath};
use statetree_core::{StateTreeError, StateTreeKey, StateTreeService};
use statetree_error::{codes, ErrorMessage};

#[test]
fn test_identical_requests_share_a_handle() {
    let (capture, _) = capture();
    let service = StateTreeService::new(capture);

    let a = service.state_tree(after(0), 10).unwrap();
    let b = service.state_tree(after(0), 10).unwrap();
    assert_eq!(a, b);
    assert_eq!(a.id, StateTreeKey::new(after(0), 10).id().unwrap());

    assert_ne!(a, service.state_tree(after(0), 20).unwrap());
    assert_ne!(a, service.state_tree(after(2), 10).unwrap());
    assert!(a.root().indices.is_empty());
}

#[test]
fn test_sub_commands_are_unsupported() {
    let (capture, _) = capture();
    let service = StateTreeService::new(capture);

    let err = service.state_tree(after(0).sub_command(3), 10).unwrap_err();
    assert!(matches!(err, StateTreeError::Unsupported(_)));
    assert_eq!(err.to_string(), "Unsupported: sub-command state trees");
    assert_eq!(ErrorMessage::from_error(&err).code, codes::UNSUPPORTED);
}

#[tokio::test]
async fn test_root_is_built_lazily() {
    let (capture, _) = capture();
    let service = StateTreeService::new(capture.clone());

    let tree = service.state_tree(after(0), 10).unwrap();
    assert_eq!(capture.state_loads(), 0);
    assert_eq!(service.cached_roots(), 0);

    service.state_tree_node(&tree.root()).await.unwrap();
    service.state_tree_node(&tree.root().child(BUFFERS)).await.unwrap();
    assert_eq!(capture.state_loads(), 1);
    assert_eq!(service.cached_roots(), 1);
}

#[tokio::test]
async fn test_unknown_tree() {
    let (capture, _) = capture();
    let service = StateTreeService::new(capture);

    let id = ContentId::from_bytes(b"never issued");
    let err = service.state_tree_node(&NodePath::root(id)).await.unwrap_err();
    assert!(matches!(err, StateTreeError::UnknownTree(unknown) if unknown == id));
}

#[tokio::test]
async fn test_command_out_of_range() {
    let (capture, _) = capture();
    let service = StateTreeService::new(capture.clone());

    let tree = service.state_tree(after(5), 10).unwrap();
    let err = service.state_tree_node(&tree.root()).await.unwrap_err();
    assert!(matches!(err, StateTreeError::CommandOutOfRange { index: 5, count: 3 }));
    assert_eq!(capture.state_loads(), 0);
}

#[tokio::test]
async fn test_missing_api_state() {
    let (capture, _) = capture();
    let service = StateTreeService::new(capture);

    let tree = service.state_tree(after(2), 10).unwrap();
    let err = service.state_tree_node(&tree.root()).await.unwrap_err();
    assert!(matches!(err, StateTreeError::ApiStateMissing { api } if api == VULKAN));
}

#[tokio::test]
async fn test_capture_failures_are_not_cached() {
    let (capture, _) = capture();
    let service = StateTreeService::new(capture.clone());

    // No state is recorded after command 1
    let tree = service.state_tree(after(1), 10).unwrap();
    for attempt in 1..=2 {
        let err = service.state_tree_node(&tree.root()).await.unwrap_err();
        assert!(matches!(err, StateTreeError::Upstream(_)));
        assert!(err.to_string().contains("No state recorded"), "{}", err);
        assert_eq!(capture.state_loads(), attempt);
    }
    assert_eq!(service.cached_roots(), 0);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_first_requests_build_one_root() {
    let (capture, _) = capture_with_delay(Some(Duration::from_millis(50)));
    let service = Arc::new(StateTreeService::new(capture.clone()));
    let tree = service.state_tree(after(0), 10).unwrap();

    let mut handles = Vec::new();
    for i in 0..16u64 {
        let service = Arc::clone(&service);
        handles.push(tokio::spawn(async move {
            let node = service
                .state_tree_node(&tree.root().child(i % VISIBLE_FIELDS))
                .await
                .unwrap();
            let root = service.root_context(tree.id).await.unwrap();
            (node.name, root)
        }));
    }

    let results: Vec<_> = futures::future::try_join_all(handles).await.unwrap();
    assert_eq!(capture.state_loads(), 1);
    assert_eq!(service.cached_roots(), 1);
    let first = &results[0].1;
    assert!(results.iter().all(|(_, root)| Arc::ptr_eq(root, first)));
    assert_eq!(results[0].0, "Contexts");
}

#[tokio::test]
async fn test_cancelled_construction_is_retried() {
    let (capture, _) = capture_with_delay(Some(Duration::from_millis(200)));
    let service = Arc::new(StateTreeService::new(capture.clone()));
    let tree = service.state_tree(after(0), 10).unwrap();

    let pending = {
        let service = Arc::clone(&service);
        tokio::spawn(async move { service.state_tree_node(&tree.root()).await })
    };
    tokio::time::sleep(Duration::from_millis(20)).await;
    pending.abort();
    assert!(pending.await.unwrap_err().is_cancelled());
    assert_eq!(service.cached_roots(), 0);

    let root = service.state_tree_node(&tree.root()).await.unwrap();
    assert_eq!(root.num_children, VISIBLE_FIELDS);
    assert_eq!(capture.state_loads(), 2);
    assert_eq!(service.cached_roots(), 1);
}

#[tokio::test]
async fn test_roots_are_per_group_limit() {
    let (capture, _) = capture();
    let service = StateTreeService::new(capture.clone());

    let grouped = service.state_tree(after(0), 10).unwrap();
    let flat = service.state_tree(after(0), 0).unwrap();

    let a = service.root_context(grouped.id).await.unwrap();
    let b = service.root_context(flat.id).await.unwrap();
    assert!(!Arc::ptr_eq(&a, &b));
    assert_eq!(a.group_limit(), 10);
    assert_eq!(b.group_limit(), 0);
    assert_eq!(a.api(), GLES);
    assert_eq!(service.cached_roots(), 2);
}

#[tokio::test]
async fn test_out_of_bounds_report() {
    let (capture, _) = capture();
    let service = StateTreeService::new(capture);
    let tree = service.state_tree(after(0), 10).unwrap();

    let err = service
        .state_tree_node(&NodePath::new(tree.id, vec![CONTEXTS, 5]))
        .await
        .unwrap_err();
    let report = ErrorMessage::from_error(&err);
    assert_eq!(report.kind, "INDEX_OUT_OF_BOUNDS");
    assert!(report.message.starts_with("Index 5 out of bounds [0, 2] at "), "{}", report.message);
    let details = report.details.unwrap();
    assert_eq!(details["first"], 0);
    assert_eq!(details["last"], 2);
}
