/// Tests for deferred resource reclamation

use super::*;
use crate::backend::MockGlBackend;
use std::sync::Arc;
use std::thread;

fn mesh(vbo: BufferId, ibo: Option<BufferId>) -> MeshBuffers {
    MeshBuffers {
        vbo,
        ibo,
        vertex_count: 3,
        index_count: 0,
    }
}

// ============================================================================
// Tests: Enqueue and Counts
// ============================================================================

#[test]
fn test_new_manager_has_nothing_pending() {
    let rm = ResourceManager::new();
    assert!(!rm.has_pending());
}

#[test]
fn test_enqueue_updates_counts() {
    let rm = ResourceManager::new();
    rm.enqueue_mesh(mesh(1, None));
    rm.enqueue_shader(2);
    rm.enqueue_texture(3);
    rm.enqueue_framebuffer(4);
    rm.enqueue_renderbuffer(5);

    assert_eq!(rm.pending_meshes(), 1);
    assert_eq!(rm.pending_shaders(), 1);
    assert_eq!(rm.pending_textures(), 1);
    assert_eq!(rm.pending_framebuffers(), 1);
    assert_eq!(rm.pending_renderbuffers(), 1);
    assert!(rm.has_pending());
}

// ============================================================================
// Tests: Reclaim
// ============================================================================

#[test]
fn test_reclaim_empties_all_lists() {
    let rm = ResourceManager::new();
    let mock = MockGlBackend::new();
    rm.enqueue_mesh(mesh(1, Some(2)));
    rm.enqueue_texture(3);

    rm.reclaim(&mock);
    assert!(!rm.has_pending());
}

#[test]
fn test_reclaim_batches_deletes_per_kind() {
    let rm = ResourceManager::new();
    let mock = MockGlBackend::new();
    rm.enqueue_texture(10);
    rm.enqueue_texture(11);
    rm.enqueue_texture(12);
    rm.enqueue_mesh(mesh(1, Some(2)));
    rm.enqueue_mesh(mesh(3, None));

    rm.reclaim(&mock);

    // One batched delete per kind, regardless of handle count.
    assert_eq!(mock.call_count("delete_textures"), 1);
    assert_eq!(mock.call_count("delete_buffers"), 1);
    assert!(mock.calls().contains(&"delete_textures([10, 11, 12])".to_string()));
    assert!(mock.calls().contains(&"delete_buffers([1, 2, 3])".to_string()));
}

#[test]
fn test_reclaim_flushes_once_after_deleting() {
    let rm = ResourceManager::new();
    let mock = MockGlBackend::new();
    rm.enqueue_shader(42);

    rm.reclaim(&mock);

    let calls = mock.calls();
    assert_eq!(calls.last().unwrap(), "flush");
    assert_eq!(mock.call_count("flush"), 1);
}

#[test]
fn test_reclaim_with_nothing_pending_does_not_flush() {
    let rm = ResourceManager::new();
    let mock = MockGlBackend::new();
    rm.reclaim(&mock);
    assert!(mock.calls().is_empty());
}

// ============================================================================
// Tests: Concurrent Enqueue
// ============================================================================

#[test]
fn test_enqueue_from_many_threads() {
    let rm = Arc::new(ResourceManager::new());
    let handles: Vec<_> = (0..4)
        .map(|t| {
            let rm = rm.clone();
            thread::spawn(move || {
                for i in 0..50 {
                    rm.enqueue_texture(t * 100 + i);
                }
            })
        })
        .collect();
    for h in handles {
        h.join().unwrap();
    }

    assert_eq!(rm.pending_textures(), 200);
    let mock = MockGlBackend::new();
    rm.reclaim(&mock);
    assert_eq!(mock.call_count("delete_textures"), 1);
    assert_eq!(rm.pending_textures(), 0);
}
