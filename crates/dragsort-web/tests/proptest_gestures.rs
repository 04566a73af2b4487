//! Property tests: arbitrary gesture paths through the headless host.
//!
//! 1. The list ends up where the pointer-following model says it should
//! 2. Rendered labels always match the list
//! 3. No element keeps the target class once the gesture is over
//! 4. Attach/detach cycles return the listener count to baseline

use std::rc::Rc;

use dragsort_core::{DEFAULT_TARGET_CLASS, GroupId, SortableConfig};
use dragsort_runtime::ObservableList;
use dragsort_web::{Gesture, HeadlessDocument, ListView, Sortable, ViewRegistry};
use proptest::prelude::*;

/// Each enter over slot `t` drags the item at `source` to `t`.
fn follow_pointer(mut items: Vec<u32>, mut source: usize, path: &[usize]) -> Vec<u32> {
    for &target in path {
        if target != source {
            let item = items.remove(source);
            items.insert(target, item);
            source = target;
        }
    }
    items
}

fn list_source_path() -> impl Strategy<Value = (Vec<u32>, usize, Vec<usize>)> {
    (1usize..12).prop_flat_map(|len| {
        (
            Just((0..len as u32).collect::<Vec<_>>()),
            0..len,
            prop::collection::vec(0..len, 0..10),
        )
    })
}

proptest! {
    #[test]
    fn gesture_matches_pointer_model((items, source, path) in list_source_path(), cancel in any::<bool>()) {
        let doc = HeadlessDocument::new();
        let group = GroupId::next();
        let list = ObservableList::new(items.clone());
        let view = ListView::new(Rc::clone(&doc), list.clone(), group);
        let registry = ViewRegistry::new();
        registry.register(view.clone());
        let sortable = Sortable::with_group(group, Rc::clone(&doc), registry, SortableConfig::default());
        let _handles: Vec<_> = view.elements().iter().map(|n| sortable.attach(n)).collect();

        let nodes = view.elements();
        let mut gesture = Gesture::start(&doc, nodes[source]).expect("start");
        for &slot in &path {
            gesture.enter(nodes[slot]).expect("enter");
            let labels: Vec<String> = list.to_vec().iter().map(u32::to_string).collect();
            prop_assert_eq!(view.rendered_text(), labels);
        }
        if cancel {
            gesture.cancel().expect("cancel");
        } else {
            gesture.release().expect("release");
        }

        prop_assert_eq!(list.to_vec(), follow_pointer(items, source, &path));
        prop_assert!(!sortable.is_dragging());
        for node in nodes {
            prop_assert!(!doc.has_class(node, DEFAULT_TARGET_CLASS));
        }
    }

    #[test]
    fn attach_detach_cycles_restore_baseline(len in 1usize..8, cycles in 1usize..5) {
        let doc = HeadlessDocument::new();
        let group = GroupId::next();
        let list = ObservableList::new(0..len as u32);
        let view = ListView::new(Rc::clone(&doc), list, group);
        let registry = ViewRegistry::new();
        registry.register(view.clone());
        let sortable = Sortable::with_group(group, Rc::clone(&doc), registry, SortableConfig::default());

        let baseline = doc.total_listener_count();
        for _ in 0..cycles {
            let mut handles: Vec<_> = view.elements().iter().map(|n| sortable.attach(n)).collect();
            prop_assert!(doc.total_listener_count() > baseline);
            for handle in &mut handles {
                handle.detach();
                prop_assert_eq!(handle.detach(), 0);
            }
            prop_assert_eq!(doc.total_listener_count(), baseline);
        }
    }
}
