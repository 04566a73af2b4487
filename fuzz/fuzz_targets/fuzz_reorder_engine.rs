#![no_main]

use arbitrary::Arbitrary;
use dragsort_core::{
    Binding, DataTransfer, EnterOutcome, GroupId, ReorderEngine, SessionPolicy, SpliceCollection,
};
use dragsort_runtime::ObservableList;
use libfuzzer_sys::fuzz_target;

#[derive(Debug, Arbitrary)]
enum Op {
    Start { list: bool, index: u8, foreign: bool },
    StartDetached,
    Enter { list: bool, index: u8, foreign: bool },
    End,
    /// Shrink a list behind the engine's back.
    Pop { list: bool },
    Reset,
}

#[derive(Debug, Arbitrary)]
struct Input {
    retain: bool,
    left_len: u8,
    right_len: u8,
    ops: Vec<Op>,
}

const OWNER: GroupId = GroupId::from_raw(1);
const FOREIGN: GroupId = GroupId::from_raw(2);

fn sorted(list: &ObservableList<u16>) -> Vec<u16> {
    let mut items = list.to_vec();
    items.sort_unstable();
    items
}

fuzz_target!(|input: Input| {
    let left = ObservableList::new(0..u16::from(input.left_len % 32));
    let right = ObservableList::new(100..100 + u16::from(input.right_len % 32));
    let policy = if input.retain {
        SessionPolicy::Retain
    } else {
        SessionPolicy::ClearOnEnd
    };
    let mut engine: ReorderEngine<ObservableList<u16>> = ReorderEngine::new(policy);
    let mut transfer = DataTransfer::new();

    for op in input.ops.into_iter().take(256) {
        let pick = |list: bool| if list { &right } else { &left };
        let owner = |foreign: bool| if foreign { FOREIGN } else { OWNER };
        let before = (sorted(&left), sorted(&right));

        match op {
            Op::Start { list, index, foreign } => {
                let target = pick(list);
                let index = usize::from(index);
                let result = engine.drag_start(
                    Binding::member(target.clone(), index, owner(foreign)),
                    &mut transfer,
                );
                assert_eq!(result.is_ok(), index < target.len());
                if result.is_ok() {
                    assert!(transfer.has_drag_marker());
                }
            }
            Op::StartDetached => {
                let active = engine.is_active();
                let err = engine
                    .drag_start(Binding::detached("scalar", OWNER), &mut transfer)
                    .expect_err("detached bindings never start a drag");
                assert!(err.is_invalid_binding());
                assert_eq!(engine.is_active(), active);
            }
            Op::Enter { list, index, foreign } => {
                let target = pick(list);
                let session = engine
                    .session()
                    .map(|s| (s.collection().collection_id(), s.owner()));
                let outcome = engine.drag_enter(Binding::member(
                    target.clone(),
                    usize::from(index),
                    owner(foreign),
                ));
                if let EnterOutcome::Moved { to, .. } = outcome {
                    let (collection, session_owner) = session.expect("moves need a session");
                    assert_eq!(collection, target.collection_id());
                    assert_eq!(session_owner, owner(foreign));
                    assert!(to < target.len());
                    assert_eq!(engine.session().map(|s| s.source_position()), Some(to));
                }
            }
            Op::End => {
                engine.drag_end();
                if !input.retain {
                    assert!(!engine.is_active());
                }
            }
            Op::Pop { list } => {
                let target = pick(list);
                if !target.is_empty() {
                    target.splice(target.len() - 1, 1, Vec::new());
                }
                continue;
            }
            Op::Reset => engine.reset(),
        }

        // Reordering preserves the items of each list.
        assert_eq!((sorted(&left), sorted(&right)), before);
    }
});
