//! Replays a [`Scenario`] against a [`HeadlessDocument`].

use std::collections::BTreeMap;
use std::rc::Rc;

use dragsort_core::{GroupId, SortableConfig, SortableError};
use dragsort_runtime::ObservableList;
use dragsort_web::{
    AttachmentHandle, Gesture, HeadlessDocument, ListView, NodeId, Sortable, ViewRegistry,
};
use serde::Serialize;
use tracing::{debug, info, info_span};

use crate::error::{HarnessError, Result};
use crate::scenario::{DragStep, Scenario, Step};

type Registry = ViewRegistry<String>;
type HarnessSortable = Sortable<HeadlessDocument, Rc<Registry>>;

/// What happened to one step.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum StepResult {
    Dropped,
    Cancelled,
    /// The drag never started: the source is not a list member.
    Rejected { error: String },
    /// The drag never started: a `dragstart` listener cancelled it.
    StartCancelled { error: String },
    Pushed,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StepReport {
    pub step: usize,
    #[serde(flatten)]
    pub result: StepResult,
}

/// Final state after all steps.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Outcome {
    pub lists: BTreeMap<String, Vec<String>>,
    /// Element labels per list, in slot order.
    pub rendered: BTreeMap<String, Vec<String>>,
    pub steps: Vec<StepReport>,
}

/// One list whose final order disagrees with the scenario.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Mismatch {
    pub list: String,
    pub expected: Vec<String>,
    pub actual: Vec<String>,
}

impl Outcome {
    /// Compare against `expect`. Lists not named there are not checked.
    #[must_use]
    pub fn mismatches(&self, expect: &BTreeMap<String, Vec<String>>) -> Vec<Mismatch> {
        expect
            .iter()
            .filter_map(|(list, expected)| {
                let actual = self.lists.get(list).cloned().unwrap_or_default();
                (actual != *expected).then(|| Mismatch {
                    list: list.clone(),
                    expected: expected.clone(),
                    actual,
                })
            })
            .collect()
    }
}

struct ListEntry {
    list: ObservableList<String>,
    view: ListView<String>,
    group: usize,
}

impl ListEntry {
    fn node(&self, name: &str, index: usize) -> Result<NodeId> {
        self.view
            .element(index)
            .ok_or_else(|| HarnessError::UnknownElement {
                list: name.to_owned(),
                index,
            })
    }
}

/// Live headless session built from a scenario.
pub struct Replay {
    doc: Rc<HeadlessDocument>,
    lists: BTreeMap<String, ListEntry>,
    scalars: BTreeMap<String, NodeId>,
    sortables: Vec<HarnessSortable>,
    handles: Vec<AttachmentHandle<HeadlessDocument>>,
}

impl Replay {
    /// Build lists, views and groups, and attach every element.
    pub fn new(scenario: &Scenario, config: &SortableConfig) -> Result<Self> {
        scenario.validate()?;
        let doc = HeadlessDocument::new();
        let registry = Rc::new(Registry::new());
        let assignment = scenario.group_assignment();
        let group_count = assignment.values().max().map_or(0, |max| max + 1);

        let sortables: Vec<HarnessSortable> = (0..group_count)
            .map(|_| Sortable::new(Rc::clone(&doc), Rc::clone(&registry), config.clone()))
            .collect();

        let mut replay = Self {
            doc,
            lists: BTreeMap::new(),
            scalars: BTreeMap::new(),
            sortables,
            handles: Vec::new(),
        };

        for (name, items) in &scenario.lists {
            let group = assignment
                .get(name.as_str())
                .copied()
                .ok_or_else(|| HarnessError::UnknownList(name.clone()))?;
            let owner = replay.sortables[group].group_id();
            let list = ObservableList::new(items.iter().cloned());
            let view = ListView::new(Rc::clone(&replay.doc), list.clone(), owner);
            registry.register(view.clone());
            replay.attach_all(group, &view.elements());
            replay.lists.insert(name.clone(), ListEntry { list, view, group });
        }

        for (scalar, owner_list) in &scenario.scalars {
            let group = replay.entry(owner_list)?.group;
            let owner: GroupId = replay.sortables[group].group_id();
            let node = replay.doc.create_element();
            registry.bind_scalar(node, scalar.clone(), owner);
            replay.attach_all(group, &[node]);
            replay.scalars.insert(scalar.clone(), node);
        }

        info!(
            lists = replay.lists.len(),
            groups = group_count,
            listeners = replay.doc.total_listener_count(),
            "scenario mounted"
        );
        Ok(replay)
    }

    fn attach_all(&mut self, group: usize, nodes: &[NodeId]) {
        let sortable = &self.sortables[group];
        self.handles
            .extend(nodes.iter().map(|node| sortable.attach(node)));
    }

    fn entry(&self, name: &str) -> Result<&ListEntry> {
        self.lists
            .get(name)
            .ok_or_else(|| HarnessError::UnknownList(name.to_owned()))
    }

    #[must_use]
    pub fn document(&self) -> &HeadlessDocument {
        &self.doc
    }

    /// Run one step. Rejected drag starts are reported, not returned as
    /// errors.
    pub fn step(&mut self, index: usize, step: &Step) -> Result<StepReport> {
        let _span = info_span!("dragsort.step", step = index).entered();
        let result = match step {
            Step::Drag(drag) => self.drag(drag)?,
            Step::DragScalar { scalar } => {
                let node = self
                    .scalars
                    .get(scalar)
                    .copied()
                    .ok_or_else(|| HarnessError::UnknownScalar(scalar.clone()))?;
                self.gesture(node, &[], true)?
            }
            Step::Push { list, item } => {
                let entry = self.entry(list)?;
                entry.list.push(item.clone());
                let mounted = entry.view.take_mounted();
                let group = entry.group;
                self.attach_all(group, &mounted);
                StepResult::Pushed
            }
        };
        debug!(?result, "step finished");
        Ok(StepReport {
            step: index,
            result,
        })
    }

    fn drag(&self, drag: &DragStep) -> Result<StepResult> {
        let source = self.entry(&drag.list)?.node(&drag.list, drag.from)?;
        let target_list = drag.target_list();
        let targets = self.entry(target_list)?;
        let targets = drag
            .over
            .iter()
            .map(|&slot| targets.node(target_list, slot))
            .collect::<Result<Vec<_>>>()?;
        self.gesture(source, &targets, drag.drop)
    }

    fn gesture(&self, source: NodeId, targets: &[NodeId], drop: bool) -> Result<StepResult> {
        let mut gesture = match Gesture::start(&self.doc, source) {
            Ok(gesture) => gesture,
            Err(err @ SortableError::InvalidBinding { .. }) => {
                return Ok(StepResult::Rejected {
                    error: err.to_string(),
                });
            }
            Err(err @ SortableError::DragCancelled { .. }) => {
                return Ok(StepResult::StartCancelled {
                    error: err.to_string(),
                });
            }
            Err(err) => return Err(err.into()),
        };
        for &target in targets {
            gesture.enter(target)?;
        }
        if drop {
            gesture.release()?;
            Ok(StepResult::Dropped)
        } else {
            gesture.cancel()?;
            Ok(StepResult::Cancelled)
        }
    }

    /// Current order and labels of every list.
    #[must_use]
    pub fn snapshot(&self, steps: Vec<StepReport>) -> Outcome {
        let lists = self
            .lists
            .iter()
            .map(|(name, entry)| (name.clone(), entry.list.to_vec()))
            .collect();
        let rendered = self
            .lists
            .iter()
            .map(|(name, entry)| (name.clone(), entry.view.rendered_text()))
            .collect();
        Outcome {
            lists,
            rendered,
            steps,
        }
    }

    /// Detach every element, returning how many listeners were removed.
    pub fn teardown(&mut self) -> usize {
        self.handles.iter_mut().map(AttachmentHandle::detach).sum()
    }
}

/// Run every step of `scenario` with `config` and return the outcome.
pub fn run_scenario(scenario: &Scenario, config: &SortableConfig) -> Result<Outcome> {
    let mut replay = Replay::new(scenario, config)?;
    let steps = scenario
        .steps
        .iter()
        .enumerate()
        .map(|(index, step)| replay.step(index + 1, step))
        .collect::<Result<Vec<_>>>()?;
    let outcome = replay.snapshot(steps);
    replay.teardown();
    Ok(outcome)
}
