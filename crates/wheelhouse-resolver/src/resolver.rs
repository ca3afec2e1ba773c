//! Core resolution algorithm: depth-first, cycle-safe traversal from root
//! requirements to a deduplicated multi-target download plan.
//!
//! Greedy single-constraint resolution: the first visit of a package name
//! wins, later visits under any constraint are duplicates. No backtracking,
//! no constraint unification; every fallback is recorded for audit.

use std::collections::HashSet;
use std::sync::{Arc, Mutex, MutexGuard};

use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tracing::{debug, warn};

use wheelhouse_core::interpreter::Interpreter;
use wheelhouse_core::requirement::Requirement;
use wheelhouse_core::target::ArtifactTarget;
use wheelhouse_pypi::registry::FetchOutcome;

use crate::deps::extract_dependencies;
use crate::graph::{DepEdge, ResolutionGraph, ResolvedNode};
use crate::provider::PackageProvider;
use crate::report::{Recovery, RecoveryKind, ResolutionReport};
use crate::select::{select_artifacts, select_version};

/// Defense-in-depth against pathological metadata; the visited set already
/// breaks ordinary cycles.
pub const MAX_DEPTH: usize = 64;

/// Ceiling for the worker-pool variant.
pub const MAX_ROOT_WORKERS: usize = 5;

/// One artifact the run decided to mirror.
#[derive(Debug, Clone, Eq, PartialEq)]
pub struct PlannedDownload {
    pub name: String,
    pub version: String,
    pub url: String,
    pub filename: String,
    pub target: ArtifactTarget,
}

/// The output of a resolution run.
pub struct DownloadPlan {
    pub downloads: Vec<PlannedDownload>,
    pub graph: ResolutionGraph,
    pub report: ResolutionReport,
}

impl DownloadPlan {
    /// Downloads destined for one target, Common included.
    pub fn downloads_for(&self, target: ArtifactTarget) -> Vec<&PlannedDownload> {
        self.downloads
            .iter()
            .filter(|d| d.target == target || d.target == ArtifactTarget::Common)
            .collect()
    }
}

/// Mutable state of one run, owned by one engine invocation and never
/// persisted across runs. Synchronized for the worker-pool variant; locks
/// are never held across awaits.
#[derive(Default)]
struct RunState {
    /// Names that have entered traversal. Membership alone decides
    /// duplicates: a name is claimed before its node is processed and is
    /// never traversed again, under any constraint.
    visited: Mutex<HashSet<String>>,
    downloads: Mutex<Vec<PlannedDownload>>,
    planned: Mutex<HashSet<(String, ArtifactTarget)>>,
    graph: Mutex<ResolutionGraph>,
    report: Mutex<ResolutionReport>,
}

struct Frame {
    req: Requirement,
    /// Normalized name of the requesting package; `None` for roots.
    parent: Option<String>,
    depth: usize,
}

/// The resolution engine. One instance resolves one set of roots per call;
/// each call owns a fresh visited set.
pub struct Resolver<P> {
    provider: Arc<P>,
    interpreter: Interpreter,
}

impl<P: PackageProvider> Resolver<P> {
    pub fn new(provider: Arc<P>, interpreter: Interpreter) -> Self {
        Self {
            provider,
            interpreter,
        }
    }

    /// Resolve all roots depth-first, in declared order.
    pub async fn resolve(&self, roots: &[Requirement]) -> DownloadPlan {
        let state = RunState::default();
        for root in roots {
            self.resolve_subtree(root, &state).await;
        }
        finish(state)
    }

    /// Worker-pool variant: each root subtree resolves independently under
    /// a bounded number of workers. The shared visited set keeps the
    /// once-per-name invariant across workers.
    pub async fn resolve_parallel(&self, roots: &[Requirement], jobs: usize) -> DownloadPlan {
        let jobs = jobs.clamp(1, MAX_ROOT_WORKERS);
        if jobs == 1 || roots.len() <= 1 {
            return self.resolve(roots).await;
        }

        let state = Arc::new(RunState::default());
        let semaphore = Arc::new(Semaphore::new(jobs));
        let mut join_set = JoinSet::new();

        for root in roots.iter().cloned() {
            let worker = Resolver {
                provider: self.provider.clone(),
                interpreter: self.interpreter,
            };
            let state = state.clone();
            let semaphore = semaphore.clone();
            join_set.spawn(async move {
                let _permit = semaphore.acquire().await;
                worker.resolve_subtree(&root, &state).await;
            });
        }
        while join_set.join_next().await.is_some() {}

        match Arc::try_unwrap(state) {
            Ok(state) => finish(state),
            // All workers joined, so this branch is unreachable in
            // practice; drain through the locks to stay panic-free.
            Err(state) => DownloadPlan {
                downloads: std::mem::take(&mut *lock(&state.downloads)),
                graph: std::mem::take(&mut *lock(&state.graph)),
                report: std::mem::take(&mut *lock(&state.report)),
            },
        }
    }

    /// Depth-first traversal of one root subtree over an explicit stack.
    async fn resolve_subtree(&self, root: &Requirement, state: &RunState) {
        let mut stack = vec![Frame {
            req: root.clone(),
            parent: None,
            depth: 0,
        }];

        while let Some(frame) = stack.pop() {
            let name = frame.req.normalized_name();

            if frame.depth > MAX_DEPTH {
                warn!(package = %name, depth = frame.depth, "depth guard tripped, skipping subtree");
                lock(&state.report).add(Recovery {
                    package: name,
                    constraint: frame.req.constraint.clone(),
                    kind: RecoveryKind::DepthLimit,
                    detail: format!("depth {} exceeds {MAX_DEPTH}", frame.depth),
                });
                continue;
            }

            // Atomic check-and-insert: a name is claimed at most once per
            // run. A later visit, even under a different constraint, is a
            // duplicate; only the edge is recorded.
            if !lock(&state.visited).insert(name.clone()) {
                debug!(package = %name, constraint = ?frame.req.constraint, "already visited, skipping");
                self.link_existing(&name, &frame, state);
                continue;
            }

            self.resolve_node(&name, &frame, state, &mut stack).await;
        }
    }

    /// Process one package: fetch, select version and artifacts, record
    /// the plan, extract children. Pushes children onto `stack` in reverse
    /// so the first declared child is traversed next.
    async fn resolve_node(
        &self,
        name: &str,
        frame: &Frame,
        state: &RunState,
        stack: &mut Vec<Frame>,
    ) {
        let index = match self.provider.project(name).await {
            FetchOutcome::Found(index) => index,
            FetchOutcome::NotFound => {
                warn!(package = %name, constraint = ?frame.req.constraint, "package not found in registry");
                self.record_unresolved(name, frame, state, RecoveryKind::NotFound, String::new());
                return;
            }
            FetchOutcome::NetworkError(detail) => {
                warn!(package = %name, constraint = ?frame.req.constraint, error = %detail, "registry fetch failed");
                self.record_unresolved(name, frame, state, RecoveryKind::NetworkError, detail);
                return;
            }
        };

        let selected = match select_version(frame.req.constraint.as_deref(), index.versions()) {
            Ok(selected) => selected,
            Err(_) => {
                warn!(package = %name, "no versions available");
                self.record_unresolved(
                    name,
                    frame,
                    state,
                    RecoveryKind::NoVersionsAvailable,
                    String::new(),
                );
                return;
            }
        };
        let version = selected.version.original.clone();

        if selected.substituted {
            let constraint = frame.req.constraint.clone().unwrap_or_default();
            warn!(
                package = %name,
                constraint = %constraint,
                substituted = %version,
                "constraint unsatisfiable or unparsable, substituting maximum version"
            );
            lock(&state.report).add(Recovery {
                package: name.to_string(),
                constraint: frame.req.constraint.clone(),
                kind: RecoveryKind::SubstitutedVersion,
                detail: format!("using {version}"),
            });
        }

        self.record_node(name, &version, frame, state);

        let artifacts = select_artifacts(index.artifacts(&version), &self.interpreter);
        if artifacts.is_empty() {
            warn!(package = %name, version = %version, "no compatible artifact for targets");
            lock(&state.report).add(Recovery {
                package: name.to_string(),
                constraint: frame.req.constraint.clone(),
                kind: RecoveryKind::NoCompatibleArtifact,
                detail: format!("version {version}"),
            });
        } else {
            let mut planned = lock(&state.planned);
            let mut downloads = lock(&state.downloads);
            for artifact in &artifacts {
                if planned.insert((artifact.filename.clone(), artifact.target)) {
                    downloads.push(PlannedDownload {
                        name: name.to_string(),
                        version: version.clone(),
                        url: artifact.url.clone(),
                        filename: artifact.filename.clone(),
                        target: artifact.target,
                    });
                }
            }
        }

        let (children, malformed) =
            extract_dependencies(&*self.provider, &index, &version, &artifacts, &self.interpreter)
                .await;
        for entry in malformed {
            lock(&state.report).add(Recovery {
                package: name.to_string(),
                constraint: None,
                kind: RecoveryKind::MalformedEntry,
                detail: entry,
            });
        }
        debug!(package = %name, version = %version, children = children.len(), "resolved");

        for child in children.into_iter().rev() {
            stack.push(Frame {
                req: child,
                parent: Some(name.to_string()),
                depth: frame.depth + 1,
            });
        }
    }

    /// Record a resolved node in the graph, with its requesting edge.
    fn record_node(&self, name: &str, version: &str, frame: &Frame, state: &RunState) {
        let mut graph = lock(&state.graph);
        let idx = graph.add_node(ResolvedNode {
            name: name.to_string(),
            version: version.to_string(),
        });
        match &frame.parent {
            Some(parent) => {
                if let Some(parent_idx) = graph.find(parent) {
                    graph.add_edge(
                        parent_idx,
                        idx,
                        DepEdge {
                            requested: frame.req.constraint.clone(),
                        },
                    );
                }
            }
            None => graph.add_root(idx),
        }
    }

    /// Record a package that yielded nothing, keeping it visible in the
    /// graph as version `?`.
    fn record_unresolved(
        &self,
        name: &str,
        frame: &Frame,
        state: &RunState,
        kind: RecoveryKind,
        detail: String,
    ) {
        self.record_node(name, "?", frame, state);
        lock(&state.report).add(Recovery {
            package: name.to_string(),
            constraint: frame.req.constraint.clone(),
            kind,
            detail,
        });
    }

    /// Add the requesting edge for a duplicate visit of `name`.
    fn link_existing(&self, name: &str, frame: &Frame, state: &RunState) {
        let mut graph = lock(&state.graph);
        if let Some(idx) = graph.find(name) {
            match &frame.parent {
                Some(parent) => {
                    if let Some(parent_idx) = graph.find(parent) {
                        graph.add_edge(
                            parent_idx,
                            idx,
                            DepEdge {
                                requested: frame.req.constraint.clone(),
                            },
                        );
                    }
                }
                None => graph.add_root(idx),
            }
        }
    }
}

fn finish(state: RunState) -> DownloadPlan {
    DownloadPlan {
        downloads: into_inner(state.downloads),
        graph: into_inner(state.graph),
        report: into_inner(state.report),
    }
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

fn into_inner<T>(mutex: Mutex<T>) -> T {
    mutex
        .into_inner()
        .unwrap_or_else(|poisoned| poisoned.into_inner())
}
