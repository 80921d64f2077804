//! Project dependency graph.
//!
//! Projects are declared in a fixed list; edges come from the include and
//! link dependencies each project names. The graph is ordered into *waves*:
//! every project in a wave depends only on projects of earlier waves, so a
//! wave can be built in parallel once the previous one has joined. Ties keep
//! declaration order, which makes the flattened order deterministic.

use super::link::Artifact;
use crate::layout::PathLayout;
use crate::platform::ArtifactKind;
use std::collections::HashSet;
use std::fmt;
use std::path::PathBuf;

/// Declarative description of one project, resolved against a layout.
#[derive(Debug, Clone, Copy)]
pub struct ProjectSpec {
    pub name: &'static str,
    /// Projects whose `include/` directory this one compiles against
    pub include_from: &'static [&'static str],
    /// Projects whose objects are linked into this one's artifact, ahead of its own
    pub link_with: &'static [&'static str],
    pub artifact: Option<(ArtifactKind, &'static str)>,
}

/// The NEAC build: two libraries, the `neac` executable and the DLL.
pub const NEAC_PROJECTS: &[ProjectSpec] = &[
    ProjectSpec {
        name: "libneac",
        include_from: &[],
        link_with: &[],
        artifact: None,
    },
    ProjectSpec {
        name: "libwavefile",
        include_from: &[],
        link_with: &[],
        artifact: None,
    },
    ProjectSpec {
        name: "neac",
        include_from: &["libneac", "libwavefile"],
        link_with: &["libneac", "libwavefile"],
        artifact: Some((ArtifactKind::Executable, "neac")),
    },
    ProjectSpec {
        name: "libneacdll",
        include_from: &["libneac"],
        link_with: &["libneac"],
        artifact: Some((ArtifactKind::SharedLibrary, "libneacdll")),
    },
];

impl ProjectSpec {
    pub fn resolve(&self, layout: &PathLayout) -> Project {
        let object_dir = layout.project_object_dir(self.name);

        let artifact = self.artifact.map(|(kind, base_name)| {
            let mut object_dirs: Vec<PathBuf> = self
                .link_with
                .iter()
                .map(|dep| layout.project_object_dir(dep))
                .collect();
            object_dirs.push(object_dir.clone());
            Artifact {
                kind,
                base_name: base_name.to_string(),
                output_dir: layout.binary_root(),
                object_dirs,
            }
        });

        let mut deps: Vec<String> = Vec::new();
        for dep in self.include_from.iter().chain(self.link_with) {
            if !deps.iter().any(|d| d == dep) {
                deps.push(dep.to_string());
            }
        }

        Project {
            name: self.name.to_string(),
            source_dir: layout.project_source_dir(self.name),
            object_dir,
            include_dirs: self
                .include_from
                .iter()
                .map(|dep| layout.include_dir(dep))
                .collect(),
            artifact,
            deps,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Project {
    pub name: String,
    pub source_dir: PathBuf,
    /// Created before the first compile command runs
    pub object_dir: PathBuf,
    pub include_dirs: Vec<PathBuf>,
    pub artifact: Option<Artifact>,
    /// Names of projects that must be built first
    pub deps: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GraphError {
    DuplicateProject(String),
    UnknownDependency { project: String, dependency: String },
    /// Projects that could not be ordered
    Cycle(Vec<String>),
}

impl fmt::Display for GraphError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GraphError::DuplicateProject(name) => write!(f, "project '{}' declared twice", name),
            GraphError::UnknownDependency {
                project,
                dependency,
            } => write!(
                f,
                "project '{}' depends on unknown project '{}'",
                project, dependency
            ),
            GraphError::Cycle(names) => {
                write!(f, "dependency cycle between: {}", names.join(", "))
            }
        }
    }
}

impl std::error::Error for GraphError {}

#[derive(Debug, Clone)]
pub struct ProjectGraph {
    projects: Vec<Project>,
}

impl ProjectGraph {
    pub fn new(projects: Vec<Project>) -> Result<Self, GraphError> {
        let mut seen = HashSet::new();
        for project in &projects {
            if !seen.insert(project.name.as_str()) {
                return Err(GraphError::DuplicateProject(project.name.clone()));
            }
        }
        for project in &projects {
            if let Some(dep) = project.deps.iter().find(|d| !seen.contains(d.as_str())) {
                return Err(GraphError::UnknownDependency {
                    project: project.name.clone(),
                    dependency: dep.clone(),
                });
            }
        }
        Ok(Self { projects })
    }

    pub fn from_specs(specs: &[ProjectSpec], layout: &PathLayout) -> Result<Self, GraphError> {
        Self::new(specs.iter().map(|s| s.resolve(layout)).collect())
    }

    pub fn neac(layout: &PathLayout) -> Result<Self, GraphError> {
        Self::from_specs(NEAC_PROJECTS, layout)
    }

    /// In declaration order.
    pub fn projects(&self) -> &[Project] {
        &self.projects
    }

    pub fn get(&self, name: &str) -> Option<&Project> {
        self.projects.iter().find(|p| p.name == name)
    }

    /// Compile + link step count.
    pub fn step_count(&self) -> usize {
        self.projects
            .iter()
            .map(|p| if p.artifact.is_some() { 2 } else { 1 })
            .sum()
    }

    pub fn waves(&self) -> Result<Vec<Vec<&Project>>, GraphError> {
        let mut placed: HashSet<&str> = HashSet::new();
        let mut remaining: Vec<&Project> = self.projects.iter().collect();
        let mut waves = Vec::new();

        while !remaining.is_empty() {
            let (ready, blocked): (Vec<&Project>, Vec<&Project>) = remaining
                .into_iter()
                .partition(|p| p.deps.iter().all(|d| placed.contains(d.as_str())));

            if ready.is_empty() {
                return Err(GraphError::Cycle(
                    blocked.iter().map(|p| p.name.clone()).collect(),
                ));
            }

            placed.extend(ready.iter().map(|p| p.name.as_str()));
            waves.push(ready);
            remaining = blocked;
        }

        Ok(waves)
    }

    /// Waves flattened.
    pub fn order(&self) -> Result<Vec<&Project>, GraphError> {
        Ok(self.waves()?.into_iter().flatten().collect())
    }
}
