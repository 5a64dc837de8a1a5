//! Release orchestration
//!
//! A release is an ordered list of named steps evaluated by [run_steps]:
//! each step either completes and is reported, or aborts the release with a
//! [GitReleaseError::Release] naming the step and level. Completed git
//! operations are never rolled back.

pub mod preflight;

pub use preflight::{ensure_prerequisites, PREFLIGHT_STEP};

use crate::changelog::{write_changelog, ChangelogOptions, ChangelogWarning};
use crate::config::{Config, VersionRule};
use crate::domain::{BranchRole, ReleaseBranches, ReleaseLevel, Version};
use crate::error::{GitReleaseError, Result};
use crate::git::Repository;
use crate::versions::{apply_version, detect_canonical_version, VersionChange};

/// Step that resolves the target version before the plan is built.
pub const COMPUTE_STEP: &str = "compute release version";

type StepAction<'a> = Box<dyn Fn(&mut dyn FnMut(&str)) -> Result<()> + 'a>;

/// One named operation of the release workflow
pub struct ReleaseStep<'a> {
    pub name: String,
    action: StepAction<'a>,
}

impl<'a> ReleaseStep<'a> {
    pub fn new(name: impl Into<String>, action: impl Fn() -> Result<()> + 'a) -> Self {
        Self::reporting(name, move |_: &mut dyn FnMut(&str)| action())
    }

    /// A step that may emit extra lines (warnings) while it runs.
    pub fn reporting(
        name: impl Into<String>,
        action: impl Fn(&mut dyn FnMut(&str)) -> Result<()> + 'a,
    ) -> Self {
        ReleaseStep {
            name: name.into(),
            action: Box::new(action),
        }
    }
}

/// Everything the steps of one release need
pub struct ReleaseContext<'a> {
    pub repo: &'a dyn Repository,
    pub config: &'a Config,
    pub level: ReleaseLevel,
    pub target: Version,
    pub include_unreleased: bool,
}

impl ReleaseContext<'_> {
    fn branches(&self) -> ReleaseBranches {
        self.config.release_branches()
    }

    fn rules(&self) -> Vec<VersionRule> {
        self.config.effective_version_rules()
    }

    fn commit_message(&self) -> String {
        release_commit_message(&self.target)
    }
}

/// Message used for both the release commit and its annotated tag.
pub fn release_commit_message(version: &Version) -> String {
    format!("release version: {}", version)
}

/// Line reported for a changelog warning raised during a release.
pub fn changelog_warning_message(warning: &ChangelogWarning) -> String {
    format!("WARNING: {}", warning)
}

/// Line reported after a step succeeds.
pub fn step_completed_message(level: ReleaseLevel, step: &str) -> String {
    format!("[release:{}] Step '{}' completed successfully", level, step)
}

/// Run a single step, re-wrapping any failure as a release error.
pub fn run_step<T>(
    level: ReleaseLevel,
    name: &str,
    action: impl FnOnce() -> Result<T>,
    report: &mut dyn FnMut(&str),
) -> Result<T> {
    tracing::debug!(level = %level, step = %name, "Running release step");
    match action() {
        Ok(value) => {
            report(&step_completed_message(level, name));
            Ok(value)
        }
        Err(GitReleaseError::Release { message, .. }) => {
            Err(GitReleaseError::release(level, name, message))
        }
        Err(e) => Err(GitReleaseError::release(level, name, e.to_string())),
    }
}

/// Evaluate steps strictly in order, stopping at the first failure.
pub fn run_steps(
    level: ReleaseLevel,
    steps: &[ReleaseStep<'_>],
    report: &mut dyn FnMut(&str),
) -> Result<()> {
    for step in steps {
        let mut notes = Vec::new();
        let outcome = (step.action)(&mut |line: &str| notes.push(line.to_string()));
        for note in &notes {
            report(note);
        }
        run_step(level, &step.name, || outcome, report)?;
    }
    Ok(())
}

/// Build the ordered step list for a release.
///
/// Patch releases stop at the integration branch: the three main-line steps
/// are left out. Pushing tags is always the last step.
pub fn release_plan<'a>(ctx: &'a ReleaseContext<'a>) -> Vec<ReleaseStep<'a>> {
    let branches = ctx.branches();
    let remote = ctx.config.remote.as_str();
    let master = branches.name(BranchRole::Master).to_string();
    let develop = branches.name(BranchRole::Develop).to_string();
    let work = branches.name(BranchRole::Work).to_string();
    let tag = ctx.target.tag_name();

    let mut steps = vec![
        ReleaseStep::new("update versions", move || {
            let target = ctx.target.to_string();
            match apply_version(ctx.repo.root(), &ctx.rules(), &target)? {
                VersionChange::Applied { .. } => Ok(()),
                VersionChange::AlreadyCurrent(version) => Err(
                    GitReleaseError::version_detection(format!(
                        "The project version is already {}",
                        version
                    )),
                ),
            }
        }),
        ReleaseStep::new("stage files", move || ctx.repo.stage_all()),
        ReleaseStep::new("create release commit", move || {
            ctx.repo.commit(&ctx.commit_message())
        }),
        {
            let tag = tag.clone();
            ReleaseStep::new("tag release", move || {
                ctx.repo.tag_annotated(&tag, &ctx.commit_message(), false)
            })
        },
        ReleaseStep::reporting("regenerate changelog", move |report: &mut dyn FnMut(&str)| {
            let options = ChangelogOptions {
                include_unreleased: ctx.include_unreleased,
                force_write: true,
                print_only: false,
            };
            let (_, warnings) = write_changelog(ctx.repo, ctx.config, options)?;
            for warning in &warnings {
                report(&changelog_warning_message(warning));
            }
            Ok(())
        }),
        ReleaseStep::new("stage changelog", move || {
            ctx.repo
                .stage_path(&ctx.repo.root().join(&ctx.config.changelog_file))
        }),
        ReleaseStep::new("amend release commit", move || ctx.repo.amend_no_edit()),
        {
            let tag = tag.clone();
            ReleaseStep::new("retag release", move || {
                ctx.repo.tag_annotated(&tag, &ctx.commit_message(), true)
            })
        },
        {
            let develop = develop.clone();
            ReleaseStep::new(format!("checkout {}", develop), move || {
                ctx.repo.checkout(&develop)
            })
        },
        {
            let work = work.clone();
            ReleaseStep::new(format!("merge {} into {}", work, develop), move || {
                ctx.repo.merge(&work)
            })
        },
        {
            let develop = develop.clone();
            ReleaseStep::new(format!("push {}", develop), move || {
                ctx.repo.push(remote, &develop)
            })
        },
    ];

    if ctx.level.promotes_to_master() {
        let checkout_master = master.clone();
        steps.push(ReleaseStep::new(
            format!("checkout {}", master),
            move || ctx.repo.checkout(&checkout_master),
        ));
        let merged = develop.clone();
        steps.push(ReleaseStep::new(
            format!("merge {} into {}", develop, master),
            move || ctx.repo.merge(&merged),
        ));
        let push_master = master.clone();
        steps.push(ReleaseStep::new(format!("push {}", master), move || {
            ctx.repo.push(remote, &push_master)
        }));
    }

    steps.push(ReleaseStep::new(format!("return to {}", work), {
        let work = work.clone();
        move || ctx.repo.checkout(&work)
    }));
    steps.push(ReleaseStep::new("show release details", move || {
        ctx.repo.show(&tag)
    }));
    steps.push(ReleaseStep::new("push tags", move || ctx.repo.push_tags(remote)));

    steps
}

/// Run the complete release workflow for `level`.
///
/// Preconditions are checked first; then the target version is computed from
/// the canonical version and every planned step runs in order. Each
/// completed step is passed to `report`.
pub fn execute_release(
    repo: &dyn Repository,
    config: &Config,
    level: ReleaseLevel,
    include_unreleased: bool,
    report: &mut dyn FnMut(&str),
) -> Result<Version> {
    ensure_prerequisites(repo, config, level)?;

    let rules = config.effective_version_rules();
    let target = run_step(
        level,
        COMPUTE_STEP,
        || {
            let current = detect_canonical_version(repo.root(), &rules)?;
            Version::parse(&current)?.bump(level)
        },
        report,
    )?;
    tracing::info!(level = %level, version = %target, "Releasing");

    let ctx = ReleaseContext {
        repo,
        config,
        level,
        target: target.clone(),
        include_unreleased,
    };
    let steps = release_plan(&ctx);
    run_steps(level, &steps, report)?;

    Ok(target)
}
