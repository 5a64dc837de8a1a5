use std::fmt;

/// Role a branch plays in the promotion workflow.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BranchRole {
    /// Main-line branch, receives major and minor releases.
    Master,
    /// Integration branch, receives every release.
    Develop,
    /// Day-to-day working branch releases are cut from.
    Work,
}

impl BranchRole {
    pub fn key(&self) -> &'static str {
        match self {
            BranchRole::Master => "master",
            BranchRole::Develop => "develop",
            BranchRole::Work => "work",
        }
    }
}

impl fmt::Display for BranchRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

/// Concrete branch names resolved from configuration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReleaseBranches {
    pub master: String,
    pub develop: String,
    pub work: String,
}

impl ReleaseBranches {
    pub fn new(
        master: impl Into<String>,
        develop: impl Into<String>,
        work: impl Into<String>,
    ) -> Self {
        ReleaseBranches {
            master: master.into(),
            develop: develop.into(),
            work: work.into(),
        }
    }

    pub fn name(&self, role: BranchRole) -> &str {
        match role {
            BranchRole::Master => &self.master,
            BranchRole::Develop => &self.develop,
            BranchRole::Work => &self.work,
        }
    }

    /// Branches that must exist locally before a release.
    pub fn local_required(&self) -> [&str; 3] {
        [&self.master, &self.develop, &self.work]
    }

    /// Branches that must exist on the remote before a release.
    pub fn remote_required(&self) -> [&str; 2] {
        [&self.master, &self.develop]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_name_by_role() {
        let branches = ReleaseBranches::new("main", "dev", "feature");
        assert_eq!(branches.name(BranchRole::Master), "main");
        assert_eq!(branches.name(BranchRole::Develop), "dev");
        assert_eq!(branches.name(BranchRole::Work), "feature");
    }

    #[test]
    fn test_required_branches() {
        let branches = ReleaseBranches::new("master", "develop", "work");
        assert_eq!(branches.local_required(), ["master", "develop", "work"]);
        assert_eq!(branches.remote_required(), ["master", "develop"]);
    }
}
