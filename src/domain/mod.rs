//! Domain logic - pure release rules independent of git operations

pub mod branch;
pub mod commit;
pub mod tag;
pub mod version;

pub use branch::{BranchRole, ReleaseBranches};
pub use commit::{classify, ClassifiedCommit, CommitType, ParsedCommit, Section};
pub use tag::TagInfo;
pub use version::{ReleaseLevel, Version};
