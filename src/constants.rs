//! Constants used throughout skelly

use std::time::Duration;

/// File whose presence marks a directory as a skeleton.
pub const MARKER_FILE: &str = "skeleton.yaml";

/// Directory under a repository root that holds the skeletons.
pub const SKELETONS_DIR: &str = "skeletons";

/// Suffix of files whose content is rendered; stripped on output.
pub const TEMPLATE_SUFFIX: &str = ".skel";

/// Revision used for remote repositories without a `revision` query parameter.
pub const DEFAULT_REVISION: &str = "main";

/// Query parameter selecting the branch, tag or commit of a remote repository.
pub const REVISION_QUERY_PARAM: &str = "revision";

/// A remote cache younger than this is used without fetching.
pub const FRESHNESS_WINDOW: Duration = Duration::from_secs(60);

/// Name of the application directory inside the platform cache directory.
pub const CACHE_DIR_NAME: &str = "skelly";

/// Name of the remote created by a clone.
pub const ORIGIN: &str = "origin";

/// Generated file names
pub mod generated {
    pub const LICENSE_FILE: &str = "LICENSE";
    pub const GITIGNORE_FILE: &str = ".gitignore";
}

/// Default permissions used when the source does not carry any.
pub mod permissions {
    pub const DIRECTORY: u32 = 0o755;
    pub const FILE: u32 = 0o644;
}

/// Exit codes
pub mod exit_codes {
    pub const FAILURE: i32 = 1;
}

/// Verbosity levels
pub mod verbosity {
    pub const OFF: u8 = 0;
    pub const INFO: u8 = 1;
    pub const DEBUG: u8 = 2;
    pub const TRACE: u8 = 3;
}
