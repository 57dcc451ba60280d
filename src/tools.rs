//! Runtime tool path resolution
//!
//! External tools (`git`, the build shell) are looked up through a
//! `{TOOL}_BIN` environment variable first, falling back to PATH. This lets
//! packaged installs pin exact binaries and lets tests point at stand-ins.
//!
//! ```rust,ignore
//! // With GIT_BIN="/usr/local/bin/git" this runs that binary, else `git` from PATH
//! Command::new(get_tool_path(tools::GIT)).args(["rev-parse", "HEAD"]);
//! ```

use std::env;

/// Get the path to an external tool, honoring `{TOOL}_BIN`
pub fn get_tool_path(tool: &str) -> String {
    let env_var = format!("{}_BIN", tool.to_uppercase());
    env::var(&env_var)
        .ok()
        .filter(|path| !path.is_empty())
        .unwrap_or_else(|| tool.to_string())
}

/// Tool names used by perma-deploy
pub mod tools {
    pub const GIT: &str = "git";
    #[cfg(not(windows))]
    pub const SHELL: &str = "sh";
    #[cfg(windows)]
    pub const SHELL: &str = "cmd";
}

/// Flag that makes the platform shell run its next argument as a command
pub fn shell_command_flag() -> &'static str {
    if cfg!(windows) {
        "/C"
    } else {
        "-c"
    }
}
