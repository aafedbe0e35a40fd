//! # Wellfare (clinic web front)
//!
//! `wellfare` serves the public pages of the TF Wellfare clinic site (landing,
//! booking) and its admin area. The only piece of policy it owns is the
//! **admin route guard**: every request under `/admin` must carry a non-empty
//! `accessToken` cookie, otherwise it is redirected to `/admin/login` with the
//! original path recorded in a `redirect` query parameter.
//!
//! ## Token validity
//!
//! The guard checks presence only. Signature and expiry checks belong to the
//! clinic backend API, which is called with the token as a bearer credential
//! (see [`clinic`]).
//!
//! ## Collaborators
//!
//! Credential submission, booking submission and session lookup are reached
//! through narrow traits so the HTTP host can be exercised without a backend.

pub mod cli;
pub mod clinic;
pub mod wellfare;

#[allow(clippy::doc_markdown, clippy::needless_raw_string_hashes)]
pub mod built_info {
    include!(concat!(env!("OUT_DIR"), "/built.rs"));
}

pub const GIT_COMMIT_HASH: &str = match built_info::GIT_COMMIT_HASH {
    Some(hash) => hash,
    None => "unknown",
};

pub const APP_USER_AGENT: &str = concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION"),);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_git_commit_hash_format() {
        if GIT_COMMIT_HASH == "unknown" {
            // Acceptable in non-git build environments
            return;
        }
        assert!(
            GIT_COMMIT_HASH.chars().all(|c| c.is_ascii_hexdigit()),
            "GIT_COMMIT_HASH should be a hex string, got: {GIT_COMMIT_HASH}"
        );
    }

    #[test]
    fn test_app_user_agent_format() {
        assert!(APP_USER_AGENT.starts_with(env!("CARGO_PKG_NAME")));
        assert!(APP_USER_AGENT.contains(env!("CARGO_PKG_VERSION")));
    }
}
