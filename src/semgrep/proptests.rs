//! Property-based tests for launch parameter building
//!
//! ```bash
//! cargo test --lib semgrep::proptests
//! ```

use proptest::collection::{btree_map, vec};
use proptest::prelude::*;
use std::ffi::{OsStr, OsString};

use crate::config::SemgrepConfig;
use crate::mcp::Environment;
use crate::semgrep::params::{build_server_params, LauncherConfig, PROXY_VARS};
use crate::semgrep::server::{create_semgrep_server_with, CLIENT_SESSION_TIMEOUT_SECS};

// Arbitrary environment: ordinary variables plus any subset of proxy variables
fn arb_environment() -> impl Strategy<Value = Environment> {
    (
        btree_map("[A-Za-z_][A-Za-z0-9_]{0,12}", "[ -~]{0,24}", 0..16),
        vec(prop::option::of("https?://[a-z]{1,8}:[0-9]{2,5}"), PROXY_VARS.len()),
    )
        .prop_map(|(plain, proxies)| {
            let mut env: Environment = plain
                .into_iter()
                .map(|(k, v)| (OsString::from(k), OsString::from(v)))
                .collect();
            for (var, value) in PROXY_VARS.iter().zip(proxies) {
                if let Some(value) = value {
                    env.insert(OsString::from(var), OsString::from(value));
                }
            }
            env
        })
}

proptest! {
    /// Output environment equals the input, and the input is left untouched
    #[test]
    fn prop_environment_is_faithful_copy(env in arb_environment()) {
        let before = env.clone();
        let params = build_server_params(&env, &LauncherConfig::default());

        prop_assert_eq!(&params.env, &before);
        prop_assert_eq!(&env, &before);
    }

    /// Set proxy variables keep their value; unset ones stay absent
    #[test]
    fn prop_proxy_vars_present_iff_set(env in arb_environment()) {
        let params = build_server_params(&env, &LauncherConfig::default());

        for var in PROXY_VARS {
            let key = OsStr::new(var);
            prop_assert_eq!(params.env.get(key), env.get(key));
        }
    }

    /// Command and arguments never depend on the environment
    #[test]
    fn prop_launch_line_is_deterministic(a in arb_environment(), b in arb_environment()) {
        let launcher = LauncherConfig::default();
        let first = build_server_params(&a, &launcher);
        let second = build_server_params(&b, &launcher);

        prop_assert_eq!(first.command, second.command);
        prop_assert_eq!(first.args, second.args);
    }

    /// The default handle always allows exactly `semgrep_scan` and waits 120s
    #[test]
    fn prop_handle_settings_fixed(env in arb_environment()) {
        let server = create_semgrep_server_with(&env, &SemgrepConfig::default());

        prop_assert_eq!(server.tool_filter().allowed_names(), Some(vec!["semgrep_scan"]));
        prop_assert_eq!(server.client_session_timeout().as_secs(), CLIENT_SESSION_TIMEOUT_SECS);
    }
}
