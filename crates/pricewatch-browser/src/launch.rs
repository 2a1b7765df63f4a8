//! Launch-profile selection and environment detection.
//!
//! Constrained environments (serverless runtimes, small containers) need
//! minimal-arg launches, tight timeouts, and usually a dedicated Chromium
//! binary; a developer desktop tolerates the full argument set. Detection
//! is by environment markers, overridable through `DriverSettings`.

use std::time::Duration;

use rand::seq::IndexedRandom;

use crate::driver::DriverSettings;

/// Environment variables that mark a constrained/serverless runtime.
const CONSTRAINED_ENV_MARKERS: &[&str] = &[
    "AWS_LAMBDA_FUNCTION_NAME",
    "FUNCTION_TARGET",
    "K_SERVICE",
    "VERCEL",
];

/// Desktop user agents rotated per session. Kept current enough to blend
/// in; exact versions matter less than plausibility.
const USER_AGENTS: &[&str] = &[
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/125.0.0.0 Safari/537.36",
    "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/124.0.0.0 Safari/537.36",
    "Mozilla/5.0 (X11; Linux x86_64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/125.0.0.0 Safari/537.36",
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64; rv:126.0) Gecko/20100101 Firefox/126.0",
    "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/605.1.15 (KHTML, like Gecko) Version/17.4 Safari/605.1.15",
];

pub const DEFAULT_ACCEPT_LANGUAGE: &str = "de-DE,de;q=0.9,en-US;q=0.8,en;q=0.7";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExecutionEnv {
    /// Serverless / tightly constrained container.
    Constrained,
    /// Full local desktop or CI box.
    Desktop,
}

impl ExecutionEnv {
    /// Detects the execution environment from process env markers.
    #[must_use]
    pub fn detect() -> Self {
        Self::from_lookup(|key| std::env::var(key).is_ok())
    }

    fn from_lookup<F: Fn(&str) -> bool>(has_var: F) -> Self {
        if CONSTRAINED_ENV_MARKERS.iter().any(|m| has_var(m)) {
            ExecutionEnv::Constrained
        } else {
            ExecutionEnv::Desktop
        }
    }
}

/// One attempt in the launch fallback chain.
#[derive(Debug, Clone)]
pub struct LaunchProfile {
    pub label: &'static str,
    pub args: Vec<&'static str>,
    pub launch_timeout: Duration,
}

/// Builds the ordered launch fallback chain for the environment.
///
/// Initialization tries each profile in turn and keeps the first that
/// launches; later profiles are progressively more minimal so that a
/// misbehaving sandbox or GPU stack cannot take the whole source down.
#[must_use]
pub fn launch_profiles(env: ExecutionEnv, settings: &DriverSettings) -> Vec<LaunchProfile> {
    let mut profiles = Vec::new();

    if env == ExecutionEnv::Desktop {
        profiles.push(LaunchProfile {
            label: "desktop-full",
            args: vec![
                "--disable-blink-features=AutomationControlled",
                "--no-first-run",
                "--no-default-browser-check",
                "--disable-background-networking",
                "--disable-sync",
                "--mute-audio",
            ],
            launch_timeout: Duration::from_secs(30),
        });
    }

    // Container-safe set; the default for constrained environments and the
    // first fallback on desktops.
    profiles.push(LaunchProfile {
        label: "container-minimal",
        args: vec![
            "--no-sandbox",
            "--disable-setuid-sandbox",
            "--disable-dev-shm-usage",
            "--disable-gpu",
            "--no-first-run",
            "--mute-audio",
        ],
        launch_timeout: launch_timeout_for(env),
    });

    // Last resort: single-process launch for the tightest sandboxes.
    profiles.push(LaunchProfile {
        label: "single-process",
        args: vec![
            "--no-sandbox",
            "--disable-setuid-sandbox",
            "--disable-dev-shm-usage",
            "--disable-gpu",
            "--single-process",
            "--no-zygote",
        ],
        launch_timeout: launch_timeout_for(env),
    });

    // A custom binary implies a prepared (usually constrained) image; keep
    // the chain but let the settings timeout dominate if tighter.
    if settings.chromium_binary.is_some() {
        for profile in &mut profiles {
            profile.launch_timeout = profile.launch_timeout.min(Duration::from_secs(15));
        }
    }

    profiles
}

fn launch_timeout_for(env: ExecutionEnv) -> Duration {
    match env {
        ExecutionEnv::Constrained => Duration::from_secs(10),
        ExecutionEnv::Desktop => Duration::from_secs(30),
    }
}

/// Picks a user agent for the session.
#[must_use]
pub fn random_user_agent() -> &'static str {
    let mut rng = rand::rng();
    USER_AGENTS
        .choose(&mut rng)
        .copied()
        .unwrap_or(USER_AGENTS[0])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lambda_marker_means_constrained() {
        let env = ExecutionEnv::from_lookup(|key| key == "AWS_LAMBDA_FUNCTION_NAME");
        assert_eq!(env, ExecutionEnv::Constrained);
    }

    #[test]
    fn no_markers_means_desktop() {
        let env = ExecutionEnv::from_lookup(|_| false);
        assert_eq!(env, ExecutionEnv::Desktop);
    }

    #[test]
    fn desktop_chain_starts_full_and_degrades() {
        let profiles = launch_profiles(ExecutionEnv::Desktop, &DriverSettings::default());
        assert_eq!(profiles.len(), 3);
        assert_eq!(profiles[0].label, "desktop-full");
        assert_eq!(profiles[2].label, "single-process");
        assert!(profiles[2].args.contains(&"--single-process"));
    }

    #[test]
    fn constrained_chain_skips_full_profile() {
        let profiles = launch_profiles(ExecutionEnv::Constrained, &DriverSettings::default());
        assert_eq!(profiles.len(), 2);
        assert_eq!(profiles[0].label, "container-minimal");
        assert!(profiles[0].launch_timeout <= Duration::from_secs(10));
    }

    #[test]
    fn custom_binary_tightens_launch_timeouts() {
        let settings = DriverSettings {
            chromium_binary: Some("/opt/chromium/chrome".into()),
            ..DriverSettings::default()
        };
        let profiles = launch_profiles(ExecutionEnv::Desktop, &settings);
        assert!(profiles
            .iter()
            .all(|p| p.launch_timeout <= Duration::from_secs(15)));
    }

    #[test]
    fn user_agent_comes_from_the_pool() {
        let ua = random_user_agent();
        assert!(USER_AGENTS.contains(&ua));
    }
}
