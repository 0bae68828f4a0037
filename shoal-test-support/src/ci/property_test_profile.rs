//! Property-test run profile shared by every shoal suite.
//!
//! Case counts and process forking can be overridden from the environment so
//! CI can run deeper sweeps without touching the suites themselves.

use std::env;

/// Environment variable overriding the number of cases per property.
pub const PROPTEST_CASES_ENV_KEY: &str = "PROPTEST_CASES";
/// Environment variable toggling forked proptest execution.
pub const SHOAL_PBT_FORK_ENV_KEY: &str = "SHOAL_PBT_FORK";

/// Case count and fork setting for one property suite.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ProptestRunProfile {
    cases: u32,
    fork: bool,
}

impl ProptestRunProfile {
    /// Reads the profile from the process environment.
    ///
    /// Unset or malformed overrides fall back to the supplied defaults; a
    /// malformed one is reported with a `warn` event.
    ///
    /// # Examples
    ///
    /// ```
    /// use shoal_test_support::ci::property_test_profile::ProptestRunProfile;
    ///
    /// let profile = ProptestRunProfile::load(32, false);
    /// assert!(profile.cases() > 0);
    /// ```
    #[must_use]
    pub fn load(default_cases: u32, default_fork: bool) -> Self {
        Self::from_lookup(default_cases, default_fork, |key| env::var(key).ok())
    }

    /// Builds the profile from an arbitrary key lookup.
    ///
    /// # Examples
    ///
    /// ```
    /// use shoal_test_support::ci::property_test_profile::{
    ///     PROPTEST_CASES_ENV_KEY, ProptestRunProfile,
    /// };
    ///
    /// let profile = ProptestRunProfile::from_lookup(32, false, |key| {
    ///     (key == PROPTEST_CASES_ENV_KEY).then(|| "500".to_owned())
    /// });
    /// assert_eq!(profile.cases(), 500);
    /// assert!(!profile.fork());
    /// ```
    #[must_use]
    pub fn from_lookup(
        default_cases: u32,
        default_fork: bool,
        lookup: impl Fn(&str) -> Option<String>,
    ) -> Self {
        Self {
            cases: resolve(PROPTEST_CASES_ENV_KEY, &lookup, default_cases, case_count),
            fork: resolve(SHOAL_PBT_FORK_ENV_KEY, &lookup, default_fork, switch),
        }
    }

    /// Number of cases to run per property.
    #[must_use]
    pub fn cases(&self) -> u32 {
        self.cases
    }

    /// Whether each case runs in a forked subprocess.
    #[must_use]
    pub fn fork(&self) -> bool {
        self.fork
    }
}

fn resolve<T>(
    key: &'static str,
    lookup: &impl Fn(&str) -> Option<String>,
    default: T,
    parse: fn(&str) -> Result<T, &'static str>,
) -> T {
    let Some(raw) = lookup(key) else {
        return default;
    };
    parse(&raw).unwrap_or_else(|reason| {
        tracing::warn!(
            env = key,
            raw = %raw,
            reason,
            "ignoring malformed property-test override",
        );
        default
    })
}

fn case_count(raw: &str) -> Result<u32, &'static str> {
    match raw.trim().parse::<u32>() {
        Ok(0) => Err("case count must be positive"),
        Ok(cases) => Ok(cases),
        Err(_) => Err("case count must be an unsigned integer"),
    }
}

fn switch(raw: &str) -> Result<bool, &'static str> {
    let value = raw.trim();
    if ["1", "true", "yes", "on"]
        .iter()
        .any(|word| value.eq_ignore_ascii_case(word))
    {
        Ok(true)
    } else if ["0", "false", "no", "off"]
        .iter()
        .any(|word| value.eq_ignore_ascii_case(word))
    {
        Ok(false)
    } else {
        Err("expected true/false, 1/0, yes/no or on/off")
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use rstest::rstest;
    use tracing_subscriber::layer::SubscriberExt;

    use super::*;
    use crate::tracing::RecordingLayer;

    fn profile_with(overrides: &[(&str, &str)], cases: u32, fork: bool) -> ProptestRunProfile {
        let values: HashMap<String, String> = overrides
            .iter()
            .map(|(key, value)| ((*key).to_owned(), (*value).to_owned()))
            .collect();
        ProptestRunProfile::from_lookup(cases, fork, |key| values.get(key).cloned())
    }

    #[test]
    fn defaults_apply_without_overrides() {
        let profile = profile_with(&[], 64, true);
        assert_eq!(profile.cases(), 64);
        assert!(profile.fork());
    }

    #[rstest]
    #[case("1", 1)]
    #[case(" 250 ", 250)]
    #[case("25000", 25_000)]
    fn case_overrides_are_parsed(#[case] raw: &str, #[case] expected: u32) {
        let profile = profile_with(&[(PROPTEST_CASES_ENV_KEY, raw)], 64, false);
        assert_eq!(profile.cases(), expected);
    }

    #[rstest]
    #[case("0")]
    #[case("-3")]
    #[case("many")]
    #[case("")]
    fn malformed_case_overrides_fall_back(#[case] raw: &str) {
        let profile = profile_with(&[(PROPTEST_CASES_ENV_KEY, raw)], 64, false);
        assert_eq!(profile.cases(), 64);
    }

    #[rstest]
    #[case("true", true)]
    #[case("On", true)]
    #[case("1", true)]
    #[case("YES", true)]
    #[case("off", false)]
    #[case("No", false)]
    #[case("0", false)]
    #[case("FALSE", false)]
    fn fork_overrides_are_parsed(#[case] raw: &str, #[case] expected: bool) {
        let profile = profile_with(&[(SHOAL_PBT_FORK_ENV_KEY, raw)], 64, !expected);
        assert_eq!(profile.fork(), expected);
    }

    #[rstest]
    #[case("")]
    #[case("2")]
    #[case("sometimes")]
    fn malformed_fork_overrides_fall_back(#[case] raw: &str) {
        let profile = profile_with(&[(SHOAL_PBT_FORK_ENV_KEY, raw)], 64, true);
        assert!(profile.fork());
    }

    #[test]
    fn malformed_overrides_are_reported() {
        let layer = RecordingLayer::default();
        let subscriber = tracing_subscriber::registry().with(layer.clone());
        let profile = tracing::subscriber::with_default(subscriber, || {
            profile_with(&[(PROPTEST_CASES_ENV_KEY, "zero")], 16, false)
        });

        assert_eq!(profile.cases(), 16);
        let events = layer.events();
        let warning = events
            .iter()
            .find(|event| event.level == tracing::Level::WARN)
            .expect("a warning must be emitted");
        assert_eq!(warning.message(), Some("ignoring malformed property-test override"));
        assert_eq!(warning.field("env"), Some(PROPTEST_CASES_ENV_KEY));
        assert_eq!(warning.field("raw"), Some("zero"));
    }
}
