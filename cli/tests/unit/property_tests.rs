//! Property-based tests for critical validation and generation logic.
//!
//! Uses `proptest` to verify invariants across many random inputs.

#![allow(clippy::expect_used)]

use proptest::prelude::*;
use rand::SeedableRng;
use rand::rngs::StdRng;

use hoist_cli::application::services::atomic_write::temp_path;
use hoist_cli::domain::artifacts::{allowed_origins, lint_nginx, nginx_site};
use hoist_cli::domain::params::{validate_deploy_path, validate_domain};
use hoist_cli::domain::secret::{SECRET_ALPHABET, generate_secret, generate_secret_with};
use hoist_cli::domain::shell::quote;

proptest! {
    /// Secrets draw only from the alphanumeric alphabet, at the requested length.
    #[test]
    fn prop_secret_alphabet_and_length(seed in any::<u64>(), len in 1usize..128) {
        let mut rng = StdRng::seed_from_u64(seed);
        let secret = generate_secret_with(&mut rng, len);
        prop_assert_eq!(secret.len(), len);
        prop_assert!(secret.chars().all(|c| SECRET_ALPHABET.contains(c)), "bad char in {}", secret);
    }

    /// Origins list HTTPS first, then HTTP, for exactly the domain given.
    #[test]
    fn prop_allowed_origins_shape(domain in "[a-z]{1,12}(\\.[a-z]{2,6}){1,2}") {
        let origins = allowed_origins(&domain);
        let parts: Vec<&str> = origins.split(',').collect();
        prop_assert_eq!(parts.len(), 2);
        prop_assert_eq!(parts[0], format!("https://{domain}"));
        prop_assert_eq!(parts[1], format!("http://{domain}"));
    }

    /// The generated site passes the local lint for any valid domain.
    #[test]
    fn prop_generated_site_lints_clean(domain in "[a-z]{1,12}(\\.[a-z]{2,6}){1,2}") {
        let domain = validate_domain(&domain).expect("generator yields valid domains");
        prop_assert!(lint_nginx(&nginx_site(&domain)).is_ok());
    }

    /// The temp file sits next to its target and never equals it.
    #[test]
    fn prop_temp_path_is_a_sibling(
        dir in "(/[a-z0-9_-]{1,8}){1,4}",
        name in "\\.?[a-z0-9_-]{1,12}",
        token in "[0-9]{1,24}",
    ) {
        let target = format!("{dir}/{name}");
        let tmp = temp_path(&target, &token);
        prop_assert!(tmp.starts_with(&target));
        prop_assert_ne!(&tmp, &target);
        prop_assert_eq!(tmp.rsplit_once('/').map(|(d, _)| d), Some(dir.as_str()));
    }

    /// Quoting either leaves a safe word alone or wraps it in single quotes.
    #[test]
    fn prop_quote_is_inert(s in ".{0,40}") {
        let q = quote(&s);
        if q != s {
            prop_assert!(q.starts_with('\'') && q.ends_with('\''), "unquoted output: {}", q);
            // Every embedded quote is closed, escaped and reopened.
            let inner = &q[1..q.len() - 1];
            prop_assert_eq!(inner.replace(r"'\''", ""), s.replace('\'', ""));
        }
    }

    /// Paths with a `..` segment are never accepted as deploy paths.
    #[test]
    fn prop_deploy_path_rejects_parent_segments(
        head in "(/[a-z]{1,6}){0,3}",
        tail in "(/[a-z]{1,6}){0,3}",
    ) {
        let path = format!("{head}/..{tail}");
        prop_assert!(validate_deploy_path(&path).is_err(), "accepted {}", path);
    }
}

#[test]
fn secrets_are_unique_across_a_batch() {
    let secrets: std::collections::HashSet<_> = (0..10_000).map(|_| generate_secret()).collect();
    assert_eq!(secrets.len(), 10_000, "duplicate secrets generated");
}
