//! Remote operating-system family detection.
//!
//! Pure parsing of `/etc/os-release`; the probe itself lives in the
//! application layer.

use std::fmt;

use serde::Serialize;

/// Package-manager family of the remote host.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum OsFamily {
    /// apt-based (Debian, Ubuntu).
    Debian,
    /// yum/dnf-based (Fedora, CentOS, AlmaLinux, Rocky, RHEL).
    Rhel,
    /// No recognised signature; both managers are tried.
    Unknown,
}

const DEBIAN_IDS: &[&str] = &["debian", "ubuntu"];
const RHEL_IDS: &[&str] = &["fedora", "centos", "almalinux", "rocky", "rhel"];

impl OsFamily {
    /// Classify the contents of `/etc/os-release`.
    ///
    /// `ID` decides; `ID_LIKE` is consulted for derivatives (e.g. Linux Mint,
    /// Oracle Linux). Quoted values are accepted.
    #[must_use]
    pub fn from_os_release(text: &str) -> Self {
        let field = |key: &str| -> Option<String> {
            text.lines()
                .filter_map(|l| l.trim().strip_prefix(key)?.strip_prefix('='))
                .next()
                .map(|v| v.trim().trim_matches(|c| c == '"' || c == '\'').to_lowercase())
        };

        if let Some(id) = field("ID")
            && let Some(family) = Self::classify(&id)
        {
            return family;
        }
        field("ID_LIKE")
            .and_then(|like| like.split_whitespace().find_map(Self::classify))
            .unwrap_or(Self::Unknown)
    }

    fn classify(id: &str) -> Option<Self> {
        if DEBIAN_IDS.contains(&id) {
            Some(Self::Debian)
        } else if RHEL_IDS.contains(&id) {
            Some(Self::Rhel)
        } else {
            None
        }
    }
}

impl fmt::Display for OsFamily {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Debian => "debian",
            Self::Rhel => "rhel",
            Self::Unknown => "unknown",
        })
    }
}
