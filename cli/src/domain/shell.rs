//! Remote shell command lines.
//!
//! Every command the provisioner sends is built here so the exact text is
//! reviewable in one place and can be matched by test doubles. Arguments that
//! come from user input are passed through [`quote`].

use crate::domain::os::OsFamily;

/// Pinned docker compose release used by the static-binary fallback.
pub const COMPOSE_VERSION: &str = "v2.27.0";

/// Binaries the package baseline provides.
pub const BASELINE_BINARIES: &[&str] = &["git", "curl", "nginx", "certbot"];

const BASELINE_PACKAGES: &str = "git curl nginx certbot python3-certbot-nginx";

/// Single-quote `s` for a POSIX shell.
#[must_use]
pub fn quote(s: &str) -> String {
    if !s.is_empty()
        && s
            .bytes()
            .all(|b| b.is_ascii_alphanumeric() || b"/._-:@=+,".contains(&b))
    {
        return s.to_string();
    }
    format!("'{}'", s.replace('\'', r"'\''"))
}

/// Parent directory of an absolute remote path (`/` for top-level entries).
#[must_use]
pub fn parent_dir(path: &str) -> &str {
    match path.rfind('/') {
        Some(0) | None => "/",
        Some(i) => &path[..i],
    }
}

// ── Probes ───────────────────────────────────────────────────────────────────

#[must_use]
pub fn os_release() -> String {
    "cat /etc/os-release".to_string()
}

/// Succeeds only when every binary is on `PATH`.
#[must_use]
pub fn binaries_present(binaries: &[&str]) -> String {
    binaries
        .iter()
        .map(|b| format!("command -v {} >/dev/null 2>&1", quote(b)))
        .collect::<Vec<_>>()
        .join(" && ")
}

/// Succeeds when certbot lists its nginx authenticator.
#[must_use]
pub fn certbot_nginx_plugin_present() -> String {
    "certbot plugins --prepare 2>/dev/null | grep -qw nginx".to_string()
}

#[must_use]
pub fn is_dir(path: &str) -> String {
    format!("test -d {}", quote(path))
}

#[must_use]
pub fn exists(path: &str) -> String {
    format!("test -e {}", quote(path))
}

#[must_use]
pub fn is_file(path: &str) -> String {
    format!("test -f {}", quote(path))
}

// ── Packages ─────────────────────────────────────────────────────────────────

/// Package baseline commands for an OS family. Each inner list is a
/// fallback chain of equivalent commands; the outer list runs in order.
#[must_use]
pub fn baseline_install(os: OsFamily) -> Vec<Vec<(&'static str, String)>> {
    let apt_update = ("apt-get update", "apt-get update -y".to_string());
    let apt_install = (
        "apt-get install",
        format!("DEBIAN_FRONTEND=noninteractive apt-get install -y {BASELINE_PACKAGES}"),
    );
    let yum_install = ("yum install", format!("yum -y install {BASELINE_PACKAGES}"));
    let dnf_install = ("dnf install", format!("dnf -y install {BASELINE_PACKAGES}"));
    match os {
        OsFamily::Debian => vec![vec![apt_update], vec![apt_install]],
        OsFamily::Rhel => vec![
            vec![
                ("yum epel-release", "yum -y install epel-release".to_string()),
                ("dnf epel-release", "dnf -y install epel-release".to_string()),
            ],
            vec![yum_install, dnf_install],
        ],
        OsFamily::Unknown => vec![vec![
            (
                "apt-get",
                format!("apt-get update && {}", apt_install.1),
            ),
            yum_install,
        ]],
    }
}

// ── Container runtime ────────────────────────────────────────────────────────

#[must_use]
pub fn docker_present() -> String {
    binaries_present(&["docker"])
}

/// Succeeds when the daemon answers, not just when the binary exists.
#[must_use]
pub fn docker_ready() -> String {
    "docker info >/dev/null 2>&1".to_string()
}

#[must_use]
pub fn install_docker() -> String {
    "curl -fsSL https://get.docker.com | sh".to_string()
}

#[must_use]
pub fn enable_service(name: &str) -> String {
    format!("systemctl enable --now {}", quote(name))
}

#[must_use]
pub fn compose_plugin_version() -> String {
    "docker compose version".to_string()
}

#[must_use]
pub fn compose_standalone_version() -> String {
    "docker-compose version".to_string()
}

/// Package-manager installs of the compose plugin, tried in order. Empty
/// when the family has no known package.
#[must_use]
pub fn install_compose_plugin(os: OsFamily) -> Vec<(&'static str, String)> {
    match os {
        OsFamily::Debian => vec![(
            "apt-get compose plugin",
            "DEBIAN_FRONTEND=noninteractive apt-get install -y docker-compose-plugin".to_string(),
        )],
        OsFamily::Rhel => vec![
            ("yum compose plugin", "yum -y install docker-compose-plugin".to_string()),
            ("dnf compose plugin", "dnf -y install docker-compose-plugin".to_string()),
        ],
        OsFamily::Unknown => Vec::new(),
    }
}

#[must_use]
pub fn install_compose_binary() -> String {
    format!(
        "curl -fL 'https://github.com/docker/compose/releases/download/{COMPOSE_VERSION}/docker-compose-'\"$(uname -s)-$(uname -m)\" -o /usr/local/bin/docker-compose && chmod +x /usr/local/bin/docker-compose"
    )
}

// ── Source tree ──────────────────────────────────────────────────────────────

#[must_use]
pub fn make_dir(path: &str) -> String {
    format!("mkdir -p {}", quote(path))
}

#[must_use]
pub fn remove_tree(path: &str) -> String {
    format!("rm -rf -- {}", quote(path))
}

#[must_use]
pub fn git_clone(repo: &str, branch: &str, path: &str) -> String {
    format!(
        "git clone --branch {} -- {} {}",
        quote(branch),
        quote(repo),
        quote(path)
    )
}

#[must_use]
pub fn git_fetch_reset(path: &str, branch: &str) -> String {
    format!(
        "cd {} && git fetch --all --prune && git reset --hard {}",
        quote(path),
        quote(&format!("origin/{branch}"))
    )
}

#[must_use]
pub fn git_pull_rebase(path: &str) -> String {
    format!("cd {} && git pull --rebase", quote(path))
}

// ── File primitives ──────────────────────────────────────────────────────────

/// Stream stdin into `path`, created owner-only until its mode is set.
#[must_use]
pub fn write_stdin_to(path: &str) -> String {
    format!("umask 077 && cat > {}", quote(path))
}

#[must_use]
pub fn chmod(mode: u32, path: &str) -> String {
    format!("chmod {mode:o} {}", quote(path))
}

/// Rename onto `to`; `-T` keeps a directory at `to` from swallowing the file.
#[must_use]
pub fn rename(from: &str, to: &str) -> String {
    format!("mv -T -- {} {}", quote(from), quote(to))
}

#[must_use]
pub fn remove_file(path: &str) -> String {
    format!("rm -f -- {}", quote(path))
}

// ── Reverse proxy ────────────────────────────────────────────────────────────

#[must_use]
pub fn remove_default_site() -> String {
    "rm -f /etc/nginx/sites-enabled/default".to_string()
}

#[must_use]
pub fn nginx_test() -> String {
    "nginx -t".to_string()
}

#[must_use]
pub fn nginx_restart() -> String {
    "systemctl enable nginx && systemctl restart nginx".to_string()
}

// ── Services ─────────────────────────────────────────────────────────────────

#[must_use]
pub fn compose_up(compose: &str, path: &str) -> String {
    format!("cd {} && {compose} -f docker-compose.yml up -d --build", quote(path))
}

#[must_use]
pub fn compose_ps(compose: &str, path: &str) -> String {
    format!("cd {} && {compose} -f docker-compose.yml ps", quote(path))
}

// ── Certificates ─────────────────────────────────────────────────────────────

#[must_use]
pub fn certificate_present(domain: &str) -> String {
    is_file(&format!("/etc/letsencrypt/live/{domain}/fullchain.pem"))
}

#[must_use]
pub fn certbot(domain: &str, email: &str) -> String {
    format!(
        "certbot --nginx --non-interactive --keep-until-expiring --agree-tos --no-eff-email -m {} -d {} -d {} --redirect",
        quote(email),
        quote(domain),
        quote(&format!("www.{domain}"))
    )
}

/// The command an operator reruns once DNS points at the host.
#[must_use]
pub fn certbot_manual(domain: &str, email: &str) -> String {
    format!(
        "certbot --nginx -d {} -d {} -m {} --agree-tos --redirect",
        quote(domain),
        quote(&format!("www.{domain}")),
        quote(email)
    )
}
