//! cfitsio version probe
//!
//! Downloads the upstream "latest" source tarball, extracts the public
//! header and the changelog, and reads the version and SONAME defines
//! out of the header. The SONAME travels with the reference snapshot so
//! a binary-interface change can be called out in the notification.

use crate::domain::ReferenceSnapshot;
use crate::error::ProbeError;
use crate::probe::{bounded_excerpt, ProbeContext, VersionProbe, EXCERPT_MAX_LINES};
use flate2::read::GzDecoder;
use regex::Regex;
use std::fs::File;
use std::sync::LazyLock;
use tracing::debug;

/// Upstream location of the rolling "latest" tarball
const DEFAULT_TARBALL_URL: &str =
    "http://heasarc.gsfc.nasa.gov/FTP/software/fitsio/c/cfitsio_latest.tar.gz";

/// File name the download is stored under inside the work directory
const TARBALL_NAME: &str = "cfitsio_latest.tar.gz";

/// Archive member carrying the version defines
const HEADER_MEMBER: &str = "cfitsio/fitsio.h";

/// Archive member carrying the changelog
const CHANGELOG_MEMBER: &str = "cfitsio/docs/changes.txt";

static VERSION_DEFINE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"#define\s+CFITSIO_VERSION\s+(\S+)").unwrap());

static SONAME_DEFINE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"#define\s+CFITSIO_SONAME\s+(\S+)").unwrap());

/// Probe for the cfitsio source distribution
#[derive(Debug)]
pub struct CfitsioProbe {
    reference: ReferenceSnapshot,
    next: ReferenceSnapshot,
    version: String,
    soname: Option<String>,
    changelog: String,
}

impl CfitsioProbe {
    /// Download the tarball into the work directory and read the key files
    pub async fn discover(ctx: &ProbeContext<'_>) -> Result<Self, ProbeError> {
        let url = ctx.params.get("url").unwrap_or(DEFAULT_TARBALL_URL);
        let bytes = ctx
            .http
            .get_bytes(url)
            .await
            .map_err(|e| ProbeError::remote(ctx.dependency, e))?;

        let io_err = |what: &str, e: std::io::Error| {
            ProbeError::init_failed(ctx.dependency, format!("{}: {}", what, e))
        };

        let tarball = ctx.workdir.join(TARBALL_NAME);
        std::fs::write(&tarball, &bytes).map_err(|e| io_err("failed to store tarball", e))?;

        let file = File::open(&tarball).map_err(|e| io_err("failed to reopen tarball", e))?;
        let mut archive = tar::Archive::new(GzDecoder::new(file));
        let entries = archive
            .entries()
            .map_err(|e| io_err("failed to read tarball", e))?;
        for entry in entries {
            let mut entry = entry.map_err(|e| io_err("failed to read tarball entry", e))?;
            let path = entry
                .path()
                .map_err(|e| io_err("failed to read tarball entry path", e))?
                .to_string_lossy()
                .into_owned();
            if path == HEADER_MEMBER || path == CHANGELOG_MEMBER {
                entry
                    .unpack_in(ctx.workdir)
                    .map_err(|e| io_err("failed to extract archive member", e))?;
            }
        }

        let header = std::fs::read_to_string(ctx.workdir.join(HEADER_MEMBER)).map_err(|_| {
            ProbeError::init_failed(
                ctx.dependency,
                format!("archive does not contain {}", HEADER_MEMBER),
            )
        })?;
        let changelog =
            std::fs::read_to_string(ctx.workdir.join(CHANGELOG_MEMBER)).map_err(|_| {
                ProbeError::init_failed(
                    ctx.dependency,
                    format!("archive does not contain {}", CHANGELOG_MEMBER),
                )
            })?;

        let version = header_define(&header, &VERSION_DEFINE_RE).ok_or_else(|| {
            ProbeError::init_failed(ctx.dependency, "CFITSIO_VERSION not found in header")
        })?;
        let soname = header_define(&header, &SONAME_DEFINE_RE);
        debug!(dependency = ctx.dependency, %version, ?soname, "cfitsio probe discovered");

        let mut next = ctx.reference.clone();
        next.set("version", version.clone());
        if let Some(soname) = &soname {
            next.set("soname", soname.clone());
        }

        Ok(Self {
            reference: ctx.reference.clone(),
            next,
            version,
            soname,
            changelog,
        })
    }
}

impl VersionProbe for CfitsioProbe {
    fn has_new_version(&self) -> bool {
        self.reference.version() != Some(self.version.as_str())
    }

    fn next_reference(&self) -> ReferenceSnapshot {
        self.next.clone()
    }

    fn extra_detail(&self) -> String {
        let section = latest_changelog_section(&self.changelog);
        let mut detail = if section.trim().is_empty() {
            // Changelog format not recognized: quote the top of the raw
            // text instead of failing the notification
            bounded_excerpt(&self.changelog, EXCERPT_MAX_LINES)
        } else {
            bounded_excerpt(&section, EXCERPT_MAX_LINES)
        };
        if detail.trim().is_empty() {
            detail = "No changelog available.".to_string();
        }

        if let (Some(old), Some(new)) = (self.reference.get("soname"), self.soname.as_deref()) {
            if old != new {
                detail.push_str(&format!(
                    "\n\n**NOTE: This release introduces a SONAME change from {} to {}.**",
                    old, new
                ));
            }
        }

        detail
    }
}

/// Read a `#define` value out of the header text
fn header_define(header: &str, re: &Regex) -> Option<String> {
    re.captures(header)
        .map(|caps| caps[1].trim_matches('"').to_string())
}

/// The changelog's most recent section: everything from the first
/// "Version" heading up to (not including) the next one
fn latest_changelog_section(changelog: &str) -> String {
    let mut section = String::new();
    let mut open = false;
    for line in changelog.lines() {
        if line.contains("Version") {
            if open {
                break;
            }
            open = true;
        }
        if open {
            section.push_str(line);
            section.push('\n');
        }
    }
    section
}
