//! Release-channel URL layout and `version.txt` handling.

use std::collections::HashMap;

/// Basename of the raw disk image inside a release.
pub const RAW_IMAGE_NAME: &str = "coreos_production_image.bin";

/// Default image signing key location and its pinned 64-bit id.
pub const SIGNING_KEY_URL: &str =
    "https://coreos.com/security/image-signing-key/CoreOS_Image_Signing_Key.pem";
pub const SIGNING_KEY_ID: &str = "50E0885593D2DCB4";

/// Where a release's files live for a named channel or explicit version.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Channel {
    Stable,
    Alpha,
    Beta,
    Version(String),
}

impl Channel {
    /// Anything that is not a known channel name is an explicit version.
    pub fn parse(s: &str) -> Self {
        match s {
            "stable" => Channel::Stable,
            "alpha" => Channel::Alpha,
            "beta" => Channel::Beta,
            other => Channel::Version(other.to_string()),
        }
    }

    pub fn base_url(&self) -> String {
        match self {
            Channel::Stable => "http://stable.release.core-os.net/amd64-usr/current".to_string(),
            Channel::Alpha => "http://alpha.release.core-os.net/amd64-usr/current".to_string(),
            Channel::Beta => "http://beta.release.core-os.net/amd64-usr/current".to_string(),
            Channel::Version(v) => format!("http://storage.core-os.net/coreos/amd64-usr/{v}"),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            Channel::Stable => "stable",
            Channel::Alpha => "alpha",
            Channel::Beta => "beta",
            Channel::Version(v) => v,
        }
    }
}

/// Filenames published per release, derived from the raw image name.
#[derive(Debug, Clone)]
pub struct ReleaseNames {
    /// Compressed download, e.g. `coreos_production_image.bin.bz2`.
    pub image: String,
    /// Clearsigned digest manifest, e.g. `...bin.bz2.DIGESTS.asc`.
    pub digests: String,
}

impl ReleaseNames {
    pub fn new() -> Self {
        let image = format!("{RAW_IMAGE_NAME}.bz2");
        let digests = format!("{image}.DIGESTS.asc");
        Self { image, digests }
    }
}

impl Default for ReleaseNames {
    fn default() -> Self {
        Self::new()
    }
}

/// Parse `KEY=VALUE` lines; lines without `=` or with an empty key are
/// ignored, keys and values are trimmed.
pub fn parse_vars(text: &str) -> HashMap<String, String> {
    let mut vars = HashMap::new();
    for line in text.lines() {
        if let Some((key, value)) = line.split_once('=') {
            let key = key.trim();
            if !key.is_empty() {
                vars.insert(key.to_string(), value.trim().to_string());
            }
        }
    }
    vars
}

/// Name the output image after the release version, falling back to the
/// channel name when `version.txt` is incomplete.
pub fn vdi_file_name(vars: &HashMap<String, String>, channel: &Channel) -> String {
    match (
        vars.get("COREOS_BUILD"),
        vars.get("COREOS_BRANCH"),
        vars.get("COREOS_PATCH"),
    ) {
        (Some(build), Some(branch), Some(patch)) => {
            format!("coreos_production_{build}.{branch}.{patch}.vdi")
        }
        _ => format!("coreos_production_{}.vdi", channel.as_str()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn known_channels_map_to_release_hosts() {
        assert_eq!(
            Channel::parse("stable").base_url(),
            "http://stable.release.core-os.net/amd64-usr/current"
        );
        assert_eq!(
            Channel::parse("beta").base_url(),
            "http://beta.release.core-os.net/amd64-usr/current"
        );
    }

    #[test]
    fn explicit_version_maps_to_storage_host() {
        assert_eq!(
            Channel::parse("1068.10.0").base_url(),
            "http://storage.core-os.net/coreos/amd64-usr/1068.10.0"
        );
    }

    #[test]
    fn release_names_derive_from_raw_image() {
        let names = ReleaseNames::new();
        assert_eq!(names.image, "coreos_production_image.bin.bz2");
        assert_eq!(names.digests, "coreos_production_image.bin.bz2.DIGESTS.asc");
    }

    #[test]
    fn vars_parsing_ignores_junk_lines() {
        let vars = parse_vars("COREOS_BUILD=1068\nnot a var\n =nope\nCOREOS_BRANCH = 10 \n");
        assert_eq!(vars.get("COREOS_BUILD").map(String::as_str), Some("1068"));
        assert_eq!(vars.get("COREOS_BRANCH").map(String::as_str), Some("10"));
        assert_eq!(vars.len(), 2);
    }

    #[test]
    fn vdi_name_uses_version_vars_when_present() {
        let vars = parse_vars("COREOS_BUILD=1068\nCOREOS_BRANCH=10\nCOREOS_PATCH=0\n");
        assert_eq!(
            vdi_file_name(&vars, &Channel::Stable),
            "coreos_production_1068.10.0.vdi"
        );
    }

    #[test]
    fn vdi_name_falls_back_to_channel() {
        let vars = parse_vars("COREOS_BUILD=1068\n");
        assert_eq!(
            vdi_file_name(&vars, &Channel::Alpha),
            "coreos_production_alpha.vdi"
        );
    }
}
