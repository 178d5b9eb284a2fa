use std::path::PathBuf;

use clap::Parser;

use crate::release;

/// Create a VirtualBox VDI image from a signed CoreOS release.
///
/// Downloads the compressed production image for a release channel,
/// verifies it against the release's clearsigned DIGESTS manifest and the
/// pinned image signing key, then converts the verified raw image with
/// VBoxManage.
#[derive(Clone, Debug, Parser)]
// -V means "release version to install", as in the original tool, so the
// auto-generated version flag must stay out of the way.
#[command(name = "vdiforge", disable_version_flag = true, about, long_about = None)]
pub struct App {
    /// Release channel (stable, alpha, beta) or an explicit version
    #[arg(short = 'V', long = "version", default_value = "stable")]
    pub channel: String,

    /// Directory the finished VDI image is written to (default: current dir)
    #[arg(short = 'p', long = "path")]
    pub dest: Option<PathBuf>,

    /// URL of the armored image signing key
    #[arg(long, default_value = release::SIGNING_KEY_URL)]
    pub key_url: String,

    /// Trusted signer key id, 16 hex characters
    #[arg(long, default_value = release::SIGNING_KEY_ID)]
    pub key_id: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn defaults_pin_the_coreos_key() {
        let app = App::parse_from(["vdiforge"]);
        assert_eq!(app.channel, "stable");
        assert_eq!(app.key_id, "50E0885593D2DCB4");
        assert!(app.dest.is_none());
    }

    #[test]
    fn short_flags_match_the_original_tool() {
        let app = App::parse_from(["vdiforge", "-V", "alpha", "-p", "/tmp/out"]);
        assert_eq!(app.channel, "alpha");
        assert_eq!(app.dest, Some(PathBuf::from("/tmp/out")));
    }

    #[test]
    fn version_flag_selects_the_release_not_the_tool_version() {
        // --version belongs to the channel argument alone; clap must not
        // also claim it for an auto-generated version flag.
        App::command().debug_assert();
        let app = App::parse_from(["vdiforge", "--version", "beta"]);
        assert_eq!(app.channel, "beta");
    }
}
