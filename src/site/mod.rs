//! Documentation platform families
//!
//! Each documentation platform lays out its pages a little differently. A
//! [`SiteProfile`] collects the per-family knowledge the engine needs: where
//! the article lives, which sidebar lists the pages, which manifest files
//! describe the navigation, and which bits of site furniture to throw away.

mod profile;

pub use profile::SiteProfile;

use serde::Deserialize;
use std::fmt;

/// Documentation platform family a site is built with
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum SiteFamily {
    /// Any site; landmark-based extraction with body fallback
    #[default]
    Generic,
    /// MkDocs / Material for MkDocs
    Mkdocs,
    /// GitBook
    Gitbook,
    /// ReadMe.io
    Readme,
    /// Mintlify
    Mintlify,
    /// Stoplight (client-side rendered)
    Stoplight,
}

impl SiteFamily {
    /// Returns the static profile for this family
    pub fn profile(&self) -> &'static SiteProfile {
        SiteProfile::for_family(*self)
    }
}

impl fmt::Display for SiteFamily {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Generic => "generic",
            Self::Mkdocs => "mkdocs",
            Self::Gitbook => "gitbook",
            Self::Readme => "readme",
            Self::Mintlify => "mintlify",
            Self::Stoplight => "stoplight",
        };
        f.write_str(name)
    }
}
