//! Summing of release asset download counters.

use anyhow::{Context, Result};
use glob::Pattern;
use log::debug;

use crate::github::{Release, ReleaseAsset};

/// Download totals across every release.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ReleaseTotals {
    pub basic_downloads: u64,
    pub update_downloads: u64,
}

/// How the "basic" and "update" builds are located within a release.
#[derive(Debug, Clone, Default)]
pub enum AssetSelector {
    /// Asset 0 is the basic build, asset 1 the update build. Releases with
    /// fewer than two assets are skipped entirely.
    #[default]
    Positional,
    /// First asset whose name matches each pattern. Each total is counted
    /// independently, so a release with only a basic build still contributes
    /// to `basic_downloads`.
    ByName { basic: Pattern, update: Pattern },
}

impl AssetSelector {
    /// Builds a name-matching selector from two glob patterns.
    pub fn by_name(basic: &str, update: &str) -> Result<Self> {
        let basic = Pattern::new(basic)
            .with_context(|| format!("Invalid basic asset pattern: {}", basic))?;
        let update = Pattern::new(update)
            .with_context(|| format!("Invalid update asset pattern: {}", update))?;
        Ok(AssetSelector::ByName { basic, update })
    }

    fn select<'a>(
        &self,
        assets: &'a [ReleaseAsset],
    ) -> (Option<&'a ReleaseAsset>, Option<&'a ReleaseAsset>) {
        match self {
            AssetSelector::Positional => match assets {
                [basic, update, ..] => (Some(basic), Some(update)),
                _ => (None, None),
            },
            AssetSelector::ByName { basic, update } => (
                assets.iter().find(|a| basic.matches(&a.name)),
                assets.iter().find(|a| update.matches(&a.name)),
            ),
        }
    }
}

/// Sums the selected asset counters over all releases.
///
/// Duplicate releases are counted twice; the upstream listing is trusted not
/// to overlap between pages. Totals saturate at `u64::MAX`.
pub fn aggregate_releases(releases: &[Release], selector: &AssetSelector) -> ReleaseTotals {
    let mut totals = ReleaseTotals::default();

    for release in releases {
        let (basic, update) = selector.select(&release.assets);

        if basic.is_none() && update.is_none() {
            debug!("Skipping release {} (no matching assets)", release.tag_name);
            continue;
        }

        if let Some(asset) = basic {
            totals.basic_downloads = totals.basic_downloads.saturating_add(asset.download_count);
        }
        if let Some(asset) = update {
            totals.update_downloads = totals.update_downloads.saturating_add(asset.download_count);
        }
    }

    totals
}
