use hubindex_core::{asset::AssetRecord, catalog::Catalog};
use hubindex_dl::traits::Platform;
use nu_ansi_term::Color::{Blue, Cyan, Green, LightRed, Yellow};
use tabled::{
    builder::Builder,
    settings::{themes::BorderCorrection, Panel, Style},
};
use tracing::info;

use crate::{error::HubResult, utils::Colored};

fn source(asset: &AssetRecord) -> String {
    match asset {
        AssetRecord::Hosted {
            id, ..
        } => format!("{}", Colored(Green, format!("asset #{id}"))),
        AssetRecord::Synthetic {
            git_ref,
            format,
            ..
        } => format!("{}", Colored(Yellow, format!("{format} @ {git_ref}"))),
    }
}

pub fn render_table(assets: &[AssetRecord]) -> String {
    let mut builder = Builder::new();
    builder.push_record(["Repository", "Name", "Source", "Path"].map(String::from));
    for asset in assets {
        builder.push_record([
            format!(
                "{}/{}",
                Colored(Blue, asset.owner()),
                Colored(Cyan, asset.repo())
            ),
            format!("{}", Colored(LightRed, asset.name())),
            source(asset),
            asset.url(),
        ]);
    }

    builder
        .build()
        .with(Panel::header(format!("{} assets", assets.len())))
        .with(Style::rounded())
        .with(BorderCorrection {})
        .to_string()
}

/// Refreshes once and prints the resulting catalog.
pub fn list_assets<P: Platform + 'static>(catalog: &Catalog<P>, json: bool) -> HubResult<()> {
    catalog.refresh_all()?;
    let assets = catalog.assets();

    if json {
        println!("{}", serde_json::to_string_pretty(assets.as_slice())?);
    } else {
        info!("\n{}", render_table(&assets));
    }
    Ok(())
}
