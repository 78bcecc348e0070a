use std::path::PathBuf;

use clap::Subcommand;
use kapuchino_core::{load_photo, Config, FilePhotoSource, PhotoOutcome};
use tokio_util::sync::CancellationToken;

use super::{open_store, CliResult};

#[derive(Subcommand)]
pub enum PhotoAction {
    /// Set the photo from an image file (resized and re-encoded as JPEG)
    Set {
        path: PathBuf,
    },
    /// Remove the photo
    Remove,
    /// Write the stored JPEG to a file
    Export {
        path: PathBuf,
    },
}

pub async fn run(action: PhotoAction) -> CliResult {
    let config = Config::load()?;
    let mut store = open_store(&config)?;

    match action {
        PhotoAction::Set { path } => {
            let source = FilePhotoSource::new(path);
            match load_photo(&mut store, &source, &CancellationToken::new()).await? {
                PhotoOutcome::Applied { bytes } => println!("photo set ({bytes} bytes)"),
                PhotoOutcome::Cancelled => println!("photo unchanged"),
            }
        }
        PhotoAction::Remove => {
            store.remove_photo();
            println!("photo removed");
        }
        PhotoAction::Export { path } => {
            let photo = store.photo().ok_or("no photo set")?;
            std::fs::write(&path, photo)?;
            println!("{}", path.display());
        }
    }
    Ok(())
}
