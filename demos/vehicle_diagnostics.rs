//! Decodes a vehicle with its referenced files and reports what was skipped.
//!
//! Pass a `.bus` file as the first argument. Without one, a small vehicle is
//! written to a temporary directory first.
//!
//! Run with `cargo run --example vehicle_diagnostics -- path/to/vehicle.bus`.

use serde_omsi::formats::vehicle::Vehicle;
use serde_omsi::{decode_path, DecodeOptions, Diagnostics};
use std::path::PathBuf;
use std::{env, fs};

fn sample_vehicle(dir: &std::path::Path) -> std::io::Result<PathBuf> {
    fs::create_dir_all(dir.join("model"))?;
    fs::write(
        dir.join("bus.bus"),
        "[friendlyname]\nMAN\nNL 202\nDefault\n\
         [model]\nmodel\\model.cfg\n\
         [paths]\nmodel\\missing_paths.cfg\n\
         [blinker_sound]\n",
    )?;
    fs::write(dir.join("model/model.cfg"), "[LOD]\n300\n[mesh]\nbody.o3d\n")?;
    Ok(dir.join("bus.bus"))
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let scratch = tempfile::tempdir()?;
    let path = match env::args().nth(1) {
        Some(arg) => PathBuf::from(arg),
        None => sample_vehicle(scratch.path())?,
    };

    let options = DecodeOptions::new()
        .with_encoding(encoding_rs::WINDOWS_1252)
        .with_recursive(true)
        .with_permissive(true);
    let mut diagnostics = Diagnostics::new();
    let vehicle: Vehicle = decode_path(&path, &options, &mut diagnostics)?;

    if let Some(name) = &vehicle.friendly_name {
        println!("{} {}", name.manufacturer, name.friendly_name);
    }
    if let Some(model) = &vehicle.scenery.model {
        let meshes: usize = model.commands.lods.iter().map(|lod| lod.meshes.len()).sum();
        println!("model {}: {} meshes", model.path, meshes);
    }

    for (parent, tag) in diagnostics.unmatched() {
        println!("unmatched [{}] under {}", tag, parent);
    }
    for failure in diagnostics.sub_file_failures() {
        println!("skipped {}: {}", failure.path.display(), failure.message);
    }
    Ok(())
}
