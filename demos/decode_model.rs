//! Decodes a model file from text, edits it and writes it back.
//!
//! Run with `cargo run --example decode_model`.

use serde_omsi::formats::model::Model;
use serde_omsi::{from_str, to_string_with_options, EncodeOptions, LineEnding};

const MODEL: &str = "Bus body.\r\n\
                     \r\n\
                     [LOD]\r\n\
                     500\r\n\
                     \r\n\
                     [mesh]\r\n\
                     body.o3d\r\n\
                     [matl]\r\n\
                     body.dds\r\n\
                     0\r\n\
                     \r\n\
                     [mesh]\r\n\
                     wheel.o3d\r\n\
                     [matl]\r\n\
                     wheel.dds\r\n\
                     0\r\n";

fn main() -> Result<(), serde_omsi::Error> {
    let mut model: Model = from_str(MODEL)?;

    for lod in &model.commands.lods {
        println!("LOD up to {} m", lod.view_radius);
        for mesh in &lod.meshes {
            let textures: Vec<_> = mesh.matls.iter().map(|m| m.path.as_str()).collect();
            println!("  {} -> {}", mesh.path, textures.join(", "));
        }
    }

    if let Some(lod) = model.commands.lods.first_mut() {
        lod.view_radius = 800.0;
    }

    let options = EncodeOptions::new().with_line_ending(LineEnding::Lf);
    print!("{}", to_string_with_options(&model, &options)?);
    Ok(())
}
