//! Writes a path file as UTF-16 with a byte order mark and reads it back.
//!
//! Run with `cargo run --example utf16_output`.

use serde_omsi::formats::paths::{PathPoint, Paths};
use serde_omsi::formats::Vector3;
use serde_omsi::{from_slice, to_vec, EncodeOptions};

fn main() -> Result<(), serde_omsi::Error> {
    let mut paths = Paths::default();
    for x in [0.0, 2.5, 5.0] {
        paths.points.push(PathPoint {
            position: Vector3::new(x, 0.0, 1.2),
            comments: None,
        });
    }

    let options = EncodeOptions::new()
        .with_encoding(encoding_rs::UTF_16LE)
        .with_bom(true);
    let bytes = to_vec(&paths, &options)?;
    println!("{} bytes, starting {:02x?}", bytes.len(), &bytes[..2]);

    let back: Paths = from_slice(&bytes)?;
    assert_eq!(back.points.len(), paths.points.len());
    println!("read back {} points", back.points.len());
    Ok(())
}
