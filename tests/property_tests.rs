//! Property-based tests of the round-trip and ordering guarantees.

use proptest::prelude::*;
use serde::{Deserialize, Serialize};
use serde_omsi::formats::paths::{PathLink, PathLinkData, PathPoint, Paths};
use serde_omsi::formats::Vector3;
use serde_omsi::{from_str, to_string, Command, CommandBuilder, FieldKind};

#[derive(Serialize, Deserialize, Debug, Default, Clone, PartialEq)]
struct Sample {
    id: u16,
    weight: f32,
    flag: bool,
    label: String,
    grade: char,
    codes: Vec<i64>,
}

impl Command for Sample {
    fn describe(cmd: &mut CommandBuilder) {
        cmd.tag("sample")
            .field("id", FieldKind::U16)
            .field("weight", FieldKind::F32)
            .field("flag", FieldKind::Bool)
            .field("label", FieldKind::Str)
            .field("grade", FieldKind::Char)
            .field("codes", FieldKind::list(FieldKind::I64));
    }
}

#[derive(Serialize, Deserialize, Debug, Default, Clone, PartialEq)]
struct Batch {
    samples: Vec<Sample>,
}

impl Command for Batch {
    fn describe(cmd: &mut CommandBuilder) {
        cmd.children::<Sample>("samples");
    }
}

fn roundtrip<T: Command + PartialEq + std::fmt::Debug>(value: &T) -> bool {
    match to_string(value) {
        Ok(written) => match from_str::<T>(&written) {
            Ok(back) => *value == back,
            Err(e) => {
                eprintln!("Decode failed: {}", e);
                eprintln!("Encoded was: {:?}", written);
                false
            }
        },
        Err(e) => {
            eprintln!("Encode failed: {}", e);
            false
        }
    }
}

fn sample() -> impl Strategy<Value = Sample> {
    (
        any::<u16>(),
        -1.0e6f32..1.0e6f32,
        any::<bool>(),
        // A label must stay one line and must not look like a tag.
        "[a-zA-Z0-9 _.\\\\-]{0,16}",
        proptest::char::range('!', '~'),
        prop::collection::vec(any::<i64>(), 0..6),
    )
        .prop_map(|(id, weight, flag, label, grade, codes)| Sample {
            id,
            weight,
            flag,
            label,
            grade,
            codes,
        })
}

fn link() -> impl Strategy<Value = PathLink> {
    (any::<bool>(), 0..100i32, 0..100i32, 0..4i32, prop_oneof![Just(0.0f32), Just(2.5f32)]).prop_map(
        |(one_way, a, b, step_sound, room_height)| {
            let data = PathLinkData {
                a,
                b,
                step_sound,
                room_height,
                comments: None,
            };
            if one_way {
                PathLink::OneWay(data)
            } else {
                PathLink::TwoWay(data)
            }
        },
    )
}

proptest! {
    #[test]
    fn prop_batch_roundtrip(samples in prop::collection::vec(sample(), 0..8)) {
        let batch = Batch { samples };
        prop_assert!(roundtrip(&batch));
    }

    #[test]
    fn prop_sibling_order(ids in prop::collection::vec(any::<u16>(), 1..20)) {
        let batch = Batch {
            samples: ids.iter().map(|&id| Sample { id, ..Sample::default() }).collect(),
        };
        let back: Batch = from_str(&to_string(&batch).unwrap()).unwrap();
        let decoded: Vec<u16> = back.samples.iter().map(|s| s.id).collect();
        prop_assert_eq!(decoded, ids);
    }

    #[test]
    fn prop_paths_roundtrip(
        points in prop::collection::vec((-50i16..50, -50i16..50, -50i16..50), 0..6),
        links in prop::collection::vec(link(), 0..10),
    ) {
        let paths = Paths {
            points: points
                .into_iter()
                .map(|(x, y, z)| PathPoint {
                    position: Vector3::new(f32::from(x), f32::from(y), f32::from(z)),
                    comments: None,
                })
                .collect(),
            links,
            ..Paths::default()
        };
        let back: Paths = from_str(&to_string(&paths).unwrap()).unwrap();
        prop_assert_eq!(back.points, paths.points);
        prop_assert_eq!(back.links, paths.links);
    }
}
