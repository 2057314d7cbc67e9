//! Path graph documents.
//!
//! ```text
//! [stepsoundpack]
//! 2
//! sound\step_wood1.wav
//! sound\step_wood2.wav
//!
//! [pathpnt]
//! 0.5
//! -1.2
//! 0.9
//!
//! [next_stepsound]
//! 0
//!
//! [next_roomheight]
//! 2.1
//!
//! [pathlink]
//! 0
//! 1
//! ```
//!
//! `[next_stepsound]` and `[next_roomheight]` are not stored with the links
//! they precede. They set the step sound and room height of every following
//! link until the next directive. Decoding copies the current values into
//! each link; encoding writes a directive whenever the values change.

use crate::codec::{CommandCodec, DecodeContext, EncodeContext};
use crate::formats::Vector3;
use crate::{Command, CommandBuilder, FieldKind, IniMap, Result, Skip, Value};
use serde::{Deserialize, Serialize};

/// A path file, or a `[paths]` reference to one inside a vehicle document.
#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq)]
pub struct Paths {
    pub path: String,
    pub step_sounds: Vec<StepSoundPack>,
    pub points: Vec<PathPoint>,
    pub links: Vec<PathLink>,
    pub next_room_height: Option<NextRoomHeight>,
    pub next_step_sound: Option<NextStepSound>,
    pub comments: Option<String>,
    pub post_comments: Option<String>,
}

impl Command for Paths {
    fn describe(cmd: &mut CommandBuilder) {
        cmd.tag("paths")
            .file_reference("path")
            .children::<StepSoundPack>("step_sounds")
            .children::<PathPoint>("points")
            .children::<PathLink>("links")
            .child::<NextRoomHeight>("next_room_height")
            .child::<NextStepSound>("next_step_sound")
            .skip("next_room_height", Skip::Encode)
            .skip("next_step_sound", Skip::Encode)
            .comments("comments")
            .trailing_comments("post_comments");
    }
}

#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq)]
pub struct StepSoundPack {
    pub sound_files: Vec<String>,
    pub comments: Option<String>,
}

impl Command for StepSoundPack {
    fn describe(cmd: &mut CommandBuilder) {
        cmd.tag("stepsoundpack")
            .field("sound_files", FieldKind::list(FieldKind::Str))
            .comments("comments");
    }
}

#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq)]
pub struct PathPoint {
    pub position: Vector3,
    pub comments: Option<String>,
}

impl Command for PathPoint {
    fn describe(cmd: &mut CommandBuilder) {
        cmd.tag("pathpnt")
            .field("position", FieldKind::aggregate::<Vector3>())
            .comments("comments");
    }
}

/// A connection between two path points, by index.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
#[serde(rename_all = "snake_case")]
pub enum PathLink {
    /// `[pathlink]`
    TwoWay(PathLinkData),
    /// `[pathlink_oneway]`
    OneWay(PathLinkData),
}

impl Default for PathLink {
    fn default() -> Self {
        PathLink::TwoWay(PathLinkData::default())
    }
}

impl PathLink {
    pub fn data(&self) -> &PathLinkData {
        match self {
            PathLink::TwoWay(data) | PathLink::OneWay(data) => data,
        }
    }
}

impl Command for PathLink {
    fn describe(cmd: &mut CommandBuilder) {
        cmd.variant::<PathLinkData>("two_way", "pathlink")
            .variant::<PathLinkData>("one_way", "pathlink_oneway");
    }
}

#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq)]
pub struct PathLinkData {
    pub a: i32,
    pub b: i32,
    /// Set by the preceding `[next_stepsound]`.
    pub step_sound: i32,
    /// Set by the preceding `[next_roomheight]`.
    pub room_height: f32,
    pub comments: Option<String>,
}

impl Command for PathLinkData {
    fn describe(cmd: &mut CommandBuilder) {
        cmd.field("a", FieldKind::I32)
            .field("b", FieldKind::I32)
            .comments("comments")
            .codec(PathLinkCodec);
    }
}

#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq)]
pub struct NextStepSound {
    pub index: i32,
}

impl Command for NextStepSound {
    fn describe(cmd: &mut CommandBuilder) {
        cmd.tag("next_stepsound").field("index", FieldKind::I32);
    }
}

#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq)]
pub struct NextRoomHeight {
    pub height: f32,
}

impl Command for NextRoomHeight {
    fn describe(cmd: &mut CommandBuilder) {
        cmd.tag("next_roomheight").field("height", FieldKind::F32);
    }
}

const STEP_SOUND: &str = "step_sound";
const ROOM_HEIGHT: &str = "room_height";

/// Carries the `[next_*]` directives into and out of the links.
struct PathLinkCodec;

impl CommandCodec for PathLinkCodec {
    fn decode(&self, cx: &mut DecodeContext<'_>, command: &mut IniMap) -> Result<()> {
        let a = cx.read_field("a", &FieldKind::I32)?;
        let b = cx.read_field("b", &FieldKind::I32)?;

        let directive = |field: &str, member: &str| {
            cx.parent()
                .get(field)
                .and_then(|value| value.get(member))
                .cloned()
        };
        let step_sound = directive("next_step_sound", "index").unwrap_or(Value::from(0i32));
        let room_height = directive("next_room_height", "height").unwrap_or(Value::from(0f32));

        command.insert("a".into(), a);
        command.insert("b".into(), b);
        command.insert(STEP_SOUND.into(), step_sound);
        command.insert(ROOM_HEIGHT.into(), room_height);
        Ok(())
    }

    fn encode(&self, cx: &mut EncodeContext<'_>, command: &IniMap) -> Result<()> {
        let step_sound = command.get(STEP_SOUND).cloned().unwrap_or(Value::from(0i32));
        let room_height = command.get(ROOM_HEIGHT).cloned().unwrap_or(Value::from(0f32));

        if cx.state().get(STEP_SOUND).and_then(Value::as_i64) != step_sound.as_i64() {
            cx.write_line("[next_stepsound]")?;
            cx.write_field(&FieldKind::I32, &step_sound)?;
        }
        if cx.state().get(ROOM_HEIGHT).and_then(Value::as_f64) != room_height.as_f64() {
            cx.write_line("[next_roomheight]")?;
            cx.write_field(&FieldKind::F32, &room_height)?;
        }

        cx.write_line(cx.tag_line())?;
        for end in ["a", "b"] {
            cx.write_field(&FieldKind::I32, command.get(end).unwrap_or(&Value::Null))?;
        }

        cx.state().insert(STEP_SOUND.into(), step_sound);
        cx.state().insert(ROOM_HEIGHT.into(), room_height);
        Ok(())
    }
}
