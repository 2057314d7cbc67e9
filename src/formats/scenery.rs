//! Scenery object documents (`*.sco`, `*.cti`).
//!
//! A scenery object is a model with physics, lighting, path and traffic
//! light data attached. The model commands may appear inline or in a
//! separate file named by `[model]`:
//!
//! ```text
//! [friendlyname]
//! Bus stop sign
//!
//! [mesh]
//! sign.o3d
//! [matl]
//! sign.dds
//! 0
//!
//! [mass]
//! 40
//!
//! [boundingbox]
//! 0.3
//! 0.3
//! 3
//! 0
//! 0
//! 1.5
//! ```
//!
//! Vehicles share every command here except `[friendlyname]`, which they
//! redefine. The shared part is [`SceneryCommands`].

use crate::codec::{CommandCodec, DecodeContext, EncodeContext};
use crate::formats::cabin::PassengerCabin;
use crate::formats::model::{Model, ModelCommands};
use crate::formats::paths::Paths;
use crate::formats::Vector3;
use crate::{Command, CommandBuilder, FieldKind, IniMap, Result, Value};
use serde::{Deserialize, Serialize};

#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq)]
pub struct SceneryObject {
    pub friendly_name: Option<FriendlyName>,
    #[serde(flatten)]
    pub scenery: SceneryCommands,
    #[serde(flatten)]
    pub inline_model: ModelCommands,
    pub comments: Option<String>,
    pub post_comments: Option<String>,
}

impl Command for SceneryObject {
    fn describe(cmd: &mut CommandBuilder) {
        cmd.child::<FriendlyName>("friendly_name");
        SceneryCommands::describe(cmd);
        ModelCommands::describe(cmd);
        cmd.comments("comments").trailing_comments("post_comments");
    }
}

/// The commands scenery objects and vehicles have in common.
#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq)]
pub struct SceneryCommands {
    pub script_share: Option<ScriptShare>,
    pub var_name_lists: Vec<VarNameList>,
    pub string_var_name_lists: Vec<StringVarNameList>,
    pub scripts: Vec<Script>,
    pub const_files: Vec<ConstFile>,
    pub model: Option<Model>,
    pub sound: Option<Sound>,
    pub sound_ai: Option<SoundAi>,
    pub paths: Option<Paths>,
    pub passenger_cabin: Option<PassengerCabin>,
    pub only_editor: Option<OnlyEditor>,
    pub complexity: Option<ComplexityCommand>,
    pub abs_height: Option<AbsHeight>,
    pub render_type: Option<RenderType>,
    pub crossing_height_deformation: Option<CrossingHeightDeformation>,
    pub bus_stop: Option<BusStop>,
    pub entry_point: Option<EntryPoint>,
    pub car_park_p: Option<CarParkP>,
    pub traffic_light: Option<TrafficLight>,
    pub signal: Option<Signal>,
    pub track_switch: Option<TrackSwitch>,
    pub help_arrow: Option<HelpArrow>,
    pub depot: Option<Depot>,
    pub petrol_station: Option<PetrolStation>,
    pub tree: Option<Tree>,
    pub groups: Option<Groups>,
    pub light_map_mapping: Option<LightMapMapping>,
    pub night_map_mode: Option<NightMapModeCommand>,
    pub spline_helpers: Vec<SplineHelper>,
    pub reflection_cameras: Vec<ReflectionCamera>,
    pub mass: Option<Mass>,
    pub moment_of_inertia: Option<MomentOfInertia>,
    pub cog: Option<Cog>,
    pub bounding_box: Option<BoundingBox>,
    pub collision_mesh: Option<CollisionMesh>,
    pub no_collision: Option<NoCollision>,
    pub fixed: Option<Fixed>,
    pub crash_mode_pole: Option<CrashModePole>,
    pub surface: Option<Surface>,
    pub attachments: Vec<Attachment>,
    pub map_lights: Vec<MapLight>,
    pub no_map_lighting: Option<NoMapLighting>,
    pub path_segments: Vec<PathSegment>,
    pub traffic_lights_group: Option<TrafficLightsGroup>,
    pub trigger_boxes: Vec<TriggerBox>,
}

impl SceneryCommands {
    /// Registers the shared commands as children of the command being described.
    pub fn describe(cmd: &mut CommandBuilder) {
        cmd.child::<ScriptShare>("script_share")
            .children::<VarNameList>("var_name_lists")
            .children::<StringVarNameList>("string_var_name_lists")
            .children::<Script>("scripts")
            .children::<ConstFile>("const_files")
            .child::<Model>("model")
            .child::<Sound>("sound")
            .child::<SoundAi>("sound_ai")
            .child::<Paths>("paths")
            .child::<PassengerCabin>("passenger_cabin")
            .child::<OnlyEditor>("only_editor")
            .child::<ComplexityCommand>("complexity")
            .child::<AbsHeight>("abs_height")
            .child::<RenderType>("render_type")
            .child::<CrossingHeightDeformation>("crossing_height_deformation")
            .child::<BusStop>("bus_stop")
            .child::<EntryPoint>("entry_point")
            .child::<CarParkP>("car_park_p")
            .child::<TrafficLight>("traffic_light")
            .child::<Signal>("signal")
            .child::<TrackSwitch>("track_switch")
            .child::<HelpArrow>("help_arrow")
            .child::<Depot>("depot")
            .child::<PetrolStation>("petrol_station")
            .child::<Tree>("tree")
            .child::<Groups>("groups")
            .child::<LightMapMapping>("light_map_mapping")
            .child::<NightMapModeCommand>("night_map_mode")
            .children::<SplineHelper>("spline_helpers")
            .children::<ReflectionCamera>("reflection_cameras")
            .child::<Mass>("mass")
            .child::<MomentOfInertia>("moment_of_inertia")
            .child::<Cog>("cog")
            .child::<BoundingBox>("bounding_box")
            .child::<CollisionMesh>("collision_mesh")
            .child::<NoCollision>("no_collision")
            .child::<Fixed>("fixed")
            .child::<CrashModePole>("crash_mode_pole")
            .child::<Surface>("surface")
            .children::<Attachment>("attachments")
            .children::<MapLight>("map_lights")
            .child::<NoMapLighting>("no_map_lighting")
            .children::<PathSegment>("path_segments")
            .child::<TrafficLightsGroup>("traffic_lights_group")
            .children::<TriggerBox>("trigger_boxes");
    }
}

simple_command!(
    /// Name shown in the editor's object list.
    FriendlyName, "friendlyname" {
        name: String = FieldKind::Str,
    }
);

marker_command!(ScriptShare, "scriptshare");

/// Declares a command holding a count-prefixed list of file names.
macro_rules! file_list_command {
    ($name:ident, $tag:literal) => {
        simple_command!($name, $tag {
            files: Vec<String> = FieldKind::list(FieldKind::Str),
        });
    };
}

file_list_command!(VarNameList, "varnamelist");
file_list_command!(StringVarNameList, "stringvarnamelist");
file_list_command!(Script, "script");
file_list_command!(ConstFile, "constfile");

simple_command!(Sound, "sound" { path: String = FieldKind::Str });
simple_command!(SoundAi, "sound_ai" { path: String = FieldKind::Str });

marker_command!(
    /// Only placed while the map editor is open.
    OnlyEditor,
    "onlyeditor"
);

open_enum!(
    /// How essential an object is, compared against the detail setting.
    Complexity: i32, default VERY_IMPORTANT {
        VERY_IMPORTANT = 0,
        IMPORTANT = 1,
        NORMAL = 2,
        DETAIL = 3,
    }
);

simple_command!(ComplexityCommand, "complexity" {
    complexity: Complexity = FieldKind::I32,
});

marker_command!(
    /// Heights are absolute rather than relative to the terrain.
    AbsHeight,
    "absheight"
);

open_enum!(
    RenderPriority: u8, default TWO {
        PRE_SURFACE = 0,
        SURFACE = 1,
        ON_SURFACE = 2,
        ONE = 3,
        TWO = 4,
        THREE = 5,
        FOUR = 6,
    }
);

impl RenderPriority {
    const KEYWORDS: [(&'static str, RenderPriority); 7] = [
        ("presurface", RenderPriority::PRE_SURFACE),
        ("surface", RenderPriority::SURFACE),
        ("on_surface", RenderPriority::ON_SURFACE),
        ("1", RenderPriority::ONE),
        ("2", RenderPriority::TWO),
        ("3", RenderPriority::THREE),
        ("4", RenderPriority::FOUR),
    ];

    /// Reads the keyword form. Unknown keywords select [`RenderPriority::TWO`].
    pub fn from_keyword(keyword: &str) -> Self {
        Self::KEYWORDS
            .iter()
            .find(|(text, _)| *text == keyword)
            .map_or(RenderPriority::TWO, |(_, priority)| *priority)
    }

    pub fn keyword(self) -> &'static str {
        Self::KEYWORDS
            .iter()
            .find(|(_, priority)| *priority == self)
            .map_or("2", |(text, _)| text)
    }
}

/// `[rendertype]`, written as a keyword rather than a number.
#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq)]
pub struct RenderType {
    pub priority: RenderPriority,
    pub comments: Option<String>,
}

impl Command for RenderType {
    fn describe(cmd: &mut CommandBuilder) {
        cmd.tag("rendertype")
            .field("priority", FieldKind::U8)
            .comments("comments")
            .codec(RenderTypeCodec);
    }
}

struct RenderTypeCodec;

impl CommandCodec for RenderTypeCodec {
    fn decode(&self, cx: &mut DecodeContext<'_>, command: &mut IniMap) -> Result<()> {
        let line = cx.read_field("priority", &FieldKind::Str)?;
        let priority = RenderPriority::from_keyword(line.as_str().unwrap_or_default().trim());
        command.insert("priority".into(), Value::from(priority.0));
        Ok(())
    }

    fn encode(&self, cx: &mut EncodeContext<'_>, command: &IniMap) -> Result<()> {
        let code = command
            .get("priority")
            .and_then(Value::as_u64)
            .and_then(|code| u8::try_from(code).ok())
            .map_or(RenderPriority::TWO, RenderPriority);
        cx.write_line(cx.tag_line())?;
        cx.write_line(code.keyword())
    }
}

simple_command!(CrossingHeightDeformation, "crossing_heightdeformation" {
    path: String = FieldKind::Str,
});

marker_command!(BusStop, "busstop");
marker_command!(EntryPoint, "entrypoint");
marker_command!(CarParkP, "carpark_p");
marker_command!(TrafficLight, "trafficlight");
marker_command!(Signal, "signal");

simple_command!(TrackSwitch, "switch" {
    index: i32 = FieldKind::I32,
});

marker_command!(HelpArrow, "helparrow");
marker_command!(Depot, "depot");
marker_command!(PetrolStation, "petrolstation");

simple_command!(
    /// A tree drawn from one texture, scaled randomly within bounds.
    Tree, "tree" {
        texture: String = FieldKind::Str,
        min_height: f32 = FieldKind::F32,
        max_height: f32 = FieldKind::F32,
        min_ratio: f32 = FieldKind::F32,
        max_ratio: f32 = FieldKind::F32,
    }
);

simple_command!(Groups, "groups" {
    groups: Vec<String> = FieldKind::list(FieldKind::Str),
});

marker_command!(LightMapMapping, "LightMapMapping");

open_enum!(
    NightMapMode: i32, default STREET_LIGHT {
        STREET_LIGHT = 0,
        CONTINUOUS = 1,
        RESIDENTIAL_BUILDING = 2,
        COMMERCIAL_BUILDING = 3,
        SCHOOL = 4,
    }
);

simple_command!(NightMapModeCommand, "NightMapMode" {
    mode: NightMapMode = FieldKind::I32,
});

simple_command!(SplineHelper, "splinehelper" {
    path: String = FieldKind::Str,
    position: Vector3 = FieldKind::aggregate::<Vector3>(),
    heading: f32 = FieldKind::F32,
    pitch: f32 = FieldKind::F32,
    cant: f32 = FieldKind::F32,
});

/// A camera rendering reflections, `[add_camera_reflexion_2]`.
///
/// `[add_camera_reflexion]` has no render distance and reads as zero.
#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq)]
pub struct ReflectionCamera {
    pub position: Vector3,
    pub orbit_distance: f32,
    pub fov: f32,
    pub pitch: f32,
    pub yaw: f32,
    pub render_distance: f32,
    pub comments: Option<String>,
}

impl Command for ReflectionCamera {
    fn describe(cmd: &mut CommandBuilder) {
        cmd.tag("add_camera_reflexion_2")
            .field("position", FieldKind::aggregate::<Vector3>())
            .field("orbit_distance", FieldKind::F32)
            .field("fov", FieldKind::F32)
            .field("pitch", FieldKind::F32)
            .field("yaw", FieldKind::F32)
            .field("render_distance", FieldKind::F32)
            .comments("comments")
            .derived::<LegacyReflectionCamera>();
    }
}

simple_command!(LegacyReflectionCamera, "add_camera_reflexion" {
    position: Vector3 = FieldKind::aggregate::<Vector3>(),
    orbit_distance: f32 = FieldKind::F32,
    fov: f32 = FieldKind::F32,
    pitch: f32 = FieldKind::F32,
    yaw: f32 = FieldKind::F32,
});

simple_command!(Mass, "mass" { mass: f32 = FieldKind::F32 });

// The tag is misspelt in the simulator as well.
simple_command!(MomentOfInertia, "momentofintertia" {
    moment: Vector3 = FieldKind::aggregate::<Vector3>(),
});

simple_command!(
    /// Centre of gravity.
    Cog, "cog" {
        cog: Vector3 = FieldKind::aggregate::<Vector3>(),
    }
);

simple_command!(BoundingBox, "boundingbox" {
    size: Vector3 = FieldKind::aggregate::<Vector3>(),
    centre: Vector3 = FieldKind::aggregate::<Vector3>(),
});

simple_command!(CollisionMesh, "collision_mesh" {
    path: String = FieldKind::Str,
});

marker_command!(NoCollision, "nocollision");
marker_command!(Fixed, "fixed");
marker_command!(CrashModePole, "crashmode_pole");
marker_command!(Surface, "surface");
marker_command!(Attachment, "new_attachment");

simple_command!(
    /// A light source baked into the map's night lighting.
    MapLight, "maplight" {
        pos: Vector3 = FieldKind::aggregate::<Vector3>(),
        colour: Vector3 = FieldKind::aggregate::<Vector3>(),
        radius: f32 = FieldKind::F32,
    }
);

marker_command!(NoMapLighting, "nomaplighting");

open_enum!(
    PathType: i32, default STREET {
        STREET = 0,
        SIDEWALK = 1,
        RAILROAD = 2,
    }
);

open_enum!(
    PathDirection: i32, default FORWARD {
        FORWARD = 0,
        REVERSE = 1,
        BOTH = 2,
    }
);

open_enum!(
    PathBlinker: i32, default NONE {
        NONE = 0,
        STRAIGHT = 1,
        LEFT = 2,
        RIGHT = 3,
    }
);

/// A traffic path across the object, `[path_2]`.
///
/// The older `[path]` has no cant; it reads as zero at both ends.
#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq)]
pub struct PathSegment {
    pub pos: Vector3,
    pub heading: f32,
    pub radius: f32,
    pub length: f32,
    pub grad_start: f32,
    pub grad_end: f32,
    pub path_type: PathType,
    pub width: f32,
    pub direction: PathDirection,
    pub blinker: PathBlinker,
    pub cant_start: f32,
    pub cant_end: f32,
    pub traffic_light: Option<UseTrafficLight>,
    pub switch_dir: Option<SwitchDir>,
    pub crossing_problem: Option<CrossingProblem>,
    pub block_paths: Vec<BlockPath>,
    pub rail: Option<RailEnh>,
    pub third_rails: Vec<ThirdRail>,
    pub comments: Option<String>,
}

/// Registers the fields `[path]` and `[path_2]` share, up to the blinker.
fn describe_path_geometry(cmd: &mut CommandBuilder) {
    cmd.field("pos", FieldKind::aggregate::<Vector3>())
        .field("heading", FieldKind::F32)
        .field("radius", FieldKind::F32)
        .field("length", FieldKind::F32)
        .field("grad_start", FieldKind::F32)
        .field("grad_end", FieldKind::F32)
        .field("path_type", FieldKind::I32)
        .field("width", FieldKind::F32)
        .field("direction", FieldKind::I32)
        .field("blinker", FieldKind::I32);
}

/// Registers the sub-commands `[path]` and `[path_2]` share.
fn describe_path_children(cmd: &mut CommandBuilder) {
    cmd.child::<UseTrafficLight>("traffic_light")
        .child::<SwitchDir>("switch_dir")
        .child::<CrossingProblem>("crossing_problem")
        .children::<BlockPath>("block_paths")
        .child::<RailEnh>("rail")
        .children::<ThirdRail>("third_rails")
        .comments("comments");
}

impl Command for PathSegment {
    fn describe(cmd: &mut CommandBuilder) {
        cmd.tag("path_2");
        describe_path_geometry(cmd);
        cmd.field("cant_start", FieldKind::F32)
            .field("cant_end", FieldKind::F32)
            .derived::<LegacyPathSegment>();
        describe_path_children(cmd);
    }
}

/// `[path]`
#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq)]
pub struct LegacyPathSegment {
    pub pos: Vector3,
    pub heading: f32,
    pub radius: f32,
    pub length: f32,
    pub grad_start: f32,
    pub grad_end: f32,
    pub path_type: PathType,
    pub width: f32,
    pub direction: PathDirection,
    pub blinker: PathBlinker,
    pub traffic_light: Option<UseTrafficLight>,
    pub switch_dir: Option<SwitchDir>,
    pub crossing_problem: Option<CrossingProblem>,
    pub block_paths: Vec<BlockPath>,
    pub rail: Option<RailEnh>,
    pub third_rails: Vec<ThirdRail>,
    pub comments: Option<String>,
}

impl Command for LegacyPathSegment {
    fn describe(cmd: &mut CommandBuilder) {
        cmd.tag("path");
        describe_path_geometry(cmd);
        describe_path_children(cmd);
    }
}

simple_command!(UseTrafficLight, "use_traffic_light" {
    index: i32 = FieldKind::I32,
});

simple_command!(SwitchDir, "switchdir" {
    direction: u8 = FieldKind::U8,
});

marker_command!(CrossingProblem, "crossingproblem");

simple_command!(BlockPath, "blockpath" {
    blocked_path: i32 = FieldKind::I32,
    param: u8 = FieldKind::U8,
});

simple_command!(
    /// Rail geometry and track distortion of a railroad path.
    RailEnh, "rail_enh" {
        length: f32 = FieldKind::F32,
        thrusts: i32 = FieldKind::I32,
        distortion_wavelength: f32 = FieldKind::F32,
        distortion_amplitude: f32 = FieldKind::F32,
        distortion_pot: f32 = FieldKind::F32,
        distortion_wavelength_z: f32 = FieldKind::F32,
        distortion_amplitude_z: f32 = FieldKind::F32,
        distortion_pot_z: f32 = FieldKind::F32,
    }
);

simple_command!(ThirdRail, "third_rail" {
    pos_x: f32 = FieldKind::F32,
    pos_z: f32 = FieldKind::F32,
    flags: u8 = FieldKind::U8,
    voltage: f32 = FieldKind::F32,
    frequency: f32 = FieldKind::F32,
    sig_a: f32 = FieldKind::F32,
});

/// Signal programme of the traffic lights on this object.
#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq)]
pub struct TrafficLightsGroup {
    pub cycle_duration: f32,
    pub lights: Vec<TrafficLightDef>,
    pub stops: Vec<TrafficLightStop>,
    pub jumps: Vec<TrafficLightJump>,
    pub comments: Option<String>,
}

impl Command for TrafficLightsGroup {
    fn describe(cmd: &mut CommandBuilder) {
        cmd.tag("traffic_lights_group")
            .field("cycle_duration", FieldKind::F32)
            .children::<TrafficLightDef>("lights")
            .children::<TrafficLightStop>("stops")
            .children::<TrafficLightJump>("jumps")
            .comments("comments");
    }
}

#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq)]
pub struct TrafficLightDef {
    pub name: String,
    pub phases: Vec<Phase>,
    pub approach_dist: Option<ApproachDist>,
    pub comments: Option<String>,
}

impl Command for TrafficLightDef {
    fn describe(cmd: &mut CommandBuilder) {
        cmd.tag("traffic_light")
            .field("name", FieldKind::Str)
            .children::<Phase>("phases")
            .child::<ApproachDist>("approach_dist")
            .comments("comments");
    }
}

open_enum!(
    TrafficLightPhase: u8, default RED {
        RED = 0,
        RED_1 = 1,
        RED_2 = 2,
        YELLOW_RG = 3,
        YELLOW_RG_1 = 4,
        YELLOW_RG_2 = 5,
        GREEN = 6,
        GREEN_1 = 7,
        GREEN_2 = 8,
        YELLOW_GR = 9,
        YELLOW_GR_1 = 10,
        YELLOW_GR_2 = 11,
        OFF = 12,
    }
);

simple_command!(
    /// Switches the light to `phase` at `time` seconds into the cycle.
    Phase, "phase" {
        phase: TrafficLightPhase = FieldKind::U8,
        time: f32 = FieldKind::F32,
    }
);

simple_command!(ApproachDist, "approachdist" {
    distance: f32 = FieldKind::F32,
});

simple_command!(TrafficLightStop, "traffic_light_stop" {
    traffic_light: i32 = FieldKind::I32,
    time: f32 = FieldKind::F32,
    if_no_approach: bool = FieldKind::Bool,
});

simple_command!(TrafficLightJump, "traffic_light_jump" {
    traffic_light: i32 = FieldKind::I32,
    time: f32 = FieldKind::F32,
    if_no_approach: bool = FieldKind::Bool,
    jump_time: f32 = FieldKind::F32,
});

#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq)]
pub struct TriggerBox {
    pub size: Vector3,
    pub centre: Vector3,
    pub set_reverb: Option<TriggerBoxSetReverb>,
    pub comments: Option<String>,
}

impl Command for TriggerBox {
    fn describe(cmd: &mut CommandBuilder) {
        cmd.tag("triggerbox_new")
            .field("size", FieldKind::aggregate::<Vector3>())
            .field("centre", FieldKind::aggregate::<Vector3>())
            .child::<TriggerBoxSetReverb>("set_reverb")
            .comments("comments");
    }
}

simple_command!(TriggerBoxSetReverb, "triggerbox_setreverb" {
    time: f32 = FieldKind::F32,
});

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{from_str, to_string_with_options, EncodeOptions, LineEnding};
    use indoc::indoc;

    const SIGN: &str = indoc! {"
        [friendlyname]
        Bus stop sign

        [groups]
        2
        Signs
        Stops

        [rendertype]
        on_surface

        [complexity]
        7

        [mesh]
        sign.o3d
        [matl]
        sign.dds
        0

        [mass]
        40

        [boundingbox]
        0.3
        0.3
        3
        0
        0
        1.5

        [busstop]
        [path]
        0
        0
        0
        90
        0
        5
        0
        0
        1
        1
        2
        0
        [use_traffic_light]
        0
        [blockpath]
        1
        2
    "};

    fn lf() -> EncodeOptions {
        EncodeOptions::new().with_line_ending(LineEnding::Lf)
    }

    #[test]
    fn test_decode_scenery_object() {
        let sign: SceneryObject = from_str(SIGN).unwrap();
        assert_eq!(sign.friendly_name.as_ref().map(|n| n.name.as_str()), Some("Bus stop sign"));

        let scenery = &sign.scenery;
        assert_eq!(scenery.groups.as_ref().map(|g| g.groups.len()), Some(2));
        assert_eq!(
            scenery.render_type.as_ref().map(|r| r.priority),
            Some(RenderPriority::ON_SURFACE)
        );
        assert_eq!(scenery.mass.as_ref().map(|m| m.mass), Some(40.0));
        assert_eq!(
            scenery.bounding_box.as_ref().map(|b| b.centre),
            Some(Vector3::new(0.0, 0.0, 1.5))
        );
        assert!(scenery.bus_stop.is_some());

        assert_eq!(sign.inline_model.meshes[0].path, "sign.o3d");
        assert_eq!(sign.inline_model.meshes[0].matls[0].path, "sign.dds");
    }

    #[test]
    fn test_unlisted_complexity_is_kept() {
        let sign: SceneryObject = from_str(SIGN).unwrap();
        let complexity = sign.scenery.complexity.as_ref().map(|c| c.complexity).unwrap();
        assert_eq!(complexity, Complexity(7));
        assert!(!complexity.is_known());

        let written = to_string_with_options(&sign, &lf()).unwrap();
        assert!(written.contains("[complexity]\n7\n"));
    }

    #[test]
    fn test_legacy_path_is_upgraded() {
        let sign: SceneryObject = from_str(SIGN).unwrap();
        let segment = &sign.scenery.path_segments[0];
        assert_eq!(segment.heading, 90.0);
        assert_eq!(segment.length, 5.0);
        assert_eq!(segment.path_type, PathType::SIDEWALK);
        assert_eq!(segment.direction, PathDirection::BOTH);
        assert_eq!(segment.blinker, PathBlinker::NONE);
        assert_eq!(segment.cant_end, 0.0);
        assert_eq!(segment.traffic_light.as_ref().map(|t| t.index), Some(0));
        assert_eq!(segment.block_paths[0].blocked_path, 1);

        let written = to_string_with_options(&sign, &lf()).unwrap();
        assert!(written.contains("[path_2]\n"));
        assert!(!written.contains("[path]\n"));
    }

    #[test]
    fn test_reencode_is_stable() {
        let sign: SceneryObject = from_str(SIGN).unwrap();
        let first = to_string_with_options(&sign, &lf()).unwrap();
        let again: SceneryObject = from_str(&first).unwrap();
        assert_eq!(again, sign);
        assert_eq!(to_string_with_options(&again, &lf()).unwrap(), first);
    }

    #[test]
    fn test_render_type_keywords() {
        assert_eq!(RenderPriority::from_keyword("presurface"), RenderPriority::PRE_SURFACE);
        assert_eq!(RenderPriority::from_keyword("3"), RenderPriority::THREE);
        assert_eq!(RenderPriority::from_keyword("bogus"), RenderPriority::TWO);
        assert_eq!(RenderPriority(42).keyword(), "2");
        assert_eq!(RenderPriority::SURFACE.keyword(), "surface");
    }

    #[test]
    fn test_traffic_light_programme() {
        let text = indoc! {"
            [traffic_lights_group]
            60
            [traffic_light]
            main
            [phase]
            6
            0
            [phase]
            9
            25
            [approachdist]
            15
            [traffic_light]
            side
            [phase]
            0
            0
            [traffic_light_stop]
            0
            20
            1
        "};
        let object: SceneryObject = from_str(text).unwrap();
        let group = object.scenery.traffic_lights_group.as_ref().unwrap();
        assert_eq!(group.cycle_duration, 60.0);
        assert_eq!(group.lights.len(), 2);
        assert_eq!(group.lights[0].phases[1].phase, TrafficLightPhase::YELLOW_GR);
        assert_eq!(group.lights[0].approach_dist.as_ref().map(|a| a.distance), Some(15.0));
        assert_eq!(group.lights[1].name, "side");
        assert!(group.stops[0].if_no_approach);
    }
}
