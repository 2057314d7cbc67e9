//! Road vehicle documents (`*.bus`, `*.ovh`).
//!
//! A vehicle is a scenery object that drives: it carries every
//! [`SceneryCommands`] entry and may hold model commands inline, plus axles,
//! cameras and coupling data. `[model]`, `[paths]` and `[passengercabin]`
//! each name a file holding that part of the vehicle. Articulated vehicles
//! name the coupled parts with `[couple_back]` and `[couple_front]`, which
//! are complete vehicle documents themselves. With recursive decoding all of
//! these are read in place.

use crate::codec::{CommandCodec, DecodeContext, EncodeContext};
use crate::formats::model::ModelCommands;
use crate::formats::scenery::SceneryCommands;
use crate::formats::{Vector2, Vector3};
use crate::{Command, CommandBuilder, Error, FieldKind, IniMap, Result, Value};
use serde::{Deserialize, Serialize};

#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq)]
pub struct Vehicle {
    pub friendly_name: Option<FriendlyName>,
    pub description: Option<Description>,
    pub vehicle_type: Option<TypeCommand>,
    pub ai_veh_type: Option<AiVehTypeCommand>,
    #[serde(flatten)]
    pub scenery: SceneryCommands,
    pub number: Option<FleetNumber>,
    pub registration_automatic: Option<RegistrationAutomatic>,
    pub registration_list: Option<RegistrationList>,
    pub registration_free: Option<RegistrationFree>,
    pub km_counter_init: Option<KmCounterInit>,
    pub driver_cameras: Vec<DriverCamera>,
    pub pax_cameras: Vec<PaxCamera>,
    pub std_camera: Option<SetCameraStd>,
    pub outside_camera_centre: Option<SetCameraOutsideCenter>,
    pub centre_of_mass: Option<CentreOfMass>,
    pub rolling_resistance: Option<RollingResistance>,
    pub rot_point_long: Option<RotPointLong>,
    pub inv_min_turn_radius: Option<InvMinTurnRadius>,
    pub ai_delta_height: Option<AiDeltaHeight>,
    pub ai_brake_performance: Option<AiBrakePerformance>,
    pub rowdy_factor: Option<RowdyFactor>,
    pub axles: Vec<Axle>,
    pub bogies: Option<Bogies>,
    pub sinus: Option<Sinus>,
    pub rail_body_osc: Option<RailBodyOsc>,
    pub contact_shoes: Vec<ContactShoe>,
    pub coupling_back: Option<CouplingBack>,
    pub coupling_front: Option<CouplingFront>,
    pub coupling_front_character: Option<CouplingFrontCharacter>,
    pub control_cable_backs: Vec<ControlCableBack>,
    pub control_cable_fronts: Vec<ControlCableFront>,
    pub couple_back: Option<Box<CoupleBack>>,
    pub couple_front: Option<Box<CoupleFront>>,
    #[serde(flatten)]
    pub inline_model: ModelCommands,
    pub comments: Option<String>,
    pub post_comments: Option<String>,
}

impl Command for Vehicle {
    fn describe(cmd: &mut CommandBuilder) {
        cmd.child::<FriendlyName>("friendly_name")
            .child::<Description>("description")
            .child::<TypeCommand>("vehicle_type")
            .child::<AiVehTypeCommand>("ai_veh_type");
        SceneryCommands::describe(cmd);
        cmd.child::<FleetNumber>("number")
            .child::<RegistrationAutomatic>("registration_automatic")
            .child::<RegistrationList>("registration_list")
            .child::<RegistrationFree>("registration_free")
            .child::<KmCounterInit>("km_counter_init")
            .children::<DriverCamera>("driver_cameras")
            .children::<PaxCamera>("pax_cameras")
            .child::<SetCameraStd>("std_camera")
            .child::<SetCameraOutsideCenter>("outside_camera_centre")
            .child::<CentreOfMass>("centre_of_mass")
            .child::<RollingResistance>("rolling_resistance")
            .child::<RotPointLong>("rot_point_long")
            .child::<InvMinTurnRadius>("inv_min_turn_radius")
            .child::<AiDeltaHeight>("ai_delta_height")
            .child::<AiBrakePerformance>("ai_brake_performance")
            .child::<RowdyFactor>("rowdy_factor")
            .children::<Axle>("axles")
            .child::<Bogies>("bogies")
            .child::<Sinus>("sinus")
            .child::<RailBodyOsc>("rail_body_osc")
            .children::<ContactShoe>("contact_shoes")
            .child::<CouplingBack>("coupling_back")
            .child::<CouplingFront>("coupling_front")
            .child::<CouplingFrontCharacter>("coupling_front_character")
            .children::<ControlCableBack>("control_cable_backs")
            .children::<ControlCableFront>("control_cable_fronts")
            .child::<CoupleBack>("couple_back")
            .child::<CoupleFront>("couple_front");
        ModelCommands::describe(cmd);
        cmd.comments("comments").trailing_comments("post_comments");
    }
}

/// Declares a vehicle coupled through a file reference.
macro_rules! coupled_vehicle {
    ($(#[$meta:meta])* $name:ident, $tag:literal) => {
        $(#[$meta])*
        #[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq)]
        pub struct $name {
            pub path: String,
            /// `true` if the coupled vehicle faces backwards. Kept as written.
            pub reverse: String,
            #[serde(flatten)]
            pub vehicle: Vehicle,
        }

        impl Command for $name {
            fn describe(cmd: &mut CommandBuilder) {
                Vehicle::describe(cmd);
                cmd.tag($tag)
                    .file_reference("path")
                    .field("reverse", FieldKind::Str);
            }
        }
    };
}

coupled_vehicle!(
    /// The trailing part of an articulated vehicle.
    CoupleBack,
    "couple_back"
);
coupled_vehicle!(CoupleFront, "couple_front");

#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq)]
pub struct FriendlyName {
    pub manufacturer: String,
    pub friendly_name: String,
    pub std_colour_scheme: String,
    pub comments: Option<String>,
}

impl Command for FriendlyName {
    fn describe(cmd: &mut CommandBuilder) {
        cmd.tag("friendlyname")
            .field("manufacturer", FieldKind::Str)
            .field("friendly_name", FieldKind::Str)
            .field("std_colour_scheme", FieldKind::Str)
            .comments("comments")
            .derived::<HiddenFriendlyName>();
    }
}

/// `[friendlyname_inv]`: a vehicle hidden from the selection list.
#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq)]
pub struct HiddenFriendlyName {
    pub manufacturer: String,
    pub friendly_name: String,
    pub std_colour_scheme: String,
    pub comments: Option<String>,
}

impl Command for HiddenFriendlyName {
    fn describe(cmd: &mut CommandBuilder) {
        cmd.tag("friendlyname_inv")
            .field("manufacturer", FieldKind::Str)
            .field("friendly_name", FieldKind::Str)
            .field("std_colour_scheme", FieldKind::Str)
            .comments("comments");
    }
}

/// Free text between `[description]` and `[end]`.
#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq)]
pub struct Description {
    /// Every line followed by `\n`.
    pub text: String,
    pub comments: Option<String>,
}

impl Command for Description {
    fn describe(cmd: &mut CommandBuilder) {
        cmd.tag("description")
            .field("text", FieldKind::Str)
            .comments("comments")
            .codec(DescriptionCodec);
    }
}

const END_OF_TEXT: &str = "[end]";

struct DescriptionCodec;

impl CommandCodec for DescriptionCodec {
    fn decode(&self, cx: &mut DecodeContext<'_>, command: &mut IniMap) -> Result<()> {
        let mut text = String::new();
        loop {
            let line = cx
                .read_line()?
                .ok_or_else(|| Error::unexpected_eof(cx.line_number(), "text", "Description"))?;
            if line == END_OF_TEXT {
                break;
            }
            text.push_str(&line);
            text.push('\n');
        }
        command.insert("text".into(), Value::String(text));
        Ok(())
    }

    fn encode(&self, cx: &mut EncodeContext<'_>, command: &IniMap) -> Result<()> {
        cx.write_line(cx.tag_line())?;
        let text = command.get("text").and_then(Value::as_str).unwrap_or_default();
        for line in text.lines() {
            cx.write_line(line)?;
        }
        cx.write_line(END_OF_TEXT)
    }
}

open_enum!(
    VehicleType: u8, default NONE {
        NONE = 0,
        BUS = 1,
        TRAIN = 2,
        AIRCRAFT = 3,
    }
);

#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq)]
pub struct TypeCommand {
    pub kind: VehicleType,
    pub comments: Option<String>,
}

impl Command for TypeCommand {
    fn describe(cmd: &mut CommandBuilder) {
        cmd.tag("type").field("kind", FieldKind::U8).comments("comments");
    }
}

open_enum!(
    /// Role of a vehicle in AI traffic.
    AiVehType: u8, default CAR {
        CAR = 0,
        TAXI = 1,
        BUS = 2,
        TRUCK = 3,
    }
);

#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq)]
pub struct AiVehTypeCommand {
    pub kind: AiVehType,
    pub comments: Option<String>,
}

impl Command for AiVehTypeCommand {
    fn describe(cmd: &mut CommandBuilder) {
        cmd.tag("ai_veh_type")
            .field("kind", FieldKind::U8)
            .comments("comments");
    }
}

/// Declares a coupling point command.
macro_rules! coupling_command {
    ($name:ident, $tag:literal) => {
        #[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq)]
        pub struct $name {
            pub pos: Vector3,
            pub comments: Option<String>,
        }

        impl Command for $name {
            fn describe(cmd: &mut CommandBuilder) {
                cmd.tag($tag)
                    .field("pos", FieldKind::aggregate::<Vector3>())
                    .comments("comments");
            }
        }
    };
}

coupling_command!(CouplingBack, "coupling_back");
coupling_command!(CouplingFront, "coupling_front");

/// Declares a control cable command.
macro_rules! control_cable_command {
    ($name:ident, $tag:literal) => {
        /// A variable shared with the coupled vehicle.
        #[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
        pub struct $name {
            /// `C`, `L` or `R`.
            pub side: char,
            pub number: i32,
            pub read_var: String,
            pub write_var: String,
            pub coupling_var: String,
            pub comments: Option<String>,
        }

        impl Default for $name {
            fn default() -> Self {
                $name {
                    side: 'C',
                    number: 0,
                    read_var: String::new(),
                    write_var: String::new(),
                    coupling_var: String::new(),
                    comments: None,
                }
            }
        }

        impl Command for $name {
            fn describe(cmd: &mut CommandBuilder) {
                cmd.tag($tag)
                    .field("side", FieldKind::Char)
                    .field("number", FieldKind::I32)
                    .field("read_var", FieldKind::Str)
                    .field("write_var", FieldKind::Str)
                    .field("coupling_var", FieldKind::Str)
                    .comments("comments");
            }
        }
    };
}

control_cable_command!(ControlCableBack, "control_cable_back");
control_cable_command!(ControlCableFront, "control_cable_front");

simple_command!(
    /// File with the fleet numbers to pick from.
    FleetNumber, "number" {
        path: String = FieldKind::Str,
    }
);

simple_command!(RegistrationAutomatic, "registration_automatic" {
    prefix: String = FieldKind::Str,
    postfix: String = FieldKind::Str,
});

simple_command!(RegistrationList, "registration_list" {
    path: String = FieldKind::Str,
});

marker_command!(RegistrationFree, "registration_free");

simple_command!(KmCounterInit, "kmcounter_init" {
    start_year: i32 = FieldKind::I32,
    km_per_year: i32 = FieldKind::I32,
});

/// A driver's seat camera. `rotation` holds the initial yaw and pitch.
#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq)]
pub struct DriverCamera {
    pub pos: Vector3,
    pub pivot_distance: f32,
    pub fov: f32,
    pub rotation: Vector2,
    pub view_schedule: Option<ViewSchedule>,
    pub view_ticket_selling: Option<ViewTicketSelling>,
    pub comments: Option<String>,
}

impl Command for DriverCamera {
    fn describe(cmd: &mut CommandBuilder) {
        cmd.tag("add_camera_driver")
            .field("pos", FieldKind::aggregate::<Vector3>())
            .field("pivot_distance", FieldKind::F32)
            .field("fov", FieldKind::F32)
            .field("rotation", FieldKind::aggregate::<Vector2>())
            .child::<ViewSchedule>("view_schedule")
            .child::<ViewTicketSelling>("view_ticket_selling")
            .comments("comments");
    }
}

marker_command!(ViewSchedule, "view_schedule");
marker_command!(ViewTicketSelling, "view_ticketselling");

simple_command!(PaxCamera, "add_camera_pax" {
    pos: Vector3 = FieldKind::aggregate::<Vector3>(),
    pivot_distance: f32 = FieldKind::F32,
    fov: f32 = FieldKind::F32,
    rotation: Vector2 = FieldKind::aggregate::<Vector2>(),
});

simple_command!(SetCameraStd, "set_camera_std" {
    index: i32 = FieldKind::I32,
});

simple_command!(SetCameraOutsideCenter, "set_camera_outside_center" {
    pos: Vector3 = FieldKind::aggregate::<Vector3>(),
});

simple_command!(
    /// Height of the centre of mass, `[schwerpunkt]`.
    CentreOfMass, "schwerpunkt" {
        height: f32 = FieldKind::F32,
    }
);

simple_command!(
    /// Rolling resistance in newtons, `[rollwiderstand]`.
    RollingResistance, "rollwiderstand" {
        resistance: f32 = FieldKind::F32,
    }
);

simple_command!(RotPointLong, "rot_pnt_long" {
    position: f32 = FieldKind::F32,
});

simple_command!(InvMinTurnRadius, "inv_min_turnradius" {
    inv_radius: f32 = FieldKind::F32,
});

simple_command!(AiDeltaHeight, "ai_deltaheight" {
    height: f32 = FieldKind::F32,
});

simple_command!(AiBrakePerformance, "ai_brakeperformance" {
    avg_deceleration: f32 = FieldKind::F32,
    variation: f32 = FieldKind::F32,
    friction_influence: f32 = FieldKind::F32,
    final_brake_strength: f32 = FieldKind::F32,
    stop_point_offset: f32 = FieldKind::F32,
});

simple_command!(RowdyFactor, "rowdy_factor" {
    min: f32 = FieldKind::F32,
    max: f32 = FieldKind::F32,
});

/// An axle, `[newachse]`, described by the bare sub-commands that follow it.
#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq)]
pub struct Axle {
    pub position: Option<AxlePosition>,
    pub max_width: Option<AxleMaxWidth>,
    pub min_width: Option<AxleMinWidth>,
    pub wheel_diameter: Option<AxleWheelDiameter>,
    pub spring: Option<AxleSpring>,
    pub max_force: Option<AxleMaxForce>,
    pub damper: Option<AxleDamper>,
    pub driven: Option<AxleDriven>,
    pub inertia_inv: Option<AxleInertiaInv>,
    pub comments: Option<String>,
}

impl Command for Axle {
    fn describe(cmd: &mut CommandBuilder) {
        cmd.tag("newachse")
            .child::<AxlePosition>("position")
            .child::<AxleMaxWidth>("max_width")
            .child::<AxleMinWidth>("min_width")
            .child::<AxleWheelDiameter>("wheel_diameter")
            .child::<AxleSpring>("spring")
            .child::<AxleMaxForce>("max_force")
            .child::<AxleDamper>("damper")
            .child::<AxleDriven>("driven")
            .child::<AxleInertiaInv>("inertia_inv")
            .comments("comments");
    }
}

/// Declares a bare axle sub-command holding one value.
macro_rules! axle_command {
    ($(#[$meta:meta])* $name:ident, $tag:literal, $field:ident: $ty:ty = $kind:expr) => {
        $(#[$meta])*
        #[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq)]
        pub struct $name {
            pub $field: $ty,
            pub comments: Option<String>,
        }

        impl Command for $name {
            fn describe(cmd: &mut CommandBuilder) {
                cmd.tag($tag)
                    .verbatim()
                    .field(stringify!($field), $kind)
                    .comments("comments");
            }
        }
    };
}

axle_command!(
    /// Position along the vehicle.
    AxlePosition, "achse_long", pos: f32 = FieldKind::F32
);
axle_command!(
    /// Width including the tyres.
    AxleMaxWidth, "achse_maxwidth", width: f32 = FieldKind::F32
);
axle_command!(
    /// Width without the tyres.
    AxleMinWidth, "achse_minwidth", width: f32 = FieldKind::F32
);
axle_command!(AxleWheelDiameter, "achse_raddurchmesser", diameter: f32 = FieldKind::F32);
axle_command!(
    /// Spring constant in kN/m.
    AxleSpring, "achse_feder", spring_constant: f32 = FieldKind::F32
);
axle_command!(
    /// Maximum load in kN.
    AxleMaxForce, "achse_maxforce", load: f32 = FieldKind::F32
);
axle_command!(
    /// Damper constant in kNs/m.
    AxleDamper, "achse_daempfer", damping: f32 = FieldKind::F32
);
axle_command!(AxleDriven, "achse_antrieb", driven: bool = FieldKind::Bool);
axle_command!(AxleInertiaInv, "achse_inertia_inv", inertia: f32 = FieldKind::F32);

simple_command!(
    /// Railway bogie position, `[boogies]`.
    Bogies, "boogies" {
        y1: f32 = FieldKind::F32,
    }
);

simple_command!(
    /// Sinusoidal running of a rail vehicle's wheelsets.
    Sinus, "sinus" {
        wheel_radius: f32 = FieldKind::F32,
        wheel_span: f32 = FieldKind::F32,
        wheel_tapering: f32 = FieldKind::F32,
        damping: f32 = FieldKind::F32,
    }
);

simple_command!(RailBodyOsc, "rail_body_osc" {
    vertical_moment: f32 = FieldKind::F32,
    rot_freq_y: f32 = FieldKind::F32,
    rot_damp_y: f32 = FieldKind::F32,
    rot_freq_x: f32 = FieldKind::F32,
    rot_damp_x: f32 = FieldKind::F32,
    trans_freq_z: f32 = FieldKind::F32,
    trans_damp_z: f32 = FieldKind::F32,
});

open_enum!(
    ContactShoeBogie: u8, default FRONT {
        FRONT = 0,
        REAR = 1,
    }
);

flag_set!(
    /// Rail faces a contact shoe touches.
    ContactShoeType: u8 {
        TOP = 1,
        BOTTOM = 1 << 1,
        SIDE = 1 << 2,
    }
);

simple_command!(ContactShoe, "contact_shoe" {
    bogie: ContactShoeBogie = FieldKind::U8,
    x_min: f32 = FieldKind::F32,
    x_max: f32 = FieldKind::F32,
    z_min: f32 = FieldKind::F32,
    z_max: f32 = FieldKind::F32,
    shoe_type: ContactShoeType = FieldKind::U8,
});

open_enum!(
    /// Degrees of freedom of the front coupling.
    CouplingType: u8, default TRUCK {
        /// Three degrees of freedom.
        TRUCK = 0,
        /// Two degrees of freedom.
        BUS = 1,
    }
);

simple_command!(
    /// Rotation limits of the front coupling, in degrees.
    CouplingFrontCharacter, "coupling_front_character" {
        min_max_alpha: f32 = FieldKind::F32,
        min_beta: f32 = FieldKind::F32,
        max_beta: f32 = FieldKind::F32,
        coupling_type: CouplingType = FieldKind::U8,
    }
);

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{from_str, to_string_with_options, EncodeOptions, LineEnding};
    use indoc::indoc;

    fn lf() -> EncodeOptions {
        EncodeOptions::new().with_line_ending(LineEnding::Lf)
    }

    const BUS: &str = indoc! {"
        [friendlyname_inv]
        MAN
        NL 202
        Default

        [description]
        A city bus.
        [not a tag]

        Two doors.
        [end]

        [type]
        1

        [model]
        model\\model.cfg

        [paths]
        model\\paths.cfg

        [control_cable_back]
        L
        2
        door_open
        door_open
        trailer_door

        [couple_back]
        trailer\\trailer.bus
        false
    "};

    #[test]
    fn test_decode_vehicle_without_recursion() {
        let bus: Vehicle = from_str(BUS).unwrap();

        let name = bus.friendly_name.as_ref().unwrap();
        assert_eq!(name.friendly_name, "NL 202");

        let text = bus.description.as_ref().map(|d| d.text.as_str());
        assert_eq!(text, Some("A city bus.\n[not a tag]\n\nTwo doors.\n"));
        assert_eq!(bus.vehicle_type.as_ref().map(|t| t.kind), Some(VehicleType::BUS));

        assert_eq!(bus.scenery.model.as_ref().map(|m| m.path.as_str()), Some("model\\model.cfg"));
        assert!(bus.scenery.model.as_ref().map_or(false, |m| m.commands.lods.is_empty()));
        assert_eq!(bus.scenery.paths.as_ref().map(|p| p.path.as_str()), Some("model\\paths.cfg"));

        let cable = &bus.control_cable_backs[0];
        assert_eq!(cable.side, 'L');
        assert_eq!(cable.coupling_var, "trailer_door");

        let trailer = bus.couple_back.as_deref().unwrap();
        assert_eq!(trailer.path, "trailer\\trailer.bus");
        assert_eq!(trailer.reverse, "false");
        assert!(trailer.vehicle.friendly_name.is_none());
    }

    #[test]
    fn test_description_block_round_trip() {
        let bus: Vehicle = from_str(BUS).unwrap();
        let written = to_string_with_options(&bus, &lf()).unwrap();
        assert!(written.contains("[description]\nA city bus.\n[not a tag]\n\nTwo doors.\n[end]\n"));
        assert!(written.starts_with("[friendlyname]\nMAN\nNL 202\nDefault\n"));

        let again: Vehicle = from_str(&written).unwrap();
        assert_eq!(again, bus);
    }

    #[test]
    fn test_unlisted_vehicle_type_is_kept() {
        let text = "[friendlyname]\nMAN\nNL202\nred\n\n[type]\n9\n";
        let bus: Vehicle = from_str(text).unwrap();
        let kind = bus.vehicle_type.as_ref().map(|t| t.kind).unwrap();
        assert_eq!(kind, VehicleType(9));
        assert!(!kind.is_known());
        assert!(VehicleType::TRAIN.is_known());

        let written = to_string_with_options(&bus, &lf()).unwrap();
        assert_eq!(written, text);
    }

    #[test]
    fn test_axles_and_cameras() {
        let text = indoc! {"
            [newachse]
            achse_long
            2.5
            achse_maxwidth
            2.3
            achse_antrieb
            0

            [newachse]
            achse_long
            -3.2
            achse_antrieb
            1

            [add_camera_driver]
            -0.6
            5.4
            1.9
            0.4
            70
            -10
            -15
            [view_schedule]

            [schwerpunkt]
            1.1

            [mesh]
            body.o3d
        "};
        let bus: Vehicle = from_str(text).unwrap();

        assert_eq!(bus.axles.len(), 2);
        assert_eq!(bus.axles[0].position.as_ref().map(|p| p.pos), Some(2.5));
        assert_eq!(bus.axles[0].max_width.as_ref().map(|w| w.width), Some(2.3));
        assert_eq!(bus.axles[1].driven.as_ref().map(|d| d.driven), Some(true));
        assert!(bus.axles[1].max_width.is_none());

        let camera = &bus.driver_cameras[0];
        assert_eq!(camera.fov, 70.0);
        assert_eq!(camera.rotation, Vector2::new(-10.0, -15.0));
        assert!(camera.view_schedule.is_some());

        assert_eq!(bus.centre_of_mass.as_ref().map(|c| c.height), Some(1.1));
        assert_eq!(bus.inline_model.meshes[0].path, "body.o3d");

        let written = to_string_with_options(&bus, &lf()).unwrap();
        let again: Vehicle = from_str(&written).unwrap();
        assert_eq!(again, bus);
    }

    #[test]
    fn test_unterminated_description() {
        let err = from_str::<Vehicle>("[description]\nno end\n").unwrap_err();
        match err {
            Error::UnexpectedEof { field, owner, .. } => {
                assert_eq!(field, "text");
                assert_eq!(owner, "Description");
            }
            other => panic!("unexpected {:?}", other),
        }
    }
}
