//! Model configuration documents.
//!
//! A model is a list of level-of-detail blocks holding meshes, which in turn
//! hold materials, animations and lights:
//!
//! ```text
//! [LOD]
//! 200
//!
//! [mesh]
//! body.o3d
//!
//! [matl]
//! body.dds
//! 0
//!
//! [newanim]
//! origin_trans
//! 0
//! 1.2
//! 0.5
//! anim_rot
//! door_0
//! 90
//! ```
//!
//! Meshes may also appear without a `[LOD]`. Lights placed after the last
//! mesh belong to that mesh; lights before the first mesh are stored on the
//! model itself.

use crate::formats::{BgraColour, RgbColour, Vector3, Vector4};
use crate::{Command, CommandBuilder, FieldKind};
use serde::{Deserialize, Serialize};

flag_set!(
    /// Cameras a mesh is drawn for. Zero hides the mesh everywhere.
    Viewpoint: u32 {
        EXTERIOR = 1,
        INTERIOR = 1 << 1,
        AI = 1 << 2,
    }
);

flag_set!(
    LightEffect: u32 {
        STAR = 1,
        NO_FOG = 1 << 1,
        /// Only the light effect is drawn, not the light source.
        EFFECT_ONLY = 1 << 2,
    }
);

#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq)]
pub struct Model {
    pub path: String,
    #[serde(flatten)]
    pub commands: ModelCommands,
    pub comments: Option<String>,
    pub post_comments: Option<String>,
}

impl Command for Model {
    fn describe(cmd: &mut CommandBuilder) {
        cmd.tag("model").file_reference("path");
        ModelCommands::describe(cmd);
        cmd.comments("comments").trailing_comments("post_comments");
    }
}

/// The commands a model file is made of.
///
/// Scenery objects and vehicles may carry these inline as well, next to
/// their own commands.
#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq)]
pub struct ModelCommands {
    pub vfd: Option<Vfd>,
    pub detail_factor: Option<DetailFactor>,
    pub tex_detail_factor: Option<TexDetailFactor>,
    pub no_distance_check: Option<NoDistanceCheck>,
    pub text_textures: Vec<TextTexture>,
    pub script_textures: Vec<ScriptTexture>,
    pub lods: Vec<Lod>,
    pub meshes: Vec<Mesh>,
    pub interior_lights: Vec<InteriorLight>,
    pub spot_lights: Vec<SpotLight>,
    pub lights: Vec<Light>,
}

impl ModelCommands {
    /// Registers the model commands as children of the command being described.
    pub fn describe(cmd: &mut CommandBuilder) {
        cmd.child::<Vfd>("vfd")
            .child::<DetailFactor>("detail_factor")
            .child::<TexDetailFactor>("tex_detail_factor")
            .child::<NoDistanceCheck>("no_distance_check")
            .children::<TextTexture>("text_textures")
            .children::<ScriptTexture>("script_textures")
            .children::<Lod>("lods")
            .children::<Mesh>("meshes")
            .children::<InteriorLight>("interior_lights")
            .children::<SpotLight>("spot_lights")
            .children::<Light>("lights");
    }
}

/// Visibility bounds, `[VFDmaxmin]`.
#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq)]
pub struct Vfd {
    pub min: Vector3,
    pub max: Vector3,
    pub comments: Option<String>,
}

impl Command for Vfd {
    fn describe(cmd: &mut CommandBuilder) {
        cmd.tag("VFDmaxmin")
            .field("min", FieldKind::aggregate::<Vector3>())
            .field("max", FieldKind::aggregate::<Vector3>())
            .comments("comments");
    }
}

#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq)]
pub struct DetailFactor {
    pub factor: f32,
    pub comments: Option<String>,
}

impl Command for DetailFactor {
    fn describe(cmd: &mut CommandBuilder) {
        cmd.tag("detail_factor")
            .field("factor", FieldKind::F32)
            .comments("comments");
    }
}

#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq)]
pub struct TexDetailFactor {
    pub factor: f32,
    pub comments: Option<String>,
}

impl Command for TexDetailFactor {
    fn describe(cmd: &mut CommandBuilder) {
        cmd.tag("tex_detail_factor")
            .field("factor", FieldKind::F32)
            .comments("comments");
    }
}

#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq)]
pub struct NoDistanceCheck {
    pub comments: Option<String>,
}

impl Command for NoDistanceCheck {
    fn describe(cmd: &mut CommandBuilder) {
        cmd.tag("noDistanceCheck").comments("comments");
    }
}

open_enum!(
    TextAlign: i32, default LEFT {
        CENTRED = 0,
        LEFT = 1,
        RIGHT = 2,
        JUSTIFY = 3,
        JUSTIFY_LEFT = 4,
        JUSTIFY_RIGHT = 5,
    }
);

/// A texture rendered from a string variable, `[texttexture_enh]`.
///
/// The older `[texttexture]` lacks the alignment fields; they keep the
/// defaults of this type when it is read.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct TextTexture {
    pub string_var: String,
    pub font_name: String,
    pub width: u32,
    pub height: u32,
    pub fullcolour: bool,
    pub colour: RgbColour,
    pub text_align: TextAlign,
    pub grid_align: bool,
    pub comments: Option<String>,
}

impl Default for TextTexture {
    fn default() -> Self {
        TextTexture {
            string_var: String::new(),
            font_name: String::new(),
            width: 0,
            height: 0,
            fullcolour: false,
            colour: RgbColour::default(),
            text_align: TextAlign::LEFT,
            grid_align: true,
            comments: None,
        }
    }
}

impl Command for TextTexture {
    fn describe(cmd: &mut CommandBuilder) {
        cmd.tag("texttexture_enh")
            .field("string_var", FieldKind::Str)
            .field("font_name", FieldKind::Str)
            .field("width", FieldKind::U32)
            .field("height", FieldKind::U32)
            .field("fullcolour", FieldKind::Bool)
            .field("colour", FieldKind::aggregate::<RgbColour>())
            .field("text_align", FieldKind::I32)
            .field("grid_align", FieldKind::Bool)
            .comments("comments")
            .derived::<LegacyTextTexture>();
    }
}

/// `[texttexture]`
#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq)]
pub struct LegacyTextTexture {
    pub string_var: String,
    pub font_name: String,
    pub width: u32,
    pub height: u32,
    pub fullcolour: bool,
    pub colour: RgbColour,
    pub comments: Option<String>,
}

impl Command for LegacyTextTexture {
    fn describe(cmd: &mut CommandBuilder) {
        cmd.tag("texttexture")
            .field("string_var", FieldKind::Str)
            .field("font_name", FieldKind::Str)
            .field("width", FieldKind::U32)
            .field("height", FieldKind::U32)
            .field("fullcolour", FieldKind::Bool)
            .field("colour", FieldKind::aggregate::<RgbColour>())
            .comments("comments");
    }
}

#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq)]
pub struct ScriptTexture {
    pub width: u32,
    pub height: u32,
    pub comments: Option<String>,
}

impl Command for ScriptTexture {
    fn describe(cmd: &mut CommandBuilder) {
        cmd.tag("scripttexture")
            .field("width", FieldKind::U32)
            .field("height", FieldKind::U32)
            .comments("comments");
    }
}

#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq)]
pub struct Lod {
    pub view_radius: f32,
    pub meshes: Vec<Mesh>,
    pub comments: Option<String>,
}

impl Command for Lod {
    fn describe(cmd: &mut CommandBuilder) {
        cmd.tag("LOD")
            .field("view_radius", FieldKind::F32)
            .children::<Mesh>("meshes")
            .comments("comments");
    }
}

#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq)]
pub struct Mesh {
    pub path: String,
    pub mesh_ident: Option<MeshIdent>,
    pub visibles: Vec<Visible>,
    pub illumination_interior: Option<IlluminationInterior>,
    pub matls: Vec<Matl>,
    pub anims: Vec<NewAnim>,
    pub viewpoint: Option<ViewpointCommand>,
    pub lights: Vec<Light>,
    pub comments: Option<String>,
}

impl Command for Mesh {
    fn describe(cmd: &mut CommandBuilder) {
        cmd.tag("mesh")
            .field("path", FieldKind::Str)
            .child::<MeshIdent>("mesh_ident")
            .children::<Visible>("visibles")
            .child::<IlluminationInterior>("illumination_interior")
            .children::<Matl>("matls")
            .children::<NewAnim>("anims")
            .child::<ViewpointCommand>("viewpoint")
            .children::<Light>("lights")
            .comments("comments");
    }
}

#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq)]
pub struct MeshIdent {
    pub name: String,
    pub comments: Option<String>,
}

impl Command for MeshIdent {
    fn describe(cmd: &mut CommandBuilder) {
        cmd.tag("mesh_ident")
            .field("name", FieldKind::Str)
            .comments("comments");
    }
}

/// Shows the mesh only while `script_var` equals `value`.
#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq)]
pub struct Visible {
    pub script_var: String,
    pub value: f32,
    pub comments: Option<String>,
}

impl Command for Visible {
    fn describe(cmd: &mut CommandBuilder) {
        cmd.tag("visible")
            .field("script_var", FieldKind::Str)
            .field("value", FieldKind::F32)
            .comments("comments");
    }
}

/// Interior light indices lighting a mesh or seat; `-1` for none.
#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq)]
pub struct IlluminationInterior {
    pub light_a: i32,
    pub light_b: i32,
    pub light_c: i32,
    pub light_d: i32,
    pub comments: Option<String>,
}

impl Command for IlluminationInterior {
    fn describe(cmd: &mut CommandBuilder) {
        cmd.tag("illumination_interior")
            .field("light_a", FieldKind::I32)
            .field("light_b", FieldKind::I32)
            .field("light_c", FieldKind::I32)
            .field("light_d", FieldKind::I32)
            .comments("comments");
    }
}

#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq)]
pub struct ViewpointCommand {
    pub viewpoint: Viewpoint,
    pub comments: Option<String>,
}

impl Command for ViewpointCommand {
    fn describe(cmd: &mut CommandBuilder) {
        cmd.tag("viewpoint")
            .field("viewpoint", FieldKind::U32)
            .comments("comments");
    }
}

/// A material of the enclosing mesh.
#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq)]
pub struct Matl {
    pub path: String,
    /// Index of the mesh material this applies to. Missing in old files.
    pub index: Option<u32>,
    pub alpha: Option<MatlAlpha>,
    pub allcolor: Option<AllColor>,
    pub lightmap: Option<MatlLightmap>,
    pub freetexes: Vec<MatlFreetex>,
    pub no_z_write: Option<MatlNoZWrite>,
    pub border: Option<MatlTexAdressBorder>,
    pub comments: Option<String>,
}

impl Command for Matl {
    fn describe(cmd: &mut CommandBuilder) {
        cmd.tag("matl")
            .field("path", FieldKind::Str)
            .nullable("index", FieldKind::U32)
            .child::<MatlAlpha>("alpha")
            .child::<AllColor>("allcolor")
            .child::<MatlLightmap>("lightmap")
            .children::<MatlFreetex>("freetexes")
            .child::<MatlNoZWrite>("no_z_write")
            .child::<MatlTexAdressBorder>("border")
            .comments("comments");
    }
}

open_enum!(
    MatlAlphaMode: i32, default OPAQUE {
        OPAQUE = 0,
        CUTOUT = 1,
        BLEND = 2,
    }
);

#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq)]
pub struct MatlAlpha {
    pub mode: MatlAlphaMode,
    pub comments: Option<String>,
}

impl Command for MatlAlpha {
    fn describe(cmd: &mut CommandBuilder) {
        cmd.tag("matl_alpha")
            .field("mode", FieldKind::I32)
            .comments("comments");
    }
}

#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq)]
pub struct AllColor {
    pub diffuse: Vector4,
    pub ambient: Vector3,
    pub specular: Vector3,
    pub emission: Vector3,
    pub spec_power: f32,
    pub comments: Option<String>,
}

impl Command for AllColor {
    fn describe(cmd: &mut CommandBuilder) {
        cmd.tag("allcolor")
            .field("diffuse", FieldKind::aggregate::<Vector4>())
            .field("ambient", FieldKind::aggregate::<Vector3>())
            .field("specular", FieldKind::aggregate::<Vector3>())
            .field("emission", FieldKind::aggregate::<Vector3>())
            .field("spec_power", FieldKind::F32)
            .comments("comments");
    }
}

#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq)]
pub struct MatlLightmap {
    pub path: String,
    /// Script variable scaling the lightmap. Optional trailing line.
    pub var: String,
    pub comments: Option<String>,
}

impl Command for MatlLightmap {
    fn describe(cmd: &mut CommandBuilder) {
        cmd.tag("matl_lightmap")
            .field("path", FieldKind::Str)
            .optional("var", FieldKind::Str, "")
            .comments("comments");
    }
}

#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq)]
pub struct MatlFreetex {
    pub path: String,
    pub var_name: String,
    pub comments: Option<String>,
}

impl Command for MatlFreetex {
    fn describe(cmd: &mut CommandBuilder) {
        cmd.tag("matl_freetex")
            .field("path", FieldKind::Str)
            .field("var_name", FieldKind::Str)
            .comments("comments");
    }
}

#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq)]
pub struct MatlNoZWrite {
    pub comments: Option<String>,
}

impl Command for MatlNoZWrite {
    fn describe(cmd: &mut CommandBuilder) {
        cmd.tag("matl_noZwrite").comments("comments");
    }
}

#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq)]
pub struct MatlTexAdressBorder {
    pub border_colour: BgraColour,
    pub comments: Option<String>,
}

impl Command for MatlTexAdressBorder {
    fn describe(cmd: &mut CommandBuilder) {
        cmd.tag("matl_texadress_border")
            .field("border_colour", FieldKind::aggregate::<BgraColour>())
            .comments("comments");
    }
}

/// An animation of the enclosing mesh, built from bare sub-commands.
#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq)]
pub struct NewAnim {
    pub origin_from_mesh: Option<OriginFromMesh>,
    pub origin_trans: Option<OriginTrans>,
    pub origin_rot_x: Option<OriginRotX>,
    pub anim_trans: Option<AnimTrans>,
    pub anim_rot: Option<AnimRot>,
    pub offset: Option<AnimOffset>,
    pub max_speed: Option<AnimMaxSpeed>,
    pub delay: Option<AnimDelay>,
    pub comments: Option<String>,
}

impl Command for NewAnim {
    fn describe(cmd: &mut CommandBuilder) {
        cmd.tag("newanim")
            .child::<OriginFromMesh>("origin_from_mesh")
            .child::<OriginTrans>("origin_trans")
            .child::<OriginRotX>("origin_rot_x")
            .child::<AnimTrans>("anim_trans")
            .child::<AnimRot>("anim_rot")
            .child::<AnimOffset>("offset")
            .child::<AnimMaxSpeed>("max_speed")
            .child::<AnimDelay>("delay")
            .comments("comments");
    }
}

#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq)]
pub struct OriginFromMesh {}

impl Command for OriginFromMesh {
    fn describe(cmd: &mut CommandBuilder) {
        cmd.tag("origin_from_mesh").verbatim();
    }
}

#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq)]
pub struct OriginTrans {
    pub origin: Vector3,
}

impl Command for OriginTrans {
    fn describe(cmd: &mut CommandBuilder) {
        cmd.tag("origin_trans")
            .verbatim()
            .field("origin", FieldKind::aggregate::<Vector3>());
    }
}

#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq)]
pub struct OriginRotX {
    pub angle: f32,
}

impl Command for OriginRotX {
    fn describe(cmd: &mut CommandBuilder) {
        cmd.tag("origin_rot_x").verbatim().field("angle", FieldKind::F32);
    }
}

/// Declares a bare animation command driven by an animation curve variable.
macro_rules! curve_command {
    ($name:ident, $tag:literal) => {
        #[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq)]
        pub struct $name {
            pub anim_curve: String,
            pub delta: f32,
        }

        impl Command for $name {
            fn describe(cmd: &mut CommandBuilder) {
                cmd.tag($tag)
                    .verbatim()
                    .field("anim_curve", FieldKind::Str)
                    .field("delta", FieldKind::F32);
            }
        }
    };
}

curve_command!(AnimTrans, "anim_trans");
curve_command!(AnimRot, "anim_rot");

/// Declares a bare animation command with a single number.
macro_rules! scalar_anim_command {
    ($name:ident, $tag:literal) => {
        #[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq)]
        pub struct $name {
            pub value: f32,
        }

        impl Command for $name {
            fn describe(cmd: &mut CommandBuilder) {
                cmd.tag($tag).verbatim().field("value", FieldKind::F32);
            }
        }
    };
}

scalar_anim_command!(AnimOffset, "offset");
scalar_anim_command!(AnimMaxSpeed, "maxspeed");
scalar_anim_command!(AnimDelay, "delay");

open_enum!(
    RotationMode: i32, default DIRECTION_VECTOR {
        DIRECTION_VECTOR = 0,
        ROTATION_AXIS = 1,
        FREE = 2,
    }
);

/// A light source, `[light_enh_2]`.
///
/// `[light_enh]` and `[light]` are read into this type as well.
#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq)]
pub struct Light {
    pub position: Vector3,
    pub direction: Vector3,
    pub rotation_axis: Vector3,
    pub omnidirectional: bool,
    pub rotation_mode: RotationMode,
    pub colour: RgbColour,
    pub size: f32,
    pub inner_cone_angle: f32,
    pub outer_cone_angle: f32,
    pub brightness_var: String,
    pub brightness: f32,
    pub z_offset: f32,
    pub effect: LightEffect,
    pub cone_effect: bool,
    pub fade_time: f32,
    pub bitmap: String,
    pub comments: Option<String>,
}

impl Command for Light {
    fn describe(cmd: &mut CommandBuilder) {
        cmd.tag("light_enh_2")
            .field("position", FieldKind::aggregate::<Vector3>())
            .field("direction", FieldKind::aggregate::<Vector3>())
            .field("rotation_axis", FieldKind::aggregate::<Vector3>())
            .field("omnidirectional", FieldKind::Bool)
            .field("rotation_mode", FieldKind::I32)
            .field("colour", FieldKind::aggregate::<RgbColour>())
            .field("size", FieldKind::F32)
            .field("inner_cone_angle", FieldKind::F32)
            .field("outer_cone_angle", FieldKind::F32)
            .field("brightness_var", FieldKind::Str)
            .field("brightness", FieldKind::F32)
            .field("z_offset", FieldKind::F32)
            .field("effect", FieldKind::U32)
            .field("cone_effect", FieldKind::Bool)
            .field("fade_time", FieldKind::F32)
            .optional("bitmap", FieldKind::Str, "")
            .comments("comments")
            .derived::<LightEnh>()
            .derived::<SimpleLight>();
    }
}

/// `[light_enh]`
#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq)]
pub struct LightEnh {
    pub position: Vector3,
    pub colour: RgbColour,
    pub size: f32,
    pub brightness_var: String,
    pub brightness: f32,
    pub z_offset: f32,
    pub effect: LightEffect,
    pub fade_time: f32,
    pub bitmap: String,
    pub comments: Option<String>,
}

impl Command for LightEnh {
    fn describe(cmd: &mut CommandBuilder) {
        cmd.tag("light_enh")
            .field("position", FieldKind::aggregate::<Vector3>())
            .field("colour", FieldKind::aggregate::<RgbColour>())
            .field("size", FieldKind::F32)
            .field("brightness_var", FieldKind::Str)
            .field("brightness", FieldKind::F32)
            .field("z_offset", FieldKind::F32)
            .field("effect", FieldKind::U32)
            .field("fade_time", FieldKind::F32)
            .optional("bitmap", FieldKind::Str, "")
            .comments("comments");
    }
}

/// `[light]`
#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq)]
pub struct SimpleLight {
    pub brightness_var: String,
    pub size: f32,
    pub colour: RgbColour,
    pub position: Vector3,
    pub comments: Option<String>,
}

impl Command for SimpleLight {
    fn describe(cmd: &mut CommandBuilder) {
        cmd.tag("light")
            .field("brightness_var", FieldKind::Str)
            .field("size", FieldKind::F32)
            .field("colour", FieldKind::aggregate::<RgbColour>())
            .field("position", FieldKind::aggregate::<Vector3>())
            .comments("comments");
    }
}

#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq)]
pub struct InteriorLight {
    pub var: String,
    pub range: f32,
    pub colour: RgbColour,
    pub pos: Vector3,
    pub comments: Option<String>,
}

impl Command for InteriorLight {
    fn describe(cmd: &mut CommandBuilder) {
        cmd.tag("interiorlight")
            .field("var", FieldKind::Str)
            .field("range", FieldKind::F32)
            .field("colour", FieldKind::aggregate::<RgbColour>())
            .field("pos", FieldKind::aggregate::<Vector3>())
            .comments("comments");
    }
}

#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq)]
pub struct SpotLight {
    pub pos: Vector3,
    pub direction: Vector3,
    pub colour: Vector3,
    pub range: f32,
    pub inner_radius: f32,
    pub outer_radius: f32,
    pub comments: Option<String>,
}

impl Command for SpotLight {
    fn describe(cmd: &mut CommandBuilder) {
        cmd.tag("spotlight")
            .field("pos", FieldKind::aggregate::<Vector3>())
            .field("direction", FieldKind::aggregate::<Vector3>())
            .field("colour", FieldKind::aggregate::<Vector3>())
            .field("range", FieldKind::F32)
            .field("inner_radius", FieldKind::F32)
            .field("outer_radius", FieldKind::F32)
            .comments("comments");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{from_str, to_string_with_options, EncodeOptions, LineEnding};
    use indoc::indoc;

    const MODEL: &str = indoc! {"
        Model of a small bus.

        [VFDmaxmin]
        -2
        -1
        0
        2
        10
        3

        [texttexture]
        target
        Fonts\\Matrix
        256
        32
        1
        255
        200
        0

        [LOD]
        300

        [mesh]
        body.o3d

        [matl]
        body.dds
        0
        [matl_alpha]
        2

        [newanim]
        origin_trans
        0
        1.5
        0.25
        anim_rot
        door_0
        90

        [mesh]
        wheel.o3d
        [viewpoint]
        3
        [light]
        brake_light
        0.1
        255
        0
        0
        1
        -4
        0.8
    "};

    fn lf() -> EncodeOptions {
        EncodeOptions::new().with_line_ending(LineEnding::Lf)
    }

    #[test]
    fn test_decode_nested_model() {
        let model: Model = from_str(MODEL).unwrap();
        assert_eq!(model.comments, None);
        assert_eq!(model.commands.vfd.as_ref().map(|v| v.max), Some(Vector3::new(2.0, 10.0, 3.0)));
        assert_eq!(
            model.commands.vfd.as_ref().and_then(|v| v.comments.as_deref()),
            Some("Model of a small bus.\n\n")
        );

        let lod = &model.commands.lods[0];
        assert_eq!(lod.view_radius, 300.0);
        assert_eq!(lod.meshes.len(), 2);
        assert!(model.commands.meshes.is_empty());

        let body = &lod.meshes[0];
        assert_eq!(body.matls[0].index, Some(0));
        assert_eq!(body.matls[0].alpha.as_ref().map(|a| a.mode), Some(MatlAlphaMode::BLEND));

        let anim = &body.anims[0];
        assert_eq!(anim.origin_trans.as_ref().map(|o| o.origin.y), Some(1.5));
        assert_eq!(
            anim.anim_rot,
            Some(AnimRot {
                anim_curve: "door_0".to_string(),
                delta: 90.0,
            })
        );

        let wheel = &lod.meshes[1];
        let viewpoint = wheel.viewpoint.as_ref().map(|v| v.viewpoint).unwrap_or_default();
        assert!(viewpoint.contains(Viewpoint::EXTERIOR | Viewpoint::INTERIOR));
        assert!(!viewpoint.contains(Viewpoint::AI));
    }

    #[test]
    fn test_legacy_commands_are_upgraded() {
        let model: Model = from_str(MODEL).unwrap();
        let text = &model.commands.text_textures[0];
        assert_eq!(text.font_name, "Fonts\\Matrix");
        assert_eq!(text.colour, RgbColour { r: 255, g: 200, b: 0 });
        assert_eq!(text.text_align, TextAlign::LEFT);
        assert!(text.grid_align);

        let light = &model.commands.lods[0].meshes[1].lights[0];
        assert_eq!(light.brightness_var, "brake_light");
        assert_eq!(light.position, Vector3::new(1.0, -4.0, 0.8));
        assert_eq!(light.rotation_mode, RotationMode::DIRECTION_VECTOR);
        assert_eq!(light.bitmap, "");
    }

    #[test]
    fn test_reencode_is_stable() {
        let model: Model = from_str(MODEL).unwrap();
        let first = to_string_with_options(&model, &lf()).unwrap();
        let again: Model = from_str(&first).unwrap();
        assert_eq!(again, model);
        assert_eq!(to_string_with_options(&again, &lf()).unwrap(), first);
    }

    #[test]
    fn test_matl_without_index() {
        let text = "[mesh]\nm.o3d\n[matl]\nold.bmp\n\n[matl]\nnew.bmp\n3\n";
        let model: Model = from_str(text).unwrap();
        let indices: Vec<_> = model.commands.meshes[0].matls.iter().map(|m| m.index).collect();
        assert_eq!(indices, vec![None, Some(3)]);
    }

    #[test]
    fn test_optional_bitmap_at_end_of_file() {
        let text = indoc! {"
            [light_enh]
            0
            0
            0
            255
            255
            255
            0.2
            lights
            1
            0
            5
            0.3"};
        let model: Model = from_str(text).unwrap();
        let light = &model.commands.lights[0];
        assert!(light.effect.contains(LightEffect::STAR | LightEffect::EFFECT_ONLY));
        assert_eq!(light.fade_time, 0.3);
        assert_eq!(light.bitmap, "");
    }
}
