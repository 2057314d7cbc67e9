//! Passenger cabin documents.
//!
//! Entries may carry the bare sub-commands `{noticketsale}` and
//! `{withbutton}`. Since these are matched verbatim, every other line inside
//! an `[entry]` is compared as is and bracketed tags keep their brackets.

use crate::formats::model::IlluminationInterior;
use crate::formats::{Vector2, Vector3};
use crate::{Command, CommandBuilder, FieldKind};
use serde::{Deserialize, Serialize};

#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq)]
pub struct PassengerCabin {
    pub path: String,
    pub entries: Vec<Entry>,
    pub exits: Vec<Exit>,
    pub link_to_next_veh: Option<LinkToNextVeh>,
    pub link_to_prev_veh: Option<LinkToPrevVeh>,
    pub stamper: Option<Stamper>,
    pub ticket_sale: Option<TicketSale>,
    pub ticket_sale_money_point: Option<MoneyPoint>,
    pub ticket_sale_change_point: Option<ChangePoint>,
    pub seats: Vec<Seat>,
    pub comments: Option<String>,
    pub post_comments: Option<String>,
}

impl Command for PassengerCabin {
    fn describe(cmd: &mut CommandBuilder) {
        cmd.tag("passengercabin")
            .file_reference("path")
            .children::<Entry>("entries")
            .children::<Exit>("exits")
            .child::<LinkToNextVeh>("link_to_next_veh")
            .child::<LinkToPrevVeh>("link_to_prev_veh")
            .child::<Stamper>("stamper")
            .child::<TicketSale>("ticket_sale")
            .child::<MoneyPoint>("ticket_sale_money_point")
            .child::<ChangePoint>("ticket_sale_change_point")
            .children::<Seat>("seats")
            .comments("comments")
            .trailing_comments("post_comments");
    }
}

#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq)]
pub struct Entry {
    pub path_point: i32,
    pub no_ticket_sale: Option<NoTicketSale>,
    pub with_button: Option<WithButton>,
    pub comments: Option<String>,
}

impl Command for Entry {
    fn describe(cmd: &mut CommandBuilder) {
        cmd.tag("entry")
            .field("path_point", FieldKind::I32)
            .child::<NoTicketSale>("no_ticket_sale")
            .child::<WithButton>("with_button")
            .comments("comments");
    }
}

#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq)]
pub struct NoTicketSale {
    pub comments: Option<String>,
}

impl Command for NoTicketSale {
    fn describe(cmd: &mut CommandBuilder) {
        cmd.tag("{noticketsale}").verbatim().comments("comments");
    }
}

#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq)]
pub struct WithButton {
    pub comments: Option<String>,
}

impl Command for WithButton {
    fn describe(cmd: &mut CommandBuilder) {
        cmd.tag("{withbutton}").verbatim().comments("comments");
    }
}

/// Declares a command holding a single path point index.
macro_rules! path_point_command {
    ($(#[$meta:meta])* $name:ident, $tag:literal) => {
        $(#[$meta])*
        #[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq)]
        pub struct $name {
            pub path_point: i32,
            pub comments: Option<String>,
        }

        impl Command for $name {
            fn describe(cmd: &mut CommandBuilder) {
                cmd.tag($tag)
                    .field("path_point", FieldKind::I32)
                    .comments("comments");
            }
        }
    };
}

path_point_command!(Exit, "exit");
path_point_command!(
    /// Where passengers walk over into the next coupled vehicle.
    LinkToNextVeh,
    "linkToNextVeh"
);
path_point_command!(LinkToPrevVeh, "linkToPrevVeh");

#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq)]
pub struct Stamper {
    pub path_point: i32,
    pub pos: Vector3,
    pub comments: Option<String>,
}

impl Command for Stamper {
    fn describe(cmd: &mut CommandBuilder) {
        cmd.tag("stamper")
            .field("path_point", FieldKind::I32)
            .field("pos", FieldKind::aggregate::<Vector3>())
            .comments("comments");
    }
}

#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq)]
pub struct TicketSale {
    pub path_point: i32,
    pub pos: Vector3,
    pub comments: Option<String>,
}

impl Command for TicketSale {
    fn describe(cmd: &mut CommandBuilder) {
        cmd.tag("ticket_sale")
            .field("path_point", FieldKind::I32)
            .field("pos", FieldKind::aggregate::<Vector3>())
            .comments("comments");
    }
}

/// Declares a ticket sale point and its older form without a parent mesh.
macro_rules! sale_point_commands {
    ($name:ident, $tag:literal, $legacy:ident, $legacy_tag:literal) => {
        #[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq)]
        pub struct $name {
            pub money_pos: Vector3,
            pub variation: Vector2,
            /// Mesh the point moves with.
            pub parent: String,
            pub comments: Option<String>,
        }

        impl Command for $name {
            fn describe(cmd: &mut CommandBuilder) {
                cmd.tag($tag)
                    .field("money_pos", FieldKind::aggregate::<Vector3>())
                    .field("variation", FieldKind::aggregate::<Vector2>())
                    .field("parent", FieldKind::Str)
                    .comments("comments")
                    .derived::<$legacy>();
            }
        }

        #[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq)]
        pub struct $legacy {
            pub money_pos: Vector3,
            pub variation: Vector2,
            pub comments: Option<String>,
        }

        impl Command for $legacy {
            fn describe(cmd: &mut CommandBuilder) {
                cmd.tag($legacy_tag)
                    .field("money_pos", FieldKind::aggregate::<Vector3>())
                    .field("variation", FieldKind::aggregate::<Vector2>())
                    .comments("comments");
            }
        }
    };
}

sale_point_commands!(
    MoneyPoint,
    "ticket_sale_money_point_2",
    LegacyMoneyPoint,
    "ticket_sale_money_point"
);
sale_point_commands!(
    ChangePoint,
    "ticket_sale_change_point_2",
    LegacyChangePoint,
    "ticket_sale_change_point"
);

/// A passenger or driver position.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
#[serde(rename_all = "snake_case")]
pub enum Seat {
    /// `[passpos]`
    Passenger(SeatData),
    /// `[drivpos]`
    Driver(SeatData),
}

impl Default for Seat {
    fn default() -> Self {
        Seat::Passenger(SeatData::default())
    }
}

impl Seat {
    pub fn data(&self) -> &SeatData {
        match self {
            Seat::Passenger(data) | Seat::Driver(data) => data,
        }
    }
}

impl Command for Seat {
    fn describe(cmd: &mut CommandBuilder) {
        cmd.variant::<SeatData>("passenger", "passpos")
            .variant::<SeatData>("driver", "drivpos");
    }
}

#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq)]
pub struct SeatData {
    pub position: Vector3,
    pub height: f32,
    pub rotation: f32,
    pub illumination_interior: Option<IlluminationInterior>,
    pub comments: Option<String>,
}

impl Command for SeatData {
    fn describe(cmd: &mut CommandBuilder) {
        cmd.field("position", FieldKind::aggregate::<Vector3>())
            .field("height", FieldKind::F32)
            .field("rotation", FieldKind::F32)
            .child::<IlluminationInterior>("illumination_interior")
            .comments("comments");
    }
}
