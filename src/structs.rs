use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
/// Handle for one character that belongs to a group.
///
/// The save stores these as a pair of guids: the character's own guid and the
/// guid of the spawned instance it currently maps to.
pub struct InstanceId {
    pub guid: Uuid,
    pub instance_id: Uuid,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
/// Last-seen information attached to a player entry.
pub struct PlayerInfo {
    /// Engine real-time tick of the player's last session.
    pub last_online_real_time: i64,
    pub player_name: String,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
/// One member of a guild's player roster.
pub struct GroupPlayer {
    pub player_uid: Uuid,
    pub player_info: PlayerInfo,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
/// Fields shared by every organization-like group
/// (Organization, Guild, IndependentGuild).
pub struct OrgFields {
    /// Organization subtype byte; meaning is engine-internal.
    pub org_type: u8,
    pub base_ids: Vec<Uuid>,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
/// Fields shared by Guild and IndependentGuild groups.
pub struct GuildFields {
    pub base_camp_level: i32,
    pub map_object_instance_ids_base_camp_points: Vec<Uuid>,
    pub guild_name: String,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
/// Tag-specific tail of a group record. The save's `GroupType` string
/// selects which of these field sets follows the base fields.
pub enum GroupKind {
    /// Any tag outside the known set carries only the base fields.
    /// The tag string is kept so the record stays self-describing.
    Other { group_type: String },
    Organization {
        org: OrgFields,
    },
    Guild {
        org: OrgFields,
        guild: GuildFields,
        /// Opaque value of unknown meaning, kept verbatim.
        u1: i64,
        /// Opaque value of unknown meaning, observed always zero.
        u2: i64,
        admin_player_uid: Uuid,
        players: Vec<GroupPlayer>,
    },
    IndependentGuild {
        org: OrgFields,
        guild: GuildFields,
        player_uid: Uuid,
        guild_name_2: String,
        player_info: PlayerInfo,
    },
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
/// Decoded guild/organization blob from the group save-data map.
pub struct GroupRecord {
    pub group_id: Uuid,
    pub group_name: String,
    pub individual_character_handle_ids: Vec<InstanceId>,
    pub kind: GroupKind,
    /// Bytes past the known schema, re-emitted verbatim on encode.
    pub trailing_unparsed_data: Vec<u8>,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
/// One adjacency of a placed building piece.
pub struct ConnectInfoItem {
    pub connect_to_model_instance_id: Uuid,
    /// Socket index on the target piece.
    pub index: u8,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
/// One connector socket and the pieces attached through it.
pub struct Connector {
    pub index: u8,
    pub any_place: Vec<ConnectInfoItem>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
/// Decoded connector blob of a placeable building piece.
pub enum ConnectorRecord {
    /// Canonical "no connectors" state; round-trips to zero bytes.
    Empty,
    Connected {
        supported_level: i32,
        /// Primary connector section.
        connect: Connector,
        /// Secondary sections; stairs conventionally carry 2, roofs 4.
        other_connectors: Vec<Connector>,
    },
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
/// Access-permission state of a storage container slot.
pub struct Permission {
    pub type_a: Vec<u8>,
    pub type_b: Vec<u8>,
    pub item_static_ids: Vec<String>,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
/// Decoded item-container-slot blob. A zero-length blob has no record at
/// all; the codec models that as `None` rather than a defaulted value.
pub struct ItemSlotRecord {
    pub permission: Permission,
    pub corruption_progress_value: f32,
    /// Bytes past the known schema, re-emitted verbatim on encode.
    pub trailing_unparsed_data: Vec<u8>,
}
