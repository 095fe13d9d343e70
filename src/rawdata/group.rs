//! Guild / organization / independent-guild blob codec.
//!
//! The blob's field layout depends on the `GroupType` tag stored as a sibling
//! property of the raw payload. Decoding supports two policies: the strict
//! one aborts the record on any short read and leaves its bytes in the tree,
//! the lenient one substitutes documented defaults for unreadable fixed-width
//! fields and keeps whatever prefix of a counted sequence was readable.

use serde::{Deserialize, Serialize};
use tracing::warn;
use uuid::Uuid;

use crate::archive::{Reader, Result, Writer};
use crate::rawdata::{FallbackRecord, RawData, Strictness};
use crate::structs::{
    GroupKind, GroupPlayer, GroupRecord, GuildFields, InstanceId, OrgFields, PlayerInfo,
};

const TAG_ORGANIZATION: &str = "EPalGroupType::Organization";
const TAG_GUILD: &str = "EPalGroupType::Guild";
const TAG_INDEPENDENT_GUILD: &str = "EPalGroupType::IndependentGuild";

/// One entry of the outer group save-data map: the discriminant tag plus the
/// blob slot the codec operates on.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct GroupEntry {
    pub group_type: String,
    pub raw_data: RawData<GroupRecord>,
}

/// Decodes every raw slot of the group map in place.
pub fn decode_groups(entries: &mut [GroupEntry], strictness: Strictness) {
    for entry in entries.iter_mut() {
        if let Some(bytes) = entry.raw_data.take_bytes() {
            entry.raw_data = decode_bytes(bytes, &entry.group_type, strictness);
        }
    }
}

/// Re-encodes every spliced record of the group map back to raw bytes.
pub fn encode_groups(entries: &mut [GroupEntry]) -> Result<()> {
    for entry in entries.iter_mut() {
        entry.raw_data.reencode(encode_bytes)?;
    }
    Ok(())
}

/// Decodes one group blob. Zero-length payloads stay raw; failures degrade
/// per the chosen policy instead of propagating.
pub fn decode_bytes(bytes: Vec<u8>, group_type: &str, strictness: Strictness) -> RawData<GroupRecord> {
    if bytes.is_empty() {
        return RawData::Bytes(bytes);
    }
    let result = {
        let mut reader = Reader::new(&bytes);
        read_group(&mut reader, group_type, strictness)
    };
    match result {
        Ok(record) => RawData::Record(record),
        Err(e) => match strictness {
            Strictness::Strict => {
                warn!(group_type, error = %e, "skipping unreadable group record");
                RawData::Bytes(bytes)
            }
            Strictness::Lenient => {
                warn!(group_type, error = %e, "keeping group record as raw fallback");
                RawData::Fallback(FallbackRecord {
                    bytes,
                    error: e.to_string(),
                })
            }
        },
    }
}

/// Per-field read frontend implementing the two truncation policies.
struct FieldReader<'r, 'a> {
    r: &'r mut Reader<'a>,
    lenient: bool,
    group_type: &'r str,
}

impl<'r, 'a> FieldReader<'r, 'a> {
    fn missing<T: Default>(&self, field: &'static str) -> T {
        warn!(
            group_type = self.group_type,
            field, "not enough data, substituting default"
        );
        T::default()
    }

    fn byte(&mut self, field: &'static str) -> Result<u8> {
        if self.lenient {
            Ok(self.r.try_u8().unwrap_or_else(|| self.missing(field)))
        } else {
            self.r.u8()
        }
    }

    fn i32(&mut self, field: &'static str) -> Result<i32> {
        if self.lenient {
            Ok(self.r.try_i32().unwrap_or_else(|| self.missing(field)))
        } else {
            self.r.i32()
        }
    }

    fn i64(&mut self, field: &'static str) -> Result<i64> {
        if self.lenient {
            Ok(self.r.try_i64().unwrap_or_else(|| self.missing(field)))
        } else {
            self.r.i64()
        }
    }

    fn guid(&mut self, field: &'static str) -> Result<Uuid> {
        if self.lenient {
            Ok(self.r.try_guid().unwrap_or_else(|| self.missing(field)))
        } else {
            self.r.guid()
        }
    }

    /// Only the 4-byte length prefix can be guarded; a string body shorter
    /// than its prefix still errors and degrades the whole record.
    fn fstring(&mut self, field: &'static str) -> Result<String> {
        if self.lenient && self.r.remaining() < 4 {
            return Ok(self.missing(field));
        }
        self.r.fstring()
    }

    fn array<T>(
        &mut self,
        field: &'static str,
        mut f: impl FnMut(&mut Reader<'a>) -> Result<T>,
    ) -> Result<Vec<T>> {
        if !self.lenient {
            return self.r.tarray(f);
        }
        if self.r.remaining() < 4 {
            return Ok(self.missing(field));
        }
        let count = self.r.u32()?;
        let mut values = Vec::new();
        for _ in 0..count {
            match f(self.r) {
                Ok(v) => values.push(v),
                Err(e) => {
                    warn!(
                        group_type = self.group_type,
                        field,
                        read = values.len(),
                        expected = count,
                        error = %e,
                        "dropping unreadable tail of sequence"
                    );
                    break;
                }
            }
        }
        Ok(values)
    }
}

fn read_group(r: &mut Reader<'_>, group_type: &str, strictness: Strictness) -> Result<GroupRecord> {
    let mut f = FieldReader {
        r,
        lenient: matches!(strictness, Strictness::Lenient),
        group_type,
    };

    let group_id = f.guid("group_id")?;
    let group_name = f.fstring("group_name")?;
    let individual_character_handle_ids =
        f.array("individual_character_handle_ids", read_instance_id)?;

    let kind = match group_type {
        TAG_ORGANIZATION => GroupKind::Organization {
            org: read_org(&mut f)?,
        },
        TAG_GUILD => {
            let org = read_org(&mut f)?;
            let guild = read_guild(&mut f)?;
            let u1 = f.i64("u1")?;
            let u2 = f.i64("u2")?;
            let admin_player_uid = f.guid("admin_player_uid")?;
            let players = f.array("players", read_player)?;
            GroupKind::Guild {
                org,
                guild,
                u1,
                u2,
                admin_player_uid,
                players,
            }
        }
        TAG_INDEPENDENT_GUILD => {
            let org = read_org(&mut f)?;
            let guild = read_guild(&mut f)?;
            let player_uid = f.guid("player_uid")?;
            let guild_name_2 = f.fstring("guild_name_2")?;
            let player_info = PlayerInfo {
                last_online_real_time: f.i64("last_online_real_time")?,
                player_name: f.fstring("player_name")?,
            };
            GroupKind::IndependentGuild {
                org,
                guild,
                player_uid,
                guild_name_2,
                player_info,
            }
        }
        other => GroupKind::Other {
            group_type: other.to_string(),
        },
    };

    let trailing_unparsed_data = f.r.read_to_end();

    Ok(GroupRecord {
        group_id,
        group_name,
        individual_character_handle_ids,
        kind,
        trailing_unparsed_data,
    })
}

fn read_org(f: &mut FieldReader<'_, '_>) -> Result<OrgFields> {
    Ok(OrgFields {
        org_type: f.byte("org_type")?,
        base_ids: f.array("base_ids", |r| r.guid())?,
    })
}

fn read_guild(f: &mut FieldReader<'_, '_>) -> Result<GuildFields> {
    Ok(GuildFields {
        base_camp_level: f.i32("base_camp_level")?,
        map_object_instance_ids_base_camp_points: f
            .array("map_object_instance_ids_base_camp_points", |r| r.guid())?,
        guild_name: f.fstring("guild_name")?,
    })
}

fn read_instance_id(r: &mut Reader<'_>) -> Result<InstanceId> {
    Ok(InstanceId {
        guid: r.guid()?,
        instance_id: r.guid()?,
    })
}

fn read_player(r: &mut Reader<'_>) -> Result<GroupPlayer> {
    Ok(GroupPlayer {
        player_uid: r.guid()?,
        player_info: PlayerInfo {
            last_online_real_time: r.i64()?,
            player_name: r.fstring()?,
        },
    })
}

/// Encodes a group record in decode order for its kind, then its trailing
/// bytes. Defaults that the lenient decoder substituted are written as-is;
/// that path is one-way-lossy by design.
pub fn encode_bytes(record: &GroupRecord) -> Result<Vec<u8>> {
    let mut w = Writer::new();
    w.guid(&record.group_id)?;
    w.fstring(&record.group_name)?;
    w.tarray(&record.individual_character_handle_ids, write_instance_id)?;
    match &record.kind {
        GroupKind::Other { .. } => {}
        GroupKind::Organization { org } => {
            write_org(&mut w, org)?;
        }
        GroupKind::Guild {
            org,
            guild,
            u1,
            u2,
            admin_player_uid,
            players,
        } => {
            write_org(&mut w, org)?;
            write_guild(&mut w, guild)?;
            w.i64(*u1)?;
            w.i64(*u2)?;
            w.guid(admin_player_uid)?;
            w.tarray(players, write_player)?;
        }
        GroupKind::IndependentGuild {
            org,
            guild,
            player_uid,
            guild_name_2,
            player_info,
        } => {
            write_org(&mut w, org)?;
            write_guild(&mut w, guild)?;
            w.guid(player_uid)?;
            w.fstring(guild_name_2)?;
            w.i64(player_info.last_online_real_time)?;
            w.fstring(&player_info.player_name)?;
        }
    }
    w.write_all(&record.trailing_unparsed_data)?;
    Ok(w.into_bytes())
}

fn write_org(w: &mut Writer, org: &OrgFields) -> Result<()> {
    w.u8(org.org_type)?;
    w.tarray(&org.base_ids, |w, id| w.guid(id))
}

fn write_guild(w: &mut Writer, guild: &GuildFields) -> Result<()> {
    w.i32(guild.base_camp_level)?;
    w.tarray(&guild.map_object_instance_ids_base_camp_points, |w, id| {
        w.guid(id)
    })?;
    w.fstring(&guild.guild_name)
}

fn write_instance_id(w: &mut Writer, handle: &InstanceId) -> Result<()> {
    w.guid(&handle.guid)?;
    w.guid(&handle.instance_id)
}

fn write_player(w: &mut Writer, player: &GroupPlayer) -> Result<()> {
    w.guid(&player.player_uid)?;
    w.i64(player.player_info.last_online_real_time)?;
    w.fstring(&player.player_info.player_name)
}
