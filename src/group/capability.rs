//! Member capabilities and the capability bucket partition.
//!
//! Capabilities arrive as a feature bitmask on the wire; inside the group
//! they are a plain record of named flags.

use super::state::MemberState;

pub const SUPPORT_BRIGHTNESS: u32 = 1;
pub const SUPPORT_COLOR_TEMP: u32 = 2;
pub const SUPPORT_EFFECT: u32 = 4;
pub const SUPPORT_FLASH: u32 = 8;
pub const SUPPORT_COLOR: u32 = 16;
pub const SUPPORT_TRANSITION: u32 = 32;
pub const SUPPORT_WHITE_VALUE: u32 = 128;

/// Every feature a group can advertise. Member bits outside of this mask are
/// dropped when aggregating.
pub const SUPPORT_GROUP_LIGHT: u32 = SUPPORT_BRIGHTNESS
    | SUPPORT_COLOR_TEMP
    | SUPPORT_EFFECT
    | SUPPORT_FLASH
    | SUPPORT_COLOR
    | SUPPORT_TRANSITION
    | SUPPORT_WHITE_VALUE;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Capabilities {
    pub brightness: bool,
    pub color: bool,
    pub color_temp: bool,
    pub white_value: bool,
}

impl Capabilities {
    pub fn from_supported_features(mask: u32) -> Self {
        Capabilities {
            brightness: mask & SUPPORT_BRIGHTNESS != 0,
            color: mask & SUPPORT_COLOR != 0,
            color_temp: mask & SUPPORT_COLOR_TEMP != 0,
            white_value: mask & SUPPORT_WHITE_VALUE != 0,
        }
    }
}

/// Snapshot of one reachable member, taken at the start of an operation.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MemberDevice {
    pub id: String,
    pub capabilities: Capabilities,
}

impl MemberDevice {
    /// Returns `None` for members without live state; those never receive
    /// commands.
    pub fn from_state(id: &str, state: Option<&MemberState>) -> Option<Self> {
        let state = state.filter(|state| state.available)?;

        Some(MemberDevice {
            id: id.to_string(),
            capabilities: Capabilities::from_supported_features(state.supported_features),
        })
    }
}

/// Capability buckets in classification priority order.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum CapabilityBucket {
    /// brightness + color + color temperature (e.g. hue color bulbs)
    FullColor,
    /// brightness + color + white channel (rgbw strips)
    ColorAndWhite,
    /// brightness + color (rgb strips)
    ColorOnly,
    /// brightness + color temperature (ambiance white bulbs)
    TemperatureOnly,
    /// brightness only
    DimmableOnly,
    /// plain on/off lights and switches
    OnOffOnly,
}

impl CapabilityBucket {
    pub const ALL: [CapabilityBucket; 6] = [
        CapabilityBucket::FullColor,
        CapabilityBucket::ColorAndWhite,
        CapabilityBucket::ColorOnly,
        CapabilityBucket::TemperatureOnly,
        CapabilityBucket::DimmableOnly,
        CapabilityBucket::OnOffOnly,
    ];

    pub fn classify(capabilities: &Capabilities) -> Self {
        let Capabilities {
            brightness,
            color,
            color_temp,
            white_value,
        } = *capabilities;

        if brightness && color && color_temp {
            CapabilityBucket::FullColor
        } else if brightness && color && white_value {
            CapabilityBucket::ColorAndWhite
        } else if brightness && color {
            CapabilityBucket::ColorOnly
        } else if brightness && color_temp {
            CapabilityBucket::TemperatureOnly
        } else if brightness {
            CapabilityBucket::DimmableOnly
        } else {
            CapabilityBucket::OnOffOnly
        }
    }

    fn index(self) -> usize {
        self as usize
    }
}

/// Partition of the reachable members into the six capability buckets.
/// Member order within a bucket follows the order members were classified in.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Buckets {
    members: [Vec<String>; 6],
}

impl Buckets {
    pub fn classify<'a>(members: impl IntoIterator<Item = &'a MemberDevice>) -> Self {
        let mut buckets = Buckets::default();

        for member in members {
            let bucket = CapabilityBucket::classify(&member.capabilities);
            buckets.members[bucket.index()].push(member.id.clone());
        }

        buckets
    }

    pub fn get(&self, bucket: CapabilityBucket) -> &[String] {
        &self.members[bucket.index()]
    }

    /// Non-empty buckets in priority order.
    pub fn iter(&self) -> impl Iterator<Item = (CapabilityBucket, &[String])> {
        CapabilityBucket::ALL
            .into_iter()
            .map(|bucket| (bucket, self.get(bucket)))
            .filter(|(_, members)| !members.is_empty())
    }

    pub fn is_empty(&self) -> bool {
        self.members.iter().all(Vec::is_empty)
    }
}
