//! Value types shared between plugins, loaders and the host.

use serde::{Deserialize, Serialize};
use std::ops::{BitOr, BitOrAssign};

/// Binary architecture of a plugin library.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum BinaryType {
    #[default]
    None,
    Posix32,
    Posix64,
    Win32,
    Win64,
    Other,
}

impl BinaryType {
    /// Binary type of the running host.
    pub fn native() -> Self {
        if cfg!(all(windows, target_pointer_width = "64")) {
            BinaryType::Win64
        } else if cfg!(windows) {
            BinaryType::Win32
        } else if cfg!(target_pointer_width = "64") {
            BinaryType::Posix64
        } else {
            BinaryType::Posix32
        }
    }

    /// `None` means "same as host".
    pub fn is_native(self) -> bool {
        self == BinaryType::None || self == Self::native()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum PluginType {
    #[default]
    None,
    Internal,
    Ladspa,
    Dssi,
    Lv2,
    Vst,
    Sf2,
}

impl std::fmt::Display for PluginType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PluginType::None => write!(f, "none"),
            PluginType::Internal => write!(f, "Internal"),
            PluginType::Ladspa => write!(f, "LADSPA"),
            PluginType::Dssi => write!(f, "DSSI"),
            PluginType::Lv2 => write!(f, "LV2"),
            PluginType::Vst => write!(f, "VST"),
            PluginType::Sf2 => write!(f, "SF2"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum PluginCategory {
    #[default]
    None,
    Synth,
    Delay,
    Eq,
    Filter,
    Dynamics,
    Modulator,
    Utility,
    Other,
}

macro_rules! flag_set {
    ($(#[$meta:meta])* $name:ident { $($(#[$flag_meta:meta])* $flag:ident = $bit:expr,)* }) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(u32);

        impl $name {
            $($(#[$flag_meta])* pub const $flag: Self = Self($bit);)*

            pub const fn empty() -> Self {
                Self(0)
            }

            pub const fn from_bits(bits: u32) -> Self {
                Self(bits)
            }

            pub const fn bits(self) -> u32 {
                self.0
            }

            pub const fn contains(self, other: Self) -> bool {
                self.0 & other.0 == other.0
            }

            pub fn insert(&mut self, other: Self) {
                self.0 |= other.0;
            }

            pub fn remove(&mut self, other: Self) {
                self.0 &= !other.0;
            }
        }

        impl BitOr for $name {
            type Output = Self;

            fn bitor(self, rhs: Self) -> Self {
                Self(self.0 | rhs.0)
            }
        }

        impl BitOrAssign for $name {
            fn bitor_assign(&mut self, rhs: Self) {
                self.0 |= rhs.0;
            }
        }
    };
}

flag_set! {
    /// Capability hints advertised by a plugin.
    PluginHints {
        HAS_GUI = 0x01,
        IS_BRIDGE = 0x02,
        IS_SYNTH = 0x04,
        USES_CHUNKS = 0x08,
        CAN_DRYWET = 0x10,
        CAN_VOLUME = 0x20,
        CAN_BALANCE = 0x40,
    }
}

flag_set! {
    ParameterHints {
        BOUNDED = 0x01,
        BOOLEAN = 0x02,
        INTEGER = 0x04,
        LOGARITHMIC = 0x08,
        /// Range is relative to the sample rate.
        SAMPLE_RATE = 0x10,
        ENABLED = 0x20,
        AUTOMATABLE = 0x40,
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ParameterType {
    #[default]
    Unknown,
    Input,
    Output,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ParameterRanges {
    pub def: f64,
    pub min: f64,
    pub max: f64,
    pub step: f64,
    pub step_small: f64,
    pub step_large: f64,
}

impl Default for ParameterRanges {
    fn default() -> Self {
        Self {
            def: 0.0,
            min: 0.0,
            max: 1.0,
            step: 0.01,
            step_small: 0.0001,
            step_large: 0.1,
        }
    }
}

impl ParameterRanges {
    pub fn new(min: f64, max: f64, def: f64) -> Self {
        let span = max - min;
        Self {
            def,
            min,
            max,
            step: span / 100.0,
            step_small: span / 10000.0,
            step_large: span / 10.0,
        }
    }

    pub fn clamp(&self, value: f64) -> f64 {
        value.clamp(self.min, self.max)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScalePoint {
    pub value: f64,
    pub label: String,
}

impl ScalePoint {
    pub fn new(value: f64, label: impl Into<String>) -> Self {
        Self {
            value,
            label: label.into(),
        }
    }
}

/// Static description of one plugin parameter.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParameterDescriptor {
    pub name: String,
    pub symbol: String,
    /// Unit label, e.g. "dB".
    pub unit: String,
    pub kind: ParameterType,
    /// Position among the plugin's parameters.
    pub index: i32,
    /// Format-native port or parameter index.
    pub rindex: i32,
    pub hints: ParameterHints,
    pub ranges: ParameterRanges,
    pub scale_points: Vec<ScalePoint>,
}

impl ParameterDescriptor {
    pub fn new(index: u32, name: impl Into<String>, ranges: ParameterRanges) -> Self {
        let name = name.into();
        Self {
            symbol: name.to_lowercase().replace(' ', "_"),
            name,
            unit: String::new(),
            kind: ParameterType::Input,
            index: index as i32,
            rindex: index as i32,
            hints: ParameterHints::BOUNDED | ParameterHints::ENABLED | ParameterHints::AUTOMATABLE,
            ranges,
            scale_points: Vec::new(),
        }
    }

    pub fn unit(mut self, unit: impl Into<String>) -> Self {
        self.unit = unit.into();
        self
    }

    pub fn kind(mut self, kind: ParameterType) -> Self {
        self.kind = kind;
        self
    }

    pub fn hints(mut self, hints: ParameterHints) -> Self {
        self.hints = hints;
        self
    }

    pub fn scale_point(mut self, value: f64, label: impl Into<String>) -> Self {
        self.scale_points.push(ScalePoint::new(value, label));
        self
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MidiProgram {
    pub bank: u32,
    pub program: u32,
    pub name: String,
}

/// Input/output/total counts for one port family.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PortCounts {
    pub ins: u32,
    pub outs: u32,
    pub total: u32,
}

impl PortCounts {
    pub fn new(ins: u32, outs: u32) -> Self {
        Self {
            ins,
            outs,
            total: ins + outs,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum GuiType {
    #[default]
    None,
    Internal,
    External,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GuiInfo {
    pub gui_type: GuiType,
    pub visible: bool,
    pub resizable: bool,
    pub width: u32,
    pub height: u32,
}

/// Host-side key/value entry attached to a plugin (e.g. DSSI configure strings).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CustomData {
    pub data_type: String,
    pub key: String,
    pub value: String,
}

/// A note injected from outside the audio context.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct NoteEvent {
    pub on: bool,
    pub note: u8,
    pub velocity: u8,
}
