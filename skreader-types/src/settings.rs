//! Setting catalog
//!
//! Every readable or writeable reader parameter is identified by a one-byte
//! function id. The catalog is a compile-time table with an id index, so
//! resolving the ids found in an `ALL_SETTINGS` reply is a single array load.

use std::fmt;

use crate::error::{Error, Result};

/// A named value a setting can take
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SettingOption {
    pub name: &'static str,
    pub value: u8,
}

impl SettingOption {
    pub const fn new(name: &'static str, value: u8) -> Self {
        Self { name, value }
    }
}

/// Static description of a reader setting
///
/// Settings without an option table carry ASCII payloads.
///
/// # Examples
///
/// ```
/// use skreader_types::settings;
///
/// assert_eq!(settings::MSR_READING.option_name(b'1'), Some("ENABLED"));
/// assert!(!settings::RESET_TO_DEFAULT.readable);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SettingDescriptor {
    /// Symbolic name, e.g. `SERIAL_NUMBER`
    pub name: &'static str,

    /// Function id on the wire
    pub id: u8,

    pub readable: bool,
    pub writeable: bool,

    /// Named values, if the setting is an enumeration
    pub options: Option<&'static [SettingOption]>,
}

impl SettingDescriptor {
    pub const fn new(name: &'static str, id: u8, readable: bool, writeable: bool) -> Self {
        Self {
            name,
            id,
            readable,
            writeable,
            options: None,
        }
    }

    /// Attach an option table
    pub const fn with_options(mut self, options: &'static [SettingOption]) -> Self {
        self.options = Some(options);
        self
    }

    /// Name of the option whose value is `value`
    pub fn option_name(&self, value: u8) -> Option<&'static str> {
        self.options?
            .iter()
            .find(|option| option.value == value)
            .map(|option| option.name)
    }

    /// Value of the option called `name` (case-insensitive)
    pub fn option_value(&self, name: &str) -> Result<u8> {
        self.options
            .unwrap_or_default()
            .iter()
            .find(|option| option.name.eq_ignore_ascii_case(name))
            .map(|option| option.value)
            .ok_or_else(|| Error::UnknownOption {
                setting: self.name,
                option: name.to_string(),
            })
    }
}

impl fmt::Display for SettingDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}(0x{:02X})", self.name, self.id)
    }
}

/// Id-indexed view over a table of settings
pub struct Catalog {
    entries: &'static [SettingDescriptor],
    index: [Option<u8>; 256],
}

impl Catalog {
    /// Build a catalog, indexing every entry by id
    ///
    /// Evaluated at compile time for the standard table. Panics on duplicate
    /// ids or more than 256 entries.
    pub const fn new(entries: &'static [SettingDescriptor]) -> Self {
        assert!(entries.len() <= 256, "catalog holds at most 256 settings");

        let mut index = [None; 256];
        let mut i = 0;
        while i < entries.len() {
            let id = entries[i].id as usize;
            assert!(index[id].is_none(), "duplicate setting id in catalog");
            index[id] = Some(i as u8);
            i += 1;
        }

        Self { entries, index }
    }

    /// The catalog of every setting known for the reader
    pub fn standard() -> &'static Catalog {
        &STANDARD_CATALOG
    }

    /// Resolve a function id
    pub fn get(&self, id: u8) -> Option<&'static SettingDescriptor> {
        self.index[id as usize].map(|i| &self.entries[i as usize])
    }

    /// Find a setting by name (case-insensitive)
    pub fn find(&self, name: &str) -> Option<&'static SettingDescriptor> {
        self.entries
            .iter()
            .find(|setting| setting.name.eq_ignore_ascii_case(name))
    }

    /// Like [`Catalog::find`], but unknown names are an error
    pub fn lookup(&self, name: &str) -> Result<&'static SettingDescriptor> {
        self.find(name)
            .ok_or_else(|| Error::UnknownSetting(name.to_string()))
    }

    pub fn iter(&self) -> std::slice::Iter<'static, SettingDescriptor> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl fmt::Debug for Catalog {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Catalog")
            .field("entries", &self.entries.len())
            .finish()
    }
}

static STANDARD_CATALOG: Catalog = Catalog::new(STANDARD);

// ASCII payload
pub const FIRMWARE_VERSION: SettingDescriptor =
    SettingDescriptor::new("FIRMWARE_VERSION", 0x22, true, false);

// ASCII, can be set once
pub const SERIAL_NUMBER: SettingDescriptor =
    SettingDescriptor::new("SERIAL_NUMBER", 0x4E, true, false);

/// Replies with one segment per setting
pub const ALL_SETTINGS: SettingDescriptor =
    SettingDescriptor::new("ALL_SETTINGS", 0x1F, true, false);

pub const RESET_TO_DEFAULT: SettingDescriptor =
    SettingDescriptor::new("RESET_TO_DEFAULT", 0x18, false, true);

pub const MSR_READING: SettingDescriptor =
    SettingDescriptor::new("MSR_READING", 0x1A, true, true).with_options(&[
        SettingOption::new("ENABLED", b'1'),
        SettingOption::new("DISABLED", b'0'),
    ]);

pub const DECODING_METHOD: SettingDescriptor =
    SettingDescriptor::new("DECODING_METHOD", 0x1D, true, true).with_options(&[
        SettingOption::new("RAW_BOTH_DIRECTIONS", b'0'),
        SettingOption::new("DECODE_BOTH_DIRECTIONS", b'1'),
        SettingOption::new("STRIPE_MOVING_WITH_ENCODING", b'2'),
        SettingOption::new("STRIPE_MOVING_AGAINST_ENCODING", b'3'),
    ]);

// 1 to 15 characters
pub const MESSAGE_PREAMBLE: SettingDescriptor =
    SettingDescriptor::new("MESSAGE_PREAMBLE", 0xD2, true, true);

pub const MESSAGE_POSTAMBLE: SettingDescriptor =
    SettingDescriptor::new("MESSAGE_POSTAMBLE", 0xD3, true, true);

/// Which tracks are sent, and which must read for anything to be sent
pub const TRACK_SELECTION: SettingDescriptor =
    SettingDescriptor::new("TRACK_SELECTION", 0x13, true, true).with_options(&[
        SettingOption::new("ALL_TRACKS_OPTIONAL", b'0'),
        SettingOption::new("TRACK_1_REQUIRED", b'1'),
        SettingOption::new("TRACK_2_REQUIRED", b'2'),
        SettingOption::new("TRACK_1_AND_2_REQUIRED", b'3'),
        SettingOption::new("TRACK_3_REQUIRED", b'4'),
        SettingOption::new("TRACK_1_AND_3_REQUIRED", b'5'),
        SettingOption::new("TRACK_2_AND_3_REQUIRED", b'6'),
        SettingOption::new("ALL_TRACKS_REQUIRED", b'7'),
        SettingOption::new("TRACK_1_AND_2_OPTIONAL", b'8'),
        SettingOption::new("TRACK_2_AND_3_OPTIONAL", b'9'),
    ]);

// Single character; 0x0D (CR) by default, 0x00 for none
pub const MSR_TERMINATOR: SettingDescriptor =
    SettingDescriptor::new("MSR_TERMINATOR", 0x21, true, true);

pub const ENCRYPTION_TYPE: SettingDescriptor =
    SettingDescriptor::new("ENCRYPTION_TYPE", 0x4C, true, true).with_options(&[
        SettingOption::new("CLEARTEXT", b'0'),
        SettingOption::new("TDES", b'1'),
        SettingOption::new("AES", b'2'),
    ]);

/// Key serial number: 59 bits of initial KSN, 21 bits of counter
pub const KSN: SettingDescriptor = SettingDescriptor::new("KSN", 0x51, true, false);

pub const SECURITY_LEVEL: SettingDescriptor =
    SettingDescriptor::new("SECURITY_LEVEL", 0x7E, true, false).with_options(&[
        SettingOption::new("OUT_OF_KEYS", b'0'),
        SettingOption::new("ONE", b'1'),
        SettingOption::new("TWO", b'2'),
        SettingOption::new("THREE", b'3'),
    ]);

/// Behaviour when a lifted card reads one track onto another
pub const OUTPUT_WHEN_SWIPE_LIFTED: SettingDescriptor =
    SettingDescriptor::new("OUTPUT_WHEN_SWIPE_LIFTED", 0xAF, true, true).with_options(&[
        SettingOption::new("ABSOLUTELY_NOT", 0x00),
        SettingOption::new("SEND_UNENCRYPTED", 0x01),
    ]);

/// Leading PAN digits shown in clear (0 to 6)
pub const PRE_PAN: SettingDescriptor = SettingDescriptor::new("PRE_PAN", 0x49, true, true);

/// Trailing PAN digits shown in clear (0 to 4)
pub const POST_PAN: SettingDescriptor = SettingDescriptor::new("POST_PAN", 0x4A, true, true);

pub const PAN_MASK_CHAR: SettingDescriptor =
    SettingDescriptor::new("PAN_MASK_CHAR", 0x4B, true, true);

pub const DISPLAY_EXPIRATION_DATE: SettingDescriptor =
    SettingDescriptor::new("DISPLAY_EXPIRATION_DATE", 0x50, true, true).with_options(&[
        SettingOption::new("MASK", b'0'),
        SettingOption::new("CLEARTEXT", b'1'),
    ]);

// 8 bytes, only honoured at security level 4
pub const SESSION_ID: SettingDescriptor =
    SettingDescriptor::new("SESSION_ID", 0x54, false, true);

pub const KEY_MANAGEMENT: SettingDescriptor =
    SettingDescriptor::new("KEY_MANAGEMENT", 0x58, true, true)
        .with_options(&[SettingOption::new("DUKPT", b'1')]);

pub const INCLUDE_HASH_DATA: SettingDescriptor =
    SettingDescriptor::new("INCLUDE_HASH_DATA", 0x5C, true, true);

pub const ENCRYPT_TRACKS: SettingDescriptor =
    SettingDescriptor::new("ENCRYPT_TRACKS", 0x84, true, true);

pub const ENCRYPT_STRUCTURE_MSR: SettingDescriptor =
    SettingDescriptor::new("ENCRYPT_STRUCTURE_MSR", 0x85, true, true).with_options(&[
        SettingOption::new("ORIGINAL", b'0'),
        SettingOption::new("ENHANCED", b'1'),
    ]);

pub const MASK_TRACKS: SettingDescriptor =
    SettingDescriptor::new("MASK_TRACKS", 0x86, true, true);

pub const EN_FMT: SettingDescriptor = SettingDescriptor::new("EN_FMT", 0x88, true, true);

/// Offset to the expiration date on track 3
pub const EXPIRATION_OFFSET: SettingDescriptor =
    SettingDescriptor::new("EXPIRATION_OFFSET", 0x89, true, true);

pub const ENCRYPT_STRUCTURE_KEYED: SettingDescriptor =
    SettingDescriptor::new("ENCRYPT_STRUCTURE_KEYED", 0x8F, true, true).with_options(&[
        SettingOption::new("ORIGINAL", b'0'),
        SettingOption::new("ENHANCED", b'1'),
    ]);

pub const MASTER_KEY_LOADING_MODE: SettingDescriptor =
    SettingDescriptor::new("MASTER_KEY_LOADING_MODE", 0xAB, false, false);

pub const MASTER_KEY_LOADED: SettingDescriptor =
    SettingDescriptor::new("MASTER_KEY_LOADED", 0xAC, true, false);

pub const RKI_TIMEOUT: SettingDescriptor =
    SettingDescriptor::new("RKI_TIMEOUT", 0xAD, true, true);

// Bit 4 adds the serial number to USB enumeration
pub const UNUSUAL_SPECIAL_SETTINGS: SettingDescriptor =
    SettingDescriptor::new("UNUSUAL_SPECIAL_SETTINGS", 0xAE, true, true);

/// Every known setting, in catalog order
pub const STANDARD: &[SettingDescriptor] = &[
    FIRMWARE_VERSION,
    SERIAL_NUMBER,
    ALL_SETTINGS,
    RESET_TO_DEFAULT,
    MSR_READING,
    DECODING_METHOD,
    MESSAGE_PREAMBLE,
    MESSAGE_POSTAMBLE,
    TRACK_SELECTION,
    MSR_TERMINATOR,
    ENCRYPTION_TYPE,
    KSN,
    SECURITY_LEVEL,
    OUTPUT_WHEN_SWIPE_LIFTED,
    PRE_PAN,
    POST_PAN,
    PAN_MASK_CHAR,
    DISPLAY_EXPIRATION_DATE,
    SESSION_ID,
    KEY_MANAGEMENT,
    INCLUDE_HASH_DATA,
    ENCRYPT_TRACKS,
    ENCRYPT_STRUCTURE_MSR,
    MASK_TRACKS,
    EN_FMT,
    EXPIRATION_OFFSET,
    ENCRYPT_STRUCTURE_KEYED,
    MASTER_KEY_LOADING_MODE,
    MASTER_KEY_LOADED,
    RKI_TIMEOUT,
    UNUSUAL_SPECIAL_SETTINGS,
];
