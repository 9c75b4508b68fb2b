//! G/M-code constants and the modal-group lookup tables
//!
//! G-codes are represented ×10 (so `G1` is `10`, `G59.1` is `591`), matching
//! the legacy `codes.h` enum. This makes modal-group lookup
//! a dense array index rather than a hash or match cascade, mirroring the
//! legacy `_gees`/`_ems` global tables.

/// Number of modal groups for G-codes (groups 0..=13, some indices unused).
pub const G_MODAL_GROUP_COUNT: usize = 14;
/// Highest ×10-encoded G-code value + 1, used to size the lookup table.
pub const G_TABLE_SIZE: usize = 1000;
/// Highest M-code value + 1, used to size the lookup table.
pub const M_TABLE_SIZE: usize = 100;

pub const G0: i32 = 0;
pub const G1: i32 = 10;
pub const G2: i32 = 20;
pub const G3: i32 = 30;
pub const G4: i32 = 40;
pub const G10: i32 = 100;
pub const G17: i32 = 170;
pub const G18: i32 = 180;
pub const G19: i32 = 190;
pub const G20: i32 = 200;
pub const G21: i32 = 210;
pub const G28: i32 = 280;
pub const G30: i32 = 300;
pub const G38_2: i32 = 382;
pub const G40: i32 = 400;
pub const G41: i32 = 410;
pub const G42: i32 = 420;
pub const G43: i32 = 430;
pub const G49: i32 = 490;
pub const G53: i32 = 530;
pub const G54: i32 = 540;
pub const G55: i32 = 550;
pub const G56: i32 = 560;
pub const G57: i32 = 570;
pub const G58: i32 = 580;
pub const G59: i32 = 590;
pub const G59_1: i32 = 591;
pub const G59_2: i32 = 592;
pub const G59_3: i32 = 593;
pub const G61: i32 = 610;
pub const G61_1: i32 = 611;
pub const G64: i32 = 640;
pub const G80: i32 = 800;
pub const G81: i32 = 810;
pub const G82: i32 = 820;
pub const G83: i32 = 830;
pub const G84: i32 = 840;
pub const G85: i32 = 850;
pub const G86: i32 = 860;
pub const G87: i32 = 870;
pub const G88: i32 = 880;
pub const G89: i32 = 890;
pub const G90: i32 = 900;
pub const G91: i32 = 910;
pub const G92: i32 = 920;
pub const G92_1: i32 = 921;
pub const G92_2: i32 = 922;
pub const G92_3: i32 = 923;
pub const G93: i32 = 930;
pub const G94: i32 = 940;
pub const G98: i32 = 980;
pub const G99: i32 = 990;

pub const M0: i32 = 0;
pub const M1: i32 = 1;
pub const M2: i32 = 2;
pub const M3: i32 = 3;
pub const M4: i32 = 4;
pub const M5: i32 = 5;
pub const M6: i32 = 6;
pub const M7: i32 = 7;
pub const M8: i32 = 8;
pub const M9: i32 = 9;
pub const M30: i32 = 30;
pub const M48: i32 = 48;
pub const M49: i32 = 49;
pub const M60: i32 = 60;

/// Modal group for each ×10-encoded G-code, or `-1` if unknown/unassigned.
///
/// Built lazily from the explicit `(code, group)` pairs below rather than
/// written out as a 1000-entry literal, but the effect (and the legacy
/// documentation's numbering) is identical to `_gees[]`.
pub fn g_code_group(code: i32) -> Option<u8> {
    const TABLE: &[(i32, u8)] = &[
        (G4, 0),
        (G10, 0),
        (G28, 0),
        (G30, 0),
        (G53, 0),
        (G92, 0),
        (G92_1, 0),
        (G92_2, 0),
        (G92_3, 0),
        (G0, 1),
        (G1, 1),
        (G2, 1),
        (G3, 1),
        (G38_2, 1),
        (G80, 1),
        (G81, 1),
        (G82, 1),
        (G83, 1),
        (G84, 1),
        (G85, 1),
        (G86, 1),
        (G87, 1),
        (G88, 1),
        (G89, 1),
        (G17, 2),
        (G18, 2),
        (G19, 2),
        (G90, 3),
        (G91, 3),
        (G93, 5),
        (G94, 5),
        (G20, 6),
        (G21, 6),
        (G40, 7),
        (G41, 7),
        (G42, 7),
        (G43, 8),
        (G49, 8),
        (G98, 10),
        (G99, 10),
        (G54, 12),
        (G55, 12),
        (G56, 12),
        (G57, 12),
        (G58, 12),
        (G59, 12),
        (G59_1, 12),
        (G59_2, 12),
        (G59_3, 12),
        (G61, 13),
        (G61_1, 13),
        (G64, 13),
    ];
    TABLE
        .iter()
        .find(|(c, _)| *c == code)
        .map(|(_, group)| *group)
}

/// Modal group for each M-code, or `None` if unknown.
///
/// Groups: stopping, tool change, spindle, coolant,
/// overrides enable. Numbered starting at 1 for readability; these indices
/// are purely internal (unlike G-code groups they are not reported to the
/// CMI directly).
pub fn m_code_group(code: i32) -> Option<u8> {
    const TABLE: &[(i32, u8)] = &[
        (M0, 1),
        (M1, 1),
        (M2, 1),
        (M30, 1),
        (M60, 1),
        (M6, 2),
        (M3, 3),
        (M4, 3),
        (M5, 3),
        (M7, 4),
        (M8, 4),
        (M9, 4),
        (M48, 5),
        (M49, 5),
    ];
    TABLE
        .iter()
        .find(|(c, _)| *c == code)
        .map(|(_, group)| *group)
}

/// `true` if `code` is a canned-cycle motion code (`G81..=G89`).
pub fn is_canned_cycle(code: i32) -> bool {
    (G81..=G89).contains(&code)
}

/// Human-readable rendering of a ×10-encoded G-code, e.g. `591 -> "G59.1"`.
pub fn format_gcode(code: i32) -> String {
    if code % 10 == 0 {
        format!("G{}", code / 10)
    } else {
        format!("G{}.{}", code / 10, code % 10)
    }
}
