//! Block assembly and validation
//!
//! A [`Block`] is one line's parsed words. `Block::parse` builds it
//! word-by-word from a preprocessed line; `Block::enhance` resolves implicit
//! motion and the group-0/group-1 axis-value interactions; `Block::check`
//! runs the remaining cross-word legality checks. Grounded on
//! `block.h`/`block.cpp`.

use crate::codes::{self, *};
use crate::error::{Error, LexError, SemanticError, SyntaxError};
use crate::params::ParameterTable;
use crate::reader;
use crate::settings::Settings;

/// One parsed NGC line.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Block {
    pub x: Option<f64>,
    pub y: Option<f64>,
    pub z: Option<f64>,
    pub a: Option<f64>,
    pub b: Option<f64>,
    pub c: Option<f64>,

    pub comment: String,
    pub d: Option<u32>,
    pub f: Option<f64>,
    /// ×10-encoded active code per modal group, `-1` if absent on this line.
    pub g_modes: [i32; 14],
    pub h: Option<u32>,

    pub i: Option<f64>,
    pub j: Option<f64>,
    pub k: Option<f64>,

    pub l: Option<u32>,
    pub line_number: Option<u32>,
    /// The motion this block resolves to, after [`Block::enhance`] — either
    /// an explicit group-1 code or an inherited sticky motion mode.
    pub motion_to_be: Option<i32>,
    pub m_count: u32,
    /// ×10-encoded M-code per (internal) modal group, `-1` if absent.
    pub m_modes: [i32; 6],
    pub p: Option<f64>,
    pub q: Option<f64>,
    pub r: Option<f64>,
    pub s: Option<f64>,
    pub t: Option<u32>,

    /// `#n = expr` assignments from this line, staged in arrival order and
    /// committed to the parameter table after parsing but before execution.
    pub parameter_settings: Vec<(i32, f64)>,
}

impl Block {
    fn new() -> Self {
        Block {
            g_modes: [-1; 14],
            m_modes: [-1; 6],
            ..Default::default()
        }
    }

    /// Parse one raw source line into a block.
    ///
    /// Returns the block together with whether the line was marked for
    /// block-delete (leading `/`). Parameter references inside the line are
    /// resolved against `params`'s currently committed values; `#n = expr`
    /// assignments are only staged, not written.
    pub fn parse(raw_line: &str, params: &ParameterTable) -> Result<(Block, bool), Error> {
        let pre = reader::preprocess_line(raw_line)?;
        let text = pre.text;
        let mut block = Block::new();
        let bytes = text.as_bytes();
        let mut pos = 0usize;
        let mut first_word = true;

        while pos < bytes.len() {
            let ch = bytes[pos] as char;
            match ch {
                '(' => {
                    let start = pos + 1;
                    pos += 1;
                    while pos < bytes.len() && bytes[pos] as char != ')' {
                        pos += 1;
                    }
                    block.comment = text[start..pos].to_string();
                    if pos < bytes.len() {
                        pos += 1;
                    }
                }
                '#' => {
                    let index = reader::read_parameter_index(&text, &mut pos, params)?;
                    if text[pos..].chars().next() != Some('=') {
                        return Err(SyntaxError::EqualSignMissing.into());
                    }
                    pos += 1;
                    let value = reader::read_real_value(&text, &mut pos, params)?;
                    block.parameter_settings.push((index, value));
                    first_word = false;
                }
                c if c.is_ascii_alphabetic() => {
                    pos += 1;
                    block.read_word(c, &text, &mut pos, params, first_word)?;
                    first_word = false;
                }
                _ => return Err(LexError::BadCharacter { ch, pos }.into()),
            }
        }

        Ok((block, pre.block_delete))
    }

    fn read_word(
        &mut self,
        letter: char,
        text: &str,
        pos: &mut usize,
        params: &ParameterTable,
        first_word: bool,
    ) -> Result<(), Error> {
        match letter {
            'a' => self.store_f64(text, pos, params, letter, |b| &mut b.a),
            'b' => self.store_f64(text, pos, params, letter, |b| &mut b.b),
            'c' => self.store_f64(text, pos, params, letter, |b| &mut b.c),
            'x' => self.store_f64(text, pos, params, letter, |b| &mut b.x),
            'y' => self.store_f64(text, pos, params, letter, |b| &mut b.y),
            'z' => self.store_f64(text, pos, params, letter, |b| &mut b.z),
            'f' => self.store_f64(text, pos, params, letter, |b| &mut b.f),
            'i' => self.store_f64(text, pos, params, letter, |b| &mut b.i),
            'j' => self.store_f64(text, pos, params, letter, |b| &mut b.j),
            'k' => self.store_f64(text, pos, params, letter, |b| &mut b.k),
            'p' => self.store_f64(text, pos, params, letter, |b| &mut b.p),
            'q' => self.store_f64(text, pos, params, letter, |b| &mut b.q),
            'r' => self.store_f64(text, pos, params, letter, |b| &mut b.r),
            's' => self.store_f64(text, pos, params, letter, |b| &mut b.s),
            'd' => self.store_u32(text, pos, letter, |b| &mut b.d),
            'h' => self.store_u32(text, pos, letter, |b| &mut b.h),
            'l' => self.store_u32(text, pos, letter, |b| &mut b.l),
            't' => self.store_u32(text, pos, letter, |b| &mut b.t),
            'n' => {
                if !first_word {
                    return Err(SyntaxError::BadLineNumber.into());
                }
                let n = read_unsigned_int(text, pos)?;
                if n > 99_999 {
                    return Err(SyntaxError::BadLineNumber.into());
                }
                self.line_number = Some(n);
                Ok(())
            }
            'g' => self.read_g_word(text, pos, params),
            'm' => self.read_m_word(text, pos, params),
            _ => Err(LexError::UnknownWord {
                word: letter.to_string(),
                pos: *pos,
            }
            .into()),
        }
    }

    fn store_f64(
        &mut self,
        text: &str,
        pos: &mut usize,
        params: &ParameterTable,
        letter: char,
        field: impl Fn(&mut Block) -> &mut Option<f64>,
    ) -> Result<(), Error> {
        if field(self).is_some() {
            return Err(SyntaxError::DuplicateWord { letter }.into());
        }
        let value = reader::read_real_value(text, pos, params)?;
        *field(self) = Some(value);
        Ok(())
    }

    fn store_u32(
        &mut self,
        text: &str,
        pos: &mut usize,
        letter: char,
        field: impl Fn(&mut Block) -> &mut Option<u32>,
    ) -> Result<(), Error> {
        if field(self).is_some() {
            return Err(SyntaxError::DuplicateWord { letter }.into());
        }
        let value = read_unsigned_int(text, pos)?;
        *field(self) = Some(value);
        Ok(())
    }

    fn read_g_word(&mut self, text: &str, pos: &mut usize, params: &ParameterTable) -> Result<(), Error> {
        let raw = reader::read_real_value(text, pos, params)?;
        let code = (raw * 10.0).round() as i32;
        let group = codes::g_code_group(code).ok_or(SyntaxError::UnknownGCode { code })?;
        let slot = &mut self.g_modes[group as usize];
        if *slot != -1 {
            return Err(SyntaxError::ModalGroupCollision { group }.into());
        }
        *slot = code;
        Ok(())
    }

    fn read_m_word(&mut self, text: &str, pos: &mut usize, params: &ParameterTable) -> Result<(), Error> {
        let raw = reader::read_real_value(text, pos, params)?;
        let code = raw.round() as i32;
        if !(0..=99).contains(&code) {
            return Err(SyntaxError::MCodeOutOfRange { code }.into());
        }
        self.m_count += 1;
        if let Some(group) = codes::m_code_group(code) {
            let slot = &mut self.m_modes[group as usize];
            if *slot != -1 {
                return Err(SyntaxError::MModalGroupCollision { group }.into());
            }
            *slot = code;
        }
        Ok(())
    }

    /// Resolve implicit motion and validate group-0/group-1 axis-value
    /// interactions. Must run before [`Block::check`]. Grounded on
    /// `block_t::enhance`.
    pub fn enhance(&mut self, settings: &Settings) -> Result<(), Error> {
        let axis_flag = self.x.is_some()
            || self.y.is_some()
            || self.z.is_some()
            || self.a.is_some()
            || self.b.is_some()
            || self.c.is_some();
        let mode0 = self.g_modes[0];
        let mode_zero_covets_axes = mode0 == G10 || mode0 == G28 || mode0 == G30 || mode0 == G92;

        if self.g_modes[1] != -1 {
            if self.g_modes[1] == G80 {
                if axis_flag && !mode_zero_covets_axes {
                    return Err(SemanticError::CannotUseAxisValuesWithG80.into());
                }
                if !axis_flag && mode0 == G92 {
                    return Err(SemanticError::AllAxesMissingWithG92.into());
                }
            } else {
                if mode_zero_covets_axes {
                    return Err(SemanticError::CannotUseTwoGCodesThatBothUseAxisValues.into());
                }
                if !axis_flag {
                    return Err(SemanticError::AllAxesMissingWithMotionCode.into());
                }
            }
            self.motion_to_be = Some(self.g_modes[1]);
        } else if mode_zero_covets_axes {
            if !axis_flag && mode0 == G92 {
                return Err(SemanticError::AllAxesMissingWithG92.into());
            }
        } else if axis_flag {
            if settings.motion_mode.is_none() || settings.motion_mode == Some(G80) {
                return Err(SemanticError::CannotUseAxisValuesWithoutGCode.into());
            }
            self.motion_to_be = settings.motion_mode;
        }
        Ok(())
    }

    /// Run all post-`enhance` legality checks: [`check_g_codes`],
    /// [`check_m_codes`], [`check_other_codes`]. Grounded on
    /// `block_t::check_items`.
    pub fn check(&self, settings: &Settings) -> Result<(), Error> {
        self.check_g_codes(settings)?;
        self.check_m_codes()?;
        self.check_other_codes()?;
        Ok(())
    }

    fn check_g_codes(&self, settings: &Settings) -> Result<(), Error> {
        match self.g_modes[0] {
            -1 => {}
            G4 => {
                if self.p.is_none() {
                    return Err(SemanticError::DwellTimeMissingWithG4.into());
                }
            }
            G10 => {
                if self.l != Some(2) {
                    return Err(SemanticError::G10WithoutL2.into());
                }
                let p = self.p.unwrap_or(0.0);
                let p_int = (p + 0.0001) as i32;
                if ((p + 0.0001) - p_int as f64).abs() > 0.0002 {
                    return Err(SemanticError::G10PValueNotInteger.into());
                }
                if !(1..=9).contains(&p_int) {
                    return Err(SemanticError::G10PValueOutOfRange.into());
                }
            }
            G28 | G30 | G92 | G92_1 | G92_2 | G92_3 => {}
            G53 => {
                let motion = self.motion_to_be.unwrap_or(-1);
                if motion != G0 && motion != G1 {
                    return Err(SemanticError::G53RequiresG0OrG1.into());
                }
                let distance_group = self.g_modes[3];
                let incremental_implied = distance_group != G90
                    && settings.distance_mode == crate::types::DistanceMode::Incremental;
                if distance_group == G91 || incremental_implied {
                    return Err(SemanticError::CannotUseG53Incremental.into());
                }
            }
            other => {
                return Err(Error::Bug(format!(
                    "bad g-code modal group 0: {}",
                    codes::format_gcode(other)
                )))
            }
        }
        Ok(())
    }

    fn check_m_codes(&self) -> Result<(), Error> {
        const MAX_EMS: u32 = 4;
        if self.m_count > MAX_EMS {
            return Err(SyntaxError::TooManyMCodes.into());
        }
        Ok(())
    }

    fn check_other_codes(&self) -> Result<(), Error> {
        let in_canned_cycle = self.g_modes[1] > G80 && self.g_modes[1] < G90;

        if self.a.is_some() && in_canned_cycle {
            return Err(SemanticError::AxisInCannedCycle { axis: 'a' }.into());
        }
        if self.b.is_some() && in_canned_cycle {
            return Err(SemanticError::AxisInCannedCycle { axis: 'b' }.into());
        }
        if self.c.is_some() && in_canned_cycle {
            return Err(SemanticError::AxisInCannedCycle { axis: 'c' }.into());
        }
        if self.d.is_some() && self.g_modes[7] != G41 && self.g_modes[7] != G42 {
            return Err(SemanticError::DWordWithNoCutterComp.into());
        }
        if self.h.is_some() && self.g_modes[8] != G43 {
            return Err(SemanticError::HWordWithNoG43.into());
        }
        if self.i.is_some() && motion != G2 && motion != G3 && motion != G87 {
            return Err(SemanticError::IjkWordWithoutUse { letter: 'i' }.into());
        }
        if self.j.is_some() && motion != G2 && motion != G3 && motion != G87 {
            return Err(SemanticError::IjkWordWithoutUse { letter: 'j' }.into());
        }
        if self.k.is_some() && motion != G2 && motion != G3 && motion != G87 {
            return Err(SemanticError::IjkWordWithoutUse { letter: 'k' }.into());
        }
        if self.l.is_some() && (motion < G81 || motion > G89) && self.g_modes[0] != G10 {
            return Err(SemanticError::LWordWithoutUse.into());
        }
        if let Some(p) = self.p {
            let valid = self.g_modes[0] == G10
                || self.g_modes[0] == G4
                || motion == G82
                || motion == G86
                || motion == G88
                || motion == G89
                || motion == G2
                || motion == G3;
            if !valid {
                return Err(SemanticError::PWordWithoutUse.into());
            }
            if (motion == G2 || motion == G3) && p.round() < 1.0 {
                return Err(SemanticError::PValueNotPositiveIntegerWithArc.into());
            }
        }
        if self.q.is_some() && motion != G83 {
            return Err(SemanticError::QWordWithoutUse.into());
        }
        if self.r.is_some() && motion != G2 && motion != G3 && (motion < G81 || motion > G89) {
            return Err(SemanticError::RWordWithoutUse.into());
        }
        Ok(())
    }
}

/// Read an unsigned integer word (digits only, no sign or decimal point).
fn read_unsigned_int(text: &str, pos: &mut usize) -> Result<u32, Error> {
    let start = *pos;
    let bytes = text.as_bytes();
    let mut i = *pos;
    while i < bytes.len() && (bytes[i] as char).is_ascii_digit() {
        i += 1;
    }
    if i == start {
        return Err(LexError::BadUnsignedInteger { pos: start }.into());
    }
    let value: u32 = text[start..i]
        .parse()
        .map_err(|_| Error::from(LexError::BadUnsignedInteger { pos: start }))?;
    *pos = i;
    Ok(value)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_simple_motion_block() {
        let params = ParameterTable::new();
        let (block, delete) = Block::parse("G1 X1.0 Y2.0 F100", &params).unwrap();
        assert!(!delete);
        assert_eq!(block.g_modes[1], G1);
        assert_eq!(block.x, Some(1.0));
        assert_eq!(block.y, Some(2.0));
        assert_eq!(block.f, Some(100.0));
    }

    #[test]
    fn duplicate_word_errors() {
        let params = ParameterTable::new();
        let err = Block::parse("G1 X1 X2", &params).unwrap_err();
        assert_eq!(err, SyntaxError::DuplicateWord { letter: 'x' }.into());
    }

    #[test]
    fn modal_group_collision_errors() {
        let params = ParameterTable::new();
        let err = Block::parse("G1 G2 X1 Y1", &params).unwrap_err();
        assert_eq!(err, SyntaxError::ModalGroupCollision { group: 1 }.into());
    }

    #[test]
    fn unknown_g_code_errors() {
        let params = ParameterTable::new();
        let err = Block::parse("G200", &params).unwrap_err();
        assert_eq!(err, SyntaxError::UnknownGCode { code: 2000 }.into());
    }

    #[test]
    fn enhance_rejects_axis_values_without_motion() {
        let params = ParameterTable::new();
        let (mut block, _) = Block::parse("X1 Y1", &params).unwrap();
        let settings = Settings::new();
        let err = block.enhance(&settings).unwrap_err();
        assert_eq!(err, SemanticError::CannotUseAxisValuesWithoutGCode.into());
    }

    #[test]
    fn enhance_inherits_sticky_motion_mode() {
        let params = ParameterTable::new();
        let (mut block, _) = Block::parse("X1 Y1", &params).unwrap();
        let mut settings = Settings::new();
        settings.motion_mode = Some(G1);
        block.enhance(&settings).unwrap();
        assert_eq!(block.motion_to_be, Some(G1));
    }

    #[test]
    fn check_rejects_p_word_with_arc_not_rounding_to_positive_integer() {
        let params = ParameterTable::new();
        let (mut block, _) = Block::parse("G2 X1 Y1 I1 J0 P0", &params).unwrap();
        let settings = Settings::new();
        block.enhance(&settings).unwrap();
        let err = block.check(&settings).unwrap_err();
        assert_eq!(err, SemanticError::PValueNotPositiveIntegerWithArc.into());
    }

    #[test]
    fn parameter_setting_is_staged_not_committed() {
        let params = ParameterTable::new();
        let (block, _) = Block::parse("#100=1.5", &params).unwrap();
        assert_eq!(block.parameter_settings, vec![(100, 1.5)]);
    }
}
