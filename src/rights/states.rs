use serde::ser::{Serialize, SerializeStruct, Serializer};

/// A U.S. state the user can select
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct StateInfo {
    pub code: &'static str,
    pub name: &'static str,
}

impl StateInfo {
    /// Subdivision flag emoji: black flag, tag letters "us" + code, cancel tag
    pub fn display_glyph(&self) -> String {
        const BLACK_FLAG: char = '\u{1F3F4}';
        const CANCEL_TAG: char = '\u{E007F}';

        let mut glyph = String::new();
        glyph.push(BLACK_FLAG);
        for c in "us".chars().chain(self.code.chars()) {
            let tag = 0xE0000 + c.to_ascii_lowercase() as u32;
            if let Some(tag) = char::from_u32(tag) {
                glyph.push(tag);
            }
        }
        glyph.push(CANCEL_TAG);
        glyph
    }
}

impl Serialize for StateInfo {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut state = serializer.serialize_struct("StateInfo", 3)?;
        state.serialize_field("code", self.code)?;
        state.serialize_field("name", self.name)?;
        state.serialize_field("display_glyph", &self.display_glyph())?;
        state.end()
    }
}

const fn state(code: &'static str, name: &'static str) -> StateInfo {
    StateInfo { code, name }
}

pub static US_STATES: [StateInfo; 50] = [
    state("AL", "Alabama"),
    state("AK", "Alaska"),
    state("AZ", "Arizona"),
    state("AR", "Arkansas"),
    state("CA", "California"),
    state("CO", "Colorado"),
    state("CT", "Connecticut"),
    state("DE", "Delaware"),
    state("FL", "Florida"),
    state("GA", "Georgia"),
    state("HI", "Hawaii"),
    state("ID", "Idaho"),
    state("IL", "Illinois"),
    state("IN", "Indiana"),
    state("IA", "Iowa"),
    state("KS", "Kansas"),
    state("KY", "Kentucky"),
    state("LA", "Louisiana"),
    state("ME", "Maine"),
    state("MD", "Maryland"),
    state("MA", "Massachusetts"),
    state("MI", "Michigan"),
    state("MN", "Minnesota"),
    state("MS", "Mississippi"),
    state("MO", "Missouri"),
    state("MT", "Montana"),
    state("NE", "Nebraska"),
    state("NV", "Nevada"),
    state("NH", "New Hampshire"),
    state("NJ", "New Jersey"),
    state("NM", "New Mexico"),
    state("NY", "New York"),
    state("NC", "North Carolina"),
    state("ND", "North Dakota"),
    state("OH", "Ohio"),
    state("OK", "Oklahoma"),
    state("OR", "Oregon"),
    state("PA", "Pennsylvania"),
    state("RI", "Rhode Island"),
    state("SC", "South Carolina"),
    state("SD", "South Dakota"),
    state("TN", "Tennessee"),
    state("TX", "Texas"),
    state("UT", "Utah"),
    state("VT", "Vermont"),
    state("VA", "Virginia"),
    state("WA", "Washington"),
    state("WV", "West Virginia"),
    state("WI", "Wisconsin"),
    state("WY", "Wyoming"),
];

pub fn all_states() -> &'static [StateInfo] {
    &US_STATES
}

/// Look up a state by code, case-insensitive
pub fn find_state(code: &str) -> Option<&'static StateInfo> {
    let code = code.trim();
    US_STATES.iter().find(|s| s.code.eq_ignore_ascii_case(code))
}

/// States whose name or code contains `term` (case-insensitive)
pub fn search_states(term: &str) -> Vec<&'static StateInfo> {
    let term = term.trim().to_lowercase();
    US_STATES
        .iter()
        .filter(|s| s.name.to_lowercase().contains(&term) || s.code.to_lowercase().contains(&term))
        .collect()
}
