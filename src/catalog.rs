use std::collections::{HashMap, HashSet};

use clap::ValueEnum;
use include_dir::{include_dir, Dir};
use serde::{Deserialize, Serialize};

use crate::error::CatalogError;
use crate::settings::Language;

static DATA_DIR: Dir = include_dir!("$CARGO_MANIFEST_DIR/src/data");

const CHORDS_FILE: &str = "chords.json";
const NAMES_FILE: &str = "names.json";

/// Octave used for notes stored without one
pub const DEFAULT_OCTAVE: u8 = 4;

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, ValueEnum,
    strum_macros::Display,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum ChordType {
    Major,
    Minor,
}

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, strum_macros::Display,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum Difficulty {
    Beginner,
    Intermediate,
    Advanced,
}

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, ValueEnum,
    strum_macros::Display,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum DifficultyFilter {
    Beginner,
    Intermediate,
    Advanced,
    #[default]
    All,
}

impl DifficultyFilter {
    pub fn admits(&self, difficulty: Difficulty) -> bool {
        match self {
            DifficultyFilter::All => true,
            DifficultyFilter::Beginner => difficulty == Difficulty::Beginner,
            DifficultyFilter::Intermediate => difficulty == Difficulty::Intermediate,
            DifficultyFilter::Advanced => difficulty == Difficulty::Advanced,
        }
    }

    pub fn next(self) -> Self {
        match self {
            DifficultyFilter::All => DifficultyFilter::Beginner,
            DifficultyFilter::Beginner => DifficultyFilter::Intermediate,
            DifficultyFilter::Intermediate => DifficultyFilter::Advanced,
            DifficultyFilter::Advanced => DifficultyFilter::All,
        }
    }
}

/// A triad as shown to the learner
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChordRecord {
    pub id: String,
    pub root: String,
    #[serde(rename = "type")]
    pub kind: ChordType,
    /// root, third, fifth; each may carry an octave ("C4")
    pub notes: Vec<String>,
    #[serde(default)]
    pub fingering: Vec<u8>,
    pub difficulty: Difficulty,
    #[serde(default)]
    pub popularity: Option<u8>,
}

const POPULARITY: std::ops::RangeInclusive<u8> = 1..=5;

impl ChordRecord {
    fn validate(&self) -> Result<(), CatalogError> {
        if self.notes.is_empty() {
            return Err(CatalogError::Invalid {
                id: self.id.clone(),
                message: "chord has no notes".to_string(),
            });
        }
        if !self.fingering.is_empty() && self.fingering.len() != self.notes.len() {
            return Err(CatalogError::Invalid {
                id: self.id.clone(),
                message: format!(
                    "{} fingers for {} notes",
                    self.fingering.len(),
                    self.notes.len()
                ),
            });
        }
        if let Some(popularity) = self.popularity.filter(|p| !POPULARITY.contains(p)) {
            return Err(CatalogError::Invalid {
                id: self.id.clone(),
                message: format!("popularity {popularity} outside 1-5"),
            });
        }
        if let Some(bad) = self.notes.iter().find(|n| Pitch::parse(n).is_none()) {
            return Err(CatalogError::Invalid {
                id: self.id.clone(),
                message: format!("unreadable note {bad:?}"),
            });
        }
        Ok(())
    }
}

#[derive(Deserialize, Serialize, Clone, Debug, Default, PartialEq, Eq)]
struct Localized {
    en: String,
    fr: String,
}

impl Localized {
    fn get(&self, language: Language) -> &str {
        match language {
            Language::En => &self.en,
            Language::Fr => &self.fr,
        }
    }
}

#[derive(Deserialize, Clone, Debug, Default)]
struct NameTable {
    notes: HashMap<String, Localized>,
    types: HashMap<String, Localized>,
}

/// Immutable chord list plus the translation tables used to label it
#[derive(Clone, Debug)]
pub struct Catalog {
    chords: Vec<ChordRecord>,
    names: NameTable,
}

impl Catalog {
    /// The 24 major and minor triads shipped with the binary
    pub fn builtin() -> Result<Self, CatalogError> {
        let chords = read_data_file(CHORDS_FILE)?;
        let names = serde_json::from_str(read_data_file(NAMES_FILE)?)?;
        let mut catalog = Self::from_json(chords)?;
        catalog.names = names;
        Ok(catalog)
    }

    /// Parses a JSON array of chord records. Labels fall back to the raw
    /// spelling since no translation table is attached.
    pub fn from_json(json: &str) -> Result<Self, CatalogError> {
        let chords: Vec<ChordRecord> = serde_json::from_str(json)?;
        Self::new(chords)
    }

    pub fn new(chords: Vec<ChordRecord>) -> Result<Self, CatalogError> {
        let mut seen = HashSet::new();
        for chord in &chords {
            chord.validate()?;
            if !seen.insert(chord.id.as_str()) {
                return Err(CatalogError::Invalid {
                    id: chord.id.clone(),
                    message: "duplicate id".to_string(),
                });
            }
        }
        Ok(Self {
            chords,
            names: NameTable::default(),
        })
    }

    pub fn chords(&self) -> &[ChordRecord] {
        &self.chords
    }

    pub fn get(&self, id: &str) -> Option<&ChordRecord> {
        self.chords.iter().find(|c| c.id == id)
    }

    pub fn len(&self) -> usize {
        self.chords.len()
    }

    pub fn is_empty(&self) -> bool {
        self.chords.is_empty()
    }

    /// "C Major" in English, "Do majeur" in French
    pub fn display_name(&self, chord: &ChordRecord, language: Language) -> String {
        let root = self.note_label(&chord.root, language);
        let kind = self
            .names
            .types
            .get(&chord.kind.to_string())
            .map(|l| l.get(language).to_string())
            .unwrap_or_else(|| chord.kind.to_string());
        format!("{root} {kind}")
    }

    /// Localized pitch-class name with any octave suffix dropped
    pub fn note_label(&self, note: &str, language: Language) -> String {
        let name = note.trim_end_matches(|c: char| c.is_ascii_digit());
        self.names
            .notes
            .get(name)
            .map(|l| l.get(language).to_string())
            .unwrap_or_else(|| name.to_string())
    }
}

fn read_data_file(name: &str) -> Result<&'static str, CatalogError> {
    DATA_DIR
        .get_file(name)
        .and_then(|f| f.contents_utf8())
        .ok_or_else(|| CatalogError::MissingFile(name.to_string()))
}

/// Double sharps and flats at most
const MAX_ACCIDENTALS: usize = 2;

/// A spelled note reduced to its pitch class, so D# and Eb compare equal
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pitch {
    pub class: u8,
    pub octave: Option<u8>,
}

impl Pitch {
    pub fn parse(note: &str) -> Option<Self> {
        let mut chars = note.chars().peekable();
        let base: i16 = match chars.next()? {
            'C' => 0,
            'D' => 2,
            'E' => 4,
            'F' => 5,
            'G' => 7,
            'A' => 9,
            'B' => 11,
            _ => return None,
        };

        let mut offset: i16 = 0;
        let mut accidentals = 0;
        while let Some(&c) = chars.peek() {
            match c {
                '#' => offset += 1,
                'b' => offset -= 1,
                _ => break,
            }
            accidentals += 1;
            if accidentals > MAX_ACCIDENTALS {
                return None;
            }
            chars.next();
        }

        let rest: String = chars.collect();
        let octave = if rest.is_empty() {
            None
        } else {
            Some(rest.parse::<u8>().ok()?)
        };

        Some(Self {
            class: (base + offset).rem_euclid(12) as u8,
            octave,
        })
    }

    /// MIDI note number, C4 = 60. Crossing a C boundary (B#, Cb) is not
    /// reflected in the octave, matching how the catalog spells its notes.
    pub fn midi(&self) -> u16 {
        let octave = u16::from(self.octave.unwrap_or(DEFAULT_OCTAVE));
        (octave + 1) * 12 + u16::from(self.class)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn chord(id: &str, notes: &[&str], fingering: &[u8]) -> ChordRecord {
        ChordRecord {
            id: id.to_string(),
            root: "C".to_string(),
            kind: ChordType::Major,
            notes: notes.iter().map(|n| n.to_string()).collect(),
            fingering: fingering.to_vec(),
            difficulty: Difficulty::Beginner,
            popularity: None,
        }
    }

    #[test]
    fn test_builtin_catalog() {
        let catalog = Catalog::builtin().unwrap();

        assert_eq!(catalog.len(), 24);
        assert!(catalog.chords().iter().all(|c| c.notes.len() == 3));
        assert!(catalog.chords().iter().all(|c| c.fingering == vec![1, 3, 5]));

        let majors = catalog
            .chords()
            .iter()
            .filter(|c| c.kind == ChordType::Major)
            .count();
        assert_eq!(majors, 12);
    }

    #[test]
    fn test_builtin_lookup() {
        let catalog = Catalog::builtin().unwrap();
        let c_major = catalog.get("C-major").unwrap();

        assert_eq!(c_major.root, "C");
        assert_eq!(c_major.notes, vec!["C4", "E4", "G4"]);
        assert_eq!(c_major.difficulty, Difficulty::Beginner);
        assert!(catalog.get("H-major").is_none());
    }

    #[test]
    fn test_display_name_is_localized() {
        let catalog = Catalog::builtin().unwrap();
        let chord = catalog.get("F#-minor").unwrap();

        assert_eq!(catalog.display_name(chord, Language::En), "F# Minor");
        assert_eq!(catalog.display_name(chord, Language::Fr), "Fa# mineur");
        assert_eq!(catalog.note_label("Eb4", Language::Fr), "Mib");
        assert_eq!(catalog.note_label("G", Language::En), "G");
    }

    #[test]
    fn test_from_json_without_names_uses_raw_spelling() {
        let json = r#"[
            {"id": "G-major", "root": "G", "type": "major", "notes": ["G4", "B4", "D5"],
             "fingering": [1, 3, 5], "difficulty": "beginner"}
        ]"#;
        let catalog = Catalog::from_json(json).unwrap();
        let chord = catalog.get("G-major").unwrap();

        assert_eq!(chord.popularity, None);
        assert_eq!(catalog.display_name(chord, Language::Fr), "G major");
    }

    #[test]
    fn test_rejects_empty_notes() {
        let result = Catalog::new(vec![chord("bad", &[], &[])]);
        assert!(matches!(result, Err(CatalogError::Invalid { .. })));
    }

    #[test]
    fn test_rejects_mismatched_fingering() {
        let result = Catalog::new(vec![chord("bad", &["C4", "E4", "G4"], &[1, 3])]);
        assert!(matches!(result, Err(CatalogError::Invalid { .. })));

        // fingering is optional
        assert!(Catalog::new(vec![chord("ok", &["C4", "E4", "G4"], &[])]).is_ok());
    }

    #[test]
    fn test_rejects_popularity_out_of_range() {
        for popularity in [0, 6, 200] {
            let mut bad = chord("bad", &["C4", "E4", "G4"], &[1, 3, 5]);
            bad.popularity = Some(popularity);
            assert!(matches!(
                Catalog::new(vec![bad]),
                Err(CatalogError::Invalid { .. })
            ));
        }

        let mut ok = chord("ok", &["C4", "E4", "G4"], &[1, 3, 5]);
        ok.popularity = Some(5);
        assert!(Catalog::new(vec![ok]).is_ok());
    }

    #[test]
    fn test_rejects_duplicate_ids() {
        let result = Catalog::new(vec![
            chord("C-major", &["C4", "E4", "G4"], &[1, 3, 5]),
            chord("C-major", &["C4", "E4", "G4"], &[1, 3, 5]),
        ]);
        assert!(matches!(result, Err(CatalogError::Invalid { id, .. }) if id == "C-major"));
    }

    #[test]
    fn test_rejects_malformed_json() {
        assert!(matches!(
            Catalog::from_json("not json"),
            Err(CatalogError::Parse(_))
        ));
    }

    #[test]
    fn test_pitch_parse() {
        assert_eq!(
            Pitch::parse("C4"),
            Some(Pitch {
                class: 0,
                octave: Some(4)
            })
        );
        assert_eq!(Pitch::parse("F#").map(|p| p.class), Some(6));
        assert_eq!(Pitch::parse("Cb5").map(|p| p.class), Some(11));
        assert_eq!(Pitch::parse("H4"), None);
        assert_eq!(Pitch::parse("C4x"), None);
        assert_eq!(Pitch::parse(""), None);
    }

    #[test]
    fn test_pitch_parse_limits_accidentals() {
        assert_eq!(Pitch::parse("F##4").map(|p| p.class), Some(7));
        assert_eq!(Pitch::parse("Dbb4").map(|p| p.class), Some(0));
        assert_eq!(Pitch::parse("C###4"), None);

        let runaway = format!("C{}4", "#".repeat(40_000));
        assert_eq!(Pitch::parse(&runaway), None);

        let json = format!(
            r#"[{{"id": "x", "root": "C", "type": "major", "notes": ["{runaway}", "E4", "G4"], "difficulty": "beginner"}}]"#
        );
        assert!(matches!(
            Catalog::from_json(&json),
            Err(CatalogError::Invalid { .. })
        ));
    }

    #[test]
    fn test_enharmonic_pitches_share_class() {
        let d_sharp = Pitch::parse("D#4").unwrap();
        let e_flat = Pitch::parse("Eb4").unwrap();

        assert_eq!(d_sharp, e_flat);
        assert_eq!(d_sharp.midi(), 63);
        assert_eq!(Pitch::parse("C").unwrap().midi(), 60);
    }

    #[test]
    fn test_difficulty_filter() {
        assert!(DifficultyFilter::All.admits(Difficulty::Advanced));
        assert!(DifficultyFilter::Beginner.admits(Difficulty::Beginner));
        assert!(!DifficultyFilter::Beginner.admits(Difficulty::Intermediate));
        assert_eq!(DifficultyFilter::Advanced.next(), DifficultyFilter::All);
    }
}
