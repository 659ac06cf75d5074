//! Inflection engine — plural, singular and gerund forms.
//!
//! Irregular words are looked up first; otherwise the first suffix rule
//! whose ending matches is applied. Multi-word names inflect only their last
//! word, so "favorite color" pluralizes to "favorite colors".

use std::collections::HashMap;
use std::sync::OnceLock;

use crate::error::GrammarError;
use crate::token::Token;

/// (singular, plural) pairs that don't follow the suffix rules. Words whose
/// two forms coincide are listed with identical halves.
const IRREGULAR: &[(&str, &str)] = &[
    ("person", "people"),
    ("child", "children"),
    ("mouse", "mice"),
    ("louse", "lice"),
    ("goose", "geese"),
    ("foot", "feet"),
    ("tooth", "teeth"),
    ("ox", "oxen"),
    ("die", "dice"),
    ("human", "humans"),
    ("german", "germans"),
    ("leaf", "leaves"),
    ("loaf", "loaves"),
    ("thief", "thieves"),
    ("wolf", "wolves"),
    ("elf", "elves"),
    ("dwarf", "dwarves"),
    ("half", "halves"),
    ("shelf", "shelves"),
    ("calf", "calves"),
    ("knife", "knives"),
    ("wife", "wives"),
    ("life", "lives"),
    ("cactus", "cacti"),
    ("fungus", "fungi"),
    ("octopus", "octopi"),
    ("hero", "heroes"),
    ("potato", "potatoes"),
    ("tomato", "tomatoes"),
    ("echo", "echoes"),
    ("bus", "buses"),
    ("gas", "gases"),
    ("criterion", "criteria"),
    ("phenomenon", "phenomena"),
    ("sheep", "sheep"),
    ("fish", "fish"),
    ("deer", "deer"),
    ("moose", "moose"),
    ("series", "series"),
    ("species", "species"),
    ("aircraft", "aircraft"),
];

/// Ordered (singular ending, plural ending) rewrite rules. The empty
/// singular ending is the catch-all, so it must stay last.
const RULES: &[(&str, &str)] = &[
    ("man", "men"),
    ("ss", "sses"),
    ("sh", "shes"),
    ("ch", "ches"),
    ("x", "xes"),
    ("zz", "zzes"),
    ("ay", "ays"),
    ("ey", "eys"),
    ("oy", "oys"),
    ("uy", "uys"),
    ("y", "ies"),
    ("", "s"),
];

struct Irregulars {
    plurals: HashMap<&'static str, &'static str>,
    singulars: HashMap<&'static str, &'static str>,
}

fn irregulars() -> &'static Irregulars {
    static TABLE: OnceLock<Irregulars> = OnceLock::new();
    TABLE.get_or_init(|| Irregulars {
        plurals: IRREGULAR.iter().copied().collect(),
        singulars: IRREGULAR.iter().map(|(s, p)| (*p, *s)).collect(),
    })
}

pub fn plural_of(word: &str) -> Result<String, GrammarError> {
    let lower = word.to_lowercase();
    if let Some(plural) = irregulars().plurals.get(lower.as_str()) {
        return Ok(match_case(word, plural));
    }
    rewrite(word, &lower, |(singular, plural)| (singular, plural))
        .ok_or_else(|| GrammarError::NoInflection {
            word: word.into(),
            form: "plural",
        })
}

pub fn singular_of(word: &str) -> Result<String, GrammarError> {
    let lower = word.to_lowercase();
    if let Some(singular) = irregulars().singulars.get(lower.as_str()) {
        return Ok(match_case(word, singular));
    }
    rewrite(word, &lower, |(singular, plural)| (plural, singular))
        .ok_or_else(|| GrammarError::NoInflection {
            word: word.into(),
            form: "singular",
        })
}

/// The "-ing" form of a verb, used for sentences like "loving implies
/// liking".
pub fn gerund_of(word: &str) -> String {
    let lower = word.to_lowercase();
    let stem = if lower.ends_with("ie") {
        format!("{}y", &word[..word.len() - 2])
    } else if lower.ends_with('e') && !lower.ends_with("ee") && !lower.ends_with("ye") && lower.len() > 2 {
        word[..word.len() - 1].to_string()
    } else if doubles_final_consonant(&lower) {
        let last = &word[word.len() - 1..];
        format!("{word}{last}")
    } else {
        word.to_string()
    };
    format!("{stem}ing")
}

/// Short consonant-vowel-consonant verbs double their last letter: "hit"
/// becomes "hitting".
fn doubles_final_consonant(word: &str) -> bool {
    let chars: Vec<char> = word.chars().collect();
    let vowel = |c: char| "aeiou".contains(c);
    let n = chars.len();
    n == 3
        && !vowel(chars[0])
        && vowel(chars[1])
        && !vowel(chars[2])
        && !"wxy".contains(chars[2])
}

/// Apply `plural_of` to the last token of a name.
pub fn plural_name(name: &[Token]) -> Result<Vec<Token>, GrammarError> {
    inflect_last(name, plural_of)
}

/// Apply `singular_of` to the last token of a name.
pub fn singular_name(name: &[Token]) -> Result<Vec<Token>, GrammarError> {
    inflect_last(name, singular_of)
}

/// Apply `gerund_of` to the first token of a verb name: "play with"
/// becomes "playing with".
pub fn gerund_name(name: &[Token]) -> Vec<Token> {
    let mut result = name.to_vec();
    if let Some(first) = result.first_mut() {
        first.text = gerund_of(&first.text);
    }
    result
}

fn inflect_last(
    name: &[Token],
    inflect: impl Fn(&str) -> Result<String, GrammarError>,
) -> Result<Vec<Token>, GrammarError> {
    let mut result = name.to_vec();
    match result.last_mut() {
        Some(last) => {
            last.text = inflect(&last.text)?;
            Ok(result)
        }
        None => Err(GrammarError::NoInflection {
            word: String::new(),
            form: "inflected",
        }),
    }
}

fn rewrite(
    word: &str,
    lower: &str,
    direction: impl Fn((&'static str, &'static str)) -> (&'static str, &'static str),
) -> Option<String> {
    RULES.iter().find_map(|rule| {
        let (from, to) = direction(*rule);
        if lower.ends_with(from) && lower.len() > from.len() {
            let stem = &word[..word.len() - from.len()];
            Some(format!("{stem}{to}"))
        } else {
            None
        }
    })
}

fn match_case(original: &str, replacement: &str) -> String {
    if original.chars().next().is_some_and(char::is_uppercase) {
        let mut chars = replacement.chars();
        match chars.next() {
            Some(first) => first.to_uppercase().chain(chars).collect(),
            None => String::new(),
        }
    } else {
        replacement.to_string()
    }
}
