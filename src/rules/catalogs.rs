//! Rule catalogs for common automata families.

use std::sync::Arc;

use crate::{Error, Result, Rule, RuleCatalog, State};

pub const EMPTY: State = State::new('e');
pub const ALIVE: State = State::new('l');
pub const HEAD: State = State::new('h');
pub const TAIL: State = State::new('t');
pub const CONDUCTOR: State = State::new('c');

/// Conway's game of life, B3/S23.
pub fn life() -> RuleCatalog {
    life_catalog("life", &[3], &[2, 3])
}

pub fn wireworld() -> RuleCatalog {
    RuleCatalog::new(
        "wireworld",
        [
            (EMPTY, Rule::constant("Empty", "black", "#eee", EMPTY)),
            (HEAD, Rule::constant("Head", "#0080ff", "#011627", TAIL)),
            (TAIL, Rule::constant("Tail", "#ff4004", "#011627", CONDUCTOR)),
            (
                CONDUCTOR,
                Rule::new("Conductor", "#ffd700", "#011627", |n| {
                    match n.count(HEAD) {
                        1 | 2 => HEAD,
                        _ => CONDUCTOR,
                    }
                }),
            ),
        ],
    )
}

/// Builds a two state catalog from a `B.../S...` rulestring, e.g. `B36/S23` for highlife.
pub fn life_like(rulestring: &str) -> Result<RuleCatalog> {
    let invalid = || Error::InvalidRulestring(rulestring.to_string());

    let mut birth = None;
    let mut survive = None;
    for part in rulestring.trim().split('/') {
        let mut chars = part.chars();
        let slot = match chars.next().map(|c| c.to_ascii_uppercase()) {
            Some('B') => &mut birth,
            Some('S') => &mut survive,
            _ => return Err(invalid()),
        };
        if slot.is_some() {
            return Err(invalid());
        }
        let counts = chars
            .map(|c| match c.to_digit(10) {
                Some(d) if d <= 8 => Ok(d as usize),
                _ => Err(invalid()),
            })
            .collect::<Result<Vec<_>>>()?;
        *slot = Some(counts);
    }

    match (birth, survive) {
        (Some(birth), Some(survive)) => Ok(life_catalog(
            &canonical(&birth, &survive),
            &birth,
            &survive,
        )),
        _ => Err(invalid()),
    }
}

/// Resolves a catalog from its name, anything else is parsed as a rulestring.
pub fn by_name(name: &str) -> Result<Arc<RuleCatalog>> {
    let catalog = match name.to_ascii_lowercase().as_str() {
        "life" | "conway" => life(),
        "wireworld" => wireworld(),
        _ => life_like(name)?,
    };
    Ok(Arc::new(catalog))
}

fn canonical(birth: &[usize], survive: &[usize]) -> String {
    let digits = |counts: &[usize]| {
        let mut counts = counts.to_vec();
        counts.sort_unstable();
        counts.dedup();
        counts.iter().map(|c| c.to_string()).collect::<String>()
    };
    format!("B{}/S{}", digits(birth), digits(survive))
}

fn life_catalog(name: &str, birth: &[usize], survive: &[usize]) -> RuleCatalog {
    let born = mask(birth);
    let kept = mask(survive);
    RuleCatalog::new(
        name,
        [
            (
                EMPTY,
                Rule::new("Empty", "black", "#eee", move |n| {
                    if born[n.count(ALIVE)] {
                        ALIVE
                    } else {
                        EMPTY
                    }
                }),
            ),
            (
                ALIVE,
                Rule::new("Life", "#ffd700", "#011627", move |n| {
                    if kept[n.count(ALIVE)] {
                        ALIVE
                    } else {
                        EMPTY
                    }
                }),
            ),
        ],
    )
}

fn mask(counts: &[usize]) -> [bool; 9] {
    let mut mask = [false; 9];
    for &count in counts {
        mask[count] = true;
    }
    mask
}
