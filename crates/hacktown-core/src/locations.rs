//! Venue-name classification into filter and proximity groups.
//!
//! Raw `place` strings from the API are mapped to a standardized venue name
//! (`filterLocation`) and a coarse geographic zone (`nearLocation`) via an
//! ordered substring rule table. Ordering matters: the first matching rule
//! wins, so broader needles sit above venue names that embed them.
//!
//! The classifier is total. Empty input yields the `"Other"` pair; input no
//! rule matches keeps its original name and gets the explicit [`UNMAPPED`]
//! zone so downstream grouping can tell "known venue" from "needs a new
//! rule". Results are memoized per exact input string for the lifetime of
//! one run.

use std::collections::HashMap;
use std::sync::{Mutex, PoisonError};

use crate::events::{NormalizedEvent, RawEvent};

/// Proximity zone for venues no rule recognizes.
pub const UNMAPPED: &str = "Unmapped";

/// Pair returned for empty or absent venue strings.
const OTHER: &str = "Other";

const NEAR_INATEL: &str = "Inatel e Arredores";
const NEAR_ETE: &str = "ETE e Arredores";
const NEAR_PRACA: &str = "Praça e Arredores";

struct LocationRule {
    /// Uppercase substrings that select this rule; any match counts.
    needles: &'static [&'static str],
    filter: &'static str,
    near: &'static str,
}

/// Ordered rule table from the production venue mapping. First match wins.
const RULES: &[LocationRule] = &[
    LocationRule {
        needles: &["INATEL"],
        filter: "Inatel",
        near: NEAR_INATEL,
    },
    LocationRule {
        needles: &["ETE"],
        filter: "ETE",
        near: NEAR_ETE,
    },
    LocationRule {
        needles: &["LOJA MAÇONICA", "LOJA MAÇÔNICA"],
        filter: "Loja Maçônica",
        near: NEAR_PRACA,
    },
    LocationRule {
        needles: &["REAL PALACE"],
        filter: "Real Palace",
        near: NEAR_PRACA,
    },
    LocationRule {
        needles: &["BRASEIRO"],
        filter: "Braseiro",
        near: NEAR_PRACA,
    },
    LocationRule {
        needles: &["BOTECO DO TIO"],
        filter: "Boteco do Tio João",
        near: NEAR_PRACA,
    },
    LocationRule {
        needles: &["ASSOCIAÇÃO"],
        filter: "Associação José do Patrocínio",
        near: NEAR_PRACA,
    },
    LocationRule {
        needles: &["BAR E RESTAURANTE"],
        filter: "Bar e Restaurante do Dimas II",
        near: NEAR_PRACA,
    },
    LocationRule {
        needles: &["ESCOLA S"],
        filter: "Escola Sanico Teles",
        near: NEAR_PRACA,
    },
    LocationRule {
        needles: &["CASA DINAMARCA"],
        filter: "Casa Dinamarca",
        near: NEAR_INATEL,
    },
    LocationRule {
        needles: &["CASA MFM"],
        filter: "Casa MFM",
        near: NEAR_INATEL,
    },
    LocationRule {
        needles: &["CASA DO CCCF"],
        filter: "Casa do CCCF",
        near: NEAR_PRACA,
    },
    LocationRule {
        needles: &["PALCO UNDERSTREAM"],
        filter: "Palco UNDERSTREAM",
        near: NEAR_PRACA,
    },
    LocationRule {
        needles: &["INCUBADORA MUNICIPAL"],
        filter: "Incubadora Municipal",
        near: NEAR_PRACA,
    },
    LocationRule {
        needles: &["CASA GOOGLE CLOUD"],
        filter: "Casa Google Cloud",
        near: NEAR_INATEL,
    },
    LocationRule {
        needles: &["CASA FUTUROS POSSÍVEIS"],
        filter: "Casa Futuros Possíveis - Maria Maria Gastrobar",
        near: NEAR_PRACA,
    },
    LocationRule {
        needles: &["PALCO MULTIEXPERIÊNCIAS"],
        filter: "Palco MultiExperiências",
        near: NEAR_ETE,
    },
    LocationRule {
        needles: &["CIRCUITO SESC AMANTIKIR"],
        filter: "Circuito SESC Amantikir",
        near: NEAR_PRACA,
    },
    LocationRule {
        needles: &["MIMMA"],
        filter: "Mimma's",
        near: NEAR_PRACA,
    },
    LocationRule {
        needles: &["DIJA GASTRONOMIA"],
        filter: "Dija Gastronomia",
        near: NEAR_PRACA,
    },
    LocationRule {
        needles: &["GRANDPA JOEL", "COFFEE SHOP"],
        filter: "Grandpa Joel´s Coffee Shop",
        near: NEAR_PRACA,
    },
    LocationRule {
        needles: &["SINHÁ MOREIRA", "SINHA MOREIRA"],
        filter: "Av. Sinhá Moreira",
        near: NEAR_ETE,
    },
    LocationRule {
        needles: &["BE BOLD"],
        filter: "Be Bold",
        near: NEAR_ETE,
    },
    LocationRule {
        needles: &["MERCADO MUNICIPAL"],
        filter: "Mercado Municipal",
        near: NEAR_ETE,
    },
    LocationRule {
        needles: &["FEIRA DA MANTIQUEIRA"],
        filter: "Feira da Mantiqueira",
        near: NEAR_INATEL,
    },
    LocationRule {
        needles: &["A SER ANUNCIADO"],
        filter: "A ser anunciado",
        near: NEAR_ETE,
    },
];

/// Rule-based venue classifier with a per-run memoization cache.
///
/// Construct one per run and share it by reference; the cache is behind a
/// mutex so concurrent coordinators can classify without external locking.
pub struct LocationClassifier {
    cache: Mutex<HashMap<String, (String, String)>>,
}

impl LocationClassifier {
    #[must_use]
    pub fn new() -> Self {
        Self {
            cache: Mutex::new(HashMap::new()),
        }
    }

    /// Maps a raw venue string to its `(filterLocation, nearLocation)` pair.
    ///
    /// Total over all inputs: empty strings get the `"Other"` pair, unmapped
    /// venues keep their original name with the [`UNMAPPED`] zone. Matching
    /// is case-insensitive; the cache key is the exact input string.
    pub fn classify(&self, place: &str) -> (String, String) {
        if place.is_empty() {
            return (OTHER.to_owned(), OTHER.to_owned());
        }

        {
            let cache = self.cache.lock().unwrap_or_else(PoisonError::into_inner);
            if let Some(hit) = cache.get(place) {
                return hit.clone();
            }
        }

        let folded = place.to_uppercase();
        let pair = RULES
            .iter()
            .find(|rule| rule.needles.iter().any(|n| folded.contains(n)))
            .map_or_else(
                || (place.to_owned(), UNMAPPED.to_owned()),
                |rule| (rule.filter.to_owned(), rule.near.to_owned()),
            );

        self.cache
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(place.to_owned(), pair.clone());
        pair
    }

    /// Enriches one raw event with its derived location fields.
    #[must_use]
    pub fn normalize(&self, event: RawEvent) -> NormalizedEvent {
        let (filter_location, near_location) = self.classify(event.place.as_deref().unwrap_or(""));
        NormalizedEvent {
            event,
            filter_location,
            near_location,
        }
    }

    /// Number of distinct venue strings classified so far.
    #[must_use]
    pub fn cache_len(&self) -> usize {
        self.cache
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }
}

impl Default for LocationClassifier {
    fn default() -> Self {
        Self::new()
    }
}
